use std::process;
use std::time::Instant;

use clap::{App, Arg};
use colored::*;
use log::{error, LevelFilter};

use column_generation::{default_solver, ColumnGeneration, ExactFormulation, TerminalStatus, CG_EPSILON};
use shared::{init_console_logger, ProblemData, RunConfig};

/// Solves an instance twice, by column generation and by the full
/// formulation, and compares the integral objectives.
pub fn main() {
    let matches = App::new("ExactCrossCheck")
        .arg(Arg::with_name("shipments").short("s").long("shipments").value_name("FILE").required(true).takes_value(true))
        .arg(Arg::with_name("tariffs").short("t").long("tariffs").value_name("FILE").required(true).takes_value(true))
        .arg(Arg::with_name("sites").long("sites").value_name("FILE").required(true).takes_value(true))
        .arg(Arg::with_name("warehouses").short("w").long("warehouses").value_name("FILE").required(true).takes_value(true))
        .arg(Arg::with_name("config").short("c").long("config").value_name("FILE").takes_value(true))
        .get_matches();

    init_console_logger(LevelFilter::Warn).expect("logger already set");

    let config = match matches.value_of("config") {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    };
    let problem = config
        .and_then(|config| {
            ProblemData::load(
                matches.value_of("shipments").unwrap(),
                matches.value_of("tariffs").unwrap(),
                matches.value_of("sites").unwrap(),
                matches.value_of("warehouses").unwrap(),
                config,
            )
        })
        .unwrap_or_else(|e| {
            error!("{}", e);
            process::exit(2)
        });
    eprintln!("{}", "♞ Loading Data Completed".on_green().bold());

    let solver = default_solver().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2)
    });

    let start = Instant::now();
    let generated = TerminalStatus::of(&ColumnGeneration::new(&problem, &solver).solve());
    let cg_time = start.elapsed();

    let start = Instant::now();
    let exact = TerminalStatus::of(&ExactFormulation::new(&problem, &solver).solve());
    let exact_time = start.elapsed();

    println!("Column generation: {} ({:.2}s)", generated, cg_time.as_secs_f64());
    println!("Full formulation:  {} ({:.2}s)", exact, exact_time.as_secs_f64());

    match (generated, exact) {
        (TerminalStatus::Success(cg), TerminalStatus::Success(full))
        | (TerminalStatus::Partial { objective: cg, .. }, TerminalStatus::Partial { objective: full, .. }) => {
            let gap = (cg - full) / full.abs().max(1.0);
            println!("Gap: {:.4}%", gap * 100.0);
            if gap > CG_EPSILON {
                eprintln!("{}", "Column generation did not reach the full optimum".yellow().bold());
            }
        }
        (cg, full) if cg == full => {}
        _ => {
            eprintln!("{}", "Terminal status differs".red().bold());
            process::exit(1);
        }
    }
}
