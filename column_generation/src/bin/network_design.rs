use std::process;
use std::time::Instant;

use clap::{App, Arg, ArgMatches};
use colored::*;
use log::{error, info, LevelFilter};

use column_generation::{check_feasibility, default_solver, ColumnGeneration, TerminalStatus};
use shared::{init_console_logger, ColumnPolicy, Facility, ProblemData, RunConfig};

fn data_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.arg(
        Arg::with_name("shipments")
            .short("s")
            .long("shipments")
            .value_name("FILE")
            .help("Shipments to route (csv, may be gzipped)")
            .required(true)
            .takes_value(true),
    )
    .arg(
        Arg::with_name("tariffs")
            .short("t")
            .long("tariffs")
            .value_name("FILE")
            .help("Carrier tariff table (csv)")
            .required(true)
            .takes_value(true),
    )
    .arg(
        Arg::with_name("sites")
            .long("sites")
            .value_name("FILE")
            .help("Production sites to load")
            .required(true)
            .takes_value(true),
    )
    .arg(
        Arg::with_name("warehouses")
            .short("w")
            .long("warehouses")
            .value_name("FILE")
            .help("Candidate warehouses to load")
            .required(true)
            .takes_value(true),
    )
    .arg(
        Arg::with_name("config")
            .short("c")
            .long("config")
            .value_name("FILE")
            .help("Run configuration (toml); defaults are used if omitted")
            .takes_value(true),
    )
    .arg(Arg::with_name("verbose").short("v").multiple(true).help("More log output"))
}

fn load(matches: &ArgMatches) -> ProblemData {
    let config = match matches.value_of("config") {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    };
    let mut config = config.unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2)
    });

    if matches.is_present("all_columns") {
        config.column_policy = ColumnPolicy::AllImproving;
    }
    if let Some(max) = matches.value_of("max_iterations") {
        config.max_iterations = Some(max.parse().unwrap_or_else(|_| {
            error!("Invalid max_iterations: {}", max);
            process::exit(2)
        }));
    }

    ProblemData::load(
        matches.value_of("shipments").unwrap(),
        matches.value_of("tariffs").unwrap(),
        matches.value_of("sites").unwrap(),
        matches.value_of("warehouses").unwrap(),
        config,
    )
    .unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2)
    })
}

pub fn main() {
    let matches = data_args(App::new("NetworkDesign"))
        .arg(
            Arg::with_name("max_iterations")
                .long("max_iterations")
                .help("Stop pricing after this many iterations")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("all_columns")
                .long("all_columns")
                .help("Add every improving route per shipment instead of the best one"),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    init_console_logger(level).expect("logger already set");

    #[cfg(feature = "perf_statistics")]
    shared::setup_metrics_printer(std::time::Duration::from_secs(10));

    let problem = load(&matches);
    eprintln!("{}", "♞ Loading Data Completed".on_green().bold());
    info!(
        "{} shipments, {} sites, {} warehouses, {} tariff lanes",
        problem.shipments().len(),
        problem.sites().len(),
        problem.warehouses().len(),
        problem.route_cost().tariffs().len()
    );

    let solver = default_solver().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2)
    });

    let start = Instant::now();
    let result = ColumnGeneration::new(&problem, solver).solve();
    eprintln!("{}", "♞ Column Generation Completed".on_green().bold());

    let status = TerminalStatus::of(&result);
    println!("Status: {}", status);

    let design = match result {
        Ok(design) => design,
        Err(e) => {
            println!("Reason: {}", e);
            println!("Duration: {}s", start.elapsed().as_secs());
            process::exit(1)
        }
    };

    println!("Objective: {:.2}", design.objective);
    println!("Iterations: {}", design.iterations);
    println!("Columns: {}", design.columns_generated);
    if !design.is_complete() {
        println!("Unserved shipments: {:?}", design.unserved);
    }
    println!(
        "Open warehouses: {:?}",
        design
            .open_warehouses
            .iter()
            .map(|w| problem.warehouses()[*w].code.as_str())
            .collect::<Vec<_>>()
    );

    for ((facility, month), load) in &design.loads {
        let name = match facility {
            Facility::Site(index) => &problem.sites()[*index].code,
            Facility::Warehouse(index) => &problem.warehouses()[*index].code,
        };
        println!("{:>8} {:>2}: {:>12.1} kg", name, month, load);
    }

    let violations = check_feasibility(&problem, &design);
    if violations.is_empty() {
        eprintln!("{}", "Solution is feasible".green());
    } else {
        for violation in &violations {
            eprintln!("{} {:?}", "Violation:".red().bold(), violation);
        }
    }
    println!("Duration: {}s", start.elapsed().as_secs());

    if !violations.is_empty() {
        process::exit(1);
    }
}
