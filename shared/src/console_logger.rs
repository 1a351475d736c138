use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, SetLoggerError};

/// Installs the global `log` backend for the binaries: coloured level tag and
/// module target on stderr.
pub fn init_console_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::BrightRed)
        .warn(Color::BrightYellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::White);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{:5} | {} | {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_once_with_requested_level() {
        init_console_logger(LevelFilter::Info).unwrap();
        assert_eq!(log::max_level(), LevelFilter::Info);
        assert!(log::log_enabled!(log::Level::Warn));
        assert!(!log::log_enabled!(log::Level::Debug));

        // a second backend is refused
        assert!(init_console_logger(LevelFilter::Trace).is_err());
        assert_eq!(log::max_level(), LevelFilter::Info);
    }
}
