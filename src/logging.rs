use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Configure the logger from repeated `-v` flags. Parse-fallback warnings
/// are emitted at warn level, so they are visible by default.
pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            let label = match record.level() {
                Level::Error => "error:".red().bold(),
                Level::Warn => "warning:".yellow().bold(),
                Level::Info => "info:".white().bold(),
                Level::Debug => "debug:".bright_black(),
                Level::Trace => "trace:".bright_black(),
            };
            writeln!(buf, "{} {}", label, record.args())
        })
        .init();
}
