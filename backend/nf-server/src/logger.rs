use crate::error::{Result as ServerErrorResult, ServerError};

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, info};

/// Crates whose debug output drowns the service's own records
const NOISY_TARGETS: &[(&str, LevelFilter)] = &[
    ("redis", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("h2", LevelFilter::Info),
];

/// Where log records go
enum LogSink {
    File(PathBuf),
    Stdout { colored: bool },
}

/// Initialize the global logger with fern.
///
/// `log_file` switches output from stdout to an appended file; `colored` only
/// applies to stdout.
pub fn initialize(
    log_level: nf_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level_filter = LevelFilter::from(log_level);
    let sink = match log_file {
        Some(path) => LogSink::File(path),
        None => LogSink::Stdout { colored },
    };

    let base = NOISY_TARGETS
        .iter()
        .fold(Dispatch::new().level(level_filter), |dispatch, &(target, level)| {
            dispatch.level_for(target, level.min(level_filter))
        });

    base.chain(sink_dispatch(&sink)?)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    match &sink {
        LogSink::File(path) => info!(
            "Logger initialized: level={}, file={}",
            level_filter,
            path.display()
        ),
        LogSink::Stdout { colored } => info!(
            "Logger initialized: level={}, stdout (colored: {})",
            level_filter, colored
        ),
    }

    // Records emitted through `tracing` reach fern as log records
    tracing_log::LogTracer::init().ok();

    Ok(())
}

fn sink_dispatch(sink: &LogSink) -> ServerErrorResult<Dispatch> {
    let dispatch = match sink {
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ServerError::Logger {
                    message: format!("Failed to open log file {}: {}", path.display(), e),
                })?;

            Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{date} {level:<5} {target}: {message}",
                        date = humantime::format_rfc3339_millis(SystemTime::now()),
                        level = record.level(),
                        target = record.target(),
                        message = message,
                    ))
                })
                .chain(file)
        }
        LogSink::Stdout { colored: true } => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);

            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date} - {level}] {message} [{target}]",
                        date = humantime::format_rfc3339_seconds(SystemTime::now()),
                        level = colors.color(record.level()),
                        message = message,
                        target = record.target(),
                    ))
                })
                .chain(std::io::stdout())
        }
        // Plain output for non-TTY (systemd, docker logs)
        LogSink::Stdout { colored: false } => Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{date} - {level}] {message} [{target}]",
                    date = humantime::format_rfc3339_seconds(SystemTime::now()),
                    level = record.level(),
                    message = message,
                    target = record.target(),
                ))
            })
            .chain(std::io::stdout()),
    };

    Ok(dispatch)
}
