use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_PREFIX: &str = env!("CARGO_PKG_NAME");
const MAX_LOG_FILES: usize = 5;

/// `--log-filter` wins, then `--log` (everything), then `log_level` from the config.
pub fn resolve_level(
    filter: Option<LevelFilter>,
    verbose: bool,
    configured: LevelFilter,
) -> LevelFilter {
    match (filter, verbose) {
        (Some(filter), _) => filter,
        (None, true) => LevelFilter::TRACE,
        (None, false) => configured,
    }
}

/// Only events from this crate pass, dependencies stay quiet.
fn crate_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_")))
}

/// Writes `streaks.<date>` files into `<application_data_path>/logs`, one per day, keeping the
/// last few. Stdout gets the same events only when `show_std` is set.
pub fn enable_logging(
    application_data_path: &Path,
    level: LevelFilter,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(application_data_path.join(LOG_DIR_NAME))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(crate_filter(level))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Routes traces of this crate into the test output. Another subscriber being set first is fine.
pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(crate_filter(LevelFilter::TRACE))
        .with_test_writer()
        .try_init();
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::resolve_level;

    #[test]
    fn test_config_level_by_default() {
        assert_eq!(resolve_level(None, false, LevelFilter::WARN), LevelFilter::WARN);
    }

    #[test]
    fn test_log_flag_traces_everything() {
        assert_eq!(resolve_level(None, true, LevelFilter::WARN), LevelFilter::TRACE);
    }

    #[test]
    fn test_explicit_filter_wins() {
        assert_eq!(
            resolve_level(Some(LevelFilter::ERROR), true, LevelFilter::WARN),
            LevelFilter::ERROR
        );
        assert_eq!(
            resolve_level(Some(LevelFilter::OFF), false, LevelFilter::DEBUG),
            LevelFilter::OFF
        );
    }
}
