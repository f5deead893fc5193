use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

pub const DEFAULT_LOG_DIRECTIVES: &str = "info,app::prediction=debug";
pub const LOG_FILE_PREFIX: &str = "stress-predictor.log";

/// Installs the global subscriber once. Later calls are no-ops.
///
/// Console output goes to stderr so JSON printed on stdout stays clean.
/// With `log_dir`, a daily-rolling file is written there as well.
pub fn init_logging(log_dir: Option<&Path>) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
                .map_err(|err| AppError::other(format!("failed to parse log directives: {err}")))?;

            let file_layer = match log_dir {
                Some(dir) => {
                    std::fs::create_dir_all(dir)?;

                    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                    LOGGER_GUARD
                        .set(guard)
                        .map_err(|_| AppError::other("logger already initialised"))?;

                    Some(
                        fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false)
                            .with_target(true)
                            .with_timer(UtcTime::rfc_3339()),
                    )
                }
                None => None,
            };

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            Ok(())
        })
        .map(|_| ())
}
