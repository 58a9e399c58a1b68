use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogConfig, LogEncoding};

const DEFAULT_DIRECTIVES: &str = "actix_web=info,sqlx=warn,sea_orm=warn";

/// Resolve the filter for a configured level; unknown levels fall back to `info`.
fn level_filter(level: &str) -> LevelFilter {
    match LevelFilter::from_str(level) {
        Ok(filter) => filter,
        Err(_) => {
            eprintln!("invalid log level {level:?}; falling back to info");
            LevelFilter::INFO
        }
    }
}

pub fn init_tracing(log: &LogConfig) {
    let level = level_filter(&log.level);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},{DEFAULT_DIRECTIVES}")));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log.encoding {
        LogEncoding::Json => {
            let fmt_layer = fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(false)
                .json();
            registry.with(fmt_layer).init();
        }
        LogEncoding::Console => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}
