//! Telemetry and logging for SQL rendering
//!
//! Rendering is silent by default. Set the `SQLTREE_LOG_LEVEL` environment
//! variable to one of:
//! - `off` - No logging (default)
//! - `basic` - Log rendered SQL (truncated) and timing
//! - `detailed` - Log full SQL and bound parameter values
//! - `debug` - Log everything including alias assignments
//!
//! Events are emitted through `tracing` under the `sqltree` target, so a
//! subscriber still decides where they end up.
//!
//! # Example
//!
//! ```bash
//! export SQLTREE_LOG_LEVEL=detailed
//! ```

use crate::ast::Param;
use std::time::Instant;

/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "SQLTREE_LOG_LEVEL";

/// SQL longer than this is truncated at [`LogLevel::Basic`]
const BASIC_SQL_LIMIT: usize = 1000;

/// Log level for SQL telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// No logging
    #[default]
    Off = 0,
    /// Basic info: SQL and timing
    Basic = 1,
    /// Detailed: full SQL and parameters
    Detailed = 2,
    /// Debug: everything including alias assignments
    Debug = 3,
}

impl LogLevel {
    /// Parse from string; unknown values disable logging
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "basic" => Self::Basic,
            "detailed" => Self::Detailed,
            "debug" => Self::Debug,
            _ => Self::Off,
        }
    }
}

/// Get current log level from environment
pub fn get_log_level() -> LogLevel {
    std::env::var(LOG_LEVEL_ENV)
        .map(|s| LogLevel::parse(&s))
        .unwrap_or(LogLevel::Off)
}

fn truncate(sql: &str, limit: usize) -> String {
    match sql.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Log rendered SQL
pub fn log_sql(sql: &str) {
    let level = get_log_level();
    if level < LogLevel::Basic {
        return;
    }

    let sql_display = if level >= LogLevel::Detailed {
        sql.to_string()
    } else {
        truncate(sql, BASIC_SQL_LIMIT)
    };

    tracing::info!(target: "sqltree", sql = %sql_display, "rendered SQL");
}

/// Log the bind list of a statement
pub fn log_params(params: &[Param]) {
    if get_log_level() < LogLevel::Detailed {
        return;
    }

    for param in params {
        tracing::info!(
            target: "sqltree",
            index = param.index,
            name = param.name.as_deref().unwrap_or(""),
            value = %param.value.to_json(),
            "bind parameter"
        );
    }
}

/// Log an alias handed out by the allocator
pub fn log_alias(node: &str, alias: &str) {
    if get_log_level() < LogLevel::Debug {
        return;
    }
    tracing::debug!(target: "sqltree", node, alias, "assigned alias");
}

/// Times one render call and logs the duration when dropped
#[derive(Debug)]
pub struct RenderTimer {
    start: Instant,
    what: &'static str,
    level: LogLevel,
}

impl RenderTimer {
    pub fn start(what: &'static str) -> Self {
        Self {
            start: Instant::now(),
            what,
            level: get_log_level(),
        }
    }

    /// Elapsed time in microseconds
    pub fn elapsed_us(&self) -> u128 {
        self.start.elapsed().as_micros()
    }
}

impl Drop for RenderTimer {
    fn drop(&mut self) {
        if self.level >= LogLevel::Basic {
            tracing::info!(
                target: "sqltree",
                what = self.what,
                elapsed_us = self.elapsed_us() as u64,
                "render finished"
            );
        }
    }
}

/// Run one render under a [`RenderTimer`] and log the SQL it produced
pub fn traced<F>(what: &'static str, render: F) -> String
where
    F: FnOnce() -> String,
{
    let _timer = RenderTimer::start(what);
    let sql = render();
    log_sql(&sql);
    sql
}
