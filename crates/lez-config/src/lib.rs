//! Layered configuration for the low-emission zone access checker.
//!
//! [`Config`] is loaded through `ortho_config`, which merges built-in
//! defaults, an optional TOML file (`--config-path` or `LEZ_CONFIG_PATH`),
//! `LEZ_*` environment variables and command-line flags, in increasing order
//! of precedence.
//!
//! The configuration names the inference engine executable, the rule base
//! and grammar the engine consults on every invocation, the entry predicate
//! compiled queries call, an optional per-query timeout, and the logging
//! settings used by the binary.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_ENGINE_EXECUTABLE, DEFAULT_ENTRY_PREDICATE, DEFAULT_GRAMMAR_PATH, DEFAULT_LOG_FILTER,
    DEFAULT_RULE_BASE_PATH, default_engine_executable, default_entry_predicate,
    default_grammar_path, default_log_filter, default_log_filter_string, default_log_format,
    default_rule_base_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the engine pipeline and the binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LEZ")]
pub struct Config {
    /// Inference engine executable, resolved through `PATH` when bare.
    #[ortho_config(default = default_engine_executable())]
    pub engine_executable: String,
    /// Rule base consulted first on every invocation.
    #[ortho_config(default = default_rule_base_path())]
    pub rule_base_path: Utf8PathBuf,
    /// Grammar consulted after the rule base on every invocation.
    #[ortho_config(default = default_grammar_path())]
    pub grammar_path: Utf8PathBuf,
    /// Predicate the compiled query calls with the token list.
    #[ortho_config(default = default_entry_predicate())]
    pub entry_predicate: String,
    /// Upper bound on a single engine invocation. Unbounded when unset.
    pub query_timeout_secs: Option<u64>,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_executable: default_engine_executable(),
            rule_base_path: default_rule_base_path(),
            grammar_path: default_grammar_path(),
            entry_predicate: default_entry_predicate(),
            query_timeout_secs: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Inference engine executable.
    #[must_use]
    pub fn engine_executable(&self) -> &str {
        &self.engine_executable
    }

    /// Rule base location as configured.
    #[must_use]
    pub fn rule_base_path(&self) -> &Utf8Path {
        &self.rule_base_path
    }

    /// Grammar location as configured.
    #[must_use]
    pub fn grammar_path(&self) -> &Utf8Path {
        &self.grammar_path
    }

    /// Entry predicate called by compiled queries.
    #[must_use]
    pub fn entry_predicate(&self) -> &str {
        &self.entry_predicate
    }

    /// Per-invocation timeout, when one is configured.
    ///
    /// A value of zero is treated as unset.
    #[must_use]
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
