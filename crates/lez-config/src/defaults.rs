use camino::Utf8PathBuf;

/// Executable used to launch the inference engine when none is configured.
pub const DEFAULT_ENGINE_EXECUTABLE: &str = "swipl";

/// Rule base consulted on every invocation.
pub const DEFAULT_RULE_BASE_PATH: &str = "kb.pl";

/// Grammar consulted on every invocation, after the rule base.
pub const DEFAULT_GRAMMAR_PATH: &str = "dcg.pl";

/// Entry predicate the rule base exposes for token lists.
pub const DEFAULT_ENTRY_PREDICATE: &str = "process_tokens";

/// Default log filter expression used by the binary.
///
/// The console shares stderr with diagnostics, so only warnings and errors
/// are shown unless the operator asks for more.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default engine executable.
pub fn default_engine_executable() -> String {
    DEFAULT_ENGINE_EXECUTABLE.to_owned()
}

/// Default rule base location.
pub fn default_rule_base_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_RULE_BASE_PATH)
}

/// Default grammar location.
pub fn default_grammar_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_GRAMMAR_PATH)
}

/// Default entry predicate.
pub fn default_entry_predicate() -> String {
    DEFAULT_ENTRY_PREDICATE.to_owned()
}

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
