//! Directive construction for a single engine invocation.

use std::path::Path;

use crate::compile::{CompiledQuery, quote_atom};
use crate::invoke::EngineResources;

/// Text the setup probe writes once both resources have loaded.
pub const SETUP_SENTINEL: &str = "LEZ SETUP OK";

/// The single instruction passed to the engine with `-t`.
///
/// It consults the rule base, then the grammar, then runs one goal and
/// halts. Loading and execution share one invocation, so a resource that
/// fails to load prevents the goal from running and the failure surfaces
/// through the same exit status and stderr channel as a query error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive(String);

impl Directive {
    /// Directive that runs a compiled query.
    #[must_use]
    pub fn query(resources: &EngineResources, query: &CompiledQuery) -> Self {
        Self::with_goal(resources, query.as_str())
    }

    /// Directive that loads both resources and prints [`SETUP_SENTINEL`].
    #[must_use]
    pub fn setup_probe(resources: &EngineResources) -> Self {
        let goal = format!("write({}), nl", quote_atom(SETUP_SENTINEL));
        Self::with_goal(resources, &goal)
    }

    /// Returns the directive text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn with_goal(resources: &EngineResources, goal: &str) -> Self {
        Self(format!(
            "(consult({}), consult({}), {goal}, halt)",
            quote_path(resources.rule_base()),
            quote_path(resources.grammar()),
        ))
    }
}

/// Quotes a path as an atom after normalising separators to `/`.
pub(crate) fn quote_path(path: &Path) -> String {
    quote_atom(&path.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::compile::QueryCompiler;
    use crate::normalize::normalize;

    fn resources() -> EngineResources {
        EngineResources::new(
            PathBuf::from("/srv/lez/kb.pl"),
            PathBuf::from("/srv/lez/dcg.pl"),
        )
    }

    #[test]
    fn query_directive_sequences_loading_before_the_goal() {
        let compiler = QueryCompiler::new("process_tokens").expect("valid predicate");
        let query = compiler.compile(&normalize("can my van enter")).expect("compile");
        let directive = Directive::query(&resources(), &query);
        assert_eq!(
            directive.as_str(),
            "(consult('/srv/lez/kb.pl'), consult('/srv/lez/dcg.pl'), \
             process_tokens(['can','my','van','enter']), halt)"
        );
    }

    #[test]
    fn setup_probe_writes_the_sentinel() {
        let directive = Directive::setup_probe(&resources());
        assert_eq!(
            directive.as_str(),
            "(consult('/srv/lez/kb.pl'), consult('/srv/lez/dcg.pl'), \
             write('LEZ SETUP OK'), nl, halt)"
        );
    }

    #[test]
    fn paths_with_spaces_and_quotes_are_quoted() {
        let quoted = quote_path(Path::new("/home/o'neil/my rules/kb.pl"));
        assert_eq!(quoted, "'/home/o''neil/my rules/kb.pl'");
    }

    #[test]
    fn backslash_separators_are_normalised() {
        let quoted = quote_path(Path::new("C:\\Users\\lez\\kb.pl"));
        assert_eq!(quoted, "'C:/Users/lez/kb.pl'");
    }
}
