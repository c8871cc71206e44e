//! Compilation of token sequences into engine queries.
//!
//! A compiled query calls a single entry predicate with one list argument:
//! every token becomes a quoted atom, in input order. Quoting is the only
//! place where user text crosses into the engine's syntax, so it escapes
//! everything the engine's reader could treat as a terminator or an escape
//! introducer.

use std::fmt;

use thiserror::Error;

use crate::normalize::TokenSequence;

/// Delimiter that opens and closes a quoted atom.
pub const ATOM_DELIMITER: char = '\'';

/// Errors raised while building a compiled query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The token sequence held no tokens.
    #[error("cannot compile an empty token sequence")]
    EmptyTokens,

    /// The configured entry predicate is not a plain engine atom.
    #[error("entry predicate '{name}' must start with a lowercase letter and contain only letters, digits or '_'")]
    InvalidPredicate {
        /// Predicate name that failed validation.
        name: String,
    },
}

/// A self-contained query string ready to be embedded in a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery(String);

impl CompiledQuery {
    /// Returns the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Builds queries for a fixed entry predicate.
///
/// # Example
///
/// ```
/// use lez_engine::{QueryCompiler, normalize};
///
/// let compiler = QueryCompiler::new("process_tokens").expect("valid predicate");
/// let query = compiler.compile(&normalize("can my van enter sw1a")).expect("tokens");
/// assert_eq!(query.as_str(), "process_tokens(['can','my','van','enter','sw1a'])");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCompiler {
    entry_predicate: String,
}

impl QueryCompiler {
    /// Creates a compiler for the given entry predicate.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidPredicate`] when the name would need
    /// quoting to be read as an atom.
    pub fn new(entry_predicate: impl Into<String>) -> Result<Self, CompileError> {
        let entry_predicate = entry_predicate.into();
        if !is_plain_atom(&entry_predicate) {
            return Err(CompileError::InvalidPredicate {
                name: entry_predicate,
            });
        }
        Ok(Self { entry_predicate })
    }

    /// Entry predicate named by compiled queries.
    #[must_use]
    pub fn entry_predicate(&self) -> &str {
        &self.entry_predicate
    }

    /// Compiles the tokens into `<predicate>(['t1','t2',...])`.
    ///
    /// Digit-only tokens are quoted like any other token so the grammar sees
    /// the literal text.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptyTokens`] for an empty sequence.
    pub fn compile(&self, tokens: &TokenSequence) -> Result<CompiledQuery, CompileError> {
        if tokens.is_empty() {
            return Err(CompileError::EmptyTokens);
        }

        let list = tokens
            .iter()
            .map(|token| quote_atom(token.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        Ok(CompiledQuery(format!("{}([{list}])", self.entry_predicate)))
    }
}

/// Wraps text in atom delimiters, escaping it for the engine's reader.
///
/// Embedded delimiters are doubled. Backslashes are doubled because the
/// reader treats them as escape introducers inside quoted atoms, and control
/// characters are written as `\xHH\` escapes.
#[must_use]
pub fn quote_atom(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len().saturating_add(2));
    quoted.push(ATOM_DELIMITER);
    for character in text.chars() {
        match character {
            ATOM_DELIMITER => {
                quoted.push(ATOM_DELIMITER);
                quoted.push(ATOM_DELIMITER);
            }
            '\\' => quoted.push_str("\\\\"),
            control if control.is_control() => {
                quoted.push_str(&format!("\\x{:x}\\", u32::from(control)));
            }
            other => quoted.push(other),
        }
    }
    quoted.push(ATOM_DELIMITER);
    quoted
}

fn is_plain_atom(name: &str) -> bool {
    let mut characters = name.chars();
    characters
        .next()
        .is_some_and(|first| first.is_ascii_lowercase())
        && characters.all(|rest| rest.is_ascii_alphanumeric() || rest == '_')
}

#[cfg(test)]
mod tests;
