//! Query compilation pipeline for the low-emission zone access checker.
//!
//! A user describes a vehicle and a zone in free text; this crate turns that
//! text into a query for an external rule-based inference engine, runs the
//! engine in a fresh process and classifies what it printed. The rule base
//! and grammar that decide eligibility live outside this crate and are only
//! consulted by the engine.
//!
//! # Architecture
//!
//! ```text
//! raw text ─ normalize ─▶ TokenSequence ─ QueryCompiler ─▶ CompiledQuery
//!   ─ EngineInvoker ─▶ InvocationResult ─ classify ─▶ Outcome
//! ```
//!
//! - [`normalize`] folds case, drops noise characters and splits words.
//! - [`QueryCompiler`] quotes every token and wraps the list in a call to
//!   the entry predicate.
//! - [`EngineInvoker`] builds the directive and hands it to an
//!   [`EngineExecutor`]; [`process::ProcessExecutor`] spawns one isolated
//!   process per call.
//! - [`classify`] maps the exit status and streams onto an [`Outcome`].
//!
//! [`QueryPipeline`] composes the stages behind a single `ask` call.

pub mod classify;
pub mod compile;
pub mod error;
pub mod invoke;
pub mod normalize;
pub mod outcome;
pub mod pipeline;
pub mod process;

#[cfg(test)]
mod tests;

pub use self::classify::{ERROR_MARKER, InvocationContext, classify};
pub use self::compile::{CompileError, CompiledQuery, QueryCompiler, quote_atom};
pub use self::error::EngineError;
pub use self::invoke::{
    Directive, EngineExecutor, EngineInvocation, EngineInvoker, EngineResources, EngineSettings,
    InvocationResult, SETUP_SENTINEL, Termination,
};
pub use self::normalize::{Token, TokenSequence, normalize};
pub use self::outcome::{Outcome, OutcomeKind};
pub use self::pipeline::{NO_USABLE_QUERY, QueryPipeline};
pub use self::process::ProcessExecutor;
