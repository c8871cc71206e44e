//! Crate-level pipeline tests and BDD scenarios.

use std::cell::RefCell;

use crate::compile::QueryCompiler;
use crate::error::EngineError;
use crate::invoke::{
    EngineExecutor, EngineInvocation, EngineInvoker, EngineResources, EngineSettings,
    InvocationResult,
};
use crate::outcome::Outcome;
use crate::pipeline::{NO_USABLE_QUERY, QueryPipeline};


/// Replays canned results and records every invocation it receives.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    results: RefCell<Vec<Result<InvocationResult, EngineError>>>,
    seen: RefCell<Vec<EngineInvocation>>,
}

impl ScriptedExecutor {
    pub(crate) fn push(&self, result: Result<InvocationResult, EngineError>) {
        self.results.borrow_mut().push(result);
    }

    pub(crate) fn invocations(&self) -> Vec<EngineInvocation> {
        self.seen.borrow().clone()
    }
}

impl EngineExecutor for ScriptedExecutor {
    fn run(&self, invocation: &EngineInvocation) -> Result<InvocationResult, EngineError> {
        self.seen.borrow_mut().push(invocation.clone());
        let mut results = self.results.borrow_mut();
        if results.is_empty() {
            panic!("unexpected engine invocation: {invocation:?}");
        }
        results.remove(0)
    }
}

pub(crate) fn pipeline<E: EngineExecutor>(executor: E) -> QueryPipeline<E> {
    let settings = EngineSettings::new(
        "swipl",
        EngineResources::new("/srv/lez/kb.pl", "/srv/lez/dcg.pl"),
    );
    QueryPipeline::new(
        QueryCompiler::new("process_tokens").expect("valid predicate"),
        EngineInvoker::new(settings, executor),
    )
}

#[test]
fn empty_input_never_reaches_the_engine() {
    let executor = ScriptedExecutor::default();
    let pipeline = pipeline(&executor);
    for input in ["", "   ", "???"] {
        assert_eq!(
            pipeline.ask(input),
            Outcome::RuntimeError(NO_USABLE_QUERY.to_owned())
        );
    }
    assert!(executor.invocations().is_empty());
}

#[test]
fn pipeline_stays_usable_after_a_runtime_error() {
    let executor = ScriptedExecutor::default();
    executor.push(Ok(InvocationResult::exited(1, "", "Warning: goal failed")));
    executor.push(Ok(InvocationResult::exited(0, "You may enter.\n", "")));
    let pipeline = pipeline(&executor);

    assert!(matches!(
        pipeline.ask("can my tractor enter"),
        Outcome::RuntimeError(_)
    ));
    assert_eq!(
        pipeline.ask("can my van enter"),
        Outcome::Success(String::from("You may enter."))
    );
    assert_eq!(executor.invocations().len(), 2);
}

#[test]
fn every_query_gets_its_own_invocation() {
    let executor = ScriptedExecutor::default();
    executor.push(Ok(InvocationResult::exited(0, "first", "")));
    executor.push(Ok(InvocationResult::exited(0, "second", "")));
    let pipeline = pipeline(&executor);

    let _ = pipeline.ask("a");
    let _ = pipeline.ask("b");

    let directives: Vec<String> = executor
        .invocations()
        .iter()
        .filter_map(|invocation| invocation.args().last().cloned())
        .collect();
    assert_eq!(directives.len(), 2);
    assert!(directives[0].contains("process_tokens(['a'])"));
    assert!(directives[1].contains("process_tokens(['b'])"));
}

#[test]
fn spawn_failures_during_queries_are_runtime_errors() {
    let executor = ScriptedExecutor::default();
    executor.push(Err(EngineError::from_spawn(
        "swipl",
        std::io::Error::from(std::io::ErrorKind::NotFound),
    )));
    let pipeline = pipeline(&executor);

    let outcome = pipeline.ask("can my van enter");
    assert!(
        matches!(&outcome, Outcome::RuntimeError(message) if message.contains("swipl")),
        "unexpected outcome: {outcome:?}"
    );
}
