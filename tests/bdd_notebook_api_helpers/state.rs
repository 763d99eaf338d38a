//! Scenario state for notebook API behavioural tests.

use std::sync::Arc;

use notebook_harness::config::{ClientSettings, FixtureSettings, ServerSettings};
use notebook_harness::error::Result as HarnessResult;
use notebook_harness::fixtures::NotebookFixtures;
use notebook_harness::http::HttpExecutor;
use notebook_harness::scenario::ScenarioContext;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::StepResult;
use crate::stub_server::StubServer;

#[derive(Default, ScenarioState)]
pub(crate) struct NotebookApiState {
    pub(crate) server: Slot<Arc<StubServer>>,
    pub(crate) executor: Slot<Arc<HttpExecutor>>,
    pub(crate) context: Slot<ScenarioContext>,
    /// Message of the last step error a scenario expected.
    pub(crate) failure: Slot<String>,
}

#[fixture]
pub(crate) fn notebook_api_state() -> NotebookApiState {
    let state = NotebookApiState::default();
    state.context.set(ScenarioContext::new());
    state
}

impl NotebookApiState {
    /// Point a new executor at the running stub with the given timeout.
    pub(crate) fn connect(&self, timeout_ms: u64) -> StepResult<()> {
        let server = self
            .server
            .get()
            .ok_or_else(|| String::from("stub server should be running"))?;
        let executor = HttpExecutor::new(
            &ServerSettings::new("127.0.0.1", server.port()),
            &ClientSettings { timeout_ms },
        )
        .map_err(|e| e.to_string())?;
        self.executor.set(Arc::new(executor));
        Ok(())
    }

    pub(crate) fn executor(&self) -> StepResult<Arc<HttpExecutor>> {
        self.executor
            .get()
            .ok_or_else(|| String::from("executor should be set"))
    }

    pub(crate) fn server(&self) -> StepResult<Arc<StubServer>> {
        self.server
            .get()
            .ok_or_else(|| String::from("stub server should be running"))
    }

    pub(crate) fn context(&self) -> StepResult<ScenarioContext> {
        self.context
            .get()
            .ok_or_else(|| String::from("scenario context should be set"))
    }

    /// Run `step` against the scenario context and store the context back,
    /// whether or not the step failed.
    pub(crate) fn with_context<F>(&self, step: F) -> StepResult<()>
    where
        F: FnOnce(&mut ScenarioContext) -> HarnessResult<()>,
    {
        let mut ctx = self.context.take().unwrap_or_default();
        let outcome = step(&mut ctx);
        self.context.set(ctx);
        outcome.map_err(|e| e.to_string())
    }

    /// As [`Self::with_context`], with the real fixture API at hand.
    pub(crate) fn with_fixtures<F>(&self, step: F) -> StepResult<()>
    where
        F: FnOnce(&mut ScenarioContext, &NotebookFixtures<'_>) -> HarnessResult<()>,
    {
        let executor = self.executor()?;
        let api = NotebookFixtures::new(&executor, FixtureSettings::default());
        self.with_context(|ctx| step(ctx, &api))
    }
}
