use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;

use super::{RunOutcome, TrialOrchestrator};

impl<B, E> TrialOrchestrator<B, E>
where
    B: Backend + Send + 'static,
    E: Evaluator + Send + 'static,
{
    /// Run the loop inside the tokio blocking pool.
    ///
    /// The loop itself stays sequential; [`spawn_blocking`](tokio::task::spawn_blocking)
    /// keeps the async runtime responsive while evaluations run. Stop it
    /// through the config's [`StopSignal`](crate::StopSignal).
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskError` if the blocking task panics, and otherwise
    /// the same errors as [`run`](Self::run).
    ///
    /// # Examples
    ///
    /// ```
    /// use trial_orchestrator::prelude::*;
    ///
    /// # #[cfg(feature = "async")]
    /// # async fn example() -> trial_orchestrator::Result<()> {
    /// let orchestrator = TrialOrchestrator::builder(MemoryBackend::new(), |p: &[f64], _: u32| {
    ///     Ok::<_, Error>(Evaluation::new(vec![p[0].abs()]))
    /// })
    /// .variable(Variable::float("x", -1.0, 1.0))
    /// .objective("f")
    /// .config(RunConfig::new(10))
    /// .build()?;
    ///
    /// let outcome = orchestrator.run_async().await?;
    /// assert_eq!(outcome.end_state, EndState::AllTrialsCompleted);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_async(self) -> Result<RunOutcome> {
        tokio::task::spawn_blocking(move || {
            let mut orchestrator = self;
            orchestrator.run()
        })
        .await
        .map_err(|e| Error::TaskError(e.to_string()))?
    }
}
