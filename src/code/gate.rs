use std::fmt;

use log::debug;

use super::{generator::RandomSource, runner::RunListener};

/// Simulated approval stage, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authentication,
    AmountValidation,
    SecurityCode,
}

impl Stage {
    pub const ALL: [Stage; 3] = [
        Stage::Authentication,
        Stage::AmountValidation,
        Stage::SecurityCode,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authentication => "authenticity verification",
            Stage::AmountValidation => "amount validation",
            Stage::SecurityCode => "security code generation",
        };
        f.write_str(name)
    }
}

/// Decision of one [`PipelineGate::evaluate`] call.
///
/// An accepted iteration goes on to generate a record; a rejected one yields
/// nothing and names the first stage that did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Every stage passed.
    Accepted,
    /// The stage that failed; later stages were not evaluated.
    Rejected(Stage),
}

/// Three-stage probabilistic approval simulation.
///
/// A stage passes when a uniform draw from `[0, 1)` is below its
/// probability, so `1.0` always passes and `0.0` never does.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineGate {
    probabilities: [f64; 3],
}

impl PipelineGate {
    /// Probabilities must already be validated to lie within `[0, 1]`.
    pub fn new(probabilities: [f64; 3]) -> Self {
        Self { probabilities }
    }

    /// Probability that `stage` passes.
    pub fn probability(&self, stage: Stage) -> f64 {
        self.probabilities[stage as usize]
    }

    /// Runs the stages in [`Stage::ALL`] order for iteration `index`.
    ///
    /// Each stage consumes one draw from `source` and is announced to
    /// `listener` before and after the draw. Evaluation stops at the first
    /// stage that does not pass.
    ///
    /// # Returns
    /// - `GateOutcome::Accepted` when all three stages pass
    /// - `GateOutcome::Rejected(stage)` with the stage that failed
    ///
    /// # Example
    /// ```
    /// # use code_batch::code::{gate::{GateOutcome, PipelineGate, Stage}, generator::RandomSource, runner::NoopListener};
    /// let source = RandomSource::from_seed(42);
    ///
    /// let open = PipelineGate::new([1.0, 1.0, 1.0]);
    /// assert_eq!(open.evaluate(&source, &NoopListener, 1), GateOutcome::Accepted);
    ///
    /// let closed = PipelineGate::new([1.0, 1.0, 0.0]);
    /// assert_eq!(
    ///     closed.evaluate(&source, &NoopListener, 2),
    ///     GateOutcome::Rejected(Stage::SecurityCode)
    /// );
    /// ```
    pub fn evaluate(
        &self,
        source: &RandomSource,
        listener: &dyn RunListener,
        index: usize,
    ) -> GateOutcome {
        for stage in Stage::ALL {
            listener.on_stage_started(index, stage);
            let passed = source.unit() < self.probability(stage);
            listener.on_stage_finished(index, stage, passed);

            if !passed {
                debug!("Iteration {} rejected at {}", index, stage);
                return GateOutcome::Rejected(stage);
            }
        }
        GateOutcome::Accepted
    }
}
