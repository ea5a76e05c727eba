use log::{debug, info, warn};

use crate::BatchError;

use super::{
    config::{CodeConfig, RetryPolicy},
    gate::{GateOutcome, PipelineGate, Stage},
    generator::{RandomFieldGenerator, RandomSource},
    record::{Record, RecordAssembler},
};

/// Per-iteration notifications emitted while a batch runs.
///
/// Every method has an empty default so listeners only implement what they
/// render. Indexes are 1-based.
pub trait RunListener {
    fn on_stage_started(&self, _index: usize, _stage: Stage) {}

    fn on_stage_finished(&self, _index: usize, _stage: Stage, _passed: bool) {}

    fn on_accepted(&self, _index: usize, _record: &Record) {}

    /// `retrying` tells whether the same index will be attempted again.
    fn on_rejected(&self, _index: usize, _stage: Stage, _retrying: bool) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RunListener for NoopListener {}

/// Result of a single runner iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    Accepted(Record),
    /// Last stage that failed and the number of attempts spent on the index.
    Rejected { stage: Stage, attempts: u32 },
}

/// Ordered records accepted during one run.
///
/// A batch remembers how many iterations were requested and how many of them
/// were rejected by the gate, so `len() + rejected() == requested()` always
/// holds. Records keep the order of their iteration index.
///
/// # Example
/// ```
/// # use code_batch::code::{config::{CodeConfig, Preset}, runner::CodeBatchRunnerBuilder};
/// let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Extended))
///     .seed(11)
///     .build()
///     .unwrap();
///
/// let batch = runner.run(4);
/// assert_eq!(batch.requested(), 4);
/// assert_eq!(batch.len() + batch.rejected(), batch.requested());
/// for record in &batch {
///     assert!(record.code().starts_with("112"));
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    records: Vec<Record>,
    requested: usize,
    rejected: usize,
}

impl Batch {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of iterations the run was asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Number of iterations that ended without a record.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'b> IntoIterator for &'b Batch {
    type Item = &'b Record;
    type IntoIter = std::slice::Iter<'b, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Generates records one iteration at a time, optionally behind a
/// [`PipelineGate`].
///
/// The generator and the gate draw from the same [`RandomSource`], so a
/// seeded runner replays the same sequence of gate decisions and fields.
/// Progress is reported to the [`RunListener`] given to the builder.
///
/// Use [`run`](CodeBatchRunner::run) to collect a whole [`Batch`] in memory,
/// or [`iterate`](CodeBatchRunner::iterate) (through
/// [`CodeItemReader`](super::reader::CodeItemReader)) to stream records into
/// a step.
pub struct CodeBatchRunner<'a> {
    config: CodeConfig,
    source: RandomSource,
    generator: RandomFieldGenerator,
    gate: Option<PipelineGate>,
    assembler: RecordAssembler,
    listener: &'a dyn RunListener,
}

impl CodeBatchRunner<'_> {
    pub fn config(&self) -> &CodeConfig {
        &self.config
    }

    /// Runs `n` iterations and collects the accepted records in order.
    ///
    /// With a gate the batch may hold fewer than `n` records; rejected
    /// indexes are never appended. Nothing is reserved up front, so `n` may
    /// be far larger than the number of records that fit in memory as long
    /// as the gate keeps the batch small.
    ///
    /// # Returns
    /// A [`Batch`] with `requested() == n`.
    pub fn run(&self, n: usize) -> Batch {
        info!("Generating {} codes", n);

        let mut batch = Batch {
            records: Vec::new(),
            requested: n,
            rejected: 0,
        };

        for index in 1..=n {
            match self.iterate(index) {
                IterationOutcome::Accepted(record) => batch.records.push(record),
                IterationOutcome::Rejected { .. } => batch.rejected += 1,
            }
        }

        info!(
            "Generated {} of {} codes ({} rejected)",
            batch.len(),
            n,
            batch.rejected
        );
        batch
    }

    /// Runs the gate (with the retry policy) and, on acceptance, generates
    /// and assembles one record.
    ///
    /// `index` is 1-based and only used for listener notifications and logs.
    /// Under [`RetryPolicy::Advance`] the gate runs once; under
    /// [`RetryPolicy::Retry`] it runs until it accepts or `max_attempts` is
    /// spent. Every rejection is reported through
    /// [`RunListener::on_rejected`], with `retrying` set when another attempt
    /// follows.
    ///
    /// # Returns
    /// - `IterationOutcome::Accepted(record)` when the gate let the index through
    /// - `IterationOutcome::Rejected { stage, attempts }` with the last failing
    ///   stage once no attempt is left
    ///
    /// # Example
    /// ```
    /// # use code_batch::code::{config::{CodeConfig, Preset}, runner::{CodeBatchRunnerBuilder, IterationOutcome}};
    /// let config = CodeConfig {
    ///     gate_stages: Some([1.0, 1.0, 1.0]),
    ///     ..CodeConfig::from(Preset::Gated)
    /// };
    /// let runner = CodeBatchRunnerBuilder::new(config).seed(3).build().unwrap();
    ///
    /// assert!(matches!(runner.iterate(1), IterationOutcome::Accepted(_)));
    /// ```
    pub fn iterate(&self, index: usize) -> IterationOutcome {
        let max_attempts = match self.config.retry {
            RetryPolicy::Advance => 1,
            RetryPolicy::Retry { max_attempts } => max_attempts,
        };

        let mut attempts = 0;
        loop {
            attempts += 1;

            let outcome = match &self.gate {
                Some(gate) => gate.evaluate(&self.source, self.listener, index),
                None => GateOutcome::Accepted,
            };

            match outcome {
                GateOutcome::Accepted => {
                    let record = self.assemble_record();
                    debug!("Iteration {} accepted: {}", index, record.code());
                    self.listener.on_accepted(index, &record);
                    return IterationOutcome::Accepted(record);
                }
                GateOutcome::Rejected(stage) => {
                    let retrying = attempts < max_attempts;
                    warn!(
                        "Iteration {} rejected at {} (attempt {}/{})",
                        index, stage, attempts, max_attempts
                    );
                    self.listener.on_rejected(index, stage, retrying);

                    if !retrying {
                        return IterationOutcome::Rejected { stage, attempts };
                    }
                }
            }
        }
    }

    fn assemble_record(&self) -> Record {
        let code = self.generator.generate_code(&self.config);
        let verification = self.generator.generate_verification_code();
        let amount = self.generator.generate_amount(&self.config.amount_range);
        self.assembler.assemble(code, verification, amount)
    }
}

/// Builder for [`CodeBatchRunner`].
///
/// ```
/// # use code_batch::code::{config::{CodeConfig, Preset}, runner::CodeBatchRunnerBuilder};
/// let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Minimal))
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let batch = runner.run(3);
/// assert_eq!(batch.len(), 3);
/// ```
pub struct CodeBatchRunnerBuilder<'a> {
    config: CodeConfig,
    seed: Option<u64>,
    source: Option<RandomSource>,
    listener: &'a dyn RunListener,
}

impl<'a> CodeBatchRunnerBuilder<'a> {
    pub fn new(config: CodeConfig) -> Self {
        Self {
            config,
            seed: None,
            source: None,
            listener: &NoopListener,
        }
    }

    /// Seeds the random source so runs are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Uses an existing random source; takes precedence over `seed`.
    pub fn source(mut self, source: RandomSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn listener(mut self, listener: &'a dyn RunListener) -> Self {
        self.listener = listener;
        self
    }

    pub fn build(self) -> Result<CodeBatchRunner<'a>, BatchError> {
        self.config.validate()?;

        let source = match (self.source, self.seed) {
            (Some(source), _) => source,
            (None, Some(seed)) => RandomSource::from_seed(seed),
            (None, None) => RandomSource::from_os(),
        };

        Ok(CodeBatchRunner {
            generator: RandomFieldGenerator::new(source.clone()),
            gate: self.config.gate_stages.map(PipelineGate::new),
            assembler: RecordAssembler::new(&self.config),
            source,
            config: self.config,
            listener: self.listener,
        })
    }
}
