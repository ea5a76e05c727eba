use code_batch::{
    code::{
        config::{CodeConfig, Preset, RetryPolicy},
        reader::CodeItemReaderBuilder,
        runner::CodeBatchRunnerBuilder,
    },
    core::{
        item::PassThroughProcessor,
        step::{Step, StepBuilder, StepExecution, StepStatus},
    },
    error::BatchError,
    item::logger::LoggerWriter,
};

fn main() -> Result<(), BatchError> {
    env_logger::init();

    let config = CodeConfig {
        gate_stages: Some([0.8, 0.9, 1.0]),
        retry: RetryPolicy::Retry { max_attempts: 3 },
        ..CodeConfig::from(Preset::Gated)
    };

    let runner = CodeBatchRunnerBuilder::new(config).seed(2024).build()?;

    let reader = CodeItemReaderBuilder::new()
        .number_of_items(20)
        .build(&runner);

    let writer = LoggerWriter;

    let step = StepBuilder::new("gated-codes")
        .chunk(5)
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .skip_limit(20) // rejected codes are skipped, never fatal
        .build()?;

    let mut execution = StepExecution::new(step.get_name());
    step.execute(&mut execution)?;

    assert!(StepStatus::Success == execution.status);
    println!(
        "{} codes logged, {} rejected after retries",
        execution.write_count, execution.read_error_count
    );

    Ok(())
}
