use std::env::temp_dir;

use code_batch::{
    code::{
        config::{CodeConfig, Preset},
        reader::CodeItemReaderBuilder,
        runner::CodeBatchRunnerBuilder,
    },
    core::{
        item::PassThroughProcessor,
        job::{Job, JobBuilder},
        step::StepBuilder,
    },
    error::BatchError,
    item::text::text_writer::TextItemWriterBuilder,
};

use log::info;

fn main() -> Result<(), BatchError> {
    env_logger::init();

    info!("Starting code generation");

    let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Extended)).build()?;

    let reader = CodeItemReaderBuilder::new()
        .number_of_items(10)
        .build(&runner);

    let path = temp_dir().join("example-codes.txt");
    let writer = TextItemWriterBuilder::new().from_path(&path)?;

    let step = StepBuilder::new("generate-codes")
        .chunk(1000)
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .build()?;

    let job = JobBuilder::new().start(&step).build();
    let execution = job.run()?;

    info!("Time elapsed is: {:?}", execution.duration);
    info!("Codes appended to {}", path.display());
    Ok(())
}
