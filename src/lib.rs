#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Code Batch

 A small batch pipeline that generates **sample** withdrawal-code records and
 appends them to a text file. Codes are random digits with a configured
 prefix; they carry no real-world validity and the random source is not
 cryptographically secure.

 ## Core Concepts

- **CodeConfig:** prefix, total code length, amount range, optional gate
  probabilities, record layout and retry policy. Three presets mirror the
  known script variants (`gated`, `extended`, `minimal`).
- **RandomFieldGenerator:** draws the code, the 4-digit verification code and
  the amount from a shared, optionally seeded, random source.
- **PipelineGate:** simulates authentication, amount validation and
  security-code generation; each stage passes with its configured probability.
- **RecordAssembler:** formats the fields into a `Record`.
- **CodeBatchRunner:** runs `n` iterations and collects accepted records into a
  `Batch`.
- **Step / Job:** a chunk-oriented step reads records from a runner, and writes
  them out with an `ItemWriter` such as the append-mode `TextItemWriter`.

 ## Features

| **Feature** | **Description**                                              |
|-------------|--------------------------------------------------------------|
| cli         | Enables the `code-batch` binary and the terminal `ui` module |
| logger      | Enables a logger `ItemWriter`, useful for debugging purposes |
| full        | Enables all available features                               |

 ## Getting Started

```rust
# use code_batch::{
#     code::{
#         config::{CodeConfig, Preset},
#         reader::CodeItemReaderBuilder,
#         runner::CodeBatchRunnerBuilder,
#     },
#     core::{
#         item::PassThroughProcessor,
#         job::{Job, JobBuilder},
#         step::StepBuilder,
#     },
#     error::BatchError,
#     item::text::text_writer::TextItemWriterBuilder,
# };
fn main() -> Result<(), BatchError> {
    let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Gated))
        .seed(42)
        .build()?;

    let reader = CodeItemReaderBuilder::new()
        .number_of_items(10)
        .build(&runner);

    let writer = TextItemWriterBuilder::new().from_writer(Vec::new());

    let step = StepBuilder::new("generate-codes")
        .chunk(10) // write every record at once
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .skip_limit(10) // a rejected code never fails the step
        .build()?;

    let job = JobBuilder::new().start(&step).build();
    let execution = job.run()?;

    let step_execution = &execution.step_executions[0];
    assert_eq!(step_execution.write_count + step_execution.read_error_count, 10);

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Code generation: configuration, random fields, gate, records and runner
pub mod code;

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of item writers (text file, logger)
pub mod item;

#[cfg(feature = "cli")]
/// Terminal presentation used by the `code-batch` binary
pub mod ui;
