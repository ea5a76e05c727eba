use std::cell::Cell;

use crate::{
    BatchError,
    core::item::{ItemReader, ItemReaderResult},
};

use super::{
    record::Record,
    runner::{CodeBatchRunner, IterationOutcome},
};

/// Largest chunk a generation step should buffer before writing.
pub const WRITE_CHUNK_SIZE: usize = 1000;

/// Chunk size for a step that reads `count` records: the whole run when it
/// is small, otherwise [`WRITE_CHUNK_SIZE`] so records are appended as they
/// are generated instead of being held in memory.
///
/// # Example
/// ```
/// # use code_batch::code::reader::{chunk_size_for, WRITE_CHUNK_SIZE};
/// assert_eq!(chunk_size_for(0), 1);
/// assert_eq!(chunk_size_for(25), 25);
/// assert_eq!(chunk_size_for(usize::MAX), WRITE_CHUNK_SIZE);
/// ```
pub fn chunk_size_for(count: usize) -> usize {
    count.clamp(1, WRITE_CHUNK_SIZE)
}

/// Reads the records of `number_of_items` runner iterations.
///
/// A rejected iteration surfaces as [`BatchError::Rejected`], which a step
/// counts as a read error and skips while below its skip limit.
pub struct CodeItemReader<'r, 'a> {
    runner: &'r CodeBatchRunner<'a>,
    number_of_items: usize,
    next_index: Cell<usize>,
}

impl ItemReader<Record> for CodeItemReader<'_, '_> {
    fn read(&self) -> ItemReaderResult<Record> {
        let index = self.next_index.get();
        if index > self.number_of_items {
            return Ok(None);
        }
        self.next_index.set(index + 1);

        match self.runner.iterate(index) {
            IterationOutcome::Accepted(record) => Ok(Some(record)),
            IterationOutcome::Rejected { stage, .. } => Err(BatchError::Rejected { index, stage }),
        }
    }
}

#[derive(Default)]
pub struct CodeItemReaderBuilder {
    number_of_items: usize,
}

impl CodeItemReaderBuilder {
    pub fn new() -> CodeItemReaderBuilder {
        CodeItemReaderBuilder { number_of_items: 0 }
    }

    pub fn number_of_items(mut self, number_of_items: usize) -> CodeItemReaderBuilder {
        self.number_of_items = number_of_items;
        self
    }

    pub fn build<'r, 'a>(self, runner: &'r CodeBatchRunner<'a>) -> CodeItemReader<'r, 'a> {
        CodeItemReader {
            runner,
            number_of_items: self.number_of_items,
            next_index: Cell::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CodeItemReaderBuilder, WRITE_CHUNK_SIZE, chunk_size_for};
    use crate::{
        BatchError,
        code::{
            config::{CodeConfig, Preset},
            gate::Stage,
            runner::CodeBatchRunnerBuilder,
        },
        core::item::ItemReader,
    };

    #[test]
    fn reader_should_stop_after_requested_items() {
        let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Extended))
            .seed(3)
            .build()
            .unwrap();
        let reader = CodeItemReaderBuilder::new().number_of_items(2).build(&runner);

        let first = reader.read().unwrap();
        assert!(first.is_some());
        assert!(first.unwrap().code().starts_with("112"));
        assert!(reader.read().unwrap().is_some());
        assert!(reader.read().unwrap().is_none());
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn rejected_iteration_should_be_a_read_error() {
        let config = CodeConfig {
            gate_stages: Some([1.0, 1.0, 0.0]),
            ..CodeConfig::from(Preset::Gated)
        };
        let runner = CodeBatchRunnerBuilder::new(config).seed(3).build().unwrap();
        let reader = CodeItemReaderBuilder::new().number_of_items(1).build(&runner);

        let result = reader.read();

        assert!(matches!(
            result,
            Err(BatchError::Rejected {
                index: 1,
                stage: Stage::SecurityCode
            })
        ));
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn empty_reader_should_be_exhausted() {
        let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Minimal))
            .build()
            .unwrap();
        let reader = CodeItemReaderBuilder::new().build(&runner);

        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn chunk_size_should_be_bounded_for_large_counts() {
        assert_eq!(chunk_size_for(1), 1);
        assert_eq!(chunk_size_for(WRITE_CHUNK_SIZE), WRITE_CHUNK_SIZE);
        assert_eq!(chunk_size_for(WRITE_CHUNK_SIZE + 1), WRITE_CHUNK_SIZE);
        assert_eq!(chunk_size_for(usize::MAX), WRITE_CHUNK_SIZE);
    }
}
