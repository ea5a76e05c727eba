use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

/// Upper bound on the buffer reserved up front for a chunk; larger chunks
/// grow as items are read.
const MAX_PREALLOCATED_ITEMS: usize = 1024;

/// Outcome of reading one chunk.
#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The reader is exhausted; the chunk may still hold items.
    Finished,
    /// The chunk reached its configured size.
    Full,
}

/// State of a step run; after a failure it names the failing phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    Starting,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// Counters and timing of a single step run.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step instance
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of errors encountered during processing
    pub process_error_count: usize,
    /// Number of errors encountered during writing
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            write_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
        }
    }
}

pub trait Step {
    /// Executes the step.
    ///
    /// This method represents the main operation of the step. It coordinates
    /// reading items, processing them, and writing them out.
    ///
    /// # Returns
    /// - `Ok(())`: The step completed successfully
    /// - `Err(BatchError)`: The step failed; `step_execution` holds the counters
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn get_name(&self) -> &str;
}

/// Step that reads items, processes them, and writes them chunk by chunk.
///
/// Read and process errors are skipped and counted until their total exceeds
/// the skip limit. Write errors, including a failed flush, always stop the
/// step. A failure is returned as [`BatchError::Step`] wrapping the error
/// that caused it, while the [`StepExecution`] keeps the counters and the
/// failing phase.
///
/// # Example
/// ```
/// # use code_batch::{core::{item::PassThroughProcessor, step::{Step, StepBuilder, StepExecution, StepStatus}}, item::text::text_writer::TextItemWriterBuilder};
/// # use code_batch::code::{config::{CodeConfig, Preset}, reader::CodeItemReaderBuilder, runner::CodeBatchRunnerBuilder};
/// let runner = CodeBatchRunnerBuilder::new(CodeConfig::from(Preset::Minimal))
///     .seed(1)
///     .build()
///     .unwrap();
/// let reader = CodeItemReaderBuilder::new().number_of_items(3).build(&runner);
/// let writer = TextItemWriterBuilder::new().from_writer(Vec::new());
///
/// let step = StepBuilder::new("codes")
///     .chunk(2)
///     .reader(&reader)
///     .processor(&PassThroughProcessor)
///     .writer(&writer)
///     .build()
///     .unwrap();
///
/// let mut execution = StepExecution::new(step.get_name());
/// step.execute(&mut execution).unwrap();
/// assert_eq!(execution.status, StepStatus::Success);
/// assert_eq!(execution.write_count, 3);
/// ```
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: usize,
    /// Maximum number of read and process errors skipped before failing the step
    skip_limit: usize,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = match self.writer.open() {
            Ok(()) => self.run_chunks(step_execution),
            Err(error) => {
                warn!("Unable to open writer: {}", error);
                step_execution.status = StepStatus::WriteError;
                Err(error)
            }
        };

        if let Err(error) = self.writer.close() {
            warn!("Non-fatal error: {}", error);
        }

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        result.map_err(|error| BatchError::Step {
            name: step_execution.name.clone(),
            source: Box::new(error),
        })
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    /// Reads, processes and writes chunks until the reader is exhausted.
    ///
    /// # Returns
    /// - `Ok(())` once the last chunk is written; the status is `Success`
    /// - `Err(BatchError)`: the error that stopped the step; the status tells
    ///   which phase failed
    fn run_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        loop {
            let (read_items, chunk_status) =
                self.read_chunk(step_execution).inspect_err(|_| {
                    step_execution.status = StepStatus::ReadError;
                })?;

            let processed_items = self
                .process_chunk(step_execution, &read_items)
                .inspect_err(|_| step_execution.status = StepStatus::ProcessorError)?;

            self.write_chunk(step_execution, &processed_items)
                .inspect_err(|_| step_execution.status = StepStatus::WriteError)?;

            if chunk_status == ChunkStatus::Finished {
                step_execution.status = StepStatus::Success;
                return Ok(());
            }
        }
    }

    /// Reads a chunk of items from the reader.
    ///
    /// Reading stops when the chunk is full, when the reader is exhausted, or
    /// when the skip limit is exceeded.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk holds `chunk_size` items
    /// - `Ok((items, ChunkStatus::Finished))`: there are no more items to read
    /// - `Err(BatchError)`: an error occurred and skip limit was reached
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size.min(MAX_PREALLOCATED_ITEMS));

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size {
                        debug!("End reading chunk: FULL");
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(error) => {
                    warn!("Error reading item: {}", error);
                    step_execution.read_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }
    }

    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());
        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(processed_item) => result.push(processed_item),
                Err(error) => {
                    warn!("Error processing item: {}", error);
                    step_execution.process_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Writes then flushes a chunk. A failed flush counts as a failed write.
    ///
    /// Write failures are never skipped: the items of the chunk are counted
    /// as write errors and the error is returned whatever the skip limit.
    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", processed_items.len());

        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        let result = self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                Ok(())
            }
            Err(error) => {
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += processed_items.len();
                Err(error)
            }
        }
    }

    /// Only read and process errors are skippable.
    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count + step_execution.process_error_count > self.skip_limit
    }
}

pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: usize,
    skip_limit: usize,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 10,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of read and process errors tolerated; write errors are never skipped.
    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    /// Builds the step.
    ///
    /// # Errors
    /// [`BatchError::Configuration`] when the chunk size is zero or the
    /// reader, processor or writer is missing.
    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk size must be at least 1".to_string(),
            ));
        }

        let missing = |part: &str| {
            BatchError::Configuration(format!("{} is required for building a step", part))
        };

        Ok(ChunkOrientedStep {
            name: self.name,
            reader: self.reader.ok_or_else(|| missing("Reader"))?,
            processor: self.processor.ok_or_else(|| missing("Processor"))?,
            writer: self.writer.ok_or_else(|| missing("Writer"))?,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
        })
    }
}

/// Entry point for building steps.
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Step with a random name.
    pub fn unnamed() -> Self {
        Self::new(&build_name())
    }

    pub fn chunk<'a, I, O>(self, chunk_size: usize) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::core::item::{ItemReaderResult, ItemWriterResult, PassThroughProcessor};

    /// Yields `items` in order; entries set to `None` fail with a read error.
    struct ScriptedReader {
        items: Vec<Option<u32>>,
        position: Cell<usize>,
    }

    impl ScriptedReader {
        fn new(items: Vec<Option<u32>>) -> Self {
            Self {
                items,
                position: Cell::new(0),
            }
        }
    }

    impl ItemReader<u32> for ScriptedReader {
        fn read(&self) -> ItemReaderResult<u32> {
            let position = self.position.get();
            if position >= self.items.len() {
                return Ok(None);
            }
            self.position.set(position + 1);
            match self.items[position] {
                Some(item) => Ok(Some(item)),
                None => Err(BatchError::ItemReader(format!("bad item at {}", position))),
            }
        }
    }

    #[derive(Default)]
    struct CollectingWriter {
        chunks: RefCell<Vec<Vec<u32>>>,
        fail: bool,
    }

    impl ItemWriter<u32> for CollectingWriter {
        fn write(&self, items: &[u32]) -> ItemWriterResult {
            if self.fail {
                return Err(BatchError::ItemWriter("disk full".to_string()));
            }
            self.chunks.borrow_mut().push(items.to_vec());
            Ok(())
        }
    }

    #[test]
    fn step_should_write_items_in_chunks() {
        let reader = ScriptedReader::new(vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("numbers")
            .chunk(2)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        let result = step.execute(&mut execution);

        assert!(result.is_ok());
        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 5);
        assert_eq!(execution.write_count, 5);
        assert_eq!(
            *writer.chunks.borrow(),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
    }

    #[test]
    fn step_should_skip_read_errors_below_limit() {
        let reader = ScriptedReader::new(vec![Some(1), None, Some(3), None]);
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("numbers")
            .chunk(10)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .skip_limit(2)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        assert!(step.execute(&mut execution).is_ok());
        assert_eq!(execution.read_error_count, 2);
        assert_eq!(*writer.chunks.borrow(), vec![vec![1, 3]]);
    }

    #[test]
    fn step_should_fail_when_skip_limit_is_exceeded() {
        let reader = ScriptedReader::new(vec![Some(1), None, None]);
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("numbers")
            .chunk(10)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .skip_limit(1)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        let result = step.execute(&mut execution);

        assert!(matches!(result, Err(BatchError::Step { ref name, .. }) if name == "numbers"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("bad item at 2")
        );
        assert_eq!(execution.status, StepStatus::ReadError);
        assert!(writer.chunks.borrow().is_empty());
    }

    #[test]
    fn step_should_report_write_error() {
        let reader = ScriptedReader::new(vec![Some(1)]);
        let writer = CollectingWriter {
            fail: true,
            ..Default::default()
        };

        let step = StepBuilder::new("numbers")
            .chunk(1)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        let error = step.execute(&mut execution).unwrap_err();

        assert_eq!(error.to_string(), "Step numbers failed: ItemWriter from: disk full");
        assert_eq!(execution.status, StepStatus::WriteError);
        assert_eq!(execution.write_error_count, 1);
        assert_eq!(execution.write_count, 0);
    }

    #[test]
    fn write_error_should_fail_step_even_within_skip_limit() {
        let reader = ScriptedReader::new(vec![Some(1), Some(2), Some(3)]);
        let writer = CollectingWriter {
            fail: true,
            ..Default::default()
        };

        let step = StepBuilder::new("numbers")
            .chunk(3)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .skip_limit(3)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        let result = step.execute(&mut execution);

        assert!(matches!(
            result,
            Err(BatchError::Step { ref source, .. }) if matches!(**source, BatchError::ItemWriter(_))
        ));
        assert_eq!(execution.status, StepStatus::WriteError);
        assert_eq!(execution.write_error_count, 3);
    }

    #[test]
    fn huge_chunk_size_should_not_reserve_chunk_up_front() {
        let reader = ScriptedReader::new(vec![Some(1), Some(2)]);
        let writer = CollectingWriter::default();

        let step = StepBuilder::new("numbers")
            .chunk(usize::MAX)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        assert!(step.execute(&mut execution).is_ok());
        assert_eq!(*writer.chunks.borrow(), vec![vec![1, 2]]);
    }

    #[test]
    fn empty_reader_should_succeed_without_writing() {
        let reader = ScriptedReader::new(vec![]);
        let writer = CollectingWriter::default();

        let step = StepBuilder::unnamed()
            .chunk(3)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new(step.get_name());
        assert!(step.execute(&mut execution).is_ok());
        assert!(writer.chunks.borrow().is_empty());
    }

    #[test]
    fn builder_should_reject_missing_writer() {
        let reader = ScriptedReader::new(vec![]);

        let result = StepBuilder::new("incomplete")
            .chunk::<u32, u32>(1)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .build();

        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }

    #[test]
    fn builder_should_reject_zero_chunk_size() {
        let reader = ScriptedReader::new(vec![]);
        let writer = CollectingWriter::default();

        let result = StepBuilder::new("zero")
            .chunk(0)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build();

        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }
}
