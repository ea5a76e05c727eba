use std::{
    cell::RefCell,
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// Writes each item's `Display` output followed by a newline.
///
/// Output goes through a [`BufWriter`]; `write` only buffers and `flush`
/// pushes the buffer to the underlying writer. A chunk-oriented step calls
/// both for every chunk, so I/O errors surface at the latest on the flush of
/// the chunk that caused them.
///
/// Errors are reported as [`BatchError::ItemWriter`] carrying the I/O
/// error's message.
///
/// # Example
/// ```
/// # use code_batch::{core::item::ItemWriter, item::text::text_writer::TextItemWriterBuilder};
/// let writer = TextItemWriterBuilder::new().from_writer(Vec::new());
///
/// writer.write(&["first", "second"]).unwrap();
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(text, "first\nsecond\n");
/// ```
pub struct TextItemWriter<W: Write> {
    stream: RefCell<BufWriter<W>>,
}

impl<W: Write, O: Display> ItemWriter<O> for TextItemWriter<W> {
    fn write(&self, items: &[O]) -> ItemWriterResult {
        let mut stream = self.stream.borrow_mut();
        for item in items {
            writeln!(stream, "{}", item).map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        debug!("Buffered {} text items", items.len());
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> TextItemWriter<W> {
    /// Flushes the buffer and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, BatchError> {
        self.stream
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.error().to_string()))
    }
}

/// Builder for [`TextItemWriter`].
///
/// Files are opened in append mode unless [`append(false)`](Self::append) is
/// set, in which case they are truncated.
pub struct TextItemWriterBuilder {
    append: bool,
}

impl Default for TextItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextItemWriterBuilder {
    pub fn new() -> TextItemWriterBuilder {
        TextItemWriterBuilder { append: true }
    }

    /// Append to an existing file (the default) or truncate it.
    pub fn append(mut self, yes: bool) -> TextItemWriterBuilder {
        self.append = yes;
        self
    }

    /// Opens or creates the file at `path`.
    ///
    /// Fails with [`BatchError::ItemWriter`] carrying the I/O error message
    /// when the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<TextItemWriter<File>, BatchError> {
        let path = path.as_ref();
        let file = File::options()
            .create(true)
            .append(self.append)
            .write(true)
            .truncate(!self.append)
            .open(path)
            .map_err(|error| BatchError::ItemWriter(format!("{}: {}", path.display(), error)))?;

        Ok(self.from_writer(file))
    }

    /// Wraps any [`Write`] implementation, for instance a `Vec<u8>` in tests.
    pub fn from_writer<W: Write>(self, wtr: W) -> TextItemWriter<W> {
        TextItemWriter {
            stream: RefCell::new(BufWriter::new(wtr)),
        }
    }
}
