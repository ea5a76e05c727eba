/// Newline-delimited text output.
///
/// [`TextItemWriter`](text_writer::TextItemWriter) renders every item through
/// its `Display` implementation and terminates it with a newline. Multi-line
/// items therefore occupy several lines, and nothing separates two items other
/// than that trailing newline. Files are opened in append mode, so successive
/// runs accumulate in the same file and a run with no items leaves it
/// untouched.
///
/// # Examples
///
/// ```
/// use code_batch::core::item::ItemWriter;
/// use code_batch::item::text::text_writer::TextItemWriterBuilder;
///
/// let writer = TextItemWriterBuilder::new().from_writer(Vec::new());
///
/// writer.write(&["first", "second\nline"]).unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "first\nsecond\nline\n");
/// ```
pub mod text_writer;
