use std::{
    cell::RefCell,
    io::{self, Write},
    thread,
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};

use super::{Pacing, Renderer, Tone};

/// Width of separator lines.
pub const LINE_WIDTH: usize = 60;

/// Paced, colored output to a writer (usually stdout).
pub struct Console<W: Write> {
    out: RefCell<W>,
    renderer: Box<dyn Renderer>,
    pacing: Pacing,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, renderer: Box<dyn Renderer>, pacing: Pacing) -> Self {
        Self {
            out: RefCell::new(out),
            renderer,
            pacing,
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        self.renderer.paint(text, tone)
    }

    pub fn print_line(&self, ch: char, tone: Tone) -> io::Result<()> {
        let line: String = std::iter::repeat_n(ch, LINE_WIDTH).collect();
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", self.renderer.paint(&line, tone))
    }

    /// Writes `text` without a newline and flushes, for prompts.
    pub fn print_inline(&self, text: &str, tone: Tone) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        write!(out, "{}", self.renderer.paint(text, tone))?;
        out.flush()
    }

    pub fn println(&self, text: &str, tone: Tone) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", self.renderer.paint(text, tone))
    }

    /// Prints `text` one character at a time, then a newline.
    pub fn slow_print(&self, text: &str, tone: Tone) -> io::Result<()> {
        self.slow_print_with(text, tone, self.pacing.char_delay)
    }

    pub fn slow_print_with(&self, text: &str, tone: Tone, delay: Duration) -> io::Result<()> {
        let painted = self.renderer.paint(text, tone);
        let mut out = self.out.borrow_mut();

        if delay.is_zero() {
            return writeln!(out, "{}", painted);
        }

        for ch in painted.chars() {
            write!(out, "{}", ch)?;
            out.flush()?;
            thread::sleep(delay);
        }
        writeln!(out)
    }

    /// Header and message framed by separator lines.
    pub fn display_message(
        &self,
        header: &str,
        message: &str,
        header_tone: Tone,
        message_tone: Tone,
    ) -> io::Result<()> {
        self.print_line('-', header_tone)?;
        self.slow_print(header, header_tone)?;
        self.print_line('-', header_tone)?;
        self.slow_print(message, message_tone)?;
        self.print_line('-', header_tone)
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        self.display_message("Error", message, Tone::Title, Tone::Failure)
    }

    /// Shows a spinner next to `text` for `duration`.
    ///
    /// With a zero duration the text is printed once and nothing blocks.
    pub fn loading(&self, text: &str, duration: Duration) -> io::Result<()> {
        if duration.is_zero() {
            return self.println(text, Tone::Rule);
        }

        let style = ProgressStyle::default_spinner()
            .tick_chars("|/-\\ ")
            .template("{msg} {spinner:.blue}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(text.to_string());
        spinner.enable_steady_tick(Duration::from_millis(250));
        thread::sleep(duration);
        spinner.finish_and_clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PlainRenderer;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), Box::new(PlainRenderer), Pacing::none())
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn display_message_should_frame_header_and_message() {
        let console = console();
        console
            .display_message("Code 1", "Bank: Demo Bank", Tone::Title, Tone::Success)
            .unwrap();

        let line = "-".repeat(LINE_WIDTH);
        assert_eq!(
            output(console),
            format!("{line}\nCode 1\n{line}\nBank: Demo Bank\n{line}\n")
        );
    }

    #[test]
    fn slow_print_should_print_every_character() {
        let console = console();
        console
            .slow_print_with("abc", Tone::Prompt, Duration::from_millis(1))
            .unwrap();

        assert_eq!(output(console), "abc\n");
    }

    #[test]
    fn loading_without_duration_should_print_text() {
        let console = console();
        console.loading("Loading system", Duration::ZERO).unwrap();

        assert_eq!(output(console), "Loading system\n");
    }

    #[test]
    fn print_inline_should_not_end_line() {
        let console = console();
        console.print_inline("Count: ", Tone::Prompt).unwrap();

        assert_eq!(output(console), "Count: ");
    }
}
