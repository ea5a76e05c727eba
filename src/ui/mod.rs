//! Terminal presentation: colors, paced output, spinners and prompts.
//!
//! Nothing in [`crate::code`] depends on this module; the runner only emits
//! [`RunListener`](crate::code::runner::RunListener) notifications, which
//! [`listener::ConsoleListener`] turns into output.

use std::time::Duration;

use colored::Colorize;

pub mod console;

pub mod listener;

pub mod prompt;

/// Semantic color of a piece of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Banner frame.
    Header,
    /// Separator lines.
    Rule,
    /// Questions asked to the user.
    Prompt,
    Success,
    Failure,
    /// Message headers.
    Title,
    Notice,
    Done,
}

/// Turns text into its on-screen representation.
pub trait Renderer {
    fn paint(&self, text: &str, tone: Tone) -> String;
}

/// ANSI colors through `colored`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColoredRenderer;

impl Renderer for ColoredRenderer {
    fn paint(&self, text: &str, tone: Tone) -> String {
        let painted = match tone {
            Tone::Header => text.bright_magenta(),
            Tone::Rule => text.bright_blue(),
            Tone::Prompt => text.bright_cyan(),
            Tone::Success => text.bright_green(),
            Tone::Failure => text.bright_red(),
            Tone::Title => text.cyan().bold(),
            Tone::Notice => text.yellow().bold(),
            Tone::Done => text.green().bold(),
        };
        painted.to_string()
    }
}

/// Leaves text untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

/// Cosmetic delays. None of them affect what gets generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay between characters of slow-printed text.
    pub char_delay: Duration,
    /// Spinner time for each gate stage.
    pub stage_duration: Duration,
    /// Spinner time of the start-up banner.
    pub loading_duration: Duration,
}

impl Pacing {
    pub fn animated() -> Self {
        Self {
            char_delay: Duration::from_millis(50),
            stage_duration: Duration::from_millis(3500),
            loading_duration: Duration::from_secs(2),
        }
    }

    pub fn none() -> Self {
        Self {
            char_delay: Duration::ZERO,
            stage_duration: Duration::ZERO,
            loading_duration: Duration::ZERO,
        }
    }
}
