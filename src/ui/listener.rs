use std::io::{self, Write};

use log::warn;

use crate::code::{gate::Stage, record::Record, runner::RunListener};

use super::{Tone, console::Console};

/// Renders runner notifications on a [`Console`].
///
/// Output failures are logged and otherwise ignored; they never interrupt a run.
pub struct ConsoleListener<'c, W: Write> {
    console: &'c Console<W>,
}

impl<'c, W: Write> ConsoleListener<'c, W> {
    pub fn new(console: &'c Console<W>) -> Self {
        Self { console }
    }

    fn report(result: io::Result<()>) {
        if let Err(error) = result {
            warn!("Unable to write to console: {}", error);
        }
    }
}

fn capitalized(stage: Stage) -> String {
    let name = stage.to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

fn rejection_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Authentication => "Authentication failed.",
        Stage::AmountValidation => "Amount validation failed.",
        Stage::SecurityCode => "Could not generate the security code.",
    }
}

impl<W: Write> RunListener for ConsoleListener<'_, W> {
    fn on_stage_started(&self, _index: usize, stage: Stage) {
        let text = format!("{} in progress", capitalized(stage));
        Self::report(
            self.console
                .loading(&text, self.console.pacing().stage_duration),
        );
    }

    fn on_stage_finished(&self, _index: usize, stage: Stage, passed: bool) {
        let result = if passed {
            self.console
                .println(&format!("✔ {} completed.", capitalized(stage)), Tone::Success)
        } else {
            self.console
                .println(&format!("✘ {} failed.", capitalized(stage)), Tone::Failure)
        };
        Self::report(result);
    }

    fn on_accepted(&self, index: usize, record: &Record) {
        Self::report(self.console.display_message(
            &format!("Code {}", index),
            &record.to_string(),
            Tone::Title,
            Tone::Success,
        ));
    }

    fn on_rejected(&self, index: usize, stage: Stage, retrying: bool) {
        let follow_up = if retrying {
            "Retrying...".to_string()
        } else {
            format!("Code {} skipped.", index)
        };
        let message = format!("{} {}", rejection_message(stage), follow_up);
        Self::report(self.console.error(&message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        code::{
            config::{CodeConfig, Preset},
            runner::CodeBatchRunnerBuilder,
        },
        ui::{Pacing, PlainRenderer},
    };

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), Box::new(PlainRenderer), Pacing::none())
    }

    #[test]
    fn accepted_iteration_should_show_stages_and_record() {
        let console = console();
        {
            let listener = ConsoleListener::new(&console);
            let config = CodeConfig {
                gate_stages: Some([1.0, 1.0, 1.0]),
                ..CodeConfig::from(Preset::Gated)
            };
            let runner = CodeBatchRunnerBuilder::new(config)
                .seed(8)
                .listener(&listener)
                .build()
                .unwrap();
            runner.run(1);
        }

        let output = String::from_utf8(console.into_inner()).unwrap();
        assert!(output.contains("Authenticity verification in progress"));
        assert!(output.contains("✔ Amount validation completed."));
        assert!(output.contains("✔ Security code generation completed."));
        assert!(output.contains("Code 1"));
        assert!(output.contains("Bank: Demo Bank"));
    }

    #[test]
    fn rejected_iteration_should_say_it_was_skipped() {
        let console = console();
        {
            let listener = ConsoleListener::new(&console);
            let config = CodeConfig {
                gate_stages: Some([0.0, 1.0, 1.0]),
                ..CodeConfig::from(Preset::Gated)
            };
            let runner = CodeBatchRunnerBuilder::new(config)
                .seed(8)
                .listener(&listener)
                .build()
                .unwrap();
            runner.run(2);
        }

        let output = String::from_utf8(console.into_inner()).unwrap();
        assert!(output.contains("✘ Authenticity verification failed."));
        assert!(output.contains("Authentication failed. Code 2 skipped."));
        assert!(!output.contains("Amount validation in progress"));
        assert!(!output.contains("Retrying"));
    }

    #[test]
    fn stage_names_should_be_capitalized() {
        assert_eq!(capitalized(Stage::SecurityCode), "Security code generation");
    }
}
