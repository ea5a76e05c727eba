use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use code_batch::{
    code::{
        config::{CodeConfig, Preset},
        reader::{CodeItemReaderBuilder, chunk_size_for},
        runner::CodeBatchRunnerBuilder,
    },
    core::{
        item::PassThroughProcessor,
        job::{Job, JobBuilder},
        step::StepBuilder,
    },
    item::text::text_writer::TextItemWriterBuilder,
    ui::{
        ColoredRenderer, Pacing, PlainRenderer, Renderer, Tone,
        console::Console,
        listener::ConsoleListener,
        prompt::{self, prompt_count, prompt_filename},
    },
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script variant to reproduce: gated, extended or minimal
    #[arg(short, long, default_value = "gated")]
    preset: Preset,

    /// JSON configuration file, overrides the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output file (must end in .txt); asked interactively when missing
    #[arg(short, long)]
    output: Option<String>,

    /// Number of codes to generate; asked interactively when missing
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Disable animations and delays
    #[arg(long)]
    fast: bool,

    /// Disable colors
    #[arg(long)]
    plain: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CodeConfig::from_path(path)?,
        None => CodeConfig::from(args.preset),
    };

    let renderer: Box<dyn Renderer> = if args.plain || !io::stdout().is_terminal() {
        Box::new(PlainRenderer)
    } else {
        Box::new(ColoredRenderer)
    };
    let pacing = if args.fast {
        Pacing::none()
    } else {
        Pacing::animated()
    };
    let console = Console::new(io::stdout(), renderer, pacing);

    print_banner(&console, &config)?;

    let mut stdin = io::stdin().lock();

    let filename = match args.output.as_deref().map(prompt::validate_filename) {
        Some(Ok(filename)) => filename,
        Some(Err(invalid)) => {
            console.error(&invalid.to_string())?;
            prompt_filename(&mut stdin, &console)?
        }
        None => prompt_filename(&mut stdin, &console)?,
    };

    let count = match args.count {
        Some(count) => usize::try_from(count)?,
        None => prompt_count(&mut stdin, &console)?,
    };

    console.display_message(
        "Code Generation",
        "Generating codes, please wait...",
        Tone::Notice,
        Tone::Success,
    )?;

    let listener = ConsoleListener::new(&console);
    let mut runner = CodeBatchRunnerBuilder::new(config).listener(&listener);
    if let Some(seed) = args.seed {
        runner = runner.seed(seed);
    }
    let runner = runner.build()?;

    let reader = CodeItemReaderBuilder::new()
        .number_of_items(count)
        .build(&runner);

    let writer = match TextItemWriterBuilder::new().from_path(&filename) {
        Ok(writer) => writer,
        Err(err) => {
            error!("{}", err);
            console.error(&format!("Error saving the codes: {}", err))?;
            return Ok(());
        }
    };

    // Rejections are read errors and may all be skipped; write errors always stop the step.
    let step = StepBuilder::new("generate-codes")
        .chunk(chunk_size_for(count))
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .skip_limit(count)
        .build()?;

    let job = JobBuilder::new()
        .name("withdrawal-codes".to_string())
        .start(&step)
        .build();

    match job.run() {
        Ok(execution) => {
            let saved: usize = execution.step_executions.iter().map(|s| s.write_count).sum();
            let rejected: usize = execution
                .step_executions
                .iter()
                .map(|s| s.read_error_count)
                .sum();
            info!("Job finished in {:?}", execution.duration);

            console.display_message(
                "Success",
                &format!(
                    "{} codes saved to {} ({} rejected).",
                    saved, filename, rejected
                ),
                Tone::Title,
                Tone::Success,
            )?;
            console.display_message(
                "Process Complete",
                "Code generation finished.",
                Tone::Done,
                Tone::Success,
            )?;
        }
        Err(err) => {
            error!("{}", err);
            console.error(&format!("Error saving the codes to {}: {}", filename, err))?;
        }
    }

    Ok(())
}

fn print_banner<W: io::Write>(console: &Console<W>, config: &CodeConfig) -> io::Result<()> {
    console.print_line('=', Tone::Header)?;
    console.slow_print_with(
        &format!("    {} - Sample Withdrawal Code Generator", config.bank_label),
        Tone::Title,
        console.pacing().char_delay.mul_f32(0.6),
    )?;
    console.print_line('=', Tone::Header)?;
    console.loading("  Loading system", console.pacing().loading_duration)?;
    console.println("", Tone::Rule)
}
