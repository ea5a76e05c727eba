use std::io::{self, BufRead, Write};

use thiserror::Error;

use super::{Tone, console::Console};

/// Extension every output filename must end with.
pub const FILE_EXTENSION: &str = ".txt";

/// Rejected user input; always answered with a new prompt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("The file name must end in '.txt'. Try again.")]
    MissingExtension,

    #[error("The number must be positive.")]
    NotPositive,

    #[error("Invalid input. Please enter a whole number.")]
    NotANumber,
}

pub fn validate_filename(input: &str) -> Result<String, InputError> {
    let name = input.trim();
    if name.ends_with(FILE_EXTENSION) {
        Ok(name.to_string())
    } else {
        Err(InputError::MissingExtension)
    }
}

pub fn parse_count(input: &str) -> Result<usize, InputError> {
    let value: i128 = input.trim().parse().map_err(|_| InputError::NotANumber)?;
    if value <= 0 {
        return Err(InputError::NotPositive);
    }
    usize::try_from(value).map_err(|_| InputError::NotANumber)
}

pub fn prompt_filename<R: BufRead, W: Write>(
    input: &mut R,
    console: &Console<W>,
) -> io::Result<String> {
    prompt_until(
        input,
        console,
        "Enter the name of the file to save the codes to (must end in .txt): ",
        validate_filename,
    )
}

pub fn prompt_count<R: BufRead, W: Write>(
    input: &mut R,
    console: &Console<W>,
) -> io::Result<usize> {
    prompt_until(
        input,
        console,
        "Enter the number of codes to generate: ",
        parse_count,
    )
}

/// Asks `question` until `parse` accepts the answer.
///
/// Fails with `UnexpectedEof` when the input ends first.
fn prompt_until<R, W, T, F>(
    input: &mut R,
    console: &Console<W>,
    question: &str,
    parse: F,
) -> io::Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<T, InputError>,
{
    loop {
        console.print_inline(question, Tone::Prompt)?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a valid answer was given",
            ));
        }

        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(error) => console.error(&error.to_string())?,
        }
    }
}
