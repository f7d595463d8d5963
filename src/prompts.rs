//! Interactive prompts: the only way the tool takes input.
//!
//! Both readers are generic over `BufRead`/`Write` so tests can drive them
//! with in-memory buffers instead of a terminal.

use std::io::{self, BufRead, Write};

/// Prompt shown before reading the link.
pub const LOCATOR_PROMPT: &str = "Link to an image of the set: ";

/// Prompt shown before reading the compile choice.
pub const COMPILE_PROMPT: &str = "Bind the images into a PDF? (Y/N, default N): ";

/// Print [`LOCATOR_PROMPT`] and read one trimmed line.
///
/// End of input yields an empty string, which the locator parser rejects.
pub fn read_locator<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    ask(input, output, LOCATOR_PROMPT)
}

/// Print [`COMPILE_PROMPT`] and report whether the answer was affirmative.
pub fn read_compile_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    ask(input, output, COMPILE_PROMPT).map(|answer| is_affirmative(&answer))
}

/// `true` only for a single `Y` or `T` (Polish "tak"), in either case.
///
/// Empty input, `yes`, `n` and anything else mean "no".
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_uppercase().as_str(), "Y" | "T")
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    output.write_all(prompt.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
