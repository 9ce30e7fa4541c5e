//! Interactive prompts for values missing from the command line.

use std::io::{self, BufRead, Write};

/// Asks for a value until a non-blank answer is given.
///
/// The answer is trimmed. End of input is an `UnexpectedEof` error.
///
/// ```
/// use chatrace::prompt::prompt_required;
///
/// let mut input = "\n  family  \n".as_bytes();
/// let mut output = Vec::new();
/// let answer = prompt_required(&mut input, &mut output, "Project name").unwrap();
/// assert_eq!(answer, "family");
/// ```
pub fn prompt_required<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<String> {
    loop {
        write!(output, "{label}: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no value given for {label}"),
            ));
        }

        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        writeln!(output, "{label} is required.")?;
    }
}
