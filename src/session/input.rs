use std::io::{BufRead, Write};

use crate::constants::NAME_TAKEN_MESSAGE;
use crate::runtime::ResponseStore;
use crate::utils::{LmiError, LmiResult};

/// Read one line without its terminator; `None` at end of input
pub fn read_line<R: BufRead>(input: &mut R) -> LmiResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

/// Print `text` and read the answer; end of input is an error
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> LmiResult<String> {
    write!(out, "{}", text)?;
    out.flush()?;
    read_line(input)?.ok_or(LmiError::InputClosed)
}

/// Ask for an output file name until one is free in `store`
///
/// Invalid names are reported and asked again, like taken ones.
pub fn prompt_unused_name<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    store: &ResponseStore,
    text: &str,
) -> LmiResult<String> {
    loop {
        let name = prompt(input, out, text)?;
        match store.exists(&name) {
            Ok(false) => return Ok(name.trim().to_string()),
            Ok(true) => writeln!(out, "{}", NAME_TAKEN_MESSAGE)?,
            Err(e @ LmiError::InvalidOutputName(_)) => writeln!(out, "{}", e)?,
            Err(e) => return Err(e),
        }
    }
}
