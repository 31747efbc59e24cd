use std::io::{BufRead, Write};

use super::input::prompt;
use crate::constants::{MENU_BANNER, MENU_PROMPT};
use crate::models::Backend;
use crate::utils::{LmiError, LmiResult};

/// Why a menu answer was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    NotANumber,
    OutOfRange,
}

/// Map a 1-based menu answer onto an index into a list of `count` entries
pub fn parse_selection(answer: &str, count: usize) -> Result<usize, SelectionError> {
    let number: i64 = answer
        .trim()
        .parse()
        .map_err(|_| SelectionError::NotANumber)?;

    if number >= 1 && (number as u64) <= count as u64 {
        Ok(number as usize - 1)
    } else {
        Err(SelectionError::OutOfRange)
    }
}

/// Print the numbered model list, starting at 1
pub fn print_models<W: Write>(out: &mut W, models: &[String]) -> LmiResult<()> {
    for (index, model) in models.iter().enumerate() {
        writeln!(out, "{} : {}", index + 1, model)?;
    }
    Ok(())
}

/// Show the menu and ask until a valid index is entered
pub fn select_model<R: BufRead, W: Write>(
    models: &[String],
    input: &mut R,
    out: &mut W,
) -> LmiResult<String> {
    if models.is_empty() {
        return Err(LmiError::NoModels);
    }

    writeln!(out, "{}", MENU_BANNER)?;
    print_models(out, models)?;

    loop {
        let answer = prompt(input, out, MENU_PROMPT)?;
        match parse_selection(&answer, models.len()) {
            Ok(index) => {
                let selected = models[index].clone();
                writeln!(out, "You have selected: {}", selected)?;
                tracing::info!("Selected model {}", selected);
                return Ok(selected);
            }
            Err(SelectionError::OutOfRange) => writeln!(out, "Invalid index selected.")?,
            Err(SelectionError::NotANumber) => {
                writeln!(out, "Invalid input. Please enter a valid index.")?
            }
        }
    }
}

/// Fetch the installed models and let the user pick one
pub async fn choose_model<R: BufRead, W: Write>(
    backend: &dyn Backend,
    input: &mut R,
    out: &mut W,
) -> LmiResult<String> {
    let models = backend.list_models().await?;
    select_model(&models, input, out)
}
