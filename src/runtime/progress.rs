use indicatif::{ProgressBar, ProgressStyle};

/// Bar for the batch run, one tick per model
///
/// Draws to stderr and hides itself when stderr is not a terminal.
pub fn model_progress() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "Writing output file {bar:30.cyan/blue} {pos}/{len} model [{elapsed_precise}] {msg}",
    ) {
        bar.set_style(style);
    }
    bar
}

/// Spinner for a single streamed reply, one tick per fragment
pub fn fragment_progress() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} Writing output file: {pos} fragment(s) [{elapsed}]")
    {
        spinner.set_style(style);
    }
    spinner
}
