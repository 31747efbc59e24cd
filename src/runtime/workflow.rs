use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::Path;

use super::batch::query_all_models;
use super::output::ResponseStore;
use super::progress::{fragment_progress, model_progress};
use super::superset::create_superset_document;
use crate::app::Config;
use crate::models::Backend;
use crate::session::{choose_model, print_models, prompt, prompt_unused_name, select_model};
use crate::utils::{LmiError, LmiResult};

/// Answers the query workflow would otherwise ask for
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Question sent to every model
    pub prompt: Option<String>,
    /// Name of the batch output file
    pub output: Option<String>,
    /// `Some(true)` builds the superset without asking, `Some(false)` skips it
    pub superset: Option<bool>,
    /// Model that writes the superset document
    pub superset_model: Option<String>,
    /// Name of the superset output file
    pub superset_output: Option<String>,
}

/// Ask every model one question, then optionally merge the answers
///
/// Anything not given in `options` is asked for on `input`.
pub async fn run_query_workflow<R, W>(
    backend: &dyn Backend,
    config: &Config,
    options: QueryOptions,
    input: &mut R,
    out: &mut W,
) -> LmiResult<()>
where
    R: BufRead,
    W: Write + Send,
{
    let store = ResponseStore::new(&config.output.responses_dir);

    let models = backend.list_models().await?;
    writeln!(out, "***** You have {} model(s) installed *****", models.len())?;
    print_models(out, &models)?;
    if models.is_empty() {
        return Err(LmiError::NoModels);
    }

    let question = match options.prompt {
        Some(question) => question,
        None => prompt(input, out, "\nEnter the prompt : ")?,
    };

    let batch_name = match options.output {
        Some(name) => name,
        None => prompt_unused_name(input, out, &store, "\nEnter output_file name : ")?,
    };

    let report = query_all_models(
        backend,
        &store,
        config.output.separator_width,
        &question,
        &batch_name,
        &model_progress(),
    )
    .await?;
    writeln!(
        out,
        "{} Wrote {} section(s) to {}",
        "[OK]".green(),
        report.sections.len(),
        report.path.display()
    )?;

    let wants_superset = match options.superset {
        Some(answer) => answer,
        None => {
            writeln!(out, "\nDo you want to create a superset document?")?;
            let reply = prompt(
                input,
                out,
                "Please respond with 'yes' to proceed, or any other input to terminate: ",
            )?;
            reply.trim().eq_ignore_ascii_case("yes")
        }
    };
    if !wants_superset {
        return Ok(());
    }

    let model = match options.superset_model {
        Some(model) => model,
        None => select_model(&models, input, out)?,
    };

    let superset_name = match options.superset_output {
        Some(name) => name,
        None => prompt_unused_name(input, out, &store, "\nEnter the name of output file : ")?,
    };

    let content = store.read(&batch_name)?;
    create_superset_document(
        backend,
        &store,
        &config.superset.system_prompt,
        &content,
        &model,
        &superset_name,
        &fragment_progress(),
    )
    .await?;

    writeln!(out, "Done!")?;
    Ok(())
}

/// Merge an existing responses file into a superset document
///
/// `source` may live anywhere; the result goes to the responses directory.
pub async fn run_superset_workflow<R, W>(
    backend: &dyn Backend,
    config: &Config,
    source: &Path,
    model: Option<String>,
    output: Option<String>,
    input: &mut R,
    out: &mut W,
) -> LmiResult<()>
where
    R: BufRead,
    W: Write + Send,
{
    let store = ResponseStore::new(&config.output.responses_dir);
    let content = std::fs::read_to_string(source)?;

    let model = match model {
        Some(model) => model,
        None => choose_model(backend, input, out).await?,
    };

    let output = match output {
        Some(name) => name,
        None => prompt_unused_name(input, out, &store, "\nEnter the name of output file : ")?,
    };

    let report = create_superset_document(
        backend,
        &store,
        &config.superset.system_prompt,
        &content,
        &model,
        &output,
        &fragment_progress(),
    )
    .await?;

    writeln!(out, "Done! Superset document written to {}", report.path.display())?;
    Ok(())
}
