use indicatif::ProgressBar;
use std::io::Write;
use std::path::PathBuf;

use super::output::ResponseStore;
use crate::constants::SECTION_SEPARATOR_CHAR;
use crate::models::{stream_reply, Backend, ChatMessage};
use crate::utils::{LmiError, LmiResult};

/// What one batch run produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub path: PathBuf,
    pub sections: Vec<SectionReport>,
}

#[derive(Debug, Clone)]
pub struct SectionReport {
    pub model: String,
    pub reply_len: usize,
}

/// Header written above each model's reply
pub fn section_header(model: &str, separator_width: usize) -> String {
    let separator: String = std::iter::repeat(SECTION_SEPARATOR_CHAR)
        .take(separator_width)
        .collect();
    format!("Model: {}\n{}\n", model, separator)
}

/// Ask every installed model `question` and write the replies to `output_name`
///
/// Models run one after another in backend order. Each gets a fresh history
/// holding only the question. The file is created before the first request,
/// so a name collision fails fast.
pub async fn query_all_models(
    backend: &dyn Backend,
    store: &ResponseStore,
    separator_width: usize,
    question: &str,
    output_name: &str,
    progress: &ProgressBar,
) -> LmiResult<BatchReport> {
    let models = backend.list_models().await?;
    if models.is_empty() {
        return Err(LmiError::NoModels);
    }

    let (path, mut file) = store.create(output_name)?;
    progress.set_length(models.len() as u64);

    let mut sections = Vec::with_capacity(models.len());
    for model in models {
        progress.set_message(model.clone());
        file.write_all(section_header(&model, separator_width).as_bytes())?;

        let messages = [ChatMessage::system(question)];
        let fragments = backend.chat_stream(&model, &messages).await?;
        let reply = stream_reply(fragments, &mut file).await?;

        file.write_all(b"\n\n")?;
        tracing::info!("{} replied with {} byte(s)", model, reply.len());

        sections.push(SectionReport {
            model,
            reply_len: reply.len(),
        });
        progress.inc(1);
    }

    file.flush()?;
    progress.finish_and_clear();

    Ok(BatchReport { path, sections })
}
