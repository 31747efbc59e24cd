use indicatif::ProgressBar;
use std::io::Write;
use std::path::PathBuf;

use super::output::ResponseStore;
use crate::models::{stream_reply_observed, Backend, ChatMessage};
use crate::utils::LmiResult;

/// What one superset synthesis produced
#[derive(Debug, Clone)]
pub struct SupersetReport {
    pub path: PathBuf,
    pub model: String,
    pub reply_len: usize,
}

/// The two-message history: instructions first, then the combined responses
pub fn superset_messages(system_prompt: &str, content: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(content)]
}

/// Have `model` merge the responses in `content` into one document at `output_name`
///
/// `progress` ticks once per received fragment.
pub async fn create_superset_document(
    backend: &dyn Backend,
    store: &ResponseStore,
    system_prompt: &str,
    content: &str,
    model: &str,
    output_name: &str,
    progress: &ProgressBar,
) -> LmiResult<SupersetReport> {
    let (path, mut file) = store.create(output_name)?;

    let messages = superset_messages(system_prompt, content);
    let fragments = backend.chat_stream(model, &messages).await?;
    let reply = stream_reply_observed(fragments, &mut file, |_| progress.inc(1)).await?;

    file.flush()?;
    progress.finish_and_clear();
    tracing::info!(
        "{} wrote a {} byte superset document to {}",
        model,
        reply.len(),
        path.display()
    );

    Ok(SupersetReport {
        path,
        model: model.to_string(),
        reply_len: reply.len(),
    })
}
