use futures::{Stream, StreamExt};
use std::io::Write;
use std::pin::Pin;

use crate::utils::LmiResult;

/// Incremental reply fragments, in arrival order
pub type FragmentStream = Pin<Box<dyn Stream<Item = LmiResult<String>> + Send>>;

/// Reassembles newline-delimited lines from arbitrarily split byte chunks
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, without the terminator
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Bytes already buffered hold no terminator
        let mut search_from = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let pos = search_from + offset;
            search_from = 0;
            let rest = self.buffer.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buffer, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush a trailing line that had no terminator
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Drain a fragment stream into `sink`, returning the concatenated reply
pub async fn stream_reply<W>(fragments: FragmentStream, sink: &mut W) -> LmiResult<String>
where
    W: Write + Send,
{
    stream_reply_observed(fragments, sink, |_| {}).await
}

/// Like [`stream_reply`], calling `on_fragment` after each fragment is written
///
/// Each fragment is flushed as soon as it is written. An error from the stream
/// stops the drain; whatever was already written stays in the sink.
pub async fn stream_reply_observed<W, F>(
    mut fragments: FragmentStream,
    sink: &mut W,
    mut on_fragment: F,
) -> LmiResult<String>
where
    W: Write + Send,
    F: FnMut(&str) + Send,
{
    let mut reply = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        sink.write_all(fragment.as_bytes())?;
        sink.flush()?;
        on_fragment(&fragment);
        reply.push_str(&fragment);
    }

    Ok(reply)
}
