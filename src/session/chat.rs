use colored::Colorize;
use std::io::{BufRead, Write};

use super::input::read_line;
use super::selector::choose_model;
use crate::constants::{CMD_CLEAR, CMD_HELP, CMD_LIST, CMD_QUIT};
use crate::models::{stream_reply, Backend, ChatMessage};
use crate::utils::LmiResult;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    List,
    Clear,
    Help,
    Message(String),
}

impl ReplCommand {
    /// Commands are matched case-insensitively; anything else is a message
    pub fn parse(line: &str) -> Self {
        let command = line.trim().to_lowercase();
        match command.as_str() {
            CMD_QUIT => ReplCommand::Quit,
            CMD_LIST => ReplCommand::List,
            CMD_CLEAR => ReplCommand::Clear,
            CMD_HELP => ReplCommand::Help,
            _ => ReplCommand::Message(line.to_string()),
        }
    }
}

/// A running conversation with one (switchable) model
#[derive(Debug)]
pub struct ChatSession {
    model: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch models; the history carries over
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Append `text` as a user turn, stream the reply into `sink`, append the reply
    ///
    /// The whole history is sent on every turn. On a stream error the user turn
    /// stays in the history and no assistant turn is added.
    pub async fn send<W: Write + Send>(
        &mut self,
        backend: &dyn Backend,
        text: &str,
        sink: &mut W,
    ) -> LmiResult<String> {
        self.history.push(ChatMessage::user(text));

        let fragments = backend.chat_stream(&self.model, &self.history).await?;
        let reply = stream_reply(fragments, sink).await?;

        self.history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }
}

fn print_help<W: Write>(out: &mut W) -> LmiResult<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  {}   exit the chat", CMD_QUIT)?;
    writeln!(out, "  {}   pick another model (history is kept)", CMD_LIST)?;
    writeln!(out, "  {}  forget the conversation so far", CMD_CLEAR)?;
    writeln!(out, "  {}   show this help", CMD_HELP)?;
    Ok(())
}

/// Interactive chatbot loop
///
/// Picks a model, then reads user lines until `/quit` or end of input.
pub async fn run_chat<R, W>(backend: &dyn Backend, input: &mut R, out: &mut W) -> LmiResult<()>
where
    R: BufRead,
    W: Write + Send,
{
    let model = choose_model(backend, input, out).await?;
    let mut session = ChatSession::new(model);

    loop {
        write!(out, "\n{}", "User: ".bold())?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out)?;
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::List => {
                let model = choose_model(backend, input, out).await?;
                session.set_model(model);
            }
            ReplCommand::Clear => {
                session.clear();
                writeln!(out, "[History cleared]")?;
            }
            ReplCommand::Help => print_help(out)?,
            ReplCommand::Message(text) => {
                let label = format!("ChatBot [{}]: ", session.model());
                writeln!(out, "{}", label.cyan())?;
                session.send(backend, &text, out).await?;
                writeln!(out)?;
            }
        }
    }

    writeln!(out, "Exiting ChatBot...")?;
    tracing::info!(
        "Chat ended after {} message(s)",
        session.history().len()
    );
    Ok(())
}
