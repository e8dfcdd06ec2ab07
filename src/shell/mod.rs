//! Conversational shell
//!
//! Keeps the turn history of one chat session and renders each answer with
//! its image and source previews. The history never reaches the language
//! model: every question is answered on its own.

use crate::error::{DocseerError, Result};
use crate::rag::{ask, Answer, ResourceBundle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Characters of each retrieved chunk shown as provenance
pub const PREVIEW_CHARS: usize = 150;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Where a retrieved chunk came from, with the start of its text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePreview {
    pub source: String,
    pub snippet: String,
}

impl SourcePreview {
    pub fn from_answer(answer: &Answer) -> Vec<Self> {
        answer
            .docs
            .iter()
            .map(|doc| Self {
                source: doc.source().to_string(),
                snippet: doc.preview(PREVIEW_CHARS),
            })
            .collect()
    }
}

/// One entry of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourcePreview>,
    pub at: DateTime<Utc>,
}

/// Append-only turn history of one session
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
            image: None,
            sources: Vec::new(),
            at: Utc::now(),
        });
    }

    pub fn push_assistant(
        &mut self,
        content: impl Into<String>,
        image: Option<PathBuf>,
        sources: Vec<SourcePreview>,
    ) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
            image,
            sources,
            at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Start over, as on a new session
    pub fn reset(&mut self) {
        self.turns.clear();
    }
}

/// Interactive question loop over any line reader and writer
pub struct ChatShell<'a> {
    resources: &'a ResourceBundle,
    conversation: Conversation,
}

impl<'a> ChatShell<'a> {
    pub fn new(resources: &'a ResourceBundle) -> Self {
        Self {
            resources,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Read questions until `/exit`, `/quit` or end of input
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write_out(
            out,
            "Ask about config, themes, or deployment. Commands: /history, /reset, /exit\n",
        )?;

        let mut lines = input.lines();
        loop {
            write_out(out, "\n> ")?;
            out.flush().map_err(io_context("Failed to flush output"))?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line.map_err(io_context("Failed to read input"))?;
            let line = line.trim();

            match line {
                "" => continue,
                "/exit" | "/quit" => break,
                "/history" => self.replay(out)?,
                "/reset" => {
                    self.conversation.reset();
                    write_out(out, "History cleared.\n")?;
                }
                question => self.handle_question(question, out).await?,
            }
        }

        Ok(())
    }

    /// Answer one question and record both turns
    ///
    /// A pipeline failure is shown for this turn and recorded as the
    /// assistant's reply; the session keeps going.
    pub async fn handle_question<W: Write>(&mut self, question: &str, out: &mut W) -> Result<()> {
        self.conversation.push_user(question);
        write_out(out, "Searching text & scanning images...\n")?;

        match ask(question, self.resources).await {
            Ok(answer) => {
                let sources = SourcePreview::from_answer(&answer);
                self.conversation
                    .push_assistant(answer.text, answer.image, sources);
            }
            Err(e) => {
                tracing::error!("Failed to answer question: {}", e);
                self.conversation
                    .push_assistant(format!("Error: {}", e), None, Vec::new());
            }
        }

        if let Some(turn) = self.conversation.turns().last() {
            render_turn(turn, true, out)?;
        }
        Ok(())
    }

    /// Print the whole history in order, images included
    pub fn replay<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.conversation.is_empty() {
            return write_out(out, "(no messages yet)\n");
        }

        for turn in self.conversation.turns() {
            render_turn(turn, false, out)?;
        }
        Ok(())
    }
}

/// Render one turn; sources are shown only for the live answer
pub fn render_turn<W: Write>(turn: &Turn, with_sources: bool, out: &mut W) -> Result<()> {
    let label = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };

    let mut text = format!("\n[{}]\n{}\n", label, turn.content);

    if let Some(image) = &turn.image {
        text.push_str(&format!("\n[Relevant documentation image: {}]\n", image.display()));
    }

    if with_sources && !turn.sources.is_empty() {
        text.push_str("\n--- Source context ---\n");
        for source in &turn.sources {
            text.push_str(&format!("Source: {}\n{}\n", source.source, source.snippet));
        }
    }

    write_out(out, &text)
}

fn write_out<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .map_err(io_context("Failed to write output"))
}

fn io_context(context: &'static str) -> impl Fn(std::io::Error) -> DocseerError {
    move |source| DocseerError::Io {
        source,
        context: context.to_string(),
    }
}
