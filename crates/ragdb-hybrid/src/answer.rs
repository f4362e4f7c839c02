use serde::Serialize;

use ragdb_core::error::{Error, Result};

use crate::request::RankedChunk;

pub const SYSTEM_PROMPT: &str = "You are an AI answering questions based on provided documents.";
pub const NO_CONTEXT_MESSAGE: &str = "No relevant documents found";
const MIN_QUESTION_CHARS: usize = 3;

/// A question with the ranked passages an answer generator should ground on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerContext {
    pub question: String,
    pub passages: Vec<String>,
}

impl AnswerContext {
    pub fn new(question: &str, hits: &[RankedChunk]) -> Result<Self> {
        let question = question.trim();
        if question.chars().count() < MIN_QUESTION_CHARS {
            return Err(Error::InvalidInput(format!(
                "question must be at least {} characters",
                MIN_QUESTION_CHARS
            )));
        }
        Ok(Self { question: question.to_string(), passages: hits.iter().map(|h| h.text.clone()).collect() })
    }

    pub fn is_empty(&self) -> bool { self.passages.is_empty() }

    pub fn system_prompt(&self) -> &'static str { SYSTEM_PROMPT }

    /// User message: passages joined by newlines, then the question.
    pub fn prompt(&self) -> String {
        format!("Context: {}\nQuestion: {}", self.passages.join("\n"), self.question)
    }
}
