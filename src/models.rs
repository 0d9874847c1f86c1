//! Data models for the website analysis workflow.
//!
//! This module contains the wire types exchanged with the analysis
//! service and the domain types the workflow controller holds on to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for the question-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The website URL to analyze.
    pub url: String,
}

/// A single heading extracted from the analyzed page.
///
/// The service tags headings with their source tag (h1/h2/h3) but older
/// deployments omit it, so `level` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading tag name, e.g. "h1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Visible heading text.
    pub text: String,
}

/// Structured extract of the analyzed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page title.
    pub title: String,
    /// Content of the meta description tag, if any.
    pub meta_description: String,
    /// Concatenated text of the page's main content containers.
    pub main_content: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
}

impl PageContent {
    /// A one-paragraph summary of the main content for terminal display.
    ///
    /// Truncates at a character boundary and appends an ellipsis when the
    /// content is longer than `max_chars`.
    pub fn summary(&self, max_chars: usize) -> String {
        let flat = self
            .main_content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let truncated: String = flat.chars().take(max_chars).collect();
        format!("{}…", truncated.trim_end())
    }

    /// Heading texts in document order.
    pub fn heading_texts(&self) -> Vec<&str> {
        self.headings.iter().map(|h| h.text.as_str()).collect()
    }
}

/// The single multiple-choice question generated for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// Question text shown to the user.
    #[serde(rename = "question")]
    pub text: String,
    /// Candidate answers in display order.
    pub options: Vec<String>,
}

impl GeneratedQuestion {
    /// Whether the question can actually be answered.
    ///
    /// The service promises non-empty options; this is a display-side
    /// guard, not contract enforcement.
    pub fn is_answerable(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Successful payload of the question-generation endpoint.
///
/// The wire field for the question is `questions`; the service reserves
/// the plural for a multi-question mode it never shipped. Payloads
/// missing `content` or `questions` fail deserialization and are
/// reported as unparseable responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Structured extract of the analyzed page.
    pub content: PageContent,
    /// The generated question with its candidate answers.
    #[serde(rename = "questions")]
    pub question: GeneratedQuestion,
}

/// Error payload returned by the service on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description, used verbatim when present.
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for the answer-submission endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// URL the question was generated for.
    pub url: String,
    /// The question text that was answered.
    pub question: String,
    /// The option the user chose.
    pub answer: String,
}

/// Acknowledgment from the answer-submission endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerReceipt {
    /// Recording status, "recorded" on success.
    pub status: String,
}

/// An analysis result stamped with its source URL and arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// The URL that was analyzed.
    pub url: String,
    /// The service's analysis of that URL.
    pub result: AnalysisResult,
    /// When the result arrived at this client.
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisOutcome {
    /// Stamp a freshly received result with the current time.
    pub fn now(url: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            url: url.into(),
            result,
            analyzed_at: Utc::now(),
        }
    }
}
