pub mod sample;

pub use sample::SAMPLE_NOTES;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::services::{SummarizeError, Summarizer};
use crate::services::summarizer::PAYLOAD_FAILURE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Idle,
    Pending,
    Succeeded(String),
    Failed(String),
}

/// Tag of one summarization request. Only the latest tag issued by a workflow is
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestSeq(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub seq: RequestSeq,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SummarizationWorkflow {
    notes: String,
    state: RequestState,
    sample: String,
    issued: u64,
    latest: Option<RequestSeq>,
}

impl Default for SummarizationWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SummarizationWorkflow {
    pub fn new() -> Self {
        Self::with_sample(SAMPLE_NOTES)
    }

    pub fn with_sample(sample: impl Into<String>) -> Self {
        Self {
            notes: String::new(),
            state: RequestState::Idle,
            sample: sample.into(),
            issued: 0,
            latest: None,
        }
    }

    pub fn note_text(&self) -> &str {
        &self.notes
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn char_count(&self) -> usize {
        self.notes.chars().count()
    }

    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// What the submit control shows: enabled only with some non-blank text and no
    /// request in flight.
    pub fn can_submit(&self) -> bool {
        !self.notes.trim().is_empty() && !self.is_pending()
    }

    /// Returns whether the text actually changed. The request state is never touched.
    pub fn set_note_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.notes {
            return false;
        }
        self.notes = text;
        true
    }

    /// Replaces the notes with the demonstration passage and returns to Idle. A request
    /// still in flight is disowned.
    pub fn load_sample(&mut self) {
        self.notes = self.sample.clone();
        self.state = RequestState::Idle;
        self.latest = None;
    }

    /// Goes Pending, dropping any shown result, and issues the next tag. `None` when the
    /// notes are blank.
    pub fn begin_submit(&mut self) -> Option<SummaryRequest> {
        if self.notes.trim().is_empty() {
            return None;
        }
        self.issued += 1;
        let seq = RequestSeq(self.issued);
        self.latest = Some(seq);
        self.state = RequestState::Pending;
        info!(seq = seq.0, chars = self.char_count(), "Summarization requested");
        Some(SummaryRequest {
            seq,
            text: self.notes.clone(),
        })
    }

    /// Applies the completion for `seq` if it is still the latest request. Returns whether
    /// the state changed.
    pub fn complete(&mut self, seq: RequestSeq, outcome: Result<String, SummarizeError>) -> bool {
        if self.latest != Some(seq) {
            debug!(seq = seq.0, latest = ?self.latest, "Discarded superseded summary");
            return false;
        }
        self.latest = None;

        self.state = match outcome {
            Ok(summary) if !summary.is_empty() => RequestState::Succeeded(summary),
            Ok(_) => RequestState::Failed(PAYLOAD_FAILURE.to_string()),
            Err(err) => {
                warn!(seq = seq.0, "Summarization failed: {}", err);
                RequestState::Failed(err.user_message().to_string())
            }
        };
        true
    }

    pub async fn submit(&mut self, summarizer: &dyn Summarizer) -> &RequestState {
        if let Some(request) = self.begin_submit() {
            let outcome = summarizer.summarize(&request.text).await;
            self.complete(request.seq, outcome);
        }
        &self.state
    }
}
