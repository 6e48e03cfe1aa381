pub mod summarizer;

pub use summarizer::{HttpSummarizer, SummarizeError, Summarizer};
