pub mod transcript_cache;
pub mod transcript_service;

pub use transcript_cache::TranscriptCache;
pub use transcript_service::{TranscriptService, TranscriptSource};
