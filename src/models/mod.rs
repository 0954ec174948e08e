pub mod absence;
pub mod transcript;

pub use absence::{AbsenceRecord, AbsenceReport};
pub use transcript::{CommentGradePair, GradeToken, HeaderFields, ParsedTranscript, Subject};
