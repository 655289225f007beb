pub mod recalc;
pub mod talent;
pub mod upload;

pub use recalc::RecalculationSummary;
pub use talent::{Talent, MAX_INTERVIEW_RECORD_CHARS};
pub use upload::BatchUploadReport;
