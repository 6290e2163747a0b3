pub mod use_cases;

pub use use_cases::admin::{AdminUseCase, AdminView};
pub use use_cases::submission::SubmissionUseCase;
