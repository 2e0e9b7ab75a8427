// Student profile intake.
// Untrusted form payloads are checked here before anything reaches the model.

pub mod models;
pub mod validation;

pub use models::ProfileInput;
pub use validation::{validate_profile, InputValidationError};
