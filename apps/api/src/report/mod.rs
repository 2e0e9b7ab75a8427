// Career report generation.
// Prompt building, the model round trip with one bounded repair, schema
// validation, persistence and the HTTP surface. All LLM calls go through
// llm_client — no direct provider calls here.

pub mod error;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod store;

pub use error::ReportError;
pub use generator::generate_from_payload;
pub use schema::CareerReport;
