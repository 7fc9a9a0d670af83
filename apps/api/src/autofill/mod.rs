// Autofill prep: job/company page → grounded, schema-constrained brief.
// All generation goes through llm_client; all page I/O goes through fetcher.

pub mod composer;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod schema;
