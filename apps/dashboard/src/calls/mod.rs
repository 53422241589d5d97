// Shortlist and pre-screening call lifecycle.

pub mod handlers;
pub mod prompts;
pub mod state_machine;
