// Candidate model and search result normalization.

pub mod dedup;
pub mod handlers;
pub mod models;
pub mod normalizer;
