// Outreach drafting and per-channel status tracking.
// Drafting is pure; delivery happens outside the dashboard.

pub mod generator;
pub mod handlers;
pub mod status;
pub mod templates;
