//! Alert classification, deduplication and messages

mod policy;

pub use policy::{alert_message, classify, AlertDecision, AlertPolicy};
