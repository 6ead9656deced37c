//! SurveyPulse core: ingestion and aggregation engine for NPS-style
//! customer-satisfaction surveys.
//!
//! The crate owns the aggregation algorithm and its consistency contract;
//! persistence is supplied by the host through the [`feedback::FeedbackStore`]
//! trait. A reference in-memory store ships for tests and demos.

pub mod config;
pub mod error;
pub mod feedback;
pub mod telemetry;
