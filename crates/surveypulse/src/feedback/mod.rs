//! Survey response ingestion and aggregation.
//!
//! The module keeps derived aggregates (per survey, per customer, per
//! campaign, per time bucket) consistent with the underlying response set:
//! segment-classified aggregates are always full re-derivations, and only
//! monotonic event counts use additive increments.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub(crate) mod trend;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerInput, AnswerRecord, CampaignCounters, CampaignEvent, CampaignId, CampaignRecord,
    CampaignStatsView, CustomerAggregate, CustomerId, CustomerRecord, OrganizationId, QuestionId,
    QuestionKind, QuestionRecord, ResponseId, ResponseRecord, ResponseStatus, ResponseSubmission,
    Segment, SurveyAggregate, SurveyId, SurveyRecord, SurveyStatus, Timeframe, TrendBucket,
};
pub use memory::InMemoryFeedbackStore;
pub use repository::{FeedbackStore, RepositoryError};
pub use router::feedback_router;
pub use scoring::{classify, nps_score, rate};
pub use service::{FeedbackService, FeedbackServiceError};
pub use validation::{validate_submission, FieldError, ValidationErrors};
