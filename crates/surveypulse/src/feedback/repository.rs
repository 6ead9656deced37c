use chrono::{DateTime, Utc};

use super::domain::{
    AnswerRecord, CampaignEvent, CampaignId, CampaignRecord, CustomerAggregate, CustomerId,
    CustomerRecord, OrganizationId, ResponseId, ResponseRecord, SurveyAggregate, SurveyId,
    SurveyRecord,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence abstraction supplied by the host application.
///
/// Contract (see the crate docs for the full consistency model):
/// - `insert_response` commits the response and all its answers atomically,
///   or nothing at all.
/// - `remove_response` cascades to the response's answers.
/// - `write_survey_aggregate` / `write_customer_aggregate` replace the whole
///   aggregate in a single update so readers never observe a torn state, and
///   must serialize concurrent writes for the same survey/customer.
/// - `insert_customer` enforces uniqueness on `(organization_id, email)` by
///   returning [`RepositoryError::Conflict`].
/// - `add_to_campaign_counter` is an atomic add; counters only grow.
pub trait FeedbackStore: Send + Sync {
    fn survey(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError>;
    fn survey_aggregate(&self, id: &SurveyId) -> Result<Option<SurveyAggregate>, RepositoryError>;
    fn write_survey_aggregate(
        &self,
        id: &SurveyId,
        aggregate: SurveyAggregate,
    ) -> Result<(), RepositoryError>;

    fn insert_response(
        &self,
        record: ResponseRecord,
        answers: Vec<AnswerRecord>,
    ) -> Result<ResponseRecord, RepositoryError>;
    fn response(&self, id: &ResponseId) -> Result<Option<ResponseRecord>, RepositoryError>;
    fn update_response(&self, record: ResponseRecord) -> Result<(), RepositoryError>;
    fn remove_response(&self, id: &ResponseId) -> Result<ResponseRecord, RepositoryError>;
    fn completed_responses_for_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<ResponseRecord>, RepositoryError>;
    fn completed_responses_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ResponseRecord>, RepositoryError>;
    fn completed_responses_for_organization(
        &self,
        organization_id: &OrganizationId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ResponseRecord>, RepositoryError>;

    fn customer(&self, id: &CustomerId) -> Result<Option<CustomerRecord>, RepositoryError>;
    fn customer_by_email(
        &self,
        organization_id: &OrganizationId,
        email: &str,
    ) -> Result<Option<CustomerRecord>, RepositoryError>;
    fn insert_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError>;
    fn write_customer_aggregate(
        &self,
        id: &CustomerId,
        aggregate: CustomerAggregate,
    ) -> Result<(), RepositoryError>;

    fn campaign(&self, id: &CampaignId) -> Result<Option<CampaignRecord>, RepositoryError>;
    fn add_to_campaign_counter(
        &self,
        id: &CampaignId,
        event: CampaignEvent,
        delta: u64,
    ) -> Result<(), RepositoryError>;
}
