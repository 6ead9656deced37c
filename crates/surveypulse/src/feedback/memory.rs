//! Reference [`FeedbackStore`] backed by process memory. A single mutex over
//! the whole state gives every trait method the isolation the contract asks
//! for: inserts are all-or-nothing, aggregate writes replace the record in
//! one step, and counter adds cannot interleave.
//!
//! Ships for tests, demos, and as a template for SQL-backed hosts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{
    AnswerRecord, CampaignEvent, CampaignId, CampaignRecord, CustomerAggregate, CustomerId,
    CustomerRecord, OrganizationId, ResponseId, ResponseRecord, ResponseStatus, SurveyAggregate,
    SurveyId, SurveyRecord,
};
use super::repository::{FeedbackStore, RepositoryError};

#[derive(Default)]
struct State {
    surveys: HashMap<SurveyId, SurveyRecord>,
    survey_aggregates: HashMap<SurveyId, SurveyAggregate>,
    responses: HashMap<ResponseId, ResponseRecord>,
    answers: HashMap<ResponseId, Vec<AnswerRecord>>,
    customers: HashMap<CustomerId, CustomerRecord>,
    campaigns: HashMap<CampaignId, CampaignRecord>,
}

#[derive(Default, Clone)]
pub struct InMemoryFeedbackStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a survey. Survey CRUD belongs to the host, so this lives outside
    /// the [`FeedbackStore`] trait.
    pub fn seed_survey(&self, survey: SurveyRecord) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.surveys.insert(survey.id.clone(), survey);
    }

    /// Seed a campaign, typically with its `sent` counter already set by the
    /// host's delivery pipeline.
    pub fn seed_campaign(&self, campaign: CampaignRecord) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.campaigns.insert(campaign.id.clone(), campaign);
    }

    /// Seed a customer row directly, bypassing find-or-create.
    pub fn seed_customer(&self, customer: CustomerRecord) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.customers.insert(customer.id.clone(), customer);
    }

    /// Answers currently stored for a response; empty after a cascade delete.
    pub fn answers_for_response(&self, response_id: &ResponseId) -> Vec<AnswerRecord> {
        let state = self.state.lock().expect("store mutex poisoned");
        state.answers.get(response_id).cloned().unwrap_or_default()
    }

    /// Number of customer rows in an organization, for race assertions.
    pub fn customer_count(&self, organization_id: &OrganizationId) -> usize {
        let state = self.state.lock().expect("store mutex poisoned");
        state
            .customers
            .values()
            .filter(|customer| &customer.organization_id == organization_id)
            .count()
    }
}

fn completed(response: &&ResponseRecord) -> bool {
    response.status == ResponseStatus::Completed
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn survey(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.surveys.get(id).cloned())
    }

    fn survey_aggregate(&self, id: &SurveyId) -> Result<Option<SurveyAggregate>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.survey_aggregates.get(id).copied())
    }

    fn write_survey_aggregate(
        &self,
        id: &SurveyId,
        aggregate: SurveyAggregate,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.surveys.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        state.survey_aggregates.insert(id.clone(), aggregate);
        Ok(())
    }

    fn insert_response(
        &self,
        record: ResponseRecord,
        answers: Vec<AnswerRecord>,
    ) -> Result<ResponseRecord, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.responses.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        state.answers.insert(record.id.clone(), answers);
        state.responses.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn response(&self, id: &ResponseId) -> Result<Option<ResponseRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.responses.get(id).cloned())
    }

    fn update_response(&self, record: ResponseRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.responses.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        state.responses.insert(record.id.clone(), record);
        Ok(())
    }

    fn remove_response(&self, id: &ResponseId) -> Result<ResponseRecord, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let record = state.responses.remove(id).ok_or(RepositoryError::NotFound)?;
        state.answers.remove(id);
        Ok(record)
    }

    fn completed_responses_for_survey(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<ResponseRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .responses
            .values()
            .filter(completed)
            .filter(|response| &response.survey_id == survey_id)
            .cloned()
            .collect())
    }

    fn completed_responses_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ResponseRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .responses
            .values()
            .filter(completed)
            .filter(|response| response.customer_id.as_ref() == Some(customer_id))
            .cloned()
            .collect())
    }

    fn completed_responses_for_organization(
        &self,
        organization_id: &OrganizationId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ResponseRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .responses
            .values()
            .filter(completed)
            .filter(|response| response.created_at >= since)
            .filter(|response| {
                state
                    .surveys
                    .get(&response.survey_id)
                    .is_some_and(|survey| &survey.organization_id == organization_id)
            })
            .cloned()
            .collect())
    }

    fn customer(&self, id: &CustomerId) -> Result<Option<CustomerRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.customers.get(id).cloned())
    }

    fn customer_by_email(
        &self,
        organization_id: &OrganizationId,
        email: &str,
    ) -> Result<Option<CustomerRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .customers
            .values()
            .find(|customer| {
                &customer.organization_id == organization_id && customer.email == email
            })
            .cloned())
    }

    fn insert_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        // Uniqueness on (organization_id, email) stands in for the database
        // constraint a SQL host would rely on.
        let duplicate = state.customers.values().any(|customer| {
            customer.organization_id == record.organization_id && customer.email == record.email
        });
        if duplicate || state.customers.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        state.customers.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn write_customer_aggregate(
        &self,
        id: &CustomerId,
        aggregate: CustomerAggregate,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let customer = state.customers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        customer.nps_score = aggregate.nps_score;
        customer.segment = aggregate.segment;
        customer.last_survey_at = aggregate.last_survey_at;
        customer.total_responses = aggregate.total_responses;
        Ok(())
    }

    fn campaign(&self, id: &CampaignId) -> Result<Option<CampaignRecord>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.campaigns.get(id).cloned())
    }

    fn add_to_campaign_counter(
        &self,
        id: &CampaignId,
        event: CampaignEvent,
        delta: u64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let campaign = state.campaigns.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let counter = match event {
            CampaignEvent::Delivered => &mut campaign.counters.delivered,
            CampaignEvent::Opened => &mut campaign.counters.opened,
            CampaignEvent::Clicked => &mut campaign.counters.clicked,
            CampaignEvent::Responded => &mut campaign.counters.responded,
            CampaignEvent::Bounced => &mut campaign.counters.bounced,
            CampaignEvent::Unsubscribed => &mut campaign.counters.unsubscribed,
        };
        *counter += delta;
        Ok(())
    }
}
