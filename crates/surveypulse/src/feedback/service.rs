use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{
    AnswerRecord, CampaignEvent, CampaignId, CampaignRecord, CampaignStatsView, CustomerAggregate,
    CustomerId, CustomerRecord, OrganizationId, ResponseId, ResponseRecord, ResponseStatus,
    ResponseSubmission, Segment, SurveyAggregate, SurveyId, SurveyRecord, SurveyStatus, Timeframe,
    TrendBucket,
};
use super::repository::{FeedbackStore, RepositoryError};
use super::scoring;
use super::trend;
use super::validation::{validate_submission, ValidationErrors};

/// Error raised by the feedback service.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackServiceError {
    #[error("survey not found")]
    SurveyNotFound,
    #[error("response not found")]
    ResponseNotFound,
    #[error("customer not found")]
    CustomerNotFound,
    #[error("campaign not found")]
    CampaignNotFound,
    #[error("survey is not currently accepting responses ({})", .status.label())]
    SurveyNotAcceptingResponses { status: SurveyStatus },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static RESPONSE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CUSTOMER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_response_id() -> ResponseId {
    let id = RESPONSE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResponseId(format!("resp-{id:06}"))
}

fn next_customer_id() -> CustomerId {
    let id = CUSTOMER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CustomerId(format!("cust-{id:06}"))
}

/// Service facade over the host-supplied store: ingests responses, keeps the
/// derived aggregates consistent with the raw response set, and serves the
/// read paths used by dashboards.
pub struct FeedbackService<S> {
    store: Arc<S>,
}

impl<S> FeedbackService<S>
where
    S: FeedbackStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Ingest a response on behalf of the survey owner. Bypasses the ACTIVE
    /// status gate so owners can backfill responses at any time.
    pub fn ingest_response(
        &self,
        survey_id: &SurveyId,
        organization_id: &OrganizationId,
        submission: ResponseSubmission,
    ) -> Result<ResponseRecord, FeedbackServiceError> {
        let survey = self.load_survey(survey_id, Some(organization_id))?;
        self.persist_submission(&survey, submission, false)
    }

    /// Ingest a response arriving through a public share link or widget.
    /// Only ACTIVE surveys accept these; the respondent is resolved (or
    /// created) from the supplied email unless the survey is anonymous.
    pub fn ingest_public_response(
        &self,
        survey_id: &SurveyId,
        submission: ResponseSubmission,
    ) -> Result<ResponseRecord, FeedbackServiceError> {
        let survey = self.load_survey(survey_id, None)?;
        if survey.status != SurveyStatus::Active {
            return Err(FeedbackServiceError::SurveyNotAcceptingResponses {
                status: survey.status,
            });
        }
        self.persist_submission(&survey, submission, true)
    }

    fn persist_submission(
        &self,
        survey: &SurveyRecord,
        submission: ResponseSubmission,
        public: bool,
    ) -> Result<ResponseRecord, FeedbackServiceError> {
        validate_submission(survey, &submission)?;

        // Resolve the campaign up front so a bad reference cannot fail the
        // operation after the response row has committed.
        if let Some(campaign_id) = &submission.campaign_id {
            self.load_campaign(campaign_id, Some(&survey.organization_id))?;
        }

        let submitted_at = submission.submitted_at.unwrap_or_else(Utc::now);
        let customer = self.resolve_customer(survey, &submission, public, submitted_at)?;
        let score = self.resolve_score(survey, &submission);
        let segment = scoring::classify(score);

        let anonymous = survey.anonymous_responses;
        let record = ResponseRecord {
            id: next_response_id(),
            survey_id: survey.id.clone(),
            customer_id: customer.as_ref().map(|c| c.id.clone()),
            campaign_id: submission.campaign_id.clone(),
            respondent_email: if anonymous { None } else { submission.respondent_email.clone() },
            respondent_name: if anonymous { None } else { submission.respondent_name.clone() },
            score,
            segment,
            feedback: submission.feedback.clone(),
            status: ResponseStatus::Completed,
            created_at: submitted_at,
            completed_at: Some(submitted_at),
            flagged: false,
            flag_reason: None,
        };

        let answers = submission
            .answers
            .iter()
            .map(|answer| AnswerRecord {
                response_id: record.id.clone(),
                question_id: answer.question_id.clone(),
                value: answer.value.clone(),
                numeric_value: answer.numeric_value,
                selected_options: answer.selected_options.clone(),
                other_value: answer.other_value.clone(),
            })
            .collect();

        // Response and answers commit together or not at all.
        let stored = self.store.insert_response(record, answers)?;

        // Derived state refreshes after the commit. Each refresh is a full
        // re-derivation, so a retry after a partial failure self-heals.
        self.recompute_survey_aggregate(&survey.id)?;
        if let Some(customer) = &customer {
            self.recompute_customer_aggregate(&customer.id)?;
        }
        if let Some(campaign_id) = &stored.campaign_id {
            self.store
                .add_to_campaign_counter(campaign_id, CampaignEvent::Responded, 1)?;
        }

        debug!(
            response = %stored.id.0,
            survey = %survey.id.0,
            segment = stored.segment.map(Segment::label).unwrap_or("unclassified"),
            "response ingested"
        );

        Ok(stored)
    }

    /// Remove a response (and, via the store, its answers) and re-derive
    /// every aggregate that depended on it. Campaign counters stay put: they
    /// are monotonic event counts, not response-set derivations.
    pub fn delete_response(
        &self,
        response_id: &ResponseId,
        organization_id: &OrganizationId,
    ) -> Result<(), FeedbackServiceError> {
        let response = self.load_response(response_id, organization_id)?;
        self.store.remove_response(&response.id)?;

        self.recompute_survey_aggregate(&response.survey_id)?;
        if let Some(customer_id) = &response.customer_id {
            self.recompute_customer_aggregate(customer_id)?;
        }
        Ok(())
    }

    /// Mark or clear the moderation flag on a response. Flagging does not
    /// change any aggregate.
    pub fn flag_response(
        &self,
        response_id: &ResponseId,
        organization_id: &OrganizationId,
        flagged: bool,
        reason: Option<String>,
    ) -> Result<ResponseRecord, FeedbackServiceError> {
        let mut response = self.load_response(response_id, organization_id)?;
        response.flagged = flagged;
        response.flag_reason = if flagged { reason } else { None };
        self.store.update_response(response.clone())?;
        Ok(response)
    }

    /// Re-derive a survey's aggregate from its current COMPLETED response
    /// set and write all fields in one update. Idempotent under retries and
    /// correct after deletions.
    pub fn recompute_survey_aggregate(
        &self,
        survey_id: &SurveyId,
    ) -> Result<SurveyAggregate, FeedbackServiceError> {
        let responses = self.store.completed_responses_for_survey(survey_id)?;

        let mut promoters = 0;
        let mut passives = 0;
        let mut detractors = 0;
        for response in &responses {
            match response.segment {
                Some(Segment::Promoter) => promoters += 1,
                Some(Segment::Passive) => passives += 1,
                Some(Segment::Detractor) => detractors += 1,
                None => {}
            }
        }

        let aggregate = SurveyAggregate {
            response_count: responses.len() as u64,
            promoters,
            passives,
            detractors,
            nps_score: scoring::nps_score(promoters, passives, detractors),
        };
        self.store.write_survey_aggregate(survey_id, aggregate)?;

        debug!(
            survey = %survey_id.0,
            responses = aggregate.response_count,
            nps = ?aggregate.nps_score,
            "survey aggregate recomputed"
        );
        Ok(aggregate)
    }

    /// Re-derive a customer's aggregate from their COMPLETED responses: the
    /// latest scored response (by completion time, not arrival order)
    /// determines the score and segment.
    pub fn recompute_customer_aggregate(
        &self,
        customer_id: &CustomerId,
    ) -> Result<CustomerAggregate, FeedbackServiceError> {
        let responses = self.store.completed_responses_for_customer(customer_id)?;

        let completed_at = |response: &ResponseRecord| {
            response.completed_at.unwrap_or(response.created_at)
        };
        let last_survey_at = responses.iter().map(completed_at).max();
        let latest_scored = responses
            .iter()
            .filter(|response| response.score.is_some())
            .max_by_key(|response| completed_at(response));

        let aggregate = CustomerAggregate {
            nps_score: latest_scored.and_then(|response| response.score),
            segment: latest_scored.and_then(|response| response.segment),
            last_survey_at,
            total_responses: responses.len() as u64,
        };
        self.store.write_customer_aggregate(customer_id, aggregate)?;
        Ok(aggregate)
    }

    /// Current per-survey aggregate; an empty aggregate for surveys that have
    /// never been recomputed.
    pub fn survey_aggregate(
        &self,
        survey_id: &SurveyId,
        organization_id: &OrganizationId,
    ) -> Result<SurveyAggregate, FeedbackServiceError> {
        let survey = self.load_survey(survey_id, Some(organization_id))?;
        Ok(self.store.survey_aggregate(&survey.id)?.unwrap_or_default())
    }

    pub fn customer_aggregate(
        &self,
        customer_id: &CustomerId,
        organization_id: &OrganizationId,
    ) -> Result<CustomerAggregate, FeedbackServiceError> {
        let customer = self.load_customer(customer_id, organization_id)?;
        Ok(CustomerAggregate {
            nps_score: customer.nps_score,
            segment: customer.segment,
            last_survey_at: customer.last_survey_at,
            total_responses: customer.total_responses,
        })
    }

    /// Apply an externally observed campaign event (open, click, bounce...)
    /// as an atomic counter add. Safe out of order and concurrently.
    pub fn record_campaign_event(
        &self,
        campaign_id: &CampaignId,
        organization_id: &OrganizationId,
        event: CampaignEvent,
        delta: u64,
    ) -> Result<(), FeedbackServiceError> {
        self.load_campaign(campaign_id, Some(organization_id))?;
        self.store.add_to_campaign_counter(campaign_id, event, delta)?;
        Ok(())
    }

    /// Raw counters plus funnel rates, computed on read.
    pub fn campaign_stats(
        &self,
        campaign_id: &CampaignId,
        organization_id: &OrganizationId,
    ) -> Result<CampaignStatsView, FeedbackServiceError> {
        let campaign = self.load_campaign(campaign_id, Some(organization_id))?;
        let counters = campaign.counters;
        Ok(CampaignStatsView {
            sent: counters.sent,
            delivered: counters.delivered,
            opened: counters.opened,
            clicked: counters.clicked,
            responded: counters.responded,
            bounced: counters.bounced,
            unsubscribed: counters.unsubscribed,
            open_rate: scoring::rate(counters.opened, counters.sent),
            click_rate: scoring::rate(counters.clicked, counters.sent),
            response_rate: scoring::rate(counters.responded, counters.sent),
        })
    }

    /// Time-bucketed NPS series over the timeframe's lookback window ending
    /// at `now`. Pure read; may run against a replica.
    pub fn trend(
        &self,
        organization_id: &OrganizationId,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendBucket>, FeedbackServiceError> {
        let since = timeframe.window_start(now);
        let mut responses = self
            .store
            .completed_responses_for_organization(organization_id, since)?;
        responses.retain(|response| response.created_at <= now);
        Ok(trend::bucket_series(&responses, timeframe))
    }

    fn resolve_customer(
        &self,
        survey: &SurveyRecord,
        submission: &ResponseSubmission,
        public: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<CustomerRecord>, FeedbackServiceError> {
        // Anonymous surveys never persist a customer linkage, even when the
        // caller supplied one.
        if survey.anonymous_responses {
            return Ok(None);
        }

        if !public {
            if let Some(customer_id) = &submission.customer_id {
                let customer = self.load_customer(customer_id, &survey.organization_id)?;
                return Ok(Some(customer));
            }
        }

        match &submission.respondent_email {
            Some(email) => self
                .find_or_create_customer(
                    &survey.organization_id,
                    email,
                    submission.respondent_name.as_deref(),
                    now,
                )
                .map(Some),
            None => Ok(None),
        }
    }

    /// Find-or-create by `(organization_id, email)`. Losing a creation race
    /// is not an error: the uniqueness conflict means someone else won, so we
    /// re-read and reuse their row.
    fn find_or_create_customer(
        &self,
        organization_id: &OrganizationId,
        email: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CustomerRecord, FeedbackServiceError> {
        if let Some(existing) = self.store.customer_by_email(organization_id, email)? {
            return Ok(existing);
        }

        let fallback_name = email.split('@').next().unwrap_or(email);
        let record = CustomerRecord {
            id: next_customer_id(),
            organization_id: organization_id.clone(),
            email: email.to_string(),
            name: name.unwrap_or(fallback_name).to_string(),
            nps_score: None,
            segment: None,
            last_survey_at: None,
            total_responses: 0,
            created_at: now,
        };

        match self.store.insert_customer(record) {
            Ok(created) => Ok(created),
            Err(RepositoryError::Conflict) => self
                .store
                .customer_by_email(organization_id, email)?
                .ok_or_else(|| {
                    FeedbackServiceError::Repository(RepositoryError::Unavailable(
                        "customer creation raced with a delete".to_string(),
                    ))
                }),
            Err(other) => Err(other.into()),
        }
    }

    /// Canonical score: the top-level score wins; otherwise the numeric
    /// answer to the survey's designated NPS question. Both paths are range
    /// checked by validation before this runs.
    fn resolve_score(&self, survey: &SurveyRecord, submission: &ResponseSubmission) -> Option<u8> {
        if let Some(score) = submission.score {
            return Some(score as u8);
        }
        let nps_question = survey.nps_question()?;
        submission
            .answers
            .iter()
            .find(|answer| answer.question_id == nps_question.id)
            .and_then(|answer| answer.numeric_value)
            .map(|value| value as u8)
    }

    fn load_survey(
        &self,
        survey_id: &SurveyId,
        organization_id: Option<&OrganizationId>,
    ) -> Result<SurveyRecord, FeedbackServiceError> {
        let survey = self
            .store
            .survey(survey_id)?
            .ok_or(FeedbackServiceError::SurveyNotFound)?;
        if let Some(organization_id) = organization_id {
            if &survey.organization_id != organization_id {
                return Err(FeedbackServiceError::SurveyNotFound);
            }
        }
        Ok(survey)
    }

    fn load_response(
        &self,
        response_id: &ResponseId,
        organization_id: &OrganizationId,
    ) -> Result<ResponseRecord, FeedbackServiceError> {
        let response = self
            .store
            .response(response_id)?
            .ok_or(FeedbackServiceError::ResponseNotFound)?;
        // Scope through the owning survey; a response has no organization of
        // its own.
        let survey = self
            .store
            .survey(&response.survey_id)?
            .ok_or(FeedbackServiceError::ResponseNotFound)?;
        if &survey.organization_id != organization_id {
            return Err(FeedbackServiceError::ResponseNotFound);
        }
        Ok(response)
    }

    fn load_customer(
        &self,
        customer_id: &CustomerId,
        organization_id: &OrganizationId,
    ) -> Result<CustomerRecord, FeedbackServiceError> {
        let customer = self
            .store
            .customer(customer_id)?
            .ok_or(FeedbackServiceError::CustomerNotFound)?;
        if &customer.organization_id != organization_id {
            return Err(FeedbackServiceError::CustomerNotFound);
        }
        Ok(customer)
    }

    fn load_campaign(
        &self,
        campaign_id: &CampaignId,
        organization_id: Option<&OrganizationId>,
    ) -> Result<CampaignRecord, FeedbackServiceError> {
        let campaign = self
            .store
            .campaign(campaign_id)?
            .ok_or(FeedbackServiceError::CampaignNotFound)?;
        if let Some(organization_id) = organization_id {
            if &campaign.organization_id != organization_id {
                return Err(FeedbackServiceError::CampaignNotFound);
            }
        }
        Ok(campaign)
    }
}
