use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::feedback::domain::{
    AnswerInput, CampaignCounters, CampaignId, CampaignRecord, OrganizationId, QuestionId,
    QuestionKind, QuestionRecord, ResponseSubmission, SurveyId, SurveyRecord, SurveyStatus,
};
use crate::feedback::memory::InMemoryFeedbackStore;
use crate::feedback::repository::{FeedbackStore, RepositoryError};
use crate::feedback::service::FeedbackService;

pub(super) const ORG: &str = "org-acme";
pub(super) const SURVEY: &str = "svy-relationship";
pub(super) const CAMPAIGN: &str = "cmp-q3-launch";
pub(super) const NPS_QUESTION: &str = "q-nps";
pub(super) const COMMENT_QUESTION: &str = "q-comment";

pub(super) fn org() -> OrganizationId {
    OrganizationId(ORG.to_string())
}

pub(super) fn other_org() -> OrganizationId {
    OrganizationId("org-rival".to_string())
}

pub(super) fn survey_id() -> SurveyId {
    SurveyId(SURVEY.to_string())
}

pub(super) fn campaign_id() -> CampaignId {
    CampaignId(CAMPAIGN.to_string())
}

/// Deterministic reference clock for fixtures.
pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_before(days: i64) -> DateTime<Utc> {
    base_time() - Duration::days(days)
}

pub(super) fn survey_record(status: SurveyStatus, anonymous: bool) -> SurveyRecord {
    SurveyRecord {
        id: survey_id(),
        organization_id: org(),
        status,
        anonymous_responses: anonymous,
        questions: vec![
            QuestionRecord {
                id: QuestionId(NPS_QUESTION.to_string()),
                kind: QuestionKind::Nps,
                position: 0,
            },
            QuestionRecord {
                id: QuestionId(COMMENT_QUESTION.to_string()),
                kind: QuestionKind::Text,
                position: 1,
            },
        ],
    }
}

pub(super) fn campaign_record(sent: u64) -> CampaignRecord {
    CampaignRecord {
        id: campaign_id(),
        organization_id: org(),
        survey_id: survey_id(),
        counters: CampaignCounters {
            sent,
            ..CampaignCounters::default()
        },
    }
}

/// Service over a fresh in-memory store seeded with an active survey and a
/// campaign that already went out to 40 recipients.
pub(super) fn setup() -> (FeedbackService<InMemoryFeedbackStore>, Arc<InMemoryFeedbackStore>) {
    setup_with_survey(survey_record(SurveyStatus::Active, false))
}

pub(super) fn setup_with_survey(
    survey: SurveyRecord,
) -> (FeedbackService<InMemoryFeedbackStore>, Arc<InMemoryFeedbackStore>) {
    let store = Arc::new(InMemoryFeedbackStore::new());
    store.seed_survey(survey);
    store.seed_campaign(campaign_record(40));
    let service = FeedbackService::new(store.clone());
    (service, store)
}

pub(super) fn scored_submission(score: i64) -> ResponseSubmission {
    ResponseSubmission {
        score: Some(score),
        submitted_at: Some(base_time()),
        ..ResponseSubmission::default()
    }
}

pub(super) fn email_submission(email: &str, score: i64) -> ResponseSubmission {
    ResponseSubmission {
        respondent_email: Some(email.to_string()),
        score: Some(score),
        submitted_at: Some(base_time()),
        ..ResponseSubmission::default()
    }
}

/// Submission that carries the score only inside the NPS question's answer.
pub(super) fn answered_submission(nps_value: i64, comment: &str) -> ResponseSubmission {
    ResponseSubmission {
        answers: vec![
            AnswerInput {
                question_id: QuestionId(NPS_QUESTION.to_string()),
                numeric_value: Some(nps_value),
                ..AnswerInput::default()
            },
            AnswerInput {
                question_id: QuestionId(COMMENT_QUESTION.to_string()),
                value: Some(comment.to_string()),
                ..AnswerInput::default()
            },
        ],
        submitted_at: Some(base_time()),
        ..ResponseSubmission::default()
    }
}

/// Store that fails every operation, for persistence-error propagation tests.
pub(super) struct UnavailableStore;

impl UnavailableStore {
    fn down<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl FeedbackStore for UnavailableStore {
    fn survey(
        &self,
        _id: &crate::feedback::domain::SurveyId,
    ) -> Result<Option<SurveyRecord>, RepositoryError> {
        Self::down()
    }

    fn survey_aggregate(
        &self,
        _id: &crate::feedback::domain::SurveyId,
    ) -> Result<Option<crate::feedback::domain::SurveyAggregate>, RepositoryError> {
        Self::down()
    }

    fn write_survey_aggregate(
        &self,
        _id: &crate::feedback::domain::SurveyId,
        _aggregate: crate::feedback::domain::SurveyAggregate,
    ) -> Result<(), RepositoryError> {
        Self::down()
    }

    fn insert_response(
        &self,
        _record: crate::feedback::domain::ResponseRecord,
        _answers: Vec<crate::feedback::domain::AnswerRecord>,
    ) -> Result<crate::feedback::domain::ResponseRecord, RepositoryError> {
        Self::down()
    }

    fn response(
        &self,
        _id: &crate::feedback::domain::ResponseId,
    ) -> Result<Option<crate::feedback::domain::ResponseRecord>, RepositoryError> {
        Self::down()
    }

    fn update_response(
        &self,
        _record: crate::feedback::domain::ResponseRecord,
    ) -> Result<(), RepositoryError> {
        Self::down()
    }

    fn remove_response(
        &self,
        _id: &crate::feedback::domain::ResponseId,
    ) -> Result<crate::feedback::domain::ResponseRecord, RepositoryError> {
        Self::down()
    }

    fn completed_responses_for_survey(
        &self,
        _survey_id: &crate::feedback::domain::SurveyId,
    ) -> Result<Vec<crate::feedback::domain::ResponseRecord>, RepositoryError> {
        Self::down()
    }

    fn completed_responses_for_customer(
        &self,
        _customer_id: &crate::feedback::domain::CustomerId,
    ) -> Result<Vec<crate::feedback::domain::ResponseRecord>, RepositoryError> {
        Self::down()
    }

    fn completed_responses_for_organization(
        &self,
        _organization_id: &OrganizationId,
        _since: DateTime<Utc>,
    ) -> Result<Vec<crate::feedback::domain::ResponseRecord>, RepositoryError> {
        Self::down()
    }

    fn customer(
        &self,
        _id: &crate::feedback::domain::CustomerId,
    ) -> Result<Option<crate::feedback::domain::CustomerRecord>, RepositoryError> {
        Self::down()
    }

    fn customer_by_email(
        &self,
        _organization_id: &OrganizationId,
        _email: &str,
    ) -> Result<Option<crate::feedback::domain::CustomerRecord>, RepositoryError> {
        Self::down()
    }

    fn insert_customer(
        &self,
        _record: crate::feedback::domain::CustomerRecord,
    ) -> Result<crate::feedback::domain::CustomerRecord, RepositoryError> {
        Self::down()
    }

    fn write_customer_aggregate(
        &self,
        _id: &crate::feedback::domain::CustomerId,
        _aggregate: crate::feedback::domain::CustomerAggregate,
    ) -> Result<(), RepositoryError> {
        Self::down()
    }

    fn campaign(
        &self,
        _id: &CampaignId,
    ) -> Result<Option<CampaignRecord>, RepositoryError> {
        Self::down()
    }

    fn add_to_campaign_counter(
        &self,
        _id: &CampaignId,
        _event: crate::feedback::domain::CampaignEvent,
        _delta: u64,
    ) -> Result<(), RepositoryError> {
        Self::down()
    }
}
