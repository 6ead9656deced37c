use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use surveypulse::feedback::{
    CampaignCounters, CampaignId, CampaignRecord, InMemoryFeedbackStore, OrganizationId,
    QuestionId, QuestionKind, QuestionRecord, SurveyId, SurveyRecord, SurveyStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed the in-memory store with a demo tenant so the service answers
/// requests out of the box. Production hosts wire a real store instead.
pub(crate) fn seed_demo_data(store: &InMemoryFeedbackStore) {
    let organization_id = OrganizationId("org-demo".to_string());
    let survey_id = SurveyId("svy-demo".to_string());

    store.seed_survey(SurveyRecord {
        id: survey_id.clone(),
        organization_id: organization_id.clone(),
        status: SurveyStatus::Active,
        anonymous_responses: false,
        questions: vec![
            QuestionRecord {
                id: QuestionId("q-recommend".to_string()),
                kind: QuestionKind::Nps,
                position: 0,
            },
            QuestionRecord {
                id: QuestionId("q-why".to_string()),
                kind: QuestionKind::Text,
                position: 1,
            },
        ],
    });

    store.seed_campaign(CampaignRecord {
        id: CampaignId("cmp-demo".to_string()),
        organization_id,
        survey_id,
        counters: CampaignCounters {
            sent: 100,
            ..CampaignCounters::default()
        },
    });
}
