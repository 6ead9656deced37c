use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for organizations (tenant scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Identifier wrapper for surveys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurveyId(pub String);

/// Identifier wrapper for survey questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for submitted responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

/// Identifier wrapper for customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Identifier wrapper for distribution campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

/// NPS respondent segment derived from the 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Promoter,
    Passive,
    Detractor,
}

impl Segment {
    pub const fn label(self) -> &'static str {
        match self {
            Segment::Promoter => "promoter",
            Segment::Passive => "passive",
            Segment::Detractor => "detractor",
        }
    }
}

/// Lifecycle status of a survey; only ACTIVE surveys accept public submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    Draft,
    Active,
    Paused,
    Closed,
}

impl SurveyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SurveyStatus::Draft => "draft",
            SurveyStatus::Active => "active",
            SurveyStatus::Paused => "paused",
            SurveyStatus::Closed => "closed",
        }
    }
}

/// Question kinds relevant to ingestion. The NPS kind marks the question whose
/// numeric answer becomes the canonical response score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Nps,
    Rating,
    Text,
    MultipleChoice,
}

/// Question metadata the coordinator needs; full question CRUD lives in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub position: u32,
}

/// Survey snapshot read by the coordinator. Aggregate counters live separately
/// in [`SurveyAggregate`] so the recompute write stays a single atomic update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id: SurveyId,
    pub organization_id: OrganizationId,
    pub status: SurveyStatus,
    pub anonymous_responses: bool,
    pub questions: Vec<QuestionRecord>,
}

impl SurveyRecord {
    /// The designated NPS question: first NPS-kind question in position order.
    /// Behavior with multiple NPS questions is a product open question; the
    /// first one wins, matching the shipped scan order.
    pub fn nps_question(&self) -> Option<&QuestionRecord> {
        self.questions
            .iter()
            .filter(|question| question.kind == QuestionKind::Nps)
            .min_by_key(|question| question.position)
    }
}

/// Lifecycle status of a response record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Started,
    Completed,
    Abandoned,
}

/// A persisted survey response. `segment` is non-null iff `score` is non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub survey_id: SurveyId,
    pub customer_id: Option<CustomerId>,
    pub campaign_id: Option<CampaignId>,
    pub respondent_email: Option<String>,
    pub respondent_name: Option<String>,
    pub score: Option<u8>,
    pub segment: Option<Segment>,
    pub feedback: Option<String>,
    pub status: ResponseStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub flagged: bool,
    pub flag_reason: Option<String>,
}

/// One answer per question per response; owned by its response and deleted
/// with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub value: Option<String>,
    pub numeric_value: Option<i64>,
    pub selected_options: Option<Vec<String>>,
    pub other_value: Option<String>,
}

/// A customer row; the aggregate fields are re-derived by the customer
/// aggregator, never incremented in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub organization_id: OrganizationId,
    pub email: String,
    pub name: String,
    pub nps_score: Option<u8>,
    pub segment: Option<Segment>,
    pub last_survey_at: Option<DateTime<Utc>>,
    pub total_responses: u64,
    pub created_at: DateTime<Utc>,
}

/// Monotonic distribution-campaign counters. `sent` is set by the host when a
/// campaign goes out; everything else arrives as additive events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCounters {
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub responded: u64,
    pub bounced: u64,
    pub unsubscribed: u64,
}

/// A distribution campaign as this core sees it: an attribution target with
/// counters. Delivery mechanics stay in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: CampaignId,
    pub organization_id: OrganizationId,
    pub survey_id: SurveyId,
    pub counters: CampaignCounters,
}

/// Campaign counter fields that can be incremented by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEvent {
    Delivered,
    Opened,
    Clicked,
    Responded,
    Bounced,
    Unsubscribed,
}

impl CampaignEvent {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignEvent::Delivered => "delivered",
            CampaignEvent::Opened => "opened",
            CampaignEvent::Clicked => "clicked",
            CampaignEvent::Responded => "responded",
            CampaignEvent::Bounced => "bounced",
            CampaignEvent::Unsubscribed => "unsubscribed",
        }
    }
}

/// Per-survey aggregate, written in one atomic update by the survey
/// aggregator. `nps_score` is `None` when no classified responses exist --
/// never conflated with an actual score of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAggregate {
    pub response_count: u64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
    pub nps_score: Option<i32>,
}

impl SurveyAggregate {
    /// Responses that carried no score and therefore no segment.
    pub fn unclassified(&self) -> u64 {
        self.response_count - (self.promoters + self.passives + self.detractors)
    }
}

/// Per-customer aggregate, re-derived from the customer's completed responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub nps_score: Option<u8>,
    pub segment: Option<Segment>,
    pub last_survey_at: Option<DateTime<Utc>>,
    pub total_responses: u64,
}

/// Campaign counters plus funnel rates, computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignStatsView {
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub responded: u64,
    pub bounced: u64,
    pub unsubscribed: u64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub response_rate: f64,
}

/// One answer in an incoming submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: QuestionId,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub numeric_value: Option<i64>,
    #[serde(default)]
    pub selected_options: Option<Vec<String>>,
    #[serde(default)]
    pub other_value: Option<String>,
}

/// An incoming response payload, already shaped by the host boundary.
///
/// `submitted_at` lets callers replay late-arriving submissions with their
/// true submission time; it defaults to the ingestion clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSubmission {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub respondent_email: Option<String>,
    #[serde(default)]
    pub respondent_name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Trend reporting windows. Each maps to a lookback span and bucket
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    pub const fn lookback_days(self) -> i64 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
            Timeframe::Year => 365,
        }
    }
}

/// One time bucket of the NPS trend series. Buckets with no responses are
/// omitted from the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub bucket: String,
    pub nps: i32,
    pub responses: u64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
}
