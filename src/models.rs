use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum BusinessType {
    Product,
    Service,
    #[serde(rename = "Content/Media")]
    #[value(name = "content-media")]
    ContentMedia,
    Marketplace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SoloOrTeam {
    Solo,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Stage {
    #[serde(rename = "Idea only")]
    #[value(name = "idea")]
    IdeaOnly,
    #[serde(rename = "Pre-revenue")]
    #[value(name = "pre-revenue")]
    PreRevenue,
    #[serde(rename = "First customers")]
    #[value(name = "first-customers")]
    FirstCustomers,
    #[serde(rename = "Active revenue")]
    #[value(name = "active-revenue")]
    ActiveRevenue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum IncomeUrgency {
    Immediate,
    #[serde(rename = "Within a few months")]
    #[value(name = "soon")]
    SoonMonths,
    #[serde(rename = "Just exploring")]
    #[value(name = "exploring")]
    Exploring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::IdeaOnly => "Idea only",
            Stage::PreRevenue => "Pre-revenue",
            Stage::FirstCustomers => "First customers",
            Stage::ActiveRevenue => "Active revenue",
        };
        f.pad(s)
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BusinessType::Product => "Product",
            BusinessType::Service => "Service",
            BusinessType::ContentMedia => "Content/Media",
            BusinessType::Marketplace => "Marketplace",
            BusinessType::Other => "Other",
        };
        f.pad(s)
    }
}

/// A generated artifact attached to a profile, together with the assessment
/// answers that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArtifact<A, R> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub assessment: A,
    pub result: R,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLogo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub style: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorNote {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// 0-100, clamped on save.
    pub compatibility: u8,
    pub notes: String,
}

// --- Assessments and generated results ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapAssessment {
    pub business_name: String,
    pub business_type: BusinessType,
    pub stage: Stage,
    pub time_available_per_week: String,
    pub income_urgency: IncomeUrgency,
    #[serde(default)]
    pub existing_assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub description: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapResult {
    pub summary: String,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchAssessment {
    pub business_name: String,
    pub target_customer: Option<String>,
    pub problem_being_solved: Option<String>,
    pub pricing_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchResult {
    pub elevator_pitch: String,
    pub problem: String,
    pub solution: String,
    pub ask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAssessment {
    pub business_name: String,
    pub business_type: BusinessType,
    pub stage: Stage,
    pub pricing_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueStrategy {
    pub name: String,
    pub description: String,
    pub first_step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategies: Vec<RevenueStrategy>,
}

/// The root aggregate: one user-defined venture plus everything generated
/// for it. Sub-collections are only ever appended to or edited in place,
/// never swapped wholesale, so sibling artifacts survive every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: String,
    pub business_name: String,
    pub business_type: BusinessType,
    pub solo_or_team: SoloOrTeam,
    pub stage: Stage,
    pub time_available_per_week: String,
    pub income_urgency: IncomeUrgency,
    #[serde(default)]
    pub target_customer: Option<String>,
    #[serde(default)]
    pub problem_being_solved: Option<String>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub existing_assets: Vec<String>,
    #[serde(default)]
    pub saved_roadmaps: Vec<SavedArtifact<RoadmapAssessment, RoadmapResult>>,
    #[serde(default)]
    pub saved_pitches: Vec<SavedArtifact<PitchAssessment, PitchResult>>,
    #[serde(default)]
    pub saved_revenue_strategies: Vec<SavedArtifact<StrategyAssessment, StrategyResult>>,
    #[serde(default)]
    pub saved_logos: Vec<SavedLogo>,
    #[serde(default)]
    pub notes: Vec<ProfileNote>,
    #[serde(default)]
    pub favorite_investors: Vec<String>,
    #[serde(default)]
    pub investor_notes: BTreeMap<String, InvestorNote>,
}

/// The answers a profile is created from. Identity and timestamps are
/// assigned by the store on first save.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub business_name: String,
    pub business_type: BusinessType,
    pub solo_or_team: SoloOrTeam,
    pub stage: Stage,
    pub time_available_per_week: String,
    pub income_urgency: IncomeUrgency,
    pub target_customer: Option<String>,
    pub problem_being_solved: Option<String>,
    pub pricing_model: Option<String>,
    pub existing_assets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum JobStatus {
    Interested,
    Applied,
    Interviewing,
    Rejected,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Interested => "Interested",
            JobStatus::Applied => "Applied",
            JobStatus::Interviewing => "Interviewing",
            JobStatus::Rejected => "Rejected",
        };
        f.pad(s)
    }
}

/// A job the user wants to track. The id is the application URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: String,
    pub title: String,
    pub company: String,
    pub status: JobStatus,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Recency {
    #[serde(rename = "Any time")]
    #[value(name = "any")]
    AnyTime,
    #[serde(rename = "Past month")]
    #[value(name = "month")]
    PastMonth,
    #[serde(rename = "Past week")]
    #[value(name = "week")]
    PastWeek,
    #[serde(rename = "Past 24 hours")]
    #[value(name = "day")]
    Past24Hours,
}

/// A frozen search-filter snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAlert {
    pub id: String,
    pub keywords: String,
    pub location: String,
    pub job_type: String,
    pub recency: Recency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResume {
    pub id: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubTask {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubReminder {
    pub id: String,
    pub title: String,
    pub due: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
