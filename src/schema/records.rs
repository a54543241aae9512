//! Flat output records
//!
//! Column names match the store tables exactly.

use macros::FlatRecord;
use serde_json::Number;

/// Record stored in the tender table
#[derive(Debug, Clone, Default, PartialEq, FlatRecord)]
#[record(kind = "Tender")]
pub struct TenderRecord {
    #[field(name = "OCID", key)]
    pub ocid: Option<String>,

    #[field(name = "Release ID")]
    pub release_id: String,

    #[field(name = "Title")]
    pub title: String,

    #[field(name = "Description")]
    pub description: String,

    #[field(name = "Buyer Name")]
    pub buyer_name: String,

    #[field(name = "Value Amount")]
    pub value_amount: Option<Number>,

    #[field(name = "Currency")]
    pub currency: String,

    /// `MM/DD/YYYY`
    #[field(name = "Tender End Date")]
    pub tender_end_date: Option<String>,

    /// `MM/DD/YYYY`
    #[field(name = "Published Date")]
    pub published_date: Option<String>,

    #[field(name = "Status")]
    pub status: String,

    #[field(name = "Submission URL")]
    pub submission_url: String,

    #[field(name = "CPV Codes")]
    pub cpv_codes: Vec<String>,

    #[field(name = "CPV Descriptions")]
    pub cpv_descriptions: Vec<String>,

    /// Empty when the release has no id
    #[field(name = "Notice URL")]
    pub notice_url: String,
}

/// Record stored in the pipeline table
#[derive(Debug, Clone, Default, PartialEq, FlatRecord)]
#[record(kind = "Pipeline")]
pub struct PipelineRecord {
    #[field(name = "OCID", key)]
    pub ocid: Option<String>,

    #[field(name = "Release ID")]
    pub release_id: String,

    #[field(name = "Title")]
    pub title: String,

    #[field(name = "Description")]
    pub description: String,

    #[field(name = "Buyer Name")]
    pub buyer_name: String,

    #[field(name = "Budget Amount")]
    pub budget_amount: Option<Number>,

    #[field(name = "Currency")]
    pub currency: String,

    #[field(name = "Planning Stage")]
    pub planning_stage: String,

    #[field(name = "Published Date")]
    pub published_date: Option<String>,

    /// Always `Pipeline`
    #[field(name = "Status")]
    pub status: String,

    /// Local processing time, `MM/DD/YYYY HH:MM:SS`. Differs on every run.
    #[field(name = "Last Updated")]
    pub last_updated: String,
}
