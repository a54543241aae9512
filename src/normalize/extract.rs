//! Release to record extraction.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::ExtractError;
use crate::normalize::cpv::extract_cpv_info;
use crate::normalize::dates::{format_timestamp, parse_date};
use crate::schema::release::{Amount, Planning, Project, Release, Tender};
use crate::schema::{PipelineRecord, TenderRecord};

/// Public notice page; the release id is appended
pub const NOTICE_URL_BASE: &str = "https://www.find-tender.service.gov.uk/Notice/";

/// Status written to every pipeline record
pub const PIPELINE_STATUS: &str = "Pipeline";

/// Build a tender table record from a release.
///
/// # Errors
/// Returns [`ExtractError::MissingOcid`] when the release has no `ocid`.
pub fn extract_tender_record(release: &Release) -> Result<TenderRecord, ExtractError> {
    let ocid = require_ocid(release)?;
    let default_tender = Tender::default();
    let tender = release.tender.as_ref().unwrap_or(&default_tender);
    let (cpv_codes, cpv_descriptions) = extract_cpv_info(tender);
    let (value_amount, currency) = amount_parts(tender.value.as_ref());
    let release_id = release.id.clone().unwrap_or_default();

    Ok(TenderRecord {
        ocid: Some(ocid),
        notice_url: notice_url(&release_id),
        release_id,
        title: text(tender.title.as_ref()),
        description: text(tender.description.as_ref()),
        buyer_name: buyer_name(release),
        value_amount,
        currency,
        tender_end_date: parse_date(
            tender
                .tender_period
                .as_ref()
                .and_then(|period| period.end_date.as_deref()),
        ),
        published_date: parse_date(release.date.as_deref()),
        status: text(tender.status.as_ref()),
        submission_url: text(tender.submission_method_details.as_ref()),
        cpv_codes,
        cpv_descriptions,
    })
}

/// Build a pipeline table record from a release.
///
/// Title and description fall back to the planning project when the tender
/// leaves them empty. `Last Updated` is stamped with `processed_at`.
///
/// # Errors
/// Returns [`ExtractError::MissingOcid`] when the release has no `ocid`.
pub fn extract_pipeline_record(
    release: &Release,
    processed_at: NaiveDateTime,
) -> Result<PipelineRecord, ExtractError> {
    let ocid = require_ocid(release)?;
    let default_tender = Tender::default();
    let tender = release.tender.as_ref().unwrap_or(&default_tender);
    let default_project = Project::default();
    let project = release
        .planning
        .as_ref()
        .and_then(|planning| planning.project.as_ref())
        .unwrap_or(&default_project);
    let (budget_amount, currency) = amount_parts(budget_amount(release.planning.as_ref()));

    Ok(PipelineRecord {
        ocid: Some(ocid),
        release_id: release.id.clone().unwrap_or_default(),
        title: first_non_empty(tender.title.as_ref(), project.title.as_ref()),
        description: first_non_empty(tender.description.as_ref(), project.description.as_ref()),
        buyer_name: buyer_name(release),
        budget_amount,
        currency,
        planning_stage: sector(project.sector.as_ref()),
        published_date: parse_date(release.date.as_deref()),
        status: PIPELINE_STATUS.to_string(),
        last_updated: format_timestamp(processed_at),
    })
}

/// Notice page URL for a release id; empty for an empty id
#[must_use]
pub fn notice_url(release_id: &str) -> String {
    if release_id.is_empty() {
        String::new()
    } else {
        format!("{NOTICE_URL_BASE}{release_id}")
    }
}

fn require_ocid(release: &Release) -> Result<String, ExtractError> {
    release
        .ocid
        .as_deref()
        .map(str::trim)
        .filter(|ocid| !ocid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ExtractError::MissingOcid {
            release_id: release.display_id().to_string(),
        })
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn first_non_empty(primary: Option<&String>, fallback: Option<&String>) -> String {
    primary
        .filter(|value| !value.is_empty())
        .or(fallback)
        .cloned()
        .unwrap_or_default()
}

fn buyer_name(release: &Release) -> String {
    text(release.buyer.as_ref().and_then(|buyer| buyer.name.as_ref()))
}

fn budget_amount(planning: Option<&Planning>) -> Option<&Amount> {
    planning
        .and_then(|planning| planning.budget.as_ref())
        .and_then(|budget| budget.amount.as_ref())
}

/// Amount and currency; currency is empty when there is no amount block
fn amount_parts(amount: Option<&Amount>) -> (Option<serde_json::Number>, String) {
    amount.map_or((None, String::new()), |amount| {
        (amount.amount.clone(), text(amount.currency.as_ref()))
    })
}

fn sector(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(sector)) => sector.clone(),
        Some(other) => other.to_string(),
    }
}
