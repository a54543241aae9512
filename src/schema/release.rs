//! OCDS release documents
//!
//! Only the parts of a release that feed the two output schemas are modelled.
//! Every field is optional; unknown fields are ignored.

use serde::Deserialize;
use serde_json::{Number, Value};

/// Response body of the release package endpoint.
///
/// Releases are kept as raw JSON so that each one is decoded on its own and a
/// malformed release cannot fail the whole package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleasePackage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub releases: Vec<Value>,
}

impl ReleasePackage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub ocid: Option<String>,
    pub id: Option<String>,
    pub date: Option<String>,
    pub tender: Option<Tender>,
    pub planning: Option<Planning>,
    pub buyer: Option<Organization>,
}

impl Release {
    /// Release id for log lines
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub submission_method_details: Option<String>,
    pub value: Option<Amount>,
    pub tender_period: Option<Period>,
    pub classification: Option<Classification>,
    pub items: Option<Vec<Item>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub additional_classifications: Option<Vec<Classification>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Classification {
    pub scheme: Option<String>,
    pub id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Amount {
    pub amount: Option<Number>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Planning {
    pub budget: Option<Budget>,
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Budget {
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Free-form in practice; only string sectors are used
    pub sector: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    pub name: Option<String>,
}
