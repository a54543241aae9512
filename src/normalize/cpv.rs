//! CPV classification extraction.

use itertools::Itertools;

use crate::schema::release::{Classification, Tender};

/// Scheme name of Common Procurement Vocabulary codes
pub const CPV_SCHEME: &str = "CPV";

/// Collect the CPV codes and descriptions of a tender.
///
/// Looks at the main classification and every item-level additional
/// classification. Non-CPV schemes and empty values are dropped; both lists
/// are deduplicated and sorted ascending, so the result does not depend on
/// item order.
#[must_use]
pub fn extract_cpv_info(tender: &Tender) -> (Vec<String>, Vec<String>) {
    let additional = tender
        .items
        .iter()
        .flatten()
        .flat_map(|item| item.additional_classifications.iter().flatten());

    let (ids, descriptions): (Vec<_>, Vec<_>) = tender
        .classification
        .iter()
        .chain(additional)
        .filter(|classification| is_cpv(classification))
        .map(|classification| (classification.id.as_deref(), classification.description.as_deref()))
        .unzip();

    (sorted_unique(ids), sorted_unique(descriptions))
}

fn is_cpv(classification: &Classification) -> bool {
    classification.scheme.as_deref() == Some(CPV_SCHEME)
}

fn sorted_unique<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .sorted_unstable()
        .dedup()
        .map(str::to_string)
        .collect()
}
