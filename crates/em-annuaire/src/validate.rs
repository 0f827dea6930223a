use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    record::{Attribute, EstablishmentRecord},
    status::{Status, StatusSink},
};

/// Lenient commune comparison: equal, or either name contains the other,
/// ignoring case.
pub fn commune_matches(record_commune: &str, expected: &str) -> bool {
    let record_commune = record_commune.to_lowercase();
    let expected = expected.to_lowercase();
    record_commune == expected
        || record_commune.contains(&expected)
        || expected.contains(&record_commune)
}

/// Keep the records that belong to the searched commune and one of the
/// accepted postal codes.
pub fn validate_results(
    records: Vec<EstablishmentRecord>,
    commune: &str,
    postal_codes: &[String],
    sink: &dyn StatusSink,
) -> Vec<EstablishmentRecord> {
    let total = records.len();
    let valid: Vec<EstablishmentRecord> = records
        .into_iter()
        .filter(|record| {
            let postal_match = record
                .text(Attribute::PostalCode)
                .is_some_and(|code| postal_codes.contains(&code));
            let record_commune = record.text(Attribute::Commune).unwrap_or_default();
            postal_match && commune_matches(&record_commune, commune)
        })
        .collect();

    let filtered_out = total - valid.len();
    if filtered_out > 0 {
        debug!(filtered_out, "dropped records with inconsistent commune or postal code");
    }

    let found: BTreeSet<String> = valid
        .iter()
        .filter_map(|record| record.text(Attribute::PostalCode))
        .collect();
    if found.len() > 1 {
        let codes: Vec<&str> = found.iter().map(String::as_str).collect();
        sink.emit(Status::success(format!(
            "{} establishment(s) found (postal codes: {})",
            valid.len(),
            codes.join(", ")
        )));
    } else {
        sink.emit(Status::success(format!(
            "{} establishment(s) found",
            valid.len()
        )));
    }

    valid
}
