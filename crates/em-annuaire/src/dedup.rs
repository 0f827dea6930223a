use std::collections::HashMap;

use crate::{
    key,
    record::{is_empty_value, EstablishmentRecord},
};

/// Fill the gaps of `existing` with values from `incoming`.
///
/// Fields `existing` already holds are never overwritten.
pub fn merge(existing: &EstablishmentRecord, incoming: &EstablishmentRecord) -> EstablishmentRecord {
    let mut merged = existing.clone();
    for (name, value) in &incoming.fields {
        if is_empty_value(value) {
            continue;
        }
        let missing = merged.fields.get(name).map_or(true, is_empty_value);
        if missing {
            merged.fields.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Fold two batches into one, merging records that share an identity key
/// and dropping the ones that cannot be placed on a map.
///
/// Output order is the order in which each key was first seen.
pub fn combine(
    first: Vec<EstablishmentRecord>,
    second: Vec<EstablishmentRecord>,
) -> Vec<EstablishmentRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut combined: Vec<EstablishmentRecord> = Vec::with_capacity(first.len() + second.len());

    for record in first.into_iter().chain(second) {
        let key = key::derive(&record);
        match index.get(&key) {
            Some(&position) => {
                combined[position] = merge(&combined[position], &record);
            }
            None => {
                index.insert(key, combined.len());
                combined.push(record);
            }
        }
    }

    combined.retain(EstablishmentRecord::has_location);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> EstablishmentRecord {
        serde_json::from_value(json!({ "fields": value })).unwrap()
    }

    #[test]
    fn merge_keeps_existing_values() {
        let existing = record(json!({ "a": 2, "b": 3 }));
        let incoming = record(json!({ "a": 1 }));

        assert_eq!(merge(&existing, &incoming), record(json!({ "a": 2, "b": 3 })));
    }

    #[test]
    fn merge_fills_gaps() {
        let existing = record(json!({ "b": 3 }));
        let incoming = record(json!({ "a": 1, "b": 2 }));

        assert_eq!(merge(&existing, &incoming), record(json!({ "a": 1, "b": 3 })));
    }

    #[test]
    fn merge_replaces_empty_existing_values() {
        let existing = record(json!({ "adresse_1": "", "nom_commune": null }));
        let incoming = record(json!({ "adresse_1": "1 place Jourdan", "nom_commune": "" }));

        let merged = merge(&existing, &incoming);

        assert_eq!(merged.fields["adresse_1"], json!("1 place Jourdan"));
        assert_eq!(merged.fields["nom_commune"], Value::Null);
    }

    #[test]
    fn combine_merges_same_key() {
        let directory = record(json!({
            "identifiant_de_l_etablissement": "0870001A",
            "nom_etablissement": "Lycée Gay-Lussac",
            "position": [45.83, 1.26]
        }));
        let geolocation = record(json!({
            "identifiant_de_l_etablissement": "0870001A",
            "nature_uai_libe": "LYCEE",
            "adresse_uai": "12 boulevard Georges Périn"
        }));

        let combined = combine(vec![directory], vec![geolocation]);

        assert_eq!(combined.len(), 1);
        let fields = &combined[0].fields;
        assert_eq!(fields["nom_etablissement"], json!("Lycée Gay-Lussac"));
        assert_eq!(fields["nature_uai_libe"], json!("LYCEE"));
        assert_eq!(fields["adresse_uai"], json!("12 boulevard Georges Périn"));
    }

    #[test]
    fn combine_location_may_come_from_either_side() {
        let first = record(json!({ "numero_uai": "0870003C" }));
        let second = record(json!({
            "numero_uai": "0870003C",
            "latitude": 45.8,
            "longitude": 1.2
        }));

        let combined = combine(vec![first], vec![second]);

        assert_eq!(combined.len(), 1);
        assert!(combined[0].has_location());
    }

    #[test]
    fn combine_drops_records_without_location() {
        let located = record(json!({ "numero_uai": "A", "coordonnees": [45.0, 1.0] }));
        let unlocated = record(json!({ "numero_uai": "B", "nom_uai": "Nowhere" }));

        let combined = combine(vec![located.clone(), unlocated], vec![]);

        assert_eq!(combined, vec![located]);
    }

    #[test]
    fn combine_empty() {
        assert!(combine(vec![], vec![]).is_empty());
    }

    #[test]
    fn combine_keeps_first_seen_order() {
        let a = record(json!({ "numero_uai": "A", "position": [1.0, 1.0] }));
        let b = record(json!({ "numero_uai": "B", "position": [2.0, 2.0] }));
        let c = record(json!({ "numero_uai": "C", "position": [3.0, 3.0] }));

        let combined = combine(vec![b.clone(), a.clone()], vec![c.clone(), b.clone()]);

        assert_eq!(combined, vec![b, a, c]);
    }

    #[test]
    fn combine_is_idempotent_with_empty_batch() {
        let x = vec![
            record(json!({ "numero_uai": "A", "position": [1.0, 1.0] })),
            record(json!({ "nom_uai": "Ecole B", "adresse_uai": "rue B", "latitude": 2.0, "longitude": 2.0 })),
        ];
        let y = vec![
            record(json!({ "numero_uai": "A", "nature_uai_libe": "ECOLE" })),
            record(json!({ "nom_etablissement": "École b", "adresse": "Rue  B", "type_etablissement": "Ecole" })),
        ];

        let once = combine(x, y);
        let twice = combine(once.clone(), vec![]);

        assert_eq!(once.len(), 2);
        assert_eq!(twice, once);
    }
}
