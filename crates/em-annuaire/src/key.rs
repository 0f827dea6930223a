use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::record::{Attribute, EstablishmentRecord};

/// Lowercase, strip accents, drop all whitespace.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !c.is_whitespace())
        .collect()
}

/// Identity key of an establishment.
///
/// The first populated identifier wins. Records without any identifier fall
/// back to a composite of normalized name, normalized address and postal
/// code, so the same school published with different accents or spacing
/// still collapses to one key.
pub fn derive(record: &EstablishmentRecord) -> String {
    if let Some(id) = record.text(Attribute::Identifier) {
        return id;
    }
    let name = record.text(Attribute::Name).unwrap_or_default();
    let address = record.text(Attribute::Address).unwrap_or_default();
    let postal_code = record.text(Attribute::PostalCode).unwrap_or_default();
    format!(
        "{}_{}_{}",
        normalize(&name),
        normalize(&address),
        postal_code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> EstablishmentRecord {
        serde_json::from_value(json!({ "fields": value })).unwrap()
    }

    #[test]
    fn normalize_strips_accents_case_and_spaces() {
        assert_eq!(normalize("École  Élémentaire\tLa Bastide"), "ecoleelementairelabastide");
    }

    #[test]
    fn national_identifier_wins() {
        let rec = record(json!({
            "identifiant_de_l_etablissement": "0870001A",
            "numero_uai": "0879999Z",
            "nom_etablissement": "Ecole"
        }));

        assert_eq!(derive(&rec), "0870001A");
    }

    #[test]
    fn falls_through_empty_identifiers() {
        let rec = record(json!({
            "identifiant_de_l_etablissement": "",
            "numero_uai": null,
            "code_etablissement": "0870002B"
        }));

        assert_eq!(derive(&rec), "0870002B");
    }

    #[test]
    fn composite_key_ignores_accents_and_case() {
        let first = record(json!({
            "nom_etablissement": "École Jules Ferry",
            "adresse_1": "12 rue de la Paix",
            "code_postal": "87000"
        }));
        let second = record(json!({
            "code_postal": "87000",
            "adresse_uai": "12 Rue De La Paix",
            "nom_uai": "ECOLE JULES  FERRY"
        }));

        assert_eq!(derive(&first), "ecolejulesferry_12ruedelapaix_87000");
        assert_eq!(derive(&first), derive(&second));
    }

    #[test]
    fn composite_key_without_anything() {
        assert_eq!(derive(&EstablishmentRecord::default()), "__");
    }
}
