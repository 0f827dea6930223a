use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical attributes of an establishment and the source field names each
/// one may be published under, in order of preference.
///
/// The two upstream datasets name the same information differently, so every
/// consumer (key derivation, result validation, display) resolves fields
/// through this table instead of naming source fields directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Identifier,
    Name,
    Address,
    PostalCode,
    Commune,
    Kind,
}

impl Attribute {
    pub const fn field_names(self) -> &'static [&'static str] {
        match self {
            Attribute::Identifier => &[
                "identifiant_de_l_etablissement",
                "numero_uai",
                "code_etablissement",
            ],
            Attribute::Name => &["nom_etablissement", "appellation_officielle", "nom_uai"],
            Attribute::Address => &["adresse_1", "adresse", "adresse_uai"],
            Attribute::PostalCode => &["code_postal"],
            Attribute::Commune => &["nom_commune", "commune", "libelle_commune"],
            Attribute::Kind => &["type_etablissement", "nature_uai_libe", "type_uai"],
        }
    }
}

/// Fields holding a `[lat, lon]` pair, in order of preference.
pub const PAIR_LOCATION_FIELDS: [&str; 2] = ["position", "coordonnees"];
pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One establishment as published by a dataset: a loose field mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentRecord {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Whether a field value counts as missing. Absent, null, `false`, zero and
/// the empty string are all treated as "no value".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl EstablishmentRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The value of a source field, if it holds something.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !is_empty_value(value))
    }

    /// The first populated source field for `attribute`, as text.
    pub fn text(&self, attribute: Attribute) -> Option<String> {
        attribute
            .field_names()
            .iter()
            .find_map(|name| self.field(name).and_then(value_text))
    }

    pub fn location(&self) -> Option<Location> {
        for name in PAIR_LOCATION_FIELDS {
            if let Some(Value::Array(pair)) = self.field(name) {
                if let [lat, lon] = pair.as_slice() {
                    if let (Some(latitude), Some(longitude)) = (coordinate(lat), coordinate(lon)) {
                        return Some(Location {
                            latitude,
                            longitude,
                        });
                    }
                }
            }
        }
        let latitude = self.field(LATITUDE_FIELD).and_then(coordinate)?;
        let longitude = self.field(LONGITUDE_FIELD).and_then(coordinate)?;
        Some(Location {
            latitude,
            longitude,
        })
    }

    pub fn has_location(&self) -> bool {
        self.location().is_some()
    }
}
