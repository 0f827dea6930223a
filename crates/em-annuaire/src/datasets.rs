use reqwest::Client;
use serde::Deserialize;

use crate::{
    constants::{DEFAULT_RECORDS_SERVICE_URL, DIRECTORY_DATASET_ID, GEOLOCATION_DATASET_ID},
    error::GetError,
    record::EstablishmentRecord,
};

/// The two establishment datasets searched for every postal code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dataset {
    /// National directory of education establishments.
    Directory,
    /// Addresses and geolocation of primary and secondary schools.
    Geolocation,
}

impl Dataset {
    pub fn id(self) -> &'static str {
        match self {
            Dataset::Directory => DIRECTORY_DATASET_ID,
            Dataset::Geolocation => GEOLOCATION_DATASET_ID,
        }
    }

    /// Field the dataset publishes the commune name under.
    pub fn commune_field(self) -> &'static str {
        match self {
            Dataset::Directory => "nom_commune",
            Dataset::Geolocation => "commune",
        }
    }
}

/// Geographic constraint applied next to the commune name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope<'a> {
    PostalCode(&'a str),
    Department(&'a str),
}

#[derive(Clone, Copy, Debug)]
pub struct Query<'a> {
    pub dataset: Dataset,
    pub commune: &'a str,
    pub scope: Scope<'a>,
    pub rows: u32,
}

impl Query<'_> {
    pub fn params(&self) -> Vec<(String, String)> {
        let scope = match self.scope {
            Scope::PostalCode(code) => ("refine.code_postal".to_string(), code.to_string()),
            Scope::Department(department) => {
                ("refine.code_departement".to_string(), department.to_string())
            }
        };
        vec![
            ("dataset".to_string(), self.dataset.id().to_string()),
            (
                format!("refine.{}", self.dataset.commune_field()),
                self.commune.to_string(),
            ),
            scope,
            ("rows".to_string(), self.rows.to_string()),
        ]
    }
}

/// Response from the record search service.
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    records: Option<Vec<EstablishmentRecord>>,
}

/// Fetch the records of one dataset matching `query`.
pub async fn get(
    client: &Client,
    service_url: Option<&str>,
    query: &Query<'_>,
) -> Result<Vec<EstablishmentRecord>, GetError> {
    let response = client
        .get(service_url.unwrap_or(DEFAULT_RECORDS_SERVICE_URL))
        .query(&query.params())
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(GetError::ResponseError(response.status()));
    }
    let body = response.text().await.map_err(GetError::ResponseBodyError)?;
    let parsed_body: SearchResponse = serde_json::from_str(&body)?;
    Ok(parsed_body.records.unwrap_or_default())
}
