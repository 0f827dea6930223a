use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    constants::{DEFAULT_GEO_SERVICE_URL, GEO_SERVICE_FIELDS},
    error::GetError,
    status::{Status, StatusSink},
};

/// A commune as returned by the reference service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneCandidate {
    #[serde(rename = "nom")]
    pub name: String,
    pub code: String,
    #[serde(rename = "codesPostaux", default)]
    pub postal_codes: Vec<String>,
}

/// The commune identity a search runs against. `code` is `None` when the
/// reference service could not be reached and the user's input is trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommuneReference {
    pub name: String,
    pub code: Option<String>,
}

impl From<CommuneCandidate> for CommuneReference {
    fn from(candidate: CommuneCandidate) -> Self {
        Self {
            name: candidate.name,
            code: Some(candidate.code),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Validation {
    Validated(CommuneReference),
    /// Several communes matched; the first one is used and the rest are kept
    /// so a caller can offer them.
    Ambiguous {
        chosen: CommuneReference,
        alternatives: Vec<CommuneCandidate>,
    },
    NotFound,
    /// The reference service failed; the entered name is used as is.
    Degraded(CommuneReference),
}

impl Validation {
    /// The commune to search with, or `None` if the search must stop.
    pub fn reference(&self) -> Option<&CommuneReference> {
        match self {
            Validation::Validated(reference)
            | Validation::Degraded(reference)
            | Validation::Ambiguous {
                chosen: reference, ..
            } => Some(reference),
            Validation::NotFound => None,
        }
    }
}

/// Query the reference service for communes matching a name and postal code.
pub async fn lookup(
    client: &Client,
    service_url: Option<&str>,
    name: &str,
    postal_code: &str,
) -> Result<Vec<CommuneCandidate>, GetError> {
    let response = client
        .get(service_url.unwrap_or(DEFAULT_GEO_SERVICE_URL))
        .query(&[
            ("nom", name),
            ("codePostal", postal_code),
            ("fields", GEO_SERVICE_FIELDS),
        ])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(GetError::ResponseError(response.status()));
    }
    let body = response.text().await.map_err(GetError::ResponseBodyError)?;
    let candidates = serde_json::from_str::<Vec<CommuneCandidate>>(&body)?;
    Ok(candidates)
}

/// Resolve a user-entered commune to its official identity.
///
/// Only a lookup that succeeds with zero matches yields `NotFound`. Any
/// failure of the lookup itself degrades to the entered name.
pub async fn validate(
    client: &Client,
    service_url: Option<&str>,
    name: &str,
    postal_code: &str,
    sink: &dyn StatusSink,
) -> Validation {
    sink.emit(Status::neutral("Validating commune..."));
    let candidates = match lookup(client, service_url, name, postal_code).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %e, commune = name, "commune validation failed, searching with entered name");
            sink.emit(Status::error(
                "Unable to validate the commune, searching with the entered name",
            ));
            return Validation::Degraded(CommuneReference {
                name: name.to_string(),
                code: None,
            });
        }
    };
    debug!(count = candidates.len(), "commune candidates received");

    let mut candidates = candidates.into_iter();
    let Some(first) = candidates.next() else {
        sink.emit(Status::error("Commune not found for this postal code"));
        return Validation::NotFound;
    };
    let alternatives: Vec<CommuneCandidate> = candidates.collect();
    if !alternatives.is_empty() {
        sink.emit(Status::error(format!(
            "{} communes match this name and postal code",
            alternatives.len() + 1
        )));
        warn!(
            chosen = %first.name,
            alternatives = ?alternatives.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "several communes match, using the first"
        );
        return Validation::Ambiguous {
            chosen: first.into(),
            alternatives,
        };
    }

    sink.emit(Status::success(format!(
        "Commune validated: {} ({})",
        first.name, postal_code
    )));
    Validation::Validated(first.into())
}
