use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, LazyLock,
};

use derive_builder::Builder;
use futures::future::join_all;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    commune::{self, Validation},
    constants::{DEFAULT_ROWS, DEFAULT_WIDEN_THRESHOLD},
    datasets::{self, Dataset, Query, Scope},
    dedup,
    error::{ClientInitError, EndpointConfigError, GetError, SearchError},
    postal,
    record::EstablishmentRecord,
    status::{Status, StatusSink},
    validate,
};

static ENDPOINT_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("Invalid regex pattern"));

#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    endpoints: Option<EndpointConfig>,
    options: SearchOptions,
    latest: Arc<AtomicU64>,
}

/// Overrides for the remote services. Unset endpoints use the public ones.
#[derive(Clone, Debug, Default)]
pub struct EndpointConfig {
    pub geo: Option<Endpoint>,
    pub records: Option<Endpoint>,
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), EndpointConfigError> {
        for (name, endpoint) in [("geo", &self.geo), ("records", &self.records)] {
            if let Some(endpoint) = endpoint {
                endpoint.validate(name)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Endpoint {
    pub url: String,
}

impl Endpoint {
    fn validate(&self, name: &str) -> Result<(), EndpointConfigError> {
        if self.url.is_empty() {
            return Err(EndpointConfigError::MissingUrl(name.to_string()));
        }
        if !ENDPOINT_URL_REGEX.is_match(&self.url) {
            return Err(EndpointConfigError::UnsupportedScheme(
                name.to_string(),
                self.url.clone(),
            ));
        }
        Ok(())
    }
}

#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(default)]
pub struct SearchOptions {
    /// Below this many records after the postal-code passes, search the
    /// whole department once more.
    pub widen_threshold: usize,
    /// Rows requested from each dataset call.
    pub rows: u32,
    pub widen: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            widen_threshold: DEFAULT_WIDEN_THRESHOLD,
            rows: DEFAULT_ROWS,
            widen: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub sequence: u64,
    pub commune: Validation,
    pub postal_codes: Vec<String>,
    pub records: Vec<EstablishmentRecord>,
}

/// Turn a failed call into an empty contribution, unless the service
/// answered with something unreadable.
fn absorb(
    result: Result<Vec<EstablishmentRecord>, GetError>,
    dataset: Dataset,
    postal_code: &str,
) -> Result<Vec<EstablishmentRecord>, GetError> {
    match result {
        Ok(records) => Ok(records),
        Err(e) if e.is_transport() => {
            warn!(error = %e, dataset = dataset.id(), postal_code, "dataset call failed, ignoring");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

impl Client {
    pub fn new(
        http_client: reqwest::Client,
        endpoints: Option<EndpointConfig>,
        options: SearchOptions,
    ) -> Result<Self, ClientInitError> {
        if let Some(endpoints) = &endpoints {
            endpoints.validate()?
        }
        Ok(Self {
            http_client,
            endpoints,
            options,
            latest: Arc::new(AtomicU64::new(0)),
        })
    }

    fn geo_url(&self) -> Option<&str> {
        self.endpoints
            .as_ref()
            .and_then(|endpoints| endpoints.geo.as_ref())
            .map(|endpoint| endpoint.url.as_str())
    }

    fn records_url(&self) -> Option<&str> {
        self.endpoints
            .as_ref()
            .and_then(|endpoints| endpoints.records.as_ref())
            .map(|endpoint| endpoint.url.as_str())
    }

    pub async fn validate_commune(
        &self,
        commune: &str,
        postal_code: &str,
        sink: &dyn StatusSink,
    ) -> Validation {
        commune::validate(&self.http_client, self.geo_url(), commune, postal_code, sink).await
    }

    /// Search the establishments of a commune.
    ///
    /// Clones of a client share one sequence counter; when a newer search has
    /// started by the time this one has its data, this one returns
    /// [`SearchError::Stale`] instead of results.
    #[instrument(skip(self, sink))]
    pub async fn search(
        &self,
        commune: &str,
        postal_code: &str,
        sink: &dyn StatusSink,
    ) -> Result<SearchOutcome, SearchError> {
        let commune = commune.trim();
        let postal_code = postal_code.trim();
        if commune.is_empty() {
            return Err(SearchError::MissingInput("commune"));
        }
        if postal_code.is_empty() {
            return Err(SearchError::MissingInput("postal code"));
        }
        let sequence = self.next_sequence();
        self.run(sequence, commune, postal_code, sink).await
    }

    fn next_sequence(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ensure_latest(&self, sequence: u64) -> Result<(), SearchError> {
        let latest = self.latest.load(Ordering::SeqCst);
        if sequence != latest {
            debug!(sequence, latest, "discarding superseded search");
            return Err(SearchError::Stale { sequence });
        }
        Ok(())
    }

    async fn run(
        &self,
        sequence: u64,
        commune: &str,
        postal_code: &str,
        sink: &dyn StatusSink,
    ) -> Result<SearchOutcome, SearchError> {
        let validation = self.validate_commune(commune, postal_code, sink).await;
        let Some(reference) = validation.reference().cloned() else {
            return Err(SearchError::CommuneNotFound {
                commune: commune.to_string(),
                postal_code: postal_code.to_string(),
            });
        };

        sink.emit(Status::neutral("Searching establishments..."));
        let postal_codes = postal::related_postal_codes(postal_code);
        debug!(?postal_codes, "searching postal codes");

        let mut records = match self.narrow_pass(&reference.name, &postal_codes).await {
            Ok(records) => records,
            Err(e) => {
                self.ensure_latest(sequence)?;
                error!(error = %e, "establishment search failed");
                sink.emit(Status::error("Error while loading establishment data"));
                return Err(e.into());
            }
        };
        self.ensure_latest(sequence)?;

        if self.options.widen && records.len() < self.options.widen_threshold {
            sink.emit(Status::neutral("Widening the search..."));
            let wider = self.widen_pass(&reference.name, postal_code).await;
            records = dedup::combine(records, wider);
            self.ensure_latest(sequence)?;
        }

        let records = validate::validate_results(records, &reference.name, &postal_codes, sink);
        if records.is_empty() {
            sink.emit(Status::error("No establishment found."));
        }
        info!(sequence, count = records.len(), "search finished");

        Ok(SearchOutcome {
            sequence,
            commune: validation,
            postal_codes,
            records,
        })
    }

    /// Query both datasets for every postal code at once, then fold the
    /// answers in postal-code order.
    async fn narrow_pass(
        &self,
        commune: &str,
        postal_codes: &[String],
    ) -> Result<Vec<EstablishmentRecord>, GetError> {
        let url = self.records_url();
        let rows = self.options.rows;
        let calls = postal_codes.iter().map(move |code| {
            let directory = Query {
                dataset: Dataset::Directory,
                commune,
                scope: Scope::PostalCode(code.as_str()),
                rows,
            };
            let geolocation = Query {
                dataset: Dataset::Geolocation,
                ..directory
            };
            async move {
                let (directory, geolocation) = futures::join!(
                    datasets::get(&self.http_client, url, &directory),
                    datasets::get(&self.http_client, url, &geolocation),
                );
                (code, directory, geolocation)
            }
        });
        let responses = join_all(calls).await;

        let mut records = Vec::new();
        for (code, directory, geolocation) in responses {
            let mut batch = absorb(directory, Dataset::Directory, code)?;
            batch.extend(absorb(geolocation, Dataset::Geolocation, code)?);
            records = dedup::combine(records, batch);
        }
        Ok(records)
    }

    /// Best effort department-wide search in the directory dataset.
    async fn widen_pass(&self, commune: &str, postal_code: &str) -> Vec<EstablishmentRecord> {
        let query = Query {
            dataset: Dataset::Directory,
            commune,
            scope: Scope::Department(postal::department(postal_code)),
            rows: self.options.rows,
        };
        match datasets::get(&self.http_client, self.records_url(), &query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "widened search failed");
                Vec::new()
            }
        }
    }
}
