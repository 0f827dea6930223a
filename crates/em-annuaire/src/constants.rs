/// The default endpoint for the commune reference service
pub const DEFAULT_GEO_SERVICE_URL: &str = "https://geo.api.gouv.fr/communes";

/// The default endpoint for the education open-data record search
pub const DEFAULT_RECORDS_SERVICE_URL: &str =
    "https://data.education.gouv.fr/api/records/1.0/search/";

/// Fields requested from the commune reference service
pub const GEO_SERVICE_FIELDS: &str = "nom,code,codesPostaux";

/// Dataset id of the national establishment directory
pub const DIRECTORY_DATASET_ID: &str = "fr-en-annuaire-education";

/// Dataset id of the establishment address and geolocation listing
pub const GEOLOCATION_DATASET_ID: &str =
    "fr-en-adresse-et-geolocalisation-etablissements-premier-et-second-degre";

/// Rows requested per dataset call
pub const DEFAULT_ROWS: u32 = 100;

/// Below this many combined records, a department-wide pass is issued
pub const DEFAULT_WIDEN_THRESHOLD: usize = 10;

/// Number of postal-box suffixes tried after the requested postal code
pub const POSTAL_BOX_VARIANTS: u32 = 9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_urls_are_https() {
        assert!(DEFAULT_GEO_SERVICE_URL.starts_with("https://"));
        assert!(DEFAULT_RECORDS_SERVICE_URL.starts_with("https://"));
    }

    #[test]
    fn geo_fields_request_postal_codes() {
        assert!(GEO_SERVICE_FIELDS.split(',').any(|field| field == "codesPostaux"));
    }
}
