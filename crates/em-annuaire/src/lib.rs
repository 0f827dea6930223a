pub mod client;
pub mod commune;
pub mod constants;
pub mod datasets;
pub mod dedup;
pub mod error;
pub mod key;
pub mod postal;
pub mod record;
pub mod status;
mod util;
pub mod validate;
pub mod view;

pub use client::{Client, Endpoint, EndpointConfig, SearchOptions, SearchOptionsBuilder};
pub use record::{EstablishmentRecord, Location};
pub use status::{Status, StatusSink};
pub use util::default_http_client;
