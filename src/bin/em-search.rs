use clap::Parser;
use em_annuaire::{default_http_client, Client, Endpoint, EndpointConfig, SearchOptions, Status};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long)]
    commune: String,
    #[arg(short = 'p', long = "postal-code")]
    postal_code: String,
    #[arg(short = 'g', long)]
    geo_endpoint: Option<String>,
    #[arg(short = 'r', long)]
    records_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Args {
        commune,
        postal_code,
        geo_endpoint,
        records_endpoint,
    } = Args::parse();
    let endpoints = EndpointConfig {
        geo: geo_endpoint.map(|url| Endpoint { url }),
        records: records_endpoint.map(|url| Endpoint { url }),
    };
    let client = Client::new(
        default_http_client()?,
        Some(endpoints),
        SearchOptions::default(),
    )?;

    let (tx, rx) = mpsc::unbounded_channel::<Status>();
    let printer = async move {
        let mut statuses = UnboundedReceiverStream::new(rx);
        while let Some(status) = statuses.next().await {
            eprintln!("[{:?}] {}", status.severity, status.message);
        }
    };
    let search = async move {
        // tx is dropped when the search ends, which stops the printer
        client.search(&commune, &postal_code, &tx).await
    };
    let (outcome, ()) = futures::join!(search, printer);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "search failed");
            return Err(e.into());
        }
    };
    info!(count = outcome.records.len(), "search finished");
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
