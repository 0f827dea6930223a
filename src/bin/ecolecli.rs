use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use em_annuaire::{
    postal,
    status::{LogSink, Severity, Status, StatusSink},
    view::ResultsView,
    Client, Endpoint, EndpointConfig, SearchOptions, SearchOptionsBuilder,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(
        short = 'g',
        long,
        global = true,
        help = "Endpoint of the commune reference service"
    )]
    pub geo_endpoint: Option<String>,

    #[arg(
        short = 'r',
        long,
        global = true,
        help = "Endpoint of the establishment record search"
    )]
    pub records_endpoint: Option<String>,

    #[arg(
        short = 't',
        long,
        global = true,
        default_value_t = 30,
        help = "Per-request timeout in seconds"
    )]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(name = "search", about = "Find the schools of a commune")]
    Search {
        #[command(flatten)]
        place: PlaceOpts,

        #[arg(
            short = 's',
            long,
            value_delimiter = ',',
            help = "Result numbers to select for coordinate export"
        )]
        select: Vec<usize>,

        #[arg(short = 'o', long, help = "Write the selected coordinates to this file")]
        output_path: Option<String>,

        #[arg(long, help = "Print results as JSON")]
        json: bool,

        #[arg(long, help = "Never widen sparse results to the whole department")]
        no_widen: bool,
    },

    #[clap(
        name = "validate-commune",
        about = "Resolve a commune name against the reference service"
    )]
    ValidateCommune {
        #[command(flatten)]
        place: PlaceOpts,
    },

    #[clap(name = "postal-codes", about = "List the postal codes a search covers")]
    PostalCodes { postal_code: String },
}

#[derive(Args, Debug)]
struct PlaceOpts {
    #[arg(short = 'c', long, help = "Commune name")]
    pub commune: String,

    #[arg(short = 'p', long = "postal-code", help = "Postal code of the commune")]
    pub postal_code: String,
}

/// Shows the latest status next to a spinner, keeping errors on screen.
struct SpinnerSink(ProgressBar);

impl StatusSink for SpinnerSink {
    fn emit(&self, status: Status) {
        if status.severity == Severity::Error {
            self.0.println(format!("! {}", status.message));
        }
        self.0.set_message(status.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let http = reqwest::Client::builder()
        .gzip(true)
        .brotli(true)
        .timeout(Duration::from_secs(args.global_opts.timeout))
        .build()?;
    let endpoints = EndpointConfig {
        geo: args.global_opts.geo_endpoint.map(|url| Endpoint { url }),
        records: args.global_opts.records_endpoint.map(|url| Endpoint { url }),
    };

    match args.subcommand {
        Command::PostalCodes { postal_code } => {
            for code in postal::related_postal_codes(postal_code.trim()) {
                println!("{}", code);
            }
        }
        Command::ValidateCommune { place } => {
            let client = Client::new(http, Some(endpoints), SearchOptions::default())?;
            let validation = client
                .validate_commune(place.commune.trim(), place.postal_code.trim(), &LogSink)
                .await;
            println!("{}", serde_json::to_string_pretty(&validation)?);
        }
        Command::Search {
            place,
            select,
            output_path,
            json,
            no_widen,
        } => {
            let options = SearchOptionsBuilder::default().widen(!no_widen).build()?;
            let client = Client::new(http, Some(endpoints), options)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
            spinner.enable_steady_tick(Duration::from_millis(100));
            let outcome = client
                .search(
                    &place.commune,
                    &place.postal_code,
                    &SpinnerSink(spinner.clone()),
                )
                .await;
            spinner.finish();
            let outcome = outcome?;
            info!(
                sequence = outcome.sequence,
                count = outcome.records.len(),
                "search complete"
            );

            let mut view = ResultsView::new();
            view.show(&outcome.records);
            for number in select {
                if number == 0 || view.toggle(number - 1).is_none() {
                    bail!("there is no result number {}", number);
                }
            }

            if json {
                let output = json!({
                    "commune": outcome.commune,
                    "postal_codes": outcome.postal_codes,
                    "entries": view.entries(),
                    "selected": view.coordinates_text(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for (index, entry) in view.entries().iter().enumerate() {
                    let mark = if view.is_selected(index) { "x" } else { " " };
                    println!("[{}] {:>3}. {}", mark, index + 1, entry.name);
                    println!("          {}", entry.address);
                    println!("          {} {}", entry.postal_code, entry.commune);
                    println!("          {} ({})", entry.kind, entry.coordinates());
                }
            }

            if let Some(output_path) = output_path {
                view.export(&output_path).await?;
                info!(path = %output_path, "coordinates exported");
            } else if !json && !view.coordinates_text().is_empty() {
                println!();
                println!("{}", view.coordinates_text());
            }
        }
    }

    Ok(())
}
