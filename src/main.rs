//! INEC OCR - submit an election results sheet image and render the extracted report.

mod config;
mod error;
mod form;
mod ocr;
mod render;
mod submission;
#[cfg(test)]
mod test_support;
mod view;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use config::ClientConfig;
use form::{FormState, UploadFile};
use ocr::http::HttpRecognitionService;
use submission::{Dispatch, SubmissionController, SubmissionOutcome};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use view::ConsoleView;

#[derive(Parser)]
#[command(name = "inec-ocr")]
#[command(about = "Extract the results from an election results sheet image", long_about = None)]
struct Cli {
    /// Image of the results sheet
    image: PathBuf,

    /// Base URL of the recognition service (overrides INEC_OCR_URL)
    #[arg(long)]
    url: Option<String>,

    /// Seconds to wait for the recognition service
    #[arg(long)]
    timeout: Option<u64>,

    /// JSON config file (replaces environment configuration)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inec_ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    config.apply_overrides(cli.url, cli.timeout)?;

    let service = HttpRecognitionService::new(reqwest::Client::new(), &config.base_url, &config.endpoint);
    info!("Recognition service: {}", service.url());

    let mut form = FormState::new();
    let upload = UploadFile::read(&cli.image).await?;
    form.choose(upload);
    let label = form.label();
    info!("Selected: {} ({:?})", label.text, label.style);
    if !form.submit_enabled() {
        anyhow::bail!("No image selected");
    }

    let mut controller = SubmissionController::new(service, ConsoleView::new(), config.timeout())
        .with_policy(config.busy_policy);

    let submission = match controller.submit(&form) {
        Dispatch::Started(submission) => submission,
        Dispatch::NoFile | Dispatch::Rejected => anyhow::bail!("Nothing was submitted"),
    };
    info!("Submitted as {}", submission.id());

    match submission.outcome().await {
        SubmissionOutcome::Rendered(_) => {}
        SubmissionOutcome::Failed(err) => {
            error!("Submission failed: {}", err);
            anyhow::bail!(err.notice());
        }
        SubmissionOutcome::Cancelled => anyhow::bail!("Submission was cancelled"),
    }

    let report = controller
        .with_view(|view| view.report().cloned())
        .context("Submission finished without a report")?;

    let rendered = match cli.format {
        OutputFormat::Text => render::text::render(&report),
        OutputFormat::Html => render::html::render_page(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
