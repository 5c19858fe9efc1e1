//! Churn scorer entrypoint. Loads the model artifact once, then scores a
//! single request, a batch file, or an NDJSON request stream on stdin until
//! EOF or Ctrl+C.

use anyhow::{Context, Result};
use churn_scorer::{
    config::ServiceConfig,
    error::ScoringError,
    logging::{PredictionLog, StructuredLogger},
    serving::{
        batch::{self, InputFormat},
        respond, respond_line, ChurnScorer, ScoreRequest, ScoreResponse,
    },
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bank customer churn scoring", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "CHURN_CONFIG_PATH", default_value = "config.json")]
    config: PathBuf,

    /// Override the model artifact directory from the configuration
    #[arg(long, env = "CHURN_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and verify the model artifact, then exit
    Check,
    /// Score one JSON request read from a file or stdin
    Score {
        /// Request file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Decision threshold when the request does not carry one
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Score a CSV, JSON array or NDJSON file of customer records
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        threshold: Option<f64>,
        /// Write one response per line instead of a JSON array
        #[arg(long)]
        ndjson: bool,
        /// Append a prediction audit line per scored record to this file
        #[arg(long)]
        audit: Option<PathBuf>,
    },
    /// Answer NDJSON requests from stdin on stdout
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(model_dir = %config.model_dir.display(), "churn scorer starting");

    let scorer = Arc::new(ChurnScorer::from_config(&config).context("model artifact rejected")?);

    let exit_code = match cli.command {
        Command::Check => {
            let layout = scorer.layout();
            println!(
                "{}",
                serde_json::json!({
                    "model_id": scorer.model_id(),
                    "encoder_version": layout.version(),
                    "features": layout.names(),
                    "default_threshold": scorer.policy().default_threshold().value(),
                })
            );
            0
        }
        Command::Score { input, threshold } => {
            let mut data = String::new();
            if input == "-" {
                std::io::stdin().read_to_string(&mut data)?;
            } else {
                File::open(&input)
                    .with_context(|| format!("opening {}", input))?
                    .read_to_string(&mut data)?;
            }
            let response = match ScoreRequest::parse(&data) {
                Ok(mut request) => {
                    request.threshold = request.threshold.or(threshold);
                    respond(&scorer, request)
                }
                Err(e) => ScoreResponse::from_error(&ScoringError::Validation(e)),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            match response.status {
                200 => 0,
                s if s >= 500 => 3,
                _ => 2,
            }
        }
        Command::Batch {
            input,
            output,
            threshold,
            ndjson,
            audit,
        } => {
            run_batch(&scorer, input, output, threshold, ndjson, audit)?;
            0
        }
        Command::Serve => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(Arc::clone(&scorer)))?;
            0
        }
    };

    drop(scorer);
    info!("churn scorer stopped");
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn run_batch(
    scorer: &ChurnScorer,
    input: PathBuf,
    output: Option<PathBuf>,
    threshold: Option<f64>,
    ndjson: bool,
    audit: Option<PathBuf>,
) -> Result<()> {
    let format = InputFormat::from_path(&input);
    let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let records = batch::read_records(file, format)
        .with_context(|| format!("reading {}", input.display()))?;
    info!(records = records.len(), ?format, "batch loaded");

    let outcomes = scorer.score_batch(&records, threshold)?;

    if let Some(path) = audit {
        let mut w = BufWriter::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening audit log {}", path.display()))?,
        );
        for result in outcomes.iter().flatten() {
            StructuredLogger::emit_json(&PredictionLog::new(scorer.model_id(), result), &mut w)?;
        }
        w.flush()?;
    }

    let responses: Vec<ScoreResponse> = outcomes.into_iter().map(ScoreResponse::from_outcome).collect();
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    if ndjson {
        batch::write_ndjson(&mut writer, &responses)?;
    } else {
        batch::write_json(&mut writer, &responses)?;
        writeln!(writer)?;
        writer.flush()?;
    }
    Ok(())
}

async fn serve(scorer: Arc<ChurnScorer>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!(model_id = scorer.model_id(), "serving NDJSON requests on stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let worker = Arc::clone(&scorer);
                let mut response = tokio::task::spawn_blocking(move || respond_line(&worker, &line)).await?;
                if response.request_id.is_none() {
                    response.request_id = Some(uuid::Uuid::new_v4().to_string());
                }
                if response.status >= 500 {
                    warn!(request_id = ?response.request_id, error = ?response.error, "internal scoring failure");
                }
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                stdout.write_all(&out).await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }
    Ok(())
}
