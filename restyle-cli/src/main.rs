// ABOUTME: Main entry point for the restyle CLI application
// ABOUTME: Stages a source image, runs the generation pipeline and prints the outcome

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use restyle_cli::config::{self, Config, Settings};
use restyle_cli::fetcher::ResultFetcher;
use restyle_cli::output::{JsonFormatter, OutputFormat, TextFormatter};
use restyle_cli::uploads::stage_upload;
use restyle_cli::{FailureKind, GenerationRequest, GenerationResponse, Pipeline};
use restyle_sdk::{GenerationParams, JobSubmitter, ProviderClient};

#[derive(Parser)]
#[command(name = "restyle")]
#[command(about = "Restyle an image with a text prompt", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a restyled image from a source image and a prompt
    Generate {
        /// Source image to restyle
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Text prompt describing the desired result
        #[arg(short, long)]
        prompt: Option<String>,

        /// Output aspect ratio as W:H
        #[arg(short, long)]
        aspect_ratio: Option<String>,

        /// MIME type of the source image (inferred from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
    /// Show the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn formatter(json: bool, pretty: bool) -> Box<dyn OutputFormat> {
    if json {
        Box::new(JsonFormatter::new(pretty))
    } else {
        Box::new(TextFormatter)
    }
}

async fn generate(
    settings: Settings,
    image: Option<PathBuf>,
    prompt: Option<String>,
    aspect_ratio: Option<String>,
    mime_type: Option<String>,
) -> GenerationResponse {
    let request = GenerationRequest::from_parts(prompt, image, mime_type, aspect_ratio);
    let request = match request {
        Ok(request) => request,
        Err(err) => return GenerationResponse::from_result(Err(err)),
    };

    let Some(token) = config::api_token() else {
        log::error!("{} is not set", restyle_cli::constants::config::ENV_API_TOKEN);
        return GenerationResponse::failure(FailureKind::GenerationFailed);
    };

    let staged = match stage_upload(&request.source_image_path, &settings.upload_dir) {
        Ok(path) => path,
        Err(err) => return GenerationResponse::from_result(Err(err)),
    };
    let request = GenerationRequest {
        source_image_path: staged,
        ..request
    };

    let client_config = ProviderClient::builder()
        .auth_token(token)
        .base_url(settings.api_base.clone())
        .build();
    let client = match ProviderClient::try_from(client_config) {
        Ok(client) => client,
        Err(err) => {
            log::error!("Failed to set up provider client: {}", err);
            return GenerationResponse::failure(FailureKind::GenerationFailed);
        }
    };
    let fetcher = match ResultFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(err) => return GenerationResponse::from_result(Err(err)),
    };

    let mut params = GenerationParams::default();
    if let Some(version) = &settings.model_version {
        params.version = version.clone();
    }

    let pipeline =
        Pipeline::new(client, fetcher, settings).with_submitter(JobSubmitter::new(params));

    pipeline.handle(Ok(request)).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let settings = Config::load()?.resolve();

    match cli.command {
        Commands::Generate {
            image,
            prompt,
            aspect_ratio,
            mime_type,
            json,
            pretty,
        } => {
            let response = generate(settings, image, prompt, aspect_ratio, mime_type).await;
            println!("{}", formatter(json, pretty).format_response(&response)?);
            if !response.is_success() {
                std::process::exit(match response.status_code() {
                    400 => 2,
                    _ => 1,
                });
            }
        }
        Commands::Config { json } => {
            let token_present = config::api_token().is_some();
            println!(
                "{}",
                formatter(json, true).format_settings(&settings, token_present)?
            );
        }
    }

    Ok(())
}
