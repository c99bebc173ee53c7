use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, bail};
use log::{debug, info, warn};

use ytsum::config::{API_KEY_ENV, Config, LEGACY_API_KEY_ENV, api_key_from_env};
use ytsum::output::{preview, render_section, save_summary};
use ytsum::pipeline::{PREVIEW_CHARS, Pipeline, PipelineError};
use ytsum::summarize::{CohereClient, Orchestrator, Summarizer};
use ytsum::transcript::CaptionService;
use ytsum::youtube::InnerTubeClient;

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if api_key_from_env().is_some() {
        format!("  \x1b[32m✅\x1b[0m {API_KEY_ENV} (or {LEGACY_API_KEY_ENV})")
    } else {
        format!("  \x1b[31m❌\x1b[0m {API_KEY_ENV} (or {LEGACY_API_KEY_ENV}) not set, summarization will fail")
    };

    let log_path = log_dir().join("ytsum.log");

    format!(
        "\nENVIRONMENT:\n{key_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytsum::config::config_path().display(),
        log_path.display()
    )
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(prompt(question)?.to_lowercase().starts_with('y'))
}

fn user_facing(e: PipelineError) -> eyre::Report {
    let message = e.user_message();
    eyre::Report::new(e).wrap_err(message)
}

struct SummarizeArgs {
    url: Option<String>,
    yes: bool,
    output: PathBuf,
    no_save: bool,
    transcript_only: bool,
    verbose: bool,
}

async fn run_summarize<C, S>(pipeline: &Pipeline<C, S>, args: SummarizeArgs) -> Result<()>
where
    C: CaptionService,
    S: Summarizer,
{
    let url = match args.url {
        Some(url) => url,
        None => prompt("Enter YouTube URL: ")?,
    };
    if url.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytsum summarize <URL>");
    }

    let transcript = pipeline.transcript_for(&url).await.map_err(user_facing)?;
    let text = transcript.text();

    if args.verbose {
        eprintln!(
            "Video: {}\nLanguage: {}{}\nSegments: {}\nCharacters: {}",
            transcript.video_id,
            transcript.language_code,
            if transcript.is_generated { " (auto-generated)" } else { "" },
            transcript.segments.len(),
            text.chars().count(),
        );
    }

    println!("{}", render_section("TRANSCRIPT PREVIEW", preview(&text, PREVIEW_CHARS)));

    if args.transcript_only || !confirm("\nSummarize it? (y/n): ", args.yes)? {
        return Ok(());
    }

    println!("\nSummarizing...");
    let summary = pipeline.try_summary(&transcript).await.map_err(user_facing)?;
    println!("{}", render_section("SUMMARY", &summary));

    if args.no_save || !confirm("\nSave summary to file? (y/n): ", args.yes)? {
        return Ok(());
    }

    save_summary(&args.output, &summary)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {e}"),
    }

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring invalid config file: {e}");
        Config::default()
    });

    // CLI flags take priority over the config file
    if let Some(lang) = cli.lang {
        config.primary_lang = Some(lang);
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let client = reqwest::Client::new();
    let service = config.service_config();
    if service.api_key.is_none() {
        warn!("Neither {API_KEY_ENV} nor {LEGACY_API_KEY_ENV} is set; summarization requests will fail");
    }

    let summarizer = CohereClient::new(client.clone(), service);
    debug!("Summarization model: {}", summarizer.model());
    let model = summarizer.model().to_string();
    let orchestrator = Orchestrator::new(summarizer, model)
        .with_max_chars(config.max_chars()?)
        .with_pacing(config.pacing());
    let pipeline = Pipeline::new(InnerTubeClient::new(client), orchestrator, config.language_plan());

    match cli.command {
        Command::Summarize {
            url,
            yes,
            output,
            no_save,
            transcript_only,
        } => {
            let args = SummarizeArgs {
                url,
                yes,
                output: output.unwrap_or_else(|| config.summary_file()),
                no_save,
                transcript_only,
                verbose: cli.verbose,
            };
            run_summarize(&pipeline, args).await
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = Some(bind);
            }
            let addr = config.bind()?;
            if cli.verbose {
                eprintln!("Serving on http://{addr}");
            }
            ytsum::web::serve(Arc::new(pipeline), addr).await
        }
    }
}
