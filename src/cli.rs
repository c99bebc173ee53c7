use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize YouTube videos from their captions",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Preferred caption language
    #[arg(short, long, global = true)]
    pub lang: Option<String>,

    /// Summarization model
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Show extraction details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a transcript and summarize it interactively
    Summarize {
        /// YouTube video URL or video ID (prompted for if omitted)
        url: Option<String>,

        /// Answer yes to every prompt
        #[arg(short, long)]
        yes: bool,

        /// File the summary is saved to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Never save the summary
        #[arg(long, conflicts_with = "output")]
        no_save: bool,

        /// Stop after printing the transcript preview
        #[arg(long)]
        transcript_only: bool,
    },

    /// Serve the web form
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:5000
        #[arg(short, long)]
        bind: Option<String>,
    },
}
