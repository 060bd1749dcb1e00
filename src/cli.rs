use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: detect, translate and reply step by step
    Shell {
        /// Skip per-word gloss lookups
        #[arg(long)]
        no_gloss: bool,

        /// Print glossed text as HTML spans
        #[arg(long)]
        html: bool,
    },

    /// Detect the language of a message or a PDF
    Detect {
        /// Message text
        #[arg(short, long, conflicts_with = "pdf", required_unless_present = "pdf")]
        text: Option<String>,

        /// PDF file to extract and classify
        #[arg(short, long)]
        pdf: Option<PathBuf>,
    },

    /// Detect and translate a customer message
    Translate {
        /// Customer message
        #[arg(short, long)]
        text: String,

        /// Target language, by name or code
        #[arg(short = 'l', long, default_value = "English")]
        target: String,

        /// Skip per-word gloss lookups
        #[arg(long)]
        no_gloss: bool,

        /// Print glossed text as HTML spans
        #[arg(long)]
        html: bool,
    },

    /// Translate a reply into the language of a customer message
    Reply {
        /// Customer message the reply answers
        #[arg(long)]
        customer_text: String,

        /// Agent reply
        #[arg(short, long)]
        reply: String,

        /// Language the agent reads and writes in
        #[arg(short = 'l', long, default_value = "English")]
        agent_language: String,

        /// Skip per-word gloss lookups
        #[arg(long)]
        no_gloss: bool,

        /// Print glossed text as HTML spans
        #[arg(long)]
        html: bool,
    },

    /// List supported target languages
    Languages,

    /// Write a default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "lingodesk.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
