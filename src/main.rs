//! lingodesk - Customer Support Language Assistant
//!
//! Entry point: detects the language of customer messages, translates them for
//! the agent and translates the agent's reply back, with optional word glosses.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use lingodesk::cli::{Args, Commands};
use lingodesk::config::{Config, TranslationProvider};
use lingodesk::desk::Desk;
use lingodesk::error::DeskError;
use lingodesk::gloss::GlossAnnotation;
use lingodesk::languages;
use lingodesk::render;
use lingodesk::session::SessionState;
use lingodesk::shell::Shell;
use lingodesk::translate::OllamaTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    let _log_guard = setup_logging(args.verbose)?;
    info!("Starting lingodesk - Customer Support Language Assistant");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("lingodesk.toml").exists() {
                info!("Found lingodesk.toml in current directory, loading...");
                Config::from_file("lingodesk.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Languages => {
            println!("{:<12} {}", "Language", "Code");
            println!("{}", "-".repeat(20));
            for language in languages::all() {
                println!("{:<12} {}", language.name, language.code);
            }
        }
        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                return Err(DeskError::Config(format!(
                    "{} already exists, pass --force to overwrite",
                    output.display()
                ))
                .into());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        Commands::Shell { no_gloss, html } => {
            let desk = build_desk(config, no_gloss).await?;
            let mut shell = Shell::new(desk).with_html(html);
            shell.run().await?;
        }
        Commands::Detect { text, pdf } => {
            let desk = build_desk(config, true).await?;
            let mut session = SessionState::new();
            match (text, pdf) {
                (Some(text), _) => {
                    let outcome = desk.detect_text(&mut session, &text)?;
                    println!("{}", render::detection_line("Detected Language", &outcome.detection));
                }
                (None, Some(path)) => {
                    let outcome = desk.detect_pdf_file(&mut session, &path).await?;
                    println!("{}", render::detection_line("PDF Language", &outcome.detection));
                    println!("\nExtracted PDF Text:\n{}", outcome.text);
                }
                (None, None) => {
                    let message = "Please enter a message or a PDF file.".to_string();
                    return Err(DeskError::Validation(message).into());
                }
            }
        }
        Commands::Translate { text, target, no_gloss, html } => {
            let desk = build_desk(config, no_gloss).await?;
            let mut session = SessionState::new();

            let detected = desk.detect_text(&mut session, &text)?;
            println!("{}", render::detection_line("Detected Language", &detected.detection));

            let outcome = desk.translate(&mut session, &target).await?;
            println!("\nTranslated Message ({}):", outcome.target.name);
            print_translation(&outcome.text, outcome.annotations.as_deref(), html);
        }
        Commands::Reply { customer_text, reply, agent_language, no_gloss, html } => {
            let desk = build_desk(config, no_gloss).await?;
            let mut session = SessionState::new();

            let detected = desk.detect_text(&mut session, &customer_text)?;
            println!("{}", render::detection_line("Detected Language", &detected.detection));

            // The reply step needs the customer message translated first
            let translated = desk.translate(&mut session, &agent_language).await?;
            println!("\nTranslated Message ({}):\n{}", translated.target.name, translated.text);

            let outcome = desk.reply(&mut session, &reply).await?;
            println!(
                "\nReply in Customer's Language ({}):",
                languages::code_to_name(&outcome.customer_language)
            );
            print_translation(&outcome.text, outcome.annotations.as_deref(), html);
        }
    }

    info!("lingodesk finished");
    Ok(())
}

async fn build_desk(config: Config, no_gloss: bool) -> Result<Desk> {
    if config.translate.provider == TranslationProvider::Ollama {
        let ollama = OllamaTranslator::new(
            reqwest::Client::new(),
            &config.translate.endpoint,
            &config.translate.model,
        );
        if let Err(e) = ollama.check_availability().await {
            warn!("{}", e);
        }
    }

    let mut desk = Desk::new(config)?;
    if no_gloss {
        desk.set_gloss(false);
    }
    Ok(desk)
}

fn print_translation(text: &str, annotations: Option<&[GlossAnnotation]>, html: bool) {
    match annotations {
        Some(annotations) if html => println!("{}", render::annotations_html(annotations)),
        Some(annotations) if !annotations.is_empty() => {
            println!("{}\n\n{}", text, render::annotations_table(annotations));
        }
        _ => println!("{}", text),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".lingodesk").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "lingodesk.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so it stays out of the shell transcript
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Console only shows warnings unless verbose; the file gets everything
    let console_level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer.with_filter(LevelFilter::from_level(console_level)))
        .with(file_layer);

    subscriber.try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - level: {}, file: {}",
          log_level, log_dir.join("lingodesk.log").display());

    Ok(guard)
}
