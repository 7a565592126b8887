// src/main.rs
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::ai::{AiConnector, GeminiModel};
use crate::capture::EncodedImage;
use crate::classify::WasteAnalysis;
use crate::config::Settings;
use crate::session::{Phase, SessionImage, SharedSession};

mod ai;
mod capture;
mod classify;
mod config;
mod error;
mod guide;
mod gui;
mod session;

#[derive(Parser)]
#[command(name = "ecosort")]
#[command(about = "Sort waste into the right bin from a photo", long_about = None)]
struct Cli {
    /// Gemini model name (default: gemini-3-flash-preview)
    #[arg(long, short = 'm', global = true)]
    model: Option<String>,

    /// API base URL (default: https://generativelanguage.googleapis.com/v1beta)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API key (default: $GEMINI_API_KEY or $API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one photo
    Classify {
        /// Image file, or "-" to read raw bytes or a data URI from stdin
        input: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Override the detected MIME type (e.g. "image/png")
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show which items go in which bin
    Guide,
    /// Check that the API key and model are usable
    Check,
    /// List models that can classify images
    ListModels,
    /// Run simple interactive mode
    Interactive,
    /// Run graphical user interface
    Gui,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "info")
    );

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.api_key, cli.model, cli.endpoint);

    match cli.command {
        Commands::Classify { input, json, mime } => {
            run_classify(&settings, &input, json, mime.as_deref())
        }
        Commands::Guide => {
            print!("{}", guide::render_guide());
            Ok(())
        }
        Commands::Check => {
            check_status(&settings)
        }
        Commands::ListModels => {
            list_models(&settings)
        }
        Commands::Interactive => {
            run_interactive_mode(&settings)
        }
        Commands::Gui => {
            gui::run_gui(settings)
        }
    }
}

fn load_input(input: &str, mime: Option<&str>) -> Result<SessionImage> {
    let encoded = if input == "-" {
        capture::read_image_from(std::io::stdin().lock(), mime)?
    } else {
        capture::load_image_file(Path::new(input), mime)?
    };
    let source = if input == "-" { "<stdin>".to_string() } else { input.to_string() };
    Ok(SessionImage { source, encoded })
}

fn run_classify(settings: &Settings, input: &str, json: bool, mime: Option<&str>) -> Result<()> {
    info!("Starting headless classification");

    let image = load_input(input, mime)?;
    let model = GeminiModel::new(settings)?;
    let session = SharedSession::new();

    session.classify_with(&model, image)?;
    let snapshot = session.snapshot();

    match snapshot.result() {
        Some(analysis) if json => {
            println!("{}", serde_json::to_string_pretty(analysis)?);
            Ok(())
        }
        Some(analysis) => {
            print_analysis(analysis, model.model_name());
            Ok(())
        }
        None => {
            let message = snapshot.error().unwrap_or(error::USER_FAILURE_MESSAGE);
            bail!("{}", message)
        }
    }
}

fn print_analysis(analysis: &WasteAnalysis, model: &str) {
    let info = guide::bin_info(analysis.category);
    println!("\n=== Eco-Sort ({}) ===", model);
    println!("Item:  {}", analysis.identified_item);
    println!("Bin:   {} [{}] / {}", analysis.bin_name_en, info.category, analysis.bin_name_ur);
    println!();
    println!("{}", analysis.explanation_en);
    println!("{}", analysis.explanation_ur);
    println!();
    println!("{} bin also takes: {}", info.label_en, info.items_en.join(", "));
    println!("===========================================\n");
}

fn check_status(settings: &Settings) -> Result<()> {
    info!("Checking model {} at {}...", settings.model, settings.endpoint);

    let model = GeminiModel::new(settings)?;
    match model.check_model() {
        Ok(found) => {
            println!("✓ API key accepted by {}", settings.endpoint);
            println!(
                "✓ Model {} available ({})",
                found.short_name(),
                found.display_name.as_deref().unwrap_or("no display name")
            );
            if !found.supports_generate_content() {
                println!("✗ Model does not support generateContent; pick another with --model");
            }
        }
        Err(error::ClassifyError::MissingApiKey) => {
            println!("✗ No API key configured");
            println!("\nTroubleshooting:");
            println!("  1. Create a key in Google AI Studio");
            println!("  2. export GEMINI_API_KEY=<your key>");
        }
        Err(e) => {
            println!("✗ Could not reach model {} at {}", settings.model, settings.endpoint);
            println!("  Error: {}", e);
            println!("\nRun `ecosort list-models` to see which models your key can use.");
        }
    }

    Ok(())
}

fn list_models(settings: &Settings) -> Result<()> {
    info!("Listing models at {}...", settings.endpoint);

    let model = GeminiModel::new(settings)?;
    match model.list_models() {
        Ok(models) => {
            println!("\nModels supporting generateContent:");
            if models.is_empty() {
                println!("  No models found");
            }
            for found in &models {
                let marker = if found.short_name() == settings.model { "*" } else { "-" };
                match &found.display_name {
                    Some(display) => println!("  {} {} ({})", marker, found.short_name(), display),
                    None => println!("  {} {}", marker, found.short_name()),
                }
            }
            println!();
        }
        Err(e) => {
            error!("Failed to list models: {}", e);
        }
    }

    Ok(())
}

fn run_interactive_mode(settings: &Settings) -> Result<()> {
    use std::io::{self, Write};

    println!("♻️  Eco-Sort Interactive Mode");
    println!("============================");
    println!();

    let model = GeminiModel::new(settings)?;
    let session = SharedSession::new();

    let stdin = io::stdin();
    let mut input = String::new();

    // Main menu loop
    loop {
        println!("\nMain Menu:");
        println!("1. Classify a photo");
        println!("2. Show bin guide");
        println!("3. Start over");
        println!("4. Exit");
        print!("\nEnter your choice (1-4): ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let choice = input.trim();

        match choice {
            "1" => {
                print!("Path to image: ");
                io::stdout().flush()?;

                input.clear();
                stdin.lock().read_line(&mut input)?;
                let path = PathBuf::from(input.trim());
                if path.as_os_str().is_empty() {
                    continue;
                }
                if !capture::encoder::is_supported_extension(&path) {
                    println!("✗ {} does not look like an image", path.display());
                    continue;
                }

                let encoded = match capture::load_image_file(&path, None) {
                    Ok(encoded) => encoded,
                    Err(e) => {
                        println!("✗ {}", e);
                        continue;
                    }
                };
                classify_interactive(&session, &model, &path, encoded);
            }
            "2" => {
                print!("{}", guide::render_guide());
            }
            "3" => {
                session.reset();
                println!("✓ Ready for a new photo");
            }
            "4" => {
                println!("Exiting Eco-Sort");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 4.");
            }
        }
    }

    Ok(())
}

fn classify_interactive(session: &SharedSession, model: &GeminiModel, path: &Path, encoded: EncodedImage) {
    let image = SessionImage {
        source: path.display().to_string(),
        encoded,
    };

    println!("\nAnalyzing {}...", path.display());
    match session.classify_with(model, image) {
        Ok(Phase::Success) => {
            let snapshot = session.snapshot();
            if let Some(analysis) = snapshot.result() {
                print_analysis(analysis, model.model_name());
            }
        }
        Ok(_) => {
            let snapshot = session.snapshot();
            println!("✗ {}", snapshot.error().unwrap_or(error::USER_FAILURE_MESSAGE));
        }
        Err(e) => {
            println!("✗ {}", e.user_message());
        }
    }
}
