//! Aurora CLI - hosted generative-AI chat in the terminal

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use aurora_core::config::Config;
use aurora_core::datauri::{detect_mime_type, mime_for_extension};
use aurora_core::image::{AspectRatio, ImageClient, ImageRequest};
use aurora_core::llm::{ChatSession, GenerationClient, StreamFragment, TextRequest};
use aurora_core::vision::VisionClient;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

#[derive(Parser)]
#[command(name = "aurora")]
#[command(author, version, about = "Hosted generative-AI chat, images and vision", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single response
    Ask {
        /// Prompt text
        prompt: String,
        /// Model override
        #[arg(short, long)]
        model: Option<String>,
        /// System instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Stream a response as it is generated
    Stream {
        /// Prompt text
        prompt: String,
        /// Model override
        #[arg(short, long)]
        model: Option<String>,
        /// System instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Start an interactive chat
    Chat {
        /// Model override
        #[arg(short, long)]
        model: Option<String>,
        /// System instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Generate an image
    Image {
        /// Prompt describing the image
        prompt: String,
        /// Aspect ratio (1:1, 3:4, 4:3, 9:16, 16:9)
        #[arg(short, long)]
        aspect_ratio: Option<String>,
        /// Write the image to this file instead of printing a data URI
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Model override
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Describe a local image
    Vision {
        /// Image file
        file: PathBuf,
        /// Question or instruction about the image
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Logs go to stderr so streamed output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aurora=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            prompt,
            model,
            system,
        } => cmd_ask(&prompt, model, system).await,

        Commands::Stream {
            prompt,
            model,
            system,
        } => cmd_stream(&prompt, model, system).await,

        Commands::Chat { model, system } => cmd_chat(model, system, cli.quiet).await,

        Commands::Image {
            prompt,
            aspect_ratio,
            output,
            model,
        } => cmd_image(&prompt, aspect_ratio.as_deref(), output.as_deref(), model, cli.quiet).await,

        Commands::Vision { file, prompt } => cmd_vision(&file, prompt.as_deref()).await,

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn text_request(prompt: &str, model: Option<String>, system: Option<String>) -> TextRequest {
    let mut request = TextRequest::new(prompt);
    request.model = model;
    request.system_instruction = system;
    request
}

async fn cmd_ask(prompt: &str, model: Option<String>, system: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = GenerationClient::new(config.llm)?;

    let response = client.generate(&text_request(prompt, model, system)).await?;
    println!("{}", response.text);
    Ok(())
}

async fn cmd_stream(
    prompt: &str,
    model: Option<String>,
    system: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = GenerationClient::new(config.llm)?;

    let request = text_request(prompt, model, system);
    print_stream(&client, &request).await?;
    Ok(())
}

/// Print fragments as they arrive; returns the reply text unless the stream failed
async fn print_stream(
    client: &GenerationClient,
    request: &TextRequest,
) -> anyhow::Result<Option<String>> {
    let mut stream = client.generate_stream(request);
    let mut stdout = std::io::stdout();
    let mut reply = String::new();
    let mut failed = false;

    while let Some(fragment) = stream.next().await {
        write!(stdout, "{}", fragment)?;
        stdout.flush()?;
        match fragment {
            StreamFragment::Text(text) => reply.push_str(&text),
            StreamFragment::Failed(_) => failed = true,
        }
    }
    writeln!(stdout)?;

    Ok(if failed { None } else { Some(reply) })
}

async fn cmd_chat(
    model: Option<String>,
    system: Option<String>,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = GenerationClient::new(config.llm)?;

    let model_label = model
        .clone()
        .unwrap_or_else(|| client.default_model().to_string());

    let mut session = ChatSession::new();
    if let Some(model) = model {
        session = session.with_model(model);
    }
    if let Some(system) = system {
        session = session.with_system_instruction(system);
    }

    if !quiet {
        println!("{}", chat_banner(&model_label));
    }

    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let prompt = line.trim();
        match prompt {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                session.clear();
                if !quiet {
                    println!("Conversation cleared.");
                }
                continue;
            }
            _ => {}
        }

        let _ = editor.add_history_entry(prompt);

        match print_stream(&client, &session.request(prompt)).await? {
            Some(reply) => {
                session.record(prompt, reply);
            }
            None => warn!("Reply failed, not added to conversation history"),
        }
    }

    Ok(())
}

fn chat_banner(model: &str) -> String {
    format!("Chatting with {}. Type /clear to reset, /exit to quit.", model)
}

async fn cmd_image(
    prompt: &str,
    aspect_ratio: Option<&str>,
    output: Option<&Path>,
    model: Option<String>,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = ImageClient::from_config(&config)?;

    let mut request = ImageRequest::new(prompt);
    request.model = model;
    if let Some(ratio) = aspect_ratio {
        let ratio = AspectRatio::parse(ratio).ok_or_else(|| {
            anyhow!(
                "Invalid aspect ratio: {}. Valid options: {}",
                ratio,
                AspectRatio::all_labels().join(", ")
            )
        })?;
        request = request.with_aspect_ratio(ratio);
    }

    let response = client.generate(&request).await?;

    match output {
        Some(path) => {
            response
                .save_to_file(path)
                .with_context(|| format!("Failed to write image: {}", path.display()))?;
            if !quiet {
                println!(
                    "Saved {} ({} bytes, {}) to {}",
                    response.image.mime_type,
                    response.size_bytes(),
                    response.model_used,
                    path.display()
                );
                if let Some(caption) = &response.caption {
                    println!("{}", caption);
                }
            }
        }
        None => println!("{}", response.data_uri()),
    }

    Ok(())
}

async fn cmd_vision(file: &Path, prompt: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = VisionClient::from_config(&config)?;

    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read image: {}", file.display()))?;

    let mime_type = file
        .extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
        .unwrap_or_else(|| detect_mime_type(&bytes));

    let text = client.analyze(&bytes, mime_type, prompt.unwrap_or_default()).await;
    println!("{}", text);
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Aurora Health Check");
        println!("===================");
        println!();
    }

    let mut all_ok = true;

    match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
                println!("     Endpoint: {}", config.llm.base_url);
                println!(
                    "     Models: text={}, image={}, vision={}",
                    config.llm.default_model, config.image.model, config.vision.model
                );
            }

            match config.llm.redacted_api_key() {
                Ok(Some(redacted)) => {
                    if !quiet {
                        println!("[OK] API Key: Configured ({})", redacted);
                    }
                }
                Ok(None) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] API Key: Not configured (requests will use a placeholder)");
                        println!("     Set AURORA_API_KEY or GEMINI_API_KEY environment variable");
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] API Key: Error - {}", e);
                    }
                }
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {:#}", e);
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}
