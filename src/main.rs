//! BFG Feedback - localized feedback form
//!
//! Collects a short comment, an optional 0-5 star rating and an optional unique code, then
//! runs the submission pipeline:
//! - validates the unique code (skipped for the anonymous code)
//! - sends the comment to the sentiment-analysis service
//! - persists the enriched record

mod api;
mod config;
mod connectivity;
mod feedback;
mod i18n;
mod idempotency;
mod logging;
mod tui;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiSettings};
use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::feedback::cli::OneShot;
use crate::feedback::pipeline::FeedbackServices;
use crate::feedback::{ANONYMOUS_CODE, MAX_RATING};
use crate::i18n::{Language, Localizer};
use crate::logging::LogTarget;

/// BFG Feedback - share your experience
#[derive(Parser)]
#[command(name = "bfg-feedback")]
#[command(author = "BFG")]
#[command(version)]
#[command(about = "Send a comment and a rating; comments are analyzed for sentiment before saving")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the feedback form (terminal UI when interactive, prompts otherwise)
    Start,

    /// Open the fullscreen terminal form
    Tui,

    /// Fill the form line by line
    Prompt,

    /// Submit feedback without prompts
    Submit {
        /// Comment text (max 500 characters)
        #[arg(short, long, default_value = "")]
        comment: String,

        /// Star rating, 0 for none
        #[arg(
            short,
            long,
            default_value_t = 0,
            value_parser = clap::value_parser!(u8).range(0..=MAX_RATING as i64)
        )]
        rating: u8,

        /// Unique code; empty or BLFLGE submits anonymously
        #[arg(long, default_value = "")]
        code: String,

        /// Language code (fr, en, du, ba, ew); unknown codes use the fallback language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show configuration
    Config {
        /// Write the default config file if it does not exist yet
        #[arg(long, default_value_t = false)]
        init: bool,
    },

    /// List supported languages
    Languages,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    let wants_tui = match cli.command {
        Some(Commands::Tui) => true,
        Some(Commands::Start) | None => interactive,
        _ => false,
    };
    let target = if wants_tui {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    if let Err(err) = logging::init(target) {
        eprintln!(
            "{} {}",
            "Logging disabled:".bright_yellow(),
            err.to_string().bright_black()
        );
    }

    if let Some(Commands::Config { init }) = cli.command {
        return show_config_info(init);
    }
    if let Some(Commands::Languages) = cli.command {
        show_languages();
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "could not load config, using defaults");
            eprintln!(
                "{} {}",
                "Could not load config, using defaults:".bright_yellow(),
                err
            );
            Config::default()
        }
    };

    let client = Arc::new(ApiClient::new(ApiSettings::from_config(&config)));
    info!(
        base_url = %client.settings().base_url,
        analysis_url = %client.settings().analysis_url,
        "api client ready"
    );
    let mut l10n = Localizer::with_fallback(config.ui.language, config.ui.fallback_language);
    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Some(Commands::Start) | None => {
            if interactive {
                if let Err(err) = open_tui(&rt, &client, &config, l10n) {
                    println!(
                        "{} {}",
                        "Could not start Terminal UI:".bright_red(),
                        err.to_string().bright_red()
                    );
                    println!("{}", "Falling back to the prompt flow...".bright_yellow());
                    feedback::cli::run_feedback_flow(&rt, client.as_ref(), l10n)?;
                }
            } else {
                feedback::cli::run_feedback_flow(&rt, client.as_ref(), l10n)?;
            }
        }
        Some(Commands::Tui) => {
            if !interactive {
                println!(
                    "{}",
                    "The terminal UI requires an interactive TTY. Try `bfg-feedback prompt` or run from a real terminal."
                        .bright_yellow()
                );
                return Ok(());
            }
            open_tui(&rt, &client, &config, l10n)?;
        }
        Some(Commands::Prompt) => {
            feedback::cli::run_feedback_flow(&rt, client.as_ref(), l10n)?;
        }
        Some(Commands::Submit {
            comment,
            rating,
            code,
            language,
        }) => {
            let language = match language {
                Some(code) => l10n.set_language_code(&code),
                None => config.ui.language,
            };
            let values = OneShot {
                language,
                comment,
                rating,
                unique_code: code,
            };
            if !feedback::cli::run_one_shot(&rt, client.as_ref(), l10n, values) {
                bail!("feedback was not saved");
            }
        }
        Some(Commands::Config { .. }) | Some(Commands::Languages) => {}
    }

    Ok(())
}

fn open_tui(
    rt: &tokio::runtime::Runtime,
    client: &Arc<ApiClient>,
    config: &Config,
    l10n: Localizer,
) -> Result<()> {
    let monitor = ConnectivityMonitor::spawn(rt.handle(), Arc::clone(client), &config.connectivity);
    let services: Arc<dyn FeedbackServices> = client.clone();
    tui::run_tui(rt, services, monitor, l10n, config.ui.dark_mode)
}

fn show_config_info(init: bool) -> Result<()> {
    println!("{}", "BFG Feedback Configuration\n".bright_cyan().bold());

    match config::get_config_path() {
        Ok(path) => {
            println!("{} {}", "Config file:".bright_yellow(), path.bright_white());
            if std::path::Path::new(&path).exists() {
                println!("  {} {}", "Status:".bright_cyan(), "Exists".bright_green());
            } else if !init {
                println!(
                    "  {} {}",
                    "Status:".bright_cyan(),
                    "Not created yet (will use defaults)".bright_yellow()
                );
            }
        }
        Err(e) => {
            println!(
                "{} Could not determine config path: {}",
                "Error:".bright_red(),
                e
            );
        }
    }

    let cfg = if init {
        match Config::init() {
            Ok(cfg) => {
                println!("  {} {}", "Status:".bright_cyan(), "Initialized".bright_green());
                cfg
            }
            Err(err) => {
                println!(
                    "  {} {}",
                    "Note:".bright_yellow(),
                    format!("Could not create config file: {err}").bright_black()
                );
                Config::load().unwrap_or_default()
            }
        }
    } else {
        Config::load()?
    };

    let client = ApiClient::new(ApiSettings::from_config(&cfg));
    let settings = client.settings();

    println!("\n{}", "API settings:".bright_white().bold());
    println!("  {} {}", "Base URL:".bright_cyan(), settings.base_url);
    println!("  {} {}", "Code check:".bright_cyan(), client.validate_code_url());
    println!("  {} {}", "Feedback:".bright_cyan(), client.feedback_url());
    println!("  {} {}", "Analysis:".bright_cyan(), settings.analysis_url);
    println!(
        "  {} {}s",
        "Timeout:".bright_cyan(),
        settings.timeout_seconds
    );
    println!(
        "  {} {}",
        "Verify TLS:".bright_cyan(),
        if settings.verify_ssl { "yes" } else { "no" }
    );

    println!("\n{}", "Form:".bright_white().bold());
    println!(
        "  {} {} ({})",
        "Language:".bright_cyan(),
        cfg.ui.language.display_name(),
        cfg.ui.language.code()
    );
    println!(
        "  {} {} ({})",
        "Fallback:".bright_cyan(),
        cfg.ui.fallback_language.display_name(),
        cfg.ui.fallback_language.code()
    );
    println!(
        "  {} {}",
        "Theme:".bright_cyan(),
        if cfg.ui.dark_mode { "dark" } else { "light" }
    );
    println!("  {} {}", "Anonymous code:".bright_cyan(), ANONYMOUS_CODE);

    println!("\n{}", "Connectivity:".bright_white().bold());
    println!(
        "  {} {}",
        "Health check:".bright_cyan(),
        if cfg.connectivity.enabled {
            format!("every {}s", cfg.connectivity.check_interval_seconds)
        } else {
            "disabled".to_string()
        }
    );

    if let Ok(dir) = config::log_dir() {
        println!("\n{} {}", "Logs:".bright_yellow(), dir.display());
    }

    Ok(())
}

fn show_languages() {
    println!("{}", "Supported languages\n".bright_cyan().bold());
    for language in Language::ALL {
        println!(
            "  {}  {}",
            language.code().bright_white().bold(),
            language.display_name()
        );
    }
}
