use std::path::PathBuf;

use clap::{Parser, Subcommand};
use telehtml::html::TELEGRAM_MAX_MESSAGE_LENGTH;

use crate::error::CliError;

pub const PREDEFINED_BOT_TOKEN_RELEASE: Option<&str> = option_env!("PREDEFINED_BOT_TOKEN_RELEASE");
pub const PREDEFINED_BOT_TOKEN_DEBUG: Option<&str> = option_env!("PREDEFINED_BOT_TOKEN_DEBUG");
pub const PREDEFINED_BOT_TOKEN: Option<&str> = if cfg!(debug_assertions) {
    PREDEFINED_BOT_TOKEN_DEBUG
} else {
    PREDEFINED_BOT_TOKEN_RELEASE
};
pub const BOT_TOKEN_HELP: &str = if PREDEFINED_BOT_TOKEN_RELEASE.is_some() {
    "Environment variable name containing the bot token. If not set, uses precompiled token"
} else {
    "Environment variable name containing the bot token (required for publish)"
};

/// Formats editor HTML for Telegram and publishes posts to channels
#[derive(Parser, Debug)]
#[command(name = "postbot")]
#[command(about = "Formats HTML for Telegram and publishes posts", long_about = None)]
pub struct Args {
    #[arg(long, global = true, help = BOT_TOKEN_HELP)]
    pub bot_token_env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the Telegram markup for an HTML file (stdin if omitted)
    Format { input: Option<PathBuf> },

    /// Print the formatted markup split into messages
    Split {
        input: Option<PathBuf>,
        #[arg(long, default_value_t = TELEGRAM_MAX_MESSAGE_LENGTH)]
        max_length: usize,
    },

    /// Print the photo caption form of an HTML file
    Caption { input: Option<PathBuf> },

    /// Publish a post described in a YAML file
    Publish {
        post: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        chat_id: String,
    },
}

impl Args {
    /// Get the bot token from the named environment variable or the predefined token
    pub fn get_token(&self) -> Result<String, CliError> {
        if let Some(env_name) = &self.bot_token_env {
            std::env::var(env_name).map_err(|_| {
                CliError::Config(format!("Environment variable {env_name} not found"))
            })
        } else if let Some(predefined) = PREDEFINED_BOT_TOKEN {
            Ok(predefined.to_string())
        } else {
            Err(CliError::Config(
                "No bot token provided and no precompiled token available. Use --bot-token-env"
                    .to_string(),
            ))
        }
    }
}
