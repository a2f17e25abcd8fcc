use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use teloxide::Bot;
use telehtml::{
    html::{TelegramHtml, create_image_caption, format_html_for_telegram},
    publish::{Post, PublishOutcome, PublishSettings, TelegramApi, TelegramPublisher},
};

use crate::{
    config::{Args, Commands},
    error::CliError,
};

pub const CHUNK_SEPARATOR: &str = "----------------------------------------";

pub async fn run(args: Args) -> Result<(), CliError> {
    let output = match &args.command {
        Commands::Format { input } => format_html_for_telegram(&read_input(input.as_deref())?),
        Commands::Split { input, max_length } => {
            render_chunks(&read_input(input.as_deref())?, *max_length)
        }
        Commands::Caption { input } => create_image_caption(&read_input(input.as_deref())?),
        Commands::Publish { post, chat_id } => {
            let post = load_post(post)?;
            let api: Arc<dyn TelegramApi> = Arc::new(Bot::new(args.get_token()?));
            let outcome = publish(api, chat_id, &post).await?;
            serde_yaml::to_string(&outcome)?
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

/// Reads the whole file, or stdin when no file is given
fn read_input(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .map_err(|source| CliError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(html)
        }
    }
}

/// Formats `html` and joins the resulting messages with a separator line
pub fn render_chunks(html: &str, max_length: usize) -> String {
    let formatted = TelegramHtml::format(html);
    let chunks: Vec<String> = formatted
        .chunks(max_length)
        .map(TelegramHtml::into_string)
        .collect();
    log::info!(
        "{} characters split into {} message(s) of at most {max_length}",
        formatted.len(),
        chunks.len()
    );
    chunks.join(&format!("\n{CHUNK_SEPARATOR}\n"))
}

pub fn load_post(path: &Path) -> Result<Post, CliError> {
    let content = read_input(Some(path))?;
    serde_yaml::from_str(&content).map_err(|source| CliError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn publish(
    api: Arc<dyn TelegramApi>,
    chat_id: &str,
    post: &Post,
) -> Result<PublishOutcome, CliError> {
    let publisher = TelegramPublisher::connect(api, chat_id, PublishSettings::default()).await?;
    Ok(publisher.publish(post).await?)
}
