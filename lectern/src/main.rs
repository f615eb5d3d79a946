//! lectern - Fetch Project Gutenberg books, embed them, and ask questions

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lectern::content::GutenbergFetcher;
use lectern::store::FsStore;
use lectern::{LecternConfig, LecternError, Library};
use model_client::build_providers;

#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Fetch Project Gutenberg books, embed them, and ask questions", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show book metadata and start embedding generation in the background
    Book {
        /// Project Gutenberg book id
        book_id: String,
    },
    /// Fetch a book's text and process it now, printing chunk statistics
    Fetch {
        /// Project Gutenberg book id
        book_id: String,
    },
    /// Ask a question about a book, grounded on its cached chunks
    Ask {
        /// Project Gutenberg book id
        book_id: String,
        /// The question to ask
        query: String,
        /// Sampling temperature for the answer
        #[arg(long, default_value = "0.7")]
        temperature: f32,
    },
    /// Analyze book-wide sentiment over a sample of cached chunks
    Sentiment {
        /// Project Gutenberg book id
        book_id: String,
    },
    /// Split text into playback-sized chunks
    Chunks {
        /// Text to split; reads stdin when omitted
        text: Option<String>,

        /// Maximum characters per chunk
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the playback chunk size
    SetPlaybackChunkChars {
        /// Characters per playback chunk
        value: usize,
    },
    /// Set the embedding chunk size
    SetEmbeddingChunkChars {
        /// Characters per embedding chunk
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config = LecternConfig::load().context("Failed to load configuration")?;

    match args.command {
        Commands::Config { action } => handle_config_command(&action)?,
        Commands::Book { book_id } => {
            let library = build_library(&config)?;
            let metadata = library.book(&book_id).await?;
            println!("Book {}: \"{}\"", metadata.id, metadata.title);
            println!("Authors: {}", metadata.authors.join(", "));
            if let Some(language) = &metadata.language {
                println!("Language: {}", language);
            }
            println!("Embedding generation started in the background.");
            library.wait_for_generation(&book_id).await;
        }
        Commands::Fetch { book_id } => {
            let library = build_library(&config)?;
            let detail = library.content_with_processing(&book_id).await?;
            let stats = &detail.processed_content.statistics;
            println!("Pages: {}", detail.total_pages);
            println!(
                "Chunks: {} ({} characters)",
                stats.total_chunks, stats.total_characters
            );
        }
        Commands::Ask {
            book_id,
            query,
            temperature,
        } => {
            let library = build_library(&config)?;
            let answer = ask_with_retry(&library, &book_id, &query, temperature).await?;
            println!("{}", answer.response);
        }
        Commands::Sentiment { book_id } => {
            let library = build_library(&config)?;
            let report = match library.summarize_sentiment(&book_id).await {
                Ok(report) => report,
                Err(LecternError::EmbeddingsNotReady(_)) => {
                    eprintln!("Embeddings not ready, generating...");
                    library.wait_for_generation(&book_id).await;
                    library.summarize_sentiment(&book_id).await?
                }
                Err(err) => return Err(err.into()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Chunks { text, max_chars } => {
            let text = match text {
                Some(text) => text,
                None => std::io::read_to_string(std::io::stdin())
                    .context("Failed to read text from stdin")?,
            };
            let chunks = lectern::text::split_for_playback(
                &text,
                max_chars.unwrap_or(config.playback_chunk_chars),
            )?;
            for (i, chunk) in chunks.iter().enumerate() {
                println!("--- chunk {} ({} chars) ---", i, chunk.chars().count());
                println!("{}", chunk);
            }
        }
    }

    Ok(())
}

/// Wire the fetcher, cache, and model providers into a `Library`.
fn build_library(config: &LecternConfig) -> Result<Library> {
    let model_config =
        model_client::Config::load().context("Failed to load model configuration")?;
    let (chat, embedder) = build_providers(&model_config)?;

    let fetcher = Arc::new(GutenbergFetcher::new().with_page_chars(config.page_chars));
    let store = Arc::new(FsStore::new(config.cache_dir()?));

    Ok(Library::new(fetcher, store, chat, embedder, config))
}

/// Ask, and on a cache miss kick off generation, wait, and retry once.
async fn ask_with_retry(
    library: &Library,
    book_id: &str,
    query: &str,
    temperature: f32,
) -> Result<lectern::service::QueryAnswer> {
    match library.answer_query(book_id, query, temperature).await {
        Ok(answer) => Ok(answer),
        Err(LecternError::EmbeddingsNotReady(_)) => {
            eprintln!("Embeddings not ready, generating...");
            library.ensure_generation_started(book_id).await;
            library.wait_for_generation(book_id).await;
            Ok(library.answer_query(book_id, query, temperature).await?)
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = LecternConfig::load()?;
            println!("Configuration file: {:?}", LecternConfig::config_path()?);
            println!();
            println!("playback_chunk_chars = {}", config.playback_chunk_chars);
            println!("embedding_chunk_chars = {}", config.embedding_chunk_chars);
            println!("page_chars = {}", config.page_chars);
            println!("cache_dir = {:?}", config.cache_dir()?);
        }
        ConfigAction::SetPlaybackChunkChars { value } => {
            let mut config = LecternConfig::load()?;
            config.playback_chunk_chars = (*value).max(1);
            config.save()?;
            println!(
                "Default playback chunk size set to: {}",
                config.playback_chunk_chars
            );
        }
        ConfigAction::SetEmbeddingChunkChars { value } => {
            let mut config = LecternConfig::load()?;
            config.embedding_chunk_chars = (*value).max(1);
            config.save()?;
            println!(
                "Default embedding chunk size set to: {}",
                config.embedding_chunk_chars
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subcommand_parses() {
        assert!(matches!(
            Args::try_parse_from(["lectern", "book", "42"]).unwrap().command,
            Commands::Book { .. }
        ));
        assert!(matches!(
            Args::try_parse_from(["lectern", "ask", "42", "What is the theme?"])
                .unwrap()
                .command,
            Commands::Ask { .. }
        ));
        assert!(matches!(
            Args::try_parse_from(["lectern", "config", "show"]).unwrap().command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
        assert!(matches!(
            Args::try_parse_from(["lectern", "config", "set-playback-chunk-chars", "280"])
                .unwrap()
                .command,
            Commands::Config {
                action: ConfigAction::SetPlaybackChunkChars { value: 280 }
            }
        ));
    }

    #[test]
    fn test_ask_temperature_default_and_override() {
        let args = Args::try_parse_from(["lectern", "ask", "42", "q"]).unwrap();
        let Commands::Ask { temperature, .. } = args.command else {
            panic!("expected ask");
        };
        assert_eq!(temperature, 0.7);

        let args =
            Args::try_parse_from(["lectern", "ask", "42", "q", "--temperature", "0.2"]).unwrap();
        let Commands::Ask { temperature, .. } = args.command else {
            panic!("expected ask");
        };
        assert_eq!(temperature, 0.2);
    }
}
