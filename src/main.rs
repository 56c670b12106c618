//! docs-summarizer CLI entry point
//!
//! - `docs-summarizer ask <question>` - answer a question from the docs
//! - `docs-summarizer index <dir> --base-url URL` - ingest documentation
//! - `docs-summarizer config` - show or validate the configuration

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;

use docs_summarizer::cli::output::Output;
use docs_summarizer::cli::{Cli, Commands};
use docs_summarizer::rag::DocsIndex;
use docs_summarizer::utils::logging::configure_logging;
use docs_summarizer::utils::suid::{check_suid, get_suid};
use docs_summarizer::{
    ConfigBasedLLMLoader, DocsSummarizer, QueryHelperOptions, SummarizerConfig,
    SummarizerConfigManager,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Config { validate } => show_config(&cli.config, validate, &output)?,

        Commands::Ask {
            question,
            conversation_id,
            history,
            no_rag,
            model,
            json,
        } => {
            let (manager, config) = load_config(&cli.config, cli.verbose)?;
            let conversation_id = match conversation_id {
                Some(id) if check_suid(&id) => id,
                Some(id) => bail!("Invalid conversation id: {}", id),
                None => get_suid(),
            };

            let history = match history {
                Some(path) => read_history(&path).await?,
                None => Vec::new(),
            };

            let loader = Arc::new(ConfigBasedLLMLoader::new(Arc::clone(&manager)));
            let options = QueryHelperOptions::for_model(&config, loader, None, model.as_deref())?;
            let summarizer = DocsSummarizer::new(options)?;

            let notices = (!json).then_some(&output);
            let index = if no_rag {
                None
            } else {
                open_index(&config, notices).await?
            };

            let summary = summarizer
                .summarize(
                    &conversation_id,
                    &question,
                    index.as_deref(),
                    (!history.is_empty()).then_some(history.as_slice()),
                )
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output.summary(&summary);
            }
        }

        Commands::Index {
            docs_dir,
            base_url,
            chunk_size,
            chunk_overlap,
        } => {
            let (_, config) = load_config(&cli.config, cli.verbose)?;
            index_docs(&config, &docs_dir, &base_url, chunk_size, chunk_overlap, &output).await?;
        }
    }

    Ok(())
}

/// Load the configuration and install logging from it
fn load_config(
    path: &Path,
    verbose: bool,
) -> Result<(Arc<SummarizerConfigManager>, Arc<SummarizerConfig>)> {
    let manager = Arc::new(
        SummarizerConfigManager::new(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
    );
    let config = manager.config();

    let mut logging = config.logging.clone();
    if verbose {
        logging.app_log_level = "debug".to_string();
    }
    configure_logging(&logging);

    Ok((manager, config))
}

/// One history entry per non-empty line
async fn read_history(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(feature = "ares-vector")]
async fn open_vector_index(
    config: &SummarizerConfig,
) -> Result<Option<docs_summarizer::rag::vector_index::VectorDocsIndex>> {
    use docs_summarizer::rag::embeddings::configured_embedder;
    use docs_summarizer::rag::vector_index::VectorDocsIndex;

    let Some(reference) = config.reference_content.as_ref() else {
        return Ok(None);
    };

    let embedder = configured_embedder(config)?;
    let index = VectorDocsIndex::open(
        Some(reference.index_path.as_path()),
        reference.collection.clone(),
        embedder,
    )
    .await?;

    Ok(Some(index))
}

/// Index to answer from, or `None` (with a notice) when there is nothing to retrieve
#[cfg(feature = "ares-vector")]
async fn open_index(
    config: &SummarizerConfig,
    notices: Option<&Output>,
) -> Result<Option<Box<dyn DocsIndex>>> {
    let Some(index) = open_vector_index(config).await? else {
        if let Some(output) = notices {
            output.warning("No reference content configured; answering from the model alone");
        }
        return Ok(None);
    };

    if !index.has_collection() {
        if let Some(output) = notices {
            output.warning(&format!(
                "Collection '{}' has not been indexed yet; answering from the model alone",
                index.collection()
            ));
            output.command("docs-summarizer index <docs_dir> --base-url <url>");
        }
        return Ok(None);
    }

    Ok(Some(Box::new(index)))
}

#[cfg(not(feature = "ares-vector"))]
async fn open_index(
    config: &SummarizerConfig,
    notices: Option<&Output>,
) -> Result<Option<Box<dyn DocsIndex>>> {
    if config.reference_content.is_some() {
        tracing::warn!("[reference_content] is configured but this build has no index backend");
    }
    if let Some(output) = notices {
        output.warning("No reference content available; answering from the model alone");
    }
    Ok(None)
}

#[cfg(feature = "ares-vector")]
async fn index_docs(
    config: &SummarizerConfig,
    docs_dir: &Path,
    base_url: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    output: &Output,
) -> Result<()> {
    use docs_summarizer::rag::chunker::TextChunker;
    use docs_summarizer::rag::ingest::ingest_directory;

    let Some(index) = open_vector_index(config).await? else {
        bail!("No [reference_content] section in the configuration");
    };

    output.info(&format!(
        "Indexing {} into collection '{}'",
        docs_dir.display(),
        index.collection()
    ));

    let chunker = TextChunker::new(chunk_size, chunk_overlap)?;
    let stats = ingest_directory(&index, &chunker, docs_dir, base_url).await?;

    output.success(&format!(
        "Indexed {} passages from {} documents",
        stats.passages, stats.documents
    ));
    Ok(())
}

#[cfg(not(feature = "ares-vector"))]
async fn index_docs(
    _config: &SummarizerConfig,
    _docs_dir: &Path,
    _base_url: &str,
    _chunk_size: usize,
    _chunk_overlap: usize,
    output: &Output,
) -> Result<()> {
    output.hint("Rebuild with the 'ares-vector' feature to enable indexing");
    bail!("Indexing is not available in this build");
}

fn show_config(path: &Path, validate: bool, output: &Output) -> Result<()> {
    let config = match SummarizerConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            output.hint("Fix the file and check it again with:");
            output.command("docs-summarizer --config docs-summarizer.toml config --validate");
            bail!("Invalid configuration: {}", path.display());
        }
    };

    if validate {
        output.success(&format!("{} is valid", path.display()));
        return Ok(());
    }

    let section = &config.summarizer;
    output.header("Summarizer");
    output.kv("config", &path.display().to_string());
    output.kv("default provider", &section.default_provider);
    output.kv("default model", &section.default_model);
    output.kv(
        "system prompt",
        match (&section.system_prompt_path, &section.system_prompt) {
            (Some(_), _) => "from file",
            (None, Some(_)) => "inline",
            (None, None) => "built-in default",
        },
    );

    output.header("Retrieval");
    output.kv("top_k", &section.rag.top_k.to_string());
    output.kv("similarity cutoff", &section.rag.similarity_cutoff.to_string());
    output.kv(
        "minimum context tokens",
        &section.rag.minimum_context_tokens.to_string(),
    );
    match &config.reference_content {
        Some(reference) => {
            output.kv("index", &reference.index_path.display().to_string());
            output.kv("collection", &reference.collection);
            output.kv(
                "embeddings",
                &format!(
                    "{} via {}",
                    reference.embeddings_model, reference.embeddings_provider
                ),
            );
        }
        None => output.kv("index", "none"),
    }

    output.header("Models");
    let mut models: Vec<_> = config.models.iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));
    for (name, model) in models {
        output.list_item(&format!(
            "{} = {} via {} (context {}, response {})",
            name,
            model.model,
            model.provider,
            model.context_window_size,
            model.max_tokens_for_response
        ));
    }

    output.newline();
    Ok(())
}
