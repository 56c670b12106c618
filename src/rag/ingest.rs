//! Documentation ingestion into a [`VectorDocsIndex`].
//!
//! Every `.md`/`.txt` file under the docs directory is split into passages.
//! The public URL of a file is the base URL joined with its relative path,
//! with the extension swapped for `.html`.
//!
//! Passage ids are `<relative path>#<n>`. Re-ingesting a document removes
//! all of its previous passages before storing the new ones. Files deleted from
//! the docs tree are not detected; rebuild the index to drop them.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::rag::chunker::TextChunker;
use crate::rag::vector_index::VectorDocsIndex;
use crate::types::{AppError, Result};

const DOC_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Counts reported after an ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub documents: usize,
    pub passages: usize,
}

/// Public URL for a file relative to the docs root
pub fn docs_url(base_url: &str, relative: &Path) -> String {
    let page = relative.with_extension("html");
    let page = page
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base_url.trim_end_matches('/'), page)
}

/// First markdown heading, else the file stem
pub fn document_title(content: &str, path: &Path) -> String {
    content
        .lines()
        .map(str::trim)
        .find_map(|line| {
            let heading = line.trim_start_matches('#');
            (line.starts_with('#') && heading.starts_with(' ')).then(|| heading.trim().to_string())
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

/// Split, embed and store every document under `docs_dir`
pub async fn ingest_directory(
    index: &VectorDocsIndex,
    chunker: &TextChunker,
    docs_dir: &Path,
    base_url: &str,
) -> Result<IngestStats> {
    if !docs_dir.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "Not a directory: {}",
            docs_dir.display()
        )));
    }

    let mut stats = IngestStats::default();

    for entry in WalkDir::new(docs_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let is_doc = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOC_EXTENSIONS.contains(&ext));
        if !is_doc {
            continue;
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable document");
                continue;
            }
        };

        let relative = path.strip_prefix(docs_dir).unwrap_or(path);
        let url = docs_url(base_url, relative);
        let title = document_title(&content, path);

        // previous passages go first; overwriting an id in place leaves its old vector searchable
        let mut removed = 0;
        while index
            .remove_passage(&format!("{}#{}", relative.display(), removed))
            .await?
        {
            removed += 1;
        }

        let passages = chunker.chunk(&content);
        debug!(url = %url, passages = passages.len(), removed, "Ingesting document");

        for (i, passage) in passages.iter().enumerate() {
            let id = format!("{}#{}", relative.display(), i);
            index.add_passage(&id, passage, &url, &title).await?;
        }

        stats.documents += 1;
        stats.passages += passages.len();
    }

    index.persist().await?;
    info!(
        documents = stats.documents,
        passages = stats.passages,
        "Ingestion complete"
    );

    Ok(stats)
}
