//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the docs-summarizer CLI.

use owo_colors::OwoColorize;

use crate::types::{RagChunk, SummarizerResponse};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print the answer, its references and a truncation notice
    pub fn summary(&self, summary: &SummarizerResponse) {
        println!("\n{}\n", summary.response.trim());

        if !summary.rag_chunks.is_empty() {
            self.header("References");
            for reference in references(&summary.rag_chunks) {
                self.list_item(&reference);
            }
        }

        if summary.history_truncated {
            println!();
            self.warning("Conversation history was truncated to fit the context window");
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

/// One line per referenced document, in first-use order
pub fn references(chunks: &[RagChunk]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut lines = Vec::new();

    for chunk in chunks {
        if chunk.doc_url.is_empty() || seen.contains(&chunk.doc_url.as_str()) {
            continue;
        }
        seen.push(chunk.doc_url.as_str());
        lines.push(if chunk.doc_title.is_empty() {
            chunk.doc_url.clone()
        } else {
            format!("{} ({})", chunk.doc_title, chunk.doc_url)
        });
    }

    lines
}
