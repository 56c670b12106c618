//! Integration tests for DocsSummarizer
//!
//! These tests run the full summarize flow against mock LLM, index and
//! reranker implementations:
//! - system prompt resolution from the configuration
//! - history handling and truncation
//! - answering with and without reference content
//! - reranker invocation and its log line

mod common;

use std::sync::Arc;

use common::mocks::{MockDocsIndex, MockLLMClient, MockLLMLoader, RecordingReranker, test_doc_url};
use docs_summarizer::types::{RagChunk, Result, RetrievedNode, SummarizerResponse};
use docs_summarizer::utils::logging::LoggingConfig;
use docs_summarizer::utils::suid::get_suid;
use docs_summarizer::utils::token_handler::{TokenBudget, TokenBudgetLimits, TokenHandler};
use docs_summarizer::{DocsSummarizer, QueryHelper, QueryHelperOptions, SummarizerConfig};
use mockall::mock;
use parking_lot::Mutex;
use rstest::rstest;
use tracing_subscriber::EnvFilter;

const QUESTION: &str = "What's the ultimate question with answer 42?";

/// Test helper: configuration with a small context window and the given limits
fn test_config(similarity_cutoff: f32, minimum_context_tokens: usize) -> SummarizerConfig {
    SummarizerConfig::parse(&format!(
        r#"
[summarizer]
default_provider = "mock"
default_model = "mock-model"
system_prompt = "You are a test assistant for product documentation."

[summarizer.rag]
top_k = 3
similarity_cutoff = {similarity_cutoff}
minimum_context_tokens = {minimum_context_tokens}

[providers.mock]
type = "ollama"
base_url = "http://localhost:11434"

[models.mock-model]
provider = "mock"
model = "mock-model"
context_window_size = 8192
max_tokens_for_response = 512
"#
    ))
    .expect("test configuration is valid")
}

fn summarizer_with(config: &SummarizerConfig, loader: MockLLMLoader) -> DocsSummarizer {
    let options =
        QueryHelperOptions::from_config(config, Arc::new(loader)).expect("options from config");
    DocsSummarizer::new(options).expect("summarizer")
}

fn summarizer(similarity_cutoff: f32, minimum_context_tokens: usize) -> DocsSummarizer {
    summarizer_with(
        &test_config(similarity_cutoff, minimum_context_tokens),
        MockLLMLoader::default(),
    )
}

fn check_summary_result(summary: &SummarizerResponse, question: &str) {
    assert!(summary.response.contains(question));
    assert_eq!(summary.rag_chunks.len(), 1);
    assert!(summary.rag_chunks[0].doc_url.contains(&test_doc_url()));
    assert!(!summary.history_truncated);
}

mock! {
    pub Budget {}

    impl TokenBudget for Budget {
        fn calculate_and_check_available_tokens(
            &self,
            prompt: &str,
            context_window_size: usize,
            max_tokens_for_response: usize,
        ) -> Result<usize>;

        fn truncate_rag_context(
            &self,
            nodes: &[RetrievedNode],
            max_tokens: usize,
        ) -> Result<(Vec<RagChunk>, usize)>;

        fn limit_conversation_history(&self, history: &[String], limit: usize) -> (Vec<String>, bool);
    }
}

/// Budget mock that delegates to a real handler except for history limiting,
/// which must see `expected_history`
fn budget_expecting_history(expected_history: Vec<String>) -> MockBudget {
    let handler = TokenHandler::new(TokenBudgetLimits {
        similarity_cutoff: 0.4,
        minimum_context_tokens: 3,
    })
    .expect("token handler");

    let mut budget = MockBudget::new();

    let available = handler.clone();
    budget
        .expect_calculate_and_check_available_tokens()
        .times(1)
        .returning(move |prompt, window, response| {
            available.calculate_and_check_available_tokens(prompt, window, response)
        });

    budget
        .expect_truncate_rag_context()
        .times(1)
        .returning(move |nodes, max_tokens| handler.truncate_rag_context(nodes, max_tokens));

    budget
        .expect_limit_conversation_history()
        .withf(move |history, _| history == expected_history.as_slice())
        .times(1)
        .returning(|_, _| (Vec::new(), false));

    budget
}

// ============= QueryHelper =============

#[test]
fn test_is_query_helper() {
    fn assert_query_helper<T: QueryHelper>() {}
    assert_query_helper::<DocsSummarizer>();
}

#[test]
fn test_if_system_prompt_was_updated() {
    let config = test_config(0.3, 1);
    let summarizer = summarizer_with(&config, MockLLMLoader::default());

    let expected_prompt = config.system_prompt().unwrap();
    assert_eq!(summarizer.system_prompt(), expected_prompt);
    assert_eq!(
        summarizer.system_prompt(),
        "You are a test assistant for product documentation."
    );
}

#[test]
fn test_system_prompt_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let prompt_path = dir.path().join("system.txt");
    std::fs::write(&prompt_path, "Answer from the prompt file.\n").unwrap();

    let content = format!(
        r#"
[summarizer]
default_provider = "mock"
default_model = "mock-model"
system_prompt_path = "{}"

[providers.mock]
type = "ollama"
base_url = "http://localhost:11434"

[models.mock-model]
provider = "mock"
model = "mock-model"
"#,
        prompt_path.display().to_string().replace('\\', "/")
    );
    let config_path = dir.path().join("docs-summarizer.toml");
    std::fs::write(&config_path, content).unwrap();

    let config = SummarizerConfig::load(&config_path).unwrap();
    let summarizer = summarizer_with(&config, MockLLMLoader::default());

    assert_eq!(summarizer.system_prompt(), "Answer from the prompt file.");
}

// ============= Summarize =============

#[rstest]
#[case::empty_history(Some(Vec::new()), 1)]
#[case::no_history(None, 3)]
#[tokio::test]
async fn test_summarize_without_prior_turns(
    #[case] history: Option<Vec<String>>,
    #[case] minimum_context_tokens: usize,
) {
    let summarizer = summarizer(0.4, minimum_context_tokens);
    let index = MockDocsIndex::new();

    let summary = summarizer
        .summarize(&get_suid(), QUESTION, Some(&index), history.as_deref())
        .await
        .unwrap();

    check_summary_result(&summary, QUESTION);
}

#[tokio::test]
async fn test_summarize_history_provided() {
    let history = vec!["human: What is Kubernetes?".to_string()];
    let index = MockDocsIndex::new();

    // first call with history provided
    let summarizer = summarizer(0.4, 3).with_token_budget(Arc::new(budget_expecting_history(
        history.clone(),
    )));
    let summary1 = summarizer
        .summarize(&get_suid(), QUESTION, Some(&index), Some(history.as_slice()))
        .await
        .unwrap();
    check_summary_result(&summary1, QUESTION);

    // second call without history provided
    let summarizer = summarizer
        .with_token_budget(Arc::new(budget_expecting_history(Vec::new())));
    let summary2 = summarizer
        .summarize(&get_suid(), QUESTION, Some(&index), None)
        .await
        .unwrap();
    check_summary_result(&summary2, QUESTION);
}

#[tokio::test]
async fn test_summarize_truncation() {
    let summarizer = summarizer(0.4, 1);
    let index = MockDocsIndex::new();

    // too long history
    let history = vec!["human: What is Kubernetes?".to_string(); 10000];
    let summary = summarizer
        .summarize(&get_suid(), QUESTION, Some(&index), Some(history.as_slice()))
        .await
        .unwrap();

    // truncation should be done
    assert!(summary.history_truncated);
    assert!(summary.response.contains(QUESTION));
}

#[tokio::test]
async fn test_truncated_history_keeps_newest_turns() {
    let loader = MockLLMLoader::default();
    let summarizer = summarizer_with(&test_config(0.4, 1), loader.clone());

    let mut history = vec!["human: What is Kubernetes?".to_string(); 5000];
    history.push("ai: The newest answer.".to_string());

    let summary = summarizer
        .summarize(&get_suid(), QUESTION, None, Some(history.as_slice()))
        .await
        .unwrap();
    assert!(summary.history_truncated);

    let transcripts = loader.client().transcripts();
    let messages = &transcripts[0];
    // system, kept history, question
    assert!(messages.len() > 2);
    assert!(messages.len() < history.len() + 2);
    assert_eq!(messages[messages.len() - 2].content, "The newest answer.");
}

#[tokio::test]
async fn test_summarize_no_reference_content() {
    let loader = MockLLMLoader::new(MockLLMClient::new("test response: "));
    let summarizer = summarizer_with(&test_config(0.3, 1), loader.clone());

    let summary = summarizer
        .summarize(&get_suid(), QUESTION, None, None)
        .await
        .unwrap();

    assert!(summary.response.contains(QUESTION));
    assert!(summary.response.starts_with("test response: "));
    assert!(summary.rag_chunks.is_empty());
    assert!(!summary.history_truncated);
    assert_eq!(
        loader.loads(),
        vec![("mock".to_string(), "mock-model".to_string())]
    );
}

#[tokio::test]
async fn test_summarize_llm_failure_propagates() {
    let loader = MockLLMLoader::new(MockLLMClient::failing());
    let summarizer = summarizer_with(&test_config(0.3, 1), loader);

    let result = summarizer
        .summarize(&get_suid(), QUESTION, Some(&MockDocsIndex::new()), None)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_low_scoring_passages_are_skipped() {
    let index = MockDocsIndex::with_nodes(vec![
        RetrievedNode::new("good", "Relevant passage.", Some(0.8)),
        RetrievedNode::new("weak", "Barely related passage.", Some(0.1)),
        RetrievedNode::new("good-again", "Never reached.", Some(0.7)),
    ]);

    let summary = summarizer(0.4, 1)
        .summarize(&get_suid(), QUESTION, Some(&index), None)
        .await
        .unwrap();

    assert_eq!(summary.rag_chunks.len(), 1);
    assert_eq!(summary.rag_chunks[0].text, "Relevant passage.");
}

// ============= Reranker =============

#[tokio::test]
async fn test_custom_reranker_order_is_used() {
    let index = MockDocsIndex::with_nodes(vec![
        RetrievedNode::new("first", "First passage.", Some(0.9)),
        RetrievedNode::new("second", "Second passage.", Some(0.8)),
    ]);
    let reranker = RecordingReranker::new();

    let summary = summarizer(0.4, 1)
        .with_reranker(Arc::new(reranker.clone()))
        .summarize(&get_suid(), QUESTION, Some(&index), None)
        .await
        .unwrap();

    assert_eq!(reranker.calls(), vec![2]);
    let texts: Vec<&str> = summary.rag_chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Second passage.", "First passage."]);
}

/// Shared buffer the test subscriber writes formatted events into
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[tokio::test]
async fn test_summarize_reranker() {
    let logging = LoggingConfig {
        app_log_level: "debug".to_string(),
        ..Default::default()
    };
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(logging.directives()))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let summarizer = summarizer(0.4, 3);
    let index = MockDocsIndex::new();
    // no history is passed into summarize() method
    let summary = summarizer
        .summarize(&get_suid(), QUESTION, Some(&index), None)
        .await
        .unwrap();
    check_summary_result(&summary, QUESTION);

    // Check captured log text to see if reranker was called.
    let logs = buffer.contents();
    assert!(logs.contains("reranker.rerank() is called with 1 result(s)."));
    assert!(logs.contains("call summarize"));
}

#[tokio::test]
async fn test_no_reference_content_is_logged() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("docs_summarizer=debug"))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    summarizer(0.3, 1)
        .summarize(&get_suid(), QUESTION, None, None)
        .await
        .unwrap();

    let logs = buffer.contents();
    assert!(logs.contains("Proceeding without RAG content"));
    assert!(logs.contains("Using llm to answer the query without reference content"));
}
