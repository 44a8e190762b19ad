use std::{env, sync::Arc, sync::Once};

use doc_intake::{
    config,
    fetch::HttpFetcher,
    processing::condense_text,
    summarization::{SummarizationAdapter, get_generative_model},
};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() {
    INIT.call_once(|| {
        set_default_env("SUMMARIZATION_PROVIDER", "ollama");
        set_default_env("OLLAMA_URL", "http://127.0.0.1:11434");
        set_default_env("SUMMARIZATION_MODEL", "llama3.2");
        config::init_config();
    });
}

fn live_summarizer() -> SummarizationAdapter {
    let fetcher = Arc::new(HttpFetcher::from_config().expect("fetcher"));
    let model = get_generative_model(fetcher).expect("model client");
    assert!(model.is_some(), "summarization provider must be enabled");
    SummarizationAdapter::from_model(model)
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_ollama_summarizes_long_text() {
    init_config_once();
    let summarizer = live_summarizer();
    let text = "The quarterly report covers revenue growth across three regions, \
                a new hiring plan for the platform team, and the migration of the \
                billing system to a managed database service.";

    let condensed = condense_text(text, &summarizer)
        .await
        .expect("summary from live provider");

    assert!(condensed.summarized);
    assert!(condensed.word_count > 5);
    assert!(!condensed.content.trim().is_empty());
    assert!(condensed.content.chars().count() <= 1000);
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_ollama_plain_prompt() {
    init_config_once();
    let summarizer = live_summarizer();
    let reply = summarizer
        .summarize("Reply with the single word: ready")
        .await
        .expect("reply from live provider");
    assert!(!reply.is_empty());
}
