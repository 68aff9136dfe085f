use serde_json::json;

use neighborhood_data::chat::{ChatResponder, LlmProvider, PlaceholderChat};
use neighborhood_data::domain::DatasetCategory;
use neighborhood_data::retrieval::{API_KEY_VAR, PlaceholderIndex, RecordIndex, SERVER_URL_VAR};
use neighborhood_data::table::Record;

#[test]
fn placeholder_chat_returns_nothing() {
    let chat = PlaceholderChat::new(LlmProvider::Anthropic, None);
    let context = json!({"neighborhood": "Uptown"});
    assert_eq!(
        chat.generate_response("is Uptown safe?", Some(&context))
            .unwrap(),
        None
    );
    assert_eq!(chat.extract_neighborhood("tell me about Uptown").unwrap(), None);
    assert!(!chat.has_api_key());
}

#[test]
fn provider_key_variables() {
    assert_eq!(LlmProvider::Anthropic.api_key_var(), "ANTHROPIC_API_KEY");
    assert_eq!(LlmProvider::Openai.api_key_var(), "OPENAI_API_KEY");
}

#[test]
fn placeholder_index_stores_nothing() {
    let index = PlaceholderIndex::new(Some("http://localhost:8080".to_string()), None);
    assert!(!index.connect().unwrap());
    assert!(!index.index(&[Record::new()], DatasetCategory::Crime).unwrap());
    assert!(index.query("theft", None).unwrap().is_empty());
    assert_eq!(index.server_url(), Some("http://localhost:8080"));
}

#[test]
fn collaborators_read_credentials_from_lookup() {
    let chat = PlaceholderChat::from_lookup(LlmProvider::Openai, |name| {
        (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    });
    assert!(chat.has_api_key());
    assert_eq!(chat.provider(), LlmProvider::Openai);

    let blank = PlaceholderChat::from_lookup(LlmProvider::Anthropic, |_| Some("  ".to_string()));
    assert!(!blank.has_api_key());

    let index = PlaceholderIndex::from_lookup(|name| match name {
        SERVER_URL_VAR => Some("http://mcp.local".to_string()),
        API_KEY_VAR => Some(String::new()),
        _ => None,
    });
    assert_eq!(index.server_url(), Some("http://mcp.local"));
    assert!(!index.has_api_key());
}
