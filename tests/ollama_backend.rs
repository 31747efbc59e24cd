mod common;

use common::{expected_reply, FakeOllama};
use lmi::models::{stream_reply, Backend, ChatMessage, OllamaBackend};
use lmi::LmiError;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn lists_models_in_server_order() {
    let base_url = FakeOllama::new(&["llama3:latest", "mistral:7b"]).start().await;
    let backend = OllamaBackend::new(base_url).unwrap();

    assert!(backend.is_running().await);
    assert_eq!(
        backend.list_models().await.unwrap(),
        vec!["llama3:latest", "mistral:7b"]
    );
}

#[tokio::test]
async fn streamed_fragments_concatenate_to_full_reply() {
    let fake = FakeOllama::new(&["llama3"]);
    let base_url = fake.clone().start().await;
    let backend = OllamaBackend::new(base_url).unwrap();

    let history = vec![
        ChatMessage::user("hello there"),
        ChatMessage::assistant("hi"),
        ChatMessage::user("how are you today"),
    ];
    let fragments = backend.chat_stream("llama3", &history).await.unwrap();

    let mut sink = Vec::new();
    let reply = stream_reply(fragments, &mut sink).await.unwrap();

    assert_eq!(reply, expected_reply("llama3", "how are you today"));
    assert_eq!(String::from_utf8(sink).unwrap(), reply);

    let requests = fake.chat_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        json!({
            "model": "llama3",
            "messages": [
                {"role": "user", "content": "hello there"},
                {"role": "assistant", "content": "hi"},
                {"role": "user", "content": "how are you today"}
            ],
            "stream": true
        })
    );
}

#[tokio::test]
async fn unknown_model_is_an_api_error() {
    let base_url = FakeOllama::new(&["llama3"]).start().await;
    let backend = OllamaBackend::new(base_url).unwrap();

    let result = backend
        .chat_stream("ghost", &[ChatMessage::user("hi")])
        .await;

    match result {
        Err(LmiError::ApiError(message)) => {
            assert!(message.contains("404"), "{}", message);
            assert!(message.contains("model 'ghost' not found"), "{}", message);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn unreachable_server_is_reported_as_not_running() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = OllamaBackend::new(format!("http://{}", addr)).unwrap();

    assert!(!backend.is_running().await);
    assert!(matches!(
        backend.list_models().await,
        Err(LmiError::BackendNotRunning(url)) if url == format!("http://{}", addr)
    ));
}
