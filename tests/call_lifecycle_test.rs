//! Normalization, observer ordering, tag isolation and stream correlation.

#[path = "support/fake_provider.rs"]
mod fake_provider;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fake_provider::{CountingPostObserver, FakeProvider, RecordingObserver, Seen, proxy_for};
use futures::StreamExt;
use serde_json::json;
use siumai_proxy::prelude::*;
use uuid::Uuid;

fn chat_input(text: &str) -> ChatInput {
    ChatInput::new(vec![ChatMessage::user(text)])
}

#[tokio::test]
async fn single_argument_is_the_model_id() {
    let provider = FakeProvider::shared();
    let log = Arc::new(Mutex::new(Vec::new()));
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(RecordingObserver::new("only", log.clone()))
        .build()
        .create(provider.clone());

    proxy.call("chat", vec!["m1".into()]).await.unwrap();

    let seen = log.lock().unwrap();
    assert!(seen[0].input_absent);
    assert_eq!(seen[0].tags, vec!["chat"]);

    let request = provider.last_request();
    assert_eq!(request.model_id, "m1");
    assert_eq!(request.tags, vec!["chat"]);
    assert_eq!(request.input, json!({ "messages": [], "streamed_output": false }));
}

#[tokio::test]
async fn tags_do_not_leak_between_sequential_calls() {
    let provider = FakeProvider::shared();
    let proxy = proxy_for(provider.clone());

    proxy.chat(chat_input("one"), "m1", &["x"]).await.unwrap();
    assert_eq!(provider.last_request().tags, vec!["chat", "x"]);

    proxy.chat(chat_input("two"), "m1", &[]).await.unwrap();
    assert_eq!(provider.last_request().tags, vec!["chat"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_keep_their_own_tags() {
    let provider = Arc::new(FakeProvider::new().with_delay(Duration::from_millis(20)));
    let proxy = Arc::new(proxy_for(provider.clone()));

    let a = {
        let proxy = proxy.clone();
        tokio::spawn(async move { proxy.chat(chat_input("a"), "model-a", &["a"]).await })
    };
    let b = {
        let proxy = proxy.clone();
        tokio::spawn(async move { proxy.chat(chat_input("b"), "model-b", &["b"]).await })
    };
    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.unwrap().unwrap().text(), Some("echo: a"));
    assert_eq!(b.unwrap().unwrap().text(), Some("echo: b"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        match request.model_id.as_str() {
            "model-a" => assert_eq!(request.tags, vec!["chat", "a"]),
            "model-b" => assert_eq!(request.tags, vec!["chat", "b"]),
            other => panic!("unexpected model {other}"),
        }
    }
}

#[tokio::test]
async fn pre_observers_run_once_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(RecordingObserver::new("first", log.clone()))
        .with_pre_call_observer(RecordingObserver::new("second", log.clone()))
        .build()
        .create(FakeProvider::shared());

    proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap();

    let seen: Vec<Seen> = log.lock().unwrap().clone();
    let labels: Vec<&str> = seen.iter().map(|s| s.label).collect();
    assert_eq!(labels, vec!["first", "second"]);
    assert_eq!(seen[0].request_thread_id, seen[1].request_thread_id);
}

#[tokio::test]
async fn each_call_gets_a_fresh_correlation_id() {
    let provider = FakeProvider::shared();
    let proxy = proxy_for(provider.clone());
    proxy.chat(chat_input("1"), "m1", &[]).await.unwrap();
    proxy.chat(chat_input("2"), "m1", &[]).await.unwrap();

    let ids: Vec<Uuid> = provider.requests().iter().map(|r| r.request_thread_id).collect();
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn post_observers_never_run_after_a_failure() {
    let provider = FakeProvider::shared();
    provider.fail_with(|| ProviderError::Response("garbled".into()));
    let log = Arc::new(Mutex::new(Vec::new()));
    let post = Arc::new(CountingPostObserver::default());
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(RecordingObserver::new("pre", log.clone()))
        .with_post_call_observer(post.clone())
        .build()
        .create(provider.clone());

    let err = proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ResponseError);
    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(post.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn post_observers_may_replace_the_output() {
    struct Redact;

    #[async_trait]
    impl PostCallObserver for Redact {
        async fn on_post_call(&self, ctx: &CallContext, output: OperationOutput) -> OperationOutput {
            assert_eq!(ctx.metadata().get("reviewed"), Some(&json!(true)));
            match output {
                OperationOutput::Chat(_) => ChatOutput::message(
                    ChatMessage::assistant("[redacted]"),
                    serde_json::Value::Null,
                )
                .into(),
                other => other,
            }
        }
    }

    struct Review;

    #[async_trait]
    impl PreCallObserver for Review {
        async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError> {
            ctx.set_metadata("reviewed", json!(true));
            Ok(())
        }
    }

    let post = Arc::new(CountingPostObserver::default());
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(Arc::new(Review))
        .with_post_call_observer(post.clone())
        .with_post_call_observer(Arc::new(Redact))
        .build()
        .create(FakeProvider::shared());

    let out = proxy.chat(chat_input("secret"), "m1", &[]).await.unwrap();
    assert_eq!(out.text(), Some("[redacted]"));
    assert_eq!(post.calls.load(Ordering::SeqCst), 1);
}

struct Rewrite;

#[async_trait]
impl PreCallObserver for Rewrite {
    async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError> {
        ctx.configuration_mut().insert("temperature".into(), json!(0.1));
        ctx.set_input(Some(ChatInput::new(vec![ChatMessage::user("rewritten")]).into()));
        if ctx.tags().iter().any(|t| t == "login") {
            ctx.set_authentication(Authentication::api_key("sk-observer"));
            ctx.remove_tag("login");
            ctx.add_tag("authenticated");
        }
        Ok(())
    }
}

#[tokio::test]
async fn pre_observers_rewrite_configuration_input_and_authentication() {
    let provider = FakeProvider::shared();
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(Arc::new(Rewrite))
        .build()
        .create(provider.clone());

    let out = proxy.chat(chat_input("original"), "m1", &["login"]).await.unwrap();
    assert_eq!(out.text(), Some("echo: rewritten"));

    let request = provider.last_request();
    assert_eq!(request.configuration.get("temperature"), Some(&json!(0.1)));
    assert_eq!(request.configuration.get("max_tokens"), Some(&json!(256)));
    assert_eq!(request.secret.as_deref(), Some("sk-observer"));
    assert_eq!(request.tags, vec!["chat", "authenticated"]);
    assert_eq!(
        proxy.authentication().as_ref().and_then(|a| a.secret()),
        Some("sk-observer")
    );

    // Installed credentials carry over to later calls.
    proxy.chat(chat_input("again"), "m1", &[]).await.unwrap();
    assert_eq!(provider.last_request().secret.as_deref(), Some("sk-observer"));
    assert_eq!(provider.last_request().tags, vec!["chat"]);
}

#[tokio::test]
async fn duplicate_tags_reach_the_provider() {
    let provider = FakeProvider::shared();
    let proxy = proxy_for(provider.clone());
    proxy.chat(chat_input("hi"), "m1", &["x", "x"]).await.unwrap();
    assert_eq!(provider.last_request().tags, vec!["chat", "x", "x"]);
}

#[tokio::test]
async fn base_configuration_overrides_provider_defaults() {
    let provider = FakeProvider::shared();
    let log = Arc::new(Mutex::new(Vec::new()));
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(RecordingObserver::new("pre", log.clone()))
        .build()
        .create(provider.clone());

    let mut base = ConfigMap::new();
    base.insert("temperature".into(), json!(0.7));
    proxy.set_configuration(base);
    proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap();

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].configuration.get("temperature"), Some(&json!(0.7)));
    assert_eq!(seen[0].configuration.get("max_tokens"), Some(&json!(256)));
    assert_eq!(seen[0].configuration.get("stop"), None);
}

#[tokio::test]
async fn forced_output_skips_the_provider() {
    struct Canned;

    #[async_trait]
    impl PreCallObserver for Canned {
        async fn on_pre_call(&self, ctx: &mut CallContext) -> Result<(), ProxyError> {
            ctx.force_output(
                ChatOutput::message(ChatMessage::assistant("cached"), serde_json::Value::Null).into(),
            );
            Ok(())
        }
    }

    let provider = FakeProvider::shared();
    let log = Arc::new(Mutex::new(Vec::new()));
    let post = Arc::new(CountingPostObserver::default());
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(Arc::new(Canned))
        .with_pre_call_observer(RecordingObserver::new("after", log.clone()))
        .with_post_call_observer(post.clone())
        .build()
        .create(provider.clone());

    let out = proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap();
    assert_eq!(out.text(), Some("cached"));
    assert!(provider.requests().is_empty());
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(post.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pre_observer_errors_abort_the_call() {
    struct Budget;

    #[async_trait]
    impl PreCallObserver for Budget {
        async fn on_pre_call(&self, _ctx: &mut CallContext) -> Result<(), ProxyError> {
            Err(ProxyError::QuotaExceeded("monthly budget spent".into()))
        }
    }

    let provider = FakeProvider::shared();
    let post = Arc::new(CountingPostObserver::default());
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(Arc::new(Budget))
        .with_post_call_observer(post.clone())
        .build()
        .create(provider.clone());

    let err = proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(provider.requests().is_empty());
    assert_eq!(post.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn parent_id_reaches_every_context() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let proxy = ProxyFactory::builder()
        .with_pre_call_observer(RecordingObserver::new("pre", log.clone()))
        .build()
        .create(FakeProvider::shared());

    let parent = Uuid::new_v4();
    proxy.set_request_parent_id(Some(parent));
    proxy.chat(chat_input("hi"), "m1", &[]).await.unwrap();
    proxy.embeddings(EmbeddingsInput::new("hi"), "e1", &[]).await.unwrap();

    let seen = log.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|s| s.request_parent_id == Some(parent)));
}

#[tokio::test]
async fn streamed_output_carries_the_correlation_id() {
    let provider = FakeProvider::shared();
    let proxy = proxy_for(provider.clone());

    let out = proxy
        .chat(chat_input("one two three").with_streamed_output(true), "m1", &["s"])
        .await
        .unwrap();
    let ChatNormalized::Stream(stream) = out.normalized else {
        panic!("expected a stream");
    };

    let metadata = stream.metadata().clone();
    assert_eq!(metadata.request_thread_id, Some(provider.last_request().request_thread_id));
    assert_eq!(metadata.provider_id.as_deref(), Some("fake"));
    assert_eq!(metadata.model_id.as_deref(), Some("m1"));
    assert_eq!(metadata.tags, vec!["chat", "s"]);
    assert!(metadata.input.is_some());

    let words: Vec<String> = stream.map(|chunk| chunk.unwrap().text).collect().await;
    assert_eq!(words, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn typed_wrappers_cover_each_capability() {
    let proxy = proxy_for(FakeProvider::shared());

    let embedded = proxy
        .embeddings(EmbeddingsInput::new("four"), "e1", &[])
        .await
        .unwrap();
    assert_eq!(embedded.normalized, vec![4.0, 1.0]);

    let moderated = proxy
        .moderation(ModerationInput { prompt: "forbidden words".into() }, "mod", &[])
        .await
        .unwrap();
    assert!(moderated.normalized.flagged);
}

#[tokio::test]
async fn malformed_calls_are_bad_requests() {
    let provider = FakeProvider::shared();
    let proxy = proxy_for(provider.clone());

    let err = proxy.call("chat", vec![]).await.unwrap_err();
    assert_eq!(err, ProxyError::BadRequest("Model ID is missing in your request.".into()));

    let err = proxy.chat(chat_input("hi"), "", &[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::BadRequest);

    let err = proxy
        .call("moderation", vec![chat_input("hi").into(), "m".into()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::BadRequest);

    // Argument errors never reach the provider.
    assert!(provider.requests().is_empty());
}
