use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use turngate::config::RouterConfig;
use turngate::router::{MemoryWriteKind, RouteSource, RouterContext};
use turngate::{Cancelled, Intent, IntentRouter};

use crate::mock_chat::{ScriptedChat, Step};

fn router_with(chat: &Arc<ScriptedChat>) -> IntentRouter {
    IntentRouter::new(RouterConfig::default()).with_llm(chat.clone())
}

#[tokio::test]
async fn one_word_label_decides_ambiguous_messages() {
    let chat = Arc::new(ScriptedChat::replying(&["Search", "tool"]));
    let router = router_with(&chat);
    let cancel = CancellationToken::new();
    let ctx = RouterContext::default();

    let out = router.route("I'd enjoy some ideas for dinner", &ctx, &cancel).await.unwrap();
    assert_eq!(out.intent, Intent::WebSearch);
    assert_eq!(out.source, RouteSource::Llm);

    let out = router.route("please take care of the thing", &ctx, &cancel).await.unwrap();
    assert_eq!(out.intent, Intent::GeneralTool);
    assert!(!out.needs.web);

    let requests = chat.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].max_tokens, Some(4));
    assert_eq!(requests[0].messages[1].content, "I'd enjoy some ideas for dinner");
}

#[tokio::test]
async fn unknown_label_reruns_relaxed_heuristics() {
    let chat = Arc::new(ScriptedChat::replying(&["banana"]));
    let router = router_with(&chat);
    let out = router
        .route(
            "I wrote a poem about weather",
            &RouterContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::WebSearch);
    assert_eq!(out.source, RouteSource::Fallback);
}

#[tokio::test]
async fn failed_call_falls_back_to_memory_then_chat() {
    let chat = Arc::new(ScriptedChat::failing());
    let router = router_with(&chat);
    let cancel = CancellationToken::new();
    let ctx = RouterContext::default();

    let out = router.route("my favorite color is teal", &ctx, &cancel).await.unwrap();
    assert_eq!(out.intent, Intent::MemoryWrite);
    assert_eq!(out.memory_write, Some(MemoryWriteKind::Store));
    assert_eq!(out.source, RouteSource::Fallback);

    let out = router.route("hello there friend", &ctx, &cancel).await.unwrap();
    assert_eq!(out.intent, Intent::ChatOnly);
    assert_eq!(out.source, RouteSource::Fallback);
    assert_eq!(chat.calls(), 2);
}

#[tokio::test]
async fn disabled_classifier_skips_the_model() {
    let chat = Arc::new(ScriptedChat::replying(&["search"]));
    let config = RouterConfig {
        llm_enabled: false,
        ..RouterConfig::default()
    };
    let router = IntentRouter::new(config).with_llm(chat.clone());
    let out = router
        .route("hello there friend", &RouterContext::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::ChatOnly);
    assert_eq!(chat.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_model_times_out_into_fallback() {
    let chat = Arc::new(ScriptedChat::new(vec![Step::Hang]));
    let router = router_with(&chat);
    let out = router
        .route("hello there friend", &RouterContext::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::ChatOnly);
    assert_eq!(out.source, RouteSource::Fallback);
}

#[tokio::test(start_paused = true)]
async fn caller_cancellation_is_not_a_timeout() {
    let chat = Arc::new(ScriptedChat::new(vec![Step::Hang]));
    let router = router_with(&chat);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = router
        .route("hello there friend", &RouterContext::default(), &cancel)
        .await;
    assert_eq!(result, Err(Cancelled));
}
