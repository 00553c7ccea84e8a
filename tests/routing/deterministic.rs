use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use turngate::config::RouterConfig;
use turngate::router::{FollowUp, MemoryWriteKind, RouteSource, RouterContext};
use turngate::{Intent, IntentRouter};

use crate::mock_chat::ScriptedChat;

fn router_with(chat: &Arc<ScriptedChat>) -> IntentRouter {
    IntentRouter::new(RouterConfig::default()).with_llm(chat.clone())
}

#[tokio::test]
async fn command_prefix_never_calls_the_model() {
    let chat = Arc::new(ScriptedChat::replying(&["chat"]));
    let router = router_with(&chat);
    let cancel = CancellationToken::new();

    let out = router
        .route("/search latest rust release", &RouterContext::default(), &cancel)
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::WebSearch);
    assert!((out.confidence - 1.0).abs() < f64::EPSILON);
    assert_eq!(out.source, RouteSource::FastPath);
    assert!(out.needs.web);

    let out = router
        .route("/forget my address", &RouterContext::default(), &cancel)
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::MemoryWrite);
    assert_eq!(out.memory_write, Some(MemoryWriteKind::Revoke));

    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn keyword_rules_cover_the_tool_intents() {
    let chat = Arc::new(ScriptedChat::failing());
    let router = router_with(&chat);
    let cancel = CancellationToken::new();
    let ctx = RouterContext::default();

    let cases = [
        ("What time is it?", Intent::TimeQuery),
        ("What's on my screen right now?", Intent::ScreenObserve),
        ("read notes/todo.md and summarize it", Intent::FileTask),
        ("run git status please", Intent::SystemTask),
        ("open https://example.com/docs", Intent::BrowseOnce),
        ("Remember that I like green tea", Intent::MemoryWrite),
        ("What do you remember about my job?", Intent::MemoryRead),
        ("Who is Ada Lovelace?", Intent::WebSearch),
    ];
    for (text, intent) in cases {
        let out = router.route(text, &ctx, &cancel).await.unwrap();
        assert_eq!(out.intent, intent, "{text}");
        assert_eq!(out.source, RouteSource::Heuristic, "{text}");
    }
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn follow_ups_stay_in_chat() {
    let router = IntentRouter::new(RouterConfig::default());
    let ctx = RouterContext {
        has_recent_search_results: true,
        has_recent_rationale: true,
    };
    let out = router
        .route("are you sure?", &ctx, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(out.intent, Intent::ChatOnly);
    assert_eq!(out.follow_up, Some(FollowUp::Rationale));

    let out = router
        .route("tell me more about the first one", &ctx, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(out.follow_up, Some(FollowUp::SearchResults));
}

#[tokio::test]
async fn new_requests_ignore_follow_up_context() {
    let router = IntentRouter::new(RouterConfig::default());
    let cancel = CancellationToken::new();
    let ctx = RouterContext {
        has_recent_search_results: true,
        has_recent_rationale: true,
    };
    let cases = [
        ("what about the weather tomorrow?", Intent::WebSearch),
        ("Why did the stock market crash today?", Intent::WebSearch),
        ("explain how to run git status in the terminal", Intent::SystemTask),
    ];
    for (text, intent) in cases {
        let out = router.route(text, &ctx, &cancel).await.unwrap();
        assert_eq!(out.intent, intent, "{text}");
        assert_eq!(out.follow_up, None, "{text}");
        let fresh = router.route(text, &RouterContext::default(), &cancel).await.unwrap();
        assert_eq!(out.intent, fresh.intent, "{text}");
    }
}
