use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use turngate::audit::MemoryAuditSink;
use turngate::guardrails::TriggerSource;
use turngate::{Capability, Config, Intent, RouterContext, TurnPlanner};

use crate::mock_chat::ScriptedChat;

fn planner(chat: &Arc<ScriptedChat>) -> (TurnPlanner, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    (
        TurnPlanner::from_config(&Config::default(), Some(chat.clone()), audit.clone()),
        audit,
    )
}

#[tokio::test]
async fn chat_only_turn_grants_nothing() {
    let chat = Arc::new(ScriptedChat::replying(&["chat"]));
    let (planner, audit) = planner(&chat);
    let plan = planner
        .plan("Write me a haiku about autumn", &RouterContext::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plan.route.intent, Intent::ChatOnly);
    assert!(plan.policy.allowed_capabilities.is_empty());
    assert!(!plan.policy.use_tool_loop);
    assert!(!plan.enters_tool_loop());

    let decision = &audit.events()[0];
    assert_eq!(decision.actor, "policy");
    assert_eq!(decision.detail["intent"], "chat_only");
    assert_eq!(decision.detail["turn_id"], plan.turn_id.to_string());
}

#[tokio::test]
async fn system_route_grants_only_system_execute() {
    let chat = Arc::new(ScriptedChat::failing());
    let (planner, _) = planner(&chat);
    let plan = planner
        .plan("run git status please", &RouterContext::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(plan.route.intent, Intent::SystemTask);
    assert!(plan.policy.effective_capabilities().contains(&Capability::SystemExecute));
    assert!(!plan.policy.effective_capabilities().contains(&Capability::WebSearch));
    assert!(plan.guardrails.is_none());
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn degraded_model_still_yields_a_guardrails_answer() {
    let chat = Arc::new(ScriptedChat::failing());
    let (planner, _) = planner(&chat);
    let plan = planner
        .plan(
            "The car wash is 50 meters away. Should I walk or drive to the car wash?",
            &RouterContext::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let answer = plan.guardrails.as_ref().unwrap();
    assert!(answer.answer.starts_with("Drive to the car wash."));
    assert_eq!(answer.round_trips, 0);
    assert_eq!(answer.source, TriggerSource::Heuristic);
    assert!(!plan.enters_tool_loop());
}

#[tokio::test]
async fn cancelled_before_start() {
    let chat = Arc::new(ScriptedChat::replying(&["chat"]));
    let (planner, audit) = planner(&chat);
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(planner
        .plan("hello", &RouterContext::default(), &cancel)
        .await
        .is_err());
    assert_eq!(chat.calls(), 0);
    assert!(audit.events().is_empty());
}
