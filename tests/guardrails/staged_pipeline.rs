use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use turngate::audit::MemoryAuditSink;
use turngate::config::{GuardrailsConfig, GuardrailsMode};
use turngate::guardrails::TriggerSource;
use turngate::{Cancelled, ReasoningGuardrailsPipeline};

use crate::mock_chat::{ScriptedChat, Step};

const CAR_WASH: &str = "The car wash is 50 meters away. Should I walk or drive to the car wash?";

fn pipeline(chat: &Arc<ScriptedChat>, config: GuardrailsConfig) -> (ReasoningGuardrailsPipeline, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    (
        ReasoningGuardrailsPipeline::new(Some(chat.clone()), config, audit.clone()),
        audit,
    )
}

#[tokio::test]
async fn model_answers_feed_the_evaluation() {
    let chat = Arc::new(ScriptedChat::replying(&[
        r#"{"goal": "get the car washed", "alternatives": [], "confidence": 0.9}"#,
        r#"Sure: {"constraints": ["the car must be at the car wash", "the trip is short"]}"#,
    ]));
    let (pipeline, audit) = pipeline(&chat, GuardrailsConfig::default());

    let result = pipeline
        .run(CAR_WASH, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        result.answer,
        "Drive to the car wash. \"walk to the car wash\" is missing a prerequisite: the car."
    );
    assert_eq!(result.round_trips, 2);
    assert_eq!(
        result.rationale[1],
        "Constraint: the car must be at the car wash"
    );
    assert!(result.rationale[2].starts_with("Decision: drive to the car wash"));

    let requests = chat.requests();
    assert_eq!(requests[0].max_tokens, Some(256));
    assert_eq!(requests[0].temperature, Some(0.0));
    assert!(!audit.actions().iter().any(|a| a == "guardrails.stage_fallback"));
}

#[tokio::test]
async fn tiny_model_can_decline() {
    let chat = Arc::new(ScriptedChat::replying(&[
        r#"{"risk": "low", "why": "plain preference question", "suggest_guardrails": false}"#,
    ]));
    let (pipeline, audit) = pipeline(&chat, GuardrailsConfig::default());

    let result = pipeline
        .run("Is it better to learn Rust or Go first?", &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_none());

    let trigger = &audit.events()[0];
    assert_eq!(trigger.action, "trigger");
    assert_eq!(trigger.result, "skipped");
    assert_eq!(trigger.detail["source"], "tiny_model");
    assert_eq!(trigger.detail["round_trips"], "1");
}

#[tokio::test]
async fn tiny_model_check_can_be_disabled() {
    let chat = Arc::new(ScriptedChat::failing());
    let config = GuardrailsConfig {
        tiny_model_trigger: false,
        ..GuardrailsConfig::default()
    };
    let (pipeline, _) = pipeline(&chat, config);
    let result = pipeline
        .run("Is it better to learn Rust or Go first?", &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn always_mode_triggers_at_high_risk() {
    let chat = Arc::new(ScriptedChat::failing());
    let config = GuardrailsConfig {
        mode: GuardrailsMode::Always,
        ..GuardrailsConfig::default()
    };
    let (pipeline, _) = pipeline(&chat, config);
    let result = pipeline
        .run(CAR_WASH, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.source, TriggerSource::ModeAlways);
    assert_eq!(result.risk.to_string(), "high");
}

#[tokio::test(start_paused = true)]
async fn caller_cancellation_escapes_the_pipeline() {
    let chat = Arc::new(ScriptedChat::new(vec![Step::Hang]));
    let (pipeline, audit) = pipeline(&chat, GuardrailsConfig::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = pipeline.run(CAR_WASH, &cancel).await;
    assert_eq!(result, Err(Cancelled));
    assert!(!audit.actions().iter().any(|a| a == "guardrails.decision"));
}
