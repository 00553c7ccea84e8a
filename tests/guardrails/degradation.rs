use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use turngate::audit::MemoryAuditSink;
use turngate::config::GuardrailsConfig;
use turngate::guardrails::TriggerSource;
use turngate::ReasoningGuardrailsPipeline;

use crate::mock_chat::{ScriptedChat, Step};

const CAR_WASH: &str = "The car wash is 50 meters away. Should I walk or drive to the car wash?";

#[tokio::test]
async fn every_model_call_failing_still_answers_from_heuristics() {
    let chat = Arc::new(ScriptedChat::failing());
    let audit = Arc::new(MemoryAuditSink::new());
    let pipeline =
        ReasoningGuardrailsPipeline::new(Some(chat.clone()), GuardrailsConfig::default(), audit.clone());

    let result = pipeline
        .run(CAR_WASH, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert!(result.answer.starts_with("Drive to the car wash."));
    assert_eq!(result.round_trips, 0);
    assert_eq!(result.source, TriggerSource::Heuristic);
    assert_eq!(result.rationale[0], "Goal: get the car washed");
    assert!(!result.rationale.is_empty() && result.rationale.len() <= 3);

    // Goal inference and constraint building asked the model; extraction did not.
    assert_eq!(chat.calls(), 2);
    let fallbacks: Vec<_> = audit
        .events()
        .into_iter()
        .filter(|e| e.action == "stage_fallback")
        .map(|e| e.detail["stage"].clone())
        .collect();
    assert_eq!(fallbacks, vec!["goal_inference", "constraint_building"]);
}

#[tokio::test(start_paused = true)]
async fn stalled_stages_time_out_independently() {
    let chat = Arc::new(ScriptedChat::new(vec![Step::Hang, Step::Hang]));
    let audit = Arc::new(MemoryAuditSink::new());
    let pipeline =
        ReasoningGuardrailsPipeline::new(Some(chat.clone()), GuardrailsConfig::default(), audit.clone());

    let result = pipeline
        .run(CAR_WASH, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert!(result.answer.starts_with("Drive to the car wash."));
    assert_eq!(result.round_trips, 0);

    let kinds: Vec<_> = audit
        .events()
        .into_iter()
        .filter(|e| e.action == "stage_fallback")
        .map(|e| e.result)
        .collect();
    assert_eq!(kinds, vec!["timeout", "timeout"]);
}

#[tokio::test]
async fn malformed_json_is_a_stage_failure() {
    let chat = Arc::new(ScriptedChat::replying(&["the goal is clean car", "{\"constraints\": []}"]));
    let audit = Arc::new(MemoryAuditSink::new());
    let pipeline =
        ReasoningGuardrailsPipeline::new(Some(chat.clone()), GuardrailsConfig::default(), audit.clone());

    let result = pipeline
        .run(CAR_WASH, &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    // Both replies arrived, so both count, even though neither was usable.
    assert_eq!(result.round_trips, 2);
    assert_eq!(result.rationale[0], "Goal: get the car washed");

    let fallbacks: Vec<(String, String)> = audit
        .events()
        .into_iter()
        .filter(|e| e.action == "stage_fallback")
        .map(|e| (e.detail["stage"].clone(), e.result))
        .collect();
    assert_eq!(
        fallbacks,
        vec![
            ("goal_inference".to_string(), "malformed".to_string()),
            ("constraint_building".to_string(), "malformed".to_string()),
        ]
    );
}
