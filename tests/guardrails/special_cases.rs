use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use turngate::audit::MemoryAuditSink;
use turngate::config::GuardrailsConfig;
use turngate::guardrails::{SpecialCaseKind, TriggerSource};
use turngate::router::RouteSource;
use turngate::{GuardrailsCoordinator, Intent, ReasoningGuardrailsPipeline, RouterOutput};

use crate::mock_chat::ScriptedChat;

fn coordinator() -> (GuardrailsCoordinator, Arc<ScriptedChat>, Arc<MemoryAuditSink>) {
    let chat = Arc::new(ScriptedChat::failing());
    let audit = Arc::new(MemoryAuditSink::new());
    let pipeline = ReasoningGuardrailsPipeline::new(
        Some(chat.clone()),
        GuardrailsConfig::default(),
        audit.clone(),
    );
    (GuardrailsCoordinator::new(pipeline), chat, audit)
}

fn chat_route() -> RouterOutput {
    RouterOutput::new(Intent::ChatOnly, 0.5, RouteSource::Fallback)
}

#[tokio::test]
async fn mass_comparison_is_solved_without_the_model() {
    let (coordinator, chat, audit) = coordinator();
    let result = coordinator
        .try_answer(
            "Which weighs more: 2 pounds or 900 grams?",
            &chat_route(),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.answer, "2 pounds weighs more.");
    assert_eq!(result.source, TriggerSource::SpecialCase(SpecialCaseKind::MassComparison));
    assert_eq!(result.source.to_string(), "special_case:mass_comparison");
    assert_eq!(result.round_trips, 0);
    assert_eq!(result.rationale.len(), 3);
    assert!(result.rationale[1].contains("907.18 g"));
    assert_eq!(chat.calls(), 0);
    assert_eq!(audit.actions(), vec!["guardrails.special_case"]);
}

#[tokio::test]
async fn overlapping_meetings_are_detected() {
    let (coordinator, chat, _) = coordinator();
    let result = coordinator
        .try_answer(
            "I have a meeting from 2-3pm and another from 2:30-4pm, can I attend both in full?",
            &chat_route(),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        result.answer,
        "No, you cannot attend both in full. The meetings overlap from 2:30 to 3:00."
    );
    assert_eq!(result.source, TriggerSource::SpecialCase(SpecialCaseKind::MeetingOverlap));
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn remaining_solvers_answer_through_the_gate() {
    let (coordinator, _, _) = coordinator();
    let cancel = CancellationToken::new();
    let cases = [
        (
            "The report has already been written. How long will it take to write it?",
            SpecialCaseKind::CompletedTask,
            "Zero time.",
        ),
        (
            "Brothers and sisters I have none, but that man's father is my father's son. Who is in the photograph?",
            SpecialCaseKind::FamilyPhoto,
            "The man in the photograph is the speaker's son.",
        ),
    ];
    for (text, kind, answer) in cases {
        let result = coordinator
            .try_answer(text, &chat_route(), &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.source, TriggerSource::SpecialCase(kind));
        assert_eq!(result.answer, answer);
    }
}

#[tokio::test]
async fn tool_committed_routes_bypass_solvers() {
    let (coordinator, _, audit) = coordinator();
    let route = RouterOutput::new(Intent::FileTask, 0.9, RouteSource::Heuristic);
    let result = coordinator
        .try_answer(
            "Which weighs more: 2 pounds or 900 grams?",
            &route,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(audit.events().is_empty());
}
