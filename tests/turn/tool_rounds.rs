use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use turngate::audit::MemoryAuditSink;
use turngate::llm::{ToolCallRequest, ToolSpec};
use turngate::policy::ConflictReason;
use turngate::{Config, RouterContext, ToolExecutor, TurnPlanner};

#[derive(Default)]
struct RecordingExecutor {
    ran: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn call_tool(
        &self,
        name: &str,
        _arguments: &Value,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<String> {
        self.ran
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
        Ok(format!("{name}: ok"))
    }
}

fn call(id: &str, name: &str) -> ToolCallRequest {
    ToolCallRequest::new(id, name, json!({}))
}

#[tokio::test]
async fn web_search_and_shell_in_one_round_keeps_the_search() {
    let audit = Arc::new(MemoryAuditSink::new());
    let planner = TurnPlanner::from_config(&Config::default(), None, audit.clone());
    let executor = Arc::new(RecordingExecutor::default());
    let round = planner.tool_round(executor.clone());

    let allowed: BTreeSet<String> = ["web_search", "shell"].iter().map(|s| (*s).to_string()).collect();
    let report = round
        .run(
            &[call("a", "web_search"), call("b", "shell")],
            &allowed,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.resolution.winners, vec![call("a", "web_search")]);
    let skipped = &report.resolution.skipped[0];
    assert_eq!(skipped.call.name, "shell");
    assert_eq!(skipped.reason, ConflictReason::LowerRisk);
    assert_eq!(skipped.reason.to_string(), "lower-risk");
    assert_eq!(executor.ran(), vec!["web_search"]);

    let skip_event = audit
        .events()
        .into_iter()
        .find(|e| e.action == "conflict_skip")
        .unwrap();
    assert_eq!(skip_event.detail["tool"], "shell");
    assert_eq!(skip_event.detail["winner"], "web_search");
}

#[tokio::test]
async fn tools_outside_the_grant_never_run() {
    let audit = Arc::new(MemoryAuditSink::new());
    let planner = TurnPlanner::from_config(&Config::default(), None, audit);
    let plan = planner
        .plan("/search rust async runtimes", &RouterContext::default(), &CancellationToken::new())
        .await
        .unwrap();
    let specs = vec![
        ToolSpec::named("web_search"),
        ToolSpec::named("shell"),
        ToolSpec::named("write_file"),
    ];
    let allowed = planner.allowed_tools(&plan, &specs);

    let executor = Arc::new(RecordingExecutor::default());
    let report = planner
        .tool_round(executor.clone())
        .run(
            &[call("1", "write_file"), call("2", "WebSearch")],
            &allowed,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(executor.ran(), vec!["WebSearch"]);
    assert_eq!(report.resolution.skipped[0].reason, ConflictReason::PolicyForbid);
    assert!(report.executed[0].ok);
    assert_eq!(report.executed[0].output, "WebSearch: ok");
}
