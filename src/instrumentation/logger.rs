use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Manual,
    Upload,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    FileError,
    ParseError,
    SchemaError,
    RemoteError,
    Rejected,
}

/// One user action within a session. Kept in memory only.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionLog {
    pub session_id: String,
    pub timestamp: String,
    pub kind: InteractionKind,
    pub outcome: Outcome,
    pub latency_ms: u64,
}

impl InteractionLog {
    pub fn new(session_id: &str, kind: InteractionKind, outcome: Outcome, latency_ms: u64) -> Self {
        Self {
            session_id: session_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            outcome,
            latency_ms,
        }
    }

    /// Emit as a structured `info` event.
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(
            session = %self.session_id,
            kind = ?self.kind,
            outcome = ?self.outcome,
            latency_ms = self.latency_ms,
            record = %json,
            "interaction"
        );
    }
}

/// Summary line for a set of interactions.
pub fn summary(logs: &[InteractionLog]) -> String {
    let count = |kind: InteractionKind| logs.iter().filter(|l| l.kind == kind).count();
    let failures = logs.iter().filter(|l| l.outcome != Outcome::Ok).count();
    let total_latency: u64 = logs.iter().map(|l| l.latency_ms).sum();

    format!(
        "Interactions: {} (manual: {}, upload: {}, ask: {}) | Failures: {} | Total latency: {:.1}s",
        logs.len(),
        count(InteractionKind::Manual),
        count(InteractionKind::Upload),
        count(InteractionKind::Ask),
        failures,
        total_latency as f64 / 1000.0,
    )
}
