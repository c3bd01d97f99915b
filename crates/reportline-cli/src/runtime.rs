// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reportline_app::{
    Report, ReportAction, SessionIdentity, find_most_recent_report, format_participant_title,
};
use reportline_store::{ConnectionId, Store, keys};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

const SNAPSHOT_REPORT: &str = "snapshot";

/// Snapshot contents loaded into a live store with the session wired to an
/// identity, the same way a client keeps its signed-in user current.
pub struct SnapshotRuntime {
    store: Store,
    identity: SessionIdentity,
    session_connection: ConnectionId,
    participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionVerdict {
    pub action: ReportAction,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub signed_in_as: Option<String>,
    pub participant_title: String,
    pub most_recent: Option<Report>,
    pub actions: Vec<ActionVerdict>,
}

impl SnapshotRuntime {
    pub fn new() -> Self {
        let store = Store::new();
        let identity = SessionIdentity::new();
        let session_connection = store.connect_session(&identity);
        Self {
            store,
            identity,
            session_connection,
            participants: Vec::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read snapshot {}", path.display()))?;
        let snapshot: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parse JSON snapshot {}", path.display()))?;
        self.load(&snapshot)
            .with_context(|| format!("load snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot loaded");
        Ok(())
    }

    pub fn load(&mut self, snapshot: &Value) -> Result<()> {
        let Value::Object(fields) = snapshot else {
            bail!(
                "snapshot must be a JSON object with `session`, `reports`, `reportActions` and `participants`"
            );
        };

        if let Some(session) = fields.get("session") {
            self.store.set(keys::SESSION, session.clone());
        }

        match fields.get("reports") {
            None | Some(Value::Null) => {}
            Some(Value::Array(reports)) => {
                // Keyed by position so repeated ids keep every entry in order.
                for (index, report) in reports.iter().enumerate() {
                    self.store
                        .set(&keys::report(&index.to_string()), report.clone());
                }
            }
            Some(Value::Object(reports)) => {
                for (key, report) in reports {
                    let key = if key.starts_with(keys::COLLECTION_REPORT) {
                        key.clone()
                    } else {
                        keys::report(key)
                    };
                    self.store.set(&key, report.clone());
                }
            }
            Some(other) => bail!(
                "snapshot `reports` must be an array or an object keyed by report, got {}",
                json_kind(other)
            ),
        }

        if let Some(actions) = fields.get("reportActions") {
            self.store
                .set(&keys::report_actions(SNAPSHOT_REPORT), actions.clone());
        }

        if let Some(participants) = fields.get("participants") {
            self.participants = serde_json::from_value(participants.clone())
                .context("snapshot `participants` must be an array of login strings")?;
        }

        debug!(keys = self.store.keys().len(), "snapshot stored");
        Ok(())
    }

    pub fn evaluate(&self) -> Result<Evaluation> {
        let reports = self.store.reports();
        let actions = self.store.report_actions(SNAPSHOT_REPORT)?;
        let most_recent = find_most_recent_report(&reports).cloned();
        debug!(
            candidates = reports.len(),
            selected = most_recent.is_some(),
            "most recent report evaluated"
        );

        Ok(Evaluation {
            signed_in_as: self.identity.email(),
            participant_title: format_participant_title(&self.participants),
            most_recent,
            actions: actions
                .into_iter()
                .map(|action| ActionVerdict {
                    editable: self.identity.can_edit(&action),
                    action,
                })
                .collect(),
        })
    }
}

impl Default for SnapshotRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SnapshotRuntime {
    fn drop(&mut self) {
        self.store.disconnect(self.session_connection);
    }
}

impl Evaluation {
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        let session = self.signed_in_as.as_deref().unwrap_or("(signed out)");
        writeln!(out, "session: {session}")?;
        writeln!(out, "participants: {}", self.participant_title)?;

        match &self.most_recent {
            None => writeln!(out, "most recent report: none")?,
            Some(report) => {
                let id = report
                    .report_id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let visited = match report.last_visited_at() {
                    Some(at) => at
                        .format(&Rfc3339)
                        .with_context(|| format!("format last visit of report {id}"))?,
                    None => "never".to_owned(),
                };
                writeln!(out, "most recent report: {id} (last visited {visited})")?;
            }
        }

        for verdict in &self.actions {
            let id = verdict
                .action
                .report_action_id
                .as_ref()
                .map_or_else(|| "(pending)".to_owned(), ToString::to_string);
            let status = if verdict.editable {
                "editable"
            } else {
                "not editable"
            };
            writeln!(
                out,
                "action {id} {}: {status}",
                verdict.action.action_name.as_str()
            )?;
        }
        Ok(out)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotRuntime;
    use anyhow::Result;
    use reportline_store::keys;
    use reportline_testkit::{fixture_timestamp, session_value};
    use serde_json::json;

    fn snapshot() -> serde_json::Value {
        json!({
            "session": session_value("me@example.com"),
            "reports": [
                {"reportID": "1", "lastVisitedTimestamp": 5},
                {"reportID": "2", "lastVisitedTimestamp": fixture_timestamp()},
                {"reportID": "3"},
                null
            ],
            "reportActions": [
                {"reportActionID": "10", "actorEmail": "me@example.com", "actionName": "ADDCOMMENT",
                 "message": [{"type": "COMMENT", "text": "taxi to the airport"}]},
                {"reportActionID": "11", "actorEmail": "me@example.com", "actionName": "ADDCOMMENT",
                 "message": [{"type": "COMMENT", "text": "[Attachment]"}]},
                {"actorEmail": "me@example.com", "actionName": "ADDCOMMENT",
                 "message": [{"type": "COMMENT", "text": "sending..."}]},
                {"reportActionID": "12", "actorEmail": "you@example.com", "actionName": "ADDCOMMENT"}
            ],
            "participants": ["+15005550006@expensify.sms", "you@example.com"]
        })
    }

    #[test]
    fn evaluation_combines_every_helper() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        runtime.load(&snapshot())?;
        let evaluation = runtime.evaluate()?;

        assert_eq!(evaluation.signed_in_as.as_deref(), Some("me@example.com"));
        assert_eq!(evaluation.participant_title, "+15005550006, you@example.com");
        let selected = evaluation
            .most_recent
            .as_ref()
            .and_then(|report| report.report_id.as_ref())
            .map(ToString::to_string);
        assert_eq!(selected.as_deref(), Some("2"));
        let editable: Vec<bool> = evaluation
            .actions
            .iter()
            .map(|verdict| verdict.editable)
            .collect();
        assert_eq!(editable, vec![true, false, false, false]);
        Ok(())
    }

    #[test]
    fn render_lists_session_report_and_actions() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        runtime.load(&snapshot())?;
        let rendered = runtime.evaluate()?.render()?;

        assert!(rendered.contains("session: me@example.com\n"));
        assert!(rendered.contains("most recent report: 2 (last visited 2026-02-19T12:34:56Z)"));
        assert!(rendered.contains("action 10 ADDCOMMENT: editable\n"));
        assert!(rendered.contains("action 11 ADDCOMMENT: not editable\n"));
        assert!(rendered.contains("action (pending) ADDCOMMENT: not editable\n"));
        Ok(())
    }

    #[test]
    fn signed_out_snapshot_denies_edits() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        let mut value = snapshot();
        value["session"] = json!(null);
        runtime.load(&value)?;

        let evaluation = runtime.evaluate()?;
        assert!(evaluation.signed_in_as.is_none());
        assert!(evaluation.actions.iter().all(|verdict| !verdict.editable));
        assert!(evaluation.render()?.contains("session: (signed out)"));
        Ok(())
    }

    #[test]
    fn keyed_reports_keep_their_store_keys() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        runtime.load(&json!({
            "reports": {
                "report_9": {"reportID": "9", "lastVisitedTimestamp": 1},
                "4": {"reportID": "4", "lastVisitedTimestamp": 1}
            }
        }))?;
        assert!(runtime.store().contains(&keys::report("9")));
        assert!(runtime.store().contains(&keys::report("4")));

        let evaluation = runtime.evaluate()?;
        let selected = evaluation
            .most_recent
            .as_ref()
            .and_then(|report| report.report_id.as_ref())
            .map(ToString::to_string);
        assert_eq!(selected.as_deref(), Some("4"));
        assert!(evaluation.render()?.contains("most recent report: 4"));
        Ok(())
    }

    #[test]
    fn repeated_report_ids_keep_sequence_order() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        runtime.load(&json!({
            "reports": [
                {"reportID": "1", "lastVisitedTimestamp": 10, "reportName": "first"},
                {"reportID": "2", "lastVisitedTimestamp": 10, "reportName": "second"},
                {"reportID": "1", "lastVisitedTimestamp": 10, "reportName": "third"}
            ]
        }))?;
        assert_eq!(runtime.store().collection(keys::COLLECTION_REPORT).len(), 3);

        let evaluation = runtime.evaluate()?;
        let name = evaluation
            .most_recent
            .as_ref()
            .and_then(|report| report.report_name.as_deref());
        assert_eq!(name, Some("third"));
        Ok(())
    }

    #[test]
    fn unexpected_report_shapes_do_not_block_selection() -> Result<()> {
        for (other, expected) in [
            (
                json!({"reportID": "2", "lastVisitedTimestamp": 50, "chatType": "selfDM"}),
                "2",
            ),
            (json!({"reportID": "2", "lastVisitedTimestamp": 5.5}), "1"),
            (
                json!({"reportID": {"nested": true}, "lastVisitedTimestamp": 50}),
                "1",
            ),
        ] {
            let mut runtime = SnapshotRuntime::new();
            runtime.load(&json!({
                "reports": [{"reportID": "1", "lastVisitedTimestamp": 10}, other]
            }))?;
            let evaluation = runtime.evaluate()?;
            let selected = evaluation
                .most_recent
                .as_ref()
                .and_then(|report| report.report_id.as_ref())
                .map(ToString::to_string);
            assert_eq!(selected.as_deref(), Some(expected));
        }
        Ok(())
    }

    #[test]
    fn empty_snapshot_has_no_report() -> Result<()> {
        let mut runtime = SnapshotRuntime::new();
        runtime.load(&json!({}))?;
        let rendered = runtime.evaluate()?.render()?;
        assert!(rendered.contains("most recent report: none"));
        assert!(rendered.contains("participants: \n"));
        Ok(())
    }

    #[test]
    fn non_object_snapshot_is_rejected() {
        let mut runtime = SnapshotRuntime::new();
        let error = runtime
            .load(&json!([1, 2, 3]))
            .expect_err("array snapshot should fail");
        assert!(error.to_string().contains("JSON object"));
    }

    #[test]
    fn scalar_reports_are_rejected() {
        let mut runtime = SnapshotRuntime::new();
        let error = runtime
            .load(&json!({"reports": "nope"}))
            .expect_err("string reports should fail");
        assert!(error.to_string().contains("got a string"));
    }
}
