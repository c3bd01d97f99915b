// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reportline_app::{
    ActionName, ChatType, MessageFragment, Report, ReportAction, ReportActionId, ReportId,
    SMS_DOMAIN_SUFFIX,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::macros::datetime;

const FIXTURE_NOW: OffsetDateTime = datetime!(2026-02-19 12:34:56 UTC);
const HOUR_MS: i64 = 60 * 60 * 1000;

const FIRST_NAMES: [&str; 16] = [
    "avery", "jordan", "taylor", "riley", "morgan", "casey", "alex", "quinn", "parker", "drew",
    "kai", "elliot", "robin", "cameron", "hayden", "rowan",
];
const DOMAINS: [&str; 5] = [
    "example.com",
    "example.org",
    "acme.test",
    "travel.test",
    "books.test",
];
const ROOM_NAMES: [&str; 6] = [
    "#admins",
    "#announce",
    "#travel",
    "#receipts",
    "#q3-offsite",
    "#finance",
];
const POLICY_NAMES: [&str; 4] = ["Acme Travel", "Field Ops", "Contractors", "Books Club"];
const COMMENTS: [&str; 6] = [
    "Uploaded the hotel folio",
    "Can you approve this one?",
    "Mileage is on the second page",
    "Thanks!",
    "Splitting dinner with the team",
    "Resubmitted with the right category",
];
const CHAT_TYPES: [Option<ChatType>; 4] = [
    None,
    Some(ChatType::PolicyRoom),
    Some(ChatType::PolicyExpenseChat),
    Some(ChatType::PolicyAnnounce),
];
const OTHER_ACTIONS: [ActionName; 4] = [
    ActionName::Created,
    ActionName::Iou,
    ActionName::Renamed,
    ActionName::ReportPreview,
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for chat fixtures; equal seeds give equal sequences.
#[derive(Debug, Clone)]
pub struct ReportFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl ReportFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1000 + normalized % 1000,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn login(&mut self) -> String {
        let name = self.pick(&FIRST_NAMES);
        let domain = self.pick(&DOMAINS);
        format!("{name}@{domain}")
    }

    pub fn sms_login(&mut self) -> String {
        let line = 1000 + self.rng.int_n(9000);
        format!("+1500555{line:04}{SMS_DOMAIN_SUFFIX}")
    }

    /// Report visited within the 30 days before the fixture clock, or never.
    pub fn report(&mut self) -> Report {
        let id = self.next_id();
        let chat_type = self.pick(&CHAT_TYPES);
        let visited = if self.rng.int_n(5) == 0 {
            None
        } else {
            let hours_ago = self.rng.int_n(24 * 30) as i64;
            Some(fixture_timestamp() - hours_ago * HOUR_MS)
        };
        Report {
            report_id: Some(ReportId::from(id.to_string())),
            last_visited_timestamp: visited,
            report_name: chat_type
                .filter(|kind| kind.is_chat_room())
                .map(|_| self.pick(&ROOM_NAMES).to_owned()),
            policy_name: chat_type.map(|_| self.pick(&POLICY_NAMES).to_owned()),
            chat_type,
            owner_account_id: None,
            participant_account_ids: Vec::new(),
        }
    }

    pub fn reports(&mut self, count: usize) -> Vec<Report> {
        (0..count).map(|_| self.report()).collect()
    }

    pub fn comment_by(&mut self, actor: &str) -> ReportAction {
        let id = self.next_id();
        let text = self.pick(&COMMENTS);
        comment(actor, &id.to_string(), text)
    }

    /// Any action kind, persisted or pending, by one of `actors`. With no
    /// actors the action has no author.
    pub fn action(&mut self, actors: &[&str]) -> ReportAction {
        let actor = actors.get(self.rng.int_n(actors.len())).copied();
        let mut action = if self.rng.bool() {
            self.comment_by(actor.unwrap_or_default())
        } else {
            let kind = self.pick(&OTHER_ACTIONS);
            let mut other = self.comment_by(actor.unwrap_or_default());
            other.action_name = kind;
            other
        };
        if actor.is_none() {
            action.actor_email = None;
        }
        if self.rng.int_n(4) == 0 {
            action.report_action_id = None;
        }
        action
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1 + self.rng.int_n(17) as u64;
        self.next_id
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.rng.int_n(values.len())]
    }
}

/// Epoch milliseconds of the fixed fixture clock, 2026-02-19 12:34:56 UTC.
pub fn fixture_timestamp() -> i64 {
    FIXTURE_NOW.unix_timestamp() * 1000
}

pub fn report(id: &str, last_visited: Option<i64>) -> Report {
    Report {
        report_id: Some(ReportId::new(id)),
        last_visited_timestamp: last_visited,
        ..Report::default()
    }
}

pub fn comment(actor: &str, action_id: &str, text: &str) -> ReportAction {
    ReportAction {
        actor_email: Some(actor.to_owned()),
        report_action_id: Some(ReportActionId::new(action_id)),
        action_name: ActionName::AddComment,
        message: vec![MessageFragment {
            kind: "COMMENT".to_owned(),
            text: Some(text.to_owned()),
            html: Some(text.to_owned()),
        }],
    }
}

pub fn session_value(email: &str) -> Value {
    json!({ "email": email, "accountID": 1 })
}

pub fn temp_file(name: &str, content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join(name);
    std::fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}
