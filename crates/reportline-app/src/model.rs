// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use time::OffsetDateTime;
use tracing::warn;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatType {
    #[serde(rename = "policyAdmins")]
    PolicyAdmins,
    #[serde(rename = "policyAnnounce")]
    PolicyAnnounce,
    #[serde(rename = "domainAll")]
    DomainAll,
    #[serde(rename = "policyRoom")]
    PolicyRoom,
    #[serde(rename = "policyExpenseChat")]
    PolicyExpenseChat,
    /// Any chat type this crate does not model, such as direct messages.
    #[serde(other)]
    Unknown,
}

impl ChatType {
    pub const fn is_chat_room(self) -> bool {
        !matches!(self, Self::PolicyExpenseChat | Self::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionName {
    #[serde(rename = "ADDCOMMENT")]
    AddComment,
    #[serde(rename = "CREATED")]
    Created,
    #[serde(rename = "IOU")]
    Iou,
    #[serde(rename = "RENAMED")]
    Renamed,
    #[serde(rename = "CLOSED")]
    Closed,
    #[serde(rename = "REPORTPREVIEW")]
    ReportPreview,
    #[default]
    #[serde(rename = "UNKNOWN")]
    #[serde(other)]
    Unknown,
}

impl ActionName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddComment => "ADDCOMMENT",
            Self::Created => "CREATED",
            Self::Iou => "IOU",
            Self::Renamed => "RENAMED",
            Self::Closed => "CLOSED",
            Self::ReportPreview => "REPORTPREVIEW",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "reportID", default)]
    pub report_id: Option<ReportId>,
    #[serde(default, deserialize_with = "millis")]
    pub last_visited_timestamp: Option<i64>,
    #[serde(default)]
    pub report_name: Option<String>,
    #[serde(default)]
    pub policy_name: Option<String>,
    #[serde(default)]
    pub chat_type: Option<ChatType>,
    #[serde(rename = "ownerAccountID", default)]
    pub owner_account_id: Option<AccountId>,
    #[serde(rename = "participantAccountIDs", default)]
    pub participant_account_ids: Vec<AccountId>,
}

impl Report {
    pub fn has_report_id(&self) -> bool {
        self.report_id.as_ref().is_some_and(ReportId::is_present)
    }

    /// `last_visited_timestamp` is in epoch milliseconds.
    pub fn last_visited_at(&self) -> Option<OffsetDateTime> {
        let millis = self.last_visited_timestamp?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
    }

    pub fn is_chat_room(&self) -> bool {
        self.chat_type.is_some_and(ChatType::is_chat_room)
    }

    pub fn is_policy_expense_chat(&self) -> bool {
        self.chat_type == Some(ChatType::PolicyExpenseChat)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireMillis {
    Whole(i64),
    Fractional(f64),
}

/// Epoch milliseconds may arrive as floats; the fraction is dropped.
fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<WireMillis>::deserialize(deserializer)?.map(|value| match value {
            WireMillis::Whole(millis) => millis,
            WireMillis::Fractional(millis) => millis.trunc() as i64,
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageFragment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAction {
    #[serde(default)]
    pub actor_email: Option<String>,
    #[serde(rename = "reportActionID", default)]
    pub report_action_id: Option<ReportActionId>,
    #[serde(default)]
    pub action_name: ActionName,
    #[serde(default)]
    pub message: Vec<MessageFragment>,
}

impl ReportAction {
    pub fn is_persisted(&self) -> bool {
        self.report_action_id
            .as_ref()
            .is_some_and(ReportActionId::is_present)
    }

    /// Text of the first fragment, `""` when there is none.
    pub fn first_message_text(&self) -> &str {
        self.message
            .first()
            .and_then(|fragment| fragment.text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "accountID", default)]
    pub account_id: Option<AccountId>,
}

/// Reports as they arrive from callers: a list, or an id-keyed object in
/// insertion order. Either shape may hold `null` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCollection {
    Sequence(Vec<Option<Report>>),
    Keyed(Vec<(String, Option<Report>)>),
}

impl Default for ReportCollection {
    fn default() -> Self {
        Self::Sequence(Vec::new())
    }
}

impl ReportCollection {
    /// Flattens either shape to its values in order; keys are dropped.
    pub fn entries(&self) -> Vec<Option<&Report>> {
        match self {
            Self::Sequence(reports) => reports.iter().map(Option::as_ref).collect(),
            Self::Keyed(reports) => reports.iter().map(|(_, report)| report.as_ref()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(reports) => reports.len(),
            Self::Keyed(reports) => reports.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Report>> for ReportCollection {
    fn from(reports: Vec<Report>) -> Self {
        Self::Sequence(reports.into_iter().map(Some).collect())
    }
}

impl FromIterator<(String, Report)> for ReportCollection {
    fn from_iter<I: IntoIterator<Item = (String, Report)>>(iter: I) -> Self {
        Self::Keyed(
            iter.into_iter()
                .map(|(key, report)| (key, Some(report)))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ReportCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CollectionVisitor)
    }
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = ReportCollection;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of reports or an object of reports keyed by id")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(ReportCollection::default())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(ReportCollection::default())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut reports = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<Value>()? {
            let key = format!("#{}", reports.len());
            reports.push(lenient_report(&key, value));
        }
        Ok(ReportCollection::Sequence(reports))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut reports = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            let report = lenient_report(&key, value);
            reports.push((key, report));
        }
        Ok(ReportCollection::Keyed(reports))
    }
}

/// Decodes one collection entry. An entry that is not a report is logged and
/// treated like a `null` entry.
pub fn lenient_report(key: &str, value: Value) -> Option<Report> {
    match serde_json::from_value(value) {
        Ok(report) => report,
        Err(error) => {
            warn!(key, error = %error, "skipping undecodable report");
            None
        }
    }
}
