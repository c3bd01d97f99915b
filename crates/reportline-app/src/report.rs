// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ActionName, Report, ReportAction, ReportCollection};

/// Suffix the backend appends to phone-number logins.
pub const SMS_DOMAIN_SUFFIX: &str = "@expensify.sms";
pub const ATTACHMENT_PLACEHOLDER: &str = "[Attachment]";
const TITLE_SEPARATOR: &str = ", ";

/// Strips a trailing SMS domain (ASCII case-insensitive) from a login.
pub fn remove_sms_domain(login: &str) -> &str {
    let Some(split) = login.len().checked_sub(SMS_DOMAIN_SUFFIX.len()) else {
        return login;
    };
    match (login.get(..split), login.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(SMS_DOMAIN_SUFFIX) => head,
        _ => login,
    }
}

pub fn format_participant_title<S: AsRef<str>>(logins: &[S]) -> String {
    logins
        .iter()
        .map(|login| remove_sms_domain(login.as_ref()))
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR)
}

pub fn is_attachment_placeholder(message_text: &str) -> bool {
    message_text == ATTACHMENT_PLACEHOLDER
}

/// Most recently visited report with an id. Reports never visited sort
/// first; on equal timestamps the later entry wins.
pub fn find_most_recent_report(reports: &ReportCollection) -> Option<&Report> {
    let mut candidates: Vec<&Report> = reports
        .entries()
        .into_iter()
        .flatten()
        .filter(|report| report.has_report_id())
        .collect();
    // `sort_by_key` is stable and `None < Some(_)`.
    candidates.sort_by_key(|report| report.last_visited_timestamp);
    candidates.last().copied()
}

pub fn can_edit_report_action(action: &ReportAction, current_user_email: Option<&str>) -> bool {
    let is_author = match (action.actor_email.as_deref(), current_user_email) {
        (Some(actor), Some(current)) => actor == current,
        _ => false,
    };

    is_author
        && action.is_persisted()
        && action.action_name == ActionName::AddComment
        && !is_attachment_placeholder(action.first_message_text())
}
