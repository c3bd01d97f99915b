// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use reportline_app::{
    ActionName, Report, ReportCollection, Session, SessionIdentity, can_edit_report_action,
    find_most_recent_report, format_participant_title,
};
use reportline_testkit::{ReportFaker, comment, report};
use std::thread;

#[test]
fn selection_matches_max_timestamp_across_seeds() {
    for seed in 1..40 {
        let mut faker = ReportFaker::new(seed);
        let mut reports: Vec<Option<Report>> =
            faker.reports(12).into_iter().map(Some).collect();
        reports.insert(faker.int_n(reports.len()), None);
        reports.push(Some(Report {
            report_id: None,
            last_visited_timestamp: Some(i64::MAX),
            ..Report::default()
        }));

        let expected = reports
            .iter()
            .flatten()
            .filter(|report| report.has_report_id())
            .map(|report| report.last_visited_timestamp)
            .max()
            .flatten();

        let collection = ReportCollection::Sequence(reports);
        let selected = find_most_recent_report(&collection).expect("seeded reports have ids");
        assert!(selected.has_report_id(), "seed {seed}");
        assert_eq!(selected.last_visited_timestamp, expected, "seed {seed}");
    }
}

#[test]
fn selection_reads_json_object_collections() -> Result<()> {
    let collection: ReportCollection = serde_json::from_str(
        r#"{
            "report_1": {"reportID": "1", "lastVisitedTimestamp": 30},
            "report_2": null,
            "report_3": {"lastVisitedTimestamp": 90},
            "report_4": {"reportID": 4, "lastVisitedTimestamp": 30}
        }"#,
    )?;
    let selected = find_most_recent_report(&collection).expect("two valid reports");
    assert_eq!(
        selected.report_id.as_ref().map(|id| id.as_str()),
        Some("4")
    );
    Ok(())
}

#[test]
fn repeated_selection_is_deterministic() {
    let collection = ReportCollection::from(vec![
        report("a", Some(1)),
        report("b", Some(1)),
        report("c", Some(1)),
    ]);
    let first = find_most_recent_report(&collection).cloned();
    for _ in 0..10 {
        assert_eq!(find_most_recent_report(&collection).cloned(), first);
    }
    assert_eq!(
        first.and_then(|report| report.report_id).map(|id| id.to_string()),
        Some("c".to_owned())
    );
}

#[test]
fn only_own_persisted_text_comments_are_editable() {
    let me = "me@example.com";
    let mut faker = ReportFaker::new(11);
    for _ in 0..200 {
        let action = faker.action(&[me, "them@example.com"]);
        let expected = action.actor_email.as_deref() == Some(me)
            && action.is_persisted()
            && action.action_name == ActionName::AddComment;
        assert_eq!(can_edit_report_action(&action, Some(me)), expected);
        assert!(!can_edit_report_action(&action, None));
    }
}

#[test]
fn identity_is_readable_while_another_thread_switches_accounts() {
    let identity = SessionIdentity::with_email("a@example.com");
    let action = comment("a@example.com", "1", "hello");
    let writer = identity.clone();

    let handle = thread::spawn(move || {
        for round in 0..500 {
            let email = if round % 2 == 0 {
                "b@example.com"
            } else {
                "a@example.com"
            };
            writer.apply(Some(&Session {
                email: Some(email.to_owned()),
                account_id: None,
            }));
        }
    });

    for _ in 0..500 {
        let seen = identity.email();
        assert!(matches!(
            seen.as_deref(),
            Some("a@example.com") | Some("b@example.com")
        ));
        let _ = identity.can_edit(&action);
    }
    handle.join().expect("writer thread should join");
    assert_eq!(identity.email().as_deref(), Some("a@example.com"));
}

#[test]
fn participant_title_mixes_sms_and_email_logins() {
    let mut faker = ReportFaker::new(5);
    let sms = faker.sms_login();
    let email = faker.login();
    let title = format_participant_title(&[sms.clone(), email.clone()]);
    let phone = sms.trim_end_matches("@expensify.sms");
    assert_eq!(title, format!("{phone}, {email}"));
}
