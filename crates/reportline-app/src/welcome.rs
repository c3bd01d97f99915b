// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Text model for the header shown above the first message of a chat.
//!
//! Only content is decided here. Fonts, spacing and navigation belong to the
//! caller, which receives segments tagged with an emphasis and an optional
//! link target.

use crate::{AccountId, Report, ReportId};

/// Looks up a localized phrase. Keys and results are opaque to this module.
pub trait Translate {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeKind {
    ChatRoom,
    PolicyExpenseChat,
    Default,
}

impl WelcomeKind {
    pub fn of(report: &Report) -> Self {
        if report.is_chat_room() {
            Self::ChatRoom
        } else if report.is_policy_expense_chat() {
            Self::PolicyExpenseChat
        } else {
            Self::Default
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantName {
    pub account_id: AccountId,
    pub display_name: String,
    pub pronouns: String,
    /// Optimistic participants have no profile to open yet.
    pub is_optimistic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomWelcomeMessage {
    pub phrase1: String,
    pub show_report_name: bool,
    pub phrase2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeContext<'a> {
    pub report: &'a Report,
    pub owner_display_name: String,
    pub participants: Vec<ParticipantName>,
    pub room_welcome: RoomWelcomeMessage,
    /// Money request option keys, e.g. `split` or `request`.
    pub money_request_options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLink {
    ReportDetails(ReportId),
    Profile(AccountId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeSegment {
    pub text: String,
    pub emphasis: Emphasis,
    pub link: Option<SegmentLink>,
}

impl WelcomeSegment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Normal,
            link: None,
        }
    }

    fn strong(text: impl Into<String>, link: Option<SegmentLink>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Strong,
            link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeText {
    pub kind: WelcomeKind,
    pub hero: String,
    pub body: Vec<WelcomeSegment>,
}

impl WelcomeText {
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(|segment| segment.text.as_str())
            .collect()
    }
}

pub fn build_welcome_text(context: &WelcomeContext<'_>, translator: &dyn Translate) -> WelcomeText {
    let report = context.report;
    let kind = WelcomeKind::of(report);
    let report_name = report.report_name.as_deref().unwrap_or("");

    let hero = match kind {
        WelcomeKind::ChatRoom => translator.translate(
            "reportActionsView.welcomeToRoom",
            &[("roomName", report_name)],
        ),
        WelcomeKind::PolicyExpenseChat | WelcomeKind::Default => {
            translator.translate("reportActionsView.sayHello", &[])
        }
    };

    let mut body = match kind {
        WelcomeKind::PolicyExpenseChat => expense_chat_segments(context, translator),
        WelcomeKind::ChatRoom => room_segments(context, report_name),
        WelcomeKind::Default => participant_segments(context, translator),
    };

    let additional_text = context
        .money_request_options
        .iter()
        .map(|option| translator.translate(&format!("reportActionsView.iouTypes.{option}"), &[]))
        .collect::<Vec<_>>()
        .join(", ");
    if !additional_text.is_empty() {
        body.push(WelcomeSegment::plain(translator.translate(
            "reportActionsView.usePlusButton",
            &[("additionalText", additional_text.as_str())],
        )));
    }

    WelcomeText { kind, hero, body }
}

fn expense_chat_segments(
    context: &WelcomeContext<'_>,
    translator: &dyn Translate,
) -> Vec<WelcomeSegment> {
    let policy_name = context.report.policy_name.as_deref().unwrap_or("");
    vec![
        WelcomeSegment::plain(translator.translate(
            "reportActionsView.beginningOfChatHistoryPolicyExpenseChatPartOne",
            &[],
        )),
        WelcomeSegment::strong(context.owner_display_name.clone(), None),
        WelcomeSegment::plain(translator.translate(
            "reportActionsView.beginningOfChatHistoryPolicyExpenseChatPartTwo",
            &[],
        )),
        WelcomeSegment::strong(policy_name, None),
        WelcomeSegment::plain(translator.translate(
            "reportActionsView.beginningOfChatHistoryPolicyExpenseChatPartThree",
            &[],
        )),
    ]
}

fn room_segments(context: &WelcomeContext<'_>, report_name: &str) -> Vec<WelcomeSegment> {
    let room = &context.room_welcome;
    let mut segments = vec![WelcomeSegment::plain(room.phrase1.clone())];
    if room.show_report_name {
        let link = context
            .report
            .report_id
            .clone()
            .filter(ReportId::is_present)
            .map(SegmentLink::ReportDetails);
        segments.push(WelcomeSegment::strong(report_name, link));
    }
    if let Some(phrase2) = &room.phrase2 {
        segments.push(WelcomeSegment::plain(phrase2.clone()));
    }
    segments
}

fn participant_segments(
    context: &WelcomeContext<'_>,
    translator: &dyn Translate,
) -> Vec<WelcomeSegment> {
    let mut segments = vec![WelcomeSegment::plain(
        translator.translate("reportActionsView.beginningOfChatHistory", &[]),
    )];
    let count = context.participants.len();
    for (index, participant) in context.participants.iter().enumerate() {
        let link =
            (!participant.is_optimistic).then_some(SegmentLink::Profile(participant.account_id));
        segments.push(WelcomeSegment::strong(participant.display_name.clone(), link));
        if !participant.pronouns.is_empty() {
            segments.push(WelcomeSegment::plain(format!(" ({})", participant.pronouns)));
        }
        if index + 1 == count {
            segments.push(WelcomeSegment::plain("."));
        } else if index + 2 == count {
            let and = translator.translate("common.and", &[]);
            segments.push(WelcomeSegment::plain(format!(" {and} ")));
        } else {
            segments.push(WelcomeSegment::plain(", "));
        }
    }
    segments
}
