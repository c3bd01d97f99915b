// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::us_states::{self, UsState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePicker {
    pub value: String,
    pub search_value: String,
    pub visibility: PickerVisibility,
    pub error_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerCommand {
    Show,
    Hide,
    Search(String),
    Select(String),
    SetError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    VisibilityChanged(PickerVisibility),
    SearchChanged(String),
    InputChanged(String),
    ErrorChanged(String),
}

impl Default for StatePicker {
    fn default() -> Self {
        Self::new("")
    }
}

impl StatePicker {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            search_value: us_states::state_name(value).unwrap_or("").to_owned(),
            visibility: PickerVisibility::Hidden,
            error_text: String::new(),
        }
    }

    /// Display name of the selected state, `""` for unknown codes.
    pub fn title(&self) -> &'static str {
        us_states::state_name(&self.value).unwrap_or("")
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == PickerVisibility::Visible
    }

    pub fn options(&self) -> Vec<&'static UsState> {
        us_states::search_states(&self.search_value)
    }

    pub fn dispatch(&mut self, command: PickerCommand) -> Vec<PickerEvent> {
        match command {
            PickerCommand::Show => self.set_visibility(PickerVisibility::Visible),
            PickerCommand::Hide => self.set_visibility(PickerVisibility::Hidden),
            PickerCommand::Search(query) => {
                self.search_value = query;
                vec![PickerEvent::SearchChanged(self.search_value.clone())]
            }
            PickerCommand::Select(code) => {
                self.value = code;
                self.search_value = self.title().to_owned();
                let mut events = vec![
                    PickerEvent::InputChanged(self.value.clone()),
                    PickerEvent::SearchChanged(self.search_value.clone()),
                ];
                events.extend(self.set_visibility(PickerVisibility::Hidden));
                events
            }
            PickerCommand::SetError(message) => {
                self.error_text = message;
                vec![PickerEvent::ErrorChanged(self.error_text.clone())]
            }
        }
    }

    fn set_visibility(&mut self, visibility: PickerVisibility) -> Vec<PickerEvent> {
        if self.visibility == visibility {
            return Vec::new();
        }
        self.visibility = visibility;
        vec![PickerEvent::VisibilityChanged(visibility)]
    }
}

#[cfg(test)]
mod tests {
    use super::{PickerCommand, PickerEvent, PickerVisibility, StatePicker};

    #[test]
    fn new_picker_seeds_search_with_state_name() {
        let picker = StatePicker::new("WA");
        assert_eq!(picker.title(), "Washington");
        assert_eq!(picker.search_value, "Washington");
        assert!(!picker.is_visible());
    }

    #[test]
    fn unknown_value_has_empty_title() {
        let picker = StatePicker::new("XX");
        assert_eq!(picker.title(), "");
        assert_eq!(picker.search_value, "");
    }

    #[test]
    fn show_and_hide_report_changes_once() {
        let mut picker = StatePicker::default();

        let shown = picker.dispatch(PickerCommand::Show);
        assert_eq!(
            shown,
            vec![PickerEvent::VisibilityChanged(PickerVisibility::Visible)]
        );
        assert!(picker.dispatch(PickerCommand::Show).is_empty());

        let hidden = picker.dispatch(PickerCommand::Hide);
        assert_eq!(
            hidden,
            vec![PickerEvent::VisibilityChanged(PickerVisibility::Hidden)]
        );
    }

    #[test]
    fn select_updates_value_search_and_closes() {
        let mut picker = StatePicker::new("WA");
        picker.dispatch(PickerCommand::Show);
        picker.dispatch(PickerCommand::Search("ore".to_owned()));
        assert_eq!(picker.options().len(), 1);

        let events = picker.dispatch(PickerCommand::Select("OR".to_owned()));
        assert_eq!(
            events,
            vec![
                PickerEvent::InputChanged("OR".to_owned()),
                PickerEvent::SearchChanged("Oregon".to_owned()),
                PickerEvent::VisibilityChanged(PickerVisibility::Hidden),
            ]
        );
        assert_eq!(picker.title(), "Oregon");
        assert!(!picker.is_visible());
    }

    #[test]
    fn error_text_is_replaced() {
        let mut picker = StatePicker::default();
        let events = picker.dispatch(PickerCommand::SetError("state is required".to_owned()));
        assert_eq!(
            events,
            vec![PickerEvent::ErrorChanged("state is required".to_owned())]
        );
        assert_eq!(picker.error_text, "state is required");
    }
}
