//! Small UI state machines
//!
//! Each piece of page state is a value type with an action enum and a pure
//! `reduce` function. The JS side dispatches actions through `crate::api`
//! and renders from the returned state.

use serde::{Deserialize, Serialize};

/// Customization panel (off-canvas) visibility
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelState {
    pub open: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PanelAction {
    Toggle,
    Close,
}

impl PanelState {
    pub fn reduce(self, action: PanelAction) -> PanelState {
        match action {
            PanelAction::Toggle => PanelState { open: !self.open },
            PanelAction::Close => PanelState { open: false },
        }
    }
}

/// Payload form tabs, in display order
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TabKind {
    Url,
    Text,
    Email,
    VCard,
    Place,
    Wifi,
    Sms,
    Phone,
    Event,
}

impl TabKind {
    pub const ALL: [TabKind; 9] = [
        TabKind::Url,
        TabKind::Text,
        TabKind::Email,
        TabKind::VCard,
        TabKind::Place,
        TabKind::Wifi,
        TabKind::Sms,
        TabKind::Phone,
        TabKind::Event,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TabKind::Url => "URL",
            TabKind::Text => "Text",
            TabKind::Email => "E-mail",
            TabKind::VCard => "VCard",
            TabKind::Place => "Place",
            TabKind::Wifi => "WiFi",
            TabKind::Sms => "SMS",
            TabKind::Phone => "Phone",
            TabKind::Event => "Event",
        }
    }

    pub fn index(&self) -> usize {
        TabKind::ALL.iter().position(|tab| tab == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<TabKind> {
        TabKind::ALL.get(index).copied()
    }
}

/// Selected payload tab
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabState {
    pub selected: TabKind,
}

impl Default for TabState {
    fn default() -> Self {
        TabState {
            selected: TabKind::Url,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum TabAction {
    Selected(usize),
}

impl TabState {
    /// Out-of-range indices keep the current tab
    pub fn reduce(self, action: TabAction) -> TabState {
        match action {
            TabAction::Selected(index) => match TabKind::from_index(index) {
                Some(selected) => TabState { selected },
                None => {
                    log::warn!("Ignoring selection of unknown tab {}", index);
                    self
                }
            },
        }
    }
}

/// WiFi password field: masked or shown
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordVisibility {
    pub is_visible: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordAction {
    ToggleVisible,
}

impl PasswordVisibility {
    pub fn reduce(self, action: PasswordAction) -> PasswordVisibility {
        match action {
            PasswordAction::ToggleVisible => PasswordVisibility {
                is_visible: !self.is_visible,
            },
        }
    }

    /// `type` attribute for the password input
    pub fn input_type(&self) -> &'static str {
        if self.is_visible {
            "text"
        } else {
            "password"
        }
    }
}

/// All page-level UI state kept on the Rust side
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub panel: PanelState,
    pub tabs: TabState,
    pub password: PasswordVisibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_toggle_and_close() {
        let state = PanelState::default();
        assert!(!state.open);
        let state = state.reduce(PanelAction::Toggle);
        assert!(state.open);
        let state = state.reduce(PanelAction::Toggle).reduce(PanelAction::Toggle);
        assert!(state.open);
        assert!(!state.reduce(PanelAction::Close).open);
        assert!(!PanelState::default().reduce(PanelAction::Close).open);
    }

    #[test]
    fn test_tab_selection() {
        let state = TabState::default().reduce(TabAction::Selected(4));
        assert_eq!(state.selected, TabKind::Place);
        assert_eq!(state.selected.label(), "Place");
        assert_eq!(state.reduce(TabAction::Selected(42)), state);
    }

    #[test]
    fn test_tab_labels_in_order() {
        let labels: Vec<&str> = TabKind::ALL.iter().map(|tab| tab.label()).collect();
        assert_eq!(
            labels,
            vec!["URL", "Text", "E-mail", "VCard", "Place", "WiFi", "SMS", "Phone", "Event"]
        );
        assert_eq!(TabKind::Event.index(), 8);
    }

    #[test]
    fn test_password_visibility() {
        let state = PasswordVisibility::default();
        assert_eq!(state.input_type(), "password");
        let state = state.reduce(PasswordAction::ToggleVisible);
        assert_eq!(state.input_type(), "text");
    }

    #[test]
    fn test_action_wire_format() {
        let action: TabAction = serde_json::from_str(r#"{"type":"selected","payload":2}"#).unwrap();
        assert_eq!(action, TabAction::Selected(2));
        assert!(serde_json::from_str::<PanelAction>(r#""open""#).is_err());
        let action: PanelAction = serde_json::from_str(r#""toggle""#).unwrap();
        assert_eq!(action, PanelAction::Toggle);
    }
}
