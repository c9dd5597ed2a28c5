use serde::{Deserialize, Serialize};

pub const IMPORT_SUCCEEDED_TITLE: &str = "Success";
pub const IMPORT_SUCCEEDED_MESSAGE: &str = "Product templates and variants imported successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
}

/// What the client does once the notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    CloseWindow,
}

/// One-shot notification returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub sticky: bool,
    pub next: FollowUpAction,
}

impl ClientNotification {
    pub fn import_succeeded() -> Self {
        Self {
            kind: "display_notification".to_string(),
            title: IMPORT_SUCCEEDED_TITLE.to_string(),
            message: IMPORT_SUCCEEDED_MESSAGE.to_string(),
            severity: Severity::Success,
            sticky: false,
            next: FollowUpAction::CloseWindow,
        }
    }
}
