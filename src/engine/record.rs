use serde::Serialize;

/// What the user has told us so far. Fields are only written after they pass
/// validation, and the whole record is dropped on restart or back-to-menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: Option<String>,
    /// Derived from the email's local part, never asked for.
    pub name: Option<String>,
    /// Normalised to `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub urgent_topic: Option<String>,
    pub registration_option: Option<String>,
    pub email_body: Option<String>,
    pub survey: SurveyRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurveyRecord {
    pub satisfaction: Option<u8>,
    pub resolved: Option<String>,
    pub comments: Option<String>,
}

impl UserRecord {
    pub fn is_empty(&self) -> bool {
        *self == UserRecord::default()
    }
}
