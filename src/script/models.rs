// src/script/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One language variant of the conversation script. Everything the bot says
/// comes from here; the engine only decides which piece to say next.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub initial: Initial,
    pub urgent_assistance: UrgentAssistance,
    pub other_topics: OtherTopics,
    pub contacts: HashMap<String, Contact>,
    pub survey: Survey,
    pub responses: Responses,
    pub conversation_end: ConversationEnd,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Initial {
    pub greeting: String,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UrgentAssistance {
    /// `[email question, date of birth question]`
    pub auth_questions: Vec<String>,
    pub topic_question: String,
    pub topics: Vec<String>,
    pub registration_options: Prompt,
    pub unavailable: Prompt,
    pub email_composition: EmailComposition,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Prompt {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EmailComposition {
    pub prompt: String,
    pub confirmation: String,
    /// `[send, discard]`
    pub confirm_options: Vec<String>,
    pub sending: String,
    pub sent: String,
    pub cancelled: String,
    /// Key into `Script::contacts`.
    pub recipient: String,
    pub followup_question: String,
    /// `[more help, done]`
    pub followup_options: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OtherTopics {
    pub course_registration: Topic,
    pub fees_financial_aid: Topic,
    pub assignments_exams: Topic,
    pub course_instructor: Topic,
}

impl OtherTopics {
    pub fn get(&self, key: TopicKey) -> &Topic {
        match key {
            TopicKey::CourseRegistration => &self.course_registration,
            TopicKey::FeesFinancialAid => &self.fees_financial_aid,
            TopicKey::AssignmentsExams => &self.assignments_exams,
            TopicKey::CourseInstructor => &self.course_instructor,
        }
    }
}

/// A topic either walks through a list of `problems` (with a close question
/// afterwards) or, without one, offers the generic `options` list.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Topic {
    pub message: String,
    pub problems: Vec<String>,
    pub problem_descriptions: HashMap<String, String>,
    pub close_conversation_question: String,
    /// `[goodbye, back to menu, contact, show problems again]`
    pub close_options: Vec<String>,
    /// `[contact, back to menu, goodbye...]`
    pub options: Vec<String>,
    /// Key into `Script::contacts`.
    pub contact: Option<String>,
}

impl Topic {
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub enabled: bool,
    pub intro: String,
    /// `[satisfaction, resolved, comments]`
    pub questions: Vec<SurveyQuestion>,
    pub thank_you: String,
    /// Localized word that ends the survey early. "skip" always works.
    #[serde(default)]
    pub skip_text: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SurveyQuestion {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Responses {
    pub invalid_input: String,
    pub goodbye: String,
    #[serde(default = "default_invalid_email")]
    pub invalid_email: String,
    #[serde(default = "default_invalid_date")]
    pub invalid_date: String,
    #[serde(default = "default_invalid_rating")]
    pub invalid_rating: String,
    #[serde(default = "default_contact_card")]
    pub contact_card: String,
}

fn default_invalid_email() -> String {
    "Please enter a valid email address (name@domain.com).".to_string()
}

fn default_invalid_date() -> String {
    "Please enter a valid date of birth (YYYY-MM-DD).".to_string()
}

fn default_invalid_rating() -> String {
    "Please choose a number from 1 to 5.".to_string()
}

fn default_contact_card() -> String {
    "{{ contact.name }}\n{{ contact.title }}\n{{ contact.email }}\n{{ contact.phone }}".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEnd {
    pub message: String,
    pub restart_text: String,
}

/// The four topic sub-flows, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKey {
    CourseRegistration,
    FeesFinancialAid,
    AssignmentsExams,
    CourseInstructor,
}

impl TopicKey {
    pub const ALL: [TopicKey; 4] = [
        TopicKey::CourseRegistration,
        TopicKey::FeesFinancialAid,
        TopicKey::AssignmentsExams,
        TopicKey::CourseInstructor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKey::CourseRegistration => "course_registration",
            TopicKey::FeesFinancialAid => "fees_financial_aid",
            TopicKey::AssignmentsExams => "assignments_exams",
            TopicKey::CourseInstructor => "course_instructor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_defaults_when_fields_missing() {
        let topic: Topic = serde_json::from_str(r#"{"message": "Ask the department."}"#).unwrap();
        assert_eq!(topic.message, "Ask the department.");
        assert!(!topic.has_problems());
        assert!(topic.problem_descriptions.is_empty());
        assert!(topic.contact.is_none());
    }

    #[test]
    fn test_responses_fill_optional_defaults() {
        let responses: Responses =
            serde_json::from_str(r#"{"invalidInput": "Huh?", "goodbye": "Bye"}"#).unwrap();
        assert_eq!(responses.invalid_input, "Huh?");
        assert!(responses.invalid_rating.contains("1 to 5"));
        assert!(responses.contact_card.contains("contact.email"));
    }

    #[test]
    fn test_topic_key_menu_order() {
        let names: Vec<_> = TopicKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["course_registration", "fees_financial_aid", "assignments_exams", "course_instructor"]
        );
    }
}
