use crate::script::models::TopicKey;
use serde::{Serialize, Serializer};

/// Where in the dialog tree a session currently sits. Exactly one state is
/// current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationState {
    Initial,
    UrgentAuthEmail,
    UrgentAuthDob,
    UrgentTopic,
    UrgentRegistrationOption,
    UrgentUnavailable,
    UrgentEmailComposition,
    UrgentEmailConfirmation,
    UrgentFollowup,
    /// Picking a problem from the topic's list.
    TopicProblems(TopicKey),
    /// Answering the topic's close question.
    TopicClose(TopicKey),
    /// Topic without a problem list; its generic options are on screen.
    OtherTopic(TopicKey),
    SurveyIntro,
    SurveySatisfaction,
    SurveyResolved,
    SurveyComments,
    SurveyComplete,
    ConversationEnd,
}

impl ConversationState {
    pub fn is_survey(&self) -> bool {
        matches!(
            self,
            ConversationState::SurveyIntro
                | ConversationState::SurveySatisfaction
                | ConversationState::SurveyResolved
                | ConversationState::SurveyComments
                | ConversationState::SurveyComplete
        )
    }

    /// Every concrete state, for exhaustive checks.
    #[cfg(test)]
    pub fn all() -> Vec<ConversationState> {
        let mut states = vec![
            ConversationState::Initial,
            ConversationState::UrgentAuthEmail,
            ConversationState::UrgentAuthDob,
            ConversationState::UrgentTopic,
            ConversationState::UrgentRegistrationOption,
            ConversationState::UrgentUnavailable,
            ConversationState::UrgentEmailComposition,
            ConversationState::UrgentEmailConfirmation,
            ConversationState::UrgentFollowup,
        ];
        for key in TopicKey::ALL {
            states.push(ConversationState::TopicProblems(key));
            states.push(ConversationState::TopicClose(key));
            states.push(ConversationState::OtherTopic(key));
        }
        states.extend([
            ConversationState::SurveyIntro,
            ConversationState::SurveySatisfaction,
            ConversationState::SurveyResolved,
            ConversationState::SurveyComments,
            ConversationState::SurveyComplete,
            ConversationState::ConversationEnd,
        ]);
        states
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        ConversationState::Initial
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Initial => f.write_str("initial"),
            ConversationState::UrgentAuthEmail => f.write_str("urgent_auth_email"),
            ConversationState::UrgentAuthDob => f.write_str("urgent_auth_dob"),
            ConversationState::UrgentTopic => f.write_str("urgent_topic"),
            ConversationState::UrgentRegistrationOption => f.write_str("urgent_registration_option"),
            ConversationState::UrgentUnavailable => f.write_str("urgent_unavailable"),
            ConversationState::UrgentEmailComposition => f.write_str("urgent_email_composition"),
            ConversationState::UrgentEmailConfirmation => f.write_str("urgent_email_confirmation"),
            ConversationState::UrgentFollowup => f.write_str("urgent_followup"),
            ConversationState::TopicProblems(key) => f.write_str(key.as_str()),
            ConversationState::TopicClose(key) => write!(f, "{}_close", key.as_str()),
            ConversationState::OtherTopic(_) => f.write_str("other_topic"),
            ConversationState::SurveyIntro => f.write_str("survey_intro"),
            ConversationState::SurveySatisfaction => f.write_str("survey_satisfaction"),
            ConversationState::SurveyResolved => f.write_str("survey_resolved"),
            ConversationState::SurveyComments => f.write_str("survey_comments"),
            ConversationState::SurveyComplete => f.write_str("survey_complete"),
            ConversationState::ConversationEnd => f.write_str("conversation_end"),
        }
    }
}

impl Serialize for ConversationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
