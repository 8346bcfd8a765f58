//! Per-state transition table: what each state expects from the user and,
//! for option prompts, which action each option leads to.

use crate::engine::state::ConversationState;
use crate::script::models::{Script, TopicKey};

/// Outcome of picking an option. Applied by the dialog engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartUrgent,
    OpenTopic(TopicKey),
    ChooseUrgentTopic { registration: bool },
    ChooseRegistrationOption,
    ComposeEmail,
    SkipEmail,
    SendEmail,
    DiscardEmail,
    BackToMenu,
    Goodbye,
    DescribeProblem(TopicKey),
    Contact(TopicKey),
    ShowProblems(TopicKey),
    Resolved,
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub label: String,
    pub action: Action,
}

impl Route {
    fn new(label: &str, action: Action) -> Self {
        Route {
            label: label.to_string(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    /// Pick one of the routes with the matching policy.
    Choice(Vec<Route>),
    /// Like `Choice`, but any other non-empty text is accepted as an answer.
    ChoiceOrText(Vec<Route>),
    Email,
    Date,
    Rating,
    /// Non-empty free text.
    Text,
    /// Any text, including nothing.
    AnyText,
}

impl Expect {
    pub fn routes(&self) -> &[Route] {
        match self {
            Expect::Choice(routes) | Expect::ChoiceOrText(routes) => routes,
            _ => &[],
        }
    }
}

fn routes(options: &[String], action_for: impl Fn(usize) -> Action) -> Vec<Route> {
    options
        .iter()
        .enumerate()
        .map(|(i, label)| Route::new(label, action_for(i)))
        .collect()
}

pub fn expectation(state: ConversationState, script: &Script) -> Expect {
    let urgent = &script.urgent_assistance;
    let email = &urgent.email_composition;

    match state {
        ConversationState::Initial => Expect::Choice(
            script
                .initial
                .options
                .iter()
                .enumerate()
                .filter_map(|(i, label)| {
                    let action = match i {
                        0 => Action::StartUrgent,
                        _ => Action::OpenTopic(*TopicKey::ALL.get(i - 1)?),
                    };
                    Some(Route::new(label, action))
                })
                .collect(),
        ),
        ConversationState::UrgentAuthEmail => Expect::Email,
        ConversationState::UrgentAuthDob => Expect::Date,
        ConversationState::UrgentTopic => Expect::Choice(routes(&urgent.topics, |i| {
            Action::ChooseUrgentTopic { registration: i == 0 }
        })),
        ConversationState::UrgentRegistrationOption => {
            Expect::Choice(routes(&urgent.registration_options.options, |_| Action::ChooseRegistrationOption))
        }
        ConversationState::UrgentUnavailable => Expect::Choice(routes(&urgent.unavailable.options, |i| match i {
            0 => Action::ComposeEmail,
            _ => Action::SkipEmail,
        })),
        ConversationState::UrgentEmailComposition => Expect::Text,
        ConversationState::UrgentEmailConfirmation => Expect::Choice(routes(&email.confirm_options, |i| match i {
            0 => Action::SendEmail,
            _ => Action::DiscardEmail,
        })),
        ConversationState::UrgentFollowup => Expect::Choice(routes(&email.followup_options, |i| match i {
            0 => Action::BackToMenu,
            _ => Action::Goodbye,
        })),
        ConversationState::TopicProblems(key) => {
            Expect::Choice(routes(&script.other_topics.get(key).problems, |_| Action::DescribeProblem(key)))
        }
        ConversationState::TopicClose(key) => {
            Expect::Choice(routes(&script.other_topics.get(key).close_options, |i| match i {
                0 => Action::Goodbye,
                1 => Action::BackToMenu,
                2 => Action::Contact(key),
                3 => Action::ShowProblems(key),
                _ => Action::Goodbye,
            }))
        }
        ConversationState::OtherTopic(key) => {
            Expect::Choice(routes(&script.other_topics.get(key).options, |i| match i {
                0 => Action::Contact(key),
                1 => Action::BackToMenu,
                _ => Action::Goodbye,
            }))
        }
        ConversationState::SurveyIntro | ConversationState::SurveySatisfaction => Expect::Rating,
        ConversationState::SurveyResolved => {
            let options = script
                .survey
                .questions
                .get(1)
                .map(|q| q.options.as_slice())
                .unwrap_or_default();
            Expect::ChoiceOrText(routes(options, |_| Action::Resolved))
        }
        ConversationState::SurveyComments => Expect::AnyText,
        ConversationState::SurveyComplete | ConversationState::ConversationEnd => Expect::Choice(vec![Route::new(
            &script.conversation_end.restart_text,
            Action::Restart,
        )]),
    }
}
