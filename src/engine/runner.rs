// src/engine/runner.rs
use crate::engine::Timing;
use crate::engine::matcher::{self, Selection};
use crate::engine::message::{InputKind, Reply};
use crate::engine::record::UserRecord;
use crate::engine::state::ConversationState;
use crate::engine::table::{Action, Expect, Route, expectation};
use crate::engine::validate;
use crate::script::models::{Contact, Script, TopicKey};
use crate::templates::render_prompt;
use chrono::NaiveDate;
use std::sync::Arc;

/// How the session should treat its transcript after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reset {
    /// Keep the transcript, append the menu again.
    Menu,
    /// Drop the transcript and start over.
    Restart,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: ConversationState,
    pub record: UserRecord,
    pub replies: Vec<Reply>,
    pub reset: Option<Reset>,
}

/// The conversation state machine. Holds no session data: every call takes
/// the current state and record and returns the next ones.
#[derive(Debug, Clone)]
pub struct DialogEngine {
    script: Arc<Script>,
    timing: Timing,
}

impl DialogEngine {
    pub fn new(script: Arc<Script>, timing: Timing) -> Self {
        Self { script, timing }
    }

    #[cfg(test)]
    pub fn script(&self) -> &Script {
        &self.script
    }

    #[cfg(test)]
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Greeting followed by the main menu.
    pub fn opening(&self) -> Vec<Reply> {
        let empty = UserRecord::default();
        let mut replies = vec![Reply::text(self.say(&self.script.initial.greeting, &empty))];
        replies.extend(self.prompt(ConversationState::Initial, &empty));
        replies
    }

    pub fn restart(&self) -> Step {
        Step {
            state: ConversationState::Initial,
            record: UserRecord::default(),
            replies: self.opening(),
            reset: Some(Reset::Restart),
        }
    }

    pub fn back_to_menu(&self) -> Step {
        Step {
            state: ConversationState::Initial,
            record: UserRecord::default(),
            replies: self.opening(),
            reset: Some(Reset::Menu),
        }
    }

    /// The messages that put `state`'s question on screen.
    pub fn prompt(&self, state: ConversationState, record: &UserRecord) -> Vec<Reply> {
        let script = &*self.script;
        let urgent = &script.urgent_assistance;
        let email = &urgent.email_composition;

        let reply = match state {
            ConversationState::Initial => {
                Reply::text(self.say(&script.initial.question, record)).with_options(&script.initial.options)
            }
            ConversationState::UrgentAuthEmail => {
                Reply::text(self.say(nth(&urgent.auth_questions, 0), record)).expecting(InputKind::Text)
            }
            ConversationState::UrgentAuthDob => {
                Reply::text(self.say(nth(&urgent.auth_questions, 1), record)).with_calendar()
            }
            ConversationState::UrgentTopic => {
                Reply::text(self.say(&urgent.topic_question, record)).with_options(&urgent.topics)
            }
            ConversationState::UrgentRegistrationOption => {
                Reply::text(self.say(&urgent.registration_options.question, record))
                    .with_options(&urgent.registration_options.options)
            }
            ConversationState::UrgentUnavailable => Reply::text(self.say(&urgent.unavailable.question, record))
                .with_options(&urgent.unavailable.options)
                .expecting(InputKind::YesNo),
            ConversationState::UrgentEmailComposition => {
                Reply::text(self.say(&email.prompt, record)).expecting(InputKind::Text)
            }
            ConversationState::UrgentEmailConfirmation => {
                Reply::text(self.say(&email.confirmation, record)).with_options(&email.confirm_options)
            }
            ConversationState::UrgentFollowup => Reply::text(self.say(&email.followup_question, record))
                .with_options(&email.followup_options)
                .expecting(InputKind::YesNo),
            ConversationState::TopicProblems(key) => {
                let topic = script.other_topics.get(key);
                Reply::text(self.say(&topic.message, record)).with_options(&topic.problems)
            }
            ConversationState::TopicClose(key) => {
                let topic = script.other_topics.get(key);
                Reply::text(self.say(&topic.close_conversation_question, record)).with_options(&topic.close_options)
            }
            ConversationState::OtherTopic(key) => {
                let topic = script.other_topics.get(key);
                Reply::text(self.say(&topic.message, record)).with_options(&topic.options)
            }
            ConversationState::SurveyIntro => Reply::text(self.say(&script.survey.intro, record)),
            ConversationState::SurveySatisfaction => {
                Reply::text(self.say(self.survey_question(0), record)).expecting(InputKind::Rating)
            }
            ConversationState::SurveyResolved => {
                let options = script.survey.questions.get(1).map(|q| q.options.as_slice()).unwrap_or_default();
                Reply::text(self.say(self.survey_question(1), record))
                    .with_options(options)
                    .expecting(InputKind::YesNo)
            }
            ConversationState::SurveyComments => {
                Reply::text(self.say(self.survey_question(2), record)).expecting(InputKind::Text)
            }
            ConversationState::SurveyComplete | ConversationState::ConversationEnd => self.closing(),
        };
        vec![reply]
    }

    /// Applies one user input. Never fails: input that fits nothing re-prompts
    /// and keeps the current state.
    pub fn advance(&self, state: ConversationState, record: &UserRecord, input: &str, today: NaiveDate) -> Step {
        let script = &*self.script;
        let expect = expectation(state, script);

        // Free text is taken as written, even when it reads like a command.
        let free_text = matches!(expect, Expect::Text | Expect::AnyText);
        if !free_text
            && (matcher::equals(input, &script.conversation_end.restart_text) || matcher::equals(input, "restart"))
        {
            log::debug!("{} -> restart", state);
            return self.restart();
        }

        if state.is_survey() && self.is_skip(input) {
            log::debug!("{} -> survey skipped", state);
            return Step {
                state: ConversationState::ConversationEnd,
                record: record.clone(),
                replies: vec![self.closing()],
                reset: None,
            };
        }

        let mut record = record.clone();
        let step = match expect {
            Expect::Choice(routes) => match self.pick(&routes, input) {
                Some(route) => self.apply(state, route, record, input),
                None => self.invalid(state, record, input),
            },
            Expect::ChoiceOrText(routes) => match self.pick(&routes, input) {
                Some(route) => self.apply(state, route, record, input),
                None if !input.trim().is_empty() => {
                    record.survey.resolved = Some(input.trim().to_string());
                    self.goto(ConversationState::SurveyComments, record)
                }
                None => self.invalid(state, record, input),
            },
            Expect::Email => {
                if validate::is_valid_email(input) {
                    let email = input.trim().to_string();
                    record.name = Some(validate::display_name(&email));
                    record.email = Some(email);
                    self.goto(ConversationState::UrgentAuthDob, record)
                } else {
                    self.stay(state, record, Reply::text(&script.responses.invalid_email).expecting(InputKind::Text))
                }
            }
            Expect::Date => match validate::parse_date_of_birth(input, today) {
                Some(date) => {
                    record.date_of_birth = Some(date.format("%Y-%m-%d").to_string());
                    self.goto(ConversationState::UrgentTopic, record)
                }
                None => self.stay(state, record, Reply::text(&script.responses.invalid_date).with_calendar()),
            },
            Expect::Rating => match validate::parse_rating(input) {
                Some(rating) => {
                    record.survey.satisfaction = Some(rating);
                    self.goto(ConversationState::SurveyResolved, record)
                }
                None => self.stay(
                    ConversationState::SurveySatisfaction,
                    record,
                    Reply::text(&script.responses.invalid_rating).expecting(InputKind::Rating),
                ),
            },
            Expect::Text => {
                let text = input.trim();
                if text.is_empty() {
                    self.invalid(state, record, input)
                } else {
                    record.email_body = Some(text.to_string());
                    self.goto(ConversationState::UrgentEmailConfirmation, record)
                }
            }
            Expect::AnyText => {
                let text = input.trim();
                record.survey.comments = (!text.is_empty()).then(|| text.to_string());
                self.complete_survey(record)
            }
        };

        if step.state != state {
            log::debug!("{} -> {}", state, step.state);
        }
        step
    }

    fn pick<'a>(&self, routes: &'a [Route], input: &str) -> Option<&'a Route> {
        let labels: Vec<&str> = routes.iter().map(|r| r.label.as_str()).collect();
        match matcher::select(input, &labels) {
            Selection::Matched { index, kind } => {
                log::trace!("{:?} matched option {} ({:?})", input, index, kind);
                routes.get(index)
            }
            Selection::Ambiguous(candidates) => {
                log::debug!("{:?} is ambiguous between options {:?}", input, candidates);
                None
            }
            Selection::NoMatch => None,
        }
    }

    fn apply(&self, state: ConversationState, route: &Route, mut record: UserRecord, input: &str) -> Step {
        let script = &*self.script;
        match route.action {
            Action::StartUrgent => self.goto(ConversationState::UrgentAuthEmail, record),
            Action::OpenTopic(key) => self.open_topic(key, record),
            Action::ChooseUrgentTopic { registration } => {
                record.urgent_topic = Some(route.label.clone());
                if registration {
                    self.goto(ConversationState::UrgentRegistrationOption, record)
                } else {
                    self.goto(ConversationState::UrgentUnavailable, record)
                }
            }
            Action::ChooseRegistrationOption => {
                record.registration_option = Some(route.label.clone());
                self.goto(ConversationState::UrgentUnavailable, record)
            }
            Action::ComposeEmail => self.goto(ConversationState::UrgentEmailComposition, record),
            Action::SkipEmail => self.goto(ConversationState::UrgentFollowup, record),
            Action::SendEmail => {
                let email = &script.urgent_assistance.email_composition;
                let recipient = script.contacts.get(&email.recipient);
                let mut replies = vec![
                    Reply::text(self.say(&email.sending, &record)),
                    Reply::text(render_prompt(&email.sent, &record, recipient)).after(self.timing.send_delay),
                ];
                replies.extend(self.prompt(ConversationState::UrgentFollowup, &record));
                log::info!(
                    "Simulated email to {} ({} characters)",
                    email.recipient,
                    record.email_body.as_deref().map(str::len).unwrap_or(0)
                );
                self.with_replies(ConversationState::UrgentFollowup, record, replies)
            }
            Action::DiscardEmail => {
                let email = &script.urgent_assistance.email_composition;
                record.email_body = None;
                let mut replies = vec![Reply::text(self.say(&email.cancelled, &record))];
                replies.extend(self.prompt(ConversationState::UrgentFollowup, &record));
                self.with_replies(ConversationState::UrgentFollowup, record, replies)
            }
            Action::BackToMenu => self.back_to_menu(),
            Action::Goodbye => self.goodbye(record, Vec::new()),
            Action::DescribeProblem(key) => {
                let topic = script.other_topics.get(key);
                let description = topic
                    .problem_descriptions
                    .get(&route.label)
                    .or_else(|| topic.problem_descriptions.get(input.trim()))
                    .unwrap_or(&topic.message);
                let mut replies = vec![Reply::text(self.say(description, &record))];
                replies.extend(self.prompt(ConversationState::TopicClose(key), &record));
                self.with_replies(ConversationState::TopicClose(key), record, replies)
            }
            Action::Contact(key) => {
                let card = match self.topic_contact(key) {
                    Some(contact) => vec![Reply::text(render_prompt(
                        &script.responses.contact_card,
                        &record,
                        Some(contact),
                    ))],
                    None => {
                        log::warn!("{} has no contact to show", key.as_str());
                        Vec::new()
                    }
                };
                self.goodbye(record, card)
            }
            Action::ShowProblems(key) => self.goto(ConversationState::TopicProblems(key), record),
            Action::Resolved => {
                record.survey.resolved = Some(route.label.clone());
                self.goto(ConversationState::SurveyComments, record)
            }
            Action::Restart => {
                log::debug!("{} -> restart", state);
                self.restart()
            }
        }
    }

    fn open_topic(&self, key: TopicKey, record: UserRecord) -> Step {
        let topic = self.script.other_topics.get(key);
        if topic.has_problems() {
            self.goto(ConversationState::TopicProblems(key), record)
        } else if !topic.options.is_empty() {
            self.goto(ConversationState::OtherTopic(key), record)
        } else {
            let message = vec![Reply::text(self.say(&topic.message, &record))];
            self.goodbye(record, message)
        }
    }

    /// Ends a sub-flow: goodbye, then the survey (revealed in stages) or the
    /// closing message.
    fn goodbye(&self, record: UserRecord, mut replies: Vec<Reply>) -> Step {
        let survey = &self.script.survey;
        replies.push(Reply::text(self.say(&self.script.responses.goodbye, &record)));

        if !survey.enabled {
            replies.push(self.closing());
            return self.with_replies(ConversationState::ConversationEnd, record, replies);
        }

        let reveal = self.timing.reveal_delay;
        for reply in self.prompt(ConversationState::SurveyIntro, &record) {
            replies.push(reply.after(reveal));
        }
        for reply in self.prompt(ConversationState::SurveySatisfaction, &record) {
            replies.push(reply.after(reveal));
        }
        log::debug!("survey_intro -> {}", ConversationState::SurveySatisfaction);
        self.with_replies(ConversationState::SurveySatisfaction, record, replies)
    }

    fn complete_survey(&self, record: UserRecord) -> Step {
        log::info!(
            "Survey complete: satisfaction={:?} resolved={:?}",
            record.survey.satisfaction,
            record.survey.resolved
        );
        let replies = vec![
            Reply::text(self.say(&self.script.survey.thank_you, &record)),
            self.closing(),
        ];
        log::debug!("{} -> {}", ConversationState::SurveyComplete, ConversationState::ConversationEnd);
        self.with_replies(ConversationState::ConversationEnd, record, replies)
    }

    fn closing(&self) -> Reply {
        let end = &self.script.conversation_end;
        Reply::text(end.message.clone()).with_options(std::slice::from_ref(&end.restart_text))
    }

    fn invalid(&self, state: ConversationState, record: UserRecord, input: &str) -> Step {
        log::debug!("{:?} is not a valid answer in {}", input, state);
        let mut replies = vec![Reply::text(self.say(&self.script.responses.invalid_input, &record))];
        replies.extend(self.prompt(state, &record));
        self.with_replies(state, record, replies)
    }

    fn stay(&self, state: ConversationState, record: UserRecord, reply: Reply) -> Step {
        self.with_replies(state, record, vec![reply])
    }

    fn goto(&self, state: ConversationState, record: UserRecord) -> Step {
        let replies = self.prompt(state, &record);
        self.with_replies(state, record, replies)
    }

    fn with_replies(&self, state: ConversationState, record: UserRecord, replies: Vec<Reply>) -> Step {
        Step {
            state,
            record,
            replies,
            reset: None,
        }
    }

    fn is_skip(&self, input: &str) -> bool {
        matcher::equals(input, "skip")
            || self
                .script
                .survey
                .skip_text
                .as_deref()
                .is_some_and(|skip| matcher::equals(input, skip))
    }

    fn topic_contact(&self, key: TopicKey) -> Option<&Contact> {
        let role = self.script.other_topics.get(key).contact.as_ref()?;
        self.script.contacts.get(role)
    }

    fn survey_question(&self, index: usize) -> &str {
        self.script
            .survey
            .questions
            .get(index)
            .map(|q| q.text.as_str())
            .unwrap_or_default()
    }

    fn say(&self, text: &str, record: &UserRecord) -> String {
        render_prompt(text, record, None)
    }
}

fn nth(list: &[String], index: usize) -> &str {
    list.get(index).map(String::as_str).unwrap_or_default()
}
