// src/script/parser.rs
use crate::errors::ScriptError;
use crate::script::Locale;
use crate::script::models::{Script, TopicKey};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

const ENGLISH: &str = include_str!("scripts/en.json");
const SPANISH: &str = include_str!("scripts/es.json");

/// Urgent assistance plus one entry per topic.
pub const MENU_OPTIONS: usize = 1 + TopicKey::ALL.len();
pub const CLOSE_OPTIONS: usize = 4;
pub const SURVEY_QUESTIONS: usize = 3;

pub fn bundled_source(locale: Locale) -> &'static str {
    match locale {
        Locale::En => ENGLISH,
        Locale::Es => SPANISH,
    }
}

pub fn parse_script(source: &str, origin: &str) -> Result<Script, ScriptError> {
    let script: Script = serde_json::from_str(source).map_err(|source| ScriptError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let problems = validate(&script);
    if !problems.is_empty() {
        return Err(ScriptError::Invalid {
            origin: origin.to_string(),
            problems,
        });
    }
    Ok(script)
}

/// Structural checks the engine relies on. Returns every problem found so a
/// script author can fix them in one pass.
pub fn validate(script: &Script) -> Vec<String> {
    let mut problems = Vec::new();

    if script.initial.options.len() != MENU_OPTIONS {
        problems.push(format!(
            "initial.options must have {} entries, found {}",
            MENU_OPTIONS,
            script.initial.options.len()
        ));
    }

    let urgent = &script.urgent_assistance;
    if urgent.auth_questions.len() < 2 {
        problems.push("urgentAssistance.authQuestions needs an email and a date of birth question".to_string());
    }
    if urgent.topics.is_empty() {
        problems.push("urgentAssistance.topics is empty".to_string());
    }
    if urgent.registration_options.options.is_empty() {
        problems.push("urgentAssistance.registrationOptions.options is empty".to_string());
    }
    if urgent.unavailable.options.len() < 2 {
        problems.push("urgentAssistance.unavailable.options needs a yes and a no option".to_string());
    }
    let email = &urgent.email_composition;
    if email.confirm_options.len() < 2 {
        problems.push("urgentAssistance.emailComposition.confirmOptions needs send and discard options".to_string());
    }
    if email.followup_options.len() < 2 {
        problems.push("urgentAssistance.emailComposition.followupOptions needs a yes and a no option".to_string());
    }
    if !script.contacts.contains_key(&email.recipient) {
        problems.push(format!(
            "urgentAssistance.emailComposition.recipient '{}' is not in contacts",
            email.recipient
        ));
    }

    for key in TopicKey::ALL {
        let topic = script.other_topics.get(key);
        let name = key.as_str();

        if topic.has_problems() {
            if topic.close_options.len() != CLOSE_OPTIONS {
                problems.push(format!(
                    "otherTopics.{}.closeOptions must have {} entries, found {}",
                    name,
                    CLOSE_OPTIONS,
                    topic.close_options.len()
                ));
            }
            if topic.close_conversation_question.trim().is_empty() {
                problems.push(format!("otherTopics.{}.closeConversationQuestion is empty", name));
            }
            for described in topic.problem_descriptions.keys() {
                if !topic.problems.contains(described) {
                    log::warn!("otherTopics.{}: description for unknown problem '{}'", name, described);
                }
            }
        } else if topic.options.len() < 2 {
            // The engine shows the topic message and says goodbye.
            log::warn!("otherTopics.{} has no problems and fewer than 2 options", name);
        }

        match &topic.contact {
            Some(role) if !script.contacts.contains_key(role) => {
                problems.push(format!("otherTopics.{}.contact '{}' is not in contacts", name, role));
            }
            Some(_) => {}
            None => log::warn!("otherTopics.{} has no contact; its contact option only says goodbye", name),
        }
    }

    if script.survey.enabled && script.survey.questions.len() != SURVEY_QUESTIONS {
        problems.push(format!(
            "survey.questions must have {} entries, found {}",
            SURVEY_QUESTIONS,
            script.survey.questions.len()
        ));
    }

    if script.conversation_end.restart_text.trim().is_empty() {
        problems.push("conversationEnd.restartText is empty".to_string());
    }

    problems
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicShape {
    pub key: TopicKey,
    pub problems: usize,
    pub described: usize,
    pub close_options: usize,
    pub options: usize,
}

/// Counts of everything the engine addresses by position. Two scripts with the
/// same shape can be swapped without changing the conversation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptShape {
    pub menu_options: usize,
    pub auth_questions: usize,
    pub urgent_topics: usize,
    pub registration_options: usize,
    pub unavailable_options: usize,
    pub confirm_options: usize,
    pub followup_options: usize,
    pub topics: Vec<TopicShape>,
    pub contacts: usize,
    pub survey_enabled: bool,
    pub survey_question_options: Vec<usize>,
}

pub fn shape(script: &Script) -> ScriptShape {
    let urgent = &script.urgent_assistance;
    ScriptShape {
        menu_options: script.initial.options.len(),
        auth_questions: urgent.auth_questions.len(),
        urgent_topics: urgent.topics.len(),
        registration_options: urgent.registration_options.options.len(),
        unavailable_options: urgent.unavailable.options.len(),
        confirm_options: urgent.email_composition.confirm_options.len(),
        followup_options: urgent.email_composition.followup_options.len(),
        topics: TopicKey::ALL
            .iter()
            .map(|&key| {
                let topic = script.other_topics.get(key);
                TopicShape {
                    key,
                    problems: topic.problems.len(),
                    described: topic
                        .problems
                        .iter()
                        .filter(|p| topic.problem_descriptions.contains_key(*p))
                        .count(),
                    close_options: topic.close_options.len(),
                    options: topic.options.len(),
                }
            })
            .collect(),
        contacts: script.contacts.len(),
        survey_enabled: script.survey.enabled,
        survey_question_options: script.survey.questions.iter().map(|q| q.options.len()).collect(),
    }
}

/// All loaded script variants, keyed by locale.
#[derive(Debug, Clone)]
pub struct ScriptRegistry {
    scripts: HashMap<Locale, Arc<Script>>,
    origins: HashMap<Locale, String>,
}

impl ScriptRegistry {
    /// Only the scripts compiled into the binary.
    pub fn bundled() -> Result<Self, ScriptError> {
        let mut registry = ScriptRegistry {
            scripts: HashMap::new(),
            origins: HashMap::new(),
        };
        for locale in Locale::ALL {
            let origin = format!("bundled:{}.json", locale.code());
            let script = parse_script(bundled_source(locale), &origin)?;
            registry.insert(locale, script, origin);
        }
        Ok(registry)
    }

    /// Bundled scripts, overridden by any `<locale>.json` found directly in `dir`.
    pub fn load(dir: Option<&Path>) -> Result<Self, ScriptError> {
        let mut registry = Self::bundled()?;

        let Some(dir) = dir else {
            return Ok(registry);
        };

        for entry in WalkDir::new(dir).max_depth(1).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let locale = match stem.parse::<Locale>() {
                Ok(locale) => locale,
                Err(_) => {
                    log::warn!("Ignoring {}: '{}' is not a known locale", path.display(), stem);
                    continue;
                }
            };

            let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let origin = path.display().to_string();
            let script = parse_script(&source, &origin)?;
            log::info!("Loaded {} script from {}", locale, origin);
            registry.insert(locale, script, origin);
        }

        Ok(registry)
    }

    fn insert(&mut self, locale: Locale, script: Script, origin: String) {
        self.scripts.insert(locale, Arc::new(script));
        self.origins.insert(locale, origin);
    }

    pub fn get(&self, locale: Locale) -> Result<Arc<Script>, ScriptError> {
        self.scripts
            .get(&locale)
            .cloned()
            .ok_or_else(|| ScriptError::UnknownLocale(locale.code().to_string()))
    }

    pub fn origin(&self, locale: Locale) -> Option<&str> {
        self.origins.get(&locale).map(String::as_str)
    }

    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<_> = self.scripts.keys().copied().collect();
        locales.sort();
        locales
    }
}
