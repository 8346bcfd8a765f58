use crate::engine::record::UserRecord;
use crate::script::models::Contact;
use minijinja::{Environment, UndefinedBehavior, Value};
use once_cell::sync::Lazy;

static JINJA_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_keep_trailing_newline(true);
    env
});

/// Renders a script string against what we know about the user. Script text
/// is authored content, so a broken template degrades to the raw string
/// instead of failing the conversation.
pub fn render_prompt(template: &str, record: &UserRecord, contact: Option<&Contact>) -> String {
    if !template.contains("{{") && !template.contains("{%") {
        return template.to_string();
    }

    let ctx = minijinja::context! {
        name => record.name.as_deref().unwrap_or_default(),
        email => record.email.as_deref().unwrap_or_default(),
        date_of_birth => record.date_of_birth.as_deref().unwrap_or_default(),
        topic => record.urgent_topic.as_deref().unwrap_or_default(),
        option => record.registration_option.as_deref().unwrap_or_default(),
        body => record.email_body.as_deref().unwrap_or_default(),
        contact => contact.map(Value::from_serialize).unwrap_or(Value::UNDEFINED),
    };

    match JINJA_ENV.render_str(template, ctx) {
        Ok(rendered) => rendered,
        Err(e) => {
            log::warn!("Could not render prompt template {:?}: {}", template, e);
            template.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            email: Some("jane.doe@example.com".to_string()),
            name: Some("Jane".to_string()),
            urgent_topic: Some("Registration".to_string()),
            email_body: Some("Please add me to BIO 101.".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_text_is_returned_untouched() {
        assert_eq!(render_prompt("Hello there", &record(), None), "Hello there");
    }

    #[test]
    fn test_record_fields_are_available() {
        let rendered = render_prompt("Thanks {{ name }}, we'll write to {{ email }} about {{ topic }}.", &record(), None);
        assert_eq!(rendered, "Thanks Jane, we'll write to jane.doe@example.com about Registration.");
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let rendered = render_prompt("Hi {{ name }}!", &UserRecord::default(), None);
        assert_eq!(rendered, "Hi !");
    }

    #[test]
    fn test_contact_fields() {
        let contact = Contact {
            name: "Maria Lopez".to_string(),
            title: "University Registrar".to_string(),
            email: "registrar@university.edu".to_string(),
            phone: "+1 555 0100".to_string(),
        };
        let rendered = render_prompt("{{ contact.name }} <{{ contact.email }}>", &record(), Some(&contact));
        assert_eq!(rendered, "Maria Lopez <registrar@university.edu>");
    }

    #[test]
    fn test_multiline_body_is_kept() {
        let mut record = record();
        record.email_body = Some("line one\nline two".to_string());
        let rendered = render_prompt("Email:\n\n{{ body }}\n\nSend it?", &record, None);
        assert_eq!(rendered, "Email:\n\nline one\nline two\n\nSend it?");
    }

    #[test]
    fn test_broken_template_falls_back_to_raw_text() {
        let raw = "Hello {{ name ";
        assert_eq!(render_prompt(raw, &record(), None), raw);
    }
}
