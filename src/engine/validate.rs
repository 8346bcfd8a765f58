use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

pub fn is_valid_email(input: &str) -> bool {
    EMAIL.is_match(input.trim())
}

/// "jane.doe@example.com" -> "Jane". Cuts the local part at the first `.`,
/// `_` or `-` and capitalises the first letter.
pub fn display_name(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or_default();
    let first = local
        .split(['.', '_', '-'])
        .find(|part| !part.is_empty())
        .unwrap_or(local);

    let mut chars = first.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Survey rating: an integer from 1 to 5.
pub fn parse_rating(input: &str) -> Option<u8> {
    match input.trim().parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => Some(rating),
        _ => None,
    }
}

/// Date of birth in one of the accepted formats, not after `today`.
pub fn parse_date_of_birth(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .filter(|date| *date <= today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jane.doe@example.com"));
        assert!(is_valid_email("  j_smith-2@mail.university.edu "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_display_name_cuts_at_separators() {
        assert_eq!(display_name("jane.doe@example.com"), "Jane");
        assert_eq!(display_name("mark_twain@example.com"), "Mark");
        assert_eq!(display_name("ana-maria@example.com"), "Ana");
        assert_eq!(display_name("bob@example.com"), "Bob");
    }

    #[test]
    fn test_display_name_skips_leading_separator() {
        assert_eq!(display_name(".zoe.x@example.com"), "Zoe");
    }

    #[test]
    fn test_display_name_handles_non_ascii() {
        assert_eq!(display_name("élodie.martin@example.fr"), "Élodie");
    }

    #[test]
    fn test_rating_range() {
        assert_eq!(parse_rating("3"), Some(3));
        assert_eq!(parse_rating(" 5 "), Some(5));
        assert_eq!(parse_rating("1"), Some(1));
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("7"), None);
        assert_eq!(parse_rating("-2"), None);
        assert_eq!(parse_rating("three"), None);
        assert_eq!(parse_rating("3.5"), None);
    }

    #[test]
    fn test_date_of_birth_formats() {
        let expected = NaiveDate::from_ymd_opt(2001, 4, 23);
        assert_eq!(parse_date_of_birth("2001-04-23", today()), expected);
        assert_eq!(parse_date_of_birth("23/04/2001", today()), expected);
        assert_eq!(parse_date_of_birth("23-04-2001", today()), expected);
    }

    #[test]
    fn test_date_of_birth_rejections() {
        assert_eq!(parse_date_of_birth("2001-02-30", today()), None);
        assert_eq!(parse_date_of_birth("2030-01-01", today()), None);
        assert_eq!(parse_date_of_birth("yesterday", today()), None);
        assert_eq!(parse_date_of_birth("", today()), None);
    }
}
