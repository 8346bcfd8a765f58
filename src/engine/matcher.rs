//! Resolves free-form input to one of a prompt's options.
//!
//! Priority order:
//! 1. normalised exact match,
//! 2. substring containment in either direction (must be unique),
//! 3. 1-based position ("2" picks the second option).
//!
//! Normalisation trims, case-folds, collapses inner whitespace and strips
//! common Latin diacritics so "si" matches "Sí".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Contains,
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Matched { index: usize, kind: MatchKind },
    Ambiguous(Vec<usize>),
    NoMatch,
}

#[cfg(test)]
impl Selection {
    pub fn index(&self) -> Option<usize> {
        match self {
            Selection::Matched { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

pub fn equals(input: &str, label: &str) -> bool {
    let input = normalize(input);
    !input.is_empty() && input == normalize(label)
}

pub fn select<S: AsRef<str>>(input: &str, options: &[S]) -> Selection {
    let needle = normalize(input);
    if needle.is_empty() || options.is_empty() {
        return Selection::NoMatch;
    }

    let labels: Vec<String> = options.iter().map(|o| normalize(o.as_ref())).collect();

    if let Some(index) = labels.iter().position(|label| *label == needle) {
        return Selection::Matched { index, kind: MatchKind::Exact };
    }

    let containing: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_empty() && (label.contains(&needle) || needle.contains(label.as_str())))
        .map(|(i, _)| i)
        .collect();
    match containing.len() {
        0 => {}
        1 => {
            return Selection::Matched {
                index: containing[0],
                kind: MatchKind::Contains,
            };
        }
        _ => return Selection::Ambiguous(containing),
    }

    match needle.parse::<usize>() {
        Ok(position) if position >= 1 && position <= options.len() => Selection::Matched {
            index: position - 1,
            kind: MatchKind::Position,
        },
        _ => Selection::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<String> {
        vec![
            "Urgent Assistance".to_string(),
            "Course Registration".to_string(),
            "Fees & Financial Aid".to_string(),
            "Assignments & Exams".to_string(),
            "Course Instructor".to_string(),
        ]
    }

    #[test]
    fn test_exact_match_ignores_case_and_spacing() {
        assert_eq!(
            select("  urgent   ASSISTANCE ", &menu()),
            Selection::Matched { index: 0, kind: MatchKind::Exact }
        );
    }

    #[test]
    fn test_substring_match_in_both_directions() {
        assert_eq!(
            select("instructor", &menu()),
            Selection::Matched { index: 4, kind: MatchKind::Contains }
        );
        assert_eq!(
            select("I need help with Fees & Financial Aid please", &menu()),
            Selection::Matched { index: 2, kind: MatchKind::Contains }
        );
    }

    #[test]
    fn test_ambiguous_substring_is_not_a_match() {
        assert_eq!(select("course", &menu()), Selection::Ambiguous(vec![1, 4]));
        assert_eq!(select("course", &menu()).index(), None);
    }

    #[test]
    fn test_position_fallback() {
        assert_eq!(
            select("3", &menu()),
            Selection::Matched { index: 2, kind: MatchKind::Position }
        );
        assert_eq!(select("0", &menu()), Selection::NoMatch);
        assert_eq!(select("6", &menu()), Selection::NoMatch);
    }

    #[test]
    fn test_exact_wins_over_substring() {
        let options = vec!["Yes".to_string(), "Yes, send my email".to_string()];
        assert_eq!(select("yes", &options).index(), Some(0));
    }

    #[test]
    fn test_empty_input_never_matches() {
        assert_eq!(select("", &menu()), Selection::NoMatch);
        assert_eq!(select("   ", &menu()), Selection::NoMatch);
    }

    #[test]
    fn test_diacritics_are_folded() {
        let options = vec!["Sí".to_string(), "No".to_string()];
        assert_eq!(select("si", &options).index(), Some(0));
        assert_eq!(select("SÍ", &options).index(), Some(0));
        assert!(equals("volver al menu", "Volver al menú"));
    }

    #[test]
    fn test_unrelated_input_is_no_match() {
        assert_eq!(select("pizza", &menu()), Selection::NoMatch);
    }
}
