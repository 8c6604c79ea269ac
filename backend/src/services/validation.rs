use crate::errors::{CardField, CardRejection};
use crate::services::text_extract::DocumentKind;

pub const MIN_FIELD_CHARS: usize = 10;
pub const MAX_QUESTION_CHARS: usize = 500;
pub const MAX_ANSWER_CHARS: usize = 1000;

pub fn validate_document_type(content_type: &str) -> bool {
    DocumentKind::from_mime(content_type).is_some()
}

/// Checks a question/answer pair. Minimum lengths apply to the trimmed text,
/// maximum lengths to the text as given.
pub fn validate_card(question: &str, answer: &str) -> Result<(), CardRejection> {
    let q = question.trim();
    let a = answer.trim();

    if q.is_empty() {
        return Err(CardRejection::EmptyField(CardField::Question));
    }
    if a.is_empty() {
        return Err(CardRejection::EmptyField(CardField::Answer));
    }
    if q.chars().count() < MIN_FIELD_CHARS {
        return Err(CardRejection::TooShort {
            field: CardField::Question,
            min: MIN_FIELD_CHARS,
        });
    }
    if a.chars().count() < MIN_FIELD_CHARS {
        return Err(CardRejection::TooShort {
            field: CardField::Answer,
            min: MIN_FIELD_CHARS,
        });
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(CardRejection::TooLong {
            field: CardField::Question,
            max: MAX_QUESTION_CHARS,
        });
    }
    if answer.chars().count() > MAX_ANSWER_CHARS {
        return Err(CardRejection::TooLong {
            field: CardField::Answer,
            max: MAX_ANSWER_CHARS,
        });
    }

    Ok(())
}

/// Input text must carry at least `min_chars` non-whitespace-padded characters.
pub fn validate_content(text: &str, min_chars: usize) -> Result<(), String> {
    let len = text.trim().chars().count();
    if len == 0 {
        return Err("Content cannot be empty".to_string());
    }
    if len < min_chars {
        return Err(format!(
            "Please provide more content (at least {min_chars} characters, got {len})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_types() {
        assert!(validate_document_type("text/plain"));
        assert!(validate_document_type("application/pdf"));
        assert!(validate_document_type("text/plain; charset=utf-8"));
        assert!(!validate_document_type("image/png"));
        assert!(!validate_document_type("application/octet-stream"));
    }

    #[test]
    fn test_accepts_minimum_lengths() {
        assert_eq!(validate_card("0123456789", "abcdefghij"), Ok(()));
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert_eq!(
            validate_card("", "A perfectly fine answer"),
            Err(CardRejection::EmptyField(CardField::Question))
        );
        assert_eq!(
            validate_card("A perfectly fine question?", "   "),
            Err(CardRejection::EmptyField(CardField::Answer))
        );
    }

    #[test]
    fn test_rejects_short_fields() {
        assert!(matches!(
            validate_card("Short?", "A perfectly fine answer"),
            Err(CardRejection::TooShort { field: CardField::Question, .. })
        ));
        assert!(matches!(
            validate_card("A perfectly fine question?", "   tiny    "),
            Err(CardRejection::TooShort { field: CardField::Answer, .. })
        ));
    }

    #[test]
    fn test_rejects_long_fields() {
        let long_q = "q".repeat(MAX_QUESTION_CHARS + 1);
        let long_a = "a".repeat(MAX_ANSWER_CHARS + 1);
        assert!(matches!(
            validate_card(&long_q, "A perfectly fine answer"),
            Err(CardRejection::TooLong { field: CardField::Question, .. })
        ));
        assert!(matches!(
            validate_card("A perfectly fine question?", &long_a),
            Err(CardRejection::TooLong { field: CardField::Answer, .. })
        ));
        assert!(validate_card(&"q".repeat(MAX_QUESTION_CHARS), &"a".repeat(MAX_ANSWER_CHARS)).is_ok());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // 10 characters, 20 bytes
        assert!(validate_card("éééééééééé", "ßßßßßßßßßß").is_ok());
    }

    #[test]
    fn test_content_minimum() {
        assert!(validate_content("   ", 50).is_err());
        assert!(validate_content(&"x".repeat(49), 50).is_err());
        assert!(validate_content(&"x".repeat(50), 50).is_ok());
    }
}
