use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Mixed => "Mixed",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            "Mixed" => Ok(Difficulty::Mixed),
            other => Err(anyhow::anyhow!("Invalid difficulty: {other}")),
        }
    }
}

/// The subjects with dedicated prompt guidance. Anything else is stored as free text
/// and treated as [`Subject::General`] for prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    General,
    Biology,
    Chemistry,
    Physics,
    History,
    Literature,
    Mathematics,
    ComputerScience,
    Psychology,
    Economics,
}

impl Subject {
    pub const ALL: [Subject; 10] = [
        Subject::General,
        Subject::Biology,
        Subject::Chemistry,
        Subject::Physics,
        Subject::History,
        Subject::Literature,
        Subject::Mathematics,
        Subject::ComputerScience,
        Subject::Psychology,
        Subject::Economics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::General => "General",
            Subject::Biology => "Biology",
            Subject::Chemistry => "Chemistry",
            Subject::Physics => "Physics",
            Subject::History => "History",
            Subject::Literature => "Literature",
            Subject::Mathematics => "Mathematics",
            Subject::ComputerScience => "Computer Science",
            Subject::Psychology => "Psychology",
            Subject::Economics => "Economics",
        }
    }

    pub fn from_name(name: &str) -> Option<Subject> {
        Subject::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// A generated, not yet persisted question/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDraft {
    pub question: String,
    pub answer: String,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub set_id: String,
    pub question: String,
    pub answer: String,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub created_at: String,
}

/// Read access to the two faces of a card, shared by drafts and stored cards.
pub trait CardFace {
    fn question(&self) -> &str;
    fn answer(&self) -> &str;
}

impl CardFace for CardDraft {
    fn question(&self) -> &str {
        &self.question
    }

    fn answer(&self) -> &str {
        &self.answer
    }
}

impl CardFace for Flashcard {
    fn question(&self) -> &str {
        &self.question
    }

    fn answer(&self) -> &str {
        &self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trip() {
        for d in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Mixed,
        ] {
            assert_eq!(Difficulty::try_from(d.as_str()).unwrap(), d);
        }
        assert!(Difficulty::try_from("easy").is_err());
    }

    #[test]
    fn test_subject_lookup() {
        assert_eq!(
            Subject::from_name("Computer Science"),
            Some(Subject::ComputerScience)
        );
        assert_eq!(Subject::from_name("Astrology"), None);
    }
}
