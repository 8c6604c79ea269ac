//! Offline card generation used when the completion service is unreachable.
//!
//! Output is deterministic: a fixed template table per subject, cycled up to
//! three times with a variation marker on repeats.

use crate::db::models::flashcard::{CardDraft, Difficulty, Subject};

const MAX_CYCLES: usize = 3;
const VARIATION_SUFFIX: &str = " (Additional context based on provided content)";

struct Template {
    question: &'static str,
    answer: &'static str,
    difficulty: &'static str,
    topic: &'static str,
}

const BIOLOGY: &[Template] = &[
    Template {
        question: "What is photosynthesis?",
        answer: "The process by which plants convert light energy into chemical energy using chlorophyll.",
        difficulty: "Easy",
        topic: "Plant Biology",
    },
    Template {
        question: "What is the function of mitochondria?",
        answer: "Mitochondria are the powerhouse of the cell, producing ATP through cellular respiration.",
        difficulty: "Medium",
        topic: "Cell Biology",
    },
    Template {
        question: "What is DNA?",
        answer: "Deoxyribonucleic acid, the hereditary material that contains genetic instructions for all living organisms.",
        difficulty: "Medium",
        topic: "Genetics",
    },
];

const CHEMISTRY: &[Template] = &[
    Template {
        question: "What is the periodic table?",
        answer: "A tabular arrangement of chemical elements organized by atomic number and electron configuration.",
        difficulty: "Easy",
        topic: "Elements",
    },
    Template {
        question: "What is a covalent bond?",
        answer: "A chemical bond formed by the sharing of electrons between atoms.",
        difficulty: "Medium",
        topic: "Chemical Bonding",
    },
    Template {
        question: "What is pH?",
        answer: "A scale used to measure the acidity or alkalinity of a solution, ranging from 0 to 14.",
        difficulty: "Medium",
        topic: "Acids and Bases",
    },
];

const PHYSICS: &[Template] = &[
    Template {
        question: "What is Newton's first law?",
        answer: "An object at rest stays at rest and an object in motion stays in motion unless acted upon by an external force.",
        difficulty: "Medium",
        topic: "Classical Mechanics",
    },
    Template {
        question: "What is the speed of light?",
        answer: "Approximately 299,792,458 meters per second in a vacuum.",
        difficulty: "Easy",
        topic: "Optics",
    },
    Template {
        question: "What is energy?",
        answer: "The capacity to do work or cause change, existing in various forms like kinetic, potential, and thermal.",
        difficulty: "Easy",
        topic: "Energy",
    },
];

const GENERAL: &[Template] = &[
    Template {
        question: "What is the main topic of this content?",
        answer: "Based on the provided educational material, this covers fundamental concepts in the subject area.",
        difficulty: "Easy",
        topic: "Overview",
    },
    Template {
        question: "What are the key concepts mentioned?",
        answer: "The content discusses important principles and definitions relevant to understanding the subject matter.",
        difficulty: "Medium",
        topic: "Key Concepts",
    },
    Template {
        question: "How can this knowledge be applied?",
        answer: "These concepts form the foundation for more advanced study and practical application in the field.",
        difficulty: "Medium",
        topic: "Application",
    },
];

fn templates_for(subject: &str) -> &'static [Template] {
    match Subject::from_name(subject) {
        Some(Subject::Biology) => BIOLOGY,
        Some(Subject::Chemistry) => CHEMISTRY,
        Some(Subject::Physics) => PHYSICS,
        _ => GENERAL,
    }
}

/// Never fails and never touches the network. Returns at most `count` cards,
/// and at most three passes over the subject's table.
pub fn generate_demo(
    _content: &str,
    subject: &str,
    count: usize,
    difficulty: Difficulty,
) -> Vec<CardDraft> {
    let templates = templates_for(subject);
    let total = count.min(templates.len() * MAX_CYCLES);

    (0..total)
        .map(|i| {
            let template = &templates[i % templates.len()];
            let cycle = i / templates.len();

            let (question, answer) = if cycle == 0 {
                (template.question.to_string(), template.answer.to_string())
            } else {
                (
                    format!("[Variation {}] {}", cycle + 1, template.question),
                    format!("{}{VARIATION_SUFFIX}", template.answer),
                )
            };

            let difficulty = match difficulty {
                Difficulty::Mixed => template.difficulty.to_string(),
                fixed => fixed.to_string(),
            };

            CardDraft {
                question,
                answer,
                difficulty: Some(difficulty),
                topic: Some(template.topic.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_capped() {
        for subject in ["Biology", "Chemistry", "Physics", "History", "Underwater Basket Weaving", ""] {
            for n in [0, 1, 3, 5, 9, 15, 25, 100] {
                let cards = generate_demo("text", subject, n, Difficulty::Mixed);
                assert!(cards.len() <= n);
                assert_eq!(cards.len(), n.min(9));
            }
        }
    }

    #[test]
    fn test_unknown_subject_uses_general() {
        let cards = generate_demo("text", "Astrology", 1, Difficulty::Mixed);
        assert_eq!(cards[0].question, "What is the main topic of this content?");
        assert_eq!(cards[0].topic.as_deref(), Some("Overview"));
    }

    #[test]
    fn test_variations_after_first_cycle() {
        let cards = generate_demo("text", "Biology", 7, Difficulty::Mixed);
        assert_eq!(cards[0].question, "What is photosynthesis?");
        assert_eq!(cards[3].question, "[Variation 2] What is photosynthesis?");
        assert!(cards[3].answer.ends_with("(Additional context based on provided content)"));
        assert_eq!(cards[6].question, "[Variation 3] What is photosynthesis?");
    }

    #[test]
    fn test_difficulty_override() {
        let mixed = generate_demo("text", "Physics", 3, Difficulty::Mixed);
        let tags: Vec<_> = mixed.iter().map(|c| c.difficulty.as_deref().unwrap()).collect();
        assert_eq!(tags, vec!["Medium", "Easy", "Easy"]);

        let hard = generate_demo("text", "Physics", 3, Difficulty::Hard);
        assert!(hard.iter().all(|c| c.difficulty.as_deref() == Some("Hard")));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            generate_demo("a", "Chemistry", 6, Difficulty::Easy),
            generate_demo("b", "Chemistry", 6, Difficulty::Easy)
        );
    }

    #[test]
    fn test_demo_cards_pass_validation() {
        for subject in ["Biology", "Chemistry", "Physics", "General"] {
            for card in generate_demo("text", subject, 9, Difficulty::Mixed) {
                assert!(
                    crate::services::validation::validate_card(&card.question, &card.answer).is_ok(),
                    "{card:?}"
                );
            }
        }
    }
}
