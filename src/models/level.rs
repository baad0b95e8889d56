use crate::models::assignment::WellKnownGame;
use serde::{Deserialize, Serialize};

/// Every homework level is authored with exactly this many questions.
pub const QUESTIONS_PER_LEVEL: usize = 8;

/// The first option of each authored question is the correct one.
pub const CORRECT_OPTION_INDEX: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLevel {
    pub level_id: String,
    #[serde(default)]
    pub assignment_id: String,
    #[serde(default)]
    pub game_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NewCustomLevel<'a> {
    pub assignment_id: &'a str,
    pub game_type: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub questions_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedLevel {
    pub level_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LevelList {
    #[serde(default)]
    pub custom_levels: Vec<CustomLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub level_id: String,
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Vec<CustomQuestion>,
}

/// One question as typed by the teacher.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub options: [String; 3],
    pub topic: String,
}

/// Homework authoring form: a level for one of the well-known games plus
/// its questions.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeworkDraft {
    pub game: WellKnownGame,
    pub name: String,
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}

/// Keep letters, digits, `+ - * / ^`, brackets and whitespace.
pub fn sanitize_math_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | ')' | '[' | ']' | '{' | '}')
        })
        .collect()
}

impl HomeworkDraft {
    /// Sanitize and validate the draft. Errors name the first offending
    /// question (1-based) so the form can point at it.
    pub fn validated(&self) -> Result<HomeworkDraft, String> {
        let name = self.name.trim();
        let description = self.description.trim();
        if name.is_empty() || description.is_empty() {
            return Err("Homework name and description are required".to_string());
        }

        if self.questions.len() != QUESTIONS_PER_LEVEL {
            return Err(format!(
                "A level needs exactly {} questions, got {}",
                QUESTIONS_PER_LEVEL,
                self.questions.len()
            ));
        }

        let mut questions = Vec::with_capacity(self.questions.len());
        for (idx, q) in self.questions.iter().enumerate() {
            let text = sanitize_math_input(&q.text).trim().to_string();
            if text.is_empty() {
                return Err(format!("Question {} is empty", idx + 1));
            }

            let options = q
                .options
                .clone()
                .map(|o| sanitize_math_input(&o).trim().to_string());
            if options.iter().any(|o| o.is_empty()) {
                return Err(format!("Question {} needs all three options", idx + 1));
            }

            let topic = q.topic.trim().to_string();
            if topic.is_empty() {
                return Err(format!("Question {} needs a topic", idx + 1));
            }

            questions.push(QuestionDraft { text, options, topic });
        }

        Ok(HomeworkDraft {
            game: self.game,
            name: name.to_string(),
            description: description.to_string(),
            questions,
        })
    }

    /// Distinct topics in first-use order.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for q in &self.questions {
            if !topics.contains(&q.topic) {
                topics.push(q.topic.clone());
            }
        }
        topics
    }

    pub fn to_questions(&self, level_id: &str) -> Vec<CustomQuestion> {
        self.questions
            .iter()
            .map(|q| CustomQuestion {
                question_id: None,
                level_id: level_id.to_string(),
                text: q.text.clone(),
                options: q.options.to_vec(),
                correct_index: CORRECT_OPTION_INDEX,
                topic: q.topic.clone(),
            })
            .collect()
    }
}

/// Outcome of a homework submission.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedHomework {
    pub level_id: String,
    pub assignment_id: String,
    pub questions_created: usize,
    pub topics: Vec<String>,
}
