use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

static BLANK_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").expect("blank marker regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Level {
    Label(String),
    Number(serde_json::Number),
}

impl Default for Level {
    fn default() -> Self {
        Level::Label(String::new())
    }
}

impl Level {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(label) => Level::Label(label.clone()),
            Value::Number(n) => Level::Number(n.clone()),
            _ => Level::default(),
        }
    }
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(Level::from_value).unwrap_or_default())
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Label(label) => f.write_str(label),
            Level::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(default)]
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInTheBlankQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_parts: Option<Vec<String>>,
    pub correct_answer: String,
}

impl FillInTheBlankQuestion {
    pub fn sentence_parts(&self) -> Option<(String, String)> {
        if let Some(parts) = &self.sentence_parts {
            let before = parts.first().cloned().unwrap_or_default();
            let after = parts.get(1).cloned().unwrap_or_default();
            return Some((before, after));
        }
        let text = self.question_text.as_deref()?;
        let marker = BLANK_MARKER.find(text)?;
        Some((
            text[..marker.start()].to_string(),
            text[marker.end()..].to_string(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPassageQuestion {
    #[serde(default)]
    pub question_text: String,
    pub passage: String,
    pub questions: Vec<ChoiceQuestion>,
}

impl ReadingPassageQuestion {
    // Only the first sub-question is ever asked.
    pub fn active(&self) -> Option<&ChoiceQuestion> {
        self.questions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    pub sentence_part: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragAndDropQuestion {
    #[serde(default)]
    pub question_text: String,
    pub blanks: Vec<Blank>,
    pub correct_order: Vec<String>,
}

impl DragAndDropQuestion {
    pub fn drop_targets(&self) -> usize {
        self.correct_order.len()
    }

    pub fn word_pool(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.blanks
            .iter()
            .flat_map(|b| b.options.iter())
            .chain(self.correct_order.iter())
            .filter(|w| seen.insert(w.as_str()))
            .cloned()
            .collect()
    }

    pub fn placement_allowance(&self, word: &str) -> usize {
        self.correct_order
            .iter()
            .filter(|w| w.as_str() == word)
            .count()
            .max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice(ChoiceQuestion),
    Dropdown(ChoiceQuestion),
    FillInTheBlank(FillInTheBlankQuestion),
    ReadingPassage(ReadingPassageQuestion),
    DragAndDrop(DragAndDropQuestion),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Level,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// A record that does not parse becomes `Unsupported`, keeping whatever
    /// topic and level could be read. The parse error is handed back for logging.
    pub fn from_value_lenient(value: Value) -> (Self, Option<serde_json::Error>) {
        let topic = value
            .get("topic")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let level = value.get("level").map(Level::from_value).unwrap_or_default();
        match serde_json::from_value::<Question>(value) {
            Ok(question) => (question, None),
            Err(err) => (
                Question {
                    topic,
                    level,
                    kind: QuestionKind::Unsupported,
                },
                Some(err),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Text(String),
    Slots(Vec<Option<String>>),
}

impl UserAnswer {
    pub fn empty_slots(len: usize) -> Self {
        UserAnswer::Slots(vec![None; len])
    }
}

impl From<&str> for UserAnswer {
    fn from(value: &str) -> Self {
        UserAnswer::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CanonicalAnswer {
    Text(String),
    Sequence(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

fn check_choice(field: &str, choice: &ChoiceQuestion, issues: &mut Vec<ValidationIssue>) {
    if choice.options.is_empty() {
        issues.push(ValidationIssue {
            field: format!("{field}.options"),
            issue: "must contain at least one option".into(),
        });
    }
    if !choice.options.iter().any(|o| *o == choice.correct_answer) {
        issues.push(ValidationIssue {
            field: format!("{field}.correctAnswer"),
            issue: "must reference an existing option".into(),
        });
    }
}

// Advisory only: nothing reported here blocks a session.
pub fn validate_question_bank(questions: &[Question]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, q) in questions.iter().enumerate() {
        let field = format!("questions[{i}]");
        match &q.kind {
            QuestionKind::MultipleChoice(choice) | QuestionKind::Dropdown(choice) => {
                check_choice(&field, choice, &mut issues);
            }
            QuestionKind::FillInTheBlank(fill) => {
                if fill.sentence_parts().is_none() {
                    issues.push(ValidationIssue {
                        field: format!("{field}.questionText"),
                        issue: "must contain a blank marker or sentenceParts".into(),
                    });
                }
                if fill.correct_answer.trim().is_empty() {
                    issues.push(ValidationIssue {
                        field: format!("{field}.correctAnswer"),
                        issue: "must not be empty".into(),
                    });
                }
            }
            QuestionKind::ReadingPassage(reading) => match reading.active() {
                Some(sub) => check_choice(&format!("{field}.questions[0]"), sub, &mut issues),
                None => issues.push(ValidationIssue {
                    field: format!("{field}.questions"),
                    issue: "must contain at least one sub-question".into(),
                }),
            },
            QuestionKind::DragAndDrop(drag) => {
                if drag.correct_order.is_empty() {
                    issues.push(ValidationIssue {
                        field: format!("{field}.correctOrder"),
                        issue: "must not be empty".into(),
                    });
                }
                if drag.correct_order.len() > drag.blanks.len() {
                    issues.push(ValidationIssue {
                        field: format!("{field}.blanks"),
                        issue: "must have a blank for every word in correctOrder".into(),
                    });
                }
            }
            QuestionKind::Unsupported => issues.push(ValidationIssue {
                field: format!("{field}.type"),
                issue: "unsupported question type".into(),
            }),
        }
    }
    issues
}
