use crate::models::{CanonicalAnswer, Question, QuestionKind, UserAnswer};

fn non_empty_text(answer: Option<&UserAnswer>) -> Option<&str> {
    match answer {
        Some(UserAnswer::Text(text)) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}

pub fn is_answered(question: &Question, answer: Option<&UserAnswer>) -> bool {
    match &question.kind {
        QuestionKind::MultipleChoice(_)
        | QuestionKind::Dropdown(_)
        | QuestionKind::ReadingPassage(_) => non_empty_text(answer).is_some(),
        QuestionKind::FillInTheBlank(_) => {
            non_empty_text(answer).is_some_and(|text| !text.trim().is_empty())
        }
        QuestionKind::DragAndDrop(drag) => match answer {
            Some(UserAnswer::Slots(slots)) => {
                slots.len() == drag.correct_order.len() && slots.iter().all(Option::is_some)
            }
            _ => false,
        },
        QuestionKind::Unsupported => false,
    }
}

pub fn is_correct(question: &Question, answer: Option<&UserAnswer>) -> bool {
    if !is_answered(question, answer) {
        return false;
    }
    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice(choice) | QuestionKind::Dropdown(choice), Some(UserAnswer::Text(value))) => {
            *value == choice.correct_answer
        }
        (QuestionKind::FillInTheBlank(fill), Some(UserAnswer::Text(value))) => {
            value.trim().to_lowercase() == fill.correct_answer.trim().to_lowercase()
        }
        (QuestionKind::ReadingPassage(reading), Some(UserAnswer::Text(value))) => reading
            .active()
            .is_some_and(|sub| *value == sub.correct_answer),
        // Sentence reconstruction: position matters.
        (QuestionKind::DragAndDrop(drag), Some(UserAnswer::Slots(slots))) => {
            slots.len() == drag.correct_order.len()
                && slots
                    .iter()
                    .zip(drag.correct_order.iter())
                    .all(|(slot, expected)| slot.as_deref() == Some(expected.as_str()))
        }
        _ => false,
    }
}

pub fn canonical_correct_answer(question: &Question) -> Option<CanonicalAnswer> {
    match &question.kind {
        QuestionKind::MultipleChoice(choice) | QuestionKind::Dropdown(choice) => {
            Some(CanonicalAnswer::Text(choice.correct_answer.clone()))
        }
        QuestionKind::FillInTheBlank(fill) => Some(CanonicalAnswer::Text(fill.correct_answer.clone())),
        QuestionKind::ReadingPassage(reading) => reading
            .active()
            .map(|sub| CanonicalAnswer::Text(sub.correct_answer.clone())),
        QuestionKind::DragAndDrop(drag) => Some(CanonicalAnswer::Sequence(drag.correct_order.clone())),
        QuestionKind::Unsupported => None,
    }
}

pub fn score(questions: &[Question], answers: &[Option<UserAnswer>]) -> usize {
    questions
        .iter()
        .zip(answers.iter())
        .filter(|(q, a)| a.is_some() && is_correct(q, a.as_ref()))
        .count()
}
