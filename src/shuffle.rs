use crate::models::{Question, QuestionKind};
use rand::seq::SliceRandom;
use rand::Rng;

pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

fn shuffle_options(question: &Question, rng: &mut (impl Rng + ?Sized)) -> Question {
    let mut question = question.clone();
    match &mut question.kind {
        QuestionKind::MultipleChoice(choice) | QuestionKind::Dropdown(choice) => {
            choice.options = shuffle(&choice.options, rng);
        }
        QuestionKind::ReadingPassage(reading) => {
            for sub in reading.questions.iter_mut() {
                sub.options = shuffle(&sub.options, rng);
            }
        }
        // Word pools move, the sentence skeleton and correctOrder never do.
        QuestionKind::DragAndDrop(drag) => {
            for blank in drag.blanks.iter_mut() {
                blank.options = shuffle(&blank.options, rng);
            }
        }
        QuestionKind::FillInTheBlank(_) | QuestionKind::Unsupported => {}
    }
    question
}

pub fn prepare_session<R: Rng + ?Sized>(source: &[Question], rng: &mut R) -> Vec<Question> {
    shuffle(source, rng)
        .iter()
        .map(|q| shuffle_options(q, &mut *rng))
        .collect()
}
