use crate::evaluator::{canonical_correct_answer, is_answered, is_correct, score};
use crate::loader::LoadError;
use crate::models::{CanonicalAnswer, Question, QuestionKind, UserAnswer};
use crate::shuffle::prepare_session;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Active,
    Finished,
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the question bank is still loading")]
    NotLoaded,
    #[error("the question bank could not be loaded: {0}")]
    LoadFailed(String),
    #[error("the quiz is already finished")]
    Finished,
    #[error("the quiz is not finished yet")]
    NotFinished,
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("please answer the question before moving on")]
    Unanswered,
    #[error("the answer is empty or incomplete")]
    IncompleteAnswer,
    #[error("this question expects {expected}")]
    AnswerShapeMismatch { expected: &'static str },
    #[error("this question type is not supported")]
    Unsupported,
    #[error("the current question is not a drag and drop question")]
    NotDragAndDrop,
    #[error("'{0}' is not one of the available words")]
    UnknownWord(String),
    #[error("the dragged word belongs to another question")]
    StaleToken,
    #[error("blank {index} does not exist, this question has {targets}")]
    BlankOutOfRange { index: usize, targets: usize },
    #[error("blank {0} already holds a word")]
    BlankFilled(usize),
    #[error("'{0}' has already been placed")]
    WordExhausted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackBand {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl FeedbackBand {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => FeedbackBand::Excellent,
            70.. => FeedbackBand::Good,
            50.. => FeedbackBand::Fair,
            _ => FeedbackBand::NeedsPractice,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FeedbackBand::Excellent => "Excellent! Your English is outstanding.",
            FeedbackBand::Good => "Good job! You have a solid command of English.",
            FeedbackBand::Fair => "Not bad, but there is room for improvement.",
            FeedbackBand::NeedsPractice => "Keep practicing! Every attempt makes you better.",
        }
    }
}

pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f64 * 100.0 / total as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub band: FeedbackBand,
    pub message: &'static str,
    pub finished_at: DateTime<Utc>,
}

impl FinalResult {
    fn from_score(report: ScoreReport) -> Self {
        let percentage = percentage(report.score, report.total);
        let band = FeedbackBand::from_percentage(percentage);
        Self {
            score: report.score,
            total: report.total,
            percentage,
            band,
            message: band.message(),
            finished_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Moved { index: usize },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragToken {
    question_index: usize,
    word: String,
}

impl DragToken {
    pub fn word(&self) -> &str {
        &self.word
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub blank_index: usize,
    pub word: String,
    pub complete: bool,
}

/// One run over the question set. `original` is never touched after construction.
#[derive(Debug, Clone)]
pub struct Session {
    original: Vec<Question>,
    questions: Vec<Question>,
    answers: Vec<Option<UserAnswer>>,
    current_index: usize,
}

impl Session {
    fn new(original: Vec<Question>, rng: &mut StdRng) -> Self {
        let questions = prepare_session(&original, rng);
        let answers = vec![None; questions.len()];
        Self {
            original,
            questions,
            answers,
            current_index: 0,
        }
    }

    fn reshuffled(&self, rng: &mut StdRng) -> Self {
        Self::new(self.original.clone(), rng)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn original_questions(&self) -> &[Question] {
        &self.original
    }

    pub fn answers(&self) -> &[Option<UserAnswer>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_answer(&self) -> Option<&UserAnswer> {
        self.answers[self.current_index].as_ref()
    }

    pub fn score(&self) -> ScoreReport {
        ScoreReport {
            score: score(&self.questions, &self.answers),
            total: self.questions.len(),
        }
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }
}

#[derive(Debug)]
enum State {
    Loading,
    LoadFailed(String),
    Active(Session),
    Finished { session: Session, result: FinalResult },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<UserAnswer>,
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_answer: Option<CanonicalAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_pool: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FinalResult>,
}

pub struct QuizController {
    state: State,
    rng: StdRng,
}

impl QuizController {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: State::Loading,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Loading => Phase::Loading,
            State::LoadFailed(_) => Phase::LoadFailed,
            State::Active(_) => Phase::Active,
            State::Finished { .. } => Phase::Finished,
        }
    }

    pub fn begin_loading(&mut self) {
        self.state = State::Loading;
    }

    pub fn load(&mut self, fetched: Result<Vec<Question>, LoadError>) -> Result<usize, LoadError> {
        let questions = match fetched {
            Ok(questions) if questions.is_empty() => Err(LoadError::Empty),
            other => other,
        };
        match questions {
            Ok(questions) => {
                let session = Session::new(questions, &mut self.rng);
                let total = session.questions.len();
                info!(total, "question bank loaded, quiz active");
                self.state = State::Active(session);
                Ok(total)
            }
            Err(err) => {
                warn!("question bank failed to load: {}", err);
                self.state = State::LoadFailed(err.to_string());
                Err(err)
            }
        }
    }

    fn session(&self) -> Result<&Session, SessionError> {
        match &self.state {
            State::Loading => Err(SessionError::NotLoaded),
            State::LoadFailed(reason) => Err(SessionError::LoadFailed(reason.clone())),
            State::Active(session) | State::Finished { session, .. } => Ok(session),
        }
    }

    fn active_mut(&mut self) -> Result<&mut Session, SessionError> {
        match &mut self.state {
            State::Loading => Err(SessionError::NotLoaded),
            State::LoadFailed(reason) => Err(SessionError::LoadFailed(reason.clone())),
            State::Finished { .. } => Err(SessionError::Finished),
            State::Active(session) => Ok(session),
        }
    }

    pub fn current_question(&self) -> Result<&Question, SessionError> {
        Ok(self.session()?.current_question())
    }

    pub fn current_answer(&self) -> Result<Option<&UserAnswer>, SessionError> {
        Ok(self.session()?.current_answer())
    }

    pub fn progress(&self) -> Result<Progress, SessionError> {
        let session = self.session()?;
        Ok(Progress {
            index: session.current_index,
            total: session.questions.len(),
        })
    }

    pub fn score(&self) -> Result<ScoreReport, SessionError> {
        Ok(self.session()?.score())
    }

    pub fn is_current_answered(&self) -> Result<bool, SessionError> {
        let session = self.session()?;
        Ok(is_answered(session.current_question(), session.current_answer()))
    }

    pub fn is_current_correct(&self) -> Result<bool, SessionError> {
        let session = self.session()?;
        Ok(is_correct(session.current_question(), session.current_answer()))
    }

    pub fn canonical_answer(&self) -> Result<Option<CanonicalAnswer>, SessionError> {
        Ok(canonical_correct_answer(self.session()?.current_question()))
    }

    pub fn final_result(&self) -> Result<&FinalResult, SessionError> {
        match &self.state {
            State::Finished { result, .. } => Ok(result),
            State::Loading => Err(SessionError::NotLoaded),
            State::LoadFailed(reason) => Err(SessionError::LoadFailed(reason.clone())),
            State::Active(_) => Err(SessionError::NotFinished),
        }
    }

    // First answer wins: a stored answer is never overwritten.
    pub fn submit_answer(&mut self, value: UserAnswer) -> Result<(), SessionError> {
        let session = self.active_mut()?;
        let index = session.current_index;
        let question = &session.questions[index];
        match (&question.kind, &value) {
            (QuestionKind::Unsupported, _) => return Err(SessionError::Unsupported),
            (QuestionKind::DragAndDrop(_), UserAnswer::Text(_)) => {
                return Err(SessionError::AnswerShapeMismatch { expected: "an ordered list of words" })
            }
            (QuestionKind::DragAndDrop(_), UserAnswer::Slots(_)) => {}
            (_, UserAnswer::Slots(_)) => {
                return Err(SessionError::AnswerShapeMismatch { expected: "a single text answer" })
            }
            (_, UserAnswer::Text(_)) => {}
        }
        if session.answers[index].is_some() {
            warn!(index, "answer rejected, question already answered");
            return Err(SessionError::AlreadyAnswered);
        }
        if !is_answered(question, Some(&value)) {
            return Err(SessionError::IncompleteAnswer);
        }
        if let (QuestionKind::DragAndDrop(drag), UserAnswer::Slots(slots)) = (&question.kind, &value) {
            let pool = drag.word_pool();
            for word in slots.iter().flatten() {
                if !pool.contains(word) {
                    return Err(SessionError::UnknownWord(word.clone()));
                }
                let used = slots
                    .iter()
                    .filter(|s| s.as_deref() == Some(word.as_str()))
                    .count();
                if used > drag.placement_allowance(word) {
                    return Err(SessionError::WordExhausted(word.clone()));
                }
            }
        }
        let correct = is_correct(question, Some(&value));
        session.answers[index] = Some(value);
        let report = session.score();
        info!(index, correct, score = report.score, total = report.total, "answer recorded");
        Ok(())
    }

    pub fn pick_up(&self, word: &str) -> Result<DragToken, SessionError> {
        let session = match &self.state {
            State::Finished { .. } => return Err(SessionError::Finished),
            _ => self.session()?,
        };
        let QuestionKind::DragAndDrop(drag) = &session.current_question().kind else {
            return Err(SessionError::NotDragAndDrop);
        };
        if !drag.word_pool().iter().any(|w| w == word) {
            return Err(SessionError::UnknownWord(word.to_string()));
        }
        Ok(DragToken {
            question_index: session.current_index,
            word: word.to_string(),
        })
    }

    // Each blank takes one word, once.
    pub fn place(&mut self, token: DragToken, blank_index: usize) -> Result<Placement, SessionError> {
        let session = self.active_mut()?;
        let index = session.current_index;
        if token.question_index != index {
            return Err(SessionError::StaleToken);
        }
        let QuestionKind::DragAndDrop(drag) = &session.questions[index].kind else {
            return Err(SessionError::NotDragAndDrop);
        };
        let slot = &mut session.answers[index];
        if is_answered(&session.questions[index], slot.as_ref()) {
            return Err(SessionError::AlreadyAnswered);
        }
        let targets = drag.drop_targets();
        if blank_index >= targets {
            return Err(SessionError::BlankOutOfRange {
                index: blank_index,
                targets,
            });
        }
        let slots = match slot.get_or_insert_with(|| UserAnswer::empty_slots(targets)) {
            UserAnswer::Slots(slots) => slots,
            UserAnswer::Text(_) => return Err(SessionError::AlreadyAnswered),
        };
        if slots[blank_index].is_some() {
            return Err(SessionError::BlankFilled(blank_index));
        }
        let placed = slots
            .iter()
            .filter(|s| s.as_deref() == Some(token.word.as_str()))
            .count();
        if placed >= drag.placement_allowance(&token.word) {
            return Err(SessionError::WordExhausted(token.word));
        }
        slots[blank_index] = Some(token.word.clone());
        let complete = slots.iter().all(Option::is_some);
        debug!(index, blank_index, word = %token.word, complete, "word placed");
        if complete {
            let report = session.score();
            info!(index, score = report.score, total = report.total, "drag and drop answer complete");
        }
        Ok(Placement {
            blank_index,
            word: token.word,
            complete,
        })
    }

    pub fn advance(&mut self) -> Result<Navigation, SessionError> {
        let session = self.active_mut()?;
        let index = session.current_index;
        let question = session.current_question();
        let skippable = matches!(question.kind, QuestionKind::Unsupported);
        if !skippable && !is_answered(question, session.current_answer()) {
            warn!(index, "advance rejected, current question unanswered");
            return Err(SessionError::Unanswered);
        }
        if !session.is_last() {
            session.current_index += 1;
            debug!(index = session.current_index, "advanced");
            return Ok(Navigation::Moved {
                index: session.current_index,
            });
        }

        let State::Active(session) = std::mem::replace(&mut self.state, State::Loading) else {
            unreachable!("active_mut guarantees an active session");
        };
        let result = FinalResult::from_score(session.score());
        info!(
            score = result.score,
            total = result.total,
            percentage = result.percentage,
            "quiz finished"
        );
        self.state = State::Finished { session, result };
        Ok(Navigation::Finished)
    }

    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        let session = self.active_mut()?;
        if session.current_index > 0 {
            session.current_index -= 1;
            debug!(index = session.current_index, "retreated");
        }
        Ok(session.current_index)
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        let session = match &self.state {
            State::Active(session) | State::Finished { session, .. } => session.reshuffled(&mut self.rng),
            State::Loading => return Err(SessionError::NotLoaded),
            State::LoadFailed(reason) => return Err(SessionError::LoadFailed(reason.clone())),
        };
        info!(total = session.questions.len(), "quiz restarted");
        self.state = State::Active(session);
        Ok(())
    }

    pub fn view(&self) -> QuizView {
        let mut view = QuizView {
            phase: self.phase(),
            error: None,
            progress: None,
            score: None,
            question: None,
            answer: None,
            answered: false,
            correct: None,
            canonical_answer: None,
            word_pool: None,
            result: None,
        };
        match &self.state {
            State::Loading => {}
            State::LoadFailed(reason) => view.error = Some(reason.clone()),
            State::Active(session) | State::Finished { session, .. } => {
                let question = session.current_question();
                let answer = session.current_answer();
                let answered = is_answered(question, answer);
                view.progress = Some(Progress {
                    index: session.current_index,
                    total: session.questions.len(),
                });
                view.score = Some(session.score());
                view.answer = answer.cloned();
                view.answered = answered;
                if answered {
                    view.correct = Some(is_correct(question, answer));
                    view.canonical_answer = canonical_correct_answer(question);
                }
                if let QuestionKind::DragAndDrop(drag) = &question.kind {
                    view.word_pool = Some(drag.word_pool());
                }
                view.question = Some(question.clone());
            }
        }
        if let State::Finished { result, .. } = &self.state {
            view.result = Some(result.clone());
        }
        view
    }

    #[cfg(test)]
    fn active_session(&self) -> &Session {
        self.session().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Blank, ChoiceQuestion, DragAndDropQuestion, FillInTheBlankQuestion, Level};

    fn choice(topic: &str, correct: &str) -> Question {
        Question {
            topic: topic.into(),
            level: Level::Label("A1".into()),
            kind: QuestionKind::MultipleChoice(ChoiceQuestion {
                question_text: format!("{topic}?"),
                options: vec![correct.into(), "wrong".into(), "also wrong".into()],
                correct_answer: correct.into(),
            }),
        }
    }

    fn drag() -> Question {
        Question {
            topic: "drag".into(),
            level: Level::Label("A2".into()),
            kind: QuestionKind::DragAndDrop(DragAndDropQuestion {
                question_text: "Order".into(),
                blanks: vec![
                    Blank { sentence_part: "They".into(), options: vec!["run".into(), "quickly".into(), "walk".into()] },
                    Blank { sentence_part: "home.".into(), options: vec![] },
                ],
                correct_order: vec!["quickly".into(), "run".into()],
            }),
        }
    }

    fn fill() -> Question {
        Question {
            topic: "fill".into(),
            level: Level::Label("A1".into()),
            kind: QuestionKind::FillInTheBlank(FillInTheBlankQuestion {
                question_text: Some("The ___ sat.".into()),
                sentence_parts: None,
                correct_answer: "Cat".into(),
            }),
        }
    }

    fn loaded(questions: Vec<Question>) -> QuizController {
        let mut quiz = QuizController::new(Some(17));
        quiz.load(Ok(questions)).unwrap();
        quiz
    }

    fn correct_for(question: &Question) -> UserAnswer {
        match canonical_correct_answer(question).unwrap() {
            CanonicalAnswer::Text(text) => UserAnswer::Text(text),
            CanonicalAnswer::Sequence(words) => UserAnswer::Slots(words.into_iter().map(Some).collect()),
        }
    }

    #[test]
    fn empty_bank_fails_to_load() {
        let mut quiz = QuizController::new(Some(1));
        assert!(matches!(quiz.load(Ok(vec![])), Err(LoadError::Empty)));
        assert_eq!(quiz.phase(), Phase::LoadFailed);
        assert!(matches!(quiz.current_question(), Err(SessionError::LoadFailed(_))));
        assert!(matches!(quiz.restart(), Err(SessionError::LoadFailed(_))));

        quiz.load(Ok(vec![choice("recovered", "yes")])).unwrap();
        assert_eq!(quiz.phase(), Phase::Active);
    }

    #[test]
    fn nothing_works_while_loading() {
        let mut quiz = QuizController::new(None);
        assert_eq!(quiz.phase(), Phase::Loading);
        assert_eq!(quiz.advance(), Err(SessionError::NotLoaded));
        assert_eq!(quiz.submit_answer("x".into()), Err(SessionError::NotLoaded));
        assert_eq!(quiz.view().phase, Phase::Loading);
    }

    #[test]
    fn load_starts_at_first_question_with_no_answers() {
        let quiz = loaded(vec![choice("a", "1"), choice("b", "2"), choice("c", "3")]);
        assert_eq!(quiz.progress().unwrap(), Progress { index: 0, total: 3 });
        assert_eq!(quiz.score().unwrap(), ScoreReport { score: 0, total: 3 });
        assert!(quiz.active_session().answers().iter().all(Option::is_none));
        assert_eq!(quiz.current_answer().unwrap(), None);
    }

    #[test]
    fn correct_choice_scores() {
        let mut quiz = loaded(vec![Question {
            topic: "geo".into(),
            level: Level::Label("A1".into()),
            kind: QuestionKind::MultipleChoice(ChoiceQuestion {
                question_text: "Capital of France?".into(),
                options: vec!["Paris".into(), "London".into(), "Berlin".into()],
                correct_answer: "Paris".into(),
            }),
        }]);
        quiz.submit_answer("Paris".into()).unwrap();
        assert!(quiz.is_current_answered().unwrap());
        assert!(quiz.is_current_correct().unwrap());
        assert_eq!(quiz.score().unwrap().score, 1);
    }

    #[test]
    fn first_answer_wins() {
        let mut quiz = loaded(vec![choice("a", "X")]);
        quiz.submit_answer("X".into()).unwrap();
        assert_eq!(quiz.submit_answer("Y".into()), Err(SessionError::AlreadyAnswered));
        assert_eq!(quiz.current_answer().unwrap(), Some(&UserAnswer::Text("X".into())));
    }

    #[test]
    fn blank_and_mismatched_answers_are_rejected() {
        let mut quiz = loaded(vec![fill()]);
        assert_eq!(quiz.submit_answer("   ".into()), Err(SessionError::IncompleteAnswer));
        assert!(matches!(
            quiz.submit_answer(UserAnswer::Slots(vec![Some("cat".into())])),
            Err(SessionError::AnswerShapeMismatch { .. })
        ));
        assert_eq!(quiz.current_answer().unwrap(), None);
        quiz.submit_answer("  cat ".into()).unwrap();
        assert!(quiz.is_current_correct().unwrap());
    }

    #[test]
    fn advance_refuses_unanswered_question() {
        let mut quiz = loaded(vec![choice("a", "1"), choice("b", "2")]);
        assert_eq!(quiz.advance(), Err(SessionError::Unanswered));
        assert_eq!(quiz.progress().unwrap().index, 0);
        assert_eq!(quiz.phase(), Phase::Active);
    }

    #[test]
    fn advance_moves_then_finishes() {
        let mut quiz = loaded(vec![choice("a", "1"), choice("b", "2")]);
        let first = correct_for(quiz.current_question().unwrap());
        quiz.submit_answer(first).unwrap();
        assert_eq!(quiz.advance(), Ok(Navigation::Moved { index: 1 }));

        assert_eq!(quiz.advance(), Err(SessionError::Unanswered));
        quiz.submit_answer("wrong".into()).unwrap();
        assert_eq!(quiz.advance(), Ok(Navigation::Finished));
        assert_eq!(quiz.phase(), Phase::Finished);

        let result = quiz.final_result().unwrap();
        assert_eq!((result.score, result.total, result.percentage), (1, 2, 50));
        assert_eq!(result.band, FeedbackBand::Fair);
        assert_eq!(quiz.advance(), Err(SessionError::Finished));
        assert_eq!(quiz.retreat(), Err(SessionError::Finished));
        assert_eq!(quiz.submit_answer("x".into()), Err(SessionError::Finished));
    }

    #[test]
    fn retreat_keeps_answers_and_stops_at_zero() {
        let mut quiz = loaded(vec![choice("a", "1"), choice("b", "2")]);
        assert_eq!(quiz.retreat(), Ok(0));
        let answer = correct_for(quiz.current_question().unwrap());
        quiz.submit_answer(answer.clone()).unwrap();
        quiz.advance().unwrap();
        assert_eq!(quiz.retreat(), Ok(0));
        assert_eq!(quiz.current_answer().unwrap(), Some(&answer));
        assert_eq!(quiz.submit_answer("other".into()), Err(SessionError::AlreadyAnswered));
        assert_eq!(quiz.advance(), Ok(Navigation::Moved { index: 1 }));
    }

    #[test]
    fn unsupported_question_can_be_skipped() {
        let mut quiz = loaded(vec![Question {
            topic: "odd".into(),
            level: Level::default(),
            kind: QuestionKind::Unsupported,
        }]);
        assert_eq!(quiz.submit_answer("x".into()), Err(SessionError::Unsupported));
        assert!(!quiz.is_current_answered().unwrap());
        assert_eq!(quiz.advance(), Ok(Navigation::Finished));
        assert_eq!(quiz.final_result().unwrap().score, 0);
    }

    #[test]
    fn seven_of_ten_is_good() {
        let questions: Vec<Question> = (0..10).map(|i| choice(&format!("q{i}"), "right")).collect();
        let mut quiz = loaded(questions);
        for i in 0..10 {
            let answer = if i < 7 { "right" } else { "wrong" };
            quiz.submit_answer(answer.into()).unwrap();
            quiz.advance().unwrap();
        }
        assert_eq!(quiz.score().unwrap(), ScoreReport { score: 7, total: 10 });
        let result = quiz.final_result().unwrap();
        assert_eq!(result.percentage, 70);
        assert_eq!(result.band, FeedbackBand::Good);
        assert!(result.message.starts_with("Good job"));
    }

    #[test]
    fn score_is_stable_without_new_answers() {
        let mut quiz = loaded(vec![choice("a", "1"), choice("b", "2")]);
        quiz.submit_answer("1".into()).unwrap();
        assert_eq!(quiz.score().unwrap(), quiz.score().unwrap());
    }

    #[test]
    fn restart_resets_and_reshuffles_from_source() {
        let source: Vec<Question> = (0..8).map(|i| choice(&format!("q{i}"), "right")).collect();
        let mut quiz = loaded(source.clone());
        quiz.submit_answer("right".into()).unwrap();
        quiz.advance().unwrap();

        for _ in 0..2 {
            quiz.restart().unwrap();
            assert_eq!(quiz.phase(), Phase::Active);
            assert_eq!(quiz.progress().unwrap().index, 0);
            assert_eq!(quiz.score().unwrap().score, 0);
            let session = quiz.active_session();
            assert!(session.answers().iter().all(Option::is_none));
            assert_eq!(session.original_questions(), source.as_slice());
            let mut topics: Vec<_> = session.questions().iter().map(|q| q.topic.clone()).collect();
            topics.sort();
            let mut expected: Vec<_> = source.iter().map(|q| q.topic.clone()).collect();
            expected.sort();
            assert_eq!(topics, expected);
        }
    }

    #[test]
    fn restart_from_finished() {
        let mut quiz = loaded(vec![choice("a", "1")]);
        quiz.submit_answer("1".into()).unwrap();
        quiz.advance().unwrap();
        assert_eq!(quiz.phase(), Phase::Finished);
        quiz.restart().unwrap();
        assert_eq!(quiz.phase(), Phase::Active);
        assert_eq!(quiz.final_result(), Err(SessionError::NotFinished));
    }

    #[test]
    fn drag_and_drop_order_matters() {
        let mut quiz = loaded(vec![drag()]);
        quiz.submit_answer(UserAnswer::Slots(vec![Some("run".into()), Some("quickly".into())]))
            .unwrap();
        assert!(!quiz.is_current_correct().unwrap());

        let mut quiz = loaded(vec![drag()]);
        quiz.submit_answer(UserAnswer::Slots(vec![Some("quickly".into()), Some("run".into())]))
            .unwrap();
        assert!(quiz.is_current_correct().unwrap());
    }

    #[test]
    fn placement_fills_blanks_once() {
        let mut quiz = loaded(vec![drag()]);
        let token = quiz.pick_up("quickly").unwrap();
        let placed = quiz.place(token, 0).unwrap();
        assert!(!placed.complete);
        assert!(!quiz.is_current_answered().unwrap());
        assert_eq!(quiz.advance(), Err(SessionError::Unanswered));

        let again = quiz.pick_up("walk").unwrap();
        assert_eq!(quiz.place(again, 0), Err(SessionError::BlankFilled(0)));
        let reuse = quiz.pick_up("quickly").unwrap();
        assert_eq!(quiz.place(reuse, 1), Err(SessionError::WordExhausted("quickly".into())));
        let far = quiz.pick_up("run").unwrap();
        assert_eq!(
            quiz.place(far.clone(), 5),
            Err(SessionError::BlankOutOfRange { index: 5, targets: 2 })
        );
        assert!(quiz.place(far, 1).unwrap().complete);

        assert!(quiz.is_current_correct().unwrap());
        assert_eq!(quiz.score().unwrap().score, 1);
        let late = quiz.pick_up("walk").unwrap();
        assert_eq!(quiz.place(late, 1), Err(SessionError::AlreadyAnswered));
        assert_eq!(
            quiz.submit_answer(UserAnswer::Slots(vec![Some("walk".into()), Some("walk".into())])),
            Err(SessionError::AlreadyAnswered)
        );
    }

    #[test]
    fn whole_drag_answer_follows_placement_rules() {
        let mut quiz = loaded(vec![drag()]);
        assert_eq!(
            quiz.submit_answer(UserAnswer::Slots(vec![Some("fly".into()), Some("run".into())])),
            Err(SessionError::UnknownWord("fly".into()))
        );
        assert_eq!(
            quiz.submit_answer(UserAnswer::Slots(vec![Some("run".into()), Some("run".into())])),
            Err(SessionError::WordExhausted("run".into()))
        );
        assert_eq!(quiz.current_answer().unwrap(), None);
        quiz.submit_answer(UserAnswer::Slots(vec![Some("walk".into()), Some("run".into())]))
            .unwrap();
        assert!(!quiz.is_current_correct().unwrap());
    }

    #[test]
    fn pick_up_checks_pool_and_question() {
        let mut quiz = loaded(vec![choice("a", "1"), drag()]);
        if quiz.current_question().unwrap().topic == "drag" {
            quiz.submit_answer(UserAnswer::Slots(vec![Some("run".into()), Some("walk".into())]))
                .unwrap();
            quiz.advance().unwrap();
        }
        assert_eq!(quiz.pick_up("run"), Err(SessionError::NotDragAndDrop));
        quiz.submit_answer("1".into()).unwrap();

        if quiz.progress().unwrap().index == 0 {
            quiz.advance().unwrap();
            assert_eq!(quiz.pick_up("teleport"), Err(SessionError::UnknownWord("teleport".into())));
            let token = quiz.pick_up("run").unwrap();
            quiz.retreat().unwrap();
            assert_eq!(quiz.place(token, 0), Err(SessionError::StaleToken));
        }
    }

    #[test]
    fn view_reveals_answer_only_after_answering() {
        let mut quiz = loaded(vec![fill()]);
        let view = quiz.view();
        assert_eq!(view.phase, Phase::Active);
        assert!(!view.answered);
        assert!(view.canonical_answer.is_none());

        quiz.submit_answer("dog".into()).unwrap();
        let view = quiz.view();
        assert_eq!(view.correct, Some(false));
        assert_eq!(view.canonical_answer, Some(CanonicalAnswer::Text("Cat".into())));
    }

    #[test]
    fn banding_thresholds() {
        assert_eq!(FeedbackBand::from_percentage(100), FeedbackBand::Excellent);
        assert_eq!(FeedbackBand::from_percentage(90), FeedbackBand::Excellent);
        assert_eq!(FeedbackBand::from_percentage(89), FeedbackBand::Good);
        assert_eq!(FeedbackBand::from_percentage(70), FeedbackBand::Good);
        assert_eq!(FeedbackBand::from_percentage(69), FeedbackBand::Fair);
        assert_eq!(FeedbackBand::from_percentage(50), FeedbackBand::Fair);
        assert_eq!(FeedbackBand::from_percentage(49), FeedbackBand::NeedsPractice);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }
}
