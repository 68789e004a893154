use log::{debug, info};
use rand::Rng;

use crate::quiz::error::ScoringError;
use crate::quiz::{Pole, QuestionSession, Questionnaire, Verdict};

/// Points collected by each pole, indexed by `Pole::index`.
pub fn points(
    session: &QuestionSession,
    questionnaire: &Questionnaire,
) -> Result<[u32; 2], ScoringError> {
    if session.questionnaire_id() != questionnaire.id
        || session.len() != questionnaire.question_count()
    {
        return Err(ScoringError::QuestionnaireMismatch {
            session: session.questionnaire_id(),
            questionnaire: questionnaire.id,
        });
    }
    if !session.is_complete() {
        return Err(ScoringError::IncompleteAnswers {
            answered: session.progress(),
            total: session.len(),
        });
    }

    let mut tally = [0u32; 2];
    for (question, response) in questionnaire.questions.iter().zip(session.responses()) {
        // A complete session has no unanswered entries left.
        let value = response.unwrap_or_default();
        tally[question.category.index()] += u32::from(value);
    }
    Ok(tally)
}

/// Scores a complete session. Equal tallies are broken by a coin flip on `rng`.
pub fn tally<R: Rng + ?Sized>(
    session: &QuestionSession,
    questionnaire: &Questionnaire,
    rng: &mut R,
) -> Result<Verdict, ScoringError> {
    let [first, second] = points(session, questionnaire)?;

    let pole = if first > second {
        Pole::First
    } else if second > first {
        Pole::Second
    } else if rng.gen_bool(0.5) {
        debug!("Tie at {} points, coin flip chose the second pole", first);
        Pole::Second
    } else {
        debug!("Tie at {} points, coin flip chose the first pole", first);
        Pole::First
    };

    info!(
        "Questionnaire {} scored {} to {}: {:?}",
        questionnaire.id, first, second, pole
    );
    Ok(Verdict { pole })
}
