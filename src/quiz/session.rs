use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::error::SessionError;
use crate::quiz::{QuestionDef, Questionnaire, LIKERT_POINTS};

/// State of one attempt at a questionnaire.
///
/// `responses` is indexed by absolute question id, `order` maps display
/// positions to absolute ids. `answered` always equals the number of
/// `Some` entries in `responses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSession {
    questionnaire_id: usize,
    order: Vec<usize>,
    responses: Vec<Option<u8>>,
    answered: usize,
}

impl QuestionSession {
    /// Fresh attempt with the questions shuffled into a random display order.
    pub fn start<R: Rng + ?Sized>(questionnaire: &Questionnaire, rng: &mut R) -> Self {
        let count = questionnaire.question_count();
        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(rng);

        debug!(
            "Started questionnaire {} with {} questions, order {:?}",
            questionnaire.id, count, order
        );

        Self {
            questionnaire_id: questionnaire.id,
            order,
            responses: vec![None; count],
            answered: 0,
        }
    }

    /// Rebuilds a session from already validated parts.
    ///
    /// `order` must be a permutation of `0..responses.len()`.
    pub(crate) fn restore(
        questionnaire_id: usize,
        order: Vec<usize>,
        responses: Vec<Option<u8>>,
    ) -> Self {
        debug_assert_eq!(order.len(), responses.len());
        let answered = responses.iter().filter(|r| r.is_some()).count();
        Self {
            questionnaire_id,
            order,
            responses,
            answered,
        }
    }

    /// Stores `value` for the question shown at `position`.
    ///
    /// Returns `true` when this is the question's first answer, i.e. when
    /// progress went up by one.
    pub fn record_response(&mut self, position: usize, value: u8) -> Result<bool, SessionError> {
        if value >= LIKERT_POINTS {
            return Err(SessionError::InvalidResponse { value });
        }
        let absolute_id = self.absolute_id(position)?;

        let first_answer = self.responses[absolute_id].replace(value).is_none();
        if first_answer {
            self.answered += 1;
            debug!(
                "Question {} answered for the first time ({}/{})",
                absolute_id,
                self.answered,
                self.len()
            );
        }
        Ok(first_answer)
    }

    /// Clears every response. The display order is kept.
    pub fn reset(&mut self) {
        self.responses.iter_mut().for_each(|r| *r = None);
        self.answered = 0;
    }

    pub fn is_complete(&self) -> bool {
        self.answered == self.responses.len()
    }

    pub fn progress(&self) -> usize {
        self.answered
    }

    pub fn has_progress(&self) -> bool {
        self.answered != 0
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn questionnaire_id(&self) -> usize {
        self.questionnaire_id
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Responses indexed by absolute question id.
    pub fn responses(&self) -> &[Option<u8>] {
        &self.responses
    }

    pub fn absolute_id(&self, position: usize) -> Result<usize, SessionError> {
        self.order
            .get(position)
            .copied()
            .ok_or(SessionError::PositionOutOfRange {
                position,
                len: self.order.len(),
            })
    }

    pub fn response_at(&self, position: usize) -> Option<u8> {
        self.order
            .get(position)
            .and_then(|&absolute_id| self.responses[absolute_id])
    }

    pub fn question_at<'q>(
        &self,
        questionnaire: &'q Questionnaire,
        position: usize,
    ) -> Option<&'q QuestionDef> {
        self.order
            .get(position)
            .and_then(|&absolute_id| questionnaire.questions.get(absolute_id))
    }
}
