pub mod catalog;
pub mod codec;
pub mod error;
pub mod scoring;
pub mod session;

pub use catalog::QuestionCatalog;
pub use session::QuestionSession;

/// Number of points on the agree/disagree scale. Responses are `0..LIKERT_POINTS`.
pub const LIKERT_POINTS: u8 = 6;

/// One of the two opposing outcomes a questionnaire resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Pole {
    First,
    Second,
}

impl Pole {
    pub fn index(self) -> usize {
        match self {
            Pole::First => 0,
            Pole::Second => 1,
        }
    }
}

impl TryFrom<u8> for Pole {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Pole::First),
            1 => Ok(Pole::Second),
            other => Err(format!("category must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Pole> for u8 {
    fn from(pole: Pole) -> Self {
        pole.index() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionDef {
    pub text: String,
    pub category: Pole,
}

/// Title, paragraph and picture shown for a verdict.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResultDef {
    pub title: String,
    pub text: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Questionnaire {
    /// Position in the catalog. Assigned on load, never read from the catalog file.
    #[serde(skip)]
    pub id: usize,
    pub title: String,
    pub short_title: String,
    pub description: String,
    /// Canonical order; a question's index here is its absolute id.
    pub questions: Vec<QuestionDef>,
    pub results: [ResultDef; 2],
}

impl Questionnaire {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn result(&self, pole: Pole) -> &ResultDef {
        &self.results[pole.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub pole: Pole,
}
