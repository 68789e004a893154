use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("questionnaire id {id} out of range (catalog holds {size})")]
    OutOfRange { id: usize, size: usize },
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("catalog contains no questionnaires")]
    Empty,

    #[error("questionnaire \"{title}\" has no questions")]
    NoQuestions { title: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("display position {position} out of range (session has {len} questions)")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("invalid response value: {value}. min: 0, max: 5")]
    InvalidResponse { value: u8 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("not all questions have been answered yet ({answered} of {total})")]
    IncompleteAnswers { answered: usize, total: usize },

    #[error("session belongs to questionnaire {session}, not {questionnaire}")]
    QuestionnaireMismatch { session: usize, questionnaire: usize },
}

/// Reasons a save file is rejected, in the order they are checked.
///
/// Line numbers are 1-based and count the header as line 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("savefile header is not an integer: {header:?}")]
    MalformedHeader { header: String },

    #[error("savefile refers to nonexistent questionnaire {id}")]
    UnknownQuestionnaire { id: i64 },

    #[error("savefile has {found} question lines, questionnaire has {expected}")]
    WrongQuestionCount { expected: usize, found: usize },

    #[error("line {line}: expected `absoluteId,value`, got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: question {absolute_id} with value {value} out of range")]
    ValueOutOfRange {
        line: usize,
        absolute_id: i64,
        value: i64,
    },

    #[error("question {absolute_id} appears {occurrences} times, expected exactly once")]
    IncompleteOrDuplicateCoverage {
        absolute_id: usize,
        occurrences: usize,
    },
}

#[derive(Debug, Error)]
pub enum SaveFileError {
    #[error("savefile i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
