//! Plain-text save files.
//!
//! ```text
//! <questionnaireId>
//! <absoluteId>,<value>
//! ...
//! ```
//!
//! Question lines appear in display order. `value` is `-1` for an unanswered
//! question and `0..=5` otherwise.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::quiz::error::{CodecError, SaveFileError};
use crate::quiz::{QuestionCatalog, QuestionSession, Questionnaire, LIKERT_POINTS};

const UNANSWERED: i64 = -1;

pub fn save(session: &QuestionSession, questionnaire: &Questionnaire) -> String {
    debug_assert_eq!(session.questionnaire_id(), questionnaire.id);

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", questionnaire.id);
    for &absolute_id in session.order() {
        let value = session.responses()[absolute_id].map_or(UNANSWERED, i64::from);
        let _ = writeln!(out, "{},{}", absolute_id, value);
    }
    out
}

pub fn load(text: &str, catalog: &QuestionCatalog) -> Result<QuestionSession, CodecError> {
    let mut lines = text.lines();

    let header = lines.next().unwrap_or_default();
    let id = parse_int(header).ok_or_else(|| CodecError::MalformedHeader {
        header: header.to_owned(),
    })?;

    let questionnaire = usize::try_from(id)
        .ok()
        .and_then(|id| catalog.get(id).ok())
        .ok_or(CodecError::UnknownQuestionnaire { id })?;
    let count = questionnaire.question_count();

    let body: Vec<&str> = lines.collect();
    if body.len() != count {
        return Err(CodecError::WrongQuestionCount {
            expected: count,
            found: body.len(),
        });
    }

    // The header is line 1, so question lines start at 2.
    let pairs = body
        .iter()
        .enumerate()
        .map(|(i, line)| parse_line(line).ok_or_else(|| malformed(i + 2, line)))
        .collect::<Result<Vec<(i64, i64)>, CodecError>>()?;

    let mut order = Vec::with_capacity(count);
    let mut responses: Vec<Option<u8>> = vec![None; count];
    for (i, &(absolute_id, value)) in pairs.iter().enumerate() {
        let in_range = (0..count as i64).contains(&absolute_id)
            && (UNANSWERED..i64::from(LIKERT_POINTS)).contains(&value);
        if !in_range {
            return Err(CodecError::ValueOutOfRange {
                line: i + 2,
                absolute_id,
                value,
            });
        }
        // Both casts are in range after the check above.
        order.push(absolute_id as usize);
        responses[absolute_id as usize] = u8::try_from(value).ok();
    }

    let mut seen = vec![0usize; count];
    for &absolute_id in &order {
        seen[absolute_id] += 1;
    }
    if let Some((absolute_id, &occurrences)) = seen.iter().enumerate().find(|&(_, &n)| n != 1) {
        return Err(CodecError::IncompleteOrDuplicateCoverage {
            absolute_id,
            occurrences,
        });
    }

    Ok(QuestionSession::restore(questionnaire.id, order, responses))
}

fn parse_line(line: &str) -> Option<(i64, i64)> {
    let mut fields = line.split(',');
    let absolute_id = parse_int(fields.next()?)?;
    let value = parse_int(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some((absolute_id, value))
}

/// Parses an integer of any size. Values beyond `i64` saturate so they fail
/// the range checks instead of the shape checks.
fn parse_int(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn malformed(line: usize, content: &str) -> CodecError {
    CodecError::MalformedLine {
        line,
        content: content.to_owned(),
    }
}

/// Appends `.txt` unless the path already ends with it.
pub fn with_txt_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.as_os_str().to_string_lossy().ends_with(".txt") {
        return path.to_path_buf();
    }
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".txt");
    PathBuf::from(raw)
}

/// Writes the session next to `path`, adding `.txt` when missing.
/// Returns the path actually written.
pub fn save_to_path(
    path: impl AsRef<Path>,
    session: &QuestionSession,
    questionnaire: &Questionnaire,
) -> Result<PathBuf, SaveFileError> {
    let path = with_txt_extension(path);
    fs::write(&path, save(session, questionnaire))?;
    info!(
        "Saved questionnaire {} progress ({}/{}) to {}",
        questionnaire.id,
        session.progress(),
        session.len(),
        path.display()
    );
    Ok(path)
}

pub fn load_from_path(
    path: impl AsRef<Path>,
    catalog: &QuestionCatalog,
) -> Result<QuestionSession, SaveFileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    match load(&text, catalog) {
        Ok(session) => {
            info!(
                "Loaded questionnaire {} progress ({}/{}) from {}",
                session.questionnaire_id(),
                session.progress(),
                session.len(),
                path.display()
            );
            Ok(session)
        }
        Err(err) => {
            warn!("Rejected savefile {}: {}", path.display(), err);
            Err(err.into())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::env;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::{fixture, rstest};

    use super::*;

    static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    pub(crate) struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        pub(crate) fn new(prefix: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = env::temp_dir();
            path.push(format!(
                "versus-quiz-{prefix}-{}-{nanos}-{counter}",
                std::process::id()
            ));
            fs::create_dir_all(&path).unwrap();
            Self { path }
        }

        pub(crate) fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    /// Bundled questionnaires plus a two-question one at id 3.
    #[fixture]
    fn catalog() -> QuestionCatalog {
        let mut questionnaires: Vec<Questionnaire> =
            QuestionCatalog::bundled().unwrap().iter().cloned().collect();
        questionnaires.push(crate::quiz::session::tests::questionnaire(&[
            crate::quiz::Pole::First,
            crate::quiz::Pole::Second,
        ]));
        QuestionCatalog::new(questionnaires).unwrap()
    }

    const PAIR: usize = 3;

    #[rstest]
    fn save_writes_header_then_display_order(catalog: QuestionCatalog) {
        let session = QuestionSession::restore(PAIR, vec![1, 0], vec![Some(4), None]);
        let text = save(&session, catalog.get(PAIR).unwrap());
        assert_eq!(text, "3\n1,-1\n0,4\n");
    }

    #[rstest]
    #[case::fresh(&[])]
    #[case::partial(&[(0, 5), (3, 0), (7, 2)])]
    #[case::changed_answer(&[(1, 1), (1, 4), (2, 3)])]
    fn round_trip_restores_order_and_responses(
        catalog: QuestionCatalog,
        #[case] answers: &[(usize, u8)],
    ) {
        let coast = catalog.get(0).unwrap();
        let mut session = QuestionSession::start(coast, &mut StdRng::seed_from_u64(8));
        for &(position, value) in answers {
            session.record_response(position, value).unwrap();
        }

        let restored = load(&save(&session, coast), &catalog).unwrap();
        assert_eq!(restored, session);
    }

    #[rstest]
    fn round_trip_complete_session(catalog: QuestionCatalog) {
        let wine = catalog.get(2).unwrap();
        let mut session = QuestionSession::start(wine, &mut StdRng::seed_from_u64(21));
        for position in 0..session.len() {
            session.record_response(position, (position % 6) as u8).unwrap();
        }

        let restored = load(&save(&session, wine), &catalog).unwrap();
        assert_eq!(restored, session);
        assert!(restored.is_complete());
    }

    #[rstest]
    fn load_restores_file_order_and_progress(catalog: QuestionCatalog) {
        let session = load("3\n1,2\n0,-1\n", &catalog).unwrap();
        assert_eq!(session.questionnaire_id(), PAIR);
        assert_eq!(session.order(), &[1, 0]);
        assert_eq!(session.responses(), &[None, Some(2)]);
        assert_eq!(session.progress(), 1);
    }

    #[rstest]
    fn load_accepts_crlf_and_padding(catalog: QuestionCatalog) {
        let session = load(" 3 \r\n0 , 5\r\n1,0\r\n", &catalog).unwrap();
        assert_eq!(session.responses(), &[Some(5), Some(0)]);
        assert!(session.is_complete());
    }

    #[rstest]
    #[case::empty("", CodecError::MalformedHeader { header: String::new() })]
    #[case::text_header("abc\n0,1\n1,2\n", CodecError::MalformedHeader { header: "abc".into() })]
    #[case::header_with_fields("3,1\n0,1\n1,2\n", CodecError::MalformedHeader { header: "3,1".into() })]
    #[case::unknown("9\n0,1\n1,2\n", CodecError::UnknownQuestionnaire { id: 9 })]
    #[case::negative("-1\n0,1\n1,2\n", CodecError::UnknownQuestionnaire { id: -1 })]
    #[case::too_few("3\n0,1\n", CodecError::WrongQuestionCount { expected: 2, found: 1 })]
    #[case::too_many("3\n0,1\n1,2\n1,2\n", CodecError::WrongQuestionCount { expected: 2, found: 3 })]
    #[case::one_field("3\n0\n1,2\n", CodecError::MalformedLine { line: 2, content: "0".into() })]
    #[case::three_fields("3\n0,1\n1,2,3\n", CodecError::MalformedLine { line: 3, content: "1,2,3".into() })]
    #[case::not_a_number("3\n0,x\n1,2\n", CodecError::MalformedLine { line: 2, content: "0,x".into() })]
    #[case::value_too_high("3\n0,6\n1,2\n", CodecError::ValueOutOfRange { line: 2, absolute_id: 0, value: 6 })]
    #[case::value_too_low("3\n0,1\n1,-2\n", CodecError::ValueOutOfRange { line: 3, absolute_id: 1, value: -2 })]
    #[case::id_too_high("3\n0,1\n2,2\n", CodecError::ValueOutOfRange { line: 3, absolute_id: 2, value: 2 })]
    #[case::huge_header("99999999999999999999\n0,1\n1,2\n", CodecError::UnknownQuestionnaire { id: i64::MAX })]
    #[case::huge_negative_header("-99999999999999999999\n0,1\n1,2\n", CodecError::UnknownQuestionnaire { id: i64::MIN })]
    #[case::huge_value("3\n0,1\n1,99999999999999999999\n", CodecError::ValueOutOfRange { line: 3, absolute_id: 1, value: i64::MAX })]
    #[case::huge_id("3\n-99999999999999999999,1\n1,2\n", CodecError::ValueOutOfRange { line: 2, absolute_id: i64::MIN, value: 1 })]
    #[case::duplicate("3\n0,3\n0,2\n", CodecError::IncompleteOrDuplicateCoverage { absolute_id: 0, occurrences: 2 })]
    fn load_rejects(catalog: QuestionCatalog, #[case] text: &str, #[case] expected: CodecError) {
        assert_eq!(load(text, &catalog), Err(expected));
    }

    #[rstest]
    fn rules_are_checked_in_order(catalog: QuestionCatalog) {
        // Out-of-range value on line 2 loses to a malformed line further down.
        assert!(matches!(
            load("3\n0,9\nbad\n", &catalog),
            Err(CodecError::MalformedLine { line: 3, .. })
        ));
        // A duplicate loses to an out-of-range value further down.
        assert!(matches!(
            load("3\n0,1\n0,9\n", &catalog),
            Err(CodecError::ValueOutOfRange { line: 3, .. })
        ));
    }

    #[rstest]
    #[case("progress", "progress.txt")]
    #[case("progress.txt", "progress.txt")]
    #[case("notes.dat", "notes.dat.txt")]
    #[case("dir/quiz", "dir/quiz.txt")]
    #[case(".txt", ".txt")]
    #[case("dir/.txt", "dir/.txt")]
    #[case("notes.txt.bak", "notes.txt.bak.txt")]
    fn txt_extension_is_appended(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(with_txt_extension(input), PathBuf::from(expected));
    }

    #[rstest]
    fn save_and_load_through_files(catalog: QuestionCatalog) {
        let tmp = TempDir::new("codec");
        let dog = catalog.get(1).unwrap();
        let mut session = QuestionSession::start(dog, &mut StdRng::seed_from_u64(1));
        session.record_response(4, 3).unwrap();

        let written = save_to_path(tmp.path().join("mine"), &session, dog).unwrap();
        assert_eq!(written, tmp.path().join("mine.txt"));

        let restored = load_from_path(&written, &catalog).unwrap();
        assert_eq!(restored, session);
    }

    #[rstest]
    fn load_from_path_surfaces_codec_errors(catalog: QuestionCatalog) {
        let tmp = TempDir::new("codec-bad");
        let path = tmp.path().join("bad.txt");
        fs::write(&path, "abc\n0,1\n1,2\n").unwrap();

        let err = load_from_path(&path, &catalog).unwrap_err();
        assert!(matches!(
            err,
            SaveFileError::Codec(CodecError::MalformedHeader { .. })
        ));

        let missing = load_from_path(tmp.path().join("missing.txt"), &catalog).unwrap_err();
        assert!(matches!(missing, SaveFileError::Io(_)));
    }
}
