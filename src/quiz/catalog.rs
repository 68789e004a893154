use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::quiz::error::{CatalogError, CatalogLoadError};
use crate::quiz::Questionnaire;

const BUNDLED_CATALOG: &str = include_str!("../../assets/questionnaires.json");

#[derive(Debug, serde::Deserialize)]
struct CatalogFile {
    questionnaires: Vec<Questionnaire>,
}

/// Read-only registry of every questionnaire the application can run.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    questionnaires: Vec<Questionnaire>,
}

impl QuestionCatalog {
    /// The questionnaires shipped inside the binary.
    pub fn bundled() -> Result<Self, CatalogLoadError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        info!("Loading questionnaire catalog from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::new(file.questionnaires)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.questionnaires)
    }

    /// Builds a catalog, renumbering questionnaires by position.
    pub fn new(mut questionnaires: Vec<Questionnaire>) -> Result<Self, CatalogLoadError> {
        if questionnaires.is_empty() {
            return Err(CatalogLoadError::Empty);
        }

        for (id, questionnaire) in questionnaires.iter_mut().enumerate() {
            if questionnaire.questions.is_empty() {
                return Err(CatalogLoadError::NoQuestions {
                    title: questionnaire.short_title.clone(),
                });
            }
            questionnaire.id = id;
            debug!(
                "Questionnaire {} \"{}\": {} questions",
                id,
                questionnaire.short_title,
                questionnaire.questions.len()
            );
        }

        info!("Catalog loaded with {} questionnaires", questionnaires.len());
        Ok(Self { questionnaires })
    }

    pub fn size(&self) -> usize {
        self.questionnaires.len()
    }

    pub fn short_titles(&self) -> Vec<&str> {
        self.iter().map(|q| q.short_title.as_str()).collect()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.iter().map(|q| q.description.as_str()).collect()
    }

    pub fn get(&self, id: usize) -> Result<&Questionnaire, CatalogError> {
        self.questionnaires.get(id).ok_or(CatalogError::OutOfRange {
            id,
            size: self.questionnaires.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Questionnaire> {
        self.questionnaires.iter()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::quiz::Pole;

    #[fixture]
    fn catalog() -> QuestionCatalog {
        QuestionCatalog::bundled().unwrap()
    }

    #[rstest]
    fn bundled_catalog_holds_the_three_quizzes(catalog: QuestionCatalog) {
        assert_eq!(catalog.size(), 3);
        assert_eq!(
            catalog.short_titles(),
            vec![
                "East Coast vs West Coast",
                "Cat Person vs Dog Person",
                "Beer Person vs Wine Person",
            ]
        );
        assert_eq!(catalog.descriptions().len(), 3);
    }

    #[rstest]
    fn every_questionnaire_is_well_formed(catalog: QuestionCatalog) {
        for (id, questionnaire) in catalog.iter().enumerate() {
            assert_eq!(questionnaire.id, id);
            assert!(!questionnaire.questions.is_empty());
            assert_eq!(questionnaire.results.len(), 2);
            for result in &questionnaire.results {
                assert!(!result.title.is_empty());
                assert!(!result.text.is_empty());
                assert!(!result.image.is_empty());
            }
        }
    }

    #[rstest]
    #[case(0, 18)]
    #[case(1, 20)]
    #[case(2, 12)]
    fn question_counts(catalog: QuestionCatalog, #[case] id: usize, #[case] expected: usize) {
        assert_eq!(catalog.get(id).unwrap().question_count(), expected);
    }

    #[rstest]
    fn coast_quiz_splits_nine_and_nine(catalog: QuestionCatalog) {
        let coast = catalog.get(0).unwrap();
        let west = coast
            .questions
            .iter()
            .filter(|q| q.category == Pole::First)
            .count();
        assert_eq!(west, 9);
        assert!(coast.questions[..9].iter().all(|q| q.category == Pole::First));
        assert!(coast.questions[9..].iter().all(|q| q.category == Pole::Second));
    }

    #[rstest]
    fn get_out_of_range(catalog: QuestionCatalog) {
        assert_eq!(
            catalog.get(3).unwrap_err(),
            CatalogError::OutOfRange { id: 3, size: 3 }
        );
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = QuestionCatalog::from_json(r#"{"questionnaires": []}"#).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Empty));
    }

    #[test]
    fn rejects_questionnaire_without_questions() {
        let json = r#"{"questionnaires": [{
            "title": "Empty", "short_title": "Empty", "description": "",
            "questions": [],
            "results": [
                {"title": "a", "text": "a", "image": "a.jpg"},
                {"title": "b", "text": "b", "image": "b.jpg"}
            ]
        }]}"#;
        let err = QuestionCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogLoadError::NoQuestions { title } if title == "Empty"));
    }

    #[test]
    fn rejects_wrong_number_of_results() {
        let json = r#"{"questionnaires": [{
            "title": "One", "short_title": "One", "description": "",
            "questions": [{"text": "q", "category": 0}],
            "results": [{"title": "a", "text": "a", "image": "a.jpg"}]
        }]}"#;
        let err = QuestionCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Json(_)));
    }
}
