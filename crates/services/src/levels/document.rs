use serde::Deserialize;

use quiz_core::model::{Level, LevelNumber, Question};

use crate::error::LevelLoadError;

/// Published shape of a level file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    pub level: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub questions: Vec<QuestionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl LevelDocument {
    /// Parse and validate raw JSON served for `requested`.
    ///
    /// # Errors
    ///
    /// Returns `LevelLoadError::Malformed` if the JSON does not parse or the
    /// document fails validation.
    pub fn parse(requested: LevelNumber, raw: &str) -> Result<Level, LevelLoadError> {
        let document: Self =
            serde_json::from_str(raw).map_err(|err| LevelLoadError::Malformed {
                level: requested,
                reason: err.to_string(),
            })?;
        document.into_level(requested)
    }

    /// # Errors
    ///
    /// Returns `LevelLoadError::Malformed` if the document describes another
    /// level, has no questions, or contains an invalid question.
    pub fn into_level(self, requested: LevelNumber) -> Result<Level, LevelLoadError> {
        let malformed = |reason: String| LevelLoadError::Malformed {
            level: requested,
            reason,
        };

        if self.level != requested.value() {
            return Err(malformed(format!(
                "document describes level {}",
                self.level
            )));
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                Question::new(q.question, q.options, q.correct_index)
                    .map_err(|err| malformed(format!("question {}: {err}", i + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Level::new(requested, self.title, self.summary, questions)
            .map_err(|err| malformed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u32) -> LevelNumber {
        LevelNumber::new(n).unwrap()
    }

    const LEVEL_ONE: &str = r#"{
        "level": 1,
        "title": "Foundations",
        "summary": "What the assembly is.",
        "questions": [
            { "question": "First?", "options": ["a", "b"], "correctIndex": 1 },
            { "question": "Second?", "options": ["a", "b", "c"], "correctIndex": 0 }
        ]
    }"#;

    #[test]
    fn parses_published_shape() {
        let parsed = LevelDocument::parse(level(1), LEVEL_ONE).unwrap();
        assert_eq!(parsed.title(), "Foundations");
        assert_eq!(parsed.summary(), Some("What the assembly is."));
        assert_eq!(parsed.total(), 2);
        assert_eq!(parsed.questions()[0].correct_index(), 1);
        assert_eq!(parsed.selections(), vec![None, None]);
    }

    #[test]
    fn summary_and_title_are_optional() {
        let raw = r#"{"level": 2, "questions": [{"question": "Q", "options": ["x", "y"], "correctIndex": 0}]}"#;
        let parsed = LevelDocument::parse(level(2), raw).unwrap();
        assert_eq!(parsed.title(), "");
        assert_eq!(parsed.summary(), None);
    }

    #[test]
    fn rejects_mismatched_or_invalid_documents() {
        assert!(matches!(
            LevelDocument::parse(level(2), LEVEL_ONE),
            Err(LevelLoadError::Malformed { .. })
        ));
        assert!(matches!(
            LevelDocument::parse(level(1), "<html>404</html>"),
            Err(LevelLoadError::Malformed { .. })
        ));

        let empty = r#"{"level": 1, "questions": []}"#;
        assert!(LevelDocument::parse(level(1), empty).is_err());

        let bad_index = r#"{"level": 1, "questions": [{"question": "Q", "options": ["x", "y"], "correctIndex": 2}]}"#;
        let err = LevelDocument::parse(level(1), bad_index).unwrap_err();
        assert_eq!(err.level(), level(1));
        assert!(err.to_string().contains("question 1"));
    }
}
