//! Core data model types for faroetest.
//!
//! These are the fundamental types that the entire faroetest system uses
//! to represent test categories, test cases, and scored results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::statistics::is_correct;

/// One of the evaluation domains.
///
/// Variants are declared in run order, so ordered collections keyed by
/// `Category` iterate the way `faroetest run` executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MorphologicalUnderstanding,
    TranslationAccuracy,
    GrammarRuleApplication,
}

impl Category {
    /// All categories, in run order.
    pub const ALL: [Category; 3] = [
        Category::MorphologicalUnderstanding,
        Category::TranslationAccuracy,
        Category::GrammarRuleApplication,
    ];

    /// Top-level JSON key of the fixture file, also used to name results files.
    pub fn key(self) -> &'static str {
        match self {
            Category::MorphologicalUnderstanding => "morphological_understanding",
            Category::TranslationAccuracy => "translation_accuracy",
            Category::GrammarRuleApplication => "grammar_rule_application",
        }
    }

    /// File stem of the fixture under the data directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            Category::MorphologicalUnderstanding => "test_morphological_understanding",
            Category::TranslationAccuracy => "test_translation_accuracy",
            Category::GrammarRuleApplication => "test_grammar_rules",
        }
    }

    /// Short label used on the accuracy chart.
    pub fn label(self) -> &'static str {
        match self {
            Category::MorphologicalUnderstanding => "morphological",
            Category::TranslationAccuracy => "translation",
            Category::GrammarRuleApplication => "grammar",
        }
    }

    /// Title-cased name for console output.
    pub fn title(self) -> &'static str {
        match self {
            Category::MorphologicalUnderstanding => "Morphological Understanding",
            Category::TranslationAccuracy => "Translation Accuracy",
            Category::GrammarRuleApplication => "Grammar Rule Application",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "morphological_understanding" | "morphological" | "morphology" => {
                Ok(Category::MorphologicalUnderstanding)
            }
            "translation_accuracy" | "translation" => Ok(Category::TranslationAccuracy),
            "grammar_rule_application" | "grammar" | "grammar_rules" => {
                Ok(Category::GrammarRuleApplication)
            }
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Which way a translation case goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "Faroese to English")]
    FaroeseToEnglish,
    #[serde(rename = "English to Faroese")]
    EnglishToFaroese,
}

impl Direction {
    /// Fixture field holding the text to translate.
    pub fn source_field(self) -> &'static str {
        match self {
            Direction::FaroeseToEnglish => "faroese",
            Direction::EnglishToFaroese => "english",
        }
    }

    /// Wrap source text in the translation instruction for this direction.
    pub fn prompt(self, source: &str) -> String {
        match self {
            Direction::FaroeseToEnglish => {
                format!("Translate the following Faroese sentence to English: {source}")
            }
            Direction::EnglishToFaroese => {
                format!("Translate the following English sentence to Faroese: {source}")
            }
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::FaroeseToEnglish => write!(f, "Faroese to English"),
            Direction::EnglishToFaroese => write!(f, "English to Faroese"),
        }
    }
}

/// A single evaluation item sent to the model.
///
/// The fixture object is kept exactly as loaded, field order and unknown
/// fields included, so a persisted result carries the original question. Only
/// the two grading fields are lifted out on load; everything else is read on
/// demand, in the context of the case's category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TestCase {
    system_prompt: String,
    expected_answer: String,
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for TestCase {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let system_prompt = required_str(&fields, "system_prompt")?;
        let expected_answer = required_str(&fields, "expected_answer")?;
        Ok(Self {
            system_prompt,
            expected_answer,
            fields,
        })
    }
}

impl From<TestCase> for Map<String, Value> {
    fn from(case: TestCase) -> Self {
        case.fields
    }
}

fn required_str(fields: &Map<String, Value>, name: &str) -> Result<String, String> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("'{name}' must be a string")),
        None => Err(format!("missing field `{name}`")),
    }
}

impl TestCase {
    /// A plain question case.
    pub fn question(question: &str, system_prompt: &str, expected_answer: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("question".into(), question.into());
        Self::with_grading(fields, system_prompt, expected_answer)
    }

    /// A translation case. `source` is stored in the field matching the direction.
    pub fn translation(
        direction: Direction,
        source: &str,
        system_prompt: &str,
        expected_answer: &str,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("type".into(), direction.to_string().into());
        fields.insert(direction.source_field().into(), source.into());
        Self::with_grading(fields, system_prompt, expected_answer)
    }

    fn with_grading(
        mut fields: Map<String, Value>,
        system_prompt: &str,
        expected_answer: &str,
    ) -> Self {
        fields.insert("system_prompt".into(), system_prompt.into());
        fields.insert("expected_answer".into(), expected_answer.into());
        Self {
            system_prompt: system_prompt.to_string(),
            expected_answer: expected_answer.to_string(),
            fields,
        }
    }

    /// Set an extra fixture field. The grading fields cannot be replaced.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        if name != "system_prompt" && name != "expected_answer" {
            self.fields.insert(name.to_string(), value.into());
        }
        self
    }

    /// System instruction sent alongside the prompt.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The answer the response must match, ignoring case.
    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    /// The fixture object as loaded.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// A string field of the fixture object.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// The `question` field, if present.
    pub fn question_text(&self) -> Option<&str> {
        self.text("question")
    }

    /// Whether the fixture carries a non-null `type` field.
    pub fn has_type(&self) -> bool {
        self.fields.get("type").is_some_and(|v| !v.is_null())
    }

    /// The `type` field read as a translation direction.
    ///
    /// Only meaningful for translation cases; other categories never call it.
    pub fn direction(&self) -> Result<Option<Direction>, String> {
        match self.fields.get("type") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Direction::deserialize(value)
                .map(Some)
                .map_err(|e| format!("invalid translation 'type': {e}")),
        }
    }

    /// Build the user prompt sent to the model.
    ///
    /// Translation cases synthesize the prompt from their direction and source
    /// text, and must carry both. Every other category sends `question`
    /// verbatim and ignores `type`.
    pub fn prompt(&self, category: Category) -> Result<String, String> {
        if category != Category::TranslationAccuracy {
            return self
                .question_text()
                .map(str::to_string)
                .ok_or_else(|| "case has no 'question'".to_string());
        }

        let direction = self
            .direction()?
            .ok_or_else(|| "translation case has no 'type'".to_string())?;
        let field = direction.source_field();
        self.text(field)
            .map(|text| direction.prompt(text))
            .ok_or_else(|| format!("'{direction}' case has no '{field}' text"))
    }
}

/// The outcome of running one test case against the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// The test case as loaded from the fixture.
    pub question: TestCase,
    /// The model's (trimmed) reply.
    pub response: String,
    /// Whether the reply matched the expected answer.
    pub is_correct: bool,
}

impl TestResult {
    /// Score a response against its test case.
    pub fn score(question: TestCase, response: String) -> Self {
        let is_correct = is_correct(&response, question.expected_answer());
        Self {
            question,
            response,
            is_correct,
        }
    }
}

/// The results of one category, in execution order.
#[derive(Debug, Clone)]
pub struct CategoryRun {
    pub category: Category,
    pub results: Vec<TestResult>,
}

impl CategoryRun {
    pub fn new(category: Category, capacity: usize) -> Self {
        Self {
            category,
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Number of correct results so far.
    pub fn correct(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_and_display() {
        assert_eq!(
            "grammar".parse::<Category>().unwrap(),
            Category::GrammarRuleApplication
        );
        assert_eq!(
            "Morphological-Understanding".parse::<Category>().unwrap(),
            Category::MorphologicalUnderstanding
        );
        assert_eq!(
            "translation_accuracy".parse::<Category>().unwrap(),
            Category::TranslationAccuracy
        );
        assert!("phonology".parse::<Category>().is_err());
        assert_eq!(Category::TranslationAccuracy.to_string(), "translation_accuracy");
    }

    #[test]
    fn faroese_to_english_prompt() {
        let case = TestCase::translation(Direction::FaroeseToEnglish, "Hey", "sys", "Hello");
        assert_eq!(
            case.prompt(Category::TranslationAccuracy).unwrap(),
            "Translate the following Faroese sentence to English: Hey"
        );
    }

    #[test]
    fn english_to_faroese_prompt() {
        let case = TestCase::translation(Direction::EnglishToFaroese, "Hello", "sys", "Hey");
        assert_eq!(
            case.prompt(Category::TranslationAccuracy).unwrap(),
            "Translate the following English sentence to Faroese: Hello"
        );
    }

    #[test]
    fn plain_case_uses_question_verbatim() {
        let case = TestCase::question("What is the plural of 'hestur'?", "sys", "hestar");
        assert_eq!(
            case.prompt(Category::GrammarRuleApplication).unwrap(),
            "What is the plural of 'hestur'?"
        );
    }

    #[test]
    fn plain_categories_ignore_type() {
        let case = TestCase::question("Plural of 'bók'?", "sys", "bøkur")
            .with_field("type", "Faroese to English")
            .with_field("faroese", "bók");
        for category in [
            Category::GrammarRuleApplication,
            Category::MorphologicalUnderstanding,
        ] {
            assert_eq!(case.prompt(category).unwrap(), "Plural of 'bók'?");
        }

        let declension = TestCase::question("Dative of 'bátur'?", "sys", "báti")
            .with_field("type", "declension");
        assert_eq!(
            declension.prompt(Category::GrammarRuleApplication).unwrap(),
            "Dative of 'bátur'?"
        );
    }

    #[test]
    fn translation_requires_type() {
        let case = TestCase::question("Translate 'Hey'", "sys", "Hello");
        let err = case.prompt(Category::TranslationAccuracy).unwrap_err();
        assert!(err.contains("no 'type'"), "got: {err}");
    }

    #[test]
    fn translation_without_source_is_rejected() {
        let case =
            TestCase::question("q", "sys", "Hello").with_field("type", "Faroese to English");
        let err = case.prompt(Category::TranslationAccuracy).unwrap_err();
        assert!(err.contains("faroese"), "got: {err}");
    }

    #[test]
    fn unknown_direction_is_a_translation_error() {
        let case = TestCase::question("q", "s", "Hej")
            .with_field("type", "Faroese to Danish")
            .with_field("faroese", "Hey");
        assert!(case.direction().is_err());
        assert!(case.prompt(Category::TranslationAccuracy).is_err());
    }

    #[test]
    fn plain_case_without_question_is_rejected() {
        let case: TestCase =
            serde_json::from_str(r#"{"system_prompt": "s", "expected_answer": "a"}"#).unwrap();
        assert!(case.prompt(Category::MorphologicalUnderstanding).is_err());
    }

    #[test]
    fn translation_case_parses_direction_tag() {
        let json = r#"{
            "type": "Faroese to English",
            "faroese": "Góðan morgun",
            "english": "Good morning",
            "system_prompt": "Translate.",
            "expected_answer": "Good morning"
        }"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert_eq!(case.direction().unwrap(), Some(Direction::FaroeseToEnglish));
        assert_eq!(case.text("english"), Some("Good morning"));
        assert_eq!(case.expected_answer(), "Good morning");
    }

    #[test]
    fn missing_grading_field_fails_to_load() {
        let err = serde_json::from_str::<TestCase>(r#"{"question": "q", "system_prompt": "s"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected_answer"));
        assert!(serde_json::from_str::<TestCase>(
            r#"{"question": "q", "system_prompt": "s", "expected_answer": 3}"#
        )
        .is_err());
    }

    #[test]
    fn fixture_object_survives_serialization() {
        let json = r#"{"type":"Faroese to English","faroese":"Hey","english":"Hello","question":null,"system_prompt":"s","expected_answer":"Hello","id":7}"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&case).unwrap(), json);
    }

    #[test]
    fn grading_fields_cannot_be_overwritten() {
        let case = TestCase::question("q", "s", "a").with_field("expected_answer", "b");
        assert_eq!(case.expected_answer(), "a");
        assert_eq!(case.text("expected_answer"), Some("a"));
    }

    #[test]
    fn result_scoring_ignores_case() {
        let case = TestCase::question("Is 'ja' yes?", "sys", "Ja");
        let result = TestResult::score(case, "ja".into());
        assert!(result.is_correct);
    }

    #[test]
    fn category_run_counts_correct() {
        let mut run = CategoryRun::new(Category::GrammarRuleApplication, 2);
        run.push(TestResult::score(TestCase::question("q", "s", "a"), "a".into()));
        run.push(TestResult::score(TestCase::question("q", "s", "a"), "b".into()));
        assert_eq!(run.correct(), 1);
        assert_eq!(run.results.len(), 2);
    }
}
