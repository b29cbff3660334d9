//! Structural code smell detection engine.
//! Derives structural facts from Python source (full syntax tree) and
//! JavaScript source (lexical heuristics), classifies them against a fixed
//! smell taxonomy with numeric thresholds, and pairs each finding with a
//! canonical refactoring example.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod classify;
pub mod facts;
pub mod javascript;
pub mod metrics;
pub mod python;
pub mod report;
pub mod suggest;

pub use facts::{ClassFact, FactSet, FunctionFact, Span};
pub use report::{analyze_units, RepoReport, ReportMetadata};
pub use suggest::RefactoringExample;

/// Language tag deciding which fact extractor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Language> {
        match path.extension().and_then(|s| s.to_str())?.to_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => f.write_str("python"),
            Language::JavaScript => f.write_str("javascript"),
        }
    }
}

/// One source file queued for analysis. Immutable once read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub identifier: String,
    pub text: String,
    pub language: Language,
}

impl SourceUnit {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>, language: Language) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
            language,
        }
    }
}

/// Complexity and maintainability cutoffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityThresholds {
    pub branch_count: usize,
    pub maintainability_floor: f64,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            branch_count: 10,
            maintainability_floor: 20.0,
        }
    }
}

/// Size cutoffs for files, functions, classes and parameter lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeThresholds {
    pub python_file_lines: usize,
    pub javascript_file_lines: usize,
    pub python_function_statements: usize,
    pub javascript_function_lines: usize,
    pub python_parameters: usize,
    pub javascript_parameters: usize,
    pub class_methods: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            python_file_lines: 500,
            javascript_file_lines: 300,
            python_function_statements: 100,
            javascript_function_lines: 50,
            python_parameters: 5,
            javascript_parameters: 4,
            class_methods: 10,
        }
    }
}

/// Nesting and shape cutoffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureThresholds {
    pub python_nesting_depth: usize,
    pub javascript_nesting_depth: usize,
    pub callback_depth: usize,
    pub return_statements: usize,
    pub external_attribute_accesses: usize,
}

impl Default for StructureThresholds {
    fn default() -> Self {
        Self {
            python_nesting_depth: 3,
            javascript_nesting_depth: 4,
            callback_depth: 4,
            return_statements: 3,
            external_attribute_accesses: 5,
        }
    }
}

/// Hygiene cutoffs for call frequency, literals, logging and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HygieneThresholds {
    pub shotgun_call_count: usize,
    pub magic_number_count: usize,
    pub logging_statements: usize,
    pub comment_density: f32,
}

impl Default for HygieneThresholds {
    fn default() -> Self {
        Self {
            shotgun_call_count: 10,
            magic_number_count: 5,
            logging_statements: 10,
            comment_density: 0.02,
        }
    }
}

/// Full analyzer configuration. Every field has a serde default so a partial
/// YAML file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub complexity: ComplexityThresholds,
    pub sizes: SizeThresholds,
    pub structure: StructureThresholds,
    pub hygiene: HygieneThresholds,
    pub ignore_globs: Vec<String>,
}

/// Fixed smell taxonomy. Kinds are evaluated independently and may co-occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellKind {
    HighComplexity,
    LowMaintainability,
    LargeFile,
    DeepNesting,
    LongFunction,
    FeatureEnvy,
    DataClump,
    DeadCode,
    ShotgunSurgery,
    TooManyReturns,
    TooManyParameters,
    LargeClass,
    GlobalVariables,
    MagicNumbers,
    DuplicateCode,
    CallbackHell,
    LowCommentDensity,
    EmptyCatch,
    UnnecessarySemicolon,
    LongCallChain,
    LogOveruse,
}

impl SmellKind {
    pub const ALL: [SmellKind; 21] = [
        SmellKind::HighComplexity,
        SmellKind::LowMaintainability,
        SmellKind::LargeFile,
        SmellKind::DeepNesting,
        SmellKind::LongFunction,
        SmellKind::FeatureEnvy,
        SmellKind::DataClump,
        SmellKind::DeadCode,
        SmellKind::ShotgunSurgery,
        SmellKind::TooManyReturns,
        SmellKind::TooManyParameters,
        SmellKind::LargeClass,
        SmellKind::GlobalVariables,
        SmellKind::MagicNumbers,
        SmellKind::DuplicateCode,
        SmellKind::CallbackHell,
        SmellKind::LowCommentDensity,
        SmellKind::EmptyCatch,
        SmellKind::UnnecessarySemicolon,
        SmellKind::LongCallChain,
        SmellKind::LogOveruse,
    ];

    pub fn parse(name: &str) -> Option<SmellKind> {
        let n = name.trim().to_lowercase().replace('-', "_");
        SmellKind::ALL.iter().copied().find(|k| k.to_string() == n)
    }
}

impl std::fmt::Display for SmellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SmellKind::HighComplexity => "high_complexity",
            SmellKind::LowMaintainability => "low_maintainability",
            SmellKind::LargeFile => "large_file",
            SmellKind::DeepNesting => "deep_nesting",
            SmellKind::LongFunction => "long_function",
            SmellKind::FeatureEnvy => "feature_envy",
            SmellKind::DataClump => "data_clump",
            SmellKind::DeadCode => "dead_code",
            SmellKind::ShotgunSurgery => "shotgun_surgery",
            SmellKind::TooManyReturns => "too_many_returns",
            SmellKind::TooManyParameters => "too_many_parameters",
            SmellKind::LargeClass => "large_class",
            SmellKind::GlobalVariables => "global_variables",
            SmellKind::MagicNumbers => "magic_numbers",
            SmellKind::DuplicateCode => "duplicate_code",
            SmellKind::CallbackHell => "callback_hell",
            SmellKind::LowCommentDensity => "low_comment_density",
            SmellKind::EmptyCatch => "empty_catch",
            SmellKind::UnnecessarySemicolon => "unnecessary_semicolon",
            SmellKind::LongCallChain => "long_call_chain",
            SmellKind::LogOveruse => "log_overuse",
        };
        f.write_str(name)
    }
}

/// Kind-specific payload carried by a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellDetails {
    None,
    Names(Vec<String>),
    Count(usize),
    Ratio(f32),
    NamedCounts(Vec<(String, usize)>),
}

impl SmellDetails {
    pub fn names(&self) -> &[String] {
        match self {
            SmellDetails::Names(names) => names,
            _ => &[],
        }
    }
}

/// One smell finding. Immutable once created by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmellRecord {
    pub kind: SmellKind,
    pub message: String,
    pub details: SmellDetails,
    pub span: Option<Span>,
}

/// Per-file metric summary surfaced next to the findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub total_lines: usize,
    pub function_count: usize,
    pub function_lengths: Vec<usize>,
    pub nesting_max: usize,
    #[serde(rename = "call_count_of_logging_statements")]
    pub logging_calls: usize,
}

/// Complete analysis output for one source unit. `refactorings` is aligned
/// with `smells` by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub smells: Vec<SmellRecord>,
    pub refactorings: Vec<RefactoringExample>,
    pub metrics: FileMetrics,
}

/// Per-file parse failure. The caller skips the file and continues; this is
/// the only failure-isolation boundary in the engine.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("tree-sitter rejected the {0} grammar")]
    Grammar(Language),
    #[error("source is not syntactically valid {0}")]
    InvalidSyntax(Language),
}

/// Analyzer bundles the threshold configuration and dispatches to the
/// extractor matching the source language.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the language-neutral fact set for one source text.
    pub fn extract(&self, text: &str, language: Language) -> Result<FactSet, ParseError> {
        match language {
            Language::Python => python::extract(text),
            Language::JavaScript => Ok(javascript::extract(text)),
        }
    }

    /// Full pipeline for one file: extract, classify, attach one refactoring
    /// example per finding, assemble metrics.
    pub fn analyze(&self, text: &str, language: Language) -> Result<AnalysisResult, ParseError> {
        let facts = self.extract(text, language)?;
        let smells = classify::classify(&facts, &self.config);
        let refactorings = smells
            .iter()
            .map(|record| suggest::suggest(language, record.kind, &record.details))
            .collect();
        let metrics = metrics::file_metrics(&facts);
        Ok(AnalysisResult {
            smells,
            refactorings,
            metrics,
        })
    }

    pub fn analyze_unit(&self, unit: &SourceUnit) -> Result<AnalysisResult, ParseError> {
        self.analyze(&unit.text, unit.language)
    }
}
