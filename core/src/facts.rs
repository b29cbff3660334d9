//! Language-neutral structural summary of one source file.
//!
//! A `FactSet` is the normalization boundary between the two extractors and
//! the classifier: once facts are populated the classifier no longer cares
//! whether they came from a syntax tree or from lexical heuristics. Several
//! facts are deliberate file-granularity approximations (dead names, global
//! candidates); they trade soundness for not needing a scope graph.

use serde::{Deserialize, Serialize};

use crate::Language;

/// 1-based line range of a finding or declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self { start_line, end_line }
    }

    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Structural summary of one function. Owned by its file's `FactSet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionFact {
    pub name: String,
    pub params: Vec<String>,
    /// Direct statements in the body (Python); 0 for lexical functions.
    pub body_statements: usize,
    /// 1 + conditionals + loops + exception handlers in the whole subtree.
    pub branch_count: usize,
    pub return_count: usize,
    /// Member accesses whose base is a plain local/parameter identifier.
    pub external_attribute_accesses: usize,
    /// Maximum count of depth-increasing constructs along any path,
    /// floored at 1 for a non-empty function.
    pub nesting_depth: usize,
    pub span: Span,
}

impl FunctionFact {
    pub fn span_lines(&self) -> usize {
        self.span.line_count()
    }
}

/// Structural summary of one class (parsed language only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFact {
    pub name: String,
    pub method_count: usize,
    pub span: Span,
}

/// A group of functions sharing one structural fingerprint. Identifier names
/// are part of the fingerprint, so alpha-renamed twins do not group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub names: Vec<String>,
    pub span: Option<Span>,
}

/// One 3-line block that is byte-identical to at least one other window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDuplicate {
    pub occurrences: usize,
    pub first_line: usize,
}

/// Normalized structural facts for one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSet {
    pub language: Language,
    pub total_lines: usize,
    pub functions: Vec<FunctionFact>,
    pub classes: Vec<ClassFact>,
    /// Python: assigned but never read (file-wide liveness approximation).
    /// JavaScript: declared names whose whole-word count in the file is 1.
    pub unused_names: Vec<String>,
    /// Free-function call counts in first-call order.
    pub call_counts: Vec<(String, usize)>,
    /// `print`/logging calls (Python) or `console.log` occurrences
    /// (JavaScript).
    pub logging_statements: usize,
    /// Max brace nesting over the whole file (JavaScript); max function
    /// nesting depth (Python).
    pub file_nesting_depth: usize,
    /// Numeric literals excluding 0 and 1, in source order.
    pub magic_numbers: Vec<String>,
    /// Functions grouped by identical canonical body dump (Python).
    pub duplicate_functions: Vec<DuplicateGroup>,
    /// Repeated 3-line windows (JavaScript).
    pub duplicate_blocks: Vec<BlockDuplicate>,
    /// Declarations with no enclosing-usage containment (JavaScript).
    pub global_candidates: Vec<String>,
    /// Chains of four or more consecutive `.identifier` accesses.
    pub call_chains: usize,
    /// Peak anonymous-callback nesting (JavaScript).
    pub callback_depth: usize,
    pub comment_lines: usize,
    pub empty_catches: usize,
    pub lone_semicolons: usize,
    /// Composite maintainability score (Python only).
    pub maintainability: Option<f64>,
}

impl FactSet {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            total_lines: 0,
            functions: Vec::new(),
            classes: Vec::new(),
            unused_names: Vec::new(),
            call_counts: Vec::new(),
            logging_statements: 0,
            file_nesting_depth: 0,
            magic_numbers: Vec::new(),
            duplicate_functions: Vec::new(),
            duplicate_blocks: Vec::new(),
            global_candidates: Vec::new(),
            call_chains: 0,
            callback_depth: 0,
            comment_lines: 0,
            empty_catches: 0,
            lone_semicolons: 0,
            maintainability: None,
        }
    }

    pub fn comment_ratio(&self) -> f32 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.comment_lines as f32 / self.total_lines as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_line_count_is_inclusive() {
        assert_eq!(Span::new(3, 5).line_count(), 3);
        assert_eq!(Span::new(7, 7).line_count(), 1);
    }

    #[test]
    fn comment_ratio_handles_empty_file() {
        let facts = FactSet::new(Language::JavaScript);
        assert_eq!(facts.comment_ratio(), 0.0);
    }
}
