//! Composite maintainability scoring and per-file metric assembly.
//!
//! The maintainability score approximates the classic maintainability index
//! (Halstead volume + cyclomatic complexity + LOC on a 0..100 scale). The
//! threshold it is compared against is externally fixed; the formula here is
//! an approximation, not a bit-exact reproduction of any metrics package.

use std::collections::HashSet;

use crate::facts::FactSet;
use crate::{FileMetrics, Language};

/// Maintainability index approximation on a 0..100 scale; lower is worse.
///
/// Volume is estimated from the token stream: total tokens times log2 of
/// the distinct token count stands in for Halstead volume.
pub fn maintainability_index(text: &str, branch_total: usize, total_lines: usize) -> f64 {
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() || total_lines == 0 {
        return 100.0;
    }
    let distinct: HashSet<&str> = tokens.iter().copied().collect();
    let volume = tokens.len() as f64 * (distinct.len().max(2) as f64).log2();
    let cyclomatic = (branch_total + 1) as f64;
    let raw = 171.0 - 5.2 * volume.ln() - 0.23 * cyclomatic - 16.2 * (total_lines as f64).ln();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}

/// Metric summary surfaced in `AnalysisResult`, shaped for the external
/// reporter.
pub fn file_metrics(facts: &FactSet) -> FileMetrics {
    let function_lengths = facts
        .functions
        .iter()
        .map(|f| match facts.language {
            Language::Python => f.body_statements,
            Language::JavaScript => f.span_lines(),
        })
        .collect();
    FileMetrics {
        total_lines: facts.total_lines,
        function_count: facts.functions.len(),
        function_lengths,
        nesting_max: facts.file_nesting_depth,
        logging_calls: facts.logging_statements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_scores_clean() {
        assert_eq!(maintainability_index("", 0, 0), 100.0);
    }

    #[test]
    fn branch_heavy_source_scores_lower() {
        let flat = "def f():\n    return 1\n";
        let heavy: String = std::iter::repeat("if x > 2:\n    y = x * 3\n")
            .take(60)
            .collect();
        let a = maintainability_index(flat, 0, 2);
        let b = maintainability_index(&heavy, 60, 120);
        assert!(b < a);
    }

    #[test]
    fn score_stays_in_range() {
        let huge: String = std::iter::repeat("x = compute(a, b, c)\n").take(5000).collect();
        let score = maintainability_index(&huge, 900, 5000);
        assert!((0.0..=100.0).contains(&score));
    }
}
