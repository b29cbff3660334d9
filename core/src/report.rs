//! Repository-level aggregation.
//!
//! Collects per-file analysis results into one serializable report, keyed by
//! file identifier within each language section. A file that fails to parse
//! is logged and skipped; a bad file never aborts the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, Analyzer, Language, SourceUnit};

/// Run metadata attached to every report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub source: String,
    pub python_files: usize,
    pub javascript_files: usize,
    pub skipped_files: usize,
}

/// Full analysis output for a set of source units, split by language.
/// BTreeMaps keep the serialized sections in a stable order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    #[serde(rename = "python_like")]
    pub python: BTreeMap<String, AnalysisResult>,
    #[serde(rename = "js_like")]
    pub javascript: BTreeMap<String, AnalysisResult>,
    pub metadata: ReportMetadata,
}

impl RepoReport {
    pub fn is_clean(&self) -> bool {
        self.python
            .values()
            .chain(self.javascript.values())
            .all(|result| result.smells.is_empty())
    }

    pub fn total_smells(&self) -> usize {
        self.python
            .values()
            .chain(self.javascript.values())
            .map(|result| result.smells.len())
            .sum()
    }
}

/// Analyze every unit and aggregate the results. `source` labels where the
/// units came from (a directory path, a repo name).
pub fn analyze_units(analyzer: &Analyzer, units: &[SourceUnit], source: &str) -> RepoReport {
    let mut python = BTreeMap::new();
    let mut javascript = BTreeMap::new();
    let mut skipped = 0usize;
    for unit in units {
        match analyzer.analyze_unit(unit) {
            Ok(result) => {
                let section = match unit.language {
                    Language::Python => &mut python,
                    Language::JavaScript => &mut javascript,
                };
                section.insert(unit.identifier.clone(), result);
            }
            Err(err) => {
                log::warn!("skipping {}: {}", unit.identifier, err);
                skipped += 1;
            }
        }
    }
    let metadata = ReportMetadata {
        source: source.to_string(),
        python_files: python.len(),
        javascript_files: javascript.len(),
        skipped_files: skipped,
    };
    RepoReport {
        python,
        javascript,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, text: &str, language: Language) -> SourceUnit {
        SourceUnit::new(id, text, language)
    }

    #[test]
    fn report_splits_by_language() {
        let analyzer = Analyzer::default();
        let units = vec![
            unit("pkg/a.py", "x = compute()\nstore(x)\n", Language::Python),
            unit("web/b.js", "// boot\nstart();\n", Language::JavaScript),
        ];
        let report = analyze_units(&analyzer, &units, "fixtures");
        assert_eq!(report.python.len(), 1);
        assert_eq!(report.javascript.len(), 1);
        assert!(report.python.contains_key("pkg/a.py"));
        assert_eq!(report.metadata.source, "fixtures");
        assert_eq!(report.metadata.python_files, 1);
        assert_eq!(report.metadata.javascript_files, 1);
        assert_eq!(report.metadata.skipped_files, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn unparsable_file_is_skipped_not_fatal() {
        let analyzer = Analyzer::default();
        let units = vec![
            unit("bad.py", "def broken(:\n  pass", Language::Python),
            unit("good.py", "x = compute()\nstore(x)\n", Language::Python),
        ];
        let report = analyze_units(&analyzer, &units, ".");
        assert_eq!(report.metadata.skipped_files, 1);
        assert_eq!(report.python.len(), 1);
        assert!(report.python.contains_key("good.py"));
    }

    #[test]
    fn total_smells_counts_every_section() {
        let analyzer = Analyzer::default();
        let units = vec![unit("s.js", "// app\n;\n;\nvar ghost = 1;\n", Language::JavaScript)];
        let report = analyze_units(&analyzer, &units, ".");
        assert!(!report.is_clean());
        assert!(report.total_smells() >= 2);
    }

    #[test]
    fn report_serializes_with_renamed_sections() {
        let analyzer = Analyzer::default();
        let units = vec![unit("m.py", "x = compute()\nstore(x)\n", Language::Python)];
        let report = analyze_units(&analyzer, &units, ".");
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("python_like").is_some());
        assert!(json.get("js_like").is_some());
        assert!(json["python_like"]["m.py"]["metrics"]
            .get("call_count_of_logging_statements")
            .is_some());
    }
}
