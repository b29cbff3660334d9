//! Lexical fact extraction for JavaScript.
//!
//! No syntax tree is in scope for this language, so every fact is derived
//! from the literal text with brace counting, regular expressions, and
//! fixed-window block hashing. The rules are deterministic; false positives
//! are accepted.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::facts::{BlockDuplicate, FactSet, FunctionFact, Span};
use crate::Language;

static FUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\b\s*(\w+)?\s*\(([^)]*)\)\s*\{").unwrap());
static DECLARATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:var|let|const)\s+(\w+)").unwrap());
static CALL_CHAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:\.\w+){4,}").unwrap());
static ANONYMOUS_FN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"function\s*\(").unwrap());
static EMPTY_CATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"catch\s*\([^)]*\)\s*\{\s*\}").unwrap());
static CONSOLE_LOG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bconsole\.log\b").unwrap());

/// Byte span of one lexically detected function body.
struct FunctionMatch {
    name: String,
    params: Vec<String>,
    start: usize,
    end: usize,
    line_span: Span,
}

pub fn extract(text: &str) -> FactSet {
    let mut facts = FactSet::new(Language::JavaScript);
    let lines: Vec<&str> = text.lines().collect();
    facts.total_lines = lines.len();

    let matches = find_functions(text);
    for m in &matches {
        facts.functions.push(FunctionFact {
            name: m.name.clone(),
            params: m.params.clone(),
            body_statements: 0,
            branch_count: 0,
            return_count: 0,
            external_attribute_accesses: 0,
            nesting_depth: 0,
            span: m.line_span,
        });
    }

    facts.file_nesting_depth = file_nesting_depth(&lines);
    facts.callback_depth = callback_depth(&lines);
    facts.duplicate_blocks = duplicate_blocks(&lines);
    facts.magic_numbers = magic_numbers(text);
    facts.call_chains = CALL_CHAIN_RE.find_iter(text).count();
    facts.comment_lines = comment_lines(&lines);
    facts.empty_catches = EMPTY_CATCH_RE.find_iter(text).count();
    facts.lone_semicolons = lines.iter().filter(|l| l.trim() == ";").count();
    facts.logging_statements = CONSOLE_LOG_RE.find_iter(text).count();

    let declarations = declarations(text);
    facts.global_candidates = global_candidates(text, &declarations, &matches);
    facts.unused_names = unused_names(text, &declarations);

    facts
}

/// Match every `function name(params) {` boundary and scan forward with a
/// signed brace counter; the body ends where the counter first returns to
/// zero. Length is the newline count in the span plus one.
fn find_functions(text: &str) -> Vec<FunctionMatch> {
    let mut matches = Vec::new();
    for caps in FUNCTION_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let start = whole.start();
        let Some(end) = matching_brace(text, start) else {
            continue;
        };
        let span_text = &text[start..=end];
        let lines = span_text.matches('\n').count() + 1;
        let start_line = text[..start].matches('\n').count() + 1;
        let name = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let params = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        matches.push(FunctionMatch {
            name,
            params,
            start,
            end,
            line_span: Span::new(start_line, start_line + lines - 1),
        });
    }
    matches
}

fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut seen_open = false;
    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'{' => {
                depth += 1;
                seen_open = true;
            }
            b'}' => {
                depth -= 1;
                if seen_open && depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Per-line running sum of `{` minus `}`; the maximum reached is the file's
/// nesting depth. A coarse file-level approximation by design.
fn file_nesting_depth(lines: &[&str]) -> usize {
    let mut level: i64 = 0;
    let mut max: i64 = 0;
    for line in lines {
        level += line.matches('{').count() as i64;
        level -= line.matches('}').count() as i64;
        if level > max {
            max = level;
        }
    }
    max.max(0) as usize
}

/// Running counter over lines: +1 for an anonymous function literal (arrow
/// forms excluded), -1 for a line containing a closing brace. The two checks
/// are independent, so a one-line callback opens and closes on the same line.
fn callback_depth(lines: &[&str]) -> usize {
    let mut depth: usize = 0;
    let mut max: usize = 0;
    for line in lines {
        if ANONYMOUS_FN_RE.is_match(line) && !line.contains("=>") {
            depth += 1;
            if depth > max {
                max = depth;
            }
        }
        if line.contains('}') {
            depth = depth.saturating_sub(1);
        }
    }
    max
}

/// Contiguous 3-line windows (all lines non-blank after trimming) that are
/// byte-identical to another window elsewhere in the file.
fn duplicate_blocks(lines: &[&str]) -> Vec<BlockDuplicate> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for i in 0..lines.len().saturating_sub(2) {
        let window = &lines[i..i + 3];
        if window.iter().any(|line| line.trim().is_empty()) {
            continue;
        }
        let key = window.join("\n");
        match counts.get_mut(&key) {
            Some((count, _)) => *count += 1,
            None => {
                order.push(key.clone());
                counts.insert(key, (1, i + 1));
            }
        }
    }
    order
        .into_iter()
        .filter_map(|key| {
            let (occurrences, first_line) = counts[&key];
            (occurrences >= 2).then_some(BlockDuplicate {
                occurrences,
                first_line,
            })
        })
        .collect()
}

/// Digit runs delimited on both sides by a non-letter character, excluding
/// the literals 0 and 1.
fn magic_numbers(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let run_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let before_ok = run_start > 0 && !bytes[run_start - 1].is_ascii_alphabetic();
            let after_ok = i < bytes.len() && !bytes[i].is_ascii_alphabetic();
            if before_ok && after_ok {
                let run = &text[run_start..i];
                if run != "0" && run != "1" {
                    found.push(run.to_string());
                }
            }
        } else {
            i += 1;
        }
    }
    found
}

fn comment_lines(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed.starts_with("//") || line.contains("/*") || line.contains("*/")
        })
        .count()
}

/// Declared names with the byte offset of each declaration, in source order.
fn declarations(text: &str) -> Vec<(String, usize)> {
    DECLARATION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            Some((name.as_str().to_string(), name.start()))
        })
        .collect()
}

/// A declaration is a global candidate when no enclosing function-body span
/// containing it also contains another usage of the same name. Containment
/// over raw text, not a symbol table.
fn global_candidates(
    text: &str,
    declarations: &[(String, usize)],
    functions: &[FunctionMatch],
) -> Vec<String> {
    let mut found = Vec::new();
    for (name, decl_pos) in declarations {
        let occurrences = word_positions(text, name);
        let locally_used = functions.iter().any(|f| {
            f.start <= *decl_pos
                && *decl_pos <= f.end
                && occurrences
                    .iter()
                    .any(|&pos| pos != *decl_pos && f.start <= pos && pos <= f.end)
        });
        if !locally_used && !found.contains(name) {
            found.push(name.clone());
        }
    }
    found
}

/// A declared name whose whole-word occurrence count in the file is exactly
/// one — only the declaration itself.
fn unused_names(text: &str, declarations: &[(String, usize)]) -> Vec<String> {
    let mut found = Vec::new();
    for (name, _) in declarations {
        if word_positions(text, name).len() == 1 && !found.contains(name) {
            found.push(name.clone());
        }
    }
    found
}

fn word_positions(text: &str, word: &str) -> Vec<usize> {
    let pattern = format!(r"\b{}\b", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(text).map(|m| m.start()).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_boundary_uses_brace_counter() {
        let text = "\
function outer(a, b) {
    if (a) {
        b();
    }
}
function tiny() { return 1; }
";
        let facts = extract(text);
        assert_eq!(facts.functions.len(), 2);
        assert_eq!(facts.functions[0].name, "outer");
        assert_eq!(facts.functions[0].params, vec!["a", "b"]);
        assert_eq!(facts.functions[0].span_lines(), 5);
        assert_eq!(facts.functions[1].span_lines(), 1);
    }

    #[test]
    fn nesting_depth_is_the_running_brace_maximum() {
        let text = "\
function f() {
    if (a) {
        while (b) {
            c();
        }
    }
}
";
        assert_eq!(extract(text).file_nesting_depth, 3);
    }

    #[test]
    fn duplicate_blocks_count_occurrences_once_per_window() {
        let block = "const a = load();\nvalidate(a);\nstore(a);\n";
        let text = format!("{block}x();\n{block}y();\n{block}");
        let facts = extract(&text);
        assert_eq!(facts.duplicate_blocks.len(), 1);
        assert_eq!(facts.duplicate_blocks[0].occurrences, 3);
    }

    #[test]
    fn magic_numbers_need_non_letter_delimiters() {
        let text = "let x = 42;\nlet v2 = 7;\nlet id = value1;\n";
        let facts = extract(text);
        assert_eq!(facts.magic_numbers, vec!["42", "7"]);
    }

    #[test]
    fn declared_once_name_is_unused() {
        let text = "var ghost = 1;\nvar used = 2;\nconsole.log(used);\n";
        let facts = extract(text);
        assert_eq!(facts.unused_names, vec!["ghost"]);
    }

    #[test]
    fn read_elsewhere_clears_unused() {
        let text = "var maybe = 1;\nconsole.log(maybe);\n";
        let facts = extract(text);
        assert!(facts.unused_names.is_empty());
    }

    #[test]
    fn global_candidate_requires_no_enclosing_usage() {
        let text = "\
var top = 1;
function scoped() {
    var inner = 2;
    return inner + 1;
}
";
        let facts = extract(text);
        assert!(facts.global_candidates.contains(&"top".to_string()));
        assert!(!facts.global_candidates.contains(&"inner".to_string()));
    }

    #[test]
    fn call_chains_need_four_accesses() {
        let short = "a.b.c.d();\n";
        let long = "a.b.c.d.e();\n";
        assert_eq!(extract(short).call_chains, 0);
        assert_eq!(extract(long).call_chains, 1);
    }

    #[test]
    fn callback_depth_ignores_arrows() {
        let text = "\
load(function (a) {
    parse(function (b) {
        store(function (c) {
            emit(function (d) {
                done();
            });
        });
    });
});
";
        assert_eq!(extract(text).callback_depth, 4);
        let arrows = "load((a) => {\n  parse((b) => {\n    done();\n  });\n});\n";
        assert_eq!(extract(arrows).callback_depth, 0);
    }

    #[test]
    fn console_logs_count_every_occurrence() {
        let text = "console.log(a); console.log(b);\nconsole.log(c);\nconsole.logger(d);\n";
        assert_eq!(extract(text).logging_statements, 3);
    }

    #[test]
    fn one_line_callbacks_do_not_stack() {
        let text = "load(function (a) { a(); });\n".repeat(4);
        assert_eq!(extract(&text).callback_depth, 1);
    }

    #[test]
    fn empty_catch_and_lone_semicolons() {
        let text = "try {\n    risky();\n} catch (e) {}\n;\n";
        let facts = extract(text);
        assert_eq!(facts.empty_catches, 1);
        assert_eq!(facts.lone_semicolons, 1);
    }

    #[test]
    fn comment_ratio_counts_prefix_and_block_markers() {
        let text = "// a\ncode();\n/* b */\ncode();\n";
        let facts = extract(text);
        assert_eq!(facts.comment_lines, 2);
        assert_eq!(facts.total_lines, 4);
    }
}
