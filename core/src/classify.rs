//! Smell classification: a pure function from one `FactSet` to an ordered
//! sequence of findings.
//!
//! Kinds are evaluated independently and may co-occur; within a kind,
//! findings preserve source order. A kind with zero qualifying entities
//! produces no record. Thresholds come from `Config` and default to the
//! fixed taxonomy values.

use std::collections::HashMap;

use crate::facts::FactSet;
use crate::{Config, Language, SmellDetails, SmellKind, SmellRecord, Span};

pub fn classify(facts: &FactSet, config: &Config) -> Vec<SmellRecord> {
    let mut records = Vec::new();
    match facts.language {
        Language::Python => classify_python(facts, config, &mut records),
        Language::JavaScript => classify_javascript(facts, config, &mut records),
    }
    records
}

fn push(
    records: &mut Vec<SmellRecord>,
    kind: SmellKind,
    message: String,
    details: SmellDetails,
    span: Option<Span>,
) {
    records.push(SmellRecord {
        kind,
        message,
        details,
        span,
    });
}

fn classify_python(facts: &FactSet, config: &Config, records: &mut Vec<SmellRecord>) {
    for f in &facts.functions {
        if f.branch_count > config.complexity.branch_count {
            push(
                records,
                SmellKind::HighComplexity,
                format!("Function '{}' has a branch count of {}", f.name, f.branch_count),
                SmellDetails::Count(f.branch_count),
                Some(f.span),
            );
        }
    }

    if let Some(score) = facts.maintainability {
        if score < config.complexity.maintainability_floor {
            push(
                records,
                SmellKind::LowMaintainability,
                format!(
                    "Maintainability score {:.1} is below {:.0}",
                    score, config.complexity.maintainability_floor
                ),
                SmellDetails::Ratio(score as f32),
                None,
            );
        }
    }

    if facts.total_lines > config.sizes.python_file_lines {
        push(
            records,
            SmellKind::LargeFile,
            format!("File has {} lines", facts.total_lines),
            SmellDetails::Count(facts.total_lines),
            None,
        );
    }

    for f in &facts.functions {
        if f.nesting_depth > config.structure.python_nesting_depth {
            push(
                records,
                SmellKind::DeepNesting,
                format!("Function '{}' has nesting depth {}", f.name, f.nesting_depth),
                SmellDetails::Count(f.nesting_depth),
                Some(f.span),
            );
        }
    }

    for f in &facts.functions {
        if f.body_statements > config.sizes.python_function_statements {
            push(
                records,
                SmellKind::LongFunction,
                format!("Function '{}' has {} statements", f.name, f.body_statements),
                SmellDetails::Count(f.body_statements),
                Some(f.span),
            );
        }
    }

    for f in &facts.functions {
        if f.external_attribute_accesses > config.structure.external_attribute_accesses {
            push(
                records,
                SmellKind::FeatureEnvy,
                format!(
                    "Function '{}' makes {} external attribute accesses",
                    f.name, f.external_attribute_accesses
                ),
                SmellDetails::Count(f.external_attribute_accesses),
                Some(f.span),
            );
        }
    }

    data_clumps(facts, records);

    if !facts.unused_names.is_empty() {
        push(
            records,
            SmellKind::DeadCode,
            format!("Assigned but never read: {}", facts.unused_names.join(", ")),
            SmellDetails::Names(facts.unused_names.clone()),
            None,
        );
    }

    let frequent: Vec<(String, usize)> = facts
        .call_counts
        .iter()
        .filter(|(_, count)| *count > config.hygiene.shotgun_call_count)
        .cloned()
        .collect();
    if !frequent.is_empty() {
        let listing = frequent
            .iter()
            .map(|(name, count)| format!("{name} ({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        push(
            records,
            SmellKind::ShotgunSurgery,
            format!(
                "Functions called more than {} times: {listing}",
                config.hygiene.shotgun_call_count
            ),
            SmellDetails::NamedCounts(frequent),
            None,
        );
    }

    for f in &facts.functions {
        if f.return_count > config.structure.return_statements {
            push(
                records,
                SmellKind::TooManyReturns,
                format!("Function '{}' has {} return statements", f.name, f.return_count),
                SmellDetails::Count(f.return_count),
                Some(f.span),
            );
        }
    }

    for f in &facts.functions {
        if f.params.len() > config.sizes.python_parameters {
            push(
                records,
                SmellKind::TooManyParameters,
                format!("Function '{}' takes {} parameters", f.name, f.params.len()),
                SmellDetails::Names(f.params.clone()),
                Some(f.span),
            );
        }
    }

    for class in &facts.classes {
        if class.method_count > config.sizes.class_methods {
            push(
                records,
                SmellKind::LargeClass,
                format!("Class '{}' has {} methods", class.name, class.method_count),
                SmellDetails::Count(class.method_count),
                Some(class.span),
            );
        }
    }

    for group in &facts.duplicate_functions {
        push(
            records,
            SmellKind::DuplicateCode,
            format!("Functions share an identical body: {}", group.names.join(", ")),
            SmellDetails::Names(group.names.clone()),
            group.span,
        );
    }
}

fn classify_javascript(facts: &FactSet, config: &Config, records: &mut Vec<SmellRecord>) {
    if facts.total_lines > config.sizes.javascript_file_lines {
        push(
            records,
            SmellKind::LargeFile,
            format!("File has {} lines", facts.total_lines),
            SmellDetails::Count(facts.total_lines),
            None,
        );
    }

    if facts.file_nesting_depth >= config.structure.javascript_nesting_depth {
        push(
            records,
            SmellKind::DeepNesting,
            format!("File reaches brace nesting depth {}", facts.file_nesting_depth),
            SmellDetails::Count(facts.file_nesting_depth),
            None,
        );
    }

    for f in &facts.functions {
        if f.span_lines() > config.sizes.javascript_function_lines {
            push(
                records,
                SmellKind::LongFunction,
                format!("Function '{}' spans {} lines", f.name, f.span_lines()),
                SmellDetails::Count(f.span_lines()),
                Some(f.span),
            );
        }
    }

    if !facts.unused_names.is_empty() {
        push(
            records,
            SmellKind::DeadCode,
            format!("Declared but never used: {}", facts.unused_names.join(", ")),
            SmellDetails::Names(facts.unused_names.clone()),
            None,
        );
    }

    for f in &facts.functions {
        if f.params.len() > config.sizes.javascript_parameters {
            push(
                records,
                SmellKind::TooManyParameters,
                format!("Function '{}' takes {} parameters", f.name, f.params.len()),
                SmellDetails::Names(f.params.clone()),
                Some(f.span),
            );
        }
    }

    if !facts.global_candidates.is_empty() {
        push(
            records,
            SmellKind::GlobalVariables,
            format!(
                "Global variable candidates: {}",
                facts.global_candidates.join(", ")
            ),
            SmellDetails::Names(facts.global_candidates.clone()),
            None,
        );
    }

    if facts.magic_numbers.len() > config.hygiene.magic_number_count {
        push(
            records,
            SmellKind::MagicNumbers,
            format!("Magic numbers found: {}", facts.magic_numbers.join(", ")),
            SmellDetails::Names(facts.magic_numbers.clone()),
            None,
        );
    }

    for block in &facts.duplicate_blocks {
        push(
            records,
            SmellKind::DuplicateCode,
            format!("Three-line block repeated {} times", block.occurrences),
            SmellDetails::Count(block.occurrences),
            Some(Span::new(block.first_line, block.first_line + 2)),
        );
    }

    if facts.callback_depth >= config.structure.callback_depth {
        push(
            records,
            SmellKind::CallbackHell,
            format!("Nested callbacks reach depth {}", facts.callback_depth),
            SmellDetails::Count(facts.callback_depth),
            None,
        );
    }

    if facts.total_lines > 0 && facts.comment_ratio() < config.hygiene.comment_density {
        push(
            records,
            SmellKind::LowCommentDensity,
            format!(
                "Comment density {:.1}% is below {:.0}%",
                facts.comment_ratio() * 100.0,
                config.hygiene.comment_density * 100.0
            ),
            SmellDetails::Ratio(facts.comment_ratio()),
            None,
        );
    }

    if facts.empty_catches > 0 {
        push(
            records,
            SmellKind::EmptyCatch,
            format!("{} empty catch block(s)", facts.empty_catches),
            SmellDetails::Count(facts.empty_catches),
            None,
        );
    }

    if facts.lone_semicolons > 0 {
        push(
            records,
            SmellKind::UnnecessarySemicolon,
            format!("{} line(s) consist only of ';'", facts.lone_semicolons),
            SmellDetails::Count(facts.lone_semicolons),
            None,
        );
    }

    if facts.call_chains > 0 {
        push(
            records,
            SmellKind::LongCallChain,
            format!("{} call chain(s) with four or more segments", facts.call_chains),
            SmellDetails::Count(facts.call_chains),
            None,
        );
    }

    if facts.logging_statements >= config.hygiene.logging_statements {
        push(
            records,
            SmellKind::LogOveruse,
            format!("{} console.log call(s)", facts.logging_statements),
            SmellDetails::Count(facts.logging_statements),
            None,
        );
    }
}

/// One record per identical non-empty parameter tuple shared by at least two
/// functions, ordered by the tuple's first occurrence.
fn data_clumps(facts: &FactSet, records: &mut Vec<SmellRecord>) {
    let mut order: Vec<Vec<String>> = Vec::new();
    let mut owners: HashMap<Vec<String>, Vec<String>> = HashMap::new();
    for f in &facts.functions {
        if f.params.is_empty() {
            continue;
        }
        if !owners.contains_key(&f.params) {
            order.push(f.params.clone());
        }
        owners.entry(f.params.clone()).or_default().push(f.name.clone());
    }
    for params in order {
        let names = &owners[&params];
        if names.len() < 2 {
            continue;
        }
        push(
            records,
            SmellKind::DataClump,
            format!(
                "Parameters ({}) are shared by {}",
                params.join(", "),
                names.join(", ")
            ),
            SmellDetails::Names(params),
            None,
        );
    }
}
