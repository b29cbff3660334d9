use smelt_core::{Analyzer, Language, SmellKind};

fn analyzer() -> Analyzer {
    Analyzer::default()
}

#[test]
fn every_finding_gets_a_paired_example() {
    let text = "\
// fixture
;
var ghost = 1;
shade(42);
shade(97);
shade(13);
shade(256);
shade(512);
shade(777);
";
    let result = analyzer().analyze(text, Language::JavaScript).unwrap();
    assert!(!result.smells.is_empty());
    assert_eq!(result.smells.len(), result.refactorings.len());
    for example in &result.refactorings {
        assert!(!example.before.is_empty());
        assert!(!example.after.is_empty());
        assert!(!example.explanation.is_empty());
    }
}

#[test]
fn unused_variable_example_names_the_variable() {
    let text = "// fixture\nvar ghost = 1;\nboot();\n";
    let result = analyzer().analyze(text, Language::JavaScript).unwrap();
    let idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::DeadCode)
        .expect("dead_code finding");
    let example = &result.refactorings[idx];
    assert!(example.before.contains("ghost"));
    assert!(example.explanation.contains("ghost"));
}

#[test]
fn global_candidate_example_wraps_in_a_module() {
    let text = "// fixture\nvar cache = {};\nboot();\n";
    let result = analyzer().analyze(text, Language::JavaScript).unwrap();
    let idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::GlobalVariables)
        .expect("global_variables finding");
    let example = &result.refactorings[idx];
    assert!(example.after.contains("(function () {"));
    assert!(example.after.contains("let cache;"));
}

#[test]
fn magic_number_example_defines_constants_for_the_literals() {
    let text = "\
// palette
shade(42);
shade(97);
shade(13);
shade(256);
shade(512);
shade(777);
";
    let result = analyzer().analyze(text, Language::JavaScript).unwrap();
    let idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::MagicNumbers)
        .expect("magic_numbers finding");
    let example = &result.refactorings[idx];
    assert!(example.after.contains("const NUM_0 = 42;"));
    assert!(example.after.contains("777"));
}

#[test]
fn deep_nesting_example_is_the_flattening_template() {
    let text = "\
def deep(a):
    if a:
        for i in a:
            while i:
                with open(i) as f:
                    return f
    return a
";
    let result = analyzer().analyze(text, Language::Python).unwrap();
    let idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::DeepNesting)
        .expect("deep_nesting finding");
    let example = &result.refactorings[idx];
    assert!(example.before.contains("item.has_permission"));
    assert!(example.after.contains("meets_criteria"));
}

#[test]
fn detected_kinds_resolve_to_real_examples() {
    let text = "// fixture\nconst v = metrics.a.b.c.d.value;\nuse_(v);\n";
    let result = analyzer().analyze(text, Language::JavaScript).unwrap();
    let idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::GlobalVariables);
    // Parameterized kinds never fall back when names are present.
    if let Some(idx) = idx {
        assert!(!result.refactorings[idx].is_sentinel());
    }
    let chain_idx = result
        .smells
        .iter()
        .position(|s| s.kind == SmellKind::LongCallChain)
        .expect("long_call_chain finding");
    assert!(!result.refactorings[chain_idx].is_sentinel());
}
