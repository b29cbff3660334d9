//! Structural fact extraction for Python via a full tree-sitter parse.
//!
//! Every query here mirrors a lexical-era heuristic with real structure:
//! nesting depth and branch counts walk the tree, duplicate detection hashes
//! a canonical dump of each function body, and dead-assignment detection is
//! an intentional file-wide liveness approximation (see `FactSet` docs).

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};
use tree_sitter::{Node, Parser};

use crate::facts::{ClassFact, DuplicateGroup, FactSet, FunctionFact, Span};
use crate::{metrics, Language, ParseError};

/// Constructs that open one level of nesting: conditionals, loops,
/// exception scopes, resource scopes, nested function definitions.
const DEPTH_KINDS: [&str; 7] = [
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "with_statement",
    "try_statement",
    "function_definition",
];

/// Constructs that add one branch to the complexity count.
const BRANCH_KINDS: [&str; 5] = [
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
];

pub fn extract(text: &str) -> Result<FactSet, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|_| ParseError::Grammar(Language::Python))?;
    let tree = parser
        .parse(text, None)
        .ok_or(ParseError::InvalidSyntax(Language::Python))?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::InvalidSyntax(Language::Python));
    }

    let src = text.as_bytes();
    let mut facts = FactSet::new(Language::Python);
    facts.total_lines = text.lines().count();

    let mut collector = Collector::new(src);
    collector.visit(root);

    for node in &collector.functions {
        facts.functions.push(function_fact(*node, src));
    }
    for node in &collector.classes {
        facts.classes.push(class_fact(*node, src));
    }

    facts.duplicate_functions = duplicate_bodies(&collector.functions, src);
    facts.unused_names = dead_assignments(&collector);
    facts.call_counts = collector.call_counts();
    facts.logging_statements = collector.logging;
    facts.magic_numbers = collector.magic_numbers;
    facts.file_nesting_depth = facts
        .functions
        .iter()
        .map(|f| f.nesting_depth)
        .max()
        .unwrap_or(0);

    let branch_total = collector.branch_total;
    facts.maintainability = Some(metrics::maintainability_index(
        text,
        branch_total,
        facts.total_lines,
    ));

    Ok(facts)
}

/// Pre-order collection pass over the whole tree.
struct Collector<'a> {
    src: &'a [u8],
    functions: Vec<Node<'a>>,
    classes: Vec<Node<'a>>,
    /// Assignment-target names in source order.
    assigned: Vec<String>,
    /// Names that occur in a read position anywhere in the file.
    reads: HashSet<String>,
    calls: Vec<String>,
    magic_numbers: Vec<String>,
    logging: usize,
    branch_total: usize,
}

impl<'a> Collector<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            functions: Vec::new(),
            classes: Vec::new(),
            assigned: Vec::new(),
            reads: HashSet::new(),
            calls: Vec::new(),
            magic_numbers: Vec::new(),
            logging: 0,
            branch_total: 0,
        }
    }

    fn visit(&mut self, node: Node<'a>) {
        match node.kind() {
            "function_definition" => self.functions.push(node),
            "class_definition" => self.classes.push(node),
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        self.assigned.push(node_text(left, self.src));
                    }
                }
            }
            "identifier" => {
                if is_read_position(node) {
                    self.reads.insert(node_text(node, self.src));
                }
            }
            "call" => {
                if let Some(callee) = node.child_by_field_name("function") {
                    match callee.kind() {
                        "identifier" => {
                            let name = node_text(callee, self.src);
                            if name == "print" {
                                self.logging += 1;
                            }
                            self.calls.push(name);
                        }
                        "attribute" => {
                            if is_logging_attribute(callee, self.src) {
                                self.logging += 1;
                            }
                        }
                        _ => {}
                    }
                }
            }
            "integer" | "float" => {
                let literal = node_text(node, self.src);
                if literal != "0" && literal != "1" {
                    self.magic_numbers.push(literal);
                }
            }
            kind if BRANCH_KINDS.contains(&kind) => self.branch_total += 1,
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Free-function call counts keyed by literal callee name, ordered by
    /// first call site.
    fn call_counts(&self) -> Vec<(String, usize)> {
        let mut order = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &self.calls {
            if !counts.contains_key(name.as_str()) {
                order.push(name.clone());
            }
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        order
            .into_iter()
            .map(|name| {
                let count = counts[name.as_str()];
                (name, count)
            })
            .collect()
    }
}

/// Whether an identifier occurrence counts as a read. Store positions
/// (assignment targets, def/class names, parameter names, attribute and
/// keyword-argument labels) do not.
fn is_read_position(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    let id = node.id();
    let field_is = |field: &str| {
        parent
            .child_by_field_name(field)
            .map(|n| n.id() == id)
            .unwrap_or(false)
    };
    match parent.kind() {
        "assignment" | "augmented_assignment" => !field_is("left"),
        "function_definition" | "class_definition" => !field_is("name"),
        "attribute" => !field_is("attribute"),
        "keyword_argument" => !field_is("name"),
        "parameters" | "typed_parameter" | "lambda_parameters" => false,
        "default_parameter" | "typed_default_parameter" => !field_is("name"),
        "list_splat_pattern" | "dictionary_splat_pattern" => false,
        _ => true,
    }
}

fn is_logging_attribute(attribute: Node, src: &[u8]) -> bool {
    let Some(object) = attribute.child_by_field_name("object") else {
        return false;
    };
    if object.kind() != "identifier" {
        return false;
    }
    matches!(node_text(object, src).as_str(), "logging" | "logger" | "log")
}

fn function_fact(node: Node, src: &[u8]) -> FunctionFact {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, src))
        .unwrap_or_else(|| "<anonymous>".to_string());
    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameter_names(p, src))
        .unwrap_or_default();
    let body = node.child_by_field_name("body");
    let body_statements = body.map(|b| statement_count(b)).unwrap_or(0);
    FunctionFact {
        name,
        params,
        body_statements,
        branch_count: branch_count(node),
        return_count: count_kind(node, "return_statement"),
        external_attribute_accesses: external_attribute_accesses(node),
        nesting_depth: nesting_depth(node),
        span: node_span(node),
    }
}

fn class_fact(node: Node, src: &[u8]) -> ClassFact {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, src))
        .unwrap_or_default();
    let method_count = node
        .child_by_field_name("body")
        .map(|body| {
            let mut cursor = body.walk();
            body.named_children(&mut cursor)
                .filter(|child| is_method(*child))
                .count()
        })
        .unwrap_or(0);
    ClassFact {
        name,
        method_count,
        span: node_span(node),
    }
}

fn is_method(node: Node) -> bool {
    match node.kind() {
        "function_definition" => true,
        "decorated_definition" => node
            .child_by_field_name("definition")
            .map(|d| d.kind() == "function_definition")
            .unwrap_or(false),
        _ => false,
    }
}

/// Parameter names in declaration order, splat markers unwrapped, separators
/// skipped.
fn parameter_names(parameters: Node, src: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = parameters.walk();
    for child in parameters.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(node_text(child, src)),
            "typed_parameter" => {
                let mut inner = child.walk();
                let ident = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier");
                if let Some(ident) = ident {
                    names.push(node_text(ident, src));
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.push(node_text(name, src));
                }
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                let mut inner = child.walk();
                let ident = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier");
                if let Some(ident) = ident {
                    names.push(node_text(ident, src));
                }
            }
            _ => {}
        }
    }
    names
}

/// Direct statements in a block, comments excluded.
fn statement_count(body: Node) -> usize {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .count()
}

/// 1 (base path) plus one per conditional, loop, or exception handler
/// anywhere in the function subtree.
pub fn branch_count(function: Node) -> usize {
    let mut count = 1;
    let mut stack = vec![function];
    while let Some(node) = stack.pop() {
        if node.id() != function.id() && BRANCH_KINDS.contains(&node.kind()) {
            count += 1;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    count
}

/// Maximum count of depth-increasing constructs along any path below the
/// function root, floored at 1. The function's own `def` does not count;
/// nested definitions do.
pub fn nesting_depth(function: Node) -> usize {
    fn walk(node: Node, depth: usize, max: &mut usize) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let d = if DEPTH_KINDS.contains(&child.kind()) {
                depth + 1
            } else {
                depth
            };
            if d > *max {
                *max = d;
            }
            walk(child, d, max);
        }
    }
    let mut max = 0;
    walk(function, 0, &mut max);
    max.max(1)
}

/// Member accesses whose base expression is a plain identifier — a proxy for
/// a function talking to other objects more than itself.
pub fn external_attribute_accesses(function: Node) -> usize {
    let mut count = 0;
    let mut stack = vec![function];
    while let Some(node) = stack.pop() {
        if node.kind() == "attribute" {
            if let Some(object) = node.child_by_field_name("object") {
                if object.kind() == "identifier" {
                    count += 1;
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    count
}

fn count_kind(root: Node, kind: &str) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == kind {
            count += 1;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    count
}

/// Group functions by a canonical dump of their bodies. The dump preserves
/// identifier and literal text but strips whitespace, formatting, and
/// comments; the grouping key is textual identity, not semantic equivalence.
fn duplicate_bodies(functions: &[Node], src: &[u8]) -> Vec<DuplicateGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, function) in functions.iter().enumerate() {
        let Some(body) = function.child_by_field_name("body") else {
            continue;
        };
        let mut dump = String::new();
        canonical_dump(body, src, &mut dump);
        let digest = format!("{:x}", Sha256::digest(dump.as_bytes()));
        if !groups.contains_key(&digest) {
            order.push(digest.clone());
        }
        groups.entry(digest).or_default().push(idx);
    }

    let mut result = Vec::new();
    for digest in order {
        let members = &groups[&digest];
        if members.len() < 2 {
            continue;
        }
        let names = members
            .iter()
            .map(|&idx| {
                functions[idx]
                    .child_by_field_name("name")
                    .map(|n| node_text(n, src))
                    .unwrap_or_else(|| "<anonymous>".to_string())
            })
            .collect();
        result.push(DuplicateGroup {
            names,
            span: Some(node_span(functions[members[0]])),
        });
    }
    result
}

fn canonical_dump(node: Node, src: &[u8], out: &mut String) {
    if node.kind() == "comment" {
        return;
    }
    out.push('(');
    out.push_str(node.kind());
    if node.named_child_count() == 0 {
        out.push(' ');
        out.push_str(&node_text(node, src));
    } else {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            canonical_dump(child, src, out);
        }
    }
    out.push(')');
}

/// Names assigned somewhere in the file but never read anywhere in it.
fn dead_assignments(collector: &Collector) -> Vec<String> {
    let mut seen = HashSet::new();
    collector
        .assigned
        .iter()
        .filter(|name| !collector.reads.contains(*name))
        .filter(|name| seen.insert(name.to_string()))
        .cloned()
        .collect()
}

fn node_span(node: Node) -> Span {
    Span::new(
        node.start_position().row + 1,
        node.end_position().row + 1,
    )
}

fn node_text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(text: &str) -> FactSet {
        extract(text).unwrap()
    }

    fn function<'a>(facts: &'a FactSet, name: &str) -> &'a FunctionFact {
        facts
            .functions
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("missing function {name}"))
    }

    #[test]
    fn flat_function_has_depth_one() {
        let f = facts("def flat():\n    x = 1\n    return x\n");
        assert_eq!(function(&f, "flat").nesting_depth, 1);
    }

    #[test]
    fn sequential_ifs_do_not_stack_depth() {
        let text = "\
def seq(a):
    if a > 1:
        a = 1
    if a > 2:
        a = 2
    if a > 3:
        a = 3
    if a > 4:
        a = 4
    return a
";
        let f = facts(text);
        let fact = function(&f, "seq");
        assert_eq!(fact.branch_count, 5);
        assert_eq!(fact.nesting_depth, 1);
    }

    #[test]
    fn wrapping_in_a_conditional_adds_exactly_one_level() {
        let inner = "\
def work(a):
    if a:
        for i in a:
            a = i
    return a
";
        let wrapped = "\
def work(a):
    if True:
        if a:
            for i in a:
                a = i
    return a
";
        let before = function(&facts(inner), "work").nesting_depth;
        let after = function(&facts(wrapped), "work").nesting_depth;
        assert_eq!(before, 2);
        assert_eq!(after, before + 1);
    }

    #[test]
    fn branch_count_includes_elif_and_except() {
        let text = "\
def branches(a):
    if a == 1:
        pass
    elif a == 2:
        pass
    try:
        a()
    except ValueError:
        pass
    return a
";
        let f = facts(text);
        // base + if + elif + except handler
        assert_eq!(function(&f, "branches").branch_count, 4);
    }

    #[test]
    fn counts_parameters_with_defaults_and_splats() {
        let text = "def f(a, b=2, *args, **kwargs):\n    return a\n";
        let f = facts(text);
        assert_eq!(
            function(&f, "f").params,
            vec!["a", "b", "args", "kwargs"]
        );
    }

    #[test]
    fn counts_annotated_parameters() {
        let text = "def f(a: int, b: str = \"x\", *rest: int) -> int:\n    return a\n";
        let f = facts(text);
        assert_eq!(function(&f, "f").params, vec!["a", "b", "rest"]);
    }

    #[test]
    fn external_attribute_accesses_need_identifier_base() {
        let text = "\
def envy(order):
    a = order.customer
    b = order.total
    return a.name + b
";
        let f = facts(text);
        assert_eq!(function(&f, "envy").external_attribute_accesses, 3);
    }

    #[test]
    fn identical_bodies_group_transitively() {
        let text = "\
def a(x):
    return x + 1

def b(x):
    return x + 1

def c(x):
    return x + 1
";
        let f = facts(text);
        assert_eq!(f.duplicate_functions.len(), 1);
        assert_eq!(f.duplicate_functions[0].names, vec!["a", "b", "c"]);
    }

    #[test]
    fn alpha_renamed_bodies_are_not_duplicates() {
        let text = "\
def a(x):
    return x + 1

def b(y):
    return y + 1
";
        let f = facts(text);
        assert!(f.duplicate_functions.is_empty());
    }

    #[test]
    fn dead_assignment_is_file_wide() {
        let text = "\
def writer():
    ghost = 1
    alive = 2
    return alive
";
        let f = facts(text);
        assert_eq!(f.unused_names, vec!["ghost"]);
    }

    #[test]
    fn call_counts_track_free_functions_only() {
        let text = "\
def run(obj):
    helper()
    helper()
    obj.method()
    return helper()
";
        let f = facts(text);
        assert_eq!(f.call_counts, vec![("helper".to_string(), 3)]);
    }

    #[test]
    fn print_and_logging_calls_are_counted() {
        let text = "\
def noisy(x):
    print(x)
    logging.info(x)
    x.update()
    return x
";
        let f = facts(text);
        assert_eq!(f.logging_statements, 2);
    }

    #[test]
    fn magic_numbers_exclude_zero_and_one() {
        let text = "def f():\n    return 0 + 1 + 42 + 99\n";
        let f = facts(text);
        assert_eq!(f.magic_numbers, vec!["42", "99"]);
    }

    #[test]
    fn class_method_count_uses_direct_children() {
        let text = "\
class Big:
    def a(self):
        pass

    def b(self):
        def inner():
            pass
        return inner
";
        let f = facts(text);
        assert_eq!(f.classes.len(), 1);
        assert_eq!(f.classes[0].method_count, 2);
    }

    #[test]
    fn invalid_syntax_is_a_parse_error() {
        assert!(matches!(
            extract("def oops(:\n  pass"),
            Err(ParseError::InvalidSyntax(Language::Python))
        ));
    }
}
