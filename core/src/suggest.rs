//! Refactoring template engine.
//!
//! Lookup is by exact smell kind against a static per-language table of
//! canonical before/after examples. These are didactic templates, not
//! transformations of the offending code; a few kinds substitute the
//! detected identifiers into the template text. Lookup is total: a kind
//! with no template resolves to the sentinel triple, never an error.

use serde::{Deserialize, Serialize};

use crate::{Language, SmellDetails, SmellKind};

pub const NO_EXAMPLE: &str = "No example available";

/// Canonical before/after pair with an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringExample {
    pub before: String,
    pub after: String,
    pub explanation: String,
}

impl RefactoringExample {
    /// Fixed fallback for kinds without a canonical example.
    pub fn sentinel() -> Self {
        Self {
            before: NO_EXAMPLE.to_string(),
            after: NO_EXAMPLE.to_string(),
            explanation: "No canonical refactoring example exists for this smell kind".to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.before == NO_EXAMPLE && self.after == NO_EXAMPLE
    }
}

struct Template {
    before: &'static str,
    after: &'static str,
    explanation: &'static str,
}

impl Template {
    fn example(&self) -> RefactoringExample {
        RefactoringExample {
            before: self.before.to_string(),
            after: self.after.to_string(),
            explanation: self.explanation.to_string(),
        }
    }
}

/// Resolve the canonical example for a detected smell. Parameterized kinds
/// splice the captured identifiers into the template; substitution is
/// textual and order-preserving, with no compilability guarantee.
pub fn suggest(language: Language, kind: SmellKind, details: &SmellDetails) -> RefactoringExample {
    match (language, kind) {
        (Language::JavaScript, SmellKind::GlobalVariables) => global_variables_example(details),
        (Language::JavaScript, SmellKind::MagicNumbers) => magic_numbers_example(details),
        (_, SmellKind::DeadCode) => dead_code_example(language, details),
        _ => template_for(language, kind)
            .map(Template::example)
            .unwrap_or_else(RefactoringExample::sentinel),
    }
}

fn template_for(language: Language, kind: SmellKind) -> Option<&'static Template> {
    match language {
        Language::Python => python_template(kind),
        Language::JavaScript => javascript_template(kind),
    }
}

/// Module wrapper skeleton naming each detected global.
fn global_variables_example(details: &SmellDetails) -> RefactoringExample {
    let names = details.names();
    if names.is_empty() {
        return template_for(Language::JavaScript, SmellKind::GlobalVariables)
            .map(Template::example)
            .unwrap_or_else(RefactoringExample::sentinel);
    }
    let before = names
        .iter()
        .map(|name| format!("let {name};"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut after = String::from("const app = (function () {\n");
    for name in names {
        after.push_str(&format!("    let {name};\n"));
    }
    after.push_str("    return {\n        // expose what callers actually need\n    };\n})();");
    RefactoringExample {
        before,
        after,
        explanation: "Global variables were encapsulated in a module".to_string(),
    }
}

/// One named constant per detected literal.
fn magic_numbers_example(details: &SmellDetails) -> RefactoringExample {
    let numbers = details.names();
    if numbers.is_empty() {
        return RefactoringExample::sentinel();
    }
    let constants = numbers
        .iter()
        .enumerate()
        .map(|(i, num)| format!("const NUM_{i} = {num};"))
        .collect::<Vec<_>>()
        .join("\n");
    RefactoringExample {
        before: numbers.join(", "),
        after: format!("// Define constants\n{constants}\n\n// Use constants instead of magic numbers"),
        explanation: "Magic numbers were replaced with named constants".to_string(),
    }
}

fn dead_code_example(language: Language, details: &SmellDetails) -> RefactoringExample {
    let names = details.names();
    if names.is_empty() {
        return RefactoringExample::sentinel();
    }
    let listing = names.join(", ");
    let before = match language {
        Language::Python => names
            .iter()
            .map(|name| format!("{name} = compute()"))
            .collect::<Vec<_>>()
            .join("\n"),
        Language::JavaScript => format!("let {listing};"),
    };
    RefactoringExample {
        before,
        after: "// Removed unused variables".to_string(),
        explanation: format!("Unused variables {listing} were removed"),
    }
}

fn python_template(kind: SmellKind) -> Option<&'static Template> {
    match kind {
        SmellKind::HighComplexity => Some(&Template {
            before: r#"def complex_function(data):
    result = 0
    for item in data:
        if item > 10:
            if isinstance(item, int):
                if item % 2 == 0:
                    result += item * 2
                else:
                    result += item
            else:
                try:
                    num = float(item)
                    result += num
                except ValueError:
                    pass
    return result"#,
            after: r#"def is_valid_number(item):
    return isinstance(item, (int, float)) or str(item).replace('.', '').isdigit()

def process_even_number(num):
    return num * 2 if num % 2 == 0 else num

def process_item(item):
    if not is_valid_number(item) or item <= 10:
        return 0
    try:
        num = float(item) if isinstance(item, str) else item
        return process_even_number(num) if isinstance(num, int) else num
    except ValueError:
        return 0

def refactored_function(data):
    return sum(process_item(item) for item in data)"#,
            explanation: "Function was split into smaller, focused functions based on its logical parts",
        }),
        SmellKind::DeepNesting => Some(&Template {
            before: r#"def process_data(data):
    results = []
    for item in data:
        if item.is_valid():
            if item.type == 'user':
                if item.age >= 18:
                    if item.has_permission:
                        results.append(item.process())
    return results"#,
            after: r#"def meets_criteria(item):
    return (item.is_valid() and
            item.type == 'user' and
            item.age >= 18 and
            item.has_permission)

def process_data(data):
    return [item.process() for item in data if meets_criteria(item)]"#,
            explanation: "Nested conditions were flattened using early returns and helper functions",
        }),
        SmellKind::FeatureEnvy => Some(&Template {
            before: r#"class Order:
    def __init__(self, customer):
        self.customer = customer

    def calculate_discount(self):
        if self.customer.loyalty_years > 5:
            if self.customer.purchase_history > 1000:
                return 0.2
            return 0.1
        return 0"#,
            after: r#"class Customer:
    def __init__(self, loyalty_years, purchase_history):
        self.loyalty_years = loyalty_years
        self.purchase_history = purchase_history

    def calculate_discount(self):
        if self.loyalty_years > 5:
            return 0.2 if self.purchase_history > 1000 else 0.1
        return 0

class Order:
    def __init__(self, customer):
        self.customer = customer

    def get_discount(self):
        return self.customer.calculate_discount()"#,
            explanation: "Logic was moved next to the data it reads instead of reaching across objects",
        }),
        SmellKind::DuplicateCode => Some(&Template {
            before: r#"def process_users(users):
    for user in users:
        name = user.get('name', '').strip()
        email = user.get('email', '').strip()
        if name and '@' in email:
            save_to_db(name, email)

def process_customers(customers):
    for customer in customers:
        name = customer.get('name', '').strip()
        email = customer.get('email', '').strip()
        if name and '@' in email:
            save_to_db(name, email)"#,
            after: r#"def is_valid_contact(name, email):
    return bool(name.strip() and '@' in email)

def process_contacts(contacts):
    for contact in contacts:
        name = contact.get('name', '').strip()
        email = contact.get('email', '').strip()
        if is_valid_contact(name, email):
            save_to_db(name, email)

def process_users(users):
    process_contacts(users)

def process_customers(customers):
    process_contacts(customers)"#,
            explanation: "Common code was extracted into a shared function",
        }),
        SmellKind::TooManyReturns => Some(&Template {
            before: r#"def check_user_access(user):
    if not user:
        return False
    if not user.is_active:
        return False
    if user.is_banned:
        return False
    if not user.has_permission('access'):
        return False
    if user.login_attempts > 3:
        return False
    return True"#,
            after: r#"def check_user_access(user):
    conditions = [
        bool(user),
        user.is_active,
        not user.is_banned,
        user.has_permission('access'),
        user.login_attempts <= 3,
    ]
    return all(conditions)"#,
            explanation: "Scattered early returns were collapsed into one combined condition",
        }),
        SmellKind::LongFunction => Some(&Template {
            before: r#"def import_report(path):
    rows = read_rows(path)
    cleaned = []
    for row in rows:
        row = normalize(row)
        if row.valid:
            cleaned.append(row)
    totals = {}
    for row in cleaned:
        totals[row.key] = totals.get(row.key, 0) + row.value
    write_summary(totals)
    notify_owners(totals)"#,
            after: r#"def clean_rows(rows):
    return [normalize(row) for row in rows if normalize(row).valid]

def total_by_key(rows):
    totals = {}
    for row in rows:
        totals[row.key] = totals.get(row.key, 0) + row.value
    return totals

def import_report(path):
    totals = total_by_key(clean_rows(read_rows(path)))
    write_summary(totals)
    notify_owners(totals)"#,
            explanation: "Long method was split into smaller, focused methods",
        }),
        SmellKind::TooManyParameters | SmellKind::DataClump => Some(&Template {
            before: r#"def connect(host, port, user, password, timeout, retries):
    ...

def reconnect(host, port, user, password, timeout, retries):
    ..."#,
            after: r#"class ConnectionSettings:
    def __init__(self, host, port, user, password, timeout, retries):
        self.host = host
        self.port = port
        self.user = user
        self.password = password
        self.timeout = timeout
        self.retries = retries

def connect(settings):
    ...

def reconnect(settings):
    ..."#,
            explanation: "Recurring parameters were grouped into a parameter object",
        }),
        SmellKind::LargeClass => Some(&Template {
            before: r#"class ReportService:
    def load(self): ...
    def parse(self): ...
    def validate(self): ...
    def render_html(self): ...
    def render_pdf(self): ...
    def email(self): ...
    def archive(self): ..."#,
            after: r#"class ReportLoader:
    def load(self): ...
    def parse(self): ...
    def validate(self): ...

class ReportRenderer:
    def render_html(self): ...
    def render_pdf(self): ...

class ReportDelivery:
    def email(self): ...
    def archive(self): ..."#,
            explanation: "The class was split along its separate responsibilities",
        }),
        SmellKind::ShotgunSurgery => Some(&Template {
            before: r#"format_price(order.total)
format_price(invoice.total)
format_price(quote.total)
# ... called from a dozen modules"#,
            after: r#"class Money:
    def __init__(self, amount):
        self.amount = amount

    def formatted(self):
        return f"{self.amount:.2f}"

order.total.formatted()"#,
            explanation: "A widely called helper became a method on the type it serves, so changes land in one place",
        }),
        SmellKind::LowMaintainability => Some(&Template {
            before: r#"def score(d):
    return (d['a'] * 2 + d['b'] - d['c'] / 3) * (1 if d['flag'] else d['k'] + d['b'] * 2)"#,
            after: r#"def base_score(d):
    return d['a'] * 2 + d['b'] - d['c'] / 3

def multiplier(d):
    return 1 if d['flag'] else d['k'] + d['b'] * 2

def score(d):
    return base_score(d) * multiplier(d)"#,
            explanation: "Dense expressions were unfolded into named intermediate steps",
        }),
        SmellKind::LargeFile => Some(&Template {
            before: "# one module holding models, parsing, rendering and I/O",
            after: "# models.py / parsing.py / rendering.py / io.py, one concern each",
            explanation: "The file was split into one module per concern",
        }),
        _ => None,
    }
}

fn javascript_template(kind: SmellKind) -> Option<&'static Template> {
    match kind {
        SmellKind::CallbackHell | SmellKind::DeepNesting => Some(&Template {
            before: r#"step1(function (result1) {
    step2(result1, function (result2) {
        step3(result2, function (result3) {
            finish(result3, function (done) {
                console.log(done);
            });
        });
    });
});"#,
            after: r#"async function processData() {
    try {
        const result1 = await step1();
        const result2 = await step2(result1);
        return await step3(result2);
    } catch (error) {
        console.error('Error:', error);
    }
}"#,
            explanation: "Nested callbacks were flattened using async/await",
        }),
        SmellKind::DuplicateCode => Some(&Template {
            before: r#"const user = load('user');
validate(user);
store(user);

const admin = load('admin');
validate(admin);
store(admin);"#,
            after: r#"function persist(kind) {
    const record = load(kind);
    validate(record);
    store(record);
}

persist('user');
persist('admin');"#,
            explanation: "Duplicate code was extracted into a reusable function",
        }),
        SmellKind::LongFunction => Some(&Template {
            before: r#"function handleSubmit(form) {
    // 60 lines of validation, transformation and I/O
}"#,
            after: r#"function validateForm(form) { /* ... */ }
function toPayload(form) { /* ... */ }
function send(payload) { /* ... */ }

function handleSubmit(form) {
    validateForm(form);
    send(toPayload(form));
}"#,
            explanation: "Long function was split into smaller, focused functions",
        }),
        SmellKind::TooManyParameters => Some(&Template {
            before: r#"function draw(x, y, width, height, color) { /* ... */ }"#,
            after: r#"function draw({ x, y, width, height, color }) { /* ... */ }

draw({ x: 0, y: 0, width: 10, height: 10, color: 'red' });"#,
            explanation: "The parameter list was replaced with a single options object",
        }),
        SmellKind::EmptyCatch => Some(&Template {
            before: r#"try {
    risky();
} catch (e) {}"#,
            after: r#"try {
    risky();
} catch (e) {
    console.error('risky() failed:', e);
    throw e;
}"#,
            explanation: "The swallowed exception is now reported and rethrown",
        }),
        SmellKind::LongCallChain => Some(&Template {
            before: r#"const city = order.customer.address.city.name.trim();"#,
            after: r#"const address = order.customer.address;
const city = address.city.name.trim();"#,
            explanation: "The long chain was broken with named intermediate values",
        }),
        SmellKind::LogOveruse => Some(&Template {
            before: r#"console.log('step 1');
console.log('step 2');
console.log(result);"#,
            after: r#"const debug = require('debug')('app');

debug('step %d', 1);
debug('result %o', result);"#,
            explanation: "Ad-hoc console output was routed through a leveled logger that can be disabled",
        }),
        SmellKind::UnnecessarySemicolon => Some(&Template {
            before: ";\nrun();;\n",
            after: "run();\n",
            explanation: "Stray empty statements were removed",
        }),
        SmellKind::LowCommentDensity => Some(&Template {
            before: r#"function settle(lines) {
    return lines.filter(open).map(close).reduce(sum, 0);
}"#,
            after: r#"// Settle a batch: close every open line and total the proceeds.
function settle(lines) {
    return lines.filter(open).map(close).reduce(sum, 0);
}"#,
            explanation: "Intent-level comments were added where the code cannot speak for itself",
        }),
        SmellKind::LargeFile => Some(&Template {
            before: "// app.js: routing, rendering, storage and helpers in one file",
            after: "// routes.js / render.js / storage.js, imported from a thin app.js",
            explanation: "The file was split into one module per concern",
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves_without_panicking() {
        for language in [Language::Python, Language::JavaScript] {
            for kind in SmellKind::ALL {
                let example = suggest(language, kind, &SmellDetails::None);
                assert!(!example.before.is_empty());
                assert!(!example.after.is_empty());
                assert!(!example.explanation.is_empty());
            }
        }
    }

    #[test]
    fn unknown_combinations_yield_the_sentinel() {
        let example = suggest(Language::Python, SmellKind::CallbackHell, &SmellDetails::None);
        assert!(example.is_sentinel());
    }

    #[test]
    fn global_variables_example_names_each_global() {
        let details = SmellDetails::Names(vec!["cache".to_string(), "config".to_string()]);
        let example = suggest(Language::JavaScript, SmellKind::GlobalVariables, &details);
        assert!(example.before.contains("let cache;"));
        assert!(example.after.contains("let cache;"));
        assert!(example.after.contains("let config;"));
        assert!(example.after.starts_with("const app = (function () {"));
    }

    #[test]
    fn magic_numbers_example_defines_one_constant_per_literal() {
        let details = SmellDetails::Names(vec!["42".to_string(), "99".to_string()]);
        let example = suggest(Language::JavaScript, SmellKind::MagicNumbers, &details);
        assert!(example.after.contains("const NUM_0 = 42;"));
        assert!(example.after.contains("const NUM_1 = 99;"));
    }

    #[test]
    fn dead_code_example_lists_the_names() {
        let details = SmellDetails::Names(vec!["ghost".to_string()]);
        let example = suggest(Language::Python, SmellKind::DeadCode, &details);
        assert!(example.before.contains("ghost = compute()"));
        assert!(example.explanation.contains("ghost"));
    }

    #[test]
    fn nesting_template_after_is_itself_flat() {
        let template = python_template(SmellKind::DeepNesting).unwrap();
        let facts = crate::python::extract(template.after).unwrap();
        let max_depth = facts
            .functions
            .iter()
            .map(|f| f.nesting_depth)
            .max()
            .unwrap();
        assert!(max_depth <= 3, "template after() nests to {max_depth}");
    }
}
