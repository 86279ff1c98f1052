//! Textual canonicalization of DDL.
//!
//! Catalogs report indexes back in their own spelling: casts added, quotes
//! dropped, predicates wrapped in parentheses, default keywords spelled
//! out. Two DDL strings denote the same object iff their canonical forms
//! are equal.
//!
//! ```rust
//! use oxide_schema::canonical::canonicalize;
//! use oxide_schema::dialect::PostgresDialect;
//!
//! let dialect = PostgresDialect::new();
//! let catalog = "CREATE INDEX idx_users_name ON public.users USING btree (name) WHERE (active = true)";
//! let rendered = r#"CREATE INDEX "idx_users_name" ON "public"."users" ("name") WHERE active = true"#;
//! assert_eq!(canonicalize(catalog, &dialect), canonicalize(rendered, &dialect));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

static CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)::(?:character varying|double precision|timestamp with(?:out)? time zone|\w+)(?:\[\])?",
    )
    .expect("cast regex")
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(\d+)'").expect("placeholder regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([(),=<>!+*/|-])\s*").expect("punctuation regex"));

static ATOM_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?:[A-Z0-9_.]+|'[^']*')\)").expect("atom regex"));

static WHERE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bWHERE\b").expect("where regex"));

static ASC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+ASC\b").expect("asc regex"));

/// Keywords after which a parenthesized atom is a grouping, not a call.
const KEYWORDS: &[&str] = &["WHERE", "AND", "OR", "NOT", "WHEN", "THEN", "ELSE"];

/// Reduces a DDL string to its canonical form. Idempotent. String
/// literals are kept verbatim.
#[must_use]
pub fn canonicalize<D: Dialect + ?Sized>(ddl: &str, dialect: &D) -> String {
    let trimmed = ddl.trim().trim_end_matches(';');
    let (masked, literals) = mask_literals(trimmed);
    let text = CAST.replace_all(&masked, "");
    let text: String = text
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect::<String>()
        .to_uppercase();
    let text = WHITESPACE.replace_all(&text, " ");
    let text = PUNCTUATION.replace_all(text.trim(), "$1");
    let text = strip_atom_parens(&text);
    let text = normalize_predicate(&text);
    let text = ASC.replace_all(&text, "");
    dialect.canonicalize_noise(unmask_literals(&text, &literals))
}

/// Returns true if both DDL strings denote the same object.
#[must_use]
pub fn same_definition<D: Dialect + ?Sized>(left: &str, right: &str, dialect: &D) -> bool {
    canonicalize(left, dialect) == canonicalize(right, dialect)
}

/// Replaces every `'...'` literal with a numbered placeholder (`'0'`,
/// `'1'`, ...) so the passes above leave its contents alone.
fn mask_literals(input: &str) -> (String, Vec<String>) {
    let mut masked = String::with_capacity(input.len());
    let mut literals = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '\'' {
            masked.push(c);
            continue;
        }
        let mut end = input.len();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                continue;
            }
            // '' is an escaped quote inside the literal.
            if chars.peek().is_some_and(|&(_, next)| next == '\'') {
                chars.next();
                continue;
            }
            end = i + 1;
            break;
        }
        masked.push_str(&format!("'{}'", literals.len()));
        literals.push(input[start..end].to_string());
    }
    (masked, literals)
}

fn unmask_literals(masked: &str, literals: &[String]) -> String {
    PLACEHOLDER
        .replace_all(masked, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| literals.get(i))
                .map_or_else(|| caps[0].to_string(), Clone::clone)
        })
        .into_owned()
}

const fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn strippable(before: &str) -> bool {
    match before.chars().last() {
        None => true,
        Some(c) if !is_word(c) => true,
        Some(_) => {
            let word = before.rsplit(|c: char| !is_word(c)).next().unwrap_or_default();
            KEYWORDS.contains(&word)
        }
    }
}

/// Removes parentheses around single identifiers or literals, unless they
/// are the argument list of a call (`LOWER(EMAIL)` is kept, `=(X)` is not).
fn strip_atom_parens(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let mut out = String::with_capacity(current.len());
        let mut last = 0;
        let mut changed = false;

        for m in ATOM_IN_PARENS.find_iter(&current) {
            let before = &current[..m.start()];
            if !strippable(before) {
                continue;
            }
            out.push_str(&current[last..m.start()]);
            if before.chars().last().is_some_and(is_word) {
                out.push(' ');
            }
            out.push_str(&current[m.start() + 1..m.end() - 1]);
            if current[m.end()..].chars().next().is_some_and(is_word) {
                out.push(' ');
            }
            last = m.end();
            changed = true;
        }

        if !changed {
            return current;
        }
        out.push_str(&current[last..]);
        current = out;
    }
}

/// Rewrites `... WHERE (pred)` as `... WHERE pred`.
fn normalize_predicate(input: &str) -> String {
    let Some(m) = WHERE.find(input) else {
        return input.to_string();
    };
    let head = input[..m.start()].trim_end();
    let mut predicate = input[m.end()..].trim();
    while let Some(inner) = unwrap_parens(predicate) {
        predicate = inner.trim();
    }
    if head.is_empty() {
        format!("WHERE {predicate}")
    } else {
        format!("{head} WHERE {predicate}")
    }
}

/// The inside of `(...)` when the outer pair encloses the whole string.
fn unwrap_parens(text: &str) -> Option<&str> {
    if !(text.starts_with('(') && text.ends_with(')')) {
        return None;
    }
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != text.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(&text[1..text.len() - 1])
}
