//! Helpers for splicing Rust values into Prolog query text.

use regex::Regex;
use std::sync::OnceLock;

static PREFIXED_RE: OnceLock<Regex> = OnceLock::new();

fn prefixed_re() -> &'static Regex {
    PREFIXED_RE.get_or_init(|| Regex::new(r"^[a-z][A-Za-z0-9_]*:'[^'\\]*'$").unwrap())
}

/// Render `value` as a Prolog atom.
///
/// Terms that are already atoms pass through unchanged: a quoted atom
/// (`'http://...#Foo'`) or a namespace-prefixed one (`soma:'Pouring'`),
/// provided the quoted part holds no `'` or `\`. Everything else is
/// single-quoted with `\` and `'` escaped.
pub fn atom(value: &str) -> String {
    if is_atom_literal(value) {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn is_atom_literal(value: &str) -> bool {
    if prefixed_re().is_match(value) {
        return true;
    }
    value.len() >= 2
        && value.starts_with('\'')
        && value.ends_with('\'')
        && !value[1..value.len() - 1].contains(['\'', '\\'])
}

/// Render `value` as a Prolog float literal.
///
/// Prolog reads `1` as an integer and rejects `1e-7`, so the output always
/// carries a fractional part. Callers must reject NaN and infinities first;
/// Prolog has no literal for them.
pub fn float(value: f64) -> String {
    debug_assert!(value.is_finite(), "non-finite float in query: {value}");
    let s = format!("{value:?}");
    match s.find('e') {
        Some(pos) if !s[..pos].contains('.') => format!("{}.0{}", &s[..pos], &s[pos..]),
        _ => s,
    }
}
