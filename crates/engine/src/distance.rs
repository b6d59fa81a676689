//! Fuzzy dissimilarity between two field values of arbitrary JSON shape.
//!
//! Numbers subtract, strings compare character ranks in a fixed printable
//! table, and lists compare element by element. Zero means "equal enough".

use serde_json::Value;

/// Printable-character ordering table. A character's rank is its position here.
pub const PRINTABLE: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// Rank of `c` in [`PRINTABLE`]. Characters outside the table rank after every entry.
pub fn char_rank(c: char) -> usize {
    PRINTABLE.chars().position(|p| p == c).unwrap_or(PRINTABLE.len())
}

/// Sum of the ranks of every character in `s`.
pub fn rank_sum(s: &str) -> f64 {
    s.chars().map(|c| char_rank(c) as f64).sum()
}

/// Numeric reading of a value: JSON numbers, booleans, and strings that parse as floats.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Printable form of a value. Strings are taken verbatim, everything else as JSON text.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Distance between an expected value `a` and an observed value `b`.
///
/// The numeric case keeps its sign; callers rank on the absolute value.
pub fn field_distance(a: &Value, b: &Value) -> f64 {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x - y;
    }
    if a.is_array() || b.is_array() {
        return sequence_distance(a, b);
    }
    string_distance(&text(a), &text(b))
}

fn string_distance(a: &str, b: &str) -> f64 {
    let len_diff = a.chars().count().abs_diff(b.chars().count()) as f64;
    let per_char: f64 = a
        .chars()
        .zip(b.chars())
        .map(|(x, y)| char_rank(x).abs_diff(char_rank(y)) as f64)
        .sum();
    len_diff + per_char
}

/// A list stays a list; any other value is split into one-character strings.
fn elements(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => text(other).chars().map(|c| Value::String(c.to_string())).collect(),
    }
}

fn sequence_distance(a: &Value, b: &Value) -> f64 {
    let left = elements(a);
    let right = elements(b);

    let mut diff = 0.0;
    if a.is_array() != b.is_array() {
        diff += 1.0;
    }
    diff += left.len().abs_diff(right.len()) as f64;
    for (x, y) in left.iter().zip(right.iter()) {
        diff += element_distance(x, y);
    }
    diff
}

fn element_distance(a: &Value, b: &Value) -> f64 {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => (x - y).abs(),
        _ => (rank_sum(&text(a)) - rank_sum(&text(b))).abs(),
    }
}

/// Penalty for a checked field the observed message does not carry at all.
pub fn missing_field_penalty(expected: &Value) -> f64 {
    if let Some(n) = as_number(expected) {
        return n.abs();
    }
    let len = match expected {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    };
    len as f64 + 1.0
}

/// Loose equality: numbers compare by value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
