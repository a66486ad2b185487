//! Deterministic ordering of table elements.

use crate::error::PlugError;
use crate::types::Dynamic;
use std::cmp::Ordering;
use std::str::FromStr;

/// Value of the `dynamic_sort_subtable` meta field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Keep device order
    #[default]
    Disabled,
    Ascending,
    /// Digit runs compare numerically (`port2` before `port10`)
    Natural,
}

impl FromStr for SortMode {
    type Err = PlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "false" => Ok(SortMode::Disabled),
            "true" => Ok(SortMode::Ascending),
            "natural" => Ok(SortMode::Natural),
            other => Err(PlugError::InvalidConfiguration(format!(
                "dynamic_sort_subtable must be one of false, true, natural; got '{}'",
                other
            ))),
        }
    }
}

/// Stable sort of block elements by the nested field `key`. Elements
/// missing the key go last.
pub fn sort_by_key(items: &mut [Dynamic], key: &str, mode: SortMode) {
    if mode == SortMode::Disabled {
        return;
    }
    items.sort_by(|a, b| {
        let ka = a.as_map().and_then(|m| m.get(key));
        let kb = b.as_map().and_then(|m| m.get(key));
        match (ka, kb) {
            (Some(x), Some(y)) => compare_keys(x, y, mode),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn compare_keys(a: &Dynamic, b: &Dynamic, mode: SortMode) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    let (x, y) = (key_text(a), key_text(b));
    match mode {
        SortMode::Natural => natural_cmp(&x, &y),
        _ => x.cmp(&y),
    }
}

fn key_text(value: &Dynamic) -> String {
    match value {
        Dynamic::String(s) => s.clone(),
        Dynamic::Int(i) => i.to_string(),
        Dynamic::Number(n) => n.to_string(),
        Dynamic::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Compares strings with embedded numbers by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ab, bb) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < ab.len() && j < bb.len() {
        if ab[i].is_ascii_digit() && bb[j].is_ascii_digit() {
            let si = i;
            while i < ab.len() && ab[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < bb.len() && bb[j].is_ascii_digit() {
                j += 1;
            }
            let x = trim_zeros(&a[si..i]);
            let y = trim_zeros(&b[sj..j]);
            let ord = x.len().cmp(&y.len()).then_with(|| x.cmp(y));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = ab[i].cmp(&bb[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (ab.len() - i).cmp(&(bb.len() - j)).then_with(|| a.cmp(b))
}

fn trim_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
