//! Placeholder markers and argument substitution.
//!
//! Markers are `%1` through `%99`, optionally written `%L1` (locale-aware
//! in Qt; formatted the same way here). `%0`, a lone `%` and `%%` are
//! literal text. The count marker `%n` / `%Ln` belongs to numerus messages
//! and is handled by [`replace_count`].
//!
//! # Invariants
//!
//! 1. **Ordinal binding**: the i-th argument replaces every occurrence of
//!    the i-th lowest distinct marker number, so `"%2 %1"` and `"%1 %2"`
//!    bind arguments to the same numbers.
//! 2. **Single pass**: substituted text is never rescanned; an argument
//!    containing `%1` stays literal.
//! 3. **Surplus is inert**: markers without an argument stay as written,
//!    arguments without a marker are ignored.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    start: usize,
    end: usize,
    number: u8,
}

fn scan(template: &str) -> Vec<Marker> {
    let bytes = template.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        if bytes.get(j) == Some(&b'L') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && j - digits_start < 2 && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == digits_start {
            i += 1;
            continue;
        }
        let number = template[digits_start..j].parse::<u8>().unwrap_or(0);
        if number == 0 {
            i = j;
            continue;
        }
        found.push(Marker {
            start: i,
            end: j,
            number,
        });
        i = j;
    }
    found
}

/// Distinct marker numbers in `text`, ascending.
#[must_use]
pub fn markers(text: &str) -> BTreeSet<u8> {
    scan(text).into_iter().map(|m| m.number).collect()
}

/// Whether `text` contains at least one `%1`..`%99` marker.
#[must_use]
pub fn has_markers(text: &str) -> bool {
    !scan(text).is_empty()
}

/// Substitute `args` into `template`.
///
/// ```
/// use tscat::placeholder::substitute;
///
/// assert_eq!(substitute("Zeile: %1, Position: %2", &["4", "10"]), "Zeile: 4, Position: 10");
/// assert_eq!(substitute("Version %2 is now available!", &["4.0"]), "Version 4.0 is now available!");
/// ```
#[must_use]
pub fn substitute<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    if args.is_empty() {
        return template.to_string();
    }
    let found = scan(template);
    if found.is_empty() {
        return template.to_string();
    }

    let mut numbers: Vec<u8> = found.iter().map(|m| m.number).collect();
    numbers.sort_unstable();
    numbers.dedup();

    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    for marker in &found {
        let slot = numbers.iter().position(|&n| n == marker.number);
        if let Some(arg) = slot.and_then(|slot| args.get(slot)) {
            result.push_str(&template[last..marker.start]);
            result.push_str(arg.as_ref());
            last = marker.end;
        }
    }
    result.push_str(&template[last..]);
    result
}

/// Replace the numerus count markers `%n` and `%Ln` with `count`.
#[must_use]
pub fn replace_count(template: &str, count: i64) -> String {
    if !has_count_marker(template) {
        return template.to_string();
    }
    let count = count.to_string();
    let mut result = String::with_capacity(template.len() + count.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(after) = tail.strip_prefix('n') {
            result.push_str(&count);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("Ln") {
            result.push_str(&count);
            rest = after;
        } else {
            result.push('%');
            rest = tail;
        }
    }
    result.push_str(rest);
    result
}

/// Whether `text` contains `%n` or `%Ln`.
#[must_use]
pub fn has_count_marker(text: &str) -> bool {
    text.contains("%n") || text.contains("%Ln")
}
