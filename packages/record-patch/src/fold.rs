//! Case folding of record field identifiers into default external names.
//!
//! `DateOfBirth` becomes `date_of_birth`; runs of uppercase letters stay
//! glued so acronyms fold as one word (`HTTPServer` becomes `http_server`).

use serde::{Deserialize, Serialize};

/// Word separator inserted at case transitions.
pub const SEPARATOR: char = '_';

/// How whitespace inside an identifier is folded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldMode {
    /// Whitespace becomes a single separator between words.
    #[default]
    Normalized,
    /// Byte-for-byte compatible with legacy consumers: whitespace is dropped
    /// and the following rune is uppercased first, so `"two words"` folds to
    /// `"two_words"` but `"a b"` folds to `"ab"` and `" Lead"` to `"_lead"`.
    Legacy,
}

/// Folds an identifier with [`FoldMode::Normalized`].
pub fn fold(identifier: &str) -> String {
    fold_with(identifier, FoldMode::Normalized)
}

/// Folds a mixed or camel case identifier into a lowercase, separator
/// delimited name.
///
/// Deterministic, not invertible. Uppercase runes are lowercased and get a
/// separator in front of them only at a case transition: the previous rune is
/// lowercase, or the next one is. Every other rune is emitted unchanged.
pub fn fold_with(identifier: &str, mode: FoldMode) -> String {
    let mut input: Vec<char> = identifier.chars().collect();
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut last: Option<char> = None;
    let mut boundary = false;

    for i in 0..input.len() {
        let rune = input[i];

        if rune.is_whitespace() {
            match mode {
                FoldMode::Normalized => {
                    boundary = last.is_some();
                    continue;
                }
                FoldMode::Legacy => {
                    if let Some(next) = input.get(i + 1).copied() {
                        input[i + 1] = single_upper(next);
                    }
                    continue;
                }
            }
        }

        if boundary {
            boundary = false;
            if last != Some(SEPARATOR) && rune != SEPARATOR {
                out.push(SEPARATOR);
                last = Some(SEPARATOR);
            }
        }

        if rune.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| input[p]);
            let next = input.get(i + 1).copied();
            let after_separator = match mode {
                FoldMode::Normalized => last.is_none() || last == Some(SEPARATOR),
                FoldMode::Legacy => prev.is_none() || prev == Some(SEPARATOR),
            };
            let transition = prev.is_some_and(char::is_lowercase) || next.is_some_and(char::is_lowercase);

            if !after_separator && transition {
                out.push(SEPARATOR);
            }
            for lower in rune.to_lowercase() {
                out.push(lower);
                last = Some(lower);
            }
            continue;
        }

        out.push(rune);
        last = Some(rune);
    }

    out
}

/// Uppercases a rune when its uppercase form is a single rune.
fn single_upper(rune: char) -> char {
    let mut upper = rune.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => rune,
    }
}
