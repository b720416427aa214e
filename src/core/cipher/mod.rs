//! Reversible text obfuscation with ciphertext-only key recovery
//!
//! Free-text columns are obfuscated with a Caesar shift whose key is drawn
//! fresh per encrypt call and never stored. Recovery brute-forces all 25
//! shifts against a word dictionary and picks the shift whose decryption
//! contains the most dictionary words.
//!
//! A whole column is assumed to share one key: recovery runs on the first
//! message only and the recovered shift is applied to every message. This is
//! only correct when the batch really was encrypted with a single key.

use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use rand::Rng;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Word dictionary backing key recovery
///
/// Loaded from a plain text file with one or more whitespace-separated words
/// per line. Membership is case-insensitive (words are lowercased on load and
/// lookup).
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Builds a dictionary from an iterator of words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Loads a dictionary from a word-list file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SiloError::Configuration(format!(
                "Failed to read dictionary {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_words(contents.split_whitespace()))
    }

    /// Case-insensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the dictionary has no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Shifts each ASCII letter by `key` positions modulo 26
///
/// Case is preserved and non-alphabetic characters pass through unchanged.
/// Valid keys are 1..=25; a key of 0 is the identity.
pub fn encrypt(text: &str, key: u8) -> String {
    let key = key % 26;
    text.chars()
        .map(|c| match c {
            'a'..='z' => shift_char(c, b'a', key),
            'A'..='Z' => shift_char(c, b'A', key),
            other => other,
        })
        .collect()
}

/// Inverts [`encrypt`] for the given key
///
/// Round-trips exactly: `decrypt_with_key(encrypt(t, k), k) == t` for any
/// ASCII text and any key.
pub fn decrypt_with_key(text: &str, key: u8) -> String {
    encrypt(text, 26 - (key % 26))
}

/// Draws a uniform random key in 1..=25
pub fn random_key() -> u8 {
    rand::thread_rng().gen_range(1..=25)
}

/// Recovers the Caesar key from ciphertext alone
///
/// Tries every shift in 1..=25; each candidate decryption is split on
/// whitespace and scored by dictionary membership of its lowercase tokens.
/// The first shift with a strictly highest score wins, so ties resolve to
/// the lowest shift tested.
///
/// Returns 0 when no shift produces any dictionary hit. Callers must treat
/// 0 as "recovery inconclusive", not as a legitimate zero shift.
pub fn recover_key(sample: &str, dictionary: &Dictionary) -> u8 {
    let mut best_shift = 0u8;
    let mut max_score = 0usize;

    for shift in 1..=25u8 {
        let candidate = decrypt_with_key(sample, shift);
        let score = candidate
            .split_whitespace()
            .filter(|word| dictionary.contains(word))
            .count();
        if score > max_score {
            best_shift = shift;
            max_score = score;
        }
    }

    best_shift
}

fn shift_char(c: char, base: u8, key: u8) -> char {
    (((c as u8 - base + key) % 26) + base) as char
}

/// Encrypts one string column of a batch under a single fresh key
///
/// The key is generated per call, applied to every row, and returned for
/// observability only; it is never persisted.
///
/// # Errors
///
/// Returns an error if the column is missing or a cell is not a string.
pub fn encrypt_column(batch: &mut Batch, column: &str) -> Result<u8> {
    let key = random_key();
    apply_to_column(batch, column, |text| encrypt(text, key))?;
    Ok(key)
}

/// Decrypts one string column by recovering the key from its first row
///
/// # Errors
///
/// Returns an error if the column is missing, a cell is not a string, or the
/// batch is empty. An inconclusive recovery (no dictionary hits) leaves the
/// column unchanged and is reported through the returned key of 0.
pub fn decrypt_column(batch: &mut Batch, column: &str, dictionary: &Dictionary) -> Result<u8> {
    let sample = match batch.value(0, column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(SiloError::Transform(format!(
                "Column {column} is not free text: {other}"
            )))
        }
        None => {
            return Err(SiloError::Transform(format!(
                "Cannot recover key: column {column} has no rows"
            )))
        }
    };

    let key = recover_key(&sample, dictionary);
    if key == 0 {
        tracing::warn!(column, "Key recovery inconclusive, column left as-is");
        return Ok(0);
    }

    apply_to_column(batch, column, |text| decrypt_with_key(text, key))?;
    Ok(key)
}

fn apply_to_column<F>(batch: &mut Batch, column: &str, f: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    for row in 0..batch.row_count() {
        let text = match batch.value(row, column) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(SiloError::Transform(format!(
                    "Column {column} row {row} is not free text: {other}"
                )))
            }
            None => {
                return Err(SiloError::Transform(format!("Unknown column: {column}")))
            }
        };
        batch.set_value(row, column, Value::String(f(&text)))?;
    }
    Ok(())
}
