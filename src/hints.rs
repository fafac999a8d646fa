//! Progressive hints revealed as a player burns through attempts.

use tracing::instrument;

use crate::words::category_of;

/// Returns the hint for `word` after `attempts` guesses, if any.
///
/// Only the highest reached tier is returned:
/// - 4 or more attempts: the word's category
/// - 3 attempts: the first letter, uppercased
/// - 2 attempts: the number of characters
/// - fewer than 2: no hint
#[instrument]
pub fn hint(word: &str, attempts: u32) -> Option<String> {
    match attempts {
        4.. => Some(format!("It's a {}", category_of(word))),
        3 => word
            .chars()
            .next()
            .map(|first| format!("It starts with '{}'", first.to_uppercase())),
        2 => Some(format!("This word has {} letters", word.chars().count())),
        _ => None,
    }
}
