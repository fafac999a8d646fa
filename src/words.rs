//! Word catalog: the fixed list of secret words and their categories.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Every word a game can be played with.
pub const GAME_WORDS: &[&str] = &[
    "cat",
    "dog",
    "house",
    "tree",
    "car",
    "sun",
    "moon",
    "star",
    "fish",
    "bird",
    "apple",
    "banana",
    "flower",
    "mountain",
    "ocean",
    "book",
    "phone",
    "computer",
    "guitar",
    "piano",
    "bicycle",
    "airplane",
    "train",
    "boat",
    "elephant",
    "lion",
    "butterfly",
    "rainbow",
    "clock",
    "cake",
    "pizza",
    "ice cream",
    "football",
    "basketball",
    "tennis",
    "swimming",
    "running",
    "dancing",
    "singing",
    "painting",
    "reading",
    "writing",
    "cooking",
    "gardening",
    "shopping",
    "traveling",
    "camping",
    "beach",
    "forest",
    "desert",
    "city",
    "village",
    "bridge",
    "castle",
    "tower",
];

const ANIMALS: &[&str] = &["cat", "dog", "fish", "bird", "elephant", "lion", "butterfly"];
const OBJECTS: &[&str] = &[
    "house", "car", "book", "phone", "computer", "guitar", "piano", "clock",
];
const NATURE: &[&str] = &[
    "tree", "sun", "moon", "star", "mountain", "ocean", "flower", "rainbow",
];
const FOOD: &[&str] = &["apple", "banana", "cake", "pizza", "ice cream"];

/// Broad category of a catalog word, used by the last hint tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Category {
    /// Living creature.
    #[strum(to_string = "animal")]
    #[serde(rename = "animal")]
    Animal,
    /// Man-made object.
    #[strum(to_string = "object")]
    #[serde(rename = "object")]
    Object,
    /// Something found in nature.
    #[strum(to_string = "natural thing")]
    #[serde(rename = "natural thing")]
    NaturalThing,
    /// Something edible.
    #[strum(to_string = "food")]
    #[serde(rename = "food")]
    Food,
    /// Anything not covered above.
    #[strum(to_string = "thing")]
    #[serde(rename = "thing")]
    Thing,
}

/// Classifies a word. Words outside the categorized subsets are a [`Category::Thing`].
#[instrument]
pub fn category_of(word: &str) -> Category {
    if ANIMALS.contains(&word) {
        Category::Animal
    } else if OBJECTS.contains(&word) {
        Category::Object
    } else if NATURE.contains(&word) {
        Category::NaturalThing
    } else if FOOD.contains(&word) {
        Category::Food
    } else {
        Category::Thing
    }
}

/// Picks one catalog word uniformly at random.
#[instrument]
pub fn pick_random_word() -> &'static str {
    // GAME_WORDS is a non-empty constant.
    let word = GAME_WORDS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("cat");
    debug!(word, "Picked random word");
    word
}

/// Source of secret words for new games.
pub trait WordPicker: Send + Sync + std::fmt::Debug {
    /// Returns the secret word for the next game.
    fn pick(&self) -> String;
}

/// Uniform random choice over [`GAME_WORDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogWords;

impl WordPicker for CatalogWords {
    fn pick(&self) -> String {
        pick_random_word().to_string()
    }
}

/// Always hands out the same word. Used for demos and deterministic tests.
#[derive(Debug, Clone, derive_new::new)]
pub struct FixedWord {
    word: String,
}

impl WordPicker for FixedWord {
    fn pick(&self) -> String {
        self.word.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_words_are_lowercase_and_trimmed() {
        for word in GAME_WORDS {
            assert_eq!(*word, word.trim());
            assert_eq!(*word, word.to_lowercase());
            assert!(!word.is_empty());
        }
    }

    #[test]
    fn every_categorized_word_is_in_the_catalog() {
        for word in ANIMALS.iter().chain(OBJECTS).chain(NATURE).chain(FOOD) {
            assert!(GAME_WORDS.contains(word), "{word} missing from catalog");
        }
    }

    #[test]
    fn categories_match_their_subsets() {
        assert_eq!(category_of("lion"), Category::Animal);
        assert_eq!(category_of("piano"), Category::Object);
        assert_eq!(category_of("rainbow"), Category::NaturalThing);
        assert_eq!(category_of("ice cream"), Category::Food);
        assert_eq!(category_of("castle"), Category::Thing);
        assert_eq!(category_of("not-a-word"), Category::Thing);
    }

    #[test]
    fn category_display_is_hint_text() {
        assert_eq!(Category::NaturalThing.to_string(), "natural thing");
        assert_eq!(Category::Animal.to_string(), "animal");
    }

    #[test]
    fn random_word_comes_from_catalog() {
        for _ in 0..50 {
            assert!(GAME_WORDS.contains(&pick_random_word()));
        }
    }

    #[test]
    fn fixed_word_always_repeats() {
        let picker = FixedWord::new("cat".to_string());
        assert_eq!(picker.pick(), "cat");
        assert_eq!(picker.pick(), "cat");
    }
}
