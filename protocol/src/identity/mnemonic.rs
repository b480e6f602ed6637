//! Seed <-> 24-word BIP-39 phrase.
//!
//! The phrase is only an encoding of the 32-byte seed (its entropy). No
//! PBKDF2 seed stretching happens here; MMX derives keys from the entropy
//! itself, see [`super::derivation`].

use bip39::{Language, Mnemonic};

use super::derivation::Seed;
use crate::config::SEED_LENGTH;
use crate::crypto::KeyError;

/// Number of words in a wallet phrase.
pub const MNEMONIC_WORDS: usize = 24;

/// Encodes a seed as its English phrase.
pub fn seed_to_mnemonic(seed: &Seed) -> Result<String, KeyError> {
    let mnemonic = Mnemonic::from_entropy(seed.as_bytes(), Language::English)
        .map_err(|e| KeyError::InvalidMnemonic(format!("{e}")))?;
    Ok(mnemonic.phrase().to_string())
}

/// Decodes a 24-word English phrase back into its seed.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Seed, KeyError> {
    let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let word_count = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if word_count != MNEMONIC_WORDS {
        return Err(KeyError::InvalidMnemonic(format!(
            "expected {MNEMONIC_WORDS} words, got {word_count}"
        )));
    }

    let mnemonic = Mnemonic::from_phrase(&normalized, Language::English)
        .map_err(|e| KeyError::InvalidMnemonic(format!("{e}")))?;
    let entropy = mnemonic.entropy();
    if entropy.len() != SEED_LENGTH {
        return Err(KeyError::InvalidMnemonic(format!(
            "phrase encodes {} bytes, expected {SEED_LENGTH}",
            entropy.len()
        )));
    }
    Seed::from_slice(entropy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_phrase() -> String {
        let mut words = vec!["abandon"; 23];
        words.push("art");
        words.join(" ")
    }

    #[test]
    fn zero_seed_phrase() {
        let phrase = seed_to_mnemonic(&Seed::new([0u8; 32])).unwrap();
        assert_eq!(phrase, zero_phrase());
    }

    #[test]
    fn phrase_round_trip() {
        let seed = Seed::generate();
        let phrase = seed_to_mnemonic(&seed).unwrap();
        assert_eq!(phrase.split(' ').count(), MNEMONIC_WORDS);
        assert_eq!(mnemonic_to_seed(&phrase).unwrap(), seed);
    }

    #[test]
    fn tolerates_whitespace_and_case() {
        let messy = format!("  {}  ", zero_phrase().to_uppercase().replace(' ', "   "));
        assert_eq!(mnemonic_to_seed(&messy).unwrap(), Seed::new([0u8; 32]));
    }

    #[test]
    fn rejects_wrong_word_count_and_bad_checksum() {
        let twelve = vec!["abandon"; 12].join(" ");
        assert!(matches!(
            mnemonic_to_seed(&twelve),
            Err(KeyError::InvalidMnemonic(_))
        ));

        // 24 x "abandon" has the wrong checksum word.
        let bad = vec!["abandon"; 24].join(" ");
        assert!(mnemonic_to_seed(&bad).is_err());
    }
}
