use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters a license key may contain.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of hyphen-separated groups and characters per group.
const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// Formatted length: 16 characters plus 3 hyphens.
pub const FORMATTED_LEN: usize = GROUPS * GROUP_LEN + (GROUPS - 1);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LicenseKeyError {
    #[error("license key must be {FORMATTED_LEN} characters, got {0}")]
    WrongLength(usize),

    #[error("license key must be four hyphen-separated groups of four characters")]
    BadGrouping,

    #[error("license key contains character outside [A-Z0-9]: {0:?}")]
    BadCharacter(char),
}

/// A purchase license key, e.g. `AB12-CD34-EF56-GH78`.
///
/// Immutable once issued and unique per purchase; the purchase workflow
/// enforces uniqueness at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Generate a key from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a key from a caller-supplied RNG (tests pin seeds this way).
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut out = String::with_capacity(FORMATTED_LEN);
        for i in 0..(GROUPS * GROUP_LEN) {
            if i > 0 && i % GROUP_LEN == 0 {
                out.push('-');
            }
            let idx = rng.gen_range(0..ALPHABET.len());
            out.push(ALPHABET[idx] as char);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LicenseKey {
    type Err = LicenseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FORMATTED_LEN {
            return Err(LicenseKeyError::WrongLength(s.len()));
        }

        let groups: Vec<&str> = s.split('-').collect();
        if groups.len() != GROUPS || groups.iter().any(|g| g.len() != GROUP_LEN) {
            return Err(LicenseKeyError::BadGrouping);
        }

        for c in groups.iter().flat_map(|g| g.chars()) {
            if !c.is_ascii_uppercase() && !c.is_ascii_digit() {
                return Err(LicenseKeyError::BadCharacter(c));
            }
        }

        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_key_has_formatted_length() {
        let key = LicenseKey::generate();
        assert_eq!(key.as_str().len(), 19);
    }

    #[test]
    fn generated_key_groups_correctly() {
        let key = LicenseKey::generate();
        let groups: Vec<&str> = key.as_str().split('-').collect();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert_eq!(group.len(), 4);
            assert!(group.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn generation_is_seed_deterministic() {
        let a = LicenseKey::generate_with(&mut StdRng::seed_from_u64(7));
        let b = LicenseKey::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_give_different_keys() {
        let a = LicenseKey::generate_with(&mut StdRng::seed_from_u64(1));
        let b = LicenseKey::generate_with(&mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }

    #[test]
    fn parse_accepts_well_formed_key() {
        let key: LicenseKey = "AB12-CD34-EF56-GH78".parse().unwrap();
        assert_eq!(key.as_str(), "AB12-CD34-EF56-GH78");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "AB12-CD34".parse::<LicenseKey>().unwrap_err();
        assert!(matches!(err, LicenseKeyError::WrongLength(9)));
    }

    #[test]
    fn parse_rejects_misplaced_hyphens() {
        let err = "AB12C-D34-EF56-GH7".parse::<LicenseKey>().unwrap_err();
        assert_eq!(err, LicenseKeyError::BadGrouping);
    }

    #[test]
    fn parse_rejects_lowercase() {
        let err = "ab12-CD34-EF56-GH78".parse::<LicenseKey>().unwrap_err();
        assert!(matches!(err, LicenseKeyError::BadCharacter('a')));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: every generated key parses back unchanged.
            #[test]
            fn generated_keys_round_trip(seed in any::<u64>()) {
                let key = LicenseKey::generate_with(&mut StdRng::seed_from_u64(seed));
                let parsed: LicenseKey = key.as_str().parse().unwrap();
                prop_assert_eq!(key, parsed);
            }

            /// Property: well-formed strings always parse.
            #[test]
            fn well_formed_strings_parse(raw in "[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}") {
                prop_assert!(raw.parse::<LicenseKey>().is_ok());
            }
        }
    }
}
