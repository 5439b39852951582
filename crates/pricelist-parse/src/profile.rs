//! Vendor parser profiles.
//!
//! Vendors disagree about what a product id looks like: some use bare
//! numeric codes, some hyphenated lot numbers, some free-form alphanumeric
//! SKUs. A profile captures those per-vendor validation rules; unknown
//! vendors get the permissive generic profile.

use serde::{Deserialize, Serialize};

/// Product-id shape policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "kebab-case")]
pub enum IdPolicy {
    /// Digits only, up to `max_len`.
    Numeric {
        /// Maximum id length.
        max_len: usize,
    },
    /// Digit groups joined by hyphens, e.g. `330020-61`.
    Hyphenated {
        /// Maximum id length, hyphens included.
        max_len: usize,
    },
    /// Any compact alphanumeric identifier.
    Flexible {
        /// Maximum id length.
        max_len: usize,
    },
}

/// Per-vendor validation rules applied by the record parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserProfile {
    /// Product-id shape.
    pub id_policy: IdPolicy,
    /// Whether a cost cell must carry an explicit currency symbol.
    pub requires_currency_symbol: bool,
    /// Minimum alphabetic characters a plausible description carries.
    pub min_description_letters: usize,
    /// Descriptions with a higher digit share than this are rejected as
    /// misclustered id or price fragments.
    pub max_digit_ratio: f64,
}

impl Default for ParserProfile {
    /// The permissive generic profile used for unknown vendors.
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::Flexible { max_len: 20 },
            requires_currency_symbol: false,
            min_description_letters: 2,
            max_digit_ratio: 0.7,
        }
    }
}

impl ParserProfile {
    /// Validate a trimmed product id against the profile's policy.
    #[must_use]
    pub fn valid_product_id(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        match self.id_policy {
            IdPolicy::Numeric { max_len } => {
                id.len() <= max_len && id.chars().all(|c| c.is_ascii_digit())
            }
            IdPolicy::Hyphenated { max_len } => {
                id.len() <= max_len
                    && id
                        .split('-')
                        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
            }
            IdPolicy::Flexible { max_len } => {
                id.len() <= max_len
                    && !id.chars().any(char::is_whitespace)
                    && id.chars().any(char::is_alphanumeric)
            }
        }
    }

    /// Validate a trimmed description: needs some letters and must not be
    /// dominated by digits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn valid_description(&self, description: &str) -> bool {
        if description.is_empty() {
            return false;
        }
        let letters = description.chars().filter(|c| c.is_alphabetic()).count();
        if letters < self.min_description_letters {
            return false;
        }
        let digits = description.chars().filter(char::is_ascii_digit).count();
        let ratio = digits as f64 / description.chars().count() as f64;
        ratio <= self.max_digit_ratio
    }
}

/// Maps vendor labels to parser profiles by case-insensitive substring
/// match, falling back to the generic profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    patterns: Vec<(String, ParserProfile)>,
    generic: ParserProfile,
}

impl ProfileRegistry {
    /// Empty registry; every vendor resolves to the generic profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile for vendor labels containing `pattern`
    /// (case-insensitive). Earlier registrations win, so register specific
    /// patterns first.
    pub fn register(&mut self, pattern: impl Into<String>, profile: ParserProfile) {
        self.patterns.push((pattern.into().to_lowercase(), profile));
    }

    /// Resolve the profile for a vendor label.
    #[must_use]
    pub fn profile_for(&self, vendor: &str) -> &ParserProfile {
        let needle = vendor.to_lowercase();
        self.patterns
            .iter()
            .find(|(pattern, _)| needle.contains(pattern))
            .map_or(&self.generic, |(_, profile)| profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_policy_rejects_letters_and_overlength_ids() {
        let profile = ParserProfile {
            id_policy: IdPolicy::Numeric { max_len: 6 },
            ..ParserProfile::default()
        };
        assert!(profile.valid_product_id("123456"));
        assert!(!profile.valid_product_id("1234567"));
        assert!(!profile.valid_product_id("A1234"));
        assert!(!profile.valid_product_id("12-34"));
    }

    #[test]
    fn hyphenated_policy_accepts_lot_numbers() {
        let profile = ParserProfile {
            id_policy: IdPolicy::Hyphenated { max_len: 12 },
            ..ParserProfile::default()
        };
        assert!(profile.valid_product_id("330020-61"));
        assert!(profile.valid_product_id("330020"));
        assert!(!profile.valid_product_id("330020-"));
        assert!(!profile.valid_product_id("33A020-61"));
    }

    #[test]
    fn flexible_policy_wants_compact_alphanumerics() {
        let profile = ParserProfile::default();
        assert!(profile.valid_product_id("A100"));
        assert!(profile.valid_product_id("PL-44B"));
        assert!(!profile.valid_product_id("A 100"));
        assert!(!profile.valid_product_id("---"));
        assert!(!profile.valid_product_id(""));
    }

    #[test]
    fn descriptions_need_letters_and_few_digits() {
        let profile = ParserProfile::default();
        assert!(profile.valid_description("Chicken Breast 40lb"));
        assert!(!profile.valid_description("1234567890 x1"));
        assert!(!profile.valid_description("7"));
        assert!(!profile.valid_description(""));
    }

    #[test]
    fn registry_matches_substrings_case_insensitively() {
        let mut registry = ProfileRegistry::new();
        registry.register(
            "zant",
            ParserProfile {
                id_policy: IdPolicy::Numeric { max_len: 6 },
                requires_currency_symbol: true,
                ..ParserProfile::default()
            },
        );

        let matched = registry.profile_for("RW Zant");
        assert!(matched.requires_currency_symbol);
        assert_eq!(matched.id_policy, IdPolicy::Numeric { max_len: 6 });

        let generic = registry.profile_for("Unknown Vendor");
        assert!(!generic.requires_currency_symbol);
    }
}
