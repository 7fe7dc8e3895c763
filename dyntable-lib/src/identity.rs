//! Row identity allocation
//!
//! Every row in a table carries a hidden, stable identity under the
//! configured id key. Identities are short random strings drawn from a
//! configurable alphabet; an optional sequential-prefix scheme keeps a
//! human-readable counter at the front. Once assigned an identity is never
//! regenerated, and identities are normalized to upper case everywhere.

use std::collections::HashSet;

use rand::Rng;

use crate::error::IdentityError;

/// The default alphabet: upper-case base-36.
pub const BASE36_UPPER: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How identity candidates are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityScheme {
    /// Fully random candidates.
    #[default]
    Random,
    /// Candidates prefixed with the smallest unused sequential integer,
    /// padded with random characters up to the configured length. Falls
    /// back to the bare integer when every padded candidate collides.
    SequentialPrefix,
}

/// Configuration for identity generation.
///
/// # Example
///
/// ```
/// use dyntable_lib::identity::IdentityConfig;
///
/// let config = IdentityConfig::default();
/// assert_eq!(config.length, 4);
/// assert_eq!(config.collision_max_retries, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Candidate length in characters.
    pub length: usize,
    /// Characters candidates are drawn from.
    pub alphabet: String,
    /// How many candidates to try before giving up.
    pub collision_max_retries: u32,
    /// Candidate construction scheme.
    pub scheme: IdentityScheme,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            length: 4,
            alphabet: BASE36_UPPER.to_string(),
            collision_max_retries: 8,
            scheme: IdentityScheme::Random,
        }
    }
}

impl IdentityConfig {
    /// Sets the candidate length (minimum 1).
    pub fn length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }

    /// Sets a custom alphabet.
    pub fn alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// Sets the collision retry budget (minimum 1).
    pub fn collision_max_retries(mut self, retries: u32) -> Self {
        self.collision_max_retries = retries.max(1);
        self
    }

    /// Sets the candidate construction scheme.
    pub fn scheme(mut self, scheme: IdentityScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

/// Allocate an identity not present in `existing`.
///
/// `existing` must hold upper-case normalized identities; the returned
/// identity is drawn from the configured alphabet and is guaranteed absent
/// from the set. Fails with [`IdentityError::Exhausted`] when the retry
/// budget runs out.
pub fn allocate(
    existing: &HashSet<String>,
    config: &IdentityConfig,
) -> Result<String, IdentityError> {
    if config.alphabet.is_empty() {
        return Err(IdentityError::EmptyAlphabet);
    }
    let alphabet: Vec<char> = config.alphabet.chars().collect();
    let length = config.length.max(1);
    let retries = config.collision_max_retries.max(1);

    match config.scheme {
        IdentityScheme::Random => allocate_random(existing, &alphabet, length, retries),
        IdentityScheme::SequentialPrefix => {
            allocate_sequential(existing, &alphabet, length, retries)
        }
    }
}

fn allocate_random(
    existing: &HashSet<String>,
    alphabet: &[char],
    length: usize,
    retries: u32,
) -> Result<String, IdentityError> {
    let mut rng = rand::rng();
    for _ in 0..retries {
        let candidate = random_chars(&mut rng, alphabet, length);
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(IdentityError::Exhausted { attempts: retries })
}

fn allocate_sequential(
    existing: &HashSet<String>,
    alphabet: &[char],
    length: usize,
    retries: u32,
) -> Result<String, IdentityError> {
    // An integer counts as "used" when it equals the leading digit run of
    // some existing identity.
    let used: HashSet<&str> = existing
        .iter()
        .map(|id| leading_digits(id))
        .filter(|digits| !digits.is_empty())
        .collect();

    let mut counter: u64 = 1;
    let prefix = loop {
        let candidate = counter.to_string();
        if !used.contains(candidate.as_str()) {
            break candidate;
        }
        counter += 1;
    };

    if prefix.len() >= length {
        // No room for padding; the bare integer is unique because its digit
        // run is unused.
        return Ok(prefix);
    }

    let mut rng = rand::rng();
    let pad = length - prefix.len();
    for _ in 0..retries {
        let candidate = format!("{prefix}{}", random_chars(&mut rng, alphabet, pad));
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    // Every padded candidate collided; the bare integer is still free.
    Ok(prefix)
}

fn leading_digits(id: &str) -> &str {
    let end = id
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    &id[..end]
}

fn random_chars(rng: &mut impl Rng, alphabet: &[char], n: usize) -> String {
    (0..n)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_unique_ids() {
        let config = IdentityConfig::default();
        let mut existing = HashSet::new();
        for _ in 0..100 {
            let id = allocate(&existing, &config).unwrap();
            assert_eq!(id.len(), 4);
            assert!(id.chars().all(|c| BASE36_UPPER.contains(c)));
            assert!(existing.insert(id));
        }
    }

    #[test]
    fn test_exhausted_when_space_is_full() {
        let config = IdentityConfig::default().length(1).alphabet("A");
        let existing: HashSet<String> = ["A".to_string()].into();
        assert_eq!(
            allocate(&existing, &config),
            Err(IdentityError::Exhausted { attempts: 8 })
        );
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let config = IdentityConfig::default().alphabet("");
        assert_eq!(
            allocate(&HashSet::new(), &config),
            Err(IdentityError::EmptyAlphabet)
        );
    }

    #[test]
    fn test_sequential_prefix_advances_past_used_prefixes() {
        let config = IdentityConfig::default().scheme(IdentityScheme::SequentialPrefix);
        let existing: HashSet<String> = ["1XYZ".to_string(), "2ABC".to_string()].into();
        let id = allocate(&existing, &config).unwrap();
        assert!(id.starts_with('3'), "unexpected id {id}");
        assert_eq!(id.len(), 4);
    }

    #[test]
    fn test_sequential_prefix_falls_back_to_bare_integer() {
        // Alphabet "0" admits a single padded candidate, "1000". Its digit
        // run is "1000", so the counter 1 is still considered unused; every
        // padded attempt collides and the bare integer comes back.
        let config = IdentityConfig::default()
            .scheme(IdentityScheme::SequentialPrefix)
            .alphabet("0");
        let existing: HashSet<String> = ["1000".to_string()].into();
        assert_eq!(allocate(&existing, &config).unwrap(), "1");
    }

    #[test]
    fn test_sequential_prefix_skips_bare_integer_ids() {
        let config = IdentityConfig::default()
            .scheme(IdentityScheme::SequentialPrefix)
            .length(1);
        let existing: HashSet<String> = ["1".to_string()].into();
        assert_eq!(allocate(&existing, &config).unwrap(), "2");
    }

    #[test]
    fn test_sequential_prefix_longer_than_length() {
        let config = IdentityConfig::default()
            .scheme(IdentityScheme::SequentialPrefix)
            .length(1);
        let mut existing = HashSet::new();
        for expected in ["1", "2", "3"] {
            let id = allocate(&existing, &config).unwrap();
            assert_eq!(id, expected);
            existing.insert(id);
        }
    }
}
