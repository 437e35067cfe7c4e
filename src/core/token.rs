//! Token identification and per-token data storage.
//!
//! ## TokenId
//!
//! Type-safe token identifier. Tokens are indices into the configured
//! roster; display labels live in `RaceConfig`.
//!
//! ## TokenMap
//!
//! Per-token data storage backed by `Vec` for O(1) access.
//! Supports iteration and indexing by `TokenId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Token identifier supporting 1-255 tokens.
///
/// Token indices are 0-based: the first roster entry is `TokenId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u8);

impl TokenId {
    /// Create a new token ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw roster index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all token IDs for a roster of `token_count` tokens.
    pub fn all(token_count: usize) -> impl Iterator<Item = TokenId> {
        (0..token_count as u8).map(TokenId)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {}", self.0)
    }
}

/// Per-token data storage with O(1) access.
///
/// Backed by a `Vec<T>` with one entry per roster token.
///
/// ## Example
///
/// ```
/// use ring_race::core::{TokenId, TokenMap};
///
/// let mut steps: TokenMap<u64> = TokenMap::with_value(4, 0);
/// steps[TokenId::new(1)] += 3;
/// assert_eq!(steps[TokenId::new(1)], 3);
/// assert_eq!(steps[TokenId::new(0)], 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenMap<T> {
    data: Vec<T>,
}

impl<T> TokenMap<T> {
    /// Create a new TokenMap with values from a factory function.
    ///
    /// The factory receives the `TokenId` for each token.
    pub fn new(token_count: usize, factory: impl Fn(TokenId) -> T) -> Self {
        assert!(token_count > 0, "Must have at least 1 token");
        assert!(token_count <= 255, "At most 255 tokens supported");

        let data = (0..token_count as u8).map(|i| factory(TokenId(i))).collect();

        Self { data }
    }

    /// Create a new TokenMap with all entries set to the same value.
    pub fn with_value(token_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(token_count, |_| value.clone())
    }

    /// Get the number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a token's data.
    #[must_use]
    pub fn get(&self, token: TokenId) -> &T {
        &self.data[token.index()]
    }

    /// Get a mutable reference to a token's data.
    pub fn get_mut(&mut self, token: TokenId) -> &mut T {
        &mut self.data[token.index()]
    }

    /// Reset every entry to the same value.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for slot in &mut self.data {
            *slot = value.clone();
        }
    }

    /// Iterate over (TokenId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (TokenId(i as u8), v))
    }

    /// View the underlying per-token values in roster order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<TokenId> for TokenMap<T> {
    type Output = T;

    fn index(&self, token: TokenId) -> &Self::Output {
        self.get(token)
    }
}

impl<T> IndexMut<TokenId> for TokenMap<T> {
    fn index_mut(&mut self, token: TokenId) -> &mut Self::Output {
        self.get_mut(token)
    }
}
