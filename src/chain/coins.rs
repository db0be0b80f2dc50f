//! Native currency amounts.
//!
//! A [`Coin`] is a single `(denom, amount)` pair, a [`Coins`] value is a
//! canonical per-denom set: sorted by denomination, no zero entries, no
//! duplicates. All comparisons are per-denom.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The native micro-denomination.
pub const UGNOT_DENOM: &str = "ugnot";

/// Errors raised while parsing coin amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("empty coin expression")]
    Empty,

    #[error("invalid coin amount in {0:?}")]
    InvalidAmount(String),

    #[error("invalid coin denomination in {0:?}")]
    InvalidDenom(String),

    #[error("duplicate coin denomination {0:?}")]
    DuplicateDenom(String),
}

/// A single denominated amount, e.g. `1000000ugnot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    /// Parses `<amount><denom>`, where the amount is a run of ASCII digits
    /// and the denomination is a run of lowercase ASCII letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoinError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinError::InvalidDenom(s.to_string()))?;

        let (amount_str, denom) = s.split_at(split);
        if amount_str.is_empty() {
            return Err(CoinError::InvalidAmount(s.to_string()));
        }

        if denom.is_empty() || !denom.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(CoinError::InvalidDenom(s.to_string()));
        }

        let amount = amount_str
            .parse::<u64>()
            .map_err(|_| CoinError::InvalidAmount(s.to_string()))?;

        Ok(Self::new(denom, amount))
    }
}

/// A canonical set of coins, keyed by denomination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Creates a canonical set from arbitrary coins, merging duplicates
    /// and dropping zero amounts.
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Self {
        let mut set = Self::default();
        for coin in coins {
            set.merge(coin);
        }
        set
    }

    /// The coins in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// The amount held in the given denomination, 0 if absent.
    pub fn amount_of(&self, denom: &str) -> u64 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map_or(0, |c| c.amount)
    }

    /// Returns a new set holding the per-denom sum of `self` and `other`.
    pub fn add(&self, other: &Coins) -> Coins {
        let mut sum = self.clone();
        for coin in other.iter() {
            sum.merge(coin.clone());
        }
        sum
    }

    /// True if, for every denomination in `other`, this set holds a strictly
    /// greater amount. False when the denom sets differ or `other` is empty.
    pub fn is_all_gt(&self, other: &Coins) -> bool {
        if other.is_zero() {
            return false;
        }

        other
            .iter()
            .all(|c| self.has_denom(&c.denom) && self.amount_of(&c.denom) > c.amount)
    }

    /// True if, for every denomination in `other`, this set holds a strictly
    /// smaller amount. A denomination missing from this set counts as 0.
    /// False when `other` is empty.
    pub fn is_all_lt(&self, other: &Coins) -> bool {
        if other.is_zero() {
            return false;
        }

        other.iter().all(|c| self.amount_of(&c.denom) < c.amount)
    }

    /// True if every denomination in this set appears in `other` with an
    /// amount at least as large. This is the cap admission rule: the
    /// requested denoms must be a subset of the cap's denoms with no
    /// per-denom excess, so an unknown denomination is never forwarded.
    pub fn fits_within(&self, other: &Coins) -> bool {
        self.iter().all(|c| c.amount <= other.amount_of(&c.denom))
    }

    fn has_denom(&self, denom: &str) -> bool {
        self.0.iter().any(|c| c.denom == denom)
    }

    fn merge(&mut self, coin: Coin) {
        if coin.amount == 0 {
            return;
        }

        match self.0.iter_mut().find(|c| c.denom == coin.denom) {
            Some(existing) => {
                existing.amount = existing.amount.saturating_add(coin.amount);
            }
            None => {
                let at = self
                    .0
                    .partition_point(|c| c.denom.as_str() < coin.denom.as_str());
                self.0.insert(at, coin);
            }
        }
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Self::new([coin])
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(Coin::to_string)
            .collect::<Vec<_>>()
            .join(",");

        f.write_str(&joined)
    }
}

impl FromStr for Coins {
    type Err = CoinError;

    /// Parses a comma-joined coin list, e.g. `100ugnot` or `1atom,5ugnot`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoinError::Empty);
        }

        let mut coins = Vec::new();
        for part in s.split(',') {
            let coin: Coin = part.parse()?;
            if coins.iter().any(|c: &Coin| c.denom == coin.denom) {
                return Err(CoinError::DuplicateDenom(coin.denom));
            }
            coins.push(coin);
        }

        Ok(Self::new(coins))
    }
}

impl Serialize for Coins {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Coins::default());
        }

        raw.parse().map_err(serde::de::Error::custom)
    }
}
