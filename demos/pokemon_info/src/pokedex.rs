//! Lookup service: the trait the UI talks to and an in-memory pokedex.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use reprise_core::{Settle, post_delayed};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

const BUILTIN: &str = include_str!("../data/pokedex.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub damage: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacks {
    #[serde(default)]
    pub special: Vec<Attack>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: String,
    pub number: String,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub attacks: Attacks,
    /// When the lookup completed. Unset on entries that were never fetched.
    #[serde(default, rename = "fetchedAt")]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Why a lookup failed. The Display text is what users see.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No pokemon with the name \"{name}\"")]
    NotFound { name: String },
    #[error("{message}")]
    Service { message: String },
}

#[derive(Debug, Error)]
pub enum PokedexError {
    #[error("invalid pokedex data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate pokedex entry for {0:?}")]
    Duplicate(String),
}

/// Asynchronous lookup by name. Implementations complete through `settle`,
/// on the UI thread, at most once.
pub trait PokemonSource {
    fn fetch(&self, name: &str, settle: Settle<Pokemon, FetchError>);
}

impl<S: PokemonSource + ?Sized> PokemonSource for Rc<S> {
    fn fetch(&self, name: &str, settle: Settle<Pokemon, FetchError>) {
        (**self).fetch(name, settle)
    }
}

/// In-memory pokedex that answers after a fixed latency.
pub struct Pokedex {
    entries: HashMap<String, Pokemon>,
    latency: Duration,
}

impl Pokedex {
    pub fn builtin() -> Result<Self, PokedexError> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self, PokedexError> {
        let list: Vec<Pokemon> = serde_json::from_str(json)?;
        let mut entries = HashMap::with_capacity(list.len());
        for p in list {
            let key = p.name.to_lowercase();
            if entries.contains_key(&key) {
                return Err(PokedexError::Duplicate(p.name));
            }
            entries.insert(key, p);
        }
        log::debug!("pokedex: loaded {} entries", entries.len());
        Ok(Self {
            entries,
            latency: Duration::ZERO,
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known names, sorted by pokedex number.
    pub fn names(&self) -> Vec<String> {
        let mut all: Vec<&Pokemon> = self.entries.values().collect();
        all.sort_by(|a, b| a.number.cmp(&b.number));
        all.into_iter().map(|p| p.name.clone()).collect()
    }

    /// Synchronous lookup, case-insensitive on the name. The entry is
    /// returned as stored, without a fetch time.
    pub fn lookup(&self, name: &str) -> Result<Pokemon, FetchError> {
        let key = name.trim().to_lowercase();
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                name: name.to_string(),
            })
    }
}

impl PokemonSource for Pokedex {
    fn fetch(&self, name: &str, settle: Settle<Pokemon, FetchError>) {
        let outcome = self.lookup(name);
        log::debug!(
            "pokedex: '{}' answers in {:?} ({})",
            name,
            self.latency,
            if outcome.is_ok() { "hit" } else { "miss" }
        );
        post_delayed(self.latency, move || {
            let outcome = outcome.map(|p| Pokemon {
                fetched_at: Some(Utc::now()),
                ..p
            });
            settle.settle(outcome)
        });
    }
}
