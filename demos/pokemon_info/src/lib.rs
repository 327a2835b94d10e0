//! Pokemon lookup app built on reprise.
//!
//! A form owns the submitted name; the info panel looks it up through a
//! [`PokemonSource`] and renders the request lifecycle. A rejected lookup is
//! either rendered inline or thrown to an error boundary, depending on
//! [`RejectionPolicy`], and the boundary recovers according to
//! [`BoundaryStrategy`].
#![allow(non_snake_case)]

pub mod app;
pub mod info;
pub mod pokedex;
pub mod views;

#[cfg(test)]
mod tests;

pub use app::{Action, AppConfig, BoundaryStrategy, ConfigError, PokemonApp, Session, parse_script};
pub use info::{IDLE_PROMPT, PokemonInfo, RejectionPolicy};
pub use pokedex::{FetchError, Pokedex, PokedexError, Pokemon, PokemonSource};
