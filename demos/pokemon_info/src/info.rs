use std::rc::Rc;

use clap::ValueEnum;
use reprise_core::prelude::*;
use reprise_ui::*;

use crate::pokedex::PokemonSource;
use crate::views::{ErrorBlock, PokemonDataView, PokemonInfoFallback};

pub const IDLE_PROMPT: &str = "Submit a pokemon";

/// What a rejected lookup does when rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RejectionPolicy {
    /// Render the error in place.
    Inline,
    /// Raise it to the nearest error boundary.
    #[default]
    Throw,
}

/// Lookup status for `name` rendered as a view. An empty name is idle.
pub fn PokemonInfo(name: &str, source: Rc<dyn PokemonSource>, policy: RejectionPolicy) -> View {
    let subject = (!name.is_empty()).then(|| name.to_string());
    let state = use_request(subject, move |name: &String, settle| source.fetch(name, settle));

    match state {
        RequestState::Idle => Text(IDLE_PROMPT),
        RequestState::Pending => PokemonInfoFallback(name),
        RequestState::Resolved(pokemon) => PokemonDataView(&pokemon),
        RequestState::Rejected(error) => match policy {
            RejectionPolicy::Inline => ErrorBlock(&error.to_string()),
            RejectionPolicy::Throw => throw(error),
        },
    }
}
