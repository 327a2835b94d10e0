//! Presentation pieces: the form, the loading placeholder, the data view and
//! the error blocks.

use std::rc::Rc;

use reprise_core::prelude::*;
use reprise_ui::*;

use crate::pokedex::Pokemon;

pub const NAME_HINT: &str = "Which pokemon?";
pub const QUICK_PICKS: [&str; 3] = ["pikachu", "charizard", "mew"];

/// Name input with a submit button and a few quick picks.
///
/// The field keeps its own draft text; it follows `name` whenever the parent
/// changes it (for instance when a reset clears the submitted name).
pub fn PokemonForm(name: &str, on_submit: impl Fn(String) + 'static) -> View {
    let draft = remember_with_key("draft", || signal(name.to_string()));
    disposable_effect(name.to_string(), {
        let draft = draft.as_ref().clone();
        move |name| {
            draft.set_if_changed(name.clone());
            Dispose::none()
        }
    });

    let on_submit: Rc<dyn Fn(String)> =
        Rc::new(move |raw: String| on_submit(raw.trim().to_string()));
    let current = draft.get();

    let picks: Vec<View> = QUICK_PICKS
        .into_iter()
        .map(|pick| {
            let on_submit = on_submit.clone();
            let draft = draft.clone();
            Button(pick, move || {
                draft.set(pick.to_string());
                on_submit(pick.to_string());
            })
        })
        .collect();

    Column(Modifier::new().test_tag("pokemon-form")).child((
        Row(Modifier::new()).child((
            TextField(
                current.clone(),
                NAME_HINT,
                {
                    let draft = draft.clone();
                    move |s| draft.set(s)
                },
                {
                    let on_submit = on_submit.clone();
                    move |s| on_submit(s)
                },
            ),
            Button("Submit", {
                let on_submit = on_submit.clone();
                move || on_submit(draft.get())
            }),
        )),
        Row(Modifier::new()).child((Text("Try").size(12.0), picks)),
    ))
}

/// Placeholder shown while the lookup for `name` is in flight.
pub fn PokemonInfoFallback(name: &str) -> View {
    Column(Modifier::new().test_tag("pokemon-fallback"))
        .semantics(Semantics::new(Role::Progress).label(format!("Loading {name}")))
        .child((
            Image(Modifier::new(), "/img/pokemon/fallback-pokemon.jpg", name),
            Text(name).size(24.0),
            Text("XXX"),
            Column(Modifier::new()).child((
                Text("Loading attack 1: (loading type) 0"),
                Text("Loading attack 2: (loading type) 0"),
            )),
            Text("loading...").size(12.0),
        ))
}

pub fn PokemonDataView(pokemon: &Pokemon) -> View {
    let attacks: Vec<View> = pokemon
        .attacks
        .special
        .iter()
        .map(|a| Text(format!("{}: ({}) {}", a.name, a.kind, a.damage)))
        .collect();

    Column(Modifier::new().test_tag("pokemon-data")).child((
        Image(Modifier::new(), pokemon.image.clone(), pokemon.name.clone()),
        Text(pokemon.name.clone()).size(24.0),
        Text(pokemon.number.clone()),
        Column(Modifier::new()).child(attacks),
        pokemon
            .fetched_at
            .map(|at| Text(format!("fetched at {}", at.format("%H:%M:%S%.3f"))).size(12.0)),
    ))
}

/// Inline alert for a failed lookup (no recovery action of its own).
pub fn ErrorBlock(message: &str) -> View {
    Alert(Modifier::new().test_tag("error")).child((
        Text("There was an error:"),
        Text(message).color(theme().on_error),
    ))
}

/// Boundary fallback. `reset` adds a "Try again" action.
pub fn ErrorFallback(info: &ErrorInfo, reset: Option<ResetHandle>) -> View {
    let mut block = ErrorBlock(&info.message);
    if let Some(reset) = reset {
        block
            .children
            .push(Button("Try again", move || reset.reset()));
    }
    block
}
