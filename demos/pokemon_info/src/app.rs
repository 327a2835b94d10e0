use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::ValueEnum;
use reprise_core::*;
use reprise_devtools::Inspector;
use reprise_ui::inspect;
use reprise_ui::*;
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::info::{PokemonInfo, RejectionPolicy};
use crate::pokedex::PokemonSource;
use crate::views::{ErrorFallback, NAME_HINT, PokemonForm};

/// How the info panel recovers from a thrown lookup failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BoundaryStrategy {
    /// No boundary around the panel.
    None,
    /// Boundary keyed by the submitted name: a new name remounts it.
    Remount,
    /// Boundary with the name as reset key and a "Try again" action that
    /// clears the name.
    #[default]
    ResetKeys,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub policy: RejectionPolicy,
    pub boundary: BoundaryStrategy,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("policy 'throw' needs a boundary; use --boundary remount or reset-keys")]
    ThrowWithoutBoundary,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy == RejectionPolicy::Throw && self.boundary == BoundaryStrategy::None {
            return Err(ConfigError::ThrowWithoutBoundary);
        }
        Ok(())
    }
}

/// The application: a form that owns the submitted name and an info panel
/// that looks it up.
pub struct PokemonApp {
    config: AppConfig,
    source: Rc<dyn PokemonSource>,
    name: Signal<String>,
    inspector: Rc<Inspector>,
}

impl PokemonApp {
    pub fn new(config: AppConfig, source: Rc<dyn PokemonSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            name: signal(String::new()),
            inspector: Rc::new(Inspector::new()),
        })
    }

    /// The submitted name. Empty until the first submit.
    pub fn name(&self) -> &Signal<String> {
        &self.name
    }

    pub fn inspector(&self) -> &Rc<Inspector> {
        &self.inspector
    }

    /// Root build function.
    pub fn view(&self) -> View {
        let name = self.name.get();
        with_error_reporter(self.inspector.clone(), || {
            Surface(
                Modifier::new().background(theme().background),
                Column(Modifier::new()).child((
                    key("form", || {
                        let submitted = self.name.clone();
                        PokemonForm(&name, move |n| handle_submit(&submitted, n))
                    }),
                    Box(Modifier::new().test_tag("pokemon-info"))
                        .child(key("info", || self.info_panel(&name))),
                )),
            )
        })
    }

    fn info_panel(&self, name: &str) -> View {
        let policy = self.config.policy;
        let content = {
            let name = name.to_string();
            let source = self.source.clone();
            move || PokemonInfo(&name, source.clone(), policy)
        };

        match self.config.boundary {
            BoundaryStrategy::None => content(),
            BoundaryStrategy::Remount => key(format!("pokemon:{name}"), || {
                ErrorBoundary(|info, _| ErrorFallback(info, None), content)
            }),
            BoundaryStrategy::ResetKeys => {
                let submitted = self.name.clone();
                Boundary::new()
                    .reset_key(name.to_string())
                    .on_reset(move || submitted.set(String::new()))
                    .show(|info, reset| ErrorFallback(info, Some(reset)), content)
            }
        }
    }
}

fn handle_submit(name: &Signal<String>, next: String) {
    if name.set_if_changed(next.clone()) {
        log::info!("submit: {next:?}");
    }
}

/// One scripted user interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Type a name into the form and submit it.
    Submit(String),
    /// Click the button with this label.
    Click(String),
    /// Let pending lookups settle.
    Wait,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some(("submit", name)) => Ok(Action::Submit(name.trim().to_string())),
            Some(("click", label)) if !label.trim().is_empty() => {
                Ok(Action::Click(label.trim().to_string()))
            }
            None if s == "wait" => Ok(Action::Wait),
            _ => bail!("unknown action {s:?}; expected submit:<name>, click:<label> or wait"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Submit(name) => write!(f, "submit {name:?}"),
            Action::Click(label) => write!(f, "click [{label}]"),
            Action::Wait => f.write_str("wait"),
        }
    }
}

/// Parses `submit:pikachu; wait; click:Try again`.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<Action>> {
    script
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse().with_context(|| format!("in script {script:?}")))
        .collect()
}

/// Drives a `PokemonApp` headlessly: compose, act, pump, repeat.
pub struct Session {
    scheduler: Scheduler,
    app: PokemonApp,
    frame: Frame,
}

impl Session {
    pub fn start(app: PokemonApp) -> Self {
        let mut scheduler = Scheduler::new();
        let frame = scheduler.compose(|_| app.view());
        app.inspector.frame(&frame);
        Self {
            scheduler,
            app,
            frame,
        }
    }

    pub fn app(&self) -> &PokemonApp {
        &self.app
    }

    pub fn view(&self) -> &View {
        &self.frame.root
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Runs ready tasks and recomposes if anything changed.
    pub fn pump(&mut self) -> bool {
        let app = &self.app;
        match self.scheduler.pump(|_| app.view()) {
            Some(frame) => {
                app.inspector.frame(&frame);
                self.frame = frame;
                true
            }
            None => false,
        }
    }

    /// Pumps until no task or timer is left, sleeping until timers are due.
    /// Gives up after `limit` of wall time.
    pub fn run_until_idle(&mut self, limit: Duration) -> anyhow::Result<()> {
        let started = Instant::now();
        loop {
            self.pump();
            let Some(deadline) = next_deadline() else {
                if has_pending() {
                    continue;
                }
                return Ok(());
            };
            if started.elapsed() > limit {
                bail!("lookups still pending after {limit:?}");
            }
            let wait = deadline.saturating_duration_since(clock::now());
            std::thread::sleep(wait.min(limit));
        }
    }

    pub fn perform(&mut self, action: &Action) -> anyhow::Result<()> {
        log::debug!("session: {action}");
        match action {
            Action::Submit(name) => {
                if !inspect::submit(self.view(), NAME_HINT, name) {
                    bail!("no name field on screen");
                }
            }
            Action::Click(label) => {
                if !inspect::click(self.view(), label) {
                    bail!("no button [{label}] on screen");
                }
            }
            Action::Wait => return self.run_until_idle(Duration::from_secs(10)),
        }
        self.pump();
        Ok(())
    }

    /// Tears the session down, running every remaining cleanup.
    pub fn finish(self) -> Rc<Inspector> {
        let inspector = self.app.inspector.clone();
        self.scheduler.shutdown();
        inspector
    }
}
