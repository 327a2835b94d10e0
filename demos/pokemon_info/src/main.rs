use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use pokemon_info::{AppConfig, BoundaryStrategy, Pokedex, PokemonApp, RejectionPolicy, Session};
use reprise_core::install_panic_hook;
use reprise_ui::inspect;
use web_time::Duration;

/// Headless Pokemon lookup: runs a scripted session and prints the screen
/// after every step.
#[derive(Parser)]
#[command(name = "pokemon-info")]
struct Cli {
    /// What a failed lookup does when rendered
    #[arg(long, value_enum, default_value_t = RejectionPolicy::Throw)]
    policy: RejectionPolicy,

    /// How the info panel recovers from a thrown failure
    #[arg(long, value_enum, default_value_t = BoundaryStrategy::ResetKeys)]
    boundary: BoundaryStrategy,

    /// Simulated lookup latency
    #[arg(long, default_value = "200")]
    latency_ms: u64,

    /// Steps separated by ';': submit:<name>, click:<label>, wait
    #[arg(
        short,
        long,
        default_value = "submit:pikachu;wait;submit:missingno;wait;click:Try again"
    )]
    script: String,

    /// Print captured failures and frame metrics at the end
    #[arg(long)]
    inspect: bool,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    install_panic_hook();

    let actions = pokemon_info::parse_script(&cli.script)?;
    let config = AppConfig {
        policy: cli.policy,
        boundary: cli.boundary,
    };
    let pokedex = Pokedex::builtin()
        .context("loading builtin pokedex")?
        .with_latency(Duration::from_millis(cli.latency_ms));
    log::info!(
        "pokedex ready: {} ({:?}, {:?})",
        pokedex.names().join(", "),
        config.policy,
        config.boundary
    );

    let app = PokemonApp::new(config, Rc::new(pokedex))?;
    let mut session = Session::start(app);
    println!("== start\n{}", inspect::dump(session.view()));

    for action in &actions {
        session.perform(action)?;
        println!("== {action}\n{}", inspect::dump(session.view()));
    }

    let inspector = session.finish();
    if cli.inspect {
        println!("{}", inspector.summary());
        for report in inspector.reports() {
            println!("captured in '{}': {}", report.component, report.message);
        }
    }
    Ok(())
}
