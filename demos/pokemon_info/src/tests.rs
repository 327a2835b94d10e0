use std::cell::RefCell;
use std::rc::Rc;

use reprise_core::{Role, Settle};
use reprise_ui::inspect::{self, contains_text, find_by_role, find_by_tag, text_content};

use crate::*;

/// Source that keeps every lookup open until the test settles it.
#[derive(Default)]
struct ManualSource {
    open: RefCell<Vec<Settle<Pokemon, FetchError>>>,
}

impl ManualSource {
    fn subjects(&self) -> Vec<String> {
        self.open
            .borrow()
            .iter()
            .map(|s| s.subject().to_string())
            .collect()
    }

    fn take(&self, subject: &str) -> Settle<Pokemon, FetchError> {
        let mut open = self.open.borrow_mut();
        let at = open
            .iter()
            .position(|s| s.subject() == subject)
            .unwrap_or_else(|| panic!("no open lookup for {subject:?}"));
        open.remove(at)
    }
}

impl PokemonSource for ManualSource {
    fn fetch(&self, _name: &str, settle: Settle<Pokemon, FetchError>) {
        self.open.borrow_mut().push(settle);
    }
}

fn pokemon(name: &str) -> Pokemon {
    let dex = Pokedex::builtin().expect("builtin data parses");
    dex.lookup(name).expect("known pokemon")
}

fn start(policy: RejectionPolicy, boundary: BoundaryStrategy) -> (Session, Rc<ManualSource>) {
    let source = Rc::new(ManualSource::default());
    let app = PokemonApp::new(AppConfig { policy, boundary }, source.clone())
        .expect("valid config");
    (Session::start(app), source)
}

fn submit(session: &mut Session, name: &str) {
    session
        .perform(&Action::Submit(name.to_string()))
        .expect("form is on screen");
}

fn not_found() -> FetchError {
    FetchError::Service {
        message: "not found".into(),
    }
}

#[test]
fn lookup_goes_idle_pending_resolved() {
    let (mut s, source) = start(RejectionPolicy::Throw, BoundaryStrategy::ResetKeys);
    assert!(contains_text(s.view(), IDLE_PROMPT));
    assert!(source.subjects().is_empty());

    submit(&mut s, "pikachu");
    let fallback = find_by_tag(s.view(), "pokemon-fallback").expect("loading view");
    assert!(contains_text(fallback, "pikachu"));
    assert_eq!(fallback.role(), Some(Role::Progress));
    assert!(inspect::find_by_label(s.view(), "Loading pikachu").is_some());
    assert_eq!(source.subjects(), vec!["pikachu"]);

    source.take("pikachu").resolve(pokemon("pikachu"));
    assert!(s.pump());
    let data = find_by_tag(s.view(), "pokemon-data").expect("data view");
    assert!(contains_text(data, "Pikachu"));
    assert!(contains_text(data, "025"));
    assert!(!contains_text(s.view(), IDLE_PROMPT));
}

#[test]
fn thrown_failure_shows_fallback_and_try_again_clears_the_name() {
    let (mut s, source) = start(RejectionPolicy::Throw, BoundaryStrategy::ResetKeys);
    submit(&mut s, "MissingNo");
    source.take("MissingNo").reject(not_found());
    s.pump();

    let alert = find_by_role(s.view(), Role::Alert).expect("error fallback");
    assert_eq!(text_content(alert), "There was an error: not found");
    assert_eq!(s.app().inspector().total_reports(), 1);
    let report = &s.app().inspector().reports()[0];
    assert!(report.thrown);
    assert!(report.component.contains("info"));

    s.perform(&Action::Click("Try again".into()))
        .expect("fallback offers a retry");
    assert!(contains_text(s.view(), IDLE_PROMPT));
    assert!(find_by_role(s.view(), Role::Alert).is_none());
    assert_eq!(s.app().name().get(), "");
    assert!(source.subjects().is_empty());
}

#[test]
fn submitting_a_new_name_resets_the_boundary() {
    let (mut s, source) = start(RejectionPolicy::Throw, BoundaryStrategy::ResetKeys);
    submit(&mut s, "MissingNo");
    source.take("MissingNo").reject(not_found());
    s.pump();
    assert!(find_by_role(s.view(), Role::Alert).is_some());

    submit(&mut s, "mew");
    assert!(find_by_role(s.view(), Role::Alert).is_none());
    assert!(find_by_tag(s.view(), "pokemon-fallback").is_some());
    // the key change, not the retry action, did the reset
    assert_eq!(s.app().name().get(), "mew");

    source.take("mew").resolve(pokemon("mew"));
    s.pump();
    assert!(contains_text(s.view(), "Mew"));
    assert_eq!(s.app().inspector().total_reports(), 1);
}

#[test]
fn inline_policy_renders_the_error_in_place() {
    let (mut s, source) = start(RejectionPolicy::Inline, BoundaryStrategy::None);
    submit(&mut s, "MissingNo");
    source.take("MissingNo").reject(FetchError::NotFound {
        name: "MissingNo".into(),
    });
    s.pump();

    let block = find_by_tag(s.view(), "error").expect("inline error");
    assert_eq!(
        text_content(block),
        "There was an error: No pokemon with the name \"MissingNo\""
    );
    assert!(!inspect::click(s.view(), "Try again"));
    assert_eq!(s.app().inspector().total_reports(), 0);

    submit(&mut s, "pikachu");
    assert!(find_by_tag(s.view(), "error").is_none());
    assert!(find_by_tag(s.view(), "pokemon-fallback").is_some());
}

#[test]
fn remount_strategy_recovers_only_on_a_new_name() {
    let (mut s, source) = start(RejectionPolicy::Throw, BoundaryStrategy::Remount);
    submit(&mut s, "MissingNo");
    source.take("MissingNo").reject(not_found());
    s.pump();
    assert!(find_by_role(s.view(), Role::Alert).is_some());
    assert!(s.perform(&Action::Click("Try again".into())).is_err());

    // same name, same boundary: still failed, no new lookup
    submit(&mut s, "MissingNo");
    assert!(find_by_role(s.view(), Role::Alert).is_some());
    assert!(source.subjects().is_empty());

    submit(&mut s, "charizard");
    assert!(find_by_role(s.view(), Role::Alert).is_none());
    assert_eq!(source.subjects(), vec!["charizard"]);
}

#[test]
fn superseded_lookup_never_lands() {
    let (mut s, source) = start(RejectionPolicy::Throw, BoundaryStrategy::ResetKeys);
    submit(&mut s, "pikachu");
    submit(&mut s, "mew");
    assert_eq!(source.subjects(), vec!["pikachu", "mew"]);

    let stale = source.take("pikachu");
    assert!(stale.is_stale());
    stale.resolve(pokemon("pikachu"));
    s.pump();
    assert!(!contains_text(s.view(), "Pikachu"));
    assert!(contains_text(
        find_by_tag(s.view(), "pokemon-fallback").expect("still loading"),
        "mew"
    ));

    source.take("mew").resolve(pokemon("mew"));
    s.pump();
    assert!(contains_text(s.view(), "Mew"));
}

#[test]
fn builtin_pokedex_session_runs_a_script() {
    let dex = Pokedex::builtin().expect("builtin data parses");
    let app = PokemonApp::new(AppConfig::default(), Rc::new(dex)).expect("valid config");
    let mut s = Session::start(app);

    let script = parse_script("submit:pikachu; wait").expect("valid script");
    for action in &script {
        s.perform(action).expect("step succeeds");
    }
    assert!(contains_text(s.view(), "Pikachu"));

    for action in &parse_script("click:mew;wait").expect("valid script") {
        s.perform(action).expect("step succeeds");
    }
    assert!(contains_text(s.view(), "Mew"));
    assert_eq!(s.app().name().get(), "mew");

    let inspector = s.finish();
    assert_eq!(inspector.total_reports(), 0);
}

#[test]
fn throw_without_boundary_is_rejected() {
    let config = AppConfig {
        policy: RejectionPolicy::Throw,
        boundary: BoundaryStrategy::None,
    };
    assert_eq!(config.validate(), Err(ConfigError::ThrowWithoutBoundary));
    assert!(PokemonApp::new(config, Rc::new(ManualSource::default())).is_err());
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn script_parsing() {
    let actions = parse_script("submit: pikachu ;wait;click:Try again;").expect("valid");
    assert_eq!(
        actions,
        vec![
            Action::Submit("pikachu".into()),
            Action::Wait,
            Action::Click("Try again".into()),
        ]
    );
    assert!(parse_script("jump:high").is_err());
    assert!(parse_script("click:").is_err());
}
