//! # Request lifecycle
//!
//! `use_request` tracks one asynchronous lookup keyed by a subject:
//!
//! ```text
//! Idle ──subject──▶ Pending ──resolve──▶ Resolved(T)
//!                     │  ▲                  │
//!                     │  └──new subject─────┤
//!                     └──────reject──▶ Rejected(E)
//! ```
//!
//! Each change of subject starts a new invocation with its own cancel token.
//! The previous invocation's token is cancelled by the effect cleanup, so a
//! lookup started for "A" can never settle into the state of "B".

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::{Signal, disposable_effect, on_unmount, remember, signal};

/// Lookup phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// No request made yet.
    Idle,
    /// Request started.
    Pending,
    /// Request successful.
    Resolved,
    /// Request failed.
    Rejected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Idle => "idle",
            Status::Pending => "pending",
            Status::Resolved => "resolved",
            Status::Rejected => "rejected",
        })
    }
}

/// Render-ready state of one lookup. The payload exists only in the phase
/// that owns it.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestState<T, E> {
    Idle,
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> RequestState<T, E> {
    pub fn status(&self) -> Status {
        match self {
            RequestState::Idle => Status::Idle,
            RequestState::Pending => Status::Pending,
            RequestState::Resolved(_) => Status::Resolved,
            RequestState::Rejected(_) => Status::Rejected,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            RequestState::Resolved(t) => Some(t),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            RequestState::Rejected(e) => Some(e),
            _ => None,
        }
    }

    /// Initial state for a machine created with or without a subject.
    pub fn initial(has_subject: bool) -> Self {
        if has_subject {
            RequestState::Pending
        } else {
            RequestState::Idle
        }
    }
}

/// Cancellation flag owned by one lookup invocation.
#[derive(Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.set(true);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Single-use completion handle for one lookup invocation.
///
/// Settling after the subject changed (or after the owner unmounted) is a
/// no-op.
pub struct Settle<T: 'static, E: 'static> {
    state: Signal<RequestState<T, E>>,
    token: CancelToken,
    subject: String,
}

impl<T: 'static, E: 'static> Settle<T, E> {
    pub fn new(state: Signal<RequestState<T, E>>, token: CancelToken, subject: String) -> Self {
        Self {
            state,
            token,
            subject,
        }
    }

    /// The subject this lookup was started for.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_stale(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn resolve(self, value: T) {
        self.apply(RequestState::Resolved(value));
    }

    pub fn reject(self, error: E) {
        self.apply(RequestState::Rejected(error));
    }

    pub fn settle(self, outcome: Result<T, E>) {
        match outcome {
            Ok(v) => self.resolve(v),
            Err(e) => self.reject(e),
        }
    }

    fn apply(self, next: RequestState<T, E>) {
        if self.token.is_cancelled() {
            log::debug!(
                "request: ignoring {} settle for superseded subject '{}'",
                next.status(),
                self.subject
            );
            return;
        }
        log::debug!("request: '{}' -> {}", self.subject, next.status());
        self.state.set(next);
    }
}

/// Tracks the lookup for `subject`, issuing `lookup` once per distinct
/// subject. `None` means there is nothing to look up.
///
/// The returned state already reflects a subject change made in this pass:
/// a new subject reads as `Pending` before any lookup can settle.
pub fn use_request<K, T, E>(
    subject: Option<K>,
    lookup: impl FnOnce(&K, Settle<T, E>) + 'static,
) -> RequestState<T, E>
where
    K: PartialEq + Clone + fmt::Display + 'static,
    T: Clone + 'static,
    E: Clone + 'static,
{
    let state = remember({
        let has_subject = subject.is_some();
        move || signal(RequestState::<T, E>::initial(has_subject))
    });

    disposable_effect(subject, {
        let state = state.as_ref().clone();
        move |subject| {
            let Some(subject) = subject else {
                if state.with(|s| s.status() != Status::Idle) {
                    state.set(RequestState::Idle);
                }
                return on_unmount(|| {});
            };

            // Whole-state replacement: nothing of the previous lookup survives.
            if state.with(|s| s.status() != Status::Pending) {
                state.set(RequestState::Pending);
            }

            let token = CancelToken::new();
            let settle = Settle::new(state, token.clone(), subject.to_string());
            log::debug!("request: starting lookup for '{subject}'");
            lookup(subject, settle);

            on_unmount(move || token.cancel())
        }
    });

    state.get()
}
