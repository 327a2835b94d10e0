#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::fmt;
    use std::rc::Rc;
    use std::sync::{Mutex, Once};
    use std::thread::{self, ThreadId};

    use web_time::Duration;

    use crate::*;

    fn text(s: impl Into<String>) -> View {
        View::new(ViewKind::Text {
            text: s.into(),
            color: Color::WHITE,
            font_size: 16.0,
        })
    }

    fn texts(v: &View) -> Vec<String> {
        let mut out = Vec::new();
        v.walk(&mut |v| {
            if let ViewKind::Text { text, .. } = &v.kind {
                out.push(text.clone());
            }
        });
        out
    }

    type Calls = Rc<RefCell<Vec<Settle<String, String>>>>;

    fn lookup_view(subject: Option<String>, calls: Calls) -> View {
        let state = use_request(subject, move |_name: &String, settle| {
            calls.borrow_mut().push(settle)
        });
        match state {
            RequestState::Idle => text("idle"),
            RequestState::Pending => text("pending"),
            RequestState::Resolved(v) => text(format!("resolved:{v}")),
            RequestState::Rejected(e) => text(format!("rejected:{e}")),
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Boom(u32);

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom {}", self.0)
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl ErrorReporter for Recorder {
        fn report(&self, info: &ErrorInfo) {
            self.0.borrow_mut().push(info.message.clone());
        }
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert!(take_frame_request());
        assert!(!sig.set_if_changed(101));
        assert!(!take_frame_request());
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let cleaned_up = Rc::new(Cell::new(false));

        let scope = Scope::new();
        let cleaned_up_clone = cleaned_up.clone();
        scope.add_disposer(move || cleaned_up_clone.set(true));

        assert!(!cleaned_up.get());
        scope.dispose();
        assert!(cleaned_up.get());
    }

    #[test]
    fn test_key_based_remember() {
        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);

        // Should return the same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42); // Not 100, because key exists
    }

    #[test]
    fn test_positional_remember_survives_passes() {
        let mut s = Scheduler::new();
        let build = |_: &mut Scheduler| {
            let n = remember_state(|| 0);
            *n.borrow_mut() += 1;
            text(n.borrow().to_string())
        };
        s.compose(build);
        s.compose(build);
        let frame = s.compose(build);
        assert_eq!(texts(&frame.root), vec!["3"]);
        assert_eq!(frame.index, 3);
    }

    #[test]
    fn test_key_change_remounts_and_runs_cleanup() {
        let mut s = Scheduler::new();
        let which = signal("a");
        let inits = Rc::new(Cell::new(0));
        let cleanups = Rc::new(RefCell::new(Vec::new()));

        let build = {
            let which = which.clone();
            let inits = inits.clone();
            let cleanups = cleanups.clone();
            move |_: &mut Scheduler| {
                let id = which.get();
                key(id, || {
                    remember(|| inits.set(inits.get() + 1));
                    let cleanups = cleanups.clone();
                    scoped_effect(move || on_unmount(move || cleanups.borrow_mut().push(id)));
                    text(id)
                })
            }
        };

        s.compose(build.clone());
        s.compose(build.clone());
        assert_eq!(inits.get(), 1);
        assert!(cleanups.borrow().is_empty());

        which.set("b");
        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["b"]);
        assert_eq!(inits.get(), 2);
        assert_eq!(*cleanups.borrow(), vec!["a"]);

        s.shutdown();
        assert_eq!(*cleanups.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_scoped_effect_registers_once_per_group() {
        let mut s = Scheduler::new();
        let runs = Rc::new(Cell::new(0));
        let pending = Rc::new(Cell::new(0));

        let build = {
            let runs = runs.clone();
            let pending = pending.clone();
            move |_: &mut Scheduler| {
                key("g", || {
                    let runs = runs.clone();
                    scoped_effect(move || {
                        runs.set(runs.get() + 1);
                        Dispose::none()
                    });
                    if let Some(scope) = current_scope() {
                        pending.set(scope.pending_disposers());
                    }
                    text("g")
                })
            }
        };

        for _ in 0..100 {
            s.compose(build.clone());
        }
        assert_eq!(runs.get(), 1);
        assert_eq!(pending.get(), 1);
        s.shutdown();
    }

    #[test]
    fn test_disposable_effect_reruns_only_on_key_change() {
        let mut s = Scheduler::new();
        let k = signal(1);
        let log = Rc::new(RefCell::new(Vec::<String>::new()));

        let build = {
            let k = k.clone();
            let log = log.clone();
            move |_: &mut Scheduler| {
                let log = log.clone();
                disposable_effect(k.get(), move |k| {
                    log.borrow_mut().push(format!("run {k}"));
                    let k = *k;
                    on_unmount(move || log.borrow_mut().push(format!("cleanup {k}")))
                });
                text("x")
            }
        };

        s.compose(build.clone());
        s.compose(build.clone());
        k.set(2);
        s.compose(build.clone());
        assert_eq!(*log.borrow(), vec!["run 1", "cleanup 1", "run 2"]);

        s.shutdown();
        assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup 2"));
    }

    #[test]
    fn test_request_idle_without_subject() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let frame = s.compose({
            let calls = calls.clone();
            move |_| lookup_view(None, calls.clone())
        });
        assert_eq!(texts(&frame.root), vec!["idle"]);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_request_pending_then_resolved() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let name = signal(None::<String>);
        let build = {
            let calls = calls.clone();
            let name = name.clone();
            move |_: &mut Scheduler| lookup_view(name.get(), calls.clone())
        };

        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["idle"]);

        name.set(Some("pikachu".into()));
        let frame = s.pump(build.clone()).expect("name change recomposes");
        assert_eq!(texts(&frame.root), vec!["pending"]);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0].subject(), "pikachu");

        // Same subject again: no new lookup.
        s.compose(build.clone());
        assert_eq!(calls.borrow().len(), 1);

        let settle = calls.borrow_mut().remove(0);
        settle.resolve("electric".into());
        let frame = s.pump(build.clone()).expect("settle recomposes");
        assert_eq!(texts(&frame.root), vec!["resolved:electric"]);
    }

    #[test]
    fn test_request_starts_pending_when_created_with_subject() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let frame = s.compose({
            let calls = calls.clone();
            move |_| lookup_view(Some("mew".into()), calls.clone())
        });
        assert_eq!(texts(&frame.root), vec!["pending"]);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_request_ignores_superseded_lookup() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let name = signal(Some("a".to_string()));
        let build = {
            let calls = calls.clone();
            let name = name.clone();
            move |_: &mut Scheduler| lookup_view(name.get(), calls.clone())
        };

        s.compose(build.clone());
        name.set(Some("b".into()));
        s.pump(build.clone());
        assert_eq!(calls.borrow().len(), 2);

        let stale = calls.borrow_mut().remove(0);
        assert!(stale.is_stale());
        stale.resolve("from a".into());
        assert!(s.pump(build.clone()).is_none());

        let current = calls.borrow_mut().remove(0);
        assert!(!current.is_stale());
        current.reject("b failed".into());
        let frame = s.pump(build.clone()).expect("settle recomposes");
        assert_eq!(texts(&frame.root), vec!["rejected:b failed"]);
    }

    #[test]
    fn test_request_returns_to_idle_when_subject_cleared() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let name = signal(Some("a".to_string()));
        let build = {
            let calls = calls.clone();
            let name = name.clone();
            move |_: &mut Scheduler| lookup_view(name.get(), calls.clone())
        };
        s.compose(build.clone());
        calls.borrow_mut().remove(0).resolve("data".into());
        s.pump(build.clone());

        name.set(None);
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["idle"]);
    }

    #[test]
    fn test_request_unmount_cancels_lookup() {
        let mut s = Scheduler::new();
        let calls: Calls = Rc::default();
        let shown = signal(true);
        let build = {
            let calls = calls.clone();
            let shown = shown.clone();
            move |_: &mut Scheduler| {
                if shown.get() {
                    key("info", || lookup_view(Some("a".into()), calls.clone()))
                } else {
                    text("gone")
                }
            }
        };
        s.compose(build.clone());
        shown.set(false);
        s.pump(build.clone());
        assert!(calls.borrow()[0].is_stale());
    }

    #[test]
    fn test_boundary_captures_thrown_error_and_resets() {
        let mut s = Scheduler::new();
        let fail = signal(false);
        let inits = Rc::new(Cell::new(0));
        let resets = Rc::new(Cell::new(0));
        let handle: Rc<RefCell<Option<ResetHandle>>> = Rc::default();
        let caught: Rc<RefCell<Option<Boom>>> = Rc::default();
        let reporter = Rc::new(Recorder::default());

        let build = {
            let fail = fail.clone();
            let inits = inits.clone();
            let resets = resets.clone();
            let handle = handle.clone();
            let caught = caught.clone();
            let reporter = reporter.clone();
            move |_: &mut Scheduler| {
                let fail = fail.clone();
                let inits = inits.clone();
                let resets = resets.clone();
                let handle = handle.clone();
                let caught = caught.clone();
                with_error_reporter(reporter.clone(), move || {
                    Boundary::new()
                        .on_reset(move || resets.set(resets.get() + 1))
                        .show(
                            move |info, reset| {
                                *caught.borrow_mut() = info.downcast_ref::<Boom>().cloned();
                                *handle.borrow_mut() = Some(reset);
                                text(format!("There was an error: {}", info.message))
                            },
                            move || {
                                remember(|| inits.set(inits.get() + 1));
                                if fail.get() {
                                    throw(Boom(7));
                                }
                                text("ok")
                            },
                        )
                })
            }
        };

        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["ok"]);

        fail.set(true);
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["There was an error: boom 7"]);
        assert_eq!(*caught.borrow(), Some(Boom(7)));
        assert_eq!(*reporter.0.borrow(), vec!["boom 7"]);

        // Capturing is only left through a reset.
        fail.set(false);
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["There was an error: boom 7"]);

        let reset = handle.borrow_mut().take().expect("fallback got a handle");
        reset.reset();
        let frame = s.pump(build.clone()).expect("reset recomposes");
        assert_eq!(texts(&frame.root), vec!["ok"]);
        assert_eq!(inits.get(), 2, "content state starts over after reset");
        assert_eq!(resets.get(), 1);
        assert_eq!(reporter.0.borrow().len(), 1);
    }

    #[test]
    fn test_boundary_resets_when_keys_change() {
        let mut s = Scheduler::new();
        let name = signal("bad".to_string());
        let resets = Rc::new(Cell::new(0));
        let key_changes = Rc::new(Cell::new(0));

        let build = {
            let name = name.clone();
            let resets = resets.clone();
            let key_changes = key_changes.clone();
            move |_: &mut Scheduler| {
                let current = name.get();
                let resets = resets.clone();
                let key_changes = key_changes.clone();
                Boundary::new()
                    .reset_key(current.clone())
                    .on_reset(move || resets.set(resets.get() + 1))
                    .on_reset_keys_change(move |prev, next| {
                        assert_eq!(prev.len(), next.len());
                        key_changes.set(key_changes.get() + 1);
                    })
                    .show(
                        |info, _| text(format!("error: {}", info.message)),
                        move || {
                            if current == "bad" {
                                throw(Boom(1));
                            }
                            text(format!("hello {current}"))
                        },
                    )
            }
        };

        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["error: boom 1"]);

        // Same value written again is not a key change.
        name.set("bad".into());
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["error: boom 1"]);

        name.set("good".into());
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["hello good"]);
        assert_eq!(key_changes.get(), 1);
        assert_eq!(resets.get(), 0, "on_reset belongs to the explicit reset");
    }

    #[test]
    fn test_boundary_unmounts_failed_subtree() {
        let mut s = Scheduler::new();
        let fail = signal(false);
        let cleaned = Rc::new(Cell::new(false));
        let build = {
            let fail = fail.clone();
            let cleaned = cleaned.clone();
            move |_: &mut Scheduler| {
                let fail = fail.clone();
                let cleaned = cleaned.clone();
                ErrorBoundary(
                    |_, _| text("fallback"),
                    move || {
                        let cleaned = cleaned.clone();
                        disposable_effect((), move |_| on_unmount(move || cleaned.set(true)));
                        if fail.get() {
                            throw(Boom(2));
                        }
                        text("ok")
                    },
                )
            }
        };
        s.compose(build.clone());
        fail.set(true);
        let frame = s.pump(build.clone()).expect("recomposes");
        assert_eq!(texts(&frame.root), vec!["fallback"]);
        assert!(frame.passes >= 2);
        assert!(cleaned.get());
    }

    #[test]
    fn test_boundary_captures_plain_panic() {
        let mut s = Scheduler::new();
        let seen: Rc<RefCell<Option<ErrorInfo>>> = Rc::default();
        let frame = s.compose({
            let seen = seen.clone();
            move |_| {
                let seen = seen.clone();
                ErrorBoundary(
                    move |info, _| {
                        *seen.borrow_mut() = Some(info.clone());
                        text("fallback")
                    },
                    || panic!("unexpected phase"),
                )
            }
        });
        assert_eq!(texts(&frame.root), vec!["fallback"]);
        let info = seen.borrow().clone().expect("captured");
        assert_eq!(info.message, "unexpected phase");
        assert!(!info.is_thrown());
        assert!(info.downcast_ref::<Boom>().is_none());
    }

    type Captured = (ThreadId, log::Level, String);
    static CAPTURED: Mutex<Vec<Captured>> = Mutex::new(Vec::new());

    struct CaptureLog;

    impl log::Log for CaptureLog {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }
        fn log(&self, record: &log::Record) {
            if let Ok(mut captured) = CAPTURED.lock() {
                captured.push((thread::current().id(), record.level(), record.args().to_string()));
            }
        }
        fn flush(&self) {}
    }

    fn capture_logs() {
        static CAPTURE: CaptureLog = CaptureLog;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if log::set_logger(&CAPTURE).is_ok() {
                log::set_max_level(log::LevelFilter::Trace);
            }
        });
    }

    fn logged_here(level: log::Level) -> Vec<String> {
        let me = thread::current().id();
        CAPTURED
            .lock()
            .map(|c| {
                c.iter()
                    .filter(|(t, l, _)| *t == me && *l == level)
                    .map(|(_, _, m)| m.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_panic_hook_keeps_thrown_failures_out_of_error_log() {
        capture_logs();
        install_panic_hook();
        let earlier = logged_here(log::Level::Error).len();

        let mut s = Scheduler::new();
        let reporter = Rc::new(Recorder::default());
        let plain = signal(false);
        let build = {
            let reporter = reporter.clone();
            let plain = plain.clone();
            move |_: &mut Scheduler| {
                let plain = plain.get();
                with_error_reporter(reporter.clone(), || {
                    key(plain, || {
                        ErrorBoundary(
                            |info, _| text(info.message.clone()),
                            move || {
                                if plain {
                                    panic!("bad state")
                                } else {
                                    throw(Boom(7))
                                }
                            },
                        )
                    })
                })
            }
        };

        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["boom 7"]);
        assert_eq!(logged_here(log::Level::Error).len(), earlier);
        assert!(
            logged_here(log::Level::Debug)
                .iter()
                .any(|m| m.contains("thrown from") && m.contains("boom 7"))
        );

        plain.set(true);
        let frame = s.compose(build.clone());
        assert_eq!(texts(&frame.root), vec!["bad state"]);
        let errors = logged_here(log::Level::Error);
        assert_eq!(errors.len(), earlier + 1);
        assert!(errors[earlier].contains("bad state"));
        assert_eq!(*reporter.0.borrow(), vec!["boom 7", "bad state"]);

        // back to the default hook for the rest of the suite
        let _ = std::panic::take_hook();
    }

    #[test]
    fn test_reset_keys_shallow_compare() {
        let a: ResetKeys = smallvec::smallvec![Rc::new("x".to_string()) as Rc<dyn ResetKey>];
        let b: ResetKeys = smallvec::smallvec![Rc::new("x".to_string()) as Rc<dyn ResetKey>];
        let c: ResetKeys = smallvec::smallvec![Rc::new(1u32) as Rc<dyn ResetKey>];
        assert!(!reset_keys_changed(&a, &b));
        assert!(reset_keys_changed(&a, &c));
        assert!(reset_keys_changed(&a, &[]));
    }

    #[test]
    fn test_timers_follow_installed_clock() {
        let clock = TestClock::new();
        set_clock(Rc::new(clock.clone()));
        let order = Rc::new(RefCell::new(Vec::new()));

        post_delayed(Duration::from_millis(100), {
            let order = order.clone();
            move || order.borrow_mut().push("late")
        });
        post({
            let order = order.clone();
            move || order.borrow_mut().push("now")
        });

        assert_eq!(run_ready(), 1);
        clock.advance(Duration::from_millis(50));
        assert_eq!(run_ready(), 0);
        assert!(next_deadline().is_some());
        clock.advance(Duration::from_millis(60));
        assert_eq!(run_ready(), 1);
        assert_eq!(*order.borrow(), vec!["now", "late"]);
        assert!(!has_pending());
    }

    #[test]
    fn test_compose_pass_limit() {
        let mut s = Scheduler::new();
        let n = signal(0);
        let frame = s.compose(move |_| {
            n.update(|v| *v += 1);
            text("restless")
        });
        assert_eq!(frame.passes, MAX_PASSES);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#FF5733");
        assert_eq!(c, Color(255, 87, 51, 255));

        let c_alpha = Color::from_hex("#FF5733AA");
        assert_eq!(c_alpha, Color(255, 87, 51, 170));
    }
}
