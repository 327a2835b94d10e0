use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::rc::Rc;

use web_time::{Duration, Instant};

use crate::View;
use crate::scope::Scope;

/// Upper bound on recomposition passes per frame. A pass that keeps writing
/// state it also reads would otherwise spin forever.
pub const MAX_PASSES: u32 = 8;

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static FRAME_REQUESTED: Cell<bool> = const { Cell::new(false) };
}

struct Group {
    path: String,
    cursor: usize,
}

impl Group {
    fn root() -> Self {
        Self {
            path: String::new(),
            cursor: 0,
        }
    }
}

pub struct Composer {
    slots: HashMap<String, Box<dyn Any>>,
    live: HashSet<String>,
    groups: Vec<Group>,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            live: HashSet::new(),
            groups: vec![Group::root()],
        }
    }
}

impl Composer {
    fn current(&mut self) -> &mut Group {
        if self.groups.is_empty() {
            self.groups.push(Group::root());
        }
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    fn positional_key(&mut self) -> String {
        let g = self.current();
        let key = format!("{}#{}", g.path, g.cursor);
        g.cursor += 1;
        key
    }

    fn named_key(&mut self, name: &str) -> String {
        format!("{}/{}", self.current().path, name)
    }

    fn lookup<T: 'static>(&mut self, key: &str) -> Option<Rc<T>> {
        let existing = self.slots.get(key)?;
        match existing.downcast_ref::<Rc<T>>() {
            Some(rc) => {
                let rc = rc.clone();
                self.live.insert(key.to_string());
                Some(rc)
            }
            None => {
                log::warn!(
                    "remember: slot '{}' type changed; replacing. \
                     If this is due to conditional composition, prefer remember_with_key.",
                    key
                );
                None
            }
        }
    }

    fn store<T: 'static>(&mut self, key: String, rc: Rc<T>) {
        self.live.insert(key.clone());
        self.slots.insert(key, Box::new(rc));
    }

    /// Removes every slot that was not touched since the last sweep.
    fn sweep(&mut self) -> Vec<Box<dyn Any>> {
        let dead: Vec<String> = self
            .slots
            .keys()
            .filter(|k| !self.live.contains(*k))
            .cloned()
            .collect();
        self.live.clear();
        dead.into_iter()
            .filter_map(|k| self.slots.remove(&k))
            .collect()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) -> Vec<Box<dyn Any>> {
        self.live.clear();
        self.groups = vec![Group::root()];
        self.slots.drain().map(|(_, v)| v).collect()
    }
}

fn remember_at<T: 'static>(key: String, init: impl FnOnce() -> T) -> Rc<T> {
    if let Some(rc) = COMPOSER.with(|c| c.borrow_mut().lookup::<T>(&key)) {
        return rc;
    }
    // init may itself remember; keep the composer unborrowed while it runs
    let rc = Rc::new(init());
    COMPOSER.with(|c| c.borrow_mut().store(key, rc.clone()));
    rc
}

/// Slot-based remember: the Nth call in a group refers to the Nth stored value.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let key = COMPOSER.with(|c| c.borrow_mut().positional_key());
    remember_at(key, init)
}

/// Key-based remember, stable across conditional branches within a group.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let key = COMPOSER.with(|c| c.borrow_mut().named_key(&key));
    remember_at(key, init)
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}

/// Path of the group currently being composed, `""` at the root.
pub fn current_group_path() -> String {
    COMPOSER.with(|c| c.borrow_mut().current().path.clone())
}

/// Composes `content` inside a child group identified by `key`.
///
/// State remembered inside belongs to that identity. When a later pass uses a
/// different key (or skips the call), the old group is unmounted at the end of
/// the pass: its slots are dropped and its scope disposed.
pub fn key<K: Display, R>(key: K, content: impl FnOnce() -> R) -> R {
    let segment = key.to_string();
    let scope = remember_with_key(format!("{segment}@scope"), Scope::new);
    let path = COMPOSER.with(|c| c.borrow_mut().named_key(&segment));

    // Pops the group even if `content` unwinds.
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            COMPOSER.with(|c| {
                let mut c = c.borrow_mut();
                if c.groups.len() > 1 {
                    c.groups.pop();
                }
            });
        }
    }

    COMPOSER.with(|c| c.borrow_mut().groups.push(Group { path, cursor: 0 }));
    let _guard = Guard;
    scope.run(content)
}

/// Marks the UI dirty; the scheduler will run another pass.
pub fn request_frame() {
    FRAME_REQUESTED.with(|f| f.set(true));
}

pub fn take_frame_request() -> bool {
    FRAME_REQUESTED.with(|f| f.replace(false))
}

fn dispose_dead(dead: Vec<Box<dyn Any>>) {
    for slot in dead {
        if let Some(scope) = slot.downcast_ref::<Rc<Scope>>() {
            scope.as_ref().clone().dispose();
        }
    }
}

pub struct ComposeGuard {
    scope: Scope,
}

impl ComposeGuard {
    pub fn begin(scope: Scope) -> Self {
        COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            c.groups = vec![Group::root()];
        });
        ComposeGuard { scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Ends the pass and unmounts everything that was not composed.
    pub fn finish(self) {
        let dead = COMPOSER.with(|c| c.borrow_mut().sweep());
        if !dead.is_empty() {
            log::trace!("compose: unmounting {} slots", dead.len());
        }
        dispose_dead(dead);
    }
}

/// Output of one `compose` call.
pub struct Frame {
    pub root: View,
    pub index: u64,
    pub passes: u32,
    pub build_time: Duration,
}

pub struct Scheduler {
    root: Scope,
    frames: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            root: Scope::new(),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs passes until one completes without requesting another.
    pub fn compose<F>(&mut self, mut build_root: F) -> Frame
    where
        F: FnMut(&mut Scheduler) -> View,
    {
        let started = Instant::now();
        let mut passes = 0;
        let root = loop {
            passes += 1;
            take_frame_request();
            let guard = ComposeGuard::begin(self.root.clone());
            let view = guard.scope().clone().run(|| build_root(self));
            guard.finish();

            if !take_frame_request() {
                break view;
            }
            if passes >= MAX_PASSES {
                log::warn!(
                    "compose: still dirty after {} passes; presenting last pass",
                    passes
                );
                break view;
            }
        };

        self.frames += 1;
        Frame {
            root,
            index: self.frames,
            passes,
            build_time: started.elapsed(),
        }
    }

    /// Runs due tasks and recomposes only if something asked for a frame.
    pub fn pump<F>(&mut self, build_root: F) -> Option<Frame>
    where
        F: FnMut(&mut Scheduler) -> View,
    {
        let ran = crate::dispatch::run_ready();
        if ran > 0 {
            log::trace!("pump: ran {} tasks", ran);
        }
        if take_frame_request() {
            Some(self.compose(build_root))
        } else {
            None
        }
    }

    /// Tears down all remembered state, running every cleanup.
    pub fn shutdown(self) {
        let dead = COMPOSER.with(|c| c.borrow_mut().clear());
        dispose_dead(dead);
        self.root.dispose();
    }
}
