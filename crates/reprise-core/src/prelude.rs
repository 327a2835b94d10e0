pub use crate::clock::{Clock, SystemClock, TestClock, set_clock};
pub use crate::color::Color;
pub use crate::dispatch::{next_deadline, post, post_delayed, run_ready};
pub use crate::effect::{Dispose, disposable_effect, on_unmount};
pub use crate::error::{Boundary, ErrorBoundary, ErrorInfo, ResetHandle, throw};
pub use crate::locals::{ErrorReporter, Theme, theme, with_error_reporter, with_theme};
pub use crate::modifier::Modifier;
pub use crate::request::{RequestState, Settle, Status, use_request};
pub use crate::runtime::{
    ComposeGuard, Frame, Scheduler, key, remember, remember_state, remember_state_with_key,
    remember_with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::semantics::{Role, Semantics};
pub use crate::signal::{Signal, signal};
pub use crate::view::{View, ViewKind};
