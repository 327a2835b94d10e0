#![allow(non_snake_case)]
//! Widgets and headless inspection.
//!
//! Widgets are plain functions returning `View`. Reprise does not lay out or
//! draw; a host (or the `inspect` helpers in tests) walks the tree.

pub mod inspect;

use std::rc::Rc;

use reprise_core::*;

pub fn Surface(modifier: Modifier, child: View) -> View {
    let mut v = View::new(ViewKind::Surface).modifier(modifier);
    v.children = vec![child];
    v
}

pub fn Box(modifier: Modifier) -> View {
    View::new(ViewKind::Box).modifier(modifier)
}

pub fn Row(modifier: Modifier) -> View {
    View::new(ViewKind::Row).modifier(modifier)
}

pub fn Column(modifier: Modifier) -> View {
    View::new(ViewKind::Column).modifier(modifier)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(ViewKind::Text {
        text: text.into(),
        color: theme().on_surface,
        font_size: 16.0,
    })
}

pub fn Button(text: impl Into<String>, on_click: impl Fn() + 'static) -> View {
    let text = text.into();
    View::new(ViewKind::Button {
        text: text.clone(),
        on_click: Some(Rc::new(on_click)),
    })
    .semantics(Semantics::new(Role::Button).label(text))
}

/// Single-line text input. `on_submit` fires with the current value when the
/// user confirms (Enter or an attached submit button).
pub fn TextField(
    value: impl Into<String>,
    hint: impl Into<String>,
    on_change: impl Fn(String) + 'static,
    on_submit: impl Fn(String) + 'static,
) -> View {
    let hint = hint.into();
    View::new(ViewKind::TextField {
        value: value.into(),
        hint: hint.clone(),
        on_change: Some(Rc::new(on_change)),
        on_submit: Some(Rc::new(on_submit)),
    })
    .semantics(Semantics::new(Role::TextField).label(hint))
}

pub fn Image(modifier: Modifier, source: impl Into<String>, alt: impl Into<String>) -> View {
    let alt = alt.into();
    View::new(ViewKind::Image {
        source: source.into(),
        alt: alt.clone(),
    })
    .modifier(modifier)
    .semantics(Semantics::new(Role::Image).label(alt))
}

/// Container announced to assistive tech as an alert.
pub fn Alert(modifier: Modifier) -> View {
    let t = theme();
    Column(modifier.background(t.error)).semantics(Semantics::new(Role::Alert))
}

/// Extension trait for child building
pub trait ViewExt: Sized {
    fn child(self, children: impl IntoChildren) -> Self;
}

impl ViewExt for View {
    fn child(self, children: impl IntoChildren) -> Self {
        self.with_children(children.into_children())
    }
}

pub trait IntoChildren {
    fn into_children(self) -> Vec<View>;
}

impl IntoChildren for View {
    fn into_children(self) -> Vec<View> {
        vec![self]
    }
}

impl IntoChildren for Vec<View> {
    fn into_children(self) -> Vec<View> {
        self
    }
}

impl IntoChildren for Option<View> {
    fn into_children(self) -> Vec<View> {
        self.into_iter().collect()
    }
}

impl<const N: usize> IntoChildren for [View; N] {
    fn into_children(self) -> Vec<View> {
        self.into()
    }
}

// Tuple implementations
macro_rules! impl_into_children_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoChildren),+> IntoChildren for ($($t,)+) {
            fn into_children(self) -> Vec<View> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_children());)+
                v
            }
        }
    };
}

impl_into_children_tuple!(0 A, 1 B);
impl_into_children_tuple!(0 A, 1 B, 2 C);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// Method styling
pub trait TextStyle {
    fn color(self, c: Color) -> View;
    fn size(self, dp: f32) -> View;
}

impl TextStyle for View {
    fn color(mut self, c: Color) -> View {
        if let ViewKind::Text {
            color: text_color, ..
        } = &mut self.kind
        {
            *text_color = c;
        }
        self
    }
    fn size(mut self, dp_font: f32) -> View {
        if let ViewKind::Text {
            font_size: text_size_dp,
            ..
        } = &mut self.kind
        {
            *text_size_dp = dp_font;
        }
        self
    }
}
