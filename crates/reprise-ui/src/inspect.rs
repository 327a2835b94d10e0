//! Headless access to a composed tree: dump it as text, look things up,
//! and fire callbacks the way a user would.

use std::fmt::Write;

use reprise_core::{Role, View, ViewKind};

/// Indented outline of `root`, one view per line.
///
/// ```text
/// Column
///   Text "Submit a pokemon"
///   Button [Try again]
/// ```
pub fn dump(root: &View) -> String {
    let mut out = String::new();
    dump_into(root, 0, &mut out);
    out
}

fn dump_into(v: &View, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    let line = match &v.kind {
        ViewKind::Surface => "Surface".to_string(),
        ViewKind::Box => "Box".to_string(),
        ViewKind::Row => "Row".to_string(),
        ViewKind::Column => "Column".to_string(),
        ViewKind::Text { text, .. } => format!("Text {text:?}"),
        ViewKind::Button { text, .. } => format!("Button [{text}]"),
        ViewKind::TextField { value, hint, .. } => format!("TextField {value:?} ({hint})"),
        ViewKind::Image { source, alt } => format!("Image {alt:?} <{source}>"),
    };
    let _ = write!(out, "{pad}{line}");
    match v.role() {
        Some(Role::Alert) => out.push_str(" role=alert"),
        Some(Role::Progress) => out.push_str(" role=progress"),
        _ => {}
    }
    if let Some(tag) = &v.modifier.test_tag {
        let _ = write!(out, " #{tag}");
    }
    out.push('\n');
    for c in &v.children {
        dump_into(c, depth + 1, out);
    }
}

/// All text content, depth first.
pub fn texts(root: &View) -> Vec<String> {
    let mut out = Vec::new();
    root.walk(&mut |v| {
        if let ViewKind::Text { text, .. } = &v.kind {
            out.push(text.clone());
        }
    });
    out
}

/// All text content joined with spaces.
pub fn text_content(root: &View) -> String {
    texts(root).join(" ")
}

pub fn contains_text(root: &View, needle: &str) -> bool {
    texts(root).iter().any(|t| t.contains(needle))
}

pub fn find_by_tag<'a>(root: &'a View, tag: &str) -> Option<&'a View> {
    find(root, |v| v.modifier.test_tag.as_deref() == Some(tag))
}

pub fn find_by_role(root: &View, role: Role) -> Option<&View> {
    find(root, |v| v.role() == Some(role))
}

/// First view whose accessibility label is `label`.
pub fn find_by_label<'a>(root: &'a View, label: &str) -> Option<&'a View> {
    find(root, |v| {
        v.semantics
            .as_ref()
            .and_then(|s| s.label.as_deref())
            == Some(label)
    })
}

pub fn find<'a>(root: &'a View, pred: impl Fn(&View) -> bool) -> Option<&'a View> {
    let mut hit = None;
    root.walk(&mut |v| {
        if hit.is_none() && pred(v) {
            hit = Some(v);
        }
    });
    hit
}

/// Clicks the first button labelled `label`. Returns whether one was found.
pub fn click(root: &View, label: &str) -> bool {
    let button = find(root, |v| {
        matches!(&v.kind, ViewKind::Button { text, on_click: Some(_) } if text == label)
    });
    match button.map(|b| &b.kind) {
        Some(ViewKind::Button {
            on_click: Some(cb), ..
        }) => {
            log::trace!("inspect: click [{label}]");
            cb();
            true
        }
        _ => false,
    }
}

/// Submits `value` through the first text field whose hint is `hint`.
pub fn submit(root: &View, hint: &str, value: &str) -> bool {
    let field = find(root, |v| {
        matches!(&v.kind, ViewKind::TextField { hint: h, .. } if h == hint)
    });
    match field.map(|f| &f.kind) {
        Some(ViewKind::TextField {
            on_change,
            on_submit: Some(submit),
            ..
        }) => {
            log::trace!("inspect: submit {value:?} via ({hint})");
            if let Some(change) = on_change {
                change(value.to_string());
            }
            submit(value.to_string());
            true
        }
        _ => false,
    }
}
