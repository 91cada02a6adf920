//! Derives the panel's status flags and applies them to its root node.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::selection::{SelectionContext, SelectionSnapshot};

pub const NOT_FOUND_CLASS: &str = "not-found";
pub const IS_SEARCHING_CLASS: &str = "is-searching";

/// Presentation flags derived from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DisplayFlags {
    pub not_found: bool,
    pub is_searching: bool,
}

impl DisplayFlags {
    /// A missing result never counts as searching.
    pub fn derive(snapshot: &SelectionSnapshot) -> Self {
        Self {
            not_found: snapshot.current_metacard.is_none(),
            is_searching: snapshot
                .current_result
                .as_ref()
                .is_some_and(|result| result.is_searching()),
        }
    }
}

/// The element the panel toggles its status classes on.
pub trait PresentationNode: Send {
    fn toggle_class(&mut self, class: &str, on: bool);
    fn has_class(&self, class: &str) -> bool;
}

/// Plain class-list root node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: BTreeSet<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl PresentationNode for ClassList {
    fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_owned());
        } else {
            self.classes.remove(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// Read the live selection and apply the derived flags to `node`.
pub fn reflect_status(context: &SelectionContext, node: &mut dyn PresentationNode) -> DisplayFlags {
    let flags = DisplayFlags::derive(&context.snapshot());
    apply_flags(flags, node);
    flags
}

pub fn apply_flags(flags: DisplayFlags, node: &mut dyn PresentationNode) {
    node.toggle_class(NOT_FOUND_CLASS, flags.not_found);
    node.toggle_class(IS_SEARCHING_CLASS, flags.is_searching);
}
