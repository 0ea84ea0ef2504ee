use kuchiki::{ElementData, NodeDataRef, NodeRef};

use crate::cli::SystemScheme;
use crate::page;
use crate::store::{PREFERENCE_KEY, PreferenceStore};

pub const LIGHT_MODE: &str = "light-mode";
pub const DARK_MODE: &str = "dark-mode";

/// Id of the click target that flips the theme.
pub const TOGGLE_ID: &str = "theme-toggle";
/// Id of the control whose visibility tracks whether a preference is stored.
pub const RESET_ID: &str = "theme-reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Light,
    Dark,
}

impl Preference {
    pub fn class_name(self) -> &'static str {
        match self {
            Preference::Light => LIGHT_MODE,
            Preference::Dark => DARK_MODE,
        }
    }

    /// Unknown stored strings parse to `None` and are treated the same
    /// as an absent preference everywhere.
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            LIGHT_MODE => Some(Preference::Light),
            DARK_MODE => Some(Preference::Dark),
            _ => None,
        }
    }
}

/// Transition table for a toggle activation. With a stored preference
/// this is a pure flip; without one it flips away from the OS scheme,
/// so the first activation always changes what the page renders.
pub fn next_preference(current: Option<&str>, system: SystemScheme) -> Preference {
    match current.and_then(Preference::from_stored) {
        Some(Preference::Dark) => Preference::Light,
        Some(Preference::Light) => Preference::Dark,
        None => match system {
            SystemScheme::Dark => Preference::Light,
            SystemScheme::Light => Preference::Dark,
        },
    }
}

/// Rewrites the body class list: both marker classes are removed, then
/// the one matching `preference` is added. `None` leaves the body
/// unmarked so the stylesheet's media-query default wins. Unrelated
/// classes are preserved.
pub fn apply_theme(doc: &NodeRef, preference: Option<Preference>) {
    let Ok(body) = doc.select_first("body") else {
        return;
    };
    let mut attrs = body.attributes.borrow_mut();
    let existing = attrs.get("class").map(|s| s.to_string()).unwrap_or_default();
    let mut classes: Vec<&str> = existing
        .split_whitespace()
        .filter(|c| *c != LIGHT_MODE && *c != DARK_MODE)
        .collect();
    if let Some(p) = preference {
        classes.push(p.class_name());
    }
    if classes.is_empty() {
        attrs.remove("class");
    } else {
        attrs.insert("class", classes.join(" "));
    }
}

/// Applies whatever the store holds, parsed leniently.
pub fn apply_stored(doc: &NodeRef, stored: Option<&str>) {
    apply_theme(doc, stored.and_then(Preference::from_stored));
}

pub struct ThemeController<S: PreferenceStore> {
    store: S,
    system: SystemScheme,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn new(store: S, system: SystemScheme) -> Self {
        Self { store, system }
    }

    pub fn stored(&self) -> Option<String> {
        self.store.get(PREFERENCE_KEY)
    }

    /// Load-time wiring: the reset control is hidden only when nothing
    /// is stored. Any present value, parseable or not, leaves it shown.
    pub fn initialize(&self, doc: &NodeRef) {
        if self.stored().is_none() {
            set_display(reset_control(doc), "none");
        }
    }

    /// One toggle activation: compute the next preference from the
    /// stored value (re-read, not cached), apply it, persist it, and
    /// reveal the reset control.
    pub fn toggle(&mut self, doc: &NodeRef) -> anyhow::Result<Preference> {
        let next = next_preference(self.stored().as_deref(), self.system);
        apply_theme(doc, Some(next));
        self.store.set(PREFERENCE_KEY, next.class_name())?;
        set_display(reset_control(doc), "inline");
        Ok(next)
    }

    /// Clears the stored preference, unmarks the body, and hides the
    /// reset control again.
    pub fn reset(&mut self, doc: &NodeRef) -> anyhow::Result<()> {
        self.store.remove(PREFERENCE_KEY)?;
        apply_theme(doc, None);
        set_display(reset_control(doc), "none");
        Ok(())
    }
}

fn reset_control(doc: &NodeRef) -> Option<NodeDataRef<ElementData>> {
    page::element_by_id(doc, RESET_ID)
}

/// Overwrites only the `display` declaration of the element's inline
/// style, keeping any other declarations.
fn set_display(el: Option<NodeDataRef<ElementData>>, value: &str) {
    let Some(el) = el else { return };
    let mut attrs = el.attributes.borrow_mut();
    let existing = attrs.get("style").map(|s| s.to_string()).unwrap_or_default();
    let mut decls: Vec<&str> = existing
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty() && !d.starts_with("display"))
        .collect();
    let display = format!("display: {value}");
    decls.push(&display);
    attrs.insert("style", decls.join("; "));
}
