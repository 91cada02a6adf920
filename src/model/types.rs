//! Core value types shared by the selection context and the metacard panel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESULT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ResultHolder`](crate::selection::ResultHolder).
///
/// Two holders never share an id, even when they wrap the same query, so the
/// id is what the tracker logs and compares when it rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(u64);

impl ResultId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RESULT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result-{}", self.0)
    }
}

/// Lifecycle notifications emitted by an in-flight search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// A fetch completed and the result set was merged.
    Sync,
    /// A fetch started.
    Request,
    /// A fetch failed.
    Error,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 3] = [Self::Sync, Self::Request, Self::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Request => "request",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog record as seen by the detail panel.
///
/// The panel only cares whether a metacard is selected; the attributes ride
/// along for the nested detail layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metacard {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Metacard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_ids_are_unique_and_ordered() {
        let a = ResultId::next();
        let b = ResultId::next();
        assert_ne!(a, b);
        assert!(b > a);
        assert!(a.to_string().starts_with("result-"));
    }

    #[test]
    fn lifecycle_event_serializes_lowercase() {
        let json = serde_json::to_string(&LifecycleEvent::Request).unwrap();
        assert_eq!(json, "\"request\"");
        let parsed: LifecycleEvent = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, LifecycleEvent::Error);
    }

    #[test]
    fn metacard_defaults_missing_fields() {
        let card: Metacard = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(card, Metacard::new("x"));

        let card = Metacard::new("y")
            .with_title("Harbor survey")
            .with_attribute("resource-size", serde_json::json!(42));
        assert_eq!(card.title.as_deref(), Some("Harbor survey"));
        assert_eq!(card.attributes["resource-size"], serde_json::json!(42));
    }
}
