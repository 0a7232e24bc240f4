//! Compile-time access to generation settings and trick toggles.
//!
//! The optimizer asks a [`SettingReader`] for values it can fold into
//! literals. Anything the reader does not know is left for the host to answer
//! at run time.

use std::collections::{HashMap, HashSet};

use crate::ast::Node;
use crate::objects::Object;

/// A setting's value.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    /// Enumerated or free-form text.
    Str(String),
    /// Numeric.
    Number(f64),
    /// Toggle.
    Bool(bool),
}

impl SettingValue {
    /// The literal the optimizer substitutes.
    #[must_use]
    pub fn to_node(&self) -> Node {
        match self {
            Self::Str(s) => Node::Str(s.clone()),
            Self::Number(n) => Node::Number(*n),
            Self::Bool(b) => Node::Bool(*b),
        }
    }

    /// The object the VM pushes.
    #[must_use]
    pub fn to_object(&self) -> Object {
        match self {
            Self::Str(s) => Object::from(s.as_str()),
            Self::Number(n) => Object::Number(*n),
            Self::Bool(b) => Object::Bool(*b),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<f64> for SettingValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Source of setting values.
pub trait SettingReader {
    /// Value of a top-level setting.
    fn setting(&self, name: &str) -> Option<SettingValue>;

    /// Value of one entry of a keyed setting, such as one trial of
    /// `skipped_trials`.
    fn indexed(&self, name: &str, key: &str) -> Option<SettingValue>;

    /// Whether a trick is enabled. Names have no `logic_` prefix.
    fn trick_enabled(&self, trick: &str) -> bool;

    /// Text value of a setting.
    fn string(&self, name: &str) -> Option<String> {
        match self.setting(name)? {
            SettingValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of a setting.
    fn number(&self, name: &str) -> Option<f64> {
        match self.setting(name)? {
            SettingValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Toggle value of a setting.
    fn boolean(&self, name: &str) -> Option<bool> {
        match self.setting(name)? {
            SettingValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

/// Map-backed settings.
#[derive(Clone, Debug, Default)]
pub struct StaticSettings {
    values: HashMap<String, SettingValue>,
    indexed: HashMap<(String, String), SettingValue>,
    tricks: HashSet<String>,
}

impl StaticSettings {
    /// Creates an empty reader that knows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a setting.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<SettingValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Builder method to set one entry of a keyed setting.
    #[must_use]
    pub fn with_indexed(mut self, name: &str, key: &str, value: impl Into<SettingValue>) -> Self {
        self.indexed
            .insert((name.to_string(), key.to_string()), value.into());
        self
    }

    /// Builder method to enable a trick.
    #[must_use]
    pub fn with_trick(mut self, trick: &str) -> Self {
        self.tricks.insert(trick.to_string());
        self
    }
}

impl SettingReader for StaticSettings {
    fn setting(&self, name: &str) -> Option<SettingValue> {
        self.values.get(name).cloned()
    }

    fn indexed(&self, name: &str, key: &str) -> Option<SettingValue> {
        self.indexed
            .get(&(name.to_string(), key.to_string()))
            .cloned()
    }

    fn trick_enabled(&self, trick: &str) -> bool {
        self.tricks.contains(trick)
    }
}
