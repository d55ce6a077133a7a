//! Domain types for the giftdraw registry.
//!
//! All types are serializable/deserializable via serde + serde_yaml and are
//! stored as flat records (one YAML mapping per row).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for an event (one directory of tables).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventName(pub String);

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl EventName {
    /// Validated event name: it becomes a directory under
    /// `.giftdraw/events/`, so path separators and `.`/`..` are rejected.
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let name = Self(raw.to_owned());
        name.check()?;
        Ok(name)
    }

    /// Same rules as [`EventName::parse`], for names built with `From`.
    pub fn check(&self) -> Result<(), RegistryError> {
        let raw = self.0.as_str();
        if raw.is_empty() || raw == "." || raw == ".." {
            return Err(RegistryError::invalid(format!("invalid event name '{raw}'")));
        }
        if raw.contains(['/', '\\', '\0']) {
            return Err(RegistryError::invalid(format!(
                "event name '{raw}' must not contain path separators"
            )));
        }
        Ok(())
    }
}

impl From<String> for EventName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed gift category key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryName(pub String);

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CategoryName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CategoryName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A guest phone number: exactly 10 ASCII digits, no prefix or spaces.
///
/// Comparison is plain string equality; nothing is trimmed or normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub const LEN: usize = 10;

    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        if raw.is_empty() {
            return Err(RegistryError::invalid("phone number is required"));
        }
        if raw.len() != Self::LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RegistryError::invalid(format!(
                "phone number must be exactly {} digits with no prefix or spaces, got '{raw}'",
                Self::LEN
            )));
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Phone {
    type Error = RegistryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Phone::parse(&s)
    }
}

impl From<Phone> for String {
    fn from(p: Phone) -> Self {
        p.0
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A gift category and how many guests it may receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: CategoryName,
    pub capacity: u32,
}

impl Category {
    pub fn new(name: impl Into<CategoryName>, capacity: u32) -> Self {
        Self { name: name.into(), capacity }
    }
}

/// A registered guest. Created only by `Registry::register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub phone: Phone,
    pub category: CategoryName,
    #[serde(default)]
    pub companions: u32,
    pub registered_at: DateTime<Utc>,
}

/// Admin edit of a guest. `None` leaves the field untouched.
///
/// `category` and `registered_at` are deliberately absent: both are fixed at
/// registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub companions: Option<u32>,
}

impl GuestPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.companions.is_none()
    }
}

/// Dashboard row: one per configured category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    pub name: CategoryName,
    pub capacity: u32,
    pub assigned: u32,
    /// `capacity - assigned`, saturating at zero after a capacity reduction.
    pub remaining: u32,
}

/// Categories seeded on first run when the settings file names none.
pub fn default_categories() -> Vec<Category> {
    [
        "Vestimenta",
        "Higiene y Baño",
        "Alimentación",
        "Juguetes y Estimulación",
        "Cambio de Pañal",
        "Hora de Dormir",
    ]
    .into_iter()
    .map(|name| Category::new(name, 5))
    .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
