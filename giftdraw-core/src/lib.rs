//! giftdraw core library — domain types, the registry contract, event
//! storage, settings, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and table records
//! - [`registry`] — in-memory [`Registry`] with the capacity-gated draw
//! - [`store`] — per-event YAML tables, one locked pass per operation
//! - [`settings`] — `config.yaml` + environment overrides
//! - [`error`] — [`RegistryError`] and the shared [`ErrorKind`]

pub mod error;
pub mod lock;
pub mod registry;
pub mod settings;
pub mod store;
pub mod types;

pub use error::{ErrorKind, RegistryError};
pub use registry::Registry;
pub use settings::Settings;
pub use types::{Category, CategoryName, CategoryStatus, EventName, Guest, GuestPatch, Phone};
