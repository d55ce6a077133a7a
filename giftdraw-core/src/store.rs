//! Per-event YAML tables.
//!
//! # Storage layout
//!
//! ```text
//! ~/.giftdraw/
//!   events/
//!     <event>/
//!       categories.yaml   (category table, mode 0600, seeded on init)
//!       guests.yaml       (guest table, mode 0600, insertion order)
//!       .lock             (present only during a read-modify-write)
//! ```
//!
//! # API pattern
//!
//! Every function takes an explicit `home: &Path`; the binary resolves it
//! once with [`home`], tests pass a `TempDir`.
//!
//! Each mutating `*_at` operation is one pass: lock, load, apply the
//! [`Registry`] operation, save the touched table only on success, unlock.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RegistryError;
use crate::lock::EventLock;
use crate::registry::Registry;
use crate::types::{Category, EventName, Guest, GuestPatch};

pub const CATEGORIES_FILE: &str = "categories.yaml";
pub const GUESTS_FILE: &str = "guests.yaml";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.giftdraw/`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".giftdraw")
}

/// `<home>/.giftdraw/events/<event>/` — pure, no I/O.
pub fn event_path_at(home: &Path, event: &EventName) -> PathBuf {
    root_at(home).join("events").join(&event.0)
}

/// `<home>/.giftdraw/events/<event>/`
///
/// Creates the directory (mode `0700`) if it does not yet exist.
pub fn event_dir_at(home: &Path, event: &EventName) -> Result<PathBuf, RegistryError> {
    event.check()?;
    let dir = event_path_at(home, event);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

pub fn categories_path_at(home: &Path, event: &EventName) -> PathBuf {
    event_path_at(home, event).join(CATEGORIES_FILE)
}

pub fn guests_path_at(home: &Path, event: &EventName) -> PathBuf {
    event_path_at(home, event).join(GUESTS_FILE)
}

/// Lists all initialised events, sorted by name.
pub fn list_events_at(home: &Path) -> Result<Vec<EventName>, RegistryError> {
    let dir = root_at(home).join("events");
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<EventName> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().join(CATEGORIES_FILE).exists())
        .map(|e| EventName::from(e.file_name().to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load both tables of `event` into a [`Registry`].
///
/// Returns `RegistryError::EventNotFound` if the category table is absent.
/// A missing guest table is treated as empty.
pub fn load_at(home: &Path, event: &EventName) -> Result<Registry, RegistryError> {
    event.check()?;
    let categories_path = categories_path_at(home, event);
    if !categories_path.exists() {
        return Err(RegistryError::EventNotFound { path: event_path_at(home, event) });
    }
    let categories: Vec<Category> = read_table(&categories_path)?;

    let guests_path = guests_path_at(home, event);
    let guests: Vec<Guest> = if guests_path.exists() {
        read_table(&guests_path)?
    } else {
        vec![]
    };
    Ok(Registry::new(categories, guests))
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_yaml::from_str(&contents)
        .map_err(|e| RegistryError::Parse { path: path.to_path_buf(), source: e })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Write flow: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
/// The `.tmp` lives next to the target so the rename never crosses
/// filesystems.
fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), RegistryError> {
    let Some(file_name) = path.file_name() else {
        return Err(RegistryError::Io(std::io::Error::other("table path has no file name")));
    };
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let yaml = serde_yaml::to_string(rows)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

pub fn save_categories_at(
    home: &Path,
    event: &EventName,
    categories: &[Category],
) -> Result<(), RegistryError> {
    event_dir_at(home, event)?;
    write_table(&categories_path_at(home, event), categories)
}

pub fn save_guests_at(home: &Path, event: &EventName, guests: &[Guest]) -> Result<(), RegistryError> {
    event_dir_at(home, event)?;
    write_table(&guests_path_at(home, event), guests)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Create `event` with `seed` categories and an empty guest table.
///
/// Idempotent: an existing event is loaded and returned unchanged, so a later
/// seed never overwrites admin capacity changes.
pub fn init_at(home: &Path, event: &EventName, seed: &[Category]) -> Result<Registry, RegistryError> {
    if categories_path_at(home, event).exists() {
        return load_at(home, event);
    }

    let dir = event_dir_at(home, event)?;
    let _lock = EventLock::acquire(&dir)?;
    // lost the race to another init
    if categories_path_at(home, event).exists() {
        return load_at(home, event);
    }

    validate_seed(seed)?;
    save_categories_at(home, event, seed)?;
    if !guests_path_at(home, event).exists() {
        save_guests_at(home, event, &[])?;
    }
    tracing::info!(event = %event, categories = seed.len(), "event initialised");
    Ok(Registry::new(seed.to_vec(), vec![]))
}

fn validate_seed(seed: &[Category]) -> Result<(), RegistryError> {
    if seed.is_empty() {
        return Err(RegistryError::invalid("at least one category is required"));
    }
    for (i, c) in seed.iter().enumerate() {
        if c.name.0.trim().is_empty() {
            return Err(RegistryError::invalid("category names must not be empty"));
        }
        if seed[..i].iter().any(|prev| prev.name == c.name) {
            return Err(RegistryError::invalid(format!("category '{}' is listed twice", c.name)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Registry operations (one locked pass each)
// ---------------------------------------------------------------------------

/// Register a guest, persist the guest table, and return the new row.
pub fn register_at<R: Rng + ?Sized>(
    home: &Path,
    event: &EventName,
    name: &str,
    phone: &str,
    companions: u32,
    rng: &mut R,
) -> Result<Guest, RegistryError> {
    with_locked(home, event, |reg| {
        reg.register(name, phone, companions, Utc::now(), rng)?;
        let guest = reg.lookup(phone)?.clone();
        save_guests_at(home, event, &reg.guests)?;
        tracing::info!(event = %event, category = %guest.category, "guest registered");
        Ok(guest)
    })
}

/// Look up a guest. Read-only; takes no lock.
pub fn lookup_at(home: &Path, event: &EventName, phone: &str) -> Result<Guest, RegistryError> {
    load_at(home, event)?.lookup(phone).cloned()
}

pub fn update_capacity_at(
    home: &Path,
    event: &EventName,
    category: &str,
    new_capacity: i64,
) -> Result<Category, RegistryError> {
    with_locked(home, event, |reg| {
        reg.update_capacity(category, new_capacity)?;
        save_categories_at(home, event, &reg.categories)?;
        tracing::info!(event = %event, category, new_capacity, "capacity updated");
        reg.category(category)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCategory { name: category.to_owned() })
    })
}

/// Apply `patch` and return the edited guest.
pub fn edit_guest_at(
    home: &Path,
    event: &EventName,
    phone: &str,
    patch: GuestPatch,
) -> Result<Guest, RegistryError> {
    let new_phone = patch.phone.clone().unwrap_or_else(|| phone.to_owned());
    with_locked(home, event, |reg| {
        reg.edit_guest(phone, patch)?;
        save_guests_at(home, event, &reg.guests)?;
        tracing::info!(event = %event, "guest edited");
        reg.lookup(&new_phone).cloned()
    })
}

/// Delete a guest and return the removed row.
pub fn delete_guest_at(home: &Path, event: &EventName, phone: &str) -> Result<Guest, RegistryError> {
    with_locked(home, event, |reg| {
        let removed = reg.delete_guest(phone)?;
        save_guests_at(home, event, &reg.guests)?;
        tracing::info!(event = %event, "guest deleted");
        Ok(removed)
    })
}

fn with_locked<T>(
    home: &Path,
    event: &EventName,
    op: impl FnOnce(&mut Registry) -> Result<T, RegistryError>,
) -> Result<T, RegistryError> {
    event.check()?;
    let dir = event_path_at(home, event);
    if !dir.join(CATEGORIES_FILE).exists() {
        return Err(RegistryError::EventNotFound { path: dir });
    }
    let _lock = EventLock::acquire(&dir)?;
    let mut reg = load_at(home, event)?;
    op(&mut reg)
}

// ---------------------------------------------------------------------------
// 6. Home-directory wrappers
// ---------------------------------------------------------------------------

/// The user's home directory.
pub fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

pub fn init(event: &EventName, seed: &[Category]) -> Result<Registry, RegistryError> {
    init_at(&home()?, event, seed)
}

pub fn load(event: &EventName) -> Result<Registry, RegistryError> {
    load_at(&home()?, event)
}

pub fn register<R: Rng + ?Sized>(
    event: &EventName,
    name: &str,
    phone: &str,
    companions: u32,
    rng: &mut R,
) -> Result<Guest, RegistryError> {
    register_at(&home()?, event, name, phone, companions, rng)
}

pub fn lookup(event: &EventName, phone: &str) -> Result<Guest, RegistryError> {
    lookup_at(&home()?, event, phone)
}

pub fn update_capacity(
    event: &EventName,
    category: &str,
    new_capacity: i64,
) -> Result<Category, RegistryError> {
    update_capacity_at(&home()?, event, category, new_capacity)
}

pub fn edit_guest(event: &EventName, phone: &str, patch: GuestPatch) -> Result<Guest, RegistryError> {
    edit_guest_at(&home()?, event, phone, patch)
}

pub fn delete_guest(event: &EventName, phone: &str) -> Result<Guest, RegistryError> {
    delete_guest_at(&home()?, event, phone)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
