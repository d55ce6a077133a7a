//! In-memory registry: guests, categories and the capacity-gated draw.
//!
//! A [`Registry`] is loaded from disk by [`crate::store`], mutated by exactly
//! one operation, and written back. Nothing here touches the filesystem.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::RegistryError;
use crate::types::{Category, CategoryName, CategoryStatus, Guest, GuestPatch, Phone};

/// Guests and categories of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Configured order is preserved; it drives dashboard and draw order.
    pub categories: Vec<Category>,
    /// Insertion order is preserved; later rows win on lookup.
    pub guests: Vec<Guest>,
}

impl Registry {
    pub fn new(categories: Vec<Category>, guests: Vec<Guest>) -> Self {
        Self { categories, guests }
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name.0 == name)
    }

    /// Number of guests per configured category. Guests pointing at a
    /// category that is no longer configured are not counted.
    pub fn assigned_counts(&self) -> HashMap<&CategoryName, u32> {
        let mut counts: HashMap<&CategoryName, u32> =
            self.categories.iter().map(|c| (&c.name, 0)).collect();
        for guest in &self.guests {
            if let Some(n) = counts.get_mut(&guest.category) {
                *n += 1;
            }
        }
        counts
    }

    /// Categories that can still take a guest, in configured order.
    pub fn available_categories(&self) -> Vec<&Category> {
        let counts = self.assigned_counts();
        self.categories
            .iter()
            .filter(|c| counts.get(&c.name).copied().unwrap_or(0) < c.capacity)
            .collect()
    }

    pub fn category_status(&self) -> Vec<CategoryStatus> {
        let counts = self.assigned_counts();
        self.categories
            .iter()
            .map(|c| {
                let assigned = counts.get(&c.name).copied().unwrap_or(0);
                CategoryStatus {
                    name: c.name.clone(),
                    capacity: c.capacity,
                    assigned,
                    remaining: c.capacity.saturating_sub(assigned),
                }
            })
            .collect()
    }

    /// Register a guest and draw their category.
    ///
    /// The draw is uniform over the categories still under capacity; it is
    /// not weighted by how much room each one has left. On error the registry
    /// is left untouched.
    pub fn register<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        phone: &str,
        companions: u32,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Category, RegistryError> {
        let name = validate_name(name)?;
        let phone = Phone::parse(phone)?;

        if self.guests.iter().any(|g| g.phone == phone) {
            return Err(RegistryError::DuplicatePhone { phone: phone.to_string() });
        }

        let chosen = self
            .available_categories()
            .choose(rng)
            .map(|c| (*c).clone())
            .ok_or(RegistryError::NoCapacity)?;

        tracing::debug!(phone = %phone, category = %chosen.name, "category drawn");
        self.guests.push(Guest {
            name,
            phone,
            category: chosen.name.clone(),
            companions,
            registered_at: now,
        });
        Ok(chosen)
    }

    /// Find the guest registered with `phone`. The most recently inserted
    /// match wins if the table somehow holds duplicates.
    pub fn lookup(&self, phone: &str) -> Result<&Guest, RegistryError> {
        let idx = self.position(phone)?;
        Ok(&self.guests[idx])
    }

    /// Set a category's capacity. Guests already assigned are never evicted,
    /// so the new value may be below the current assignment count.
    pub fn update_capacity(
        &mut self,
        category: &str,
        new_capacity: i64,
    ) -> Result<(), RegistryError> {
        let capacity = u32::try_from(new_capacity).map_err(|_| {
            RegistryError::invalid(format!(
                "capacity must be between 0 and {}, got {new_capacity}",
                u32::MAX
            ))
        })?;
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.name.0 == category)
            .ok_or_else(|| RegistryError::UnknownCategory { name: category.to_owned() })?;
        entry.capacity = capacity;
        Ok(())
    }

    /// Overwrite the editable fields of the guest registered with `phone`.
    ///
    /// Capacity is not re-checked. A phone change that collides with a
    /// different guest is rejected and nothing is modified.
    pub fn edit_guest(&mut self, phone: &str, patch: GuestPatch) -> Result<(), RegistryError> {
        let idx = self.position(phone)?;

        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let new_phone = patch.phone.as_deref().map(Phone::parse).transpose()?;
        if let Some(p) = &new_phone {
            let collides = self
                .guests
                .iter()
                .enumerate()
                .any(|(i, g)| i != idx && g.phone == *p);
            if collides {
                return Err(RegistryError::DuplicatePhone { phone: p.to_string() });
            }
        }

        let guest = &mut self.guests[idx];
        if let Some(name) = name {
            guest.name = name;
        }
        if let Some(p) = new_phone {
            guest.phone = p;
        }
        if let Some(companions) = patch.companions {
            guest.companions = companions;
        }
        Ok(())
    }

    /// Remove the guest registered with `phone` and return it.
    pub fn delete_guest(&mut self, phone: &str) -> Result<Guest, RegistryError> {
        let idx = self.position(phone)?;
        Ok(self.guests.remove(idx))
    }

    fn position(&self, phone: &str) -> Result<usize, RegistryError> {
        let phone = Phone::parse(phone)?;
        self.guests
            .iter()
            .rposition(|g| g.phone == phone)
            .ok_or_else(|| RegistryError::NotFound { phone: phone.to_string() })
    }
}

fn validate_name(name: &str) -> Result<String, RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::invalid("name is required"));
    }
    Ok(name.to_owned())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
