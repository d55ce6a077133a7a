//! Template context — serializable rendering payload built from a
//! registration and the registry it landed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giftdraw_core::{EventName, Guest, Registry};

use crate::error::RenderError;

/// Timestamp format shown to hosts and guests.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub event: EventCtx,
    pub guest: GuestCtx,
    /// One row per configured category, in configured order.
    pub categories: Vec<CategoryCtx>,
    pub totals: TotalsCtx,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCtx {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestCtx {
    pub name: String,
    pub phone: String,
    pub category: String,
    pub companions: u32,
    /// Pre-formatted with [`DATE_FORMAT`].
    pub registered_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCtx {
    pub name: String,
    pub capacity: u32,
    pub assigned: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsCtx {
    pub guests: usize,
    pub companions: u64,
    pub capacity: u64,
    pub assigned: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub version: String,
    pub rendered_at: DateTime<Utc>,
}

impl TemplateContext {
    /// Build a [`TemplateContext`] for `guest`, whose row is already part of
    /// `registry`.
    pub fn from_registration(event: &EventName, guest: &Guest, registry: &Registry) -> Self {
        let categories: Vec<CategoryCtx> = registry
            .category_status()
            .into_iter()
            .map(|s| CategoryCtx {
                name: s.name.0,
                capacity: s.capacity,
                assigned: s.assigned,
                remaining: s.remaining,
            })
            .collect();

        let totals = TotalsCtx {
            guests: registry.guests.len(),
            companions: registry.guests.iter().map(|g| u64::from(g.companions)).sum(),
            capacity: categories.iter().map(|c| u64::from(c.capacity)).sum(),
            assigned: categories.iter().map(|c| u64::from(c.assigned)).sum(),
        };

        TemplateContext {
            event: EventCtx { name: event.0.clone() },
            guest: GuestCtx {
                name: guest.name.clone(),
                phone: guest.phone.to_string(),
                category: guest.category.0.clone(),
                companions: guest.companions,
                registered_at: guest.registered_at.format(DATE_FORMAT).to_string(),
            },
            categories,
            totals,
            meta: MetaCtx {
                version: env!("CARGO_PKG_VERSION").to_string(),
                rendered_at: Utc::now(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
