//! # giftdraw-renderer
//!
//! Tera-based rendering of guest-facing and host-facing messages, plus the
//! decorative draw reveal.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use giftdraw_core::{EventName, Guest, Registry};
//! use giftdraw_renderer::{MessageKind, Renderer, TemplateContext};
//!
//! fn confirmation(event: &EventName, guest: &Guest, registry: &Registry) -> Option<String> {
//!     let renderer = Renderer::new().ok()?;
//!     let ctx = TemplateContext::from_registration(event, guest, registry);
//!     renderer.render(&ctx, MessageKind::Share).ok().map(|m| m.body)
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod reveal;

pub use context::TemplateContext;
pub use engine::{share_link, MessageKind, RenderedMessage, Renderer, TemplateEngine};
pub use error::RenderError;
pub use reveal::{RevealFrame, RevealPlan};
