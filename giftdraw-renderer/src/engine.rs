//! Tera rendering engine — [`MessageKind`] enum and [`Renderer`].
//!
//! # Template mapping
//!
//! | Message      | Templates                                              |
//! |--------------|--------------------------------------------------------|
//! | Notification | `notification/subject.tera`, `notification/body.tera`  |
//! | Share        | `share/message.tera`                                   |
//!
//! Files under the user template directory with the same relative name
//! replace the embedded defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::TemplateContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates (include_str!)
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "notification/subject.tera",
        include_str!("templates/notification_subject.tera"),
    ),
    (
        "notification/body.tera",
        include_str!("templates/notification_body.tera"),
    ),
    ("share/message.tera", include_str!("templates/share_message.tera")),
];

/// Country calling code prepended to share links.
pub const SHARE_COUNTRY_CODE: &str = "57";

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    // plain-text output
    tera.autoescape_on(vec![]);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// Messages produced after a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// E-mail to the hosts summarising the new guest.
    Notification,
    /// Confirmation the guest can forward to themselves.
    Share,
}

impl MessageKind {
    pub fn all() -> &'static [MessageKind] {
        &[MessageKind::Notification, MessageKind::Share]
    }

    pub fn subject_template(&self) -> Option<&'static str> {
        match self {
            MessageKind::Notification => Some("notification/subject.tera"),
            MessageKind::Share => None,
        }
    }

    pub fn body_template(&self) -> &'static str {
        match self {
            MessageKind::Notification => "notification/body.tera",
            MessageKind::Share => "share/message.tera",
        }
    }
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub kind: MessageKind,
    /// Single line, no trailing newline.
    pub subject: Option<String>,
    pub body: String,
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults.
/// Template names are normalised to lowercase and relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    pub fn render(
        &self,
        ctx: &TemplateContext,
        kind: MessageKind,
    ) -> Result<RenderedMessage, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let subject = match kind.subject_template() {
            Some(name) => Some(single_line(&self.tera.render(name, &tera_ctx)?)),
            None => None,
        };
        let body = self.tera.render(kind.body_template(), &tera_ctx)?.replace("\r\n", "\n");
        let body = match kind {
            MessageKind::Share => body.trim_end().to_string(),
            MessageKind::Notification => body,
        };
        Ok(RenderedMessage { kind, subject, body })
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renderer for all message kinds.
///
/// Create once with [`Renderer::new`] (embedded templates) or
/// [`Renderer::with_overrides`] and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Embedded templates plus overrides from `dir` (ignored if absent).
    pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(Some(dir))? })
    }

    pub fn render(
        &self,
        ctx: &TemplateContext,
        kind: MessageKind,
    ) -> Result<RenderedMessage, RenderError> {
        self.engine.render(ctx, kind)
    }
}

// ---------------------------------------------------------------------------
// Share link
// ---------------------------------------------------------------------------

/// `https://wa.me/<cc><phone>?text=<message>` with the message
/// percent-encoded (RFC 3986 unreserved characters kept).
pub fn share_link(phone: &str, message: &str) -> String {
    let mut encoded = String::with_capacity(message.len() * 3);
    for b in message.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(b));
            }
            _ => encoded.push_str(&format!("%{b:02X}")),
        }
    }
    format!("https://wa.me/{SHARE_COUNTRY_CODE}{phone}?text={encoded}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
