//! Post-mutation fan-out shared by every CLI command that changes the guest
//! list.
//!
//! The mirror runs after every mutation; the host notification only after a
//! registration. Neither can fail the caller: problems come back as
//! [`Warning`]s and are logged.

use std::path::Path;

use giftdraw_core::{store, ErrorKind, EventName, Guest, Settings};
use giftdraw_renderer::{MessageKind, Renderer, TemplateContext};

use crate::error::SyncError;
use crate::mirror::{push_guests_at, GitHubContents, PushOutcome, RemoteStore};
use crate::notify::{notifier_from_settings, Email, Notifier};

/// What just happened to the guest list.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    Registered(&'a Guest),
    Edited(&'a Guest),
    Deleted(&'a Guest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Mirror,
    Notify,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::Mirror => f.write_str("mirror"),
            Collaborator::Notify => f.write_str("notify"),
        }
    }
}

/// A swallowed collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub collaborator: Collaborator,
    pub kind: ErrorKind,
    pub message: String,
}

impl Warning {
    fn from_error(collaborator: Collaborator, err: &SyncError) -> Self {
        tracing::warn!(%collaborator, "{err}");
        Self { collaborator, kind: err.kind(), message: err.to_string() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.collaborator, self.message)
    }
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub mirror: Option<PushOutcome>,
    pub notified: bool,
    pub warnings: Vec<Warning>,
}

struct MirrorTarget {
    remote: Box<dyn RemoteStore>,
    path: String,
}

struct NotifyTarget {
    notifier: Box<dyn Notifier>,
    renderer: Renderer,
    hosts: Vec<String>,
}

/// Configured outbound collaborators for one event.
#[derive(Default)]
pub struct Collaborators {
    mirror: Option<MirrorTarget>,
    notify: Option<NotifyTarget>,
    /// Problems found while building the collaborators.
    pending: Vec<Warning>,
}

impl Collaborators {
    /// No mirror, no notification.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from settings. A collaborator that cannot be constructed (for
    /// example a missing token) is disabled and reported on the next run.
    pub fn from_settings(home: &Path, event: &EventName, settings: &Settings) -> Self {
        let mut this = Self::default();

        if let Some(mirror) = &settings.mirror {
            match GitHubContents::from_settings(mirror) {
                Ok(remote) => this = this.with_mirror(Box::new(remote), &mirror.path),
                Err(e) => this.pending.push(Warning::from_error(Collaborator::Mirror, &e)),
            }
        }

        if let Some(notify) = &settings.notify {
            let templates = store::root_at(home).join("templates");
            let built = notifier_from_settings(home, event, notify).and_then(|n| {
                let renderer = Renderer::with_overrides(&templates)?;
                Ok(n.map(|n| (n, renderer)))
            });
            match built {
                Ok(Some((notifier, renderer))) => {
                    this = this.with_notifier(notifier, renderer, notify.hosts.clone());
                }
                Ok(None) => {}
                Err(e) => this.pending.push(Warning::from_error(Collaborator::Notify, &e)),
            }
        }
        this
    }

    pub fn with_mirror(mut self, remote: Box<dyn RemoteStore>, path: &str) -> Self {
        self.mirror = Some(MirrorTarget { remote, path: path.to_string() });
        self
    }

    pub fn with_notifier(
        mut self,
        notifier: Box<dyn Notifier>,
        renderer: Renderer,
        hosts: Vec<String>,
    ) -> Self {
        self.notify = Some(NotifyTarget { notifier, renderer, hosts });
        self
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    /// Mirror the guest table for `event` on its own, outside a mutation.
    pub fn push(
        &self,
        home: &Path,
        event: &EventName,
        dry_run: bool,
    ) -> Option<Result<PushOutcome, SyncError>> {
        self.mirror
            .as_ref()
            .map(|m| push_guests_at(home, event, m.remote.as_ref(), &m.path, dry_run))
    }

    /// Warnings collected while building the collaborators.
    pub fn pending_warnings(&self) -> &[Warning] {
        &self.pending
    }
}

/// Run every configured collaborator for `mutation`. Never fails.
pub fn run(
    home: &Path,
    event: &EventName,
    collaborators: &Collaborators,
    mutation: Mutation<'_>,
) -> PipelineReport {
    let mut report = PipelineReport {
        warnings: collaborators.pending_warnings().to_vec(),
        ..PipelineReport::default()
    };

    if let Some(result) = collaborators.push(home, event, false) {
        match result {
            Ok(outcome) => report.mirror = Some(outcome),
            Err(e) => report.warnings.push(Warning::from_error(Collaborator::Mirror, &e)),
        }
    }

    if let (Mutation::Registered(guest), Some(target)) = (mutation, &collaborators.notify) {
        match notify_hosts(home, event, target, guest) {
            Ok(()) => report.notified = true,
            Err(e) => report.warnings.push(Warning::from_error(Collaborator::Notify, &e)),
        }
    }

    report
}

fn notify_hosts(
    home: &Path,
    event: &EventName,
    target: &NotifyTarget,
    guest: &Guest,
) -> Result<(), SyncError> {
    let registry = store::load_at(home, event)?;
    let ctx = TemplateContext::from_registration(event, guest, &registry);
    let msg = target.renderer.render(&ctx, MessageKind::Notification)?;
    target.notifier.send(&Email::from_rendered(&target.hosts, &msg))
}
