//! Remote mirror of the guest table.
//!
//! ## `push_guests_at` protocol
//!
//! 1. Read the guest table bytes.
//! 2. SHA-256 hash them.
//! 3. Compare with the hash store entry for the remote path → `Unchanged`.
//! 4. Dry-run stops here → `WouldPush`.
//! 5. Ask the remote for the current blob sha (absent = create).
//! 6. PUT the base64 content, with the sha when updating.
//! 7. Record the digest in the hash store.
//!
//! A failed step 5 or 6 leaves the hash store untouched so the next
//! mutation retries.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use giftdraw_core::{settings::MirrorSettings, store, EventName, RegistryError};

use crate::error::{http_err, io_err, SyncError};
use crate::hash_store;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("giftdraw/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// RemoteStore
// ---------------------------------------------------------------------------

/// One file write to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    pub path: String,
    pub message: String,
    pub content: Vec<u8>,
    /// Current blob sha; `None` creates the file.
    pub sha: Option<String>,
}

/// A version-controlled file store addressed by path.
pub trait RemoteStore {
    /// Blob sha of `path`, or `None` if the file does not exist.
    fn fetch_sha(&self, path: &str) -> Result<Option<String>, SyncError>;

    fn put(&self, req: &PutRequest) -> Result<(), SyncError>;
}

/// GitHub "repository contents" endpoint.
pub struct GitHubContents {
    agent: ureq::Agent,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
}

impl GitHubContents {
    /// Build from settings, reading the token from `settings.token_env`.
    pub fn from_settings(settings: &MirrorSettings) -> Result<Self, SyncError> {
        let token = std::env::var(&settings.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::MissingToken { var: settings.token_env.clone() })?;
        Ok(Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            branch: settings.branch.clone(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, req: ureq::Request) -> ureq::Request {
        req.set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
    }
}

impl RemoteStore for GitHubContents {
    fn fetch_sha(&self, path: &str) -> Result<Option<String>, SyncError> {
        let url = self.url(path);
        let req = self.authorize(self.agent.get(&url)).query("ref", &self.branch);
        match req.call() {
            Ok(resp) => {
                let body: ContentsResponse = resp.into_json().map_err(|e| SyncError::Remote {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
                Ok(Some(body.sha))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(http_err(&url, e)),
        }
    }

    fn put(&self, req: &PutRequest) -> Result<(), SyncError> {
        let url = self.url(&req.path);
        let mut payload = json!({
            "message": req.message,
            "content": base64::engine::general_purpose::STANDARD.encode(&req.content),
            "branch": self.branch,
        });
        if let Some(sha) = &req.sha {
            payload["sha"] = json!(sha);
        }
        self.authorize(self.agent.put(&url))
            .send_json(payload)
            .map_err(|e| http_err(&url, e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Outcome of one mirror push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The remote file did not exist and was created.
    Created { path: String },
    /// The remote file existed and was replaced.
    Updated { path: String },
    /// Content matches the last push; nothing was sent.
    Unchanged { path: String },
    /// `--dry-run`: the table *would* have been pushed.
    WouldPush { path: String },
}

/// Push the guest table of `event` to `remote_path` on `remote`.
pub fn push_guests_at(
    home: &Path,
    event: &EventName,
    remote: &dyn RemoteStore,
    remote_path: &str,
    dry_run: bool,
) -> Result<PushOutcome, SyncError> {
    let table = store::guests_path_at(home, event);
    if !table.exists() {
        return Err(SyncError::Registry(RegistryError::EventNotFound {
            path: store::event_path_at(home, event),
        }));
    }
    let content = std::fs::read(&table).map_err(|e| io_err(&table, e))?;
    let digest = hash_store::digest(&content);

    let mut hashes = hash_store::load_at(home, event)?;
    if hashes.files.get(remote_path) == Some(&digest) {
        tracing::debug!("mirror unchanged: {remote_path}");
        return Ok(PushOutcome::Unchanged { path: remote_path.to_string() });
    }

    if dry_run {
        tracing::info!("[dry-run] would push: {remote_path}");
        return Ok(PushOutcome::WouldPush { path: remote_path.to_string() });
    }

    let sha = remote.fetch_sha(remote_path)?;
    let created = sha.is_none();
    let message = format!(
        "{} guest list ({})",
        if created { "Create" } else { "Update" },
        event
    );
    remote.put(&PutRequest {
        path: remote_path.to_string(),
        message,
        content,
        sha,
    })?;

    hashes.files.insert(remote_path.to_string(), digest);
    hashes.pushed_at = Some(Utc::now());
    hash_store::save_at(home, event, &hashes)?;

    tracing::info!(created, "pushed: {remote_path}");
    let path = remote_path.to_string();
    Ok(if created { PushOutcome::Created { path } } else { PushOutcome::Updated { path } })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
