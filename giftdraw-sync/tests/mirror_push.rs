use std::cell::RefCell;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use giftdraw_core::{store, Category, EventName};
use giftdraw_sync::{hash_store, push_guests_at, PushOutcome, PutRequest, RemoteStore, SyncError};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// In-memory remote: path → (sha, content).
#[derive(Default)]
struct FakeRemote {
    files: RefCell<Vec<(String, String, Vec<u8>)>>,
    puts: RefCell<Vec<PutRequest>>,
    fail_put: bool,
}

impl FakeRemote {
    fn failing() -> Self {
        Self { fail_put: true, ..Self::default() }
    }
}

impl RemoteStore for FakeRemote {
    fn fetch_sha(&self, path: &str) -> Result<Option<String>, SyncError> {
        Ok(self
            .files
            .borrow()
            .iter()
            .find(|(p, _, _)| p == path)
            .map(|(_, sha, _)| sha.clone()))
    }

    fn put(&self, req: &PutRequest) -> Result<(), SyncError> {
        if self.fail_put {
            return Err(SyncError::Http {
                url: "https://api.example.com".into(),
                status: Some(409),
                message: "status 409 Conflict".into(),
            });
        }
        self.puts.borrow_mut().push(req.clone());
        let mut files = self.files.borrow_mut();
        files.retain(|(p, _, _)| p != &req.path);
        let sha = format!("sha-{}", self.puts.borrow().len());
        files.push((req.path.clone(), sha, req.content.clone()));
        Ok(())
    }
}

fn event() -> EventName {
    EventName::from("shower")
}

fn seeded_home() -> TempDir {
    let home = TempDir::new().expect("home");
    store::init_at(home.path(), &event(), &[Category::new("Juguetes", 3)]).expect("init");
    home
}

fn register(home: &TempDir, phone: &str) {
    store::register_at(home.path(), &event(), "Ana", phone, 0, &mut StdRng::seed_from_u64(3))
        .expect("register");
}

#[test]
fn first_push_creates_then_updates_with_sha() {
    let home = seeded_home();
    let remote = FakeRemote::default();

    register(&home, "3001234567");
    let first = push_guests_at(home.path(), &event(), &remote, "data/guests.yaml", false).unwrap();
    assert_eq!(first, PushOutcome::Created { path: "data/guests.yaml".into() });

    register(&home, "3007654321");
    let second = push_guests_at(home.path(), &event(), &remote, "data/guests.yaml", false).unwrap();
    assert_eq!(second, PushOutcome::Updated { path: "data/guests.yaml".into() });

    let puts = remote.puts.borrow();
    assert_eq!(puts.len(), 2);
    assert!(puts[0].sha.is_none());
    assert_eq!(puts[1].sha.as_deref(), Some("sha-1"));
    let table = std::fs::read(store::guests_path_at(home.path(), &event())).unwrap();
    assert_eq!(puts[1].content, table);
}

#[test]
fn unchanged_content_is_not_pushed() {
    let home = seeded_home();
    let remote = FakeRemote::default();
    register(&home, "3001234567");

    push_guests_at(home.path(), &event(), &remote, "guests.yaml", false).unwrap();
    let again = push_guests_at(home.path(), &event(), &remote, "guests.yaml", false).unwrap();

    assert_eq!(again, PushOutcome::Unchanged { path: "guests.yaml".into() });
    assert_eq!(remote.puts.borrow().len(), 1);
}

#[test]
fn remote_failure_leaves_hash_store_untouched() {
    let home = seeded_home();
    register(&home, "3001234567");

    let err = push_guests_at(home.path(), &event(), &FakeRemote::failing(), "guests.yaml", false)
        .expect_err("put fails");
    assert!(matches!(err, SyncError::Http { status: Some(409), .. }));
    home.child(".giftdraw/hashes/shower.json").assert(predicates::path::missing());

    // next attempt against a healthy remote still pushes
    let remote = FakeRemote::default();
    let outcome = push_guests_at(home.path(), &event(), &remote, "guests.yaml", false).unwrap();
    assert_eq!(outcome, PushOutcome::Created { path: "guests.yaml".into() });
}

#[test]
fn dry_run_writes_nothing() {
    let home = seeded_home();
    let remote = FakeRemote::default();
    register(&home, "3001234567");

    let outcome = push_guests_at(home.path(), &event(), &remote, "guests.yaml", true).unwrap();
    assert_eq!(outcome, PushOutcome::WouldPush { path: "guests.yaml".into() });
    assert!(remote.puts.borrow().is_empty());
    assert!(hash_store::load_at(home.path(), &event()).unwrap().files.is_empty());
}

#[test]
fn uninitialised_event_is_reported() {
    let home = TempDir::new().unwrap();
    let remote = FakeRemote::default();
    let err = push_guests_at(home.path(), &EventName::from("ghost"), &remote, "g", false)
        .expect_err("no event");
    assert!(matches!(
        err,
        SyncError::Registry(giftdraw_core::RegistryError::EventNotFound { .. })
    ));
}
