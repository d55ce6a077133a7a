//! Event store integration tests: error messages, atomic-write safety and
//! the registry contract through the on-disk tables.

use assert_fs::prelude::*;
use giftdraw_core::{
    store,
    types::{default_categories, Category, EventName, GuestPatch},
    ErrorKind, RegistryError,
};
use predicates::prelude::predicate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

fn event() -> EventName { EventName::from("shower") }
fn rng() -> StdRng { StdRng::seed_from_u64(42) }

fn init(home: &Path) {
    store::init_at(home, &event(), &default_categories()).expect("init");
}

fn snapshot(home: &Path) -> (Vec<u8>, Vec<u8>) {
    (
        fs::read(store::categories_path_at(home, &event())).expect("categories"),
        fs::read(store::guests_path_at(home, &event())).expect("guests"),
    )
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_event_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = store::load_at(home.path(), &event()).unwrap_err();
    assert!(matches!(err, RegistryError::EventNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("giftdraw init"));
    assert_eq!(err.kind(), ErrorKind::ExternalIoFailure);
}

#[test]
fn load_corrupt_guest_table_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    fs::write(
        store::guests_path_at(home.path(), &event()),
        b": : corrupt : yaml : !!!\n  - broken: [unclosed",
    )
    .expect("write");

    let err = store::load_at(home.path(), &event()).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("guests.yaml"), "must contain file path, got: {err}");
}

#[test]
fn load_rejects_malformed_phone_rows() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    fs::write(
        store::guests_path_at(home.path(), &event()),
        "- name: Ana\n  phone: '12345'\n  category: Vestimenta\n  registered_at: 2025-06-01T10:00:00Z\n",
    )
    .expect("write");

    let err = store::load_at(home.path(), &event()).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    let guests_path = store::guests_path_at(home.path(), &event());
    let original = fs::read(&guests_path).expect("read original");

    // crash: .tmp written, rename never happened
    let tmp = guests_path.with_file_name("guests.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(original, fs::read(&guests_path).expect("read after crash"));
    let reg = store::load_at(home.path(), &event()).expect("load after crash");
    assert!(reg.guests.is_empty());
}

#[test]
fn tables_written_with_owner_only_mode() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    home.child(".giftdraw/events/shower/categories.yaml").assert(predicate::path::exists());
    home.child(".giftdraw/events/shower/guests.yaml").assert(predicate::path::exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = store::guests_path_at(home.path(), &event());
        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}

// ---------------------------------------------------------------------------
// 3. Registry contract through storage
// ---------------------------------------------------------------------------

#[test]
fn register_then_lookup_roundtrip() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());

    let guest = store::register_at(home.path(), &event(), "Ana", "3001234567", 2, &mut rng())
        .expect("register");
    let found = store::lookup_at(home.path(), &event(), "3001234567").expect("lookup");

    assert_eq!(found.name, "Ana");
    assert_eq!(found.companions, 2);
    assert_eq!(found.category, guest.category);
    assert_eq!(found.registered_at, guest.registered_at);
}

#[test]
fn failed_register_leaves_tables_byte_identical() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    store::register_at(home.path(), &event(), "Ana", "3001234567", 0, &mut rng()).unwrap();
    let before = snapshot(home.path());

    let dup = store::register_at(home.path(), &event(), "Eva", "3001234567", 0, &mut rng());
    assert_eq!(dup.unwrap_err().kind(), ErrorKind::DuplicatePhone);
    let bad = store::register_at(home.path(), &event(), "Eva", "300123456", 0, &mut rng());
    assert_eq!(bad.unwrap_err().kind(), ErrorKind::InvalidInput);

    assert_eq!(before, snapshot(home.path()));
}

#[test]
fn full_event_reports_no_capacity_without_mutation() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let seed = vec![Category::new("Vestimenta", 1), Category::new("Juguetes", 1)];
    store::init_at(home.path(), &event(), &seed).unwrap();
    let mut r = rng();
    store::register_at(home.path(), &event(), "A", "3000000001", 0, &mut r).unwrap();
    store::register_at(home.path(), &event(), "B", "3000000002", 0, &mut r).unwrap();
    let before = snapshot(home.path());

    let err = store::register_at(home.path(), &event(), "C", "3000000003", 0, &mut r).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCapacity);
    assert_eq!(before, snapshot(home.path()));
}

#[test]
fn zero_capacity_category_never_assigned() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    store::update_capacity_at(home.path(), &event(), "Vestimenta", 0).expect("capacity");

    let mut r = rng();
    for i in 0..20 {
        let phone = format!("31{i:08}");
        let guest = store::register_at(home.path(), &event(), "G", &phone, 0, &mut r).unwrap();
        assert_ne!(guest.category.0, "Vestimenta");
    }
}

#[test]
fn update_capacity_persists_and_validates() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());

    let cat = store::update_capacity_at(home.path(), &event(), "Alimentación", 12).unwrap();
    assert_eq!(cat.capacity, 12);
    let reg = store::load_at(home.path(), &event()).unwrap();
    assert_eq!(reg.category("Alimentación").unwrap().capacity, 12);

    let err = store::update_capacity_at(home.path(), &event(), "Cunas", 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownCategory);
    let err = store::update_capacity_at(home.path(), &event(), "Alimentación", -2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn edit_to_taken_phone_leaves_both_records() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    let mut r = rng();
    store::register_at(home.path(), &event(), "Ana", "3001234567", 0, &mut r).unwrap();
    store::register_at(home.path(), &event(), "Luis", "3007654321", 1, &mut r).unwrap();
    let before = snapshot(home.path());

    let patch = GuestPatch { phone: Some("3007654321".into()), ..Default::default() };
    let err = store::edit_guest_at(home.path(), &event(), "3001234567", patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicatePhone);
    assert_eq!(before, snapshot(home.path()));
}

#[test]
fn edit_returns_updated_guest() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    store::register_at(home.path(), &event(), "Ana", "3001234567", 0, &mut rng()).unwrap();

    let patch = GuestPatch {
        phone: Some("3119998888".into()),
        companions: Some(4),
        ..Default::default()
    };
    let edited = store::edit_guest_at(home.path(), &event(), "3001234567", patch).unwrap();
    assert_eq!(edited.phone.as_str(), "3119998888");
    assert_eq!(edited.companions, 4);

    let err = store::lookup_at(home.path(), &event(), "3001234567").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn delete_unknown_phone_leaves_storage_unchanged() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    store::register_at(home.path(), &event(), "Ana", "3001234567", 0, &mut rng()).unwrap();
    let before = snapshot(home.path());

    let err = store::delete_guest_at(home.path(), &event(), "3000000000").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(before, snapshot(home.path()));
}

#[test]
fn delete_known_phone_removes_exactly_one() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    init(home.path());
    let mut r = rng();
    store::register_at(home.path(), &event(), "Ana", "3001234567", 0, &mut r).unwrap();
    store::register_at(home.path(), &event(), "Luis", "3007654321", 0, &mut r).unwrap();
    store::register_at(home.path(), &event(), "Eva", "3005550000", 0, &mut r).unwrap();

    let removed = store::delete_guest_at(home.path(), &event(), "3007654321").unwrap();
    assert_eq!(removed.name, "Luis");

    let reg = store::load_at(home.path(), &event()).unwrap();
    let names: Vec<&str> = reg.guests.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Eva"]);
}

// ---------------------------------------------------------------------------
// 4. Multiple events
// ---------------------------------------------------------------------------

#[test]
fn events_are_isolated_and_listed_sorted() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let beta = EventName::from("beta");
    let alpha = EventName::from("alpha");
    store::init_at(home.path(), &beta, &default_categories()).unwrap();
    store::init_at(home.path(), &alpha, &default_categories()).unwrap();

    store::register_at(home.path(), &beta, "Ana", "3001234567", 0, &mut rng()).unwrap();
    store::register_at(home.path(), &alpha, "Ana", "3001234567", 0, &mut rng())
        .expect("same phone in another event is fine");

    assert_eq!(store::list_events_at(home.path()).unwrap(), vec![alpha, beta]);
}
