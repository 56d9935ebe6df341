use cats_eye_core::schedule::ManualClock;
use cats_eye_core::session::NoticeLevel;
use cats_eye_core::storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
use cats_eye_core::{Session, StorageError};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cats-eye-store-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([40, 90, 200, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn file_store_round_trips_through_disk() {
    let dir = temp_dir("round-trip");
    let path = dir.join("nested").join("store.json");

    let mut store = FileStore::open(&path, None);
    store.set("save-width", "1280").unwrap();
    store.set("showGrid", "true").unwrap();
    store.delete("showGrid").unwrap();
    assert!(path.exists());

    let store = FileStore::open(&path, None);
    assert_eq!(store.get("save-width").unwrap().as_deref(), Some("1280"));
    assert_eq!(store.get("showGrid").unwrap(), None);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_file_opens_empty_and_is_replaced() {
    let dir = temp_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("store.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let mut store = FileStore::open(&path, None);
    assert_eq!(store.get("image").unwrap(), None);

    store.set("tile-scale", "150").unwrap();
    let reopened = FileStore::open(&path, None);
    assert_eq!(reopened.get("tile-scale").unwrap().as_deref(), Some("150"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_enforces_its_quota() {
    let dir = temp_dir("quota");
    let path = dir.join("store.json");

    let mut store = FileStore::open(&path, Some(16));
    store.set("a", "1234").unwrap();
    let err = store.set("b", "0123456789abcdef").unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { quota: 16, .. }));

    let reopened = FileStore::open(&path, Some(16));
    assert_eq!(reopened.get("b").unwrap(), None);
    assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1234"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn image_too_big_for_the_store_still_loads_with_a_warning() {
    let persistence = Persistence::new(MemoryStore::with_quota(64));
    let clock = Arc::new(ManualClock::new());
    let mut session = Session::with_parts(persistence, clock, temp_dir("unused")).unwrap();

    session.load_image_bytes("big.png", &png_bytes(40, 40)).unwrap();
    assert!(session.can_save());
    assert!(!session.persistence().has_image());

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(notices[0].message.contains("it's probably too big"));
}

#[test]
fn missing_store_still_loads_with_a_warning() {
    let clock = Arc::new(ManualClock::new());
    let mut session =
        Session::with_parts(Persistence::unavailable(), clock, temp_dir("unused")).unwrap();

    session.load_image_bytes("photo.png", &png_bytes(20, 20)).unwrap();
    assert!(session.can_save());
    assert!(!session.reload_last_image().unwrap());

    let notices = session.take_notices();
    assert!(notices[0].message.contains("storage is not available"));
}
