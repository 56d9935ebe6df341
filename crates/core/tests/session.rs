use cats_eye_core::canvas::{MouseButton, PointerId};
use cats_eye_core::schedule::ManualClock;
use cats_eye_core::session::{NoticeLevel, TILE_SCALE};
use cats_eye_core::storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
use cats_eye_core::{Point, Session, Triangle};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cats-eye-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn session_with(persistence: Persistence, clock: Arc<ManualClock>) -> Session {
    Session::with_parts(persistence, clock, temp_dir("unused")).unwrap()
}

fn memory_session() -> (Session, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let session = session_with(Persistence::new(MemoryStore::new()), clock.clone());
    (session, clock)
}

#[test]
fn loading_an_image_spans_it_and_renders_a_tile() {
    let (mut session, _clock) = memory_session();
    session.load_image_bytes("wide.png", &png_bytes(200, 100)).unwrap();

    assert!(session.can_save());
    assert_eq!(session.image_name(), Some("wide.png"));
    assert_eq!(session.tile_scale(), 100);
    assert_eq!(
        session.selection().triangle(),
        Some(Triangle::spanning(200.0, 100.0))
    );

    let pattern = session.pattern().unwrap();
    assert_eq!((pattern.width(), pattern.height()), (200, 200));
    assert!(session.persistence().has_image());
}

#[test]
fn undecodable_bytes_leave_the_session_empty() {
    let (mut session, _clock) = memory_session();
    assert!(session.load_image_bytes("junk.png", b"not an image").is_err());

    assert!(!session.can_save());
    assert!(!session.selection().is_visible());
    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[test]
fn corrupt_stored_image_is_discarded() {
    let mut store = MemoryStore::new();
    store.set("image", "{not json").unwrap();
    let clock = Arc::new(ManualClock::new());
    let mut session = session_with(Persistence::new(store), clock);

    assert!(!session.reload_last_image().unwrap());
    assert!(!session.persistence().has_image());
    assert!(!session.selection().is_visible());
}

#[test]
fn stored_triangle_outside_the_image_is_ignored() {
    let mut persistence = Persistence::new(MemoryStore::new());
    persistence
        .store_last_image("square.png", "image/png", &png_bytes(300, 300))
        .unwrap();
    persistence.store_selection_triangle(&Triangle::new(
        Point::new(-5.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
    ));

    let clock = Arc::new(ManualClock::new());
    let mut session = session_with(persistence, clock);
    assert!(session.reload_last_image().unwrap());
    assert_eq!(
        session.selection().triangle(),
        Some(Triangle::spanning(300.0, 300.0))
    );
}

#[test]
fn stored_triangle_is_restored_on_reload() {
    let stored = Triangle::new(
        Point::new(10.0, 10.0),
        Point::new(60.0, 10.0),
        Point::new(60.0, 40.0),
    );
    let mut persistence = Persistence::new(MemoryStore::new());
    persistence
        .store_last_image("small.png", "image/png", &png_bytes(80, 50))
        .unwrap();
    persistence.store_selection_triangle(&stored);

    let clock = Arc::new(ManualClock::new());
    let mut session = session_with(persistence, clock);
    assert!(session.reload_last_image().unwrap());
    assert_eq!(session.selection().triangle(), Some(stored));

    // The bounding box is 50x30, so the tile is 60 pixels.
    assert_eq!(session.pattern().unwrap().width(), 60);
}

#[test]
fn render_failure_rolls_back_but_keeps_dimensions() {
    let mut persistence = Persistence::new(MemoryStore::new());
    persistence
        .store_last_image("huge.png", "image/png", &png_bytes(300, 300))
        .unwrap();
    persistence.store_dimension(TILE_SCALE, 100_000);

    let clock = Arc::new(ManualClock::new());
    let mut session = session_with(persistence, clock);
    assert_eq!(session.tile_scale(), 100_000);
    session.set_save_width(640.0);

    let err = session.reload_last_image().unwrap_err();
    assert!(err.is_resource_exhausted());

    assert!(!session.can_save());
    assert!(session.pattern().is_none());
    assert!(!session.selection().is_visible());
    assert!(session.preview().surface().is_none());
    assert!(!session.persistence().has_image());
    assert_eq!(session.tile_scale(), 100_000);
    assert_eq!(session.save_width(), 640);

    let notices = session.take_notices();
    let last = notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert!(last.message.starts_with("Failed to render the image"));
}

#[test]
fn oversized_scale_after_loading_rolls_back() {
    let (mut session, _clock) = memory_session();
    session.load_image_bytes("photo.png", &png_bytes(300, 300)).unwrap();

    assert!(session.set_tile_scale(100_000.0).is_err());
    assert!(!session.can_save());
    assert_eq!(session.tile_scale(), 100_000);
}

#[test]
fn tile_scale_is_clamped_and_resized() {
    let (mut session, _clock) = memory_session();
    session.load_image_bytes("photo.png", &png_bytes(100, 100)).unwrap();

    session.set_tile_scale(50.7).unwrap();
    assert_eq!(session.tile_scale(), 50);
    assert_eq!(session.pattern().unwrap().width(), 100);

    session.set_tile_scale(-3.0).unwrap();
    assert_eq!(session.tile_scale(), 1);

    session.reset_tile_scale().unwrap();
    assert_eq!(session.tile_scale(), 100);
    assert_eq!(session.pattern().unwrap().width(), 200);
}

#[test]
fn dragging_a_corner_recomputes_after_the_delay() {
    let (mut session, clock) = memory_session();
    session.load_image_bytes("wide.png", &png_bytes(200, 100)).unwrap();
    clock.advance(Duration::from_millis(20));
    session.tick().unwrap();
    let before = session.pattern().unwrap().clone();

    // The top right handle sits at (200, 0), drawn 7 pixels in from the
    // surface edge.
    assert!(session.pointer_down(Point::new(207.0, 7.0), MouseButton::Primary));
    session
        .pointer_move(PointerId::Mouse, Point::new(157.0, 37.0))
        .unwrap();
    session.pointer_up(PointerId::Mouse);

    assert_eq!(
        session.selection().triangle(),
        Some(Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(150.0, 30.0),
            Point::new(200.0, 100.0),
        ))
    );

    assert!(!session.tick().unwrap());
    clock.advance(Duration::from_millis(19));
    assert!(!session.tick().unwrap());
    clock.advance(Duration::from_millis(1));
    assert!(session.tick().unwrap());
    assert!(!Arc::ptr_eq(&before, session.pattern().unwrap()));
}

#[test]
fn finished_drag_survives_a_restart() {
    let dir = temp_dir("drag");
    let store_path = dir.join("store.json");

    {
        let clock = Arc::new(ManualClock::new());
        let persistence = Persistence::new(FileStore::open(&store_path, None));
        let mut session = session_with(persistence, clock);
        session.load_image_bytes("wide.png", &png_bytes(200, 100)).unwrap();
        session
            .set_selection_triangle(Triangle::new(
                Point::new(20.0, 20.0),
                Point::new(120.0, 20.0),
                Point::new(120.0, 80.0),
            ))
            .unwrap();

        // Grab the triangle inside its edges and push it past the left
        // border; it stops there without changing shape.
        assert!(session.pointer_down(Point::new(107.0, 37.0), MouseButton::Primary));
        session
            .pointer_move(PointerId::Mouse, Point::new(77.0, 47.0))
            .unwrap();
        session.pointer_up(PointerId::Mouse);
    }

    let clock = Arc::new(ManualClock::new());
    let persistence = Persistence::new(FileStore::open(&store_path, None));
    let mut session = session_with(persistence, clock);
    assert!(session.reload_last_image().unwrap());
    assert_eq!(
        session.selection().triangle(),
        Some(Triangle::new(
            Point::new(0.0, 30.0),
            Point::new(100.0, 30.0),
            Point::new(100.0, 90.0),
        ))
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn grid_flag_is_persisted_with_an_image() {
    let dir = temp_dir("grid");
    let store_path = dir.join("store.json");

    {
        let clock = Arc::new(ManualClock::new());
        let mut session = session_with(Persistence::new(FileStore::open(&store_path, None)), clock);
        session.load_image_bytes("photo.png", &png_bytes(50, 50)).unwrap();
        session.set_show_grid(true).unwrap();
        session.set_save_width(800.0);
        session.set_save_height(600.0);
    }

    let clock = Arc::new(ManualClock::new());
    let session = session_with(Persistence::new(FileStore::open(&store_path, None)), clock);
    assert!(session.show_grid());
    assert_eq!((session.save_width(), session.save_height()), (800, 600));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn settings_are_not_stored_without_an_image() {
    let dir = temp_dir("no-image");
    let store_path = dir.join("store.json");

    {
        let clock = Arc::new(ManualClock::new());
        let mut session = session_with(Persistence::new(FileStore::open(&store_path, None)), clock);
        session.set_show_grid(true).unwrap();
        assert!(session.show_grid());
    }

    let clock = Arc::new(ManualClock::new());
    let session = session_with(Persistence::new(FileStore::open(&store_path, None)), clock);
    assert!(!session.show_grid());

    let _ = std::fs::remove_dir_all(&dir);
}
