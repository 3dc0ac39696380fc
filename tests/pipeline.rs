// End-to-end coverage of the public editing API: session lifecycle, chain
// edits racing removals, and export through the io boundary.

use image::{Rgba, RgbaImage};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use photojot::io::{SaveFormat, encode_and_write, load_image};
use photojot::{EditSession, FilterDescriptor, FilterKind, apply};

fn photo(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            ((x + y) % 256) as u8,
            255,
        ])
    })
}

#[test]
fn full_editing_session_flow() {
    let mut session = EditSession::new(photo(48, 36));

    // "Add Filter" appends an identity placeholder.
    let id = session.add_filter();
    assert_eq!(session.output(), session.source());

    // Picking a kind makes it take effect with default args.
    session.set_filter_kind(id, FilterKind::SepiaTone).unwrap();
    let sepia_output = session.output().clone();
    assert_ne!(&sepia_output, session.source());

    // Slider edit to zero intensity restores identity.
    let mut dimmed = *session.chain().get(id).unwrap();
    dimmed.arg0 = 0.0;
    session.replace_filter(id, dimmed).unwrap();
    assert_eq!(session.output(), session.source());

    // Removing the only step keeps identity.
    assert!(session.remove_filter(id));
    assert!(session.chain().is_empty());
    assert_eq!(session.output(), session.source());
}

#[test]
fn random_effect_then_clear_is_identity() {
    let mut session = EditSession::new(photo(40, 40));
    let mut rng = SmallRng::seed_from_u64(99);
    session.add_random_filters(&mut rng);
    assert!((2..=6).contains(&session.chain().len()));
    for d in session.chain() {
        assert!(d.is_in_bounds());
    }

    session.clear_filters();
    assert_eq!(session.output(), session.source());
}

#[test]
fn engine_is_pure_over_session_state() {
    let img = photo(32, 32);
    let mut session = EditSession::new(img.clone());
    session.push_filter(FilterDescriptor::with_args(
        FilterKind::Crystallize,
        32.0,
        32.0,
        5.0,
        0.0,
        0.0,
    ));
    session.push_filter(FilterDescriptor::with_args(
        FilterKind::SepiaTone,
        32.0,
        32.0,
        0.7,
        0.0,
        0.0,
    ));

    // Re-running the engine over the same chain matches the session's cache.
    let rerun = apply(&img, session.chain());
    assert_eq!(&rerun, session.output());
}

#[test]
fn export_and_reload_round_trip() {
    let dir = std::env::temp_dir().join("photojot-pipeline-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("edited.png");

    let mut session = EditSession::new(photo(20, 20));
    session.push_filter(FilterDescriptor::with_args(
        FilterKind::Pixellate,
        20.0,
        20.0,
        4.0,
        0.0,
        0.0,
    ));
    encode_and_write(session.output(), &path, SaveFormat::Png, 90).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!(&back, session.output());

    let _ = std::fs::remove_file(&path);
}
