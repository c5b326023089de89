//! Recording and replay of the bundled cartridge.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use moroxel::demo::{self, CARTRIDGE};
use moroxel::replay::{Recorder, Recording, ReplayError};
use moroxel::{BDOWN, BRIGHT, Buttons, ConsoleConfig, DrawMode, InputSnapshot, P2};

fn record(config: ConsoleConfig, frames: u64) -> Recording {
    let console = demo::console(config, &[P2]).unwrap();
    let mut recorder = Recorder::new(console, CARTRIDGE, vec![P2]);
    for i in 0..frames {
        // Human P1 zig-zags toward the bottom right.
        let held = if i % 3 == 0 { &[BRIGHT, BDOWN][..] } else { &[BRIGHT][..] };
        recorder.frame(1.0 / 60.0, &InputSnapshot::p1(Buttons::of(held)));
    }
    recorder.finish().1
}

#[test]
fn test_replay_reproduces_final_frame() {
    let recording = record(ConsoleConfig::default(), 240);
    let expected = recording.checksum.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tag.json");
    recording.save(&path).unwrap();
    let loaded = Recording::load(&path).unwrap();
    assert_eq!(loaded, recording);

    let console = loaded.replay(demo::boot_recording).unwrap();
    assert_eq!(console.checksum(), expected);
    assert_eq!(console.frames(), 240);
    assert!(console.pbound(P2));
}

#[test]
fn test_engine_mode_replay() {
    let config = ConsoleConfig {
        draw_mode: DrawMode::Engine,
        ..ConsoleConfig::default()
    };
    let recording = record(config, 90);
    let console = recording.replay(demo::boot_recording).unwrap();
    assert_eq!(Some(console.checksum()), recording.checksum);
}

#[test]
fn test_tampered_checksum_detected() {
    let mut recording = record(ConsoleConfig::default(), 30);
    recording.checksum = recording.checksum.map(|c| c ^ 1);
    let err = recording.replay(demo::boot_recording).unwrap_err();
    assert!(matches!(err, ReplayError::ChecksumMismatch { .. }));
}

#[test]
fn test_load_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, b"not json").unwrap();
    assert!(matches!(Recording::load(&path), Err(ReplayError::Json(_))));
    assert!(matches!(
        Recording::load(&dir.path().join("missing.json")),
        Err(ReplayError::Io(_))
    ));
}
