#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use moroxel::{ButtonId, Buttons, ConsoleConfig, InputSnapshot, P1, P2, demo};

/// Structured input for whole-console fuzzing with agents attached.
#[derive(Arbitrary, Debug)]
struct FrameInput {
    /// Attach an agent to player 1.
    p1_agent: bool,
    /// Attach an agent to player 2.
    p2_agent: bool,
    /// Raw button bits of the human snapshot, one entry per frame.
    held: Vec<(u8, u8)>,
}

fn buttons(bits: u8) -> Buttons {
    let held: Vec<ButtonId> = (0..8).filter(|b| bits & (1 << b) != 0).collect();
    Buttons::of(&held)
}

fuzz_target!(|input: FrameInput| {
    let mut agents = Vec::new();
    if input.p1_agent {
        agents.push(P1);
    }
    if input.p2_agent {
        agents.push(P2);
    }
    let Ok(mut a) = demo::console(ConsoleConfig::default(), &agents) else {
        return;
    };
    let Ok(mut b) = demo::console(ConsoleConfig::default(), &agents) else {
        return;
    };

    // Two consoles fed the same inputs must stay identical
    for &(p1, p2) in input.held.iter().take(512) {
        let snapshot = InputSnapshot {
            p1: buttons(p1),
            p2: buttons(p2),
        };
        let ra = a.frame(1.0 / 60.0, &snapshot);
        let rb = b.frame(1.0 / 60.0, &snapshot);
        assert_eq!(ra, rb);
        assert_eq!(a.checksum(), b.checksum());
    }
    assert_eq!(a.pbound(P1), input.p1_agent);
    assert_eq!(a.pbound(P2), input.p2_agent);
});
