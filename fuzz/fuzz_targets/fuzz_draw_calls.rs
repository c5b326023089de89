#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use moroxel::{
    Align, Atlas, ConsoleBuilder, ConsoleConfig, DrawMode, Game, InputSnapshot, PALETTE_SIZE,
    Tilemap, Vm,
};

/// One drawing call issued by the fuzzed game.
#[derive(Arbitrary, Debug, Clone)]
enum Op {
    Clear(Option<u8>),
    Camera(i32, i32),
    Pset(i32, i32, Option<u8>),
    Tmode(u8),
    Mtile(i32, i32, Option<u16>),
    Mscroll(i32, i32),
    Mdraw,
    Region(i32, i32, i32, i32),
    Origin(i32, i32),
    Flip(bool, bool),
    Scale(f32, f32),
    Rot(f32),
    Sdraw(i32, i32),
    Sbox(i32, i32, i32, i32),
    Sclear,
    Align(u8, u8),
    Fcolor(u8),
    Fdraw(String, i32, i32),
}

/// Structured input for draw-call fuzzing.
#[derive(Arbitrary, Debug)]
struct DrawInput {
    /// Queue sprites instead of drawing them immediately.
    engine: bool,
    /// Calls replayed every frame.
    ops: Vec<Op>,
    /// Number of frames to run.
    frames: u8,
}

struct Fuzzed(Vec<Op>);

fn align(v: u8) -> Align {
    match v % 3 {
        0 => Align::Start,
        1 => Align::Center,
        _ => Align::End,
    }
}

impl Game for Fuzzed {
    fn tick(&mut self, vm: &mut Vm, _delta_time: f64) {
        let sheet = vm.tmap("sheet");
        let _ = vm.select_tmap(sheet);
        vm.stile(sheet);
        for op in &self.0 {
            // Rejected arguments are fine; panics are not.
            let _ = match op.clone() {
                Op::Clear(c) => vm.clear(c),
                Op::Camera(x, y) => Ok(vm.camera(x, y)),
                Op::Pset(x, y, c) => vm.pset(x, y, c),
                Op::Tmode(s) => vm.tmode(s.into()),
                Op::Mtile(x, y, t) => Ok(vm.mtile(x, y, t)),
                Op::Mscroll(x, y) => Ok(vm.mscroll(x, y)),
                Op::Mdraw => Ok(vm.mdraw()),
                Op::Region(i, j, w, h) => vm.sregion(i, j, w, h),
                Op::Origin(x, y) => Ok(vm.sorigin(x, y)),
                Op::Flip(h, v) => Ok(vm.sflip(h, v)),
                Op::Scale(x, y) => vm.sscale(x.into(), y.into()),
                Op::Rot(d) => vm.srot(d.into()),
                Op::Sdraw(x, y) => Ok(vm.sdraw(x, y)),
                Op::Sbox(x, y, w, h) => Ok(vm.sbox(x, y, w, h)),
                Op::Sclear => Ok(vm.sclear()),
                Op::Align(x, y) => Ok(vm.falign(align(x), align(y))),
                Op::Fcolor(c) => vm.fcolor(c),
                Op::Fdraw(text, x, y) => Ok(vm.fdraw(None, &text, x, y)),
            };
        }
    }
}

fuzz_target!(|input: DrawInput| {
    // Cap work per input
    if input.ops.len() > 256 {
        return;
    }
    let Ok(atlas) = Atlas::solid(32, 32, 9) else {
        return;
    };
    let config = ConsoleConfig {
        draw_mode: if input.engine { DrawMode::Engine } else { DrawMode::Manual },
        ..ConsoleConfig::default()
    };
    let ops = input.ops;
    let Ok(mut console) = ConsoleBuilder::new(config)
        .load_tilemap("sheet", Tilemap::new(atlas, 4, 4))
        .boot(move |_| Box::new(Fuzzed(ops)))
    else {
        return;
    };

    for _ in 0..input.frames.min(8) {
        console.frame(1.0 / 60.0, &InputSnapshot::default());
        let fb = console.framebuffer();
        assert!(fb.pixels().iter().all(|&c| usize::from(c) < PALETTE_SIZE));
    }
});
