//! Integration tests for the console frame loop.
//!
//! These drive small scripted game units through full frames and check the
//! resulting framebuffer and broker state.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use moroxel::{
    Agent, AgentVm, Align, Atlas, BLEFT, Console, ConsoleBuilder, ConsoleConfig, DrawMode, FontId,
    Game, InputSnapshot, P1, P2, SNUM, SpriteId, SpriteSlot, StateMessage, Tilemap, TilemapId,
    Vm,
};

const DT: f64 = 1.0 / 60.0;

/// Game unit running a closure every frame.
struct Script<F>(F);

impl<F: FnMut(&mut Vm)> Game for Script<F> {
    fn tick(&mut self, vm: &mut Vm, _delta_time: f64) {
        (self.0)(vm);
    }
}

fn solid(color: u8, size: u32) -> Tilemap {
    Tilemap::new(Atlas::solid(size, size, color).unwrap(), 1, 1)
}

fn boot_script<F>(config: ConsoleConfig, maps: &[(&str, Tilemap)], script: F) -> Console
where
    F: FnMut(&mut Vm) + 'static,
{
    let mut builder = ConsoleBuilder::new(config);
    for (name, map) in maps {
        builder = builder.load_tilemap(name, map.clone());
    }
    builder.boot(|_| Box::new(Script(script))).unwrap()
}

fn step(console: &mut Console) {
    console.frame(DT, &InputSnapshot::default());
}

/// Agent that holds BLEFT while its last message says an attack is coming.
struct Dodger;

impl Agent for Dodger {
    fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
        if vm.state().and_then(StateMessage::as_text) == Some("attack-incoming") {
            vm.press(BLEFT);
        }
    }
}

#[test]
fn test_broadcast_reaches_agent_with_one_frame_latency() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let mut console = ConsoleBuilder::new(ConsoleConfig::default())
        .agent(P2, |_| Box::new(Dodger))
        .unwrap()
        .boot(move |_| {
            Box::new(Script(move |vm: &mut Vm| {
                log.borrow_mut().push(vm.btn_of(P2, BLEFT));
                if vm.frame() == 0 {
                    vm.state_to(P2, "attack-incoming");
                }
            }))
        })
        .unwrap();

    step(&mut console);
    step(&mut console);
    step(&mut console);
    assert_eq!(*seen.borrow(), vec![false, true, true]);
}

#[test]
fn test_state_freshness() {
    let fresh = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&fresh);

    struct Watcher(Rc<RefCell<Vec<bool>>>);
    impl Agent for Watcher {
        fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
            self.0.borrow_mut().push(vm.state_is_fresh());
        }
    }

    let mut console = ConsoleBuilder::new(ConsoleConfig::default())
        .agent(P1, move |_| Box::new(Watcher(log)))
        .unwrap()
        .boot(|_| {
            Box::new(Script(|vm: &mut Vm| {
                if vm.frame() % 2 == 0 {
                    vm.state(StateMessage::Number(1.0));
                }
            }))
        })
        .unwrap();
    for _ in 0..4 {
        step(&mut console);
    }
    assert_eq!(*fresh.borrow(), vec![true, false, true, false]);
}

#[test]
fn test_last_write_wins() {
    let got = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&got);

    struct Reader(Rc<RefCell<Option<String>>>);
    impl Agent for Reader {
        fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
            *self.0.borrow_mut() = vm.state().and_then(StateMessage::as_text).map(str::to_owned);
        }
    }

    let mut console = ConsoleBuilder::new(ConsoleConfig::default())
        .agent(P2, move |_| Box::new(Reader(slot)))
        .unwrap()
        .boot(|_| {
            Box::new(Script(|vm: &mut Vm| {
                vm.state("first");
                vm.state_to(P2, "second");
            }))
        })
        .unwrap();
    step(&mut console);
    assert_eq!(got.borrow().as_deref(), Some("second"));
}

#[test]
fn test_pbound_stable_across_frames() {
    let mut console = ConsoleBuilder::new(ConsoleConfig::default())
        .agent(P2, |_| Box::new(Dodger))
        .unwrap()
        .boot(|_| Box::new(Script(|_: &mut Vm| {})))
        .unwrap();
    for _ in 0..5 {
        assert!(console.pbound(P2));
        assert!(!console.pbound(P1));
        assert!(!console.pbound(7));
        step(&mut console);
    }
    assert_eq!(console.vm().plabel(P2), "Player 2");
    assert_eq!(console.vm().plabel(0), "");
}

#[test]
fn test_sbox_tile_mode_16() {
    let mut console = boot_script(ConsoleConfig::default(), &[("box", solid(9, 16))], |vm| {
        vm.tmode(16).unwrap();
        let id = vm.tmap("box");
        vm.stile(id);
        vm.sbox(1, 1, 2, 2);
    });
    step(&mut console);
    let fb = console.framebuffer();
    let mut painted = 0;
    for y in 0..128 {
        for x in 0..128 {
            if fb.get(x, y) == Some(9) {
                assert!((16..48).contains(&x) && (16..48).contains(&y), "({x},{y})");
                painted += 1;
            }
        }
    }
    assert_eq!(painted, 32 * 32);
}

#[test]
fn test_camera_moves_sprites_not_boxes() {
    let maps = [("sprite", solid(4, 8)), ("box", solid(9, 8))];
    let mut console = boot_script(ConsoleConfig::default(), &maps, |vm| {
        vm.camera(10, 10);
        let sprite = vm.tmap("sprite");
        vm.stile(sprite);
        vm.sdraw(0, 0);
        let boxed = vm.tmap("box");
        vm.stile(boxed);
        vm.sbox(0, 0, 1, 1);
    });
    step(&mut console);
    let fb = console.framebuffer();
    assert_eq!(fb.get(10, 10), Some(4));
    assert_eq!(fb.get(17, 17), Some(4));
    assert_eq!(fb.get(18, 18), Some(0));
    assert_eq!(fb.get(0, 0), Some(9));
    assert_eq!(fb.get(7, 7), Some(9));
    assert_eq!(fb.get(8, 8), Some(0));
    assert_eq!(console.vm().camera_offset(), (10, 10));
}

#[test]
fn test_sclear_restores_default_sprite() {
    let mut atlas = Atlas::new(16, 8);
    atlas.fill(0, 0, 8, 8, Some(3)).unwrap();
    atlas.fill(8, 0, 8, 8, Some(11)).unwrap();
    let sheet = Tilemap::new(atlas, 1, 1);

    let draw = |staged: bool| {
        let mut console =
            boot_script(ConsoleConfig::default(), &[("sheet", sheet.clone())], move |vm| {
                if staged {
                    vm.sregion(1, 0, 1, 1).unwrap();
                    vm.sflip(true, true);
                    vm.sscale(3.0, 2.0).unwrap();
                    vm.srot(45.0).unwrap();
                    vm.sorigin(4, 4);
                    vm.sclear();
                }
                let id = vm.tmap("sheet");
                vm.stile(id);
                vm.sdraw(20, 20);
            });
        step(&mut console);
        console.checksum()
    };
    assert_eq!(draw(true), draw(false));
}

#[test]
fn test_invalid_arguments_leave_state_untouched() {
    let mut console = boot_script(ConsoleConfig::default(), &[], |vm| {
        vm.tmode(32).unwrap();
        assert!(vm.tmode(12).is_err());
        assert_eq!(vm.tile_mode().pixels(), 32);
        assert!(vm.set_color(16).is_err());
        assert_eq!(vm.color(), 7);
        assert!(vm.clear(Some(200)).is_err());
        assert!(vm.sscale(0.0, 1.0).is_err());
        assert!(vm.srot(f64::NAN).is_err());
        assert!(vm.sregion(0, 0, -1, 1).is_err());
        assert!(vm.fcolor(99).is_err());
        assert_eq!(vm.render().sprite().scale(), (1.0, 1.0));
    });
    step(&mut console);
}

#[test]
fn test_unresolved_references_draw_nothing() {
    let mut console = boot_script(ConsoleConfig::default(), &[], |vm| {
        vm.stile(TilemapId(99));
        vm.sdraw(0, 0);
        let pending = vm.tmap("never-loaded");
        vm.stile(pending);
        vm.sbox(0, 0, 4, 4);
        vm.fdraw(Some(FontId(42)), "HELLO", 0, 0);
        vm.mdraw();
    });
    step(&mut console);
    assert_eq!(console.framebuffer(), &moroxel::Framebuffer::new(0));
}

#[test]
fn test_pixels_and_clipping() {
    let mut console = boot_script(ConsoleConfig::default(), &[], |vm| {
        vm.pset(5, 5, Some(12)).unwrap();
        vm.set_color(3).unwrap();
        vm.pset(6, 5, None).unwrap();
        vm.pset(-1, 5, Some(1)).unwrap();
        vm.pset(5, 128, Some(1)).unwrap();
        assert_eq!(vm.pget(5, 5), 12);
        assert_eq!(vm.pget(6, 5), 3);
        assert_eq!(vm.pget(500, 5), 0);
    });
    step(&mut console);
    assert_eq!(console.framebuffer().get(5, 5), Some(12));
}

#[test]
fn test_engine_mode_layers() {
    let mut floor = Tilemap::new(Atlas::solid(8, 8, 1).unwrap(), 2, 2);
    floor.set_cell(0, 0, Some(0));
    let maps = [("floor", floor), ("a", solid(4, 8)), ("b", solid(9, 8))];
    let config = ConsoleConfig {
        draw_mode: DrawMode::Engine,
        ..ConsoleConfig::default()
    };
    let mut console = boot_script(config, &maps, |vm| {
        let floor = vm.tmap("floor");
        vm.select_tmap(floor).unwrap();
        vm.cls();
        vm.fcolor(7).unwrap();
        vm.fdraw(None, "-", 20, 20);
        let a = vm.tmap("a");
        let b = vm.tmap("b");
        vm.stile(a);
        vm.sdraw(16, 16);
        vm.stile(b);
        vm.sdraw(20, 16);
        // Nothing is composited until the frame ends.
        assert_eq!(vm.pget(20, 20), 0);
    });
    step(&mut console);
    let fb = console.framebuffer();
    // Tilemap layer at the bottom.
    assert_eq!(fb.get(0, 0), Some(1));
    // Later sprite over earlier sprite.
    assert_eq!(fb.get(18, 18), Some(4));
    assert_eq!(fb.get(21, 18), Some(9));
    // Text over sprites: '-' lights row 2 of the glyph.
    assert_eq!(fb.get(20, 22), Some(7));
    assert_eq!(fb.get(20, 21), Some(9));
}

#[test]
fn test_text_alignment_is_camera_independent() {
    let mut console = boot_script(ConsoleConfig::default(), &[], |vm| {
        vm.camera(30, 30);
        vm.falign(Align::Center, Align::Center);
        vm.fcolor(8).unwrap();
        vm.fdraw(None, "A", 64, 64);
        // The stager resets after drawing.
        assert_eq!(vm.render().text().align(), (Align::Start, Align::Start));
    });
    step(&mut console);
    let fb = console.framebuffer();
    // 'A' is 3x5: centered at (64, 64) it spans x 63..66, y 62..67.
    assert_eq!(fb.get(64, 62), Some(8));
    assert_eq!(fb.get(63, 62), Some(0));
    assert_eq!(fb.get(63, 64), Some(8));
    assert_eq!(fb.get(65, 66), Some(8));
}

#[test]
fn test_tilemap_edits_and_scroll() {
    let mut sheet = Tilemap::new(Atlas::solid(16, 8, 5).unwrap(), 4, 4);
    sheet.atlas_mut().fill(8, 0, 8, 8, Some(2)).unwrap();
    let mut console = boot_script(ConsoleConfig::default(), &[("level", sheet)], |vm| {
        let level = vm.tmap("level");
        vm.select_tmap(level).unwrap();
        vm.mclear();
        vm.mtile(1, 0, Some(1));
        vm.mtile(9, 9, Some(1));
        assert_eq!(vm.mget(1, 0), Some(1));
        assert_eq!(vm.mget(0, 0), None);
        vm.mscroll(8, 0);
        vm.mdraw();
    });
    step(&mut console);
    let fb = console.framebuffer();
    assert_eq!(fb.get(0, 0), Some(2));
    assert_eq!(fb.get(7, 7), Some(2));
    assert_eq!(fb.get(8, 0), Some(0));
}

#[test]
fn test_name_ids_are_stable() {
    let mut console = boot_script(ConsoleConfig::default(), &[("first", solid(1, 8))], |vm| {
        let a = vm.tmap("first");
        let b = vm.tmap("second");
        assert_eq!(a, TilemapId(0));
        assert_eq!(b, TilemapId(1));
        assert_eq!(vm.tmap("first"), a);
        assert_eq!(vm.fnt("default"), FontId(0));
        assert_eq!(vm.fnt("tiny"), FontId(1));
        assert_eq!(vm.fnt("tiny"), FontId(1));
    });
    step(&mut console);
    step(&mut console);
}

#[test]
fn test_extreme_coordinates_are_clipped() {
    let mut grid = solid(5, 8);
    grid.set_cell(0, 0, Some(0));
    for mode in [DrawMode::Manual, DrawMode::Engine] {
        let config = ConsoleConfig {
            draw_mode: mode,
            ..ConsoleConfig::default()
        };
        let mut console = boot_script(config, &[("grid", grid.clone())], |vm| {
            let id = vm.tmap("grid");
            vm.select_tmap(id).unwrap();

            vm.camera(i32::MAX, i32::MIN);
            vm.stile(id);
            vm.sdraw(1, -1);
            vm.mscroll(-1, 1);
            vm.mdraw();

            vm.camera(0, 0);
            vm.fdraw(None, "AB", i32::MAX - 2, 0);
            vm.falign(Align::End, Align::End);
            vm.fdraw(None, "AB\nCD", i32::MIN, i32::MIN);

            vm.sregion(i32::MAX, 0, 1, 1).unwrap();
            vm.stile(id);
            vm.sbox(0, 0, 1, 1);
            vm.sdraw(0, 0);
            vm.sregion(i32::MAX, i32::MAX, i32::MAX, i32::MAX).unwrap();
            vm.stile(id);
            vm.sorigin(i32::MIN, i32::MAX);
            vm.sdraw(i32::MIN, i32::MAX);

            vm.sclear();
            vm.stile(id);
            vm.sbox(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
            vm.sbox(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
            vm.pset(i32::MIN, i32::MAX, None).unwrap();
            vm.mtile(i32::MAX, i32::MIN, Some(0));
            // Keep the engine-mode layer pass off-screen too
            vm.mscroll(i32::MIN, i32::MAX);
        });
        step(&mut console);
        assert_eq!(console.framebuffer(), &moroxel::Framebuffer::new(0), "{mode:?}");
    }
}

#[test]
fn test_far_anchor_box_still_tiles_on_screen() {
    let mut atlas = Atlas::new(16, 8);
    atlas.fill(0, 0, 8, 8, Some(3)).unwrap();
    atlas.fill(8, 0, 8, 8, Some(11)).unwrap();
    let mut console = boot_script(
        ConsoleConfig::default(),
        &[("sheet", Tilemap::new(atlas, 1, 1))],
        |vm| {
            let id = vm.tmap("sheet");
            vm.stile(id);
            vm.sregion(0, 0, 2, 1).unwrap();
            // Anchored 2^30 pixels to the left, a whole number of regions away
            vm.sbox(i32::MIN / 16, 0, i32::MAX / 8, 1);
        },
    );
    step(&mut console);
    let fb = console.framebuffer();
    assert_eq!(fb.get(0, 0), Some(3));
    assert_eq!(fb.get(8, 0), Some(11));
    assert_eq!(fb.get(16, 0), Some(3));
    assert_eq!(fb.get(127, 7), Some(11));
    assert_eq!(fb.get(0, 8), Some(0));
}

/// Agent that holds BLEFT every frame.
struct LeftHolder;

impl Agent for LeftHolder {
    fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
        vm.press(BLEFT);
    }
}

#[test]
fn test_agents_see_the_buttons_the_game_saw() {
    let game_log = Rc::new(RefCell::new(Vec::new()));
    let agent_log = Rc::new(RefCell::new(Vec::new()));

    struct Observer(Rc<RefCell<Vec<bool>>>);
    impl Agent for Observer {
        fn tick(&mut self, vm: &mut AgentVm<'_>, _delta_time: f64) {
            self.0.borrow_mut().push(vm.btn_of(P1, BLEFT));
            assert!(!vm.btn(BLEFT));
            vm.press(BLEFT);
            assert!(vm.btn_of(P2, BLEFT));
        }
    }

    let observed = Rc::clone(&agent_log);
    let read = Rc::clone(&game_log);
    let mut console = ConsoleBuilder::new(ConsoleConfig::default())
        .agent(P1, |_| Box::new(LeftHolder))
        .unwrap()
        .agent(P2, move |_| Box::new(Observer(observed)))
        .unwrap()
        .boot(move |_| {
            Box::new(Script(move |vm: &mut Vm| {
                read.borrow_mut().push(vm.btn_of(P1, BLEFT));
            }))
        })
        .unwrap();
    for _ in 0..3 {
        step(&mut console);
    }
    assert_eq!(*game_log.borrow(), vec![false, true, true]);
    assert_eq!(*agent_log.borrow(), *game_log.borrow());
}

#[test]
fn test_sprite_table_persists_and_orders_by_id() {
    let mut sheet = Atlas::solid(16, 8, 4).unwrap();
    sheet.fill(8, 0, 8, 8, Some(9)).unwrap();
    let mut floor = Tilemap::new(sheet, 4, 1);
    floor.set_cell(0, 0, Some(1));
    let config = ConsoleConfig {
        draw_mode: DrawMode::Engine,
        ..ConsoleConfig::default()
    };
    let mut console = boot_script(config, &[("floor", floor)], |vm| {
        let floor = vm.tmap("floor");
        vm.select_tmap(floor).unwrap();
        vm.cls();
        if vm.frame() == 0 {
            vm.stile_of(SpriteId(3), Some(0));
            vm.spos(SpriteId(3), 4, 0);
            vm.sshow(SpriteId(3), true);
            vm.stile_of(SpriteId(1), Some(1));
            vm.spos(SpriteId(1), 8, 0);
            vm.sshow(SpriteId(1), true);
            vm.sflip_of(SpriteId(1), true, false);
            vm.sscale_of(SpriteId(1), 1.0, 2.0).unwrap();

            let unknown = SpriteId(u16::try_from(SNUM).unwrap());
            vm.sshow(unknown, true);
            vm.spos(unknown, 1, 1);
            assert_eq!(vm.sprite(unknown), SpriteSlot::default());
            assert!(vm.srot_of(unknown, f64::NAN).is_err());
        }
        assert!(vm.sprite(SpriteId(3)).visible());
    });
    for _ in 0..2 {
        step(&mut console);
    }
    let fb = console.framebuffer();
    // Tilemap layer, then sprite 1 (tile 1, scaled down to row 15), then sprite 3.
    assert_eq!(fb.get(0, 0), Some(9));
    assert_eq!(fb.get(4, 0), Some(4));
    assert_eq!(fb.get(11, 0), Some(4));
    assert_eq!(fb.get(12, 0), Some(9));
    assert_eq!(fb.get(12, 15), Some(9));
    assert_eq!(fb.get(12, 16), Some(0));
    assert!((console.sprite(SpriteId(1)).unwrap().scale().1 - 2.0).abs() < f64::EPSILON);
}
