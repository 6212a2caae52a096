// Host-side tests for the card effects engine.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod config {
    include!("../src/config.rs");
}
mod geometry {
    include!("../src/geometry.rs");
}
mod timeline {
    include!("../src/timeline.rs");
}
mod surface {
    include!("../src/surface.rs");
}
mod particles {
    include!("../src/particles.rs");
}
mod tilt {
    include!("../src/tilt.rs");
}
mod ripple {
    include!("../src/ripple.rs");
}
mod spotlight {
    include!("../src/spotlight.rs");
}
mod engine {
    include!("../src/engine.rs");
}

use config::FxParams;
use constants::*;
use engine::Engine;
use geometry::{GlowVars, ProbeError, Rect};
use glam::Vec2;
use std::collections::HashMap;
use surface::{Decoration, Surface};
use timeline::{CardId, ElementId, Style, Target};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Mounted {
    Particle { card: CardId, at: Vec2 },
    Ripple { card: CardId, diameter: f32 },
}

/// Recording stand-in for the page.
#[derive(Default)]
struct Page {
    rects: HashMap<CardId, Rect>,
    glow: HashMap<CardId, GlowVars>,
    live: HashMap<ElementId, Mounted>,
    styles: HashMap<Target, Style>,
    mounts: usize,
    unmounts: usize,
}

impl Page {
    fn with_cards(cards: &[(CardId, Rect)]) -> Self {
        Self {
            rects: cards.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn particles_on(&self, card: CardId) -> usize {
        self.live
            .values()
            .filter(|m| matches!(m, Mounted::Particle { card: c, .. } if *c == card))
            .count()
    }

    fn intensity(&self, card: CardId) -> f32 {
        self.glow[&card].intensity
    }
}

impl Surface for Page {
    fn card_rect(&self, card: CardId) -> Result<Rect, ProbeError> {
        self.rects.get(&card).copied().ok_or(ProbeError::Detached)
    }

    fn write_glow(&mut self, card: CardId, glow: &GlowVars) {
        self.glow.insert(card, *glow);
    }

    fn mount(&mut self, element: ElementId, decoration: &Decoration<'_>) -> bool {
        if !self.rects.contains_key(&decoration.card()) {
            return false;
        }
        let m = match *decoration {
            Decoration::Particle { card, at, .. } => Mounted::Particle { card, at },
            Decoration::Ripple { card, diameter, .. } => Mounted::Ripple { card, diameter },
        };
        assert!(self.live.insert(element, m).is_none(), "element mounted twice");
        self.mounts += 1;
        true
    }

    fn apply_style(&mut self, target: Target, style: &Style) {
        self.styles.insert(target, *style);
    }

    fn unmount(&mut self, element: ElementId) {
        if self.live.remove(&element).is_some() {
            self.unmounts += 1;
        }
    }
}

const A: CardId = CardId(1);
const B: CardId = CardId(2);

fn card_a() -> Rect {
    Rect::new(100.0, 100.0, 200.0, 300.0)
}

fn card_b() -> Rect {
    Rect::new(400.0, 100.0, 200.0, 300.0)
}

fn setup() -> (Engine, Page) {
    let page = Page::with_cards(&[(A, card_a()), (B, card_b())]);
    (Engine::new(FxParams::default(), 7), page)
}

/// Step the engine like the frame loop would, at ~60 fps.
fn run_for(engine: &mut Engine, page: &mut Page, ms: f64) {
    let mut left = ms;
    while left > 0.0 {
        let dt = left.min(16.0);
        engine.tick(page, dt);
        left -= dt;
    }
}

#[test]
fn leave_before_first_spawn_never_mounts_particles() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    assert_eq!(engine.session(A).map(|s| s.pending()), Some(DEFAULT_PARTICLE_COUNT));
    engine.card_left(A);

    run_for(&mut engine, &mut page, 3000.0);
    assert_eq!(page.mounts, 0);
    assert_eq!(engine.timeline().pending_tasks(), 0);
    assert!(!engine.is_hovering(A));
}

#[test]
fn full_session_exits_every_particle() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 1200.0);

    let session = engine.session(A).expect("hovering");
    assert_eq!(session.live(), DEFAULT_PARTICLE_COUNT);
    assert_eq!(session.pending(), 0);
    assert_eq!(page.particles_on(A), DEFAULT_PARTICLE_COUNT);

    engine.card_left(A);
    assert!(engine.session(A).is_none());
    // one exit tween per particle plus the two tilt resets
    assert_eq!(engine.timeline().active_tweens(), DEFAULT_PARTICLE_COUNT + 2);
    // exit is asynchronous: still on the page right after leave
    assert_eq!(page.particles_on(A), DEFAULT_PARTICLE_COUNT);

    run_for(&mut engine, &mut page, PARTICLE_EXIT_MS + 50.0);
    assert_eq!(page.particles_on(A), 0);
    assert_eq!(page.unmounts, DEFAULT_PARTICLE_COUNT);
    assert_eq!(engine.stats().decorations, 0);
}

#[test]
fn rapid_reentry_does_not_leak_between_sessions() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 1200.0);
    let first_gen = engine.session(A).map(|s| s.generation());

    engine.card_left(A);
    run_for(&mut engine, &mut page, 48.0);
    engine.card_entered(A);
    assert_ne!(engine.session(A).map(|s| s.generation()), first_gen);
    assert_eq!(engine.session(A).map(|s| s.live()), Some(0));

    run_for(&mut engine, &mut page, 48.0);
    // old particles still exiting alongside the first new one
    assert!(page.particles_on(A) > DEFAULT_PARTICLE_COUNT);

    run_for(&mut engine, &mut page, 1200.0);
    assert_eq!(engine.session(A).map(|s| s.live()), Some(DEFAULT_PARTICLE_COUNT));
    assert_eq!(page.particles_on(A), DEFAULT_PARTICLE_COUNT);
    assert_eq!(page.unmounts, DEFAULT_PARTICLE_COUNT);
}

#[test]
fn enter_while_hovering_supersedes_the_session() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 350.0);
    let spawned = engine.session(A).map(|s| s.live()).unwrap_or(0);
    assert!(spawned > 0);

    engine.card_entered(A);
    assert_eq!(engine.stats().hovering, 1);
    assert_eq!(engine.stats().pending_spawns, DEFAULT_PARTICLE_COUNT);

    run_for(&mut engine, &mut page, 1200.0);
    assert_eq!(page.particles_on(A), DEFAULT_PARTICLE_COUNT);
    assert_eq!(page.unmounts, spawned);
}

#[test]
fn spawns_are_staggered_from_session_start() {
    let (mut engine, mut page) = setup();
    run_for(&mut engine, &mut page, 500.0);
    engine.card_entered(A);

    engine.tick(&mut page, 1.0);
    assert_eq!(page.particles_on(A), 1);
    engine.tick(&mut page, SPAWN_STAGGER_MS);
    assert_eq!(page.particles_on(A), 2);
    engine.tick(&mut page, SPAWN_STAGGER_MS * 3.0);
    assert_eq!(page.particles_on(A), 5);
}

#[test]
fn particles_stay_inside_their_card() {
    const WIDE: CardId = CardId(3);
    let (mut engine, mut page) = setup();
    page.rects.insert(WIDE, Rect::new(100.0, 500.0, 360.0, 80.0));
    engine.card_entered(B);
    engine.card_entered(WIDE);
    run_for(&mut engine, &mut page, 1200.0);
    assert_eq!(page.particles_on(B), DEFAULT_PARTICLE_COUNT);
    assert_eq!(page.particles_on(WIDE), DEFAULT_PARTICLE_COUNT);
    assert_eq!(page.particles_on(A), 0);

    for m in page.live.values() {
        let Mounted::Particle { card, at } = *m else {
            continue;
        };
        let rect = page.rects[&card];
        assert!(at.x >= 0.0 && at.x <= rect.width, "{:?} outside {:?}", at, rect);
        assert!(at.y >= 0.0 && at.y <= rect.height, "{:?} outside {:?}", at, rect);
    }
    // the wide card gets particles past its own height on x
    assert!(page.live.values().any(
        |m| matches!(m, Mounted::Particle { card, at } if *card == WIDE && at.x > 80.0)
    ));
}

#[test]
fn particle_fades_in_then_pulses() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    engine.tick(&mut page, 1.0);
    let el = engine.session(A).and_then(|s| s.particles().next()).expect("spawned");
    let target = Target::Element(el);
    assert!(page.styles[&target].opacity < 0.1);

    engine.card_left(A);
    engine.card_entered(A);
    run_for(&mut engine, &mut page, PARTICLE_ENTER_MS + 20.0);
    let el = engine.session(A).and_then(|s| s.particles().next()).expect("spawned");
    let style = page.styles[&Target::Element(el)];
    assert!(style.opacity > PARTICLE_PULSE_OPACITY && style.opacity <= 1.0);
    assert!(style.scale > 0.9);
}

#[test]
fn detached_card_spawn_is_a_no_op() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    page.rects.remove(&A);
    run_for(&mut engine, &mut page, 1500.0);
    assert_eq!(page.mounts, 0);
    assert_eq!(engine.session(A).map(|s| s.pending()), Some(0));
}

#[test]
fn pointer_at_center_gives_full_glow_and_far_cards_stay_dark() {
    let (mut engine, mut page) = setup();
    engine.pointer_moved(&mut page, &[A, B], card_a().center());
    assert_eq!(page.intensity(A), 1.0);
    // B's bounding circle is 300 - 150 = 150 away -> exactly the proximity edge
    assert_eq!(page.intensity(B), 1.0);

    engine.pointer_moved(&mut page, &[A, B], Vec2::new(-400.0, 250.0));
    assert_eq!(page.intensity(A), 0.0);
    assert_eq!(page.intensity(B), 0.0);
    assert_eq!(engine.spotlight().target_opacity(), 0.0);
}

#[test]
fn glow_origin_is_relative_to_card() {
    let (mut engine, mut page) = setup();
    engine.pointer_moved(&mut page, &[A], Vec2::new(150.0, 400.0));
    let g = page.glow[&A];
    assert!((g.x_pct - 25.0).abs() < 1e-4);
    assert!((g.y_pct - 100.0).abs() < 1e-4);
    assert_eq!(g.radius_px, DEFAULT_SPOTLIGHT_RADIUS);
}

#[test]
fn spotlight_tracks_the_nearest_card() {
    let (mut engine, mut page) = setup();
    // 150 (bounding radius) + 187.5 from A's center: halfway down the ramp
    let p = card_a().center() - Vec2::new(150.0 + 187.5, 0.0);
    engine.pointer_moved(&mut page, &[A, B], p);
    let expected = 0.5 * SPOTLIGHT_MAX_OPACITY;
    assert!((engine.spotlight().target_opacity() - expected).abs() < 1e-4);

    run_for(&mut engine, &mut page, SPOTLIGHT_FADE_IN_MS + 20.0);
    let spot = page.styles[&Target::Spotlight];
    assert!((spot.opacity - expected).abs() < 1e-3);
    assert!((spot.x - p.x).abs() < 1e-2);
    assert!((spot.y - p.y).abs() < 1e-2);
}

#[test]
fn leaving_region_forces_everything_dark() {
    let (mut engine, mut page) = setup();
    engine.pointer_moved(&mut page, &[A, B], Vec2::new(350.0, 250.0));
    run_for(&mut engine, &mut page, 300.0);
    assert!(page.intensity(A) > 0.0);
    assert!(page.styles[&Target::Spotlight].opacity > 0.0);
    assert!(engine.inside_region());

    engine.pointer_left_region(&mut page, &[A, B]);
    assert!(!engine.inside_region());
    assert_eq!(page.intensity(A), 0.0);
    assert_eq!(page.intensity(B), 0.0);
    assert_eq!(engine.spotlight().target_opacity(), 0.0);

    run_for(&mut engine, &mut page, SPOTLIGHT_EXIT_MS + 20.0);
    assert!(page.styles[&Target::Spotlight].opacity.abs() < 1e-4);
}

#[test]
fn ripple_covers_the_whole_card_and_removes_itself() {
    let (mut engine, mut page) = setup();
    let click = Vec2::new(130.0, 130.0);
    let el = engine.card_clicked(&mut page, A, click).expect("ripple");

    let far_corner = Vec2::new(300.0, 400.0);
    let expected = 2.0 * click.distance(far_corner);
    match page.live[&el] {
        Mounted::Ripple { card, diameter } => {
            assert_eq!(card, A);
            assert!((diameter - expected).abs() < 1e-3);
        }
        other => panic!("unexpected mount {:?}", other),
    }

    // concurrent ripples are independent
    let second = engine.card_clicked(&mut page, A, card_a().center()).expect("ripple");
    assert_ne!(el, second);

    run_for(&mut engine, &mut page, RIPPLE_MS + 20.0);
    assert!(page.live.is_empty());
    assert_eq!(page.unmounts, 2);
}

#[test]
fn tilt_move_supersedes_previous_tweens() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    engine.card_pointer_moved(&page, A, Vec2::new(120.0, 120.0));
    let first = engine.card(A).and_then(|c| c.tilt().rotation_tween()).expect("tilt");
    engine.card_pointer_moved(&page, A, Vec2::new(290.0, 390.0));
    let second = engine.card(A).and_then(|c| c.tilt().rotation_tween()).expect("tilt");
    let magnet = engine.card(A).and_then(|c| c.tilt().magnet_tween()).expect("magnet");

    assert!(!engine.timeline().is_active(first));
    assert!(engine.timeline().is_active(second));
    assert!(engine.timeline().is_active(magnet));
    assert_eq!(engine.timeline().tweens_of(Target::Card(A)), 2);

    run_for(&mut engine, &mut page, MAGNETISM_FOLLOW_MS + 20.0);
    let style = page.styles[&Target::Card(A)];
    // bottom-right corner: tipped forward, turned right, pulled down-right
    assert!((style.rotate_x - -TILT_MAX_DEG * 0.9333).abs() < 0.05);
    assert!((style.rotate_y - TILT_MAX_DEG * 0.9).abs() < 0.05);
    assert!((style.x - 90.0 * MAGNETISM_FACTOR).abs() < 1e-3);
    assert!((style.y - 140.0 * MAGNETISM_FACTOR).abs() < 1e-3);

    engine.card_left(A);
    run_for(&mut engine, &mut page, TILT_RESET_MS + 20.0);
    let rest = page.styles[&Target::Card(A)];
    assert!(rest.rotate_x.abs() < 1e-3 && rest.rotate_y.abs() < 1e-3);
    assert!(rest.x.abs() < 1e-3 && rest.y.abs() < 1e-3);
}

#[test]
fn tilt_ignored_when_not_hovering() {
    let (mut engine, page) = setup();
    engine.card_pointer_moved(&page, A, Vec2::new(120.0, 120.0));
    assert_eq!(engine.timeline().tweens_of(Target::Card(A)), 0);
}

#[test]
fn removed_cards_release_everything() {
    let (mut engine, mut page) = setup();
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 400.0);
    engine.card_clicked(&mut page, A, Vec2::new(150.0, 150.0));
    engine.card_clicked(&mut page, B, Vec2::new(450.0, 150.0));
    assert!(page.particles_on(A) > 0);

    // a new search replaced A; B is still there
    page.rects.remove(&A);
    engine.sync_cards(&mut page, &[B]);

    assert!(engine.card(A).is_none());
    let stats = engine.stats();
    assert_eq!(stats.hovering, 0);
    assert_eq!(stats.pending_spawns, 0);
    assert_eq!(stats.decorations, 1);
    assert_eq!(page.live.len(), 1);

    let mounts = page.mounts;
    run_for(&mut engine, &mut page, 2000.0);
    assert_eq!(page.mounts, mounts);
    assert!(page.live.is_empty());
}

#[test]
fn suspend_quiets_the_page_but_keeps_the_engine() {
    let (mut engine, mut page) = setup();
    engine.pointer_moved(&mut page, &[A, B], Vec2::new(200.0, 250.0));
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 400.0);
    assert!(page.particles_on(A) > 0);

    engine.suspend(&mut page, &[A, B]);
    assert!(!engine.is_disposed());
    assert!(!engine.is_hovering(A));
    assert!(!engine.inside_region());
    assert_eq!(engine.spotlight().target_opacity(), 0.0);
    assert_eq!(page.intensity(A), 0.0);
    assert_eq!(engine.stats().pending_spawns, 0);

    run_for(&mut engine, &mut page, PARTICLE_EXIT_MS + 50.0);
    assert_eq!(page.particles_on(A), 0);

    // page shown again from the cache
    engine.pointer_moved(&mut page, &[A, B], Vec2::new(200.0, 250.0));
    assert_eq!(page.intensity(A), 1.0);
    assert!(engine.spotlight().target_opacity() > 0.0);
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 1200.0);
    assert_eq!(page.particles_on(A), DEFAULT_PARTICLE_COUNT);
}

#[test]
fn sync_with_many_cards_keeps_the_present_ones() {
    let (mut engine, mut page) = setup();
    let grid: Vec<CardId> = (10..410).map(CardId).collect();
    for (i, id) in grid.iter().enumerate() {
        let col = (i % 20) as f32;
        let row = (i / 20) as f32;
        page.rects
            .insert(*id, Rect::new(col * 220.0, 800.0 + row * 320.0, 200.0, 300.0));
        engine.card_entered(*id);
    }
    let kept: Vec<CardId> = grid.iter().copied().filter(|id| id.0 % 2 == 0).collect();
    engine.sync_cards(&mut page, &kept);

    assert_eq!(engine.stats().hovering, kept.len());
    assert!(kept.iter().all(|id| engine.is_hovering(*id)));
    assert!(!engine.is_hovering(CardId(11)));
}

#[test]
fn dispose_cancels_all_work() {
    let (mut engine, mut page) = setup();
    engine.pointer_moved(&mut page, &[A, B], Vec2::new(200.0, 200.0));
    engine.card_entered(A);
    engine.card_entered(B);
    run_for(&mut engine, &mut page, 300.0);
    engine.card_clicked(&mut page, A, Vec2::new(150.0, 150.0));

    engine.dispose(&mut page);
    assert!(engine.is_disposed());
    assert!(page.live.is_empty());
    assert_eq!(engine.stats(), engine::FxStats::default());
    assert_eq!(engine.timeline().pending_tasks(), 0);

    engine.card_entered(A);
    run_for(&mut engine, &mut page, 1000.0);
    assert!(page.live.is_empty());
    assert!(engine.card_clicked(&mut page, A, Vec2::new(150.0, 150.0)).is_none());
}

#[test]
fn disabled_features_stay_quiet() {
    let params = FxParams {
        enable_particles: false,
        enable_ripple: false,
        enable_spotlight: false,
        ..FxParams::default()
    };
    let mut engine = Engine::new(params, 1);
    let mut page = Page::with_cards(&[(A, card_a())]);

    engine.card_entered(A);
    assert!(engine.is_hovering(A));
    run_for(&mut engine, &mut page, 1500.0);
    assert_eq!(page.mounts, 0);
    assert!(engine.card_clicked(&mut page, A, card_a().center()).is_none());

    engine.pointer_moved(&mut page, &[A], card_a().center());
    assert_eq!(page.intensity(A), 1.0);
    assert_eq!(engine.spotlight().target_opacity(), 0.0);
}

#[test]
fn disabled_animations_keep_glow_but_drop_motion() {
    let params = FxParams {
        disable_animations: true,
        ..FxParams::default()
    };
    let mut engine = Engine::new(params, 1);
    let mut page = Page::with_cards(&[(A, card_a())]);

    engine.card_entered(A);
    engine.card_pointer_moved(&page, A, Vec2::new(120.0, 120.0));
    assert_eq!(engine.timeline().tweens_of(Target::Card(A)), 0);
    run_for(&mut engine, &mut page, 1500.0);
    assert_eq!(page.mounts, 0);

    engine.pointer_moved(&mut page, &[A], card_a().center());
    assert_eq!(page.intensity(A), 1.0);
    assert!(engine.spotlight().target_opacity() > 0.0);
}

#[test]
fn custom_particle_count_is_honoured() {
    let params = FxParams {
        particle_count: 5,
        spawn_stagger_ms: 10.0,
        ..FxParams::default()
    };
    let mut engine = Engine::new(params, 3);
    let mut page = Page::with_cards(&[(A, card_a())]);
    engine.card_entered(A);
    run_for(&mut engine, &mut page, 100.0);
    assert_eq!(page.particles_on(A), 5);
}
