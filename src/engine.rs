use crate::config::FxParams;
use crate::geometry::{checked_rect, GlowRadii, GlowVars, ProbeError, Rect};
use crate::particles::{ParticleSession, SpawnTask};
use crate::ripple;
use crate::spotlight::{spotlight_opacity, Spotlight};
use crate::surface::Surface;
use crate::tilt::TiltController;
use crate::timeline::{CardId, Completion, ElementId, Target, TaskId, Timeline};
use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

/// Hover state of one card.
#[derive(Debug, Default)]
pub enum Phase {
    #[default]
    Idle,
    Hovering(ParticleSession),
}

#[derive(Debug, Default)]
pub struct CardState {
    phase: Phase,
    tilt: TiltController,
}

impl CardState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn tilt(&self) -> &TiltController {
        &self.tilt
    }

    pub fn session(&self) -> Option<&ParticleSession> {
        match &self.phase {
            Phase::Hovering(session) => Some(session),
            Phase::Idle => None,
        }
    }
}

/// Snapshot of what the effects currently hold, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FxStats {
    pub cards: usize,
    pub hovering: usize,
    pub live_particles: usize,
    pub pending_spawns: usize,
    pub decorations: usize,
    pub active_tweens: usize,
}

/// Pointer-driven card effects: proximity glow, spotlight, per-card particle
/// sessions, tilt/magnetism and click ripples.
///
/// One value per page. The DOM layer owns it and injects it into every event
/// handler; all timed work runs on the internal [`Timeline`] advanced by
/// [`Engine::tick`].
pub struct Engine {
    params: FxParams,
    radii: GlowRadii,
    timeline: Timeline<SpawnTask>,
    cards: FnvHashMap<CardId, CardState>,
    // decorations still on the page and the card they were mounted into
    owners: FnvHashMap<ElementId, CardId>,
    spotlight: Spotlight,
    inside_region: bool,
    next_element: u64,
    next_generation: u64,
    rng: StdRng,
    disposed: bool,
}

impl Engine {
    pub fn new(params: FxParams, seed: u64) -> Self {
        let mut timeline = Timeline::new();
        let spotlight = Spotlight::new(&mut timeline);
        log::info!(
            "[fx] engine ready radius={} particles={} tilt={} magnetism={} ripple={} spotlight={}",
            params.radius,
            if params.particles_active() {
                params.particle_count
            } else {
                0
            },
            params.tilt_active(),
            params.magnetism_active(),
            params.ripple_active(),
            params.spotlight_active(),
        );
        Self {
            radii: GlowRadii::from_radius(params.radius),
            params,
            timeline,
            cards: FnvHashMap::default(),
            owners: FnvHashMap::default(),
            spotlight,
            inside_region: false,
            next_element: 1,
            next_generation: 1,
            rng: StdRng::seed_from_u64(seed),
            disposed: false,
        }
    }

    pub fn timeline(&self) -> &Timeline<SpawnTask> {
        &self.timeline
    }

    pub fn spotlight(&self) -> &Spotlight {
        &self.spotlight
    }

    pub fn card(&self, card: CardId) -> Option<&CardState> {
        self.cards.get(&card)
    }

    pub fn session(&self, card: CardId) -> Option<&ParticleSession> {
        self.cards.get(&card).and_then(CardState::session)
    }

    pub fn is_hovering(&self, card: CardId) -> bool {
        self.session(card).is_some()
    }

    pub fn inside_region(&self) -> bool {
        self.inside_region
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn stats(&self) -> FxStats {
        let sessions = self.cards.values().filter_map(CardState::session);
        let (hovering, live_particles, pending_spawns) = sessions
            .fold((0, 0, 0), |(h, l, p), s| (h + 1, l + s.live(), p + s.pending()));
        FxStats {
            cards: self.cards.len(),
            hovering,
            live_particles,
            pending_spawns,
            decorations: self.owners.len(),
            active_tweens: self.timeline.active_tweens(),
        }
    }

    fn probe<S: Surface>(surface: &S, card: CardId) -> Result<Rect, ProbeError> {
        surface.card_rect(card).and_then(checked_rect)
    }

    fn next_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        id
    }

    /// Document-level pointer move inside the tracked region: refresh every
    /// card's glow and retarget the spotlight.
    pub fn pointer_moved<S: Surface>(&mut self, surface: &mut S, cards: &[CardId], pointer: Vec2) {
        if self.disposed {
            return;
        }
        self.inside_region = true;
        let mut min_distance: Option<f32> = None;
        for &card in cards {
            match Self::probe(surface, card) {
                Ok(rect) => {
                    let (glow, d) = GlowVars::compute(pointer, &rect, &self.radii);
                    surface.write_glow(card, &glow);
                    min_distance = Some(min_distance.map_or(d, |m| m.min(d)));
                }
                Err(e) => log::trace!("[fx] skip card {:?}: {}", card, e),
            }
        }
        if self.params.spotlight_active() {
            let opacity =
                spotlight_opacity(min_distance, &self.radii, self.params.spotlight_max_opacity);
            self.spotlight.follow(pointer, opacity, &mut self.timeline);
        }
    }

    /// Pointer left the tracked region: every card goes dark and the spotlight
    /// fades, whatever the last computed distances were.
    pub fn pointer_left_region<S: Surface>(&mut self, surface: &mut S, cards: &[CardId]) {
        if self.disposed {
            return;
        }
        self.inside_region = false;
        let dark = GlowVars::dark(self.radii.radius);
        for &card in cards {
            surface.write_glow(card, &dark);
        }
        if self.params.spotlight_active() {
            self.spotlight.fade_out(&mut self.timeline);
        }
        log::debug!("[fx] pointer left region, {} cards dimmed", cards.len());
    }

    /// Idle -> Hovering. A card that is already hovering has its old session
    /// released first so at most one session exists per card.
    pub fn card_entered(&mut self, card: CardId) {
        if self.disposed {
            return;
        }
        let state = self.cards.entry(card).or_default();
        if let Phase::Hovering(previous) = std::mem::take(&mut state.phase) {
            let exiting = previous.release(&mut self.timeline);
            log::debug!("[hover] card {:?} superseded, {} exiting", card, exiting.len());
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        let count = if self.params.particles_active() {
            self.params.particle_count
        } else {
            0
        };
        state.phase = Phase::Hovering(ParticleSession::begin(
            card,
            generation,
            count,
            self.params.spawn_stagger_ms,
            &mut self.timeline,
        ));
        log::trace!("[hover] enter card {:?} gen={}", card, generation);
    }

    /// Pointer moving over a hovered card drives tilt and magnetism.
    pub fn card_pointer_moved<S: Surface>(&mut self, surface: &S, card: CardId, pointer: Vec2) {
        if self.disposed {
            return;
        }
        let Some(state) = self.cards.get_mut(&card) else {
            return;
        };
        if !matches!(state.phase, Phase::Hovering(_)) {
            return;
        }
        match Self::probe(surface, card) {
            Ok(rect) => state
                .tilt
                .track(card, &rect, pointer, &self.params, &mut self.timeline),
            Err(e) => log::trace!("[hover] no tilt for {:?}: {}", card, e),
        }
    }

    /// Hovering -> Idle. Cancels pending spawns, particle tweens and tilt
    /// tweens synchronously; exit animations finish on their own.
    pub fn card_left(&mut self, card: CardId) {
        if self.disposed {
            return;
        }
        let Some(state) = self.cards.get_mut(&card) else {
            return;
        };
        if let Phase::Hovering(session) = std::mem::take(&mut state.phase) {
            let exiting = session.release(&mut self.timeline);
            log::trace!("[hover] leave card {:?}, {} exiting", card, exiting.len());
        }
        state.tilt.settle(card, &self.params, &mut self.timeline);
    }

    pub fn card_clicked<S: Surface>(
        &mut self,
        surface: &mut S,
        card: CardId,
        pointer: Vec2,
    ) -> Option<ElementId> {
        if self.disposed || !self.params.ripple_active() {
            return None;
        }
        let rect = match Self::probe(surface, card) {
            Ok(rect) => rect,
            Err(e) => {
                log::debug!("[click] no ripple for {:?}: {}", card, e);
                return None;
            }
        };
        let element = self.next_element();
        if !ripple::emit(
            card,
            &rect,
            pointer,
            element,
            &self.params,
            surface,
            &mut self.timeline,
        ) {
            return None;
        }
        self.owners.insert(element, card);
        Some(element)
    }

    /// Drop all state for cards that are no longer on the page, e.g. after a
    /// new search replaced the grid. Their sessions, tilt tweens and in-flight
    /// decorations are cancelled without further writes to the card.
    pub fn sync_cards<S: Surface>(&mut self, surface: &mut S, present: &[CardId]) {
        let present: FnvHashSet<CardId> = present.iter().copied().collect();
        let mut gone: Vec<CardId> = self
            .cards
            .keys()
            .chain(self.owners.values())
            .filter(|id| !present.contains(*id))
            .copied()
            .collect();
        gone.sort_unstable();
        gone.dedup();
        for card in gone {
            self.drop_card(surface, card);
        }
    }

    fn drop_card<S: Surface>(&mut self, surface: &mut S, card: CardId) {
        if let Some(mut state) = self.cards.remove(&card) {
            if let Phase::Hovering(session) = std::mem::take(&mut state.phase) {
                session.abandon(&mut self.timeline);
            }
            state.tilt.cancel(&mut self.timeline);
            self.timeline.forget(Target::Card(card));
        }
        let orphans: SmallVec<[ElementId; 16]> = self
            .owners
            .iter()
            .filter(|(_, owner)| **owner == card)
            .map(|(el, _)| *el)
            .collect();
        for el in &orphans {
            self.owners.remove(el);
            self.timeline.forget(Target::Element(*el));
            surface.unmount(*el);
        }
        log::debug!("[cards] dropped {:?} ({} decorations)", card, orphans.len());
    }

    /// Advance the effect timeline by `dt_ms`: fire due spawns, step tweens,
    /// flush styles and remove finished decorations.
    pub fn tick<S: Surface>(&mut self, surface: &mut S, dt_ms: f64) {
        if self.disposed {
            return;
        }
        let step = self.timeline.advance(dt_ms);
        for (id, task) in step.fired {
            self.spawn(surface, id, task);
        }
        for (target, style) in self.timeline.drain_styles() {
            surface.apply_style(target, &style);
        }
        for completion in step.completed {
            match completion {
                Completion::Unmount(el) => {
                    self.owners.remove(&el);
                    self.timeline.forget(Target::Element(el));
                    surface.unmount(el);
                }
            }
        }
    }

    fn spawn<S: Surface>(&mut self, surface: &mut S, id: TaskId, task: SpawnTask) {
        let Some(state) = self.cards.get_mut(&task.card) else {
            return;
        };
        let Phase::Hovering(session) = &mut state.phase else {
            return;
        };
        if !session.owns(&task) {
            return;
        }
        session.settle_task(id);
        let rect = match Self::probe(surface, task.card) {
            Ok(rect) => rect,
            Err(e) => {
                log::trace!("[hover] spawn skipped on {:?}: {}", task.card, e);
                return;
            }
        };
        let element = ElementId(self.next_element);
        if session.spawn(
            element,
            &rect,
            &self.params,
            surface,
            &mut self.timeline,
            &mut self.rng,
        ) {
            self.next_element += 1;
            self.owners.insert(element, task.card);
        }
    }

    /// The page is being frozen into the back/forward cache. Hover sessions end
    /// and the region is left, but the engine and its spotlight stay alive for
    /// when the page is shown again.
    pub fn suspend<S: Surface>(&mut self, surface: &mut S, cards: &[CardId]) {
        if self.disposed {
            return;
        }
        let hovering: SmallVec<[CardId; 8]> = self
            .cards
            .iter()
            .filter(|(_, state)| matches!(state.phase, Phase::Hovering(_)))
            .map(|(id, _)| *id)
            .collect();
        for card in hovering {
            self.card_left(card);
        }
        self.pointer_left_region(surface, cards);
        log::info!("[fx] suspended, {} cards", cards.len());
    }

    /// Tear everything down: cancel every task and tween and remove every
    /// decoration. The engine ignores all input afterwards.
    pub fn dispose<S: Surface>(&mut self, surface: &mut S) {
        if self.disposed {
            return;
        }
        for (_, mut state) in self.cards.drain() {
            if let Phase::Hovering(session) = std::mem::take(&mut state.phase) {
                session.abandon(&mut self.timeline);
            }
            state.tilt.cancel(&mut self.timeline);
        }
        for (el, _) in self.owners.drain() {
            surface.unmount(el);
        }
        self.spotlight.dispose(&mut self.timeline);
        self.timeline.clear();
        self.inside_region = false;
        self.disposed = true;
        log::info!("[fx] engine disposed");
    }
}
