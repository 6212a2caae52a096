use crate::config::FxParams;
use crate::constants::*;
use crate::geometry::Rect;
use crate::surface::{Decoration, Surface};
use crate::timeline::{
    CardId, Channel, Completion, Ease, ElementId, Style, Target, TaskId, Timeline, Tween, TweenId,
};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;

/// Deferred spawn of one particle for one hover session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnTask {
    pub card: CardId,
    pub generation: u64,
    pub index: usize,
}

/// A live particle and the infinite tweens animating it.
#[derive(Clone, Debug)]
pub struct ParticleHandle {
    pub element: ElementId,
    tweens: SmallVec<[TweenId; 3]>,
}

/// Everything one card owns during one continuous hover.
///
/// Dropping the session on the floor would leak timers; it must be ended with
/// [`ParticleSession::release`] or [`ParticleSession::abandon`].
#[derive(Debug)]
pub struct ParticleSession {
    card: CardId,
    generation: u64,
    pending: SmallVec<[TaskId; 16]>,
    particles: SmallVec<[ParticleHandle; 16]>,
}

impl ParticleSession {
    /// Start a session and schedule `count` spawns staggered by `stagger_ms`.
    pub fn begin(
        card: CardId,
        generation: u64,
        count: usize,
        stagger_ms: f64,
        timeline: &mut Timeline<SpawnTask>,
    ) -> Self {
        let pending = (0..count)
            .map(|index| {
                timeline.schedule(
                    index as f64 * stagger_ms,
                    SpawnTask {
                        card,
                        generation,
                        index,
                    },
                )
            })
            .collect();
        Self {
            card,
            generation,
            pending,
            particles: SmallVec::new(),
        }
    }

    pub fn card(&self) -> CardId {
        self.card
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live(&self) -> usize {
        self.particles.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn particles(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.particles.iter().map(|p| p.element)
    }

    /// Whether a fired task still belongs to this session.
    pub fn owns(&self, task: &SpawnTask) -> bool {
        task.card == self.card && task.generation == self.generation
    }

    /// Mark a task as fired so it is no longer cancelled on release.
    pub fn settle_task(&mut self, id: TaskId) {
        self.pending.retain(|t| *t != id);
    }

    /// Materialise one particle at a random point inside the card.
    pub fn spawn<S: Surface, R: Rng>(
        &mut self,
        element: ElementId,
        rect: &Rect,
        params: &FxParams,
        surface: &mut S,
        timeline: &mut Timeline<SpawnTask>,
        rng: &mut R,
    ) -> bool {
        let at = Vec2::new(
            rng.gen_range(0.0..=rect.width),
            rng.gen_range(0.0..=rect.height),
        );
        let decoration = Decoration::Particle {
            card: self.card,
            at,
            size: PARTICLE_SIZE_PX,
            color: &params.glow_color,
        };
        if !surface.mount(element, &decoration) {
            return false;
        }

        let target = Target::Element(element);
        timeline.set_style(
            target,
            Style {
                opacity: 0.0,
                scale: 0.0,
                ..Style::default()
            },
        );

        let enter = Tween::to(target, PARTICLE_ENTER_MS)
            .from_to(Channel::Scale, 0.0, 1.0)
            .from_to(Channel::Opacity, 0.0, 1.0)
            .ease(Ease::BackOut);
        let drift = Tween::to(
            target,
            PARTICLE_DRIFT_MIN_MS + rng.gen::<f64>() * PARTICLE_DRIFT_SPAN_MS,
        )
        .set(
            Channel::X,
            rng.gen_range(-PARTICLE_DRIFT_PX..=PARTICLE_DRIFT_PX),
        )
        .set(
            Channel::Y,
            rng.gen_range(-PARTICLE_DRIFT_PX..=PARTICLE_DRIFT_PX),
        )
        .set(Channel::Rotation, rng.gen_range(0.0..360.0))
        .ease(Ease::Linear)
        .delay(PARTICLE_ENTER_MS)
        .yoyo_forever();
        let pulse = Tween::to(target, PARTICLE_PULSE_MS)
            .set(Channel::Opacity, PARTICLE_PULSE_OPACITY)
            .ease(Ease::SineInOut)
            .delay(PARTICLE_ENTER_MS)
            .yoyo_forever();

        let mut tweens = SmallVec::new();
        tweens.push(timeline.start(enter));
        tweens.push(timeline.start(drift));
        tweens.push(timeline.start(pulse));
        self.particles.push(ParticleHandle { element, tweens });
        true
    }

    /// End the session: cancel pending spawns and send every live particle
    /// into its exit animation. Exiting particles unmount themselves and
    /// belong to no session. Returns the exiting elements.
    pub fn release(self, timeline: &mut Timeline<SpawnTask>) -> Vec<ElementId> {
        for id in &self.pending {
            timeline.cancel_task(*id);
        }
        self.particles
            .into_iter()
            .map(|particle| {
                for tw in particle.tweens {
                    timeline.kill(tw);
                }
                let exit = Tween::to(Target::Element(particle.element), PARTICLE_EXIT_MS)
                    .set(Channel::Scale, 0.0)
                    .set(Channel::Opacity, 0.0)
                    .ease(Ease::BackIn)
                    .on_complete(Completion::Unmount(particle.element));
                timeline.start(exit);
                particle.element
            })
            .collect()
    }

    /// End the session without exit animations (the card itself is gone).
    pub fn abandon(self, timeline: &mut Timeline<SpawnTask>) -> Vec<ElementId> {
        for id in &self.pending {
            timeline.cancel_task(*id);
        }
        self.particles
            .into_iter()
            .map(|particle| {
                timeline.forget(Target::Element(particle.element));
                particle.element
            })
            .collect()
    }
}
