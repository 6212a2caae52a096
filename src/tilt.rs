use crate::config::FxParams;
use crate::constants::*;
use crate::geometry::Rect;
use crate::timeline::{CardId, Channel, Ease, Target, Timeline, Tween, TweenId};
use glam::Vec2;

/// Rotation (degrees about X, about Y) for a pointer at `local` in a card of `size`.
///
/// Pointer at the top edge tips the card back by `max_deg`, right edge turns it
/// by `max_deg`; the center is flat.
#[inline]
pub fn tilt_angles(local: Vec2, size: Vec2, max_deg: f32) -> (f32, f32) {
    let c = size * 0.5;
    if c.x <= 0.0 || c.y <= 0.0 {
        return (0.0, 0.0);
    }
    let rotate_x = ((local.y - c.y) / c.y) * -max_deg;
    let rotate_y = ((local.x - c.x) / c.x) * max_deg;
    (rotate_x, rotate_y)
}

/// Translation pulling the card toward the pointer.
#[inline]
pub fn magnet_offset(local: Vec2, size: Vec2, factor: f32) -> Vec2 {
    (local - size * 0.5) * factor
}

/// Per-card tilt and magnetism. Holds at most one live tween of each kind.
#[derive(Debug, Default)]
pub struct TiltController {
    rotation: Option<TweenId>,
    magnet: Option<TweenId>,
}

impl TiltController {
    pub fn track<T>(
        &mut self,
        card: CardId,
        rect: &Rect,
        pointer: Vec2,
        params: &FxParams,
        timeline: &mut Timeline<T>,
    ) {
        let target = Target::Card(card);
        let local = rect.to_local(pointer);
        if params.tilt_active() {
            let (rx, ry) = tilt_angles(local, rect.size(), params.tilt_max_deg);
            timeline.kill_slot(&mut self.rotation);
            self.rotation = Some(
                timeline.start(
                    Tween::to(target, TILT_FOLLOW_MS)
                        .set(Channel::RotateX, rx)
                        .set(Channel::RotateY, ry)
                        .ease(Ease::QuadOut),
                ),
            );
        }
        if params.magnetism_active() {
            let offset = magnet_offset(local, rect.size(), params.magnetism_factor);
            timeline.kill_slot(&mut self.magnet);
            self.magnet = Some(
                timeline.start(
                    Tween::to(target, MAGNETISM_FOLLOW_MS)
                        .set(Channel::X, offset.x)
                        .set(Channel::Y, offset.y)
                        .ease(Ease::QuadOut),
                ),
            );
        }
    }

    /// Ease the card back to rest, superseding whatever was running.
    pub fn settle<T>(&mut self, card: CardId, params: &FxParams, timeline: &mut Timeline<T>) {
        self.cancel(timeline);
        let target = Target::Card(card);
        if params.tilt_active() {
            self.rotation = Some(
                timeline.start(
                    Tween::to(target, TILT_RESET_MS)
                        .set(Channel::RotateX, 0.0)
                        .set(Channel::RotateY, 0.0)
                        .ease(Ease::QuadOut),
                ),
            );
        }
        if params.magnetism_active() {
            self.magnet = Some(
                timeline.start(
                    Tween::to(target, TILT_RESET_MS)
                        .set(Channel::X, 0.0)
                        .set(Channel::Y, 0.0)
                        .ease(Ease::QuadOut),
                ),
            );
        }
    }

    pub fn cancel<T>(&mut self, timeline: &mut Timeline<T>) {
        timeline.kill_slot(&mut self.rotation);
        timeline.kill_slot(&mut self.magnet);
    }

    pub fn rotation_tween(&self) -> Option<TweenId> {
        self.rotation
    }

    pub fn magnet_tween(&self) -> Option<TweenId> {
        self.magnet
    }
}
