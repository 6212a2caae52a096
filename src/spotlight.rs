use crate::constants::*;
use crate::geometry::GlowRadii;
use crate::timeline::{Channel, Ease, Style, Target, Timeline, Tween, TweenId};
use glam::Vec2;

/// Target opacity for the overlay given the closest card's effective distance.
#[inline]
pub fn spotlight_opacity(min_distance: Option<f32>, radii: &GlowRadii, ceiling: f32) -> f32 {
    min_distance.map_or(0.0, |d| radii.ramp(d) * ceiling)
}

/// The page-wide overlay that trails the pointer.
///
/// Position and opacity are targets handed to short tweens; a newer target
/// always supersedes the previous tween.
#[derive(Debug)]
pub struct Spotlight {
    follow: Option<TweenId>,
    fade: Option<TweenId>,
    target_position: Vec2,
    target_opacity: f32,
}

impl Spotlight {
    pub fn new<T>(timeline: &mut Timeline<T>) -> Self {
        timeline.set_style(
            Target::Spotlight,
            Style {
                opacity: 0.0,
                ..Style::default()
            },
        );
        Self {
            follow: None,
            fade: None,
            target_position: Vec2::ZERO,
            target_opacity: 0.0,
        }
    }

    pub fn follow<T>(&mut self, pointer: Vec2, opacity: f32, timeline: &mut Timeline<T>) {
        self.target_position = pointer;
        timeline.kill_slot(&mut self.follow);
        self.follow = Some(
            timeline.start(
                Tween::to(Target::Spotlight, SPOTLIGHT_FOLLOW_MS)
                    .set(Channel::X, pointer.x)
                    .set(Channel::Y, pointer.y)
                    .ease(Ease::QuadOut),
            ),
        );
        let duration = if opacity > 0.0 {
            SPOTLIGHT_FADE_IN_MS
        } else {
            SPOTLIGHT_FADE_OUT_MS
        };
        self.fade_to(opacity, duration, timeline);
    }

    /// Pointer left the tracked region: fade out regardless of card distances.
    pub fn fade_out<T>(&mut self, timeline: &mut Timeline<T>) {
        self.fade_to(0.0, SPOTLIGHT_EXIT_MS, timeline);
    }

    fn fade_to<T>(&mut self, opacity: f32, duration_ms: f64, timeline: &mut Timeline<T>) {
        self.target_opacity = opacity;
        timeline.kill_slot(&mut self.fade);
        self.fade = Some(
            timeline.start(
                Tween::to(Target::Spotlight, duration_ms)
                    .set(Channel::Opacity, opacity)
                    .ease(Ease::QuadOut),
            ),
        );
    }

    pub fn target_opacity(&self) -> f32 {
        self.target_opacity
    }

    pub fn target_position(&self) -> Vec2 {
        self.target_position
    }

    pub fn dispose<T>(&mut self, timeline: &mut Timeline<T>) {
        timeline.kill_slot(&mut self.follow);
        timeline.kill_slot(&mut self.fade);
        timeline.forget(Target::Spotlight);
    }
}
