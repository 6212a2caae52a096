use crate::config::FxParams;
use crate::constants::RIPPLE_MS;
use crate::geometry::Rect;
use crate::surface::{Decoration, Surface};
use crate::timeline::{
    CardId, Channel, Completion, Ease, ElementId, Style, Target, Timeline, Tween,
};
use glam::Vec2;

/// Largest distance from a local click point to any card corner. A circle of
/// this radius centered on the click covers the whole card.
pub fn cover_radius(local: Vec2, rect: &Rect) -> f32 {
    rect.local_corners()
        .iter()
        .map(|corner| local.distance(*corner))
        .fold(0.0, f32::max)
}

/// Spawn a self-removing ripple at `pointer` (client coordinates).
pub fn emit<S: Surface, T>(
    card: CardId,
    rect: &Rect,
    pointer: Vec2,
    element: ElementId,
    params: &FxParams,
    surface: &mut S,
    timeline: &mut Timeline<T>,
) -> bool {
    let center = rect.to_local(pointer);
    let radius = cover_radius(center, rect);
    let decoration = Decoration::Ripple {
        card,
        center,
        diameter: radius * 2.0,
        color: &params.glow_color,
    };
    if !surface.mount(element, &decoration) {
        return false;
    }
    let target = Target::Element(element);
    timeline.set_style(
        target,
        Style {
            scale: 0.0,
            opacity: 1.0,
            ..Style::default()
        },
    );
    timeline.start(
        Tween::to(target, RIPPLE_MS)
            .from_to(Channel::Scale, 0.0, 1.0)
            .from_to(Channel::Opacity, 1.0, 0.0)
            .ease(Ease::QuadOut)
            .on_complete(Completion::Unmount(element)),
    );
    true
}
