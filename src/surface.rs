use crate::geometry::{GlowVars, ProbeError, Rect};
use crate::timeline::{CardId, ElementId, Style, Target};
use glam::Vec2;

/// An element the effects ask the page to create inside a card.
///
/// Positions are local to the card's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decoration<'a> {
    Particle {
        card: CardId,
        at: Vec2,
        size: f32,
        color: &'a str,
    },
    Ripple {
        card: CardId,
        center: Vec2,
        diameter: f32,
        color: &'a str,
    },
}

impl Decoration<'_> {
    pub fn card(&self) -> CardId {
        match self {
            Decoration::Particle { card, .. } | Decoration::Ripple { card, .. } => *card,
        }
    }
}

/// What the effects need from the page: geometry reads and style writes.
///
/// The browser implementation lives in `dom.rs`; tests use a recording double.
pub trait Surface {
    /// Current bounding box of a card. Detached cards report `ProbeError::Detached`.
    fn card_rect(&self, card: CardId) -> Result<Rect, ProbeError>;

    fn write_glow(&mut self, card: CardId, glow: &GlowVars);

    /// Create a decoration. Returns `false` when its card is gone.
    fn mount(&mut self, element: ElementId, decoration: &Decoration<'_>) -> bool;

    fn apply_style(&mut self, target: Target, style: &Style);

    fn unmount(&mut self, element: ElementId);
}
