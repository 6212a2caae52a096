use glam::Vec2;

/// Screen-space bounding box of a card, in client (viewport) pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin() + self.size() * 0.5
    }

    /// Radius of the circle that "reaches" from the center to the longer edge.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.width.max(self.height) * 0.5
    }

    /// Pointer position relative to the card's top-left corner.
    #[inline]
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        p - self.origin()
    }

    /// Corners in local coordinates: top-left, top-right, bottom-left, bottom-right.
    pub fn local_corners(&self) -> [Vec2; 4] {
        [
            Vec2::ZERO,
            Vec2::new(self.width, 0.0),
            Vec2::new(0.0, self.height),
            Vec2::new(self.width, self.height),
        ]
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("card element is no longer attached to the document")]
    Detached,
    #[error("card has a degenerate bounding box ({width}x{height})")]
    Degenerate { width: f32, height: f32 },
}

/// Reject boxes that cannot produce meaningful relative coordinates.
pub fn checked_rect(rect: Rect) -> Result<Rect, ProbeError> {
    let finite = rect.left.is_finite()
        && rect.top.is_finite()
        && rect.width.is_finite()
        && rect.height.is_finite();
    if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(ProbeError::Degenerate {
            width: rect.width,
            height: rect.height,
        });
    }
    Ok(rect)
}

/// Distance from the pointer to the card's bounding circle, floored at zero.
///
/// Larger cards reach further because the circle grows with the longer edge.
#[inline]
pub fn effective_distance(p: Vec2, rect: &Rect) -> f32 {
    (p.distance(rect.center()) - rect.bounding_radius()).max(0.0)
}

/// The two glow thresholds derived from the configured radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowRadii {
    pub radius: f32,
    pub proximity: f32,
    pub fade_distance: f32,
}

impl GlowRadii {
    pub fn from_radius(radius: f32) -> Self {
        Self {
            radius,
            proximity: radius * crate::constants::PROXIMITY_FRACTION,
            fade_distance: radius * crate::constants::FADE_FRACTION,
        }
    }

    /// Three-zone ramp: 1 inside `proximity`, linear down to 0 at `fade_distance`.
    pub fn ramp(&self, d: f32) -> f32 {
        if d <= self.proximity {
            1.0
        } else if d <= self.fade_distance && self.fade_distance > self.proximity {
            ((self.fade_distance - d) / (self.fade_distance - self.proximity)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[inline]
pub fn glow_intensity(d: f32, radii: &GlowRadii) -> f32 {
    radii.ramp(d)
}

/// Values written to a card's glow custom properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowVars {
    pub x_pct: f32,
    pub y_pct: f32,
    pub intensity: f32,
    pub radius_px: f32,
}

impl GlowVars {
    /// Glow for pointer `p` over `rect`, together with the effective distance.
    pub fn compute(p: Vec2, rect: &Rect, radii: &GlowRadii) -> (Self, f32) {
        let d = effective_distance(p, rect);
        let local = rect.to_local(p);
        let vars = Self {
            x_pct: local.x / rect.width * 100.0,
            y_pct: local.y / rect.height * 100.0,
            intensity: glow_intensity(d, radii),
            radius_px: radii.radius,
        };
        (vars, d)
    }

    /// Fully dark glow, used when the pointer leaves the tracked region.
    pub fn dark(radius_px: f32) -> Self {
        Self {
            x_pct: 50.0,
            y_pct: 50.0,
            intensity: 0.0,
            radius_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_radius_uses_longer_edge() {
        let r = Rect::new(0.0, 0.0, 200.0, 300.0);
        assert_eq!(r.bounding_radius(), 150.0);
    }

    #[test]
    fn checked_rect_rejects_empty_boxes() {
        assert!(checked_rect(Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
        assert!(checked_rect(Rect::new(0.0, 0.0, f32::NAN, 10.0)).is_err());
        assert!(checked_rect(Rect::new(5.0, 5.0, 10.0, 10.0)).is_ok());
    }
}
