use crate::foundation::error::{SlideError, SlideResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Virtual-clock timestamp or duration in milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Self = Self(0);

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub fn saturating_add(self, other: Millis) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Millis) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Composite identity of a materialized element: `(slide id, element id)`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementKey {
    pub slide_id: i64,
    pub element_id: i64,
}

impl ElementKey {
    pub fn new(slide_id: i64, element_id: i64) -> Self {
        Self {
            slide_id,
            element_id,
        }
    }
}

/// Width/height pair of the composition viewport (or a recorded snapshot of it).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> SlideResult<Self> {
        if !width.is_finite() || !height.is_finite() {
            return Err(SlideError::validation("viewport dimensions must be finite"));
        }
        if width < 0.0 || height < 0.0 {
            return Err(SlideError::validation("viewport dimensions must be >= 0"));
        }
        Ok(Self { width, height })
    }

    /// A snapshot is only usable as a scaling base when both sides are positive.
    pub fn is_measurable(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Ratio that maps coordinates recorded against `recorded` onto `self`.
    pub fn scale_from(self, recorded: Viewport) -> Option<Vec2> {
        if !recorded.is_measurable() {
            return None;
        }
        Some(Vec2::new(
            self.width / recorded.width,
            self.height / recorded.height,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
