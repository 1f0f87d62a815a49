use crate::foundation::core::{Size, Viewport};

/// Fitted viewport plus the margins that center it inside its parent box.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct ViewportParams {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
}

impl ViewportParams {
    pub fn viewport(self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }
}

/// Fit an `aspect` (width/height) box into `parent` minus `gap`, limited by whichever side runs
/// out first, and center it.
pub fn fit_viewport(parent: Size, aspect: f64, gap: f64) -> ViewportParams {
    let avail_w = (parent.width - gap).max(0.0);
    let avail_h = (parent.height - gap).max(0.0);
    if avail_w <= 0.0 || avail_h <= 0.0 || aspect.is_nan() || aspect <= 0.0 {
        return ViewportParams::default();
    }

    let (width, height) = if avail_w / avail_h > aspect {
        (avail_h * aspect, avail_h)
    } else {
        (avail_w, avail_w / aspect)
    };
    ViewportParams {
        width,
        height,
        margin_left: ((parent.width - width) * 0.5).max(0.0),
        margin_top: ((parent.height - height) * 0.5).max(0.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/viewport.rs"]
mod tests;
