use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    foundation::core::Millis,
    foundation::error::{SlideError, SlideResult},
};

/// Tunables shared by the layout engine, the clusterer and the playback controller.
///
/// Every field has a default, so a JSON override file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pointer travel (px) before a press turns into a drag.
    pub drag_threshold_px: f64,
    /// Max vertical distance (px) from the center line for center consolidation.
    pub center_proximity_px: f64,
    /// Horizontal distance (px) from the viewport middle before a lone center element leans.
    pub mid_proximity_px: f64,
    /// Delay before the clusterer runs once animation classes are reset.
    pub before_animate: Millis,
    /// Cadence of the staggered reveal worker.
    pub reveal_cadence: Millis,
    /// Debounce applied to viewport resize notifications.
    pub resize_debounce: Millis,
    /// Attempts to measure the container before falling back.
    pub measure_retries: u32,
    /// Interval between measurement attempts.
    pub measure_retry_interval: Millis,
    /// Deferred tick before freshly positioned nodes become visible.
    pub reveal_tick: Millis,
    /// Slide time used when a slide has no (or zero) playback time.
    pub default_slide_duration: Millis,
    /// Slide time used in fast-forward embedding contexts.
    pub fast_forward_duration: Millis,
    /// Flat appear duration used when animation is disabled.
    pub disabled_animation_duration: Millis,
    /// Width/height ratio of the fitted viewport.
    pub aspect_ratio: f64,
    /// Gap (px) subtracted from the parent box before fitting.
    pub viewport_gap_px: f64,
    /// Spacing (px) between stacked items in the geometry pass.
    pub stack_gap_px: f64,
    /// Timing model constants.
    pub timing: TimingConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 6.0,
            center_proximity_px: 35.0,
            mid_proximity_px: 75.0,
            before_animate: Millis(50),
            reveal_cadence: Millis(200),
            resize_debounce: Millis(50),
            measure_retries: 10,
            measure_retry_interval: Millis(10),
            reveal_tick: Millis(10),
            default_slide_duration: Millis::from_secs(10),
            fast_forward_duration: Millis::from_secs(2),
            disabled_animation_duration: Millis(300),
            aspect_ratio: 5.0 / 3.0,
            viewport_gap_px: 20.0,
            stack_gap_px: 10.0,
            timing: TimingConfig::default(),
        }
    }
}

/// Constants of the reveal timing model (all in milliseconds).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub appear_base: u64,
    pub appear_per_element: u64,
    pub hide_base: u64,
    pub hide_per_element: u64,
    pub callout_delay: u64,
    pub progress_delay: u64,
    pub grid_base_delay: u64,
    pub grid_per_cell_delay: u64,
    pub list_row_threshold: usize,
    pub list_long_delay: u64,
    pub list_base_delay: u64,
    pub list_per_row_delay: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            appear_base: 600,
            appear_per_element: 200,
            hide_base: 300,
            hide_per_element: 100,
            callout_delay: 450,
            progress_delay: 800,
            grid_base_delay: 410,
            grid_per_cell_delay: 50,
            list_row_threshold: 15,
            list_long_delay: 1000,
            list_base_delay: 300,
            list_per_row_delay: 50,
        }
    }
}

impl PlayerConfig {
    /// Parse a config override from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlideResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| SlideError::serde(format!("parse player config JSON: {e}")))?;
        // Serde's derived visitor also accepts a field sequence; only objects are overrides.
        if !value.is_object() {
            return Err(SlideError::serde("player config must be a JSON object"));
        }
        let cfg: Self = serde_json::from_value(value)
            .map_err(|e| SlideError::serde(format!("parse player config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config override from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlideResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlideError::validation(format!("open player config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> SlideResult<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(SlideError::validation("aspect_ratio must be finite and > 0"));
        }
        for (name, v) in [
            ("drag_threshold_px", self.drag_threshold_px),
            ("center_proximity_px", self.center_proximity_px),
            ("mid_proximity_px", self.mid_proximity_px),
            ("viewport_gap_px", self.viewport_gap_px),
            ("stack_gap_px", self.stack_gap_px),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(SlideError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.reveal_cadence == Millis::ZERO {
            return Err(SlideError::validation("reveal_cadence must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
