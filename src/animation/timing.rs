use crate::{config::TimingConfig, foundation::core::Millis, model::props::ElementProps};

/// Content features that stretch the reveal of a slide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum TimedContent {
    #[default]
    Plain,
    Callout,
    Progress,
    Chart {
        bar_or_line: bool,
        rows: usize,
        columns: usize,
    },
    Table {
        rows: usize,
        columns: usize,
    },
    Timeline {
        rows: usize,
    },
}

impl TimedContent {
    pub fn from_props(props: &ElementProps) -> Self {
        match props {
            ElementProps::Callout(_) => Self::Callout,
            ElementProps::Progress(_) => Self::Progress,
            ElementProps::Chart(c) => Self::Chart {
                bar_or_line: c.is_bar_or_line(),
                rows: c.data.row_count(),
                columns: c.data.column_count(),
            },
            ElementProps::Table(t) => Self::Table {
                rows: t.data.row_count(),
                columns: t.data.column_count(),
            },
            ElementProps::Timeline(t) => Self::Timeline {
                rows: t.data.row_count(),
            },
            _ => Self::Plain,
        }
    }

    /// One-shot delay this content adds on top of the base appear duration.
    pub fn extra_delay(self, cfg: &TimingConfig) -> u64 {
        let grid = |rows: usize, columns: usize| {
            cfg.grid_base_delay + (rows * columns) as u64 * cfg.grid_per_cell_delay
        };
        match self {
            Self::Plain => 0,
            Self::Callout => cfg.callout_delay,
            Self::Progress => cfg.progress_delay,
            Self::Chart { bar_or_line: true, .. } => 0,
            Self::Chart { rows, columns, .. } => grid(rows, columns),
            Self::Table { rows, .. } if rows >= cfg.list_row_threshold => cfg.list_long_delay,
            Self::Table { rows, columns } => grid(rows, columns),
            Self::Timeline { rows } if rows >= cfg.list_row_threshold => cfg.list_long_delay,
            Self::Timeline { rows } => {
                cfg.list_base_delay + rows.saturating_sub(1) as u64 * cfg.list_per_row_delay
            }
        }
    }
}

/// Appear and hide durations of one slide's reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RevealTiming {
    pub appear: Millis,
    pub hide: Millis,
}

/// Base durations grow per element; the largest content delay is added to `appear` only.
pub fn reveal_timing(contents: &[TimedContent], cfg: &TimingConfig) -> RevealTiming {
    let Some(extra_elements) = contents.len().checked_sub(1) else {
        return RevealTiming::default();
    };
    let n = extra_elements as u64;
    let extra = contents
        .iter()
        .map(|c| c.extra_delay(cfg))
        .max()
        .unwrap_or(0);
    RevealTiming {
        appear: Millis(cfg.appear_base + cfg.appear_per_element * n + extra),
        hide: Millis(cfg.hide_base + cfg.hide_per_element * n),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timing.rs"]
mod tests;
