use crate::{
    foundation::core::{Size, Viewport},
    foundation::error::{SlideError, SlideResult},
    model::presentation::Element,
    model::props::ElementProps,
};

/// What a renderer produced for one element: its intrinsic box and a textual content summary.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderOutput {
    pub size: Size,
    pub content: String,
}

/// Turns an element's typed properties into visible content.
///
/// The layout engine calls this after positioning. An `Err` does not abort the slide: the engine
/// replaces the element's content with inline error text and keeps going.
pub trait ElementRenderer {
    fn render(
        &mut self,
        element: &Element,
        props: &ElementProps,
        viewport: Viewport,
    ) -> SlideResult<RenderOutput>;
}

/// Deterministic renderer with no drawing surface. Sizes derive from content metrics and the
/// viewport, which keeps geometry reproducible in tests and in the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderRenderer;

const CHAR_WIDTH: f64 = 9.0;
const ROW_HEIGHT: f64 = 28.0;
const COLUMN_WIDTH: f64 = 90.0;

impl ElementRenderer for PlaceholderRenderer {
    fn render(
        &mut self,
        _element: &Element,
        props: &ElementProps,
        viewport: Viewport,
    ) -> SlideResult<RenderOutput> {
        let vw = viewport.width.max(1.0);
        let vh = viewport.height.max(1.0);
        let out = match props {
            ElementProps::Title(meta) => RenderOutput {
                size: Size::new(text_width(&meta.text, 14.0, vw * 0.8), 48.0),
                content: meta.text.clone(),
            },
            ElementProps::Description(meta) => RenderOutput {
                size: Size::new(text_width(&meta.text, 8.0, vw * 0.8), 28.0),
                content: meta.text.clone(),
            },
            ElementProps::Text(t) => {
                let font = t.font_size.unwrap_or(16.0);
                let natural = t.text.chars().count() as f64 * font * 0.55 + 20.0;
                let width = match t.width {
                    Some(pct) => vw * pct / 100.0,
                    None => natural.min(vw * 0.6),
                };
                let lines = (natural / width.max(1.0)).ceil().max(1.0);
                RenderOutput {
                    size: Size::new(width, lines * font * 1.5),
                    content: t.text.clone(),
                }
            }
            ElementProps::Image(img) => {
                let width = vw * img.width.unwrap_or(30.0) / 100.0;
                RenderOutput {
                    size: Size::new(width, width * 0.75),
                    content: format!("image {} rotated {}deg", img.url, img.rotation),
                }
            }
            ElementProps::Chart(chart) => RenderOutput {
                size: Size::new(vw * 0.4, vh * 0.35),
                content: format!(
                    "{} chart {}x{}",
                    chart.chart_type,
                    chart.data.row_count(),
                    chart.data.column_count()
                ),
            },
            ElementProps::Map(map) => RenderOutput {
                size: Size::new(vw * 0.4, vh * 0.4),
                content: format!(
                    "map {} at {}%/{}% x{}",
                    map.map_type.as_deref().unwrap_or("world"),
                    map.viewport_left,
                    map.viewport_top,
                    map.scale
                ),
            },
            ElementProps::Table(table) => {
                let rows = table.data.row_count().max(1) as f64;
                let cols = table.data.column_count().max(1) as f64;
                RenderOutput {
                    size: Size::new((cols * COLUMN_WIDTH).min(vw * 0.9), rows * ROW_HEIGHT),
                    content: format!("table {}x{}", rows, cols),
                }
            }
            ElementProps::Timeline(timeline) => {
                let rows = timeline.data.row_count();
                RenderOutput {
                    size: Size::new(vw * 0.6, (60.0 + rows as f64 * 10.0).min(vh * 0.5)),
                    content: format!("timeline with {rows} entries"),
                }
            }
            ElementProps::Callout(callout) => RenderOutput {
                size: Size::new(text_width(&callout.text, 8.0, vw * 0.5) + 40.0, 64.0),
                content: callout.text.clone(),
            },
            ElementProps::Progress(progress) => RenderOutput {
                size: Size::new(200.0, 40.0),
                content: format!("{}%", progress.value),
            },
            ElementProps::Widget(widget) => {
                check_widget_code(&widget.code)?;
                RenderOutput {
                    size: Size::new(240.0, 160.0),
                    content: format!("widget ({} bytes)", widget.code.len()),
                }
            }
            ElementProps::Unknown(bag) => RenderOutput {
                size: Size::new(120.0, 40.0),
                content: format!("unknown element ({} properties)", bag.len()),
            },
        };
        Ok(out)
    }
}

fn text_width(text: &str, per_char: f64, max: f64) -> f64 {
    (text.chars().count() as f64 * per_char + 20.0).min(max)
}

/// Stand-in for executing custom widget code: unbalanced delimiters count as a thrown error.
fn check_widget_code(code: &str) -> SlideResult<()> {
    let mut open = Vec::new();
    for (i, c) in code.char_indices() {
        match c {
            '(' | '[' | '{' => open.push(c),
            ')' | ']' | '}' => {
                let want = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if open.pop() != Some(want) {
                    return Err(SlideError::render(format!(
                        "widget code: unexpected '{c}' at byte {i}"
                    )));
                }
            }
            _ => {}
        }
    }
    match open.last() {
        Some(c) => Err(SlideError::render(format!("widget code: unclosed '{c}'"))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/element.rs"]
mod tests;
