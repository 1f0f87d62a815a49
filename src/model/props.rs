//! Typed views over an element's name/value property bag.
//!
//! Each element kind owns a fixed vocabulary of property names. Decoding picks the names it
//! knows, clamps numeric inputs into their valid ranges and ignores everything else; the ignored
//! entries stay reachable through [`PropertyBag`] so writers can round-trip them untouched.

use std::collections::BTreeMap;

use crate::model::presentation::{ElementKind, Property};

/// Vocabulary of a text element.
pub const TEXT_PROPERTIES: &[&str] = &[
    "text",
    "isRichText",
    "width",
    "signature",
    "textType",
    "fontSize",
    "isBold",
    "isItalic",
];
/// Vocabulary of a map element.
pub const MAP_PROPERTIES: &[&str] = &[
    "annotations",
    "type",
    "size",
    "color",
    "scale",
    "viewportLeft",
    "viewportTop",
];
pub const IMAGE_PROPERTIES: &[&str] = &["url", "rotation", "width"];
pub const CHART_PROPERTIES: &[&str] = &["chartType", "data", "title"];
pub const TABLE_PROPERTIES: &[&str] = &["data", "hasHeader"];
pub const TIMELINE_PROPERTIES: &[&str] = &["data"];
pub const CALLOUT_PROPERTIES: &[&str] = &["text", "icon"];
pub const PROGRESS_PROPERTIES: &[&str] = &["value", "label"];
pub const WIDGET_PROPERTIES: &[&str] = &["code", "signature"];
pub const META_PROPERTIES: &[&str] = &["text"];

/// Last-write-wins lookup over a property list.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PropertyBag {
    entries: BTreeMap<String, String>,
}

impl PropertyBag {
    pub fn from_properties(props: &[Property]) -> Self {
        let mut entries = BTreeMap::new();
        for p in props {
            entries.insert(p.name.clone(), p.value.clone());
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn string(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_owned()
    }

    fn opt_string(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }

    fn flag(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|v| v.trim().to_ascii_lowercase()),
            Some(v) if v == "true" || v == "1" || v == "yes"
        )
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    fn clamped(&self, name: &str, min: f64, max: f64) -> Option<f64> {
        self.number(name).map(|v| v.clamp(min, max))
    }

    fn grid(&self, name: &str) -> DataGrid {
        self.get(name).map(DataGrid::parse).unwrap_or_default()
    }

    /// Entries whose names are not in `vocabulary`.
    pub fn without(&self, vocabulary: &[&str]) -> PropertyBag {
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| !vocabulary.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { entries }
    }
}

/// Row-major cell grid decoded from a JSON array-of-arrays property.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DataGrid {
    pub rows: Vec<Vec<String>>,
}

impl DataGrid {
    /// Lenient decode: malformed JSON yields an empty grid, scalar cells are stringified.
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed data grid");
                return Self::default();
            }
        };
        let Some(rows) = value.as_array() else {
            return Self::default();
        };
        let rows = rows
            .iter()
            .map(|row| match row {
                serde_json::Value::Array(cells) => cells.iter().map(cell_to_string).collect(),
                other => vec![cell_to_string(other)],
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextProps {
    pub text: String,
    pub is_rich_text: bool,
    /// Width in percent of the slide, `[1, 100]`.
    pub width: Option<f64>,
    pub signature: Option<String>,
    pub text_type: Option<String>,
    /// Font size in px, `[6, 200]`.
    pub font_size: Option<f64>,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Entries outside the kind's vocabulary, passed through untouched.
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageProps {
    pub url: String,
    /// Rotation in degrees, `[0, 360]`.
    pub rotation: f64,
    pub width: Option<f64>,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChartProps {
    pub chart_type: String,
    pub data: DataGrid,
    pub title: Option<String>,
    pub extra: PropertyBag,
}

impl ChartProps {
    /// Bar and line charts animate their own series and need no extra reveal delay.
    pub fn is_bar_or_line(&self) -> bool {
        let t = self.chart_type.to_ascii_lowercase();
        t.contains("bar") || t.contains("line")
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MapProps {
    /// Raw annotation list (JSON) handed through to the renderer.
    pub annotations: Option<String>,
    pub map_type: Option<String>,
    pub size: Option<f64>,
    pub color: Option<String>,
    /// Zoom scale, `[0.1, 10]`.
    pub scale: f64,
    /// Viewport origin in percent, `[0, 100]`.
    pub viewport_left: f64,
    pub viewport_top: f64,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TableProps {
    pub data: DataGrid,
    pub has_header: bool,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineProps {
    pub data: DataGrid,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CalloutProps {
    pub text: String,
    pub icon: Option<String>,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProgressProps {
    /// Percent complete, `[0, 100]`.
    pub value: f64,
    pub label: Option<String>,
    pub extra: PropertyBag,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct WidgetProps {
    pub code: String,
    pub signature: Option<String>,
    pub extra: PropertyBag,
}

impl WidgetProps {
    pub fn is_unsigned(&self) -> bool {
        !self.code.trim().is_empty() && self.signature.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MetaProps {
    pub text: String,
    pub extra: PropertyBag,
}

/// Typed property variant per element kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ElementProps {
    Text(TextProps),
    Image(ImageProps),
    Chart(ChartProps),
    Map(MapProps),
    Table(TableProps),
    Timeline(TimelineProps),
    Callout(CalloutProps),
    Progress(ProgressProps),
    Widget(WidgetProps),
    Title(MetaProps),
    Description(MetaProps),
    /// Unknown element kind: the whole bag is passed through.
    Unknown(PropertyBag),
}

impl ElementProps {
    pub fn decode(kind: &ElementKind, props: &[Property]) -> Self {
        let bag = PropertyBag::from_properties(props);
        let extra = bag.without(Self::vocabulary(kind));
        match kind {
            ElementKind::Text => Self::Text(TextProps {
                text: bag.string("text"),
                is_rich_text: bag.flag("isRichText"),
                width: bag.clamped("width", 1.0, 100.0),
                signature: bag.opt_string("signature"),
                text_type: bag.opt_string("textType"),
                font_size: bag.clamped("fontSize", 6.0, 200.0),
                is_bold: bag.flag("isBold"),
                is_italic: bag.flag("isItalic"),
                extra,
            }),
            ElementKind::Image => Self::Image(ImageProps {
                url: bag.string("url"),
                rotation: bag.clamped("rotation", 0.0, 360.0).unwrap_or(0.0),
                width: bag.clamped("width", 1.0, 100.0),
                extra,
            }),
            ElementKind::Chart => Self::Chart(ChartProps {
                chart_type: bag.opt_string("chartType").unwrap_or_else(|| "bar".to_owned()),
                data: bag.grid("data"),
                title: bag.opt_string("title"),
                extra,
            }),
            ElementKind::Map => Self::Map(MapProps {
                annotations: bag.opt_string("annotations"),
                map_type: bag.opt_string("type"),
                size: bag.clamped("size", 0.0, f64::MAX),
                color: bag.opt_string("color"),
                scale: bag.clamped("scale", 0.1, 10.0).unwrap_or(1.0),
                viewport_left: bag.clamped("viewportLeft", 0.0, 100.0).unwrap_or(0.0),
                viewport_top: bag.clamped("viewportTop", 0.0, 100.0).unwrap_or(0.0),
                extra,
            }),
            ElementKind::Table => Self::Table(TableProps {
                data: bag.grid("data"),
                has_header: bag.flag("hasHeader"),
                extra,
            }),
            ElementKind::Timeline => Self::Timeline(TimelineProps {
                data: bag.grid("data"),
                extra,
            }),
            ElementKind::Callout => Self::Callout(CalloutProps {
                text: bag.string("text"),
                icon: bag.opt_string("icon"),
                extra,
            }),
            ElementKind::Progress => Self::Progress(ProgressProps {
                value: bag.clamped("value", 0.0, 100.0).unwrap_or(0.0),
                label: bag.opt_string("label"),
                extra,
            }),
            ElementKind::Widget => Self::Widget(WidgetProps {
                code: bag.string("code"),
                signature: bag.opt_string("signature"),
                extra,
            }),
            ElementKind::Title => Self::Title(MetaProps {
                text: bag.string("text"),
                extra,
            }),
            ElementKind::Description => Self::Description(MetaProps {
                text: bag.string("text"),
                extra,
            }),
            ElementKind::Unknown => Self::Unknown(bag),
        }
    }

    /// The fixed vocabulary a kind reads; empty for unknown kinds.
    pub fn vocabulary(kind: &ElementKind) -> &'static [&'static str] {
        match kind {
            ElementKind::Text => TEXT_PROPERTIES,
            ElementKind::Image => IMAGE_PROPERTIES,
            ElementKind::Chart => CHART_PROPERTIES,
            ElementKind::Map => MAP_PROPERTIES,
            ElementKind::Table => TABLE_PROPERTIES,
            ElementKind::Timeline => TIMELINE_PROPERTIES,
            ElementKind::Callout => CALLOUT_PROPERTIES,
            ElementKind::Progress => PROGRESS_PROPERTIES,
            ElementKind::Widget => WIDGET_PROPERTIES,
            ElementKind::Title | ElementKind::Description => META_PROPERTIES,
            ElementKind::Unknown => &[],
        }
    }

    /// Entries the decoded kind does not read; the whole bag for unknown kinds.
    pub fn extra(&self) -> &PropertyBag {
        match self {
            Self::Text(p) => &p.extra,
            Self::Image(p) => &p.extra,
            Self::Chart(p) => &p.extra,
            Self::Map(p) => &p.extra,
            Self::Table(p) => &p.extra,
            Self::Timeline(p) => &p.extra,
            Self::Callout(p) => &p.extra,
            Self::Progress(p) => &p.extra,
            Self::Widget(p) => &p.extra,
            Self::Title(p) | Self::Description(p) => &p.extra,
            Self::Unknown(bag) => bag,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/props.rs"]
mod tests;
