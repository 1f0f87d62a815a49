use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    foundation::core::{ElementKey, Millis, Viewport},
    foundation::error::{SlideError, SlideResult},
    model::props::ElementProps,
};

/// Synthetic element id used for a slide's title.
pub const TITLE_ELEMENT_ID: i64 = -1;
/// Synthetic element id used for a slide's description.
pub const DESCRIPTION_ELEMENT_ID: i64 = -2;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete presentation document.
///
/// Presentations are plain data: they are loaded from JSON, validated, and then handed to a
/// [`crate::Player`] which materializes one slide at a time through the layout engine.
pub struct Presentation {
    /// Presentation identifier.
    #[serde(default)]
    pub id: i64,
    /// Optional human-facing name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Theme identifier consumed by styling collaborators.
    #[serde(default)]
    pub theme: String,
    /// Optional background image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Playback configuration.
    #[serde(default)]
    pub playback: PlaybackSettings,
    /// Ordered slides.
    pub slides: Vec<Slide>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
/// Per-presentation playback switches.
pub struct PlaybackSettings {
    /// Restart from the first slide after the last one.
    #[serde(default)]
    pub loop_playback: bool,
    /// Start auto-advancing as soon as the gates are passed.
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    /// The payload must be unlocked through the password gate first.
    #[serde(default)]
    pub password_protected: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_playback: false,
            autoplay: default_autoplay(),
            password_protected: false,
        }
    }
}

fn default_autoplay() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One slide: ordered elements plus optional title/description.
pub struct Slide {
    /// Slide identifier (stamped as `data-slideid`).
    pub id: i64,
    /// Optional title, materialized as a synthetic always-on-top element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description, materialized like the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Playback time in seconds; `None` or `0` means the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_time: Option<u32>,
    /// Ordered elements.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Slide {
    /// How long the slide stays on screen before auto-advancing.
    pub fn playback_duration(&self, default: Millis) -> Millis {
        match self.playback_time {
            Some(secs) if secs > 0 => Millis::from_secs(u64::from(secs)),
            _ => default,
        }
    }

    /// True when any widget element carries code without a signature.
    pub fn has_unsigned_widgets(&self) -> bool {
        self.elements.iter().any(|e| match e.props() {
            ElementProps::Widget(w) => w.is_unsigned(),
            _ => false,
        })
    }

    /// Title/description turned into synthetic elements placed ahead of everything else.
    pub fn meta_elements(&self) -> Vec<Element> {
        let mut out = Vec::with_capacity(2);
        let meta = [
            (TITLE_ELEMENT_ID, ElementKind::Title, 0, &self.title),
            (
                DESCRIPTION_ELEMENT_ID,
                ElementKind::Description,
                1,
                &self.description,
            ),
        ];
        for (id, kind, order, text) in meta {
            let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            out.push(Element {
                id,
                slide_id: self.id,
                kind,
                position: Position::Top,
                order,
                elevation: None,
                offset: None,
                properties: vec![Property::new("text", text)],
            });
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A typed visual element placed on a slide.
pub struct Element {
    /// Element identifier, unique within its slide. Negative ids are reserved.
    pub id: i64,
    /// Owning slide identifier.
    pub slide_id: i64,
    /// Element type tag.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Declared placement.
    pub position: Position,
    /// Sibling order among elements sharing a position.
    #[serde(default)]
    pub order: i32,
    /// Stacking hint; only meaningful for [`Position::Free`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<u32>,
    /// Recorded free-position offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
    /// Open-ended ordered name/value pairs.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Element {
    pub fn key(&self) -> ElementKey {
        ElementKey::new(self.slide_id, self.id)
    }

    /// Decode the property bag into the typed variant for this element's kind.
    pub fn props(&self) -> ElementProps {
        ElementProps::decode(&self.kind, &self.properties)
    }

    pub fn is_meta(&self) -> bool {
        matches!(self.kind, ElementKind::Title | ElementKind::Description)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Declared placement of an element on its slide.
pub enum Position {
    /// Per-element wrappers stacked at the top.
    Top,
    /// Shared column on the left.
    Left,
    /// Shared column on the right.
    Right,
    /// Per-element wrappers stacked at the bottom.
    Bottom,
    /// Shared centered flow.
    Center,
    /// Absolute placement outside the stack flow.
    Free,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Center => "center",
            Self::Free => "free",
        }
    }

    /// Left/right/center share a single container per slide.
    pub fn is_shared(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Center)
    }

    /// Only left/right columns force wrapping with separators.
    pub fn uses_separators(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn stack_class(self) -> String {
        format!("stack-{}", self.as_str())
    }

    /// Rank of the position's region among the slide's direct children.
    pub(crate) fn region_rank(self) -> u8 {
        match self {
            Self::Top => 0,
            Self::Left => 1,
            Self::Center => 2,
            Self::Right => 3,
            Self::Bottom => 4,
            Self::Free => 5,
        }
    }

    pub fn parse(s: &str) -> SlideResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "center" => Ok(Self::Center),
            "free" => Ok(Self::Free),
            other => Err(SlideError::validation(format!(
                "unknown element position '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Element type tag.
pub enum ElementKind {
    Text,
    Image,
    Chart,
    Map,
    Table,
    Timeline,
    Callout,
    Progress,
    Widget,
    /// Synthetic slide title.
    Title,
    /// Synthetic slide description.
    Description,
    /// Any tag this engine does not know; rendered through the fallback bag.
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Chart => "chart",
            Self::Map => "map",
            Self::Table => "table",
            Self::Timeline => "timeline",
            Self::Callout => "callout",
            Self::Progress => "progress",
            Self::Widget => "widget",
            Self::Title => "title",
            Self::Description => "description",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Free-position offset plus the viewport it was recorded against.
pub struct Offset {
    pub left: f64,
    pub top: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One name/value entry of an element's property bag.
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Presentation {
    /// Parse a presentation from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlideResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SlideError::serde(format!("parse presentation JSON: {e}")))
    }

    /// Parse a presentation from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlideResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlideError::validation(format!("open presentation JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> SlideResult<()> {
        let mut slide_ids = BTreeSet::new();
        for slide in &self.slides {
            if !slide_ids.insert(slide.id) {
                return Err(SlideError::validation(format!(
                    "duplicate slide id {}",
                    slide.id
                )));
            }
            let mut element_ids = BTreeSet::new();
            for element in &slide.elements {
                if element.id < 0 {
                    return Err(SlideError::validation(format!(
                        "slide {}: element id {} is reserved",
                        slide.id, element.id
                    )));
                }
                if element.slide_id != slide.id {
                    return Err(SlideError::validation(format!(
                        "element {} claims slide {} but lives on slide {}",
                        element.id, element.slide_id, slide.id
                    )));
                }
                if !element_ids.insert(element.id) {
                    return Err(SlideError::validation(format!(
                        "slide {}: duplicate element id {}",
                        slide.id, element.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn has_unsigned_widgets(&self) -> bool {
        self.slides.iter().any(Slide::has_unsigned_widgets)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/presentation.rs"]
mod tests;
