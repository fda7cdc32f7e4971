//! The slice of a binder document the visual patches look at

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::wire_enum;

wire_enum!(VisualKind { Image = 0, Video = 1 });

/// A visual placed in an image chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BinderVisual {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_behaviour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_play: Option<bool>,
}

impl BinderVisual {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        BinderVisual { id: Some(id.into()), url: url.into(), ..Default::default() }
    }
}

/// Cover image of a binder, one url per rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub medium: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiny: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_behaviour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Thumbnail {
    /// Every rendition url that is set
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(Some(self.medium.as_str()))
            .chain(
                [&self.original, &self.thumbnail, &self.medium2, &self.big, &self.huge, &self.tiny]
                    .into_iter()
                    .map(|u| u.as_deref()),
            )
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageChunks {
    #[serde(default)]
    pub chunks: Vec<Vec<BinderVisual>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageModules {
    #[serde(default)]
    pub chunked: Vec<ImageChunks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BinderModules {
    #[serde(default)]
    pub images: ImageModules,
    /// Per-language module metadata, kept opaque
    #[serde(default)]
    pub meta: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Binder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub modules: BinderModules,
}

impl Binder {
    /// Visual at a module/chunk/position, if present
    pub fn visual(&self, module_index: usize, chunk_index: usize, visual_index: usize) -> Option<&BinderVisual> {
        self.modules
            .images
            .chunked
            .get(module_index)?
            .chunks
            .get(chunk_index)?
            .get(visual_index)
    }
}

/// A visual as uploaded to the image service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visual {
    pub id: String,
    pub url: String,
    pub kind: VisualKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_behaviour: Option<String>,
}

impl Visual {
    /// Video visuals are flagged by kind, older ones only by their id prefix
    pub fn is_video(&self) -> bool {
        self.kind == VisualKind::Video || self.id.starts_with("vid-")
    }
}
