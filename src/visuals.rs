//! Composer patches for the visuals of a binder
//!
//! Every function returns a patch for [`crate::patch::apply_patch`]; none of
//! them touch the binder itself. Coordinates are (module, chunk, position)
//! inside `modules.images.chunked`.

use serde_json::{json, Map, Value};

use crate::binder::{Binder, BinderVisual, Thumbnail, Visual};
use crate::constants::DATE_CHANGED_MARKER;
use crate::error::{AccessError, Result};
use crate::patch::merge_patches;

fn chunk_patch(module_index: usize, chunk_index: usize, command: Value) -> Value {
    json!({ "modules": { "images": { "chunked": {
        module_index.to_string(): { "chunks": { chunk_index.to_string(): command } }
    } } } })
}

fn visual_patch(module_index: usize, chunk_index: usize, visual_index: usize, command: Value) -> Value {
    chunk_patch(module_index, chunk_index, json!({ visual_index.to_string(): command }))
}

fn missing(module_index: usize, chunk_index: usize, visual_index: usize) -> AccessError {
    AccessError::InvalidPatch(format!(
        "no visual at module {} chunk {} position {}",
        module_index, chunk_index, visual_index
    ))
}

fn to_value(visual: &BinderVisual) -> Result<Value> {
    Ok(serde_json::to_value(visual)?)
}

fn set_each(props: &Map<String, Value>) -> Value {
    Value::Object(props.iter().map(|(k, v)| (k.clone(), json!({ "$set": v }))).collect())
}

/// Insert `visual` before `visual_index` in one chunk
pub fn patch_image_into_position(
    visual: &BinderVisual,
    module_index: usize,
    chunk_index: usize,
    visual_index: usize,
) -> Result<Value> {
    let splice = json!([visual_index, 0, to_value(visual)?]);
    Ok(chunk_patch(module_index, chunk_index, json!({ "$splice": [splice] })))
}

/// Remove the visual at `visual_index` of one chunk
pub fn patch_image_remove(module_index: usize, chunk_index: usize, visual_index: usize) -> Value {
    chunk_patch(module_index, chunk_index, json!({ "$splice": [[visual_index, 1]] }))
}

/// Move a visual between two (chunk, position) coordinates of one module.
///
/// The destination position applies after the removal. Within one chunk both
/// splices run in order on the same list.
pub fn patch_image_move(
    binder: &Binder,
    module_index: usize,
    from: (usize, usize),
    to: (usize, usize),
) -> Result<Value> {
    let (from_chunk, from_index) = from;
    let (to_chunk, to_index) = to;
    let visual = binder
        .visual(module_index, from_chunk, from_index)
        .ok_or_else(|| missing(module_index, from_chunk, from_index))?;
    let remove = json!([from_index, 1]);
    let insert = json!([to_index, 0, to_value(visual)?]);

    let chunks = if from_chunk == to_chunk {
        json!({ from_chunk.to_string(): { "$splice": [remove, insert] } })
    } else {
        json!({
            from_chunk.to_string(): { "$splice": [remove] },
            to_chunk.to_string(): { "$splice": [insert] },
        })
    };
    Ok(json!({ "modules": { "images": { "chunked": {
        module_index.to_string(): { "chunks": chunks }
    } } } }))
}

/// Replace `old` by `new` at each (chunk, position) of one module.
///
/// Presentation settings of the placed visual survive; missing colour and fit
/// fall back to those of `old`. A binder thumbnail showing `old` follows along
/// unless `new` is a video.
pub fn patch_replace_visual(
    binder: &Binder,
    module_index: usize,
    positions: &[(usize, usize)],
    old: &Visual,
    new: &Visual,
) -> Result<Value> {
    let mut patches = Vec::with_capacity(positions.len() + 1);
    for &(chunk_index, visual_index) in positions {
        let existing = binder
            .visual(module_index, chunk_index, visual_index)
            .ok_or_else(|| missing(module_index, chunk_index, visual_index))?;
        let mut merged = Map::new();
        merged.insert("id".into(), json!(new.id));
        merged.insert("url".into(), json!(new.url));
        let fields = [
            ("fitBehaviour", existing.fit_behaviour.clone().map(Value::from)),
            ("bgColor", existing.bg_color.clone().or_else(|| old.bg_color.clone()).map(Value::from)),
            ("languageCodes", existing.language_codes.clone().map(Value::from)),
            ("audioEnabled", existing.audio_enabled.map(Value::from)),
            ("autoPlay", existing.auto_play.map(Value::from)),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                merged.insert(key.into(), value);
            }
        }
        patches.push(visual_patch(module_index, chunk_index, visual_index, json!({ "$merge": merged })));
    }

    if let Some(thumbnail) = &binder.thumbnail {
        if thumbnail_has_id(thumbnail, &old.id) && !new.is_video() {
            let bg_color = thumbnail.bg_color.clone().or_else(|| old.bg_color.clone());
            let fit_behaviour = thumbnail.fit_behaviour.clone().or_else(|| old.fit_behaviour.clone());
            patches.push(json!({ "thumbnail": {
                "medium": { "$set": new.url },
                "bgColor": { "$set": bg_color },
                "fitBehaviour": { "$set": fit_behaviour },
            } }));
        }
    }
    Ok(merge_patches(&patches))
}

/// Set `props` on every placement of an image in one module, and on the
/// thumbnail when it shows that image. Visuals without an id match on url.
pub fn patch_image_edit_props(
    binder: &Binder,
    module_index: usize,
    image_id: &str,
    props: &Map<String, Value>,
) -> Value {
    let mut patches = Vec::new();
    if binder.thumbnail.as_ref().is_some_and(|t| thumbnail_has_id(t, image_id)) {
        patches.push(json!({ "thumbnail": set_each(props) }));
    }
    let chunks = binder
        .modules
        .images
        .chunked
        .get(module_index)
        .map(|m| m.chunks.as_slice())
        .unwrap_or_default();
    for (chunk_index, chunk) in chunks.iter().enumerate() {
        for (visual_index, visual) in chunk.iter().enumerate() {
            let matches = match &visual.id {
                Some(id) => id == image_id,
                None => visual.url.contains(image_id),
            };
            if matches {
                patches.push(visual_patch(module_index, chunk_index, visual_index, set_each(props)));
            }
        }
    }
    patches.push(patch_all_text_meta_timestamps(binder, None));
    merge_patches(&patches)
}

/// Set `props` on one visual, chunk 0 being the thumbnail and chunk `n` the
/// `n - 1`th image chunk
pub fn patch_image_edit_props_at_index(
    binder: &Binder,
    module_index: usize,
    chunk_index: usize,
    visual_index: usize,
    props: &Map<String, Value>,
) -> Result<Value> {
    let patch = match chunk_index.checked_sub(1) {
        None => {
            if binder.thumbnail.is_none() {
                return Err(AccessError::InvalidPatch("binder has no thumbnail".into()));
            }
            json!({ "thumbnail": set_each(props) })
        }
        Some(chunk) => {
            binder
                .visual(module_index, chunk, visual_index)
                .ok_or_else(|| missing(module_index, chunk, visual_index))?;
            visual_patch(module_index, chunk, visual_index, set_each(props))
        }
    };
    Ok(merge_patches(&[patch, patch_all_text_meta_timestamps(binder, None)]))
}

/// Stamp `lastModifiedDate` on every module meta entry. Without a date the
/// server-side marker is written and resolved on save.
pub fn patch_all_text_meta_timestamps(binder: &Binder, date: Option<&str>) -> Value {
    let date = date.unwrap_or(DATE_CHANGED_MARKER);
    let meta: Map<String, Value> = (0..binder.modules.meta.len())
        .map(|i| (i.to_string(), json!({ "$merge": { "lastModifiedDate": date } })))
        .collect();
    json!({ "modules": { "meta": meta } })
}

/// Whether any rendition of the thumbnail points at the image
pub fn thumbnail_has_id(thumbnail: &Thumbnail, id: &str) -> bool {
    thumbnail.urls().any(|url| url.contains(id))
}
