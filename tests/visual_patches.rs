//! Composer visual patches applied to binder documents

use docaccess::constants::DATE_CHANGED_MARKER;
use docaccess::*;
use serde_json::{json, Value};

fn binder_json() -> Value {
    json!({
        "id": "binder-1",
        "thumbnail": {
            "medium": "https://images.example.com/img-a/medium",
            "thumbnail": "https://images.example.com/img-a/thumbnail",
            "fitBehaviour": "crop",
            "bgColor": "#ffffff"
        },
        "modules": {
            "images": {
                "chunked": [{
                    "key": "i1",
                    "chunks": [
                        [
                            { "id": "img-a", "url": "https://images.example.com/img-a", "fitBehaviour": "fit" },
                            { "id": "img-b", "url": "https://images.example.com/img-b" }
                        ],
                        [],
                        [{ "url": "https://images.example.com/img-legacy/original" }]
                    ]
                }]
            },
            "meta": [
                { "key": "t1", "type": "text", "lastModifiedDate": "2020-01-01" },
                { "key": "i1", "type": "images" }
            ]
        }
    })
}

fn binder(doc: &Value) -> Binder {
    serde_json::from_value(doc.clone()).unwrap()
}

fn chunks(doc: &Value) -> &Value {
    &doc["modules"]["images"]["chunked"][0]["chunks"]
}

#[test]
fn insert_then_remove_restores_chunks() {
    let doc = binder_json();
    let visual = BinderVisual::new("img-new", "https://images.example.com/img-new");

    for (chunk, position) in [(0, 0), (0, 1), (0, 2), (1, 0), (2, 1)] {
        let inserted = apply_patch(&doc, &patch_image_into_position(&visual, 0, chunk, position).unwrap()).unwrap();
        assert_eq!(chunks(&inserted)[chunk][position]["id"], json!("img-new"));
        let removed = apply_patch(&inserted, &patch_image_remove(0, chunk, position)).unwrap();
        assert_eq!(chunks(&removed), chunks(&doc));
        assert_eq!(removed, doc);
    }
}

#[test]
fn insert_past_the_end_is_rejected() {
    let doc = binder_json();
    let visual = BinderVisual::new("img-new", "u");
    let patch = patch_image_into_position(&visual, 0, 1, 3).unwrap();
    assert!(apply_patch(&doc, &patch).is_err());
}

#[test]
fn fields_outside_the_snapshot_survive() {
    let doc = binder_json();
    let b = binder(&doc);
    let patch = patch_image_move(&b, 0, (0, 1), (1, 0)).unwrap();
    let moved = apply_patch(&doc, &patch).unwrap();
    assert_eq!(moved["id"], json!("binder-1"));
    assert_eq!(moved["modules"]["images"]["chunked"][0]["key"], json!("i1"));
    assert_eq!(chunks(&moved)[1][0]["id"], json!("img-b"));
    assert_eq!(chunks(&moved)[0].as_array().unwrap().len(), 1);
}

#[test]
fn replace_updates_every_position_and_thumbnail() {
    let mut doc = binder_json();
    doc["modules"]["images"]["chunked"][0]["chunks"][1] = json!([{ "id": "img-a", "url": "https://images.example.com/img-a" }]);
    let b = binder(&doc);
    let old = Visual { id: "img-a".into(), url: "https://images.example.com/img-a".into(), kind: VisualKind::Image, bg_color: Some("#000000".into()), fit_behaviour: None };
    let new = Visual { id: "img-z".into(), url: "https://images.example.com/img-z".into(), kind: VisualKind::Image, bg_color: None, fit_behaviour: None };

    let patch = patch_replace_visual(&b, 0, &[(0, 0), (1, 0)], &old, &new).unwrap();
    let out = apply_patch(&doc, &patch).unwrap();
    assert_eq!(chunks(&out)[0][0]["id"], json!("img-z"));
    assert_eq!(chunks(&out)[0][0]["fitBehaviour"], json!("fit"));
    assert_eq!(chunks(&out)[1][0]["id"], json!("img-z"));
    assert_eq!(chunks(&out)[1][0]["bgColor"], json!("#000000"));
    assert_eq!(out["thumbnail"]["medium"], json!("https://images.example.com/img-z"));
    assert_eq!(out["thumbnail"]["fitBehaviour"], json!("crop"));

    assert!(patch_replace_visual(&b, 0, &[(5, 0)], &old, &new).is_err());
}

#[test]
fn edit_props_match_legacy_visuals_by_url() {
    let doc = binder_json();
    let b = binder(&doc);
    let mut props = serde_json::Map::new();
    props.insert("rotation".into(), json!(90));

    let out = apply_patch(&doc, &patch_image_edit_props(&b, 0, "img-legacy", &props)).unwrap();
    assert_eq!(chunks(&out)[2][0]["rotation"], json!(90));
    assert!(chunks(&out)[0][0].get("rotation").is_none());
    assert!(out["thumbnail"].get("rotation").is_none());
    for meta in out["modules"]["meta"].as_array().unwrap() {
        assert_eq!(meta["lastModifiedDate"], json!(DATE_CHANGED_MARKER));
    }
}

#[test]
fn merged_patches_apply_together() {
    let doc = binder_json();
    let b = binder(&doc);
    let patch = merge_patches(&[
        patch_image_remove(0, 0, 1),
        patch_all_text_meta_timestamps(&b, Some("2024-05-01")),
    ]);
    let out = apply_patch(&doc, &patch).unwrap();
    assert_eq!(chunks(&out)[0].as_array().unwrap().len(), 1);
    assert_eq!(out["modules"]["meta"][0]["lastModifiedDate"], json!("2024-05-01"));
    assert_eq!(out["modules"]["meta"][1]["type"], json!("images"));
}
