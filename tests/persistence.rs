use futures::executor::block_on;
use futures::future::BoxFuture;
use sprite_paint::command::Command;
use sprite_paint::config::EditorConfig;
use sprite_paint::document::Document;
use sprite_paint::state::{
    EditorContext, KeyValueStore, MemoryStore, PersistenceAdapter, PersistenceError,
    PersistenceResult,
};
use image::Rgba;
use std::sync::Arc;

const KEY: &str = "pixel-art-app";

/// A store whose backend is always down
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, PersistenceResult<Option<String>>> {
        Box::pin(async { Err(PersistenceError::Store("offline".to_owned())) })
    }

    fn set<'a>(&'a self, _key: &'a str, _value: String) -> BoxFuture<'a, PersistenceResult<()>> {
        Box::pin(async { Err(PersistenceError::Store("offline".to_owned())) })
    }
}

fn sample_document() -> Document {
    let mut ctx = EditorContext::new(EditorConfig {
        canvas_width: 5,
        canvas_height: 3,
        ..EditorConfig::default()
    });
    ctx.execute(Command::AddLayer).unwrap();
    ctx.execute(Command::AddFrame).unwrap();
    ctx.execute(Command::ToggleLayerVisibility(0)).unwrap();
    ctx.select_tool("circle");

    let mut raster = ctx.document.blank_raster();
    raster.put(4, 2, Rgba([1, 2, 3, 4]));
    raster.put(0, 0, Rgba([255, 128, 0, 255]));
    ctx.document.set_raster(1, 1, raster.into_ref()).unwrap();
    ctx.document
}

#[test]
fn test_save_then_load_round_trips() {
    let store = Arc::new(MemoryStore::new());
    let adapter = PersistenceAdapter::new(store.clone(), KEY);
    let document = sample_document();

    block_on(adapter.save(&document));
    assert_eq!(store.len(), 1);

    let loaded = block_on(adapter.load()).unwrap();
    assert_eq!(loaded, document);
    assert_eq!(loaded.tool(), "circle");
    assert!(loaded.layers()[0].hidden);
}

#[test]
fn test_missing_document_loads_as_none() {
    let adapter = PersistenceAdapter::new(Arc::new(MemoryStore::new()), KEY);
    assert!(block_on(adapter.load()).is_none());
}

#[test]
fn test_corrupt_document_is_not_fatal() {
    let store = Arc::new(MemoryStore::new());
    block_on(store.set(KEY, "{\"width\": 4".to_owned())).unwrap();
    let adapter = PersistenceAdapter::new(store, KEY);

    assert!(matches!(
        block_on(adapter.try_load()),
        Err(PersistenceError::Serialization(_))
    ));
    assert!(block_on(adapter.load()).is_none());
}

#[test]
fn test_backend_failures_are_absorbed() {
    let adapter = PersistenceAdapter::new(Arc::new(BrokenStore), KEY);
    block_on(adapter.save(&Document::default()));
    assert!(block_on(adapter.load()).is_none());
    assert!(block_on(adapter.try_save(&Document::default())).is_err());
}

#[test]
fn test_last_save_wins() {
    let store = Arc::new(MemoryStore::new());
    let adapter = PersistenceAdapter::new(store, KEY);
    let first = Document::new(2, 2);
    let second = sample_document();

    block_on(adapter.save(&first));
    block_on(adapter.save(&second));
    assert_eq!(block_on(adapter.load()).unwrap(), second);
}

#[test]
fn test_persisted_field_names() {
    let json = sprite_paint::state::encode_document(&Document::new(2, 2)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    for field in [
        "width",
        "height",
        "frameCount",
        "layers",
        "activeLayerIndex",
        "activeFrameIndex",
        "tool",
    ] {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    assert!(value["layers"][0].get("hidden").is_some());
    assert!(value["layers"][0].get("frames").is_some());
}
