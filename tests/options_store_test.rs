// Options store: persistence, presets and upload validation

use qrcode_styler_wasm::config::{MAX_UPLOAD_BYTES, STORAGE_KEY};
use qrcode_styler_wasm::models::{CornerDotType, DotType, ErrorCorrectionLevel, ShapeType};
use qrcode_styler_wasm::store::{KeyValueStore, MemoryStorage, OptionsStore, StorageError, UploadError, UploadMeta};
use qrcode_styler_wasm::{OptionValue, StyleOptions};

/// Storage whose writes always fail (quota exceeded)
struct FullStorage;

impl KeyValueStore for FullStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed {
            key: key.to_string(),
            reason: "QuotaExceededError".to_string(),
        })
    }
}

fn customized(store: &mut OptionsStore<MemoryStorage>) {
    store.update(OptionValue::Shape(ShapeType::Circle));
    store.update(OptionValue::Size(650));
    store.update(OptionValue::MainShape(DotType::ClassyRounded));
    store.update(OptionValue::CornersDotShape(CornerDotType::Heart));
    store.update(OptionValue::ShapeColor("#123abc".to_string()));
    store.update(OptionValue::ErrorCorrectionLevel(ErrorCorrectionLevel::Q));
    store.update(OptionValue::ImageMargin(35));
}

#[test]
fn test_save_then_load_restores_the_saved_value() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    customized(&mut store);
    let saved = store.options().clone();
    store.save().expect("memory storage accepts writes");

    store.reset();
    assert_ne!(store.options(), &saved);
    store.load_saved();
    assert_eq!(store.options(), &saved);
}

#[test]
fn test_repeated_saves_keep_the_last_value() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    customized(&mut store);
    store.save().unwrap();
    let first = store.storage().get(STORAGE_KEY).unwrap();
    store.save().unwrap();
    assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), first);

    store.update(OptionValue::Size(900));
    store.save().unwrap();
    let latest = store.options().clone();
    assert_ne!(store.storage().get(STORAGE_KEY).unwrap(), first);

    store.reset();
    store.load_saved();
    assert_eq!(store.options(), &latest);
    assert_eq!(store.options().size, 900);
}

#[test]
fn test_saved_value_survives_a_new_session() {
    let mut first = OptionsStore::new(MemoryStorage::new());
    customized(&mut first);
    first.save().unwrap();
    let storage = first.storage().clone();

    let second = OptionsStore::new(storage);
    assert_eq!(second.options(), first.options());
}

#[test]
fn test_saved_json_uses_ui_units_and_engine_names() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    customized(&mut store);
    store.save().unwrap();

    let raw = store.storage().get(STORAGE_KEY).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["imageMargin"], 35);
    assert_eq!(json["mainShape"], "classy-rounded");
    assert_eq!(json["cornersDotShape"], "heart");
    assert_eq!(json["shape"], "circle");
}

#[test]
fn test_older_saved_values_are_read_leniently() {
    let raw = r#"{"shape":"circle","size":"750","removeBrand":"true","imageMargin":"20"}"#;
    let store = OptionsStore::new(MemoryStorage::new().with_entry(STORAGE_KEY, raw));
    let options = store.options();
    assert_eq!(options.shape, ShapeType::Circle);
    assert_eq!(options.size, 750);
    assert!(options.remove_brand);
    assert_eq!(options.image_margin, 20);
    // Missing fields come from the rich default
    assert_eq!(options.main_shape, StyleOptions::rich_default().main_shape);
}

#[test]
fn test_save_failure_is_reported() {
    let mut store = OptionsStore::new(FullStorage);
    let err = store.save().unwrap_err();
    assert!(matches!(err, StorageError::WriteFailed { .. }));
    assert_eq!(store.options(), &StyleOptions::rich_default());
}

#[test]
fn test_presets_ignore_prior_state() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    customized(&mut store);
    store.reset();
    assert_eq!(store.options(), &StyleOptions::rich_default());

    customized(&mut store);
    store.set_basic();
    assert_eq!(store.options(), &StyleOptions::basic());
}

#[test]
fn test_oversized_upload_is_rejected() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    let before = store.options().image.clone();
    let meta = UploadMeta {
        name: "huge.png".to_string(),
        mime: "image/png".to_string(),
        size: 3 * 1024 * 1024,
    };
    assert_eq!(store.begin_upload(&meta), Err(UploadError::TooLarge { size: 3 * 1024 * 1024 }));
    assert_eq!(store.upload_error(), Some("Error: Maximum file size is 2 MB"));
    assert_eq!(store.options().image, before);
}

#[test]
fn test_upload_at_the_limit_is_accepted() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    let meta = UploadMeta {
        name: "edge.webp".to_string(),
        mime: "image/webp".to_string(),
        size: MAX_UPLOAD_BYTES,
    };
    assert!(store.begin_upload(&meta).is_ok());
    store.finish_upload("data:image/webp;base64,UklGRg==".to_string());
    assert_eq!(store.options().image, "data:image/webp;base64,UklGRg==");
}

#[test]
fn test_text_upload_is_rejected() {
    let mut store = OptionsStore::new(MemoryStorage::new());
    let before = store.options().clone();
    let meta = UploadMeta {
        name: "notes.txt".to_string(),
        mime: "text/plain".to_string(),
        size: 10,
    };
    assert!(matches!(store.begin_upload(&meta), Err(UploadError::UnsupportedFormat { .. })));
    assert_eq!(store.upload_error(), Some("Error: File is not supported."));
    assert_eq!(store.options(), &before);
}
