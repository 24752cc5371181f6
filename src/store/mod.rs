//! Options store
//!
//! Owns the single `StyleOptions` value of a session. Every mutation goes
//! through this type; subscribers (the render bridge) are notified after
//! each change.
//!
//! - `storage`: key/value persistence (`localStorage` or in-memory)
//! - `upload`: logo upload validation

pub mod storage;
pub mod upload;

pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage, SessionStorage, StorageError};
pub use upload::{validate_upload, UploadError, UploadMeta};

use crate::config::{DEFAULT_BRAND, STORAGE_KEY};
use crate::models::{FieldInput, OptionValue, OptionsPatch, StyleOptions};

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StyleOptions)>;

/// State container for the session's style options
pub struct OptionsStore<S: KeyValueStore> {
    options: StyleOptions,
    storage: S,
    /// Last upload validation/decoding message (never persisted)
    upload_error: Option<String>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> OptionsStore<S> {
    /// Start from the saved style if there is one, else the rich default
    pub fn new(storage: S) -> Self {
        let options = read_saved(&storage).unwrap_or_else(StyleOptions::rich_default);
        Self {
            options,
            storage,
            upload_error: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current value
    pub fn options(&self) -> &StyleOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Replace one field
    pub fn update(&mut self, value: OptionValue) {
        log::debug!("update {}", value.field_name());
        let next = self.options.normalize(&OptionsPatch::from(value));
        self.replace(next);
    }

    /// Merge a partial update
    pub fn apply_patch(&mut self, patch: &OptionsPatch) {
        let next = self.options.normalize(patch);
        self.replace(next);
    }

    /// Apply a raw form field change
    pub fn apply_field(&mut self, name: &str, input: &FieldInput) {
        let next = self.options.apply_field(name, input);
        if next != self.options {
            self.replace(next);
        }
    }

    /// Back to the rich default
    pub fn reset(&mut self) {
        log::info!("Resetting style to the default");
        self.replace(StyleOptions::rich_default());
    }

    /// Switch to the plain black-and-white style
    pub fn set_basic(&mut self) {
        log::info!("Switching to the basic style");
        self.replace(StyleOptions::basic());
    }

    /// Persist the current value under `STORAGE_KEY`
    pub fn save(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.options)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set(STORAGE_KEY, &json)?;
        log::info!("Saved style ({} bytes)", json.len());
        Ok(())
    }

    /// Restore the saved value; does nothing if nothing usable is saved
    pub fn load_saved(&mut self) {
        match read_saved(&self.storage) {
            Some(saved) => {
                log::info!("Loaded saved style");
                self.replace(saved);
            }
            None => log::debug!("No saved style to load"),
        }
    }

    /// Set the center logo (preset path or decoded upload)
    pub fn set_image(&mut self, path: impl Into<String>) {
        self.update(OptionValue::Image(path.into()));
    }

    /// Back to the default brand logo, clearing any upload error
    pub fn reset_image(&mut self) {
        self.upload_error = None;
        self.set_image(DEFAULT_BRAND);
    }

    /// Validate a selected file before decoding starts.
    ///
    /// On rejection the message is kept for display and the options are left
    /// alone. On success the caller decodes the file and reports back with
    /// `finish_upload` or `fail_upload`.
    pub fn begin_upload(&mut self, meta: &UploadMeta) -> Result<(), UploadError> {
        self.upload_error = None;
        if let Err(err) = validate_upload(meta) {
            log::warn!("Rejected upload '{}': {:?}", meta.name, err);
            self.upload_error = Some(err.to_string());
            return Err(err);
        }
        log::debug!("Accepted upload '{}' ({} bytes)", meta.name, meta.size);
        Ok(())
    }

    /// A decode finished; the last one to finish wins
    pub fn finish_upload(&mut self, data_uri: String) {
        self.set_image(data_uri);
    }

    /// A decode failed
    pub fn fail_upload(&mut self, reason: &str) {
        log::warn!("Upload decoding failed: {}", reason);
        self.upload_error = Some(format!("Failed: {}", reason));
    }

    /// Message to show under the file input, if any
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn clear_upload_error(&mut self) {
        self.upload_error = None;
    }

    /// Register a change listener
    pub fn subscribe(&mut self, callback: impl FnMut(&StyleOptions) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a change listener; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn replace(&mut self, next: StyleOptions) {
        self.options = next;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.options);
        }
    }
}

/// Decode the saved style. Malformed JSON is treated like a missing key.
fn read_saved<S: KeyValueStore>(storage: &S) -> Option<StyleOptions> {
    let raw = storage.get(STORAGE_KEY)?;
    match serde_json::from_str::<StyleOptions>(&raw) {
        Ok(options) => Some(options),
        Err(e) => {
            log::warn!("Ignoring unreadable saved style: {}", e);
            None
        }
    }
}
