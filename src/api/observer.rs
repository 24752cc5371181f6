//! Mount-surface observer
//!
//! Watches the engine's container for inserted nodes and makes every new
//! top-level `<svg>` follow the container width.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord};

use crate::render::{normalize_inserted, SurfaceElement};

impl SurfaceElement for Element {
    fn tag_name(&self) -> String {
        Element::local_name(self)
    }

    fn parent_element(&self) -> Option<Self> {
        web_sys::Node::parent_element(self)
    }

    fn descendant_svgs(&self) -> Vec<Self> {
        let Ok(list) = self.query_selector_all("svg") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(e) = Element::set_attribute(self, name, value) {
            log::warn!("Could not set {} on <svg>: {:?}", name, e);
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(e) = Element::remove_attribute(self, name) {
            log::warn!("Could not remove {} from <svg>: {:?}", name, e);
        }
    }
}

/// Live MutationObserver on the mount surface; disconnects on drop
pub struct SurfaceObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl SurfaceObserver {
    /// Observe `surface` and its whole subtree for insertions
    pub fn attach(surface: &Element) -> Result<SurfaceObserver, JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            |records: js_sys::Array, _observer: MutationObserver| {
                normalize_records(&records);
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(surface, &init)?;

        // Content appended before the observer existed
        normalize_inserted(surface);

        Ok(SurfaceObserver {
            observer,
            _callback: callback,
        })
    }

    /// Handle insertions still queued for the callback right away
    pub fn flush(&self) -> usize {
        normalize_records(&self.observer.take_records())
    }

    /// Stop observing; queued records are discarded
    pub fn disconnect(&self) {
        self.observer.disconnect();
        log::debug!("Surface observer disconnected");
    }
}

fn normalize_records(records: &js_sys::Array) -> usize {
    let mut touched = 0;
    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        let added = record.added_nodes();
        for i in 0..added.length() {
            if let Some(element) = added.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                touched += normalize_inserted(&element);
            }
        }
    }
    if touched > 0 {
        log::debug!("Made {} inserted svg root(s) responsive", touched);
    }
    touched
}

impl Drop for SurfaceObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
