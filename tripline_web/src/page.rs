// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Page`] over the live document.

use kurbo::Rect;
use tripline_core::page::Page;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, Element, HtmlElement, Window};

/// Geometry and lookups answered by `window` and `document`.
#[derive(Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl core::fmt::Debug for DomPage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPage")
            .field("window", &"Window")
            .field("document", &"Document")
            .finish()
    }
}

impl DomPage {
    /// Binds to the global window. Returns `None` outside a browser
    /// main thread.
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    /// The bound window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The bound document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Page for DomPage {
    type Element = Element;

    fn scroll_y(&self) -> f64 {
        match self.window.scroll_y() {
            Ok(y) => y,
            Err(_) => self
                .document
                .document_element()
                .map_or(0.0, |root| f64::from(root.scroll_top())),
        }
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn document_scroll_height(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_height()))
    }

    fn is_valid_selector(&self, selector: &str) -> bool {
        // An empty fragment parses the selector without walking the document.
        self.document
            .create_document_fragment()
            .query_selector(selector)
            .is_ok()
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn client_rect(&self, element: &Element) -> Rect {
        let r = element.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn is_laid_out(&self, element: &Element) -> bool {
        // Non-HTML elements (SVG) have no offset parent to consult.
        element
            .dyn_ref::<HtmlElement>()
            .is_none_or(|html| html.offset_parent().is_some())
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }
}
