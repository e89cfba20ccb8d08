// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory [`Page`] used by unit tests.
//!
//! Elements are `u32` handles. Positions are document-relative; client
//! rectangles are derived from the current scroll offset the same way a
//! browser reports `getBoundingClientRect()`. Empty selectors and selectors
//! containing `[[` are treated as malformed.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::Rect;

use crate::page::Page;

#[derive(Clone, Debug)]
struct FakeElement {
    id: u32,
    selector: String,
    top: f64,
    height: f64,
    laid_out: bool,
    attributes: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub(crate) struct FakePage {
    scroll_y: f64,
    viewport_height: f64,
    document_height: f64,
    elements: Vec<FakeElement>,
    next_id: u32,
}

impl FakePage {
    pub(crate) fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            viewport_height,
            document_height,
            elements: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds a laid-out element at document offset `top`.
    pub(crate) fn add(&mut self, selector: &str, top: f64, height: f64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(FakeElement {
            id,
            selector: selector.to_string(),
            top,
            height,
            laid_out: true,
            attributes: Vec::new(),
        });
        id
    }

    pub(crate) fn scroll_to(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub(crate) fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    pub(crate) fn set_laid_out(&mut self, element: &u32, laid_out: bool) {
        if let Some(el) = self.get_mut(*element) {
            el.laid_out = laid_out;
        }
    }

    pub(crate) fn move_to(&mut self, element: &u32, top: f64) {
        if let Some(el) = self.get_mut(*element) {
            el.top = top;
        }
    }

    pub(crate) fn set_attribute(&mut self, element: &u32, name: &str, value: &str) {
        if let Some(el) = self.get_mut(*element) {
            el.attributes.retain(|(n, _)| n != name);
            el.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// Removes every element registered under `selector`.
    pub(crate) fn remove(&mut self, selector: &str) {
        self.elements.retain(|el| el.selector != selector);
    }

    fn get(&self, id: u32) -> Option<&FakeElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut FakeElement> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    fn matches(el: &FakeElement, selector: &str) -> bool {
        // `[name]` selects by attribute presence; anything else is compared
        // verbatim.
        match selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(attr) => el.attributes.iter().any(|(n, _)| n == attr),
            None => el.selector == selector,
        }
    }
}

impl Page for FakePage {
    type Element = u32;

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_scroll_height(&self) -> f64 {
        self.document_height
    }

    fn is_valid_selector(&self, selector: &str) -> bool {
        !selector.is_empty() && !selector.contains("[[")
    }

    fn query(&self, selector: &str) -> Option<u32> {
        self.elements
            .iter()
            .find(|el| Self::matches(el, selector))
            .map(|el| el.id)
    }

    fn query_all(&self, selector: &str) -> Vec<u32> {
        self.elements
            .iter()
            .filter(|el| Self::matches(el, selector))
            .map(|el| el.id)
            .collect()
    }

    fn client_rect(&self, element: &u32) -> Rect {
        match self.get(*element) {
            Some(el) if el.laid_out => {
                let top = el.top - self.scroll_y;
                Rect::new(0.0, top, 100.0, top + el.height)
            }
            _ => Rect::ZERO,
        }
    }

    fn is_laid_out(&self, element: &u32) -> bool {
        self.get(*element).is_some_and(|el| el.laid_out)
    }

    fn attribute(&self, element: &u32, name: &str) -> Option<String> {
        self.get(*element)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}
