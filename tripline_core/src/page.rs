// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for page integrations.
//!
//! Tripline splits host-specific work into backend crates. Each backend
//! provides the following pieces:
//!
//! - **Page**: Implements [`Page`] to answer geometry and lookup queries
//!   (scroll offset, viewport height, element rectangles, selector lookup,
//!   attribute reads).
//!
//! - **Effects**: Implements [`EffectSink`] to apply
//!   [`TriggerEvent`]s to the presentation layer (class toggling, attribute
//!   writes, notifications).
//!
//! - **Event source**: Feeds scroll, resize and animation-frame callbacks
//!   into the [`Dispatcher`](crate::dispatcher::Dispatcher). This is not
//!   abstracted by a trait because listener setup and lifetime differ
//!   fundamentally across hosts.
//!
//! # Crate boundaries
//!
//! `tripline_core` owns the data model, boundary math, the state machine,
//! and this contract module. Backend crates depend on `tripline_core` and
//! provide platform glue.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::config::TriggerConfig;
use crate::event::TriggerEvent;

/// Read-only view of the hosting page.
///
/// All coordinates are CSS pixels. Rectangles returned by
/// [`client_rect`](Self::client_rect) are relative to the viewport, like
/// `getBoundingClientRect()`.
pub trait Page {
    /// Element handle. Equality must be identity.
    type Element: Clone + PartialEq;

    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;

    /// Height of the viewport.
    fn viewport_height(&self) -> f64;

    /// Full scrollable height of the document.
    fn document_scroll_height(&self) -> f64;

    /// Whether `selector` parses as a selector.
    ///
    /// [`query`](Self::query) and [`query_all`](Self::query_all) find
    /// nothing for a malformed selector; this tells the two cases apart.
    fn is_valid_selector(&self, selector: &str) -> bool {
        _ = selector;
        true
    }

    /// First element matching `selector`, if any.
    fn query(&self, selector: &str) -> Option<Self::Element>;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Viewport-relative bounding rectangle of `element`.
    fn client_rect(&self, element: &Self::Element) -> Rect;

    /// Whether `element` takes part in layout (has an offset parent).
    ///
    /// Elements under a `display: none` ancestor report `false`.
    fn is_laid_out(&self, element: &Self::Element) -> bool;

    /// Value of the attribute `name` on `element`, if present.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
}

/// Scroll and viewport measurements shared by every trigger in one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset.
    pub scroll_y: f64,
    /// Viewport height.
    pub height: f64,
    /// Full scrollable document height.
    pub document_height: f64,
}

impl Viewport {
    /// Reads the current measurements from `page`.
    #[must_use]
    pub fn read<P: Page + ?Sized>(page: &P) -> Self {
        Self {
            scroll_y: page.scroll_y(),
            height: page.viewport_height(),
            document_height: page.document_scroll_height(),
        }
    }

    /// Fraction of the scrollable range covered so far.
    ///
    /// Not clamped: overscroll at the document edges can produce values
    /// outside `0.0..=1.0`, and a document no taller than the viewport
    /// produces a non-finite value.
    #[inline]
    #[must_use]
    pub fn scroll_fraction(&self) -> f64 {
        self.scroll_y / (self.document_height - self.height)
    }
}

/// Applies trigger events to a presentation layer.
///
/// The [`Dispatcher`](crate::dispatcher::Dispatcher) calls
/// [`apply`](Self::apply) for each queued event, then runs the trigger's
/// hooks, then calls [`notify`](Self::notify). Test doubles typically only
/// record the events.
pub trait EffectSink<E> {
    /// Applies the mutations for `event` (classes, attributes, styles).
    fn apply(&mut self, event: &TriggerEvent<E>, config: &TriggerConfig);

    /// Publishes `event` to page code, after hooks have run.
    fn notify(&mut self, event: &TriggerEvent<E>, config: &TriggerConfig) {
        _ = (event, config);
    }
}
