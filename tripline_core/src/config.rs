// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-trigger configuration.
//!
//! [`TriggerConfig`] is plain, immutable data: anchors, reference selectors,
//! the start offset, and the effect payloads (class, image, flags). Callbacks
//! are kept apart in [`TriggerHooks`] so that configuration stays `Clone`,
//! comparable, and printable.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

/// Reference point inside the viewport used to turn an element's document
/// position into a scroll boundary.
///
/// The boundary is the scroll offset at which the element's top edge meets
/// the anchor line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Anchor {
    /// Element top meets the viewport top.
    Top,
    /// Element top meets the vertical middle of the viewport.
    Middle,
    /// Element top meets the viewport bottom.
    #[default]
    Bottom,
    /// Element top meets a line `p` percent down the viewport (0–100).
    Percent(f64),
}

impl Anchor {
    /// Distance in pixels from the viewport top to the anchor line.
    ///
    /// This is subtracted from an element's document position to obtain the
    /// boundary.
    #[inline]
    #[must_use]
    pub fn adjustment(self, viewport_height: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Middle => viewport_height / 2.0,
            Self::Bottom => viewport_height,
            Self::Percent(p) => viewport_height * (p / 100.0),
        }
    }
}

/// Anchor used for the end boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EndAnchor {
    /// Resolve like a start anchor.
    Anchor(Anchor),
    /// The end boundary is reached when the watched element's bottom edge
    /// meets the top of the end reference element.
    Auto,
}

impl From<Anchor> for EndAnchor {
    fn from(anchor: Anchor) -> Self {
        Self::Anchor(anchor)
    }
}

/// Signed adjustment added to the start boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Offset {
    /// A fixed number of pixels. Negative values trigger earlier.
    Pixels(f64),
    /// Minus one viewport height, i.e. trigger one screen early. Used to
    /// preload images before they scroll into view.
    Auto,
}

impl Default for Offset {
    fn default() -> Self {
        Self::Pixels(0.0)
    }
}

impl Offset {
    /// Resolves the offset against the current viewport height.
    #[inline]
    #[must_use]
    pub fn resolve(self, viewport_height: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Auto => -viewport_height,
        }
    }
}

/// Immutable configuration for a single trigger.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerConfig {
    /// Anchor for the start boundary.
    pub position_start: Anchor,
    /// Anchor for the end boundary. `None` reuses [`position_start`](Self::position_start).
    pub position_end: Option<EndAnchor>,
    /// Selector of an element whose position defines the start boundary.
    /// `None` uses the watched element itself.
    pub start_selector: Option<String>,
    /// Selector of an element whose position defines the end boundary.
    /// `None` means the trigger never exits by scrolling past an end.
    pub end_selector: Option<String>,
    /// Adjustment added to the start boundary.
    pub offset: Offset,
    /// Class added on enter and removed on exit.
    pub class_name: Option<String>,
    /// Image URL; set as `src` on `<img>` elements and as a background image
    /// on everything else.
    pub image: Option<String>,
    /// URL written to the `src` attribute on enter.
    pub src: Option<String>,
    /// Value written to the `srcset` attribute on enter.
    pub srcset: Option<String>,
    /// Report the document scroll fraction on every sample.
    pub progress: bool,
    /// Disable the trigger permanently after its first entry.
    pub once: bool,
    /// Keep the trigger active even when the element is not laid out.
    pub fixed: bool,
}

impl TriggerConfig {
    /// The anchor actually used for the end boundary.
    #[inline]
    #[must_use]
    pub fn end_anchor(&self) -> EndAnchor {
        self.position_end
            .unwrap_or(EndAnchor::Anchor(self.position_start))
    }

    /// Whether the layout guard may skip this trigger when its element is
    /// not laid out.
    #[inline]
    #[must_use]
    pub fn requires_layout(&self) -> bool {
        !self.fixed && !self.progress
    }
}

/// A callback invoked with the watched element and its configuration.
pub type Hook<E> = Rc<dyn Fn(&E, &TriggerConfig)>;

/// Optional callbacks invoked when a trigger enters or exits.
///
/// Hooks are reference counted so that one descriptor matching several
/// elements can share them.
pub struct TriggerHooks<E> {
    /// Called after entry effects are applied.
    pub on_enter: Option<Hook<E>>,
    /// Called after exit effects are applied.
    pub on_exit: Option<Hook<E>>,
}

impl<E> TriggerHooks<E> {
    /// Hooks that do nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }
}

impl<E> Default for TriggerHooks<E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<E> Clone for TriggerHooks<E> {
    fn clone(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<E> fmt::Debug for TriggerHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerHooks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}
