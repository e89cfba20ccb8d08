// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary resolution.
//!
//! A boundary is an absolute scroll offset. The start boundary is the scroll
//! offset at which the start reference element's top edge meets the
//! configured [`Anchor`] line; the end boundary is the same for the end
//! reference element, or, with [`EndAnchor::Auto`], the offset at which the
//! watched element's bottom edge would meet the end reference's top edge.
//!
//! ```text
//!   document_top(ref) = client_rect(ref).top + scroll_y
//!   start = document_top(start_ref) - anchor.adjustment(h) + offset
//!   end   = document_top(end_ref)   - anchor.adjustment(h)          (anchored)
//!   end   = document_top(end_ref)   - height(watched)               (auto)
//! ```
//!
//! Everything here is a pure function of the geometry reported by the
//! [`Page`].

use crate::config::{Anchor, EndAnchor, Offset, TriggerConfig};
use crate::error::{BoundaryRole, ConfigurationError};
use crate::page::Page;
use crate::trigger::Visibility;

/// Resolved start and end boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Scroll offset at which the trigger enters.
    pub start: f64,
    /// Scroll offset past which the trigger exits, if any.
    pub end: Option<f64>,
}

impl Bounds {
    /// Whether scroll offset `scroll_y` lies inside `[start, end]`.
    ///
    /// Both ends are inclusive. Without an end boundary, everything at or
    /// past `start` is inside.
    #[inline]
    #[must_use]
    pub fn contains(&self, scroll_y: f64) -> bool {
        !(scroll_y < self.start || self.end.is_some_and(|end| scroll_y > end))
    }

    /// The visibility a trigger with these bounds should have at `scroll_y`.
    #[inline]
    #[must_use]
    pub fn target(&self, scroll_y: f64) -> Visibility {
        if self.contains(scroll_y) {
            Visibility::InView
        } else {
            Visibility::OutOfView
        }
    }
}

/// Result of measuring a trigger's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Bounds were computed from live geometry.
    Measured(Bounds),
    /// The element is not laid out and its configuration requires layout;
    /// no geometry was read.
    NotLaidOut,
}

/// Resolves the start boundary from the start reference's viewport-relative
/// top edge.
#[inline]
#[must_use]
pub fn resolve_start(
    reference_top: f64,
    scroll_y: f64,
    viewport_height: f64,
    anchor: Anchor,
    offset: Offset,
) -> f64 {
    reference_top + scroll_y - anchor.adjustment(viewport_height) + offset.resolve(viewport_height)
}

/// Resolves the end boundary from the end reference's viewport-relative top
/// edge.
///
/// `watched_height` is only used by [`EndAnchor::Auto`].
#[inline]
#[must_use]
pub fn resolve_end(
    reference_top: f64,
    scroll_y: f64,
    viewport_height: f64,
    anchor: EndAnchor,
    watched_height: f64,
) -> f64 {
    let document_top = reference_top + scroll_y;
    match anchor {
        EndAnchor::Anchor(anchor) => document_top - anchor.adjustment(viewport_height),
        EndAnchor::Auto => document_top - watched_height,
    }
}

/// Measures `element` against `config` on the current page.
///
/// Returns [`Geometry::NotLaidOut`] without reading any geometry when the
/// element has no offset parent and the configuration requires layout.
///
/// # Errors
///
/// - [`ConfigurationError::MissingElement`] if a start or end selector
///   matches nothing.
/// - [`ConfigurationError::InvertedBounds`] if the end boundary resolves
///   before the start boundary.
pub fn compute<P: Page + ?Sized>(
    page: &P,
    element: &P::Element,
    config: &TriggerConfig,
) -> Result<Geometry, ConfigurationError> {
    if config.requires_layout() && !page.is_laid_out(element) {
        return Ok(Geometry::NotLaidOut);
    }

    let scroll_y = page.scroll_y();
    let viewport_height = page.viewport_height();

    let start_rect = match &config.start_selector {
        Some(selector) => {
            let reference = lookup(page, selector, BoundaryRole::Start)?;
            page.client_rect(&reference)
        }
        None => page.client_rect(element),
    };
    let start = resolve_start(
        start_rect.y0,
        scroll_y,
        viewport_height,
        config.position_start,
        config.offset,
    );

    let end = match &config.end_selector {
        Some(selector) => {
            let reference = lookup(page, selector, BoundaryRole::End)?;
            let end_rect = page.client_rect(&reference);
            let watched_height = page.client_rect(element).height();
            let end = resolve_end(
                end_rect.y0,
                scroll_y,
                viewport_height,
                config.end_anchor(),
                watched_height,
            );
            if end < start {
                return Err(ConfigurationError::InvertedBounds { start, end });
            }
            Some(end)
        }
        None => None,
    };

    Ok(Geometry::Measured(Bounds { start, end }))
}

fn lookup<P: Page + ?Sized>(
    page: &P,
    selector: &str,
    role: BoundaryRole,
) -> Result<P::Element, ConfigurationError> {
    if !page.is_valid_selector(selector) {
        return Err(ConfigurationError::InvalidSelector {
            selector: selector.into(),
        });
    }
    page.query(selector)
        .ok_or_else(|| ConfigurationError::MissingElement {
            selector: selector.into(),
            role,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;

    #[test]
    fn offset_scenario_start_is_700() {
        // Viewport 800, element top at 2000, anchor Bottom, offset -500.
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#hero", 2000.0, 300.0);
        let config = TriggerConfig {
            offset: Offset::Pixels(-500.0),
            ..TriggerConfig::default()
        };
        let geometry = compute(&page, &el, &config).unwrap();
        assert_eq!(
            geometry,
            Geometry::Measured(Bounds {
                start: 700.0,
                end: None
            })
        );
    }

    #[test]
    fn boundaries_are_independent_of_current_scroll() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1500.0, 100.0);
        let config = TriggerConfig::default();
        let at_top = compute(&page, &el, &config).unwrap();
        page.scroll_to(640.0);
        let scrolled = compute(&page, &el, &config).unwrap();
        assert_eq!(at_top, scrolled);
    }

    #[test]
    fn percent_anchor_arithmetic() {
        let mut page = FakePage::new(1000.0, 8000.0);
        let el = page.add("#a", 3000.0, 100.0);
        page.scroll_to(250.0);
        for (p, expected) in [(0.0, 3000.0), (30.0, 2700.0), (100.0, 2000.0)] {
            let config = TriggerConfig {
                position_start: Anchor::Percent(p),
                ..TriggerConfig::default()
            };
            let Geometry::Measured(bounds) = compute(&page, &el, &config).unwrap() else {
                panic!("element is laid out");
            };
            assert_eq!(bounds.start, expected, "percent {p}");
        }
    }

    #[test]
    fn auto_end_subtracts_watched_height() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#sticky", 1000.0, 250.0);
        page.add("#footer", 4000.0, 400.0);
        page.scroll_to(100.0);
        let config = TriggerConfig {
            position_start: Anchor::Top,
            end_selector: Some("#footer".into()),
            position_end: Some(EndAnchor::Auto),
            ..TriggerConfig::default()
        };
        let Geometry::Measured(bounds) = compute(&page, &el, &config).unwrap() else {
            panic!("element is laid out");
        };
        assert_eq!(bounds.start, 1000.0);
        assert_eq!(bounds.end, Some(4000.0 - 250.0));
    }

    #[test]
    fn end_mirrors_start_anchor_by_default() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#a", 1000.0, 100.0);
        page.add("#b", 3000.0, 100.0);
        let config = TriggerConfig {
            position_start: Anchor::Middle,
            end_selector: Some("#b".into()),
            ..TriggerConfig::default()
        };
        let Geometry::Measured(bounds) = compute(&page, &el, &config).unwrap() else {
            panic!("element is laid out");
        };
        assert_eq!(bounds.start, 600.0);
        assert_eq!(bounds.end, Some(2600.0));
    }

    #[test]
    fn start_selector_overrides_reference() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#a", 1000.0, 100.0);
        page.add("#section", 2400.0, 600.0);
        let config = TriggerConfig {
            position_start: Anchor::Top,
            start_selector: Some("#section".into()),
            ..TriggerConfig::default()
        };
        let Geometry::Measured(bounds) = compute(&page, &el, &config).unwrap() else {
            panic!("element is laid out");
        };
        assert_eq!(bounds.start, 2400.0);
    }

    #[test]
    fn missing_selectors_fail_with_role() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let config = TriggerConfig {
            start_selector: Some("#nope".into()),
            ..TriggerConfig::default()
        };
        assert_eq!(
            compute(&page, &el, &config),
            Err(ConfigurationError::MissingElement {
                selector: "#nope".into(),
                role: BoundaryRole::Start,
            })
        );

        let config = TriggerConfig {
            end_selector: Some("#gone".into()),
            ..TriggerConfig::default()
        };
        assert_eq!(
            compute(&page, &el, &config),
            Err(ConfigurationError::MissingElement {
                selector: "#gone".into(),
                role: BoundaryRole::End,
            })
        );
    }

    #[test]
    fn malformed_selector_is_not_reported_as_missing() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let config = TriggerConfig {
            end_selector: Some("#b[[".into()),
            ..TriggerConfig::default()
        };
        assert_eq!(
            compute(&page, &el, &config),
            Err(ConfigurationError::InvalidSelector {
                selector: "#b[[".into(),
            })
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#a", 3000.0, 100.0);
        page.add("#above", 500.0, 100.0);
        let config = TriggerConfig {
            end_selector: Some("#above".into()),
            ..TriggerConfig::default()
        };
        assert!(matches!(
            compute(&page, &el, &config),
            Err(ConfigurationError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn hidden_element_is_not_measured() {
        let mut page = FakePage::new(800.0, 6000.0);
        let el = page.add("#hidden", 1000.0, 100.0);
        page.set_laid_out(&el, false);
        let config = TriggerConfig {
            // Would fail if geometry were read.
            end_selector: Some("#missing".into()),
            ..TriggerConfig::default()
        };
        assert_eq!(compute(&page, &el, &config), Ok(Geometry::NotLaidOut));

        let fixed = TriggerConfig {
            fixed: true,
            ..TriggerConfig::default()
        };
        assert!(matches!(
            compute(&page, &el, &fixed),
            Ok(Geometry::Measured(_))
        ));
    }

    #[test]
    fn contains_is_inclusive() {
        let bounds = Bounds {
            start: 100.0,
            end: Some(200.0),
        };
        assert!(!bounds.contains(99.9));
        assert!(bounds.contains(100.0));
        assert!(bounds.contains(200.0));
        assert!(!bounds.contains(200.1));

        let open = Bounds {
            start: 100.0,
            end: None,
        };
        assert!(open.contains(1.0e9));
        assert_eq!(open.target(99.0), Visibility::OutOfView);
        assert_eq!(open.target(100.0), Visibility::InView);
    }
}
