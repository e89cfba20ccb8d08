// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative configuration from `data-scroll-*` attributes.
//!
//! Elements carrying the [`MARKER`] attribute are watched. Each option has
//! its own attribute; boolean options are enabled by the attribute's
//! presence, regardless of its value. Empty values fall back to defaults.
//!
//! | attribute | option |
//! |---|---|
//! | `data-scroll-position` | `top`, `middle`, `bottom`, or a percentage (`25`, `25%`) |
//! | `data-scroll-position-end` | same, plus `auto` |
//! | `data-scroll-start` / `data-scroll-end` | reference selectors |
//! | `data-scroll-offset` | pixels, or `auto` |
//! | `data-scroll-class` | class toggled on enter/exit |
//! | `data-scroll-image` / `-src` / `-srcset` | lazy-loaded sources |
//! | `data-scroll-progress` / `-once` / `-fixed` | flags |

use alloc::string::String;

use crate::config::{Anchor, EndAnchor, Offset, TriggerConfig};
use crate::error::ConfigurationError;

/// Presence marker selecting elements to watch.
pub const MARKER: &str = "data-scroll";
/// Selector matching every marked element.
pub const MARKER_SELECTOR: &str = "[data-scroll]";

/// Start anchor.
pub const POSITION: &str = "data-scroll-position";
/// End anchor.
pub const POSITION_END: &str = "data-scroll-position-end";
/// Start reference selector.
pub const START: &str = "data-scroll-start";
/// End reference selector.
pub const END: &str = "data-scroll-end";
/// Start offset.
pub const OFFSET: &str = "data-scroll-offset";
/// Toggled class.
pub const CLASS: &str = "data-scroll-class";
/// Image URL.
pub const IMAGE: &str = "data-scroll-image";
/// `src` URL.
pub const SRC: &str = "data-scroll-src";
/// `srcset` value.
pub const SRCSET: &str = "data-scroll-srcset";
/// Progress flag.
pub const PROGRESS: &str = "data-scroll-progress";
/// Once flag.
pub const ONCE: &str = "data-scroll-once";
/// Fixed flag.
pub const FIXED: &str = "data-scroll-fixed";

/// Builds a [`TriggerConfig`] from attribute lookups.
///
/// `lookup` returns the attribute's value, or `None` when the attribute is
/// absent.
///
/// # Errors
///
/// [`ConfigurationError::InvalidAttribute`] for an anchor or offset that
/// cannot be parsed.
pub fn parse(lookup: impl Fn(&str) -> Option<String>) -> Result<TriggerConfig, ConfigurationError> {
    let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let position_start = match value(POSITION) {
        Some(v) => parse_anchor(&v).ok_or(invalid(POSITION, v))?,
        None => Anchor::default(),
    };
    let position_end = match value(POSITION_END) {
        Some(v) => Some(parse_end_anchor(&v).ok_or(invalid(POSITION_END, v))?),
        None => None,
    };
    let offset = match value(OFFSET) {
        Some(v) => parse_offset(&v).ok_or(invalid(OFFSET, v))?,
        None => Offset::default(),
    };

    Ok(TriggerConfig {
        position_start,
        position_end,
        start_selector: value(START),
        end_selector: value(END),
        offset,
        class_name: value(CLASS),
        image: value(IMAGE),
        src: value(SRC),
        srcset: value(SRCSET),
        progress: lookup(PROGRESS).is_some(),
        once: lookup(ONCE).is_some(),
        fixed: lookup(FIXED).is_some(),
    })
}

/// Parses `top`, `middle`, `bottom`, or a percentage between 0 and 100.
#[must_use]
pub fn parse_anchor(value: &str) -> Option<Anchor> {
    let value = value.trim();
    match value {
        "top" => Some(Anchor::Top),
        "middle" => Some(Anchor::Middle),
        "bottom" => Some(Anchor::Bottom),
        _ => {
            let number = value.strip_suffix('%').unwrap_or(value).trim_end();
            let p: f64 = number.parse().ok()?;
            (0.0..=100.0).contains(&p).then_some(Anchor::Percent(p))
        }
    }
}

/// Parses an end anchor: any start anchor, or `auto`.
#[must_use]
pub fn parse_end_anchor(value: &str) -> Option<EndAnchor> {
    if value.trim() == "auto" {
        Some(EndAnchor::Auto)
    } else {
        parse_anchor(value).map(EndAnchor::Anchor)
    }
}

/// Parses a pixel offset (an optional `px` suffix is accepted) or `auto`.
#[must_use]
pub fn parse_offset(value: &str) -> Option<Offset> {
    let value = value.trim();
    if value == "auto" {
        return Some(Offset::Auto);
    }
    let number = value.strip_suffix("px").unwrap_or(value).trim_end();
    let px: f64 = number.parse().ok()?;
    px.is_finite().then_some(Offset::Pixels(px))
}

fn invalid(attribute: &'static str, value: String) -> ConfigurationError {
    ConfigurationError::InvalidAttribute { attribute, value }
}
