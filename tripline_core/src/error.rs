// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two conditions are errors. [`ConfigurationError`] covers a trigger
//! that cannot be built from its configuration. [`InputShapeError`] covers
//! bulk registration input of the wrong shape. Hidden elements, missing end
//! boundaries, and degenerate viewports are valid states.

use alloc::string::String;
use core::fmt;

/// Which boundary a reference selector was meant to define.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryRole {
    /// The start boundary.
    Start,
    /// The end boundary.
    End,
}

impl BoundaryRole {
    /// Lowercase name, as used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// A trigger's configuration cannot be resolved against the current page.
///
/// Raised synchronously while bounds are computed. It is fatal to the one
/// trigger it concerns, never to its siblings.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// A start or end selector matched no element.
    MissingElement {
        /// The selector as configured.
        selector: String,
        /// Which boundary the selector was meant to define.
        role: BoundaryRole,
    },
    /// A target, start, or end selector is not a valid selector.
    InvalidSelector {
        /// The selector as configured.
        selector: String,
    },
    /// A declarative attribute had a value that could not be parsed.
    InvalidAttribute {
        /// Attribute name.
        attribute: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The resolved end boundary lies before the start boundary.
    InvertedBounds {
        /// Resolved start boundary.
        start: f64,
        /// Resolved end boundary.
        end: f64,
    },
}

impl ConfigurationError {
    /// A copyable classification of this error, for trace events.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingElement {
                role: BoundaryRole::Start,
                ..
            } => ErrorKind::MissingStart,
            Self::MissingElement {
                role: BoundaryRole::End,
                ..
            } => ErrorKind::MissingEnd,
            Self::InvalidSelector { .. } => ErrorKind::InvalidSelector,
            Self::InvalidAttribute { .. } => ErrorKind::InvalidAttribute,
            Self::InvertedBounds { .. } => ErrorKind::InvertedBounds,
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement { selector, role } => write!(
                f,
                "{} element not found: selector `{selector}` matched nothing",
                role.as_str()
            ),
            Self::InvalidSelector { selector } => write!(f, "invalid selector `{selector}`"),
            Self::InvalidAttribute { attribute, value } => {
                write!(f, "invalid value `{value}` for attribute `{attribute}`")
            }
            Self::InvertedBounds { start, end } => {
                write!(f, "end boundary {end} lies before start boundary {start}")
            }
        }
    }
}

impl core::error::Error for ConfigurationError {}

/// Classification of [`ConfigurationError`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The start selector matched nothing.
    MissingStart,
    /// The end selector matched nothing.
    MissingEnd,
    /// A selector could not be parsed.
    InvalidSelector,
    /// A declarative attribute could not be parsed.
    InvalidAttribute,
    /// The end boundary lies before the start boundary.
    InvertedBounds,
}

/// The bulk registration entry point received input of the wrong shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputShapeError {
    /// The value was neither a list of descriptors nor absent.
    NotAnArray,
    /// A descriptor's element target was neither a selector, an element,
    /// nor a list of elements.
    UnknownElement {
        /// Position of the offending descriptor in the input list.
        index: usize,
    },
}

impl fmt::Display for InputShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnArray => f.write_str("trigger descriptors must be passed as an array"),
            Self::UnknownElement { index } => {
                write!(f, "descriptor {index}: unknown element target")
            }
        }
    }
}

impl core::error::Error for InputShapeError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn missing_element_names_selector_and_role() {
        let err = ConfigurationError::MissingElement {
            selector: "#footer".into(),
            role: BoundaryRole::End,
        };
        let msg = err.to_string();
        assert!(msg.contains("#footer"), "got: {msg}");
        assert!(msg.starts_with("end"), "got: {msg}");
        assert_eq!(err.kind(), ErrorKind::MissingEnd);
    }

    #[test]
    fn invalid_selector_names_selector() {
        let err = ConfigurationError::InvalidSelector {
            selector: "div[[".into(),
        };
        assert_eq!(err.to_string(), "invalid selector `div[[`");
        assert_eq!(err.kind(), ErrorKind::InvalidSelector);
    }

    #[test]
    fn input_shape_messages() {
        assert!(InputShapeError::NotAnArray.to_string().contains("array"));
        assert!(
            InputShapeError::UnknownElement { index: 3 }
                .to_string()
                .contains('3')
        );
    }
}
