// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between JavaScript values and core types.
//!
//! `init` receives an array of plain objects:
//!
//! ```js
//! init([{ el: '.card', position: 'middle', className: 'shown', once: true,
//!         onEnter(el, config) { ... } }]);
//! ```
//!
//! `el` may be a selector string, an element, a `NodeList`, or an array of
//! elements. Option names follow the `data-scroll-*` attributes in
//! camelCase.

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use tripline_core::attributes;
use tripline_core::config::{Anchor, EndAnchor, Hook, Offset, TriggerConfig, TriggerHooks};
use tripline_core::dispatcher::{BatchReport, Descriptor, Target};
use tripline_core::error::{ConfigurationError, InputShapeError};
use tripline_core::id::TriggerId;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Element, NodeList};

/// A descriptor, or the reason its options were rejected.
pub(crate) type ParsedDescriptor = Result<Descriptor<Element>, ConfigurationError>;

/// Parses the argument of `init`.
///
/// `undefined` and `null` mean "no descriptors". Option errors are kept per
/// descriptor so the rest of the batch can proceed.
pub(crate) fn descriptors(items: &JsValue) -> Result<Vec<ParsedDescriptor>, InputShapeError> {
    if items.is_undefined() || items.is_null() {
        return Ok(Vec::new());
    }
    if !Array::is_array(items) {
        return Err(InputShapeError::NotAnArray);
    }
    let array: &Array = items.unchecked_ref();
    let mut out = Vec::with_capacity(array.length() as usize);
    for (index, item) in array.iter().enumerate() {
        let target = target(&get(&item, "el")).ok_or(InputShapeError::UnknownElement { index })?;
        out.push(config(&item).map(|config| Descriptor {
            target,
            config,
            hooks: hooks(&item),
        }));
    }
    Ok(out)
}

fn target(el: &JsValue) -> Option<Target<Element>> {
    if let Some(selector) = el.as_string() {
        return Some(Target::Selector(selector));
    }
    if let Some(list) = el.dyn_ref::<NodeList>() {
        let elements = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        return Some(Target::Elements(elements));
    }
    if let Some(element) = el.dyn_ref::<Element>() {
        return Some(Target::Elements(vec![element.clone()]));
    }
    if Array::is_array(el) {
        let array: &Array = el.unchecked_ref();
        let elements: Option<Vec<Element>> =
            array.iter().map(|v| v.dyn_into::<Element>().ok()).collect();
        return elements.map(Target::Elements);
    }
    None
}

fn config(item: &JsValue) -> Result<TriggerConfig, ConfigurationError> {
    let position_start = match text(item, "position") {
        Some(v) => attributes::parse_anchor(&v).ok_or(invalid(attributes::POSITION, v))?,
        None => Anchor::default(),
    };
    let position_end = match text(item, "positionEnd") {
        Some(v) => Some(attributes::parse_end_anchor(&v).ok_or(invalid(attributes::POSITION_END, v))?),
        None => None,
    };
    let offset = match text(item, "offset") {
        Some(v) => attributes::parse_offset(&v).ok_or(invalid(attributes::OFFSET, v))?,
        None => Offset::default(),
    };
    Ok(TriggerConfig {
        position_start,
        position_end,
        start_selector: text(item, "start"),
        end_selector: text(item, "end"),
        offset,
        class_name: text(item, "className"),
        image: text(item, "image"),
        src: text(item, "src"),
        srcset: text(item, "srcset"),
        progress: get(item, "progress").is_truthy(),
        once: get(item, "once").is_truthy(),
        fixed: get(item, "fixed").is_truthy(),
    })
}

fn hooks(item: &JsValue) -> TriggerHooks<Element> {
    TriggerHooks {
        on_enter: hook(get(item, "onEnter")),
        on_exit: hook(get(item, "onExit")),
    }
}

/// Wraps a JS function as a hook called with `this = element` and the
/// arguments `(element, config)`.
fn hook(value: JsValue) -> Option<Hook<Element>> {
    let function = value.dyn_into::<Function>().ok()?;
    Some(Rc::new(move |element: &Element, config: &TriggerConfig| {
        let _ = function.call2(element, element, &config_to_js(config));
    }))
}

/// Builds the plain object handed to hooks and notification listeners.
pub(crate) fn config_to_js(config: &TriggerConfig) -> JsValue {
    let obj = Object::new();
    set(&obj, "position", &JsValue::from_str(&anchor_name(config.position_start)));
    let end = match config.end_anchor() {
        EndAnchor::Anchor(anchor) => anchor_name(anchor),
        EndAnchor::Auto => String::from("auto"),
    };
    set(&obj, "positionEnd", &JsValue::from_str(&end));
    set_opt(&obj, "start", config.start_selector.as_deref());
    set_opt(&obj, "end", config.end_selector.as_deref());
    let offset = match config.offset {
        Offset::Pixels(px) => JsValue::from_f64(px),
        Offset::Auto => JsValue::from_str("auto"),
    };
    set(&obj, "offset", &offset);
    set_opt(&obj, "className", config.class_name.as_deref());
    set_opt(&obj, "image", config.image.as_deref());
    set_opt(&obj, "src", config.src.as_deref());
    set_opt(&obj, "srcset", config.srcset.as_deref());
    set(&obj, "progress", &JsValue::from_bool(config.progress));
    set(&obj, "once", &JsValue::from_bool(config.once));
    set(&obj, "fixed", &JsValue::from_bool(config.fixed));
    obj.into()
}

/// The `detail` of notification events.
pub(crate) fn detail(id: TriggerId, config: &TriggerConfig) -> JsValue {
    let obj = Object::new();
    set(&obj, "id", &JsValue::from_str(&id.to_string()));
    set(&obj, "config", &config_to_js(config));
    obj.into()
}

/// The value returned by `init`: `{ registered: [id], errors: [{ index, message }] }`.
pub(crate) fn report(report: &BatchReport) -> JsValue {
    let registered: Array = report
        .registered
        .iter()
        .map(|r| JsValue::from_str(&r.id().to_string()))
        .collect();
    let errors: Array = report
        .errors
        .iter()
        .map(|e| {
            let obj = Object::new();
            set(&obj, "index", &JsValue::from_f64(e.index as f64));
            set(&obj, "message", &JsValue::from_str(&e.error.to_string()));
            JsValue::from(obj)
        })
        .collect();
    let obj = Object::new();
    set(&obj, "registered", &registered);
    set(&obj, "errors", &errors);
    obj.into()
}

/// Name of an anchor as accepted by `data-scroll-position`.
pub(crate) fn anchor_name(anchor: Anchor) -> String {
    match anchor {
        Anchor::Top => String::from("top"),
        Anchor::Middle => String::from("middle"),
        Anchor::Bottom => String::from("bottom"),
        Anchor::Percent(p) => format!("{p}%"),
    }
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

/// A string option; numbers are accepted and formatted.
fn text(obj: &JsValue, key: &str) -> Option<String> {
    let value = get(obj, key);
    let text = match value.as_f64() {
        Some(n) => format!("{n}"),
        None => value.as_string()?,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

fn set_opt(obj: &Object, key: &str, value: Option<&str>) {
    let value = value.map_or(JsValue::NULL, JsValue::from_str);
    set(obj, key, &value);
}

fn invalid(attribute: &'static str, value: String) -> ConfigurationError {
    ConfigurationError::InvalidAttribute { attribute, value }
}
