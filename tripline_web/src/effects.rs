// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM mutations for trigger events.
//!
//! Entering adds the configured class and lazy-loads images; exiting only
//! removes the class. Image writes are skipped when the target attribute
//! or style is already set, so re-entering never reloads a source.

use tripline_core::config::TriggerConfig;
use tripline_core::event::{EventKind, TriggerEvent};
use tripline_core::page::EffectSink;
use wasm_bindgen::JsCast as _;
use web_sys::{CustomEvent, CustomEventInit, Element, HtmlElement};

use crate::js;

/// Applies [`TriggerEvent`]s to the watched elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomEffects;

impl EffectSink<Element> for DomEffects {
    fn apply(&mut self, event: &TriggerEvent<Element>, config: &TriggerConfig) {
        let el = &event.element;
        match event.kind {
            EventKind::Entered => {
                if let Some(class) = &config.class_name {
                    let _ = el.class_list().add_1(class);
                }
                if let Some(image) = &config.image {
                    set_image(el, image);
                }
                if let Some(src) = &config.src {
                    set_attribute_once(el, "src", src);
                }
                if let Some(srcset) = &config.srcset {
                    set_attribute_once(el, "srcset", srcset);
                }
            }
            EventKind::Exited => {
                if let Some(class) = &config.class_name {
                    let _ = el.class_list().remove_1(class);
                }
            }
            EventKind::Progress { fraction } => {
                if let (Some(html), Some(width)) =
                    (el.dyn_ref::<HtmlElement>(), progress_width(fraction))
                {
                    let _ = html.style().set_property("width", &width);
                }
            }
            EventKind::BoundsChanged(_) => {}
        }
    }

    fn notify(&mut self, event: &TriggerEvent<Element>, config: &TriggerConfig) {
        let Some(name) = event.kind.notification_name() else {
            return;
        };
        let init = CustomEventInit::new();
        init.set_detail(&js::detail(event.id, config));
        if let Ok(custom) = CustomEvent::new_with_event_init_dict(name, &init) {
            let _ = event.element.dispatch_event(&custom);
        }
    }
}

/// `<img>` elements get a `src`; everything else a background image.
fn set_image(el: &Element, url: &str) {
    if el.tag_name().eq_ignore_ascii_case("img") {
        set_attribute_once(el, "src", url);
        return;
    }
    let Some(html) = el.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();
    let current = style
        .get_property_value("background-image")
        .unwrap_or_default();
    if !current.is_empty() && current != "none" {
        return;
    }
    let _ = style.set_property("background-image", &background_image(url));
    let _ = style.set_property("background-repeat", "no-repeat");
}

fn set_attribute_once(el: &Element, name: &str, value: &str) {
    if el.get_attribute(name).is_some_and(|v| !v.is_empty()) {
        return;
    }
    let _ = el.set_attribute(name, value);
}

/// CSS `background-image` value for `url`.
pub(crate) fn background_image(url: &str) -> String {
    format!("url(\"{}\")", url.replace('"', "\\\""))
}

/// CSS width for a progress fraction, or `None` when it cannot be written.
pub(crate) fn progress_width(fraction: f64) -> Option<String> {
    fraction
        .is_finite()
        .then(|| format!("{}%", fraction * 100.0))
}
