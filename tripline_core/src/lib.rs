// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-boundary visibility triggers.
//!
//! `tripline_core` decides when watched elements enter and leave a
//! configurable band of the scroll range. It is `no_std` compatible (with
//! `alloc`) and knows nothing about the DOM: the hosting page is reached
//! through the [`Page`](page::Page) trait, and effects are applied by an
//! [`EffectSink`](page::EffectSink).
//!
//! # Architecture
//!
//! ```text
//!   data-scroll-* attributes ──► attributes::parse ──┐
//!   Descriptor ──────────────────────────────────────┤
//!                                                    ▼
//!                      Dispatcher::register ──► Trigger::new ──► bounds::compute
//!                                                    │
//!   scroll / resize / frame ──► Dispatcher ──► Trigger::sample / recompute
//!                                                    │
//!                                                    ▼
//!                      TriggerEvent ──► EffectSink::apply, hooks, notify
//! ```
//!
//! **[`config`]**: Immutable [`TriggerConfig`](config::TriggerConfig) and
//! the [`TriggerHooks`](config::TriggerHooks) carried beside it.
//!
//! **[`bounds`]**: Pure boundary math: anchors, offsets and reference
//! selectors turned into absolute scroll offsets.
//!
//! **[`trigger`]**: The per-element state machine with its layout guard.
//!
//! **[`registry`]**: Generational trigger storage with a subscription list
//! and dirty tracking via `understory_dirty`.
//!
//! **[`dispatcher`]**: The single owner of all triggers. Throttles window
//! events, fans samples out, and queues [`TriggerEvent`](event::TriggerEvent)s.
//!
//! **[`throttle`]**: Leading and trailing burst throttles.
//!
//! **[`attributes`]**: Declarative configuration from markup.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attributes;
pub mod bounds;
pub mod config;
pub mod dirty;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod id;
pub mod page;
pub mod registry;
pub mod throttle;
pub mod time;
pub mod trace;
pub mod trigger;

#[cfg(test)]
mod testing;
