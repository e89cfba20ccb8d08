// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-element visibility state machine.
//!
//! ```text
//!               s in [start, end]                 once
//!   OutOfView ───────────────────► InView ─────────────────► Terminal
//!       ▲                            │
//!       └────────────────────────────┘
//!          s < start  or  s > end
//! ```
//!
//! [`Trigger::sample`] is the only place `added` changes during normal
//! operation, and each call reports at most one [`Transition`]. The
//! exceptions live in [`Trigger::recompute`]: the fixed-mode guard forces an
//! exit so the trigger can be re-entered after the next animation frame, and
//! a trigger disabled while in view is moved out of view so its effects can
//! be undone. Paused triggers are never moved.

use crate::bounds::{self, Bounds, Geometry};
use crate::config::TriggerConfig;
use crate::error::ConfigurationError;
use crate::page::{Page, Viewport};

/// Mutable state owned by one trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TriggerState {
    /// Whether the element is currently considered in view.
    pub added: bool,
    /// Bounds could not be computed, or a once-trigger has fired.
    pub disabled: bool,
    /// Sampling is suppressed by an external pause signal.
    pub paused: bool,
    /// Start boundary (absolute scroll offset).
    pub start: f64,
    /// End boundary (absolute scroll offset), if configured.
    pub end: Option<f64>,
}

impl TriggerState {
    /// The current boundaries.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            start: self.start,
            end: self.end,
        }
    }
}

/// Coarse state of a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Not in view (initial state).
    OutOfView,
    /// In view.
    InView,
    /// A once-trigger that has entered; no further transitions occur.
    Terminal,
}

/// A state change reported by [`Trigger::sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Out of view → in view.
    Enter,
    /// In view → out of view.
    Exit,
}

/// Outcome of one [`Trigger::sample`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    /// The transition, if the target state differs from the current one.
    pub transition: Option<Transition>,
    /// Scroll fraction for progress-mode triggers.
    pub progress: Option<f64>,
    /// The trigger reached [`Visibility::Terminal`] and must be detached
    /// from the scroll and resize sources.
    pub detach: bool,
}

/// Outcome of [`Trigger::recompute`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recompute {
    /// Bounds were recomputed; the trigger is enabled.
    Measured(Bounds),
    /// The element is not laid out; the trigger is disabled until a later
    /// recomputation finds it laid out again. A trigger that was in view
    /// has been moved out of view.
    NotLaidOut,
    /// A fixed-mode trigger was in view. It has been forced out of view and
    /// must be recomputed and sampled again on the next animation frame.
    Deferred,
    /// The trigger is terminal; nothing was done.
    Terminal,
}

/// One watched element with its configuration and state.
#[derive(Clone, Debug)]
pub struct Trigger<E> {
    element: E,
    config: TriggerConfig,
    state: TriggerState,
}

impl<E: Clone + PartialEq> Trigger<E> {
    /// Builds a trigger and computes its initial bounds.
    ///
    /// An element that is not laid out (and not `fixed`/`progress`) yields a
    /// disabled trigger rather than an error.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigurationError`] from [`bounds::compute`].
    pub fn new<P>(page: &P, element: E, config: TriggerConfig) -> Result<Self, ConfigurationError>
    where
        P: Page<Element = E> + ?Sized,
    {
        let mut state = TriggerState::default();
        match bounds::compute(page, &element, &config)? {
            Geometry::Measured(b) => {
                state.start = b.start;
                state.end = b.end;
            }
            Geometry::NotLaidOut => state.disabled = true,
        }
        Ok(Self {
            element,
            config,
            state,
        })
    }

    /// The watched element.
    #[inline]
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// The immutable configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// The current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    /// Coarse visibility derived from the state.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match (self.state.added, self.config.once) {
            (true, true) => Visibility::Terminal,
            (true, false) => Visibility::InView,
            (false, _) => Visibility::OutOfView,
        }
    }

    /// Whether the trigger has reached [`Visibility::Terminal`].
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.visibility() == Visibility::Terminal
    }

    /// Suppresses sampling; state and bounds are kept.
    pub fn pause(&mut self) {
        self.state.paused = true;
    }

    /// Re-enables sampling with the previously computed bounds.
    pub fn resume(&mut self) {
        self.state.paused = false;
    }

    /// Samples the scroll position and applies at most one transition.
    ///
    /// Disabled and paused triggers hold their state and report nothing.
    pub fn sample(&mut self, viewport: &Viewport) -> Sample {
        let mut out = Sample::default();
        if self.state.disabled || self.state.paused {
            return out;
        }

        if self.config.progress {
            out.progress = Some(viewport.scroll_fraction());
        }

        let inside = self.state.bounds().target(viewport.scroll_y) == Visibility::InView;
        match (inside, self.state.added) {
            (false, true) => {
                self.state.added = false;
                out.transition = Some(Transition::Exit);
            }
            (true, false) => {
                self.state.added = true;
                out.transition = Some(Transition::Enter);
                if self.config.once {
                    self.state.disabled = true;
                    out.detach = true;
                }
            }
            _ => {}
        }
        out
    }

    /// Recomputes bounds from live geometry.
    ///
    /// On error the trigger is disabled and keeps its previous bounds; a
    /// later successful recomputation re-enables it. Disabling an unpaused
    /// trigger that is in view also moves it out of view, which callers
    /// detect by comparing [`TriggerState::added`] before and after.
    ///
    /// A paused fixed-mode trigger is measured like any other; the forced
    /// exit only applies while it is live.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigurationError`] from [`bounds::compute`].
    pub fn recompute<P>(&mut self, page: &P) -> Result<Recompute, ConfigurationError>
    where
        P: Page<Element = E> + ?Sized,
    {
        if self.is_terminal() {
            return Ok(Recompute::Terminal);
        }
        if self.config.fixed && self.state.added && !self.state.paused {
            self.state.added = false;
            return Ok(Recompute::Deferred);
        }
        match bounds::compute(page, &self.element, &self.config) {
            Ok(Geometry::Measured(b)) => {
                self.state.start = b.start;
                self.state.end = b.end;
                self.state.disabled = false;
                Ok(Recompute::Measured(b))
            }
            Ok(Geometry::NotLaidOut) => {
                self.disable();
                Ok(Recompute::NotLaidOut)
            }
            Err(err) => {
                self.disable();
                Err(err)
            }
        }
    }

    fn disable(&mut self) {
        self.state.disabled = true;
        if !self.state.paused {
            self.state.added = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Offset;
    use crate::testing::FakePage;

    fn viewport_at(page: &mut FakePage, scroll_y: f64) -> Viewport {
        page.scroll_to(scroll_y);
        Viewport::read(page)
    }

    fn offset_trigger(page: &mut FakePage) -> Trigger<u32> {
        let el = page.add("#hero", 2000.0, 300.0);
        let config = TriggerConfig {
            offset: Offset::Pixels(-500.0),
            ..TriggerConfig::default()
        };
        Trigger::new(page, el, config).unwrap()
    }

    #[test]
    fn enters_exactly_at_start() {
        let mut page = FakePage::new(800.0, 5000.0);
        let mut trigger = offset_trigger(&mut page);
        assert_eq!(trigger.state().start, 700.0);

        let below = viewport_at(&mut page, 699.0);
        assert_eq!(trigger.sample(&below).transition, None);
        assert_eq!(trigger.visibility(), Visibility::OutOfView);

        let at = viewport_at(&mut page, 700.0);
        assert_eq!(trigger.sample(&at).transition, Some(Transition::Enter));
        assert_eq!(trigger.visibility(), Visibility::InView);
    }

    #[test]
    fn repeated_samples_on_one_side_fire_once() {
        let mut page = FakePage::new(800.0, 5000.0);
        let mut trigger = offset_trigger(&mut page);

        let mut enters = 0;
        for scroll in [800.0, 900.0, 1200.0, 701.0, 3000.0] {
            let viewport = viewport_at(&mut page, scroll);
            if trigger.sample(&viewport).transition == Some(Transition::Enter) {
                enters += 1;
            }
        }
        assert_eq!(enters, 1);
    }

    #[test]
    fn below_start_is_out_of_view_regardless_of_history() {
        let mut page = FakePage::new(800.0, 5000.0);
        let mut trigger = offset_trigger(&mut page);
        for scroll in [1000.0, 10.0, 2000.0, 699.0, 0.0] {
            let viewport = viewport_at(&mut page, scroll);
            trigger.sample(&viewport);
            if scroll < 700.0 {
                assert_eq!(trigger.visibility(), Visibility::OutOfView, "scroll {scroll}");
            } else {
                assert_eq!(trigger.visibility(), Visibility::InView, "scroll {scroll}");
            }
        }
    }

    #[test]
    fn exits_past_end_in_both_directions() {
        let mut page = FakePage::new(800.0, 8000.0);
        let el = page.add("#a", 1000.0, 100.0);
        page.add("#b", 3000.0, 100.0);
        let config = TriggerConfig {
            end_selector: Some("#b".into()),
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();
        assert_eq!(trigger.state().bounds(), Bounds {
            start: 200.0,
            end: Some(2200.0)
        });

        let steps = [
            (100.0, None),
            (200.0, Some(Transition::Enter)),
            (2200.0, None),
            (2201.0, Some(Transition::Exit)),
            (5000.0, None),
            (1500.0, Some(Transition::Enter)),
            (199.0, Some(Transition::Exit)),
        ];
        for (scroll, expected) in steps {
            let viewport = viewport_at(&mut page, scroll);
            assert_eq!(trigger.sample(&viewport).transition, expected, "scroll {scroll}");
        }
    }

    #[test]
    fn once_trigger_becomes_terminal() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let config = TriggerConfig {
            once: true,
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();

        let inside = viewport_at(&mut page, 300.0);
        let sample = trigger.sample(&inside);
        assert_eq!(sample.transition, Some(Transition::Enter));
        assert!(sample.detach);
        assert!(trigger.state().disabled);
        assert_eq!(trigger.visibility(), Visibility::Terminal);

        for scroll in [0.0, 150.0, 4000.0] {
            let viewport = viewport_at(&mut page, scroll);
            assert_eq!(trigger.sample(&viewport), Sample::default());
        }
        assert_eq!(trigger.recompute(&page), Ok(Recompute::Terminal));
        assert_eq!(trigger.visibility(), Visibility::Terminal);
    }

    #[test]
    fn paused_trigger_holds_state() {
        let mut page = FakePage::new(800.0, 5000.0);
        let mut trigger = offset_trigger(&mut page);

        trigger.pause();
        let inside = viewport_at(&mut page, 1000.0);
        assert_eq!(trigger.sample(&inside), Sample::default());
        assert_eq!(trigger.visibility(), Visibility::OutOfView);

        trigger.resume();
        assert_eq!(trigger.sample(&inside).transition, Some(Transition::Enter));
        assert_eq!(trigger.state().start, 700.0, "bounds survive pause");
    }

    #[test]
    fn hidden_element_is_disabled_and_inert() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#hidden", 1000.0, 100.0);
        page.set_laid_out(&el, false);
        let mut trigger = Trigger::new(&page, el, TriggerConfig::default()).unwrap();
        assert!(trigger.state().disabled);

        for scroll in [0.0, 500.0, 1000.0, 4000.0] {
            let viewport = viewport_at(&mut page, scroll);
            assert_eq!(trigger.sample(&viewport), Sample::default());
        }
        assert_eq!(trigger.visibility(), Visibility::OutOfView);
    }

    #[test]
    fn recompute_reenables_once_laid_out() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#later", 1000.0, 100.0);
        page.set_laid_out(&el, false);
        let mut trigger = Trigger::new(&page, el, TriggerConfig::default()).unwrap();
        assert!(trigger.state().disabled);

        page.set_laid_out(&el, true);
        assert_eq!(
            trigger.recompute(&page),
            Ok(Recompute::Measured(Bounds {
                start: 200.0,
                end: None
            }))
        );
        assert!(!trigger.state().disabled);
    }

    #[test]
    fn recompute_tracks_layout_changes() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let mut trigger = Trigger::new(&page, el, TriggerConfig::default()).unwrap();
        page.move_to(&el, 1800.0);
        page.set_viewport_height(600.0);
        trigger.recompute(&page).unwrap();
        assert_eq!(trigger.state().start, 1200.0);
    }

    #[test]
    fn fixed_trigger_in_view_defers_recompute() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#fixed", 1000.0, 100.0);
        let config = TriggerConfig {
            fixed: true,
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();
        let inside = viewport_at(&mut page, 500.0);
        trigger.sample(&inside);
        assert_eq!(trigger.visibility(), Visibility::InView);

        assert_eq!(trigger.recompute(&page), Ok(Recompute::Deferred));
        assert_eq!(trigger.visibility(), Visibility::OutOfView);

        // The follow-up pass measures and the next sample re-enters.
        assert!(matches!(trigger.recompute(&page), Ok(Recompute::Measured(_))));
        assert_eq!(trigger.sample(&inside).transition, Some(Transition::Enter));
    }

    #[test]
    fn paused_fixed_trigger_keeps_state_across_recompute() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#fixed", 1000.0, 100.0);
        let config = TriggerConfig {
            fixed: true,
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();
        let inside = viewport_at(&mut page, 500.0);
        trigger.sample(&inside);
        trigger.pause();

        page.set_viewport_height(600.0);
        assert_eq!(
            trigger.recompute(&page),
            Ok(Recompute::Measured(Bounds {
                start: 400.0,
                end: None
            }))
        );
        assert_eq!(trigger.visibility(), Visibility::InView, "paused state is held");

        trigger.resume();
        assert_eq!(trigger.sample(&inside), Sample::default(), "still in view");
    }

    #[test]
    fn hiding_an_in_view_trigger_moves_it_out_of_view() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let mut trigger = Trigger::new(&page, el, TriggerConfig::default()).unwrap();
        let inside = viewport_at(&mut page, 500.0);
        trigger.sample(&inside);
        assert_eq!(trigger.visibility(), Visibility::InView);

        page.set_laid_out(&el, false);
        assert_eq!(trigger.recompute(&page), Ok(Recompute::NotLaidOut));
        assert!(trigger.state().disabled);
        assert_eq!(trigger.visibility(), Visibility::OutOfView);

        page.set_laid_out(&el, true);
        trigger.recompute(&page).unwrap();
        assert_eq!(trigger.sample(&inside).transition, Some(Transition::Enter));
    }

    #[test]
    fn disabling_a_paused_trigger_holds_its_state() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        let mut trigger = Trigger::new(&page, el, TriggerConfig::default()).unwrap();
        let inside = viewport_at(&mut page, 500.0);
        trigger.sample(&inside);
        trigger.pause();

        page.set_laid_out(&el, false);
        assert_eq!(trigger.recompute(&page), Ok(Recompute::NotLaidOut));
        assert_eq!(trigger.visibility(), Visibility::InView);
    }

    #[test]
    fn recompute_error_disables_and_keeps_bounds() {
        let mut page = FakePage::new(800.0, 5000.0);
        let el = page.add("#a", 1000.0, 100.0);
        page.add("#start", 1500.0, 100.0);
        let config = TriggerConfig {
            start_selector: Some("#start".into()),
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();
        let before = trigger.state().bounds();

        page.remove("#start");
        assert!(trigger.recompute(&page).is_err());
        assert!(trigger.state().disabled);
        assert_eq!(trigger.state().bounds(), before);
    }

    #[test]
    fn progress_reported_every_sample() {
        let mut page = FakePage::new(1000.0, 5000.0);
        let el = page.add("#bar", 0.0, 4.0);
        let config = TriggerConfig {
            progress: true,
            position_start: crate::config::Anchor::Top,
            ..TriggerConfig::default()
        };
        let mut trigger = Trigger::new(&page, el, config).unwrap();

        let viewport = viewport_at(&mut page, 2000.0);
        assert_eq!(trigger.sample(&viewport).progress, Some(0.5));
        let viewport = viewport_at(&mut page, 2400.0);
        let sample = trigger.sample(&viewport);
        assert_eq!(sample.transition, None, "already in view");
        assert_eq!(sample.progress, Some(0.6));
    }
}
