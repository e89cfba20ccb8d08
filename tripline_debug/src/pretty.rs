// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] writes one line per event to a
//! [`Write`](std::io::Write) destination (default: stderr). Timestamps are
//! printed in milliseconds.

use std::io::Write;

use tripline_core::time::HostTime;
use tripline_core::trace::{
    BoundsEvent, DisabledEvent, ErrorEvent, RegisterEvent, ResizeEvent, SampleEvent, TraceSink,
    TransitionEvent,
};
use tripline_core::trigger::Transition;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    samples: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            samples: true,
        }
    }

    /// Whether to print sample passes. On by default.
    ///
    /// Sample passes run on every throttled scroll and drown out the rest.
    #[must_use]
    pub fn with_samples(mut self, samples: bool) -> Self {
        self.samples = samples;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.as_millis_f64()
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_sample(&mut self, e: &SampleEvent) {
        if !self.samples {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[sample] at={:.1}ms scroll={} triggers={}",
            ms(e.at),
            e.scroll_y,
            e.sampled,
        );
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        let what = match e.transition {
            Transition::Enter => "enter",
            Transition::Exit => "exit",
        };
        let _ = writeln!(
            self.writer,
            "[{what}] at={:.1}ms trigger={} scroll={}",
            ms(e.at),
            e.trigger,
            e.scroll_y,
        );
    }

    fn on_bounds(&mut self, e: &BoundsEvent) {
        let _ = match e.end {
            Some(end) => writeln!(
                self.writer,
                "[bounds] at={:.1}ms trigger={} start={} end={end}",
                ms(e.at),
                e.trigger,
                e.start,
            ),
            None => writeln!(
                self.writer,
                "[bounds] at={:.1}ms trigger={} start={} end=none",
                ms(e.at),
                e.trigger,
                e.start,
            ),
        };
    }

    fn on_disabled(&mut self, e: &DisabledEvent) {
        let _ = writeln!(
            self.writer,
            "[disabled] at={:.1}ms trigger={} reason={}",
            ms(e.at),
            e.trigger,
            e.reason.as_str(),
        );
    }

    fn on_register(&mut self, e: &RegisterEvent) {
        let existing = if e.existing { " existing" } else { "" };
        let _ = writeln!(
            self.writer,
            "[register] at={:.1}ms trigger={}{existing}",
            ms(e.at),
            e.trigger,
        );
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        let _ = match e.trigger {
            Some(id) => writeln!(
                self.writer,
                "[error] at={:.1}ms trigger={id} kind={:?}",
                ms(e.at),
                e.kind,
            ),
            None => writeln!(self.writer, "[error] at={:.1}ms kind={:?}", ms(e.at), e.kind),
        };
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] at={:.1}ms recomputed={}",
            ms(e.at),
            e.recomputed,
        );
    }
}

#[cfg(test)]
mod tests {
    use tripline_core::error::ErrorKind;
    use tripline_core::id::TriggerId;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn transition_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transition(&TransitionEvent {
            at: HostTime(1_500),
            trigger: TriggerId::from_raw(3, 1),
            transition: Transition::Enter,
            scroll_y: 700.0,
        });
        let output = output(sink);
        assert_eq!(output, "[enter] at=1.5ms trigger=#3.1 scroll=700\n");
    }

    #[test]
    fn open_ended_bounds_and_errors() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let id = TriggerId::from_raw(0, 0);
        sink.on_bounds(&BoundsEvent {
            at: HostTime(0),
            trigger: id,
            start: 200.0,
            end: None,
        });
        sink.on_error(&ErrorEvent {
            at: HostTime(0),
            trigger: Some(id),
            kind: ErrorKind::MissingEnd,
        });
        let output = output(sink);
        assert!(output.contains("start=200 end=none"), "got: {output}");
        assert!(output.contains("kind=MissingEnd"), "got: {output}");
    }

    #[test]
    fn samples_can_be_silenced() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_samples(false);
        sink.on_sample(&SampleEvent {
            at: HostTime(0),
            scroll_y: 10.0,
            sampled: 4,
        });
        sink.on_resize(&ResizeEvent {
            at: HostTime(0),
            recomputed: 4,
        });
        let output = output(sink);
        assert!(!output.contains("[sample]"), "got: {output}");
        assert!(output.contains("[resize]"), "got: {output}");
    }
}
