// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each trigger gets its own track (`tid` = trigger index + 1). Track 0
//! carries page-wide events: sample passes and resize recomputations.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};
use tripline_core::id::TriggerId;
use tripline_core::trigger::Transition;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Host ticks are microseconds, which is the format's native unit.
///
/// Entering and exiting the viewport are written as begin/end pairs, so a
/// trigger's time in view shows up as a span on its track.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|recorded| event(&recorded)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event(recorded: &RecordedEvent) -> Value {
    let ts = recorded.at().ticks();
    match recorded {
        RecordedEvent::Sample(e) => json!({
            "ph": "i",
            "name": "Sample",
            "cat": "Scroll",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": {
                "scroll_y": e.scroll_y,
                "sampled": e.sampled,
            }
        }),
        RecordedEvent::Transition(e) => json!({
            "ph": match e.transition {
                Transition::Enter => "B",
                Transition::Exit => "E",
            },
            "name": "InView",
            "cat": "Trigger",
            "ts": ts,
            "pid": 0,
            "tid": track(e.trigger),
            "args": {
                "trigger": e.trigger.to_string(),
                "scroll_y": e.scroll_y,
            }
        }),
        RecordedEvent::Bounds(e) => json!({
            "ph": "i",
            "name": "Bounds",
            "cat": "Trigger",
            "ts": ts,
            "pid": 0,
            "tid": track(e.trigger),
            "s": "t",
            "args": {
                "trigger": e.trigger.to_string(),
                "start": e.start,
                "end": e.end,
            }
        }),
        RecordedEvent::Disabled(e) => json!({
            "ph": "i",
            "name": "Disabled",
            "cat": "Trigger",
            "ts": ts,
            "pid": 0,
            "tid": track(e.trigger),
            "s": "t",
            "args": {
                "trigger": e.trigger.to_string(),
                "reason": e.reason.as_str(),
            }
        }),
        RecordedEvent::Register(e) => json!({
            "ph": "i",
            "name": "Register",
            "cat": "Trigger",
            "ts": ts,
            "pid": 0,
            "tid": track(e.trigger),
            "s": "t",
            "args": {
                "trigger": e.trigger.to_string(),
                "existing": e.existing,
            }
        }),
        RecordedEvent::Error(e) => json!({
            "ph": "i",
            "name": "Error",
            "cat": "Error",
            "ts": ts,
            "pid": 0,
            "tid": e.trigger.map_or(0, track),
            "s": if e.trigger.is_some() { "t" } else { "g" },
            "args": {
                "trigger": e.trigger.map(|id| id.to_string()),
                "kind": format!("{:?}", e.kind),
            }
        }),
        RecordedEvent::Resize(e) => json!({
            "ph": "i",
            "name": "Resize",
            "cat": "Scroll",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "recomputed": e.recomputed,
            }
        }),
    }
}

fn track(id: TriggerId) -> u64 {
    u64::from(id.index()) + 1
}

#[cfg(test)]
mod tests {
    use tripline_core::error::ErrorKind;
    use tripline_core::time::HostTime;
    use tripline_core::trace::{BoundsEvent, ErrorEvent, TraceSink, TransitionEvent};

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn transitions_become_spans_on_the_trigger_track() {
        let id = TriggerId::from_raw(2, 0);
        let mut rec = RecorderSink::new();
        rec.on_bounds(&BoundsEvent {
            at: HostTime(0),
            trigger: id,
            start: 200.0,
            end: Some(900.0),
        });
        rec.on_transition(&TransitionEvent {
            at: HostTime(10_000),
            trigger: id,
            transition: Transition::Enter,
            scroll_y: 250.0,
        });
        rec.on_transition(&TransitionEvent {
            at: HostTime(40_000),
            trigger: id,
            transition: Transition::Exit,
            scroll_y: 950.0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["name"], "Bounds");
        assert_eq!(parsed[0]["args"]["end"], 900.0);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["ts"], 10_000);
        assert_eq!(parsed[1]["tid"], 3);
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["args"]["trigger"], "#2.0");
    }

    #[test]
    fn page_wide_error_is_global() {
        let mut rec = RecorderSink::new();
        rec.on_error(&ErrorEvent {
            at: HostTime(1),
            trigger: None,
            kind: ErrorKind::MissingStart,
        });
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["s"], "g");
        assert_eq!(parsed[0]["tid"], 0);
        assert_eq!(parsed[0]["args"]["trigger"], Value::Null);
        assert_eq!(parsed[0]["args"]["kind"], "MissingStart");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
