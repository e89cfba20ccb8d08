// Copyright 2026 the Tripline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] encodes events into a `Vec<u8>` as tagged little-endian
//! records. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//! Decoding stops at the first unknown tag or truncated record.

use tripline_core::error::ErrorKind;
use tripline_core::id::TriggerId;
use tripline_core::time::HostTime;
use tripline_core::trace::{
    BoundsEvent, DisableReason, DisabledEvent, ErrorEvent, RegisterEvent, ResizeEvent,
    SampleEvent, TraceSink, TransitionEvent,
};
use tripline_core::trigger::Transition;

// ---------------------------------------------------------------------------
// Record tags
// ---------------------------------------------------------------------------

const TAG_SAMPLE: u8 = 1;
const TAG_TRANSITION: u8 = 2;
const TAG_BOUNDS: u8 = 3;
const TAG_DISABLED: u8 = 4;
const TAG_REGISTER: u8 = 5;
const TAG_ERROR: u8 = 6;
const TAG_RESIZE: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_id(&mut self, id: TriggerId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    /// Options are a presence byte followed by a zeroed or real payload.
    fn write_option_f64(&mut self, v: Option<f64>) {
        self.write_u8(u8::from(v.is_some()));
        self.write_f64(v.unwrap_or(0.0));
    }

    fn write_option_id(&mut self, v: Option<TriggerId>) {
        self.write_u8(u8::from(v.is_some()));
        self.write_id(v.unwrap_or(TriggerId::from_raw(0, 0)));
    }
}

impl TraceSink for RecorderSink {
    fn on_sample(&mut self, e: &SampleEvent) {
        self.write_u8(TAG_SAMPLE);
        self.write_time(e.at);
        self.write_f64(e.scroll_y);
        self.write_u32(e.sampled);
    }

    fn on_transition(&mut self, e: &TransitionEvent) {
        self.write_u8(TAG_TRANSITION);
        self.write_time(e.at);
        self.write_id(e.trigger);
        self.write_u8(match e.transition {
            Transition::Enter => 0,
            Transition::Exit => 1,
        });
        self.write_f64(e.scroll_y);
    }

    fn on_bounds(&mut self, e: &BoundsEvent) {
        self.write_u8(TAG_BOUNDS);
        self.write_time(e.at);
        self.write_id(e.trigger);
        self.write_f64(e.start);
        self.write_option_f64(e.end);
    }

    fn on_disabled(&mut self, e: &DisabledEvent) {
        self.write_u8(TAG_DISABLED);
        self.write_time(e.at);
        self.write_id(e.trigger);
        self.write_u8(match e.reason {
            DisableReason::NotLaidOut => 0,
            DisableReason::Once => 1,
            DisableReason::Error => 2,
        });
    }

    fn on_register(&mut self, e: &RegisterEvent) {
        self.write_u8(TAG_REGISTER);
        self.write_time(e.at);
        self.write_id(e.trigger);
        self.write_u8(u8::from(e.existing));
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        self.write_u8(TAG_ERROR);
        self.write_time(e.at);
        self.write_option_id(e.trigger);
        self.write_u8(match e.kind {
            ErrorKind::MissingStart => 0,
            ErrorKind::MissingEnd => 1,
            ErrorKind::InvalidAttribute => 2,
            ErrorKind::InvertedBounds => 3,
            ErrorKind::InvalidSelector => 4,
        });
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.write_u8(TAG_RESIZE);
        self.write_time(e.at);
        self.write_u32(e.recomputed);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`SampleEvent`].
    Sample(SampleEvent),
    /// A [`TransitionEvent`].
    Transition(TransitionEvent),
    /// A [`BoundsEvent`].
    Bounds(BoundsEvent),
    /// A [`DisabledEvent`].
    Disabled(DisabledEvent),
    /// A [`RegisterEvent`].
    Register(RegisterEvent),
    /// An [`ErrorEvent`].
    Error(ErrorEvent),
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
}

impl RecordedEvent {
    /// Host time at which the event was emitted.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::Sample(e) => e.at,
            Self::Transition(e) => e.at,
            Self::Bounds(e) => e.at,
            Self::Disabled(e) => e.at,
            Self::Register(e) => e.at,
            Self::Error(e) => e.at,
            Self::Resize(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_id(&mut self) -> Option<TriggerId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(TriggerId::from_raw(index, generation))
    }

    fn read_option_f64(&mut self) -> Option<Option<f64>> {
        let present = self.read_u8()?;
        let v = self.read_f64()?;
        Some((present != 0).then_some(v))
    }

    fn read_option_id(&mut self) -> Option<Option<TriggerId>> {
        let present = self.read_u8()?;
        let id = self.read_id()?;
        Some((present != 0).then_some(id))
    }

    fn decode_sample(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Sample(SampleEvent {
            at: self.read_time()?,
            scroll_y: self.read_f64()?,
            sampled: self.read_u32()?,
        }))
    }

    fn decode_transition(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Transition(TransitionEvent {
            at: self.read_time()?,
            trigger: self.read_id()?,
            transition: match self.read_u8()? {
                0 => Transition::Enter,
                _ => Transition::Exit,
            },
            scroll_y: self.read_f64()?,
        }))
    }

    fn decode_bounds(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Bounds(BoundsEvent {
            at: self.read_time()?,
            trigger: self.read_id()?,
            start: self.read_f64()?,
            end: self.read_option_f64()?,
        }))
    }

    fn decode_disabled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Disabled(DisabledEvent {
            at: self.read_time()?,
            trigger: self.read_id()?,
            reason: match self.read_u8()? {
                0 => DisableReason::NotLaidOut,
                1 => DisableReason::Once,
                _ => DisableReason::Error,
            },
        }))
    }

    fn decode_register(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Register(RegisterEvent {
            at: self.read_time()?,
            trigger: self.read_id()?,
            existing: self.read_u8()? != 0,
        }))
    }

    fn decode_error(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Error(ErrorEvent {
            at: self.read_time()?,
            trigger: self.read_option_id()?,
            kind: match self.read_u8()? {
                0 => ErrorKind::MissingStart,
                1 => ErrorKind::MissingEnd,
                2 => ErrorKind::InvalidAttribute,
                3 => ErrorKind::InvertedBounds,
                _ => ErrorKind::InvalidSelector,
            },
        }))
    }

    fn decode_resize(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Resize(ResizeEvent {
            at: self.read_time()?,
            recomputed: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_SAMPLE => self.decode_sample(),
            TAG_TRANSITION => self.decode_transition(),
            TAG_BOUNDS => self.decode_bounds(),
            TAG_DISABLED => self.decode_disabled(),
            TAG_REGISTER => self.decode_register(),
            TAG_ERROR => self.decode_error(),
            TAG_RESIZE => self.decode_resize(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> TriggerId {
        TriggerId::from_raw(i, 2)
    }

    /// A short session: register, bounds, enter, once-detach.
    fn session() -> RecorderSink {
        let mut rec = RecorderSink::new();
        rec.on_register(&RegisterEvent {
            at: HostTime(1_000),
            trigger: id(0),
            existing: false,
        });
        rec.on_bounds(&BoundsEvent {
            at: HostTime(1_000),
            trigger: id(0),
            start: 700.0,
            end: None,
        });
        rec.on_sample(&SampleEvent {
            at: HostTime(20_000),
            scroll_y: 750.5,
            sampled: 1,
        });
        rec.on_transition(&TransitionEvent {
            at: HostTime(20_000),
            trigger: id(0),
            transition: Transition::Enter,
            scroll_y: 750.5,
        });
        rec.on_disabled(&DisabledEvent {
            at: HostTime(20_000),
            trigger: id(0),
            reason: DisableReason::Once,
        });
        rec
    }

    #[test]
    fn session_decodes_in_order() {
        let rec = session();
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], RecordedEvent::Register(e) if e.trigger == id(0) && !e.existing));
        match &events[1] {
            RecordedEvent::Bounds(e) => {
                assert_eq!(e.start, 700.0);
                assert_eq!(e.end, None);
            }
            other => panic!("expected Bounds, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::Transition(e) => {
                assert_eq!(e.transition, Transition::Enter);
                assert_eq!(e.scroll_y, 750.5);
                assert_eq!(e.at, HostTime(20_000));
            }
            other => panic!("expected Transition, got {other:?}"),
        }
        assert!(matches!(
            events[4],
            RecordedEvent::Disabled(DisabledEvent {
                reason: DisableReason::Once,
                ..
            })
        ));
    }

    #[test]
    fn errors_with_and_without_trigger() {
        let mut rec = RecorderSink::new();
        rec.on_error(&ErrorEvent {
            at: HostTime(5),
            trigger: Some(id(4)),
            kind: ErrorKind::InvertedBounds,
        });
        rec.on_error(&ErrorEvent {
            at: HostTime(6),
            trigger: None,
            kind: ErrorKind::MissingStart,
        });
        rec.on_error(&ErrorEvent {
            at: HostTime(7),
            trigger: None,
            kind: ErrorKind::InvalidSelector,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        match (&events[0], &events[1], &events[2]) {
            (RecordedEvent::Error(a), RecordedEvent::Error(b), RecordedEvent::Error(c)) => {
                assert_eq!(a.trigger, Some(id(4)));
                assert_eq!(a.kind, ErrorKind::InvertedBounds);
                assert_eq!(b.trigger, None);
                assert_eq!(b.kind, ErrorKind::MissingStart);
                assert_eq!(c.kind, ErrorKind::InvalidSelector);
            }
            other => panic!("expected three errors, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let bytes = session().into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut bytes = session().into_bytes();
        bytes.insert(0, 0xff);
        assert_eq!(decode(&bytes).count(), 0);
    }
}
