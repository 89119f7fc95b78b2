//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct dispatches each frame to its layout and hands back a lazy
//! iterator of signals.

use crate::config::DecoderConfig;
use crate::layout::FrameLayout;
use crate::types::{DecoderError, Frame, Result, Signal, SignalName, SignalValue, PAYLOAD_LEN};
use crate::unmapped::format_unmapped;
use std::borrow::Borrow;
use std::iter::FusedIterator;

/// The main decoder struct - entry point for all decoding operations
///
/// Holds nothing but its configuration, so it is `Copy` and can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a new decoder instance
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Create a decoder with default settings and the given diagnostic flag
    pub fn with_unmapped(emit_unmapped: bool) -> Self {
        Self::new(DecoderConfig::new().with_unmapped(emit_unmapped))
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// True if frames with this identifier produce signals
    pub fn is_known(identifier: u32) -> bool {
        FrameLayout::from_identifier(identifier).is_some()
    }

    /// Decode one frame into a lazy iterator of signals
    ///
    /// Unknown identifiers yield an empty iterator. The payload is validated
    /// up front, so once this returns `Ok` every signal can be produced.
    ///
    /// # Example
    /// ```
    /// use ktm_can_decoder::{Decoder, Frame, SignalName, SignalValue};
    ///
    /// let decoder = Decoder::default();
    /// let frame = Frame::from_bytes(0x129, [0x18, 0, 0, 0, 0, 0, 0, 0]);
    /// let signals: Vec<_> = decoder.decode(&frame).unwrap().collect();
    ///
    /// assert_eq!(signals[0].name, SignalName::Gear);
    /// assert_eq!(signals[0].value, SignalValue::Integer(1));
    /// assert_eq!(signals[1].value, SignalValue::Boolean(true));
    /// ```
    pub fn decode(&self, frame: &Frame) -> Result<Signals> {
        let layout = match FrameLayout::from_identifier(frame.identifier) {
            Some(layout) => layout,
            None => return Ok(Signals::empty(frame.identifier)),
        };

        let required = layout.required_len(self.config.emit_unmapped);
        if frame.payload.len() < required {
            return Err(DecoderError::InsufficientPayload {
                identifier: frame.identifier,
                required,
                actual: frame.payload.len(),
            });
        }

        if self.config.check_invariants {
            for constant in layout.invariants() {
                let actual = frame.payload[constant.index];
                if actual != constant.expected {
                    return Err(DecoderError::UnexpectedConstant {
                        identifier: frame.identifier,
                        index: constant.index,
                        expected: constant.expected,
                        actual,
                    });
                }
            }
        }

        // Bytes past `required` are never read; zero keeps the copy total
        let mut payload = [0u8; PAYLOAD_LEN];
        let len = frame.payload.len().min(PAYLOAD_LEN);
        payload[..len].copy_from_slice(&frame.payload[..len]);

        Ok(Signals {
            identifier: frame.identifier,
            layout: Some(layout),
            payload,
            position: 0,
            emit_unmapped: self.config.emit_unmapped,
        })
    }

    /// Decode one frame and collect all its signals
    pub fn decode_all(&self, frame: &Frame) -> Result<Vec<Signal>> {
        Ok(self.decode(frame)?.collect())
    }

    /// Decode a sequence of frames into one flat stream of signals
    ///
    /// A frame that fails to decode yields a single `Err` and decoding resumes
    /// with the next frame.
    pub fn decode_stream<I, F>(&self, frames: I) -> DecodingIterator<I::IntoIter>
    where
        I: IntoIterator<Item = F>,
        F: Borrow<Frame>,
    {
        DecodingIterator {
            decoder: *self,
            frames: frames.into_iter(),
            current: None,
        }
    }
}

/// Lazy sequence of signals decoded from one frame
///
/// Named fields come first in layout order, followed by the `unmapped`
/// diagnostic when enabled.
#[derive(Debug, Clone)]
pub struct Signals {
    identifier: u32,
    layout: Option<FrameLayout>,
    payload: [u8; PAYLOAD_LEN],
    position: usize,
    emit_unmapped: bool,
}

impl Signals {
    fn empty(identifier: u32) -> Self {
        Self {
            identifier,
            layout: None,
            payload: [0; PAYLOAD_LEN],
            position: 0,
            emit_unmapped: false,
        }
    }

    /// Identifier of the frame being decoded
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Layout the frame was dispatched to, if any
    pub fn layout(&self) -> Option<FrameLayout> {
        self.layout
    }

    fn total(&self) -> usize {
        match self.layout {
            Some(layout) => layout.fields().len() + usize::from(self.emit_unmapped),
            None => 0,
        }
    }
}

impl Iterator for Signals {
    type Item = Signal;

    fn next(&mut self) -> Option<Self::Item> {
        let layout = self.layout?;
        let fields = layout.fields();

        let signal = if let Some(field) = fields.get(self.position) {
            Signal::new(self.identifier, field.name, (field.extract)(&self.payload))
        } else if self.emit_unmapped && self.position == fields.len() {
            let text = format_unmapped(&self.payload, layout.unmapped_masks());
            Signal::new(
                self.identifier,
                SignalName::Unmapped,
                SignalValue::Text(text),
            )
        } else {
            return None;
        };

        self.position += 1;
        Some(signal)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Signals {}

impl FusedIterator for Signals {}

/// Iterator that decodes a stream of frames into a flat stream of signals
pub struct DecodingIterator<I> {
    decoder: Decoder,
    frames: I,
    current: Option<Signals>,
}

impl<I, F> Iterator for DecodingIterator<I>
where
    I: Iterator<Item = F>,
    F: Borrow<Frame>,
{
    type Item = Result<Signal>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // First, drain the signals of the frame in progress
            if let Some(signal) = self.current.as_mut().and_then(Iterator::next) {
                return Some(Ok(signal));
            }

            let frame = self.frames.next()?;
            let frame: &Frame = frame.borrow();
            match self.decoder.decode(frame) {
                Ok(signals) => self.current = Some(signals),
                Err(e) => {
                    log::warn!("Rejected frame {}: {}", frame, e);
                    self.current = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
