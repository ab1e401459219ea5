//! Incremental UTF-8 decoding for chunked byte streams.
//!
//! Network chunk boundaries have no respect for code point boundaries, so a
//! [`Utf8Decoder`] holds back an incomplete trailing sequence until the rest of it
//! arrives. Sequences that can never become valid are replaced with U+FFFD rather than
//! failing the stream.

use bytes::{Buf, Bytes, BytesMut};
use bytes_utils::Str;

use crate::constants::EMPTY_STR;

const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();

/// Stateful decoder turning arbitrary byte chunks into UTF-8 [`Str`]s
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    buffer: BytesMut,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` together with any bytes held back from the previous call.
    ///
    /// Returns everything that is known to be complete, an incomplete multi-byte
    /// sequence at the very end stays buffered.
    pub fn decode(&mut self, chunk: &[u8]) -> Str {
        self.buffer.extend_from_slice(chunk);
        if self.buffer.is_empty() {
            return EMPTY_STR;
        }

        let mut decoded: Option<BytesMut> = None;
        let valid = loop {
            match core::str::from_utf8(&self.buffer) {
                Ok(_) => break join(decoded, self.buffer.split()),
                Err(e) => {
                    let valid = self.buffer.split_to(e.valid_up_to());
                    match e.error_len() {
                        // incomplete sequence at the end, wait for more bytes
                        None => break join(decoded, valid),
                        Some(invalid_len) => {
                            let mut acc = join(decoded, valid);
                            acc.extend_from_slice(REPLACEMENT);
                            self.buffer.advance(invalid_len);
                            decoded = Some(acc);
                        }
                    }
                }
            }
        };

        // Safety: `valid` is only ever built from slices from_utf8 accepted and the
        // replacement character
        unsafe { Str::from_inner_unchecked(valid.freeze()) }
    }

    /// Number of bytes held back waiting for the rest of a code point
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Flush anything still buffered, lossily
    pub fn finish(&mut self) -> Str {
        if self.buffer.is_empty() {
            return EMPTY_STR;
        }
        let rest = self.buffer.split();
        let lossy = String::from_utf8_lossy(&rest).into_owned();
        // Safety: from_utf8_lossy always yields valid utf8
        unsafe { Str::from_inner_unchecked(Bytes::from(lossy.into_bytes())) }
    }
}

fn join(acc: Option<BytesMut>, next: BytesMut) -> BytesMut {
    match acc {
        Some(mut acc) => {
            acc.extend_from_slice(&next);
            acc
        }
        None => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THUMBS_UP: [u8; 4] = [240, 159, 145, 141];

    #[test]
    fn valid_chunks() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"Hello"), Str::from("Hello"));
        assert_eq!(decoder.decode(b", world!"), Str::from(", world!"));
        assert_eq!(decoder.decode(b""), EMPTY_STR);
        assert_eq!(decoder.decode(&THUMBS_UP), Str::from("👍"));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn split_code_points() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&THUMBS_UP[..2]), EMPTY_STR);
        assert_eq!(decoder.pending(), 2);
        assert_eq!(decoder.decode(&THUMBS_UP[2..]), Str::from("👍"));

        // one byte at a time, followed by a complete emoji
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"ok "), Str::from("ok "));
        assert_eq!(decoder.decode(&THUMBS_UP[..1]), EMPTY_STR);
        assert_eq!(decoder.decode(&THUMBS_UP[1..3]), EMPTY_STR);
        let mut rest = vec![THUMBS_UP[3]];
        rest.extend_from_slice(&THUMBS_UP);
        assert_eq!(decoder.decode(&rest), Str::from("👍👍"));
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"Hello \xFF"), Str::from("Hello \u{FFFD}"));
        assert_eq!(
            decoder.decode(b"a\xFFb\xFEc"),
            Str::from("a\u{FFFD}b\u{FFFD}c")
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn finish_flushes_incomplete_tail() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&THUMBS_UP[..3]), EMPTY_STR);
        assert_eq!(decoder.finish(), Str::from("\u{FFFD}"));
        assert_eq!(decoder.finish(), EMPTY_STR);
    }
}
