//! Fixed-width little-endian primitives for the index format.
//!
//! Strings are a `u32` byte length followed by UTF-8. Every read checks the
//! remaining input first and reports shortfalls as
//! [`TransitError::CorruptIndex`].

use bytes::{Buf, BufMut, BytesMut};

use crate::models::types::{Result, TransitError};

pub(crate) fn corrupt(reason: impl Into<String>) -> TransitError {
    TransitError::CorruptIndex(reason.into())
}

#[derive(Debug, Default)]
pub(crate) struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn f64(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    /// Collection length; collections never reach `u32::MAX` elements
    pub fn len(&mut self, value: usize) {
        debug_assert!(value <= u32::MAX as usize);
        self.u32(value as u32);
    }

    pub fn str(&mut self, value: &str) {
        self.len(value.len());
        self.buf.put_slice(value.as_bytes());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

#[derive(Debug)]
pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn ensure(&self, needed: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(corrupt(format!(
                "truncated while reading {what}: need {needed} bytes, {} left",
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        self.ensure(len, what)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn u8(&mut self, what: &str) -> Result<u8> {
        self.ensure(1, what)?;
        Ok(self.buf.get_u8())
    }

    pub fn bool(&mut self, what: &str) -> Result<bool> {
        match self.u8(what)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(corrupt(format!("invalid flag {other} for {what}"))),
        }
    }

    pub fn u16(&mut self, what: &str) -> Result<u16> {
        self.ensure(2, what)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn u32(&mut self, what: &str) -> Result<u32> {
        self.ensure(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn i32(&mut self, what: &str) -> Result<i32> {
        self.ensure(4, what)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn f64(&mut self, what: &str) -> Result<f64> {
        self.ensure(8, what)?;
        Ok(self.buf.get_f64_le())
    }

    /// Collection length, rejected early if the input cannot possibly hold
    /// that many elements of at least `min_element_size` bytes.
    pub fn len(&mut self, min_element_size: usize, what: &str) -> Result<usize> {
        let len = self.u32(what)? as usize;
        if len.saturating_mul(min_element_size) > self.buf.remaining() {
            return Err(corrupt(format!(
                "{what} claims {len} elements but only {} bytes remain",
                self.buf.remaining()
            )));
        }
        Ok(len)
    }

    pub fn string(&mut self, what: &str) -> Result<String> {
        let len = self.len(1, what)?;
        let raw = self.bytes(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| corrupt(format!("{what} is not UTF-8")))
    }

    pub fn finish(self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(corrupt(format!("{} trailing bytes", self.buf.remaining())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_little_endian() {
        let mut encoder = Encoder::new();
        encoder.u32(0x0102_0304);
        encoder.i32(-1);
        encoder.str("ab");

        assert_eq!(
            encoder.finish(),
            vec![4, 3, 2, 1, 0xff, 0xff, 0xff, 0xff, 2, 0, 0, 0, b'a', b'b']
        );
    }

    #[test]
    fn test_primitives_read_back() {
        let mut encoder = Encoder::new();
        encoder.u8(7);
        encoder.bool(true);
        encoder.u16(513);
        encoder.f64(-0.25);
        encoder.str("Улица Лизы Чайкиной");
        let bytes = encoder.finish();

        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.u8("u8").unwrap(), 7);
        assert!(decoder.bool("flag").unwrap());
        assert_eq!(decoder.u16("u16").unwrap(), 513);
        assert_eq!(decoder.f64("f64").unwrap(), -0.25);
        assert_eq!(decoder.string("name").unwrap(), "Улица Лизы Чайкиной");
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_truncated_input() {
        let mut decoder = Decoder::new(&[1, 2, 3]);
        let err = decoder.u32("stop count").unwrap_err();

        assert!(matches!(err, TransitError::CorruptIndex(msg) if msg.contains("stop count")));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut encoder = Encoder::new();
        encoder.u32(1_000_000);
        encoder.u32(0);
        let bytes = encoder.finish();

        let mut decoder = Decoder::new(&bytes);
        assert!(decoder.len(4, "edges").is_err());
    }

    #[test]
    fn test_invalid_flag_and_utf8() {
        assert!(Decoder::new(&[2]).bool("flag").is_err());
        assert!(Decoder::new(&[1, 0, 0, 0, 0xff]).string("name").is_err());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut decoder = Decoder::new(&[1, 2]);
        decoder.u8("first").unwrap();
        assert!(decoder.finish().is_err());
    }
}
