use std::fmt::{self, Debug, Formatter};

use ndarray::{ErrorKind, ShapeError};

const HEADER_SIZE: usize = std::mem::size_of::<u32>();

/// A builder for serializing multiple UTF-8 strings to a flat byte array.
///
/// Each string is written as a little-endian `u32` length followed by its
/// bytes.
///
/// # Examples
///
/// ```rust
/// # use hotg_rune_proc_blocks::StringBuilder;
/// let mut builder = StringBuilder::new();
/// builder.push("this").push("is").push("a").push("sentence");
///
/// let buffer: Vec<u8> = builder.finish();
///
/// let strings: Vec<&str> = hotg_rune_proc_blocks::decode_strings(&buffer)?;
///
/// assert_eq!(strings, &["this", "is", "a", "sentence"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default, PartialEq, Eq)]
pub struct StringBuilder {
    buffer: Vec<u8>,
}

impl StringBuilder {
    pub const fn new() -> Self { StringBuilder { buffer: Vec::new() } }

    /// Consume the [`StringBuilder`], returning the buffer.
    pub fn finish(self) -> Vec<u8> { self.buffer }

    /// Add a string to the buffer.
    ///
    /// # Panics
    ///
    /// Strings longer than `u32::MAX` bytes can't be encoded.
    pub fn push(&mut self, string: &str) -> &mut Self {
        let length = u32::try_from(string.len())
            .expect("The string length doesn't fit in a u32");
        self.buffer.extend(length.to_le_bytes());
        self.buffer.extend(string.as_bytes());

        self
    }
}

impl<'a> Extend<&'a str> for StringBuilder {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for s in iter {
            self.push(s);
        }
    }
}

impl Debug for StringBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringBuilder")
            .field("bytes", &self.buffer.len())
            .finish()
    }
}

/// Decode a list of strings from their serialized form.
///
/// See [`StringBuilder`] for how to serialize a list of strings.
pub fn decode_strings(raw: &[u8]) -> Result<Vec<&str>, ShapeError> {
    let mut strings = Vec::new();
    let mut buffer = raw;

    while !buffer.is_empty() {
        if buffer.len() < HEADER_SIZE {
            // truncated length header
            return Err(ShapeError::from_kind(ErrorKind::OutOfBounds));
        }

        let (header, rest) = buffer.split_at(HEADER_SIZE);
        let mut length = [0_u8; HEADER_SIZE];
        length.copy_from_slice(header);
        let length = u32::from_le_bytes(length) as usize;

        if rest.len() < length {
            return Err(ShapeError::from_kind(ErrorKind::OutOfBounds));
        }

        let (s, rest) = rest.split_at(length);

        // ndarray has no "bad encoding" kind, so invalid UTF-8 is reported
        // as an incompatible layout.
        let s = std::str::from_utf8(s).map_err(|_| {
            ShapeError::from_kind(ErrorKind::IncompatibleLayout)
        })?;
        strings.push(s);

        buffer = rest;
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_some_strings() {
        let mut builder = StringBuilder::new();
        builder.push("this").push("is").push("").push("sentence");
        let buffer = builder.finish();

        let strings = decode_strings(&buffer).unwrap();

        assert_eq!(strings, &["this", "is", "", "sentence"]);
    }

    #[test]
    fn truncated_buffers_are_rejected() {
        let mut builder = StringBuilder::new();
        builder.push("hello");
        let mut buffer = builder.finish();
        buffer.pop();

        let err = decode_strings(&buffer).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let buffer = [1_u8, 0, 0, 0, 0xff];

        let err = decode_strings(&buffer).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IncompatibleLayout);
    }
}
