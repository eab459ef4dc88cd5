use std::borrow::Cow;

/// Partial percent-decoding.
///
/// Route declarations are decoded in full before validation. Request paths are decoded with `/`
/// protected so that an encoded slash never introduces a new segment.
pub struct Quoter {
    /// Simple bit-map of protected values in the 0-127 ASCII range.
    protected_table: [u8; 16],
}

impl Quoter {
    /// Constructs a new `Quoter` that leaves escape sequences of the `protected` bytes untouched.
    ///
    /// # Panics
    /// Panics if any of the `protected` bytes is not in the 0-127 ASCII range.
    pub const fn new(protected: &[u8]) -> Quoter {
        let mut protected_table = [0; 16];

        let mut idx = 0;
        while idx < protected.len() {
            let ch = protected[idx];
            protected_table[(ch >> 3) as usize] |= 0b1 << (ch & 0b111);
            idx += 1;
        }

        Quoter { protected_table }
    }

    /// Decodes the next escape sequence, if any, and advances `val`.
    #[inline(always)]
    fn decode_next<'a>(&self, val: &mut &'a [u8]) -> Option<(&'a [u8], u8)> {
        for i in 0..val.len() {
            if let (prev, [b'%', p1, p2, rem @ ..]) = val.split_at(i) {
                if let Some(ch) = hex_pair_to_char(*p1, *p2)
                    .filter(|&ch| !(ch < 128 && bit_at(&self.protected_table, ch)))
                {
                    *val = rem;
                    return Some((prev, ch));
                }
            }
        }

        None
    }

    /// Partially percent-decodes the given bytes.
    ///
    /// Returns `None` when no modification to the original bytes was required. Invalid or
    /// incomplete escape sequences are passed through unmodified.
    pub fn requote(&self, val: &[u8]) -> Option<Vec<u8>> {
        let mut remaining = val;

        let (prev, ch) = self.decode_next(&mut remaining)?;
        let mut buf = Vec::<u8>::with_capacity(val.len());
        buf.extend_from_slice(prev);
        buf.push(ch);

        while let Some((prev, ch)) = self.decode_next(&mut remaining) {
            buf.extend_from_slice(prev);
            buf.push(ch);
        }

        buf.extend_from_slice(remaining);
        Some(buf)
    }

    /// Decodes `val`, replacing invalid UTF-8 produced by decoding with U+FFFD.
    pub fn decode<'a>(&self, val: &'a str) -> Cow<'a, str> {
        match self.requote(val.as_bytes()) {
            Some(data) => Cow::Owned(String::from_utf8_lossy(&data).into_owned()),
            None => Cow::Borrowed(val),
        }
    }
}

/// Decodes everything.
pub(crate) static FULL_QUOTER: Quoter = Quoter::new(b"");

/// Decodes everything except `%2F`.
pub(crate) static PATH_QUOTER: Quoter = Quoter::new(b"/");

/// Decode a ASCII hex-encoded pair to an integer.
///
/// Returns `None` if either portion of the decoded pair does not evaluate to a valid hex value.
#[inline(always)]
fn hex_pair_to_char(d1: u8, d2: u8) -> Option<u8> {
    let d_high = char::from(d1).to_digit(16)?;
    let d_low = char::from(d2).to_digit(16)?;

    Some((d_high as u8) << 4 | (d_low as u8))
}

/// Returns true if bit is set in given bit-map.
fn bit_at(array: &[u8; 16], ch: u8) -> bool {
    array[(ch >> 3) as usize] & (0b1 << (ch & 0b111)) != 0
}
