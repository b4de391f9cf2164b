//! Resumable decoding of `\uXXXX` escapes.
//!
//! The four hex digits of an escape, and the second half of a surrogate pair,
//! may arrive in different chunks, so the accumulator keeps its partial value
//! between calls instead of looking ahead.

/// Outcome of pushing one hex digit into a [`UnicodeEscape`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum EscapeStep {
    /// More digits are needed.
    Pending,
    /// A complete scalar value.
    Char(char),
    /// A high surrogate; a `\uDC00`-`\uDFFF` escape must follow.
    HighSurrogate(u16),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct UnicodeEscape {
    value: u16,
    digits: u8,
    high: Option<u16>,
}

impl UnicodeEscape {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts the low half of a surrogate pair.
    pub(crate) fn after_high(high: u16) -> Self {
        Self {
            value: 0,
            digits: 0,
            high: Some(high),
        }
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<EscapeStep, &'static str> {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err("non-hex digit in \\u escape"),
        };
        self.value = (self.value << 4) | u16::from(nibble);
        self.digits += 1;
        if self.digits < 4 {
            return Ok(EscapeStep::Pending);
        }

        let unit = self.value;
        match (self.high, unit) {
            (None, 0xD800..=0xDBFF) => Ok(EscapeStep::HighSurrogate(unit)),
            (None, 0xDC00..=0xDFFF) => Err("unpaired low surrogate"),
            (None, _) => char::from_u32(u32::from(unit))
                .map(EscapeStep::Char)
                .ok_or("invalid code point"),
            (Some(high), 0xDC00..=0xDFFF) => {
                let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                char::from_u32(code)
                    .map(EscapeStep::Char)
                    .ok_or("invalid surrogate pair")
            }
            (Some(_), _) => Err("high surrogate not followed by low surrogate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(esc: &mut UnicodeEscape, digits: &[u8]) -> Result<EscapeStep, &'static str> {
        let mut last = Ok(EscapeStep::Pending);
        for &d in digits {
            last = esc.push(d);
            if last.is_err() {
                break;
            }
        }
        last
    }

    #[test]
    fn decodes_bmp_code_point() {
        let mut esc = UnicodeEscape::new();
        assert_eq!(feed(&mut esc, b"00e9"), Ok(EscapeStep::Char('é')));
    }

    #[test]
    fn decodes_surrogate_pair() {
        let mut esc = UnicodeEscape::new();
        assert_eq!(feed(&mut esc, b"D83D"), Ok(EscapeStep::HighSurrogate(0xD83D)));
        let mut low = UnicodeEscape::after_high(0xD83D);
        assert_eq!(feed(&mut low, b"de00"), Ok(EscapeStep::Char('😀')));
    }

    #[test]
    fn rejects_lone_low_surrogate() {
        let mut esc = UnicodeEscape::new();
        assert!(feed(&mut esc, b"DC00").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let mut esc = UnicodeEscape::new();
        assert!(feed(&mut esc, b"00g").is_err());
    }
}
