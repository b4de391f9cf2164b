use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::escape::{EscapeStep, UnicodeEscape};
use crate::ExtractionEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEndOfInput { offset: usize },
    #[error("unexpected byte {byte:#04x} in state {state} at offset {offset}")]
    UnexpectedByte {
        state: &'static str,
        byte: u8,
        offset: usize,
    },
    #[error("invalid escape at offset {offset}: {reason}")]
    InvalidEscape { reason: &'static str, offset: usize },
    #[error("invalid UTF-8 in string ending at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode(UnicodeEscape),
    // A high surrogate was decoded; `\` then `u` must follow.
    LowBackslash(u16),
    LowU(u16),
}

/// Position inside `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Number {
    Minus,
    Zero,
    Int,
    Dot,
    Frac,
    Exp,
    ExpSign,
    ExpDigits,
}

impl Number {
    fn advance(self, byte: u8) -> Option<Number> {
        use Number::*;
        match (self, byte) {
            (Minus, b'0') => Some(Zero),
            (Minus, b'1'..=b'9') => Some(Int),
            (Int, b'0'..=b'9') => Some(Int),
            (Zero | Int, b'.') => Some(Dot),
            (Dot | Frac, b'0'..=b'9') => Some(Frac),
            (Zero | Int | Frac, b'e' | b'E') => Some(Exp),
            (Exp, b'+' | b'-') => Some(ExpSign),
            (Exp | ExpSign | ExpDigits, b'0'..=b'9') => Some(ExpDigits),
            _ => None,
        }
    }

    fn can_end(self) -> bool {
        matches!(self, Number::Zero | Number::Int | Number::Frac | Number::ExpDigits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectValue,
    InObjectExpectKeyOrEnd,
    InObjectExpectKey,
    InObjectAfterKeyExpectColon,
    InObjectExpectValue,
    InObjectAfterValueExpectCommaOrEnd,
    InArrayExpectValueOrEnd,
    InArrayExpectValue,
    InArrayAfterValueExpectCommaOrEnd,
    InString { is_key: bool, escape: Escape },
    InNumber(Number),
    InLiteral { expected: &'static [u8], matched: usize },
    AfterDocument,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::ExpectValue => "ExpectValue",
            State::InObjectExpectKeyOrEnd => "InObjectExpectKeyOrEnd",
            State::InObjectExpectKey => "InObjectExpectKey",
            State::InObjectAfterKeyExpectColon => "InObjectAfterKeyExpectColon",
            State::InObjectExpectValue => "InObjectExpectValue",
            State::InObjectAfterValueExpectCommaOrEnd => "InObjectAfterValueExpectCommaOrEnd",
            State::InArrayExpectValueOrEnd => "InArrayExpectValueOrEnd",
            State::InArrayExpectValue => "InArrayExpectValue",
            State::InArrayAfterValueExpectCommaOrEnd => "InArrayAfterValueExpectCommaOrEnd",
            State::InString { .. } => "InString",
            State::InNumber(_) => "InNumber",
            State::InLiteral { .. } => "InLiteral",
            State::AfterDocument => "AfterDocument",
        }
    }
}

enum Step {
    Consume,
    // The byte terminated a number and must be looked at again in the new state.
    Retry,
    Emit(ExtractionEvent),
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// A resumable JSON scanner that reports object keys and string values.
///
/// Bytes handed to [`feed`](Self::feed) are buffered and scanned lazily: the
/// returned iterator only advances through the input far enough to produce
/// the next event. Unscanned bytes stay buffered until the next `feed` or
/// [`finish`](Self::finish), so a consumer that stops pulling also stops the
/// parser.
///
/// ```
/// use stream_capitalizer::{ExtractionEvent, IncrementalParser};
///
/// let mut parser = IncrementalParser::new();
/// let mut events = Vec::new();
/// for chunk in [&b"{\"gre"[..], b"eting\": \"hi\\u00", b"21\"}"] {
///     for event in parser.feed(chunk) {
///         events.push(event.unwrap());
///     }
/// }
/// events.extend(parser.finish().unwrap());
/// assert_eq!(events, vec![
///     ExtractionEvent::Key("greeting".into()),
///     ExtractionEvent::StringValue("hi!".into()),
/// ]);
/// ```
#[derive(Debug)]
pub struct IncrementalParser {
    state: State,
    stack: Vec<Frame>,
    pending: Vec<u8>,
    input: BytesMut,
    // Absolute offset of `input[0]` in the document.
    offset: usize,
    poisoned: Option<ParseError>,
}

impl Default for IncrementalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IncrementalParser {
    pub fn new() -> Self {
        Self {
            state: State::ExpectValue,
            stack: Vec::new(),
            pending: Vec::new(),
            input: BytesMut::new(),
            offset: 0,
            poisoned: None,
        }
    }

    /// Buffers `chunk` and returns a lazy iterator over the events it completes.
    ///
    /// The iterator stops after the first error. An empty chunk is a no-op.
    pub fn feed(&mut self, chunk: &[u8]) -> Events<'_> {
        if !chunk.is_empty() {
            self.input.extend_from_slice(chunk);
        }
        Events {
            parser: self,
            done: false,
        }
    }

    /// Scans buffered bytes until one event is complete or the buffer runs dry.
    pub fn next_event(&mut self) -> Option<Result<ExtractionEvent, ParseError>> {
        if let Some(err) = &self.poisoned {
            return Some(Err(err.clone()));
        }

        let mut pos = 0;
        let result = loop {
            let Some(&byte) = self.input.get(pos) else {
                break None;
            };
            match self.step(byte, self.offset + pos) {
                Ok(Step::Consume) => pos += 1,
                Ok(Step::Retry) => {}
                Ok(Step::Emit(event)) => {
                    pos += 1;
                    break Some(Ok(event));
                }
                Err(err) => {
                    debug!(error = %err, "parse failed");
                    self.poisoned = Some(err.clone());
                    break Some(Err(err));
                }
            }
        };
        self.input.advance(pos);
        self.offset += pos;
        result
    }

    /// Signals end of input.
    ///
    /// Returns the events still buffered, or `UnexpectedEndOfInput` if the
    /// document is incomplete. A top-level number is terminated by the end of
    /// input.
    pub fn finish(&mut self) -> Result<Vec<ExtractionEvent>, ParseError> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event() {
            events.push(event?);
        }

        match self.state {
            State::AfterDocument => Ok(events),
            State::InNumber(number) if number.can_end() && self.stack.is_empty() => {
                self.state = State::AfterDocument;
                Ok(events)
            }
            _ => {
                let err = ParseError::UnexpectedEndOfInput {
                    offset: self.offset,
                };
                self.poisoned = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Bytes fed but not yet scanned.
    pub fn buffered(&self) -> usize {
        self.input.len()
    }

    /// Total bytes scanned so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn unexpected(&self, byte: u8, offset: usize) -> ParseError {
        ParseError::UnexpectedByte {
            state: self.state.name(),
            byte,
            offset,
        }
    }

    fn step(&mut self, byte: u8, at: usize) -> Result<Step, ParseError> {
        match self.state {
            State::InString { is_key, escape } => return self.string_byte(is_key, escape, byte, at),
            State::InNumber(number) => {
                return match number.advance(byte) {
                    Some(next) => {
                        self.state = State::InNumber(next);
                        Ok(Step::Consume)
                    }
                    None if number.can_end() => {
                        self.value_done();
                        Ok(Step::Retry)
                    }
                    None => Err(self.unexpected(byte, at)),
                };
            }
            State::InLiteral { expected, matched } => {
                if expected.get(matched) != Some(&byte) {
                    return Err(self.unexpected(byte, at));
                }
                if matched + 1 == expected.len() {
                    self.value_done();
                } else {
                    self.state = State::InLiteral {
                        expected,
                        matched: matched + 1,
                    };
                }
                return Ok(Step::Consume);
            }
            _ => {}
        }

        if is_whitespace(byte) {
            return Ok(Step::Consume);
        }

        match (self.state, byte) {
            (State::ExpectValue | State::InObjectExpectValue | State::InArrayExpectValue, _) => {
                self.begin_value(byte, at)
            }
            (State::InArrayExpectValueOrEnd, b']') => {
                self.close();
                Ok(Step::Consume)
            }
            (State::InArrayExpectValueOrEnd, _) => self.begin_value(byte, at),
            (State::InObjectExpectKeyOrEnd | State::InObjectExpectKey, b'"') => {
                self.state = State::InString {
                    is_key: true,
                    escape: Escape::None,
                };
                Ok(Step::Consume)
            }
            (State::InObjectExpectKeyOrEnd, b'}') => {
                self.close();
                Ok(Step::Consume)
            }
            (State::InObjectAfterKeyExpectColon, b':') => {
                self.state = State::InObjectExpectValue;
                Ok(Step::Consume)
            }
            (State::InObjectAfterValueExpectCommaOrEnd, b',') => {
                self.state = State::InObjectExpectKey;
                Ok(Step::Consume)
            }
            (State::InObjectAfterValueExpectCommaOrEnd, b'}') => {
                self.close();
                Ok(Step::Consume)
            }
            (State::InArrayAfterValueExpectCommaOrEnd, b',') => {
                self.state = State::InArrayExpectValue;
                Ok(Step::Consume)
            }
            (State::InArrayAfterValueExpectCommaOrEnd, b']') => {
                self.close();
                Ok(Step::Consume)
            }
            _ => Err(self.unexpected(byte, at)),
        }
    }

    fn begin_value(&mut self, byte: u8, at: usize) -> Result<Step, ParseError> {
        self.state = match byte {
            b'"' => State::InString {
                is_key: false,
                escape: Escape::None,
            },
            b'{' => {
                self.stack.push(Frame::Object);
                State::InObjectExpectKeyOrEnd
            }
            b'[' => {
                self.stack.push(Frame::Array);
                State::InArrayExpectValueOrEnd
            }
            b'-' => State::InNumber(Number::Minus),
            b'0' => State::InNumber(Number::Zero),
            b'1'..=b'9' => State::InNumber(Number::Int),
            b't' => State::InLiteral {
                expected: b"true",
                matched: 1,
            },
            b'f' => State::InLiteral {
                expected: b"false",
                matched: 1,
            },
            b'n' => State::InLiteral {
                expected: b"null",
                matched: 1,
            },
            _ => return Err(self.unexpected(byte, at)),
        };
        Ok(Step::Consume)
    }

    fn close(&mut self) {
        self.stack.pop();
        self.value_done();
    }

    fn value_done(&mut self) {
        self.state = match self.stack.last() {
            Some(Frame::Object) => State::InObjectAfterValueExpectCommaOrEnd,
            Some(Frame::Array) => State::InArrayAfterValueExpectCommaOrEnd,
            None => State::AfterDocument,
        };
    }

    fn string_byte(
        &mut self,
        is_key: bool,
        escape: Escape,
        byte: u8,
        at: usize,
    ) -> Result<Step, ParseError> {
        let invalid = |reason| ParseError::InvalidEscape { reason, offset: at };

        let escape = match escape {
            Escape::None => match byte {
                b'"' => return self.complete_string(is_key, at),
                b'\\' => Escape::Backslash,
                0x00..=0x1F => return Err(self.unexpected(byte, at)),
                _ => {
                    self.pending.push(byte);
                    Escape::None
                }
            },
            Escape::Backslash => {
                let decoded = match byte {
                    b'"' => b'"',
                    b'\\' => b'\\',
                    b'/' => b'/',
                    b'b' => 0x08,
                    b'f' => 0x0C,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'u' => {
                        self.state = State::InString {
                            is_key,
                            escape: Escape::Unicode(UnicodeEscape::new()),
                        };
                        return Ok(Step::Consume);
                    }
                    _ => return Err(invalid("unknown escape character")),
                };
                self.pending.push(decoded);
                Escape::None
            }
            Escape::Unicode(mut esc) => match esc.push(byte).map_err(invalid)? {
                EscapeStep::Pending => Escape::Unicode(esc),
                EscapeStep::Char(ch) => {
                    let mut utf8 = [0u8; 4];
                    self.pending
                        .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                    Escape::None
                }
                EscapeStep::HighSurrogate(high) => Escape::LowBackslash(high),
            },
            Escape::LowBackslash(high) if byte == b'\\' => Escape::LowU(high),
            Escape::LowU(high) if byte == b'u' => Escape::Unicode(UnicodeEscape::after_high(high)),
            Escape::LowBackslash(_) | Escape::LowU(_) => {
                return Err(invalid("high surrogate not followed by low surrogate"))
            }
        };

        self.state = State::InString { is_key, escape };
        Ok(Step::Consume)
    }

    fn complete_string(&mut self, is_key: bool, at: usize) -> Result<Step, ParseError> {
        let bytes = std::mem::take(&mut self.pending);
        let text = String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 { offset: at })?;
        trace!(offset = at, depth = self.stack.len(), is_key, "string complete");

        if is_key {
            self.state = State::InObjectAfterKeyExpectColon;
            Ok(Step::Emit(ExtractionEvent::Key(text)))
        } else {
            self.value_done();
            Ok(Step::Emit(ExtractionEvent::StringValue(text)))
        }
    }
}

/// Lazy event iterator returned by [`IncrementalParser::feed`].
pub struct Events<'a> {
    parser: &'a mut IncrementalParser,
    done: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<ExtractionEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.parser.next_event();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
