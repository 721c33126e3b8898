//! Chunk-resumable JSON parser.
//!
//! The parser is a character-level state machine with an explicit stack, so
//! a document can arrive in arbitrary pieces: `feed` consumes one chunk and
//! returns, keeping every partially parsed token and container, and `flush`
//! signals end of input. Feeding a document whole or split at any character
//! boundary produces the same result and the same final position.
//!
//! Literal tokens are only closed by the character that follows them, which
//! is why `true` stays in state `true` until a delimiter, whitespace, or end
//! of input arrives.
//!
//! # Key design decisions
//!
//! - **Parallel stacks**: `states` tracks the grammar position and `frames`
//!   holds one open container per container state on it. A completed token
//!   waits in `pending` until the next character decides where it goes.
//! - **Poisoning**: the first error is stored and repeated by every later
//!   call, because a partially consumed stream cannot be resynchronized.
//! - **Line/column**: both 0-based. A newline advances the line and resets
//!   the column; every other character, `\r` included, advances the column.

use crate::array::Array;
use crate::error::ParseError;
use crate::node::Node;
use crate::object::Object;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Grammar position of the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Before the top-level value.
    Begin,
    T,
    Tr,
    Tru,
    True,
    F,
    Fa,
    Fal,
    Fals,
    False,
    N,
    Nu,
    Nul,
    Null,
    /// After `[`.
    ArrayBegin,
    /// After an element, before `,` or `]`.
    ArraySep,
    /// After `,`, expecting an element.
    ArrayNext,
    /// After `]`.
    ArrayEnd,
    /// After `{`.
    ObjectBegin,
    /// After a key, before `:`.
    ObjectSep1,
    /// After `:`, expecting a value.
    ObjectValue,
    /// After a value, before `,` or `}`.
    ObjectSep2,
    /// After `,`, expecting a key.
    ObjectNext,
    /// After `}`.
    ObjectEnd,
    /// Integer part, including a leading sign.
    Digit,
    /// After the decimal point.
    FracDigit,
    /// After `e`/`E`.
    Exponent,
    /// Exponent sign or digits.
    ExponentDigit,
    String,
    /// After a backslash inside a string.
    StringEscape,
    /// Inside a `\uXXXX` escape.
    StringUnicode,
    /// After the closing quote.
    StringEnd,
    /// The top-level value is complete.
    End,
}

impl State {
    pub fn name(self) -> &'static str {
        match self {
            State::Begin => "begin",
            State::T => "t",
            State::Tr => "tr",
            State::Tru => "tru",
            State::True => "true",
            State::F => "f",
            State::Fa => "fa",
            State::Fal => "fal",
            State::Fals => "fals",
            State::False => "false",
            State::N => "n",
            State::Nu => "nu",
            State::Nul => "nul",
            State::Null => "null",
            State::ArrayBegin => "array-begin",
            State::ArraySep => "array-sep",
            State::ArrayNext => "array-next",
            State::ArrayEnd => "array-end",
            State::ObjectBegin => "object-begin",
            State::ObjectSep1 => "object-sep1",
            State::ObjectValue => "object-value",
            State::ObjectSep2 => "object-sep2",
            State::ObjectNext => "object-next",
            State::ObjectEnd => "object-end",
            State::Digit => "digit",
            State::FracDigit => "frac-digit",
            State::Exponent => "exponent",
            State::ExponentDigit => "exponent-digit",
            State::String => "string",
            State::StringEscape => "string-escape",
            State::StringUnicode => "string-unicode",
            State::StringEnd => "string-end",
            State::End => "end",
        }
    }

    /// Next letter of a partially matched `true`/`false`/`null`.
    fn literal_step(self) -> Option<(char, State)> {
        match self {
            State::T => Some(('r', State::Tr)),
            State::Tr => Some(('u', State::Tru)),
            State::Tru => Some(('e', State::True)),
            State::F => Some(('a', State::Fa)),
            State::Fa => Some(('l', State::Fal)),
            State::Fal => Some(('s', State::Fals)),
            State::Fals => Some(('e', State::False)),
            State::N => Some(('u', State::Nu)),
            State::Nu => Some(('l', State::Nul)),
            State::Nul => Some(('l', State::Null)),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the parser is: the 0-based line (count of `\n` seen), the column
/// (characters consumed since the last `\n`), and the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub state: State,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.line, self.column, self.state)
    }
}

/// An open container.
#[derive(Debug)]
enum Frame {
    Array(Array),
    Object { object: Object, key: Option<String> },
}

/// Progress through a `\uXXXX` escape, and a high surrogate waiting for its
/// low half.
#[derive(Debug, Default)]
struct Unicode {
    digits: u8,
    code: u32,
    high: Option<u32>,
}

/// Incremental parser. See the module docs.
///
/// ```
/// use jsontree::{node, Parser, State};
///
/// let mut parser = Parser::new();
/// parser.feed("{\"a\": [1, 2").unwrap();
/// assert_eq!(parser.position().state, State::Digit);
/// parser.feed("]}").unwrap();
/// assert_eq!(parser.finish().unwrap(), node!({"a": [1, 2]}));
/// ```
#[derive(Debug)]
pub struct Parser {
    line: usize,
    column: usize,
    states: Vec<State>,
    frames: Vec<Frame>,
    pending: Option<Node>,
    scratch: String,
    unicode: Unicode,
    root: Option<Node>,
    failed: Option<ParseError>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C')
}

impl Parser {
    pub fn new() -> Self {
        Self {
            line: 0,
            column: 0,
            states: vec![State::Begin],
            frames: Vec::new(),
            pending: None,
            scratch: String::new(),
            unicode: Unicode::default(),
            root: None,
            failed: None,
        }
    }

    /// Consume one chunk of input.
    ///
    /// Once an error has been returned the parser is poisoned and every
    /// later call returns the same error.
    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        for ch in chunk.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
            self.step(Some(ch)).map_err(|err| self.poison(err))?;
        }
        Ok(())
    }

    /// Signal end of input. Fails unless exactly one complete value was read.
    pub fn flush(&mut self) -> Result<(), ParseError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        self.step(None).map_err(|err| self.poison(err))
    }

    /// Flush and hand over the parsed document.
    pub fn finish(mut self) -> Result<Node, ParseError> {
        self.flush()?;
        match self.root.take() {
            Some(root) => Ok(root),
            None => Err(self.syntax(None, "no value was parsed")),
        }
    }

    /// The parsed document, once the top-level value has been followed by
    /// whitespace or [`Parser::flush`]. This can happen before the input ends;
    /// later `feed` and `flush` calls still reject trailing garbage.
    pub fn value(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            state: self.state(),
        }
    }

    /// True once a complete document has been flushed.
    pub fn is_done(&self) -> bool {
        self.root.is_some()
    }

    fn state(&self) -> State {
        self.states.last().copied().unwrap_or(State::End)
    }

    fn set_state(&mut self, state: State) {
        match self.states.last_mut() {
            Some(top) => *top = state,
            None => self.states.push(state),
        }
    }

    fn poison(&mut self, err: ParseError) -> ParseError {
        debug!(
            line = self.line,
            column = self.column,
            state = %self.state(),
            error = %err,
            "rejected input"
        );
        self.failed = Some(err.clone());
        err
    }

    fn syntax(&self, found: Option<char>, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            column: self.column,
            state: self.state(),
            found,
            message: message.into(),
        }
    }

    fn unexpected(&self, found: Option<char>) -> ParseError {
        match found {
            Some(c) => self.syntax(found, format!("unexpected character {:?}", c)),
            None => self.syntax(None, "unexpected end of input"),
        }
    }

    fn out_of_range(&self) -> ParseError {
        ParseError::NumericRange {
            line: self.line,
            column: self.column,
            literal: self.scratch.clone(),
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn step(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        let state = self.state();
        match state {
            State::Begin | State::ArrayNext | State::ObjectValue => self.begin_value(ch),
            State::ArrayBegin => match ch {
                Some(']') => self.close_array(ch),
                _ => self.begin_value(ch),
            },
            State::ArraySep => match ch {
                Some(',') => {
                    self.set_state(State::ArrayNext);
                    Ok(())
                }
                Some(']') => self.close_array(ch),
                Some(c) if is_whitespace(c) => Ok(()),
                _ => Err(self.unexpected(ch)),
            },
            State::ObjectBegin => match ch {
                Some('}') => self.close_object(ch),
                _ => self.begin_key(ch),
            },
            State::ObjectNext => self.begin_key(ch),
            State::ObjectSep1 => match ch {
                Some(':') => {
                    self.set_state(State::ObjectValue);
                    Ok(())
                }
                Some(c) if is_whitespace(c) => Ok(()),
                _ => Err(self.unexpected(ch)),
            },
            State::ObjectSep2 => match ch {
                Some(',') => {
                    self.set_state(State::ObjectNext);
                    Ok(())
                }
                Some('}') => self.close_object(ch),
                Some(c) if is_whitespace(c) => Ok(()),
                _ => Err(self.unexpected(ch)),
            },
            State::T
            | State::Tr
            | State::Tru
            | State::F
            | State::Fa
            | State::Fal
            | State::Fals
            | State::N
            | State::Nu
            | State::Nul => match state.literal_step() {
                Some((expected, next)) if ch == Some(expected) => {
                    self.set_state(next);
                    Ok(())
                }
                _ => Err(self.unexpected(ch)),
            },
            State::True => self.complete(Node::Boolean(true), ch),
            State::False => self.complete(Node::Boolean(false), ch),
            State::Null => self.complete(Node::Null, ch),
            State::StringEnd | State::ArrayEnd | State::ObjectEnd => match self.pending.take() {
                Some(value) => self.complete(value, ch),
                None => Err(self.syntax(ch, "closed token has no value")),
            },
            State::Digit => match ch {
                Some(c @ '0'..='9') => self.push_scratch(c),
                Some('.') => {
                    self.scratch.push('.');
                    self.set_state(State::FracDigit);
                    Ok(())
                }
                Some(c @ ('e' | 'E')) => {
                    self.scratch.push(c);
                    self.set_state(State::Exponent);
                    Ok(())
                }
                _ => {
                    let value = self.integer(ch)?;
                    self.complete(value, ch)
                }
            },
            State::FracDigit => match ch {
                Some(c @ '0'..='9') => self.push_scratch(c),
                Some(c @ ('e' | 'E')) => {
                    self.scratch.push(c);
                    self.set_state(State::Exponent);
                    Ok(())
                }
                _ => {
                    let value = self.float(ch)?;
                    self.complete(value, ch)
                }
            },
            State::Exponent => match ch {
                Some(c @ ('0'..='9' | '+' | '-')) => {
                    self.scratch.push(c);
                    self.set_state(State::ExponentDigit);
                    Ok(())
                }
                _ => Err(self.unexpected(ch)),
            },
            State::ExponentDigit => match ch {
                Some(c @ '0'..='9') => self.push_scratch(c),
                _ => {
                    let value = self.float(ch)?;
                    self.complete(value, ch)
                }
            },
            State::String => self.string_char(ch),
            State::StringEscape => self.escape_char(ch),
            State::StringUnicode => self.unicode_digit(ch),
            State::End => match ch {
                None => Ok(()),
                Some(c) if is_whitespace(c) => Ok(()),
                Some(_) => Err(self.unexpected(ch)),
            },
        }
    }

    fn push_scratch(&mut self, c: char) -> Result<(), ParseError> {
        self.scratch.push(c);
        Ok(())
    }

    fn begin_value(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        let next = match ch {
            Some(c) if is_whitespace(c) => return Ok(()),
            Some('"') => {
                self.scratch.clear();
                State::String
            }
            Some('t') => State::T,
            Some('f') => State::F,
            Some('n') => State::N,
            Some('[') => {
                self.frames.push(Frame::Array(Array::new()));
                State::ArrayBegin
            }
            Some('{') => {
                self.frames.push(Frame::Object {
                    object: Object::new(),
                    key: None,
                });
                State::ObjectBegin
            }
            Some(c @ ('-' | '+' | '0'..='9')) => {
                self.scratch.clear();
                self.scratch.push(c);
                State::Digit
            }
            Some('.') => {
                self.scratch.clear();
                self.scratch.push('.');
                State::FracDigit
            }
            _ => return Err(self.unexpected(ch)),
        };
        self.states.push(next);
        Ok(())
    }

    fn begin_key(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        match ch {
            Some('"') => {
                self.scratch.clear();
                self.states.push(State::String);
                Ok(())
            }
            Some(c) if is_whitespace(c) => Ok(()),
            _ => Err(self.unexpected(ch)),
        }
    }

    fn close_array(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        match self.frames.pop() {
            Some(Frame::Array(array)) => {
                self.pending = Some(Node::Array(array));
                self.set_state(State::ArrayEnd);
                Ok(())
            }
            _ => Err(self.syntax(ch, "no open array")),
        }
    }

    fn close_object(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        match self.frames.pop() {
            Some(Frame::Object { object, .. }) => {
                self.pending = Some(Node::Object(object));
                self.set_state(State::ObjectEnd);
                Ok(())
            }
            _ => Err(self.syntax(ch, "no open object")),
        }
    }

    /// A token finished on `ch`: pop its state and hand `value` to the
    /// enclosing context, which then interprets `ch` itself.
    fn complete(&mut self, value: Node, ch: Option<char>) -> Result<(), ParseError> {
        self.states.pop();
        match self.state() {
            State::Begin => match ch {
                None => {
                    self.root = Some(value);
                    self.set_state(State::End);
                    Ok(())
                }
                Some(c) if is_whitespace(c) => {
                    self.root = Some(value);
                    self.set_state(State::End);
                    Ok(())
                }
                Some(_) => Err(self.unexpected(ch)),
            },
            State::ArrayBegin | State::ArrayNext => {
                match self.frames.last_mut() {
                    Some(Frame::Array(array)) => array.push(value),
                    _ => return Err(self.syntax(ch, "no open array")),
                }
                match ch {
                    Some(',') => {
                        self.set_state(State::ArrayNext);
                        Ok(())
                    }
                    Some(']') => self.close_array(ch),
                    Some(c) if is_whitespace(c) => {
                        self.set_state(State::ArraySep);
                        Ok(())
                    }
                    _ => Err(self.unexpected(ch)),
                }
            }
            State::ObjectBegin | State::ObjectNext => {
                let Node::String(name) = value else {
                    return Err(self.syntax(ch, "object keys must be strings"));
                };
                match self.frames.last_mut() {
                    Some(Frame::Object { key, .. }) => *key = Some(name),
                    _ => return Err(self.syntax(ch, "no open object")),
                }
                match ch {
                    Some(':') => {
                        self.set_state(State::ObjectValue);
                        Ok(())
                    }
                    Some(c) if is_whitespace(c) => {
                        self.set_state(State::ObjectSep1);
                        Ok(())
                    }
                    _ => Err(self.unexpected(ch)),
                }
            }
            State::ObjectValue => {
                match self.frames.last_mut() {
                    Some(Frame::Object { object, key }) => match key.take() {
                        Some(name) => {
                            object.set(name, value);
                        }
                        None => return Err(self.syntax(ch, "value without a key")),
                    },
                    _ => return Err(self.syntax(ch, "no open object")),
                }
                match ch {
                    Some(',') => {
                        self.set_state(State::ObjectNext);
                        Ok(())
                    }
                    Some('}') => self.close_object(ch),
                    Some(c) if is_whitespace(c) => {
                        self.set_state(State::ObjectSep2);
                        Ok(())
                    }
                    _ => Err(self.unexpected(ch)),
                }
            }
            _ => Err(self.unexpected(ch)),
        }
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn integer(&self, ch: Option<char>) -> Result<Node, ParseError> {
        use std::num::IntErrorKind;

        match self.scratch.parse::<i64>() {
            Ok(v) => Ok(Node::Integer(v)),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(self.out_of_range())
            }
            Err(_) => Err(self.syntax(ch, format!("invalid number `{}`", self.scratch))),
        }
    }

    /// Overflow to infinity and underflow of a nonzero literal to zero are
    /// both range errors.
    fn float(&self, ch: Option<char>) -> Result<Node, ParseError> {
        let v: f64 = self
            .scratch
            .parse()
            .map_err(|_| self.syntax(ch, format!("invalid number `{}`", self.scratch)))?;
        if v.is_infinite() {
            return Err(self.out_of_range());
        }
        if v == 0.0 {
            let mantissa = self.scratch.split(['e', 'E']).next().unwrap_or_default();
            if mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')) {
                return Err(self.out_of_range());
            }
        }
        Ok(Node::Float(v))
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn string_char(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        if self.unicode.high.is_some() && ch != Some('\\') {
            return Err(self.syntax(ch, "unpaired surrogate in \\u escape"));
        }
        match ch {
            Some('"') => {
                let text = std::mem::take(&mut self.scratch);
                self.pending = Some(Node::String(text));
                self.set_state(State::StringEnd);
            }
            Some('\\') => self.set_state(State::StringEscape),
            Some(c) => self.scratch.push(c),
            None => return Err(self.unexpected(ch)),
        }
        Ok(())
    }

    fn escape_char(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        if self.unicode.high.is_some() && ch != Some('u') {
            return Err(self.syntax(ch, "unpaired surrogate in \\u escape"));
        }
        let decoded = match ch {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                self.unicode.digits = 0;
                self.unicode.code = 0;
                self.set_state(State::StringUnicode);
                return Ok(());
            }
            Some(c) => return Err(self.syntax(ch, format!("invalid escape `\\{}`", c))),
            None => return Err(self.unexpected(ch)),
        };
        self.scratch.push(decoded);
        self.set_state(State::String);
        Ok(())
    }

    fn unicode_digit(&mut self, ch: Option<char>) -> Result<(), ParseError> {
        let Some(digit) = ch.and_then(|c| c.to_digit(16)) else {
            return Err(match ch {
                Some(c) => self.syntax(ch, format!("invalid hex digit {:?} in \\u escape", c)),
                None => self.unexpected(ch),
            });
        };
        self.unicode.code = self.unicode.code * 16 + digit;
        self.unicode.digits += 1;
        if self.unicode.digits < 4 {
            return Ok(());
        }

        let code = self.unicode.code;
        let decoded = match (self.unicode.high.take(), code) {
            (Some(high), 0xDC00..=0xDFFF) => {
                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00))
            }
            (Some(_), _) | (None, 0xDC00..=0xDFFF) => None,
            (None, 0xD800..=0xDBFF) => {
                self.unicode.high = Some(code);
                self.set_state(State::String);
                return Ok(());
            }
            (None, _) => char::from_u32(code),
        };
        match decoded {
            Some(c) => {
                self.scratch.push(c);
                self.set_state(State::String);
                Ok(())
            }
            None => Err(self.syntax(ch, "unpaired surrogate in \\u escape")),
        }
    }
}

/// Parse a complete document in one call.
///
/// ```
/// use jsontree::{node, parse};
///
/// assert_eq!(parse(" [1, 2.5, \"x\"] ").unwrap(), node!([1, 2.5, "x"]));
/// assert!(parse("[1, 2").is_err());
/// ```
pub fn parse(text: &str) -> Result<Node, ParseError> {
    let mut parser = Parser::new();
    parser.feed(text)?;
    parser.finish()
}

impl FromStr for Node {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
