//! Serialize a node tree back to JSON text.
//!
//! Output is compact by default. Pretty output puts every element and pair
//! on its own line, indented by `indent_width` spaces per level, with `": "`
//! between key and value. Empty containers stay on one line as `[]` / `{}`.
//!
//! Floats always carry a decimal point (`1.0`, `1.0e20`) so that they parse
//! back as floats, and non-finite floats are written as `null`. `Undefined`
//! is also written as `null`.

use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Formatting switches.
///
/// ```
/// use jsontree::{node, to_string, FormatOptions};
///
/// let doc = node!({"a": [1]});
/// assert_eq!(to_string(&doc, &FormatOptions::compact()), r#"{"a":[1]}"#);
/// assert_eq!(
///     to_string(&doc, &FormatOptions::pretty()),
///     "{\n  \"a\": [\n    1\n  ]\n}"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// One element or pair per line.
    pub pretty: bool,
    /// Indentation of the root's nesting level, in spaces.
    pub indent: usize,
    /// Spaces added per nesting level.
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 0,
            indent_width: 2,
        }
    }
}

impl FormatOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Format `node` into a new string.
pub fn to_string(node: &Node, options: &FormatOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_json(&mut out, node, options);
    out
}

/// Format `node` into any [`fmt::Write`] sink.
pub fn write_json<W: Write>(out: &mut W, node: &Node, options: &FormatOptions) -> fmt::Result {
    write_node(out, node, options, options.indent)
}

fn write_node<W: Write>(out: &mut W, node: &Node, options: &FormatOptions, indent: usize) -> fmt::Result {
    match node {
        Node::Null | Node::Undefined => out.write_str("null"),
        Node::Boolean(b) => out.write_str(if *b { "true" } else { "false" }),
        Node::Integer(i) => write!(out, "{}", i),
        Node::Float(f) => write_float(out, *f),
        Node::String(s) => write_string(out, s),
        Node::Array(array) => {
            if array.is_empty() {
                return out.write_str("[]");
            }
            let inner = indent + options.indent_width;
            out.write_char('[')?;
            for (i, item) in array.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                if options.pretty {
                    newline(out, inner)?;
                }
                write_node(out, item, options, inner)?;
            }
            if options.pretty {
                newline(out, indent)?;
            }
            out.write_char(']')
        }
        Node::Object(object) => {
            if object.is_empty() {
                return out.write_str("{}");
            }
            let inner = indent + options.indent_width;
            out.write_char('{')?;
            for (i, (key, value)) in object.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                if options.pretty {
                    newline(out, inner)?;
                }
                write_string(out, key)?;
                out.write_str(if options.pretty { ": " } else { ":" })?;
                write_node(out, value, options, inner)?;
            }
            if options.pretty {
                newline(out, indent)?;
            }
            out.write_char('}')
        }
    }
}

fn newline<W: Write>(out: &mut W, indent: usize) -> fmt::Result {
    out.write_char('\n')?;
    for _ in 0..indent {
        out.write_char(' ')?;
    }
    Ok(())
}

fn write_float<W: Write>(out: &mut W, f: f64) -> fmt::Result {
    if !f.is_finite() {
        return out.write_str("null");
    }
    // Debug gives the shortest text that parses back to the same value.
    let text = format!("{:?}", f);
    if text.contains('.') {
        out.write_str(&text)
    } else if let Some((mantissa, exponent)) = text.split_once('e') {
        write!(out, "{}.0e{}", mantissa, exponent)
    } else {
        write!(out, "{}.0", text)
    }
}

fn write_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// Compact JSON; the alternate flag (`{:#}`) selects pretty output.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if f.alternate() {
            FormatOptions::pretty()
        } else {
            FormatOptions::compact()
        };
        write_json(f, self, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node;

    #[test]
    fn float_keeps_decimal_point() {
        assert_eq!(Node::Float(1.0).to_string(), "1.0");
        assert_eq!(Node::Float(-0.5).to_string(), "-0.5");
        assert_eq!(Node::Float(1e20).to_string(), "1.0e20");
        assert_eq!(Node::Float(1.5e-7).to_string(), "1.5e-7");
    }

    #[test]
    fn non_finite_is_null() {
        assert_eq!(Node::Float(f64::NAN).to_string(), "null");
        assert_eq!(Node::Float(f64::INFINITY).to_string(), "null");
    }

    #[test]
    fn control_characters_are_escaped() {
        let s = Node::from("a\"b\\c\n\u{1}é");
        assert_eq!(s.to_string(), "\"a\\\"b\\\\c\\n\\u0001é\"");
    }

    #[test]
    fn pretty_nested_indentation() {
        let doc = node!({"a": {"b": [1, {}]}, "c": []});
        let expected = "{\n  \"a\": {\n    \"b\": [\n      1,\n      {}\n    ]\n  },\n  \"c\": []\n}";
        assert_eq!(format!("{:#}", doc), expected);
    }

    #[test]
    fn base_indent_offsets_nested_lines() {
        let doc = node!([1]);
        let options = FormatOptions::pretty().with_indent(4);
        assert_eq!(to_string(&doc, &options), "[\n      1\n    ]");
    }

    #[test]
    fn undefined_formats_as_null() {
        assert_eq!(Node::Undefined.to_string(), "null");
    }
}
