//! The tagged-union document value.
//!
//! A [`Node`] is exactly one of eight variants. Atoms are stored inline;
//! `String`, `Array`, and `Object` own their heap payload, so cloning a node
//! deep-copies the subtree and moving it transfers ownership. There is no
//! sharing between trees.
//!
//! `Undefined` is never produced by the parser. It is the result of a lookup
//! that found nothing (see [`crate::Object::value`] and [`Node::find`]) and is
//! kept distinct from the `Null` atom.
//!
//! # Equality
//!
//! Equality is structural for every variant. Arrays compare element-wise in
//! order; objects compare pair-wise in insertion order, so two equal nodes
//! always format to the same text. Floats compare by value, except that a NaN
//! equals itself when the bit patterns match, which keeps `==` reflexive.

use crate::array::Array;
use crate::error::{Error, Result};
use crate::object::Object;
use std::fmt;

/// A JSON document value.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Null,
    /// Result of a failed lookup.
    Undefined,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Array),
    Object(Object),
}

/// The variant tag of a [`Node`], used in diagnostics and type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Undefined,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl Kind {
    /// Stable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Undefined => "Undefined",
            Kind::Boolean => "Boolean",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Array => "Array",
            Kind::Object => "Object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload types that can be borrowed out of a [`Node`] with
/// [`Node::is`], [`Node::try_ref`], and [`Node::try_mut`].
pub trait Payload: Sized {
    /// The variant holding this payload.
    const KIND: Kind;

    fn peek(node: &Node) -> Option<&Self>;

    fn peek_mut(node: &mut Node) -> Option<&mut Self>;
}

macro_rules! impl_payload {
    ($ty:ty, $variant:ident) => {
        impl Payload for $ty {
            const KIND: Kind = Kind::$variant;

            fn peek(node: &Node) -> Option<&Self> {
                match node {
                    Node::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn peek_mut(node: &mut Node) -> Option<&mut Self> {
                match node {
                    Node::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_payload!(bool, Boolean);
impl_payload!(i64, Integer);
impl_payload!(f64, Float);
impl_payload!(String, String);
impl_payload!(Array, Array);
impl_payload!(Object, Object);

impl Node {
    /// The active variant.
    pub fn kind(&self) -> Kind {
        match self {
            Node::Null => Kind::Null,
            Node::Undefined => Kind::Undefined,
            Node::Boolean(_) => Kind::Boolean,
            Node::Integer(_) => Kind::Integer,
            Node::Float(_) => Kind::Float,
            Node::String(_) => Kind::String,
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
        }
    }

    /// Stable name of the active variant, e.g. `"Integer"`.
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns true if the active variant holds a `T`.
    ///
    /// ```
    /// use jsontree::{Array, Node};
    ///
    /// let n = Node::from(3);
    /// assert!(n.is::<i64>());
    /// assert!(!n.is::<Array>());
    /// ```
    pub fn is<T: Payload>(&self) -> bool {
        T::peek(self).is_some()
    }

    /// Borrow the payload as a `T`, failing with [`Error::TypeMismatch`] if
    /// another variant is active.
    pub fn try_ref<T: Payload>(&self) -> Result<&T> {
        T::peek(self).ok_or(Error::TypeMismatch {
            expected: T::KIND,
            found: self.kind(),
        })
    }

    /// Mutably borrow the payload as a `T`.
    pub fn try_mut<T: Payload>(&mut self) -> Result<&mut T> {
        let found = self.kind();
        T::peek_mut(self).ok_or(Error::TypeMismatch {
            expected: T::KIND,
            found,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Node::Undefined)
    }

    /// True for `Array` and `Object`.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    pub fn as_array(&self) -> Result<&Array> {
        self.try_ref::<Array>()
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        self.try_mut::<Array>()
    }

    pub fn as_object(&self) -> Result<&Object> {
        self.try_ref::<Object>()
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object> {
        self.try_mut::<Object>()
    }

    /// Move the value out, leaving `Null` behind.
    pub fn take(&mut self) -> Node {
        std::mem::take(self)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) | (Node::Undefined, Node::Undefined) => true,
            (Node::Boolean(a), Node::Boolean(b)) => a == b,
            (Node::Integer(a), Node::Integer(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a == b || a.to_bits() == b.to_bits(),
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Boolean(v)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(v: $ty) -> Self {
                    Node::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<f32> for Node {
    fn from(v: f32) -> Self {
        Node::Float(f64::from(v))
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_owned())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<Array> for Node {
    fn from(v: Array) -> Self {
        Node::Array(v)
    }
}

impl From<Object> for Node {
    fn from(v: Object) -> Self {
        Node::Object(v)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Node::Array(Array::from(v))
    }
}

/// Build a [`Node`] from a JSON-like literal.
///
/// Object keys must be string literals. Negative numbers inside arrays and
/// objects need parentheses, e.g. `node!([(-1), 2])`.
///
/// ```
/// use jsontree::node;
///
/// let doc = node!({"a": 1, "b": [true, null, "x"], "c": {}});
/// assert_eq!(doc.to_string(), r#"{"a":1,"b":[true,null,"x"],"c":{}}"#);
/// ```
#[macro_export]
macro_rules! node {
    (null) => {
        $crate::Node::Null
    };
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Node::Array(<$crate::Array as ::std::iter::FromIterator<$crate::Node>>::from_iter(
            ::std::vec![$($crate::node!($elem)),*]
        ))
    };
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut object = $crate::Object::new();
        $(
            object.set($key, $crate::node!($value));
        )*
        $crate::Node::Object(object)
    }};
    ($other:expr) => {
        $crate::Node::from($other)
    };
}
