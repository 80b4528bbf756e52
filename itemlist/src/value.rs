use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::Item;

/// A value producer evaluated when the value is compared or displayed.
pub type LazyFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Derives a value from an item (used by sort and group descriptors).
pub type DeriveFn = Arc<dyn Fn(&Item) -> Option<Value> + Send + Sync>;

/// A field value stored on an [`Item`].
///
/// An absent field is represented by the field not being present on the item; there is no
/// "null" variant.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// Evaluated on demand.
    #[cfg_attr(feature = "serde", serde(skip))]
    Lazy(LazyFn),
    /// A nested collection, typically stored under the children field.
    Items(Vec<Item>),
}

/// The comparison family a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Number,
    Date,
    Text,
}

impl Value {
    pub fn lazy(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(f))
    }

    pub fn date(millis: i64) -> Self {
        Self::Date(millis)
    }

    /// Invokes lazy values until a concrete value is produced.
    pub fn resolve(&self) -> Cow<'_, Value> {
        match self {
            Self::Lazy(f) => {
                let mut v = f();
                while let Self::Lazy(next) = &v {
                    v = next();
                }
                Cow::Owned(v)
            }
            _ => Cow::Borrowed(self),
        }
    }

    /// The natural comparison family of this value, if it has one.
    ///
    /// Booleans and nested collections have none and always compare as text.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Int(_) | Self::Float(_) => Some(ValueType::Number),
            Self::Date(_) => Some(ValueType::Date),
            Self::Text(_) => Some(ValueType::Text),
            Self::Bool(_) | Self::Items(_) => None,
            Self::Lazy(_) => self.resolve().value_type(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) | Self::Date(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Lazy(_) => self.resolve().as_f64(),
            _ => None,
        }
    }

    /// Milliseconds since the epoch for date-like values (dates and integers).
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Self::Date(v) | Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() => Some(*v as i64),
            Self::Lazy(_) => self.resolve().as_timestamp(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Item]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    /// `false`, zero, NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(v) | Self::Date(v) => *v != 0,
            Self::Float(v) => *v != 0.0 && !v.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::Items(_) => true,
            Self::Lazy(_) => self.resolve().is_truthy(),
        }
    }

    /// Text used for display and string comparison. Falsy values render as `""`.
    pub fn to_text(&self) -> String {
        if self.is_truthy() {
            self.to_string()
        } else {
            String::new()
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) | Self::Date(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Items(_) => Ok(()),
            Self::Lazy(_) => write!(f, "{}", self.resolve()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::Items(v) => f.debug_tuple("Items").field(&v.len()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) | (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Items(a), Self::Items(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Item>> for Value {
    fn from(v: Vec<Item>) -> Self {
        Self::Items(v)
    }
}

/// Where a descriptor reads its value from: a named field or a derivation function.
#[derive(Clone)]
pub enum Accessor {
    Field(String),
    Derive(DeriveFn),
}

impl Accessor {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn derive(f: impl Fn(&Item) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self::Derive(Arc::new(f))
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Derive(_) => None,
        }
    }

    pub fn value<'a>(&self, item: &'a Item) -> Option<Cow<'a, Value>> {
        match self {
            Self::Field(name) => item.get(name).map(Cow::Borrowed),
            Self::Derive(f) => f(item).map(Cow::Owned),
        }
    }
}

impl PartialEq for Accessor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field(a), Self::Field(b)) => a == b,
            (Self::Derive(a), Self::Derive(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl From<&str> for Accessor {
    fn from(name: &str) -> Self {
        Self::Field(name.into())
    }
}

impl From<String> for Accessor {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}
