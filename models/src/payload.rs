use std::fmt::{Display, Formatter, Result as FormatResult};

/// Argument carried by a [`crate::Command`].
///
/// A closed sum type: every consumer matches it exhaustively, so adding a variant is a
/// compile error everywhere it is interpreted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypedPayload {
    #[default]
    None,
    Bool(bool),
    UInt32(u32),
    Int64(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
}

/// Discriminant of a [`TypedPayload`], used in diagnostics and shape checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    None,
    Bool,
    UInt32,
    Int64,
    Double,
    String,
    StringList,
}

impl TypedPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            TypedPayload::None => PayloadKind::None,
            TypedPayload::Bool(_) => PayloadKind::Bool,
            TypedPayload::UInt32(_) => PayloadKind::UInt32,
            TypedPayload::Int64(_) => PayloadKind::Int64,
            TypedPayload::Double(_) => PayloadKind::Double,
            TypedPayload::String(_) => PayloadKind::String,
            TypedPayload::StringList(_) => PayloadKind::StringList,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedPayload::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TypedPayload::UInt32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedPayload::Int64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedPayload::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedPayload::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TypedPayload::StringList(values) => Some(values),
            _ => None,
        }
    }
}

impl From<bool> for TypedPayload {
    fn from(value: bool) -> Self {
        TypedPayload::Bool(value)
    }
}

impl From<u32> for TypedPayload {
    fn from(value: u32) -> Self {
        TypedPayload::UInt32(value)
    }
}

impl From<i64> for TypedPayload {
    fn from(value: i64) -> Self {
        TypedPayload::Int64(value)
    }
}

impl From<f64> for TypedPayload {
    fn from(value: f64) -> Self {
        TypedPayload::Double(value)
    }
}

impl From<String> for TypedPayload {
    fn from(value: String) -> Self {
        TypedPayload::String(value)
    }
}

impl From<&str> for TypedPayload {
    fn from(value: &str) -> Self {
        TypedPayload::String(value.to_string())
    }
}

impl From<Vec<String>> for TypedPayload {
    fn from(values: Vec<String>) -> Self {
        TypedPayload::StringList(values)
    }
}

impl Display for TypedPayload {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            TypedPayload::None => write!(formatter, "none"),
            TypedPayload::Bool(value) => write!(formatter, "bool({value})"),
            TypedPayload::UInt32(value) => write!(formatter, "uint32({value})"),
            TypedPayload::Int64(value) => write!(formatter, "int64({value})"),
            TypedPayload::Double(value) => write!(formatter, "double({value})"),
            TypedPayload::String(value) => write!(formatter, "string({value:?})"),
            TypedPayload::StringList(values) => write!(formatter, "list[{}]", values.len()),
        }
    }
}

/// Payload shape a command name accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    None,
    Bool,
    UInt32,
    Int64,
    String,
    StringList,
    /// `UInt32` selects an embedded track, `String` names an external file.
    TrackOrFile,
    Any,
}

impl PayloadShape {
    pub fn accepts(self, payload: &TypedPayload) -> bool {
        match (self, payload) {
            (PayloadShape::Any, _) => true,
            (PayloadShape::None, TypedPayload::None) => true,
            (PayloadShape::Bool, TypedPayload::Bool(_)) => true,
            (PayloadShape::UInt32, TypedPayload::UInt32(_)) => true,
            (PayloadShape::Int64, TypedPayload::Int64(_)) => true,
            (PayloadShape::String, TypedPayload::String(_)) => true,
            (PayloadShape::StringList, TypedPayload::StringList(_)) => true,
            (PayloadShape::TrackOrFile, TypedPayload::UInt32(_) | TypedPayload::String(_)) => true,
            _ => false,
        }
    }
}
