use core::fmt;

use serde_json::{Number, Value};

/// An error that occurred while building or running a decoder.
///
/// Errors fall into two groups:
///
/// - **value-level** errors describe one particular input object that does not fit the target
///   record (a missing key, a value of the wrong JSON type, a number out of range);
/// - **structural** errors describe the record definition itself (a field type with no
///   coercion, a constructor that cannot be used, a record that contains itself). They recur on
///   every attempt to decode into the same record.
#[derive(Debug)]
pub struct Error {
    repr: Box<ErrorRepr>,
}

#[derive(Debug)]
struct ErrorRepr {
    kind: ErrorKind,
    /// Path to the field that failed, outermost first.
    location: Location,
}

/// Kinds of errors that may happen during decoder construction or decoding.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A declared field has no key in the input object.
    MissingField { name: Box<str> },
    /// The JSON value under a key has a variant the field cannot be coerced from.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// An integer does not fit into the declared field width.
    NumericOverflow {
        value: Number,
        target: &'static str,
    },
    /// A field is declared with a type that has no coercion.
    UnsupportedFieldType { type_name: &'static str },
    /// The record cannot be constructed through the mapper's lookup, or its constructor does not
    /// match its field descriptors.
    ConstructorAccess {
        record: &'static str,
        reason: Box<str>,
    },
    /// The record contains itself, directly or through other records.
    RecursiveType { record: &'static str },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            repr: Box::new(ErrorRepr {
                kind,
                location: Location::new(),
            }),
        }
    }

    pub(crate) fn missing_field(name: &str) -> Self {
        Self::new(ErrorKind::MissingField { name: name.into() }).within(name)
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected,
            found: json_type(found),
        })
    }

    pub(crate) fn numeric_overflow(value: Number, target: &'static str) -> Self {
        Self::new(ErrorKind::NumericOverflow { value, target })
    }

    pub(crate) fn unsupported_field_type(type_name: &'static str) -> Self {
        Self::new(ErrorKind::UnsupportedFieldType { type_name })
    }

    pub(crate) fn constructor_access(record: &'static str, reason: impl Into<Box<str>>) -> Self {
        Self::new(ErrorKind::ConstructorAccess {
            record,
            reason: reason.into(),
        })
    }

    pub(crate) fn recursive_type(record: &'static str) -> Self {
        Self::new(ErrorKind::RecursiveType { record })
    }

    /// Prefix the error location with the field it was raised under.
    ///
    /// Structural errors do not carry a location.
    pub(crate) fn within(mut self, field: &str) -> Self {
        if self.is_value_level() {
            self.repr.location.push_parent(field);
        }
        self
    }

    /// The kind of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.repr.kind
    }

    /// Consume the error and return its kind.
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.repr.kind
    }

    /// Location of the offending field inside the input object.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.repr.location
    }

    /// Whether the error describes the input object rather than the record definition.
    #[must_use]
    pub fn is_value_level(&self) -> bool {
        matches!(
            self.repr.kind,
            ErrorKind::MissingField { .. }
                | ErrorKind::TypeMismatch { .. }
                | ErrorKind::NumericOverflow { .. }
        )
    }

    /// Whether the error describes the record definition; such errors recur on every attempt.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !self.is_value_level()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr.kind {
            ErrorKind::MissingField { name } => write!(f, "Missing field '{name}'")?,
            ErrorKind::TypeMismatch { expected, found } => {
                write!(f, "Expected {expected}, found {found}")?;
            }
            ErrorKind::NumericOverflow { value, target } => {
                write!(f, "{value} is out of range for {target}")?;
            }
            ErrorKind::UnsupportedFieldType { type_name } => {
                write!(f, "Unsupported type: {type_name}")?;
            }
            ErrorKind::ConstructorAccess { record, reason } => {
                write!(f, "Cannot construct '{record}': {reason}")?;
            }
            ErrorKind::RecursiveType { record } => {
                write!(f, "Record '{record}' contains itself")?;
            }
        }
        if !self.repr.location.is_empty() {
            write!(f, " at {}", self.repr.location)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// JSON-pointer style path to a field inside the decoded object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Innermost segment first, as the path is assembled while unwinding.
    segments: Vec<Box<str>>,
}

impl Location {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push_parent(&mut self, segment: &str) {
        self.segments.push(segment.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments from the outermost field to the innermost one.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().rev().map(AsRef::as_ref)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments() {
            f.write_str("/")?;
            for ch in segment.chars() {
                match ch {
                    '~' => f.write_str("~0")?,
                    '/' => f.write_str("~1")?,
                    _ => write!(f, "{ch}")?,
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
