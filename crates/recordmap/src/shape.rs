//! Static descriptions of decodable records.
//!
//! A [`Record`] exposes the ordered list of its fields and a positional constructor. Both are
//! normally generated by `#[derive(Record)]`, but can be written by hand.
use core::fmt;
use std::any::{type_name, Any, TypeId};

use crate::Error;

/// A struct that can be decoded from a JSON object.
///
/// # Example
///
/// A hand-written implementation equivalent to what `#[derive(Record)]` generates:
///
/// ```rust
/// use recordmap::{Field, FieldDescriptor, Fields, Record, Shape, Visibility};
///
/// pub struct User {
///     name: String,
///     age: i32,
/// }
///
/// impl Record for User {
///     const SHAPE: Shape = Shape {
///         module_path: module_path!(),
///         visibility: Visibility::Public,
///         fields: &[
///             FieldDescriptor { name: "name", field_type: <String as Field>::field_type },
///             FieldDescriptor { name: "age", field_type: <i32 as Field>::field_type },
///         ],
///     };
///
///     fn construct(fields: &mut Fields) -> Result<Self, recordmap::Error> {
///         Ok(User {
///             name: fields.take("name")?,
///             age: fields.take("age")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized + Send + 'static {
    /// Field descriptors in constructor order, plus the declaration site of the record.
    const SHAPE: Shape;

    /// Build an instance from coerced field values, in the order of [`Record::SHAPE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the values do not match the declared fields.
    fn construct(fields: &mut Fields) -> Result<Self, Error>;
}

/// Declaration of a record: where it lives, who may construct it, and its fields.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    /// `module_path!()` of the module declaring the record.
    pub module_path: &'static str,
    pub visibility: Visibility,
    pub fields: &'static [FieldDescriptor],
}

/// Declared visibility of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)` and `pub(in path)`
    Crate,
    /// `pub(super)`
    Super,
    /// No visibility modifier, or `pub(self)`
    Private,
}

/// A single constructor parameter: the JSON key it is read from and its type.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Evaluated lazily so records may refer to themselves.
    pub field_type: fn() -> FieldType,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &(self.field_type)())
            .finish()
    }
}

/// The native type a field is decoded into.
#[derive(Clone, Copy)]
pub enum FieldType {
    /// `String`, from a JSON string.
    Text,
    /// `i32`, from a JSON number.
    Int32,
    /// `i64`, from a JSON number.
    Int64,
    /// Another record, from a JSON object.
    Nested(Target),
    /// A Rust type with no coercion.
    Unsupported(&'static str),
}

impl FieldType {
    /// Human readable type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "String",
            FieldType::Int32 => "i32",
            FieldType::Int64 => "i64",
            FieldType::Nested(target) => target.name(),
            FieldType::Unsupported(name) => name,
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => f.write_str("Text"),
            FieldType::Int32 => f.write_str("Int32"),
            FieldType::Int64 => f.write_str("Int64"),
            FieldType::Nested(target) => f.debug_tuple("Nested").field(&target.name()).finish(),
            FieldType::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

type ConstructFn = fn(&mut Fields) -> Result<Box<dyn Any + Send>, Error>;

/// Nominal identity of a record type together with its erased constructor.
///
/// Two records with identical fields are still different targets.
#[derive(Clone, Copy)]
pub struct Target {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    shape: Shape,
    construct: ConstructFn,
}

impl Target {
    #[must_use]
    pub fn of<T: Record>() -> Self {
        Target {
            type_id: TypeId::of::<T>,
            type_name: type_name::<T>,
            shape: T::SHAPE,
            construct: construct_erased::<T>,
        }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn construct(&self, fields: &mut Fields) -> Result<Box<dyn Any + Send>, Error> {
        (self.construct)(fields)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name())
            .field("shape", &self.shape)
            .finish()
    }
}

fn construct_erased<T: Record>(fields: &mut Fields) -> Result<Box<dyn Any + Send>, Error> {
    let value = T::construct(fields)?;
    Ok(Box::new(value))
}

/// A coerced field value, before it is handed to the record constructor.
pub enum NativeValue {
    Text(String),
    Int32(i32),
    Int64(i64),
    Record(Box<dyn Any + Send>),
}

impl NativeValue {
    /// Unwrap a nested record of type `T`.
    #[must_use]
    pub fn into_record<T: Any>(self) -> Option<Box<T>> {
        match self {
            NativeValue::Record(value) => value.downcast::<T>().ok(),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            NativeValue::Text(_) => "String",
            NativeValue::Int32(_) => "i32",
            NativeValue::Int64(_) => "i64",
            NativeValue::Record(_) => "record",
        }
    }
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Text(value) => f.debug_tuple("Text").field(value).finish(),
            NativeValue::Int32(value) => f.debug_tuple("Int32").field(value).finish(),
            NativeValue::Int64(value) => f.debug_tuple("Int64").field(value).finish(),
            NativeValue::Record(_) => f.write_str("Record(..)"),
        }
    }
}

/// A Rust type usable as a record field.
pub trait Field: Sized + Send + 'static {
    fn field_type() -> FieldType;

    /// Convert a coerced value back into `Self`; `None` if it has a different type.
    fn from_native(value: NativeValue) -> Option<Self>;
}

impl Field for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }
    fn from_native(value: NativeValue) -> Option<Self> {
        match value {
            NativeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl Field for i32 {
    fn field_type() -> FieldType {
        FieldType::Int32
    }
    fn from_native(value: NativeValue) -> Option<Self> {
        match value {
            NativeValue::Int32(value) => Some(value),
            _ => None,
        }
    }
}

impl Field for i64 {
    fn field_type() -> FieldType {
        FieldType::Int64
    }
    fn from_native(value: NativeValue) -> Option<Self> {
        match value {
            NativeValue::Int64(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Record> Field for Box<T> {
    fn field_type() -> FieldType {
        FieldType::Nested(Target::of::<T>())
    }
    fn from_native(value: NativeValue) -> Option<Self> {
        value.into_record::<T>()
    }
}

macro_rules! impl_unsupported {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn field_type() -> FieldType {
                    FieldType::Unsupported(type_name::<Self>())
                }
                fn from_native(_: NativeValue) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

impl_unsupported!(
    f32, f64, bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i128, isize
);

impl<T: Send + 'static> Field for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Unsupported(type_name::<Self>())
    }
    fn from_native(_: NativeValue) -> Option<Self> {
        None
    }
}

impl<T: Send + 'static> Field for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::Unsupported(type_name::<Self>())
    }
    fn from_native(_: NativeValue) -> Option<Self> {
        None
    }
}

/// Positional arguments passed to [`Record::construct`].
#[derive(Debug)]
pub struct Fields {
    record: &'static str,
    values: std::vec::IntoIter<NativeValue>,
}

impl Fields {
    pub(crate) fn new(record: &'static str, values: Vec<NativeValue>) -> Self {
        Fields {
            record,
            values: values.into_iter(),
        }
    }

    /// Take the next argument as `T`.
    ///
    /// # Errors
    ///
    /// Fails if the arguments are exhausted or the next one is not a `T`. Either means the
    /// constructor disagrees with the record's field descriptors.
    pub fn take<T: Field>(&mut self, name: &str) -> Result<T, Error> {
        let Some(value) = self.values.next() else {
            return Err(Error::constructor_access(
                self.record,
                format!("no value left for field '{name}'"),
            ));
        };
        let found = value.kind();
        T::from_native(value).ok_or_else(|| {
            Error::constructor_access(
                self.record,
                format!(
                    "field '{name}' expects {}, but the descriptor produced {found}",
                    T::field_type().name()
                ),
            )
        })
    }

    /// Number of arguments not taken yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Ensure the constructor consumed every argument.
    pub(crate) fn finish(&self) -> Result<(), Error> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(Error::constructor_access(
                self.record,
                format!("constructor left {left} field value(s) unused"),
            )),
        }
    }
}
