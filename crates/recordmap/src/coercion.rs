use std::sync::Arc;

use serde_json::{Number, Value};

use crate::{
    compiler::{Compiler, Decoder},
    Error, FieldType, NativeValue,
};

/// Conversion of one JSON value into the native type of one field.
///
/// Resolved once per field when a decoder is compiled, so decoding never dispatches on
/// [`FieldType`] again.
pub(crate) enum Coercion {
    Text,
    Int32 { integral_floats: bool },
    Int64 { integral_floats: bool },
    Nested(Arc<Decoder>),
}

impl Coercion {
    /// Find the coercion for `field_type`, compiling nested decoders as needed.
    pub(crate) fn resolve(field_type: FieldType, compiler: &mut Compiler<'_>) -> Result<Self, Error> {
        let integral_floats = compiler.options().integral_floats();
        match field_type {
            FieldType::Text => Ok(Coercion::Text),
            FieldType::Int32 => Ok(Coercion::Int32 { integral_floats }),
            FieldType::Int64 => Ok(Coercion::Int64 { integral_floats }),
            FieldType::Nested(target) => compiler.decoder_for(target).map(Coercion::Nested),
            FieldType::Unsupported(type_name) => Err(Error::unsupported_field_type(type_name)),
        }
    }

    pub(crate) fn apply(&self, value: &Value) -> Result<NativeValue, Error> {
        match self {
            Coercion::Text => match value {
                Value::String(text) => Ok(NativeValue::Text(text.clone())),
                _ => Err(Error::type_mismatch("string", value)),
            },
            Coercion::Int32 { integral_floats } => {
                let (number, raw) = integer(value, *integral_floats)?;
                i32::try_from(number)
                    .map(NativeValue::Int32)
                    .map_err(|_| Error::numeric_overflow(raw.clone(), "i32"))
            }
            Coercion::Int64 { integral_floats } => {
                let (number, raw) = integer(value, *integral_floats)?;
                i64::try_from(number)
                    .map(NativeValue::Int64)
                    .map_err(|_| Error::numeric_overflow(raw.clone(), "i64"))
            }
            Coercion::Nested(decoder) => match value {
                Value::Object(object) => decoder.decode(object).map(NativeValue::Record),
                _ => Err(Error::type_mismatch("object", value)),
            },
        }
    }
}

/// Read an integer wide enough for every supported field width.
///
/// Integral floats beyond the `i128` range saturate and are rejected by the narrowing that
/// follows.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn integer(value: &Value, integral_floats: bool) -> Result<(i128, &Number), Error> {
    let Value::Number(number) = value else {
        return Err(Error::type_mismatch("integer", value));
    };
    if let Some(n) = number.as_i64() {
        return Ok((i128::from(n), number));
    }
    if let Some(n) = number.as_u64() {
        return Ok((i128::from(n), number));
    }
    match number.as_f64() {
        Some(f) if integral_floats && f.is_finite() && f.trunc() == f => Ok((f as i128, number)),
        _ => Err(Error::type_mismatch("integer", value)),
    }
}
