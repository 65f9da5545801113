use core::fmt;
use std::{
    any::{type_name, Any},
    marker::PhantomData,
    sync::Arc,
};

use serde_json::{Map, Value};

use crate::{
    cache::DecoderCache,
    compiler::{Compiler, Decoder},
    shape::Target,
    Error, Lookup, MapperOptions, Record,
};

/// Decodes JSON objects into records, compiling one decoder per record type on first use.
///
/// Clones share the same decoder cache. A mapper is `Send + Sync` and can serve any number of
/// threads; keep one per lookup (for example in a `static`) rather than creating one per call.
#[derive(Clone)]
pub struct RecordMapper {
    inner: Arc<MapperInner>,
}

struct MapperInner {
    lookup: Lookup,
    options: MapperOptions,
    cache: DecoderCache,
}

impl RecordMapper {
    /// A mapper with default options, constructing records through `lookup`.
    ///
    /// ```rust
    /// let mapper = recordmap::RecordMapper::of(recordmap::lookup!());
    /// ```
    #[must_use]
    pub fn of(lookup: Lookup) -> Self {
        MapperOptions::default().build(lookup)
    }

    pub(crate) fn new(lookup: Lookup, options: MapperOptions) -> Self {
        RecordMapper {
            inner: Arc::new(MapperInner {
                lookup,
                options,
                cache: DecoderCache::new(),
            }),
        }
    }

    #[must_use]
    pub fn lookup(&self) -> Lookup {
        self.inner.lookup
    }

    #[must_use]
    pub fn options(&self) -> &MapperOptions {
        &self.inner.options
    }

    /// Decode `object` into `T`.
    ///
    /// Every field of `T` must be present under its name; keys `T` does not declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns a value-level error if `object` does not fit `T` (a missing key, a value of the
    /// wrong type, an integer out of range), and a structural error if `T` itself cannot be
    /// decoded (an unsupported field type, a record the lookup cannot construct, a record that
    /// contains itself).
    pub fn from_typed<T: Record>(&self, object: &Map<String, Value>) -> Result<T, Error> {
        let decoder = self.decoder_for(Target::of::<T>())?;
        downcast(decoder.decode(object)?)
    }

    /// Decode `value`, which must be a JSON object, into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`RecordMapper::from_typed`], plus a type mismatch if `value` is not an object.
    pub fn from_value<T: Record>(&self, value: &Value) -> Result<T, Error> {
        match value {
            Value::Object(object) => self.from_typed(object),
            _ => Err(Error::type_mismatch("object", value)),
        }
    }

    /// Decode `object` into `T` if it fits, or return `None` if it does not.
    ///
    /// ```rust
    /// use recordmap::Record;
    /// use serde_json::json;
    ///
    /// #[derive(Record)]
    /// struct Point {
    ///     x: i32,
    ///     y: i32,
    /// }
    ///
    /// let mapper = recordmap::RecordMapper::of(recordmap::lookup!());
    /// let object = json!({"x": 1});
    /// let point = mapper.try_match::<Point>(object.as_object().unwrap())?;
    /// assert!(point.is_none());
    /// # Ok::<(), recordmap::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Only structural errors are returned; value-level errors become `Ok(None)`.
    pub fn try_match<T: Record>(&self, object: &Map<String, Value>) -> Result<Option<T>, Error> {
        absorb_value_errors(self.from_typed(object))
    }

    /// Compile (or fetch) the decoder for `T` and return a handle to it.
    ///
    /// Structural errors surface here instead of on the first decode.
    ///
    /// # Errors
    ///
    /// Returns a structural error if `T` cannot be decoded.
    pub fn decoder<T: Record>(&self) -> Result<TypedDecoder<T>, Error> {
        Ok(TypedDecoder {
            decoder: self.decoder_for(Target::of::<T>())?,
            marker: PhantomData,
        })
    }

    /// Number of decoders compiled and memoized so far, nested records included.
    #[must_use]
    pub fn cached_decoders(&self) -> usize {
        self.inner.cache.len()
    }

    fn decoder_for(&self, target: Target) -> Result<Arc<Decoder>, Error> {
        if let Some(decoder) = self.inner.cache.get(target.type_id()) {
            return Ok(decoder);
        }
        Compiler::new(&self.inner.cache, self.inner.lookup, &self.inner.options)
            .decoder_for(target)
            .inspect_err(|error| {
                tracing::debug!(record = target.name(), %error, "Failed to compile decoder");
            })
    }
}

impl fmt::Debug for RecordMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMapper")
            .field("lookup", &self.inner.lookup)
            .field("options", &self.inner.options)
            .field("cached_decoders", &self.cached_decoders())
            .finish()
    }
}

/// A compiled decoder for `T`, obtained from [`RecordMapper::decoder`].
pub struct TypedDecoder<T> {
    decoder: Arc<Decoder>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> TypedDecoder<T> {
    /// Decode `object` into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`RecordMapper::from_typed`].
    pub fn decode(&self, object: &Map<String, Value>) -> Result<T, Error> {
        downcast(self.decoder.decode(object)?)
    }

    /// Decode `object` into `T` if it fits.
    ///
    /// # Errors
    ///
    /// Same as [`RecordMapper::try_match`].
    pub fn try_match(&self, object: &Map<String, Value>) -> Result<Option<T>, Error> {
        absorb_value_errors(self.decode(object))
    }
}

impl<T> Clone for TypedDecoder<T> {
    fn clone(&self) -> Self {
        TypedDecoder {
            decoder: Arc::clone(&self.decoder),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedDecoder")
            .field(&self.decoder.target().name())
            .finish()
    }
}

fn absorb_value_errors<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(instance) => Ok(Some(instance)),
        Err(error) if error.is_value_level() => {
            tracing::trace!(record = type_name::<T>(), %error, "Object does not match");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn downcast<T: Record>(instance: Box<dyn Any + Send>) -> Result<T, Error> {
    instance.downcast::<T>().map(|instance| *instance).map_err(|_| {
        Error::constructor_access(type_name::<T>(), "constructor produced a different type")
    })
}
