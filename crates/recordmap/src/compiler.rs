//! Compilation of record shapes into decoders.
use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use serde_json::{Map, Value};

use crate::{
    cache::DecoderCache, coercion::Coercion, shape::Target, Error, Fields, Lookup, MapperOptions,
};

/// A decoder specialized for exactly one record type.
///
/// Immutable once compiled: every field's coercion is resolved up front, decoding only reads the
/// input object.
pub(crate) struct Decoder {
    target: Target,
    fields: Box<[CompiledField]>,
}

struct CompiledField {
    name: &'static str,
    coercion: Coercion,
}

impl Decoder {
    pub(crate) fn target(&self) -> &Target {
        &self.target
    }

    pub(crate) fn decode(&self, object: &Map<String, Value>) -> Result<Box<dyn Any + Send>, Error> {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &*self.fields {
            // Presence is checked before coercion, so `null` under the key is a value like any other
            let Some(value) = object.get(field.name) else {
                return Err(Error::missing_field(field.name));
            };
            let native = field
                .coercion
                .apply(value)
                .map_err(|error| error.within(field.name))?;
            values.push(native);
        }
        let mut fields = Fields::new(self.target.name(), values);
        let instance = self.target.construct(&mut fields)?;
        fields.finish()?;
        Ok(instance)
    }
}

/// Builds decoders for one top-level request, including every nested record it reaches.
pub(crate) struct Compiler<'a> {
    cache: &'a DecoderCache,
    lookup: Lookup,
    options: &'a MapperOptions,
    /// Records whose decoders are being compiled by this compiler, outermost first.
    in_progress: Vec<TypeId>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(cache: &'a DecoderCache, lookup: Lookup, options: &'a MapperOptions) -> Self {
        Compiler {
            cache,
            lookup,
            options,
            in_progress: Vec::new(),
        }
    }

    pub(crate) fn options(&self) -> &MapperOptions {
        self.options
    }

    /// Fetch the memoized decoder for `target`, compiling and publishing it on first use.
    ///
    /// Failed compilations are not cached.
    pub(crate) fn decoder_for(&mut self, target: Target) -> Result<Arc<Decoder>, Error> {
        let type_id = target.type_id();
        if let Some(decoder) = self.cache.get(type_id) {
            tracing::trace!(record = target.name(), "Reusing cached decoder");
            return Ok(decoder);
        }
        if self.in_progress.contains(&type_id) {
            return Err(Error::recursive_type(target.name()));
        }
        self.in_progress.push(type_id);
        let compiled = self.compile(target);
        self.in_progress.pop();
        Ok(self.cache.publish(type_id, compiled?))
    }

    fn compile(&mut self, target: Target) -> Result<Decoder, Error> {
        self.lookup.check(&target)?;
        let descriptors = target.shape().fields;
        let mut fields = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let coercion = Coercion::resolve((descriptor.field_type)(), self)?;
            fields.push(CompiledField {
                name: descriptor.name,
                coercion,
            });
        }
        tracing::debug!(
            record = target.name(),
            fields = fields.len(),
            "Compiled decoder"
        );
        Ok(Decoder {
            target,
            fields: fields.into_boxed_slice(),
        })
    }
}
