use std::{any::TypeId, collections::hash_map::Entry, sync::Arc};

use ahash::HashMap;
use parking_lot::RwLock;

use crate::compiler::Decoder;

/// Decoders memoized by the nominal identity of their record.
///
/// Entries are created lazily and live as long as the cache. Compilation happens outside the
/// lock: concurrent first uses of one record may compile it more than once, and the first
/// published decoder wins.
pub(crate) struct DecoderCache {
    decoders: RwLock<HashMap<TypeId, Arc<Decoder>>>,
}

impl DecoderCache {
    pub(crate) fn new() -> Self {
        DecoderCache {
            decoders: RwLock::new(HashMap::default()),
        }
    }

    pub(crate) fn get(&self, type_id: TypeId) -> Option<Arc<Decoder>> {
        self.decoders.read().get(&type_id).map(Arc::clone)
    }

    /// Store `decoder` unless another one was published first, returning the stored decoder.
    pub(crate) fn publish(&self, type_id: TypeId, decoder: Decoder) -> Arc<Decoder> {
        match self.decoders.write().entry(type_id) {
            Entry::Occupied(entry) => {
                tracing::trace!(
                    record = decoder.target().name(),
                    "Decoder was published by a concurrent build"
                );
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(Arc::new(decoder))),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.decoders.read().len()
    }
}
