use crate::{Lookup, RecordMapper};

/// Configuration for building a [`RecordMapper`].
///
/// ```rust
/// let mapper = recordmap::options()
///     .with_integral_floats(true)
///     .build(recordmap::lookup!());
/// assert!(mapper.options().integral_floats());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    integral_floats: bool,
}

impl MapperOptions {
    /// Accept JSON numbers with a zero fractional part, such as `30.0`, for integer fields.
    ///
    /// Disabled by default: integer fields require an integer representation.
    #[must_use]
    pub fn with_integral_floats(mut self, enabled: bool) -> Self {
        self.integral_floats = enabled;
        self
    }

    #[must_use]
    pub fn integral_floats(&self) -> bool {
        self.integral_floats
    }

    /// Build a mapper constructing records through `lookup`.
    #[must_use]
    pub fn build(&self, lookup: Lookup) -> RecordMapper {
        RecordMapper::new(lookup, self.clone())
    }
}
