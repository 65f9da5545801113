//! Access tokens deciding which records a mapper may construct.
use crate::{shape::Target, Error, Visibility};

/// The capability to construct records, scoped to the module that created it.
///
/// Obtain one with [`lookup!`](crate::lookup) from the module that declares (or can see) the
/// records to decode. A record is constructible when its declared visibility reaches that module:
///
/// - `pub` records from anywhere;
/// - `pub(crate)` and `pub(in path)` records from the same crate;
/// - `pub(super)` records from the parent module of their declaration and its descendants;
/// - private records from their own module and its descendants.
///
/// [`Lookup::public`] carries no module and only reaches `pub` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    module_path: Option<&'static str>,
}

/// Create a [`Lookup`] scoped to the calling module.
#[macro_export]
macro_rules! lookup {
    () => {
        $crate::Lookup::new(::core::module_path!())
    };
}

impl Lookup {
    /// A lookup scoped to `module_path`. Prefer [`lookup!`](crate::lookup).
    #[must_use]
    pub const fn new(module_path: &'static str) -> Self {
        Lookup {
            module_path: Some(module_path),
        }
    }

    /// A lookup that can only construct `pub` records.
    #[must_use]
    pub const fn public() -> Self {
        Lookup { module_path: None }
    }

    #[must_use]
    pub fn module_path(&self) -> Option<&'static str> {
        self.module_path
    }

    /// Check that `target` may be constructed through this lookup.
    pub(crate) fn check(&self, target: &Target) -> Result<(), Error> {
        let shape = target.shape();
        let scope = match shape.visibility {
            Visibility::Public => return Ok(()),
            Visibility::Crate => crate_root(shape.module_path),
            Visibility::Super => parent(shape.module_path),
            Visibility::Private => shape.module_path,
        };
        match self.module_path {
            Some(caller) if is_within(caller, scope) => Ok(()),
            Some(caller) => Err(Error::constructor_access(
                target.name(),
                format!("record is visible in `{scope}` only, lookup belongs to `{caller}`"),
            )),
            None => Err(Error::constructor_access(
                target.name(),
                format!("record is visible in `{scope}` only, lookup is public"),
            )),
        }
    }
}

fn crate_root(module_path: &str) -> &str {
    module_path
        .split_once("::")
        .map_or(module_path, |(root, _)| root)
}

fn parent(module_path: &str) -> &str {
    module_path
        .rsplit_once("::")
        .map_or(module_path, |(parent, _)| parent)
}

/// Whether `module` is `scope` itself or one of its descendants.
fn is_within(module: &str, scope: &str) -> bool {
    match module.strip_prefix(scope) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}
