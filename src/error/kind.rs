//! Failure kinds and their ancestry.
//!
//! A kind is a name plus an optional link to a broader parent kind. Error
//! handlers are registered against kinds, and resolution walks from the kind a
//! failure was raised with up through its parents until a handler is found.
//!
//! Applications declare their own kinds as statics hanging off the built-in
//! ones:
//!
//! ```
//! use switchyard::error::kind::{self, ErrorKind};
//!
//! static DATABASE: ErrorKind = ErrorKind::new("database", &kind::RUNTIME);
//! static DEADLOCK: ErrorKind = ErrorKind::new("deadlock", &DATABASE);
//!
//! let names: Vec<_> = DEADLOCK.ancestry().map(ErrorKind::name).collect();
//! assert_eq!(names, ["deadlock", "database", "runtime", "error"]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

// Upper bound on parent hops; statics can be wired into a cycle.
const MAX_DEPTH: usize = 32;

/// A node in the failure-kind hierarchy.
///
/// Kinds are identified by address, so declare them as `static`s: two kinds
/// sharing a name are still distinct, and each resolves through its own
/// parents. The name is only used for display and logging.
pub struct ErrorKind {
    name: &'static str,
    parent: Option<&'static ErrorKind>,
}

impl ErrorKind {
    /// A kind with no parent.
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A kind that specializes `parent`.
    pub const fn new(name: &'static str, parent: &'static ErrorKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn parent(&self) -> Option<&'static ErrorKind> {
        self.parent
    }

    /// This kind followed by each of its ancestors, most specific first.
    pub fn ancestry(&'static self) -> impl Iterator<Item = &'static ErrorKind> {
        std::iter::successors(Some(self), |kind| kind.parent).take(MAX_DEPTH)
    }

    /// Returns `true` if `other` is this kind or one of its ancestors.
    pub fn is_a(&'static self, other: &ErrorKind) -> bool {
        self.ancestry().any(|kind| kind == other)
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorKind")
            .field("name", &self.name)
            .field("parent", &self.parent.map(ErrorKind::name))
            .finish()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Root of the built-in hierarchy; a handler for it catches every failure.
pub static ANY: ErrorKind = ErrorKind::root("error");
/// General failures raised by application code.
pub static RUNTIME: ErrorKind = ErrorKind::new("runtime", &ANY);
/// Bad input: unparsable numbers, invalid UTF-8, out-of-range values.
pub static ARGUMENT: ErrorKind = ErrorKind::new("argument", &ANY);
/// I/O failures.
pub static IO: ErrorKind = ErrorKind::new("io", &ANY);
/// JSON encoding or decoding failures.
pub static SERIALIZATION: ErrorKind = ErrorKind::new("serialization", &ANY);
/// A handler panicked.
pub static PANIC: ErrorKind = ErrorKind::new("panic", &ANY);
