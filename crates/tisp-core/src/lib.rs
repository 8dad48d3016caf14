//! tisp-core: the lazy evaluation engine of tisp.
//!
//! Programs are graphs of [`Thunk`]s. Forcing a thunk binds its call-site
//! [`Arguments`] against the callee's [`Signature`] and runs the callee;
//! errors travel as ordinary [`Value`]s.

pub mod arguments;
pub mod dictionary;
pub mod error;
pub mod function;
pub mod list;
pub mod natives;
pub mod signature;
pub mod thunk;
pub mod value;

pub use arguments::{Arguments, KeywordArgument, PositionalArgument};
pub use dictionary::{Dictionary, Key};
pub use error::{Error, ErrorKind, Location};
pub use function::{Eval, Function, Native, Outcome};
pub use list::List;
pub use signature::{HalfSignature, OptionalArgument, Signature};
pub use thunk::Thunk;
pub use value::{Callable, Dumpable, Ordered, Stringable, Value};
