//! Intermediate representation consumed by the tisp runtime.
//!
//! - `program`: serde types for the JSON program format
//! - `loader`: name resolution and validation into a runnable [`Module`]
//! - `expression`: expression trees interpreted per call into thunks

pub mod error;
pub mod expression;
pub mod loader;
pub mod program;

pub use error::LoadError;
pub use expression::{compile_function, Application, Expression, Keyword, Positional, Switch};
pub use loader::{load, Module, Output};
pub use program::{Definition, Node, Program};

/// Parses and loads a JSON program.
pub fn load_json(src: &str) -> Result<Module, LoadError> {
    load(&Program::from_json(src)?)
}
