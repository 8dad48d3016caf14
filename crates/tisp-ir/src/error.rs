#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("invalid program: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} is defined more than once")]
    DuplicateDefinition(String),
    #[error("name {name} is not found in {context}")]
    UnknownName { name: String, context: String },
    #[error("local index {index} is out of range in {context} ({locals} locals)")]
    LocalOutOfRange { index: usize, locals: usize, context: String },
    #[error("switch in {0} has neither cases nor a default")]
    EmptySwitch(String),
    #[error("switch pattern in {0} is not a literal")]
    InvalidPattern(String),
    #[error("{0} is an alias of itself")]
    CircularDefinition(String),
}
