//! JSON program format.
//!
//! A program is a list of top-level definitions plus the outputs to run.
//! Expression nodes are tagged by `"node"`, definitions by `"kind"`.

use serde::{Deserialize, Serialize};
use tisp_core::Location;

use crate::error::LoadError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Program {
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub outputs: Vec<OutputNode>,
}

impl Program {
    pub fn from_json(src: &str) -> Result<Program, LoadError> {
        Ok(serde_json::from_str(src)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    Variable {
        name: String,
        expr: Node,
    },
    Function {
        name: String,
        #[serde(default)]
        signature: SignatureNode,
        /// Let bindings, visible as locals after the parameters.
        #[serde(default)]
        lets: Vec<Node>,
        body: Node,
    },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Variable { name, .. } | Definition::Function { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputNode {
    pub expr: Node,
    /// The output is a list whose elements are each run as an output.
    #[serde(default)]
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignatureNode {
    #[serde(default)]
    pub positional: HalfSignatureNode,
    #[serde(default)]
    pub keyword: HalfSignatureNode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HalfSignatureNode {
    #[serde(default)]
    pub requireds: Vec<String>,
    #[serde(default)]
    pub optionals: Vec<OptionalNode>,
    #[serde(default)]
    pub rest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionalNode {
    pub name: String,
    /// Evaluated without locals.
    pub default: Node,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Bool {
        value: bool,
    },
    Number {
        value: f64,
    },
    String {
        value: String,
    },
    /// Parameter or let binding of the enclosing function.
    Local {
        index: usize,
    },
    /// A top-level definition, or a builtin when no definition has the name.
    Name {
        name: String,
    },
    App {
        function: Box<Node>,
        #[serde(default)]
        positionals: Vec<PositionalNode>,
        #[serde(default)]
        keywords: Vec<KeywordNode>,
        #[serde(default)]
        expanded_dicts: Vec<Node>,
        #[serde(default)]
        location: Option<Location>,
    },
    Switch {
        value: Box<Node>,
        #[serde(default)]
        cases: Vec<CaseNode>,
        #[serde(default)]
        default: Option<Box<Node>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionalNode {
    pub value: Node,
    #[serde(default)]
    pub expanded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordNode {
    pub name: String,
    pub value: Node,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseNode {
    /// A literal node or the name of a builtin constant.
    pub pattern: Node,
    pub value: Node,
}
