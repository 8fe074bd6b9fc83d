use crate::Symbol;
use std::fmt::{self, Display, Formatter};

/// Arity violation when inserting a child into a container.
#[derive(Debug)]
#[non_exhaustive]
pub enum AddChildError {
    TooManyNodes,
}

impl Display for AddChildError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::TooManyNodes => write!(fmt, "Attempted to add too many nodes"),
        }
    }
}

impl std::error::Error for AddChildError {}

pub type AddChildResult = Result<(), AddChildError>;

/// Errors raised while walking a description or instantiating a tree.
/// All of these are fatal for the affected tree and are reported before
/// the first tick.
#[derive(Debug)]
#[non_exhaustive]
pub enum LoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The description does not have the expected nesting shape.
    BadDescription(String),
    /// The requested entry tree is not defined.
    MissingTree(String),
    /// No registered node type matches the description's keys.
    UnknownNodeType(String),
    /// More than one registered node type matches the description's keys.
    AmbiguousNodeType(Vec<String>),
    /// A control or decorator was described without the child it requires.
    MissingChild(String),
    /// A `SubTree` reference names a tree that was never defined.
    UnresolvedSubtree(String),
    /// A subtree transitively includes itself.
    InfiniteRecursion(String),
    AddChildError(AddChildError, String),
}

impl Display for LoadError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(fmt),
            Self::Json(e) => e.fmt(fmt),
            Self::BadDescription(msg) => write!(fmt, "Malformed description: {}", msg),
            Self::MissingTree(id) => write!(fmt, "The tree {:?} does not exist", id),
            Self::UnknownNodeType(keys) => {
                write!(fmt, "No registered node type matches {:?}", keys)
            }
            Self::AmbiguousNodeType(tags) => {
                write!(fmt, "Description matches more than one node type: {:?}", tags)
            }
            Self::MissingChild(ty) => {
                write!(fmt, "Node type {:?} requires a child but none was given", ty)
            }
            Self::UnresolvedSubtree(id) => {
                write!(fmt, "Subtree reference to unknown tree {:?}", id)
            }
            Self::InfiniteRecursion(id) => {
                write!(fmt, "Subtree {:?} recursively includes itself", id)
            }
            Self::AddChildError(e, node) => {
                e.fmt(fmt)?;
                write!(fmt, " to {}", node)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Errors surfaced by a tick. These mark a malformed or miswired tree, not
/// an ordinary Failure result, and the core never retries them.
#[derive(Debug)]
#[non_exhaustive]
pub enum TickError {
    /// A control or decorator was ticked without the child it requires.
    MissingChild(&'static str),
    /// A `{key}` binding was read before anything wrote the key.
    KeyNotFound { tree: Symbol, key: Symbol },
    /// A typed port conversion failed on a malformed literal.
    Conversion { value: String, into: &'static str },
}

impl Display for TickError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::MissingChild(ty) => {
                write!(fmt, "{} node was ticked without the required child", ty)
            }
            Self::KeyNotFound { tree, key } => {
                write!(
                    fmt,
                    "Blackboard key {:?} was never written in tree {:?}",
                    key, tree
                )
            }
            Self::Conversion { value, into } => {
                write!(fmt, "Port value {:?} cannot be converted into {}", value, into)
            }
        }
    }
}

impl std::error::Error for TickError {}
