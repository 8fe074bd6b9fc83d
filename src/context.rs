use crate::{
    container::BehaviorNodeContainer,
    error::TickError,
    port::{PortMap, PortValue},
    Symbol,
};
use std::{any::Any, collections::HashMap, rc::Rc, str::FromStr};

/// Blackboard is a mapping from (tree id, key) to an opaque value. Keys are
/// namespaced per tree instance id, so subtrees never observe their parent's
/// variables implicitly.
///
/// The values are `Rc` rather than `Box` because subtree port passing copies
/// values between scopes, and `Clone` is not object safe.
pub type Blackboard = HashMap<(Symbol, Symbol), Rc<dyn Any>>;

/// The per-tick view a node gets of the world: the blackboard, the id of the
/// enclosing tree scope and the node's own port bindings. The latter two are
/// swapped in by [`BehaviorNodeContainer::tick`] for the duration of one
/// node's tick.
pub struct Context {
    pub(crate) blackboard: Blackboard,
    pub(crate) ports: PortMap,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer>,
    pub(crate) tree_id: Symbol,
}

impl Default for Context {
    fn default() -> Self {
        Self::new("main".into())
    }
}

impl Context {
    pub fn new(tree_id: Symbol) -> Self {
        Self {
            blackboard: Blackboard::new(),
            ports: PortMap::new(),
            child_nodes: vec![],
            tree_id,
        }
    }

    /// Id of the tree scope the currently ticking node belongs to.
    pub fn tree_id(&self) -> Symbol {
        self.tree_id
    }

    /// Read a declared input port. An unbound port yields `None` so the
    /// caller can apply its default. A `{key}` binding resolves against the
    /// blackboard scoped to this node's tree id; a key nobody has written is
    /// a wiring error, not a recoverable condition.
    pub fn get_input<T: 'static>(&self, port: impl Into<Symbol>) -> Result<Option<&T>, TickError> {
        let port = port.into();
        match self.ports.get(&port) {
            None => Ok(None),
            Some(PortValue::Ref(key)) => {
                let val = self.blackboard.get(&(self.tree_id, *key)).ok_or(
                    TickError::KeyNotFound {
                        tree: self.tree_id,
                        key: *key,
                    },
                )?;
                Ok(val.downcast_ref())
            }
            Some(PortValue::Literal(s)) | Some(PortValue::Quoted(s)) => {
                Ok((s as &dyn Any).downcast_ref())
            }
        }
    }

    /// [`Context::get_input`] with a default for unbound ports.
    pub fn get_input_or<T: Clone + 'static>(
        &self,
        port: impl Into<Symbol>,
        default: T,
    ) -> Result<T, TickError> {
        Ok(self.get_input(port)?.cloned().unwrap_or(default))
    }

    /// Resolve like [`Context::get_input`], then convert string values,
    /// including `'...'` quoted literals, with the expected type's
    /// [`FromStr`] parser. This is how a port like `'1.1;2.3'` becomes a
    /// coordinate pair.
    pub fn get_input_parse<T>(&self, port: impl Into<Symbol>) -> Result<Option<T>, TickError>
    where
        T: FromStr + Clone + 'static,
    {
        let port = port.into();
        match self.ports.get(&port) {
            None => Ok(None),
            Some(PortValue::Ref(key)) => {
                let val = self.blackboard.get(&(self.tree_id, *key)).ok_or(
                    TickError::KeyNotFound {
                        tree: self.tree_id,
                        key: *key,
                    },
                )?;
                if let Some(val) = val.downcast_ref::<T>() {
                    Ok(Some(val.clone()))
                } else if let Some(s) = val.downcast_ref::<String>() {
                    parse_port(s).map(Some)
                } else {
                    Ok(None)
                }
            }
            Some(PortValue::Literal(s)) | Some(PortValue::Quoted(s)) => parse_port(s).map(Some),
        }
    }

    /// Write a declared output port. Only a `{key}` binding reaches the
    /// blackboard; a literal binding or an unbound port makes the write a
    /// no-op, since a node cannot redefine its own literal.
    pub fn set_output<T: 'static>(&mut self, port: impl Into<Symbol>, val: T) {
        let port = port.into();
        if let Some(PortValue::Ref(key)) = self.ports.get(&port) {
            self.blackboard.insert((self.tree_id, *key), Rc::new(val));
        }
    }

    /// Read a blackboard variable of the current tree scope directly,
    /// bypassing port bindings. Mostly for hosts and tests.
    pub fn get<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard
            .get(&(self.tree_id, key.into()))
            .and_then(|val| val.downcast_ref())
    }

    /// Write a blackboard variable of the current tree scope directly, e.g.
    /// to seed data before the first tick.
    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        self.blackboard
            .insert((self.tree_id, key.into()), Rc::new(val));
    }

    pub(crate) fn get_any(&self, tree: Symbol, key: Symbol) -> Option<Rc<dyn Any>> {
        self.blackboard.get(&(tree, key)).cloned()
    }

    pub(crate) fn set_any(&mut self, tree: Symbol, key: Symbol, val: Rc<dyn Any>) {
        self.blackboard.insert((tree, key), val);
    }
}

fn parse_port<T: FromStr>(s: &str) -> Result<T, TickError> {
    s.parse().map_err(|_| TickError::Conversion {
        value: s.to_owned(),
        into: std::any::type_name::<T>(),
    })
}
