use crate::{
    error::LoadError,
    nodes::{
        FallbackNode, InverterNode, RetryUntilSuccessfulNode, SequenceNode, SimpleActionNode,
        SimpleCallback, SimpleConditionNode,
    },
    BehaviorNode, BehaviorStatus,
};
use std::{collections::HashMap, rc::Rc};

/// A node type constructor. `Rc` so aliases can share one entry.
pub type Constructor = Rc<dyn Fn() -> Box<dyn BehaviorNode>>;

pub fn boxify<T>(cons: impl (Fn() -> T) + 'static) -> Constructor
where
    T: BehaviorNode + 'static,
{
    Rc::new(move || Box::new(cons()))
}

/// Maps declarative type tags to constructors. Registration is an explicit
/// startup step; the built-in control and decorator types come
/// pre-registered.
pub struct Registry {
    node_types: HashMap<String, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut ret = Self {
            node_types: HashMap::new(),
        };
        ret.register("Sequence", boxify(SequenceNode::default));
        ret.register("Fallback", boxify(FallbackNode::default));
        ret.register("Inverter", boxify(InverterNode::default));
        ret.register(
            "RetryUntilSuccessful",
            boxify(RetryUntilSuccessfulNode::default),
        );
        ret
    }
}

impl Registry {
    pub fn register(&mut self, type_name: impl ToString, constructor: Constructor) {
        self.node_types.insert(type_name.to_string(), constructor);
    }

    /// Register an additional tag for an already registered type.
    pub fn register_alias(
        &mut self,
        type_name: &str,
        alias: impl ToString,
    ) -> Result<(), LoadError> {
        let constructor = self
            .node_types
            .get(type_name)
            .cloned()
            .ok_or_else(|| LoadError::UnknownNodeType(type_name.to_owned()))?;
        self.node_types.insert(alias.to_string(), constructor);
        Ok(())
    }

    /// Wrap a zero-argument host callback into an action leaf type
    /// registered under `id`, so hosts can supply behavior without defining
    /// a node type of their own.
    pub fn register_simple_action(
        &mut self,
        id: impl ToString,
        callback: impl Fn() -> BehaviorStatus + 'static,
    ) {
        let callback: SimpleCallback = Rc::new(callback);
        self.register(
            id,
            Rc::new(move || {
                Box::new(SimpleActionNode::new(callback.clone())) as Box<dyn BehaviorNode>
            }),
        );
    }

    /// The condition flavor of [`Registry::register_simple_action`].
    pub fn register_simple_condition(
        &mut self,
        id: impl ToString,
        callback: impl Fn() -> BehaviorStatus + 'static,
    ) {
        let callback: SimpleCallback = Rc::new(callback);
        self.register(
            id,
            Rc::new(move || {
                Box::new(SimpleConditionNode::new(callback.clone())) as Box<dyn BehaviorNode>
            }),
        );
    }

    pub fn build(&self, type_name: &str) -> Option<Box<dyn BehaviorNode>> {
        self.node_types
            .get(type_name)
            .map(|constructor| constructor())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.node_types.contains_key(type_name)
    }
}
