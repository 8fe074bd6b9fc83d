use crate::{
    error::{AddChildError, AddChildResult},
    BehaviorNode, Context, NumChildren, PortMap, Symbol, TickResult,
};

/// A node together with everything the engine tracks per tree position: the
/// display name, the port bindings, the owned children and the id of the
/// enclosing tree scope. The tree owns its nodes top-down; there are no
/// parent back-references.
pub struct BehaviorNodeContainer {
    pub(crate) name: String,
    pub(crate) node: Box<dyn BehaviorNode>,
    pub(crate) ports: PortMap,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer>,
    pub(crate) tree_id: Symbol,
}

impl BehaviorNodeContainer {
    pub fn new(
        node: Box<dyn BehaviorNode>,
        ports: PortMap,
        tree_id: Symbol,
        name: impl ToString,
    ) -> Self {
        Self {
            name: name.to_string(),
            node,
            ports,
            child_nodes: vec![],
            tree_id,
        }
    }

    /// A container without bindings in the default scope, for tests and
    /// hand-built trees.
    pub fn new_node(node: impl BehaviorNode + 'static) -> Self {
        Self::new(Box::new(node), PortMap::new(), "main".into(), "")
    }

    /// Swap this node's ports, children and tree scope into the context for
    /// the duration of one tick.
    pub fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let prev_tree = std::mem::replace(&mut ctx.tree_id, self.tree_id);
        std::mem::swap(&mut self.ports, &mut ctx.ports);
        std::mem::swap(&mut self.child_nodes, &mut ctx.child_nodes);
        let res = self.node.tick(ctx);
        std::mem::swap(&mut self.child_nodes, &mut ctx.child_nodes);
        std::mem::swap(&mut self.ports, &mut ctx.ports);
        ctx.tree_id = prev_tree;
        res
    }

    pub fn add_child(&mut self, child: BehaviorNodeContainer) -> AddChildResult {
        if NumChildren::Finite(self.child_nodes.len()) < self.node.max_children() {
            self.child_nodes.push(child);
            Ok(())
        } else {
            Err(AddChildError::TooManyNodes)
        }
    }

    /// Clear resumable state (cursors, attempt counters) in this node and
    /// every descendant.
    pub fn reset(&mut self) {
        self.node.reset();
        for child in &mut self.child_nodes {
            child.reset();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[BehaviorNodeContainer] {
        &self.child_nodes
    }

    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    pub fn tree_id(&self) -> Symbol {
        self.tree_id
    }
}
