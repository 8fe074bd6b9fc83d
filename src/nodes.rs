use crate::{
    error::TickError, BehaviorNode, BehaviorNodeContainer, BehaviorStatus, Context, Lazy,
    NumChildren, PortValue, Symbol, TickResult,
};
use std::rc::Rc;

/// Ticks its children in order, one child per tick, resuming at the cursor
/// after a `Running` return. Success of a non-final child defers the next
/// child to the following tick; any terminal result resets the cursor.
#[derive(Default)]
pub struct SequenceNode {
    cursor: usize,
}

impl BehaviorNode for SequenceNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let mut children = std::mem::take(&mut ctx.child_nodes);
        let res = self.tick_cursor(&mut children, ctx);
        ctx.child_nodes = children;
        res
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl SequenceNode {
    fn tick_cursor(
        &mut self,
        children: &mut [BehaviorNodeContainer],
        ctx: &mut Context,
    ) -> TickResult {
        let child = children
            .get_mut(self.cursor)
            .ok_or(TickError::MissingChild("Sequence"))?;
        let status = child.tick(ctx)?;
        Ok(match status {
            BehaviorStatus::Success if self.cursor + 1 < children.len() => {
                // Defer the next child to the following tick.
                self.cursor += 1;
                BehaviorStatus::Running
            }
            BehaviorStatus::Running => BehaviorStatus::Running,
            terminal => {
                self.cursor = 0;
                terminal
            }
        })
    }
}

/// The mirror image of [`SequenceNode`]: advances past failing children and
/// short-circuits on the first Success.
#[derive(Default)]
pub struct FallbackNode {
    cursor: usize,
}

impl BehaviorNode for FallbackNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let mut children = std::mem::take(&mut ctx.child_nodes);
        let res = self.tick_cursor(&mut children, ctx);
        ctx.child_nodes = children;
        res
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl FallbackNode {
    fn tick_cursor(
        &mut self,
        children: &mut [BehaviorNodeContainer],
        ctx: &mut Context,
    ) -> TickResult {
        let child = children
            .get_mut(self.cursor)
            .ok_or(TickError::MissingChild("Fallback"))?;
        let status = child.tick(ctx)?;
        Ok(match status {
            BehaviorStatus::Failure if self.cursor + 1 < children.len() => {
                self.cursor += 1;
                BehaviorStatus::Running
            }
            BehaviorStatus::Running => BehaviorStatus::Running,
            terminal => {
                self.cursor = 0;
                terminal
            }
        })
    }
}

/// Swaps Success and Failure; Running passes through unchanged.
#[derive(Default)]
pub struct InverterNode;

impl BehaviorNode for InverterNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let mut children = std::mem::take(&mut ctx.child_nodes);
        let res = match children.first_mut() {
            Some(child) => child.tick(ctx).map(|status| match status {
                BehaviorStatus::Success => BehaviorStatus::Failure,
                BehaviorStatus::Failure => BehaviorStatus::Success,
                BehaviorStatus::Running => BehaviorStatus::Running,
            }),
            None => Err(TickError::MissingChild("Inverter")),
        };
        ctx.child_nodes = children;
        res
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

static NUM_ATTEMPTS: Lazy<Symbol> = Lazy::new(|| "num_attempts".into());

/// Turns a failing child into `Running` until `num_attempts` ticks have been
/// spent; the bound is read through the port on every tick. The attempt
/// counter survives terminal returns and is only cleared by `reset` or by
/// rebuilding the tree.
#[derive(Default)]
pub struct RetryUntilSuccessfulNode {
    attempt: usize,
}

impl BehaviorNode for RetryUntilSuccessfulNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let num_attempts = ctx.get_input_parse::<usize>(*NUM_ATTEMPTS)?.unwrap_or(1);
        let mut children = std::mem::take(&mut ctx.child_nodes);
        let res = match children.first_mut() {
            Some(child) => {
                self.attempt += 1;
                let attempt = self.attempt;
                child.tick(ctx).map(|status| {
                    if status == BehaviorStatus::Failure && attempt < num_attempts {
                        BehaviorStatus::Running
                    } else {
                        status
                    }
                })
            }
            None => Err(TickError::MissingChild("RetryUntilSuccessful")),
        };
        ctx.child_nodes = children;
        res
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// The resolved form of a `SubTree` reference: wraps a freshly instantiated
/// copy of the referenced tree and bridges the reference site's port
/// bindings between the parent scope and the subtree scope. The wrapped
/// subgraph carries the referenced tree's id, so its blackboard reads and
/// writes never leak into the parent's namespace.
pub struct SubTreeNode {
    scope: Symbol,
}

impl SubTreeNode {
    pub fn new(scope: Symbol) -> Self {
        Self { scope }
    }
}

impl BehaviorNode for SubTreeNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let parent = ctx.tree_id;
        let ports = std::mem::take(&mut ctx.ports);

        for (port, value) in &ports {
            match value {
                PortValue::Ref(key) => {
                    if let Some(val) = ctx.get_any(parent, *key) {
                        ctx.set_any(self.scope, *port, val);
                    }
                }
                PortValue::Literal(s) | PortValue::Quoted(s) => {
                    ctx.set_any(self.scope, *port, Rc::new(s.clone()));
                }
            }
        }

        let mut children = std::mem::take(&mut ctx.child_nodes);
        let res = match children.first_mut() {
            Some(child) => child.tick(ctx),
            None => Err(TickError::MissingChild("SubTree")),
        };
        ctx.child_nodes = children;

        // Outputs are copied back even on Fail or Running; a suspended
        // subtree may already have produced partial data.
        for (port, value) in &ports {
            if let PortValue::Ref(key) = value {
                if let Some(val) = ctx.get_any(self.scope, *port) {
                    ctx.set_any(parent, *key, val);
                }
            }
        }

        ctx.ports = ports;
        res
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(1)
    }
}

/// A host callback wrapped into a leaf. Shared by every instance built from
/// the same registration.
pub type SimpleCallback = Rc<dyn Fn() -> BehaviorStatus>;

/// Leaf running a zero-argument host callback, registered with
/// [`crate::Registry::register_simple_action`].
pub struct SimpleActionNode {
    callback: SimpleCallback,
}

impl SimpleActionNode {
    pub fn new(callback: SimpleCallback) -> Self {
        Self { callback }
    }
}

impl BehaviorNode for SimpleActionNode {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        Ok((self.callback)())
    }
}

/// Same shape as [`SimpleActionNode`]; by convention the callback checks
/// the world without changing it.
pub struct SimpleConditionNode {
    callback: SimpleCallback,
}

impl SimpleConditionNode {
    pub fn new(callback: SimpleCallback) -> Self {
        Self { callback }
    }
}

impl BehaviorNode for SimpleConditionNode {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        Ok((self.callback)())
    }
}

#[cfg(test)]
mod test;
