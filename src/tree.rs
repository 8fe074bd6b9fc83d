use crate::{container::BehaviorNodeContainer, BehaviorStatus, Context, Symbol, TickResult};

/// A named root wrapper: the entry point the host ticks. It owns the root
/// node and the [`Context`], and with it the blackboard state of the whole
/// tree instance, subtrees included.
pub struct BehaviorTree {
    id: Symbol,
    root: BehaviorNodeContainer,
    ctx: Context,
}

impl std::fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl BehaviorTree {
    pub fn new(id: Symbol, root: BehaviorNodeContainer) -> Self {
        Self {
            id,
            root,
            ctx: Context::new(id),
        }
    }

    pub fn id(&self) -> Symbol {
        self.id
    }

    /// Run one scheduling quantum. A `Running` return means the caller must
    /// tick again to make progress.
    pub fn tick(&mut self) -> TickResult {
        self.root.tick(&mut self.ctx)
    }

    /// Tick in a loop until the tree settles on Success or Failure.
    pub fn tick_while_running(&mut self) -> TickResult {
        loop {
            let status = self.tick()?;
            if status != BehaviorStatus::Running {
                return Ok(status);
            }
        }
    }

    /// Clear every cursor and attempt counter so the next tick starts a
    /// fresh run. Blackboard contents are kept. Nothing resets
    /// automatically; calling this between runs is the host's choice.
    pub fn reset(&mut self) {
        self.root.reset();
    }

    pub fn root(&self) -> &BehaviorNodeContainer {
        &self.root
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Access to the blackboard, e.g. to seed variables before the first
    /// tick.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}
