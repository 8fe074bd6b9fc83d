//! A tick-driven behavior tree engine whose trees are assembled from
//! generic nested key/value descriptions (JSON).
//!
//! # Overview
//!
//! A behavior tree is ticked from the root, once per call to
//! [`BehaviorTree::tick`]. Every node answers with a [`BehaviorStatus`]:
//! `Success`, `Failure`, or `Running` when it needs more ticks to finish.
//! Control nodes ([`SequenceNode`], [`FallbackNode`]) advance through their
//! children one child per tick and remember where they were, so a tree
//! suspends and resumes across ticks without the host doing anything.
//!
//! Nodes exchange data through a [`Blackboard`] shared by the whole tree
//! and addressed through declared ports. A port binding is either a
//! blackboard reference (`{key}`), a quoted literal (`'3.14'`) that the
//! reading node parses into its own type, or a plain string literal.
//!
//! # Building trees
//!
//! Trees are described declaratively and built by a
//! [`BehaviorTreeFactory`]. The simplest description is a single object
//! with a `BehaviorTree` key holding the root node and an `ID` naming the
//! tree:
//!
//! ```
//! use behavior_tree_json::{BehaviorStatus, BehaviorTreeFactory};
//!
//! let mut factory = BehaviorTreeFactory::default();
//! factory.register_simple_action("SayHello", || {
//!     println!("hello");
//!     BehaviorStatus::Success
//! });
//!
//! let mut tree = factory
//!     .create_tree_from_text(
//!         r#"{"BehaviorTree": {"Sequence": [{"SayHello": ""}]}, "ID": "MainTree"}"#,
//!     )
//!     .unwrap();
//! assert_eq!(tree.tick().unwrap(), BehaviorStatus::Success);
//! ```
//!
//! Custom node types implement [`BehaviorNode`] and register a constructor
//! with the factory (or with a bare [`Registry`]); [`boxify`] adapts a
//! plain `Default`-like constructor into the boxed form the registry
//! stores.
//!
//! # Ports and the blackboard
//!
//! A node reads its inputs and writes its outputs through the [`Context`]
//! handed to `tick`. `{key}` bindings resolve against the blackboard scope
//! of the enclosing tree; literals come back as borrowed strings, or parsed
//! via [`Context::get_input_parse`]:
//!
//! ```
//! use behavior_tree_json::{
//!     port_map, BehaviorNode, BehaviorNodeContainer, BehaviorStatus, BehaviorTree, Context,
//!     TickResult,
//! };
//!
//! struct Greet;
//!
//! impl BehaviorNode for Greet {
//!     fn tick(&mut self, ctx: &mut Context) -> TickResult {
//!         let who = ctx.get_input::<String>("who")?.cloned().unwrap_or_default();
//!         ctx.set_output("reply", format!("hello, {}", who));
//!         Ok(BehaviorStatus::Success)
//!     }
//! }
//!
//! let root = BehaviorNodeContainer::new(
//!     Box::new(Greet),
//!     port_map!("who" => "{name}", "reply" => "{reply}"),
//!     "main".into(),
//!     "Greet",
//! );
//! let mut tree = BehaviorTree::new("main".into(), root);
//! tree.context_mut().set("name", "world".to_string());
//! tree.tick().unwrap();
//! assert_eq!(
//!     tree.context().get::<String>("reply"),
//!     Some(&"hello, world".to_string())
//! );
//! ```
//!
//! # Subtrees
//!
//! A description may define several trees and reference one from another
//! with `{"SubTree": "TreeId"}`. Every reference expands into its own
//! instance with its own node state and its own blackboard scope; scalar
//! fields on the reference site bridge values between the two scopes. The
//! entry tree is the only tree defined, or the one named
//! `main_tree_to_execute`, or conventionally `"MainTree"`.

mod container;
mod context;
pub mod error;
mod factory;
mod nodes;
mod port;
mod registry;
mod symbol;
mod tree;

pub use crate::{
    container::BehaviorNodeContainer,
    context::{Blackboard, Context},
    factory::{BehaviorTreeFactory, NodeDef, TreeDef, MAIN_TREE_ID},
    nodes::{
        FallbackNode, InverterNode, RetryUntilSuccessfulNode, SequenceNode, SimpleActionNode,
        SimpleCallback, SimpleConditionNode, SubTreeNode,
    },
    port::{PortMap, PortValue},
    registry::{boxify, Constructor, Registry},
    symbol::Symbol,
    tree::BehaviorTree,
};
pub use once_cell::sync::Lazy;

/// The answer a node gives to one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorStatus {
    Success,
    Failure,
    Running,
}

/// The result of ticking a node. Errors are exceptional conditions such as
/// unresolvable blackboard references, distinct from `Failure`, which is an
/// ordinary answer.
pub type TickResult = Result<BehaviorStatus, error::TickError>;

/// How many children a node type accepts. Leaves take none, decorators
/// exactly one, controls any number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use NumChildren::*;
        match (self, other) {
            (Finite(lhs), Finite(rhs)) => lhs.partial_cmp(rhs),
            (Finite(_), Infinite) => Some(std::cmp::Ordering::Less),
            (Infinite, Finite(_)) => Some(std::cmp::Ordering::Greater),
            (Infinite, Infinite) => Some(std::cmp::Ordering::Equal),
        }
    }
}

/// The behavior of one node in a tree. Implementations keep whatever state
/// they need across ticks; a `Running` return means the same node will be
/// ticked again before the tree moves on.
pub trait BehaviorNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult;

    /// How many children this node type accepts; exceeding it is a
    /// structural error at build time.
    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(0)
    }

    /// Drop per-instance tick state (cursors, attempt counters). Called
    /// through [`BehaviorTree::reset`]; ticking never resets implicitly.
    fn reset(&mut self) {}
}

/// Builds a [`PortMap`] literal. Values are classified the way the factory
/// classifies description fields: `"{key}"` becomes a blackboard reference,
/// `"'v'"` a quoted literal, anything else a plain literal.
///
/// ```
/// use behavior_tree_json::{port_map, PortValue, Symbol};
///
/// let ports = port_map!("goal" => "{target}", "speed" => "'1.5'");
/// let goal = Symbol::from("goal");
/// assert!(matches!(ports[&goal], PortValue::Ref(_)));
/// ```
#[macro_export]
macro_rules! port_map {
    () => {
        $crate::PortMap::new()
    };
    ($($name:literal => $val:expr),* $(,)?) => {{
        let mut map = $crate::PortMap::new();
        $(
            map.insert($name.into(), $crate::PortValue::classify($val));
        )*
        map
    }};
}
