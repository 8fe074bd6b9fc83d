use super::*;
use crate::port_map;
use std::cell::Cell;
use std::rc::Rc;

struct Always(BehaviorStatus);

impl BehaviorNode for Always {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        Ok(self.0)
    }
}

struct Counted {
    status: BehaviorStatus,
    count: Rc<Cell<usize>>,
}

impl BehaviorNode for Counted {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        self.count.set(self.count.get() + 1);
        Ok(self.status)
    }
}

fn counted(status: BehaviorStatus) -> (BehaviorNodeContainer, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    let node = BehaviorNodeContainer::new_node(Counted {
        status,
        count: count.clone(),
    });
    (node, count)
}

#[test]
fn sequence_advances_one_child_per_tick() {
    let mut ctx = Context::default();
    let mut seq = BehaviorNodeContainer::new_node(SequenceNode::default());
    let mut counts = vec![];
    for _ in 0..3 {
        let (child, count) = counted(BehaviorStatus::Success);
        seq.add_child(child).unwrap();
        counts.push(count);
    }

    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Success);
    let ticks: Vec<_> = counts.iter().map(|c| c.get()).collect();
    assert_eq!(ticks, vec![1, 1, 1]);
}

#[test]
fn sequence_fails_fast_and_resets_the_cursor() {
    let mut ctx = Context::default();
    let mut seq = BehaviorNodeContainer::new_node(SequenceNode::default());
    let (first, first_count) = counted(BehaviorStatus::Success);
    let (last, last_count) = counted(BehaviorStatus::Success);
    seq.add_child(first).unwrap();
    seq.add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();
    seq.add_child(last).unwrap();

    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);
    // Short-circuit: the child past the failure was never ticked.
    assert_eq!(last_count.get(), 0);

    // The cursor reset on Failure, so the next tick starts over.
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(first_count.get(), 2);
}

#[test]
fn sequence_resumes_at_the_running_child() {
    let mut ctx = Context::default();
    let mut seq = BehaviorNodeContainer::new_node(SequenceNode::default());
    let (first, first_count) = counted(BehaviorStatus::Success);
    let (stalled, stalled_count) = counted(BehaviorStatus::Running);
    seq.add_child(first).unwrap();
    seq.add_child(stalled).unwrap();

    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(seq.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    // The completed child is not re-ticked while its sibling is Running.
    assert_eq!(first_count.get(), 1);
    assert_eq!(stalled_count.get(), 2);
}

#[test]
fn sequence_without_children_is_a_structural_error() {
    let mut ctx = Context::default();
    let mut seq = BehaviorNodeContainer::new_node(SequenceNode::default());
    assert!(matches!(
        seq.tick(&mut ctx),
        Err(TickError::MissingChild("Sequence"))
    ));
}

#[test]
fn fallback_short_circuits_on_success() {
    let mut ctx = Context::default();
    let mut fallback = BehaviorNodeContainer::new_node(FallbackNode::default());
    let (rest, rest_count) = counted(BehaviorStatus::Success);
    fallback
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();
    fallback
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Success)))
        .unwrap();
    fallback.add_child(rest).unwrap();

    assert_eq!(fallback.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(fallback.tick(&mut ctx).unwrap(), BehaviorStatus::Success);
    assert_eq!(rest_count.get(), 0);
}

#[test]
fn fallback_fails_after_the_last_child() {
    let mut ctx = Context::default();
    let mut fallback = BehaviorNodeContainer::new_node(FallbackNode::default());
    fallback
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();
    fallback
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();

    assert_eq!(fallback.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(fallback.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);
}

#[test]
fn inverter_swaps_terminal_statuses() {
    let mut ctx = Context::default();
    for (child, expected) in [
        (BehaviorStatus::Success, BehaviorStatus::Failure),
        (BehaviorStatus::Failure, BehaviorStatus::Success),
        (BehaviorStatus::Running, BehaviorStatus::Running),
    ]
    .iter()
    {
        let mut inverter = BehaviorNodeContainer::new_node(InverterNode::default());
        inverter
            .add_child(BehaviorNodeContainer::new_node(Always(*child)))
            .unwrap();
        assert_eq!(inverter.tick(&mut ctx).unwrap(), *expected);
    }
}

#[test]
fn double_inversion_is_the_identity() {
    let mut ctx = Context::default();
    for status in [
        BehaviorStatus::Success,
        BehaviorStatus::Failure,
        BehaviorStatus::Running,
    ]
    .iter()
    {
        let mut inner = BehaviorNodeContainer::new_node(InverterNode::default());
        inner
            .add_child(BehaviorNodeContainer::new_node(Always(*status)))
            .unwrap();
        let mut outer = BehaviorNodeContainer::new_node(InverterNode::default());
        outer.add_child(inner).unwrap();
        assert_eq!(outer.tick(&mut ctx).unwrap(), *status);
    }
}

#[test]
fn inverter_without_a_child_is_a_structural_error() {
    let mut ctx = Context::default();
    let mut inverter = BehaviorNodeContainer::new_node(InverterNode::default());
    assert!(matches!(
        inverter.tick(&mut ctx),
        Err(TickError::MissingChild("Inverter"))
    ));
}

#[test]
fn decorators_accept_a_single_child() {
    let mut inverter = BehaviorNodeContainer::new_node(InverterNode::default());
    inverter
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Success)))
        .unwrap();
    assert!(inverter
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Success)))
        .is_err());
}

fn retry_with_attempts(n: &str) -> BehaviorNodeContainer {
    BehaviorNodeContainer::new(
        Box::new(RetryUntilSuccessfulNode::default()),
        port_map!("num_attempts" => n),
        "main".into(),
        "RetryUntilSuccessful",
    )
}

#[test]
fn retry_runs_k_minus_one_times_then_fails() {
    let mut ctx = Context::default();
    let mut retry = retry_with_attempts("3");
    let (child, count) = counted(BehaviorStatus::Failure);
    retry.add_child(child).unwrap();

    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);
    assert_eq!(count.get(), 3);
}

struct FailThenSucceed {
    fails_left: usize,
}

impl BehaviorNode for FailThenSucceed {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        if self.fails_left == 0 {
            Ok(BehaviorStatus::Success)
        } else {
            self.fails_left -= 1;
            Ok(BehaviorStatus::Failure)
        }
    }
}

#[test]
fn retry_passes_success_through() {
    let mut ctx = Context::default();
    let mut retry = retry_with_attempts("3");
    retry
        .add_child(BehaviorNodeContainer::new_node(FailThenSucceed { fails_left: 1 }))
        .unwrap();

    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Success);
}

#[test]
fn retry_defaults_to_a_single_attempt() {
    let mut ctx = Context::default();
    let mut retry = BehaviorNodeContainer::new_node(RetryUntilSuccessfulNode::default());
    retry
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);
}

#[test]
fn retry_attempt_counter_persists_until_reset() {
    let mut ctx = Context::default();
    let mut retry = retry_with_attempts("2");
    retry
        .add_child(BehaviorNodeContainer::new_node(Always(BehaviorStatus::Failure)))
        .unwrap();

    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);
    // The budget stays exhausted across runs until explicitly reset.
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Failure);

    retry.reset();
    assert_eq!(retry.tick(&mut ctx).unwrap(), BehaviorStatus::Running);
}

struct Relay;

impl BehaviorNode for Relay {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let input = ctx.get::<String>("input").cloned().unwrap_or_default();
        ctx.set("output", format!("{}!", input));
        Ok(BehaviorStatus::Success)
    }
}

#[test]
fn subtree_bridges_ports_between_scopes() {
    let mut ctx = Context::default();
    ctx.set("src", "knock".to_owned());

    let mut subtree = BehaviorNodeContainer::new(
        Box::new(SubTreeNode::new("sub".into())),
        port_map!("input" => "{src}", "output" => "{dst}"),
        "main".into(),
        "sub",
    );
    subtree
        .add_child(BehaviorNodeContainer::new(
            Box::new(Relay),
            crate::PortMap::new(),
            "sub".into(),
            "Relay",
        ))
        .unwrap();

    assert_eq!(subtree.tick(&mut ctx).unwrap(), BehaviorStatus::Success);
    // The relay only ever saw the subtree scope; the parent got the result
    // through the declared output binding.
    assert_eq!(ctx.get::<String>("dst").map(String::as_str), Some("knock!"));
    assert!(ctx.get::<String>("output").is_none());
}
