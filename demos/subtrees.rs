//! Two references to the same subtree definition: each expands into its own
//! instance with its own cursor, and the `target` field on each reference
//! site carries a different value into the subtree's scope.

use behavior_tree_json::{
    boxify, BehaviorNode, BehaviorStatus, BehaviorTreeFactory, Context, TickResult,
};

#[derive(Default)]
struct SaySomething;

impl BehaviorNode for SaySomething {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let message = ctx.get_input_or("message", "...".to_string())?;
        println!("robot says: {}", message);
        Ok(BehaviorStatus::Success)
    }
}

const TREES: &str = r#"[
    {
        "BehaviorTree": {
            "Sequence": [
                {"SubTree": "GraspObject", "target": "'the apple'"},
                {"SubTree": "GraspObject", "target": "'the pear'"}
            ]
        },
        "ID": "MainTree"
    },
    {
        "BehaviorTree": {
            "Sequence": [
                {"SaySomething": "", "message": "'approaching'"},
                {"SaySomething": "", "message": "{target}"}
            ]
        },
        "ID": "GraspObject"
    }
]"#;

fn main() -> anyhow::Result<()> {
    let mut factory = BehaviorTreeFactory::default();
    factory.register_node_type("SaySomething", boxify(SaySomething::default));

    let mut tree = factory.create_tree_from_text(TREES)?;
    loop {
        let status = tree.tick()?;
        println!("tick -> {:?}", status);
        if status != BehaviorStatus::Running {
            break;
        }
    }
    Ok(())
}
