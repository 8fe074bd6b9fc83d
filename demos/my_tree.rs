//! The classic gripper example: a sequence of simple actions driving a
//! shared bit of host state through `Rc<RefCell>` closures.

use behavior_tree_json::{BehaviorStatus, BehaviorTreeFactory};
use std::cell::RefCell;
use std::rc::Rc;

struct GripperInterface {
    open: bool,
    holding: bool,
}

impl GripperInterface {
    fn open(&mut self) -> BehaviorStatus {
        println!("GripperInterface: opening");
        self.open = true;
        BehaviorStatus::Success
    }

    fn close(&mut self) -> BehaviorStatus {
        println!("GripperInterface: closing");
        self.open = false;
        self.holding = true;
        BehaviorStatus::Success
    }
}

const TREE: &str = r#"{
    "BehaviorTree": {
        "Sequence": [
            {"CheckBattery": ""},
            {"OpenGripper": ""},
            {"ApproachObject": ""},
            {"CloseGripper": ""}
        ]
    },
    "ID": "MainTree"
}"#;

fn main() -> anyhow::Result<()> {
    let gripper = Rc::new(RefCell::new(GripperInterface {
        open: false,
        holding: false,
    }));

    let mut factory = BehaviorTreeFactory::default();
    factory.register_simple_condition("CheckBattery", || {
        println!("battery ok");
        BehaviorStatus::Success
    });
    factory.register_simple_action("ApproachObject", || {
        println!("approaching the object");
        BehaviorStatus::Success
    });
    let g = gripper.clone();
    factory.register_simple_action("OpenGripper", move || g.borrow_mut().open());
    let g = gripper.clone();
    factory.register_simple_action("CloseGripper", move || g.borrow_mut().close());

    let mut tree = factory.create_tree_from_text(TREE)?;
    let status = tree.tick_while_running()?;
    println!("tree finished with {:?}", status);
    println!("holding the object: {}", gripper.borrow().holding);
    Ok(())
}
