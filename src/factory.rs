use crate::{
    container::BehaviorNodeContainer,
    error::LoadError,
    nodes::SubTreeNode,
    port::{PortMap, PortValue},
    registry::{Constructor, Registry},
    tree::BehaviorTree,
    BehaviorStatus, NumChildren, Symbol,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Conventional id of the entry tree.
pub const MAIN_TREE_ID: &str = "MainTree";

/// Keys that shape the description rather than bind ports.
const STRUCTURAL_KEYS: &[&str] = &[
    "ID",
    "name",
    "BehaviorTree",
    "SubTree",
    "include",
    "BTCPP_format",
    "root",
    "main_tree_to_execute",
];

/// Blueprint of a named tree, produced by the description walk. Instances
/// are always built fresh from it, never shared, so every use site gets its
/// own cursors and counters.
pub struct TreeDef {
    pub id: String,
    pub root: NodeDef,
}

/// Blueprint of one node in a tree description.
pub enum NodeDef {
    Node {
        ty: String,
        name: Option<String>,
        ports: Vec<(String, String)>,
        children: Vec<NodeDef>,
    },
    /// A reference to another named tree, resolved at instantiation time.
    Subtree {
        id: String,
        ports: Vec<(String, String)>,
    },
}

/// Assembles [`BehaviorTree`]s from generic nested key/value descriptions.
///
/// Building is a two-pass affair: the walk over the description (pass 1)
/// collects a blueprint per named tree and rejects unknown or ambiguous
/// node types eagerly; instantiation (pass 2) turns a blueprint into an
/// owned node graph, expanding every `SubTree` reference into a fresh copy
/// of the referenced tree.
pub struct BehaviorTreeFactory {
    registry: Registry,
    tree_defs: HashMap<String, TreeDef>,
    main_tree_id: Option<String>,
    btcpp_format: i64,
}

impl Default for BehaviorTreeFactory {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            tree_defs: HashMap::new(),
            main_tree_id: None,
            btcpp_format: 4,
        }
    }
}

impl BehaviorTreeFactory {
    pub fn register_node_type(&mut self, type_name: impl ToString, constructor: Constructor) {
        self.registry.register(type_name, constructor);
    }

    pub fn register_alias(
        &mut self,
        type_name: &str,
        alias: impl ToString,
    ) -> Result<(), LoadError> {
        self.registry.register_alias(type_name, alias)
    }

    pub fn register_simple_action(
        &mut self,
        id: impl ToString,
        callback: impl Fn() -> BehaviorStatus + 'static,
    ) {
        self.registry.register_simple_action(id, callback);
    }

    pub fn register_simple_condition(
        &mut self,
        id: impl ToString,
        callback: impl Fn() -> BehaviorStatus + 'static,
    ) {
        self.registry.register_simple_condition(id, callback);
    }

    /// Version tag recorded from the last `BTCPP_format` field seen.
    /// Compatibility bookkeeping only.
    pub fn format_version(&self) -> i64 {
        self.btcpp_format
    }

    pub fn tree_ids(&self) -> impl Iterator<Item = &str> {
        self.tree_defs.keys().map(|id| id.as_str())
    }

    /// Parse a description file and instantiate its entry tree.
    pub fn create_tree_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<BehaviorTree, LoadError> {
        self.load_file(path.as_ref())?;
        self.create_main_tree()
    }

    /// [`BehaviorTreeFactory::create_tree_from_file`] for descriptions
    /// already in memory. `include` paths resolve relative to the working
    /// directory.
    pub fn create_tree_from_text(&mut self, text: &str) -> Result<BehaviorTree, LoadError> {
        let value: Value = serde_json::from_str(text)?;
        self.load_value(&value, Path::new("."))?;
        self.create_main_tree()
    }

    /// A lone tree is the entry point whatever its id; otherwise the
    /// description's `main_tree_to_execute`, falling back to `"MainTree"`.
    fn create_main_tree(&self) -> Result<BehaviorTree, LoadError> {
        if self.tree_defs.len() == 1 {
            if let Some(id) = self.tree_defs.keys().next() {
                return self.instantiate(&id.clone());
            }
        }
        let id = self.main_tree_id.as_deref().unwrap_or(MAIN_TREE_ID);
        if !self.tree_defs.contains_key(id) {
            return Err(LoadError::MissingTree(id.to_owned()));
        }
        self.instantiate(id)
    }

    /// Pass 1 over a file: collect tree definitions, following `include`
    /// directives relative to this file's location.
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        self.load_value(&value, base)
    }

    /// Pass 1 over one description value, registering every named tree it
    /// defines.
    pub fn load_value(&mut self, value: &Value, base: &Path) -> Result<(), LoadError> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.load_value(item, base)?;
                }
                Ok(())
            }
            Value::Object(obj) => self.load_object(obj, base),
            _ => Err(LoadError::BadDescription(format!(
                "expected an object or an array of objects, got {}",
                value
            ))),
        }
    }

    fn load_object(&mut self, obj: &Map<String, Value>, base: &Path) -> Result<(), LoadError> {
        if let Some(version) = obj.get("BTCPP_format") {
            if let Some(version) = version.as_i64() {
                self.btcpp_format = version;
            }
            if let Some(main) = obj.get("main_tree_to_execute").and_then(Value::as_str) {
                self.main_tree_id = Some(main.to_owned());
            }
            if let Some(root) = obj.get("root") {
                self.load_value(root, base)?;
            }
            return Ok(());
        }
        if let Some(include) = obj.get("include").and_then(Value::as_str) {
            return self.load_file(&base.join(include));
        }
        if let Some(root) = obj.get("BehaviorTree") {
            let id = obj.get("ID").and_then(Value::as_str).ok_or_else(|| {
                LoadError::BadDescription("BehaviorTree definition without an ID".to_owned())
            })?;
            let root = self.parse_node(root)?;
            self.tree_defs.insert(
                id.to_owned(),
                TreeDef {
                    id: id.to_owned(),
                    root,
                },
            );
            return Ok(());
        }
        Err(LoadError::BadDescription(format!(
            "no tree definition among keys {:?}",
            obj.keys().collect::<Vec<_>>()
        )))
    }

    /// Classify one node description by the single recognized tag it
    /// carries, then recurse into its children, bottom-up.
    fn parse_node(&self, value: &Value) -> Result<NodeDef, LoadError> {
        let obj = value.as_object().ok_or_else(|| {
            LoadError::BadDescription(format!("node description must be an object, got {}", value))
        })?;

        if let Some(sub) = obj.get("SubTree") {
            let id = sub.as_str().ok_or_else(|| {
                LoadError::BadDescription("SubTree reference must name a tree id".to_owned())
            })?;
            return Ok(NodeDef::Subtree {
                id: id.to_owned(),
                ports: port_fields(obj, "SubTree"),
            });
        }

        let tags: Vec<&String> = obj.keys().filter(|key| self.registry.contains(key)).collect();
        let ty = match tags.len() {
            1 => tags[0].clone(),
            0 => {
                let id = obj.get("ID").and_then(Value::as_str).ok_or_else(|| {
                    LoadError::UnknownNodeType(
                        obj.keys().cloned().collect::<Vec<_>>().join(", "),
                    )
                })?;
                if !self.registry.contains(id) {
                    return Err(LoadError::UnknownNodeType(id.to_owned()));
                }
                id.to_owned()
            }
            _ => {
                return Err(LoadError::AmbiguousNodeType(
                    tags.into_iter().cloned().collect(),
                ))
            }
        };

        let mut children = vec![];
        match obj.get(ty.as_str()) {
            Some(Value::Array(items)) => {
                for item in items {
                    children.push(self.parse_node(item)?);
                }
            }
            Some(child @ Value::Object(_)) => children.push(self.parse_node(child)?),
            _ => (),
        }

        Ok(NodeDef::Node {
            name: obj.get("name").and_then(Value::as_str).map(str::to_owned),
            ports: port_fields(obj, &ty),
            ty,
            children,
        })
    }

    /// Pass 2: build a fresh instance of a named tree. Every call, and
    /// every `SubTree` reference inside, produces an independent subgraph.
    pub fn instantiate(&self, id: &str) -> Result<BehaviorTree, LoadError> {
        let def = self
            .tree_defs
            .get(id)
            .ok_or_else(|| LoadError::MissingTree(id.to_owned()))?;
        let stack = TreeStack {
            name: id,
            parent: None,
        };
        let root = self.build_recurse(&def.root, id.into(), &stack)?;
        Ok(BehaviorTree::new(id.into(), root))
    }

    fn build_recurse(
        &self,
        def: &NodeDef,
        tree_id: Symbol,
        stack: &TreeStack,
    ) -> Result<BehaviorNodeContainer, LoadError> {
        match def {
            NodeDef::Node {
                ty,
                name,
                ports,
                children,
            } => {
                let node = self
                    .registry
                    .build(ty)
                    .ok_or_else(|| LoadError::UnknownNodeType(ty.clone()))?;
                // A control or decorator without its child should be caught
                // here, not on the first tick.
                if node.max_children() != NumChildren::Finite(0) && children.is_empty() {
                    return Err(LoadError::MissingChild(ty.clone()));
                }
                let mut container = BehaviorNodeContainer::new(
                    node,
                    classify_ports(ports),
                    tree_id,
                    name.as_deref().unwrap_or(ty),
                );
                for child in children {
                    let child = self.build_recurse(child, tree_id, stack)?;
                    container
                        .add_child(child)
                        .map_err(|e| LoadError::AddChildError(e, ty.clone()))?;
                }
                Ok(container)
            }
            NodeDef::Subtree { id, ports } => {
                let def = self
                    .tree_defs
                    .get(id)
                    .ok_or_else(|| LoadError::UnresolvedSubtree(id.clone()))?;
                if stack.find(id) {
                    return Err(LoadError::InfiniteRecursion(id.clone()));
                }
                let sub_stack = TreeStack {
                    name: id,
                    parent: Some(stack),
                };
                let scope: Symbol = id.as_str().into();
                let child = self.build_recurse(&def.root, scope, &sub_stack)?;
                let mut container = BehaviorNodeContainer::new(
                    Box::new(SubTreeNode::new(scope)),
                    classify_ports(ports),
                    tree_id,
                    id,
                );
                container
                    .add_child(child)
                    .map_err(|e| LoadError::AddChildError(e, id.clone()))?;
                Ok(container)
            }
        }
    }
}

/// Scalar fields that are neither the type tag nor structural metadata are
/// port bindings. Non-string scalars bind as their display form, so
/// `"num_attempts": 3` reads back through `get_input_parse`.
fn port_fields(obj: &Map<String, Value>, ty: &str) -> Vec<(String, String)> {
    obj.iter()
        .filter(|(key, _)| key.as_str() != ty && !STRUCTURAL_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), raw))
        })
        .collect()
}

fn classify_ports(ports: &[(String, String)]) -> PortMap {
    ports
        .iter()
        .map(|(key, raw)| (key.as_str().into(), PortValue::classify(raw)))
        .collect()
}

/// A mechanism to detect subtrees that include themselves: a linked list
/// down the instantiation call stack, traversed back to check whether a
/// tree id is already being expanded. Lazily expanding recursive subtrees
/// would mean keeping the blueprints alive for the tree's whole lifetime,
/// so they are rejected instead.
struct TreeStack<'a, 'src> {
    name: &'src str,
    parent: Option<&'a TreeStack<'a, 'src>>,
}

impl<'a, 'src> TreeStack<'a, 'src> {
    fn find(&self, name: &str) -> bool {
        if self.name == name {
            true
        } else if let Some(parent) = self.parent {
            parent.find(name)
        } else {
            false
        }
    }
}
