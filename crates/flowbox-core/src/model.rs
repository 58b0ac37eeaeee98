//! The structural model edited by Flowbox.
//!
//! A [`Diagram`] is an ordered forest of [`DiagramNode`]s. Each node has a
//! [`NodeKind`] drawn from a fixed vocabulary, an optional label and an
//! ordered list of children. Child order is meaningful: it is both the
//! rendering order and the execution order of the process the diagram
//! describes.
//!
//! Only container kinds ([`NodeKind::is_container`]) may carry children. The
//! rule is checked by [`Diagram::validate`] when a model enters the editor and
//! is preserved by every structural edit afterwards.
//!
//! Nodes are addressed by *paths*: a slice of child indices starting at the
//! diagram's top-level list. `[]` is the diagram itself, `[2]` the third
//! top-level node, `[2, 0]` its first child, and so on.

use std::{collections::HashSet, fmt};

use serde::Deserialize;
use thiserror::Error;

/// Identifier of a model node.
///
/// Ids are unique within a diagram and assigned in increasing order by an
/// [`IdGenerator`]. The value `0` marks a node that has not been assigned an
/// id yet (for example a node loaded from a file that omitted it).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Marker for a node without an id.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates an id from its raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true unless this is [`NodeId::UNASSIGNED`].
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing node ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: Option<u64>,
}

impl IdGenerator {
    /// Creates a generator whose first id is `1`.
    pub fn new() -> Self {
        Self { next: Some(1) }
    }

    /// Creates a generator whose first id follows `last`.
    pub fn starting_after(last: NodeId) -> Self {
        Self {
            next: last.0.checked_add(1),
        }
    }

    /// Returns a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdsExhausted`] once `u64::MAX` has been handed out.
    pub fn next_id(&mut self) -> Result<NodeId, ModelError> {
        let id = self.next.ok_or(ModelError::IdsExhausted)?;
        self.next = id.checked_add(1);
        Ok(NodeId(id))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed vocabulary of node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Receive,
    Reply,
    Invoke,
    Transform,
    Choose,
    When,
    Otherwise,
    Foreach,
    Sequence,
}

impl NodeKind {
    /// Every node kind, in vocabulary order.
    pub const ALL: [Self; 9] = [
        Self::Receive,
        Self::Reply,
        Self::Invoke,
        Self::Transform,
        Self::Choose,
        Self::When,
        Self::Otherwise,
        Self::Foreach,
        Self::Sequence,
    ];

    /// Returns the lowercase type name used in model files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Reply => "reply",
            Self::Invoke => "invoke",
            Self::Transform => "transform",
            Self::Choose => "choose",
            Self::When => "when",
            Self::Otherwise => "otherwise",
            Self::Foreach => "foreach",
            Self::Sequence => "sequence",
        }
    }

    /// Returns true for kinds that may own children.
    pub fn is_container(self) -> bool {
        match self {
            Self::Receive | Self::Reply | Self::Invoke | Self::Transform => false,
            Self::Choose | Self::When | Self::Otherwise | Self::Foreach | Self::Sequence => true,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when a model violates the structural rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("node {id} of type `{kind}` cannot have children")]
    LeafWithChildren { id: NodeId, kind: NodeKind },

    #[error("node id {0} is used more than once")]
    DuplicateId(NodeId),

    #[error("palette template of type `{0}` cannot have children")]
    TemplateWithChildren(NodeKind),

    #[error("no node ids left to assign")]
    IdsExhausted,
}

/// One node of the structural model.
///
/// # Examples
///
/// ```
/// use flowbox_core::model::{DiagramNode, NodeKind};
///
/// let branch = DiagramNode::new(NodeKind::When)
///     .with_child(DiagramNode::new(NodeKind::Invoke).with_label("Call"));
///
/// assert_eq!(branch.children().len(), 1);
/// assert_eq!(branch.children()[0].label(), Some("Call"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiagramNode {
    #[serde(default)]
    id: NodeId,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    children: Vec<DiagramNode>,
}

impl DiagramNode {
    /// Creates a node without id, label or children.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            kind,
            label: None,
            children: Vec::new(),
        }
    }

    /// Sets the id (builder style).
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Sets the label (builder style).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends a child (builder style).
    pub fn with_child(mut self, child: DiagramNode) -> Self {
        self.children.push(child);
        self
    }

    /// Replaces the children (builder style).
    pub fn with_children(mut self, children: Vec<DiagramNode>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn children(&self) -> &[DiagramNode] {
        &self.children
    }

    /// Mutable access to the ordered child list.
    ///
    /// Callers are responsible for keeping any derived structure (such as a
    /// box tree) in step with edits made through this list.
    pub fn children_mut(&mut self) -> &mut Vec<DiagramNode> {
        &mut self.children
    }

    /// Deep copy of this node where every node receives a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdsExhausted`] if `ids` runs out.
    pub fn clone_with_fresh_ids(&self, ids: &mut IdGenerator) -> Result<Self, ModelError> {
        Ok(Self {
            id: ids.next_id()?,
            kind: self.kind,
            label: self.label.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.clone_with_fresh_ids(ids))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Structural equality by value: kinds, labels and children must match,
    /// ids are ignored.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.label == other.label
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !self.kind.is_container() && !self.children.is_empty() {
            return Err(ModelError::LeafWithChildren {
                id: self.id,
                kind: self.kind,
            });
        }
        self.children.iter().try_for_each(Self::validate)
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a DiagramNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut DiagramNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// The root of the model: an ordered list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    nodes: Vec<DiagramNode>,
}

impl Diagram {
    pub fn new(nodes: Vec<DiagramNode>) -> Self {
        Self { nodes }
    }

    /// Top-level nodes in order.
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    /// Returns the node at `path`, or `None` for the empty path or an
    /// out-of-range index.
    pub fn node_at(&self, path: &[usize]) -> Option<&DiagramNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.nodes.get(*first)?, |node, &index| {
                node.children.get(index)
            })
    }

    /// Mutable variant of [`Diagram::node_at`].
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut DiagramNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get_mut(*first)?;
        for &index in rest {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Returns the child list owned by the element at `path`: the top-level
    /// list for the empty path, a node's children otherwise.
    pub fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<DiagramNode>> {
        if path.is_empty() {
            Some(&mut self.nodes)
        } else {
            self.node_at_mut(path).map(DiagramNode::children_mut)
        }
    }

    /// Checks that only container kinds have children.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LeafWithChildren`] for the first offending node.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.nodes.iter().try_for_each(DiagramNode::validate)
    }

    /// Gives every unassigned node a fresh id and returns the generator to use
    /// for nodes created later.
    ///
    /// The generator is seeded past the largest id already present so new
    /// ids keep increasing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if two nodes share an assigned id
    /// and [`ModelError::IdsExhausted`] if the unassigned nodes do not fit
    /// above the largest id.
    pub fn assign_ids(&mut self) -> Result<IdGenerator, ModelError> {
        let mut seen = HashSet::new();
        let mut duplicate = None;
        let mut last = NodeId::UNASSIGNED;
        for node in &self.nodes {
            node.visit(&mut |node| {
                if node.id.is_assigned() {
                    if !seen.insert(node.id) && duplicate.is_none() {
                        duplicate = Some(node.id);
                    }
                    last = last.max(node.id);
                }
            });
        }
        if let Some(id) = duplicate {
            return Err(ModelError::DuplicateId(id));
        }

        let mut ids = IdGenerator::starting_after(last);
        let mut exhausted = None;
        for node in &mut self.nodes {
            node.visit_mut(&mut |node| {
                if !node.id.is_assigned() && exhausted.is_none() {
                    match ids.next_id() {
                        Ok(id) => node.id = id,
                        Err(err) => exhausted = Some(err),
                    }
                }
            });
        }
        match exhausted {
            Some(err) => Err(err),
            None => Ok(ids),
        }
    }

    /// Structural equality by value, ignoring ids.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.same_shape(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choose_with_two_branches() -> Diagram {
        Diagram::new(vec![
            DiagramNode::new(NodeKind::Receive).with_label("Order"),
            DiagramNode::new(NodeKind::Choose)
                .with_child(
                    DiagramNode::new(NodeKind::When)
                        .with_child(DiagramNode::new(NodeKind::Invoke).with_label("Ship")),
                )
                .with_child(
                    DiagramNode::new(NodeKind::Otherwise)
                        .with_child(DiagramNode::new(NodeKind::Reply).with_label("Refuse")),
                ),
        ])
    }

    #[test]
    fn test_container_kinds() {
        let containers: Vec<_> = NodeKind::ALL
            .into_iter()
            .filter(|kind| kind.is_container())
            .collect();
        assert_eq!(
            containers,
            vec![
                NodeKind::Choose,
                NodeKind::When,
                NodeKind::Otherwise,
                NodeKind::Foreach,
                NodeKind::Sequence
            ]
        );
    }

    #[test]
    fn test_node_at_paths() {
        let diagram = choose_with_two_branches();
        assert!(diagram.node_at(&[]).is_none());
        assert_eq!(diagram.node_at(&[0]).unwrap().label(), Some("Order"));
        assert_eq!(diagram.node_at(&[1, 1]).unwrap().kind(), NodeKind::Otherwise);
        assert_eq!(diagram.node_at(&[1, 0, 0]).unwrap().label(), Some("Ship"));
        assert!(diagram.node_at(&[1, 2]).is_none());
        assert!(diagram.node_at(&[5]).is_none());
    }

    #[test]
    fn test_children_at_mut_empty_path_is_top_level() {
        let mut diagram = choose_with_two_branches();
        let top = diagram.children_at_mut(&[]).unwrap();
        assert_eq!(top.len(), 2);
        let branches = diagram.children_at_mut(&[1]).unwrap();
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_validate_rejects_leaf_with_children() {
        let diagram = Diagram::new(vec![
            DiagramNode::new(NodeKind::Invoke)
                .with_id(NodeId::new(7))
                .with_child(DiagramNode::new(NodeKind::Reply)),
        ]);
        assert_eq!(
            diagram.validate(),
            Err(ModelError::LeafWithChildren {
                id: NodeId::new(7),
                kind: NodeKind::Invoke
            })
        );
    }

    #[test]
    fn test_validate_accepts_well_formed_model() {
        assert!(choose_with_two_branches().validate().is_ok());
    }

    #[test]
    fn test_assign_ids_fills_unassigned_and_seeds_past_max() {
        let mut diagram = Diagram::new(vec![
            DiagramNode::new(NodeKind::Receive).with_id(NodeId::new(10)),
            DiagramNode::new(NodeKind::Sequence).with_child(DiagramNode::new(NodeKind::Reply)),
        ]);

        let mut ids = diagram.assign_ids().unwrap();

        assert_eq!(diagram.nodes()[0].id(), NodeId::new(10));
        assert_eq!(diagram.nodes()[1].id(), NodeId::new(11));
        assert_eq!(diagram.nodes()[1].children()[0].id(), NodeId::new(12));
        assert_eq!(ids.next_id(), Ok(NodeId::new(13)));
    }

    #[test]
    fn test_assign_ids_rejects_duplicates() {
        let mut diagram = Diagram::new(vec![
            DiagramNode::new(NodeKind::Receive).with_id(NodeId::new(3)),
            DiagramNode::new(NodeKind::Reply).with_id(NodeId::new(3)),
        ]);
        assert_eq!(
            diagram.assign_ids().unwrap_err(),
            ModelError::DuplicateId(NodeId::new(3))
        );
    }

    #[test]
    fn test_max_id_is_kept_but_leaves_no_fresh_ids() {
        let mut diagram = Diagram::new(vec![
            DiagramNode::new(NodeKind::Receive).with_id(NodeId::new(u64::MAX)),
        ]);

        let mut ids = diagram.assign_ids().unwrap();

        assert_eq!(ids.next_id(), Err(ModelError::IdsExhausted));
    }

    #[test]
    fn test_assign_ids_reports_exhaustion() {
        let mut diagram = Diagram::new(vec![
            DiagramNode::new(NodeKind::Receive).with_id(NodeId::new(u64::MAX - 1)),
            DiagramNode::new(NodeKind::Reply),
            DiagramNode::new(NodeKind::Invoke),
        ]);

        assert_eq!(diagram.assign_ids().unwrap_err(), ModelError::IdsExhausted);
    }

    #[test]
    fn test_clone_with_fresh_ids_is_deep() {
        let template = DiagramNode::new(NodeKind::Foreach)
            .with_label("Foreach")
            .with_child(DiagramNode::new(NodeKind::Sequence));
        let mut ids = IdGenerator::starting_after(NodeId::new(20));

        let clone = template.clone_with_fresh_ids(&mut ids).unwrap();

        assert_eq!(clone.id(), NodeId::new(21));
        assert_eq!(clone.children()[0].id(), NodeId::new(22));
        assert!(clone.same_shape(&template));
    }

    #[test]
    fn test_same_shape_ignores_ids_but_not_labels() {
        let a = DiagramNode::new(NodeKind::Invoke)
            .with_id(NodeId::new(1))
            .with_label("x");
        let b = DiagramNode::new(NodeKind::Invoke)
            .with_id(NodeId::new(2))
            .with_label("x");
        let c = DiagramNode::new(NodeKind::Invoke).with_label("y");
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_subtree_len() {
        let diagram = choose_with_two_branches();
        assert_eq!(diagram.nodes()[1].subtree_len(), 5);
    }
}
