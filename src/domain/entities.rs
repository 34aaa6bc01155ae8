//! Domain entities: core data structures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Id of the entry node every tree must contain.
pub const START_NODE_ID: &str = "start";

/// A selectable answer on a question node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the user
    pub label: String,
    /// Id of the node this choice leads to
    pub next: String,
}

/// A validated node in a decision tree.
///
/// The tag dispatch happens exactly once, in the validator; downstream code
/// matches on the variant instead of a string type field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Branch point with at least two choices
    Question { text: String, options: Vec<Choice> },
    /// Instruction with a single successor
    Step { text: String, next: String },
    /// Terminal node, no outgoing edges
    Resolution { text: String },
}

impl Node {
    /// The text shown for this node.
    pub fn text(&self) -> &str {
        match self {
            Node::Question { text, .. } | Node::Step { text, .. } | Node::Resolution { text } => {
                text
            }
        }
    }

    /// The wire-format type tag (`question`, `step`, `resolution`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Question { .. } => "question",
            Node::Step { .. } => "step",
            Node::Resolution { .. } => "resolution",
        }
    }

    /// Ids of the nodes this node links to, in option order.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            Node::Question { options, .. } => options.iter().map(|c| c.next.as_str()).collect(),
            Node::Step { next, .. } => vec![next.as_str()],
            Node::Resolution { .. } => Vec::new(),
        }
    }
}

/// A validated decision tree.
///
/// Nodes keep their document order (text-keyed lookup walks them in that
/// order) while an id index gives O(1) lookup. Immutable once built; the
/// validator is the only constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    pub title: String,
    pub description: String,
    entries: Vec<(String, Node)>,
    index: HashMap<String, usize>,
}

impl DecisionTree {
    pub(crate) fn new(title: String, description: String) -> Self {
        Self {
            title,
            description,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a node. A duplicate id keeps its first position and the later
    /// value wins, matching dict semantics of the wire format.
    pub(crate) fn insert(&mut self, id: String, node: Node) {
        if let Some(&pos) = self.index.get(&id) {
            self.entries[pos].1 = node;
        } else {
            self.index.insert(id.clone(), self.entries.len());
            self.entries.push((id, node));
        }
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, node)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Id of the first node (in document order) whose text equals `text`.
    pub fn find_by_text(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, node)| node.text() == text)
            .map(|(id, _)| id.as_str())
    }

    /// Convert back into the wire format for persistence.
    pub fn to_raw(&self) -> RawTreeDocument {
        let nodes = self
            .entries
            .iter()
            .map(|(id, node)| {
                let mut raw = RawNode {
                    id: Some(id.clone()),
                    node_type: Some(node.type_name().to_string()),
                    text: Some(node.text().to_string()),
                    options: None,
                    next: None,
                };
                match node {
                    Node::Question { options, .. } => {
                        raw.options = Some(
                            options
                                .iter()
                                .map(|c| RawChoice {
                                    label: Some(c.label.clone()),
                                    next: Some(c.next.clone()),
                                })
                                .collect(),
                        );
                    }
                    Node::Step { next, .. } => raw.next = Some(next.clone()),
                    Node::Resolution { .. } => {}
                }
                raw
            })
            .collect();

        RawTreeDocument {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            nodes: Some(nodes),
        }
    }
}

/// Untyped tree document as produced by the external analyzer.
///
/// Every field is optional so that missing keys surface as validation
/// errors in the documented check order rather than as decode errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTreeDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<RawNode>>,
}

/// One node of a raw tree document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<RawChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// One option of a raw question node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChoice {
    pub label: Option<String>,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DecisionTree {
        let mut tree = DecisionTree::new("t".into(), "d".into());
        tree.insert(
            "start".into(),
            Node::Step {
                text: "first".into(),
                next: "end".into(),
            },
        );
        tree.insert(
            "end".into(),
            Node::Resolution {
                text: "done".into(),
            },
        );
        tree
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_keeps_position_and_replaces_value() {
        let mut tree = sample_tree();
        tree.insert(
            "start".into(),
            Node::Resolution {
                text: "replaced".into(),
            },
        );

        assert_eq!(tree.len(), 2);
        let first = tree.iter().next().unwrap();
        assert_eq!(first.0, "start");
        assert_eq!(first.1.text(), "replaced");
    }

    #[test]
    fn given_two_nodes_with_same_text_when_finding_by_text_then_first_wins() {
        let mut tree = DecisionTree::new("t".into(), String::new());
        tree.insert(
            "start".into(),
            Node::Step {
                text: "same".into(),
                next: "a".into(),
            },
        );
        tree.insert(
            "a".into(),
            Node::Resolution {
                text: "same".into(),
            },
        );

        assert_eq!(tree.find_by_text("same"), Some("start"));
    }

    #[test]
    fn given_tree_when_converted_to_raw_then_shape_matches_wire_format() {
        let raw = sample_tree().to_raw();

        let nodes = raw.nodes.unwrap();
        assert_eq!(nodes[0].node_type.as_deref(), Some("step"));
        assert_eq!(nodes[0].next.as_deref(), Some("end"));
        assert!(nodes[0].options.is_none());
        assert_eq!(nodes[1].node_type.as_deref(), Some("resolution"));
        assert!(nodes[1].next.is_none());
    }
}
