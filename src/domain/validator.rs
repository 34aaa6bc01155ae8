//! Structural validation of raw tree documents.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::domain::entities::{
    Choice, DecisionTree, Node, RawNode, RawTreeDocument, START_NODE_ID,
};
use crate::domain::error::{ValidationError, ValidationResult};

/// Validates raw tree documents into strongly typed decision trees.
///
/// Pure function over its input; the only way to obtain a [`DecisionTree`].
/// Checks run in a fixed order and stop at the first violation.
pub struct GraphValidator;

impl GraphValidator {
    /// Validate `raw` and build the typed tree.
    pub fn validate(raw: &RawTreeDocument) -> ValidationResult<DecisionTree> {
        let title = raw.title.as_ref().ok_or(ValidationError::MissingTitle)?;
        let nodes = raw.nodes.as_ref().ok_or(ValidationError::MissingNodes)?;
        if nodes.is_empty() {
            return Err(ValidationError::EmptyNodes);
        }

        // First pass: required keys, and the known-id set for reference
        // checks. Forward references are legal.
        let mut known_ids: HashSet<&str> = HashSet::new();
        for node in nodes {
            let id = require_key(node, "id", &node.id)?;
            require_key(node, "type", &node.node_type)?;
            require_key(node, "text", &node.text)?;
            known_ids.insert(id);
        }

        // Second pass: per-type shape and reference checks.
        for node in nodes {
            Self::check_node(node, &known_ids)?;
        }

        if !known_ids.contains(START_NODE_ID) {
            return Err(ValidationError::MissingStart);
        }

        let mut tree =
            DecisionTree::new(title.clone(), raw.description.clone().unwrap_or_default());
        for node in nodes {
            let (id, typed) = Self::build_node(node);
            tree.insert(id, typed);
        }

        let unreachable = Self::unreachable_ids(&tree);
        if !unreachable.is_empty() {
            return Err(ValidationError::UnreachableNodes { ids: unreachable });
        }

        debug!("validated tree '{}' with {} nodes", tree.title, tree.len());
        Ok(tree)
    }

    fn check_node(node: &RawNode, known_ids: &HashSet<&str>) -> ValidationResult<()> {
        // Presence was established by the first pass.
        let node_id = node.id.as_deref().unwrap_or_default();
        let node_type = node.node_type.as_deref().unwrap_or_default();

        match node_type {
            "question" => {
                let options = match &node.options {
                    Some(options) if options.len() >= 2 => options,
                    _ => {
                        return Err(ValidationError::TooFewOptions {
                            node_id: node_id.to_string(),
                        })
                    }
                };
                for option in options {
                    let (Some(label), Some(target)) = (&option.label, &option.next) else {
                        return Err(ValidationError::IncompleteOption {
                            node_id: node_id.to_string(),
                        });
                    };
                    if !known_ids.contains(target.as_str()) {
                        return Err(ValidationError::DanglingOption {
                            node_id: node_id.to_string(),
                            label: label.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
            "step" => {
                let target = match node.next.as_deref() {
                    Some(next) if !next.is_empty() => next,
                    _ => {
                        return Err(ValidationError::MissingNext {
                            node_id: node_id.to_string(),
                        })
                    }
                };
                if !known_ids.contains(target) {
                    return Err(ValidationError::DanglingNext {
                        node_id: node_id.to_string(),
                        target: target.to_string(),
                    });
                }
            }
            "resolution" => {
                // Empty-string `next` and empty `options` lists are tolerated,
                // mirroring the wire format's loose producers.
                let has_next = node.next.as_deref().is_some_and(|n| !n.is_empty());
                let has_options = node.options.as_ref().is_some_and(|o| !o.is_empty());
                if has_next || has_options {
                    return Err(ValidationError::TerminalWithEdges {
                        node_id: node_id.to_string(),
                    });
                }
            }
            other => {
                return Err(ValidationError::UnknownNodeType {
                    node_id: node_id.to_string(),
                    node_type: other.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Build the typed node. Only called after `check_node` passed.
    fn build_node(node: &RawNode) -> (String, Node) {
        let id = node.id.clone().unwrap_or_default();
        let text = node.text.clone().unwrap_or_default();
        let typed = match node.node_type.as_deref() {
            Some("question") => Node::Question {
                text,
                options: node
                    .options
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|o| Choice {
                        label: o.label.clone().unwrap_or_default(),
                        next: o.next.clone().unwrap_or_default(),
                    })
                    .collect(),
            },
            Some("step") => Node::Step {
                text,
                next: node.next.clone().unwrap_or_default(),
            },
            _ => Node::Resolution { text },
        };
        (id, typed)
    }

    /// Node ids not reachable from `start`, sorted lexicographically.
    fn unreachable_ids(tree: &DecisionTree) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        visited.insert(START_NODE_ID);
        queue.push_back(START_NODE_ID);

        while let Some(current) = queue.pop_front() {
            if let Some(node) = tree.get(current) {
                for successor in node.successors() {
                    if visited.insert(successor) {
                        queue.push_back(successor);
                    }
                }
            }
        }

        let mut unreachable: Vec<String> = tree
            .iter()
            .filter(|(id, _)| !visited.contains(id))
            .map(|(id, _)| id.to_string())
            .collect();
        unreachable.sort();
        unreachable
    }
}

fn require_key<'a>(
    node: &RawNode,
    key: &'static str,
    value: &'a Option<String>,
) -> ValidationResult<&'a str> {
    value.as_deref().ok_or_else(|| ValidationError::MissingNodeKey {
        key,
        node: format!("{node:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RawChoice;

    fn raw_node(id: &str, node_type: &str, text: &str) -> RawNode {
        RawNode {
            id: Some(id.to_string()),
            node_type: Some(node_type.to_string()),
            text: Some(text.to_string()),
            options: None,
            next: None,
        }
    }

    fn choice(label: &str, next: &str) -> RawChoice {
        RawChoice {
            label: Some(label.to_string()),
            next: Some(next.to_string()),
        }
    }

    fn document(nodes: Vec<RawNode>) -> RawTreeDocument {
        RawTreeDocument {
            title: Some("Printer offline".to_string()),
            description: Some("Bring the printer back".to_string()),
            nodes: Some(nodes),
        }
    }

    #[test]
    fn given_minimal_valid_tree_when_validating_then_builds_typed_nodes() {
        let mut question = raw_node("start", "question", "Is it plugged in?");
        question.options = Some(vec![choice("Yes", "fixed"), choice("No", "plug")]);
        let mut step = raw_node("plug", "step", "Plug it in");
        step.next = Some("fixed".to_string());
        let resolution = raw_node("fixed", "resolution", "All good");

        let tree = GraphValidator::validate(&document(vec![question, step, resolution])).unwrap();

        assert_eq!(tree.len(), 3);
        assert!(matches!(tree.get("start"), Some(Node::Question { .. })));
        assert!(matches!(tree.get("plug"), Some(Node::Step { .. })));
        assert!(matches!(tree.get("fixed"), Some(Node::Resolution { .. })));
    }

    #[test]
    fn given_missing_title_when_validating_then_title_error_comes_first() {
        // Document is broken in several ways; only the first check fires.
        let doc = RawTreeDocument {
            title: None,
            description: None,
            nodes: Some(vec![]),
        };

        assert_eq!(
            GraphValidator::validate(&doc).unwrap_err(),
            ValidationError::MissingTitle
        );
    }

    #[test]
    fn given_forward_reference_when_validating_then_it_resolves() {
        let mut step = raw_node("start", "step", "Do the thing");
        step.next = Some("later".to_string());
        let resolution = raw_node("later", "resolution", "Done");

        assert!(GraphValidator::validate(&document(vec![step, resolution])).is_ok());
    }

    #[test]
    fn given_resolution_with_empty_next_when_validating_then_passes() {
        let mut question = raw_node("start", "question", "Q?");
        question.options = Some(vec![choice("a", "end"), choice("b", "end")]);
        let mut resolution = raw_node("end", "resolution", "Done");
        resolution.next = Some(String::new());
        resolution.options = Some(vec![]);

        assert!(GraphValidator::validate(&document(vec![question, resolution])).is_ok());
    }

    #[test]
    fn given_unreachable_island_when_validating_then_ids_are_sorted() {
        let mut step = raw_node("start", "step", "Go");
        step.next = Some("end".to_string());
        let end = raw_node("end", "resolution", "Done");
        let mut zeta = raw_node("zeta", "step", "Lost");
        zeta.next = Some("alpha".to_string());
        let mut alpha = raw_node("alpha", "step", "Also lost");
        alpha.next = Some("zeta".to_string());

        let err = GraphValidator::validate(&document(vec![step, end, zeta, alpha])).unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnreachableNodes {
                ids: vec!["alpha".to_string(), "zeta".to_string()],
            }
        );
    }
}
