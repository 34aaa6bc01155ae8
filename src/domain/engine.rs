//! Stateful traversal over a validated decision tree.

use tracing::debug;

use crate::domain::entities::{DecisionTree, Node, START_NODE_ID};
use crate::domain::error::{NavigationError, NavigationResult};

/// A single walk through one decision tree.
///
/// The engine owns only the cursor (current id plus breadcrumb history);
/// the tree is borrowed immutably, so any number of independent sessions
/// can read the same tree concurrently. Callers serialize access to a
/// given session.
///
/// History entries are the *texts* of visited nodes, and `go_back` resolves
/// them against the tree by text in document order. Two nodes with equal
/// text therefore resolve to the first of them.
#[derive(Debug, Clone)]
pub struct NavigationEngine<'t> {
    tree: &'t DecisionTree,
    current_id: String,
    history: Vec<String>,
}

impl<'t> NavigationEngine<'t> {
    /// Start a session positioned at `start`.
    pub fn new(tree: &'t DecisionTree) -> Self {
        Self {
            tree,
            current_id: START_NODE_ID.to_string(),
            history: Vec::new(),
        }
    }

    /// Id of the current node.
    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// The current node.
    pub fn current_node(&self) -> &'t Node {
        // The cursor only ever holds `start` or a validated edge target.
        self.tree
            .get(&self.current_id)
            .expect("cursor points at a validated node")
    }

    /// Texts of previously visited nodes, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// On a question node, follow the option labelled `option_label`.
    ///
    /// The first option whose label matches exactly wins.
    pub fn navigate(&mut self, option_label: &str) -> NavigationResult<()> {
        let Node::Question { text, options } = self.current_node() else {
            return Err(NavigationError::InvalidState(format!(
                "navigate called on non-question node '{}'",
                self.current_id
            )));
        };

        for option in options {
            if option.label == option_label {
                debug!("navigate '{}' -> {}", option.label, option.next);
                self.history.push(text.clone());
                self.current_id = option.next.clone();
                return Ok(());
            }
        }

        Err(NavigationError::UnknownOption {
            label: option_label.to_string(),
            node_id: self.current_id.clone(),
        })
    }

    /// On a step node, move to its successor.
    pub fn advance(&mut self) -> NavigationResult<()> {
        let Node::Step { text, next } = self.current_node() else {
            return Err(NavigationError::InvalidState(format!(
                "advance called on non-step node '{}'",
                self.current_id
            )));
        };
        debug!("advance -> {}", next);
        self.history.push(text.clone());
        self.current_id = next.clone();
        Ok(())
    }

    /// True iff the current node is terminal.
    pub fn is_complete(&self) -> bool {
        matches!(self.current_node(), Node::Resolution { .. })
    }

    /// Drop the history and return to `start`.
    pub fn reset(&mut self) {
        self.current_id = START_NODE_ID.to_string();
        self.history.clear();
    }

    /// Return to the previously visited node, if any.
    ///
    /// Pops the last history text and jumps to the first node carrying that
    /// text. A text with no matching node falls back to `start` (and still
    /// reports success); with an immutable tree that branch cannot trigger,
    /// but the contract keeps it.
    pub fn go_back(&mut self) -> bool {
        let Some(target_text) = self.history.last() else {
            return false;
        };

        if let Some(id) = self.tree.find_by_text(target_text) {
            let id = id.to_string();
            self.history.pop();
            self.current_id = id;
            return true;
        }

        self.history.pop();
        self.current_id = START_NODE_ID.to_string();
        true
    }

    /// Total node count, as a rough capacity for step counters.
    pub fn approximate_total_steps(&self) -> usize {
        self.tree.len()
    }

    /// 1-indexed number of the step the session is on.
    pub fn current_step_number(&self) -> usize {
        self.history.len() + 1
    }
}
