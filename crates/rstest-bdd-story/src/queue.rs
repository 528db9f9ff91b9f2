//! FIFO pairing of declared steps with their reported results.
//!
//! Runners declare steps before matching and executing them, so a result
//! callback has no direct handle on the step it belongs to. Steps are queued
//! on declaration; a match peeks at the head and the following result polls
//! it. `poll` therefore always removes the step most recently returned by
//! `peek`.

use std::collections::VecDeque;

use crate::model::StepNode;

/// Steps declared by the runner that still await a result.
#[derive(Debug, Default)]
pub struct PendingSteps {
    steps: VecDeque<StepNode>,
}

impl PendingSteps {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a declared step.
    pub fn push(&mut self, step: StepNode) {
        self.steps.push_back(step);
    }

    /// Inspect the step the next result will belong to.
    #[must_use]
    pub fn peek(&self) -> Option<&StepNode> {
        self.steps.front()
    }

    /// Remove the step the current result belongs to.
    pub fn poll(&mut self) -> Option<StepNode> {
        self.steps.pop_front()
    }

    /// Number of steps awaiting a result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether every declared step has received its result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_then_poll_returns_the_same_step() {
        let mut queue = PendingSteps::new();
        queue.push(StepNode::new("Given ", "first"));
        queue.push(StepNode::new("When ", "second"));

        let peeked = queue.peek().cloned();
        assert_eq!(queue.poll(), peeked);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.poll().map(|step| step.name), Some("second".to_string()));
        assert!(queue.is_empty());
        assert!(queue.poll().is_none());
    }
}
