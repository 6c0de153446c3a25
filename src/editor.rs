//! Single-threaded action dispatcher
//!
//! The editor owns the model state. Each dispatched action is applied, the
//! relationship orchestrator reacts to the old and new snapshots, and its
//! follow-up actions are applied before the new state is published. Nothing
//! is published if any step fails.

use log::debug;

use crate::layout::{LayoutConfig, RelationshipSync};
use crate::model::{Action, ModelError, ModelState};

/// An action that was applied to the model
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub action: Action,
    /// User actions are undoable; follow-ups produced by the orchestrator are not
    pub undoable: bool,
}

/// Model state plus the journal of every committed action
#[derive(Debug, Clone)]
pub struct Editor {
    state: ModelState,
    config: LayoutConfig,
    journal: Vec<Commit>,
}

impl Editor {
    pub fn new(state: ModelState, config: LayoutConfig) -> Self {
        Self {
            state,
            config,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn journal(&self) -> &[Commit] {
        &self.journal
    }

    pub fn into_state(self) -> ModelState {
        self.state
    }

    /// Apply a user action and its follow-ups; returns the commits it produced
    pub fn dispatch(&mut self, action: Action) -> Result<&[Commit], ModelError> {
        let action = self.normalize(action);
        let mut next = self.state.clone();
        next.apply(&action, &self.config)?;

        let follow_ups = RelationshipSync::new(&self.config).react(&self.state, &next, &action);
        for follow_up in &follow_ups {
            next.apply(follow_up, &self.config)?;
        }
        debug!(action = action.tag(), follow_ups = follow_ups.len(); "dispatched");

        let start = self.journal.len();
        self.state = next;
        self.journal.push(Commit {
            action,
            undoable: true,
        });
        self.journal.extend(follow_ups.into_iter().map(|action| Commit {
            action,
            undoable: false,
        }));
        Ok(&self.journal[start..])
    }

    /// Recompute every relationship; returns the number of commits
    pub fn relayout(&mut self) -> usize {
        let actions = RelationshipSync::new(&self.config).recalc_all(&self.state);
        let count = actions.len();
        for action in actions {
            // Layout and update commits only touch existing elements
            if self.state.apply(&action, &self.config).is_ok() {
                self.journal.push(Commit {
                    action,
                    undoable: false,
                });
            }
        }
        debug!(count; "relayout complete");
        count
    }

    /// Deletes always cover the whole subtree of each deleted element
    fn normalize(&self, action: Action) -> Action {
        match action {
            Action::Delete { ids } => Action::Delete {
                ids: self.state.expand_with_descendants(&ids),
            },
            other => other,
        }
    }
}
