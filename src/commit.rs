//! The narrow interface through which finished edits leave the engine.

use std::cell::RefCell;
use std::rc::Rc;

/// Action names handed to the undo consumer.
pub mod actions {
    pub const DRAW: &str = "Draw";
    pub const ERASE: &str = "Erase";
    pub const AIRBRUSH: &str = "Airbrush";
    pub const CURVE: &str = "Curve";
    pub const POLYGON: &str = "Polygon";
    pub const FILL: &str = "Fill";
    pub const MOVE_SELECTION: &str = "Move Selection";
    pub const DELETE_SELECTION: &str = "Delete Selection";
    pub const CUT: &str = "Cut";
    pub const PASTE: &str = "Paste";
    pub const TEXT: &str = "Text";
    pub const CLEAR_CANVAS: &str = "Clear Canvas";
    pub const RESIZE_CANVAS: &str = "Resize Canvas";
}

/// A full canvas snapshot plus the name of the action that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `None` for changes that should not become an undo step.
    pub action: Option<String>,
}

/// Receives every commit, synchronously, right after the canvas changed.
pub trait CommitSink {
    fn commit(&mut self, commit: Commit);
}

impl<F: FnMut(Commit)> CommitSink for F {
    fn commit(&mut self, commit: Commit) {
        self(commit)
    }
}

/// Records commits in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct CommitLog {
    commits: Rc<RefCell<Vec<Commit>>>,
}

impl CommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commits.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.borrow().is_empty()
    }

    pub fn last(&self) -> Option<Commit> {
        self.commits.borrow().last().cloned()
    }

    /// Action names in commit order (`None` entries are skipped).
    pub fn actions(&self) -> Vec<String> {
        self.commits.borrow().iter().filter_map(|c| c.action.clone()).collect()
    }

    pub fn clear(&self) {
        self.commits.borrow_mut().clear();
    }
}

impl CommitSink for CommitLog {
    fn commit(&mut self, commit: Commit) {
        log::debug!("Commit recorded: {:?}", commit.action);
        self.commits.borrow_mut().push(commit);
    }
}

/// Discards everything; for hosts that keep no history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CommitSink for NullSink {
    fn commit(&mut self, _commit: Commit) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(action: Option<&str>) -> Commit {
        Commit {
            pixels: vec![255; 4],
            width: 1,
            height: 1,
            action: action.map(str::to_owned),
        }
    }

    #[test]
    fn log_clones_share_records() {
        let log = CommitLog::new();
        let mut sink = log.clone();
        sink.commit(commit(Some(actions::FILL)));
        sink.commit(commit(None));
        assert_eq!(log.len(), 2);
        assert_eq!(log.actions(), vec!["Fill".to_owned()]);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |c: Commit| seen.push(c.action);
            sink.commit(commit(Some(actions::DRAW)));
        }
        assert_eq!(seen, vec![Some("Draw".to_owned())]);
    }
}
