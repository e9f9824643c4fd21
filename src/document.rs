use crate::commit::{Commit, CommitSink};
use crate::raster::{self, RasterBuffer};

/// A retained canvas state and the action that led away from it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    action: String,
}

/// Reference document model: owns the committed pixels and their undo history.
///
/// The engine never reads this directly; hosts hand it to
/// [`EditorContext::sync_document`](crate::EditorContext::sync_document)
/// after an undo or redo so the canvas follows.
#[derive(Debug, Clone)]
pub struct Document {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    version: u64,
    /// Stack of states that can be restored by undo
    undo_stack: Vec<HistoryEntry>,
    /// Stack of states that can be restored by redo
    redo_stack: Vec<HistoryEntry>,
}

impl Document {
    /// Blank white document.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_raster(&RasterBuffer::new(width, height))
    }

    /// Loads raw RGBA or any decodable image; falls back to white.
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Self {
        Self::from_raster(&RasterBuffer::from_bytes(bytes, width, height))
    }

    fn from_raster(raster: &RasterBuffer) -> Self {
        Self {
            pixels: raster.snapshot(),
            width: raster.width(),
            height: raster.height(),
            version: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bumped whenever the pixels change, including undo and redo.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn content_hash(&self) -> u64 {
        raster::content_hash(&self.pixels, self.width, self.height)
    }

    /// Takes a commit from the engine. A snapshot identical to the current
    /// pixels is ignored; otherwise the old state becomes an undo step
    /// (unless the commit carries no action name).
    pub fn apply_commit(&mut self, commit: Commit) -> bool {
        if commit.width == self.width && commit.height == self.height && commit.pixels == self.pixels {
            log::debug!("Commit {:?} leaves the document unchanged", commit.action);
            return false;
        }
        let previous = HistoryEntry {
            pixels: std::mem::replace(&mut self.pixels, commit.pixels),
            width: self.width,
            height: self.height,
            action: commit.action.clone().unwrap_or_default(),
        };
        self.width = commit.width;
        self.height = commit.height;
        self.version += 1;
        if commit.action.is_some() {
            self.undo_stack.push(previous);
            self.redo_stack.clear();
        }
        log::info!("Document v{} after {:?}", self.version, commit.action);
        true
    }

    /// Undo the last recorded action
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        let redo = self.swap_in(entry);
        log::info!("Undo {}", redo.action);
        self.redo_stack.push(redo);
        true
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        let undo = self.swap_in(entry);
        log::info!("Redo {}", undo.action);
        self.undo_stack.push(undo);
        true
    }

    /// Replaces the current pixels with `entry`'s, returning the current
    /// state labelled with the same action.
    fn swap_in(&mut self, entry: HistoryEntry) -> HistoryEntry {
        let current = HistoryEntry {
            pixels: std::mem::replace(&mut self.pixels, entry.pixels),
            width: std::mem::replace(&mut self.width, entry.width),
            height: std::mem::replace(&mut self.height, entry.height),
            action: entry.action,
        };
        self.version += 1;
        current
    }

    /// Returns true if there are actions that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are actions that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_action(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.action.as_str())
    }

    pub fn redo_action(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.action.as_str())
    }

    /// Clear the history
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl CommitSink for Document {
    fn commit(&mut self, commit: Commit) {
        self.apply_commit(commit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(doc: &Document, byte: u8, action: Option<&str>) -> Commit {
        let mut pixels = doc.pixels().to_vec();
        pixels[0] = byte;
        Commit {
            pixels,
            width: doc.width(),
            height: doc.height(),
            action: action.map(str::to_owned),
        }
    }

    #[test]
    fn identical_snapshot_is_not_recorded() {
        let mut doc = Document::new(50, 50);
        let same = commit(&doc, 255, Some("Draw"));
        assert!(!doc.apply_commit(same));
        assert!(!doc.can_undo());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn undo_and_redo_swap_snapshots() {
        let mut doc = Document::new(50, 50);
        let original = doc.pixels().to_vec();
        let c = commit(&doc, 7, Some("Fill"));
        assert!(doc.apply_commit(c));
        assert_eq!(doc.undo_action(), Some("Fill"));

        assert!(doc.undo());
        assert_eq!(doc.pixels(), &original[..]);
        assert_eq!(doc.redo_action(), Some("Fill"));

        assert!(doc.redo());
        assert_eq!(doc.pixels()[0], 7);
        assert_eq!(doc.version(), 3);
        assert!(!doc.redo());
    }

    #[test]
    fn new_commit_clears_redo() {
        let mut doc = Document::new(50, 50);
        let c = commit(&doc, 1, Some("Draw"));
        doc.apply_commit(c);
        doc.undo();
        let c = commit(&doc, 2, Some("Draw"));
        doc.apply_commit(c);
        assert!(!doc.can_redo());
    }

    #[test]
    fn unnamed_commit_updates_without_history() {
        let mut doc = Document::new(50, 50);
        let c = commit(&doc, 9, None);
        assert!(doc.apply_commit(c));
        assert!(!doc.can_undo());
        assert_eq!(doc.pixels()[0], 9);
    }
}
