//! Row selection state, keyed by identity.

use std::collections::HashSet;

/// Selection mode for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection allowed.
    #[default]
    None,
    /// Single row selection (radio style); selecting clears the previous.
    Single,
    /// Multiple rows can be selected (checkbox style).
    Multi,
}

/// Tracks selected rows by identity.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    selected: HashSet<String>,
}

impl Selection {
    /// Create a selection with the given mode.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
        }
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Set a row's selected state. Returns `true` if the set changed.
    pub fn set(&mut self, id: &str, selected: bool) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                if selected {
                    self.select_only(id)
                } else {
                    self.selected.remove(id)
                }
            }
            SelectionMode::Multi => {
                if selected {
                    self.selected.insert(id.to_string())
                } else {
                    self.selected.remove(id)
                }
            }
        }
    }

    /// Make `id` the only selected row. Returns `true` if the set changed.
    pub fn select_only(&mut self, id: &str) -> bool {
        let already_sole = self.selected.len() == 1 && self.selected.contains(id);
        if already_sole {
            return false;
        }
        self.selected.clear();
        self.selected.insert(id.to_string());
        true
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
