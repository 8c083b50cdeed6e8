//! Multi-select over asset cards.

use std::collections::BTreeSet;

use assethub_core::types::AssetId;

/// Selection mode plus the set of selected asset ids.
///
/// Ids can only be toggled while the mode is active, and leaving the mode
/// empties the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: bool,
    ids: BTreeSet<AssetId>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter(&mut self) {
        self.active = true;
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.ids.clear();
    }

    pub fn toggle_mode(&mut self) {
        if self.active {
            self.exit();
        } else {
            self.enter();
        }
    }

    /// Flip one asset in or out of the set. Returns whether anything changed.
    pub fn toggle(&mut self, id: AssetId) -> bool {
        if !self.active {
            return false;
        }
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
        true
    }

    /// Replace the set with exactly the given ids.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = AssetId>) {
        if self.active {
            self.ids = ids.into_iter().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain(&mut self, keep: impl Fn(&AssetId) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<AssetId> {
        self.ids.iter().copied().collect()
    }
}
