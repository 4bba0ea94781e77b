use serde::Serialize;
use std::collections::BTreeSet;

/// Ids of the gallery items the user has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

/// What the action bar shows. It is visible exactly while something is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionBar {
    pub visible: bool,
    pub count: usize,
}

impl ActionBar {
    pub fn label(&self) -> String {
        format!("{} выбрано", self.count)
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns true when the id ends up selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<i64> {
        &self.ids
    }

    /// Drop ids that are no longer on screen.
    pub fn retain(&mut self, displayed: &BTreeSet<i64>) {
        self.ids.retain(|id| displayed.contains(id));
    }

    pub fn action_bar(&self) -> ActionBar {
        ActionBar {
            visible: !self.ids.is_empty(),
            count: self.ids.len(),
        }
    }
}
