//! Override Window Store

use dashmap::DashMap;

use crate::logic::feedback::{OverrideKey, OverrideWindow};

pub trait OverrideStore: Send + Sync {
    /// Install a window, replacing any window on the same key.
    /// Returns the replaced window.
    fn install(&self, window: OverrideWindow) -> Option<OverrideWindow>;

    /// Take one slot from the window on `key`. Returns the window as it
    /// stands after the decrement; a window reaching 0 is removed.
    fn consume(&self, key: &OverrideKey) -> Option<OverrideWindow>;

    fn get(&self, key: &OverrideKey) -> Option<OverrideWindow>;

    fn active(&self) -> Vec<OverrideWindow>;
}

#[derive(Debug, Default)]
pub struct InMemoryOverrideStore {
    windows: DashMap<OverrideKey, OverrideWindow>,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for InMemoryOverrideStore {
    fn install(&self, window: OverrideWindow) -> Option<OverrideWindow> {
        self.windows.insert(window.key.clone(), window)
    }

    fn consume(&self, key: &OverrideKey) -> Option<OverrideWindow> {
        let consumed = {
            let mut window = self.windows.get_mut(key)?;
            if window.remaining == 0 {
                None
            } else {
                window.remaining -= 1;
                Some(window.clone())
            }
        };

        self.windows.remove_if(key, |_, w| w.remaining == 0);
        consumed
    }

    fn get(&self, key: &OverrideKey) -> Option<OverrideWindow> {
        self.windows.get(key).map(|w| w.clone())
    }

    fn active(&self) -> Vec<OverrideWindow> {
        let mut all: Vec<OverrideWindow> = self.windows.iter().map(|w| w.clone()).collect();
        all.sort_by(|a, b| a.installed_at.cmp(&b.installed_at));
        all
    }
}
