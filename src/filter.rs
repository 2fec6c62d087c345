use std::collections::BTreeSet;
use tracing::warn;

/// The set of selected job-title facets. Single source of truth for
/// filtering: the grid only ever learns about selection changes through
/// the one registered listener, and FilterState itself never touches the
/// network.
///
/// Selections are validated against the vocabulary published by the facet
/// loader, so a selection can never name a title that was never rendered
/// as selectable.
pub struct FilterState {
    vocabulary: BTreeSet<String>,
    selected: BTreeSet<String>,
    listener: Option<Box<dyn FnMut(&[String])>>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            vocabulary: BTreeSet::new(),
            selected: BTreeSet::new(),
            listener: None,
        }
    }

    /// Register the single listener notified synchronously on every
    /// selection change. Replaces any previous listener.
    pub fn set_listener(&mut self, listener: impl FnMut(&[String]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Install the selectable title universe. Selections pointing at
    /// titles no longer in the vocabulary are dropped; if that changes
    /// the selection, the listener fires.
    pub fn publish_vocabulary(&mut self, titles: impl IntoIterator<Item = String>) {
        self.vocabulary = titles.into_iter().collect();
        let kept: BTreeSet<String> = self
            .selected
            .iter()
            .filter(|t| self.vocabulary.contains(*t))
            .cloned()
            .collect();
        if kept != self.selected {
            self.selected = kept;
            self.notify();
        }
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Add or remove one title. Idempotent: toggling a title "on" that is
    /// already selected (or "off" that is absent) is a no-op and does not
    /// notify. Titles outside the vocabulary are rejected.
    pub fn toggle(&mut self, title: &str, selected: bool) {
        if !self.vocabulary.contains(title) {
            warn!(title, "ignoring toggle for title outside vocabulary");
            return;
        }
        let changed = if selected {
            self.selected.insert(title.to_string())
        } else {
            self.selected.remove(title)
        };
        if changed {
            self.notify();
        }
    }

    /// Atomically replace the full selection, as a multi-select widget
    /// that reports its entire selection on every change would. Unknown
    /// titles are dropped.
    pub fn replace(&mut self, titles: impl IntoIterator<Item = String>) {
        let next: BTreeSet<String> = titles
            .into_iter()
            .filter(|t| {
                let known = self.vocabulary.contains(t);
                if !known {
                    warn!(title = %t, "dropping selection outside vocabulary");
                }
                known
            })
            .collect();
        if next != self.selected {
            self.selected = next;
            self.notify();
        }
    }

    pub fn is_selected(&self, title: &str) -> bool {
        self.selected.contains(title)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// The current selection as a sorted, owned snapshot. This is what a
    /// query carries and what a resolving response is compared against.
    pub fn snapshot(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            let snapshot: Vec<String> = self.selected.iter().cloned().collect();
            listener(&snapshot);
        }
    }
}
