/// The facet sidebar: one selectable entry per known job title, plus a
/// load/error status. The vocabulary is fetched once per session; a
/// repeated load rebuilds the list wholesale so titles are never rendered
/// twice. A failed load reports its error and leaves whatever was already
/// rendered untouched.
pub struct FacetPanel {
    titles: Vec<String>,
    cursor: usize,
    loaded: bool,
    error: Option<String>,
}

impl Default for FacetPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FacetPanel {
    pub fn new() -> Self {
        Self {
            titles: Vec::new(),
            cursor: 0,
            loaded: false,
            error: None,
        }
    }

    /// Install the fetched vocabulary, replacing any prior list. Sorted
    /// and deduplicated; an empty vocabulary is a valid empty state, not
    /// an error.
    pub fn apply_vocabulary(&mut self, titles: impl IntoIterator<Item = String>) {
        let mut titles: Vec<String> = titles.into_iter().collect();
        titles.sort();
        titles.dedup();
        self.titles = titles;
        self.cursor = self.cursor.min(self.titles.len().saturating_sub(1));
        self.loaded = true;
        self.error = None;
    }

    /// Record a load failure. Previously rendered facets stay intact.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.titles.get(self.cursor).map(String::as_str)
    }

    pub fn cursor_down(&mut self) {
        if !self.titles.is_empty() && self.cursor < self.titles.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}
