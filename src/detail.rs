use crate::models::JobPosting;

/// The detail overlay for a single posting. Starts hidden, shows at most
/// one posting at a time; `show` while visible swaps the content in one
/// step. Dismissal is the caller's event to detect (close key, click
/// outside the content box); `hide` is the single path out.
pub struct DetailPresenter {
    current: Option<JobPosting>,
    scroll: u16,
}

impl Default for DetailPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailPresenter {
    pub fn new() -> Self {
        Self {
            current: None,
            scroll: 0,
        }
    }

    pub fn show(&mut self, posting: JobPosting) {
        self.current = Some(posting);
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.current = None;
        self.scroll = 0;
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn posting(&self) -> Option<&JobPosting> {
        self.current.as_ref()
    }

    /// The six labeled fields, in display order. The apply link is
    /// separate (see `apply_url`).
    pub fn fields(&self) -> Option<[(&'static str, &str); 6]> {
        self.current.as_ref().map(|p| {
            [
                ("Title", p.job_title.as_str()),
                ("Company", p.company_name.as_str()),
                ("Location", p.job_location.as_str()),
                ("Source", p.source.as_str()),
                ("Salary", p.salary_range.as_str()),
                ("Description", p.job_description.as_str()),
            ]
        })
    }

    pub fn apply_url(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.application_url.as_str())
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(3);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(3);
    }
}
