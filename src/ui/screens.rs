use crate::models::BookEntry;
use crate::store::Library;

/// The three top-level tabs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Library,
    Search,
    Statistics,
}

impl Tab {
    pub(crate) const ALL: [Tab; 3] = [Tab::Library, Tab::Search, Tab::Statistics];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Library => "Library",
            Tab::Search => "Search",
            Tab::Statistics => "Statistics",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Library => 0,
            Tab::Search => 1,
            Tab::Statistics => 2,
        }
    }

    pub(crate) fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub(crate) fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Selection over a list that can shrink underneath it.
#[derive(Clone, Debug, Default)]
pub(crate) struct Selection {
    pub(crate) index: usize,
}

impl Selection {
    pub(crate) fn move_by(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let max = len as isize - 1;
        self.index = (self.index as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn first(&mut self) {
        self.index = 0;
    }

    pub(crate) fn last(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

/// Query and results for the search tab. Results are recomputed from the
/// library whenever the query or the library changes.
#[derive(Clone, Debug, Default)]
pub(crate) struct SearchScreen {
    pub(crate) query: String,
    pub(crate) results: Vec<BookEntry>,
    pub(crate) selection: Selection,
}

impl SearchScreen {
    pub(crate) fn push_char(&mut self, ch: char, library: &Library) {
        self.query.push(ch);
        self.refresh(library);
    }

    pub(crate) fn backspace(&mut self, library: &Library) {
        self.query.pop();
        self.refresh(library);
    }

    pub(crate) fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.selection.first();
    }

    pub(crate) fn refresh(&mut self, library: &Library) {
        self.results = library.search(self.query.trim());
        self.selection.clamp(self.results.len());
    }

    pub(crate) fn current(&self) -> Option<&BookEntry> {
        self.results.get(self.selection.index)
    }

    pub(crate) fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}
