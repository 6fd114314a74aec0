use std::cmp::min;
use std::mem;

use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType,
    Paragraph, Tabs, Wrap,
};
use ratatui::Frame;
use tracing::{info, warn};

use crate::error::LibraryError;
use crate::models::{BookEntry, BookField, MIN_YEAR};
use crate::stats::genres_by_count;
use crate::store::Library;

use super::forms::{BookForm, ConfirmBookDelete, FormField};
use super::helpers::{
    book_card_lines, centered_rect, growth_chart_points, scroll_start, surface_error,
};
use super::screens::{SearchScreen, Selection, Tab};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar at the top of the screen.
const HEADER_HEIGHT: u16 = 3;
/// Height allocation per book card: three text rows plus the border.
const BOOK_CARD_HEIGHT: u16 = 5;
/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the current tab.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
    /// Keystrokes go into the search query.
    Searching,
    /// Quit was requested but the unsaved library could not be written.
    ConfirmQuit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    tab: Tab,
    mode: Mode,
    selection: Selection,
    search: SearchScreen,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            tab: Tab::Library,
            mode: Mode::Normal,
            selection: Selection::default(),
            search: SearchScreen::default(),
            status: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Feed one key press into the state machine. Returns true when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching => self.handle_search(code)?,
            Mode::ConfirmQuit => self.handle_confirm_quit(code, &mut exit)?,
        };

        Ok(exit)
    }

    /// Ctrl-C goes through the same unsaved-changes check as `q`. A second
    /// Ctrl-C while the quit is pending leaves anyway.
    pub(crate) fn handle_ctrl_c(&mut self) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::ConfirmQuit => self.handle_confirm_quit(KeyCode::Char('q'), &mut exit)?,
            _ => self.try_quit(&mut exit),
        };
        Ok(exit)
    }

    /// Retry writing the library after an earlier save failed.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        match self.library.save() {
            Ok(()) => {
                info!(path = %self.library.path().display(), "library saved on request");
                self.set_status("Library saved.", StatusKind::Info);
            }
            Err(err) => {
                let message = surface_error(&err.into());
                self.set_status(format!("Save failed: {message}"), StatusKind::Error);
            }
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char(ch) if self.tab == Tab::Search && ch != '/' && !ch.is_control() => {
                self.search.push_char(ch, &self.library);
                return Ok(Mode::Searching);
            }
            KeyCode::Char('q') | KeyCode::Esc => return Ok(self.try_quit(exit)),
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.previous()),
            KeyCode::Char('1') => self.switch_tab(Tab::Library),
            KeyCode::Char('2') => self.switch_tab(Tab::Search),
            KeyCode::Char('3') => self.switch_tab(Tab::Statistics),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::new(current_year())));
            }
            KeyCode::Char('/') => {
                self.switch_tab(Tab::Search);
                return Ok(Mode::Searching);
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.active_selection().first(),
            KeyCode::End => {
                let len = self.visible_len();
                self.active_selection().last(len);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(entry) = self.current_entry().cloned() {
                    return Ok(Mode::ConfirmDelete(ConfirmBookDelete::from(entry)));
                }
                self.set_status("No book selected.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Leave right away when everything is on disk. Otherwise try one more
    /// save and ask for confirmation if that fails too.
    fn try_quit(&mut self, exit: &mut bool) -> Mode {
        if !self.library.is_dirty() {
            *exit = true;
            return Mode::Normal;
        }
        match self.library.save() {
            Ok(()) => {
                info!(path = %self.library.path().display(), "unsaved changes written on quit");
                *exit = true;
                Mode::Normal
            }
            Err(err) => {
                let message = surface_error(&err.into());
                self.set_status(
                    format!("Unsaved changes could not be written: {message}"),
                    StatusKind::Error,
                );
                Mode::ConfirmQuit
            }
        }
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('y') | KeyCode::Char('Y') => {
                warn!(
                    books = self.library.len(),
                    "quitting with changes that were never saved"
                );
                *exit = true;
            }
            _ => self.set_status(
                "Quit cancelled. Press Ctrl-S to retry saving.",
                StatusKind::Info,
            ),
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => keep_open = !self.save_new_book(&mut form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_delete(&confirm);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.search.clear();
                Ok(Mode::Normal)
            }
            KeyCode::Enter => Ok(Mode::Normal),
            KeyCode::Up => {
                self.move_selection(-1);
                Ok(Mode::Searching)
            }
            KeyCode::Down => {
                self.move_selection(1);
                Ok(Mode::Searching)
            }
            KeyCode::Backspace => {
                self.search.backspace(&self.library);
                Ok(Mode::Searching)
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    self.search.push_char(ch, &self.library);
                }
                Ok(Mode::Searching)
            }
            _ => Ok(Mode::Searching),
        }
    }

    /// Submit the add form. Returns true when the form should close.
    fn save_new_book(&mut self, form: &mut BookForm) -> bool {
        let result = self.library.add(
            &form.title,
            &form.author,
            form.year_value(),
            &form.genre,
            form.read,
        );

        match result {
            Ok(entry) => {
                info!(id = %entry.id, title = %entry.record.title, "book added");
                self.after_mutation();
                self.selection.last(self.library.len());
                self.set_status("Book added successfully!", StatusKind::Info);
                true
            }
            Err(LibraryError::Validation { field }) => {
                let message = match field {
                    BookField::Year => format!(
                        "Publication year must be between {MIN_YEAR} and {}.",
                        current_year()
                    ),
                    other => format!("Please fill in the {other}."),
                };
                form.focus(FormField::from(field));
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                false
            }
            Err(err @ LibraryError::Write { .. }) => {
                warn!(error = %err, "book kept in memory but not saved");
                self.after_mutation();
                self.selection.last(self.library.len());
                self.set_status(
                    format!(
                        "Book added, but saving failed: {}",
                        surface_error(&err.into())
                    ),
                    StatusKind::Error,
                );
                true
            }
            Err(err) => {
                let message = surface_error(&err.into());
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                false
            }
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) {
        let title = confirm.entry.record.title.clone();
        match self.library.remove_by_id(confirm.entry.id) {
            Ok(entry) => {
                info!(id = %entry.id, title = %title, "book removed");
                self.after_mutation();
                self.set_status(format!("Removed \"{title}\"."), StatusKind::Info);
            }
            Err(err @ LibraryError::Write { .. }) => {
                warn!(error = %err, "book removed in memory but not saved");
                self.after_mutation();
                self.set_status(
                    format!(
                        "Removed \"{title}\", but saving failed: {}",
                        surface_error(&err.into())
                    ),
                    StatusKind::Error,
                );
            }
            Err(err) => {
                let message = surface_error(&err.into());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Keep derived views consistent after the library changed.
    fn after_mutation(&mut self) {
        self.selection.clamp(self.library.len());
        if self.search.has_query() {
            self.search.refresh(&self.library);
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        if tab == Tab::Search {
            self.search.refresh(&self.library);
        }
    }

    fn active_selection(&mut self) -> &mut Selection {
        match self.tab {
            Tab::Search => &mut self.search.selection,
            _ => &mut self.selection,
        }
    }

    fn visible_len(&self) -> usize {
        match self.tab {
            Tab::Library => self.library.len(),
            Tab::Search => self.search.results.len(),
            Tab::Statistics => 0,
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.visible_len();
        self.active_selection().move_by(offset, len);
    }

    fn current_entry(&self) -> Option<&BookEntry> {
        match self.tab {
            Tab::Library => self.library.list().get(self.selection.index),
            Tab::Search => self.search.current(),
            Tab::Statistics => None,
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Library => self.draw_library(frame, chunks[1]),
            Tab::Search => self.draw_search(frame, chunks[1]),
            Tab::Statistics => self.draw_statistics(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmQuit => self.draw_confirm_quit(frame, area),
            Mode::Searching | Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(idx, tab)| format!(" {} {} ", idx + 1, tab.title()));
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Personal Library Manager"),
            )
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        if self.library.is_empty() {
            let message = Paragraph::new("Your library is empty. Add some books!")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Your Library ({})", self.library.len()));
        frame.render_widget(block.clone(), area);
        self.render_book_cards(
            frame,
            block.inner(area),
            self.library.list(),
            self.selection.index,
        );
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let typing = matches!(self.mode, Mode::Searching);
        let query_span = if self.search.query.is_empty() && !typing {
            Span::styled("Enter search term...", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.search.query.clone())
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title("Search by title or author");
        if typing {
            block = block.style(Style::default().fg(Color::Yellow));
        }
        let input = Paragraph::new(Line::from(vec![Span::raw("Search: "), query_span]))
            .block(block.clone());
        frame.render_widget(input, chunks[0]);

        if typing {
            let inner = block.inner(chunks[0]);
            let cursor_x = inner.x + "Search: ".len() as u16 + self.search.query.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }

        let results_area = chunks[1];
        if !self.search.has_query() {
            let hint = Paragraph::new("Type to search your library by title or author.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(hint, results_area);
        } else if self.search.results.is_empty() {
            let none = Paragraph::new("No matching books found.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(none, results_area);
        } else {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("{} match(es)", self.search.results.len()));
            frame.render_widget(block.clone(), results_area);
            self.render_book_cards(
                frame,
                block.inner(results_area),
                &self.search.results,
                self.search.selection.index,
            );
        }
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect) {
        let summary = self.library.summary();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[0]);
        let tile_data = [
            ("Total Books", summary.total.to_string(), Color::LightRed),
            ("Read Books", summary.read_count.to_string(), Color::Green),
            (
                "Completion Rate",
                format!("{:.1}%", summary.percent_read),
                Color::LightRed,
            ),
        ];
        for ((label, value, color), tile) in tile_data.into_iter().zip(tiles.iter()) {
            let lines = vec![
                Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
                Line::from(Span::styled(
                    value,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
            ];
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, *tile);
        }

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Read"))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
            .ratio((summary.percent_read / 100.0).clamp(0.0, 1.0))
            .label(format!("{} of {} read", summary.read_count, summary.total));
        frame.render_widget(gauge, chunks[1]);

        if self.library.is_empty() {
            let message = Paragraph::new("Add some books to see genre and progress charts.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(message, chunks[2]);
            return;
        }

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        self.draw_genre_chart(frame, charts[0]);
        self.draw_growth_chart(frame, charts[1]);
    }

    fn draw_genre_chart(&self, frame: &mut Frame, area: Rect) {
        let genres = genres_by_count(self.library.records());
        let bars: Vec<Bar> = genres
            .iter()
            .map(|(genre, count)| {
                Bar::default()
                    .value(*count as u64)
                    .label(Line::from(genre.clone()))
                    .text_value(count.to_string())
            })
            .collect();

        let inner_width = area.width.saturating_sub(2) as usize;
        let slots = bars.len().max(1);
        let bar_width = (inner_width / slots).saturating_sub(1).clamp(3, 12) as u16;

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Genre Distribution"),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::LightRed))
            .value_style(Style::default().fg(Color::Black).bg(Color::LightRed));
        frame.render_widget(chart, area);
    }

    fn draw_growth_chart(&self, frame: &mut Frame, area: Rect) {
        let series = self.library.growth_series();
        let (points, max_x) = growth_chart_points(&series);
        let total = series.last().map(|point| point.cumulative).unwrap_or(0);

        let first_label = series
            .first()
            .map(|point| point.added_at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let last_label = series
            .last()
            .map(|point| point.added_at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let dataset = Dataset::default()
            .name("Books")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Reading Progress"),
            )
            .x_axis(
                Axis::default()
                    .title("Added")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, max_x])
                    .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
            )
            .y_axis(
                Axis::default()
                    .title("Books")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, total.max(1) as f64])
                    .labels(vec![Span::raw("0"), Span::raw(total.to_string())]),
            );
        frame.render_widget(chart, area);
    }

    fn render_book_cards(
        &self,
        frame: &mut Frame,
        area: Rect,
        entries: &[BookEntry],
        selected: usize,
    ) {
        if entries.is_empty() || area.height == 0 {
            return;
        }

        let capacity = ((area.height / BOOK_CARD_HEIGHT) as usize).max(1);
        let start = scroll_start(selected, capacity, entries.len());
        let end = min(start + capacity, entries.len());

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (row, entry_index) in rows.iter().zip(start..end) {
            if row.height == 0 {
                continue;
            }
            let is_selected = entry_index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }
            let card = Paragraph::new(book_card_lines(&entries[entry_index].record, is_selected))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(card, *row);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else if self.library.is_dirty() {
            Line::from(Span::styled(
                "Unsaved changes: press Ctrl-S to retry saving.",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.mode, self.tab) {
            (Mode::AddingBook(_), _) => &[
                ("[Tab/↑↓]", " Field   "),
                ("[Space]", " Toggle read   "),
                ("[Enter]", " Add Book   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::ConfirmDelete(_), _) => &[("[y]", " Remove   "), ("[n/Esc]", " Keep")],
            (Mode::ConfirmQuit, _) => &[("[q/y]", " Quit without saving   "), ("[any]", " Stay")],
            (Mode::Searching, _) => &[
                ("[type]", " Filter   "),
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Done   "),
                ("[Esc]", " Clear"),
            ],
            (Mode::Normal, Tab::Statistics) => &[
                ("[Tab/1-3]", " Switch tab   "),
                ("[a]", " Add   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, Tab::Search) => &[
                ("[type]", " Search   "),
                ("[↑↓]", " Navigate   "),
                ("[Del]", " Delete   "),
                ("[Tab]", " Switch tab   "),
                ("[Esc]", " Quit"),
            ],
            (Mode::Normal, Tab::Library) => &[
                ("[↑↓]", " Navigate   "),
                ("[a]", " Add   "),
                ("[d]", " Delete   "),
                ("[/]", " Search   "),
                ("[Tab/1-3]", " Switch tab   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, text)| [Span::styled(*key, key_style), Span::raw(*text)])
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Add New Book")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(FormField::Title),
            form.build_line(FormField::Author),
            form.build_line(FormField::Year),
            form.build_line(FormField::Genre),
            form.build_line(FormField::Read),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to add • Tab to switch • Space toggles read • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (dx, dy) = form.cursor_offset();
        frame.set_cursor_position((inner.x + dx, inner.y + dy));
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Unsaved Changes").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "The library could not be written to {}.",
                self.library.path().display()
            )),
            Line::from("Quitting now loses the changes made this session."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Q to quit anyway or any other key to stay.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove {}?", confirm.entry.record.display_title())),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn current_year() -> i32 {
    Local::now().year()
}
