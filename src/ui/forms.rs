use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{BookEntry, BookField};

/// Internal representation of the "Add New Book" form fields.
#[derive(Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: bool,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
}

/// Focusable rows of the book form, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum FormField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Author,
        FormField::Year,
        FormField::Genre,
        FormField::Read,
    ];

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Author => "Author",
            FormField::Year => "Publication Year",
            FormField::Genre => "Genre",
            FormField::Read => "Have you read this book?",
        }
    }
}

impl From<BookField> for FormField {
    fn from(field: BookField) -> Self {
        match field {
            BookField::Title => FormField::Title,
            BookField::Author => FormField::Author,
            BookField::Year => FormField::Year,
            BookField::Genre => FormField::Genre,
        }
    }
}

impl BookForm {
    /// Fresh form with the year pre-filled, mirroring a number input that
    /// starts at the current year.
    pub(crate) fn new(default_year: i32) -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: default_year.to_string(),
            genre: String::new(),
            read: false,
            active: FormField::Title,
            error: None,
        }
    }

    pub(crate) fn focus(&mut self, field: FormField) {
        self.active = field;
    }

    pub(crate) fn next_field(&mut self) {
        let idx = (self.active.index() + 1) % FormField::ORDER.len();
        self.active = FormField::ORDER[idx];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = FormField::ORDER.len();
        let idx = (self.active.index() + len - 1) % len;
        self.active = FormField::ORDER[idx];
    }

    pub(crate) fn toggle_read(&mut self) {
        self.read = !self.read;
    }

    /// Append a character to the active field. Returns false when the
    /// character is not accepted there.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            FormField::Title => self.title.push(ch),
            FormField::Author => self.author.push(ch),
            FormField::Genre => self.genre.push(ch),
            FormField::Year => {
                if !ch.is_ascii_digit() || self.year.len() >= 4 {
                    return false;
                }
                self.year.push(ch);
            }
            FormField::Read => {
                if ch != ' ' {
                    return false;
                }
                self.toggle_read();
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Author => {
                self.author.pop();
            }
            FormField::Year => {
                self.year.pop();
            }
            FormField::Genre => {
                self.genre.pop();
            }
            FormField::Read => {}
        }
    }

    /// Year as typed. Anything unparsable maps to 0 so the store rejects it
    /// with a year validation error.
    pub(crate) fn year_value(&self) -> i32 {
        self.year.trim().parse().unwrap_or(0)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let is_active = self.active == field;
        let label = Span::raw(format!("{}: ", field.label()));

        if field == FormField::Read {
            let mark = if self.read { "[x]" } else { "[ ]" };
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            return Line::from(vec![label, Span::styled(mark, style)]);
        }

        let value = self.value(field);
        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![label, Span::styled(display, style)])
    }

    /// Cursor column offset for the active field, relative to the form's inner
    /// area.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        let prefix = self.active.label().len() + 2;
        let column = match self.active {
            FormField::Read => prefix + 1,
            field => prefix + self.value(field).chars().count(),
        };
        (column as u16, self.active.index() as u16)
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Year => &self.year,
            FormField::Genre => &self.genre,
            FormField::Read => "",
        }
    }
}

/// Book picked for removal, waiting for a yes/no answer.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) entry: BookEntry,
}

impl ConfirmBookDelete {
    pub(crate) fn from(entry: BookEntry) -> Self {
        Self { entry }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn focus_cycles_through_every_field() {
        let mut form = BookForm::new(2024);
        let mut seen = vec![form.active];
        for _ in 0..4 {
            form.next_field();
            seen.push(form.active);
        }
        assert_eq!(seen, FormField::ORDER.to_vec());
        form.next_field();
        assert_eq!(form.active, FormField::Title);
        form.previous_field();
        assert_eq!(form.active, FormField::Read);
    }

    #[test]
    fn year_accepts_at_most_four_digits() {
        let mut form = BookForm::new(2024);
        form.focus(FormField::Year);
        for _ in 0..4 {
            form.backspace();
        }
        assert!(!form.push_char('x'));
        for ch in "19655".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.year, "1965");
        assert_eq!(form.year_value(), 1965);
    }

    #[test]
    fn empty_year_is_invalid() {
        let mut form = BookForm::new(2024);
        form.year.clear();
        assert_eq!(form.year_value(), 0);
    }

    #[test]
    fn space_toggles_read_checkbox() {
        let mut form = BookForm::new(2024);
        form.focus(FormField::Read);
        assert!(form.push_char(' '));
        assert!(form.read);
        assert!(!form.push_char('y'));
        assert!(form.read);
    }

    #[test]
    fn text_fields_take_any_printable_char() {
        let mut form = BookForm::new(2024);
        for ch in "Dune 2".chars() {
            form.push_char(ch);
        }
        form.focus(FormField::Genre);
        form.push_char('S');
        assert_eq!(form.title, "Dune 2");
        assert_eq!(form.genre, "S");
        assert_eq!(form.cursor_offset(), ("Genre: ".len() as u16 + 1, 3));
    }

    #[test]
    fn validation_fields_map_to_form_rows() {
        assert_eq!(FormField::from(BookField::Year), FormField::Year);
        assert_eq!(FormField::from(BookField::Genre), FormField::Genre);
    }
}
