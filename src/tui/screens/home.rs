//! Home screen: the page menu.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};

use crate::pages::{self, PageSpec};

pub struct HomeScreen {
    selected: usize,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < pages::ALL.len() {
            self.selected += 1;
        }
    }

    pub fn select(&self) -> Option<&'static PageSpec> {
        pages::ALL.get(self.selected).copied()
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // title
            Constraint::Min(0),    // list
            Constraint::Length(1), // help
        ])
        .split(area);

        // Title.
        let title = Paragraph::new(Line::from(vec![Span::styled(
            "Depot",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(title, chunks[0]);

        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let list_items: Vec<ListItem> = pages::ALL
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let style = if i == self.selected { highlight } else { normal };
                let pointer = if i == self.selected { "› " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(pointer, style),
                    Span::styled(page.title, style),
                    Span::styled(format!("  [{}]", page.name), muted),
                ]))
            })
            .collect();

        let list = List::new(list_items).block(Block::default().padding(Padding::new(2, 2, 0, 0)));
        frame.render_widget(list, chunks[1]);

        // Help line.
        let help = Paragraph::new(Line::from(vec![Span::styled(
            " ↑↓ navigate  ⏎ open  q quit",
            muted,
        )]));
        frame.render_widget(help, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_within_the_page_list() {
        let mut home = HomeScreen::new();
        home.move_up();
        assert_eq!(home.select().unwrap().name, pages::ALL[0].name);

        for _ in 0..pages::ALL.len() * 2 {
            home.move_down();
        }
        assert_eq!(
            home.select().unwrap().name,
            pages::ALL[pages::ALL.len() - 1].name
        );
    }
}
