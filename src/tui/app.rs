//! Application loop and screen routing.
//!
//! The loop polls for input with a short timeout so debounce deadlines
//! (preview rebuild, draft autosave) fire even while the keyboard is idle.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::client::HttpTransport;
use crate::config::Config;
use crate::storage::Storage;

use super::screens::{FormScreen, HomeScreen};

const TICK: Duration = Duration::from_millis(100);

/// Which screen is currently displayed.
enum Screen {
    Home(HomeScreen),
    Form(Box<FormScreen>),
}

/// Runs the TUI event loop until the user quits.
pub fn run(config: &Config, storage: &Storage) -> io::Result<()> {
    let transport = HttpTransport::new(&config.backend_url).map_err(io::Error::other)?;
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, storage, &transport);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    storage: &Storage,
    transport: &HttpTransport,
) -> io::Result<()> {
    let mut screen = Screen::Home(HomeScreen::new());

    loop {
        terminal.draw(|frame| match &screen {
            Screen::Home(s) => s.render(frame),
            Screen::Form(s) => s.render(frame),
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match &mut screen {
                    Screen::Home(home) => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Up | KeyCode::Char('k') => home.move_up(),
                        KeyCode::Down | KeyCode::Char('j') => home.move_down(),
                        KeyCode::Enter => {
                            if let Some(page) = home.select() {
                                let mut form = Box::new(FormScreen::new(page, storage));
                                form.refresh_preset(transport);
                                screen = Screen::Form(form);
                            }
                        }
                        _ => {}
                    },
                    Screen::Form(form) => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            match key.code {
                                KeyCode::Char('n') => form.add_line(),
                                KeyCode::Char('d') => form.remove_line(),
                                KeyCode::Char('y') => form.copy_line(),
                                KeyCode::Char('s') => form.submit(storage, transport),
                                _ => {}
                            }
                            continue;
                        }
                        match key.code {
                            KeyCode::Esc => {
                                form.save_draft(storage);
                                screen = Screen::Home(HomeScreen::new());
                            }
                            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
                            KeyCode::Down | KeyCode::Tab => form.next_field(),
                            KeyCode::PageUp => form.scroll_up(),
                            KeyCode::PageDown => form.scroll_down(),
                            KeyCode::Backspace => form.on_backspace(),
                            KeyCode::Char(c) => form.on_char(c),
                            _ => {}
                        }
                    }
                }
            }
        }

        if let Screen::Form(form) = &mut screen {
            form.on_tick(storage);
        }
    }
}
