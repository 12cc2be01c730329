use crate::app::override_service::{self, Identifier};
use crate::app::view_index::ViewIndex;
use crate::core::config::AppPaths;
use crate::core::errors::{AppError, AppResult};
use crate::infrastructure::db::{self, DbPool};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use ratatui::{Frame, Terminal};
use std::io::{self, Write};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);
const QUIT_CONFIRM_WINDOW: Duration = Duration::from_secs(1);
const HELP_LINE: &str = "Type to filter. Enter toggles. Ctrl+R reloads. Ctrl+C twice quits.";

struct TuiState<'a> {
    pool: &'a DbPool,
    paths: &'a AppPaths,
    view: ViewIndex,
    table: TableState,
    status: String,
    quit_armed_at: Option<Instant>,
    should_quit: bool,
}

impl TuiState<'_> {
    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.handle_quit_request(),
                KeyCode::Char('r') => {
                    self.status = "Refreshed.".to_string();
                    self.reload_apps();
                }
                KeyCode::Char('j') => self.view.select_next(),
                KeyCode::Char('k') => self.view.select_previous(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Down => self.view.select_next(),
            KeyCode::Up => self.view.select_previous(),
            KeyCode::Enter => self.toggle_selected(),
            KeyCode::Backspace => self.view.pop_filter_char(),
            KeyCode::Char(ch) => self.view.push_filter_char(ch),
            _ => {}
        }
    }

    // A second Ctrl+C inside the window quits; an expired window re-arms.
    fn handle_quit_request(&mut self) {
        if let Some(armed_at) = self.quit_armed_at
            && armed_at.elapsed() <= QUIT_CONFIRM_WINDOW
        {
            self.should_quit = true;
            return;
        }
        self.quit_armed_at = Some(Instant::now());
        self.status = "Press Ctrl+C again to quit.".to_string();
    }

    // The toggle goes through the canonical position, never the visible row
    // ordinal.
    fn toggle_selected(&mut self) {
        let Some(app) = self.view.selected_app() else {
            self.status = "Nothing selected.".to_string();
            return;
        };
        let app_name = app.app_name.clone();
        let was_customized = app.is_customized;
        let Some(canonical) = self.view.selected_canonical() else {
            return;
        };

        let identifier = Identifier::Position(canonical);
        let result = if was_customized {
            override_service::unset_gpu_override(self.pool, self.paths, &identifier, &app_name)
        } else {
            override_service::set_gpu_override(self.pool, self.paths, &identifier, &app_name)
        };

        match result {
            Ok(name) => {
                self.status = if was_customized {
                    format!("Successfully reset '{name}'.")
                } else {
                    format!("Successfully set '{name}' to prefer the dedicated GPU.")
                };
                self.reload_apps();
            }
            Err(error) => {
                self.status = format!("Error: {}", error.message);
            }
        }
    }

    fn reload_apps(&mut self) {
        match db::list_apps(self.pool) {
            Ok(apps) => self.view.refresh(apps),
            Err(error) => {
                self.status = format!("Error: {}", error.message);
            }
        }
    }
}

pub fn run(pool: &DbPool, paths: &AppPaths) -> AppResult<()> {
    let apps = db::list_apps(pool)?;
    let mut state = TuiState {
        pool,
        paths,
        view: ViewIndex::new(apps),
        table: TableState::default(),
        status: HELP_LINE.to_string(),
        quit_armed_at: None,
        should_quit: false,
    };

    enable_raw_mode().map_err(terminal_error)?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .map_err(terminal_error)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(terminal_error)?;
    terminal.hide_cursor().map_err(terminal_error)?;

    let result = event_loop(&mut terminal, &mut state);
    let restore = restore_terminal(&mut terminal);
    result.and(restore)
}

fn event_loop<B>(terminal: &mut Terminal<B>, state: &mut TuiState) -> AppResult<()>
where
    B: ratatui::backend::Backend,
{
    loop {
        terminal
            .draw(|frame| render(frame, state))
            .map_err(terminal_error)?;

        if event::poll(TICK_RATE).map_err(terminal_error)? {
            match event::read().map_err(terminal_error)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => state.handle_key(key),
                _ => {}
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn restore_terminal<B>(terminal: &mut Terminal<B>) -> AppResult<()>
where
    B: ratatui::backend::Backend + Write,
{
    disable_raw_mode().map_err(terminal_error)?;
    terminal
        .backend_mut()
        .execute(LeaveAlternateScreen)
        .map_err(terminal_error)?;
    terminal.show_cursor().map_err(terminal_error)?;
    Ok(())
}

fn render(frame: &mut Frame, state: &mut TuiState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let filter = Paragraph::new(Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
        Span::raw(state.view.filter()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("gpu-selector"));
    frame.render_widget(filter, layout[0]);

    let header = Row::new(vec!["ID", "GPU", "APP NAME", "COMMENT"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .view
        .visible_apps()
        .enumerate()
        .map(|(row, app)| {
            let marker = if app.is_customized { "[✔]" } else { "[ ]" };
            Row::new(vec![
                (row + 1).to_string(),
                marker.to_string(),
                app.app_name.clone(),
                app.app_comment.clone().unwrap_or_default(),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Percentage(45),
            Constraint::Percentage(45),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Applications ({})", state.view.visible_len())),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    state.table.select(state.view.selected_row());
    frame.render_stateful_widget(table, layout[1], &mut state.table);

    let status = Paragraph::new(state.status.as_str()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, layout[2]);
}

fn terminal_error(error: io::Error) -> AppError {
    AppError::new("tui_io_error", "terminal interaction failed").with_detail(error.to_string())
}
