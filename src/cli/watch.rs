//! Watch command implementation - interactive TUI player.

// Terminal geometry and timing use intentional casts
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use super::CliError;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use moroxel::demo;
use moroxel::{
    BDOWN, BLEFT, BRIGHT, BUP, Buttons, Console, ConsoleConfig, Framebuffer, InputSnapshot, P2,
    PALETTE, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io::stdout;
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the console fails to boot or the TUI fails.
pub(crate) fn execute(fps: u32, agent: bool) -> Result<(), CliError> {
    let agents: &[u8] = if agent { &[P2] } else { &[] };
    let console = demo::console(ConsoleConfig::default(), agents)?;
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    run_tui(console, frame_time)
}

struct App {
    console: Console,
    held: Buttons,
    paused: bool,
    frame_time: Duration,
}

impl App {
    fn step(&mut self) {
        let input = InputSnapshot::p1(self.held);
        self.console.frame(self.frame_time.as_secs_f64(), &input);
        // Terminals report presses only, so a key holds for one frame.
        self.held = Buttons::NONE;
    }
}

fn run_tui(console: Console, frame_time: Duration) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App {
        console,
        held: Buttons::NONE,
        paused: false,
        frame_time,
    };
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &app)).map_err(|e| CliError::new(e.to_string()))?;

        let timeout = frame_time.saturating_sub(last_frame.elapsed());
        if event::poll(timeout).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.paused = !app.paused,
                KeyCode::Left => app.held.press(BLEFT),
                KeyCode::Right => app.held.press(BRIGHT),
                KeyCode::Up => app.held.press(BUP),
                KeyCode::Down => app.held.press(BDOWN),
                KeyCode::Char('.') if app.paused => app.step(),
                _ => {}
            }
        }

        if !app.paused && last_frame.elapsed() >= frame_time {
            app.step();
            last_frame = Instant::now();
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Screen
            Constraint::Length(3),  // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_screen(f, chunks[1], app.console.framebuffer());
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let status = if app.paused { "PAUSED" } else { "RUNNING" };
    let title = format!(
        " Moroxel | {} | Frame {} | {} ",
        demo::CARTRIDGE,
        app.console.frames(),
        status
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn palette_color(index: u8) -> Color {
    let (r, g, b) = PALETTE[usize::from(index) % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// Two pixel rows per terminal row: upper half-block in the foreground color,
/// the lower pixel as background.
fn render_screen(f: &mut Frame, area: Rect, fb: &Framebuffer) {
    let visible_width = i32::from(area.width).saturating_sub(2).min(SCREEN_WIDTH);
    let visible_rows = i32::from(area.height).saturating_sub(2).min(SCREEN_HEIGHT / 2);

    let mut lines: Vec<Line> = Vec::with_capacity(visible_rows as usize);
    for row in 0..visible_rows {
        let spans: Vec<Span> = (0..visible_width)
            .map(|x| {
                let top = fb.get(x, row * 2).unwrap_or(0);
                let bottom = fb.get(x, row * 2 + 1).unwrap_or(0);
                Span::styled(
                    "▀",
                    Style::default().fg(palette_color(top)).bg(palette_color(bottom)),
                )
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let screen = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Screen "));
    f.render_widget(screen, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.paused {
        " [q] Quit  [Space] Resume  [.] Step  [←↑↓→] Move "
    } else {
        " [q] Quit  [Space] Pause  [←↑↓→] Move "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
