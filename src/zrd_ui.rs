// Terminal UI rendering and event handling
// Owns the terminal and the game; publishes the cursor to the position logger

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::zrd_color::Palette;
use crate::zrd_game::{Config, Direction, Game, Grid, Input, State, TileKind, seeded_rng};
use crate::zrd_lang::Lang;
use crate::zrd_log::{PositionLogger, session_stamp};

/// Translate a key press into a game input; None for keys the game ignores
pub fn map_key(key: KeyEvent) -> Option<Input> {
    match key.code {
        KeyCode::Up => Some(Input::Move(Direction::Up)),
        KeyCode::Down => Some(Input::Move(Direction::Down)),
        KeyCode::Left => Some(Input::Move(Direction::Left)),
        KeyCode::Right => Some(Input::Move(Direction::Right)),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        // raw mode swallows SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        _ => None,
    }
}

fn glyph(kind: TileKind, palette: &Palette) -> (char, Style) {
    match kind {
        TileKind::Safe => ('O', Style::default().fg(palette.safe)),
        TileKind::Bonus => ('$', Style::default().fg(palette.bonus).add_modifier(Modifier::BOLD)),
        TileKind::Mine => ('X', Style::default().fg(palette.mine)),
    }
}

/// One line per grid row, cells two columns apart; the cursor cell is drawn reversed
pub fn board_lines(game: &Game, palette: &Palette) -> Vec<Spans<'static>> {
    let grid = &game.grid;
    let mut lines = Vec::with_capacity(grid.rows);
    for row in 0..grid.rows {
        let mut spans = Vec::with_capacity(grid.cols * 2);
        for col in 0..grid.cols {
            let idx = grid.index(row, col);
            let (ch, mut style) = glyph(grid.tile(idx), palette);
            if idx == game.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::raw(" "));
            spans.push(Span::styled(ch.to_string(), style));
        }
        lines.push(Spans::from(spans));
    }
    lines
}

fn draw_board<B: Backend>(f: &mut Frame<B>, game: &Game, palette: &Palette, lang: &Lang) {
    let size = f.size();
    f.render_widget(Clear, size);

    // " X" per cell, one padding column, two border columns
    let board_w = (game.grid.cols * 2 + 3) as u16;
    let board_h = game.grid.rows as u16 + 2;
    let board_area = center_rect(board_w, board_h, size).intersection(size);
    let board = Paragraph::new(Text::from(board_lines(game, palette))).block(
        Block::default()
            .borders(Borders::ALL)
            .title(lang.assets.title)
            .title_alignment(Alignment::Center),
    );
    f.render_widget(board, board_area);

    let hint_y = board_area.y + board_area.height;
    if hint_y < size.y + size.height {
        let hint = Paragraph::new(Span::styled(lang.assets.hint_keys, Style::default().fg(palette.hint)))
            .alignment(Alignment::Center);
        f.render_widget(hint, Rect::new(size.x, hint_y, size.width, 1));
    }
}

fn draw_game_over<B: Backend>(f: &mut Frame<B>, palette: &Palette, lang: &Lang) {
    let size = f.size();
    f.render_widget(Clear, size);

    let msg = lang.assets.game_over;
    let msg_style = Style::default().fg(palette.game_over).add_modifier(Modifier::BOLD);
    let area = center_rect(msg.width() as u16, 1, size).intersection(size);
    f.render_widget(Paragraph::new(Span::styled(msg, msg_style)), area);

    let hint_y = area.y + 2;
    if hint_y < size.y + size.height {
        let hint = Paragraph::new(Span::styled(lang.assets.game_over_hint, Style::default().fg(palette.hint)))
            .alignment(Alignment::Center);
        f.render_widget(hint, Rect::new(size.x, hint_y, size.width, 1));
    }
}

/// Block until the next key press (release/repeat events are skipped)
fn next_event() -> io::Result<Option<KeyEvent>> {
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        // Resize and friends only trigger a redraw
        _ => Ok(None),
    }
}

/// Render/input cycle: one frame per event, until the game leaves Running
fn play<B: Backend>(
    terminal: &mut Terminal<B>,
    game: &mut Game,
    shared_cursor: &AtomicUsize,
    palette: &Palette,
    lang: &Lang,
) -> Result<State, Box<dyn Error>> {
    loop {
        terminal.draw(|f| draw_board(f, game, palette, lang))?;
        let Some(input) = next_event()?.and_then(map_key) else {
            continue;
        };
        let state = game.apply(input);
        shared_cursor.store(game.cursor, Ordering::Relaxed);
        if state != State::Running {
            return Ok(state);
        }
    }
}

/// Show the game over screen, stop the logger, and wait for the acknowledgment key
fn game_over<B: Backend>(
    terminal: &mut Terminal<B>,
    logger: &PositionLogger,
    palette: &Palette,
    lang: &Lang,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| draw_game_over(f, palette, lang))?;
    logger.cancel();
    while next_event()?.is_none() {}
    Ok(())
}

pub fn run(cfg: &Config, lang: &Lang) -> Result<(), Box<dyn Error>> {
    let mut rng = seeded_rng(cfg.seed);
    let mut game = Game::new(Grid::generate(cfg.rows, cfg.cols, cfg.variant, &mut rng));
    let palette = Palette::new(cfg.monochrome);

    let shared_cursor = Arc::new(AtomicUsize::new(game.cursor));
    let logger = PositionLogger::spawn(
        PathBuf::from(&cfg.log_path),
        session_stamp(),
        Duration::from_millis(cfg.poll_interval_ms),
        Arc::clone(&shared_cursor),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = match play(&mut terminal, &mut game, &shared_cursor, &palette, lang) {
        Ok(State::GameOver) => game_over(&mut terminal, &logger, &palette, lang),
        other => other.map(|_| ()),
    };

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(err) = logger.stop() {
        eprintln!("{}", Lang::fill(lang.assets.log_error_fmt, err));
    }
    result
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zrd_game::Variant;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn seeded_game(seed: u64) -> Game {
        Game::new(Grid::generate(20, 20, Variant::Bonus, &mut seeded_rng(Some(seed))))
    }

    #[test]
    fn maps_arrows_and_quit_keys() {
        assert_eq!(map_key(key(KeyCode::Up)), Some(Input::Move(Direction::Up)));
        assert_eq!(map_key(key(KeyCode::Down)), Some(Input::Move(Direction::Down)));
        assert_eq!(map_key(key(KeyCode::Left)), Some(Input::Move(Direction::Left)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(Input::Move(Direction::Right)));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(map_key(key(KeyCode::Char('Q'))), Some(Input::Quit));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Input::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Input::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('c'))), None);
        assert_eq!(map_key(key(KeyCode::Enter)), None);
    }

    #[test]
    fn board_lines_draw_glyphs_and_reverse_the_cursor() {
        let palette = Palette::new(true);
        let mut game = seeded_game(11);
        game.cursor = 21;
        let lines = board_lines(&game, &palette);
        assert_eq!(lines.len(), 20);
        for (row, line) in lines.iter().enumerate() {
            assert_eq!(line.0.len(), 40);
            for col in 0..20 {
                let idx = row * 20 + col;
                let cell = &line.0[col * 2 + 1];
                let expected = match game.grid.tile(idx) {
                    TileKind::Safe => "O",
                    TileKind::Bonus => "$",
                    TileKind::Mine => "X",
                };
                assert_eq!(cell.content, expected);
                assert_eq!(
                    cell.style.add_modifier.contains(Modifier::REVERSED),
                    idx == game.cursor
                );
            }
        }
    }

    #[test]
    fn mines_and_bonus_use_their_own_colors() {
        let palette = Palette::new(false);
        assert_eq!(glyph(TileKind::Mine, &palette).1.fg, Some(palette.mine));
        assert_eq!(glyph(TileKind::Bonus, &palette).1.fg, Some(palette.bonus));
        assert_eq!(glyph(TileKind::Safe, &palette).1.fg, Some(palette.safe));
    }

    #[test]
    fn frame_fits_small_terminals() {
        let lang = Lang::new("en");
        let palette = Palette::new(true);
        let game = seeded_game(5);
        for (w, h) in [(80, 24), (10, 5), (1, 1)] {
            let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
            terminal.draw(|f| draw_board(f, &game, &palette, &lang)).unwrap();
            terminal.draw(|f| draw_game_over(f, &palette, &lang)).unwrap();
        }
    }

    #[test]
    fn game_over_message_is_centered() {
        let lang = Lang::new("en");
        let palette = Palette::new(true);
        let mut terminal = Terminal::new(TestBackend::new(40, 11)).unwrap();
        terminal.draw(|f| draw_game_over(f, &palette, &lang)).unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer.get(x, 5).symbol.clone()).collect();
        assert_eq!(row.trim(), "Game Over");
        assert_eq!(row.find('G'), Some(15));
    }

    #[test]
    fn center_rect_clamps_to_origin_when_too_large() {
        let r = Rect::new(0, 0, 10, 4);
        assert_eq!(center_rect(4, 2, r), Rect::new(3, 1, 4, 2));
        assert_eq!(center_rect(20, 8, r), Rect::new(0, 0, 20, 8));
    }
}
