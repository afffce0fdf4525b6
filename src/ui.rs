//! Layout and drawing: playfield, sidebar, pause and game-over popups, row-clear fade.

use crate::app::Screen;
use crate::breaker::Direction as BreakDir;
use crate::grid::{BlockType, GridDims};
use crate::highscores::HighScores;
use crate::player::Footprint;
use crate::sim::Snapshot;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per grid cell; two columns keep cells roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 26;
/// Duration of the flash over cleared rows.
const ROW_CLEAR_FADE_MS: u32 = 350;

/// Playfield size in terminal cells, border included.
fn playfield_outer_size(dims: GridDims) -> (u16, u16) {
    (
        (dims.cols as u16).saturating_mul(CELL_WIDTH).saturating_add(2),
        (dims.rows as u16).saturating_mul(CELL_HEIGHT).saturating_add(2),
    )
}

/// Terminal rect of grid cell `(col, row)` inside `board`, or `None` if it falls outside.
fn cell_rect(board: Rect, col: i32, row: i32) -> Option<Rect> {
    if col < 0 || row < 0 {
        return None;
    }
    let x = board.x.checked_add((col as u16).checked_mul(CELL_WIDTH)?)?;
    let y = board.y.checked_add((row as u16).checked_mul(CELL_HEIGHT)?)?;
    if x + CELL_WIDTH > board.x + board.width || y + CELL_HEIGHT > board.y + board.height {
        return None;
    }
    Some(Rect {
        x,
        y,
        width: CELL_WIDTH,
        height: CELL_HEIGHT,
    })
}

/// Two-character glyph per block type so powers read without colour.
fn block_glyph(kind: BlockType) -> &'static str {
    match kind {
        BlockType::Normal => "██",
        BlockType::Bomb => "<>",
        BlockType::Freeze => "**",
        BlockType::LaserH => "==",
        BlockType::LaserV => "||",
    }
}

/// `mm:ss.t` for survival times.
pub fn format_time(secs: f32) -> String {
    let tenths = (secs.max(0.0) * 10.0) as u64;
    format!("{:02}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}

/// Row-clear flash: created on the first frame after a clear, dropped when done.
#[derive(Default)]
pub struct RowClearFx {
    rows: Vec<i32>,
    effect: Option<Effect>,
    process_time: Option<Instant>,
}

impl RowClearFx {
    /// Flash `rows`, replacing any flash still running.
    pub fn start(&mut self, rows: &[i32]) {
        self.rows = rows.to_vec();
        self.effect = None;
        self.process_time = None;
    }

    pub fn is_active(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.effect = None;
        self.process_time = None;
    }

    /// Drop a finished effect so the board draws plainly again.
    pub fn finish_if_done(&mut self) {
        if self.effect.as_ref().is_some_and(|e| e.done()) {
            self.clear();
        }
    }

    fn render(&mut self, frame: &mut Frame, board: Rect, flash: Color, now: Instant) {
        let delta = self
            .process_time
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.process_time = Some(now);

        if self.effect.is_none() {
            let ys: HashSet<u16> = self
                .rows
                .iter()
                .filter_map(|&r| cell_rect(board, 0, r).map(|rect| rect.y))
                .collect();
            let filter = CellFilter::PositionFn(ref_count(move |pos: Position| ys.contains(&pos.y)));
            let effect = fx::fade_from(flash, flash, (ROW_CLEAR_FADE_MS, Interpolation::Linear))
                .with_filter(filter)
                .with_area(board);
            self.effect = Some(effect);
        }

        if let Some(effect) = self.effect.as_mut() {
            frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
        }
    }
}

/// Everything a frame needs besides the simulation snapshot.
pub struct View<'a> {
    pub screen: Screen,
    pub paused: bool,
    pub player: Footprint,
    pub theme: &'a Theme,
    pub dims: GridDims,
    pub freeze_duration: f32,
    pub break_cooldown: f32,
    pub high_scores: &'a HighScores,
    /// Rank of the run that just ended, if it made the board.
    pub last_rank: Option<usize>,
}

/// Draw the game, then any popup for the current screen, then the row-clear flash.
pub fn draw(frame: &mut Frame, view: &View<'_>, snap: &Snapshot<'_>, row_fx: &mut RowClearFx, now: Instant) {
    let area = frame.area();
    let board = draw_game(frame, view, snap, area);
    match view.screen {
        Screen::Playing if view.paused => draw_pause_overlay(frame, view.theme, area),
        Screen::Playing => {}
        Screen::GameOver => draw_game_over(frame, view, snap, area),
    }
    if row_fx.is_active() {
        row_fx.render(frame, board, view.theme.title, now);
    }
}

/// Playfield + sidebar centred in `area`. Returns the board rect (playfield without border).
fn draw_game(frame: &mut Frame, view: &View<'_>, snap: &Snapshot<'_>, area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size(view.dims);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board = draw_playfield(frame, view, snap, inner[0]);
    draw_sidebar(frame, view, snap, inner[1]);
    board
}

fn draw_playfield(frame: &mut Frame, view: &View<'_>, snap: &Snapshot<'_>, area: Rect) -> Rect {
    let theme = view.theme;
    let title = if snap.freeze_active {
        format!(" Blockdrop  FROZEN {:.1}s ", snap.freeze_remaining)
    } else {
        " Blockdrop ".to_string()
    };
    let border_fg = if snap.freeze_active {
        theme.block_color(BlockType::Freeze)
    } else {
        theme.div_line
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_fg).bg(theme.bg))
        .title(Span::styled(title, theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    let bg = Style::default().bg(theme.bg);
    for y in board.y..board.y + board.height {
        for x in board.x..board.x + board.width {
            buf[(x, y)].set_symbol(" ").set_style(bg);
        }
    }

    let mut paint = |col: i32, row: i32, glyph: &str, style: Style| {
        if let Some(r) = cell_rect(board, col, row) {
            buf.set_string(r.x, r.y, glyph, style);
        }
    };

    for b in snap.blocks {
        let fg = theme.block_color(b.kind);
        paint(b.col, b.row, block_glyph(b.kind), Style::default().fg(fg).bg(theme.bg));
    }
    // Falling cells dimmed slightly so settled and moving blocks read apart.
    for shape in snap.shapes {
        for (col, row, kind) in shape.grid_cells() {
            let fg = theme.block_color(kind);
            let style = Style::default().fg(fg).bg(theme.bg).add_modifier(Modifier::DIM);
            paint(col, row, block_glyph(kind), style);
        }
    }
    let (pc, pr) = view.player.anchor_cell();
    let player_style = Style::default()
        .fg(theme.player)
        .bg(theme.bg)
        .add_modifier(Modifier::BOLD);
    paint(pc, pr, "▐▌", player_style);

    board
}

fn section(frame: &mut Frame, area: Rect, border: Style, title: &str, title_style: Style) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {title} "), title_style));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    inner
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, snap: &Snapshot<'_>, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // time + best
            Constraint::Length(3), // freeze gauge
            Constraint::Length(6), // break cooldowns
            Constraint::Length(7), // best times
            Constraint::Fill(1),   // keys
        ])
        .split(area);

    let time = section(frame, chunks[0], border, "Survived", title_style);
    let best = view
        .high_scores
        .best()
        .map_or_else(|| "--:--.-".to_string(), format_time);
    Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled("Time: ", title_style),
            Span::styled(format_time(snap.elapsed), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(best, fg_style),
        ]),
    ]))
    .render(time, frame.buffer_mut());

    let freeze = section(frame, chunks[1], border, "Freeze", title_style);
    let ratio = if view.freeze_duration > 0.0 {
        f64::from(snap.freeze_remaining / view.freeze_duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Gauge::default()
        .ratio(ratio)
        .label(format!("{:.1}s", snap.freeze_remaining))
        .gauge_style(Style::default().fg(theme.block_color(BlockType::Freeze)).bg(theme.bg))
        .render(freeze, frame.buffer_mut());

    let breaks = section(frame, chunks[2], border, "Break", title_style);
    let lines: Vec<Line> = [
        (BreakDir::Left, "←"),
        (BreakDir::Right, "→"),
        (BreakDir::Up, "↑"),
        (BreakDir::Down, "↓"),
    ]
    .into_iter()
    .map(|(dir, arrow)| {
        let cd = snap.cooldowns.get(dir);
        Line::from(vec![
            Span::styled(format!("{arrow} "), title_style),
            Span::styled(
                cooldown_label(cd, view.break_cooldown),
                if cd > 0.0 { dim_style } else { fg_style },
            ),
        ])
    })
    .collect();
    Paragraph::new(Text::from(lines)).render(breaks, frame.buffer_mut());

    let board = section(frame, chunks[3], border, "Best times", title_style);
    let mut lines: Vec<Line> = view
        .high_scores
        .times()
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let style = if view.last_rank == Some(i + 1) {
                title_style.add_modifier(Modifier::BOLD)
            } else {
                fg_style
            };
            Line::from(Span::styled(format!("{}. {}", i + 1, format_time(t)), style))
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("no runs yet", dim_style)));
    }
    Paragraph::new(Text::from(lines)).render(board, frame.buffer_mut());

    let keys = section(frame, chunks[4], border, "Keys", title_style);
    Paragraph::new(Text::from(vec![
        Line::from(Span::styled("A/D H/L  walk", dim_style)),
        Line::from(Span::styled("Space W K jump", dim_style)),
        Line::from(Span::styled("Arrows   break", dim_style)),
        Line::from(Span::styled("P pause  Q quit", dim_style)),
    ]))
    .render(keys, frame.buffer_mut());
}

/// Cooldown text plus a bar showing how much of it is left.
fn cooldown_label(remaining: f32, full: f32) -> String {
    const BAR: usize = 10;
    if remaining <= 0.0 {
        return "ready".to_string();
    }
    let filled = if full > 0.0 {
        ((remaining / full).clamp(0.0, 1.0) * BAR as f32).ceil() as usize
    } else {
        BAR
    };
    format!("{}{} {:.2}s", "▮".repeat(filled), "▯".repeat(BAR - filled), remaining)
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View<'_>, snap: &Snapshot<'_>, area: Rect) {
    let theme = view.theme;
    let popup = popup_rect(area, 30, 9);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(theme.block_color(BlockType::Bomb)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Survived {} ", format_time(snap.elapsed)),
            Style::default().fg(theme.main_fg),
        )),
    ];
    match view.last_rank {
        Some(1) => lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))),
        Some(rank) => lines.push(Line::from(Span::styled(
            format!(" Rank #{rank} "),
            Style::default().fg(theme.title),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R: Restart    Q: Quit ",
        Style::default().fg(theme.main_fg),
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Blockdrop ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_map_to_two_columns() {
        let board = Rect::new(1, 1, 32, 20);
        assert_eq!(cell_rect(board, 0, 0), Some(Rect::new(1, 1, 2, 1)));
        assert_eq!(cell_rect(board, 15, 19), Some(Rect::new(31, 20, 2, 1)));
        assert_eq!(cell_rect(board, 16, 0), None);
        assert_eq!(cell_rect(board, 0, -1), None);
    }

    #[test]
    fn clipped_board_drops_cells() {
        let board = Rect::new(0, 0, 10, 4);
        assert!(cell_rect(board, 4, 3).is_some());
        assert!(cell_rect(board, 5, 0).is_none());
        assert!(cell_rect(board, 0, 4).is_none());
    }

    #[test]
    fn time_format() {
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(75.25), "01:15.2");
        assert_eq!(format_time(-3.0), "00:00.0");
    }

    #[test]
    fn cooldown_bar_shrinks() {
        assert_eq!(cooldown_label(0.0, 0.5), "ready");
        let full = cooldown_label(0.5, 0.5);
        assert!(full.starts_with("▮▮▮▮▮▮▮▮▮▮"));
        let half = cooldown_label(0.25, 0.5);
        assert_eq!(half.chars().filter(|&c| c == '▮').count(), 5);
    }

    #[test]
    fn row_fx_lifecycle() {
        let mut fx = RowClearFx::default();
        assert!(!fx.is_active());
        fx.start(&[18, 19]);
        assert!(fx.is_active());
        fx.finish_if_done();
        // No effect built yet, so nothing is done.
        assert!(fx.is_active());
        fx.clear();
        assert!(!fx.is_active());
    }

    #[test]
    fn outer_size_includes_border() {
        assert_eq!(playfield_outer_size(GridDims::default()), (34, 22));
        assert_eq!(playfield_outer_size(GridDims::new(200, 200)), (402, 202));
    }
}
