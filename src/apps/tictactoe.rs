use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{App, AppContext, RenderContext};
use crate::components::{ButtonBar, Component};
use crate::ui::{UiFrame, rect_contains};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

const CELL_WIDTH: u16 = 5;
const CELL_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Mark),
    Tie,
}

/// Game rules, independent of drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Mark>; 9],
    turn: Mark,
    outcome: Option<Outcome>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [None; 9],
            turn: Mark::X,
            outcome: None,
        }
    }
}

impl Board {
    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    /// Place the current player's mark. Returns false for occupied cells or
    /// once the game is decided.
    pub fn play(&mut self, index: usize) -> bool {
        if self.outcome.is_some() || index >= 9 || self.cells[index].is_some() {
            return false;
        }
        self.cells[index] = Some(self.turn);
        self.outcome = self.evaluate();
        if self.outcome.is_none() {
            self.turn = self.turn.other();
        }
        true
    }

    fn evaluate(&self) -> Option<Outcome> {
        for [a, b, c] in LINES {
            if let Some(mark) = self.cells[a]
                && self.cells[b] == Some(mark)
                && self.cells[c] == Some(mark)
            {
                return Some(Outcome::Win(mark));
            }
        }
        if self.cells.iter().all(Option::is_some) {
            return Some(Outcome::Tie);
        }
        None
    }

    pub fn status(&self) -> String {
        match self.outcome {
            Some(Outcome::Win(mark)) => format!("Player {} wins!", mark.symbol()),
            Some(Outcome::Tie) => "It's a Tie!".to_string(),
            None => format!("Player {}'s turn", self.turn.symbol()),
        }
    }
}

pub struct TicTacToeApp {
    board: Board,
    cursor: usize,
    cells: [Rect; 9],
    reset: ButtonBar,
}

impl Default for TicTacToeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeApp {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            cursor: 4,
            cells: [Rect::default(); 9],
            reset: ButtonBar::new(["Reset Game"]),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn reset(&mut self) {
        self.board = Board::default();
        self.cursor = 4;
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let col = (self.cursor % 3) as isize + dx;
        let row = (self.cursor / 3) as isize + dy;
        if (0..3).contains(&col) && (0..3).contains(&row) {
            self.cursor = (row * 3 + col) as usize;
        }
    }
}

impl App for TicTacToeApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        self.cells = [Rect::default(); 9];
        let status = self.board.status();
        frame.set_string(area.x + 1, area.y, &status, palette.text());

        let grid_width = CELL_WIDTH * 3 + 2;
        let left = area.x + area.width.saturating_sub(grid_width) / 2;
        let top = area.y + 2;
        for index in 0..9 {
            let col = (index % 3) as u16;
            let row = (index / 3) as u16;
            let rect = Rect::new(
                left + col * (CELL_WIDTH + 1),
                top + row * CELL_HEIGHT,
                CELL_WIDTH,
                CELL_HEIGHT,
            );
            if rect.bottom() > area.bottom() || rect.right() > area.right() {
                continue;
            }
            let mut style = palette.button();
            if ctx.focused && index == self.cursor && self.board.outcome().is_none() {
                style = palette.selected();
            }
            frame.fill(rect, style);
            let symbol = self.board.cell(index).map(Mark::symbol).unwrap_or(" ");
            frame.set_string(
                rect.x + CELL_WIDTH / 2,
                rect.y + 1,
                symbol,
                style.add_modifier(Modifier::BOLD),
            );
            self.cells[index] = rect;
        }
        let bar_y = top + CELL_HEIGHT * 3 + 1;
        if bar_y < area.bottom() {
            let bar = Rect::new(area.x + 1, bar_y, area.width.saturating_sub(2), 1);
            self.reset.render(frame, bar, &ctx.component(false));
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &mut AppContext<'_>) -> bool {
        if self.reset.clicked(event).is_some() {
            self.reset();
            return true;
        }
        match event {
            Event::Mouse(mouse)
                if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) =>
            {
                let Some(index) = self
                    .cells
                    .iter()
                    .position(|r| rect_contains(*r, mouse.column, mouse.row))
                else {
                    return false;
                };
                self.cursor = index;
                self.board.play(index);
                true
            }
            Event::Key(key) => {
                match key.code {
                    KeyCode::Char(c @ '1'..='9') => {
                        let index = c as usize - '1' as usize;
                        self.cursor = index;
                        self.board.play(index);
                    }
                    KeyCode::Left => self.move_cursor(-1, 0),
                    KeyCode::Right => self.move_cursor(1, 0),
                    KeyCode::Up => self.move_cursor(0, -1),
                    KeyCode::Down => self.move_cursor(0, 1),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        self.board.play(self.cursor);
                    }
                    KeyCode::Char('r') => self.reset(),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{Harness, find};

    fn play_all(board: &mut Board, moves: &[usize]) {
        for &m in moves {
            assert!(board.play(m), "move {m} rejected");
        }
    }

    #[test]
    fn x_starts_and_turns_alternate() {
        let mut board = Board::default();
        assert_eq!(board.status(), "Player X's turn");
        board.play(0);
        assert_eq!(board.turn(), Mark::O);
        assert!(!board.play(0));
        assert_eq!(board.turn(), Mark::O);
    }

    #[test]
    fn win_locks_the_board() {
        let mut board = Board::default();
        play_all(&mut board, &[0, 3, 1, 4, 2]);
        assert_eq!(board.outcome(), Some(Outcome::Win(Mark::X)));
        assert_eq!(board.status(), "Player X wins!");
        assert!(!board.play(8));
    }

    #[test]
    fn full_board_without_line_is_a_tie() {
        let mut board = Board::default();
        play_all(&mut board, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(board.outcome(), Some(Outcome::Tie));
        assert_eq!(board.status(), "It's a Tie!");
    }

    #[test]
    fn keys_and_clicks_play_and_reset() {
        let mut h = Harness::new();
        let mut app = TicTacToeApp::new();
        let buffer = h.render(&mut app, 40, 16);
        h.key(&mut app, KeyCode::Char('5'));
        assert_eq!(app.board().cell(4), Some(Mark::X));
        let cell = app.cells[0];
        h.click(&mut app, cell.x, cell.y);
        assert_eq!(app.board().cell(0), Some(Mark::O));

        let (x, y) = find(&buffer, "[ Reset Game ]").unwrap();
        h.click(&mut app, x, y);
        assert_eq!(app.board(), &Board::default());
    }
}
