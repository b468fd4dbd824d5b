use crate::game::Status;
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// The players available in connect 4.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    Red,
    Yellow,
}

impl Player {
    /// Returns the next player in the turn sequence.
    pub fn next(self) -> Self {
        match self {
            Self::Red => Self::Yellow,
            Self::Yellow => Self::Red,
        }
    }

    /// Returns +1 for the maximising player (Yellow) and -1 for Red.
    pub fn sign(self) -> i32 {
        match self {
            Self::Red => -1,
            Self::Yellow => 1,
        }
    }

    /// The single character used for this player in board files.
    pub fn symbol(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Yellow => 'Y',
        }
    }

    /// Parses a board-file symbol back into a player.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Red),
            'Y' => Some(Self::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The moves available in connect 4. This number references the column that
/// the player is placing their next piece in.
pub type Column = u8;

/// The move errors possible in connect 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("move {0} is out of range")]
    OutOfRange(Column),
    #[error("column {0} is full")]
    ColumnFull(Column),
    #[error("no move left to undo")]
    NothingToUndo,
    #[error("undo of column {got} does not match the last move ({expected})")]
    OutOfOrder { expected: Column, got: Column },
}

/// Returned when a set-up position has a disc resting on an empty cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("disc at column {column}, row {row} has nothing beneath it")]
pub struct FloatingDisc {
    pub column: Column,
    pub row: usize,
}

pub const WIDTH: usize = 7;
pub const HEIGHT: usize = 6;
pub const CELLS: usize = WIDTH * HEIGHT;
const CONNECT_LEN: usize = 4;

/// Grid cells, indexed `[column][row]` with row 0 at the bottom.
pub type Grid = [[Option<Player>; HEIGHT]; WIDTH];

/// The connect 4 game state.
///
/// The board is mutated in place: `drop` pushes a disc and `undo` pops it
/// again. Every drop is recorded so that undo can verify strict LIFO order.
/// Slots of `history` at or beyond `moves` are always zero, which keeps the
/// derived equality bit-for-bit after any drop/undo round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    turn: Player,
    board: Grid,
    heights: [u8; WIDTH],
    history: [Column; CELLS],
    moves: usize,
}

#[derive(Clone, Copy)]
struct Point(usize, usize);
#[derive(Clone, Copy)]
struct PointDirection(isize, isize);

const DIRECTIONS: [PointDirection; 4] = [
    PointDirection(1, 0),
    PointDirection(1, 1),
    PointDirection(0, 1),
    PointDirection(-1, 1),
];

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Constructs an empty board with Red to move.
    pub fn new() -> Self {
        Self::with_turn(Player::Red)
    }

    /// Constructs an empty board with the given player to move.
    pub fn with_turn(turn: Player) -> Self {
        Board {
            turn,
            board: [[None; HEIGHT]; WIDTH],
            heights: [0; WIDTH],
            history: [0; CELLS],
            moves: 0,
        }
    }

    /// Constructs a set-up position from raw cells. The discs already on the
    /// board are not part of the move history and cannot be undone.
    pub fn from_grid(turn: Player, board: Grid) -> Result<Self, FloatingDisc> {
        let mut heights = [0; WIDTH];
        for (col, cells) in board.iter().enumerate() {
            let height = cells.iter().take_while(|cell| cell.is_some()).count();
            if let Some(row) = (height..HEIGHT).find(|&row| cells[row].is_some()) {
                return Err(FloatingDisc {
                    column: col as Column,
                    row,
                });
            }
            heights[col] = height as u8;
        }

        Ok(Board {
            turn,
            board,
            heights,
            history: [0; CELLS],
            moves: 0,
        })
    }

    /// Returns the player whose disc the next drop places.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Returns the disc at the given cell, if any.
    pub fn cell(&self, col: usize, row: usize) -> Option<Player> {
        self.board[col][row]
    }

    /// Returns how many discs are stacked in the column.
    pub fn height(&self, col: Column) -> usize {
        self.heights[col as usize] as usize
    }

    /// Returns the number of drops applied since construction.
    pub fn moves_played(&self) -> usize {
        self.moves
    }

    /// Returns the most recently dropped column, if any drop is pending undo.
    pub fn last_move(&self) -> Option<Column> {
        self.moves.checked_sub(1).map(|i| self.history[i])
    }

    pub fn is_legal(&self, col: Column) -> bool {
        (col as usize) < WIDTH && self.heights[col as usize] < HEIGHT as u8
    }

    /// Bit `c` is set when column `c` still has room.
    pub fn legal_mask(&self) -> u8 {
        (0..WIDTH as Column)
            .filter(|&col| self.is_legal(col))
            .fold(0, |mask, col| mask | (1 << col))
    }

    /// Returns the columns that are not full, in ascending order.
    pub fn legal_moves(&self) -> Vec<Column> {
        (0..WIDTH as Column)
            .filter(|&col| self.is_legal(col))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&h| h as usize == HEIGHT)
    }

    /// Places the current player's disc on top of the column and passes the
    /// turn.
    pub fn drop(&mut self, col: Column) -> Result<(), MoveError> {
        let col_i = col as usize;
        if col_i >= WIDTH {
            return Err(MoveError::OutOfRange(col));
        }

        let row = self.heights[col_i] as usize;
        if row >= HEIGHT {
            return Err(MoveError::ColumnFull(col));
        }

        self.board[col_i][row] = Some(self.turn);
        self.heights[col_i] += 1;
        self.history[self.moves] = col;
        self.moves += 1;
        self.turn = self.turn.next();
        Ok(())
    }

    /// Removes the disc placed by the most recent drop, which must have been
    /// into `col`.
    pub fn undo(&mut self, col: Column) -> Result<(), MoveError> {
        if col as usize >= WIDTH {
            return Err(MoveError::OutOfRange(col));
        }
        match self.last_move() {
            None => Err(MoveError::NothingToUndo),
            Some(expected) if expected != col => Err(MoveError::OutOfOrder { expected, got: col }),
            Some(_) => {
                self.pop();
                Ok(())
            }
        }
    }

    /// Undoes the most recent drop, whatever column it was.
    fn pop(&mut self) -> Option<Column> {
        let col = self.last_move()?;
        self.moves -= 1;
        self.history[self.moves] = 0;

        let col_i = col as usize;
        self.heights[col_i] -= 1;
        self.board[col_i][self.heights[col_i] as usize] = None;
        self.turn = self.turn.next();
        Some(col)
    }

    /// Classifies the position after a drop into `col`. Only the four lines
    /// through the top disc of that column are inspected.
    pub fn terminal_status(&self, col: Column) -> Status {
        let col_i = col as usize;
        if col_i < WIDTH && self.heights[col_i] > 0 {
            let row = self.heights[col_i] as usize - 1;
            if let Some(ply) = self.board[col_i][row] {
                if self.wins_through(Point(col_i, row), ply) {
                    return Status::won_by(ply);
                }
            }
        }

        if self.is_full() {
            Status::Draw
        } else {
            Status::Ongoing
        }
    }

    /// Classifies the position by scanning every disc. Used for set-up
    /// positions where no last move is known.
    pub fn scan_status(&self) -> Status {
        // Yellow is checked first should both players somehow have a line.
        for &ply in &[Player::Yellow, Player::Red] {
            for col in 0..WIDTH {
                for row in 0..self.heights[col] as usize {
                    if self.board[col][row] == Some(ply) && self.wins_through(Point(col, row), ply) {
                        return Status::won_by(ply);
                    }
                }
            }
        }

        if self.is_full() {
            Status::Draw
        } else {
            Status::Ongoing
        }
    }

    /// Opens a scope whose drops are all undone when it goes out of scope.
    pub fn scope(&mut self) -> MoveScope<'_> {
        MoveScope {
            board: self,
            applied: 0,
        }
    }

    fn wins_through(&self, start: Point, player: Player) -> bool {
        DIRECTIONS.iter().any(|&dir| {
            // Counts the number of pieces that are the same in the given
            // direction and its reverse.
            let count = 1
                + self.count_line_from(start, dir, player, false)
                + self.count_line_from(start, dir, player, true);
            count >= CONNECT_LEN
        })
    }

    /// Counts the number of pieces that are the same from the given direction.
    fn count_line_from(&self, start: Point, dir: PointDirection, player: Player, rev: bool) -> usize {
        let mut count = 0;
        for dist in 1..CONNECT_LEN as isize {
            match Self::get_point_from(start, dir, dist, rev) {
                Some(Point(col, row)) if self.board[col][row] == Some(player) => count += 1,
                _ => break,
            }
        }

        count
    }

    /// Gets a point on the board in a given direction & distance away from the
    /// centre point.
    fn get_point_from(start: Point, dir: PointDirection, dist: isize, rev: bool) -> Option<Point> {
        let Point(col_i, row_i) = start;
        let PointDirection(col_d, row_d) = dir;

        let (c_d, r_d) = if rev {
            (-col_d * dist, -row_d * dist)
        } else {
            (col_d * dist, row_d * dist)
        };

        let n_col = col_i as isize + c_d;
        let n_row = row_i as isize + r_d;

        if (0..WIDTH as isize).contains(&n_col) && (0..HEIGHT as isize).contains(&n_row) {
            Some(Point(n_col as usize, n_row as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            write!(f, "|")?;
            for col in 0..WIDTH {
                match self.board[col][row] {
                    Some(ply) => write!(f, " {} |", ply)?,
                    None => write!(f, "   |")?,
                }
            }
            writeln!(f)?;
        }

        write!(f, "{}", "-".repeat(WIDTH * 4 + 1))
    }
}

/// A window of drops on a board. Every drop made through the scope is undone,
/// newest first, when the scope is dropped, including on early return or
/// error.
pub struct MoveScope<'a> {
    board: &'a mut Board,
    applied: usize,
}

impl MoveScope<'_> {
    /// Drops into `col` and reports the resulting status.
    pub fn play(&mut self, col: Column) -> Result<Status, MoveError> {
        self.board.drop(col)?;
        self.applied += 1;
        Ok(self.board.terminal_status(col))
    }

    /// Returns how many drops this scope will undo.
    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl Deref for MoveScope<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for MoveScope<'_> {
    fn drop(&mut self) {
        for _ in 0..self.applied {
            self.board.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(turn: Player, moves: &[Column]) -> Board {
        let mut board = Board::with_turn(turn);
        for &mv in moves {
            board.drop(mv).unwrap();
        }
        board
    }

    /// Full board with columns patterned A A B B A A B, where A starts with
    /// Red and B with Yellow. No line of four exists anywhere.
    fn drawn_board() -> Board {
        let starts = [0, 0, 1, 1, 0, 0, 1];
        let mut grid: Grid = [[None; HEIGHT]; WIDTH];
        for col in 0..WIDTH {
            for row in 0..HEIGHT {
                grid[col][row] = Some(if (row + starts[col]) % 2 == 0 {
                    Player::Red
                } else {
                    Player::Yellow
                });
            }
        }
        Board::from_grid(Player::Red, grid).unwrap()
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.legal_moves(), (0..7).collect::<Vec<_>>());
        assert_eq!(board.legal_mask(), 0x7F);
        assert_eq!(board.turn(), Player::Red);
        assert_eq!(board.scan_status(), Status::Ongoing);
        assert_eq!(board.last_move(), None);
    }

    #[test]
    fn test_drop_stacks_and_alternates() {
        let mut board = Board::with_turn(Player::Yellow);
        board.drop(3).unwrap();
        board.drop(3).unwrap();

        assert_eq!(board.cell(3, 0), Some(Player::Yellow));
        assert_eq!(board.cell(3, 1), Some(Player::Red));
        assert_eq!(board.height(3), 2);
        assert_eq!(board.turn(), Player::Yellow);
        assert_eq!(board.last_move(), Some(3));
    }

    #[test]
    fn test_full_column_is_not_legal() {
        let mut board = board_from(Player::Red, &[2; HEIGHT]);

        assert!(!board.legal_moves().contains(&2));
        assert_eq!(board.legal_mask() & (1 << 2), 0);
        assert_eq!(board.drop(2), Err(MoveError::ColumnFull(2)));
        assert_eq!(board.drop(7), Err(MoveError::OutOfRange(7)));
    }

    #[test]
    fn test_drop_undo_round_trip() {
        let original = board_from(Player::Red, &[3, 3, 2]);
        let mut board = original.clone();
        let moves = [0, 1, 1, 6, 3, 5, 0];

        for &mv in &moves {
            board.drop(mv).unwrap();
        }
        for &mv in moves.iter().rev() {
            board.undo(mv).unwrap();
        }

        assert_eq!(board, original);
    }

    #[test]
    fn test_undo_rejects_wrong_order() {
        let mut board = board_from(Player::Red, &[0, 1]);
        assert_eq!(
            board.undo(0),
            Err(MoveError::OutOfOrder {
                expected: 1,
                got: 0
            })
        );
        board.undo(1).unwrap();
        board.undo(0).unwrap();
        assert_eq!(board.undo(0), Err(MoveError::NothingToUndo));
    }

    #[test]
    fn test_set_up_discs_cannot_be_undone() {
        let mut grid: Grid = [[None; HEIGHT]; WIDTH];
        grid[4][0] = Some(Player::Red);
        let mut board = Board::from_grid(Player::Yellow, grid).unwrap();

        assert_eq!(board.height(4), 1);
        assert_eq!(board.undo(4), Err(MoveError::NothingToUndo));
    }

    #[test]
    fn test_floating_disc_rejected() {
        let mut grid: Grid = [[None; HEIGHT]; WIDTH];
        grid[1][2] = Some(Player::Red);
        assert_eq!(
            Board::from_grid(Player::Red, grid),
            Err(FloatingDisc { column: 1, row: 2 })
        );
    }

    #[test]
    fn test_horizontal_win() {
        // Yellow: 0, 1, 2, 3 along the bottom row. Red stacks on column 6.
        let board = board_from(Player::Yellow, &[0, 6, 1, 6, 2, 6, 3]);
        assert_eq!(board.terminal_status(3), Status::YellowWin);
        assert_eq!(board.scan_status(), Status::YellowWin);
    }

    #[test]
    fn test_vertical_win() {
        let board = board_from(Player::Red, &[0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(board.terminal_status(0), Status::RedWin);
    }

    #[test]
    fn test_rising_diagonal_win() {
        // Red climbs (0,0) (1,1) (2,2) (3,3).
        let board = board_from(Player::Red, &[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
        assert_eq!(board.terminal_status(3), Status::RedWin);
    }

    #[test]
    fn test_falling_diagonal_win() {
        // Red descends (0,3) (1,2) (2,1) (3,0), completed in the middle.
        let board = board_from(Player::Red, &[3, 2, 1, 1, 1, 0, 0, 0, 0, 6, 2]);
        assert_eq!(board.cell(2, 1), Some(Player::Red));
        assert_eq!(board.terminal_status(2), Status::RedWin);
    }

    #[test]
    fn test_win_is_scoped_to_last_move() {
        // Three in a row is not a win; the column checked must hold the line.
        let board = board_from(Player::Yellow, &[0, 6, 1, 6, 2]);
        assert_eq!(board.terminal_status(2), Status::Ongoing);
        assert_eq!(board.terminal_status(6), Status::Ongoing);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = drawn_board();
        assert!(board.is_full());
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.scan_status(), Status::Draw);
        for col in 0..WIDTH as Column {
            assert_eq!(board.terminal_status(col), Status::Draw);
        }
    }

    #[test]
    fn test_scope_undoes_on_exit() {
        let mut board = board_from(Player::Red, &[3]);
        let before = board.clone();
        {
            let mut scope = board.scope();
            scope.play(3).unwrap();
            scope.play(4).unwrap();
            assert_eq!(scope.applied(), 2);
            assert_eq!(scope.height(3), 2);
            assert!(scope.play(9).is_err());
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_display() {
        let board = board_from(Player::Red, &[0]);
        let text = board.to_string();
        assert!(text.lines().nth(HEIGHT - 1).unwrap().starts_with("| R |"));
        assert_eq!(text.lines().count(), HEIGHT + 1);
    }
}
