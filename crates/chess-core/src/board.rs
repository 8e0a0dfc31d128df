//! Board model and attack geometry.
//!
//! A decoded position is a flat 64-square array indexed `rank * 8 + file`
//! (a1 = 0, h8 = 63). Every query here is a pure function of the decoded
//! board; nothing is cached between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Piece values for material comparisons
pub const PAWN_VALUE: u32 = 1;
pub const KNIGHT_VALUE: u32 = 3;
pub const BISHOP_VALUE: u32 = 3;
pub const ROOK_VALUE: u32 = 5;
pub const QUEEN_VALUE: u32 = 9;
pub const KING_VALUE: u32 = 99;

/// Orthogonal ray directions as (file delta, rank delta).
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal ray directions as (file delta, rank delta).
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight ray directions. Also the king's step offsets.
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn from_white(white: bool) -> Color {
        if white {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn is_white(self) -> bool {
        self == Color::White
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Rank delta of a pawn push for this side.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Zero-based rank where this side's pieces start.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    pub fn value(self) -> u32 {
        match self {
            Role::Pawn => PAWN_VALUE,
            Role::Knight => KNIGHT_VALUE,
            Role::Bishop => BISHOP_VALUE,
            Role::Rook => ROOK_VALUE,
            Role::Queen => QUEEN_VALUE,
            Role::King => KING_VALUE,
        }
    }

    /// Ordinal strength P1 N2 B3 R4 Q5 K6. Unlike [`value`](Self::value)
    /// it ranks a bishop above a knight.
    pub fn rank(self) -> u32 {
        match self {
            Role::Pawn => 1,
            Role::Knight => 2,
            Role::Bishop => 3,
            Role::Rook => 4,
            Role::Queen => 5,
            Role::King => 6,
        }
    }

    pub fn upper_char(self) -> char {
        match self {
            Role::Pawn => 'P',
            Role::Knight => 'N',
            Role::Bishop => 'B',
            Role::Rook => 'R',
            Role::Queen => 'Q',
            Role::King => 'K',
        }
    }

    /// Case-insensitive piece letter lookup.
    pub fn from_char(c: char) -> Option<Role> {
        match c.to_ascii_uppercase() {
            'P' => Some(Role::Pawn),
            'N' => Some(Role::Knight),
            'B' => Some(Role::Bishop),
            'R' => Some(Role::Rook),
            'Q' => Some(Role::Queen),
            'K' => Some(Role::King),
            _ => None,
        }
    }

    pub fn is_slider(self) -> bool {
        matches!(self, Role::Bishop | Role::Rook | Role::Queen)
    }

    /// Whether a slider of this role moves along `dir`.
    pub fn slides_along(self, dir: (i8, i8)) -> bool {
        let diagonal = dir.0 != 0 && dir.1 != 0;
        match self {
            Role::Rook => !diagonal,
            Role::Bishop => diagonal,
            Role::Queen => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    pub const fn new(color: Color, role: Role) -> Piece {
        Piece { color, role }
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn letter(self) -> char {
        let c = self.role.upper_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let role = Role::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, role))
    }

    pub fn value(self) -> u32 {
        self.role.value()
    }

    pub fn rank(self) -> u32 {
        self.role.rank()
    }
}

/// Piece-plus-square notation used in occurrence records, e.g. `Ra4` or `ke8`.
pub fn notation(piece: Piece, square: Square) -> String {
    format!("{}{}", piece.letter(), square)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then(|| Square(rank * 8 + file))
    }

    const fn at(file: u8, rank: u8) -> Square {
        Square((rank & 7) * 8 + (file & 7))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::at(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Parse an algebraic square name such as `e4`.
    pub fn parse(name: &str) -> Option<Square> {
        let mut chars = name.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Square::new(file as u8 - b'a', rank as u8 - b'1')
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }

    /// a1, b1, ... h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..64).map(Square)
    }

    /// Reading order of a diagram: a8..h8, then a7..h7, down to h1.
    pub fn scan_order() -> impl Iterator<Item = Square> {
        (0u8..8)
            .rev()
            .flat_map(|rank| (0u8..8).map(move |file| Square::at(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    fn parse(field: &str) -> CastlingRights {
        CastlingRights {
            white_king_side: field.contains('K'),
            white_queen_side: field.contains('Q'),
            black_king_side: field.contains('k'),
            black_queen_side: field.contains('q'),
        }
    }

    fn to_fen_field(self) -> String {
        let mut out = String::new();
        if self.white_king_side {
            out.push('K');
        }
        if self.white_queen_side {
            out.push('Q');
        }
        if self.black_king_side {
            out.push('k');
        }
        if self.black_queen_side {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    fn clear(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_king_side = false;
                self.white_queen_side = false;
            }
            Color::Black => {
                self.black_king_side = false;
                self.black_queen_side = false;
            }
        }
    }

    /// Drop the right tied to a rook corner once anything leaves or lands on it.
    fn touch(&mut self, square: Square) {
        match (square.file(), square.rank()) {
            (0, 0) => self.white_queen_side = false,
            (7, 0) => self.white_king_side = false,
            (0, 7) => self.black_queen_side = false,
            (7, 7) => self.black_king_side = false,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    CastleKingSide,
    CastleQueenSide,
}

/// A fully resolved move: origin, destination and any special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub role: Role,
    pub promotion: Option<Role>,
    pub kind: MoveKind,
}

/// Occupancy of the eight squares around a king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KingNeighbourhood {
    pub empty: u8,
    pub own: u8,
    pub enemy: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn starting() -> Board {
        let back = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        let mut board = Board::empty();
        for (file, role) in back.into_iter().enumerate() {
            let file = file as u8;
            board.squares[Square::at(file, 0).index()] = Some(Piece::new(Color::White, role));
            board.squares[Square::at(file, 1).index()] = Some(Piece::new(Color::White, Role::Pawn));
            board.squares[Square::at(file, 6).index()] = Some(Piece::new(Color::Black, Role::Pawn));
            board.squares[Square::at(file, 7).index()] = Some(Piece::new(Color::Black, role));
        }
        board.castling = CastlingRights::parse("KQkq");
        board
    }

    /// Decode a FEN string. Only the placement field is required; missing
    /// trailing fields fall back to white to move, no castling, no en
    /// passant square and clocks `0 1`.
    pub fn from_fen(fen: &str) -> Result<Board, ChessError> {
        let mut fields = fen.split_whitespace();
        let placement = fields
            .next()
            .ok_or_else(|| ChessError::invalid_fen(fen, "empty"))?;

        let mut board = Board::empty();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::invalid_fen(
                fen,
                format!("expected 8 ranks, found {}", ranks.len()),
            ));
        }

        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file: u8 = 0;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(ChessError::invalid_fen(fen, format!("bad digit '{c}'")));
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| ChessError::invalid_fen(fen, format!("bad piece '{c}'")))?;
                    if file >= 8 {
                        return Err(ChessError::invalid_fen(fen, "rank overflows 8 files"));
                    }
                    board.squares[Square::at(file, rank).index()] = Some(piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(ChessError::invalid_fen(fen, "rank overflows 8 files"));
                }
            }
            if file != 8 {
                return Err(ChessError::invalid_fen(
                    fen,
                    format!("rank {} has {} files", rank + 1, file),
                ));
            }
        }

        board.side_to_move = match fields.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => {
                return Err(ChessError::invalid_fen(fen, format!("bad side '{other}'")))
            }
        };
        board.castling = fields.next().map(CastlingRights::parse).unwrap_or_default();
        board.en_passant = fields.next().and_then(Square::parse);
        board.halfmove_clock = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        board.fullmove_number = fields.next().and_then(|v| v.parse().ok()).unwrap_or(1);

        Ok(board)
    }

    /// The placement field of the FEN.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0u8..8).rev() {
            let mut empty = 0;
            for file in 0u8..8 {
                match self.squares[Square::at(file, rank).index()] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.letter());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    pub fn to_fen(&self) -> String {
        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let ep = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.placement(),
            side,
            self.castling.to_fen_field(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index()] = piece;
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// All pieces in diagram reading order (a8 first, h1 last).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::scan_order().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.role == Role::King)
            .map(|(sq, _)| sq)
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().count()
    }

    pub fn count(&self, color: Color, role: Role) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|p| p.color == color && p.role == role)
            .count()
    }

    pub fn has_queens(&self) -> bool {
        self.squares.iter().flatten().any(|p| p.role == Role::Queen)
    }

    /// Notation of whatever stands on `square`, e.g. `Nf3`.
    pub fn notation(&self, square: Square) -> Option<String> {
        self.piece_at(square).map(|p| notation(p, square))
    }

    /// Whether the piece on `from` attacks `to` given the current occupancy.
    pub fn attacks_square(&self, from: Square, to: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if from == to {
            return false;
        }
        let df = to.file() as i8 - from.file() as i8;
        let dr = to.rank() as i8 - from.rank() as i8;

        match piece.role {
            Role::Pawn => dr == piece.color.pawn_direction() && df.abs() == 1,
            Role::Knight => KNIGHT_OFFSETS.contains(&(df, dr)),
            Role::King => df.abs() <= 1 && dr.abs() <= 1,
            Role::Bishop | Role::Rook | Role::Queen => {
                if !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
                    return false;
                }
                let dir = (df.signum(), dr.signum());
                if !piece.role.slides_along(dir) {
                    return false;
                }
                self.path_clear(from, to, dir)
            }
        }
    }

    fn path_clear(&self, from: Square, to: Square, dir: (i8, i8)) -> bool {
        let mut current = from.offset(dir.0, dir.1);
        while let Some(sq) = current {
            if sq == to {
                return true;
            }
            if self.piece_at(sq).is_some() {
                return false;
            }
            current = sq.offset(dir.0, dir.1);
        }
        false
    }

    /// Every square the piece on `from` attacks.
    pub fn attacked_squares(&self, from: Square) -> Vec<Square> {
        Square::scan_order()
            .filter(|&to| self.attacks_square(from, to))
            .collect()
    }

    /// Squares of `by` pieces attacking `target`, in diagram reading order.
    pub fn attackers(&self, target: Square, by: Color) -> Vec<Square> {
        self.pieces_of(by)
            .filter(|&(sq, _)| self.attacks_square(sq, target))
            .map(|(sq, _)| sq)
            .collect()
    }

    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        self.pieces_of(by)
            .any(|(sq, _)| self.attacks_square(sq, target))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .map(|k| self.is_attacked(k, color.opposite()))
            .unwrap_or(false)
    }

    /// First occupied square walking from `from` along `dir`, exclusive.
    pub fn first_piece_along(&self, from: Square, dir: (i8, i8)) -> Option<(Square, Piece)> {
        let mut current = from.offset(dir.0, dir.1);
        while let Some(sq) = current {
            if let Some(piece) = self.piece_at(sq) {
                return Some((sq, piece));
            }
            current = sq.offset(dir.0, dir.1);
        }
        None
    }

    pub fn king_neighbourhood(&self, color: Color) -> Option<KingNeighbourhood> {
        let king = self.king_square(color)?;
        let mut hood = KingNeighbourhood::default();
        for (df, dr) in ALL_DIRECTIONS {
            let Some(sq) = king.offset(df, dr) else {
                continue;
            };
            match self.piece_at(sq) {
                None => hood.empty += 1,
                Some(p) if p.color == color => hood.own += 1,
                Some(_) => hood.enemy += 1,
            }
        }
        Some(hood)
    }

    /// Apply a resolved move for the side to move, updating castling rights,
    /// the en passant square and both clocks.
    pub fn play(&mut self, mv: &Move) {
        let color = self.side_to_move;
        let moving = Piece::new(color, mv.role);
        let capture = self.piece_at(mv.to).is_some() || mv.kind == MoveKind::EnPassant;

        match mv.kind {
            MoveKind::CastleKingSide | MoveKind::CastleQueenSide => {
                let rank = color.back_rank();
                let (rook_from, rook_to) = if mv.kind == MoveKind::CastleKingSide {
                    (Square::at(7, rank), Square::at(5, rank))
                } else {
                    (Square::at(0, rank), Square::at(3, rank))
                };
                let rook = self.piece_at(rook_from);
                self.set_piece(mv.from, None);
                self.set_piece(rook_from, None);
                self.set_piece(mv.to, Some(moving));
                self.set_piece(rook_to, rook);
            }
            MoveKind::EnPassant => {
                self.set_piece(Square::at(mv.to.file(), mv.from.rank()), None);
                self.set_piece(mv.from, None);
                self.set_piece(mv.to, Some(moving));
            }
            MoveKind::Normal | MoveKind::DoublePush => {
                let placed = mv
                    .promotion
                    .map(|role| Piece::new(color, role))
                    .unwrap_or(moving);
                self.set_piece(mv.from, None);
                self.set_piece(mv.to, Some(placed));
            }
        }

        if mv.role == Role::King {
            self.castling.clear(color);
        }
        self.castling.touch(mv.from);
        self.castling.touch(mv.to);

        self.en_passant = match mv.kind {
            MoveKind::DoublePush => mv.from.offset(0, color.pawn_direction()),
            _ => None,
        };
        self.halfmove_clock = if mv.role == Role::Pawn || capture {
            0
        } else {
            self.halfmove_clock + 1
        };
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = color.opposite();
    }

    /// Whether playing `mv` would leave the mover's own king attacked.
    pub fn leaves_king_attacked(&self, mv: &Move) -> bool {
        let color = self.side_to_move;
        let mut next = self.clone();
        next.play(mv);
        next.is_in_check(color)
    }
}
