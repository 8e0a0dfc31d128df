//! SAN token parsing and resolution against a board.

use regex::Regex;

use crate::board::{Board, Move, MoveKind, Role, Square};
use crate::error::ChessError;

/// A SAN token split into its parts, before it is matched to a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanMove {
    Castle {
        king_side: bool,
    },
    Normal {
        role: Role,
        from_file: Option<u8>,
        from_rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
}

#[derive(Debug, Clone)]
pub struct SanParser {
    re: Regex,
}

impl SanParser {
    pub fn new() -> Result<Self, ChessError> {
        Ok(Self {
            re: Regex::new(r"^([KQRBN])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=?([QRBN]))?$")?,
        })
    }

    /// Parse a token such as `Nbd7`, `exd6`, `e8=Q+` or `O-O-O`.
    /// Check, mate and annotation suffixes are ignored.
    pub fn parse(&self, token: &str) -> Option<SanMove> {
        let body = token.trim_end_matches(['+', '#', '!', '?']);
        match body {
            "O-O" | "0-0" => return Some(SanMove::Castle { king_side: true }),
            "O-O-O" | "0-0-0" => return Some(SanMove::Castle { king_side: false }),
            _ => {}
        }

        let cap = self.re.captures(body)?;
        let role = cap
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .and_then(Role::from_char)
            .unwrap_or(Role::Pawn);
        let from_file = cap
            .get(2)
            .and_then(|m| m.as_str().bytes().next())
            .map(|b| b - b'a');
        let from_rank = cap
            .get(3)
            .and_then(|m| m.as_str().bytes().next())
            .map(|b| b - b'1');
        let to = Square::parse(cap.get(5)?.as_str())?;
        let promotion = cap
            .get(6)
            .and_then(|m| m.as_str().chars().next())
            .and_then(Role::from_char);

        Some(SanMove::Normal {
            role,
            from_file,
            from_rank,
            capture: cap.get(4).is_some(),
            to,
            promotion,
        })
    }
}

/// Match a parsed SAN move to exactly one move for the side to move.
///
/// Like pieces that can reach the target are narrowed by the file/rank hint
/// first, then by dropping candidates that would leave their own king in
/// check. Anything other than a single survivor is an error.
pub fn resolve(board: &Board, san: &SanMove) -> Result<Move, String> {
    match *san {
        SanMove::Castle { king_side } => resolve_castle(board, king_side),
        SanMove::Normal {
            role: Role::Pawn,
            from_file,
            capture,
            to,
            promotion,
            ..
        } => resolve_pawn(board, from_file, capture, to, promotion),
        SanMove::Normal {
            role,
            from_file,
            from_rank,
            to,
            promotion,
            ..
        } => {
            if promotion.is_some() {
                return Err("only pawns promote".to_string());
            }
            resolve_piece(board, role, from_file, from_rank, to)
        }
    }
}

fn resolve_castle(board: &Board, king_side: bool) -> Result<Move, String> {
    let color = board.side_to_move();
    let rank = color.back_rank();
    let (king_from, king_to, rook_file, kind) = if king_side {
        (Square::new(4, rank), Square::new(6, rank), 7, MoveKind::CastleKingSide)
    } else {
        (Square::new(4, rank), Square::new(2, rank), 0, MoveKind::CastleQueenSide)
    };
    let (Some(from), Some(to), Some(rook_sq)) = (king_from, king_to, Square::new(rook_file, rank))
    else {
        return Err("castling squares off board".to_string());
    };

    let king_home = board
        .piece_at(from)
        .is_some_and(|p| p.color == color && p.role == Role::King);
    let rook_home = board
        .piece_at(rook_sq)
        .is_some_and(|p| p.color == color && p.role == Role::Rook);
    if !king_home || !rook_home {
        return Err("king or rook not on its home square".to_string());
    }

    let (lo, hi) = if from < rook_sq {
        (from.file() + 1, rook_sq.file())
    } else {
        (rook_sq.file() + 1, from.file())
    };
    let blocked = (lo..hi).any(|file| {
        Square::new(file, rank)
            .and_then(|sq| board.piece_at(sq))
            .is_some()
    });
    if blocked {
        return Err("castling path is blocked".to_string());
    }

    Ok(Move {
        from,
        to,
        role: Role::King,
        promotion: None,
        kind,
    })
}

fn resolve_pawn(
    board: &Board,
    from_file: Option<u8>,
    capture: bool,
    to: Square,
    promotion: Option<Role>,
) -> Result<Move, String> {
    let color = board.side_to_move();
    let dir = color.pawn_direction();
    let last_rank = color.opposite().back_rank();

    if to.rank() == last_rank && promotion.is_none() {
        return Err("pawn reaches last rank without promotion".to_string());
    }
    if to.rank() != last_rank && promotion.is_some() {
        return Err("promotion before the last rank".to_string());
    }
    if matches!(promotion, Some(Role::King) | Some(Role::Pawn)) {
        return Err("invalid promotion piece".to_string());
    }

    let own_pawn = |sq: Square| {
        board
            .piece_at(sq)
            .is_some_and(|p| p.color == color && p.role == Role::Pawn)
    };

    if capture {
        let file = from_file.ok_or_else(|| "pawn capture without origin file".to_string())?;
        let from = Square::new(file, to.rank())
            .and_then(|sq| sq.offset(0, -dir))
            .filter(|&sq| own_pawn(sq))
            .ok_or_else(|| "no pawn can make this capture".to_string())?;
        if (from.file() as i8 - to.file() as i8).abs() != 1 {
            return Err("pawn capture must change file by one".to_string());
        }

        let kind = match board.piece_at(to) {
            Some(p) if p.color != color => MoveKind::Normal,
            Some(_) => return Err("cannot capture own piece".to_string()),
            None if board.en_passant() == Some(to) => MoveKind::EnPassant,
            None => return Err("nothing to capture".to_string()),
        };
        return Ok(Move {
            from,
            to,
            role: Role::Pawn,
            promotion,
            kind,
        });
    }

    if board.piece_at(to).is_some() {
        return Err("pawn push onto an occupied square".to_string());
    }
    let one_back = to
        .offset(0, -dir)
        .ok_or_else(|| "no pawn can reach this square".to_string())?;
    if own_pawn(one_back) {
        return Ok(Move {
            from: one_back,
            to,
            role: Role::Pawn,
            promotion,
            kind: MoveKind::Normal,
        });
    }

    let double_rank = color.back_rank() as i8 + 3 * dir;
    if board.piece_at(one_back).is_none() && to.rank() as i8 == double_rank {
        if let Some(two_back) = one_back.offset(0, -dir).filter(|&sq| own_pawn(sq)) {
            return Ok(Move {
                from: two_back,
                to,
                role: Role::Pawn,
                promotion: None,
                kind: MoveKind::DoublePush,
            });
        }
    }
    Err("no pawn can reach this square".to_string())
}

fn resolve_piece(
    board: &Board,
    role: Role,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    to: Square,
) -> Result<Move, String> {
    let color = board.side_to_move();
    if board.piece_at(to).is_some_and(|p| p.color == color) {
        return Err("destination holds own piece".to_string());
    }

    let candidates: Vec<Move> = board
        .pieces_of(color)
        .filter(|(sq, p)| {
            p.role == role
                && from_file.map_or(true, |f| sq.file() == f)
                && from_rank.map_or(true, |r| sq.rank() == r)
                && board.attacks_square(*sq, to)
        })
        .map(|(from, _)| Move {
            from,
            to,
            role,
            promotion: None,
            kind: MoveKind::Normal,
        })
        .collect();

    let mut legal = match candidates.len() {
        0 => return Err("no piece can reach this square".to_string()),
        1 => candidates,
        _ => candidates
            .into_iter()
            .filter(|mv| !board.leaves_king_attacked(mv))
            .collect(),
    };

    match legal.len() {
        1 => Ok(legal.remove(0)),
        0 => Err("every candidate is pinned".to_string()),
        _ => Err("ambiguous move".to_string()),
    }
}
