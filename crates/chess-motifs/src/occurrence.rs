use serde::{Deserialize, Serialize};

use chess_core::{ply_for, Color, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PinType {
    /// Pinned to the king; the piece may not legally leave the line.
    Absolute,
    /// Pinned to a more valuable piece.
    Relative,
}

impl PinType {
    pub fn as_str(self) -> &'static str {
        match self {
            PinType::Absolute => "ABSOLUTE",
            PinType::Relative => "RELATIVE",
        }
    }
}

/// One firing of a motif in one game.
///
/// Piece fields use letter-plus-square notation (`Ra4`, `ke8`); for
/// discovered attacks `moved_piece` also carries the origin (`Pf4f5`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifOccurrence {
    pub ply: u32,
    pub move_number: u32,
    pub side: Color,
    pub description: String,
    pub moved_piece: Option<String>,
    pub attacker: Option<String>,
    pub target: Option<String>,
    pub is_discovered: bool,
    pub is_mate: bool,
    pub pin_type: Option<PinType>,
}

impl MotifOccurrence {
    /// Occurrence attributed to the side that played `position.last_move`.
    /// `None` for the initial position.
    pub fn at(position: &Position, description: impl Into<String>) -> Option<Self> {
        let ply = position.ply()?;
        Some(Self::new(
            ply,
            position.move_number,
            position.mover(),
            description,
        ))
    }

    pub fn new(ply: u32, move_number: u32, side: Color, description: impl Into<String>) -> Self {
        Self {
            ply,
            move_number,
            side,
            description: description.into(),
            moved_piece: None,
            attacker: None,
            target: None,
            is_discovered: false,
            is_mate: false,
            pin_type: None,
        }
    }

    /// Attack fact for `side` at `move_number`, ply derived from both.
    pub fn attack(
        move_number: u32,
        side: Color,
        description: impl Into<String>,
        moved_piece: impl Into<String>,
        attacker: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(ply_for(move_number, side), move_number, side, description)
            .with_moved_piece(moved_piece)
            .with_attacker(attacker)
            .with_target(target)
    }

    pub fn with_moved_piece(mut self, moved_piece: impl Into<String>) -> Self {
        self.moved_piece = Some(moved_piece.into());
        self
    }

    pub fn with_attacker(mut self, attacker: impl Into<String>) -> Self {
        self.attacker = Some(attacker.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_pin_type(mut self, pin_type: PinType) -> Self {
        self.pin_type = Some(pin_type);
        self
    }

    pub fn discovered(mut self, is_discovered: bool) -> Self {
        self.is_discovered = is_discovered;
        self
    }

    pub fn mate(mut self, is_mate: bool) -> Self {
        self.is_mate = is_mate;
        self
    }

    /// Whether the target notation names a king of either color.
    pub fn targets_king(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| t.starts_with('K') || t.starts_with('k'))
    }
}
