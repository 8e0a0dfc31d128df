use std::fmt;

use serde::{Deserialize, Serialize};

/// How a motif reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotifKind {
    /// Written directly by a detector.
    Stored,
    /// Rebuilt from `Attack` facts at query time.
    AttackDerived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Motif {
    Pin,
    CrossPin,
    Fork,
    Skewer,
    DiscoveredAttack,
    DiscoveredCheck,
    Check,
    Checkmate,
    Promotion,
    PromotionWithCheck,
    PromotionWithCheckmate,
    BackRankMate,
    SmotheredMate,
    Zugzwang,
    DoubleCheck,
    OverloadedPiece,
    Sacrifice,
    Interference,
    Attack,
}

impl Motif {
    pub const ALL: [Motif; 19] = [
        Motif::Pin,
        Motif::CrossPin,
        Motif::Fork,
        Motif::Skewer,
        Motif::DiscoveredAttack,
        Motif::DiscoveredCheck,
        Motif::Check,
        Motif::Checkmate,
        Motif::Promotion,
        Motif::PromotionWithCheck,
        Motif::PromotionWithCheckmate,
        Motif::BackRankMate,
        Motif::SmotheredMate,
        Motif::Zugzwang,
        Motif::DoubleCheck,
        Motif::OverloadedPiece,
        Motif::Sacrifice,
        Motif::Interference,
        Motif::Attack,
    ];

    /// Motifs with a `has_<name>` flag column in `game_features`.
    pub const FLAG_COLUMNS: [Motif; 11] = [
        Motif::Pin,
        Motif::CrossPin,
        Motif::Fork,
        Motif::Skewer,
        Motif::DiscoveredAttack,
        Motif::DiscoveredCheck,
        Motif::Check,
        Motif::Checkmate,
        Motif::Promotion,
        Motif::PromotionWithCheck,
        Motif::PromotionWithCheckmate,
    ];

    /// Lowercase name used in queries, e.g. `back_rank_mate`.
    pub fn name(self) -> &'static str {
        match self {
            Motif::Pin => "pin",
            Motif::CrossPin => "cross_pin",
            Motif::Fork => "fork",
            Motif::Skewer => "skewer",
            Motif::DiscoveredAttack => "discovered_attack",
            Motif::DiscoveredCheck => "discovered_check",
            Motif::Check => "check",
            Motif::Checkmate => "checkmate",
            Motif::Promotion => "promotion",
            Motif::PromotionWithCheck => "promotion_with_check",
            Motif::PromotionWithCheckmate => "promotion_with_checkmate",
            Motif::BackRankMate => "back_rank_mate",
            Motif::SmotheredMate => "smothered_mate",
            Motif::Zugzwang => "zugzwang",
            Motif::DoubleCheck => "double_check",
            Motif::OverloadedPiece => "overloaded_piece",
            Motif::Sacrifice => "sacrifice",
            Motif::Interference => "interference",
            Motif::Attack => "attack",
        }
    }

    /// Value stored in `motif_occurrences.motif`, e.g. `BACK_RANK_MATE`.
    pub fn db_value(self) -> &'static str {
        match self {
            Motif::Pin => "PIN",
            Motif::CrossPin => "CROSS_PIN",
            Motif::Fork => "FORK",
            Motif::Skewer => "SKEWER",
            Motif::DiscoveredAttack => "DISCOVERED_ATTACK",
            Motif::DiscoveredCheck => "DISCOVERED_CHECK",
            Motif::Check => "CHECK",
            Motif::Checkmate => "CHECKMATE",
            Motif::Promotion => "PROMOTION",
            Motif::PromotionWithCheck => "PROMOTION_WITH_CHECK",
            Motif::PromotionWithCheckmate => "PROMOTION_WITH_CHECKMATE",
            Motif::BackRankMate => "BACK_RANK_MATE",
            Motif::SmotheredMate => "SMOTHERED_MATE",
            Motif::Zugzwang => "ZUGZWANG",
            Motif::DoubleCheck => "DOUBLE_CHECK",
            Motif::OverloadedPiece => "OVERLOADED_PIECE",
            Motif::Sacrifice => "SACRIFICE",
            Motif::Interference => "INTERFERENCE",
            Motif::Attack => "ATTACK",
        }
    }

    pub fn from_name(name: &str) -> Option<Motif> {
        Motif::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn kind(self) -> MotifKind {
        match self {
            Motif::Fork
            | Motif::DiscoveredAttack
            | Motif::DiscoveredCheck
            | Motif::Checkmate
            | Motif::DoubleCheck => MotifKind::AttackDerived,
            _ => MotifKind::Stored,
        }
    }

    /// Every motif except the raw `Attack` fact can appear in a query.
    pub fn is_queryable(self) -> bool {
        self != Motif::Attack
    }

    pub fn has_flag_column(self) -> bool {
        Motif::FLAG_COLUMNS.contains(&self)
    }
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
