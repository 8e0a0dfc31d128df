//! Base trait for motif detectors.

use chess_core::Position;

use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

/// Trait that all detectors implement.
///
/// Detectors are stateless: the same positions always give the same
/// occurrences, and one instance may be shared across threads.
pub trait MotifDetector: Send + Sync {
    /// Motif this detector reports.
    fn motif(&self) -> Motif;

    /// Scan a whole game, initial position first.
    fn detect(&self, positions: &[Position]) -> Vec<MotifOccurrence>;
}
