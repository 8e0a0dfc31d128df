//! Tactical motif detection over replayed chess games.
//!
//! Each [`MotifDetector`] scans the full position list of one game and
//! reports [`MotifOccurrence`]s. [`FeatureExtractor`] runs them all and
//! derives forks from the raw attack facts.

pub mod detector_trait;
pub mod detectors;
pub mod error;
pub mod extractor;
pub mod features;
pub mod motif;
pub mod occurrence;

pub use detector_trait::MotifDetector;
pub use error::ExtractError;
pub use extractor::{derive_fork, ExtractedGame, FeatureExtractor};
pub use features::{motif_plies, GameFeatures};
pub use motif::{Motif, MotifKind};
pub use occurrence::{MotifOccurrence, PinType};
