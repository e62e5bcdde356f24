use burstsearch_common::{PhotonIndex, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Window size m must be at least 1")]
    ZeroWindowSize,
    #[error("Maximum window span T must be non-negative, got {0}")]
    NegativeMaxSpan(Timestamp),
    #[error("Minimum burst size L must be at least 1")]
    ZeroMinimumSize,
    #[error("Cannot search {len} timestamps with a window of {m} photons")]
    TooFewTimestamps { len: usize, m: usize },
    #[error("Cannot parse search parameters: {0}")]
    Parse(String),
    #[error("Photon selection must select at least one excitation period")]
    EmptyPhotonSelection,
    #[error("Unknown photon selection '{0}'")]
    UnknownPhotonSelection(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Burst {index} ends at photon {iend} before it starts at photon {istart}")]
    InvertedBurst {
        index: usize,
        istart: PhotonIndex,
        iend: PhotonIndex,
    },
    #[error("Burst {index} ends at time {end} before it starts at time {start}")]
    InvertedTimes {
        index: usize,
        start: Timestamp,
        end: Timestamp,
    },
    #[error("Burst {index} overlaps or precedes the burst before it")]
    Unordered { index: usize },
    #[error("Burst {index} refers to photon {iend}, but the sequence has {num_photons} photons")]
    OutOfRange {
        index: usize,
        iend: PhotonIndex,
        num_photons: usize,
    },
    #[error("Burst tables index different sequences ({left} and {right} photons)")]
    SourceMismatch { left: usize, right: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BurstSearchError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
    #[error("Selection mask has {mask} entries, but the bursts index {photons} photons")]
    DimensionMismatch { mask: usize, photons: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] TableError),
}
