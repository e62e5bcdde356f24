//! The burst data model.
//!
//! A [Burst] is one detected interval of elevated photon rate, and a [BurstTable]
//! is the ordered collection of bursts found in one timestamp sequence.
//! Fields are only reachable through named accessors, so no caller depends on
//! the row layout.
mod table;

pub use table::BurstTable;

use burstsearch_common::{PhotonIndex, Timestamp};
use std::fmt::{Display, Formatter, Result};

/// One row of a [BurstTable].
///
/// Only the index span and the two boundary times are stored: the width and
/// size are derived, so `iend - istart + 1 == size` always holds.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Burst {
    start: Timestamp,
    end: Timestamp,
    istart: PhotonIndex,
    iend: PhotonIndex,
}

impl Burst {
    /// Creates a burst covering the photons `istart..=iend`, whose first and last
    /// photons arrive at `start` and `end`.
    /// Returns `None` if the span is inverted, in index or in time.
    pub fn new(
        istart: PhotonIndex,
        iend: PhotonIndex,
        start: Timestamp,
        end: Timestamp,
    ) -> Option<Self> {
        (istart <= iend && start <= end).then_some(Self {
            start,
            end,
            istart,
            iend,
        })
    }

    /// Creates a burst spanning `istart..=iend`, reading its times from `timestamps`.
    pub(crate) fn from_span(
        timestamps: &[Timestamp],
        istart: PhotonIndex,
        iend: PhotonIndex,
    ) -> Option<Self> {
        Self::new(
            istart,
            iend,
            *timestamps.get(istart)?,
            *timestamps.get(iend)?,
        )
    }

    /// Time of the first photon in the burst.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Time of the last photon in the burst.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Burst duration in clock ticks.
    pub fn width(&self) -> Timestamp {
        self.end - self.start
    }

    /// Number of photons in the burst.
    pub fn size(&self) -> usize {
        self.iend - self.istart + 1
    }

    /// Index of the first photon in the burst.
    pub fn istart(&self) -> PhotonIndex {
        self.istart
    }

    /// Index of the last photon in the burst.
    pub fn iend(&self) -> PhotonIndex {
        self.iend
    }

    /// Photon rate inside the burst, in photons per clock tick.
    /// Bursts whose photons all share one timestamp have no defined rate.
    pub fn ph_rate(&self) -> Option<f64> {
        let width = self.width();
        (width > 0).then(|| self.size() as f64 / width as f64)
    }

    /// The fixed six-column layout, in the order
    /// `(start_time, width, size, start_index, end_index, end_time)`.
    pub fn to_row(&self) -> [i64; 6] {
        [
            self.start,
            self.width(),
            self.size() as i64,
            self.istart as i64,
            self.iend as i64,
            self.end,
        ]
    }
}

impl Display for Burst {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "[{}, {}] ({} photons, indices {}..={})",
            self.start,
            self.end,
            self.size(),
            self.istart,
            self.iend
        )
    }
}
