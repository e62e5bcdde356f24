use super::{SearchEngine, SearchParameters, TrailingBurst};
use crate::{
    burst::{Burst, BurstTable},
    error::BurstSearchError,
};
use burstsearch_common::{PhotonCount, PhotonIndex, Timestamp};
use tracing::trace;

/// A direct rendition of the burst search and photon counting algorithms.
///
/// The rate test is evaluated for every window up front, then scanned.
/// This is the engine the streaming engine is checked against.
#[derive(Default, Debug, Clone, Copy)]
pub struct ReferenceEngine;

impl SearchEngine for ReferenceEngine {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn find_bursts(
        &self,
        timestamps: &[Timestamp],
        parameters: &SearchParameters,
    ) -> Result<BurstTable, BurstSearchError> {
        let m = parameters.m();
        let above_min_rate: Vec<bool> = timestamps
            .iter()
            .zip(timestamps.iter().skip(m - 1))
            .map(|(first, last)| last - first <= parameters.max_span())
            .collect();

        let mut bursts = Vec::new();
        let mut burst_start: Option<PhotonIndex> = None;
        // First photon a new burst may start at, past the last emitted burst.
        let mut next_open: PhotonIndex = 0;
        for (i, &above) in above_min_rate.iter().enumerate() {
            match burst_start {
                None if above && i >= next_open => burst_start = Some(i),
                Some(i_start) if !above => {
                    // The last photon of this window is the first photon outside the burst,
                    // so the burst holds `i_end - i_start` photons.
                    let i_end = i + m - 1;
                    if i_end - i_start >= parameters.min_size() {
                        bursts.extend(Burst::from_span(timestamps, i_start, i_end - 1));
                        next_open = i_end;
                    }
                    burst_start = None;
                }
                _ => {}
            }
        }

        if let (Some(i_start), TrailingBurst::Flush) = (burst_start, parameters.trailing_burst())
        {
            let i_end = timestamps.len();
            if i_end - i_start >= parameters.min_size() {
                trace!("Flushing burst open at photon {i_start}");
                bursts.extend(Burst::from_span(timestamps, i_start, i_end - 1));
            }
        }

        Ok(BurstTable::from_sorted(bursts, timestamps.len()))
    }

    fn count_in_bursts(&self, bursts: &BurstTable, mask: &[bool]) -> Vec<PhotonCount> {
        bursts
            .iter()
            .map(|burst| {
                let selected = mask.get(burst.istart()..=burst.iend());
                debug_assert!(selected.is_some(), "burst {burst} lies outside the mask");
                selected.map_or(0, |selected| selected.iter().filter(|&&s| s).count())
            })
            .collect()
    }
}
