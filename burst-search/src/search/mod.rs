//! Sliding window burst search and photon counting.
//!
//! Both operations are provided by a [SearchEngine]. Two engines are available
//! and must give identical results: [ReferenceEngine], which follows the
//! algorithm step by step, and [StreamingEngine], which avoids the transient
//! per-window storage. A caller typically picks one through [Implementation]:
//! ```rust
//! use burst_search::{Implementation, SearchParameters};
//!
//! let timestamps = [0, 1, 2, 3, 10, 20, 30];
//! let parameters = SearchParameters::new(2, 1, 2).unwrap();
//! let engine = Implementation::Streaming.engine();
//! let bursts = engine.search(&timestamps, &parameters).unwrap();
//! assert_eq!(bursts.sizes(), vec![4]);
//! ```
mod parameters;
mod reference;
mod streaming;

pub use parameters::{SearchParameters, TrailingBurst};
pub use reference::ReferenceEngine;
pub use streaming::StreamingEngine;

use crate::{
    burst::{Burst, BurstTable},
    error::BurstSearchError,
};
use burstsearch_common::{PhotonCount, PhotonIndex, Timestamp};
use rayon::prelude::*;
use strum::{Display, EnumString};
use tracing::debug;

pub trait SearchEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs the scan. `timestamps` is at least `parameters.m()` long.
    fn find_bursts(
        &self,
        timestamps: &[Timestamp],
        parameters: &SearchParameters,
    ) -> Result<BurstTable, BurstSearchError>;

    /// Counts the selected photons in each burst.
    /// `mask` has one entry per photon of the sequence `bursts` was found in.
    fn count_in_bursts(&self, bursts: &BurstTable, mask: &[bool]) -> Vec<PhotonCount>;

    /// Finds the bursts in a sorted sequence of timestamps.
    /// Fails if the sequence cannot hold a single window of `m` photons.
    #[tracing::instrument(skip_all, fields(engine = self.name(), num_photons = timestamps.len(), num_bursts))]
    fn search(
        &self,
        timestamps: &[Timestamp],
        parameters: &SearchParameters,
    ) -> Result<BurstTable, BurstSearchError> {
        parameters.check_length(timestamps.len())?;
        debug_assert!(timestamps.is_sorted(), "timestamps must be sorted");

        let bursts = self.find_bursts(timestamps, parameters)?;
        tracing::Span::current().record("num_bursts", bursts.len());
        Ok(bursts)
    }

    /// Counts, for each burst, the photons selected by `mask`.
    fn count_selected(
        &self,
        bursts: &BurstTable,
        mask: &[bool],
    ) -> Result<Vec<PhotonCount>, BurstSearchError> {
        if mask.len() != bursts.num_photons() {
            return Err(BurstSearchError::DimensionMismatch {
                mask: mask.len(),
                photons: bursts.num_photons(),
            });
        }
        Ok(self.count_in_bursts(bursts, mask))
    }

    /// Applies [SearchEngine::count_selected] to each table and mask pair.
    /// The pairs are independent, so they are counted in parallel.
    fn count_selected_batch(
        &self,
        items: &[(&BurstTable, &[bool])],
    ) -> Result<Vec<Vec<PhotonCount>>, BurstSearchError> {
        items
            .par_iter()
            .map(|(bursts, mask)| self.count_selected(bursts, mask))
            .collect()
    }
}

/// Selects which engine performs the search.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Implementation {
    Reference,
    #[default]
    Streaming,
}

impl Implementation {
    pub fn engine(self) -> &'static dyn SearchEngine {
        match self {
            Implementation::Reference => &ReferenceEngine,
            Implementation::Streaming => &StreamingEngine,
        }
    }
}

/// Searches only the photons selected by `mask`.
///
/// The resulting bursts index the full sequence: each burst runs from the first
/// to the last selected photon it contains, and its size counts every photon in
/// between, selected or not. Use [SearchEngine::count_selected] with `mask` to
/// recover the number of selected photons.
pub fn search_selection(
    engine: &dyn SearchEngine,
    timestamps: &[Timestamp],
    mask: &[bool],
    parameters: &SearchParameters,
) -> Result<BurstTable, BurstSearchError> {
    if mask.len() != timestamps.len() {
        return Err(BurstSearchError::DimensionMismatch {
            mask: mask.len(),
            photons: timestamps.len(),
        });
    }
    let (indices, selected): (Vec<PhotonIndex>, Vec<Timestamp>) = timestamps
        .iter()
        .zip(mask)
        .enumerate()
        .filter(|(_, (_, selected))| **selected)
        .map(|(index, (&time, _))| (index, time))
        .unzip();

    let sub_bursts = engine.search(&selected, parameters)?;
    debug!(
        "Found {} bursts in {} selected photons",
        sub_bursts.len(),
        selected.len()
    );

    let bursts = sub_bursts
        .iter()
        .filter_map(|burst| {
            Burst::new(
                *indices.get(burst.istart())?,
                *indices.get(burst.iend())?,
                burst.start(),
                burst.end(),
            )
        })
        .collect();
    Ok(BurstTable::from_sorted(bursts, timestamps.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParameterError;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const ENGINES: [Implementation; 2] = [Implementation::Reference, Implementation::Streaming];

    const SCENARIO_A: [Timestamp; 8] = [0, 1, 2, 3, 10, 11, 12, 13];

    /// Bright bursts on a sparse background, with a fixed seed.
    fn random_timestamps(seed: u64, len: usize) -> Vec<Timestamp> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut time = 0;
        (0..len)
            .map(|_| {
                time += if rng.random_bool(0.1) {
                    rng.random_range(0..2000)
                } else {
                    rng.random_range(0..40)
                };
                time
            })
            .collect()
    }

    fn assert_valid(bursts: &BurstTable, parameters: &SearchParameters) {
        for burst in bursts {
            assert_eq!(burst.iend() - burst.istart() + 1, burst.size());
            assert!(burst.size() >= parameters.min_size());
            assert!(burst.end() >= burst.start());
        }
        for pair in bursts.bursts().windows(2) {
            assert!(pair[1].istart() > pair[0].iend());
            assert!(pair[1].start() >= pair[0].start());
        }
        assert_eq!(bursts.validate(), Ok(()));
    }

    #[test]
    fn scenario_a_drops_trailing_burst() {
        let parameters = SearchParameters::new(3, 3, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&SCENARIO_A, &parameters).unwrap();
            assert_eq!(bursts.to_rows(), vec![[0, 3, 4, 0, 3, 3]], "{}", engine.name());
        }
    }

    #[test]
    fn scenario_a_flushes_trailing_burst() {
        let parameters = SearchParameters::new(3, 3, 3)
            .unwrap()
            .with_trailing_burst(TrailingBurst::Flush);
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&SCENARIO_A, &parameters).unwrap();
            assert_eq!(bursts.starts(), vec![0, 10], "{}", engine.name());
            assert_eq!(bursts.ends(), vec![3, 13]);
            assert_eq!(bursts.sizes(), vec![4, 4]);
            assert_eq!(bursts.istarts(), vec![0, 4]);
            assert_eq!(bursts.iends(), vec![3, 7]);
        }
    }

    #[test]
    fn flushed_burst_respects_minimum_size() {
        let timestamps = [0, 100, 200, 201, 202];
        let parameters = SearchParameters::new(2, 5, 4)
            .unwrap()
            .with_trailing_burst(TrailingBurst::Flush);
        for engine in ENGINES.map(Implementation::engine) {
            assert!(engine.search(&timestamps, &parameters).unwrap().is_empty());
        }
    }

    #[test]
    fn too_few_timestamps() {
        let parameters = SearchParameters::new(5, 3, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            assert_eq!(
                engine.search(&[0, 1, 2, 3], &parameters),
                Err(BurstSearchError::InvalidParameter(
                    ParameterError::TooFewTimestamps { len: 4, m: 5 }
                ))
            );
        }
    }

    #[test]
    fn no_qualifying_window() {
        let parameters = SearchParameters::new(3, 0, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&SCENARIO_A, &parameters).unwrap();
            assert!(bursts.is_empty());
            assert_eq!(bursts.num_photons(), SCENARIO_A.len());
        }
    }

    #[test]
    fn short_bursts_are_discarded() {
        // The first cluster holds 3 photons, the second 5.
        let timestamps = [0, 1, 2, 50, 51, 52, 53, 54, 100, 200];
        let parameters = SearchParameters::new(2, 1, 4).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&timestamps, &parameters).unwrap();
            assert_eq!(bursts.to_rows(), vec![[50, 4, 5, 3, 7, 54]]);
        }
    }

    #[test]
    fn window_of_one_never_closes() {
        let parameters = SearchParameters::new(1, 0, 1).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            assert!(engine.search(&SCENARIO_A, &parameters).unwrap().is_empty());
            let flushed = engine
                .search(&SCENARIO_A, &parameters.with_trailing_burst(TrailingBurst::Flush))
                .unwrap();
            assert_eq!(flushed.to_rows(), vec![[0, 13, 8, 0, 7, 13]]);
        }
    }

    #[test]
    fn duplicate_timestamps() {
        let timestamps = [0, 0, 0, 0, 100, 100, 100, 200];
        let parameters = SearchParameters::new(3, 0, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&timestamps, &parameters).unwrap();
            assert_eq!(bursts.to_rows(), vec![[0, 0, 4, 0, 3, 0], [100, 0, 3, 4, 6, 100]]);
        }
    }

    #[test]
    fn random_searches_are_valid() {
        for seed in 0..10 {
            let timestamps = random_timestamps(seed, 5_000);
            for (m, max_span, min_size) in [(3, 30, 3), (10, 200, 10), (10, 200, 30), (5, 0, 1)] {
                let parameters = SearchParameters::new(m, max_span, min_size).unwrap();
                for engine in ENGINES.map(Implementation::engine) {
                    let bursts = engine.search(&timestamps, &parameters).unwrap();
                    assert_valid(&bursts, &parameters);
                }
            }
        }
    }

    #[test]
    fn engines_agree() {
        for seed in 0..10 {
            let timestamps = random_timestamps(seed, 5_000);
            for trailing in [TrailingBurst::Drop, TrailingBurst::Flush] {
                let parameters = SearchParameters::new(10, 200, 10)
                    .unwrap()
                    .with_trailing_burst(trailing);
                let reference = ReferenceEngine.search(&timestamps, &parameters).unwrap();
                let streaming = StreamingEngine.search(&timestamps, &parameters).unwrap();
                assert!(!reference.is_empty());
                assert_eq!(reference, streaming);

                let mask: Vec<bool> = timestamps.iter().map(|t| t % 3 == 0).collect();
                assert_eq!(
                    ReferenceEngine.count_selected(&reference, &mask),
                    StreamingEngine.count_selected(&streaming, &mask)
                );
            }
        }
    }

    #[test]
    fn burst_does_not_reopen_inside_previous_burst() {
        // Window 1 closes the burst over photons 0-2. Window 2 is above the rate
        // but starts at photon 2, so the next burst only opens at window 3.
        let timestamps = [0, 5, 10, 16, 20, 22, 24, 100, 200];
        let parameters = SearchParameters::new(3, 10, 1).unwrap();
        let mask = [true, false, true, true, false, true, true, true, false];
        let mut tables = Vec::new();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&timestamps, &parameters).unwrap();
            assert_valid(&bursts, &parameters);
            assert_eq!(bursts.istarts(), vec![0, 3], "{}", engine.name());
            assert_eq!(bursts.iends(), vec![2, 6]);
            assert_eq!(engine.count_selected(&bursts, &mask), Ok(vec![2, 3]));
            assert_eq!(crate::intersect(&bursts, &bursts).unwrap(), bursts);
            tables.push(bursts);
        }
        assert_eq!(tables.first(), tables.last());
    }

    #[test]
    fn closing_window_followed_by_fast_window() {
        let timestamps = [0, 5, 10, 16, 20, 100, 200];
        let parameters = SearchParameters::new(3, 10, 1).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&timestamps, &parameters).unwrap();
            assert_eq!(bursts.to_rows(), vec![[0, 10, 3, 0, 2, 10]]);
            assert_eq!(engine.count_selected(&bursts, &[true; 7]), Ok(vec![3]));
        }
    }

    #[test]
    fn search_is_repeatable() {
        let timestamps = random_timestamps(42, 2_000);
        let parameters = SearchParameters::new(5, 100, 5).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            assert_eq!(
                engine.search(&timestamps, &parameters),
                engine.search(&timestamps, &parameters)
            );
        }
    }

    #[test]
    fn all_true_mask_counts_sizes() {
        let timestamps = random_timestamps(7, 5_000);
        let parameters = SearchParameters::new(10, 200, 10).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&timestamps, &parameters).unwrap();
            let mask = vec![true; timestamps.len()];
            assert_eq!(engine.count_selected(&bursts, &mask).unwrap(), bursts.sizes());
        }
    }

    #[test]
    fn count_selected_sub_population() {
        let parameters = SearchParameters::new(3, 3, 3)
            .unwrap()
            .with_trailing_burst(TrailingBurst::Flush);
        let mask = [true, false, true, false, false, false, false, true];
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&SCENARIO_A, &parameters).unwrap();
            assert_eq!(engine.count_selected(&bursts, &mask).unwrap(), vec![2, 1]);
        }
    }

    #[test]
    fn count_selected_short_mask() {
        let parameters = SearchParameters::new(3, 3, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = engine.search(&SCENARIO_A, &parameters).unwrap();
            assert_eq!(
                engine.count_selected(&bursts, &[true; 5]),
                Err(BurstSearchError::DimensionMismatch {
                    mask: 5,
                    photons: 8
                })
            );
        }
    }

    #[test]
    fn count_selected_empty_table() {
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = BurstTable::empty(4);
            assert_eq!(
                engine.count_selected(&bursts, &[true; 4]),
                Ok(Vec::new())
            );
        }
    }

    #[test]
    fn count_selected_batch() {
        let first = random_timestamps(1, 3_000);
        let second = random_timestamps(2, 4_000);
        let parameters = SearchParameters::new(10, 200, 10).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let first_bursts = engine.search(&first, &parameters).unwrap();
            let second_bursts = engine.search(&second, &parameters).unwrap();
            let first_mask = vec![true; first.len()];
            let second_mask = vec![false; second.len()];

            let items = [
                (&first_bursts, first_mask.as_slice()),
                (&second_bursts, second_mask.as_slice()),
            ];
            let counts = engine.count_selected_batch(&items).unwrap();
            assert_eq!(counts[0], first_bursts.sizes());
            assert!(counts[1].iter().all(|&count| count == 0));

            let mismatched = [
                (&first_bursts, first_mask.as_slice()),
                (&second_bursts, first_mask.as_slice()),
            ];
            let result = engine.count_selected_batch(&mismatched);
            assert!(matches!(
                result,
                Err(BurstSearchError::DimensionMismatch { .. })
            ));
        }
    }

    #[test]
    fn search_selection_maps_indices_back() {
        let timestamps = [0, 1, 2, 3, 4, 5, 6, 7, 50, 100];
        // Every other photon: 0, 2, 4, 6 are within 2 ticks of each other.
        let mask: Vec<bool> = (0..timestamps.len()).map(|i| i % 2 == 0).collect();
        let parameters = SearchParameters::new(2, 2, 3).unwrap();
        for engine in ENGINES.map(Implementation::engine) {
            let bursts = search_selection(engine, &timestamps, &mask, &parameters).unwrap();
            assert_eq!(bursts.to_rows(), vec![[0, 6, 7, 0, 6, 6]]);
            assert_eq!(bursts.num_photons(), timestamps.len());
            assert_eq!(engine.count_selected(&bursts, &mask).unwrap(), vec![4]);
        }
    }

    #[test]
    fn search_selection_mask_mismatch() {
        let parameters = SearchParameters::new(2, 2, 3).unwrap();
        assert_eq!(
            search_selection(&StreamingEngine, &SCENARIO_A, &[true; 3], &parameters),
            Err(BurstSearchError::DimensionMismatch {
                mask: 3,
                photons: 8
            })
        );
    }
}
