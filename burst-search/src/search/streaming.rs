use super::{SearchEngine, SearchParameters, TrailingBurst};
use crate::{
    burst::{Burst, BurstTable},
    error::BurstSearchError,
};
use burstsearch_common::{PhotonCount, PhotonIndex, Timestamp};

/// A window of `m` consecutive photons: the index of its first photon,
/// and the times of its first and last photons.
pub(crate) type Window = (PhotonIndex, Timestamp, Timestamp);

pub(crate) trait Detector: Clone {
    fn signal(&mut self, window: Window) -> Option<Burst>;

    fn finish(&mut self) -> Option<Burst>;
}

/// Tracks whether the current window is inside a burst, and emits each burst
/// as the first window falling below the rate threshold arrives.
#[derive(Clone)]
pub(crate) struct RateThresholdDetector {
    parameters: SearchParameters,
    num_photons: usize,
    open: Option<(PhotonIndex, Timestamp)>,
    // First photon a new burst may start at, past the last emitted burst.
    next_open: PhotonIndex,
    // Time of the last photon of the previous window.
    previous_last: Timestamp,
}

impl RateThresholdDetector {
    pub(crate) fn new(parameters: &SearchParameters, num_photons: usize) -> Self {
        Self {
            parameters: *parameters,
            num_photons,
            open: None,
            next_open: 0,
            previous_last: Timestamp::default(),
        }
    }

    fn close(&self, i_start: PhotonIndex, start: Timestamp, i_end: PhotonIndex) -> Option<Burst> {
        if i_end - i_start >= self.parameters.min_size() {
            Burst::new(i_start, i_end - 1, start, self.previous_last)
        } else {
            None
        }
    }
}

impl Detector for RateThresholdDetector {
    fn signal(&mut self, (index, first, last): Window) -> Option<Burst> {
        let above_min_rate = last - first <= self.parameters.max_span();
        let burst = match self.open {
            None if above_min_rate && index >= self.next_open => {
                self.open = Some((index, first));
                None
            }
            Some((i_start, start)) if !above_min_rate => {
                self.open = None;
                // The previous window's last photon is the last one inside the burst.
                let i_end = index + self.parameters.m() - 1;
                let burst = self.close(i_start, start, i_end);
                if burst.is_some() {
                    self.next_open = i_end;
                }
                burst
            }
            _ => None,
        };
        self.previous_last = last;
        burst
    }

    fn finish(&mut self) -> Option<Burst> {
        let (i_start, start) = self.open.take()?;
        match self.parameters.trailing_burst() {
            TrailingBurst::Drop => None,
            TrailingBurst::Flush => self.close(i_start, start, self.num_photons),
        }
    }
}

#[derive(Clone)]
pub(crate) struct BurstIter<I, D>
where
    I: Iterator<Item = Window>,
    D: Detector,
{
    source: I,
    detector: D,
    finished: bool,
}

impl<I, D> Iterator for BurstIter<I, D>
where
    I: Iterator<Item = Window>,
    D: Detector,
{
    type Item = Burst;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for window in &mut self.source {
            if let Some(burst) = self.detector.signal(window) {
                return Some(burst);
            }
        }
        self.finished = true;
        self.detector.finish()
    }
}

pub(crate) trait BurstFilter<I, D>
where
    I: Iterator<Item = Window>,
    D: Detector,
{
    fn bursts(self, detector: D) -> BurstIter<I, D>;
}

impl<I, D> BurstFilter<I, D> for I
where
    I: Iterator<Item = Window>,
    D: Detector,
{
    fn bursts(self, detector: D) -> BurstIter<I, D> {
        BurstIter {
            source: self,
            detector,
            finished: false,
        }
    }
}

/// Evaluates the rate test one window at a time, without materialising it,
/// and counts photons in a single pass over the mask.
#[derive(Default, Debug, Clone, Copy)]
pub struct StreamingEngine;

impl SearchEngine for StreamingEngine {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn find_bursts(
        &self,
        timestamps: &[Timestamp],
        parameters: &SearchParameters,
    ) -> Result<BurstTable, BurstSearchError> {
        let bursts = timestamps
            .windows(parameters.m())
            .enumerate()
            .filter_map(|(i, window)| Some((i, *window.first()?, *window.last()?)))
            .bursts(RateThresholdDetector::new(parameters, timestamps.len()))
            .collect();
        Ok(BurstTable::from_sorted(bursts, timestamps.len()))
    }

    fn count_in_bursts(&self, bursts: &BurstTable, mask: &[bool]) -> Vec<PhotonCount> {
        let mut photons = mask.iter();
        let mut position = 0;
        bursts
            .iter()
            .map(|burst| {
                let count = photons
                    .by_ref()
                    .skip(burst.istart() - position)
                    .take(burst.size())
                    .filter(|&&selected| selected)
                    .count();
                position = burst.iend() + 1;
                count
            })
            .collect()
    }
}
