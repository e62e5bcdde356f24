use crate::{
    parameters::{DetectorSettings, SimulationParameters},
    simulation::{ChannelPhotons, SimulationError},
};
use burst_search::{
    BurstSearchError, BurstTable, Emission, PhotonSelection, intersect, search_selection,
};
use burstsearch_common::{
    Channel, PhotonCount,
    metrics::{
        bursts_detected::{self, SearchKind},
        failures::{self, FailureKind},
        metric_names::{BURSTS_DETECTED, CHANNELS_PROCESSED, FAILURES, PHOTONS_PROCESSED},
    },
};
use metrics::counter;
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub(crate) enum ProcessingError {
    #[error("Simulation Failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Burst Search Failed: {0}")]
    Search(#[from] BurstSearchError),
}

impl ProcessingError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            ProcessingError::Simulation(_) => FailureKind::SimulationFailed,
            ProcessingError::Search(BurstSearchError::InvalidParameter(_)) => {
                FailureKind::InvalidParameter
            }
            ProcessingError::Search(BurstSearchError::DimensionMismatch { .. }) => {
                FailureKind::DimensionMismatch
            }
            ProcessingError::Search(BurstSearchError::InvalidInput(_)) => FailureKind::InvalidInput,
        }
    }
}

/// Bursts found in one channel, with the donor excited photon counts of each burst.
#[derive(Debug)]
pub(crate) struct ChannelBursts {
    pub(crate) channel: Channel,
    pub(crate) num_photons: usize,
    pub(crate) bursts: BurstTable,
    pub(crate) donor_counts: Vec<PhotonCount>,
    pub(crate) acceptor_counts: Vec<PhotonCount>,
    /// Bursts found in both photon selections, when dual channel search is enabled.
    pub(crate) dual_channel: Option<BurstTable>,
}

impl ChannelBursts {
    pub(crate) fn mean_size(&self) -> Option<f64> {
        mean(self.bursts.sizes().into_iter().map(|size| size as f64))
    }

    /// Mean photon rate inside the bursts, in photons per second.
    pub(crate) fn mean_rate(&self, clock_period: f64) -> Option<f64> {
        mean(self.bursts.ph_rates().into_iter().flatten()).map(|rate| rate / clock_period)
    }

    /// Mean fraction of donor excited photons emitted by the acceptor.
    pub(crate) fn mean_proximity_ratio(&self) -> Option<f64> {
        mean(
            self.donor_counts
                .iter()
                .zip(&self.acceptor_counts)
                .filter(|&(&donor, &acceptor)| donor + acceptor > 0)
                .map(|(&donor, &acceptor)| acceptor as f64 / (donor + acceptor) as f64),
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (count, sum) = values.fold((0usize, 0.0), |(count, sum), value| (count + 1, sum + value));
    (count > 0).then(|| sum / count as f64)
}

/// Searches one channel's photons, counts the donor excited donor and acceptor
/// photons in each burst, and optionally performs the dual channel search.
#[instrument(skip_all, fields(channel = channel, num_photons = photons.len(), num_bursts))]
pub(crate) fn find_channel_bursts(
    channel: Channel,
    photons: &ChannelPhotons,
    settings: &DetectorSettings,
) -> Result<ChannelBursts, BurstSearchError> {
    let engine = settings.implementation.engine();
    let parameters = settings.parameters();

    let bursts = engine.search(&photons.timestamps, &parameters)?;
    tracing::Span::current().record("num_bursts", bursts.len());
    counter!(
        BURSTS_DETECTED,
        &[bursts_detected::get_label(SearchKind::AllPhotons)]
    )
    .increment(bursts.len() as u64);

    let donor = PhotonSelection::dex(Emission::Dem).mask(&photons.streams);
    let acceptor = PhotonSelection::dex(Emission::Aem).mask(&photons.streams);
    let donor_counts = engine.count_selected(&bursts, &donor)?;
    let acceptor_counts = engine.count_selected(&bursts, &acceptor)?;

    let dual_channel = if settings.dual_channel {
        let search_in = |selection: &PhotonSelection, kind| {
            let mask = selection.mask(&photons.streams);
            let bursts = search_selection(engine, &photons.timestamps, &mask, &parameters)?;
            counter!(BURSTS_DETECTED, &[bursts_detected::get_label(kind)])
                .increment(bursts.len() as u64);
            Ok::<_, BurstSearchError>(bursts)
        };
        let first = search_in(&settings.first_selection, SearchKind::FirstSelection)?;
        let second = search_in(&settings.second_selection, SearchKind::SecondSelection)?;
        let both = intersect(&first, &second)?;
        counter!(
            BURSTS_DETECTED,
            &[bursts_detected::get_label(SearchKind::Intersection)]
        )
        .increment(both.len() as u64);
        Some(both)
    } else {
        None
    };

    Ok(ChannelBursts {
        channel,
        num_photons: photons.len(),
        bursts,
        donor_counts,
        acceptor_counts,
        dual_channel,
    })
}

/// Derives a distinct, reproducible seed for each frame and channel.
fn channel_seed(seed: u64, frame_number: u32, channel: Channel) -> u64 {
    seed.wrapping_add((u64::from(frame_number) << 32) | u64::from(channel))
}

fn simulate_and_search(
    frame_number: u32,
    channel: Channel,
    settings: &DetectorSettings,
    simulation: &SimulationParameters,
) -> Result<ChannelBursts, ProcessingError> {
    let mut rng = match simulation.seed {
        Some(seed) => StdRng::seed_from_u64(channel_seed(seed, frame_number, channel)),
        None => StdRng::from_os_rng(),
    };
    let photons = simulation.simulate_channel(&mut rng)?;
    counter!(PHOTONS_PROCESSED).increment(photons.len() as u64);
    Ok(find_channel_bursts(channel, &photons, settings)?)
}

#[derive(Debug, Default)]
pub(crate) struct FrameReport {
    pub(crate) channels: Vec<ChannelBursts>,
    pub(crate) failures: Vec<(Channel, ProcessingError)>,
}

/// Simulates and searches every channel of one frame, channels in parallel.
#[instrument(skip_all, fields(frame_number = frame_number, num_channels = simulation.channels))]
pub(crate) fn process_frame(
    frame_number: u32,
    settings: &DetectorSettings,
    simulation: &SimulationParameters,
) -> FrameReport {
    let results: Vec<_> = (0..simulation.channels as Channel)
        .into_par_iter()
        .map(|channel| {
            (
                channel,
                simulate_and_search(frame_number, channel, settings, simulation),
            )
        })
        .collect();

    let mut report = FrameReport::default();
    for (channel, result) in results {
        match result {
            Ok(channel_bursts) => {
                counter!(CHANNELS_PROCESSED).increment(1);
                report.channels.push(channel_bursts);
            }
            Err(e) => {
                warn!("Channel {channel} failed: {e}");
                counter!(FAILURES, &[failures::get_label(e.failure_kind())]).increment(1);
                report.failures.push((channel, e));
            }
        }
    }
    report
}

impl FrameReport {
    pub(crate) fn log_summary(&self, clock_period: f64) {
        for result in &self.channels {
            let display_opt = |value: Option<f64>| {
                value.map_or_else(|| "n/a".to_owned(), |value| format!("{value:.3}"))
            };
            info!(
                "Channel {}: {} bursts in {} photons, mean size {}, mean rate {} kcps, mean proximity ratio {}",
                result.channel,
                result.bursts.len(),
                result.num_photons,
                display_opt(result.mean_size()),
                display_opt(result.mean_rate(clock_period).map(|rate| rate / 1e3)),
                display_opt(result.mean_proximity_ratio()),
            );
            if let Some(dual_channel) = &result.dual_channel {
                info!(
                    "Channel {}: {} bursts found in both photon selections",
                    result.channel,
                    dual_channel.len()
                );
            }
        }
    }
}
