//! Generates photon streams of freely diffusing molecules over a Poisson background.
use crate::parameters::SimulationParameters;
use burst_search::{EmissionChannel, Excitation, PhotonStream};
use burstsearch_common::{Timestamp, seconds_to_ticks};
use rand::Rng;
use rand_distr::{Distribution, Exp};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SimulationError {
    #[error("Clock period must be positive, got {0}")]
    ClockPeriod(f64),
    #[error("FRET efficiency must be within [0, 1], got {0}")]
    FretEfficiency(f64),
    #[error("ALEX period must be at least 2 clock ticks, got {0}")]
    AlexPeriod(Timestamp),
    #[error("Invalid Exponential Distribution: {0}")]
    ExpDistribution(#[from] rand_distr::ExpError),
}

/// One channel's photons, sorted by arrival time, with the stream of each photon.
#[derive(Default, Debug, Clone)]
pub(crate) struct ChannelPhotons {
    pub(crate) timestamps: Vec<Timestamp>,
    pub(crate) streams: Vec<PhotonStream>,
}

impl ChannelPhotons {
    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }
}

/// Arrival times of a Poisson process of `rate` events per tick, within `[start, end)`.
fn poisson_arrivals<R: Rng>(
    rng: &mut R,
    rate: f64,
    start: Timestamp,
    end: Timestamp,
) -> Result<Vec<Timestamp>, SimulationError> {
    if rate == 0.0 {
        return Ok(Vec::new());
    }
    let waiting_time = Exp::new(rate)?;
    let mut arrivals = Vec::new();
    let mut time = start as f64;
    loop {
        time += waiting_time.sample(rng);
        if time >= end as f64 {
            return Ok(arrivals);
        }
        arrivals.push(time as Timestamp);
    }
}

impl SimulationParameters {
    fn validate(&self) -> Result<(), SimulationError> {
        if self.clock_period.is_nan() || self.clock_period <= 0.0 {
            return Err(SimulationError::ClockPeriod(self.clock_period));
        }
        if !(0.0..=1.0).contains(&self.fret_efficiency) {
            return Err(SimulationError::FretEfficiency(self.fret_efficiency));
        }
        if let Some(period) = self.alex_period.filter(|&period| period < 2) {
            return Err(SimulationError::AlexPeriod(period));
        }
        Ok(())
    }

    fn excitation_at(&self, time: Timestamp) -> Excitation {
        match self.alex_period {
            Some(period) if time.rem_euclid(period) >= period / 2 => Excitation::Acceptor,
            _ => Excitation::Donor,
        }
    }

    /// Simulates the photons detected in one channel over one acquisition.
    pub(crate) fn simulate_channel<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<ChannelPhotons, SimulationError> {
        self.validate()?;
        let end = seconds_to_ticks(self.duration, self.clock_period);
        let per_tick = |rate: f64| rate * self.clock_period;

        // (arrival time, emitted by a molecule)
        let mut photons: Vec<(Timestamp, bool)> =
            poisson_arrivals(rng, per_tick(self.background_rate), 0, end)?
                .into_iter()
                .map(|time| (time, false))
                .collect();

        let mean_transit = seconds_to_ticks(self.burst_duration, self.clock_period).max(1);
        let transit_time = Exp::new(1.0 / mean_transit as f64)?;
        for arrival in poisson_arrivals(rng, per_tick(self.burst_rate), 0, end)? {
            let departure = (arrival + transit_time.sample(rng) as Timestamp).min(end);
            photons.extend(
                poisson_arrivals(rng, per_tick(self.burst_photon_rate), arrival, departure)?
                    .into_iter()
                    .map(|time| (time, true)),
            );
        }
        photons.sort_unstable_by_key(|&(time, _)| time);

        let (timestamps, streams) = photons
            .into_iter()
            .map(|(time, from_molecule)| (time, self.stream_of(rng, time, from_molecule)))
            .unzip();
        Ok(ChannelPhotons {
            timestamps,
            streams,
        })
    }

    fn stream_of<R: Rng>(&self, rng: &mut R, time: Timestamp, from_molecule: bool) -> PhotonStream {
        let excitation = self.excitation_at(time);
        let acceptor = match (from_molecule, excitation) {
            (true, Excitation::Donor) => rng.random_bool(self.fret_efficiency),
            // The acceptor is excited directly.
            (true, Excitation::Acceptor) => true,
            (false, _) => rng.random_bool(0.5),
        };
        PhotonStream {
            excitation,
            emission: if acceptor {
                EmissionChannel::Acceptor
            } else {
                EmissionChannel::Donor
            },
        }
    }
}
