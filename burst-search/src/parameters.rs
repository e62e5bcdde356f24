use burst_search::{Implementation, PhotonSelection, SearchParameters, TrailingBurst};
use burstsearch_common::Timestamp;
use clap::{Args, Parser};

#[derive(Debug, Clone, Args)]
pub(crate) struct DetectorSettings {
    /// Burst search parameters, as 'm,T,L': a burst holds runs of m photons within
    /// T clock ticks, and bursts with fewer than L photons are discarded.
    #[clap(long, env, default_value = "10,8000,30")]
    pub(crate) search: SearchParameters,

    /// What to do with a burst still open at the end of the photon stream, 'drop' or 'flush'.
    #[clap(long, env, default_value = "drop")]
    pub(crate) trailing_burst: TrailingBurst,

    /// Burst search engine, 'reference' or 'streaming'.
    #[clap(long, env, default_value = "streaming")]
    pub(crate) implementation: Implementation,

    /// If set, bursts are also searched separately in two photon selections
    /// and only the spans where both found a burst are kept.
    #[clap(long)]
    pub(crate) dual_channel: bool,

    /// First photon selection of the dual channel search.
    #[clap(long, default_value = "Dex")]
    pub(crate) first_selection: PhotonSelection,

    /// Second photon selection of the dual channel search.
    #[clap(long, default_value = "AexAem")]
    pub(crate) second_selection: PhotonSelection,
}

impl DetectorSettings {
    pub(crate) fn parameters(&self) -> SearchParameters {
        self.search.with_trailing_burst(self.trailing_burst)
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SimulationParameters {
    /// Number of independent detection channels to simulate.
    #[clap(long, env, default_value = "4")]
    pub(crate) channels: usize,

    /// Length of each simulated acquisition, in seconds.
    #[clap(long, env, default_value = "10.0")]
    pub(crate) duration: f64,

    /// Detector clock period, in seconds.
    #[clap(long, env, default_value = "12.5e-9")]
    pub(crate) clock_period: f64,

    /// Background photon rate, in counts per second.
    #[clap(long, env, default_value = "2000.0")]
    pub(crate) background_rate: f64,

    /// Mean number of molecules crossing the detection volume per second.
    #[clap(long, env, default_value = "20.0")]
    pub(crate) burst_rate: f64,

    /// Mean time a molecule spends in the detection volume, in seconds.
    #[clap(long, env, default_value = "1e-3")]
    pub(crate) burst_duration: f64,

    /// Photon rate from a molecule inside the detection volume, in counts per second.
    #[clap(long, env, default_value = "200000.0")]
    pub(crate) burst_photon_rate: f64,

    /// Fraction of donor excited burst photons emitted by the acceptor.
    #[clap(long, env, default_value = "0.5")]
    pub(crate) fret_efficiency: f64,

    /// If set, excitation alternates between donor and acceptor with this period,
    /// in clock ticks. Otherwise only the donor is excited.
    #[clap(long, env)]
    pub(crate) alex_period: Option<Timestamp>,

    /// Seed for the random number generators, for reproducible streams.
    #[clap(long, env)]
    pub(crate) seed: Option<u64>,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Single {
    /// Number of the frame to simulate
    #[clap(long = "frame", default_value = "0")]
    pub(crate) frame_number: u32,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Continuous {
    /// Number of first frame to simulate
    #[clap(long = "start-frame", default_value = "0")]
    pub(crate) start_frame_number: u32,

    /// Time in milliseconds between each frame
    #[clap(long, default_value = "1000")]
    pub(crate) frame_time: u64,
}
