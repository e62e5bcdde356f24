pub mod metrics;
pub mod tracer;

/// Photon arrival time, in detector clock ticks.
pub type Timestamp = i64;

/// Position of a photon within the timestamp sequence it was detected in.
pub type PhotonIndex = usize;
pub type PhotonCount = usize;

pub type Channel = u32;

/// Converts a duration in seconds into clock ticks, rounding down.
pub fn seconds_to_ticks(seconds: f64, clock_period: f64) -> Timestamp {
    (seconds / clock_period) as Timestamp
}
