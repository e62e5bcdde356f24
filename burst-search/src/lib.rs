//! Burst search for single-molecule photon streams.
//!
//! A burst is a run of photons arriving faster than a threshold rate, as
//! when a molecule crosses the detection volume. This crate finds bursts in a
//! sorted sequence of photon timestamps, counts sub-populations of photons in
//! each burst, and intersects bursts found by independent searches.
//! Typical usage, on one channel's timestamps, may look like:
//! ```rust
//! use burst_search::{intersect, Implementation, PhotonSelection, SearchParameters};
//! # use burst_search::{EmissionChannel, Excitation, PhotonStream};
//! # let timestamps = [0, 1, 2, 3, 10, 11, 12, 13, 40];
//! # let streams = [PhotonStream { excitation: Excitation::Donor, emission: EmissionChannel::Donor }; 9];
//!
//! let parameters = SearchParameters::new(3, 3, 3).unwrap();  // 3 photons within 3 ticks
//! let engine = Implementation::default().engine();
//! let bursts = engine.search(&timestamps, &parameters).unwrap();
//!
//! let donor = PhotonSelection::dex(burst_search::Emission::Dem).mask(&streams);
//! let donor_counts = engine.count_selected(&bursts, &donor).unwrap();
//! assert_eq!(donor_counts, bursts.sizes());
//! assert_eq!(intersect(&bursts, &bursts).unwrap(), bursts);
//! ```

mod burst;
mod error;
mod intersect;
mod photon_selection;
mod search;

pub use burst::{Burst, BurstTable};
pub use error::{BurstSearchError, ParameterError, TableError};
pub use intersect::intersect;
pub use photon_selection::{
    EmissionChannel, Emission, Excitation, PhotonSelection, PhotonStream,
};
pub use search::{
    Implementation, ReferenceEngine, SearchEngine, SearchParameters, StreamingEngine,
    TrailingBurst, search_selection,
};
