//! Named sub-populations of photons.
//!
//! Each photon is detected in one emission channel (donor or acceptor) during
//! one excitation period (donor or acceptor, when alternating excitation is
//! used). A [PhotonSelection] picks a combination of these streams and turns a
//! sequence of per-photon [PhotonStream] labels into a selection mask.
use crate::error::ParameterError;
use std::{
    fmt::{Display, Formatter, Result},
    str::FromStr,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Excitation {
    #[default]
    Donor,
    Acceptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmissionChannel {
    Donor,
    Acceptor,
}

/// The stream a single photon belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotonStream {
    pub excitation: Excitation,
    pub emission: EmissionChannel,
}

/// Which emission channels are selected during one excitation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emission {
    /// Donor and acceptor emission
    DAem,
    /// Donor emission only
    Dem,
    /// Acceptor emission only
    Aem,
}

impl Emission {
    fn contains(self, channel: EmissionChannel) -> bool {
        match self {
            Emission::DAem => true,
            Emission::Dem => channel == EmissionChannel::Donor,
            Emission::Aem => channel == EmissionChannel::Acceptor,
        }
    }
}

/// A selection of photons by excitation period and emission channel.
/// A period set to `None` contributes no photons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotonSelection {
    dex: Option<Emission>,
    aex: Option<Emission>,
}

impl PhotonSelection {
    /// Fails unless at least one excitation period is selected.
    pub fn new(dex: Option<Emission>, aex: Option<Emission>) -> std::result::Result<Self, ParameterError> {
        if dex.is_none() && aex.is_none() {
            Err(ParameterError::EmptyPhotonSelection)
        } else {
            Ok(Self { dex, aex })
        }
    }

    /// Every photon, in both excitation periods.
    pub fn all() -> Self {
        Self {
            dex: Some(Emission::DAem),
            aex: Some(Emission::DAem),
        }
    }

    pub fn dex(emission: Emission) -> Self {
        Self {
            dex: Some(emission),
            aex: None,
        }
    }

    pub fn aex(emission: Emission) -> Self {
        Self {
            dex: None,
            aex: Some(emission),
        }
    }

    pub fn contains(&self, stream: PhotonStream) -> bool {
        let period = match stream.excitation {
            Excitation::Donor => self.dex,
            Excitation::Acceptor => self.aex,
        };
        period.is_some_and(|emission| emission.contains(stream.emission))
    }

    /// Builds the selection mask for a sequence of per-photon stream labels.
    pub fn mask(&self, streams: &[PhotonStream]) -> Vec<bool> {
        streams.iter().map(|&stream| self.contains(stream)).collect()
    }

    fn label(&self) -> Option<&'static str> {
        use Emission::*;
        Some(match (self.dex, self.aex) {
            (Some(DAem), Some(DAem)) => "all",
            (Some(Dem), None) => "DexDem",
            (Some(Aem), None) => "DexAem",
            (None, Some(Aem)) => "AexAem",
            (None, Some(Dem)) => "AexDem",
            (Some(DAem), None) => "Dex",
            (None, Some(DAem)) => "Aex",
            (Some(DAem), Some(Aem)) => "DexDAem_AexAem",
            _ => return None,
        })
    }
}

impl Display for PhotonSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.label() {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "PhotonSelection(Dex={:?}, Aex={:?})", self.dex, self.aex),
        }
    }
}

impl FromStr for PhotonSelection {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use Emission::*;
        match s {
            "all" => Ok(Self::all()),
            "DexDem" => Ok(Self::dex(Dem)),
            "DexAem" => Ok(Self::dex(Aem)),
            "AexAem" => Ok(Self::aex(Aem)),
            "AexDem" => Ok(Self::aex(Dem)),
            "Dex" => Ok(Self::dex(DAem)),
            "Aex" => Ok(Self::aex(DAem)),
            "DexDAem_AexAem" => Self::new(Some(DAem), Some(Aem)),
            _ => Err(ParameterError::UnknownPhotonSelection(s.to_owned())),
        }
    }
}
