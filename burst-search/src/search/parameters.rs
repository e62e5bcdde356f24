use crate::error::ParameterError;
use burstsearch_common::Timestamp;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use strum::{Display as StrumDisplay, EnumString};

/// What to do with a burst that is still open when the scan reaches the end
/// of the timestamp sequence.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum TrailingBurst {
    /// The open burst is discarded. Burst counts produced by other analyses
    /// assume this.
    #[default]
    Drop,
    /// The open burst is closed at the last photon and kept if it is large enough.
    Flush,
}

/// The sliding window rate threshold: a photon is inside a burst when it lies
/// in a run of `m` consecutive photons spanning at most `T` clock ticks.
/// Bursts with fewer than `L` photons are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    m: usize,
    max_span: Timestamp,
    min_size: usize,
    trailing: TrailingBurst,
}

impl SearchParameters {
    pub fn new(m: usize, max_span: Timestamp, min_size: usize) -> Result<Self, ParameterError> {
        if m < 1 {
            return Err(ParameterError::ZeroWindowSize);
        }
        if max_span < 0 {
            return Err(ParameterError::NegativeMaxSpan(max_span));
        }
        if min_size < 1 {
            return Err(ParameterError::ZeroMinimumSize);
        }
        Ok(Self {
            m,
            max_span,
            min_size,
            trailing: TrailingBurst::default(),
        })
    }

    pub fn with_trailing_burst(self, trailing: TrailingBurst) -> Self {
        Self { trailing, ..self }
    }

    /// Number of consecutive photons the local rate is computed over.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Largest span, in clock ticks, of `m` photons inside a burst.
    pub fn max_span(&self) -> Timestamp {
        self.max_span
    }

    /// Smallest number of photons in a reported burst.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn trailing_burst(&self) -> TrailingBurst {
        self.trailing
    }

    /// Checks the sequence is long enough to hold at least one window.
    pub(crate) fn check_length(&self, len: usize) -> Result<(), ParameterError> {
        if len < self.m {
            Err(ParameterError::TooFewTimestamps { len, m: self.m })
        } else {
            Ok(())
        }
    }
}

impl FromStr for SearchParameters {
    type Err = ParameterError;

    /// Parses the pattern `m,T,L`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals: Vec<_> = s.split(',').map(str::trim).collect();
        if let [m, max_span, min_size] = vals.as_slice() {
            let parse_error = |e: &dyn Display| ParameterError::Parse(format!("'{s}': {e}"));
            Self::new(
                m.parse().map_err(|e| parse_error(&e))?,
                max_span.parse().map_err(|e| parse_error(&e))?,
                min_size.parse().map_err(|e| parse_error(&e))?,
            )
        } else {
            Err(ParameterError::Parse(format!(
                "Incorrect number of parameters, expected pattern 'm,T,L', got '{s}'"
            )))
        }
    }
}

impl Display for SearchParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.m, self.max_span, self.min_size)
    }
}
