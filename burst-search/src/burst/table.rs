use super::Burst;
use crate::error::{BurstSearchError, TableError};
use burstsearch_common::{PhotonIndex, Timestamp};

/// The bursts found in one timestamp sequence, ordered by start time.
///
/// Bursts never share a photon: for consecutive bursts `istart[k+1] > iend[k]`.
/// The table also records the length of the sequence it indexes, which is
/// what selection masks are checked against.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BurstTable {
    bursts: Vec<Burst>,
    num_photons: usize,
}

impl BurstTable {
    /// Builds a table from caller supplied bursts, checking every table invariant.
    pub fn new(bursts: Vec<Burst>, num_photons: usize) -> Result<Self, BurstSearchError> {
        let table = Self {
            bursts,
            num_photons,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn empty(num_photons: usize) -> Self {
        Self {
            bursts: Vec::new(),
            num_photons,
        }
    }

    /// For bursts which are ordered by construction.
    pub(crate) fn from_sorted(bursts: Vec<Burst>, num_photons: usize) -> Self {
        let table = Self {
            bursts,
            num_photons,
        };
        debug_assert_eq!(table.validate(), Ok(()));
        table
    }

    /// Checks that the bursts are ordered, disjoint and within the source sequence.
    pub fn validate(&self) -> Result<(), TableError> {
        for (index, burst) in self.bursts.iter().enumerate() {
            if burst.iend >= self.num_photons {
                return Err(TableError::OutOfRange {
                    index,
                    iend: burst.iend,
                    num_photons: self.num_photons,
                });
            }
            if burst.istart > burst.iend {
                return Err(TableError::InvertedBurst {
                    index,
                    istart: burst.istart,
                    iend: burst.iend,
                });
            }
            if burst.start > burst.end {
                return Err(TableError::InvertedTimes {
                    index,
                    start: burst.start,
                    end: burst.end,
                });
            }
        }
        for (index, pair) in self.bursts.windows(2).enumerate() {
            if let [previous, next] = pair {
                if next.istart <= previous.iend || next.start < previous.end {
                    return Err(TableError::Unordered { index: index + 1 });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    /// Length of the timestamp sequence the bursts index into.
    pub fn num_photons(&self) -> usize {
        self.num_photons
    }

    pub fn get(&self, index: usize) -> Option<&Burst> {
        self.bursts.get(index)
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Burst> {
        self.bursts.iter()
    }

    /// Keeps only the bursts matching `predicate`.
    /// Removing rows cannot break ordering, so the result is always a valid table.
    pub fn select<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Burst) -> bool,
    {
        Self {
            bursts: self.bursts.iter().filter(|b| predicate(b)).copied().collect(),
            num_photons: self.num_photons,
        }
    }

    pub fn starts(&self) -> Vec<Timestamp> {
        self.bursts.iter().map(Burst::start).collect()
    }

    pub fn ends(&self) -> Vec<Timestamp> {
        self.bursts.iter().map(Burst::end).collect()
    }

    pub fn widths(&self) -> Vec<Timestamp> {
        self.bursts.iter().map(Burst::width).collect()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.bursts.iter().map(Burst::size).collect()
    }

    pub fn istarts(&self) -> Vec<PhotonIndex> {
        self.bursts.iter().map(Burst::istart).collect()
    }

    pub fn iends(&self) -> Vec<PhotonIndex> {
        self.bursts.iter().map(Burst::iend).collect()
    }

    pub fn ph_rates(&self) -> Vec<Option<f64>> {
        self.bursts.iter().map(Burst::ph_rate).collect()
    }

    /// Time between the end of each burst and the start of the next one.
    /// Has one element fewer than the table.
    pub fn separations(&self) -> Vec<Timestamp> {
        self.bursts
            .iter()
            .zip(self.bursts.iter().skip(1))
            .map(|(previous, next)| next.start() - previous.end())
            .collect()
    }

    pub fn to_rows(&self) -> Vec<[i64; 6]> {
        self.bursts.iter().map(Burst::to_row).collect()
    }
}

impl<'a> IntoIterator for &'a BurstTable {
    type Item = &'a Burst;
    type IntoIter = std::slice::Iter<'a, Burst>;

    fn into_iter(self) -> Self::IntoIter {
        self.bursts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst(istart: PhotonIndex, iend: PhotonIndex, start: Timestamp, end: Timestamp) -> Burst {
        Burst::new(istart, iend, start, end).unwrap()
    }

    fn two_bursts() -> BurstTable {
        BurstTable::new(vec![burst(0, 3, 0, 3), burst(4, 7, 10, 13)], 8).unwrap()
    }

    #[test]
    fn columns() {
        let table = two_bursts();
        assert_eq!(table.len(), 2);
        assert_eq!(table.starts(), vec![0, 10]);
        assert_eq!(table.ends(), vec![3, 13]);
        assert_eq!(table.widths(), vec![3, 3]);
        assert_eq!(table.sizes(), vec![4, 4]);
        assert_eq!(table.istarts(), vec![0, 4]);
        assert_eq!(table.iends(), vec![3, 7]);
        assert_eq!(table.separations(), vec![7]);
        assert_eq!(
            table.to_rows(),
            vec![[0, 3, 4, 0, 3, 3], [10, 3, 4, 4, 7, 13]]
        );
    }

    #[test]
    fn empty_table() {
        let table = BurstTable::empty(10);
        assert!(table.is_empty());
        assert_eq!(table.num_photons(), 10);
        assert!(table.separations().is_empty());
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn select_keeps_matching_rows() {
        let table = two_bursts();
        let late = table.select(|b| b.start() >= 10);
        assert_eq!(late.len(), 1);
        assert_eq!(late.istarts(), vec![4]);
        assert_eq!(late.num_photons(), 8);
        assert_eq!(late.validate(), Ok(()));
    }

    #[test]
    fn overlapping_bursts_are_rejected() {
        let result = BurstTable::new(vec![burst(0, 4, 0, 4), burst(4, 7, 10, 13)], 8);
        assert_eq!(
            result,
            Err(BurstSearchError::InvalidInput(TableError::Unordered {
                index: 1
            }))
        );
    }

    #[test]
    fn unordered_bursts_are_rejected() {
        let result = BurstTable::new(vec![burst(4, 7, 10, 13), burst(0, 3, 0, 3)], 8);
        assert!(matches!(
            result,
            Err(BurstSearchError::InvalidInput(TableError::Unordered { .. }))
        ));
    }

    #[test]
    fn out_of_range_bursts_are_rejected() {
        let result = BurstTable::new(vec![burst(4, 8, 10, 14)], 8);
        assert_eq!(
            result,
            Err(BurstSearchError::InvalidInput(TableError::OutOfRange {
                index: 0,
                iend: 8,
                num_photons: 8
            }))
        );
    }

    #[test]
    fn iterate() {
        let table = two_bursts();
        let total: usize = (&table).into_iter().map(Burst::size).sum();
        assert_eq!(total, 8);
        assert_eq!(table.get(1).map(Burst::start), Some(10));
        assert_eq!(table.get(2), None);
    }
}
