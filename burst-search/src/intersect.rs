//! Combines two burst searches over the same timestamp sequence, keeping only
//! the spans where both found a burst (the "AND" rule).
use crate::{
    burst::{Burst, BurstTable},
    error::{BurstSearchError, TableError},
};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Orders bursts by their first photon. Ties in time are broken by index,
/// which only matters for duplicated timestamps.
fn compare_starts(a: &Burst, b: &Burst) -> Ordering {
    (a.start(), a.istart()).cmp(&(b.start(), b.istart()))
}

fn compare_ends(a: &Burst, b: &Burst) -> Ordering {
    (a.end(), a.iend()).cmp(&(b.end(), b.iend()))
}

/// Returns the bursts representing the overlaps between bursts of `a` and `b`.
///
/// Each overlap starts at the later of the two starts and ends at the earlier
/// of the two ends; its width and size are recomputed from that span. Bursts
/// without a partner in the other table are dropped, so the result is empty
/// when the two tables never overlap.
///
/// Both tables must index the same timestamp sequence.
#[tracing::instrument(skip_all, fields(num_a = a.len(), num_b = b.len(), num_bursts))]
pub fn intersect(a: &BurstTable, b: &BurstTable) -> Result<BurstTable, BurstSearchError> {
    if a.num_photons() != b.num_photons() {
        return Err(TableError::SourceMismatch {
            left: a.num_photons(),
            right: b.num_photons(),
        }
        .into());
    }
    debug_assert_eq!(a.validate(), Ok(()));
    debug_assert_eq!(b.validate(), Ok(()));

    let mut bursts = Vec::new();
    let (mut i, mut j) = (0, 0);
    while let (Some(burst_a), Some(burst_b)) = (a.get(i), b.get(j)) {
        // Skip any disjoint burst
        if burst_b.end() < burst_a.start() {
            j += 1;
            continue;
        }
        if burst_a.end() < burst_b.start() {
            i += 1;
            continue;
        }

        let first = match compare_starts(burst_a, burst_b) {
            Ordering::Less => burst_b,
            _ => burst_a,
        };
        let last = match compare_ends(burst_a, burst_b) {
            Ordering::Less => {
                i += 1;
                burst_a
            }
            _ => {
                j += 1;
                burst_b
            }
        };

        // Bursts touching only at a duplicated timestamp share no photon.
        match Burst::new(first.istart(), last.iend(), first.start(), last.end()) {
            Some(burst) => bursts.push(burst),
            None => trace!("Bursts {burst_a} and {burst_b} share no photon"),
        }
    }

    debug!("{} overlapping bursts", bursts.len());
    tracing::Span::current().record("num_bursts", bursts.len());
    Ok(BurstTable::from_sorted(bursts, a.num_photons()))
}
