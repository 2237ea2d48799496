//! storage.rs
//! Dense CSR adjacency: one flat target array plus a (start, count) range per row.

use super::error::GraphError;

/// Row-compressed adjacency table. Every row is sorted ascending and free of
/// duplicates once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency<T> {
    targets: Vec<T>,
    ranges: Vec<(u32, u32)>,
}

impl<T> Default for Adjacency<T> {
    fn default() -> Self {
        Self { targets: Vec::new(), ranges: Vec::new() }
    }
}

impl<T: Copy + Ord> Adjacency<T> {
    /// Packs scratch rows into CSR form, sorting and deduplicating each row.
    /// Fails when the packed table would not be addressable by `u32` offsets.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GraphError> {
        let total: usize = rows.iter().map(Vec::len).sum();
        let mut targets = Vec::with_capacity(total);
        let mut ranges = Vec::with_capacity(rows.len());

        for mut row in rows {
            row.sort_unstable();
            row.dedup();
            let start = offset(targets.len())?;
            offset(targets.len() + row.len())?;
            ranges.push((start, row.len() as u32));
            targets.extend_from_slice(&row);
        }

        Ok(Self { targets, ranges })
    }

    /// Builds the inverse relation: if `b` appears in row `a`, then `a`
    /// appears in row `b` of the result. `to_id` maps a row number back to `T`.
    pub fn transpose(
        &self,
        row_count: usize,
        to_id: impl Fn(usize) -> T,
        index: impl Fn(T) -> usize,
    ) -> Result<Self, GraphError> {
        let mut rows = vec![Vec::new(); row_count];
        for (src, _) in self.ranges.iter().enumerate() {
            for &dst in self.row(src) {
                rows[index(dst)].push(to_id(src));
            }
        }
        Self::from_rows(rows)
    }
}

/// Row offsets are `u32`; the end of every row must fit.
fn offset(entries: usize) -> Result<u32, GraphError> {
    u32::try_from(entries).map_err(|_| GraphError::AdjacencyOverflow { entries })
}

impl<T> Adjacency<T> {
    #[inline(always)]
    pub fn row(&self, idx: usize) -> &[T] {
        let (start, count) = self.ranges[idx];
        &self.targets[start as usize..(start + count) as usize]
    }

    #[inline(always)]
    pub fn row_len(&self, idx: usize) -> usize {
        self.ranges[idx].1 as usize
    }

    pub fn row_count(&self) -> usize { self.ranges.len() }

    /// Total number of stored entries across all rows.
    pub fn edge_count(&self) -> usize { self.targets.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_sorted_and_deduplicated() {
        let adj = Adjacency::from_rows(vec![vec![3u32, 1, 3, 2], vec![], vec![7, 7]]).unwrap();
        assert_eq!(adj.row_count(), 3);
        assert_eq!(adj.row(0), &[1, 2, 3]);
        assert!(adj.row(1).is_empty());
        assert_eq!(adj.row(2), &[7]);
        assert_eq!(adj.row_len(0), 3);
        assert_eq!(adj.edge_count(), 4);
    }

    #[test]
    fn test_transpose() {
        // 0 -> {1, 2}, 1 -> {2}, 2 -> {}
        let adj = Adjacency::from_rows(vec![vec![2u32, 1], vec![2], vec![]]).unwrap();
        let inv = adj.transpose(3, |i| i as u32, |t| t as usize).unwrap();
        assert!(inv.row(0).is_empty());
        assert_eq!(inv.row(1), &[0]);
        assert_eq!(inv.row(2), &[0, 1]);
    }

    #[test]
    fn test_offsets_past_u32_are_rejected() {
        assert_eq!(offset(u32::MAX as usize), Ok(u32::MAX));
        let past = u32::MAX as usize + 1;
        assert_eq!(offset(past), Err(GraphError::AdjacencyOverflow { entries: past }));
    }
}
