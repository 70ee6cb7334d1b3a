// Occurrence table for FM-index rank queries
//
// The BWT is cut into 64-row blocks. Each block stores, for every code, the
// number of occurrences before the block and a one-hot bit word marking the
// rows inside the block that hold that code (row `i` of the block is bit
// `63 - i`). `occ(c, i)` is then one table read plus a popcount.

use crate::defaults::OCC_INTERVAL_SHIFT;

const OCC_INTERVAL: usize = 1 << OCC_INTERVAL_SHIFT;
const OCC_MASK: usize = OCC_INTERVAL - 1;

// Compile-time one-hot mask array: ONE_HOT_MASK_ARRAY[i] has the top i bits set
const ONE_HOT_MASK_ARRAY: [u64; 64] = {
    let base: u64 = 0x8000000000000000;
    let mut array = [0u64; 64];
    array[1] = base;
    let mut i = 2;
    while i < 64 {
        array[i] = (array[i - 1] >> 1) | base;
        i += 1;
    }
    array
};

#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    sigma: usize,
    /// `(blocks + 1) * sigma` cumulative counts.
    checkpoint_counts: Vec<u64>,
    /// `(blocks + 1) * sigma` one-hot words.
    bwt_encoding_bits: Vec<u64>,
}

impl OccurrenceTable {
    pub fn new(bwt: &[u8], sigma: usize) -> Self {
        let checkpoints = (bwt.len() >> OCC_INTERVAL_SHIFT) + 1;
        let mut checkpoint_counts = vec![0u64; checkpoints * sigma];
        let mut bwt_encoding_bits = vec![0u64; checkpoints * sigma];
        let mut running = vec![0u64; sigma];

        for (row, &code) in bwt.iter().enumerate() {
            let block = row >> OCC_INTERVAL_SHIFT;
            let offset = row & OCC_MASK;
            if offset == 0 {
                checkpoint_counts[block * sigma..(block + 1) * sigma].copy_from_slice(&running);
            }
            bwt_encoding_bits[block * sigma + code as usize] |= 1u64 << (63 - offset);
            running[code as usize] += 1;
        }
        // A final checkpoint at a block boundary still needs its counts.
        if bwt.len() & OCC_MASK == 0 {
            let block = bwt.len() >> OCC_INTERVAL_SHIFT;
            checkpoint_counts[block * sigma..(block + 1) * sigma].copy_from_slice(&running);
        }

        Self {
            sigma,
            checkpoint_counts,
            bwt_encoding_bits,
        }
    }

    /// Occurrences of `code` in `bwt[0..row]`.
    #[inline(always)]
    pub fn occ(&self, code: u8, row: usize) -> u64 {
        let i = (row >> OCC_INTERVAL_SHIFT) * self.sigma + code as usize;
        let mask = ONE_HOT_MASK_ARRAY[row & OCC_MASK];
        self.checkpoint_counts[i] + (self.bwt_encoding_bits[i] & mask).count_ones() as u64
    }

    /// Occurrences of codes smaller than `code` in `bwt[lo..hi]`.
    #[inline]
    pub fn smaller_in_range(&self, code: u8, lo: usize, hi: usize) -> u64 {
        (0..code).map(|c| self.occ(c, hi) - self.occ(c, lo)).sum()
    }
}
