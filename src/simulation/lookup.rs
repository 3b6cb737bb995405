/// Reverse the lowest `bits` bits of `value`
pub fn bit_reverse(value: u32, bits: u32) -> u32 {
    if bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (32 - bits)
}

/// Butterfly index pairs for every level of a size-N transform
///
/// For N = 2^P there are P + 1 levels of N/2 pairs. Level 0 is the
/// bit-reversal permutation: pair i is (rev(i), rev(i + N/2)), written to
/// positions (i, i + N/2). Level l >= 1 combines (k, k + 2^(l-1)) inside
/// groups of size 2^l. A table is only valid for the N it was built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButterflyLookup {
    grid_size_power: u32,
    /// Row-major (level, index) pairs, N/2 per level
    pairs: Vec<[u32; 2]>,
}

impl ButterflyLookup {
    pub fn new(grid_size_power: u32) -> Self {
        let n = 1u32 << grid_size_power;
        let half = n / 2;
        let mut pairs = Vec::with_capacity((half * (grid_size_power + 1)) as usize);

        // Level 0: bit reversal of the index
        for i in 0..half {
            pairs.push([
                bit_reverse(i, grid_size_power),
                bit_reverse(i + half, grid_size_power),
            ]);
        }

        // Levels 1..=P: group size doubles every level
        for level in 1..=grid_size_power {
            let group = 1u32 << level;
            let span = group / 2;
            for start in (0..n).step_by(group as usize) {
                for offset in 0..span {
                    let k = start + offset;
                    pairs.push([k, k + span]);
                }
            }
        }

        Self {
            grid_size_power,
            pairs,
        }
    }

    pub fn grid_size_power(&self) -> u32 {
        self.grid_size_power
    }

    pub fn grid_size(&self) -> u32 {
        1 << self.grid_size_power
    }

    /// Number of levels, P + 1
    pub fn level_count(&self) -> u32 {
        self.grid_size_power + 1
    }

    pub fn pairs_per_level(&self) -> usize {
        (self.grid_size() / 2) as usize
    }

    /// All pairs of one level
    pub fn level(&self, level: u32) -> &[[u32; 2]] {
        let per_level = self.pairs_per_level();
        let start = level as usize * per_level;
        &self.pairs[start..start + per_level]
    }

    pub fn pair(&self, level: u32, index: u32) -> [u32; 2] {
        self.level(level)[index as usize]
    }

    /// Flat table as uploaded to the GPU: `vec2<u32>` per (level, index)
    pub fn as_gpu_words(&self) -> &[u32] {
        bytemuck::cast_slice(&self.pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_reverse() {
        assert_eq!(bit_reverse(0b001, 3), 0b100);
        assert_eq!(bit_reverse(0b110, 3), 0b011);
        assert_eq!(bit_reverse(1, 9), 256);
        assert_eq!(bit_reverse(0, 0), 0);
        for bits in 1..12 {
            for value in [0u32, 1, 5, (1 << bits) - 1] {
                let value = value & ((1 << bits) - 1);
                assert_eq!(bit_reverse(bit_reverse(value, bits), bits), value);
            }
        }
    }

    #[test]
    fn test_table_shape() {
        for power in 6..=11 {
            let lookup = ButterflyLookup::new(power);
            assert_eq!(lookup.level_count(), power + 1);
            for level in 0..lookup.level_count() {
                assert_eq!(lookup.level(level).len(), (1usize << power) / 2);
            }
            assert_eq!(
                lookup.as_gpu_words().len(),
                (1usize << power) * (power as usize + 1)
            );
        }
    }

    #[test]
    fn test_level_zero_is_permutation() {
        for power in [6, 7, 8] {
            let lookup = ButterflyLookup::new(power);
            let n = lookup.grid_size() as usize;
            let mut seen = vec![false; n];
            for [a, b] in lookup.level(0) {
                for index in [*a, *b] {
                    assert!(!seen[index as usize], "Index {} repeated at N={}", index, n);
                    seen[index as usize] = true;
                }
            }
            assert!(seen.iter().all(|s| *s), "Level 0 must cover [0, {})", n);
        }
    }

    #[test]
    fn test_combine_levels_partition() {
        for power in [6, 7, 8] {
            let lookup = ButterflyLookup::new(power);
            let n = lookup.grid_size() as usize;
            for level in 1..lookup.level_count() {
                let mut seen = vec![false; n];
                for [a, b] in lookup.level(level) {
                    assert_eq!(b - a, 1 << (level - 1), "Wrong span at level {}", level);
                    assert!(!seen[*a as usize] && !seen[*b as usize]);
                    seen[*a as usize] = true;
                    seen[*b as usize] = true;
                }
                assert!(seen.iter().all(|s| *s), "Level {} must partition [0, {})", level, n);
            }
        }
    }

    #[test]
    fn test_first_and_last_levels() {
        let lookup = ButterflyLookup::new(3);
        assert_eq!(lookup.level(0), &[[0, 1], [4, 5], [2, 3], [6, 7]]);
        assert_eq!(lookup.level(1), &[[0, 1], [2, 3], [4, 5], [6, 7]]);
        assert_eq!(lookup.level(3), &[[0, 4], [1, 5], [2, 6], [3, 7]]);
    }

    #[test]
    fn test_rebuild_for_smaller_grid() {
        let large = ButterflyLookup::new(9);
        let small = ButterflyLookup::new(7);
        assert_ne!(large, small);
        let max_index = small.as_gpu_words().iter().copied().max().unwrap();
        assert!(max_index < 128, "No entry may address beyond the active grid");
    }
}
