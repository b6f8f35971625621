//! Pre-master mixer (spec §4.3, component F): `pre_master = dry_sum +
//! sum(return_j * return_level_j)`. Stateless — a single summing function,
//! not a struct, since there is nothing to carry between blocks.

pub const NUM_RETURNS: usize = 4;

pub fn sum_pre_master(
    dry_sum: (f32, f32),
    returns: &[(f32, f32); NUM_RETURNS],
    return_levels: &[f32; NUM_RETURNS],
) -> (f32, f32) {
    let mut left = dry_sum.0;
    let mut right = dry_sum.1;
    for (ret, level) in returns.iter().zip(return_levels.iter()) {
        left += ret.0 * level;
        right += ret.1 * level;
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_only_passes_through_when_returns_zeroed() {
        let out = sum_pre_master((0.3, -0.2), &[(0.0, 0.0); NUM_RETURNS], &[0.0; NUM_RETURNS]);
        assert_eq!(out, (0.3, -0.2));
    }

    #[test]
    fn test_returns_scale_by_level_and_accumulate() {
        let returns = [(1.0, 1.0), (2.0, 0.0), (0.0, 0.0), (0.0, 0.0)];
        let levels = [0.5, 0.25, 0.0, 0.0];
        let out = sum_pre_master((0.0, 0.0), &returns, &levels);
        assert!((out.0 - 1.0).abs() < 1e-5);
        assert!((out.1 - 0.5).abs() < 1e-5);
    }
}
