use vn_core::FocalPoint;

pub(crate) fn next_random_u32(state: &mut u32) -> u32 {
    let mut next = state.wrapping_add(0x6d2b79f5);
    *state = next;
    next = (next ^ (next >> 15)).wrapping_mul(next | 1);
    next ^= next.wrapping_add((next ^ (next >> 7)).wrapping_mul(next | 61));
    next ^ (next >> 14)
}

pub(crate) fn next_random_bounded(state: &mut u32, bound: u32) -> u32 {
    next_random_bounded_with(state, bound, next_random_u32)
}

pub(crate) fn next_random_bounded_with<F>(state: &mut u32, bound: u32, mut next: F) -> u32
where
    F: FnMut(&mut u32) -> u32,
{
    let threshold = (u64::from(u32::MAX) + 1) / u64::from(bound) * u64::from(bound);
    let mut candidate = next(state);
    while u64::from(candidate) >= threshold {
        candidate = next(state);
    }
    candidate % bound
}

/// Uniform camera origin on the integer percent grid `[0, 100]^2`.
pub(crate) fn random_focal_point(state: &mut u32) -> FocalPoint {
    let x = next_random_bounded(state, 101);
    let y = next_random_bounded(state, 101);
    FocalPoint {
        x_percent: f64::from(x),
        y_percent: f64::from(y),
    }
}
