/// Floating point type used throughout the simulator.
pub type Real = f64;

/// Clamp `value` into `[min, max]`.
///
/// Uses strict comparisons, so a value sitting exactly on a limit is returned
/// untouched. The flag reports whether clamping happened.
pub fn limit(value: Real, min: Real, max: Real) -> (Real, bool) {
    if value > max {
        (max, true)
    } else if value < min {
        (min, true)
    } else {
        (value, false)
    }
}

/// Sign of `x` with `sign(0) == 0`.
pub fn sign(x: Real) -> Real {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Number of fixed steps needed to go from `from` to `to`, rounded to nearest.
pub fn num_steps(from: Real, to: Real, timestep: Real) -> usize {
    let n = ((to - from) / timestep + 0.5).floor();
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_strict_at_boundaries() {
        assert_eq!(limit(10.0, 0.0, 10.0), (10.0, false));
        assert_eq!(limit(0.0, 0.0, 10.0), (0.0, false));
        assert_eq!(limit(15.0, 0.0, 10.0), (10.0, true));
        assert_eq!(limit(-1.0, 0.0, 10.0), (0.0, true));
    }

    #[test]
    fn num_steps_rounds_to_nearest() {
        assert_eq!(num_steps(0.0, 1.0, 0.001), 1000);
        assert_eq!(num_steps(0.0, 0.0104, 0.001), 10);
        assert_eq!(num_steps(0.0, 0.0106, 0.001), 11);
        assert_eq!(num_steps(1.0, 0.0, 0.001), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn limit_stays_in_range(v in -1e6_f64..1e6, lo in -100.0_f64..0.0, hi in 0.0_f64..100.0) {
            let (y, clamped) = limit(v, lo, hi);
            prop_assert!(y >= lo && y <= hi);
            prop_assert_eq!(clamped, v > hi || v < lo);
        }
    }
}
