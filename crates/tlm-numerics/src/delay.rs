//! Fixed-length delay line.

/// Ring buffer delaying a signal by a whole number of steps.
///
/// After `initialize_steps(n, init)` the first `n` calls to [`Delay::update`]
/// return `init`; call `n` returns the value pushed on call 0.
#[derive(Clone, Debug)]
pub struct Delay {
    buf: Vec<f64>,
    oldest: usize,
    newest: usize,
}

impl Default for Delay {
    fn default() -> Self {
        Self::new(1, 0.0)
    }
}

impl Delay {
    pub fn new(steps: usize, init: f64) -> Self {
        let mut d = Self {
            buf: Vec::new(),
            oldest: 0,
            newest: 0,
        };
        d.initialize_steps(steps, init);
        d
    }

    /// Size the ring for `steps` steps (at least one) and fill it with `init`.
    pub fn initialize_steps(&mut self, steps: usize, init: f64) {
        let size = steps.max(1);
        self.buf.clear();
        self.buf.resize(size, init);
        self.oldest = 0;
        self.newest = size - 1;
    }

    /// Size the ring from a time delay, rounding to the nearest step.
    pub fn initialize_time(&mut self, time_delay: f64, timestep: f64, init: f64) {
        let steps = (time_delay / timestep + 0.5).floor();
        let steps = if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        };
        self.initialize_steps(steps, init);
    }

    /// Push `value`, returning the value it evicts.
    pub fn update(&mut self, value: f64) -> f64 {
        let out = self.buf[self.oldest];
        self.oldest = (self.oldest + 1) % self.buf.len();
        self.newest = (self.newest + 1) % self.buf.len();
        self.buf[self.newest] = value;
        out
    }

    pub fn oldest(&self) -> f64 {
        self.buf[self.oldest]
    }

    pub fn newest(&self) -> f64 {
        self.buf[self.newest]
    }

    /// Value `i` steps back from the newest (0 = newest).
    pub fn value(&self, i: usize) -> Option<f64> {
        if i >= self.buf.len() {
            return None;
        }
        let n = self.buf.len();
        Some(self.buf[(self.newest + n - i) % n])
    }

    /// Value `i` steps forward from the oldest (0 = oldest).
    pub fn old_value(&self, i: usize) -> Option<f64> {
        if i >= self.buf.len() {
            return None;
        }
        Some(self.buf[(self.oldest + i) % self.buf.len()])
    }

    /// Number of steps of delay.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_reappears_after_n_steps() {
        let mut d = Delay::new(3, 0.0);
        let outputs: Vec<f64> = (0..6)
            .map(|k| d.update(if k == 0 { 1.0 } else { 0.0 }))
            .collect();
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_steps_behaves_as_one() {
        let mut d = Delay::new(0, 5.0);
        assert_eq!(d.len(), 1);
        assert_eq!(d.update(1.0), 5.0);
        assert_eq!(d.update(2.0), 1.0);
    }

    #[test]
    fn time_initialization_rounds() {
        let mut d = Delay::default();
        d.initialize_time(0.0104, 0.001, 0.0);
        assert_eq!(d.len(), 10);
        d.initialize_time(0.0106, 0.001, 0.0);
        assert_eq!(d.len(), 11);
    }

    #[test]
    fn readers_do_not_mutate() {
        let mut d = Delay::new(3, 0.0);
        d.update(1.0);
        d.update(2.0);
        d.update(3.0);
        assert_eq!(d.newest(), 3.0);
        assert_eq!(d.oldest(), 1.0);
        assert_eq!(d.value(0), Some(3.0));
        assert_eq!(d.value(2), Some(1.0));
        assert_eq!(d.value(3), None);
        assert_eq!(d.old_value(1), Some(2.0));
        assert_eq!(d.old_value(9), None);
        assert_eq!(d.update(4.0), 1.0);
    }

    #[test]
    fn reinitialize_reseeds() {
        let mut d = Delay::new(2, 0.0);
        d.update(9.0);
        d.initialize_steps(2, 0.0);
        assert_eq!(d.update(1.0), 0.0);
        assert_eq!(d.update(1.0), 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn delay_is_a_pure_shift(n in 1usize..20, input in prop::collection::vec(-1e3_f64..1e3, 1..60)) {
            let mut d = Delay::new(n, 0.0);
            for (k, &u) in input.iter().enumerate() {
                let y = d.update(u);
                let expected = if k >= n { input[k - n] } else { 0.0 };
                prop_assert_eq!(y.to_bits(), expected.to_bits());
            }
        }
    }
}
