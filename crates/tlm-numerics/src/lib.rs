//! Discrete-time numerical primitives used inside component equations.
//!
//! Every primitive is a small stateful operator advanced once per simulation
//! step. Continuous dynamics are discretised with the bilinear (Tustin)
//! transform, `s = 2/T * (1 - z^-1) / (1 + z^-1)`, which turns each transfer
//! function into a constant-coefficient difference equation.
//!
//! # Conventions
//!
//! - `initialize(..)` re-seeds every piece of history, so a re-initialised
//!   run reproduces the previous run bit for bit
//! - `update(..)` advances one step and returns the new output
//! - limits are optional and use strict comparisons, so a value exactly on a
//!   limit is not treated as saturated
//! - on saturation the history is rewritten to the limit, so the operator
//!   does not wind up while it is held against a bound
//!
//! # Example
//!
//! ```
//! use tlm_numerics::{Integrator, IntegratorLimited};
//!
//! let mut i = Integrator::new(0.1, 0.0, 0.0);
//! for _ in 0..10 {
//!     i.update(1.0);
//! }
//! assert!((i.value() - 1.0).abs() < 1e-12);
//!
//! let mut lim = IntegratorLimited::new(1.0, 0.0, 0.0, 0.0, 10.0).unwrap();
//! assert_eq!(lim.update(30.0), 10.0);
//! ```

pub mod csv;
pub mod delay;
pub mod double_integrator;
pub mod error;
pub mod integrator;
pub mod lookup;
pub mod transfer;
pub mod turbulent;

pub use csv::{CsvOptions, CsvParser};
pub use delay::Delay;
pub use double_integrator::DoubleIntegratorWithDamping;
pub use error::{NumericsError, NumericsResult};
pub use integrator::{Integrator, IntegratorLimited, Limits};
pub use lookup::{LookupTable1D, Monotonicity};
pub use transfer::{
    FirstOrderTransferFunction, SecondOrderTransferFunction, first_order_low_pass,
};
pub use turbulent::TurbulentFlowFunction;
