//! Signal components: sources, arithmetic, dynamics and tables.

mod arithmetic;
mod dynamic;
mod sources;
mod table;

pub use arithmetic::{
    SignalAdd, SignalDivide, SignalGain, SignalMultiply, SignalSaturation, SignalSink,
    SignalSubtract, SignalSum,
};
pub use dynamic::{
    SignalFirstOrderTransferFunction, SignalIntegrator, SignalIntegratorLimited,
    SignalLowPassFilter, SignalSecondOrderTransferFunction, SignalTimeDelay, SignalUnitDelay,
};
pub use sources::{SignalConstant, SignalRamp, SignalSineWave, SignalStep};
pub use table::SignalLookupTable;

use crate::registry::ComponentRegistry;

pub(crate) const IN: &str = "in";
pub(crate) const IN1: &str = "in1";
pub(crate) const IN2: &str = "in2";
pub(crate) const OUT: &str = "out";

/// Default output limits, wide enough to be inactive.
pub(crate) const UNBOUNDED: f64 = 1.5e300;

pub fn register(reg: &mut ComponentRegistry) {
    reg.register("SignalConstant", || Box::new(SignalConstant::default()));
    reg.register("SignalStep", || Box::new(SignalStep::default()));
    reg.register("SignalRamp", || Box::new(SignalRamp::default()));
    reg.register("SignalSineWave", || Box::new(SignalSineWave::default()));
    reg.register("SignalGain", || Box::new(SignalGain::default()));
    reg.register("SignalSum", || Box::new(SignalSum::default()));
    reg.register("SignalAdd", || Box::new(SignalAdd::default()));
    reg.register("SignalSubtract", || Box::new(SignalSubtract::default()));
    reg.register("SignalMultiply", || Box::new(SignalMultiply::default()));
    reg.register("SignalDivide", || Box::new(SignalDivide::default()));
    reg.register("SignalSaturation", || Box::new(SignalSaturation::default()));
    reg.register("SignalUnitDelay", || Box::new(SignalUnitDelay::default()));
    reg.register("SignalTimeDelay", || Box::new(SignalTimeDelay::default()));
    reg.register("SignalIntegrator", || Box::new(SignalIntegrator::default()));
    reg.register("SignalIntegratorLimited", || {
        Box::new(SignalIntegratorLimited::default())
    });
    reg.register("SignalFirstOrderTransferFunction", || {
        Box::new(SignalFirstOrderTransferFunction::default())
    });
    reg.register("SignalSecondOrderTransferFunction", || {
        Box::new(SignalSecondOrderTransferFunction::default())
    });
    reg.register("SignalLowPassFilter", || Box::new(SignalLowPassFilter::default()));
    reg.register("SignalLookupTable", || Box::new(SignalLookupTable::default()));
    reg.register("SignalSink", || Box::new(SignalSink::default()));
}
