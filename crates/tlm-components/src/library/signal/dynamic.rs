//! Signal components with memory: delays, integrators and filters.
//!
//! Each one seeds its state from the current input and the output start
//! value, so `out#Value` chooses where the output begins.

use tlm_node::{ReadSlot, Slot, signal};
use tlm_numerics::{
    Delay, FirstOrderTransferFunction, Integrator, IntegratorLimited, Limits,
    SecondOrderTransferFunction, first_order_low_pass,
};

use super::{IN, OUT, UNBOUNDED};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::ComponentResult;

fn declare_siso(decl: &mut Declarations<'_>) -> ComponentResult<()> {
    decl.add_input_variable(IN, "Input", "-", 0.0)?;
    decl.add_output_variable(OUT, "Output", "-")
}

fn resolve_siso(ctx: &InitContext<'_>) -> ComponentResult<(ReadSlot, Slot)> {
    Ok((ctx.read_slot(IN, signal::VALUE)?, ctx.slot(OUT, signal::VALUE)?))
}

fn declare_output_limits(decl: &mut Declarations<'_>) -> ComponentResult<()> {
    decl.register_parameter("y_min", "Lower output limit", "-", -UNBOUNDED)?;
    decl.register_parameter("y_max", "Upper output limit", "-", UNBOUNDED)
}

fn output_limits(ctx: &InitContext<'_>) -> ComponentResult<Limits> {
    Ok(Limits::new(ctx.real("y_min")?, ctx.real("y_max")?)?)
}

/// Output is the input from the previous step.
#[derive(Debug, Default)]
pub struct SignalUnitDelay {
    delay: Delay,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalUnitDelay {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let (input, out) = resolve_siso(ctx)?;
        self.delay.initialize_steps(1, ctx.read(out));
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.delay.update(ctx.read(input)));
        StepOutcome::Continue
    }

    fn breaks_algebraic_loops(&self) -> bool {
        true
    }
}

/// Delays the input by `deltat`, rounded to whole steps (at least one).
#[derive(Debug, Default)]
pub struct SignalTimeDelay {
    delay: Delay,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalTimeDelay {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)?;
        decl.add_constant("deltat", "Time delay", "s", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let deltat = ctx.real("deltat")?;
        let (input, out) = resolve_siso(ctx)?;
        self.delay
            .initialize_time(deltat, ctx.timestep(), ctx.read(out));
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.delay.update(ctx.read(input)));
        StepOutcome::Continue
    }

    fn breaks_algebraic_loops(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct SignalIntegrator {
    integrator: Integrator,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalIntegrator {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let (input, out) = resolve_siso(ctx)?;
        self.integrator
            .initialize(ctx.timestep(), ctx.read(input), ctx.read(out));
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.integrator.update(ctx.read(input)));
        StepOutcome::Continue
    }
}

/// Integrator held inside `[y_min, y_max]` without windup.
#[derive(Debug, Default)]
pub struct SignalIntegratorLimited {
    integrator: IntegratorLimited,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalIntegratorLimited {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)?;
        decl.register_parameter("y_min", "Lower limit", "-", -1.0)?;
        decl.register_parameter("y_max", "Upper limit", "-", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let (min, max) = (ctx.real("y_min")?, ctx.real("y_max")?);
        let (input, out) = resolve_siso(ctx)?;
        self.integrator
            .initialize(ctx.timestep(), 0.0, ctx.read(out), min, max)?;
        ctx.write(out, self.integrator.value());
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.integrator.update(ctx.read(input)));
        StepOutcome::Continue
    }
}

/// `(num_1 s + num_0) / (den_1 s + den_0)` with output limits.
#[derive(Debug, Default)]
pub struct SignalFirstOrderTransferFunction {
    tf: FirstOrderTransferFunction,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalFirstOrderTransferFunction {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)?;
        decl.register_parameter("num_0", "Numerator constant term", "-", 1.0)?;
        decl.register_parameter("num_1", "Numerator s term", "-", 0.0)?;
        decl.register_parameter("den_0", "Denominator constant term", "-", 1.0)?;
        decl.register_parameter("den_1", "Denominator s term", "-", 1.0)?;
        declare_output_limits(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let num = [ctx.real("num_0")?, ctx.real("num_1")?];
        let den = [ctx.real("den_0")?, ctx.real("den_1")?];
        let limits = output_limits(ctx)?;
        let (input, out) = resolve_siso(ctx)?;
        self.tf.initialize(
            ctx.timestep(),
            num,
            den,
            ctx.read(input),
            ctx.read(out),
            limits,
        )?;
        ctx.write(out, self.tf.value());
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.tf.update(ctx.read(input)));
        StepOutcome::Continue
    }
}

/// Second order rational transfer function with output limits.
#[derive(Debug, Default)]
pub struct SignalSecondOrderTransferFunction {
    tf: SecondOrderTransferFunction,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalSecondOrderTransferFunction {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)?;
        for (i, default) in [1.0, 0.0, 0.0].into_iter().enumerate() {
            let name = format!("num_{i}");
            decl.register_parameter(&name, "Numerator coefficient", "-", default)?;
        }
        for i in 0..3 {
            let name = format!("den_{i}");
            decl.register_parameter(&name, "Denominator coefficient", "-", 1.0)?;
        }
        declare_output_limits(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let num = [ctx.real("num_0")?, ctx.real("num_1")?, ctx.real("num_2")?];
        let den = [ctx.real("den_0")?, ctx.real("den_1")?, ctx.real("den_2")?];
        let limits = output_limits(ctx)?;
        let (input, out) = resolve_siso(ctx)?;
        self.tf.initialize(
            ctx.timestep(),
            num,
            den,
            ctx.read(input),
            ctx.read(out),
            limits,
        )?;
        ctx.write(out, self.tf.value());
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.tf.update(ctx.read(input)));
        StepOutcome::Continue
    }
}

/// First order low pass with break frequency `w_c`.
#[derive(Debug, Default)]
pub struct SignalLowPassFilter {
    tf: FirstOrderTransferFunction,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalLowPassFilter {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_siso(decl)?;
        decl.register_parameter("w_c", "Break frequency", "rad/s", 1000.0)?;
        declare_output_limits(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let wc = ctx.real("w_c")?;
        let limits = output_limits(ctx)?;
        let (input, out) = resolve_siso(ctx)?;
        self.tf = first_order_low_pass(wc, ctx.timestep(), ctx.read(input), ctx.read(out), limits)?;
        ctx.write(out, self.tf.value());
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.tf.update(ctx.read(input)));
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use tlm_node::signal;

    use crate::testing::Rig;

    /// Drive `key` from a step source and record `out` each step.
    fn respond(key: &str, setup: impl FnOnce(&mut Rig, usize), steps: usize) -> Vec<f64> {
        let mut rig = Rig::new(0.1);
        let src = rig.add("SignalStep");
        rig.set(src, "t_step", 0.0);
        let comp = rig.add(key);
        setup(&mut rig, comp);
        rig.connect(&[(src, "out"), (comp, "in")]);
        rig.initialize().unwrap();
        (0..steps)
            .map(|_| {
                assert_eq!(rig.step(), None);
                rig.read(comp, "out", signal::VALUE)
            })
            .collect()
    }

    #[test]
    fn unit_delay_lags_one_step() {
        let mut rig = Rig::new(0.1);
        let ramp = rig.add("SignalRamp");
        rig.set(ramp, "t_start", 0.0);
        rig.set(ramp, "t_end", 1.0);
        rig.set(ramp, "y_A", 10.0);
        let delay = rig.add("SignalUnitDelay");
        rig.set(delay, "out#Value", -1.0);
        rig.connect(&[(ramp, "out"), (delay, "in")]);
        rig.initialize().unwrap();
        assert!(rig.comps[delay].breaks_algebraic_loops());
        let mut prev = -1.0;
        for _ in 0..5 {
            assert_eq!(rig.step(), None);
            assert_eq!(rig.read(delay, "out", signal::VALUE), prev);
            prev = rig.read(ramp, "out", signal::VALUE);
        }
    }

    #[test]
    fn time_delay_rounds_to_whole_steps() {
        let out = respond(
            "SignalTimeDelay",
            |rig, c| rig.set(c, "deltat", 0.3),
            5,
        );
        // the step source reads 1 from initialize on
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn zero_time_delay_acts_as_unit_delay() {
        let out = respond("SignalTimeDelay", |rig, c| rig.set(c, "deltat", 0.0), 2);
        assert_eq!(out, vec![0.0, 1.0]);
    }

    #[test]
    fn integrator_accumulates_trapezoids() {
        let out = respond("SignalIntegrator", |_, _| {}, 3);
        // input is already 1 when the integrator initializes
        for (i, y) in out.iter().enumerate() {
            assert!((y - 0.1 * (i + 1) as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn limited_integrator_holds_at_limit() {
        let out = respond(
            "SignalIntegratorLimited",
            |rig, c| rig.set(c, "y_max", 0.25),
            5,
        );
        assert_eq!(out[4], 0.25);
        assert!(out[..2].iter().all(|y| *y < 0.25));
    }

    #[test]
    fn first_order_settles_at_dc_gain() {
        let out = respond(
            "SignalFirstOrderTransferFunction",
            |rig, c| {
                rig.set(c, "num_0", 3.0);
                rig.set(c, "den_1", 0.2);
            },
            200,
        );
        assert!((out[199] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn first_order_output_limit() {
        let out = respond(
            "SignalFirstOrderTransferFunction",
            |rig, c| {
                rig.set(c, "num_0", 3.0);
                rig.set(c, "y_max", 2.0);
            },
            100,
        );
        assert!(out.iter().all(|y| *y <= 2.0));
        assert_eq!(out[99], 2.0);
    }

    #[test]
    fn second_order_settles_at_dc_gain() {
        let out = respond(
            "SignalSecondOrderTransferFunction",
            |rig, c| {
                rig.set(c, "num_0", 2.0);
                rig.set(c, "den_2", 0.01);
                rig.set(c, "den_1", 0.1);
            },
            400,
        );
        assert!((out[399] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn low_pass_filter_rises_monotonically() {
        let out = respond("SignalLowPassFilter", |rig, c| rig.set(c, "w_c", 10.0), 50);
        assert!(out.windows(2).all(|w| w[1] >= w[0] - 1e-12));
        assert!((out[49] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn singular_denominator_fails_initialize() {
        let mut rig = Rig::new(0.1);
        let tf = rig.add("SignalFirstOrderTransferFunction");
        rig.set(tf, "den_0", 20.0);
        rig.set(tf, "den_1", -1.0);
        assert!(rig.initialize().is_err());
    }
}
