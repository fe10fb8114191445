//! Time-driven signal sources.

use std::f64::consts::PI;

use tlm_node::{Slot, signal};

use super::OUT;
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

#[derive(Debug, Default)]
pub struct SignalConstant {
    y: f64,
    out: Option<Slot>,
}

impl Component for SignalConstant {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_output_variable(OUT, "Constant value", "-")?;
        decl.register_parameter("y", "Value", "-", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.y = ctx.real("y")?;
        let out = ctx.slot(OUT, signal::VALUE)?;
        ctx.write(out, self.y);
        self.out = Some(out);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(out) = self.out else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.y);
        StepOutcome::Continue
    }
}

/// `y_0` before `t_step`, `y_0 + y_A` from then on.
#[derive(Debug, Default)]
pub struct SignalStep {
    y0: f64,
    amplitude: f64,
    t_step: f64,
    out: Option<Slot>,
}

impl SignalStep {
    fn value(&self, t: f64) -> f64 {
        if t < self.t_step {
            self.y0
        } else {
            self.y0 + self.amplitude
        }
    }
}

impl Component for SignalStep {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_output_variable(OUT, "Step output", "-")?;
        decl.register_parameter("y_0", "Base level", "-", 0.0)?;
        decl.register_parameter("y_A", "Step height", "-", 1.0)?;
        decl.register_parameter("t_step", "Step time", "s", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.y0 = ctx.real("y_0")?;
        self.amplitude = ctx.real("y_A")?;
        self.t_step = ctx.real("t_step")?;
        let out = ctx.slot(OUT, signal::VALUE)?;
        ctx.write(out, self.value(ctx.time()));
        self.out = Some(out);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(out) = self.out else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.value(ctx.time()));
        StepOutcome::Continue
    }
}

/// Linear ramp from `y_0` at `t_start` to `y_0 + y_A` at `t_end`.
#[derive(Debug, Default)]
pub struct SignalRamp {
    y0: f64,
    amplitude: f64,
    t_start: f64,
    t_end: f64,
    out: Option<Slot>,
}

impl SignalRamp {
    fn value(&self, t: f64) -> f64 {
        if t < self.t_start {
            self.y0
        } else if t >= self.t_end {
            self.y0 + self.amplitude
        } else {
            self.y0 + self.amplitude * (t - self.t_start) / (self.t_end - self.t_start)
        }
    }
}

impl Component for SignalRamp {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_output_variable(OUT, "Ramp output", "-")?;
        decl.register_parameter("y_0", "Base level", "-", 0.0)?;
        decl.register_parameter("y_A", "Ramp height", "-", 1.0)?;
        decl.register_parameter("t_start", "Ramp start time", "s", 1.0)?;
        decl.register_parameter("t_end", "Ramp end time", "s", 2.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.y0 = ctx.real("y_0")?;
        self.amplitude = ctx.real("y_A")?;
        self.t_start = ctx.real("t_start")?;
        self.t_end = ctx.real("t_end")?;
        if self.t_end <= self.t_start {
            return Err(ComponentError::init(format!(
                "ramp end time {} must be after start time {}",
                self.t_end, self.t_start
            )));
        }
        let out = ctx.slot(OUT, signal::VALUE)?;
        ctx.write(out, self.value(ctx.time()));
        self.out = Some(out);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(out) = self.out else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.value(ctx.time()));
        StepOutcome::Continue
    }
}

#[derive(Debug, Default)]
pub struct SignalSineWave {
    frequency: f64,
    amplitude: f64,
    offset: f64,
    t_start: f64,
    out: Option<Slot>,
}

impl SignalSineWave {
    fn value(&self, t: f64) -> f64 {
        if t < self.t_start {
            self.offset
        } else {
            self.offset + self.amplitude * (2.0 * PI * self.frequency * (t - self.t_start)).sin()
        }
    }
}

impl Component for SignalSineWave {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_output_variable(OUT, "Sine wave output", "-")?;
        decl.register_parameter("f", "Frequency", "Hz", 1.0)?;
        decl.register_parameter("y_A", "Amplitude", "-", 1.0)?;
        decl.register_parameter("y_offset", "Offset", "-", 0.0)?;
        decl.register_parameter("t_start", "Start time", "s", 0.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.frequency = ctx.real("f")?;
        self.amplitude = ctx.real("y_A")?;
        self.offset = ctx.real("y_offset")?;
        self.t_start = ctx.real("t_start")?;
        let out = ctx.slot(OUT, signal::VALUE)?;
        ctx.write(out, self.value(ctx.time()));
        self.out = Some(out);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(out) = self.out else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.value(ctx.time()));
        StepOutcome::Continue
    }
}
