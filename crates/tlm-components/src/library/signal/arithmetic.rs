//! Memoryless signal arithmetic.

use tlm_core::limit;
use tlm_node::{NODE_SIGNAL, ReadSlot, Requirement, Slot, signal};

use super::{IN, IN1, IN2, OUT};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

#[derive(Debug, Default)]
pub struct SignalGain {
    k: f64,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalGain {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_input_variable(IN, "Input", "-", 0.0)?;
        decl.add_output_variable(OUT, "Output", "-")?;
        decl.register_parameter("k", "Gain", "-", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.k = ctx.real("k")?;
        let input = ctx.read_slot(IN, signal::VALUE)?;
        let out = ctx.slot(OUT, signal::VALUE)?;
        self.io = Some((input, out));
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, self.k * ctx.read(input));
        StepOutcome::Continue
    }
}

/// Sum over every connection of the `in` multiport.
///
/// A sub-port whose node has no writer contributes that node's value,
/// zero unless a start value says otherwise.
#[derive(Debug, Default)]
pub struct SignalSum {
    inputs: Vec<ReadSlot>,
    out: Option<Slot>,
}

impl Component for SignalSum {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_read_multiport(IN, NODE_SIGNAL, Requirement::NotRequired)?;
        decl.add_output_variable(OUT, "Sum of all inputs", "-")
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.inputs = ctx.multi_read_slots(IN, signal::VALUE)?;
        self.out = Some(ctx.slot(OUT, signal::VALUE)?);
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(out) = self.out else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, ctx.sum(&self.inputs));
        StepOutcome::Continue
    }
}

/// Two-input operator with `in1` and `in2` defaulting as declared.
#[derive(Clone, Copy, Debug)]
struct Binary {
    in1: ReadSlot,
    in2: ReadSlot,
    out: Slot,
}

fn declare_binary(decl: &mut Declarations<'_>, in2_default: f64) -> ComponentResult<()> {
    decl.add_input_variable(IN1, "First input", "-", 0.0)?;
    decl.add_input_variable(IN2, "Second input", "-", in2_default)?;
    decl.add_output_variable(OUT, "Output", "-")
}

fn resolve_binary(ctx: &InitContext<'_>) -> ComponentResult<Binary> {
    Ok(Binary {
        in1: ctx.read_slot(IN1, signal::VALUE)?,
        in2: ctx.read_slot(IN2, signal::VALUE)?,
        out: ctx.slot(OUT, signal::VALUE)?,
    })
}

macro_rules! binary_operator {
    ($(#[$doc:meta])* $name:ident, $in2_default:expr, |$a:ident, $b:ident| $op:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            io: Option<Binary>,
        }

        impl Component for $name {
            fn cqs_type(&self) -> CqsType {
                CqsType::Signal
            }

            fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
                declare_binary(decl, $in2_default)
            }

            fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
                self.io = Some(resolve_binary(ctx)?);
                self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
                Ok(())
            }

            fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
                let Some(io) = self.io else {
                    return StepOutcome::not_initialized();
                };
                let ($a, $b) = (ctx.read(io.in1), ctx.read(io.in2));
                ctx.write(io.out, $op);
                StepOutcome::Continue
            }
        }
    };
}

binary_operator!(
    /// `out = in1 + in2`
    SignalAdd, 0.0, |a, b| a + b
);
binary_operator!(
    /// `out = in1 - in2`
    SignalSubtract, 0.0, |a, b| a - b
);
binary_operator!(
    /// `out = in1 * in2`
    SignalMultiply, 0.0, |a, b| a * b
);

/// `out = in1 / in2`.
///
/// A zero denominator while initializing is a warning and the output is
/// set to zero. During the run it stops the simulation.
#[derive(Debug, Default)]
pub struct SignalDivide {
    io: Option<Binary>,
}

impl Component for SignalDivide {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_binary(decl, 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let io = resolve_binary(ctx)?;
        let (num, den) = (ctx.read(io.in1), ctx.read(io.in2));
        if den == 0.0 {
            ctx.warn("Division by zero during initialization, output set to 0");
            ctx.write(io.out, 0.0);
        } else {
            ctx.write(io.out, num / den);
        }
        self.io = Some(io);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(io) = self.io else {
            return StepOutcome::not_initialized();
        };
        let (num, den) = (ctx.read(io.in1), ctx.read(io.in2));
        if den == 0.0 {
            return StepOutcome::Stop(format!("Division by zero in {}", ctx.name()));
        }
        ctx.write(io.out, num / den);
        StepOutcome::Continue
    }
}

#[derive(Debug, Default)]
pub struct SignalSaturation {
    lower: f64,
    upper: f64,
    io: Option<(ReadSlot, Slot)>,
}

impl Component for SignalSaturation {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_input_variable(IN, "Input", "-", 0.0)?;
        decl.add_output_variable(OUT, "Limited output", "-")?;
        decl.register_parameter("y_upper", "Upper limit", "-", 1.0)?;
        decl.register_parameter("y_lower", "Lower limit", "-", -1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.upper = ctx.real("y_upper")?;
        self.lower = ctx.real("y_lower")?;
        if self.lower > self.upper {
            return Err(ComponentError::init(format!(
                "lower limit {} is above upper limit {}",
                self.lower, self.upper
            )));
        }
        self.io = Some((ctx.read_slot(IN, signal::VALUE)?, ctx.slot(OUT, signal::VALUE)?));
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        let (y, _) = limit(ctx.read(input), self.lower, self.upper);
        ctx.write(out, y);
        StepOutcome::Continue
    }
}

/// Terminal for plotting: reads its inputs and writes nothing.
#[derive(Debug, Default)]
pub struct SignalSink;

impl Component for SignalSink {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_read_multiport(IN, NODE_SIGNAL, Requirement::NotRequired)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        ctx.multi_read_slots(IN, signal::VALUE)?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, _ctx: &mut StepContext<'_>) -> StepOutcome {
        StepOutcome::Continue
    }
}
