//! Sensors that copy one node variable to a signal output.

/// Define a Signal-type component reading `$offset` of a required read
/// port `P1` on a `$node` node and writing it to `out`.
macro_rules! node_sensor {
    ($(#[$doc:meta])* $name:ident, $node:expr, $offset:expr, $what:literal, $unit:literal) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            io: Option<(tlm_node::ReadSlot, tlm_node::Slot)>,
        }

        impl $crate::component::Component for $name {
            fn cqs_type(&self) -> $crate::component::CqsType {
                $crate::component::CqsType::Signal
            }

            fn configure(
                &mut self,
                decl: &mut $crate::declare::Declarations<'_>,
            ) -> $crate::error::ComponentResult<()> {
                decl.add_read_port("P1", $node, tlm_node::Requirement::Required)?;
                decl.add_output_variable("out", $what, $unit)
            }

            fn initialize(
                &mut self,
                ctx: &mut $crate::context::InitContext<'_>,
            ) -> $crate::error::ComponentResult<()> {
                let input = ctx.read_slot("P1", $offset)?;
                let out = ctx.slot("out", tlm_node::signal::VALUE)?;
                ctx.write(out, ctx.read(input));
                self.io = Some((input, out));
                Ok(())
            }

            fn simulate_one_timestep(
                &mut self,
                ctx: &mut $crate::context::StepContext<'_>,
            ) -> $crate::component::StepOutcome {
                let Some((input, out)) = self.io else {
                    return $crate::component::StepOutcome::not_initialized();
                };
                ctx.write(out, ctx.read(input));
                $crate::component::StepOutcome::Continue
            }
        }
    };
}

pub(crate) use node_sensor;
