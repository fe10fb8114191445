//! Table lookup from inline text or a CSV file.

use tlm_node::{ReadSlot, Slot, signal};
use tlm_numerics::{CsvOptions, CsvParser, LookupTable1D};

use super::{IN, OUT};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{FinalizeContext, InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

/// 1-D lookup, `out = table(in)`, clamped to the first and last rows.
///
/// The table comes from `filename` when it is set, otherwise from the
/// inline `table` text.
#[derive(Debug, Default)]
pub struct SignalLookupTable {
    table: Option<LookupTable1D>,
    io: Option<(ReadSlot, Slot)>,
}

impl SignalLookupTable {
    pub fn table(&self) -> Option<&LookupTable1D> {
        self.table.as_ref()
    }
}

fn single_char(name: &str, value: &str) -> ComponentResult<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ComponentError::InvalidParameterValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "must be exactly one character",
        }),
    }
}

impl Component for SignalLookupTable {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_input_variable(IN, "Lookup input", "-", 0.0)?;
        decl.add_output_variable(OUT, "Interpolated output", "-")?;
        decl.add_constant("filename", "CSV file with the table", "", "")?;
        decl.add_constant("table", "Inline table text, used when no file is given", "", "")?;
        decl.add_constant("separator", "Column separator", "", ",")?;
        decl.add_constant("comment", "Comment character", "", "#")?;
        decl.add_constant("skip_lines", "Header lines to skip", "", 0_i64)?;
        decl.add_constant("in_col", "Index column", "", 0_i64)?;
        decl.add_constant("out_col", "Value column", "", 1_i64)?;
        decl.add_constant("auto_sort", "Sort a non-increasing index", "", true)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let options = CsvOptions {
            separator: single_char("separator", ctx.text("separator")?)?,
            comment: single_char("comment", ctx.text("comment")?)?,
            skip_lines: ctx.index("skip_lines")?,
        };
        let in_col = ctx.index("in_col")?;
        let out_col = ctx.index("out_col")?;
        let auto_sort = ctx.boolean("auto_sort")?;

        let filename = ctx.text("filename")?;
        let (source, parsed) = if filename.is_empty() {
            ("inline table".to_string(), CsvParser::from_text(ctx.text("table")?, &options))
        } else {
            (filename.to_string(), CsvParser::from_file(filename, &options))
        };
        let table = parsed
            .and_then(|p| LookupTable1D::from_csv(&p, in_col, out_col, auto_sort))
            .map_err(|e| ComponentError::init(format!("could not load {source}: {e}")))?;
        ctx.info(format!("loaded {} rows from {source}", table.len()));

        let (input, out) = (ctx.read_slot(IN, signal::VALUE)?, ctx.slot(OUT, signal::VALUE)?);
        ctx.write(out, table.interpolate(ctx.read(input)));
        self.table = Some(table);
        self.io = Some((input, out));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let (Some((input, out)), Some(table)) = (self.io, self.table.as_ref()) else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, table.interpolate(ctx.read(input)));
        StepOutcome::Continue
    }

    fn finalize(&mut self, _ctx: &mut FinalizeContext<'_>) {
        self.table = None;
    }
}
