//! Plain CSV export of logged traces.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::TraceSeries;
use crate::{ResultsError, ResultsResult};

/// One row per sample: time first, then each series in order. The header
/// names each column `component.port.variable`.
pub fn write_csv(path: &Path, time: &[f64], traces: &[TraceSeries]) -> ResultsResult<()> {
    for t in traces {
        if t.values.len() != time.len() {
            return Err(ResultsError::LengthMismatch {
                name: t.name(),
                len: t.values.len(),
                expected: time.len(),
            });
        }
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_rows(&mut out, time, traces)?;
    out.flush()?;
    Ok(())
}

fn write_rows(out: &mut impl Write, time: &[f64], traces: &[TraceSeries]) -> std::io::Result<()> {
    write!(out, "time")?;
    for t in traces {
        write!(out, ",{}", quote(&t.name()))?;
    }
    writeln!(out)?;
    for (i, time) in time.iter().enumerate() {
        write!(out, "{time}")?;
        for t in traces {
            write!(out, ",{}", t.values[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(component: &str, values: Vec<f64>) -> TraceSeries {
        TraceSeries {
            component: component.to_string(),
            port: "out".to_string(),
            variable: "Value".to_string(),
            unit: String::new(),
            sub_index: None,
            values,
        }
    }

    #[test]
    fn rows_follow_time() {
        let mut buf = Vec::new();
        let traces = [series("a", vec![1.0, 2.0]), series("b,c", vec![0.5, -1.0])];
        write_rows(&mut buf, &[0.0, 0.1], &traces).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "time,a.out.Value,\"b,c.out.Value\"\n0,1,0.5\n0.1,2,-1\n"
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let path = std::env::temp_dir().join("tlm_results_mismatch.csv");
        let err = write_csv(&path, &[0.0], &[series("a", vec![1.0, 2.0])]).unwrap_err();
        assert!(matches!(err, ResultsError::LengthMismatch { len: 2, expected: 1, .. }));
    }
}
