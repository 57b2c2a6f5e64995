//! Argument spec parsing for the edit subcommand.
//!
//! These formats are part of the shell contract:
//! - cell writes: `ROW:COL=VALUE` (value may contain `=` and `:`)
//! - math: `OP:OPERAND` with op one of add, sub, mul, div
//! - cell lists: `ROW:COL` pairs joined by commas

use tabgrid_engine::commands::MathOp;

/// Parse a `ROW:COL=VALUE` cell write.
pub fn parse_set(spec: &str) -> Result<(usize, usize, String), String> {
    let (coords, value) = spec
        .split_once('=')
        .ok_or_else(|| format!("invalid --set '{spec}': expected ROW:COL=VALUE"))?;
    let (row, col) = parse_coords(coords)?;
    Ok((row, col, value.to_string()))
}

/// Parse an `OP:OPERAND` math spec.
pub fn parse_math(spec: &str) -> Result<(MathOp, f64), String> {
    let (op, operand) = spec
        .split_once(':')
        .ok_or_else(|| format!("invalid --math '{spec}': expected OP:OPERAND"))?;
    let op = match op {
        "add" => MathOp::Add,
        "sub" => MathOp::Subtract,
        "mul" => MathOp::Multiply,
        "div" => MathOp::Divide,
        other => return Err(format!("unknown math op '{other}' (add, sub, mul, div)")),
    };
    let operand: f64 = operand
        .parse()
        .map_err(|_| format!("invalid math operand '{operand}'"))?;
    Ok((op, operand))
}

/// Parse a comma-separated list of `ROW:COL` pairs.
pub fn parse_cells(spec: &str) -> Result<Vec<(usize, usize)>, String> {
    spec.split(',').map(parse_coords).collect()
}

fn parse_coords(spec: &str) -> Result<(usize, usize), String> {
    let (row, col) = spec
        .split_once(':')
        .ok_or_else(|| format!("invalid cell '{spec}': expected ROW:COL"))?;
    let row = row.parse().map_err(|_| format!("invalid row '{row}'"))?;
    let col = col.parse().map_err(|_| format!("invalid column '{col}'"))?;
    Ok((row, col))
}
