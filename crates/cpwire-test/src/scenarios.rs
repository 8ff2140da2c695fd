//! Tiny models that pin down encoding behavior.

use cpwire_core::{IntExpr, IntVar, Model, Result};

/// `e = a + b` constrained once (`e <= 5`) and, optionally, a second time
/// (`e >= 0`).
#[derive(Debug)]
pub struct SharedExpression {
    pub model: Model,
    pub a: IntVar,
    pub b: IntVar,
    pub sum: IntExpr,
}

pub fn shared_expression(reuse: bool) -> Result<SharedExpression> {
    let mut model = Model::new();
    let a = model.int_var(0, 10)?;
    let b = model.int_var(0, 10)?;
    let sum = model.plus(a, b)?;
    let upper = model.le(sum, 5)?;
    model.enforce(upper)?;
    if reuse {
        let lower = model.ge(sum, 0)?;
        model.enforce(lower)?;
    }
    Ok(SharedExpression { model, a, b, sum })
}

/// `x * x >= 1` with `x` in `[10_000_000, 20_000_000]`.
///
/// Encodes without complaint; only a solver finds the product overflows
/// the integer range.
pub fn infeasible_square() -> Result<(Model, IntVar)> {
    let mut model = Model::with_name("infeasible-square");
    let x = model.int_var(10_000_000, 20_000_000)?;
    let square = model.times(x, x)?;
    let positive = model.ge(square, 1)?;
    model.enforce(positive)?;
    Ok((model, x))
}
