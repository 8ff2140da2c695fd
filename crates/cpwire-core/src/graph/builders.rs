//! Typed builder methods, one per node kind.
//!
//! Each method allocates exactly one node through [`Model::node`] and wraps
//! the result in the handle type matching the kind's result.

use super::handle::{BoolExpr, Constraint, CumulExpr, IntExpr, IntervalVar, Operand};
use super::kind::NodeKind;
use super::model::Model;
use crate::error::Result;

macro_rules! builders {
    ($( $(#[$doc:meta])* $name:ident($($arg:ident),+) => $kind:ident -> $out:ident; )+) => {
        impl Model {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, $($arg: impl Into<Operand>),+) -> Result<$out> {
                    self.node(NodeKind::$kind, vec![$($arg.into()),+]).map($out)
                }
            )+
        }
    };
}

builders! {
    plus(a, b) => IntPlus -> IntExpr;
    minus(a, b) => IntMinus -> IntExpr;
    times(a, b) => IntTimes -> IntExpr;
    div(a, b) => IntDiv -> IntExpr;
    modulo(a, b) => IntModulo -> IntExpr;
    neg(a) => IntNeg -> IntExpr;
    abs(a) => IntAbs -> IntExpr;
    min2(a, b) => IntMin2 -> IntExpr;
    max2(a, b) => IntMax2 -> IntExpr;
    square(a) => IntSquare -> IntExpr;
    /// Value of `a`, or `absent_value` when `a` is absent.
    guard(a, absent_value) => IntGuard -> IntExpr;

    eq(a, b) => IntEq -> BoolExpr;
    ne(a, b) => IntNe -> BoolExpr;
    lt(a, b) => IntLt -> BoolExpr;
    le(a, b) => IntLe -> BoolExpr;
    gt(a, b) => IntGt -> BoolExpr;
    ge(a, b) => IntGe -> BoolExpr;
    in_range(a, lo, hi) => IntInRange -> BoolExpr;
    int_presence_of(a) => IntPresenceOf -> BoolExpr;

    not(a) => BoolNot -> BoolExpr;
    or(a, b) => BoolOr -> BoolExpr;
    and(a, b) => BoolAnd -> BoolExpr;
    implies(a, b) => BoolImplies -> BoolExpr;

    sum(items) => IntSum -> IntExpr;
    max(items) => IntMax -> IntExpr;
    min(items) => IntMin -> IntExpr;
    /// `items[index]`.
    element(items, index) => IntElement -> IntExpr;

    no_overlap(intervals) => NoOverlap -> Constraint;
    /// `noOverlap` over a sequence with transition times between interval types.
    sequence_no_overlap(sequence, transitions) => SequenceNoOverlap -> Constraint;
    /// Exactly one of `options` is present and aligned with `main`.
    alternative(main, options) => Alternative -> Constraint;
    /// `main` spans every present interval of `covered`.
    span(main, covered) => Span -> Constraint;

    pulse(interval, height) => Pulse -> CumulExpr;
    step_at_start(interval, height) => StepAtStart -> CumulExpr;
    step_at_end(interval, height) => StepAtEnd -> CumulExpr;
    cumul_plus(a, b) => CumulPlus -> CumulExpr;
    cumul_neg(a) => CumulNeg -> CumulExpr;
    cumul_le(cumul, capacity) => CumulLe -> Constraint;
    cumul_ge(cumul, minimum) => CumulGe -> Constraint;
}

impl Model {
    pub fn presence_of(&mut self, interval: IntervalVar) -> Result<BoolExpr> {
        self.node(NodeKind::PresenceOf, vec![interval.into()])
            .map(BoolExpr)
    }

    pub fn start_of(&mut self, interval: IntervalVar) -> Result<IntExpr> {
        self.accessor(NodeKind::StartOf, interval, None)
    }

    pub fn end_of(&mut self, interval: IntervalVar) -> Result<IntExpr> {
        self.accessor(NodeKind::EndOf, interval, None)
    }

    pub fn length_of(&mut self, interval: IntervalVar) -> Result<IntExpr> {
        self.accessor(NodeKind::LengthOf, interval, None)
    }

    /// Start of `interval`, or `absent_value` when the interval is absent.
    pub fn start_or(&mut self, interval: IntervalVar, absent_value: i64) -> Result<IntExpr> {
        self.accessor(NodeKind::StartOf, interval, Some(absent_value))
    }

    pub fn end_or(&mut self, interval: IntervalVar, absent_value: i64) -> Result<IntExpr> {
        self.accessor(NodeKind::EndOf, interval, Some(absent_value))
    }

    pub fn length_or(&mut self, interval: IntervalVar, absent_value: i64) -> Result<IntExpr> {
        self.accessor(NodeKind::LengthOf, interval, Some(absent_value))
    }

    fn accessor(
        &mut self,
        kind: NodeKind,
        interval: IntervalVar,
        absent_value: Option<i64>,
    ) -> Result<IntExpr> {
        let mut operands = vec![interval.into()];
        operands.extend(absent_value.map(Operand::Int));
        self.node(kind, operands).map(IntExpr)
    }

    /// Precedence between two intervals with an optional delay.
    ///
    /// `kind` must be one of the precedence kinds such as
    /// [`NodeKind::EndBeforeStart`].
    pub fn precedence(
        &mut self,
        kind: NodeKind,
        before: IntervalVar,
        after: IntervalVar,
        delay: Option<i64>,
    ) -> Result<Constraint> {
        let mut operands = vec![before.into(), after.into()];
        operands.extend(delay.map(Operand::Int));
        self.node(kind, operands).map(Constraint)
    }

    pub fn end_before_start(&mut self, before: IntervalVar, after: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::EndBeforeStart, before, after, None)
    }

    pub fn end_before_end(&mut self, before: IntervalVar, after: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::EndBeforeEnd, before, after, None)
    }

    pub fn start_before_start(
        &mut self,
        before: IntervalVar,
        after: IntervalVar,
    ) -> Result<Constraint> {
        self.precedence(NodeKind::StartBeforeStart, before, after, None)
    }

    pub fn start_before_end(&mut self, before: IntervalVar, after: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::StartBeforeEnd, before, after, None)
    }

    pub fn start_at_start(&mut self, a: IntervalVar, b: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::StartAtStart, a, b, None)
    }

    pub fn start_at_end(&mut self, a: IntervalVar, b: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::StartAtEnd, a, b, None)
    }

    pub fn end_at_start(&mut self, a: IntervalVar, b: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::EndAtStart, a, b, None)
    }

    pub fn end_at_end(&mut self, a: IntervalVar, b: IntervalVar) -> Result<Constraint> {
        self.precedence(NodeKind::EndAtEnd, a, b, None)
    }
}
