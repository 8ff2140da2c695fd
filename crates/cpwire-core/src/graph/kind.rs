//! The closed set of node kinds understood by the solver.
//!
//! Each kind maps to a wire tag, a result type and an argument signature.
//! The table is generated by `node_kinds!` so that the tag, the result type
//! and the signature of a kind are declared on one line.

use std::fmt;

/// Type of the value a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Interval,
    Sequence,
    Cumul,
    BoolArray,
    IntArray,
    IntervalArray,
    Constraint,
    Objective,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "boolean expression",
            ValueType::Int => "integer expression",
            ValueType::Interval => "interval variable",
            ValueType::Sequence => "sequence variable",
            ValueType::Cumul => "cumulative expression",
            ValueType::BoolArray => "boolean array",
            ValueType::IntArray => "integer array",
            ValueType::IntervalArray => "interval array",
            ValueType::Constraint => "constraint",
            ValueType::Objective => "objective",
        };
        f.write_str(name)
    }
}

/// Expected shape of one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgShape {
    Bool,
    Int,
    /// Numeric value: integer or floating point literal, or an integer expression.
    Float,
    Interval,
    Sequence,
    Cumul,
    BoolArray,
    IntArray,
    IntervalArray,
    /// Raw matrix of non-negative integers, encoded in place and never shared.
    Matrix,
}

impl ArgShape {
    /// Returns true if a node producing `ty` may be passed at this position.
    pub fn accepts(self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (ArgShape::Bool, ValueType::Bool)
                | (ArgShape::Int, ValueType::Int | ValueType::Bool)
                | (ArgShape::Float, ValueType::Int | ValueType::Bool)
                | (ArgShape::Interval, ValueType::Interval)
                | (ArgShape::Sequence, ValueType::Sequence)
                | (ArgShape::Cumul, ValueType::Cumul)
                | (ArgShape::BoolArray, ValueType::BoolArray)
                | (ArgShape::IntArray, ValueType::IntArray | ValueType::BoolArray)
                | (ArgShape::IntervalArray, ValueType::IntervalArray)
        )
    }

    /// Element shape for array shapes.
    pub fn element(self) -> Option<ArgShape> {
        match self {
            ArgShape::BoolArray => Some(ArgShape::Bool),
            ArgShape::IntArray => Some(ArgShape::Int),
            ArgShape::IntervalArray => Some(ArgShape::Interval),
            _ => None,
        }
    }

    /// Node kind used to encode an array passed at this position.
    pub(crate) fn array_kind(self) -> Option<NodeKind> {
        match self {
            ArgShape::BoolArray => Some(NodeKind::BoolExprArray),
            ArgShape::IntArray => Some(NodeKind::IntExprArray),
            ArgShape::IntervalArray => Some(NodeKind::IntervalVarArray),
            _ => None,
        }
    }
}

impl fmt::Display for ArgShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgShape::Bool => "boolean",
            ArgShape::Int => "integer",
            ArgShape::Float => "number",
            ArgShape::Interval => "interval variable",
            ArgShape::Sequence => "sequence variable",
            ArgShape::Cumul => "cumulative expression",
            ArgShape::BoolArray => "array of booleans",
            ArgShape::IntArray => "array of integers",
            ArgShape::IntervalArray => "array of interval variables",
            ArgShape::Matrix => "integer matrix",
        };
        f.write_str(name)
    }
}

/// Argument signature of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Positional arguments; the first `required` must be present, the rest may be omitted.
    Fixed {
        args: &'static [ArgShape],
        required: usize,
    },
    /// Any number of arguments of one shape.
    Variadic(ArgShape),
}

impl Signature {
    /// Shape expected at `position`, or `None` past the end.
    pub fn shape_at(&self, position: usize) -> Option<ArgShape> {
        match self {
            Signature::Fixed { args, .. } => args.get(position).copied(),
            Signature::Variadic(shape) => Some(*shape),
        }
    }

    /// Returns true if `count` arguments satisfy this signature.
    pub fn accepts_count(&self, count: usize) -> bool {
        match self {
            Signature::Fixed { args, required } => count >= *required && count <= args.len(),
            Signature::Variadic(_) => true,
        }
    }

    fn describe(&self) -> String {
        match self {
            Signature::Fixed { args, required } if *required == args.len() => {
                format!("{} argument(s)", args.len())
            }
            Signature::Fixed { args, required } => {
                format!("{} to {} arguments", required, args.len())
            }
            Signature::Variadic(_) => "any number of arguments".to_string(),
        }
    }
}

macro_rules! count_shapes {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_shapes!($($tail)*) };
}

macro_rules! signature {
    (.. $shape:ident) => {
        Signature::Variadic(ArgShape::$shape)
    };
    ($($req:ident),* ; $($opt:ident),+) => {
        Signature::Fixed {
            args: &[$(ArgShape::$req,)* $(ArgShape::$opt,)+],
            required: count_shapes!($($req)*),
        }
    };
    ($($req:ident),*) => {
        Signature::Fixed {
            args: &[$(ArgShape::$req),*],
            required: count_shapes!($($req)*),
        }
    };
}

macro_rules! node_kinds {
    ($( $(#[$doc:meta])* $variant:ident => $tag:literal : $result:ident ( $($sig:tt)* ); )+) => {
        /// Function tag of a graph node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $( $(#[$doc])* $variant, )+
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant),+];

            /// Wire tag of this kind.
            pub fn tag(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $tag,)+
                }
            }

            /// Type of the value produced by nodes of this kind.
            pub fn result(self) -> ValueType {
                match self {
                    $(NodeKind::$variant => ValueType::$result,)+
                }
            }

            /// Argument signature of this kind.
            pub fn signature(self) -> Signature {
                match self {
                    $(NodeKind::$variant => signature!($($sig)*),)+
                }
            }

            /// Looks a kind up by wire tag.
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(NodeKind::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

node_kinds! {
    // Variables
    BoolVar => "boolVar": Bool();
    IntVar => "intVar": Int();
    IntervalVar => "intervalVar": Interval();
    /// Sequence over interval variables, with optional per-interval types.
    SequenceVar => "sequenceVar": Sequence(IntervalArray; IntArray);

    // Integer arithmetic
    IntPlus => "intPlus": Int(Int, Int);
    IntMinus => "intMinus": Int(Int, Int);
    IntTimes => "intTimes": Int(Int, Int);
    IntDiv => "intDiv": Int(Int, Int);
    IntModulo => "intModulo": Int(Int, Int);
    IntNeg => "intNeg": Int(Int);
    IntAbs => "intAbs": Int(Int);
    IntMin2 => "intMin2": Int(Int, Int);
    IntMax2 => "intMax2": Int(Int, Int);
    IntSquare => "intSquare": Int(Int);
    /// Replaces an absent value by the second argument.
    IntGuard => "intGuard": Int(Int, Int);

    // Comparisons
    IntEq => "intEq": Bool(Int, Int);
    IntNe => "intNe": Bool(Int, Int);
    IntLt => "intLt": Bool(Int, Int);
    IntLe => "intLe": Bool(Int, Int);
    IntGt => "intGt": Bool(Int, Int);
    IntGe => "intGe": Bool(Int, Int);
    IntInRange => "intInRange": Bool(Int, Int, Int);
    IntPresenceOf => "intPresenceOf": Bool(Int);

    // Boolean logic
    BoolNot => "boolNot": Bool(Bool);
    BoolOr => "boolOr": Bool(Bool, Bool);
    BoolAnd => "boolAnd": Bool(Bool, Bool);
    BoolImplies => "boolImplies": Bool(Bool, Bool);

    // Interval accessors; the optional argument is the value used when absent
    PresenceOf => "presenceOf": Bool(Interval);
    StartOf => "startOf": Int(Interval; Int);
    EndOf => "endOf": Int(Interval; Int);
    LengthOf => "lengthOf": Int(Interval; Int);

    // Aggregates
    IntSum => "intSum": Int(IntArray);
    IntMax => "intMax": Int(IntArray);
    IntMin => "intMin": Int(IntArray);
    IntElement => "intElement": Int(IntArray, Int);

    // Precedences; the optional argument is the delay
    EndBeforeStart => "endBeforeStart": Constraint(Interval, Interval; Int);
    EndBeforeEnd => "endBeforeEnd": Constraint(Interval, Interval; Int);
    StartBeforeStart => "startBeforeStart": Constraint(Interval, Interval; Int);
    StartBeforeEnd => "startBeforeEnd": Constraint(Interval, Interval; Int);
    StartAtStart => "startAtStart": Constraint(Interval, Interval; Int);
    StartAtEnd => "startAtEnd": Constraint(Interval, Interval; Int);
    EndAtStart => "endAtStart": Constraint(Interval, Interval; Int);
    EndAtEnd => "endAtEnd": Constraint(Interval, Interval; Int);

    // Scheduling constraints
    NoOverlap => "noOverlap": Constraint(IntervalArray; Matrix);
    SequenceNoOverlap => "sequenceNoOverlap": Constraint(Sequence; Matrix);
    Alternative => "alternative": Constraint(Interval, IntervalArray);
    Span => "span": Constraint(Interval, IntervalArray);

    // Cumulative functions
    Pulse => "pulse": Cumul(Interval, Int);
    StepAtStart => "stepAtStart": Cumul(Interval, Int);
    StepAtEnd => "stepAtEnd": Cumul(Interval, Int);
    CumulPlus => "cumulPlus": Cumul(Cumul, Cumul);
    CumulNeg => "cumulNeg": Cumul(Cumul);
    CumulLe => "cumulLe": Constraint(Cumul, Int);
    CumulGe => "cumulGe": Constraint(Cumul, Int);

    // Objectives
    Minimize => "minimize": Objective(Float);
    Maximize => "maximize": Objective(Float);

    // Arrays
    BoolExprArray => "boolExprArray": BoolArray(..Bool);
    IntExprArray => "intExprArray": IntArray(..Int);
    IntervalVarArray => "intervalVarArray": IntervalArray(..Interval);
}

impl NodeKind {
    /// Returns true for kinds declared directly on the model as variables.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            NodeKind::BoolVar | NodeKind::IntVar | NodeKind::IntervalVar | NodeKind::SequenceVar
        )
    }

    /// Returns true for array kinds.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            NodeKind::BoolExprArray | NodeKind::IntExprArray | NodeKind::IntervalVarArray
        )
    }

    pub(crate) fn describe_arity(self) -> String {
        self.signature().describe()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
