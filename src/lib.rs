//! 惰性流水线组合引擎。
//!
//! [`Pipeline`]是一个不可变的值，描述对可迭代目标的一串流式变换（map、filter、chunked、
//! windowed、unique、split、flatten、slice、take_while、drop_while），执行时返回惰性的[`Pipe`]，
//! 并可通过[`Pipeline::all`]与[`Pipeline::first`]组合为终结操作。

mod config;
mod context;
mod err;
mod eval;
mod flow;
mod op;
mod pipe;
mod pipeline;
mod registry;
mod spec;
mod stage;
mod terminal;
mod value;

pub use config::{Config, is_strict_filter, is_verbose};
pub use context::{Context, Evaluator, Path, Segment};
pub use err::PipeErr;
pub use eval::DefaultEvaluator;
pub use flow::Flow;
pub use op::Separator;
pub use pipe::Pipe;
pub use pipeline::Pipeline;
pub use registry::{IterateFn, RawIter, TargetKind, TargetRegistry};
pub use spec::Spec;
pub use stage::{Arg, Stage};
pub use terminal::{First, first_by_key};
pub use value::{Stream, Value};

/// 整数类型
pub type Integer = i64;

/// 浮点数类型
pub type Float = f64;

pub type PipeRes = Result<Pipe, PipeErr>;

/// 单个元素求值的结果
pub type EvalRes = Result<Flow, PipeErr>;
