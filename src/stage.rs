use crate::context::{Context, Segment};
use crate::op::Op;
use crate::pipe::Pipe;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// 阶段声明时的一个参数，仅用于诊断输出。
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Arg {
    name: &'static str,
    repr: String,
}

impl Arg {
    pub(crate) fn new(name: &'static str, repr: impl ToString) -> Arg {
        Arg { name, repr: repr.to_string() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn repr(&self) -> &str {
        &self.repr
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.repr)
    }
}

/// 流水线中的一个具名、带参数的变换步骤。
#[derive(Debug, Clone)]
pub struct Stage {
    name: &'static str,
    args: Vec<Arg>,
    op: Op,
}

impl Stage {
    pub(crate) fn new(name: &'static str, args: Vec<Arg>, op: Op) -> Stage {
        Stage { name, args, op }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// 包装上游序列，阶段内的求值位置附加阶段名。
    pub fn transform(&self, pipe: Pipe, ctx: &Context) -> Pipe {
        self.op.wrap(pipe, &ctx.at(Segment::Stage(self.name)))
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(", "))
    }
}
