use crate::context::Context;
use crate::flow::Flow;
use crate::pipeline::Pipeline;
use crate::terminal::First;
use crate::value::Value;
use crate::EvalRes;
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

type SpecFn = Rc<dyn Fn(Value, &Context) -> EvalRes>;

/// 可被求值器应用于目标的规格。
#[derive(Clone)]
pub enum Spec {
    /// 原样返回目标
    Identity,
    /// 忽略目标，返回常量
    Literal(Value),
    /// 具名的求值函数
    Func { name: Rc<str>, f: SpecFn },
    /// 对目标执行流水线，得到[`Value::Stream`]
    Pipeline(Box<Pipeline>),
    /// 依次求值，前一个结果作为后一个的目标
    Chain(Vec<Spec>),
    /// 将可迭代目标收集为列表
    Collect,
    /// 取第一个满足条件的元素
    First(Box<First>),
    Skip,
    Stop,
}

impl Spec {
    /// 普通的值变换。
    pub fn func(name: &str, f: impl Fn(Value) -> Value + 'static) -> Spec {
        Spec::Func { name: name.into(), f: Rc::new(move |target: Value, _: &Context| Ok(Flow::Value(f(target)))) }
    }

    /// 可能失败的值变换，失败信息附带当前位置。
    pub fn try_func(name: &str, f: impl Fn(Value) -> Result<Value, String> + 'static) -> Spec {
        Spec::Func {
            name: name.into(),
            f: Rc::new(move |target: Value, ctx: &Context| f(target).map(Flow::Value).map_err(|reason| ctx.fail(reason))),
        }
    }

    /// 完整形式：可访问上下文进行嵌套求值，也可返回控制信号。
    pub fn flow_func(name: &str, f: impl Fn(Value, &Context) -> EvalRes + 'static) -> Spec {
        Spec::Func { name: name.into(), f: Rc::new(f) }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Spec::Identity)
    }
}

impl From<Pipeline> for Spec {
    fn from(pipeline: Pipeline) -> Self {
        Spec::Pipeline(Box::new(pipeline))
    }
}

impl From<First> for Spec {
    fn from(first: First) -> Self {
        Spec::First(Box::new(first))
    }
}

impl Display for Spec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Spec::Identity => write!(f, "identity"),
            Spec::Literal(value) => write!(f, "literal({value})"),
            Spec::Func { name, .. } => write!(f, "{name}"),
            Spec::Pipeline(pipeline) => write!(f, "{pipeline}"),
            Spec::Chain(specs) => write!(f, "({})", specs.iter().join(", ")),
            Spec::Collect => write!(f, "collect"),
            Spec::First(first) => write!(f, "{first}"),
            Spec::Skip => write!(f, "SKIP"),
            Spec::Stop => write!(f, "STOP"),
        }
    }
}

impl Debug for Spec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display() {
        let chain = Spec::Chain(vec![Spec::func("lower", |v| v), Spec::Literal(Value::from(1)), Spec::Collect]);
        assert_eq!(chain.to_string(), "(lower, literal(1), collect)");
        assert_eq!(Spec::from(Pipeline::new()).to_string(), "Pipeline::new()");
        assert_eq!(Spec::Skip.to_string(), "SKIP");
    }

    #[test]
    fn test_pipeline_and_first_nodes_nest() {
        let first = Spec::from(First::new(Pipeline::new().filter(Spec::Identity).all(), Value::Null));
        assert_eq!(first.to_string(), "first((Pipeline::new().filter(identity), collect))");
        let nested = Spec::from(Pipeline::with_subspec(first.clone()).stop_at(Value::Null));
        let ctx = Context::new();
        let target = Value::from(vec![Value::from(vec![Value::from(vec![0]), Value::from(vec![3])])]);
        let Ok(Flow::Value(Value::Stream(stream))) = ctx.evaluate(target, &nested) else { unreachable!() };
        assert_eq!(stream.collect::<Result<Vec<_>, _>>(), Ok(vec![Value::from(vec![3])]));
    }

    #[test]
    fn test_try_func_attaches_path() {
        let ctx = Context::new().at(crate::context::Segment::Index(4));
        let spec = Spec::try_func("parse", |_| Err("not a number".to_string()));
        let Spec::Func { f, .. } = &spec else { unreachable!() };
        let err = f(Value::from("x"), &ctx).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("[Eval] Evaluation failed at `$[4]`: not a number"));
    }
}
