use crate::context::{Context, Evaluator};
use crate::flow::Flow;
use crate::spec::Spec;
use crate::value::Value;
use crate::EvalRes;

/// 只理解[`Spec`]节点本身的最小求值器。
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvaluator;

impl Evaluator for DefaultEvaluator {
    fn evaluate(&self, target: Value, spec: &Spec, ctx: &Context) -> EvalRes {
        match spec {
            Spec::Identity => Ok(Flow::Value(target)),
            Spec::Literal(value) => Ok(Flow::Value(value.clone())),
            Spec::Func { f, .. } => f(target, ctx),
            Spec::Pipeline(pipeline) => pipeline.execute(target, ctx).map(|pipe| Flow::Value(Value::stream(pipe))),
            Spec::Chain(specs) => {
                let mut current = target;
                for spec in specs {
                    match ctx.evaluate(current, spec)? {
                        Flow::Value(value) => current = value,
                        signal => return Ok(signal),
                    }
                }
                Ok(Flow::Value(current))
            }
            Spec::Collect => {
                let items = ctx.registry().pipe(target, ctx.path())?.try_collect_values()?;
                Ok(Flow::Value(Value::List(items)))
            }
            Spec::First(first) => first.apply(target, ctx).map(Flow::Value),
            Spec::Skip => Ok(Flow::Skip),
            Spec::Stop => Ok(Flow::Stop),
        }
    }
}
