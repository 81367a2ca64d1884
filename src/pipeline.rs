use crate::config::is_verbose;
use crate::context::{Context, Segment};
use crate::err::PipeErr;
use crate::flow::Flow;
use crate::op::{Op, Separator, SliceArg, TakeDropMode};
use crate::pipe::Pipe;
use crate::spec::Spec;
use crate::stage::{Arg, Stage};
use crate::terminal::First;
use crate::value::Value;
use crate::PipeRes;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// 倒序链表节点，新阶段在头部，旧节点被所有派生的流水线共享。
struct StageNode {
    stage: Stage,
    prev: Option<Rc<StageNode>>,
}

/// 惰性流水线：对目标的每个元素应用子规格，再依次经过声明的各个阶段。
///
/// 流水线不可变，每个链式调用都返回新的流水线，原流水线不受影响：
///
/// ```
/// use rpiter::{Context, Pipeline, Value};
///
/// let base = Pipeline::new().limit(3);
/// let chunked = base.chunked(2, None)?;
/// let ctx = Context::new();
/// let target = Value::from(vec![1, 2, 3, 4, 5]);
/// assert_eq!(base.execute(target.clone(), &ctx)?.count(), 3);
/// assert_eq!(chunked.execute(target, &ctx)?.count(), 2);
/// # Ok::<(), rpiter::PipeErr>(())
/// ```
#[derive(Clone)]
pub struct Pipeline {
    subspec: Spec,
    head: Option<Rc<StageNode>>,
    len: usize,
    sentinel: Option<Value>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new()
    }
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline::with_subspec(Spec::Identity)
    }

    /// 对目标的每个元素先应用`subspec`，其结果为SKIP时跳过该元素，为STOP时结束序列。
    pub fn with_subspec(subspec: Spec) -> Pipeline {
        Pipeline { subspec, head: None, len: 0, sentinel: None }
    }

    /// 子规格的结果等于`sentinel`时同样结束序列。
    pub fn stop_at(&self, sentinel: Value) -> Pipeline {
        Pipeline { sentinel: Some(sentinel), ..self.clone() }
    }

    pub fn subspec(&self) -> &Spec {
        &self.subspec
    }

    pub fn sentinel(&self) -> Option<&Value> {
        self.sentinel.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 按声明顺序返回全部阶段。
    pub fn stages(&self) -> Vec<&Stage> {
        let mut stages = Vec::with_capacity(self.len);
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            stages.push(&current.stage);
            node = current.prev.as_deref();
        }
        stages.reverse();
        stages
    }

    fn add_op(&self, name: &'static str, args: Vec<Arg>, op: Op) -> Pipeline {
        let node = StageNode { stage: Stage::new(name, args, op), prev: self.head.clone() };
        Pipeline {
            subspec: self.subspec.clone(),
            head: Some(Rc::new(node)),
            len: self.len + 1,
            sentinel: self.sentinel.clone(),
        }
    }

    pub fn map(&self, spec: Spec) -> Pipeline {
        self.add_op("map", vec![Arg::new("spec", &spec)], Op::Map(spec))
    }

    /// 求值失败的元素被视为不满足条件。
    pub fn filter(&self, spec: Spec) -> Pipeline {
        self.add_op("filter", vec![Arg::new("spec", &spec)], Op::Filter(spec))
    }

    /// 每`size`个元素为一组；`fill`不为`None`时最后一组以其填充至`size`。
    pub fn chunked(&self, size: usize, fill: Option<Value>) -> Result<Pipeline, PipeErr> {
        if size == 0 {
            return Err(PipeErr::invalid_args("chunked", "`size` must be a positive integer"));
        }
        let fill_repr = fill.as_ref().map_or_else(|| "None".to_string(), |v| format!("Some({v})"));
        Ok(self.add_op("chunked", vec![Arg::new("size", size), Arg::new("fill", fill_repr)], Op::Chunked { size, fill }))
    }

    pub fn windowed(&self, size: usize) -> Result<Pipeline, PipeErr> {
        if size == 0 {
            return Err(PipeErr::invalid_args("windowed", "`size` must be a positive integer"));
        }
        Ok(self.add_op("windowed", vec![Arg::new("size", size)], Op::Windowed { size }))
    }

    pub fn unique(&self) -> Pipeline {
        self.add_op("unique", vec![], Op::Unique(Spec::Identity))
    }

    /// 按`key`的求值结果去重，键在元素到达时才计算。
    pub fn unique_by(&self, key: Spec) -> Pipeline {
        self.add_op("unique_by", vec![Arg::new("key", &key)], Op::Unique(key))
    }

    pub fn split(&self, sep: Separator, maxsplit: Option<usize>) -> Pipeline {
        let maxsplit_repr = maxsplit.map_or_else(|| "None".to_string(), |m| format!("Some({m})"));
        self.add_op(
            "split",
            vec![Arg::new("sep", &sep), Arg::new("maxsplit", maxsplit_repr)],
            Op::Split { sep, maxsplit },
        )
    }

    pub fn flatten(&self) -> Pipeline {
        self.add_op("flatten", vec![], Op::Flatten)
    }

    /// 1至3个参数，分别对应`stop`、`start, stop`、`start, stop, step`。
    pub fn slice(&self, args: &[Value]) -> Result<Pipeline, PipeErr> {
        let slice = SliceArg::parse("slice", args)?;
        let names = match args.len() {
            1 => &["stop"][..],
            2 => &["start", "stop"][..],
            _ => &["start", "stop", "step"][..],
        };
        let args = names.iter().zip(args).map(|(&name, value)| Arg::new(name, value)).collect();
        Ok(self.add_op("slice", args, Op::Slice(slice)))
    }

    pub fn limit(&self, count: usize) -> Pipeline {
        self.add_op("limit", vec![Arg::new("count", count)], Op::Slice(SliceArg::limit(count)))
    }

    pub fn take_while(&self, spec: Spec) -> Pipeline {
        let op = Op::TakeDrop { mode: TakeDropMode::TakeWhile, cond: spec.clone() };
        self.add_op("take_while", vec![Arg::new("spec", &spec)], op)
    }

    pub fn drop_while(&self, spec: Spec) -> Pipeline {
        let op = Op::TakeDrop { mode: TakeDropMode::DropWhile, cond: spec.clone() };
        self.add_op("drop_while", vec![Arg::new("spec", &spec)], op)
    }

    /* **************************************** 终结操作 **************************************** */

    /// 执行后将全部结果收集为列表。
    pub fn all(&self) -> Spec {
        Spec::Chain(vec![Spec::from(self.clone()), Spec::Collect])
    }

    /// 执行后返回第一个为真的元素，没有则返回null。
    pub fn first(&self) -> Spec {
        self.first_by(Spec::Identity, Value::Null)
    }

    /// 执行后返回第一个使`spec`求值为真的元素，没有则返回`default`。
    pub fn first_by(&self, spec: Spec, default: Value) -> Spec {
        Spec::Chain(vec![Spec::from(self.clone()), Spec::from(First::new(spec, default))])
    }

    /* **************************************** 执行 **************************************** */

    /// 对目标执行流水线，返回惰性序列；每次执行相互独立。
    pub fn execute(&self, target: Value, ctx: &Context) -> PipeRes {
        let stages = self.stages();
        if is_verbose(ctx.configs()) {
            tracing::info!(pipeline = %self, path = %ctx.path(), "executing pipeline");
            for (index, stage) in stages.iter().enumerate() {
                tracing::info!(index, stage = %stage, "stage");
            }
        } else {
            tracing::debug!(pipeline = %self, path = %ctx.path(), stages = self.len, "executing pipeline");
        }
        let base = self.iterate(target, ctx)?;
        Ok(stages.into_iter().fold(base, |pipe, stage| stage.transform(pipe, ctx)))
    }

    /// 迭代目标并应用子规格，处理SKIP、STOP与结束标记。
    fn iterate(&self, target: Value, ctx: &Context) -> PipeRes {
        let raw = ctx.registry().iterate(target, ctx.path())?;
        if self.subspec.is_identity() && self.sentinel.is_none() {
            return Ok(Pipe::new(raw));
        }
        let (subspec, sentinel, ctx) = (self.subspec.clone(), self.sentinel.clone(), ctx.clone());
        let mut raw = raw.enumerate();
        Ok(Pipe::new(std::iter::from_fn(move || {
            for (index, item) in raw.by_ref() {
                let item = match item {
                    Ok(item) => item,
                    Err(err) => return Some(Err(err)),
                };
                let flow =
                    if subspec.is_identity() { Ok(Flow::Value(item)) } else { ctx.at(Segment::Index(index)).evaluate(item, &subspec) };
                match flow {
                    Ok(Flow::Value(value)) if sentinel.as_ref() == Some(&value) => {
                        tracing::trace!(index, "sentinel reached, stream stopped");
                        return None;
                    }
                    Ok(Flow::Value(value)) => return Some(Ok(value)),
                    Ok(Flow::Skip) => {}
                    Ok(Flow::Stop) => {
                        tracing::trace!(index, "stop signal, stream stopped");
                        return None;
                    }
                    Err(err) => return Some(Err(err)),
                }
            }
            None
        })))
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.subspec.is_identity() {
            write!(f, "Pipeline::new()")?;
        } else {
            write!(f, "Pipeline::with_subspec({})", self.subspec)?;
        }
        if let Some(sentinel) = &self.sentinel {
            write!(f, ".stop_at({sentinel})")?;
        }
        for stage in self.stages() {
            write!(f, ".{stage}")?;
        }
        Ok(())
    }
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
