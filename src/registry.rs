use crate::context::Path;
use crate::err::PipeErr;
use crate::pipe::Pipe;
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// 迭代处理器产生的原始元素序列
pub type RawIter = Box<dyn Iterator<Item = Result<Value, PipeErr>>>;

/// 迭代处理器：将目标转换为原始元素序列。
pub type IterateFn = Rc<dyn Fn(Value) -> Result<RawIter, PipeErr>>;

/// 目标的类型描述，用于查找迭代处理器。
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TargetKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Stream,
}

impl TargetKind {
    pub fn of(value: &Value) -> TargetKind {
        match value {
            Value::Null => TargetKind::Null,
            Value::Bool(_) => TargetKind::Bool,
            Value::Int(_) => TargetKind::Int,
            Value::Float(_) => TargetKind::Float,
            Value::Str(_) => TargetKind::Str,
            Value::List(_) => TargetKind::List,
            Value::Stream(_) => TargetKind::Stream,
        }
    }
}

/// 目标类型到迭代处理器的映射。
///
/// 默认注册列表（逐项）、字符串（逐字符）与流（共享遍历）。
pub struct TargetRegistry {
    handlers: FxHashMap<TargetKind, IterateFn>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        let mut registry = TargetRegistry::empty();
        registry.register(TargetKind::List, |target| match target {
            Value::List(items) => Ok(Box::new(items.into_iter().map(Ok)) as RawIter),
            other => Err(mismatch(TargetKind::List, &other)),
        });
        registry.register(TargetKind::Str, |target| match target {
            Value::Str(s) => {
                let mut pos = 0;
                Ok(Box::new(std::iter::from_fn(move || {
                    let c = s[pos..].chars().next()?;
                    pos += c.len_utf8();
                    Some(Ok(Value::from(c)))
                })) as RawIter)
            }
            other => Err(mismatch(TargetKind::Str, &other)),
        });
        registry.register(TargetKind::Stream, |target| match target {
            Value::Stream(stream) => Ok(Box::new(stream) as RawIter),
            other => Err(mismatch(TargetKind::Stream, &other)),
        });
        registry
    }
}

impl TargetRegistry {
    /// 不含任何处理器的注册表。
    pub fn empty() -> TargetRegistry {
        TargetRegistry { handlers: FxHashMap::default() }
    }

    /// 注册或替换某类目标的迭代处理器。
    pub fn register(
        &mut self, kind: TargetKind, handler: impl Fn(Value) -> Result<RawIter, PipeErr> + 'static,
    ) -> &mut Self {
        self.handlers.insert(kind, Rc::new(handler));
        self
    }

    pub fn get_handler(&self, target: &Value, path: &Path) -> Result<IterateFn, PipeErr> {
        self.handlers
            .get(&TargetKind::of(target))
            .cloned()
            .ok_or_else(|| PipeErr::not_iterable(target.type_name(), path, None))
    }

    /// 查找处理器并迭代目标，处理器自身的失败包装为[`PipeErr::NotIterable`]。
    pub fn iterate(&self, target: Value, path: &Path) -> Result<RawIter, PipeErr> {
        let iterate = self.get_handler(&target, path)?;
        let type_name = target.type_name();
        iterate(target).map_err(|err| {
            tracing::debug!(%path, type_name, error = %err, "iteration handler failed");
            PipeErr::not_iterable(type_name, path, Some(err))
        })
    }

    /// 迭代目标并包装为[`Pipe`]。
    pub fn pipe(&self, target: Value, path: &Path) -> Result<Pipe, PipeErr> {
        self.iterate(target, path).map(Pipe::new)
    }
}

fn mismatch(kind: TargetKind, target: &Value) -> PipeErr {
    PipeErr::Evaluation {
        path: Path::root(),
        reason: format!("handler for {kind:?} received a `{}` target", target.type_name()),
    }
}
