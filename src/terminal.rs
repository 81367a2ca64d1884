use crate::context::Context;
use crate::err::PipeErr;
use crate::spec::Spec;
use crate::value::Value;
use std::fmt::{Display, Formatter};

/// 返回第一个使`key`为真的元素，没有则返回`default`。
///
/// 找到后立即停止，不再拉取后续元素。
pub fn first_by_key<I, F>(iter: I, mut key: F, default: Value) -> Result<Value, PipeErr>
where
    I: IntoIterator<Item = Result<Value, PipeErr>>,
    F: FnMut(&Value) -> Result<bool, PipeErr>,
{
    for item in iter {
        let item = item?;
        if key(&item)? {
            return Ok(item);
        }
    }
    Ok(default)
}

/// 取第一个满足条件的元素。
#[derive(Debug, Clone)]
pub struct First {
    spec: Spec,
    default: Value,
}

impl Default for First {
    fn default() -> Self {
        First { spec: Spec::Identity, default: Value::Null }
    }
}

impl First {
    pub fn new(spec: Spec, default: Value) -> First {
        First { spec, default }
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub(crate) fn apply(&self, target: Value, ctx: &Context) -> Result<Value, PipeErr> {
        let pipe = ctx.registry().pipe(target, ctx.path())?;
        if self.spec.is_identity() {
            first_by_key(pipe, |item| Ok(item.truthy()), self.default.clone())
        } else {
            first_by_key(pipe, |item| Ok(ctx.evaluate(item.clone(), &self.spec)?.truthy()), self.default.clone())
        }
    }
}

impl Display for First {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.default == Value::Null {
            write!(f, "first({})", self.spec)
        } else {
            write!(f, "first({}, default={})", self.spec, self.default)
        }
    }
}
