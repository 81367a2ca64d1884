use crate::context::{Context, Segment};
use crate::err::PipeErr;
use crate::pipe::Pipe;
use crate::spec::Spec;
use crate::value::Value;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// 拆分时识别分隔元素的方式。
#[derive(Debug, Clone, Default)]
pub enum Separator {
    /// 以null为分隔，连续的分隔合并为一个，首尾不产生空分组。
    /// `maxsplit`为0时例外：整个序列原样作为唯一的一组。
    #[default]
    Null,
    /// 与给定值相等的元素为分隔，每个分隔都是独立的边界。
    Value(Value),
    /// 属于给定集合的元素为分隔，每个分隔都是独立的边界。
    AnyOf(Vec<Value>),
    /// 规格求值为真的元素为分隔，求值失败时传播错误。
    Predicate(Spec),
}

impl Separator {
    pub fn any_of(values: impl IntoIterator<Item = impl Into<Value>>) -> Separator {
        Separator::AnyOf(values.into_iter().map(Into::into).collect())
    }

    /// 是否合并连续的分隔（与字符串按空白拆分一致）。
    fn groups_runs(&self) -> bool {
        matches!(self, Separator::Null)
    }

    fn matches(&self, item: &Value, index: usize, ctx: &Context) -> Result<bool, PipeErr> {
        match self {
            Separator::Null => Ok(*item == Value::Null),
            Separator::Value(sep) => Ok(item == sep),
            Separator::AnyOf(seps) => Ok(seps.contains(item)),
            Separator::Predicate(spec) => Ok(ctx.at(Segment::Index(index)).evaluate(item.clone(), spec)?.truthy()),
        }
    }
}

impl Display for Separator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Separator::Null => write!(f, "Separator::Null"),
            Separator::Value(value) => write!(f, "Separator::Value({value})"),
            Separator::AnyOf(values) => write!(f, "Separator::AnyOf([{}])", values.iter().join(", ")),
            Separator::Predicate(spec) => write!(f, "Separator::Predicate({spec})"),
        }
    }
}

pub(crate) struct SplitIter {
    source: Pipe,
    sep: Separator,
    maxsplit: Option<usize>,
    splits: usize,
    /// 上游下一个元素的索引
    index: usize,
    ctx: Context,
    done: bool,
}

impl SplitIter {
    pub(crate) fn new(source: Pipe, sep: Separator, maxsplit: Option<usize>, ctx: Context) -> SplitIter {
        SplitIter { source, sep, maxsplit, splits: 0, index: 0, ctx, done: false }
    }

    fn is_sep(&mut self, item: &Value) -> Result<bool, PipeErr> {
        let index = self.index;
        self.index += 1;
        if self.maxsplit.is_some_and(|max| self.splits >= max) {
            // 达到最大拆分次数后剩余元素原样归入最后一组
            return Ok(false);
        }
        self.sep.matches(item, index, &self.ctx)
    }
}

impl Iterator for SplitIter {
    type Item = Result<Value, PipeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut group = Vec::new();
        loop {
            let item = match self.source.next() {
                Some(Ok(item)) => item,
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.done = true;
                    // 不允许拆分时整个序列总是一组，即使为空
                    let whole = self.maxsplit == Some(0);
                    return if whole || !group.is_empty() || !self.sep.groups_runs() {
                        Some(Ok(Value::List(group)))
                    } else {
                        None
                    };
                }
            };
            match self.is_sep(&item) {
                Ok(true) if self.sep.groups_runs() && group.is_empty() => {}
                Ok(true) => {
                    self.splits += 1;
                    return Some(Ok(Value::List(group)));
                }
                Ok(false) => group.push(item),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
