mod chunk;
mod slice;
mod split;

pub use crate::op::split::Separator;
pub(crate) use crate::op::slice::SliceArg;

use crate::config::is_strict_filter;
use crate::context::{Context, Segment};
use crate::err::PipeErr;
use crate::flow::Flow;
use crate::op::chunk::{ChunkIter, WindowIter};
use crate::op::slice::SliceIter;
use crate::op::split::SplitIter;
use crate::pipe::Pipe;
use crate::registry::RawIter;
use crate::spec::Spec;
use crate::value::Value;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone)]
pub(crate) enum Op {
    /* **************************************** 转换 **************************************** */
    /// 对每个元素应用规格，结果作为新元素。
    /// 求值失败时传播错误，规格返回控制信号同样视为失败。
    Map(Spec),
    /// 将每个子序列展开为单个序列，无法迭代的元素产生迭代错误。
    Flatten,
    /* **************************************** 减少 **************************************** */
    /// 保留规格求值为真的元素。
    /// 求值失败的元素被丢弃，配置`StrictFilter`时改为传播错误。
    Filter(Spec),
    /// 按规格计算键，只保留每个键首次出现的元素。
    Unique(Spec),
    /// 按照`start`、`stop`、`step`切片，到达`stop`后不再拉取上游。
    Slice(SliceArg),
    /// take_while  条件为真时持续保留，首次为假后结束整个序列。
    /// drop_while  条件为真时持续丢弃，首次为假后保留剩余全部元素。
    TakeDrop { mode: TakeDropMode, cond: Spec },
    /* **************************************** 分组 **************************************** */
    /// 按固定大小分组，最后一组不足时可选填充。
    Chunked { size: usize, fill: Option<Value> },
    /// 大小为`size`、步长为1的滑动窗口。
    Windowed { size: usize },
    /// 按分隔元素拆分为多个分组，分隔元素本身不输出。
    Split { sep: Separator, maxsplit: Option<usize> },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum TakeDropMode {
    TakeWhile,
    DropWhile,
}

impl Op {
    pub(crate) fn wrap(&self, pipe: Pipe, ctx: &Context) -> Pipe {
        match self {
            Op::Map(spec) => {
                let (spec, ctx) = (spec.clone(), ctx.clone());
                let mut index = 0;
                pipe.op_map(move |item| eval_value(&element_ctx(&ctx, &mut index), item, &spec))
            }
            Op::Flatten => {
                let ctx = ctx.clone();
                let mut index = 0;
                Pipe::new(pipe.flat_map(move |item| {
                    let ctx = element_ctx(&ctx, &mut index);
                    match item.and_then(|value| ctx.registry().iterate(value, ctx.path())) {
                        Ok(iter) => iter,
                        Err(err) => Box::new(std::iter::once(Err(err))) as RawIter,
                    }
                }))
            }
            Op::Filter(spec) => {
                let (spec, ctx) = (spec.clone(), ctx.clone());
                let strict = is_strict_filter(ctx.configs());
                let mut index = 0;
                pipe.op_filter(move |item| {
                    let ctx = element_ctx(&ctx, &mut index);
                    match ctx.evaluate(item.clone(), &spec) {
                        Ok(flow) => Ok(flow.truthy()),
                        Err(err) if strict => Err(err),
                        Err(err) => {
                            tracing::debug!(path = %ctx.path(), error = %err, "filter predicate failed, element excluded");
                            Ok(false)
                        }
                    }
                })
            }
            Op::Unique(spec) => {
                let (spec, ctx) = (spec.clone(), ctx.clone());
                let mut seen = FxHashSet::default();
                let mut index = 0;
                pipe.op_filter(move |item| {
                    let key = if spec.is_identity() {
                        item.clone()
                    } else {
                        eval_value(&element_ctx(&ctx, &mut index), item.clone(), &spec)?
                    };
                    Ok(seen.insert(key)) // 返回 true 表示保留（首次出现）
                })
            }
            Op::Slice(slice) => Pipe::new(SliceIter::new(pipe, slice)),
            Op::TakeDrop { mode, cond } => {
                let (cond, ctx) = (cond.clone(), ctx.clone());
                let mut index = 0;
                let mut test = move |item: &Value| -> Result<bool, PipeErr> {
                    Ok(element_ctx(&ctx, &mut index).evaluate(item.clone(), &cond)?.truthy())
                };
                match mode {
                    TakeDropMode::TakeWhile => Pipe::new(pipe.map_while(move |item| match item {
                        Ok(value) => match test(&value) {
                            Ok(true) => Some(Ok(value)),
                            Ok(false) => None,
                            Err(err) => Some(Err(err)),
                        },
                        Err(err) => Some(Err(err)),
                    })),
                    TakeDropMode::DropWhile => {
                        let mut dropping = true;
                        pipe.op_filter(move |item| {
                            if dropping {
                                if test(item)? {
                                    return Ok(false);
                                }
                                dropping = false;
                            }
                            Ok(true)
                        })
                    }
                }
            }
            Op::Chunked { size, fill } => Pipe::new(ChunkIter::new(pipe, *size, fill.clone())),
            Op::Windowed { size } => Pipe::new(WindowIter::new(pipe, *size)),
            Op::Split { sep, maxsplit } => Pipe::new(SplitIter::new(pipe, sep.clone(), *maxsplit, ctx.clone())),
        }
    }
}

/// 第`index`个元素的求值上下文，并使`index`前进一位。
fn element_ctx(ctx: &Context, index: &mut usize) -> Context {
    let element = ctx.at(Segment::Index(*index));
    *index += 1;
    element
}

/// 求值并要求得到普通值，控制信号在阶段内没有意义，视为失败。
fn eval_value(ctx: &Context, item: Value, spec: &Spec) -> Result<Value, PipeErr> {
    match ctx.evaluate(item, spec)? {
        Flow::Value(value) => Ok(value),
        signal => Err(ctx.fail(format!("unexpected {signal} signal from `{spec}`"))),
    }
}
