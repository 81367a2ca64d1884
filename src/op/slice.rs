use crate::err::PipeErr;
use crate::pipe::Pipe;
use crate::value::Value;

/// 切片参数，语义同`start:stop:step`，只支持非负索引。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct SliceArg {
    pub(crate) start: usize,
    pub(crate) stop: Option<usize>,
    pub(crate) step: usize,
}

impl SliceArg {
    pub(crate) fn limit(count: usize) -> SliceArg {
        SliceArg { start: 0, stop: Some(count), step: 1 }
    }

    /// 解析1至3个参数：`stop`；`start, stop`；`start, stop, step`。
    ///
    /// `start`与`stop`必须为非负整数或null，`step`必须为正整数或null。
    pub(crate) fn parse(stage: &'static str, args: &[Value]) -> Result<SliceArg, PipeErr> {
        let (start, stop, step) = match args {
            [stop] => (None, stop, None),
            [start, stop] => (Some(start), stop, None),
            [start, stop, step] => (Some(start), stop, Some(step)),
            _ => return Err(PipeErr::invalid_args(stage, format!("expected 1 to 3 arguments, got {}", args.len()))),
        };
        let start = start.map(|v| index_arg(stage, "start", v)).transpose()?.flatten().unwrap_or(0);
        let stop = index_arg(stage, "stop", stop)?;
        let step = step.map(|v| index_arg(stage, "step", v)).transpose()?.flatten().unwrap_or(1);
        if step == 0 {
            return Err(PipeErr::invalid_args(stage, "`step` must be a positive integer or null"));
        }
        Ok(SliceArg { start, stop, step })
    }
}

fn index_arg(stage: &'static str, name: &str, value: &Value) -> Result<Option<usize>, PipeErr> {
    match value {
        Value::Null => Ok(None),
        Value::Int(i) => usize::try_from(*i)
            .map(Some)
            .map_err(|_| PipeErr::invalid_args(stage, format!("`{name}` must be non-negative, got {i}"))),
        other => Err(PipeErr::invalid_args(
            stage,
            format!("`{name}` must be an integer or null, got `{}` of type {}", other, other.type_name()),
        )),
    }
}

/// 切片迭代，到达`stop`后不再拉取上游。
pub(crate) struct SliceIter {
    source: Pipe,
    /// 上游下一个元素的索引
    pos: usize,
    /// 下一个需要保留的索引
    wanted: usize,
    stop: Option<usize>,
    step: usize,
}

impl SliceIter {
    pub(crate) fn new(source: Pipe, slice: &SliceArg) -> SliceIter {
        SliceIter { source, pos: 0, wanted: slice.start, stop: slice.stop, step: slice.step }
    }
}

impl Iterator for SliceIter {
    type Item = Result<Value, PipeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some_and(|stop| self.wanted >= stop) {
            return None;
        }
        loop {
            let item = self.source.next()?;
            let pos = self.pos;
            self.pos += 1;
            match item {
                Err(err) => return Some(Err(err)),
                Ok(item) if pos == self.wanted => {
                    self.wanted = self.wanted.saturating_add(self.step);
                    return Some(Ok(item));
                }
                Ok(_) => {}
            }
        }
    }
}
