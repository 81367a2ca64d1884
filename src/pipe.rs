use crate::err::PipeErr;
use crate::value::Value;

/// 惰性、单次遍历的元素序列。
///
/// 产生`None`或错误之后不再产生任何元素。
pub struct Pipe {
    iter: Box<dyn Iterator<Item = Result<Value, PipeErr>>>,
    done: bool,
}

impl Iterator for Pipe {
    type Item = Result<Value, PipeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.iter.next();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

impl Pipe {
    pub fn new(iter: impl Iterator<Item = Result<Value, PipeErr>> + 'static) -> Pipe {
        Pipe { iter: Box::new(iter), done: false }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value, IntoIter: 'static>) -> Pipe {
        Pipe::new(values.into_iter().map(Ok))
    }

    pub fn empty() -> Pipe {
        Pipe::new(std::iter::empty())
    }

    /// 消费全部元素，遇到第一个错误时返回该错误。
    pub fn try_collect_values(self) -> Result<Vec<Value>, PipeErr> {
        self.collect()
    }

    pub(crate) fn op_map(self, mut f: impl FnMut(Value) -> Result<Value, PipeErr> + 'static) -> Pipe {
        Pipe::new(self.map(move |item| item.and_then(&mut f)))
    }

    pub(crate) fn op_filter(self, mut f: impl FnMut(&Value) -> Result<bool, PipeErr> + 'static) -> Pipe {
        Pipe::new(self.filter_map(move |item| match item {
            Ok(value) => match f(&value) {
                Ok(true) => Some(Ok(value)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            },
            Err(err) => Some(Err(err)),
        }))
    }
}
