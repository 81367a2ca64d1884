use crate::err::PipeErr;
use crate::pipe::Pipe;
use crate::value::Value;
use std::collections::VecDeque;

/// 按固定大小分组，每次只缓存一组。
pub(crate) struct ChunkIter {
    source: Pipe,
    size: usize,
    fill: Option<Value>,
}

impl ChunkIter {
    pub(crate) fn new(source: Pipe, size: usize, fill: Option<Value>) -> ChunkIter {
        ChunkIter { source, size, fill }
    }
}

impl Iterator for ChunkIter {
    type Item = Result<Value, PipeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.size);
        while chunk.len() < self.size {
            match self.source.next() {
                Some(Ok(item)) => chunk.push(item),
                Some(Err(err)) => return Some(Err(err)),
                None => break,
            }
        }
        if chunk.is_empty() {
            return None;
        }
        if let Some(fill) = &self.fill {
            chunk.resize(self.size, fill.clone());
        }
        Some(Ok(Value::List(chunk)))
    }
}

/// 滑动窗口，缓存最近的`size`个元素。
pub(crate) struct WindowIter {
    source: Pipe,
    size: usize,
    window: VecDeque<Value>,
}

impl WindowIter {
    pub(crate) fn new(source: Pipe, size: usize) -> WindowIter {
        WindowIter { source, size, window: VecDeque::with_capacity(size) }
    }
}

impl Iterator for WindowIter {
    type Item = Result<Value, PipeErr>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.window.len() < self.size {
            match self.source.next()? {
                Ok(item) => self.window.push_back(item),
                Err(err) => return Some(Err(err)),
            }
        }
        let window = Value::List(self.window.iter().cloned().collect());
        self.window.pop_front();
        Some(Ok(window))
    }
}
