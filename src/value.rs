use crate::context::Path;
use crate::err::PipeErr;
use crate::pipe::Pipe;
use crate::{Float, Integer};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// 流水线中流转的元素。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Int(Integer),
    Float(OrderedFloat<Float>),
    Str(String),
    List(Vec<Value>),
    /// 单次遍历的惰性序列，克隆后共享同一个遍历进度。
    Stream(Stream),
}

impl Value {
    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Value {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn stream(pipe: Pipe) -> Value {
        Value::Stream(Stream::new(pipe))
    }

    /// 真值判断：null、false、0、0.0、空字符串与空列表为假，流总为真。
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => f.0 != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Stream(_) => true,
        }
    }

    /// 类型名，用于诊断信息。
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Stream(_) => "stream",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(s) = self { Some(s) } else { None }
    }

    pub fn as_int(&self) -> Option<Integer> {
        if let Value::Int(i) = self { Some(*i) } else { None }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        if let Value::List(items) = self { Some(items) } else { None }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{:?}", v.0),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Stream(_) => write!(f, "<stream>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as Integer)
    }
}

/// 超出整数范围时取最大值。
impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(Integer::try_from(value).unwrap_or(Integer::MAX))
    }
}

impl From<Float> for Value {
    fn from(value: Float) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::list(value)
    }
}

/// 共享的单次遍历序列，按身份比较与哈希。
#[derive(Clone)]
pub struct Stream(Rc<RefCell<Pipe>>);

impl Stream {
    pub fn new(pipe: Pipe) -> Stream {
        Stream(Rc::new(RefCell::new(pipe)))
    }

    /// 从共享的序列中取出下一个元素。
    ///
    /// 序列正在产生元素时再次拉取（如在自身的求值中遍历自身）返回错误。
    pub(crate) fn pull(&self) -> Option<<Pipe as Iterator>::Item> {
        match self.0.try_borrow_mut() {
            Ok(mut pipe) => pipe.next(),
            Err(_) => Some(Err(PipeErr::Evaluation {
                path: Path::root(),
                reason: "stream is already being iterated".to_string(),
            })),
        }
    }
}

impl Iterator for Stream {
    type Item = <Pipe as Iterator>::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull()
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stream({:p})", Rc::as_ptr(&self.0))
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Stream {}

impl Hash for Stream {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state)
    }
}
