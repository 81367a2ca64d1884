use crate::value::Value;
use std::fmt::{Display, Formatter};

/// 单个元素求值的结果：普通值，或SKIP、STOP两种控制信号。
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    /// 跳过当前元素
    Skip,
    /// 终止整个序列
    Stop,
}

impl Flow {
    /// 控制信号视为假。
    pub fn truthy(&self) -> bool {
        match self {
            Flow::Value(value) => value.truthy(),
            Flow::Skip | Flow::Stop => false,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        if let Flow::Value(value) = self { Some(value) } else { None }
    }

    pub fn is_signal(&self) -> bool {
        !matches!(self, Flow::Value(_))
    }
}

impl From<Value> for Flow {
    fn from(value: Value) -> Self {
        Flow::Value(value)
    }
}

impl Display for Flow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Value(value) => write!(f, "{value}"),
            Flow::Skip => write!(f, "SKIP"),
            Flow::Stop => write!(f, "STOP"),
        }
    }
}
