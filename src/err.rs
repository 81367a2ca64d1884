use crate::context::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeErr {
    #[error("[Invalid Args] Invalid arguments for stage `{stage}`: {reason}")]
    InvalidArguments { stage: &'static str, reason: String },

    #[error("[Not Iterable] Failed to iterate on instance of type `{type_name}` at `{path}`{}", cause_suffix(.cause))]
    NotIterable {
        type_name: &'static str,
        path: Path,
        #[source]
        cause: Option<Box<PipeErr>>,
    },

    #[error("[Eval] Evaluation failed at `{path}`: {reason}")]
    Evaluation { path: Path, reason: String },
}

impl PipeErr {
    pub(crate) fn invalid_args(stage: &'static str, reason: impl Into<String>) -> PipeErr {
        PipeErr::InvalidArguments { stage, reason: reason.into() }
    }

    pub(crate) fn not_iterable(type_name: &'static str, path: &Path, cause: Option<PipeErr>) -> PipeErr {
        PipeErr::NotIterable { type_name, path: path.clone(), cause: cause.map(Box::new) }
    }

    /// 错误发生的位置，参数错误没有位置。
    pub fn path(&self) -> Option<&Path> {
        match self {
            PipeErr::InvalidArguments { .. } => None,
            PipeErr::NotIterable { path, .. } | PipeErr::Evaluation { path, .. } => Some(path),
        }
    }
}

fn cause_suffix(cause: &Option<Box<PipeErr>>) -> String {
    match cause {
        Some(cause) => format!(" (got: {cause})"),
        None => String::new(),
    }
}
