use crate::config::Config;
use crate::err::PipeErr;
use crate::eval::DefaultEvaluator;
use crate::registry::TargetRegistry;
use crate::spec::Spec;
use crate::value::Value;
use crate::EvalRes;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// 递归求值器：将规格应用于目标。
pub trait Evaluator {
    fn evaluate(&self, target: Value, spec: &Spec, ctx: &Context) -> EvalRes;
}

/// 位置描述中的一段
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Segment {
    /// 目标中的第几个元素
    Index(usize),
    /// 某个阶段内的求值
    Stage(&'static str),
}

/// 当前求值位置，用于错误定位。
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Path {
        Path(Vec::new())
    }

    pub fn child(&self, segment: Segment) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment);
        Path(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl<const N: usize> From<[Segment; N]> for Path {
    fn from(segments: [Segment; N]) -> Self {
        Path(segments.into())
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Stage(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

/// 执行时依赖的环境：目标注册表、求值器、当前位置与配置。
#[derive(Clone)]
pub struct Context {
    registry: Rc<TargetRegistry>,
    evaluator: Rc<dyn Evaluator>,
    path: Path,
    configs: Rc<[Config]>,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    /// 使用默认注册表与[`DefaultEvaluator`]。
    pub fn new() -> Context {
        Context::with_parts(TargetRegistry::default(), DefaultEvaluator)
    }

    pub fn with_parts(registry: TargetRegistry, evaluator: impl Evaluator + 'static) -> Context {
        Context { registry: Rc::new(registry), evaluator: Rc::new(evaluator), path: Path::root(), configs: Rc::new([]) }
    }

    pub fn with_configs(mut self, configs: impl Into<Rc<[Config]>>) -> Context {
        self.configs = configs.into();
        self
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    /// 派生一个位置更深一层的上下文。
    pub fn at(&self, segment: Segment) -> Context {
        Context {
            registry: self.registry.clone(),
            evaluator: self.evaluator.clone(),
            path: self.path.child(segment),
            configs: self.configs.clone(),
        }
    }

    pub fn evaluate(&self, target: Value, spec: &Spec) -> EvalRes {
        self.evaluator.evaluate(target, spec, self)
    }

    /// 在当前位置构造求值错误。
    pub fn fail(&self, reason: impl Into<String>) -> PipeErr {
        PipeErr::Evaluation { path: self.path.clone(), reason: reason.into() }
    }
}
