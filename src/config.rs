#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Config {
    /// 执行时以`info`级别输出流水线及各阶段信息
    Verbose,
    /// `filter`的条件求值失败时传播错误，而不是丢弃该元素
    StrictFilter,
}

#[inline]
pub fn is_verbose(configs: &[Config]) -> bool {
    configs.contains(&Config::Verbose)
}

#[inline]
pub fn is_strict_filter(configs: &[Config]) -> bool {
    configs.contains(&Config::StrictFilter)
}
