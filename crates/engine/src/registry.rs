use std::collections::HashMap;
use std::sync::Arc;

use orchestrator_core::traits::TaskFunction;

/// 任务注册表：函数名到任务实现的显式映射
///
/// 启动时构建一次，之后只读。注册表通过构造函数注入调度组件，
/// 不存在全局注册入口，也不做任何运行时类型探测。
#[derive(Default)]
pub struct TaskRegistry {
    functions: HashMap<String, Arc<dyn TaskFunction>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定函数名到实现，同名后注册的覆盖先注册的
    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn TaskFunction>) {
        self.functions.insert(name.into(), function);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
