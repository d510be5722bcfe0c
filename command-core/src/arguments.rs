//! 命令参数绑定（Argument Binding）
//!
//! 以“开放草稿 + 冻结映射”的两阶段模型取代运行期反射：
//! - [`ArgumentMap`]：调用方自由填充的命名参数草稿，值为任意
//!   `Any + Send + Sync`；
//! - [`Arguments`]：按必填名单校验后冻结的参数集，键集不可再增删，
//!   每个条目可通过类型化的 `get`/`set` 读写。
//!
//! 校验失败发生在构造期，调用方看不到任何部分绑定的状态。
//!
use crate::error::{CommandError, CommandResult};
use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;

type ArgumentValue = Box<dyn Any + Send + Sync>;

/// 命名参数草稿：绑定前的开放映射
///
/// 同名条目后写覆盖先写；条目间无顺序语义。
#[derive(Default)]
pub struct ArgumentMap {
    values: BTreeMap<String, ArgumentValue>,
}

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式填充一个命名参数
    pub fn with(mut self, name: impl Into<String>, value: impl Any + Send + Sync) -> Self {
        self.insert(name, value);
        self
    }

    /// 填充一个命名参数
    pub fn insert(&mut self, name: impl Into<String>, value: impl Any + Send + Sync) {
        self.values.insert(name.into(), Box::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ArgumentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// 冻结后的参数集
///
/// 由 [`Arguments::bind`] 产出。键集自绑定起不可变：没有任何
/// 增删键的公开接口，`set` 仅允许覆盖已存在键的值（值类型可以
/// 改变，对应原始设计中无类型的属性重赋值）。
pub struct Arguments {
    values: BTreeMap<String, ArgumentValue>,
}

impl Arguments {
    /// 按必填名单校验并冻结草稿
    ///
    /// `missing = required − keys(map)`，按声明顺序收集；非空则以
    /// [`CommandError::MissingArguments`] 失败，错误消息将缺失键
    /// 逗号连接。
    pub fn bind(map: ArgumentMap, required: &[&str]) -> CommandResult<Self> {
        let missing: Vec<&str> = required
            .iter()
            .filter(|name| !map.values.contains_key(**name))
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(CommandError::MissingArguments {
                names: missing.join(", "),
            });
        }

        Ok(Self { values: map.values })
    }

    /// 类型化读取
    pub fn get<T: Any>(&self, name: &str) -> CommandResult<&T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| CommandError::UnknownArgument { name: name.into() })?;

        value
            .downcast_ref::<T>()
            .ok_or_else(|| CommandError::TypeMismatch {
                name: name.into(),
                expected: type_name::<T>(),
            })
    }

    /// 类型化覆盖已绑定键的值
    ///
    /// 未绑定的键直接报错，绝不隐式扩展键集。
    pub fn set<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> CommandResult<()> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = Box::new(value);
                Ok(())
            }
            None => Err(CommandError::UnknownArgument { name: name.into() }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// 已绑定键名（字典序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 值已被类型擦除，仅展示键集
        f.debug_set().entries(self.values.keys()).finish()
    }
}
