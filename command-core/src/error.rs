//! 命令层统一错误定义
//!
//! 聚焦参数绑定、命令执行与回调分发等最小必要集合，
//! 便于具体命令在各环节统一转换为 `CommandError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
///
/// 所有变体均携带可克隆的字符串载荷，引擎因此可以在记录
/// `last_error` 的同时将原错误原样返回给调用方。
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    // --- 构造期参数校验 ---
    #[error("{names} required but not given")]
    MissingArguments { names: String },

    // --- 参数访问 ---
    #[error("argument not bound: {name}")]
    UnknownArgument { name: String },
    #[error("argument type mismatch: name={name}, expected={expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    // --- 执行与分发 ---
    #[error("execution failed: {reason}")]
    Execution { reason: String },
    #[error("callback failed: {reason}")]
    Callback { reason: String },
    #[error("transaction failed: {reason}")]
    Transaction { reason: String },
}

impl CommandError {
    /// 命令工作体失败
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// 成功/失败回调自身失败
    pub fn callback(reason: impl Into<String>) -> Self {
        Self::Callback {
            reason: reason.into(),
        }
    }

    /// 事务提供方失败
    pub fn transaction(reason: impl Into<String>) -> Self {
        Self::Transaction {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type CommandResult<T> = Result<T, CommandError>;
