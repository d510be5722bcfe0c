//! 命令基础库（command-core）
//!
//! 提供可复用的“命令”抽象，用于在应用中实现：
//! - 命名参数的构造期绑定与必填校验（`arguments`）
//! - 外部事务提供方之上的原子执行边界（`transaction`）
//! - 成功/失败回调的结果协议与错误捕获（`command`）
//!
//! 本 crate 不实现事务存储引擎本身，原子提交/回滚完全委托给外部
//! 提供方；未配置提供方时退化为直接执行。也不包含重试、并发协调
//! 或任何领域业务逻辑，仅定义控制流与错误传播的最小必要接口。
//!
//! 典型用法：
//! 1. 为业务操作实现 [`Execute`]，声明 `NAME` 与必填参数 `REQUIRED`；
//! 2. 经 `Command::builder()` 绑定参数、回调与事务提供方并构造；
//! 3. `call().await` 执行完整协议，或以 `Command::oneshot` 一步完成。
//!
pub mod arguments;
pub mod command;
pub mod error;
pub mod transaction;

pub use arguments::{ArgumentMap, Arguments};
pub use command::{Callback, Command, Execute};
pub use error::{CommandError, CommandResult};
pub use transaction::{TransactionProvider, TransactionRunner, UnitOfWork, WorkFuture};
