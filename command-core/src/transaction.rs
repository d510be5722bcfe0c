//! 事务边界（Transaction Boundary）
//!
//! 将“在原子边界内执行一段延迟工作”抽象为可替换的接口：
//! - [`TransactionProvider`]：外部事务提供方，负责正常返回即提交、
//!   出错即回滚；
//! - [`TransactionRunner`]：薄委派层，配置了提供方则移交，否则直接
//!   调用工作体（无原子性保证）。
//!
//! 本层不做任何错误翻译：工作体或提供方产生的错误原样上抛给
//! 命令执行引擎。
//!
use crate::error::CommandResult;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// 延迟工作体产生的装箱 Future
pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = CommandResult<()>> + Send + 'a>>;

/// 零参延迟工作体：事务边界内执行的闭包
pub type UnitOfWork<'a> = Box<dyn FnOnce() -> WorkFuture<'a> + Send + 'a>;

/// 事务提供方接口
///
/// 唯一操作：在原子边界内执行 `work`。提交/回滚纪律完全由具体
/// 实现承担（例如数据库事务，或测试中的记账假实现）。
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    async fn transaction<'a>(&self, work: UnitOfWork<'a>) -> CommandResult<()>;
}

/// 事务执行器：提供方存在则委派，缺省则直接执行
#[derive(Clone, Default)]
pub struct TransactionRunner {
    provider: Option<Arc<dyn TransactionProvider>>,
}

impl TransactionRunner {
    pub fn new(provider: Option<Arc<dyn TransactionProvider>>) -> Self {
        Self { provider }
    }

    /// 绑定具体事务提供方
    pub fn with_provider(provider: Arc<dyn TransactionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// 无事务直通模式
    pub fn direct() -> Self {
        Self { provider: None }
    }

    pub fn is_transactional(&self) -> bool {
        self.provider.is_some()
    }

    /// 执行工作体，返回值与错误均原样透传
    pub async fn run<'a>(&self, work: UnitOfWork<'a>) -> CommandResult<()> {
        match &self.provider {
            Some(provider) => provider.transaction(work).await,
            None => work().await,
        }
    }
}
