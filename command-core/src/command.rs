//! 命令执行引擎（Command Execution Engine）
//!
//! 组合参数绑定与事务边界，承载唯一公开入口 `call` 及其结果协议：
//!
//! 1. 经 [`TransactionRunner`] 打开事务边界，边界内先执行工作体，
//!    再分发成功回调——成功回调失败同样触发回滚并按命令失败处理；
//! 2. 边界内任一环节出错：记录 `last_error`，存在失败回调则分发之
//!    （`call` 正常返回），否则将原错误原样上抛——无人处理的失败
//!    绝不被吞掉；
//! 3. 失败回调自身出错时，该错误直接上抛，允许掩盖原错误。
//!
use crate::arguments::{ArgumentMap, Arguments};
use crate::error::{CommandError, CommandResult};
use crate::transaction::{TransactionProvider, TransactionRunner, UnitOfWork};
use async_trait::async_trait;
use bon::bon;
use std::sync::Arc;
use tracing::{debug, error};

/// 具体命令的工作体契约
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志与排障，避免依赖 `type_name::<T>()`；
/// - `REQUIRED`：构造期必填的参数名，缺省为空。
///
/// `execute` 没有缺省实现：每个具体命令都必须显式声明自己的操作。
/// 其唯一可观察结果是副作用与是否出错。
#[async_trait]
pub trait Execute: Send + Sync {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 必填参数名（按声明顺序参与缺失报告）
    const REQUIRED: &'static [&'static str] = &[];

    /// 执行命令操作，读写已绑定的参数
    async fn execute(&mut self, args: &mut Arguments) -> CommandResult<()>;
}

/// 成功/失败回调句柄：以命令实例本身为唯一入参
///
/// 回调自身的失败以 `Err` 表达（对应“句柄不可调用”之类的运行期故障）。
pub type Callback<W> = Box<dyn Fn(&Command<W>) -> CommandResult<()> + Send + Sync>;

/// 命令实例：绑定参数 + 工作体 + 结果协议
///
/// 回调与事务提供方是专门字段，不走通用参数映射（统一采用
/// “专用字段”规则）。单个实例不做并发复用设计：同一实例同一
/// 时刻应只被一个调用方 `call`。
pub struct Command<W: Execute> {
    work: W,
    args: Arguments,
    on_success: Option<Callback<W>>,
    on_failure: Option<Callback<W>>,
    last_error: Option<CommandError>,
    runner: TransactionRunner,
}

#[bon]
impl<W: Execute> Command<W> {
    /// 构造命令：绑定并校验参数（可失败）
    ///
    /// 缺失 `W::REQUIRED` 中的参数时，构造以
    /// [`CommandError::MissingArguments`] 立即失败，任何工作都不会执行。
    #[builder]
    pub fn new(
        work: W,
        #[builder(default)] args: ArgumentMap,
        on_success: Option<Callback<W>>,
        on_failure: Option<Callback<W>>,
        provider: Option<Arc<dyn TransactionProvider>>,
    ) -> CommandResult<Self> {
        let args = Arguments::bind(args, W::REQUIRED)?;
        Ok(Self {
            work,
            args,
            on_success,
            on_failure,
            last_error: None,
            runner: TransactionRunner::new(provider),
        })
    }
}

impl<W: Execute> std::fmt::Debug for Command<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &W::NAME)
            .field("args", &self.args)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<W: Execute> Command<W> {
    /// 一步到位的便捷形式：构造（无回调、无事务提供方）并立即调用
    ///
    /// 等价于显式两步 construct/call 的失败即上抛（fail-loud）缺省。
    pub async fn oneshot(work: W, args: ArgumentMap) -> CommandResult<()> {
        let mut command = Self::builder().work(work).args(args).build()?;
        command.call().await
    }

    /// 唯一公开调用入口：执行完整结果协议
    ///
    /// 再次调用会从头重跑整个协议，`last_error` 被新一次失败覆盖；
    /// 本层不做任何记忆化或去重。
    pub async fn call(&mut self) -> CommandResult<()> {
        debug!(command = W::NAME, "command invoked");

        let runner = self.runner.clone();
        let result = {
            let this = &mut *self;
            let work: UnitOfWork<'_> = Box::new(move || Box::pin(Self::work_and_notify(this)));
            runner.run(work).await
        };

        match result {
            Ok(()) => {
                debug!(command = W::NAME, "command succeeded");
                Ok(())
            }
            Err(err) => {
                error!(command = W::NAME, error = %err, "command failed");
                self.confirm_failure(err)
            }
        }
    }

    /// 事务边界内的工作体：执行操作，随后在边界尚未关闭时分发成功回调
    ///
    /// 成功回调与“效果确已提交”由此绑定在同一边界内：回调失败
    /// 保证回滚，而不是半提交半通知。
    async fn work_and_notify(&mut self) -> CommandResult<()> {
        self.work.execute(&mut self.args).await?;
        self.confirm_success()
    }

    /// 成功分发：句柄存在则以命令实例调用一次，缺省不是错误
    fn confirm_success(&self) -> CommandResult<()> {
        if let Some(on_success) = &self.on_success {
            on_success(self)?;
        }
        Ok(())
    }

    /// 失败分发：记录错误后调用失败句柄；无句柄则原样上抛
    ///
    /// 句柄自身返回的错误直接透传，允许掩盖已记录的原错误。
    fn confirm_failure(&mut self, err: CommandError) -> CommandResult<()> {
        self.last_error = Some(err.clone());
        match &self.on_failure {
            Some(on_failure) => on_failure(self),
            None => Err(err),
        }
    }

    pub fn name(&self) -> &'static str {
        W::NAME
    }

    /// 已绑定的参数集
    pub fn arguments(&self) -> &Arguments {
        &self.args
    }

    /// 可写访问已绑定参数（键集仍不可增删）
    pub fn arguments_mut(&mut self) -> &mut Arguments {
        &mut self.args
    }

    pub fn work(&self) -> &W {
        &self.work
    }

    /// 最近一次失败调用捕获的错误；从未失败则为 `None`
    pub fn last_error(&self) -> Option<&CommandError> {
        self.last_error.as_ref()
    }

    pub fn is_transactional(&self) -> bool {
        self.runner.is_transactional()
    }
}
