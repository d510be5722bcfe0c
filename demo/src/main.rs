//! 消费方示例：建组命令 + 内存事务提供方
//!
//! 演示完整协议：绑定参数、在事务边界内执行与分发成功回调、
//! 回调失败触发回滚、失败句柄吸收错误并经 `last_error` 检视。

use async_trait::async_trait;
use command_core::{
    ArgumentMap, Arguments, Callback, Command, CommandError, CommandResult, Execute,
    TransactionProvider, UnitOfWork,
};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone, Debug)]
struct User {
    name: String,
    receives_email: bool,
}

#[derive(Clone, Debug)]
struct Group {
    name: String,
}

/// 内存“数据库”：以快照/恢复模拟提交与回滚
#[derive(Clone, Default)]
struct InMemoryDb {
    groups: Arc<Mutex<Vec<Group>>>,
}

#[async_trait]
impl TransactionProvider for InMemoryDb {
    async fn transaction<'a>(&self, work: UnitOfWork<'a>) -> CommandResult<()> {
        let snapshot = self.groups.lock().unwrap().clone();
        match work().await {
            Ok(()) => Ok(()),
            Err(err) => {
                // 回滚：恢复进入边界前的状态
                *self.groups.lock().unwrap() = snapshot;
                Err(err)
            }
        }
    }
}

struct CreateGroup {
    db: InMemoryDb,
}

#[async_trait]
impl Execute for CreateGroup {
    const NAME: &'static str = "create_group";
    const REQUIRED: &'static [&'static str] = &["user", "group"];

    async fn execute(&mut self, args: &mut Arguments) -> CommandResult<()> {
        let user = args.get::<User>("user")?.clone();
        let group = args.get::<Group>("group")?.clone();

        self.db.groups.lock().unwrap().push(group.clone());
        info!(group = %group.name, "group saved");

        if user.receives_email {
            info!(user = %user.name, "notification delivered");
        }
        Ok(())
    }
}

fn args_for(user: User, group: Group) -> ArgumentMap {
    ArgumentMap::new().with("user", user).with("group", group)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> CommandResult<()> {
    tracing_subscriber::fmt().init();

    let db = InMemoryDb::default();
    let alice = User {
        name: "Alice".to_string(),
        receives_email: true,
    };

    // 成功路径：工作体与成功回调都在同一事务边界内完成
    let on_success: Callback<CreateGroup> = Box::new(|cmd| {
        info!(command = cmd.name(), "confirmed");
        Ok(())
    });
    let mut create = Command::builder()
        .work(CreateGroup { db: db.clone() })
        .args(args_for(
            alice.clone(),
            Group {
                name: "library".to_string(),
            },
        ))
        .on_success(on_success)
        .provider(Arc::new(db.clone()))
        .build()?;
    create.call().await?;
    info!(groups = db.groups.lock().unwrap().len(), "after success");

    // 失败路径：成功回调出错 -> 回滚，失败句柄吸收错误
    let exploding: Callback<CreateGroup> =
        Box::new(|_cmd| Err(CommandError::callback("mailer is down")));
    let on_failure: Callback<CreateGroup> = Box::new(|cmd| {
        info!(
            command = cmd.name(),
            error = %cmd.last_error().map(ToString::to_string).unwrap_or_default(),
            "failure handled"
        );
        Ok(())
    });
    let mut doomed = Command::builder()
        .work(CreateGroup { db: db.clone() })
        .args(args_for(
            alice,
            Group {
                name: "archive".to_string(),
            },
        ))
        .on_success(exploding)
        .on_failure(on_failure)
        .provider(Arc::new(db.clone()))
        .build()?;
    doomed.call().await?;
    info!(groups = db.groups.lock().unwrap().len(), "after rollback");

    Ok(())
}
