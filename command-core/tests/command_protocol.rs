//! 以公开契约端到端驱动命令协议：
//! 建组 + 按用户偏好通知的消费方场景，配合记账式事务提供方
//! 观察提交/回滚与分发顺序。

use async_trait::async_trait;
use command_core::{
    ArgumentMap, Arguments, Callback, Command, CommandError, CommandResult, Execute,
    TransactionProvider, UnitOfWork,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
struct User {
    #[allow(dead_code)]
    id: String,
    receives_email: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct Group {
    name: String,
}

/// 共享事件日志：断言边界内外的先后顺序
#[derive(Clone, Default)]
struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    fn push(&self, entry: &str) {
        self.entries.lock().unwrap().push(entry.to_string());
    }

    fn snapshot(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// 记账式事务提供方：记录 begin/commit/rollback
#[derive(Clone, Default)]
struct RecordingTx {
    log: EventLog,
    committed: Arc<AtomicUsize>,
    rolled_back: Arc<AtomicUsize>,
}

#[async_trait]
impl TransactionProvider for RecordingTx {
    async fn transaction<'a>(&self, work: UnitOfWork<'a>) -> CommandResult<()> {
        self.log.push("begin");
        match work().await {
            Ok(()) => {
                self.committed.fetch_add(1, Ordering::Relaxed);
                self.log.push("commit");
                Ok(())
            }
            Err(err) => {
                self.rolled_back.fetch_add(1, Ordering::Relaxed);
                self.log.push("rollback");
                Err(err)
            }
        }
    }
}

#[derive(Clone, Default)]
struct GroupStore {
    saved: Arc<Mutex<Vec<Group>>>,
}

#[derive(Clone, Default)]
struct Notifier {
    delivered: Arc<AtomicUsize>,
}

impl Notifier {
    fn deliver(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }
}

/// 建组命令：保存 group，用户订阅邮件时投递通知
struct CreateGroup {
    store: GroupStore,
    notifier: Notifier,
    log: EventLog,
}

#[async_trait]
impl Execute for CreateGroup {
    const NAME: &'static str = "create_group";
    const REQUIRED: &'static [&'static str] = &["user", "group"];

    async fn execute(&mut self, args: &mut Arguments) -> CommandResult<()> {
        let user = args.get::<User>("user")?.clone();
        let group = args.get::<Group>("group")?.clone();

        self.store.saved.lock().unwrap().push(group);
        self.log.push("executed");

        if user.receives_email {
            self.notifier.deliver();
        }
        Ok(())
    }
}

fn scenario_args(receives_email: bool) -> ArgumentMap {
    ArgumentMap::new()
        .with(
            "user",
            User {
                id: "u-1".to_string(),
                receives_email,
            },
        )
        .with(
            "group",
            Group {
                name: "library".to_string(),
            },
        )
}

#[tokio::test]
async fn constructing_without_group_names_the_missing_argument() {
    let err = Command::builder()
        .work(CreateGroup {
            store: GroupStore::default(),
            notifier: Notifier::default(),
            log: EventLog::default(),
        })
        .args(ArgumentMap::new().with(
            "user",
            User {
                id: "u-1".to_string(),
                receives_email: true,
            },
        ))
        .build()
        .unwrap_err();

    match err {
        CommandError::MissingArguments { names } => assert_eq!(names, "group"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn create_group_saves_and_notifies_subscribed_users() {
    let store = GroupStore::default();
    let notifier = Notifier::default();

    Command::oneshot(
        CreateGroup {
            store: store.clone(),
            notifier: notifier.clone(),
            log: EventLog::default(),
        },
        scenario_args(true),
    )
    .await
    .unwrap();

    assert_eq!(store.saved.lock().unwrap().len(), 1);
    assert_eq!(notifier.delivered.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn create_group_saves_without_notifying_unsubscribed_users() {
    let store = GroupStore::default();
    let notifier = Notifier::default();

    Command::oneshot(
        CreateGroup {
            store: store.clone(),
            notifier: notifier.clone(),
            log: EventLog::default(),
        },
        scenario_args(false),
    )
    .await
    .unwrap();

    assert_eq!(store.saved.lock().unwrap().len(), 1);
    assert_eq!(notifier.delivered.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn success_dispatch_runs_inside_the_open_boundary() {
    let tx = RecordingTx::default();
    let log = tx.log.clone();
    let cb_log = log.clone();

    let on_success: Callback<CreateGroup> = Box::new(move |_cmd| {
        cb_log.push("notified");
        Ok(())
    });

    let mut command = Command::builder()
        .work(CreateGroup {
            store: GroupStore::default(),
            notifier: Notifier::default(),
            log: log.clone(),
        })
        .args(scenario_args(false))
        .on_success(on_success)
        .provider(Arc::new(tx.clone()))
        .build()
        .unwrap();

    command.call().await.unwrap();

    // 成功回调先于提交、晚于工作体，且都在同一边界内
    assert_eq!(log.snapshot(), ["begin", "executed", "notified", "commit"]);
    assert_eq!(tx.committed.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn failing_success_callback_rolls_the_boundary_back() {
    let tx = RecordingTx::default();
    let log = tx.log.clone();
    let failures = Arc::new(AtomicUsize::new(0));
    let seen = failures.clone();

    let on_success: Callback<CreateGroup> =
        Box::new(|_cmd| Err(CommandError::callback("notifier exploded")));
    let on_failure: Callback<CreateGroup> = Box::new(move |_cmd| {
        seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });

    let mut command = Command::builder()
        .work(CreateGroup {
            store: GroupStore::default(),
            notifier: Notifier::default(),
            log: log.clone(),
        })
        .args(scenario_args(false))
        .on_success(on_success)
        .on_failure(on_failure)
        .provider(Arc::new(tx.clone()))
        .build()
        .unwrap();

    command.call().await.unwrap();

    assert_eq!(log.snapshot(), ["begin", "executed", "rollback"]);
    assert_eq!(tx.rolled_back.load(Ordering::Relaxed), 1);
    assert_eq!(failures.load(Ordering::Relaxed), 1);
    match command.last_error() {
        Some(CommandError::Callback { reason }) => assert_eq!(reason, "notifier exploded"),
        other => panic!("unexpected {other:?}"),
    }
}

/// 工作体必然失败的命令
struct AlwaysFails;

#[async_trait]
impl Execute for AlwaysFails {
    const NAME: &'static str = "always_fails";

    async fn execute(&mut self, _args: &mut Arguments) -> CommandResult<()> {
        Err(CommandError::execution("storage unavailable"))
    }
}

#[tokio::test]
async fn failing_work_rolls_back_and_reraises_without_a_handler() {
    let tx = RecordingTx::default();

    let mut command = Command::builder()
        .work(AlwaysFails)
        .provider(Arc::new(tx.clone()))
        .build()
        .unwrap();

    let err = command.call().await.unwrap_err();
    match err {
        CommandError::Execution { reason } => assert_eq!(reason, "storage unavailable"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tx.rolled_back.load(Ordering::Relaxed), 1);
    assert_eq!(tx.committed.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn each_invocation_owns_its_own_boundary() {
    let tx = RecordingTx::default();
    let hits = Arc::new(AtomicUsize::new(0));

    let mut command = Command::builder()
        .work(AlwaysFails)
        .on_failure({
            let seen = hits.clone();
            let cb: Callback<AlwaysFails> = Box::new(move |_cmd| {
                seen.fetch_add(1, Ordering::Relaxed);
                Ok(())
            });
            cb
        })
        .provider(Arc::new(tx.clone()))
        .build()
        .unwrap();

    command.call().await.unwrap();
    command.call().await.unwrap();

    assert_eq!(tx.rolled_back.load(Ordering::Relaxed), 2);
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}
