//! ScriptedWork - 振る舞いをスクリプトで決める UnitOfWork（テスト・デモ用）
//!
//! title ごとに「n 回失敗する」「n 回 panic する」「終わらない」「中断を返す」を指定できます。
//! 実行された順序を記録するので、drain の順序をテストで確認できます。

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Task, TaskId, WorkOutcome};
use crate::ports::UnitOfWork;

#[derive(Default)]
struct Script {
    remaining_failures: HashMap<String, u32>,
    remaining_panics: HashMap<String, u32>,
    hanging: HashSet<String>,
    cancelling: HashSet<String>,
    performed: Vec<TaskId>,
}

#[derive(Default)]
pub struct ScriptedWork {
    script: Mutex<Script>,
    delay: Duration,
}

impl ScriptedWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every successful or failing step.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The next `times` runs of tasks titled `title` report failure.
    pub fn fail_times(&self, title: impl Into<String>, times: u32) {
        self.lock().remaining_failures.insert(title.into(), times);
    }

    /// The next `times` runs of tasks titled `title` panic.
    pub fn panic_times(&self, title: impl Into<String>, times: u32) {
        self.lock().remaining_panics.insert(title.into(), times);
    }

    /// Tasks titled `title` report `WorkOutcome::Cancelled`.
    pub fn cancel_on(&self, title: impl Into<String>) {
        self.lock().cancelling.insert(title.into());
    }

    /// Tasks titled `title` never finish on their own.
    pub fn hang_on(&self, title: impl Into<String>) {
        self.lock().hanging.insert(title.into());
    }

    /// Ids of every task handed to `perform`, in call order.
    pub fn performed(&self) -> Vec<TaskId> {
        self.lock().performed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UnitOfWork for ScriptedWork {
    async fn perform(&self, task: &Task) -> WorkOutcome {
        let (hang, cancel, explode, fail) = {
            let mut script = self.lock();
            script.performed.push(task.id);
            let hang = script.hanging.contains(&task.title);
            let cancel = script.cancelling.contains(&task.title);
            let explode = take_one(&mut script.remaining_panics, &task.title);
            let fail = take_one(&mut script.remaining_failures, &task.title);
            (hang, cancel, explode, fail)
        };

        // lock is released here so a panic does not poison it
        if explode {
            panic!("scripted panic for '{}'", task.title);
        }
        if cancel {
            return WorkOutcome::Cancelled;
        }
        if hang {
            std::future::pending::<()>().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if fail {
            WorkOutcome::failed(format!("scripted failure for '{}'", task.title))
        } else {
            WorkOutcome::Success
        }
    }
}

/// Consume one scripted occurrence for `title`, if any are left.
fn take_one(counts: &mut HashMap<String, u32>, title: &str) -> bool {
    match counts.get_mut(title) {
        Some(left) if *left > 0 => {
            *left -= 1;
            true
        }
        _ => false,
    }
}
