use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use taskmill_core::impls::{InMemoryTaskStore, ScriptedWork};
use taskmill_core::ports::{ManualClock, TaskStore};
use taskmill_core::{
    NewTask, Priority, Scheduler, SchedulerBuilder, SchedulerConfig, Task, TaskId, TaskService, TaskStatus,
};

struct Harness {
    clock: Arc<ManualClock>,
    store: Arc<InMemoryTaskStore>,
    work: Arc<ScriptedWork>,
    scheduler: Arc<Scheduler>,
    service: TaskService,
}

fn harness(work: ScriptedWork) -> Harness {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()));
    let store = Arc::new(InMemoryTaskStore::with_clock(clock.clone()));
    let work = Arc::new(work);
    let scheduler = Arc::new(
        SchedulerBuilder::new(store.clone())
            .config(SchedulerConfig {
                work_timeout_millis: 5_000,
                ..Default::default()
            })
            .work(work.clone())
            .clock(clock.clone())
            .build(),
    );
    let service = TaskService::new(store.clone(), scheduler.clone(), clock.clone());
    Harness {
        clock,
        store,
        work,
        scheduler,
        service,
    }
}

impl Harness {
    /// Create a task one second after the previous one.
    async fn create(&self, title: &str, priority: Priority) -> Task {
        self.clock.advance(chrono::Duration::seconds(1));
        self.service.create_task(NewTask::new(title, priority)).await.unwrap()
    }

    async fn status(&self, id: TaskId) -> TaskStatus {
        self.store.find_by_id(id).await.unwrap().unwrap().status
    }
}

#[tokio::test]
async fn scenario_a_high_medium_low_in_one_cycle() {
    let h = harness(ScriptedWork::new());
    let low = h.create("low", Priority::Low).await;
    let high = h.create("high", Priority::High).await;
    let medium = h.create("medium", Priority::Medium).await;

    let report = h.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.processing_order(), vec![high.id, medium.id, low.id]);
    for id in [high.id, medium.id, low.id] {
        assert_eq!(h.status(id).await, TaskStatus::Completed);
    }
}

#[tokio::test]
async fn distinct_priorities_ignore_creation_order() {
    let h = harness(ScriptedWork::new());
    let l1 = h.create("l1", Priority::Low).await;
    let m1 = h.create("m1", Priority::Medium).await;
    let l2 = h.create("l2", Priority::Low).await;
    let h1 = h.create("h1", Priority::High).await;

    let report = h.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.processing_order(), vec![h1.id, m1.id, l1.id, l2.id]);
}

#[tokio::test]
async fn equal_priority_drains_oldest_first() {
    let h = harness(ScriptedWork::new());
    // persist without submitting, then submit newest first
    let mut tasks = Vec::new();
    for title in ["first", "second", "third"] {
        h.clock.advance(chrono::Duration::seconds(1));
        tasks.push(h.store.create(NewTask::new(title, Priority::Medium)).await.unwrap());
    }
    for task in tasks.iter().rev() {
        assert!(h.scheduler.submit(task));
    }

    let report = h.scheduler.run_cycle().await.unwrap();

    let expected: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(report.processing_order(), expected);
}

#[tokio::test]
async fn scenario_b_failure_requeues_then_completes() {
    let h = harness(ScriptedWork::new());
    h.work.fail_times("flaky", 1);
    let task = h.create("flaky", Priority::High).await;

    let first = h.scheduler.run_cycle().await.unwrap();
    assert_eq!(first.requeued(), vec![task.id]);
    assert_eq!(h.status(task.id).await, TaskStatus::Pending);

    let second = h.scheduler.run_cycle().await.unwrap();
    assert_eq!(second.reloaded, 1);
    assert_eq!(second.completed(), vec![task.id]);
    assert_eq!(h.status(task.id).await, TaskStatus::Completed);
    assert_eq!(
        h.store.saved_statuses(task.id).await,
        vec![
            TaskStatus::Active,
            TaskStatus::Pending,
            TaskStatus::Active,
            TaskStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn deterministic_failure_retries_every_cycle() {
    let h = harness(ScriptedWork::new());
    h.work.fail_times("broken", u32::MAX);
    let task = h.create("broken", Priority::Low).await;

    for _ in 0..3 {
        let report = h.scheduler.run_cycle().await.unwrap();
        assert_eq!(report.requeued(), vec![task.id]);
    }
    assert_eq!(h.work.performed(), vec![task.id; 3]);
    assert_eq!(h.status(task.id).await, TaskStatus::Pending);
}

#[tokio::test]
async fn completed_tasks_stay_completed() {
    let h = harness(ScriptedWork::new());
    let task = h.create("once", Priority::High).await;
    h.scheduler.run_cycle().await.unwrap();
    let saves = h.store.saved_statuses(task.id).await;

    // a stale copy is still pending; it must not bring the task back
    assert!(h.scheduler.submit(&task));
    for _ in 0..2 {
        h.scheduler.run_cycle().await.unwrap();
    }

    assert_eq!(h.status(task.id).await, TaskStatus::Completed);
    assert_eq!(h.store.saved_statuses(task.id).await, saves);
    assert_eq!(h.work.performed(), vec![task.id]);
}

#[tokio::test]
async fn scenario_c_reprocess_requeues_only_pending() {
    let h = harness(ScriptedWork::new());
    let pending = h.create("pending", Priority::Low).await;
    let active = h.create("active", Priority::Low).await;
    let done = h.create("done", Priority::Low).await;
    h.service.update_status(active.id, TaskStatus::Active).await.unwrap();
    h.service.update_status(done.id, TaskStatus::Completed).await.unwrap();
    while h.scheduler.queue().drain_one().is_some() {}

    let queued = h.service.reprocess_pending().await.unwrap();

    assert_eq!(queued, 1);
    let snapshot: Vec<TaskId> = h.scheduler.queue().snapshot().iter().map(|e| e.task_id).collect();
    assert_eq!(snapshot, vec![pending.id]);
    assert_eq!(h.status(active.id).await, TaskStatus::Active);
    assert_eq!(h.status(done.id).await, TaskStatus::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_during_a_drain_are_not_lost() {
    let h = Arc::new(harness(ScriptedWork::new().with_delay(Duration::from_millis(2))));
    for i in 0..3 {
        h.create(&format!("seed-{i}"), Priority::Medium).await;
    }

    let drain = tokio::spawn({
        let h = Arc::clone(&h);
        async move { h.scheduler.run_cycle().await }
    });
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..10 {
                    let priority = if i % 2 == 0 { Priority::High } else { Priority::Low };
                    let task = h
                        .service
                        .create_task(NewTask::new(format!("p{p}-{i}"), priority))
                        .await
                        .unwrap();
                    ids.push(task.id);
                }
                ids
            })
        })
        .collect();

    let mut submitted = Vec::new();
    for producer in producers {
        submitted.extend(producer.await.unwrap());
    }
    drain.await.unwrap().unwrap();
    // anything that arrived after the first drain emptied the queue
    h.scheduler.run_cycle().await.unwrap();

    assert_eq!(submitted.len(), 40);
    for id in submitted {
        assert_eq!(h.status(id).await, TaskStatus::Completed);
        assert!(h.store.saved_statuses(id).await.contains(&TaskStatus::Active));
    }
}

#[tokio::test]
async fn cancellation_mid_work_leaves_task_active_and_others_untouched() {
    let h = harness(ScriptedWork::new());
    h.work.hang_on("stuck");
    let stuck = h.create("stuck", Priority::High).await;
    let other = h.create("other", Priority::Low).await;

    let drain = tokio::spawn({
        let scheduler = Arc::clone(&h.scheduler);
        async move { scheduler.run_cycle().await }
    });
    while h.status(stuck.id).await != TaskStatus::Active {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    h.scheduler.cancellation_token().cancel();

    let report = drain.await.unwrap().unwrap();

    assert_eq!(report.interrupted, Some(stuck.id));
    assert!(report.outcomes.is_empty());
    assert_eq!(h.status(stuck.id).await, TaskStatus::Active);
    assert_eq!(h.status(other.id).await, TaskStatus::Pending);
    assert!(h.scheduler.queue().contains(other.id));
}
