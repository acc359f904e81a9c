//! IdGenerator port - ID 生成の抽象化
//!
//! TaskStore が採番に使います。テスト容易性のために trait として抽象化しています。

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::TaskId;
use crate::ports::Clock;

/// IdGenerator は TaskId を生成
///
/// `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;
}

/// UlidGenerator は Clock の時刻ベースの ULID を生成します。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_task_id(&self) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::from(ulid)
    }
}
