//! Impls - ports の実装（開発用・テスト用）
//!
//! - **InMemoryTaskStore**: プロセス内の TaskStore
//! - **SimulatedWork**: 固定時間スリープする UnitOfWork
//! - **ScriptedWork**: 失敗・ハングをスクリプトで指定できる UnitOfWork

pub mod inmem_store;
pub mod scripted_work;
pub mod simulated_work;

pub use self::inmem_store::InMemoryTaskStore;
pub use self::scripted_work::ScriptedWork;
pub use self::simulated_work::SimulatedWork;
