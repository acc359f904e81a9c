//! Ports - 抽象化レイヤー
//!
//! 外部システム（永続ストア、時計、実処理）へのインターフェースを定義します。
//! 実装は `impls` にあります。

pub mod clock;
pub mod id_generator;
pub mod task_store;
pub mod work;

pub use self::clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::task_store::TaskStore;
pub use self::work::UnitOfWork;
