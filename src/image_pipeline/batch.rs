//! Batch conversion module
//!
//! Many files converted in parallel by a fixed pool of worker threads fed
//! from one shared queue. Files are independent; their completion order is
//! unspecified.

mod coordinator;
mod discovery;
mod queue;
mod report;
mod work_item;
mod worker_pool;

pub use coordinator::Coordinator;
pub use discovery::{discover_files, has_marker};
pub use queue::{QueueClosed, WorkQueue};
pub use report::{BatchReport, FileFailure};
pub use work_item::WorkItem;
pub use worker_pool::{WorkHandler, WorkerPool};
