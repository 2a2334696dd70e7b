//! Deadline-bounded execution of one operation on a dedicated worker thread.

mod bounded_task;
mod cancel;

pub use bounded_task::{
    BoundedTask, run_named_with_timeout, run_with_timeout, run_with_timeout_secs, spawn_bounded,
};
pub use cancel::CancelToken;

pub(crate) use bounded_task::timeout_from_secs;
