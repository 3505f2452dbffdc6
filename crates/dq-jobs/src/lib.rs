pub mod manager;
pub mod scheduler;
pub mod worker;

pub use manager::{cancel_job, create_job, get_job, list_for_check, JobError};
pub use scheduler::{next_run_after, spawn as spawn_scheduler, tick, SchedulerError};
pub use worker::{spawn_pool, submit_channel, JobSubmitter, WorkerPoolConfig};
