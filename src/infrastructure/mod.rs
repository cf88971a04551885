// Infrastructure module - Timers and background task plumbing
pub mod heartbeat;
pub mod task_manager;
pub mod timer;

pub use heartbeat::LivenessMonitor;
pub use task_manager::TaskManager;
pub use timer::Backoff;
