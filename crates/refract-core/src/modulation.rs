//! Cancellable periodic modulation tasks.
//!
//! Some stages sweep a parameter on a timer instead of per sample: the 8D
//! pan position, the wah center frequency, chorus delay time. Each such sweep
//! is a [`ModulationTask`] registered with the [`TaskScheduler`], which the
//! render loop advances once per block.
//!
//! Spawning returns a [`TaskHandle`]. The handle is owned by the stage that
//! spawned the task; dropping or cancelling it stops the task, and the
//! scheduler prunes it on its next advance. A graph rebuild therefore cannot
//! leak timers as long as it drops the old stages.
//!
//! ```rust
//! use refract_core::{SharedParam, TaskScheduler};
//!
//! let mut scheduler = TaskScheduler::new(0.01);
//! let depth = SharedParam::new(0.0);
//! let writer = depth.clone();
//! let handle = scheduler.spawn(move |dt: f32| writer.set(writer.get() + dt));
//!
//! scheduler.advance(0.02);
//! assert!(depth.get() > 0.0);
//!
//! drop(handle);
//! scheduler.advance(0.02);
//! assert_eq!(scheduler.live_tasks(), 0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Periodic callback that updates shared parameters.
///
/// `tick` receives the time in seconds since the task last ran.
pub trait ModulationTask: Send {
    /// Runs one update.
    fn tick(&mut self, elapsed_secs: f32);
}

impl<F> ModulationTask for F
where
    F: FnMut(f32) + Send,
{
    fn tick(&mut self, elapsed_secs: f32) {
        self(elapsed_secs);
    }
}

/// Identifier of a spawned task, unique per scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Returns the raw numeric identifier.
    pub fn index(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

/// Ownership token for a spawned task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    /// Returns the task's identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Stops the task. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ScheduledTask {
    id: TaskId,
    period: f32,
    pending: f32,
    cancelled: Arc<AtomicBool>,
    task: Box<dyn ModulationTask>,
}

impl ScheduledTask {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Runs modulation tasks on a fixed period, driven by rendered time.
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
    default_period: f32,
    next_id: u64,
}

impl TaskScheduler {
    /// Creates a scheduler whose [`spawn`](Self::spawn) uses
    /// `default_period_secs` (floored at 1 ms).
    pub fn new(default_period_secs: f32) -> Self {
        Self {
            tasks: Vec::new(),
            default_period: default_period_secs.max(0.001),
            next_id: 0,
        }
    }

    /// Returns the period used by [`spawn`](Self::spawn).
    pub fn default_period(&self) -> f32 {
        self.default_period
    }

    /// Spawns a task on the default period.
    pub fn spawn(&mut self, task: impl ModulationTask + 'static) -> TaskHandle {
        self.spawn_every(self.default_period, task)
    }

    /// Spawns a task that runs every `period_secs`.
    pub fn spawn_every(
        &mut self,
        period_secs: f32,
        task: impl ModulationTask + 'static,
    ) -> TaskHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.push(ScheduledTask {
            id,
            period: period_secs.max(0.001),
            pending: 0.0,
            cancelled: Arc::clone(&cancelled),
            task: Box::new(task),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!("task_spawn: {id} every {period_secs:.3}s");
        TaskHandle { id, cancelled }
    }

    /// Advances rendered time by `dt_secs`, running every due task once and
    /// dropping cancelled ones. Returns the number of tasks that ran.
    pub fn advance(&mut self, dt_secs: f32) -> usize {
        self.prune();
        let mut ran = 0;
        for scheduled in &mut self.tasks {
            scheduled.pending += dt_secs;
            if scheduled.pending >= scheduled.period {
                scheduled.task.tick(scheduled.pending);
                scheduled.pending = 0.0;
                ran += 1;
            }
        }
        ran
    }

    /// Drops every cancelled task.
    pub fn prune(&mut self) {
        self.tasks.retain(|t| {
            let keep = !t.is_cancelled();
            #[cfg(feature = "tracing")]
            if !keep {
                tracing::debug!("task_prune: {}", t.id);
            }
            keep
        });
    }

    /// Number of tasks that are scheduled and not cancelled.
    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_cancelled()).count()
    }

    /// Identifiers of the live tasks, in spawn order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks
            .iter()
            .filter(|t| !t.is_cancelled())
            .map(|t| t.id)
    }

    /// Cancels every task, including ones whose handles are still held.
    pub fn cancel_all(&mut self) {
        for task in &self.tasks {
            task.cancelled.store(true, Ordering::Release);
        }
        self.tasks.clear();
    }
}

impl core::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("live_tasks", &self.live_tasks())
            .field("default_period", &self.default_period)
            .finish_non_exhaustive()
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(0.01)
    }
}
