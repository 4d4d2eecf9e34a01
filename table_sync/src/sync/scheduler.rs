//! Owner of every periodic and delayed task of a table session.

use std::future::Future;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use tokio::{
    task::JoinHandle,
    time::{Duration, MissedTickBehavior, interval, sleep},
};

/// Cancellable timer handles, torn down together on session end
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `period`; the first run happens immediately.
    /// Runs never overlap: a slow run delays the next tick.
    pub fn every<F, Fut>(&self, period: Duration, mut task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.track(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task().await;
            }
        }));
    }

    /// Run `task` once after `delay`
    pub fn after<Fut>(&self, delay: Duration, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.track(tokio::spawn(async move {
            sleep(delay).await;
            task.await;
        }));
    }

    /// Run a long-lived task until shutdown
    pub fn spawn<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.track(tokio::spawn(task));
    }

    /// Abort every task. Idempotent; later registrations are aborted at once.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in tasks.drain(..) {
            handle.abort();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tasks still scheduled or running
    pub fn active_tasks(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|handle| !handle.is_finished());
        tasks.len()
    }

    fn track(&self, handle: JoinHandle<()>) {
        if self.is_shut_down() {
            handle.abort();
            return;
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(handle);
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
