//! Fixed-size thread pool used for batch pose insertion.
//!
//! Jobs are pulled from one shared queue in submission order. Each submitted
//! job gets its own single-slot result channel, so a caller can block on one
//! result without waiting for the rest of the batch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{NeemError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers. A size of zero is treated as one.
    pub fn new(size: usize) -> Result<Self> {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = std::thread::Builder::new()
                .name(format!("neem-worker-{i}"))
                .spawn(move || worker_loop(&receiver))?;
            workers.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue `f` and return the channel its result will arrive on.
    ///
    /// If the job panics the channel is closed without a value.
    pub fn submit<T, F>(&self, f: F) -> Result<Receiver<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let job: Job = Box::new(move || {
            // The caller may have stopped listening; that is fine.
            let _ = tx.send(f());
        });
        self.sender
            .as_ref()
            .ok_or_else(|| NeemError::Io(std::io::Error::other("worker pool is shut down")))?
            .send(job)
            .map_err(|_| NeemError::Io(std::io::Error::other("worker pool is shut down")))?;
        Ok(rx)
    }

    /// Submit one job per item, in order. The returned receivers line up with
    /// `items`.
    pub fn map<I, T, F>(&self, items: Vec<I>, f: F) -> Result<Vec<Receiver<T>>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> T + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        items
            .into_iter()
            .map(|item| {
                let f = Arc::clone(&f);
                self.submit(move || f(item))
            })
            .collect()
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        // Hold the lock only while dequeuing.
        let next = {
            let rx = receiver.lock().unwrap_or_else(|e| e.into_inner());
            rx.recv()
        };
        let Ok(job) = next else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("worker pool job panicked");
        }
    }
}

impl Drop for WorkerPool {
    /// Lets queued jobs drain, then joins every worker.
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn zero_size_becomes_one() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn map_results_line_up_with_inputs() {
        let pool = WorkerPool::new(3).unwrap();
        let rxs = pool.map((0..10).collect(), |n: u32| n * n).unwrap();
        let out: Vec<u32> = rxs.into_iter().map(|rx| rx.recv().unwrap()).collect();
        assert_eq!(out, (0..10).map(|n| n * n).collect::<Vec<_>>());
    }

    #[test]
    fn drop_waits_for_queued_jobs() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2).unwrap();
            for _ in 0..6 {
                let done = Arc::clone(&done);
                let _ = pool
                    .submit(move || {
                        std::thread::sleep(Duration::from_millis(5));
                        done.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }
        }
        assert_eq!(done.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn panicking_job_does_not_kill_the_pool() {
        let pool = WorkerPool::new(1).unwrap();
        let rx = pool.submit(|| -> u8 { panic!("boom") }).unwrap();
        assert!(rx.recv().is_err());
        let rx = pool.submit(|| 7u8).unwrap();
        assert_eq!(rx.recv().unwrap(), 7);
    }
}
