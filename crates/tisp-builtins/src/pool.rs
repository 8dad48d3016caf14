//! Fixed set of worker threads that force thunks in the background.
//!
//! Workers take jobs from one shared queue. A queued thunk is still pending,
//! so whoever needs its value before a worker gets to it evaluates it on the
//! spot and the worker later finds it forced.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::thread;

use tisp_core::Thunk;

type Job = Box<dyn FnOnce() + Send>;

/// Stack of each worker; background forcing nests as deeply as an output does.
const WORKER_STACK_SIZE: usize = 256 << 20;

const MIN_WORKERS: usize = 4;

static POOL: LazyLock<Pool> = LazyLock::new(|| {
    let workers = thread::available_parallelism().map_or(MIN_WORKERS, |n| n.get());
    Pool::new(workers.max(MIN_WORKERS))
});

pub(crate) struct Pool {
    sender: Sender<Job>,
    workers: usize,
}

impl Pool {
    pub(crate) fn new(count: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = 0;
        for id in 0..count.max(1) {
            let receiver = Arc::clone(&receiver);
            let spawned = thread::Builder::new()
                .name(format!("tisp-pool-{id}"))
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || worker_loop(&receiver));
            match spawned {
                Ok(_) => workers += 1,
                Err(e) => log::warn!("failed to spawn pool worker {id}: {e}"),
            }
        }
        log::debug!("started {workers} pool workers");
        Self { sender, workers }
    }

    /// Queues `job`, running it inline when the pool has no workers.
    pub(crate) fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.workers == 0 {
            return job();
        }
        if let Err(mpsc::SendError(job)) = self.sender.send(Box::new(job)) {
            job();
        }
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let job = receiver.lock().unwrap_or_else(PoisonError::into_inner).recv();
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

/// Forces `t` on the shared pool.
pub(crate) fn force(t: Thunk) {
    force_then(t, || {});
}

/// Forces `t` on the shared pool and then calls `done`.
pub(crate) fn force_then<F>(t: Thunk, done: F)
where
    F: FnOnce() + Send + 'static,
{
    POOL.execute(move || {
        t.force();
        done();
    });
}
