//! Runs the outputs of a loaded program.
//!
//! Every output is forced as an effect on its own scoped thread, at most
//! `max_concurrent_outputs` at a time. An expanded output is a list walked
//! lazily on a thread of its own, each element becoming an output as soon
//! as it is reached. After the first failure no new outputs are started;
//! those already running are allowed to finish.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Scope};

use tisp_core::{Thunk, Value};
use tisp_ir::Output;

pub const MAX_CONCURRENT_OUTPUTS: usize = 256;

/// Stack reserved for each output thread. Non-tail recursion nests one force
/// per level, so this bounds the recursion depth of a program.
pub const DEFAULT_STACK_SIZE: usize = 512 << 20;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub max_concurrent_outputs: usize,
    /// Stack size of output threads in bytes.
    pub stack_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_concurrent_outputs: MAX_CONCURRENT_OUTPUTS, stack_size: DEFAULT_STACK_SIZE }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The first output that evaluated to an error.
    #[error("{0}")]
    Output(tisp_core::Error),
    #[error("failed to spawn an output thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub fn run(outputs: Vec<Output>, config: &RunConfig) -> Result<(), RunError> {
    let driver = Driver {
        permits: Permits::new(config.max_concurrent_outputs.max(1)),
        failure: Mutex::new(None),
        stack_size: config.stack_size,
    };
    let driver = &driver;

    thread::scope(|s| {
        for output in outputs {
            if driver.failed() {
                break;
            }
            let spawned = if output.expanded {
                driver.spawn(s, "tisp-outputs", move || driver.walk(s, output.thunk))
            } else {
                let permit = driver.permits.acquire();
                driver.spawn(s, "tisp-output", move || {
                    driver.run_output(&output.thunk);
                    drop(permit);
                })
            };
            if let Err(e) = spawned {
                driver.fail(e);
            }
        }
    });

    let failure = lock(&driver.failure).take();
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Driver {
    permits: Permits,
    failure: Mutex<Option<RunError>>,
    stack_size: usize,
}

impl Driver {
    fn spawn<'scope, 'env, F>(
        &self,
        s: &'scope Scope<'scope, 'env>,
        name: &str,
        f: F,
    ) -> Result<(), RunError>
    where
        F: FnOnce() + Send + 'scope,
    {
        thread::Builder::new()
            .name(name.to_string())
            .stack_size(self.stack_size)
            .spawn_scoped(s, f)?;
        Ok(())
    }

    fn walk<'scope, 'env>(&'scope self, s: &'scope Scope<'scope, 'env>, list: Thunk) {
        let list = match list.force_list() {
            Ok(l) => l,
            Err(e) => return self.fail(RunError::Output(e)),
        };
        for element in list.iter() {
            if self.failed() {
                return;
            }
            let element = match element {
                Ok(t) => t,
                Err(e) => return self.fail(RunError::Output(e)),
            };
            let permit = self.permits.acquire();
            let spawned = self.spawn(s, "tisp-output", move || {
                self.run_output(&element);
                drop(permit);
            });
            if let Err(e) = spawned {
                return self.fail(e);
            }
        }
    }

    fn run_output(&self, t: &Thunk) {
        log::debug!("output started");
        match t.force_effect() {
            Value::Error(e) => {
                log::debug!("output failed: {e}");
                self.fail(RunError::Output(e));
            }
            _ => log::debug!("output finished"),
        }
    }

    fn fail(&self, e: RunError) {
        let mut failure = lock(&self.failure);
        if failure.is_none() {
            *failure = Some(e);
        }
    }

    fn failed(&self) -> bool {
        lock(&self.failure).is_some()
    }
}

/// Counting semaphore for output threads.
struct Permits {
    available: Mutex<usize>,
    released: Condvar,
}

struct Permit<'a>(&'a Permits);

impl Permits {
    fn new(n: usize) -> Self {
        Self { available: Mutex::new(n), released: Condvar::new() }
    }

    fn acquire(&self) -> Permit<'_> {
        let mut available = lock(&self.available);
        while *available == 0 {
            available = self.released.wait(available).unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        Permit(self)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        *lock(&self.0.available) += 1;
        self.0.released.notify_one();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
