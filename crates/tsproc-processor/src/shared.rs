//! Shared processor access
//!
//! A run holds the processor for its whole duration. Callers outside the run
//! loop (an editor filling a choice list, for example) use the non-blocking
//! accessors, which report [`RequestError::Busy`] instead of waiting or
//! observing a half-finished run.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tsproc_select::{SelectionResult, SelectionSpec};

use crate::error::{RequestError, RequestResult};
use crate::processor::Processor;
use crate::request::{Request, Response};

/// Processor shared between the run loop and other callers
#[derive(Clone)]
pub struct SharedProcessor {
    inner: Arc<Mutex<Processor>>,
    busy: Arc<AtomicBool>,
}

impl Default for SharedProcessor {
    fn default() -> Self {
        Self::new(Processor::new())
    }
}

impl SharedProcessor {
    /// Wrap a processor
    pub fn new(processor: Processor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(processor)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a run is in progress
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the processor for a run
    ///
    /// Blocks until any out-of-run caller releases the lock. The processor
    /// is marked busy until the returned guard is dropped.
    pub fn begin_run(&self) -> RunGuard<'_> {
        let guard = self.inner.lock();
        self.busy.store(true, Ordering::Release);
        log::debug!("processor run started");
        RunGuard {
            guard,
            busy: &self.busy,
        }
    }

    /// Handle a request unless a run is in progress
    pub fn try_request(&self, request: Request) -> RequestResult<Response> {
        if self.is_busy() {
            return Err(RequestError::Busy);
        }
        let mut processor = self.inner.try_lock().ok_or(RequestError::Busy)?;
        processor.request(request)
    }

    /// Resolve a selection unless a run is in progress
    pub fn try_resolve(&self, spec: &SelectionSpec) -> RequestResult<SelectionResult> {
        if self.is_busy() {
            return Err(RequestError::Busy);
        }
        let processor = self.inner.try_lock().ok_or(RequestError::Busy)?;
        Ok(processor.resolve(spec))
    }

    /// Run a closure with the processor unless a run is in progress
    pub fn try_with<R>(&self, f: impl FnOnce(&Processor) -> R) -> RequestResult<R> {
        if self.is_busy() {
            return Err(RequestError::Busy);
        }
        let processor = self.inner.try_lock().ok_or(RequestError::Busy)?;
        Ok(f(&processor))
    }
}

/// Exclusive access to the processor for the duration of a run
pub struct RunGuard<'a> {
    guard: MutexGuard<'a, Processor>,
    busy: &'a AtomicBool,
}

impl Deref for RunGuard<'_> {
    type Target = Processor;

    fn deref(&self) -> &Processor {
        &self.guard
    }
}

impl DerefMut for RunGuard<'_> {
    fn deref_mut(&mut self) -> &mut Processor {
        &mut self.guard
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        log::debug!("processor run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use tsproc_series::{TimeSeries, TsIdent};

    fn shared() -> SharedProcessor {
        let mut processor = Processor::new();
        processor
            .table_mut()
            .append(TimeSeries::new(TsIdent::new("A", "USGS", "Streamflow", "Day")))
            .unwrap();
        SharedProcessor::new(processor)
    }

    #[test]
    fn test_resolve_when_idle() {
        let shared = shared();
        assert!(!shared.is_busy());
        let result = shared.try_resolve(&SelectionSpec::AllEntries).unwrap();
        assert_eq!(result.indices(), &[0]);
    }

    #[test]
    fn test_busy_during_run() {
        let shared = shared();
        {
            let mut run = shared.begin_run();
            assert!(shared.is_busy());
            assert_eq!(
                shared.try_resolve(&SelectionSpec::AllEntries),
                Err(RequestError::Busy)
            );
            assert_eq!(shared.try_request(Request::TableSize), Err(RequestError::Busy));
            run.table_mut().remove(0).unwrap();
        }
        assert!(!shared.is_busy());
        assert_eq!(shared.try_with(|p| p.table().len()).unwrap(), 0);
    }

    #[test]
    fn test_busy_seen_from_other_thread() {
        let shared = shared();
        let (started_tx, started_rx) = mpsc::channel();
        let (checked_tx, checked_rx) = mpsc::channel();

        let worker = &shared;
        thread::scope(|s| {
            s.spawn(move || {
                let mut run = worker.begin_run();
                started_tx.send(()).unwrap();
                checked_rx.recv().unwrap();
                run.table_mut().remove(0).unwrap();
            });

            started_rx.recv().unwrap();
            assert!(shared.is_busy());
            assert_eq!(
                shared.try_resolve(&SelectionSpec::AllEntries),
                Err(RequestError::Busy)
            );
            assert_eq!(shared.try_request(Request::TableSize), Err(RequestError::Busy));
            checked_tx.send(()).unwrap();
        });

        assert!(!shared.is_busy());
        let result = shared.try_resolve(&SelectionSpec::AllEntries).unwrap();
        assert!(result.indices().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let shared = shared();
        let other = shared.clone();
        let _run = shared.begin_run();
        assert!(other.is_busy());
        assert_eq!(other.try_with(|p| p.table().len()), Err(RequestError::Busy));
    }
}
