// ------------------------------------------------------------
// Shared pool handle
// ------------------------------------------------------------
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::PoolResult;
use crate::request::{Action, ExitRequest, JoinExitResult, JoinRequest, Outcome, SwapRequest, SwapResult};
use crate::state::Pool;

/// Cloneable handle that serializes every operation on one pool.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    inner: Arc<Mutex<Pool>>,
}

impl PoolHandle {
    pub fn new(pool: Pool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    pub fn swap(&self, req: &SwapRequest, now: u64) -> PoolResult<SwapResult> {
        self.inner.lock().swap(req, now)
    }

    pub fn join(&self, req: &JoinRequest) -> PoolResult<JoinExitResult> {
        self.inner.lock().join(req)
    }

    pub fn exit(&self, req: &ExitRequest) -> PoolResult<JoinExitResult> {
        self.inner.lock().exit(req)
    }

    pub fn execute(&self, action: &Action, now: u64) -> PoolResult<Outcome> {
        self.inner.lock().execute(action, now)
    }

    /// Runs a read-only closure under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Pool) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Copy of the current pool.
    pub fn snapshot(&self) -> Pool {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{btc, initialized_pool, usd, wad};
    use math::fixed::ONE;
    use std::thread;

    #[test]
    fn concurrent_swaps_conserve_balances() {
        let handle = PoolHandle::new(initialized_pool("0.75", "0.25"));
        let workers: Vec<_> = (0..4)
            .map(|n| {
                let handle = handle.clone();
                thread::spawn(move || {
                    (0..5)
                        .map(|_| {
                            let req = if n % 2 == 0 {
                                SwapRequest::given_in(usd(), btc(), wad("10"))
                            } else {
                                SwapRequest::given_in(btc(), usd(), wad("1"))
                            };
                            handle.swap(&req, 0).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut expected = [wad("1000"), wad("2000")];
        for w in workers {
            for r in w.join().unwrap() {
                let (i, j) = if r.token_in == btc() { (0, 1) } else { (1, 0) };
                expected[i] = expected[i] + r.amount_in;
                expected[j] = expected[j] - r.amount_out;
            }
        }

        let pool = handle.snapshot();
        assert_eq!(pool.balances(), expected);
        assert_eq!(handle.read(|p| p.weights()), pool.weights());
        assert_eq!(pool.weights()[0] + pool.weights()[1], ONE);
    }
}
