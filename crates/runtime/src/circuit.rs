//! Circuit - structured supervision of wiring tasks.
//!
//! Every processor combinator registers one task on a [`Circuit`]. Running
//! the circuit drives all wirings together: the first wiring to fail aborts
//! the rest and surfaces its error, which is how a failure inside one
//! processor terminates the whole composite stream. Dropping a circuit
//! aborts every wiring.

use tokio::task::JoinSet;

use crate::error::{Error, Result};

/// The complete set of channel wirings behind one port tree.
pub struct Circuit {
    tasks: JoinSet<Result<()>>,
}

impl Circuit {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Registers a wiring task.
    ///
    /// Combinators call this; application code normally does not.
    pub fn wire<F>(&mut self, label: &'static str, task: F)
    where
        F: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        tracing::debug!(label, "registering wiring");
        self.tasks.spawn(async move {
            let result = task.await;
            if let Err(error) = &result {
                tracing::debug!(label, %error, "wiring terminated with error");
            }
            result
        });
    }

    /// Number of registered wirings.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drives all wirings to completion.
    ///
    /// Returns `Ok(())` once every wiring has finished (all source sockets
    /// closed), or the first wiring error after aborting the remaining
    /// wirings.
    pub async fn run(mut self) -> Result<()> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    self.tasks.abort_all();
                    return Err(error);
                }
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    self.tasks.abort_all();
                    return Err(Error::Wiring(join_error.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Circuit")
            .field("wirings", &self.tasks.len())
            .finish()
    }
}
