//! Transaction - the scoped store a document compiles against.
//!
//! Holds variables (with snapshot/restore discipline for template scopes),
//! host-provided functions, and data-source providers together with their
//! memoised results and errors. Data-source fetches run on spawned threads
//! and are awaited through crossbeam channels so a whole plan level can be
//! fetched concurrently, each source under its own timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver};
use rustc_hash::FxHashMap;

use oxc_util::Value;

use crate::error::{now_millis, DataSourceError, EvalError};

/// Default per-source fetch timeout in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// A host-provided callable reachable from expressions.
pub type HostFunction = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// A data-source provider. Providers take no arguments; a provider that
/// needs the transaction captures what it needs when registered through
/// [`Transaction::add_data_source_with`].
pub type DataProvider = Arc<dyn Fn() -> Result<Value, DataSourceError> + Send + Sync>;

/// Scoped variable store, function table, and data-source cache.
///
/// # Example
///
/// ```
/// use oxc_eval::Transaction;
/// use oxc_util::Value;
///
/// let mut txn = Transaction::new();
/// txn.set_variable("x", Value::Number(1.0));
/// txn.snapshot();
/// txn.set_variable("x", Value::Number(2.0));
/// txn.restore();
/// assert_eq!(txn.variable("x"), Some(&Value::Number(1.0)));
/// ```
#[derive(Clone)]
pub struct Transaction {
    /// Current variable bindings.
    variables: FxHashMap<String, Value>,

    /// Snapshot stack for lexical scoping.
    snapshots: Vec<FxHashMap<String, Value>>,

    /// Host function table.
    functions: FxHashMap<String, HostFunction>,

    /// Registered data-source providers.
    providers: FxHashMap<String, DataProvider>,

    /// Memoised successful fetches, by source name.
    results: FxHashMap<String, Value>,

    /// Memoised failed fetches, by source name.
    errors: FxHashMap<String, DataSourceError>,

    /// Per-source fetch timeout.
    timeout: Duration,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Create an empty transaction with the default fetch timeout.
    pub fn new() -> Self {
        Self {
            variables: FxHashMap::default(),
            snapshots: Vec::new(),
            functions: FxHashMap::default(),
            providers: FxHashMap::default(),
            results: FxHashMap::default(),
            errors: FxHashMap::default(),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    /// Set the per-source fetch timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// The per-source fetch timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // =========================================================================
    // VARIABLES
    // =========================================================================

    /// Bind a variable in the current scope.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Look up a variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Remove a variable binding.
    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    /// Push a snapshot of the current bindings.
    ///
    /// Template scopes (`<foreach>`, `<while>`, `<on-data>`) snapshot
    /// before their body and restore on every exit path.
    pub fn snapshot(&mut self) {
        self.snapshots.push(self.variables.clone());
    }

    /// Restore the most recent snapshot. A restore without a matching
    /// snapshot is a no-op.
    pub fn restore(&mut self) {
        if let Some(saved) = self.snapshots.pop() {
            self.variables = saved;
        }
    }

    /// Current snapshot depth.
    pub fn scope_depth(&self) -> usize {
        self.snapshots.len()
    }

    // =========================================================================
    // FUNCTIONS
    // =========================================================================

    /// Register a host function.
    pub fn add_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Look up a host function.
    pub fn function(&self, name: &str) -> Option<&HostFunction> {
        self.functions.get(name)
    }

    // =========================================================================
    // DATA SOURCES
    // =========================================================================

    /// Register a data-source provider.
    pub fn add_data_source<F>(&mut self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<Value, DataSourceError> + Send + Sync + 'static,
    {
        self.providers.insert(name.into(), Arc::new(provider));
    }

    /// Register a data source through a factory that receives the
    /// transaction. The factory is called once, at registration time, to
    /// obtain the actual provider.
    pub fn add_data_source_with<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: FnOnce(&Transaction) -> DataProvider,
    {
        let provider = factory(self);
        self.providers.insert(name.into(), provider);
    }

    /// Whether a provider is registered under this name.
    pub fn has_data_source(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// All registered source names, sorted.
    pub fn data_source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Cached successful result for a source, if any.
    pub fn cached_result(&self, name: &str) -> Option<&Value> {
        self.results.get(name)
    }

    /// Cached error for a source, if any.
    pub fn cached_error(&self, name: &str) -> Option<&DataSourceError> {
        self.errors.get(name)
    }

    /// Record a failure for a source without running its provider.
    ///
    /// Used by the execution plan for sources whose lexical parent failed.
    pub fn mark_failed(&mut self, name: &str, error: DataSourceError) {
        self.errors.insert(name.to_string(), error);
    }

    /// Fetch one source, memoising the result or error.
    ///
    /// Returns the cached outcome when present; otherwise invokes the
    /// provider on a spawned thread under the configured timeout.
    pub fn fetch(&mut self, name: &str) -> Result<Value, DataSourceError> {
        if let Some(value) = self.results.get(name) {
            return Ok(value.clone());
        }
        if let Some(error) = self.errors.get(name) {
            return Err(error.clone());
        }

        let provider = match self.providers.get(name) {
            Some(provider) => Arc::clone(provider),
            None => {
                return Err(DataSourceError::Unknown {
                    source_name: name.to_string(),
                })
            }
        };

        let receiver = spawn_fetch(provider);
        let outcome = await_fetch(name, receiver, Instant::now() + self.timeout, self.timeout);
        self.memoise(name, &outcome);
        outcome
    }

    /// Fetch a set of sources concurrently.
    ///
    /// All providers are started together; each is then awaited against a
    /// shared deadline measured from the start of the batch. Results and
    /// errors are memoised per source.
    pub fn fetch_many(&mut self, names: &[String]) {
        let mut pending: Vec<(String, Receiver<Result<Value, DataSourceError>>)> = Vec::new();

        for name in names {
            if self.results.contains_key(name) || self.errors.contains_key(name) {
                continue;
            }
            match self.providers.get(name) {
                Some(provider) => {
                    pending.push((name.clone(), spawn_fetch(Arc::clone(provider))));
                }
                None => {
                    self.errors.insert(
                        name.clone(),
                        DataSourceError::Unknown {
                            source_name: name.clone(),
                        },
                    );
                }
            }
        }

        let deadline = Instant::now() + self.timeout;
        for (name, receiver) in pending {
            let outcome = await_fetch(&name, receiver, deadline, self.timeout);
            self.memoise(&name, &outcome);
        }
    }

    fn memoise(&mut self, name: &str, outcome: &Result<Value, DataSourceError>) {
        match outcome {
            Ok(value) => {
                self.results.insert(name.to_string(), value.clone());
            }
            Err(error) => {
                self.errors.insert(name.to_string(), error.clone());
            }
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("variables", &self.variables)
            .field("scope_depth", &self.snapshots.len())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("results", &self.results.keys().collect::<Vec<_>>())
            .field("errors", &self.errors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Start a provider on a detached thread; the receiver yields its outcome.
fn spawn_fetch(provider: DataProvider) -> Receiver<Result<Value, DataSourceError>> {
    let (sender, receiver) = bounded(1);
    std::thread::spawn(move || {
        let outcome = provider();
        // The receiver may be gone if the fetch timed out; nothing to do.
        let _ = sender.send(outcome);
    });
    receiver
}

/// Await a provider outcome against a deadline.
fn await_fetch(
    name: &str,
    receiver: Receiver<Result<Value, DataSourceError>>,
    deadline: Instant,
    timeout: Duration,
) -> Result<Value, DataSourceError> {
    match receiver.recv_deadline(deadline) {
        Ok(outcome) => outcome,
        Err(_) => Err(DataSourceError::Timeout {
            source_name: name.to_string(),
            timeout_ms: timeout.as_millis() as u64,
            timestamp: now_millis(),
        }),
    }
}
