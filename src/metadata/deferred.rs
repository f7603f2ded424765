//! Lazily populated, cached metadata collections.
//!
//! A [`DeferredNamedList`] issues one Discover request the first time any of
//! its read methods is called, runs every row through its handler, and caches
//! the result for the life of the collection.
//!
//! # States
//!
//! ```text
//!            first read              handler success
//!   Empty ──────────────► Populating ────────────────► Populated
//!     ▲                       │
//!     └───────────────────────┘
//!        error / cancelled (partial rows discarded)
//! ```
//!
//! Readers of a populated list load it from an `ArcSwapOption` without
//! locking. The state mutex is only held for the Empty → Populating and
//! Populating → Populated/Empty transitions, never across an await. Readers
//! arriving while another task populates wait on a `watch` channel whose
//! sender is dropped when population ends either way.
//!
//! A handler that reads the collection it is populating would wait on itself
//! forever. Each task tracks the collections it is currently populating in a
//! task-local stack, and such a read fails with
//! [`XmlaError::ReentrantPopulation`] instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::context::Context;
use super::handler::Handler;
use super::named_list::{Named, NamedList};
use crate::client::XmlaClient;
use crate::error::{XmlaError, XmlaResult};
use crate::xmla::request::{MetadataRequest, Restrictions};

tokio::task_local! {
    static POPULATING: Vec<u64>;
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

enum State<T> {
    Empty,
    Populating(watch::Receiver<()>),
    Populated(Arc<NamedList<T>>),
}

enum Next<'a, T: Send + Sync + 'static> {
    Wait(watch::Receiver<()>),
    Populate(Population<'a, T>),
}

/// Ordered, name-indexed collection filled from one Discover request on first use.
pub struct DeferredNamedList<T: Send + Sync + 'static> {
    id: u64,
    client: Arc<XmlaClient>,
    request: MetadataRequest,
    context: Context,
    restrictions: Restrictions,
    handler: Box<dyn Handler<T>>,
    populated: ArcSwapOption<NamedList<T>>,
    state: Mutex<State<T>>,
}

impl<T: Named + Send + Sync + 'static> DeferredNamedList<T> {
    pub fn new(
        client: Arc<XmlaClient>,
        request: MetadataRequest,
        context: Context,
        restrictions: Restrictions,
        handler: impl Handler<T> + 'static,
    ) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            client,
            request,
            context,
            restrictions,
            handler: Box::new(handler),
            populated: ArcSwapOption::empty(),
            state: Mutex::new(State::Empty),
        }
    }

    /// The populated list, issuing the Discover request if needed.
    pub async fn items(&self) -> XmlaResult<Arc<NamedList<T>>> {
        loop {
            if let Some(list) = self.populated.load_full() {
                return Ok(list);
            }

            let next = {
                let mut state = self.state.lock();
                let waiting = match &*state {
                    State::Populated(list) => return Ok(list.clone()),
                    State::Populating(rx) => {
                        if self.populating_in_this_task() {
                            return Err(XmlaError::ReentrantPopulation(self.to_string()));
                        }
                        Some(rx.clone())
                    }
                    State::Empty => None,
                };
                match waiting {
                    Some(rx) => Next::Wait(rx),
                    None => {
                        let (tx, rx) = watch::channel(());
                        *state = State::Populating(rx);
                        Next::Populate(Population {
                            owner: self,
                            _done: tx,
                            finished: false,
                        })
                    }
                }
            };

            match next {
                Next::Wait(mut rx) => {
                    // Only ever resolves by the sender being dropped.
                    let _ = rx.changed().await;
                }
                Next::Populate(population) => {
                    let mut stack = POPULATING.try_with(Clone::clone).unwrap_or_default();
                    stack.push(self.id);

                    let list = Arc::new(POPULATING.scope(stack, self.populate()).await?);
                    population.finish(list.clone());
                    return Ok(list);
                }
            }
        }
    }

    pub async fn len(&self) -> XmlaResult<usize> {
        Ok(self.items().await?.len())
    }

    pub async fn is_empty(&self) -> XmlaResult<bool> {
        Ok(self.items().await?.is_empty())
    }

    /// Look up by unique name or name.
    pub async fn get(&self, name: &str) -> XmlaResult<Option<Arc<T>>> {
        Ok(self.items().await?.get(name).cloned())
    }

    /// Item at `index` in row order.
    pub async fn get_index(&self, index: usize) -> XmlaResult<Option<Arc<T>>> {
        Ok(self.items().await?.get_index(index).cloned())
    }

    /// Short names in row order.
    pub async fn names(&self) -> XmlaResult<Vec<String>> {
        let items = self.items().await?;
        Ok(items.names().into_iter().map(str::to_string).collect())
    }

    /// Whether population has completed. Never triggers population.
    pub fn is_populated(&self) -> bool {
        self.populated.load().is_some()
    }

    pub fn request(&self) -> MetadataRequest {
        self.request
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    fn populating_in_this_task(&self) -> bool {
        POPULATING
            .try_with(|stack| stack.contains(&self.id))
            .unwrap_or(false)
    }

    async fn populate(&self) -> XmlaResult<NamedList<T>> {
        let rows = self
            .client
            .discover(self.request, self.context.catalog(), &self.restrictions)
            .await?;

        let mut list = NamedList::new();
        for row in &rows {
            let Some(item) = self.handler.handle(row, &self.context, &list).await? else {
                continue;
            };
            let name = item.unique_name().to_string();
            if !list.insert(item) {
                return Err(XmlaError::DuplicateName {
                    collection: self.to_string(),
                    name,
                });
            }
        }

        tracing::debug!(collection = %self, rows = rows.len(), items = list.len(), "Populated");
        Ok(list)
    }
}

impl<T: Send + Sync + 'static> fmt::Display for DeferredNamedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request)?;
        let scope: Vec<&str> = self.restrictions.iter().map(|(_, v)| v).collect();
        if !scope.is_empty() {
            write!(f, "[{}]", scope.join("/"))?;
        }
        Ok(())
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for DeferredNamedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredNamedList")
            .field("request", &self.request)
            .field("restrictions", &self.restrictions)
            .field("populated", &self.populated.load().is_some())
            .finish_non_exhaustive()
    }
}

/// Ownership of an in-flight population.
///
/// Dropping it without [`finish`](Self::finish) (error or cancellation)
/// returns the collection to `Empty`. Either way the channel sender drops
/// last, waking every waiter.
struct Population<'a, T: Send + Sync + 'static> {
    owner: &'a DeferredNamedList<T>,
    _done: watch::Sender<()>,
    finished: bool,
}

impl<T: Send + Sync + 'static> Population<'_, T> {
    fn finish(mut self, list: Arc<NamedList<T>>) {
        *self.owner.state.lock() = State::Populated(list.clone());
        self.owner.populated.store(Some(list));
        self.finished = true;
    }
}

impl<T: Send + Sync + 'static> Drop for Population<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(collection = %self.owner, "Population abandoned");
            *self.owner.state.lock() = State::Empty;
        }
    }
}
