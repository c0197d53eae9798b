use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use derive_more::Debug;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use crate::ctx::Context;

/// Boxed event handler, the unit of registration.
pub(crate) type Handler = Arc<dyn Fn(Context) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

type ErrorHandler = Arc<dyn Fn(&anyhow::Error, &Context) -> bool + Send + Sync>;

/// Error-handler table, routing handler failures by their concrete type.
///
/// Each dispatcher owns one table for itself and holds a reference to a
/// second, shared one, for failures every room treats the same way. A
/// failure is claimed by downcast; every handler registered for the matching
/// type runs.
#[derive(Debug, Default)]
pub struct ErrorHandlers {
    #[debug(skip)]
    handlers: RwLock<Vec<ErrorHandler>>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for failures of type `E`.
    pub fn catch<E, F>(&self, handler: F)
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
        F: Fn(&E, &Context) + Send + Sync + 'static,
    {
        let matcher: ErrorHandler = Arc::new(move |err, ctx| match err.downcast_ref::<E>() {
            Some(e) => {
                handler(e, ctx);
                true
            }
            None => false,
        });

        self.handlers.write().unwrap().push(matcher);
    }

    fn route(&self, err: &anyhow::Error, ctx: &Context) -> bool {
        let mut claimed = false;

        for handler in self.handlers.read().unwrap().iter() {
            claimed |= handler(err, ctx);
        }

        claimed
    }
}

/// Routes decoded messages to registered handlers by their `cmd` key.
#[derive(Debug)]
pub struct Dispatcher {
    #[debug(skip)]
    channels: DashMap<String, Vec<Handler>>,
    errors: ErrorHandlers,
    shared: Arc<ErrorHandlers>,
}

impl Dispatcher {
    pub fn new(shared: Arc<ErrorHandlers>) -> Self {
        Dispatcher {
            channels: DashMap::new(),
            errors: ErrorHandlers::new(),
            shared,
        }
    }

    /// Append a handler to the ordered channel for `key`.
    pub fn register<F, Fut>(&self, key: String, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |ctx| handler(ctx).boxed());

        self.channels.entry(key).or_default().push(handler);
    }

    /// Register an instance-scoped error handler for failures of type `E`.
    pub fn catch<E, F>(&self, handler: F)
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
        F: Fn(&E, &Context) + Send + Sync + 'static,
    {
        self.errors.catch(handler);
    }

    /// Fan one message out to every handler registered for its key.
    ///
    /// Handlers run concurrently; the cycle completes when all of them have.
    /// A key nobody registered for is a no-op, most message kinds are
    /// intentionally unhandled. Failures go through the instance table
    /// first, then the shared one; failures nobody claims come back to the
    /// caller and never touch sibling handlers.
    pub async fn dispatch(&self, ctx: Context) -> Vec<anyhow::Error> {
        let handlers = match ctx.cmd().and_then(|cmd| self.channels.get(cmd)) {
            Some(entry) => entry.value().clone(),
            None => return vec![],
        };

        let results = join_all(handlers.iter().map(|handler| handler(ctx.clone()))).await;

        results
            .into_iter()
            .filter_map(|res| res.err())
            .filter(|err| !(self.errors.route(err, &ctx) || self.shared.route(err, &ctx)))
            .collect()
    }
}
