//! Asynchronous value resolution, independent of serialization.

use entigraph_model::{Entity, PropertyDescriptor, Value};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::trace;

/// A pending resolved value.
pub type BoxValueFuture = Pin<Box<dyn Future<Output = Value> + Send + 'static>>;

/// A resolver's answer: either available now or still on its way.
pub enum Resolution {
    Ready(Value),
    Pending(BoxValueFuture),
}

impl Resolution {
    pub fn ready(value: impl Into<Value>) -> Self {
        Self::Ready(value.into())
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Waits for the value.
    pub async fn into_value(self) -> Value {
        match self {
            Self::Ready(value) => value,
            Self::Pending(future) => future.await,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Resolves a property value against outside context.
///
/// Return `None` to pass. Any `Some` answers the query, including
/// `Some(Resolution::Ready(Value::Null))`, `false`, `0` and the empty string.
pub trait ValueResolver: Send + Sync {
    fn resolve(&self, entity: &Arc<Entity>, property: &PropertyDescriptor, value: &Value) -> Option<Resolution>;
}

impl<F> ValueResolver for F
where
    F: Fn(&Arc<Entity>, &PropertyDescriptor, &Value) -> Option<Resolution> + Send + Sync,
{
    fn resolve(&self, entity: &Arc<Entity>, property: &PropertyDescriptor, value: &Value) -> Option<Resolution> {
        self(entity, property, value)
    }
}

/// Resolvers in registration order; the first answer wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn ValueResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resolver: Arc<dyn ValueResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn resolve(&self, entity: &Arc<Entity>, property: &PropertyDescriptor, value: &Value) -> Option<Resolution> {
        let resolution = self
            .resolvers
            .iter()
            .enumerate()
            .find_map(|(index, resolver)| resolver.resolve(entity, property, value).map(|r| (index, r)));

        match resolution {
            Some((index, resolution)) => {
                trace!(property = %property.name(), resolver = index, pending = resolution.is_pending(), "Value resolved");
                Some(resolution)
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
