use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

type BoxedHandler = Box<dyn FnMut(&dyn Event) + Send>;

/// Store-wide event bus
///
/// Handlers run synchronously on the publishing thread, after the store has
/// released its state lock, so they may read the store. They must not publish.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<BoxedHandler>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Events published by the store
pub mod events {
    use super::Event;
    use crate::selection::SelectionSource;
    use crate::state::DatasetVersion;

    /// A new record array replaced the previous one
    #[derive(Debug, Clone)]
    pub struct DataUploaded {
        pub version: DatasetVersion,
        pub record_count: usize,
    }

    /// State went back to its initial value
    #[derive(Debug, Clone)]
    pub struct DataReset;

    /// The shared selection was replaced
    #[derive(Debug, Clone)]
    pub struct SelectionChanged {
        pub source: SelectionSource,
        pub selected_count: usize,
    }

    /// The active error message was set or cleared
    #[derive(Debug, Clone)]
    pub struct ErrorChanged {
        pub message: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct LoadingChanged {
        pub is_loading: bool,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DataUploaded,
        DataReset,
        SelectionChanged,
        ErrorChanged,
        LoadingChanged
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of type `E`
    pub fn subscribe<E, F>(&self, mut handler: F)
    where
        E: Event,
        F: FnMut(&E) + Send + 'static,
    {
        let boxed: BoxedHandler = Box::new(move |event: &dyn Event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                handler(event);
            }
        });

        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_insert_with(Vec::new)
            .push(boxed);
    }

    pub fn publish<E: Event>(&self, event: E) {
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&TypeId::of::<E>()) {
            for handler in event_handlers.iter_mut() {
                handler(&event);
            }
        }
    }

    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
