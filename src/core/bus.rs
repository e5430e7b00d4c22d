//! "Configuration changed" signal: explicit subscriptions with deterministic detach.

use std::sync::{Arc, Mutex, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Broadcasts that configuration was changed elsewhere. Cheap to clone; clones share listeners.
#[derive(Clone, Default)]
pub struct ConfigBus {
    inner: Arc<Mutex<BusInner>>,
}

impl ConfigBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned handle is detached or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Notify every current listener. Listeners run outside the lock.
    pub fn publish(&self) {
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        log::debug!("config changed: notifying {} listener(s)", listeners.len());
        for listener in listeners {
            listener();
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }
}

/// Handle for one registered listener.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    fn remove(&self) {
        if let Some(bus) = self.bus.upgrade() {
            let mut inner = bus.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(bus: &ConfigBus) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = bus.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    #[test]
    fn publish_reaches_all_listeners() {
        let bus = ConfigBus::new();
        let (a, _sa) = counter(&bus);
        let (b, _sb) = counter(&bus);
        bus.publish();
        bus.clone().publish();
        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn detach_stops_delivery() {
        let bus = ConfigBus::new();
        let (hits, sub) = counter(&bus);
        assert_eq!(bus.listener_count(), 1);
        drop(sub);
        assert_eq!(bus.listener_count(), 0);
        bus.publish();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_detaches_only_its_own_listener() {
        let bus = ConfigBus::new();
        let (kept, _keep) = counter(&bus);
        {
            let (_dropped, _sub) = counter(&bus);
            assert_eq!(bus.listener_count(), 2);
        }
        assert_eq!(bus.listener_count(), 1);
        bus.publish();
        assert_eq!(kept.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = ConfigBus::new();
        let (_hits, sub) = counter(&bus);
        drop(bus);
        drop(sub);
    }
}
