// Timing bus - Publish/subscribe fan-out of transport messages
//
// Every subscriber owns a bounded lock-free queue. Publishing never blocks on a
// slow subscriber: when its queue is full the message is dropped for that
// subscriber only, and the next tick catches up.

use crate::sequencer::transport::TransportEvent;
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Receiving end handed to a subscriber
pub type TransportConsumer = HeapCons<TransportEvent>;

struct BusInner {
    subscribers: Mutex<Vec<HeapProd<TransportEvent>>>,
    capacity: usize,
    dropped: AtomicU64,
}

/// Shared timing bus
///
/// Cheap to clone; clones publish to the same subscribers. Pass it to whatever
/// produces clock ticks and to whatever needs to subscribe.
#[derive(Clone)]
pub struct TimingBus {
    inner: Arc<BusInner>,
}

impl TimingBus {
    /// Create a bus whose subscriber queues hold `capacity` messages each
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
                capacity: capacity.max(1),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Register a new subscriber; it receives messages published from now on
    pub fn subscribe(&self) -> TransportConsumer {
        let (producer, consumer) = HeapRb::<TransportEvent>::new(self.inner.capacity).split();
        match self.inner.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(producer),
            Err(poisoned) => poisoned.into_inner().push(producer),
        }
        consumer
    }

    /// Publish to every subscriber, returns how many queues accepted it
    pub fn publish(&self, event: TransportEvent) -> usize {
        let mut subscribers = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut delivered = 0;
        for producer in subscribers.iter_mut() {
            if producer.try_push(event).is_ok() {
                delivered += 1;
            } else {
                let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped % 1000 == 0 {
                    log::warn!("Timing bus subscriber queue full, {} messages dropped so far", dropped);
                }
            }
        }
        delivered
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        match self.inner.subscribers.lock() {
            Ok(subscribers) => subscribers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Messages dropped because a subscriber queue was full
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Capacity of each subscriber queue
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::timing::TimingUpdate;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_every_subscriber_receives() {
        let bus = TimingBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.publish(TransportEvent::Started), 2);
        assert_eq!(a.try_pop(), Some(TransportEvent::Started));
        assert_eq!(b.try_pop(), Some(TransportEvent::Started));
        assert_eq!(a.try_pop(), None);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_messages() {
        let bus = TimingBus::new(16);
        bus.publish(TransportEvent::Started);
        let mut late = bus.subscribe();
        assert_eq!(late.try_pop(), None);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let bus = TimingBus::new(2);
        let mut slow = bus.subscribe();
        let mut fast = bus.subscribe();

        for t in 0..2 {
            bus.publish(TransportEvent::Tick(TimingUpdate::at_tick(t, 24, 120.0)));
            fast.try_pop();
        }
        let delivered = bus.publish(TransportEvent::Tick(TimingUpdate::at_tick(2, 24, 120.0)));

        assert_eq!(delivered, 1);
        assert_eq!(bus.dropped_count(), 1);
        assert!(fast.try_pop().is_some());

        // The slow subscriber still has the first two ticks in order
        match slow.try_pop() {
            Some(TransportEvent::Tick(update)) => assert_eq!(update.tick, 0),
            other => panic!("Expected tick 0, got {:?}", other),
        }
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = TimingBus::new(4);
        let publisher = bus.clone();
        let mut consumer = bus.subscribe();

        publisher.publish(TransportEvent::Stopped);
        assert_eq!(consumer.try_pop(), Some(TransportEvent::Stopped));
        assert_eq!(publisher.subscriber_count(), 1);
    }
}
