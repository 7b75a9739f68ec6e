use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use glob_match::glob_match;
use tokio::sync::mpsc;

use crate::frame::Frame;

/// Size of each subscriber's message buffer. When the buffer is full further
/// messages to that subscriber are dropped rather than blocking the
/// publisher.
pub const MESSAGE_BUFFER_SIZE: usize = 100;

/// A message queued for delivery to one subscriber, covering both
/// confirmations and published payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Subscribed { channel: String, count: usize },
    Unsubscribed { channel: String, count: usize },
    PSubscribed { pattern: String, count: usize },
    PUnsubscribed { pattern: String, count: usize },
    Published { channel: String, payload: String },
    PublishedMatch {
        pattern: String,
        channel: String,
        payload: String,
    },
}

impl Message {
    /// The RESP array a subscription-mode connection writes to its socket.
    pub fn into_frame(self) -> Frame {
        match self {
            Message::Subscribed { channel, count } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"subscribe")),
                Frame::bulk(channel),
                Frame::Integer(count as i64),
            ]),
            Message::Unsubscribed { channel, count } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"unsubscribe")),
                Frame::bulk(channel),
                Frame::Integer(count as i64),
            ]),
            Message::PSubscribed { pattern, count } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"psubscribe")),
                Frame::bulk(pattern),
                Frame::Integer(count as i64),
            ]),
            Message::PUnsubscribed { pattern, count } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"punsubscribe")),
                Frame::bulk(pattern),
                Frame::Integer(count as i64),
            ]),
            Message::Published { channel, payload } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"message")),
                Frame::bulk(channel),
                Frame::bulk(payload),
            ]),
            Message::PublishedMatch {
                pattern,
                channel,
                payload,
            } => Frame::Array(vec![
                Frame::Bulk(Bytes::from_static(b"pmessage")),
                Frame::bulk(pattern),
                Frame::bulk(channel),
                Frame::bulk(payload),
            ]),
        }
    }
}

/// The receiving side of one connection's subscription queue.
///
/// The bus keeps only the sending half; once [`PubSub::remove_subscriber`]
/// runs, dropping this handle severs the subscriber completely.
pub struct Subscriber {
    pub id: u64,
    pub messages: mpsc::Receiver<Message>,
}

#[derive(Default)]
struct Registry {
    // channel -> subscriber ids, and the reverse per subscriber.
    channels: HashMap<String, HashSet<u64>>,
    sub_channels: HashMap<u64, HashSet<String>>,
    // pattern -> subscriber ids, and the reverse per subscriber.
    patterns: HashMap<String, HashSet<u64>>,
    sub_patterns: HashMap<u64, HashSet<String>>,
    senders: HashMap<u64, mpsc::Sender<Message>>,
}

impl Registry {
    fn subscription_count(&self, id: u64) -> usize {
        let channels = self.sub_channels.get(&id).map_or(0, HashSet::len);
        let patterns = self.sub_patterns.get(&id).map_or(0, HashSet::len);
        channels + patterns
    }

    /// Non-blocking offer: a full queue drops the message and reports the
    /// delivery as failed.
    fn send(&self, id: u64, message: Message) -> bool {
        match self.senders.get(&id) {
            Some(sender) => sender.try_send(message).is_ok(),
            None => false,
        }
    }
}

/// Channel and pattern subscription registry with fan-out publish.
///
/// All registry updates go through the writer lock; publishing only takes
/// the reader lock.
#[derive(Clone, Default)]
pub struct PubSub {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl PubSub {
    pub fn new() -> PubSub {
        PubSub::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap()
    }

    /// Creates a subscriber with a fresh identity and a bounded queue, and
    /// registers its sending half with the bus.
    pub fn subscriber(&self) -> Subscriber {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER_SIZE);

        self.write().senders.insert(id, tx);

        Subscriber { id, messages: rx }
    }

    /// Subscribes to each channel, enqueueing a confirmation per channel
    /// (already-subscribed channels included). Returns the subscriber's new
    /// total subscription count.
    pub fn subscribe(&self, id: u64, channels: Vec<String>) -> usize {
        let mut registry = self.write();

        for channel in channels {
            let newly = registry
                .sub_channels
                .entry(id)
                .or_default()
                .insert(channel.clone());
            if newly {
                registry
                    .channels
                    .entry(channel.clone())
                    .or_default()
                    .insert(id);
            }

            let count = registry.subscription_count(id);
            registry.send(id, Message::Subscribed { channel, count });
        }

        registry.subscription_count(id)
    }

    /// Unsubscribes from the given channels, or all of them when `channels`
    /// is empty. One confirmation is enqueued per channel; a subscriber with
    /// nothing to drop still gets a single confirmation with an empty
    /// channel name.
    pub fn unsubscribe(&self, id: u64, channels: Vec<String>) -> usize {
        let mut registry = self.write();

        let channels = if channels.is_empty() {
            let all: Vec<String> = registry
                .sub_channels
                .get(&id)
                .map(|subscribed| subscribed.iter().cloned().collect())
                .unwrap_or_default();

            if all.is_empty() {
                let count = registry.subscription_count(id);
                registry.send(
                    id,
                    Message::Unsubscribed {
                        channel: String::new(),
                        count,
                    },
                );
                return count;
            }
            all
        } else {
            channels
        };

        for channel in channels {
            if let Some(subscribers) = registry.channels.get_mut(&channel) {
                subscribers.remove(&id);
                if subscribers.is_empty() {
                    registry.channels.remove(&channel);
                }
            }
            if let Some(subscribed) = registry.sub_channels.get_mut(&id) {
                subscribed.remove(&channel);
                if subscribed.is_empty() {
                    registry.sub_channels.remove(&id);
                }
            }

            let count = registry.subscription_count(id);
            registry.send(id, Message::Unsubscribed { channel, count });
        }

        registry.subscription_count(id)
    }

    /// Pattern analogue of [`PubSub::subscribe`].
    pub fn psubscribe(&self, id: u64, patterns: Vec<String>) -> usize {
        let mut registry = self.write();

        for pattern in patterns {
            let newly = registry
                .sub_patterns
                .entry(id)
                .or_default()
                .insert(pattern.clone());
            if newly {
                registry
                    .patterns
                    .entry(pattern.clone())
                    .or_default()
                    .insert(id);
            }

            let count = registry.subscription_count(id);
            registry.send(id, Message::PSubscribed { pattern, count });
        }

        registry.subscription_count(id)
    }

    /// Pattern analogue of [`PubSub::unsubscribe`].
    pub fn punsubscribe(&self, id: u64, patterns: Vec<String>) -> usize {
        let mut registry = self.write();

        let patterns = if patterns.is_empty() {
            let all: Vec<String> = registry
                .sub_patterns
                .get(&id)
                .map(|subscribed| subscribed.iter().cloned().collect())
                .unwrap_or_default();

            if all.is_empty() {
                let count = registry.subscription_count(id);
                registry.send(
                    id,
                    Message::PUnsubscribed {
                        pattern: String::new(),
                        count,
                    },
                );
                return count;
            }
            all
        } else {
            patterns
        };

        for pattern in patterns {
            if let Some(subscribers) = registry.patterns.get_mut(&pattern) {
                subscribers.remove(&id);
                if subscribers.is_empty() {
                    registry.patterns.remove(&pattern);
                }
            }
            if let Some(subscribed) = registry.sub_patterns.get_mut(&id) {
                subscribed.remove(&pattern);
                if subscribed.is_empty() {
                    registry.sub_patterns.remove(&id);
                }
            }

            let count = registry.subscription_count(id);
            registry.send(id, Message::PUnsubscribed { pattern, count });
        }

        registry.subscription_count(id)
    }

    /// Delivers `payload` to every direct subscriber of `channel` and every
    /// subscriber whose pattern matches it. Returns how many deliveries
    /// succeeded; a subscriber whose queue is full is not counted.
    pub fn publish(&self, channel: &str, payload: &str) -> usize {
        let registry = self.read();
        let mut delivered = 0;

        if let Some(subscribers) = registry.channels.get(channel) {
            for &id in subscribers {
                let message = Message::Published {
                    channel: channel.to_string(),
                    payload: payload.to_string(),
                };
                if registry.send(id, message) {
                    delivered += 1;
                }
            }
        }

        for (pattern, subscribers) in &registry.patterns {
            if glob_match(pattern, channel) {
                for &id in subscribers {
                    let message = Message::PublishedMatch {
                        pattern: pattern.clone(),
                        channel: channel.to_string(),
                        payload: payload.to_string(),
                    };
                    if registry.send(id, message) {
                        delivered += 1;
                    }
                }
            }
        }

        delivered
    }

    /// Severs a subscriber from every index. Called by the connection when
    /// it closes; the bus never assumes ownership of subscriber lifetimes.
    pub fn remove_subscriber(&self, id: u64) {
        let mut registry = self.write();

        if let Some(channels) = registry.sub_channels.remove(&id) {
            for channel in channels {
                if let Some(subscribers) = registry.channels.get_mut(&channel) {
                    subscribers.remove(&id);
                    if subscribers.is_empty() {
                        registry.channels.remove(&channel);
                    }
                }
            }
        }

        if let Some(patterns) = registry.sub_patterns.remove(&id) {
            for pattern in patterns {
                if let Some(subscribers) = registry.patterns.get_mut(&pattern) {
                    subscribers.remove(&id);
                    if subscribers.is_empty() {
                        registry.patterns.remove(&pattern);
                    }
                }
            }
        }

        registry.senders.remove(&id);
    }

    /// Total live subscriptions (channels + patterns) for one subscriber.
    pub fn subscription_count(&self, id: u64) -> usize {
        self.read().subscription_count(id)
    }
}
