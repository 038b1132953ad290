//! Step emitter: delivers step events to subscribers at a controlled pace.
//!
//! Delivery is synchronous on the producing thread. For each step the emitter
//!
//! 1. returns [`Interrupted`] if the run is already cancelled (`emit` only;
//!    `publish` skips this for changes that are already applied),
//! 2. reads the current speed,
//! 3. calls every subscriber in subscription order,
//! 4. pauses for the speed read in step 2.
//!
//! The subscriber list is copied before step 3, so handlers may subscribe,
//! unsubscribe, change the speed, or cancel the run from inside a callback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver};
use parking_lot::RwLock;
use sv_common::{SpeedSetting, StepEvent};
use tracing::{debug, trace};

use crate::cancel::{CancelToken, Interrupted};
use crate::pacing::{Pacer, SleepPacer};

/// Handle returned by [`StepEmitter::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&StepEvent) + Send + Sync>;

/// Fan-out channel between a running strategy and its observers.
pub struct StepEmitter {
    subscribers: RwLock<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
    speed: RwLock<SpeedSetting>,
    pacer: Arc<dyn Pacer>,
}

impl StepEmitter {
    /// Emitter that sleeps between steps.
    pub fn new() -> Self {
        Self::with_pacer(Arc::new(SleepPacer))
    }

    pub fn with_pacer(pacer: Arc<dyn Pacer>) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            speed: RwLock::new(SpeedSetting::default()),
            pacer,
        }
    }

    /// Register a handler called once per delivered step, in order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StepEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(handler)));
        debug!(subscription = %id, "Step subscriber added");
        id
    }

    /// Subscribe through an unbounded channel, for consumers on another thread.
    pub fn subscribe_channel(&self) -> (SubscriptionId, Receiver<StepEvent>) {
        let (tx, rx) = channel::unbounded();
        let id = self.subscribe(move |event| {
            // A dropped receiver just stops listening.
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a subscriber. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        let removed = subscribers.len() != before;
        if removed {
            debug!(subscription = %id, "Step subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Change the pacing. Applies from the next step delivered.
    pub fn set_speed(&self, speed: SpeedSetting) {
        *self.speed.write() = speed;
        debug!(speed = %speed, "Step speed set");
    }

    pub fn speed(&self) -> SpeedSetting {
        *self.speed.read()
    }

    /// Deliver one step to every subscriber, then pause.
    ///
    /// Nothing is delivered if `cancel` is already set.
    pub fn emit(&self, event: StepEvent, cancel: &CancelToken) -> Result<(), Interrupted> {
        if cancel.is_cancelled() {
            return Err(Interrupted);
        }
        self.publish(event, cancel);
        Ok(())
    }

    /// Deliver one step without consulting `cancel`, then pause.
    ///
    /// For steps whose change is already applied to the sequence. The pause
    /// still ends early once `cancel` is set.
    pub fn publish(&self, event: StepEvent, cancel: &CancelToken) {
        let delay = self.speed().delay();
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(run = %event.run, seq = event.seq, step = %event.step, "Delivering step");
        for handler in &handlers {
            handler(&event);
        }

        self.pacer.pause(delay, cancel);
    }
}

impl Default for StepEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StepEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepEmitter")
            .field("subscribers", &self.subscriber_count())
            .field("speed", &self.speed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoopPacer;
    use parking_lot::Mutex;
    use std::time::Duration;
    use sv_common::{RunId, Step};

    fn event(seq: u64, step: Step) -> StepEvent {
        StepEvent {
            run: RunId(1),
            seq,
            step,
            values: Arc::from(vec![1, 2, 3]),
        }
    }

    fn quiet_emitter() -> StepEmitter {
        StepEmitter::with_pacer(Arc::new(NoopPacer))
    }

    /// Records the delay of every pause instead of sleeping.
    #[derive(Default)]
    struct RecordingPacer {
        delays: Mutex<Vec<Duration>>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&self, delay: Duration, _cancel: &CancelToken) {
            self.delays.lock().push(delay);
        }
    }

    #[test]
    fn delivers_in_order_to_every_subscriber() {
        let emitter = quiet_emitter();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&first), Arc::clone(&second));
        emitter.subscribe(move |e| a.lock().push(e.seq));
        emitter.subscribe(move |e| b.lock().push(e.seq));

        let token = CancelToken::new();
        for seq in 0..5 {
            emitter.emit(event(seq, Step::Compare(0, 1)), &token).unwrap();
        }

        assert_eq!(*first.lock(), vec![0, 1, 2, 3, 4]);
        assert_eq!(*second.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let emitter = quiet_emitter();
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let id = emitter.subscribe(move |_| *counter.lock() += 1);
        let token = CancelToken::new();

        emitter.emit(event(0, Step::Swap(0, 1)), &token).unwrap();
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(event(1, Step::Swap(0, 1)), &token).unwrap();

        assert_eq!(*seen.lock(), 1);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn cancelled_token_blocks_delivery() {
        let emitter = quiet_emitter();
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        emitter.subscribe(move |_| *counter.lock() += 1);

        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            emitter.emit(event(0, Step::Compare(0, 1)), &token),
            Err(Interrupted)
        );
        assert_eq!(*seen.lock(), 0);
    }

    #[test]
    fn channel_subscription_receives_clones() {
        let emitter = quiet_emitter();
        let (_, rx) = emitter.subscribe_channel();
        let token = CancelToken::new();
        emitter.emit(event(0, Step::Overwrite(2, 9)), &token).unwrap();
        emitter.emit(event(1, Step::Compare(0, 2)), &token).unwrap();

        let received: Vec<_> = rx.try_iter().map(|e| e.step).collect();
        assert_eq!(received, vec![Step::Overwrite(2, 9), Step::Compare(0, 2)]);
    }

    #[test]
    fn publish_delivers_after_cancel() {
        let pacer = Arc::new(RecordingPacer::default());
        let emitter = StepEmitter::with_pacer(pacer.clone());
        let (_, rx) = emitter.subscribe_channel();

        let token = CancelToken::new();
        token.cancel();
        emitter.publish(event(0, Step::Swap(0, 1)), &token);

        let received: Vec<_> = rx.try_iter().map(|e| e.step).collect();
        assert_eq!(received, vec![Step::Swap(0, 1)]);
        assert_eq!(pacer.delays.lock().len(), 1);
    }

    #[test]
    fn dropped_channel_receiver_is_harmless() {
        let emitter = quiet_emitter();
        let (_, rx) = emitter.subscribe_channel();
        drop(rx);
        assert!(emitter
            .emit(event(0, Step::Compare(0, 1)), &CancelToken::new())
            .is_ok());
    }

    #[test]
    fn speed_change_inside_handler_applies_to_next_step() {
        let pacer = Arc::new(RecordingPacer::default());
        let emitter = Arc::new(StepEmitter::with_pacer(pacer.clone()));
        emitter.set_speed(SpeedSetting::SLOW);

        let inner = Arc::downgrade(&emitter);
        emitter.subscribe(move |e| {
            if e.seq == 1 {
                if let Some(emitter) = inner.upgrade() {
                    emitter.set_speed(SpeedSetting::FAST);
                }
            }
        });

        let token = CancelToken::new();
        for seq in 0..4 {
            emitter.emit(event(seq, Step::Compare(0, 1)), &token).unwrap();
        }

        let slow = SpeedSetting::SLOW.delay();
        let fast = SpeedSetting::FAST.delay();
        assert_eq!(*pacer.delays.lock(), vec![slow, slow, fast, fast]);
    }

    #[test]
    fn handler_may_unsubscribe_itself() {
        let emitter = Arc::new(quiet_emitter());
        let seen = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&emitter);
        let counter = Arc::clone(&seen);
        let id_slot = Arc::clone(&own_id);
        let id = emitter.subscribe(move |_| {
            *counter.lock() += 1;
            if let (Some(emitter), Some(id)) = (weak.upgrade(), *id_slot.lock()) {
                emitter.unsubscribe(id);
            }
        });
        *own_id.lock() = Some(id);

        let token = CancelToken::new();
        emitter.emit(event(0, Step::Compare(0, 1)), &token).unwrap();
        emitter.emit(event(1, Step::Compare(0, 1)), &token).unwrap();
        assert_eq!(*seen.lock(), 1);
    }
}
