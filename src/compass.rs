//! # Compass Orientation Tracking
//!
//! Turns a stream of device heading readings into the rotation needed to point a
//! compass needle at the Qibla.
//!
//! ## States
//! - **NoHeading**: nothing received yet; the rotation is the raw Qibla bearing,
//!   i.e. the device is assumed to face north
//! - **HeadingKnown**: rotation is `(bearing − heading + 360) % 360`
//!
//! Once a heading is known the tracker never returns to `NoHeading`; if the sensor
//! goes quiet the last reading is held.
//!
//! ## Heading Feed
//! Sensor readings are pushed into a [`HeadingFeed`], a single latest-value slot
//! backed by a `tokio::sync::watch` channel. Readers only ever see the most recent
//! reading; intermediate readings published while a reader is busy are dropped.
//! A feed started without permission never carries a reading.

use crate::qibla::normalize_degrees;
use tokio::sync::watch;
use tracing::debug;

/// Whether the tracker has received a heading yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeadingState {
    NoHeading,
    HeadingKnown(f64),
}

/// Display rotation for a compass needle aimed at a fixed bearing.
#[derive(Clone, Debug)]
pub struct OrientationTracker {
    target_bearing: f64,
    state: HeadingState,
}

impl OrientationTracker {
    pub fn new(target_bearing: f64) -> Self {
        Self {
            target_bearing: normalize_degrees(target_bearing),
            state: HeadingState::NoHeading,
        }
    }

    pub fn target_bearing(&self) -> f64 {
        self.target_bearing
    }

    pub fn state(&self) -> HeadingState {
        self.state
    }

    pub fn heading(&self) -> Option<f64> {
        match self.state {
            HeadingState::NoHeading => None,
            HeadingState::HeadingKnown(h) => Some(h),
        }
    }

    /// Record a heading in degrees from north. Non-finite values are ignored.
    pub fn apply(&mut self, heading: f64) {
        if !heading.is_finite() {
            debug!(heading, "ignoring non-finite heading");
            return;
        }
        self.state = HeadingState::HeadingKnown(normalize_degrees(heading));
    }

    /// Rotation in `[0, 360)` to apply to the needle graphic.
    pub fn rotation(&self) -> f64 {
        match self.state {
            HeadingState::NoHeading => self.target_bearing,
            HeadingState::HeadingKnown(h) => normalize_degrees(self.target_bearing - h + 360.0),
        }
    }

    /// Apply every reading from `subscription` until its feed stops, calling
    /// `on_update` after each one. The last heading is kept afterwards.
    pub async fn follow<F>(&mut self, subscription: &mut HeadingSubscription, mut on_update: F)
    where
        F: FnMut(&OrientationTracker),
    {
        if let Some(heading) = subscription.take_latest() {
            self.apply(heading);
            on_update(self);
        }
        while let Some(heading) = subscription.next().await {
            self.apply(heading);
            on_update(self);
        }
    }
}

/// A raw orientation event as reported by a device sensor.
///
/// Platforms with a true compass report `compass_heading` directly (clockwise
/// from north). Others only report `alpha`, the rotation around the z axis,
/// which runs counter-clockwise, so the heading is `360 − alpha`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationReading {
    pub compass_heading: Option<f64>,
    pub alpha: Option<f64>,
    /// Whether `alpha` is relative to the Earth's frame rather than the start pose
    pub absolute: bool,
}

impl OrientationReading {
    pub fn from_compass(heading: f64) -> Self {
        Self {
            compass_heading: Some(heading),
            ..Self::default()
        }
    }

    pub fn from_alpha(alpha: f64, absolute: bool) -> Self {
        Self {
            alpha: Some(alpha),
            absolute,
            ..Self::default()
        }
    }

    /// Heading in degrees clockwise from north, if the event carries one.
    pub fn heading(&self) -> Option<f64> {
        if let Some(h) = self.compass_heading.filter(|h| h.is_finite()) {
            return Some(normalize_degrees(h));
        }
        self.alpha
            .filter(|a| a.is_finite())
            .map(|a| normalize_degrees(360.0 - a))
    }
}

/// Outcome of asking the platform for sensor access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The platform does not gate orientation events
    NotRequired,
}

/// Latest-value slot for heading readings.
pub struct HeadingFeed {
    tx: Option<watch::Sender<Option<f64>>>,
}

impl HeadingFeed {
    /// Start a feed. A denied permission yields a feed that is already stopped.
    pub fn start(permission: Permission) -> Self {
        match permission {
            Permission::Denied => {
                debug!("orientation permission denied, heading feed not started");
                Self { tx: None }
            }
            Permission::Granted | Permission::NotRequired => {
                let (tx, _rx) = watch::channel(None);
                Self { tx: Some(tx) }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.tx.is_some()
    }

    /// Publish a sensor event. Returns false when the feed is stopped or the
    /// event carries no heading.
    pub fn publish(&self, reading: OrientationReading) -> bool {
        match reading.heading() {
            Some(heading) => self.publish_heading(heading),
            None => false,
        }
    }

    /// Overwrite the slot with `heading`.
    pub fn publish_heading(&self, heading: f64) -> bool {
        match &self.tx {
            Some(tx) if heading.is_finite() => {
                tx.send_replace(Some(heading));
                true
            }
            _ => false,
        }
    }

    pub fn subscribe(&self) -> HeadingSubscription {
        HeadingSubscription {
            rx: self.tx.as_ref().map(|tx| tx.subscribe()),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.as_ref().map_or(0, |tx| tx.receiver_count())
    }

    /// Stop the feed; every subscription's `next()` then returns `None`.
    pub fn stop(&mut self) {
        self.tx = None;
    }
}

/// A reader attached to a [`HeadingFeed`]. Dropping it releases the listener.
pub struct HeadingSubscription {
    rx: Option<watch::Receiver<Option<f64>>>,
}

impl HeadingSubscription {
    /// The most recent heading, without waiting.
    pub fn latest(&self) -> Option<f64> {
        self.rx.as_ref().and_then(|rx| *rx.borrow())
    }

    /// The most recent heading, marking it seen so `next()` waits for a newer one.
    pub fn take_latest(&mut self) -> Option<f64> {
        self.rx.as_mut().and_then(|rx| *rx.borrow_and_update())
    }

    /// Wait for a heading newer than the last one seen. `None` once the feed
    /// or this subscription is stopped.
    pub async fn next(&mut self) -> Option<f64> {
        let rx = self.rx.as_mut()?;
        loop {
            rx.changed().await.ok()?;
            if let Some(heading) = *rx.borrow_and_update() {
                return Some(heading);
            }
        }
    }

    /// Detach from the feed.
    pub fn stop(&mut self) {
        self.rx = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_heading_uses_bearing() {
        let tracker = OrientationTracker::new(118.0);
        assert_eq!(tracker.state(), HeadingState::NoHeading);
        assert_eq!(tracker.rotation(), 118.0);
    }

    #[test]
    fn heading_rotates_needle() {
        let mut tracker = OrientationTracker::new(118.0);
        tracker.apply(30.0);
        assert_eq!(tracker.state(), HeadingState::HeadingKnown(30.0));
        assert_eq!(tracker.rotation(), 88.0);

        tracker.apply(200.0);
        assert_eq!(tracker.rotation(), 278.0);
    }

    #[test]
    fn nan_heading_does_not_reset_state() {
        let mut tracker = OrientationTracker::new(118.0);
        tracker.apply(f64::NAN);
        assert_eq!(tracker.state(), HeadingState::NoHeading);

        tracker.apply(30.0);
        tracker.apply(f64::INFINITY);
        assert_eq!(tracker.rotation(), 88.0);
    }

    #[test]
    fn reading_prefers_compass_heading() {
        let reading = OrientationReading {
            compass_heading: Some(45.0),
            alpha: Some(10.0),
            absolute: true,
        };
        assert_eq!(reading.heading(), Some(45.0));
        assert_eq!(OrientationReading::from_alpha(90.0, true).heading(), Some(270.0));
        assert_eq!(OrientationReading::from_alpha(0.0, false).heading(), Some(0.0));
        assert_eq!(OrientationReading::default().heading(), None);
    }

    #[test]
    fn denied_feed_never_publishes() {
        let feed = HeadingFeed::start(Permission::Denied);
        assert!(!feed.is_running());
        assert!(!feed.publish_heading(30.0));
        assert_eq!(feed.subscribe().latest(), None);
    }

    #[test]
    fn dropping_subscription_releases_listener() {
        let feed = HeadingFeed::start(Permission::NotRequired);
        let sub = feed.subscribe();
        let mut other = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);
        drop(sub);
        assert_eq!(feed.subscriber_count(), 1);
        other.stop();
        assert!(!other.is_active());
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn latest_reading_wins() {
        let feed = HeadingFeed::start(Permission::Granted);
        let mut sub = feed.subscribe();
        feed.publish_heading(10.0);
        feed.publish_heading(20.0);
        feed.publish(OrientationReading::from_compass(30.0));

        assert_eq!(sub.next().await, Some(30.0));
        assert_eq!(sub.latest(), Some(30.0));
    }

    #[tokio::test]
    async fn stopped_feed_ends_subscription() {
        let mut feed = HeadingFeed::start(Permission::Granted);
        let mut sub = feed.subscribe();
        feed.stop();
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn follow_holds_last_heading_after_feed_ends() {
        let mut feed = HeadingFeed::start(Permission::Granted);
        let mut sub = feed.subscribe();
        let mut tracker = OrientationTracker::new(118.0);

        let publisher = tokio::spawn(async move {
            feed.publish_heading(30.0);
            tokio::task::yield_now().await;
            feed.stop();
        });

        let mut updates = Vec::new();
        tracker
            .follow(&mut sub, |t| updates.push(t.rotation()))
            .await;
        publisher.await.unwrap();

        assert_eq!(tracker.heading(), Some(30.0));
        assert_eq!(tracker.rotation(), 88.0);
        assert_eq!(updates, vec![88.0]);
    }

    #[tokio::test]
    async fn pending_reading_is_applied_once() {
        let mut feed = HeadingFeed::start(Permission::Granted);
        let mut sub = feed.subscribe();
        feed.publish_heading(30.0);
        feed.stop();

        let mut tracker = OrientationTracker::new(118.0);
        let mut calls = 0;
        tracker.follow(&mut sub, |_| calls += 1).await;

        assert_eq!(calls, 1);
        assert_eq!(tracker.heading(), Some(30.0));
    }

    #[test]
    fn take_latest_marks_reading_seen() {
        let feed = HeadingFeed::start(Permission::Granted);
        let mut sub = feed.subscribe();
        feed.publish_heading(45.0);

        assert_eq!(sub.take_latest(), Some(45.0));
        assert_eq!(sub.latest(), Some(45.0));
        assert!(!sub.rx.as_ref().unwrap().has_changed().unwrap());
    }
}
