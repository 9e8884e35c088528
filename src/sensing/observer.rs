use tokio::sync::mpsc;

use crate::snapshot::Snapshot;

/// Receives pushes from the detection loop.
pub trait AffectObserver: Send + Sync {
    fn on_update(&self, snapshot: &Snapshot);

    fn on_face_change(&self, detected: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub enum AffectEvent {
    Update(Snapshot),
    FaceChange(bool),
}

/// Forwards every push onto an unbounded channel.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<AffectEvent>,
}

impl ChannelObserver {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AffectEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AffectObserver for ChannelObserver {
    fn on_update(&self, snapshot: &Snapshot) {
        // receiver gone means nobody is listening anymore
        let _ = self.tx.send(AffectEvent::Update(snapshot.clone()));
    }

    fn on_face_change(&self, detected: bool) {
        let _ = self.tx.send(AffectEvent::FaceChange(detected));
    }
}

pub struct NoopObserver;

impl AffectObserver for NoopObserver {
    fn on_update(&self, _snapshot: &Snapshot) {}

    fn on_face_change(&self, _detected: bool) {}
}
