//! Producer bridging the OS window thread with the engine's external dispatcher.
//!
//! The window (and its native event loop) is owned by another part of the
//! program. It pushes [`WindowEvent`]s through a [`WindowEventSender`]; the
//! [`WindowProducer`] drains them into a dispatcher when fed.
//!
//! When fed with `can_block == true` the producer waits at most
//! `wait_timeout` for the first event, the equivalent of a bounded "wait for
//! OS events". Otherwise it only takes what is already there.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use log::{trace, warn};

use crate::dispatcher::EventDispatcher;
use crate::events::WindowEvent;
use crate::producers::Producer;

/// Sending half handed to the window owner.
pub type WindowEventSender = Sender<WindowEvent>;

pub struct WindowProducer {
    rx: Receiver<WindowEvent>,
    wait_timeout: Duration,
    disconnected: bool,
}

impl WindowProducer {
    /// Create the producer and the sender the window thread writes into.
    pub fn new(wait_timeout: Duration) -> (Self, WindowEventSender) {
        let (tx, rx) = unbounded::<WindowEvent>();
        (Self::from_receiver(rx, wait_timeout), tx)
    }

    /// Wrap an existing receiver.
    pub fn from_receiver(rx: Receiver<WindowEvent>, wait_timeout: Duration) -> Self {
        WindowProducer {
            rx,
            wait_timeout,
            disconnected: false,
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// `true` once every sender was dropped and the channel ran dry.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn mark_disconnected(&mut self) {
        if !self.disconnected {
            warn!("Window event channel disconnected; no more window input");
            self.disconnected = true;
        }
    }
}

impl Producer for WindowProducer {
    fn feed(&mut self, dispatcher: &mut EventDispatcher, can_block: bool) -> usize {
        let mut fed = 0;

        if can_block && !self.disconnected {
            match self.rx.recv_timeout(self.wait_timeout) {
                Ok(event) => {
                    dispatcher.queue_last(event);
                    fed += 1;
                }
                Err(RecvTimeoutError::Timeout) => return 0,
                Err(RecvTimeoutError::Disconnected) => {
                    self.mark_disconnected();
                    return 0;
                }
            }
        }

        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    dispatcher.queue_last(event);
                    fed += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.mark_disconnected();
                    break;
                }
            }
        }

        if fed > 0 {
            trace!("Window producer fed {} events", fed);
        }
        fed
    }
}
