//! Last-write-wins debouncing on a worker thread.
//!
//! Every [`Debouncer::schedule`] restarts the quiet window. The callback only
//! sees the most recent value, once no new value arrived for a full window.

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

enum Message<T> {
    Schedule(T),
    Cancel,
}

pub struct Debouncer<T: Send + 'static> {
    window: Duration,
    sender: Option<Sender<Message<T>>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(window: Duration, callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (sender, receiver) = unbounded();
        let worker = thread::spawn(move || run(receiver, window, callback));

        Self {
            window,
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending value with `value` and restart the window.
    pub fn schedule(&self, value: T) {
        self.send(Message::Schedule(value));
    }

    /// Drop the pending value, if any.
    pub fn cancel(&self) {
        self.send(Message::Cancel);
    }

    fn send(&self, message: Message<T>) {
        if let Some(sender) = &self.sender
            && sender.send(message).is_err()
        {
            log::warn!("debounce worker exited");
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.sender.take();

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("debounce worker panicked");
        }
    }
}

fn run<T, F>(receiver: Receiver<Message<T>>, window: Duration, mut callback: F)
where
    F: FnMut(T),
{
    let mut pending: Option<T> = None;

    loop {
        let message = if pending.is_some() {
            match receiver.recv_timeout(window) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(value) = pending.take() {
                        callback(value);
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match receiver.recv() {
                Ok(message) => message,
                Err(_) => break,
            }
        };

        match message {
            Message::Schedule(value) => pending = Some(value),
            Message::Cancel => pending = None,
        }
    }

    log::debug!("debounce worker exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_burst_fires_once_with_last_value() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let debouncer = Debouncer::new(Duration::from_millis(60), move |v: u32| {
            sink.lock().unwrap().push(v);
        });

        for v in 0..10 {
            debouncer.schedule(v);
            thread::sleep(Duration::from_millis(5));
        }

        thread::sleep(Duration::from_millis(300));
        assert_eq!(*fired.lock().unwrap(), vec![9]);
    }

    #[test]
    fn test_cancel_discards_pending() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let debouncer = Debouncer::new(Duration::from_millis(60), move |v: u32| {
            sink.lock().unwrap().push(v);
        });

        debouncer.schedule(1);
        debouncer.cancel();
        thread::sleep(Duration::from_millis(250));
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drop_stops_worker() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let debouncer = Debouncer::new(Duration::from_millis(200), move |v: u32| {
            sink.lock().unwrap().push(v);
        });

        debouncer.schedule(7);
        drop(debouncer);
        assert!(fired.lock().unwrap().is_empty());
    }
}
