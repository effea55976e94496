//! Timed event waiter
//!
//! Blocks on a signal channel until an observation arrives or the deadline
//! passes. There is no polling loop: the wait is a single bounded receive.

use crate::signal::{Observation, Received, SignalReceiver};
use std::thread;
use std::time::{Duration, Instant};

/// How a wait resolved
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    /// The signal arrived before the deadline
    Observed {
        signal: T,
        /// `observed_at - start`
        elapsed: Duration,
    },
    /// Nothing arrived before `start + timeout`
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            WaitOutcome::Observed { elapsed, .. } => Some(*elapsed),
            WaitOutcome::TimedOut => None,
        }
    }

    pub fn signal(&self) -> Option<&T> {
        match self {
            WaitOutcome::Observed { signal, .. } => Some(signal),
            WaitOutcome::TimedOut => None,
        }
    }
}

/// Wait for the next observation on `receiver`
///
/// The deadline is `start + timeout`. A producer that hangs up does not end
/// the wait early: the call still returns `TimedOut` only once the deadline
/// has passed.
pub fn wait_for<T: Observation>(
    receiver: &SignalReceiver<T>,
    start: Instant,
    timeout: Duration,
) -> WaitOutcome<T> {
    wait_until(receiver, start, timeout, |_| true)
}

/// Wait for the next observation on `receiver` that `accept` agrees with
///
/// Only observations stamped within `[start, start + timeout]` count. Earlier
/// ones belong to a previous case, later ones missed the deadline, and both
/// are skipped along with anything `accept` rejects.
pub fn wait_until<T, P>(
    receiver: &SignalReceiver<T>,
    start: Instant,
    timeout: Duration,
    mut accept: P,
) -> WaitOutcome<T>
where
    T: Observation,
    P: FnMut(&T) -> bool,
{
    let deadline = start + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());

        match receiver.recv_timeout(remaining) {
            Received::Value(signal) => {
                let observed_at = signal.observed_at();
                if observed_at < start {
                    log::debug!(
                        "Discarding observation from {:.2} ms before the start",
                        (start - observed_at).as_secs_f64() * 1000.0
                    );
                    continue;
                }
                if observed_at > deadline {
                    log::debug!("Discarding observation stamped after the deadline");
                    continue;
                }
                if !accept(&signal) {
                    continue;
                }

                let elapsed = observed_at - start;
                return WaitOutcome::Observed { signal, elapsed };
            }
            Received::Timeout => return WaitOutcome::TimedOut,
            Received::Disconnected => {
                log::warn!("Signal producer disconnected while waiting");
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                return WaitOutcome::TimedOut;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::signal_channel;

    #[derive(Debug, PartialEq)]
    struct Mark(Instant);

    impl Observation for Mark {
        fn observed_at(&self) -> Instant {
            self.0
        }
    }

    #[test]
    fn test_observed_elapsed_uses_arrival_time() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start + Duration::from_millis(80)));

        let outcome = wait_for(&rx, start, Duration::from_millis(500));
        assert_eq!(outcome.elapsed(), Some(Duration::from_millis(80)));
    }

    #[test]
    fn test_times_out_without_observation() {
        let (_tx, rx) = signal_channel::<Mark>();
        let start = Instant::now();

        let outcome = wait_for(&rx, start, Duration::from_millis(30));
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_disconnected_producer_waits_out_deadline() {
        let (tx, rx) = signal_channel::<Mark>();
        drop(tx);
        let start = Instant::now();

        let outcome = wait_for(&rx, start, Duration::from_millis(30));
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_observation_before_start_is_skipped() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start - Duration::from_millis(300)));
        tx.observe(Mark(start + Duration::from_millis(40)));

        let outcome = wait_for(&rx, start, Duration::from_millis(500));
        assert_eq!(outcome.elapsed(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_only_stale_observation_times_out() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start - Duration::from_millis(1)));

        let outcome = wait_for(&rx, start, Duration::from_millis(30));
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_observation_after_deadline_times_out() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start + Duration::from_millis(31)));

        let outcome = wait_for(&rx, start, Duration::from_millis(30));
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[test]
    fn test_observation_at_deadline_counts() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start + Duration::from_millis(30)));

        let outcome = wait_for(&rx, start, Duration::from_millis(30));
        assert_eq!(outcome.elapsed(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn test_rejected_observation_keeps_waiting() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();
        tx.observe(Mark(start + Duration::from_millis(10)));
        tx.observe(Mark(start + Duration::from_millis(20)));

        let outcome = wait_until(&rx, start, Duration::from_millis(500), |mark| {
            mark.0 >= start + Duration::from_millis(15)
        });
        assert_eq!(outcome.elapsed(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_wakes_on_late_observation() {
        let (tx, rx) = signal_channel();
        let start = Instant::now();

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.observe(Mark(Instant::now()));
        });

        let outcome = wait_for(&rx, start, Duration::from_secs(2));
        producer.join().unwrap();

        let elapsed = outcome.elapsed().expect("observation expected");
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed < Duration::from_secs(2));
    }
}
