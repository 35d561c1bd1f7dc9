//! Queue poll loop: receive, display, delete, with the countdown filling
//! the gaps between polls.

use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use super::countdown_loop::run_countdown_window;
use super::session::MessageSession;
use super::{AppConfig, Logger};
use crate::{
    display::{screen::Screen, TextDisplay},
    lights::LightEffect,
    payload::extract_display_text,
    queue::{MessageQueue, QueueError},
    stats::{self, Stats},
};

const NETWORK_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Why the poll loop handed control back. The orchestrator pattern-matches
/// on this instead of unwinding through errors.
#[derive(Debug, PartialEq, Eq)]
pub enum PollerExit {
    /// Startup reachability probe failed; nothing was polled.
    Offline,
    /// The queue failed in a way a bounded backoff cannot ride out.
    QueueFailed(String),
    /// Ctrl-c while polling or displaying.
    Shutdown,
}

pub(super) struct Poller<'a, D: TextDisplay, Q: MessageQueue> {
    pub screen: &'a mut Screen<D>,
    pub queue: &'a mut Q,
    pub lights: &'a mut LightEffect,
    pub stats: &'a mut Stats,
    pub config: &'a AppConfig,
    pub logger: &'a Logger,
    pub tick: Duration,
    pub probe_network: fn(Duration) -> bool,
}

impl<D: TextDisplay, Q: MessageQueue> Poller<'_, D, Q> {
    pub(super) fn run(&mut self, running: &Arc<AtomicBool>) -> PollerExit {
        // Unreachable network terminates the poller; no retries here.
        if !(self.probe_network)(NETWORK_PROBE_TIMEOUT) {
            self.logger
                .warn("network appears to be offline; skipping queue poller");
            return PollerExit::Offline;
        }

        loop {
            if !running.load(Ordering::SeqCst) {
                return PollerExit::Shutdown;
            }

            self.stats.api_call_count += 1;
            match self.queue.receive_one() {
                Ok(messages) if messages.is_empty() => {
                    run_countdown_window(
                        self.screen,
                        &self.config.header,
                        self.config.window_secs,
                        self.tick,
                        running,
                    );
                }
                Ok(messages) => {
                    self.stats.messages_picked_count += messages.len() as u64;
                    for message in messages {
                        self.handle_message(&message, running);
                    }
                    self.persist_stats();
                }
                Err(QueueError::Transient(detail)) => {
                    self.logger
                        .warn(format!("queue receive error: {detail}; backing off"));
                    for _ in 0..self.config.backoff_secs {
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        thread::sleep(self.tick);
                    }
                }
                Err(QueueError::Fatal(detail)) => {
                    self.logger
                        .error(format!("queue poller stopping: {detail}"));
                    self.lights.stop(self.logger);
                    return PollerExit::QueueFailed(detail);
                }
            }
        }
    }

    fn handle_message(&mut self, message: &crate::queue::QueueMessage, running: &Arc<AtomicBool>) {
        let text = extract_display_text(&message.body);
        self.logger.info(format!("displaying message: {text}"));

        let mut session = MessageSession {
            screen: &mut *self.screen,
            lights: &mut *self.lights,
            header: &self.config.header,
            logger: self.logger,
            tick: self.tick,
        };
        session.show(&text, self.config.hold_secs, running);

        if let Err(err) = stats::append_message_log(Path::new(&self.config.messages_file), &text) {
            self.logger
                .warn(format!("failed to append message log: {err}"));
        }

        if let Some(receipt) = message.receipt_handle.as_deref() {
            self.stats.api_call_count += 1;
            if let Err(err) = self.queue.delete(receipt) {
                // Not retried; the visibility timeout will re-expose it.
                self.logger.warn(format!("failed to delete message: {err}"));
            }
        }
    }

    fn persist_stats(&self) {
        self.logger.info(format!(
            "SQS API calls: {}, messages picked: {}",
            self.stats.api_call_count, self.stats.messages_picked_count
        ));
        if let Err(err) = self.stats.save(Path::new(&self.config.stats_file)) {
            self.logger.warn(format!("failed to save stats: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LogLevel;
    use crate::display::screen::FakeDisplay;
    use crate::queue::QueueMessage;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    type Step = std::result::Result<Vec<QueueMessage>, QueueError>;

    struct FakeQueue {
        script: VecDeque<Step>,
        receives: usize,
        deletes: Vec<String>,
        fail_deletes: bool,
    }

    impl FakeQueue {
        fn with_script(script: Vec<Step>) -> Self {
            Self {
                script: script.into_iter().collect(),
                receives: 0,
                deletes: Vec::new(),
                fail_deletes: false,
            }
        }
    }

    impl MessageQueue for FakeQueue {
        fn receive_one(&mut self) -> Step {
            self.receives += 1;
            self.script
                .pop_front()
                .unwrap_or_else(|| Err(QueueError::Fatal("script exhausted".into())))
        }

        fn delete(&mut self, receipt_handle: &str) -> std::result::Result<(), QueueError> {
            self.deletes.push(receipt_handle.to_string());
            if self.fail_deletes {
                Err(QueueError::Transient("delete denied".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        screen: Screen<FakeDisplay>,
        lights: LightEffect,
        stats: Stats,
        config: AppConfig,
        logger: Logger,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.window_secs = 3;
        config.hold_secs = 2;
        config.backoff_secs = 2;
        config.stats_file = dir.path().join("stats.json").display().to_string();
        config.messages_file = dir.path().join("messages").display().to_string();
        Fixture {
            screen: Screen::new(FakeDisplay::new()),
            lights: LightEffect::new(PathBuf::from("/nonexistent/effect")),
            stats: Stats::default(),
            config,
            logger: Logger::new(LogLevel::Error, None),
            _dir: dir,
        }
    }

    fn run(fx: &mut Fixture, queue: &mut FakeQueue, online: bool) -> PollerExit {
        let mut poller = Poller {
            screen: &mut fx.screen,
            queue,
            lights: &mut fx.lights,
            stats: &mut fx.stats,
            config: &fx.config,
            logger: &fx.logger,
            tick: Duration::ZERO,
            probe_network: if online { |_| true } else { |_| false },
        };
        let running = Arc::new(AtomicBool::new(true));
        poller.run(&running)
    }

    fn message(body: &str, receipt: Option<&str>) -> QueueMessage {
        QueueMessage {
            body: body.to_string(),
            receipt_handle: receipt.map(String::from),
        }
    }

    #[test]
    fn offline_terminates_before_any_poll() {
        let mut fx = fixture();
        let mut queue = FakeQueue::with_script(vec![]);
        let exit = run(&mut fx, &mut queue, false);
        assert_eq!(exit, PollerExit::Offline);
        assert_eq!(queue.receives, 0);
        assert_eq!(fx.stats.api_call_count, 0);
    }

    #[test]
    fn empty_poll_runs_countdown_window_then_polls_again() {
        let mut fx = fixture();
        let mut queue = FakeQueue::with_script(vec![Ok(vec![])]);
        let exit = run(&mut fx, &mut queue, true);
        assert_eq!(exit, PollerExit::QueueFailed("script exhausted".into()));
        // One real empty poll, then the exhausted one.
        assert_eq!(queue.receives, 2);
        assert_eq!(fx.stats.api_call_count, 2);
        // The countdown window ran once: header drawn once.
        assert_eq!(fx.screen.device().writes_to_row(0).len(), 1);
    }

    #[test]
    fn message_is_displayed_logged_deleted_and_counted() {
        let mut fx = fixture();
        let body = r#"{"Message":"{\"message\":\"HELLO\"}"}"#;
        let mut queue = FakeQueue::with_script(vec![Ok(vec![message(body, Some("r-1"))])]);
        let exit = run(&mut fx, &mut queue, true);
        assert_eq!(exit, PollerExit::QueueFailed("script exhausted".into()));

        // Extracted text hit row 0, padded to the full width.
        let device = fx.screen.device();
        assert!(device
            .writes
            .iter()
            .any(|(row, text)| *row == 0 && text.starts_with("HELLO")));
        // Header restored after the hold.
        let last_row0 = device.writes_to_row(0).last().cloned().unwrap();
        assert!(last_row0.starts_with(&fx.config.header));

        assert_eq!(queue.deletes, vec!["r-1".to_string()]);
        // receive + delete + exhausted receive.
        assert_eq!(fx.stats.api_call_count, 3);
        assert_eq!(fx.stats.messages_picked_count, 1);

        // Counters persisted after the batch (before the exhausted poll).
        let persisted = Stats::load(Path::new(&fx.config.stats_file)).unwrap();
        assert_eq!(persisted.api_call_count, 2);
        assert_eq!(persisted.messages_picked_count, 1);

        // Journal line carries the extracted text.
        let journal = std::fs::read_to_string(&fx.config.messages_file).unwrap();
        assert!(journal.trim_end().ends_with(" - HELLO"));
    }

    #[test]
    fn plain_text_body_is_displayed_verbatim() {
        let mut fx = fixture();
        let mut queue =
            FakeQueue::with_script(vec![Ok(vec![message("merry christmas", Some("r-2"))])]);
        run(&mut fx, &mut queue, true);
        assert!(fx
            .screen
            .device()
            .writes
            .iter()
            .any(|(row, text)| *row == 0 && text.starts_with("merry christmas")));
    }

    #[test]
    fn delete_failure_does_not_stop_processing() {
        let mut fx = fixture();
        let mut queue = FakeQueue::with_script(vec![
            Ok(vec![message("first", Some("r-1"))]),
            Ok(vec![message("second", Some("r-2"))]),
        ]);
        queue.fail_deletes = true;
        let exit = run(&mut fx, &mut queue, true);
        assert_eq!(exit, PollerExit::QueueFailed("script exhausted".into()));
        // Both deletes attempted, neither retried.
        assert_eq!(queue.deletes, vec!["r-1".to_string(), "r-2".to_string()]);
        assert_eq!(fx.stats.messages_picked_count, 2);
    }

    #[test]
    fn message_without_receipt_skips_delete() {
        let mut fx = fixture();
        let mut queue = FakeQueue::with_script(vec![Ok(vec![message("loose", None)])]);
        run(&mut fx, &mut queue, true);
        assert!(queue.deletes.is_empty());
        // receive + exhausted receive only; no delete call counted.
        assert_eq!(fx.stats.api_call_count, 2);
    }

    #[test]
    fn transient_error_backs_off_and_resumes() {
        let mut fx = fixture();
        let mut queue = FakeQueue::with_script(vec![
            Err(QueueError::Transient("throttled".into())),
            Ok(vec![]),
        ]);
        let exit = run(&mut fx, &mut queue, true);
        assert_eq!(exit, PollerExit::QueueFailed("script exhausted".into()));
        assert_eq!(queue.receives, 3);
    }

    #[test]
    fn counters_accumulate_across_persisted_batches() {
        let mut fx = fixture();
        fx.stats = Stats {
            api_call_count: 10,
            messages_picked_count: 4,
        };
        let mut queue = FakeQueue::with_script(vec![Ok(vec![message("hi", Some("r-9"))])]);
        run(&mut fx, &mut queue, true);
        let persisted = Stats::load(Path::new(&fx.config.stats_file)).unwrap();
        assert_eq!(persisted.api_call_count, 12);
        assert_eq!(persisted.messages_picked_count, 5);
    }
}
