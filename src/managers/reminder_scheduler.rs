use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use poise::serenity_prelude::{self as serenity, ChannelId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::messages::reminder_message;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Parse a compact duration like "1d2h30m", "45m" or "2h" into seconds.
///
/// Each unit is optional but may appear at most once, in d, h, m order,
/// and must be preceded by a number.
pub fn parse_duration(spec: &str) -> Result<u64> {
    let trimmed = spec.trim();
    let invalid = |reason: &str| BotError::InvalidDuration {
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let mut total: u64 = 0;
    let mut digits = String::new();
    // Rank of the last unit consumed (d=0, h=1, m=2)
    let mut last_unit: Option<u8> = None;

    for c in trimmed.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let (rank, unit_seconds) = match c {
            'd' => (0, SECONDS_PER_DAY),
            'h' => (1, SECONDS_PER_HOUR),
            'm' => (2, SECONDS_PER_MINUTE),
            other => return Err(invalid(&format!("unexpected character '{}'", other))),
        };

        if last_unit.is_some_and(|prev| rank <= prev) {
            return Err(invalid("units must appear at most once, in d, h, m order"));
        }
        if digits.is_empty() {
            return Err(invalid(&format!("missing number before '{}'", c)));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| invalid("number is too large"))?;
        total = value
            .checked_mul(unit_seconds)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| invalid("duration is too long"))?;

        digits.clear();
        last_unit = Some(rank);
    }

    if last_unit.is_none() {
        return Err(invalid("no unit given, use d, h or m (e.g. 1h30m)"));
    }
    if !digits.is_empty() {
        return Err(invalid("number without a unit at the end"));
    }
    if total == 0 {
        return Err(invalid("duration must be greater than zero"));
    }

    Ok(total)
}

/// A reminder waiting for its due time
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReminder {
    pub due_at: DateTime<Utc>,
    pub message: String,
    pub channel_id: ChannelId,
}

/// A reminder that became due and was removed from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub message: String,
}

/// Outcome of storing a reminder
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSet {
    pub due_at: DateTime<Utc>,
    /// The unfired reminder this one replaced, if any
    pub replaced: Option<PendingReminder>,
}

/// Where due reminders are sent
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn send(&self, channel_id: ChannelId, text: String) -> Result<()>;
}

/// Sends reminders through the Discord HTTP client
pub struct HttpReminderSink {
    http: Arc<serenity::Http>,
}

impl HttpReminderSink {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReminderSink for HttpReminderSink {
    async fn send(&self, channel_id: ChannelId, text: String) -> Result<()> {
        channel_id
            .send_message(&self.http, serenity::CreateMessage::new().content(text))
            .await?;
        Ok(())
    }
}

/// One pending reminder per user, delivered at most once
pub struct ReminderScheduler {
    /// Pending reminders (user_id -> reminder)
    pending: DashMap<UserId, PendingReminder>,

    /// Held for the duration of a delivery pass
    delivering: Mutex<()>,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            delivering: Mutex::new(()),
        }
    }

    /// Store a reminder for `user_id`, replacing any unfired one
    pub fn set_reminder(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        spec: &str,
        message: &str,
    ) -> Result<ReminderSet> {
        self.set_reminder_at(Utc::now(), user_id, channel_id, spec, message)
    }

    pub fn set_reminder_at(
        &self,
        now: DateTime<Utc>,
        user_id: UserId,
        channel_id: ChannelId,
        spec: &str,
        message: &str,
    ) -> Result<ReminderSet> {
        let seconds = parse_duration(spec)?;
        let too_far = || BotError::InvalidDuration {
            input: spec.trim().to_string(),
            reason: "due time is too far in the future".to_string(),
        };
        let offset = i64::try_from(seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(too_far)?;
        let due_at = now.checked_add_signed(offset).ok_or_else(too_far)?;

        let reminder = PendingReminder {
            due_at,
            message: message.to_string(),
            channel_id,
        };
        let replaced = self.pending.insert(user_id, reminder);
        if let Some(previous) = &replaced {
            debug!(
                "Replaced unfired reminder for user {} (was due {})",
                user_id, previous.due_at
            );
        }
        debug!("Reminder for user {} due at {}", user_id, due_at);

        Ok(ReminderSet { due_at, replaced })
    }

    /// Get the pending reminder for a user
    pub fn get(&self, user_id: UserId) -> Option<PendingReminder> {
        self.pending.get(&user_id).map(|r| r.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return every reminder due at `now`.
    ///
    /// An entry is only removed if it is still due when the remove runs, so a
    /// reminder replaced mid-scan stays in the store.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Delivery> {
        let due: Vec<UserId> = self
            .pending
            .iter()
            .filter(|entry| entry.due_at <= now)
            .map(|entry| *entry.key())
            .collect();

        due.into_iter()
            .filter_map(|user_id| {
                self.pending
                    .remove_if(&user_id, |_, reminder| reminder.due_at <= now)
            })
            .map(|(user_id, reminder)| Delivery {
                channel_id: reminder.channel_id,
                user_id,
                message: reminder.message,
            })
            .collect()
    }

    /// Run one delivery pass. Returns None when another pass is still in flight.
    pub async fn deliver_due(&self, now: DateTime<Utc>, sink: &dyn ReminderSink) -> Option<usize> {
        let Ok(_guard) = self.delivering.try_lock() else {
            debug!("Previous reminder pass still running, skipping");
            return None;
        };

        let deliveries = self.tick(now);
        let count = deliveries.len();
        if count > 0 {
            debug!(
                "Delivering {} reminders, {} still pending",
                count,
                self.pending_count()
            );
        }

        let sends = deliveries.into_iter().map(|delivery| async move {
            let text = reminder_message(delivery.user_id, &delivery.message);
            match sink.send(delivery.channel_id, text).await {
                Ok(()) => info!(
                    "Delivered reminder for user {} in channel {}",
                    delivery.user_id, delivery.channel_id
                ),
                Err(e) => warn!(
                    "Dropping reminder for user {} in channel {}: {}",
                    delivery.user_id, delivery.channel_id, e
                ),
            }
        });
        join_all(sends).await;

        Some(count)
    }
}

pub type SharedReminderScheduler = Arc<ReminderScheduler>;

pub fn create_shared_reminder_scheduler() -> SharedReminderScheduler {
    Arc::new(ReminderScheduler::new())
}

/// Deliver due reminders on a fixed interval, forever
pub async fn run_reminder_loop(
    scheduler: SharedReminderScheduler,
    sink: Arc<dyn ReminderSink>,
    period: Duration,
) {
    info!("Reminder loop started (every {}s)", period.as_secs());
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        scheduler.deliver_due(Utc::now(), sink.as_ref()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(ChannelId, String)>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ReminderSink for RecordingSink {
        async fn send(&self, channel_id: ChannelId, text: String) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(BotError::Discord {
                    message: "Unknown Channel".to_string(),
                });
            }
            self.sent.lock().await.push((channel_id, text));
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn invalid(spec: &str) -> bool {
        matches!(parse_duration(spec), Err(BotError::InvalidDuration { .. }))
    }

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("1h30m").unwrap(), 5400);
        assert_eq!(parse_duration("2d").unwrap(), 172_800);
        assert_eq!(parse_duration("45m").unwrap(), 2700);
        assert_eq!(parse_duration("1d2h30m").unwrap(), 86_400 + 7200 + 1800);
        assert_eq!(parse_duration(" 2H ").unwrap(), 7200);
        assert_eq!(parse_duration("0d5m").unwrap(), 300);
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(invalid("90"));
        assert!(invalid("0m"));
        assert!(invalid(""));
        assert!(invalid("h"));
        assert!(invalid("1h30"));
        assert!(invalid("30m1h"));
        assert!(invalid("1h1h"));
        assert!(invalid("1x"));
        assert!(invalid("1h 30m"));
        assert!(invalid("-5m"));
        assert!(invalid("99999999999999999999999d"));
    }

    #[test]
    fn test_set_reminder_computes_due_time() {
        let scheduler = ReminderScheduler::new();
        let set = scheduler
            .set_reminder_at(t0(), UserId::new(1), ChannelId::new(10), "1h30m", "Do homework")
            .unwrap();
        assert_eq!(set.due_at, t0() + chrono::Duration::seconds(5400));
        assert!(set.replaced.is_none());
        assert_eq!(scheduler.get(UserId::new(1)).unwrap().message, "Do homework");
    }

    #[test]
    fn test_invalid_duration_stores_nothing() {
        let scheduler = ReminderScheduler::new();
        assert!(scheduler
            .set_reminder_at(t0(), UserId::new(1), ChannelId::new(10), "90", "x")
            .is_err());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_second_reminder_overwrites_first() {
        let scheduler = ReminderScheduler::new();
        let user = UserId::new(7);
        scheduler
            .set_reminder_at(t0(), user, ChannelId::new(10), "5m", "first")
            .unwrap();
        let set = scheduler
            .set_reminder_at(t0(), user, ChannelId::new(20), "10m", "second")
            .unwrap();
        assert_eq!(set.replaced.map(|r| r.message), Some("first".to_string()));
        assert_eq!(scheduler.pending_count(), 1);

        let deliveries = scheduler.tick(t0() + chrono::Duration::hours(1));
        assert_eq!(
            deliveries,
            vec![Delivery {
                channel_id: ChannelId::new(20),
                user_id: user,
                message: "second".to_string(),
            }]
        );
        assert!(scheduler.tick(t0() + chrono::Duration::hours(2)).is_empty());
    }

    #[test]
    fn test_tick_before_and_after_due() {
        let scheduler = ReminderScheduler::new();
        let user = UserId::new(3);
        let due = scheduler
            .set_reminder_at(t0(), user, ChannelId::new(10), "1m", "stretch")
            .unwrap()
            .due_at;

        assert!(scheduler.tick(due - chrono::Duration::seconds(1)).is_empty());
        assert_eq!(scheduler.pending_count(), 1);

        let deliveries = scheduler.tick(due);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].user_id, user);
        assert_eq!(scheduler.pending_count(), 0);

        assert!(scheduler.tick(due).is_empty());
    }

    #[test]
    fn test_tick_only_takes_due_reminders() {
        let scheduler = ReminderScheduler::new();
        scheduler
            .set_reminder_at(t0(), UserId::new(1), ChannelId::new(10), "1m", "soon")
            .unwrap();
        scheduler
            .set_reminder_at(t0(), UserId::new(2), ChannelId::new(10), "1d", "later")
            .unwrap();

        let deliveries = scheduler.tick(t0() + chrono::Duration::minutes(5));
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].message, "soon");
        assert!(scheduler.get(UserId::new(2)).is_some());
    }

    #[test]
    fn test_overwrite_during_tick_is_never_lost() {
        let scheduler = ReminderScheduler::new();
        let user = UserId::new(9);
        let now = t0() + chrono::Duration::minutes(2);
        let rounds = 2_000;
        let writing = AtomicBool::new(true);

        let delivered = std::thread::scope(|s| {
            let ticker = s.spawn(|| {
                let mut delivered = Vec::new();
                while writing.load(Ordering::Acquire) {
                    delivered.extend(scheduler.tick(now));
                }
                delivered.extend(scheduler.tick(now));
                delivered
            });

            // Each round stores a due reminder, then replaces it with one due tomorrow
            for i in 0..rounds {
                scheduler
                    .set_reminder_at(t0(), user, ChannelId::new(10), "1m", &format!("due {}", i))
                    .unwrap();
                scheduler
                    .set_reminder_at(t0(), user, ChannelId::new(10), "1d", &format!("later {}", i))
                    .unwrap();
            }
            writing.store(false, Ordering::Release);
            ticker.join().unwrap()
        });

        assert!(delivered.iter().all(|d| d.message.starts_with("due ")));
        let unique: HashSet<&str> = delivered.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(unique.len(), delivered.len());
        assert_eq!(
            scheduler.get(user).map(|r| r.message),
            Some(format!("later {}", rounds - 1))
        );
    }

    #[tokio::test]
    async fn test_deliver_due_sends_once() {
        let scheduler = ReminderScheduler::new();
        let sink = RecordingSink::default();
        scheduler
            .set_reminder_at(t0(), UserId::new(42), ChannelId::new(99), "2h", "Match starts")
            .unwrap();

        let later = t0() + chrono::Duration::hours(3);
        assert_eq!(scheduler.deliver_due(later, &sink).await, Some(1));
        assert_eq!(scheduler.deliver_due(later, &sink).await, Some(0));

        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId::new(99));
        assert_eq!(sent[0].1, "⏰ Reminder for <@42>: Match starts");
    }

    #[tokio::test]
    async fn test_failed_delivery_is_dropped() {
        let scheduler = ReminderScheduler::new();
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        scheduler
            .set_reminder_at(t0(), UserId::new(1), ChannelId::new(10), "1m", "gone")
            .unwrap();

        let later = t0() + chrono::Duration::minutes(2);
        assert_eq!(scheduler.deliver_due(later, &sink).await, Some(1));
        assert_eq!(scheduler.pending_count(), 0);
        assert!(sink.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_pass_is_skipped() {
        let scheduler = ReminderScheduler::new();
        let sink = RecordingSink {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        scheduler
            .set_reminder_at(t0(), UserId::new(1), ChannelId::new(10), "1m", "once")
            .unwrap();

        let later = t0() + chrono::Duration::minutes(2);
        let (first, second) = tokio::join!(
            scheduler.deliver_due(later, &sink),
            scheduler.deliver_due(later, &sink)
        );
        assert_eq!(first, Some(1));
        assert_eq!(second, None);
        assert_eq!(sink.sent.lock().await.len(), 1);
    }
}
