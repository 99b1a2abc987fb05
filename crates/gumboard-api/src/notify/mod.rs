//! Slack notifications for checklist activity, debounced per user and board.

pub mod debounce;
pub mod slack;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gumboard_db::Connection;
use gumboard_db::queries::boards;

use crate::middleware::Caller;

pub use debounce::{DebounceStore, MemoryDebounceStore};
pub use slack::{LogMessenger, Messenger, SlackMessenger};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistEvent {
    NoteAdded,
    ItemAdded,
    ItemCompleted,
}

/// Everything needed to decide on and render one notification.
#[derive(Debug, Clone)]
pub struct Activity {
    pub event: ChecklistEvent,
    pub user_id: String,
    pub user_name: String,
    pub board_id: String,
    pub board_name: String,
    pub send_slack_updates: bool,
    pub channel: Option<String>,
    pub content: String,
}

impl Activity {
    /// Gather the board and channel details for activity by `caller`.
    /// Returns `None` when the board no longer exists.
    pub(crate) fn load(
        conn: &Connection,
        caller: &Caller,
        board_id: &str,
        event: ChecklistEvent,
        content: &str,
    ) -> anyhow::Result<Option<Self>> {
        let Some(board) = boards::get_board(conn, board_id)? else {
            return Ok(None);
        };
        let channel = boards::slack_channel_for_board(conn, board_id)?;
        Ok(Some(Self {
            event,
            user_id: caller.user_id.clone(),
            user_name: caller.name.clone(),
            board_id: board.id,
            board_name: board.name,
            send_slack_updates: board.send_slack_updates,
            channel,
            content: content.to_string(),
        }))
    }

    fn render(&self) -> String {
        let content = self.content.trim();
        match self.event {
            ChecklistEvent::NoteAdded => format!(
                ":memo: {} added a note to {}: {}",
                self.user_name, self.board_name, content
            ),
            ChecklistEvent::ItemAdded => format!(
                ":heavy_plus_sign: {} by {} in {}",
                content, self.user_name, self.board_name
            ),
            ChecklistEvent::ItemCompleted => format!(
                ":white_check_mark: {} by {} in {}",
                content, self.user_name, self.board_name
            ),
        }
    }
}

/// Decides whether activity is worth a Slack message and sends it.
///
/// Best effort: delivery failures are logged and never surface to the
/// request that caused them.
pub struct Notifier {
    store: Arc<dyn DebounceStore>,
    messenger: Arc<dyn Messenger>,
    window: Duration,
}

impl Notifier {
    pub fn new(store: Arc<dyn DebounceStore>, messenger: Arc<dyn Messenger>, window: Duration) -> Self {
        Self {
            store,
            messenger,
            window,
        }
    }

    /// Apply the skip rules and the debounce check. Returns the channel to
    /// post to when the activity is admitted.
    fn admit(&self, activity: &Activity) -> Option<String> {
        if activity.content.trim().is_empty() || !activity.send_slack_updates {
            return None;
        }
        let channel = activity.channel.clone()?;

        let key = format!("{}:{}", activity.user_id, activity.board_id);
        if !self.store.check_and_record(&key, Instant::now(), self.window) {
            debug!("Suppressing {:?} notification for {}", activity.event, key);
            return None;
        }
        Some(channel)
    }

    /// Returns true when a message was handed to the messenger successfully.
    pub async fn notify(&self, activity: Activity) -> bool {
        match self.admit(&activity) {
            Some(channel) => deliver(self.messenger.as_ref(), &channel, &activity).await,
            None => false,
        }
    }

    /// Admit the activity now and post it on a background task, so a slow
    /// Slack call never holds up the request. Returns the delivery task when
    /// a message was admitted.
    pub fn dispatch(&self, activity: Activity) -> Option<JoinHandle<bool>> {
        let channel = self.admit(&activity)?;
        let messenger = Arc::clone(&self.messenger);
        Some(tokio::spawn(async move {
            deliver(messenger.as_ref(), &channel, &activity).await
        }))
    }

    /// Drop debounce entries older than twice the window.
    pub fn prune(&self) -> usize {
        self.store.prune(Instant::now(), self.window * 2)
    }
}

async fn deliver(messenger: &dyn Messenger, channel: &str, activity: &Activity) -> bool {
    match messenger.send_message(channel, &activity.render()).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Slack notification failed for board {}: {:#}", activity.board_id, e);
            false
        }
    }
}

/// Background task that keeps the debounce store small.
pub async fn run_prune_loop(notifier: Arc<Notifier>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let pruned = notifier.prune();
        if pruned > 0 {
            info!("Debounce: pruned {} stale entries", pruned);
        }
    }
}
