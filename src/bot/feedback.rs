//! User feedback on fact-check responses.
//!
//! Manual check replies carry 👍/👎 buttons. Presses are acknowledged
//! ephemerally and tallied in memory; presses after the feedback window
//! are answered as expired.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{
    ButtonStyle, ComponentInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::Result;

/// How long feedback buttons stay active.
pub const FEEDBACK_WINDOW: Duration = Duration::from_secs(300);

const CUSTOM_ID_PREFIX: &str = "fb";

/// A single recorded button press.
#[derive(Debug, Clone)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub user_id: u64,
    pub verdict: String,
    pub helpful: bool,
    pub at: DateTime<Utc>,
}

/// In-memory tally of feedback presses.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: Mutex<Vec<FeedbackEntry>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, user_id: u64, verdict: &str, helpful: bool) {
        let entry = FeedbackEntry {
            id: Uuid::new_v4(),
            user_id,
            verdict: verdict.to_string(),
            helpful,
            at: Utc::now(),
        };
        info!(
            "{} feedback received from {} for {}",
            if helpful { "Helpful" } else { "Not helpful" },
            user_id,
            verdict
        );
        self.entries.lock().await.push(entry);
    }

    /// (helpful, not helpful) counts.
    pub async fn counts(&self) -> (u64, u64) {
        let entries = self.entries.lock().await;
        let helpful = entries.iter().filter(|e| e.helpful).count() as u64;
        (helpful, entries.len() as u64 - helpful)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Action row with 👍/👎 buttons, stamped with the issue time.
pub fn feedback_row(verdict: &str) -> CreateActionRow {
    feedback_row_at(verdict, Utc::now().timestamp())
}

fn feedback_row_at(verdict: &str, issued_unix: i64) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(encode_custom_id(true, issued_unix, verdict))
            .label("👍 Helpful")
            .style(ButtonStyle::Success),
        CreateButton::new(encode_custom_id(false, issued_unix, verdict))
            .label("👎 Not Helpful")
            .style(ButtonStyle::Danger),
    ])
}

fn encode_custom_id(helpful: bool, issued_unix: i64, verdict: &str) -> String {
    // Discord caps custom ids at 100 chars
    let flag = if helpful { "h" } else { "n" };
    let mut id = format!("{}|{}|{}|{}", CUSTOM_ID_PREFIX, flag, issued_unix, verdict);
    if id.len() > 100 {
        let mut cut = 100;
        while !id.is_char_boundary(cut) {
            cut -= 1;
        }
        id.truncate(cut);
    }
    id
}

/// Parse a feedback custom id into (helpful, issued_unix, verdict).
pub fn parse_custom_id(custom_id: &str) -> Option<(bool, i64, &str)> {
    let mut parts = custom_id.splitn(4, '|');
    if parts.next()? != CUSTOM_ID_PREFIX {
        return None;
    }
    let helpful = match parts.next()? {
        "h" => true,
        "n" => false,
        _ => return None,
    };
    let issued = parts.next()?.parse().ok()?;
    let verdict = parts.next().unwrap_or("");
    Some((helpful, issued, verdict))
}

/// Handle a feedback button press.
pub async fn handle_component(
    ctx: &Context,
    component: &ComponentInteraction,
    log: &FeedbackLog,
) -> Result<()> {
    let Some((helpful, issued, verdict)) = parse_custom_id(&component.data.custom_id) else {
        return Ok(());
    };

    let age = Utc::now().timestamp().saturating_sub(issued);
    let content = if age > FEEDBACK_WINDOW.as_secs() as i64 {
        "⌛ This feedback window has expired.".to_string()
    } else {
        log.record(component.user.id.get(), verdict, helpful).await;
        if helpful {
            "✅ Thank you for your feedback! This helps improve our fact-checking.".to_string()
        } else {
            "📝 Thank you for your feedback! We'll work to improve our analysis.".to_string()
        }
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}
