//! Messaging eligibility gate
//!
//! A send is permitted when the current time falls inside the user's send
//! window (boundaries inclusive, minute resolution) AND the user's send count
//! since local midnight is under the daily limit. The decision is a pure
//! function of those inputs; sending itself is what changes the next
//! evaluation's count.
//!
//! If the settings row cannot be loaded the gate fails closed: the user is
//! ineligible, never silently allowed.

use crate::db;
use chrono::{DateTime, Local, NaiveTime, Timelike};
use leadflow_common::db::UserMessagingSettings;
use leadflow_common::{time, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

pub const REASON_OUTSIDE_WINDOW: &str = "outside window";
pub const REASON_LIMIT_REACHED: &str = "limit reached";
pub const REASON_NOT_AUTHENTICATED: &str = "not authenticated";
pub const REASON_UNVERIFIED: &str = "unable to verify messaging restrictions";

/// Gate decision, surfaced verbatim to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Inputs the gate compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub daily_limit: i64,
}

impl GateConfig {
    pub fn from_settings(settings: &UserMessagingSettings) -> Result<Self> {
        Ok(Self {
            window_start: time::parse_window_time(&settings.message_window_start)?,
            window_end: time::parse_window_time(&settings.message_window_end)?,
            daily_limit: settings.daily_message_limit,
        })
    }
}

/// Pure gate evaluation: no hidden state, no side effects.
///
/// The window check runs first; the first failing check's reason is the one
/// surfaced. Comparison is at minute resolution, both boundaries inclusive.
pub fn evaluate(now: NaiveTime, sent_today: i64, config: &GateConfig) -> Verdict {
    let t = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now);

    if t < config.window_start || t > config.window_end {
        return Verdict::deny(REASON_OUTSIDE_WINDOW);
    }

    if sent_today >= config.daily_limit {
        return Verdict::deny(REASON_LIMIT_REACHED);
    }

    Verdict::allow()
}

/// Can this user send a message right now?
pub async fn can_send(pool: &SqlitePool, workspace_id: Uuid, user_id: Option<&str>) -> Verdict {
    can_send_at(pool, workspace_id, user_id, Local::now()).await
}

/// Gate evaluation at an explicit instant (the seam tests drive)
pub async fn can_send_at(
    pool: &SqlitePool,
    workspace_id: Uuid,
    user_id: Option<&str>,
    now: DateTime<Local>,
) -> Verdict {
    let user_id = match user_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Verdict::deny(REASON_NOT_AUTHENTICATED),
    };

    let settings = match db::settings::load_or_default(pool, workspace_id, user_id).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Settings load failed, gate fails closed: {}", e);
            return Verdict::deny(REASON_UNVERIFIED);
        }
    };

    let config = match GateConfig::from_settings(&settings) {
        Ok(config) => config,
        Err(e) => {
            warn!("Stored window is unreadable, gate fails closed: {}", e);
            return Verdict::deny(REASON_UNVERIFIED);
        }
    };

    let sent_today = match db::messages::count_sent_since(
        pool,
        workspace_id,
        user_id,
        time::local_midnight_utc(),
    )
    .await
    {
        Ok(count) => count,
        Err(e) => {
            warn!("Send count query failed, gate fails closed: {}", e);
            return Verdict::deny(REASON_UNVERIFIED);
        }
    };

    evaluate(now.time(), sent_today, &config)
}
