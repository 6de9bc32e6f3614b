//! Outbound send pipeline
//!
//! Gate consult, transport dispatch, message persistence, then optional
//! classification write-back. The gate denial path has no side effects; a
//! transport failure still stores the message (as failed) so the thread
//! history stays truthful.

use crate::classifier::Classification;
use crate::db::{messages, properties, threads};
use crate::{gate, AppState};
use leadflow_common::db::{MessageRecord, MessageStatus, PropertyStatusChange};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// One send attempt
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub contact_id: Uuid,
    /// Destination phone number
    pub to: String,
    pub content: String,
    /// Property whose lead status the reply concerns, if any; enables
    /// classification write-back
    pub property_id: Option<Uuid>,
}

/// What one send attempt did
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub message_id: Uuid,
    pub status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

#[derive(Debug, Error)]
pub enum SendError {
    /// Eligibility gate denied the attempt; nothing was stored
    #[error("sending blocked: {reason}")]
    Blocked { reason: String },

    /// Gateway rejected or failed the dispatch; the message is stored as failed
    #[error("transport failure: {0}")]
    Transport(String),

    /// Record store failure
    #[error(transparent)]
    Store(#[from] leadflow_common::Error),
}

/// Send one message through the full pipeline
pub async fn send_message(state: &AppState, req: SendRequest) -> Result<SendOutcome, SendError> {
    // 1. Eligibility gate; denial has no side effects
    let verdict = gate::can_send(&state.db, req.workspace_id, Some(&req.user_id)).await;
    if !verdict.allowed {
        let reason = verdict
            .reason
            .unwrap_or_else(|| "sending blocked".to_string());
        return Err(SendError::Blocked { reason });
    }

    let settings =
        crate::db::settings::load_or_default(&state.db, req.workspace_id, &req.user_id).await?;

    let thread = threads::ensure(&state.db, req.workspace_id, req.contact_id).await?;

    let mut record = MessageRecord::new(
        thread.guid,
        req.workspace_id,
        req.user_id.clone(),
        req.content.clone(),
    );

    // 2. Dispatch through the gateway; no automatic retry
    let transport_error = match state.transport.send(&settings, &req.to, &req.content).await {
        Ok(outcome) if outcome.success => None,
        Ok(outcome) => Some(
            outcome
                .error
                .unwrap_or_else(|| "gateway rejected the message".to_string()),
        ),
        Err(e) => Some(e.to_string()),
    };

    if let Some(error) = transport_error {
        record.status = MessageStatus::Failed;
        messages::insert(&state.db, &record).await?;
        warn!(message_id = %record.guid, "Send failed: {}", error);
        return Err(SendError::Transport(error));
    }

    // 3. Store the delivered message
    record.status = MessageStatus::Delivered;
    messages::insert(&state.db, &record).await?;
    info!(message_id = %record.guid, thread_id = %thread.guid, "Message delivered");

    // 4. Optional classification write-back
    let classification = match req.property_id {
        Some(property_id) => {
            classify_and_apply(state, &req, property_id, thread.guid).await
        }
        None => None,
    };

    Ok(SendOutcome {
        message_id: record.guid,
        status: record.status,
        classification,
    })
}

/// Classify the message text and, when the result clears the confidence
/// threshold, write the status back to the property, its history, and the
/// thread. The send has already succeeded; classifier failures only log.
async fn classify_and_apply(
    state: &AppState,
    req: &SendRequest,
    property_id: Uuid,
    thread_id: Uuid,
) -> Option<Classification> {
    let classification = match state.classifier.classify(&req.content).await {
        Ok(classification) => classification,
        Err(e) => {
            warn!("Classification failed, send already stored: {}", e);
            return None;
        }
    };

    if !classification.is_actionable() {
        return Some(classification);
    }

    // is_actionable guarantees a status
    let Some(status) = classification.status else {
        return Some(classification);
    };

    let change = PropertyStatusChange::ai(
        property_id,
        status,
        req.user_id.clone(),
        classification.confidence,
        classification.reasoning.clone(),
    );

    let applied = async {
        properties::set_status(&state.db, property_id, status).await?;
        properties::record_status_change(&state.db, &change).await?;
        threads::set_status(&state.db, thread_id, status).await?;
        Ok::<(), leadflow_common::Error>(())
    }
    .await;

    match applied {
        Ok(()) => {
            info!(
                property_id = %property_id,
                status = status.as_str(),
                confidence = classification.confidence,
                "Classified status written back"
            );
        }
        Err(e) => {
            warn!("Status write-back failed, send already stored: {}", e);
        }
    }

    Some(classification)
}
