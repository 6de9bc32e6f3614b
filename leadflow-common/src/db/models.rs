//! Shared record models
//!
//! All records carry an explicit `workspace_id`; callers thread it through
//! every operation rather than deriving it from ambient session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lead status attached to properties and message threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    None,
    Interested,
    NotInterested,
    Dnc,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::None => "none",
            LeadStatus::Interested => "interested",
            LeadStatus::NotInterested => "not_interested",
            LeadStatus::Dnc => "dnc",
        }
    }

    /// Parse from stored text; unknown values read as `None`
    pub fn parse(value: &str) -> Self {
        match value {
            "interested" => LeadStatus::Interested,
            "not_interested" => LeadStatus::NotInterested,
            "dnc" => LeadStatus::Dnc,
            _ => LeadStatus::None,
        }
    }
}

/// Delivery status of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "delivered" => MessageStatus::Delivered,
            "failed" => MessageStatus::Failed,
            _ => MessageStatus::Sent,
        }
    }
}

/// Origin of a property status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    User,
    Ai,
}

impl StatusSource {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusSource::User => "user",
            StatusSource::Ai => "ai",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "ai" => StatusSource::Ai,
            _ => StatusSource::User,
        }
    }
}

/// Contact record
///
/// No uniqueness key; bulk import resolves contacts through a matching
/// strategy over (first name, last name, any phone number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub guid: Uuid,
    pub workspace_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub business_name: Option<String>,
    pub mailing_address: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn new(workspace_id: Uuid, first_name: String, last_name: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            workspace_id,
            first_name,
            last_name,
            business_name: None,
            mailing_address: None,
            email: None,
        }
    }

    /// Deterministic placeholder email for imported contacts without a real
    /// address. Not a production identity.
    pub fn placeholder_email(first_name: &str, last_name: &str) -> String {
        format!(
            "{}.{}@example.com",
            first_name.trim().to_lowercase(),
            last_name.trim().to_lowercase()
        )
    }
}

/// Phone number attached to a contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub guid: Uuid,
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub number: String,
    pub number_hash: String,
    pub phone_type: String,
}

impl PhoneNumber {
    pub fn new(owner_id: Uuid, workspace_id: Uuid, number: String) -> Self {
        let number_hash = crate::phone::lookup_hash(&number);
        Self {
            guid: Uuid::new_v4(),
            owner_id,
            workspace_id,
            number,
            number_hash,
            phone_type: "mobile".to_string(),
        }
    }
}

/// Property record
///
/// Lookup key: exact (address, city, state, zip) within a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub guid: Uuid,
    pub workspace_id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub mailing_address: Option<String>,
    pub tags: Vec<String>,
    pub status: LeadStatus,
}

impl Property {
    /// Tag set encoded for its TEXT column
    pub fn tags_json(&self) -> crate::Result<String> {
        serde_json::to_string(&self.tags)
            .map_err(|e| crate::Error::Internal(format!("Tag encoding failed: {}", e)))
    }

    /// Decode a TEXT-column tag set
    pub fn parse_tags(json: &str) -> crate::Result<Vec<String>> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::Internal(format!("Bad tag encoding: {}", e)))
    }

    pub fn new(
        workspace_id: Uuid,
        address: String,
        city: String,
        state: String,
        zip: String,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            workspace_id,
            address,
            city,
            state,
            zip,
            mailing_address: None,
            tags: Vec::new(),
            status: LeadStatus::None,
        }
    }
}

/// One message thread per (workspace, contact)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageThread {
    pub guid: Uuid,
    pub workspace_id: Uuid,
    pub contact_id: Uuid,
    pub status: LeadStatus,
}

/// Stored message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub guid: Uuid,
    pub thread_id: Uuid,
    pub workspace_id: Uuid,
    pub sender_id: String,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(thread_id: Uuid, workspace_id: Uuid, sender_id: String, content: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            thread_id,
            workspace_id,
            sender_id,
            content,
            status: MessageStatus::Sent,
            created_at: crate::time::now(),
        }
    }
}

/// Audit entry for a property status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyStatusChange {
    pub guid: Uuid,
    pub property_id: Uuid,
    pub status: LeadStatus,
    pub changed_by: String,
    pub source: StatusSource,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}

impl PropertyStatusChange {
    /// Manual change from the UI
    pub fn user(property_id: Uuid, status: LeadStatus, changed_by: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            property_id,
            status,
            changed_by,
            source: StatusSource::User,
            confidence: None,
            reasoning: None,
        }
    }

    /// Classifier-driven change (recorded with its confidence and reasoning)
    pub fn ai(
        property_id: Uuid,
        status: LeadStatus,
        changed_by: String,
        confidence: f64,
        reasoning: Option<String>,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            property_id,
            status,
            changed_by,
            source: StatusSource::Ai,
            confidence: Some(confidence),
            reasoning,
        }
    }
}

/// Per-user messaging settings
///
/// An unset row reads as these defaults; the eligibility gate consumes the
/// window and limit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessagingSettings {
    pub user_id: String,
    pub workspace_id: Uuid,
    pub gateway_api_key: Option<String>,
    pub gateway_webhook_url: Option<String>,
    pub daily_message_limit: i64,
    pub message_window_start: String,
    pub message_window_end: String,
    pub phone_number_1: Option<String>,
    pub phone_number_2: Option<String>,
    pub phone_number_3: Option<String>,
    pub phone_number_4: Option<String>,
    pub phone_number_selection: String,
}

impl UserMessagingSettings {
    pub fn defaults(user_id: String, workspace_id: Uuid) -> Self {
        Self {
            user_id,
            workspace_id,
            gateway_api_key: None,
            gateway_webhook_url: None,
            daily_message_limit: 100,
            message_window_start: "08:00".to_string(),
            message_window_end: "21:00".to_string(),
            phone_number_1: None,
            phone_number_2: None,
            phone_number_3: None,
            phone_number_4: None,
            phone_number_selection: "sequential".to_string(),
        }
    }

    /// Outbound number for the next send. `sequential` selection returns the
    /// first configured number.
    pub fn outbound_number(&self) -> Option<&str> {
        [
            self.phone_number_1.as_deref(),
            self.phone_number_2.as_deref(),
            self.phone_number_3.as_deref(),
            self.phone_number_4.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
    }
}
