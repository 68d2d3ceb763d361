use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{QuoteId, TenderId};

/// Lifecycle events consumed by the external notification dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    QuoteReceived,
    QuoteAccepted,
    QuoteRejected,
    TenderExpired,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::QuoteReceived => "quote_received",
            NotificationKind::QuoteAccepted => "quote_accepted",
            NotificationKind::QuoteRejected => "quote_rejected",
            NotificationKind::TenderExpired => "tender_expired",
        }
    }
}

/// Payload handed to the dispatcher. The recipient id is opaque here: it is
/// a landlord or contractor id depending on the kind, and only the external
/// dispatcher resolves it to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub tender_id: TenderId,
    pub quote_id: Option<QuoteId>,
    pub recipient: String,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error. Delivery is fire-and-forget from the
/// marketplace's point of view; the service logs these and moves on.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Trait describing the outbound notification hook (e-mail, SMS, or an
/// in-process recorder in tests).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), PublishError>;
}
