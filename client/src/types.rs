//! Domain types shared by the reducer, the providers, and the front end.

use crate::error::{ClientError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamp in any shape the backend has been seen to send.
///
/// RFC 3339, Postgres `timestamptz` text, a naive date-time (taken as UTC),
/// a bare date, or epoch milliseconds. Anything else reads as `None` so one
/// odd row never fails a whole listing.
fn lenient_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => parse_datetime(&text),
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Some(other) => {
            tracing::debug!(value = %other, "Ignoring timestamp of unexpected type");
            None
        },
    };
    Ok(parsed)
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(date) = DateTime::parse_from_str(text, format) {
            return Some(date.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(midnight.and_utc());
    }
    tracing::debug!(value = %text, "Ignoring unparsable timestamp");
    None
}

/// Amount sent either as a JSON number or as numeric text (`"150.00"`).
/// Null or garbage reads as zero.
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(amount.unwrap_or_default())
}

/// Identifier of a backend resource (user, event, ticket).
///
/// The backend sends ids as strings or integers; both are kept as text and
/// always sent back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create an id from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty id, which never names a resource.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The authenticated user, as returned by `POST /auth/google`.
///
/// This is also the record kept in the durable session slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Backend user id. An empty id means "logged out".
    #[serde(default, deserialize_with = "nullable")]
    pub id: ResourceId,

    /// Display name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Email address.
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,

    /// Admin flag; admins get the dashboard link.
    #[serde(default, deserialize_with = "nullable")]
    pub is_admin: bool,
}

impl Session {
    /// True when the record identifies a user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A purchasable event from `GET /events`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Event id.
    pub id: ResourceId,

    /// Event name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Free-text description.
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    /// When the event starts, if the backend sent a readable date.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub date: Option<DateTime<Utc>>,

    /// Where it takes place.
    #[serde(default, deserialize_with = "nullable")]
    pub venue: String,

    /// Ticket price in rand.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: f64,

    /// Total capacity.
    #[serde(default, deserialize_with = "nullable")]
    pub total_tickets: u32,

    /// Remaining capacity, as last reported by the backend.
    #[serde(default, deserialize_with = "nullable")]
    pub available_tickets: u32,
}

impl Event {
    /// True when the backend reported no remaining capacity.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.available_tickets == 0
    }

    /// Price formatted the way the storefront shows it, e.g. `R 150.00`.
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("R {:.2}", self.price)
    }

    /// Capacity line, e.g. `12 / 100 tickets left`.
    #[must_use]
    pub fn capacity_label(&self) -> String {
        format!(
            "{} / {} tickets left",
            self.available_tickets, self.total_tickets
        )
    }
}

/// The event a ticket belongs to, embedded in ticket listings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TicketEvent {
    /// Event name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Event start.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub date: Option<DateTime<Utc>>,

    /// Venue.
    #[serde(default, deserialize_with = "nullable")]
    pub venue: String,
}

/// A ticket owned by the current user, from `GET /tickets/user/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ticket {
    /// Ticket id.
    pub id: ResourceId,

    /// Owner, when the backend includes it.
    #[serde(default)]
    pub user_id: Option<ResourceId>,

    /// The event this ticket admits to.
    #[serde(default, rename = "events")]
    pub event: Option<TicketEvent>,

    /// QR code image reference (usually a data URL), opaque to the client.
    #[serde(default, rename = "qrCodeImage")]
    pub qr_code_image: Option<String>,

    /// Whether the ticket has been scanned at the entrance.
    #[serde(default, deserialize_with = "nullable")]
    pub is_validated: bool,

    /// When it was scanned.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub validated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Event name, or `Event` when the listing did not embed one.
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.event
            .as_ref()
            .map(|e| e.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Event")
    }

    /// Venue, or `Venue` when the listing did not embed one.
    #[must_use]
    pub fn venue(&self) -> &str {
        self.event
            .as_ref()
            .map(|e| e.venue.as_str())
            .filter(|venue| !venue.is_empty())
            .unwrap_or("Venue")
    }

    /// Event start, when known.
    #[must_use]
    pub fn event_date(&self) -> Option<DateTime<Utc>> {
        self.event.as_ref().and_then(|e| e.date)
    }
}

/// A verified external identity, exchanged for a [`Session`].
///
/// Serializes as the `POST /auth/google` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityAssertion {
    /// Email claim.
    pub email: String,

    /// Name claim.
    pub name: String,

    /// Google subject id.
    #[serde(rename = "googleId")]
    pub google_id: String,
}

impl IdentityAssertion {
    /// Build an assertion from its parts.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        google_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            google_id: google_id.into(),
        }
    }

    /// Read the `email`, `name` and `sub` claims from a Google ID-token.
    ///
    /// Only the payload segment is decoded; the sign-in widget that handed
    /// over the credential has already verified it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCredential`] if the credential is not a
    /// JWT or its payload lacks the `email` or `sub` claims.
    pub fn from_google_credential(credential: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Claims {
            email: String,
            #[serde(default)]
            name: Option<String>,
            sub: String,
        }

        let payload = credential
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| ClientError::InvalidCredential("not a JWT".to_string()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::InvalidCredential(format!("payload is not base64url: {e}")))?;

        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidCredential(format!("unexpected claims: {e}")))?;

        Ok(Self {
            email: claims.email,
            name: claims.name.unwrap_or_default(),
            google_id: claims.sub,
        })
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    /// Something worked.
    Success,
    /// Something failed.
    Error,
    /// Neutral information.
    #[default]
    Info,
}

impl NotificationKind {
    /// Lowercase label, as used for styling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notification {
    /// Message text.
    pub message: String,

    /// Severity.
    pub kind: NotificationKind,

    /// Whether it is currently shown.
    pub visible: bool,

    /// Bumped on every `show`; expiry timers carry the generation they were armed for.
    pub generation: u64,

    /// When the current message was shown.
    pub shown_at: Option<DateTime<Utc>>,
}

/// Which listing the front end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Available events.
    #[default]
    Events,
    /// The user's tickets.
    Tickets,
}
