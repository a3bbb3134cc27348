//! User-facing notification texts.

/// Admin logged in.
pub const WELCOME_ADMIN: &str = "Welcome Admin! You can access the admin dashboard.";
/// Regular user logged in.
pub const LOGIN_SUCCESS: &str = "Login successful! Welcome to EventTicket.";
/// Prefix for a login the backend refused.
pub const AUTH_FAILED_PREFIX: &str = "Authentication failed: ";
/// Used after [`AUTH_FAILED_PREFIX`] when the backend gave no reason.
pub const UNKNOWN_ERROR: &str = "Unknown error";
/// Login could not complete on our side.
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
/// The identity provider reported a failure before any exchange.
pub const IDENTITY_PROVIDER_FAILED: &str = "Google login failed";
/// Logout finished.
pub const LOGGED_OUT: &str = "Logged out successfully";

/// Purchase attempted without a session.
pub const LOGIN_TO_PURCHASE: &str = "Please login first to purchase tickets";
/// Purchase attempted on an event last seen with no capacity.
pub const SOLD_OUT: &str = "This event is sold out";
/// Purchase settled successfully.
pub const PURCHASE_SUCCESS: &str =
    "Ticket purchased successfully! Check \"My Tickets\" to view your QR code.";
/// Purchase refused without a reason.
pub const PURCHASE_FAILED: &str = "Failed to purchase ticket";
/// Purchase never reached the backend.
pub const PURCHASE_RETRY: &str = "Failed to purchase ticket. Please try again.";

/// Cancel attempted without a session.
pub const LOGIN_TO_CANCEL: &str = "Please login first to cancel tickets";
/// Question asked before cancelling.
pub const CONFIRM_CANCEL: &str = "Are you sure you want to cancel this ticket?";
/// The user said no.
pub const CANCEL_ABORTED: &str = "Ticket cancellation aborted";
/// Cancel settled successfully.
pub const CANCEL_SUCCESS: &str = "Ticket cancelled successfully";
/// Cancel refused without a reason.
pub const CANCEL_FAILED: &str = "Failed to cancel ticket";
/// Cancel never reached the backend.
pub const CANCEL_RETRY: &str = "Failed to cancel ticket. Please try again.";

/// Text for a login the backend refused.
#[must_use]
pub fn authentication_failed(reason: Option<&str>) -> String {
    format!("{AUTH_FAILED_PREFIX}{}", reason.unwrap_or(UNKNOWN_ERROR))
}
