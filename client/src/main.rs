//! `eventticket`: a line-oriented shell over [`TicketClient`].
//!
//! Run with: `cargo run --bin eventticket`
//!
//! Configuration comes from the environment (or a `.env` file); see
//! [`Config`]. Logs go to stderr, filtered by `RUST_LOG`.

use eventticket_client::providers::{FileSessionSlot, HttpBackend, PromptConfirmation};
use eventticket_client::{
    AppAction, AppState, ClientEnvironment, Config, IdentityAssertion, TicketClient, View,
};
use eventticket_runtime::StoreError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Client = TicketClient<HttpBackend, FileSessionSlot, PromptConfirmation>;

const HELP: &str = "\
Commands:
  login <google-credential>          log in with a Google ID-token
  login-as <email> <google-id> <name> log in with an already verified identity
  logout                             log out
  events                             list events
  tickets                            list your tickets
  refresh                            reload events and tickets
  buy <event-id>                     buy a ticket
  cancel <ticket-id>                 cancel a ticket (asks first)
  dismiss                            hide the current notification
  admin                              show the admin dashboard link
  help                               show this help
  quit                               exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventticket=info,eventticket_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        session_dir = %config.session_dir.display(),
        "Configuration loaded"
    );

    let confirmation = PromptConfirmation::new();
    let environment = ClientEnvironment::new(
        HttpBackend::new(config.api_url.as_str()),
        FileSessionSlot::new(&config.session_dir),
        confirmation.clone(),
    )
    .with_notification_ttl(config.notification_ttl);
    let client = TicketClient::new(environment)
        .with_admin_dashboard_url(config.admin_dashboard_url.as_str());

    let last_shown = Arc::new(AtomicU64::new(0));
    tokio::spawn(print_notifications(
        client.clone(),
        client.subscribe(),
        Arc::clone(&last_shown),
    ));

    client.restore().await?.wait().await;
    print_header(&client.snapshot().await);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if confirmation.answer(&line) {
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };
        if matches!(command, "quit" | "exit") {
            break;
        }

        if let Err(error) = run_command(&client, command, args).await {
            eprintln!("error: {error}");
        }
        show_notification(&client, &last_shown).await;
    }

    client.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

async fn run_command(client: &Client, command: &str, args: &[&str]) -> Result<(), StoreError> {
    match (command, args) {
        ("login", [credential]) => {
            client.login_with_google_credential(credential).await?.wait().await;
            print_header(&client.snapshot().await);
        },
        ("login-as", [email, google_id, name @ ..]) if !name.is_empty() => {
            let identity = IdentityAssertion::new(*email, name.join(" "), *google_id);
            client.login(identity).await?.wait().await;
            print_header(&client.snapshot().await);
        },
        ("logout", []) => {
            client.logout().await?.wait().await;
        },
        ("events", []) => {
            client.select_view(View::Events).await?;
            print_events(&client.snapshot().await);
        },
        ("tickets", []) => {
            client.select_view(View::Tickets).await?;
            print_tickets(&client.snapshot().await);
        },
        ("refresh", []) => {
            client.refresh().await?.wait().await;
            let state = client.snapshot().await;
            match state.view {
                View::Events => print_events(&state),
                View::Tickets => print_tickets(&state),
            }
        },
        ("buy", [event_id]) => {
            client.purchase(*event_id).await?.wait().await;
        },
        ("cancel", [ticket_id]) => {
            // the answer arrives through this same input loop, so don't wait here
            client.cancel(*ticket_id).await?;
        },
        ("dismiss", []) => {
            client.dismiss_notification().await?;
        },
        ("admin", []) => match client.admin_dashboard_url().await {
            Some(url) => println!("Admin dashboard: {url}"),
            None => println!("The admin dashboard is only available to admins."),
        },
        ("help", _) => println!("{HELP}"),
        _ => println!("Unknown command or wrong arguments: {command}. Type `help`."),
    }
    Ok(())
}

/// Print the current notification unless it was already printed.
async fn show_notification(client: &Client, last_shown: &AtomicU64) {
    let notification = client.state(|s| s.notification.clone()).await;
    if !notification.visible {
        return;
    }
    if last_shown.fetch_max(notification.generation, Ordering::AcqRel) < notification.generation {
        println!("[{}] {}", notification.kind, notification.message);
    }
}

async fn print_notifications(
    client: Client,
    mut actions: broadcast::Receiver<AppAction>,
    last_shown: Arc<AtomicU64>,
) {
    loop {
        match actions.recv().await {
            Ok(action)
                if action.is_completion()
                    || matches!(action, AppAction::CancelConfirmation { .. }) =>
            {
                show_notification(&client, &last_shown).await;
            },
            Ok(_) => {},
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Notification printer lagged");
            },
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_header(state: &AppState) {
    match &state.session {
        Some(session) if state.is_logged_in() => {
            let role = if session.is_admin { " (admin)" } else { "" };
            println!(
                "Logged in as {} <{}>{role}. My Tickets: {}",
                session.name,
                session.email,
                state.tickets.len()
            );
        },
        _ => println!("Not logged in. Use `login` to sign in with Google."),
    }
}

fn print_events(state: &AppState) {
    if !state.is_logged_in() {
        println!("Log in to see events.");
        return;
    }
    if state.catalog.is_empty() {
        println!("No events available.");
        return;
    }
    for event in &state.catalog {
        let status = if state.is_purchasing(&event.id) {
            "Purchasing..."
        } else if event.is_sold_out() {
            "Sold Out"
        } else {
            "Get Ticket"
        };
        println!(
            "{id}  {name}\n    {date}  {venue}\n    {price}  {capacity}  [{status}]",
            id = event.id,
            name = event.name,
            date = event.date.map_or_else(
                || "Date to be announced".to_string(),
                |date| date.format("%a %d %b %Y %H:%M").to_string()
            ),
            venue = event.venue,
            price = event.price_label(),
            capacity = event.capacity_label(),
        );
    }
}

fn print_tickets(state: &AppState) {
    if !state.is_logged_in() {
        println!("Log in to see your tickets.");
        return;
    }
    if state.tickets.is_empty() {
        println!("You have no tickets yet.");
        return;
    }
    for ticket in &state.tickets {
        let date = ticket
            .event_date()
            .map(|date| date.format("%a %d %b %Y %H:%M").to_string())
            .unwrap_or_default();
        let status = match (ticket.is_validated, ticket.validated_at) {
            (true, Some(at)) => format!("Validated {}", at.format("%d %b %Y %H:%M")),
            (true, None) => "Validated".to_string(),
            (false, _) if state.is_cancelling(&ticket.id) => "Cancelling...".to_string(),
            (false, _) => "Valid".to_string(),
        };
        let qr = ticket.qr_code_image.as_deref().map_or("no QR code", |image| {
            image.get(..48).unwrap_or(image)
        });
        println!(
            "{id}  {name}\n    {date}  {venue}\n    [{status}]  QR: {qr}",
            id = ticket.id,
            name = ticket.event_name(),
            venue = ticket.venue(),
        );
    }
}
