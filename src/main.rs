use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use pangkas::config::AppConfig;
use pangkas::models::{BookingDraft, Navigation, PaymentOutcome, PaymentSession};
use pangkas::services::payment::{
    ErrorChoice, LoadError, PaymentScreen, PaymentSurface, ReconcilerConfig,
};
use pangkas::services::slots::{slots_for_date, upcoming_slots};
use pangkas::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "pangkas")]
#[command(about = "Barbershop booking client")]
struct Args {
    #[arg(long, env = "API_BASE_URL")]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PANGKAS_PASSWORD")]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// List bookable slots for a shop on a date
    Slots {
        #[arg(long)]
        shop: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Create a booking and print the payment link
    Book {
        #[arg(long)]
        shop: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
    },
    /// Show booking history
    History,
    /// Reconcile a payment session from signals read on stdin
    Simulate {
        #[arg(long)]
        booking_id: String,
        #[arg(long)]
        redirect_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }

    let state = AppState::init(config)?;

    match args.command {
        Command::Login { email, password } => {
            let token = state.api.login(&email, &password).await?;
            state.session.attach(&token)?;
            println!("Logged in as {email}");
        }
        Command::Logout => {
            state.session.clear()?;
            println!("Logged out");
        }
        Command::Slots { shop, date } => {
            let slots = available_slots(&state, &shop, date).await?;
            if slots.is_empty() {
                println!("No availability on {date}");
            } else {
                println!("{}", slots.join("  "));
            }
        }
        Command::Book {
            shop,
            service,
            staff,
            date,
            time,
        } => {
            let draft = BookingDraft::new(&shop, &service, staff.as_deref(), date, &time)?;
            let offered = available_slots(&state, &shop, date).await?;
            draft.ensure_slot_offered(&offered)?;

            match state.submitter.submit(draft).await {
                Ok(session) => {
                    println!("Booking {} created", session.booking_id);
                    println!("Pay at: {}", session.redirect_url);
                }
                Err(e) => {
                    if e.is_retryable() {
                        eprintln!("{} (you can try again)", e.user_message());
                    } else {
                        eprintln!("{}", e.user_message());
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::History => {
            for booking in state.api.booking_history().await? {
                println!(
                    "{}  {:<10} {}",
                    booking.booking_id,
                    booking.status.as_str(),
                    booking.booking_time.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Simulate {
            booking_id,
            redirect_url,
        } => {
            simulate(&state, PaymentSession { booking_id, redirect_url }).await?;
        }
    }

    Ok(())
}

async fn available_slots(state: &AppState, shop: &str, date: NaiveDate) -> anyhow::Result<Vec<String>> {
    let barbershop = state
        .api
        .barbershop(shop)
        .await
        .with_context(|| format!("failed to load barbershop {shop}"))?;
    let slots = slots_for_date(&barbershop.opening_hours, date, state.config.slot_interval_minutes);
    Ok(upcoming_slots(&slots, date, Local::now().naive_local()))
}

/// Prints what the app would show instead of driving a real web view.
struct ConsoleSurface;

#[async_trait]
impl PaymentSurface for ConsoleSurface {
    fn set_loading(&self, loading: bool) {
        tracing::debug!(loading, "loading indicator");
    }

    fn show_outcome(&self, outcome: PaymentOutcome, booking_id: &str) {
        println!("[{}] {}: {}", booking_id, outcome.title(), outcome.message());
    }

    fn navigate(&self, navigation: Navigation) {
        println!("-> {navigation:?}");
    }

    fn reload(&self) {
        println!("-> reload");
    }

    async fn confirm_exit(&self) -> bool {
        println!("Leave payment? Your booking stays unpaid until you complete it. (yes)");
        true
    }

    async fn offer_retry(&self, message: &str) -> ErrorChoice {
        println!("{message} (retry)");
        ErrorChoice::Retry
    }
}

async fn simulate(state: &AppState, session: PaymentSession) -> anyhow::Result<()> {
    let screen = PaymentScreen::mount(
        session,
        Arc::new(ConsoleSurface),
        &state.events,
        ReconcilerConfig::from_app(&state.config),
    );
    println!("Opening {}", screen.redirect_url());

    let reconciler = Arc::clone(screen.reconciler());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let (cmd, rest) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        match cmd {
            "nav" => reconciler.handle_navigation(rest, false),
            "link" => {
                if state.events.deep_links.emit(rest.to_string()) > 0 {
                    // delivered on the listener task
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                }
            }
            "load" => {
                if !reconciler.should_start_load(rest) {
                    println!("blocked load of {rest}");
                }
            }
            "error" => {
                let mut parts = rest.splitn(3, ' ');
                let code = parts.next().and_then(|c| c.parse().ok()).unwrap_or(-1);
                let url = parts.next().unwrap_or_default();
                let description = parts.next().unwrap_or_default();
                reconciler
                    .handle_load_error(&LoadError::new(url, code, description))
                    .await;
            }
            "message" => reconciler.handle_page_message(rest),
            "back" => reconciler.handle_back().await,
            "" => continue,
            other => eprintln!("unknown signal: {other}"),
        }

        if reconciler.is_resolved() {
            break;
        }
    }

    reconciler.settled().await;
    println!("Final state: {:?}", reconciler.state());
    Ok(())
}
