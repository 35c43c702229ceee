mod config;
mod host;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tribute_app_state::{AppState, AppStateMachine};
use tribute_gateway::HttpGateway;
use tribute_linking::{EndReason, LinkingCoordinator, LinkingEvent, StartOutcome};
use tribute_protocol::DashboardSnapshot;
use tribute_protocol::messages::{PublishSubscriptionRequest, SetUpPayoutsRequest};
use tribute_rules::channel::channel_status;
use tribute_rules::{Currency, Money, PayoutSchedule, history, payout};
use tribute_use_cases::{CreatorUseCases, UseCaseError};

use crate::config::CliConfig;
use crate::host::DesktopHost;

#[derive(Parser)]
#[command(name = "tribute", version, about = "Creator monetization client")]
struct Cli {
    /// Backend base URL (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show onboarding status, earnings and channels
    Status,

    /// Create the backend user for the current identity
    Onboard,

    /// Open the add-agent deep link and wait for a new channel
    Link,

    /// List channels the agent was added to
    Channels,

    /// Ask the backend to add the agent to a channel by handle
    AddChannel {
        /// Channel handle, e.g. `@my_channel`
        handle: String,
    },

    /// Publish the subscription offer
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "Subscribe")]
        button_text: String,
    },

    /// Subscribe a user at a price
    Subscribe {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        price: f64,
    },

    /// Register a payout card
    Payouts {
        #[arg(long)]
        card_number: String,
        #[arg(long)]
        card_date: Option<String>,
        #[arg(long)]
        card_cvv: Option<String>,
    },

    /// Show fee and net amount for a payout request
    PayoutQuote {
        #[arg(long)]
        amount: f64,
    },

    /// Upload identity documents for verification
    VerifyPassport {
        #[arg(long)]
        photo: PathBuf,
        #[arg(long)]
        passport: PathBuf,
    },

    /// Check backend health
    Health,

    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Update fields in the config file
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        init_data: Option<String>,
        #[arg(long)]
        agent_name: Option<String>,
        #[arg(long)]
        access_token: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
}

/// Everything a command needs, wired from the config.
struct App {
    config: CliConfig,
    host: Arc<DesktopHost>,
    gateway: Arc<HttpGateway>,
    machine: Arc<AppStateMachine>,
}

impl App {
    fn new(config: CliConfig) -> anyhow::Result<Self> {
        let host = Arc::new(DesktopHost::new(&config.init_data));
        let gateway = Arc::new(HttpGateway::new(host.clone())?.with_base_url(&config.api_url));
        let machine = Arc::new(AppStateMachine::new(CreatorUseCases::new(gateway.clone())));
        Ok(Self {
            config,
            host,
            gateway,
            machine,
        })
    }

    fn use_cases(&self) -> &CreatorUseCases {
        self.machine.use_cases()
    }

    fn currency(&self) -> Currency {
        self.config.currency.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unsupported currency in config, using USD");
            Currency::Usd
        })
    }

    fn money(&self, amount: f64) -> String {
        match Money::new(amount, self.currency()) {
            Ok(m) => m.to_string(),
            Err(_) => format!("{amount:.2}"),
        }
    }

    /// Loads the dashboard, failing unless the identity is onboarded.
    async fn require_dashboard(&self) -> anyhow::Result<DashboardSnapshot> {
        self.machine.initialize().await;
        match self.machine.state() {
            AppState::Onboarded(snapshot) => Ok(snapshot),
            AppState::NotOnboarded => bail!("not onboarded yet, run `tribute onboard` first"),
            AppState::Errored(detail) => bail!("{detail}"),
            AppState::Loading { .. } => bail!("dashboard is still loading"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    let app = App::new(config)?;
    tracing::debug!(api = %app.gateway.base_url(), "client ready");

    match cli.cmd {
        Command::Status => status(&app).await?,
        Command::Onboard => {
            let status = app.machine.onboard().await.map_err(user_error)?;
            println!("Onboarding complete: {status:?}");
        }
        Command::Link => link(&app).await?,
        Command::Channels => {
            let channels = app
                .use_cases()
                .list_channels()
                .await
                .map_err(user_error)?;
            if channels.is_empty() {
                println!("No channels yet. Run `tribute link` to add one.");
            }
            for channel in channels {
                let state = channel_status(&channel);
                println!(
                    "- {} [{}] {}",
                    channel.handle,
                    channel.id,
                    if state.is_verified { "verified" } else { "pending verification" }
                );
            }
        }
        Command::AddChannel { handle } => {
            let resp = app
                .use_cases()
                .add_agent_to_channel(&handle)
                .await
                .map_err(user_error)?;
            println!(
                "{}",
                resp.message.unwrap_or_else(|| format!("Agent add requested for {handle}"))
            );
        }
        Command::Publish {
            title,
            description,
            price,
            button_text,
        } => {
            let snapshot = app.require_dashboard().await?;
            let req = PublishSubscriptionRequest {
                title,
                description,
                price,
                button_text,
                access_token: app.config.access_token.clone(),
            };
            let resp = app
                .use_cases()
                .publish_subscription(&snapshot, &req)
                .await
                .map_err(user_error)?;
            println!(
                "Published \"{}\" at {}",
                resp.subscription.title,
                app.money(resp.subscription.price)
            );
            app.machine.refresh().await;
        }
        Command::Subscribe { user_id, price } => {
            let resp = app
                .use_cases()
                .create_subscribe(user_id, price)
                .await
                .map_err(user_error)?;
            println!("{}", resp.message);
        }
        Command::Payouts {
            card_number,
            card_date,
            card_cvv,
        } => {
            let snapshot = app.require_dashboard().await?;
            let req = SetUpPayoutsRequest {
                card_number,
                card_date,
                card_cvv,
                access_token: Some(app.config.access_token.clone()).filter(|t| !t.is_empty()),
            };
            let resp = app
                .use_cases()
                .set_up_payouts(&snapshot, req)
                .await
                .map_err(user_error)?;
            println!("{}", resp.message);
        }
        Command::PayoutQuote { amount } => {
            let snapshot = app.require_dashboard().await?;
            let quote = payout::quote(amount, snapshot.earnings)?;
            let schedule = PayoutSchedule::default();
            println!("Amount: {}", app.money(quote.amount));
            println!("Fee:    {}", app.money(quote.fee));
            println!("Net:    {}", app.money(quote.net));
            println!(
                "Paid {:?}, processed within {} days",
                schedule.frequency, schedule.processing_days
            );
        }
        Command::VerifyPassport { photo, passport } => {
            let photo = std::fs::read(&photo)
                .with_context(|| format!("failed to read {}", photo.display()))?;
            let passport = std::fs::read(&passport)
                .with_context(|| format!("failed to read {}", passport.display()))?;
            let resp = app
                .use_cases()
                .upload_verified_passport(&photo, &passport, &app.config.access_token)
                .await
                .map_err(user_error)?;
            println!("{}", resp.message);
        }
        Command::Health => {
            let value = app
                .use_cases()
                .health()
                .await
                .map_err(user_error)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Config { action } => run_config(&app.config, action)?,
    }

    Ok(())
}

fn user_error(e: UseCaseError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

async fn status(app: &App) -> anyhow::Result<()> {
    app.machine.initialize().await;
    let state = app.machine.state();
    println!("Status: {:?}", state.status());

    match &state {
        AppState::Onboarded(snapshot) => {
            let access = app.machine.access();
            println!("Earned: {}", app.money(snapshot.earnings));
            println!(
                "Verified: {}{}",
                snapshot.is_verified,
                if access.needs_verification { " (upload documents with `verify-passport`)" } else { "" }
            );
            println!("Subscription published: {}", snapshot.is_subscription_published);
            println!(
                "Payouts available: {}",
                tribute_rules::identity::can_set_up_payouts(snapshot)
                    && payout::can_request_payout(snapshot.earnings)
            );

            println!("Channels: {}", snapshot.channels.len());
            for channel in &snapshot.channels {
                println!("  - {} ({})", channel.handle, if channel.verified { "verified" } else { "pending" });
            }

            let stats = history::stats(&snapshot.payment_history, chrono::Utc::now());
            println!(
                "Payments: {} total {}, last {} days {}, average {}",
                stats.count,
                app.money(stats.total),
                history::DEFAULT_RECENT_DAYS,
                app.money(stats.recent),
                app.money(stats.average)
            );
            for p in history::newest_first(&snapshot.payment_history).iter().take(5) {
                println!("  {} {} {}", p.created_date, app.money(p.amount_or_zero()), p.description);
            }
        }
        AppState::NotOnboarded => println!("Run `tribute onboard` to create your account."),
        AppState::Errored(detail) => println!("Error: {detail}"),
        AppState::Loading { .. } => {}
    }
    Ok(())
}

/// Runs one linking session until a channel is verified or the session ends.
async fn link(app: &App) -> anyhow::Result<()> {
    let coordinator = LinkingCoordinator::new(
        app.gateway.clone(),
        app.host.clone(),
        app.machine.clone(),
        app.config.linking()?,
    );
    let mut events = coordinator
        .take_events()
        .await
        .context("linking events already taken")?;

    match coordinator.start_linking().await? {
        StartOutcome::Started(_) => {
            println!("Add the agent as an admin in the page that just opened. Waiting...");
        }
        StartOutcome::AlreadyInProgress => bail!("linking already in progress"),
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(LinkingEvent::ChannelLinked { channel_id, .. }) => {
                    println!("Channel {channel_id} linked.");
                    coordinator.cancel();
                    break;
                }
                Some(LinkingEvent::Ended { reason: EndReason::TimedOut, .. }) => {
                    println!("No new channel found in time. Run `tribute link` to try again.");
                    break;
                }
                Some(LinkingEvent::Ended { .. }) | None => break,
                Some(LinkingEvent::Started { .. }) => {}
            },
            _ = tokio::signal::ctrl_c() => {
                coordinator.cancel();
                println!("Linking cancelled.");
                break;
            }
        }
    }

    // A refresh triggered by the coordinator may still be running.
    let state = app.machine.refresh_settled().await;
    if let Some(snapshot) = state.dashboard() {
        println!("Channels: {}", snapshot.channels.len());
    }
    Ok(())
}

/// `show` prints the effective config; `set` edits the file only, so
/// environment and flag overrides are never persisted.
fn run_config(effective: &CliConfig, action: ConfigAction) -> anyhow::Result<()> {
    let path = config::config_path()?;
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(effective)?);
            println!("# file: {}", path.display());
        }
        ConfigAction::Set {
            api_url,
            init_data,
            agent_name,
            access_token,
            currency,
            poll_interval_ms,
        } => {
            let mut config = CliConfig::load_from(&path)?;
            if let Some(v) = api_url {
                config.api_url = v;
            }
            if let Some(v) = init_data {
                config.init_data = v;
            }
            if let Some(v) = agent_name {
                config.agent_name = v;
            }
            if let Some(v) = access_token {
                config.access_token = v;
            }
            if let Some(v) = currency {
                let parsed: Currency = v.parse()?;
                config.currency = parsed.code().to_string();
            }
            if let Some(v) = poll_interval_ms {
                config.poll_interval_ms = v;
            }
            config.linking()?;
            config.save_to(&path)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}
