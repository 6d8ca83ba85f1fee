// crates/podsync-client/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use podsync_client::{ClientConfig, LiveStore, RoomEvent, Subscription, SyncClient};
use podsync_core::{BookingStatus, PodStatus, RoomId};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "podsync-watch")]
#[clap(about = "Watch live pod and booking status changes")]
struct Cli {
    /// Server address (overrides the config file)
    #[clap(short, long)]
    server: Option<String>,

    /// TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Pod to watch (repeatable)
    #[clap(short, long = "pod")]
    pods: Vec<String>,

    /// Booking to watch (repeatable)
    #[clap(short, long = "booking")]
    bookings: Vec<String>,

    /// Set a pod status once connected, as ID=STATUS (repeatable)
    #[clap(long = "set-pod", value_parser = parse_assignment::<PodStatus>)]
    set_pods: Vec<(String, PodStatus)>,

    /// Set a booking status once connected, as ID=STATUS (repeatable)
    #[clap(long = "set-booking", value_parser = parse_assignment::<BookingStatus>)]
    set_bookings: Vec<(String, BookingStatus)>,

    /// Print the effective config and exit
    #[clap(long)]
    print_config: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

fn parse_assignment<S>(arg: &str) -> Result<(String, S), String>
where
    S: std::str::FromStr,
    S::Err: std::fmt::Display,
{
    let (id, status) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected ID=STATUS, got {arg:?}"))?;
    let status = status.trim().parse::<S>().map_err(|e| e.to_string())?;
    Ok((id.trim().to_string(), status))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server_addr = server;
    }
    config.pods.extend(cli.pods);
    config.bookings.extend(cli.bookings);

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let rooms = config
        .pods
        .iter()
        .map(RoomId::pod)
        .chain(config.bookings.iter().map(RoomId::booking))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid resource id")?;

    let (client, connection) = SyncClient::connect(config.clone())
        .await
        .with_context(|| format!("connecting to {}", config.server_addr))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<(RoomId, RoomEvent)>();
    let mut forwarders = JoinSet::new();
    for room in rooms {
        info!(%room, "watching");
        forwarders.spawn(forward(client.subscribe(room), event_tx.clone()));
    }
    drop(event_tx);

    for (pod_id, status) in &cli.set_pods {
        client.update_pod_status(pod_id, *status)?;
    }
    for (booking_id, status) in &cli.set_bookings {
        client.update_booking_status(booking_id, *status)?;
    }

    let mut store = LiveStore::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, exiting");
                break;
            }

            event = event_rx.recv() => {
                let Some((room, event)) = event else { break };
                let now = Local::now().format("%H:%M:%S");
                match event {
                    RoomEvent::Joined => println!("{now} {room} joined"),
                    RoomEvent::Rejected { reason } => {
                        warn!(%room, %reason, "watch refused");
                        println!("{now} {room} rejected: {reason}");
                    }
                    RoomEvent::Update(update) => {
                        let outcome = store.apply_event(&update);
                        println!(
                            "{now} {room} {} {:?} ({} pods, {} bookings cached)",
                            update.name(),
                            outcome,
                            store.pods.len(),
                            store.bookings.len(),
                        );
                    }
                }
            }
        }
    }

    forwarders.shutdown().await;
    client.shutdown();
    if let Err(e) = connection.await {
        warn!("connection task ended abnormally: {}", e);
    }
    Ok(())
}

async fn forward(mut sub: Subscription, tx: mpsc::UnboundedSender<(RoomId, RoomEvent)>) {
    let room = sub.room().clone();
    while let Some(event) = sub.recv().await {
        if tx.send((room.clone(), event)).is_err() {
            break;
        }
    }
}
