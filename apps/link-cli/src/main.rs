//! Demonstration harness for the multi-protocol link layer (spec §6):
//! a thin CLI that drives one of the three link modes end-to-end against
//! [`core_stub`]'s logging stand-ins, never a real emulator core.

mod core_stub;
mod orchestrator;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use link_gb::GbLinkSession;
use link_gba::GbaLinkSession;
use link_netplay::NetplaySession;
use link_network::{NetworkControl, SystemNetworkControl};
use link_session::capability::{LinkSession, StartHostParams};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::core_stub::{LoggingCoreCallbacks, LoggingOptionWriter};
use crate::orchestrator::{ActiveSession, Orchestrator};

#[derive(Parser, Debug)]
#[command(name = "link-cli")]
#[command(about = "Multi-protocol emulator link layer demonstration harness", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Station interface to restore when leaving a self-hosted hotspot.
    #[arg(long, default_value = "wlan0")]
    station_iface: String,

    /// Interface used when this device hosts its own access point.
    #[arg(long, default_value = "wlan1")]
    ap_iface: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host a session, optionally standing up this device's own hotspot.
    Host {
        mode: LinkMode,
        /// Game title advertised over discovery.
        #[arg(long, default_value = "demo-rom")]
        game_name: String,
        #[arg(long, default_value_t = 0)]
        game_crc: u32,
        /// GBA link only: the wireless-adapter compatibility tag.
        #[arg(long)]
        link_mode: Option<String>,
        /// Bring up this device's own Wi-Fi hotspot before hosting.
        #[arg(long)]
        hotspot: bool,
    },
    /// Connect to a host by address.
    Connect {
        mode: LinkMode,
        addr: SocketAddr,
        /// Treat `addr` as the host's own hotspot (enables join retries).
        #[arg(long)]
        hotspot: bool,
    },
    /// List hosts seen on this mode's discovery channel.
    List { mode: LinkMode },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LinkMode {
    Netplay,
    GbaLink,
    GbLink,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let network = Arc::new(SystemNetworkControl::new(args.station_iface, args.ap_iface));
    let mut orchestrator = Orchestrator::new(network.clone());

    match args.command {
        Command::Host { mode, game_name, game_crc, link_mode, hotspot } => {
            let params = StartHostParams { game_name, game_crc, hotspot_ip: None, link_mode };
            let session = new_session(mode);
            if hotspot {
                orchestrator.host_on_hotspot(session, params).await?;
            } else {
                orchestrator.host_on_station(session, params).await?;
            }
            info!("hosting, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            orchestrator.stop().await?;
        }
        Command::Connect { mode, addr, hotspot } => {
            if !hotspot {
                network.ensure_station_ready().await?;
            }
            let session = new_session(mode);
            let outcome = orchestrator.join(session, addr, hotspot).await?;
            info!(?outcome, "join finished");
            tokio::signal::ctrl_c().await?;
            orchestrator.stop().await?;
        }
        Command::List { mode } => {
            let session = new_session(mode);
            let hosts = match &session {
                ActiveSession::Netplay(s) => s.list_discovered_hosts(),
                ActiveSession::GbaLink(s) => s.list_discovered_hosts(),
                ActiveSession::GbLink(s) => s.list_discovered_hosts(),
                ActiveSession::Off => Vec::new(),
            };
            for host in hosts {
                println!("{host:?}");
            }
        }
    }

    Ok(())
}

fn new_session(mode: LinkMode) -> ActiveSession {
    match mode {
        LinkMode::Netplay => ActiveSession::Netplay(NetplaySession::new()),
        LinkMode::GbaLink => ActiveSession::GbaLink(GbaLinkSession::new(Arc::new(LoggingCoreCallbacks))),
        LinkMode::GbLink => ActiveSession::GbLink(GbLinkSession::new(LoggingOptionWriter, 0)),
    }
}
