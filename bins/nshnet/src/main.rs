//! nshnet command - shell network commands.

mod commands;
mod output;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nshnet::Settings;
use nshnet::backend::{DeviceLister, MemoryStack};
use nshnet::device;
use nshnet::netlink::NetlinkStack;
use nshnet::sysfs::SysfsLister;
use nshnet::system::{HttpClient, SystemResolver, TftpCommand};

use commands::Context;

/// Environment variable naming the settings file.
const CONFIG_ENV: &str = "NSHNET_CONFIG";

#[derive(Parser)]
#[command(name = "nshnet", version, about = "Shell network commands")]
struct Cli {
    /// Settings file (YAML). Defaults to $NSHNET_CONFIG.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Record configuration calls against an in-memory stack instead of
    /// changing the host.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or configure network interfaces.
    Ifconfig(commands::ifconfig::IfconfigCmd),

    /// Bring an interface up.
    Ifup(commands::link::LinkCmd),

    /// Bring an interface down.
    Ifdown(commands::link::LinkCmd),

    /// Manage the ARP table.
    Arp(commands::arp::ArpCmd),

    /// Fetch a file from a TFTP server.
    Get(commands::transfer::TransferCmd),

    /// Send a file to a TFTP server.
    Put(commands::transfer::TransferCmd),

    /// Download a URL.
    Wget(commands::transfer::WgetCmd),

    /// Look up a host name.
    Nslookup(commands::nslookup::NslookupCmd),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match load_settings(cli.config.as_deref()) {
        Ok(settings) if cli.dry_run => dry_run(cli.command, &settings).await,
        Ok(settings) => live(cli.command, &settings).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("nsh: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings, nshnet::config::ConfigError> {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    match path.or(env_path.as_deref()) {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

async fn live(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let stack = NetlinkStack::new(settings)?;
    let lister =
        SysfsLister::new(settings.sysfs_root.clone()).with_statistics(settings.net_stat.clone());
    let tftp = TftpCommand::new(settings.tftp_client.clone());
    let http = HttpClient::new();

    let ctx = Context {
        settings,
        config: &stack,
        lister: &lister,
        resolver: &SystemResolver,
        transfer: &tftp,
        web: &http,
    };
    run(command, &ctx).await
}

/// Run against a memory stack seeded with the host's device names and
/// protocol counters, then report what would have been changed.
async fn dry_run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let stack = MemoryStack::new(settings.arp_table_size);
    let lister =
        SysfsLister::new(settings.sysfs_root.clone()).with_statistics(settings.net_stat.clone());
    if let Ok(names) = device::devices(&lister, "nshnet") {
        for name in names {
            stack.add_device(&name);
        }
    }
    if let Ok(statistics) = lister.statistics() {
        stack.set_statistics(statistics);
    }

    let ctx = Context {
        settings,
        config: &stack,
        lister: &stack,
        resolver: &stack,
        transfer: &stack,
        web: &stack,
    };
    let result = run(command, &ctx).await;

    for call in stack.calls() {
        eprintln!("dry-run: {:?}", call);
    }
    result
}

async fn run<D, L, R, T, W>(command: Command, ctx: &Context<'_, D, L, R, T, W>) -> anyhow::Result<()>
where
    D: nshnet::backend::DeviceConfig + nshnet::backend::ArpTable,
    L: nshnet::backend::DeviceLister,
    R: nshnet::backend::NameResolver,
    T: nshnet::backend::TransferClient,
    W: nshnet::backend::WebClient,
{
    let mut out = io::stdout().lock();
    match command {
        Command::Ifconfig(cmd) => cmd.run(ctx, &mut out).await,
        Command::Ifup(cmd) => cmd.run(ctx, true, &mut out).await,
        Command::Ifdown(cmd) => cmd.run(ctx, false, &mut out).await,
        Command::Arp(cmd) => cmd.run(ctx, &mut out).await,
        Command::Get(cmd) => cmd.get(ctx).await,
        Command::Put(cmd) => cmd.put(ctx).await,
        Command::Wget(cmd) => cmd.run(ctx).await,
        Command::Nslookup(cmd) => cmd.run(ctx, &mut out).await,
    }
}
