//! lbnetctl - run lbnet reconciliation operations from the shell.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use lbnet::{HandleConfig, NetlinkHandle};

use crate::output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(
    name = "lbnetctl",
    version,
    about = "Idempotent load-balancer network reconciliation"
)]
struct Cli {
    /// Scan IPv6 local addresses instead of IPv4.
    #[arg(short = '6', global = true)]
    ipv6: bool,

    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    /// Operate inside a named network namespace.
    #[arg(long, value_name = "NAME", global = true)]
    netns: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage dummy interfaces.
    Dummy(commands::device::DummyCmd),

    /// Manage xfrm interfaces.
    Xfrm(commands::device::XfrmCmd),

    /// Bind and unbind service addresses.
    #[command(visible_alias = "a", visible_alias = "address")]
    Addr(commands::address::AddressCmd),

    /// Manage device routes.
    #[command(visible_alias = "r")]
    Route(commands::route::RouteCmd),

    /// List addresses owned by this host.
    Local(commands::local::LocalCmd),

    /// Show the outgoing interface of the default route.
    DefaultIface(commands::local::DefaultIfaceCmd),
}

impl Cli {
    fn config(&self) -> HandleConfig {
        let config = HandleConfig::new().ipv6(self.ipv6);
        match &self.netns {
            Some(name) => config.namespace(name),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let opts = OutputOptions {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        pretty: cli.pretty,
    };

    let result = NetlinkHandle::connect(cli.config())
        .map_err(anyhow::Error::from)
        .and_then(|handle| match cli.command {
            Command::Dummy(cmd) => cmd.run(&handle, &opts),
            Command::Xfrm(cmd) => cmd.run(&handle, &opts),
            Command::Addr(cmd) => cmd.run(&handle, &opts),
            Command::Route(cmd) => cmd.run(&handle, &opts),
            Command::Local(cmd) => cmd.run(&handle, &opts),
            Command::DefaultIface(cmd) => cmd.run(&handle, &opts),
        });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
