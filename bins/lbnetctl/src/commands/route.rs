//! route command: device routes for service subnets.

use std::io::{self, Write};

use clap::{Args, Subcommand};
use lbnet::Route;

use super::Handle;
use crate::output::{Outcome, OutputOptions, Printable, print};

#[derive(Args)]
pub struct RouteCmd {
    #[command(subcommand)]
    action: RouteAction,
}

#[derive(Subcommand)]
enum RouteAction {
    /// Show the route that would be installed, without installing it.
    Get {
        /// Subnet in CIDR notation.
        subnet: String,

        /// Device name.
        #[arg(long, short)]
        dev: String,
    },

    /// Add a route unless it exists.
    Add {
        /// Subnet in CIDR notation.
        subnet: String,

        /// Device name.
        #[arg(long, short)]
        dev: String,
    },

    /// Delete a route. Fails if it does not exist.
    Del {
        /// Subnet in CIDR notation.
        subnet: String,

        /// Device name.
        #[arg(long, short)]
        dev: String,
    },
}

/// A built route together with the device name it was resolved from.
struct RouteView<'a> {
    route: Route,
    dev: &'a str,
}

impl Printable for RouteView<'_> {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(
            w,
            "{} dev {} scope {}",
            self.route.destination, self.dev, self.route.scope
        )
    }

    fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::to_value(&self.route).unwrap_or_default();
        if let Some(map) = json.as_object_mut() {
            map.insert("dev".to_owned(), self.dev.into());
        }
        json
    }
}

impl RouteCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        match self.action {
            RouteAction::Get { subnet, dev } => {
                let route = handle.get_route(&subnet, &dev)?;
                print(&RouteView { route, dev: &dev }, opts)?;
            }
            RouteAction::Add { subnet, dev } => {
                handle.ensure_route_add(&subnet, &dev)?;
                print(&Outcome::new(format!("{subnet} dev {dev}"), "present"), opts)?;
            }
            RouteAction::Del { subnet, dev } => {
                handle.delete_route(&subnet, &dev)?;
                print(&Outcome::new(format!("{subnet} dev {dev}"), "deleted"), opts)?;
            }
        }
        Ok(())
    }
}
