//! addr command: bind, unbind and list service addresses.

use clap::{Args, Subcommand};

use super::Handle;
use crate::output::{Lines, Outcome, OutputOptions, print};

#[derive(Args)]
pub struct AddressCmd {
    #[command(subcommand)]
    action: AddressAction,
}

#[derive(Subcommand)]
enum AddressAction {
    /// Bind an address (as /32 or /128) to a device.
    Bind {
        /// IP address without prefix.
        address: String,

        /// Device name.
        #[arg(long, short)]
        dev: String,
    },

    /// Remove an address from a device.
    Unbind {
        /// IP address without prefix.
        address: String,

        /// Device name.
        #[arg(long, short)]
        dev: String,
    },

    /// List addresses bound to a device.
    #[command(visible_alias = "show")]
    List {
        /// Device name.
        dev: String,
    },
}

impl AddressCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        match self.action {
            AddressAction::Bind { address, dev } => {
                let existed = handle.ensure_address_bind(&address, &dev)?;
                print(
                    &Outcome::new(format!("{address} on {dev}"), "bound").already(existed),
                    opts,
                )?;
            }
            AddressAction::Unbind { address, dev } => {
                handle.unbind_address(&address, &dev)?;
                print(&Outcome::new(format!("{address} on {dev}"), "unbound"), opts)?;
            }
            AddressAction::List { dev } => {
                print(&Lines(handle.list_bound_addresses(&dev)?), opts)?;
            }
        }
        Ok(())
    }
}
