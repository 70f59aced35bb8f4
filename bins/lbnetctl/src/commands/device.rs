//! dummy and xfrm interface commands.

use clap::{Args, Subcommand};

use super::Handle;
use crate::output::{Outcome, OutputOptions, print};

#[derive(Args)]
pub struct DummyCmd {
    #[command(subcommand)]
    action: DummyAction,
}

#[derive(Subcommand)]
enum DummyAction {
    /// Create the dummy interface unless it exists.
    Ensure {
        /// Interface name.
        name: String,
    },

    /// Delete the dummy interface if it exists.
    #[command(visible_alias = "del")]
    Delete {
        /// Interface name.
        name: String,
    },
}

impl DummyCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        let outcome = match self.action {
            DummyAction::Ensure { name } => {
                let existed = handle.ensure_dummy_device(&name)?;
                Outcome::new(name, "present").already(existed)
            }
            DummyAction::Delete { name } => {
                handle.delete_dummy_device(&name)?;
                Outcome::new(name, "absent")
            }
        };
        print(&outcome, opts)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct XfrmCmd {
    #[command(subcommand)]
    action: XfrmAction,
}

#[derive(Subcommand)]
enum XfrmAction {
    /// Create the xfrm interface unless it exists, and bring it up.
    Ensure {
        /// Interface name.
        name: String,

        /// xfrm interface id matched by IPsec policies.
        #[arg(long)]
        if_id: u32,
    },

    /// Delete the xfrm interface if it exists.
    #[command(visible_alias = "del")]
    Delete {
        /// Interface name.
        name: String,
    },
}

impl XfrmCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        let outcome = match self.action {
            XfrmAction::Ensure { name, if_id } => {
                handle.ensure_xfrm_interface(&name, if_id)?;
                Outcome::new(name, "up")
            }
            XfrmAction::Delete { name } => {
                handle.delete_xfrm_interface(&name)?;
                Outcome::new(name, "absent")
            }
        };
        print(&outcome, opts)?;
        Ok(())
    }
}
