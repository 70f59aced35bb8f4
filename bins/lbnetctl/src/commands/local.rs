//! local and default-iface commands.

use clap::Args;

use super::Handle;
use crate::output::{Lines, OutputOptions, print};

#[derive(Args)]
pub struct LocalCmd {
    /// Only addresses on this device.
    #[arg(long, short)]
    dev: Option<String>,

    /// Skip addresses on this device. Ignored with --dev.
    #[arg(long, short)]
    exclude: Option<String>,
}

impl LocalCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        let addresses = handle.get_local_addresses(self.dev.as_deref(), self.exclude.as_deref())?;
        print(&Lines(addresses.into_iter().collect()), opts)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct DefaultIfaceCmd {}

impl DefaultIfaceCmd {
    pub fn run(self, handle: &Handle, opts: &OutputOptions) -> anyhow::Result<()> {
        let iface = handle.get_default_interface()?;
        print(&Lines(vec![iface]), opts)?;
        Ok(())
    }
}
