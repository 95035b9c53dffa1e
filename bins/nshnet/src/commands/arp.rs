//! nshnet arp command implementation.

use std::io::Write;

use clap::Args;
use nshnet::arp::{self, ArpFlag, ArpOutcome};
use nshnet::backend::ArpTable;

use super::Context;
use crate::output;

#[derive(Args)]
pub struct ArpCmd {
    /// Show the mapping for an address (all mappings without one).
    #[arg(short = 'a', conflicts_with_all = ["delete", "set"])]
    get: bool,

    /// Delete the mapping for an address.
    #[arg(short = 'd', conflicts_with = "set")]
    delete: bool,

    /// Set the mapping of an address to a hardware address.
    #[arg(short = 's')]
    set: bool,

    /// Restrict the command to one interface.
    #[arg(short = 'i', value_name = "IFNAME")]
    ifname: Option<String>,

    /// `<ipaddr>` or `<ipaddr> <hwaddr>`.
    operands: Vec<String>,
}

impl ArpCmd {
    fn flag(&self) -> ArpFlag {
        if self.get {
            ArpFlag::Get
        } else if self.delete {
            ArpFlag::Delete
        } else if self.set {
            ArpFlag::Set
        } else {
            ArpFlag::None
        }
    }

    pub async fn run<D, L, R, T, W>(
        self,
        ctx: &Context<'_, D, L, R, T, W>,
        out: &mut impl Write,
    ) -> anyhow::Result<()>
    where
        D: ArpTable,
    {
        let outcome = arp::run(
            ctx.config,
            ctx.settings.arp_table_size,
            self.flag(),
            self.ifname.as_deref(),
            &self.operands,
        )
        .await?;

        match outcome {
            ArpOutcome::Listing(entries) => output::print_arp_table(out, &entries)?,
            ArpOutcome::Mapping(mac) => output::print_hwaddr(out, &mac)?,
            ArpOutcome::Deleted | ArpOutcome::Set => {}
        }
        Ok(())
    }
}
