//! nshnet ifup/ifdown command implementation.

use std::io::Write;

use clap::Args;
use nshnet::backend::{DeviceConfig, DeviceLister};
use nshnet::device::{self, LinkOutcome};

use super::Context;
use crate::output;

#[derive(Args)]
pub struct LinkCmd {
    /// Interface name. Without exactly one, the devices are listed.
    names: Vec<String>,
}

impl LinkCmd {
    pub async fn run<D, L, R, T, W>(
        self,
        ctx: &Context<'_, D, L, R, T, W>,
        up: bool,
        out: &mut impl Write,
    ) -> anyhow::Result<()>
    where
        D: DeviceConfig,
        L: DeviceLister,
    {
        let command = if up { "ifup" } else { "ifdown" };
        match device::set_link(ctx.config, ctx.lister, command, &self.names, up).await? {
            LinkOutcome::Choices(names) => output::print_choices(out, &names)?,
            LinkOutcome::Switched { ifname, failure } => {
                output::print_switched(out, command, &ifname, failure.is_none())?;
                if let Some(e) = failure {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}
