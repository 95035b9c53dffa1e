//! nshnet ifconfig command implementation.

use std::io::Write;

use clap::Args;
use nshnet::backend::{DeviceConfig, DeviceLister};
use nshnet::ifconfig::{self, IfconfigOutcome};

use super::Context;
use crate::output;

#[derive(Args)]
pub struct IfconfigCmd {
    /// Interface name followed by configuration options, e.g.
    /// `eth0 10.0.0.5/24 gw 10.0.0.1 dns 10.0.0.53`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl IfconfigCmd {
    pub async fn run<D, L, R, T, W>(
        self,
        ctx: &Context<'_, D, L, R, T, W>,
        out: &mut impl Write,
    ) -> anyhow::Result<()>
    where
        D: DeviceConfig,
        L: DeviceLister,
    {
        let tokens: Vec<String> = std::iter::once("ifconfig".to_string())
            .chain(self.args)
            .collect();

        let caps = &ctx.settings.capabilities;
        match ifconfig::run(&tokens, caps, ctx.config, ctx.lister).await? {
            IfconfigOutcome::Status {
                devices,
                statistics,
            } => {
                output::print_status(out, &devices)?;
                output::print_statistics(out, &statistics)?;
            }
            IfconfigOutcome::Configured => {}
        }
        Ok(())
    }
}
