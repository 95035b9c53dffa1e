//! nshnet nslookup command implementation.

use std::io::Write;

use clap::Args;
use nshnet::backend::NameResolver;
use nshnet::nslookup;

use super::Context;
use crate::output;

#[derive(Args)]
pub struct NslookupCmd {
    /// Host name or address.
    hosts: Vec<String>,
}

impl NslookupCmd {
    pub async fn run<D, L, R, T, W>(
        self,
        ctx: &Context<'_, D, L, R, T, W>,
        out: &mut impl Write,
    ) -> anyhow::Result<()>
    where
        R: NameResolver,
    {
        let entries = nslookup::lookup(ctx.resolver, &self.hosts).await?;
        output::print_hosts(out, &entries)?;
        Ok(())
    }
}
