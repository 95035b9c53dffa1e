//! nshnet get/put/wget command implementations.

use clap::{ArgAction, Args};
use nshnet::backend::{TransferClient, WebClient};
use nshnet::transfer::{self, TransferArgs, TransferMode, WgetArgs};
use tracing::info;

use super::{Context, cwd};

/// `get`/`put` options. `-h` names the server, so help is `--help` only.
#[derive(Args)]
#[command(disable_help_flag = true)]
pub struct TransferCmd {
    /// Binary (octet) transfer.
    #[arg(short = 'b', overrides_with = "text")]
    binary: bool,

    /// Text (netascii) transfer. This is the default.
    #[arg(short = 'n', overrides_with = "binary")]
    text: bool,

    /// Destination path. Defaults to the last component of the source.
    #[arg(short = 'f', value_name = "DEST")]
    dest: Option<String>,

    /// TFTP server address.
    #[arg(short = 'h', value_name = "HOST")]
    host: Option<String>,

    /// Source path.
    operands: Vec<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl TransferCmd {
    fn mode(&self) -> TransferMode {
        if self.binary {
            TransferMode::Binary
        } else {
            TransferMode::Text
        }
    }

    fn args(&self, command: &'static str) -> nshnet::Result<TransferArgs<'_>> {
        TransferArgs::parse(
            command,
            self.mode(),
            self.dest.as_deref(),
            self.host.as_deref(),
            &self.operands,
        )
    }

    pub async fn get<D, L, R, T, W>(self, ctx: &Context<'_, D, L, R, T, W>) -> anyhow::Result<()>
    where
        T: TransferClient,
    {
        let args = self.args("get")?;
        transfer::get(ctx.transfer, &args, &cwd()?).await?;
        Ok(())
    }

    pub async fn put<D, L, R, T, W>(self, ctx: &Context<'_, D, L, R, T, W>) -> anyhow::Result<()>
    where
        T: TransferClient,
    {
        let args = self.args("put")?;
        transfer::put(ctx.transfer, &args, &cwd()?).await?;
        Ok(())
    }
}

#[derive(Args)]
pub struct WgetCmd {
    /// Local file. Defaults to the last component of the URL.
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<String>,

    /// URL to download.
    operands: Vec<String>,
}

impl WgetCmd {
    pub async fn run<D, L, R, T, W>(self, ctx: &Context<'_, D, L, R, T, W>) -> anyhow::Result<()>
    where
        W: WebClient,
    {
        let args = WgetArgs::parse(self.output.as_deref(), &self.operands)?;
        let written = transfer::wget(ctx.web, &args, &cwd()?).await?;
        info!(url = args.url, bytes = written, "downloaded");
        Ok(())
    }
}
