// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, bail};
use clap::Parser;
use cmd::config::{Cli, Commands};
use cmd::proto::FileChunkResponseStatus;
use cmd::{client, server};
use diagnostics::*;

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            log_debug!(
                "serve: {addr}:{port} into {dir}",
                addr: args.bind_addr.clone(),
                port: args.bind_port,
                dir: args.upload_dir.display().to_string()
            );
            server::serve(&args).await
        }
        Commands::Upload(args) => {
            let response = client::upload_file(&args.endpoint, &args.file, args.chunk_size).await?;

            #[allow(clippy::print_stdout)]
            {
                println!("{}", response.message);
            }

            if response.status() != FileChunkResponseStatus::Ok {
                bail!("upload of {} failed: {}", args.file.display(), response.message);
            }
            Ok(())
        }
    }
}
