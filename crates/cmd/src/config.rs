// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Command line and environment configuration

use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "filestream")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Accept streamed uploads and store them with their JSON mutation
    Serve(ServeArgs),
    /// Stream a local file to a running server
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host or address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// Port to listen on
    #[arg(long, env = "BIND_PORT", default_value_t = 8888)]
    pub bind_port: u16,

    /// Directory receiving uploaded and mutated files
    #[arg(long, env = "UPLOAD_DIR", default_value = ".")]
    pub upload_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Server endpoint
    #[arg(long, env = "FILESTREAM_ENDPOINT", default_value = "http://127.0.0.1:8888")]
    pub endpoint: String,

    /// Payload bytes per streamed chunk
    #[arg(long, default_value = "65536")]
    pub chunk_size: NonZeroUsize,
}
