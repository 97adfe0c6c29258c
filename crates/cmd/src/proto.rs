// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the `filestream.FileUploader` service.
//!
//! ```proto
//! service FileUploader {
//!   rpc UploadFile(stream FileChunk) returns (FileChunkResponse);
//! }
//! message FileChunk { bytes data = 1; }
//! message FileChunkResponse { string message = 1; Status status = 2; }
//! enum Status { ok = 0; error = 1; }
//! ```

use upload::{ReportStatus, UploadReport};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileChunk {
    #[prost(bytes = "bytes", tag = "1")]
    pub data: ::prost::bytes::Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileChunkResponse {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
    #[prost(enumeration = "FileChunkResponseStatus", tag = "2")]
    pub status: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FileChunkResponseStatus {
    Ok = 0,
    Error = 1,
}

/// Generated gRPC bindings
#[allow(clippy::all)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/filestream.FileUploader.rs"));
}

pub use generated::file_uploader_client::FileUploaderClient;
pub use generated::file_uploader_server::{FileUploader, FileUploaderServer};

impl From<UploadReport> for FileChunkResponse {
    fn from(report: UploadReport) -> Self {
        let status = match report.status {
            ReportStatus::Ok => FileChunkResponseStatus::Ok,
            ReportStatus::Error => FileChunkResponseStatus::Error,
        };
        Self {
            message: report.message.to_string(),
            status: status as i32,
        }
    }
}
