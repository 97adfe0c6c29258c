// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Upload - streaming ingestion and JSON mutation
//!
//! An [`UploadSession`] drains a [`ChunkSource`] into a sink obtained from a
//! [`sinkfs::SinkFactory`], rewinds it, hands it to a [`Mutator`] (the JSON
//! [`transform`] in production) writing a second sink, and produces exactly
//! one [`UploadReport`] for the caller.

pub mod chunk;
mod error;
pub mod mutate;
mod mutator;
mod session;
mod source;


pub use chunk::{PAGE_SIZE, write_chunk};
pub use error::{BoxError, SessionError, TransformError, WriteError};
pub use mutate::{mutate_document, transform};
pub use mutator::{JsonMutator, Mutator, ScriptedMutator};
pub use session::{ReportStatus, SessionState, UploadReport, UploadSession};
pub use source::ChunkSource;
