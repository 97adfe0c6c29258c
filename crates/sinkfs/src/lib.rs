// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! SinkFS -- destinations for uploaded content
//!
//! A [`Sink`] is a read/write/seek/close handle owned by exactly one upload
//! session. A [`SinkFactory`] hands out sinks on demand. Two factories are
//! provided:
//!
//! - [`HostSinkFactory`] creates plain files in a host directory.
//! - [`MemorySinkFactory`] keeps content in memory and can inject failures
//!   at creation, write, read and seek time. Used by tests.

mod error;
mod host;
mod memory;
mod sink;

pub use error::{Error, Result};
pub use host::{HostSink, HostSinkFactory};
pub use memory::{Faults, MemoryRecord, MemorySink, MemorySinkFactory};
pub use sink::{SessionId, Sink, SinkFactory, SinkKind};
