// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The mutation step a session runs once its upload is complete.

use crate::error::TransformError;
use crate::mutate::transform;
use async_trait::async_trait;
use sinkfs::Sink;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Turns the rewound upload into the content of the mutation sink
#[async_trait]
pub trait Mutator: Send + Sync {
    async fn mutate(&self, input: &mut dyn Sink, output: &mut dyn Sink) -> Result<(), TransformError>;
}

/// The JSON key-drop and numeric-bump pass of [`transform`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMutator;

#[async_trait]
impl Mutator for JsonMutator {
    async fn mutate(&self, input: &mut dyn Sink, output: &mut dyn Sink) -> Result<(), TransformError> {
        transform(input, output).await
    }
}

/// A mutator with a fixed outcome. Records the input it was handed.
#[derive(Debug, Clone)]
pub struct ScriptedMutator {
    output: Option<Vec<u8>>,
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedMutator {
    /// Writes `output` to the mutation sink
    #[must_use]
    pub fn succeeding(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: Some(output.into()),
            seen: Arc::default(),
        }
    }

    /// Reads the upload, then fails without writing
    #[must_use]
    pub fn failing() -> Self {
        Self {
            output: None,
            seen: Arc::default(),
        }
    }

    /// Inputs read so far, one per call
    #[must_use]
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Mutator for ScriptedMutator {
    async fn mutate(&self, input: &mut dyn Sink, output: &mut dyn Sink) -> Result<(), TransformError> {
        let mut contents = Vec::new();
        _ = input
            .read_to_end(&mut contents)
            .await
            .map_err(TransformError::Read)?;
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(contents);

        let Some(bytes) = &self.output else {
            return Err(TransformError::Injected("mutate"));
        };
        output.write_all(bytes).await.map_err(TransformError::Write)?;
        output.flush().await.map_err(TransformError::Write)
    }
}
