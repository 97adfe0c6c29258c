// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! gRPC server: binds `FileUploader` to upload sessions

use crate::config::ServeArgs;
use crate::proto::{
    FileChunk, FileChunkResponse, FileChunkResponseStatus, FileUploader, FileUploaderServer,
};
use anyhow::{Context, Result};
use diagnostics::*;
use futures::TryStreamExt;
use sinkfs::{HostSinkFactory, SinkFactory};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};
use upload::{JsonMutator, Mutator, UploadSession};

/// Runs one [`UploadSession`] per `UploadFile` call.
///
/// Failures are reported in the response body; the call itself never
/// returns a gRPC error status. Each session runs on its own task, so a
/// cancelled call still ends the session through its receive error and
/// closes the upload destination.
#[derive(Clone)]
pub struct UploadService {
    factory: Arc<dyn SinkFactory>,
    mutator: Arc<dyn Mutator>,
}

impl UploadService {
    #[must_use]
    pub fn new(factory: Arc<dyn SinkFactory>, mutator: Arc<dyn Mutator>) -> Self {
        Self { factory, mutator }
    }

    #[must_use]
    pub fn into_server(self) -> FileUploaderServer<Self> {
        FileUploaderServer::new(self)
    }
}

#[tonic::async_trait]
impl FileUploader for UploadService {
    async fn upload_file(
        &self,
        request: Request<Streaming<FileChunk>>,
    ) -> Result<Response<FileChunkResponse>, Status> {
        let remote = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        debug!("upload call from {remote}", remote: remote);

        let factory = self.factory.clone();
        let mutator = self.mutator.clone();
        let mut chunks = Box::pin(request.into_inner().map_ok(|chunk| chunk.data));

        let session = tokio::spawn(async move {
            UploadSession::new(factory.as_ref(), mutator.as_ref())
                .run(&mut chunks)
                .await
        });

        let response = match session.await {
            Ok(report) => report.into(),
            Err(err) => {
                error!("upload session task failed: {cause}", cause: err.to_string());
                FileChunkResponse {
                    message: "internal server error".to_string(),
                    status: FileChunkResponseStatus::Error as i32,
                }
            }
        };
        Ok(Response::new(response))
    }
}

/// Serve uploads into `args.upload_dir` on `args.bind_addr:args.bind_port`
pub async fn serve(args: &ServeArgs) -> Result<()> {
    let factory = HostSinkFactory::new(args.upload_dir.clone())
        .await
        .with_context(|| format!("using upload directory {}", args.upload_dir.display()))?;

    let listener = TcpListener::bind((args.bind_addr.as_str(), args.bind_port))
        .await
        .with_context(|| format!("failed to listen on {}:{}", args.bind_addr, args.bind_port))?;

    let service = UploadService::new(Arc::new(factory), Arc::new(JsonMutator));
    serve_with_listener(listener, service).await
}

/// Serve uploads on an already bound listener
pub async fn serve_with_listener(listener: TcpListener, service: UploadService) -> Result<()> {
    let address = listener
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    info!("starting the gRPC server on {address}", address: address);

    Server::builder()
        .add_service(service.into_server())
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
        .context("gRPC server shutdown")
}
