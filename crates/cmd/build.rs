// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Generates the FileUploader client and server. Message types are written
// by hand in src/proto.rs, so no protoc is needed at build time.

fn main() {
    let upload_file = tonic_build::manual::Method::builder()
        .name("upload_file")
        .route_name("UploadFile")
        .input_type("crate::proto::FileChunk")
        .output_type("crate::proto::FileChunkResponse")
        .codec_path("tonic::codec::ProstCodec")
        .client_streaming()
        .build();

    let service = tonic_build::manual::Service::builder()
        .name("FileUploader")
        .package("filestream")
        .method(upload_file)
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
