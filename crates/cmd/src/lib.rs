// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod client;
pub mod config;
pub mod proto;
pub mod server;
