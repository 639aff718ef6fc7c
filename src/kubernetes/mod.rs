// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod client;
pub mod discovery;

pub use client::{AccountPool, KUBERNETES_PROVIDER};
