// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

pub mod pipeline;
pub mod service;

pub use pipeline::{SearchPipeline, SearchQuery, SearchState};
pub use service::{AccountDetails, AccountDirectory, KindSearchHit, KindSearchService};
