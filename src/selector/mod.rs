// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod controller;
pub mod modes;
pub mod record;

pub use controller::{OnChange, SelectorController};
pub use record::{Selector, SelectorMode};
