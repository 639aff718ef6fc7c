// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use comfy_table::{Table, presets::ASCII_BORDERS_ONLY_CONDENSED};

use super::Listing;

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &Listing, no_headers: bool) -> String {
        if result.rows.is_empty() {
            return "(0 rows)".to_string();
        }

        let mut table = Table::new();
        // ASCII_BORDERS_ONLY_CONDENSED is close to psql style
        table.load_preset(ASCII_BORDERS_ONLY_CONDENSED);

        if !no_headers {
            table.set_header(&result.columns);
        }

        for row in &result.rows {
            table.add_row(row);
        }

        let output = table.to_string();
        format!("{}\n({} rows)", output, result.rows.len())
    }
}
