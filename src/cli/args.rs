// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "k8pick")]
#[command(author, version, about = "Pick Kubernetes manifest deploy targets")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Account (kubeconfig context) to start the session with
    #[arg(short, long)]
    pub account: Option<String>,

    /// Namespace to start the session with
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Resource kind to start the session with
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Application export (JSON) supplying server groups for dynamic mode
    #[arg(long, value_name = "FILE")]
    pub app: Option<String>,

    /// Restrict offered kinds to these logical kinds (repeatable).
    /// Examples: --logical-kind serverGroups --logical-kind loadBalancers
    #[arg(long = "logical-kind", value_name = "LOGICAL_KIND")]
    pub logical_kinds: Vec<String>,

    /// Output format for one-shot commands
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Omit column headers in output
    #[arg(long)]
    pub no_headers: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive editing session
    Interactive,

    /// One-shot candidate search for a (kind, namespace, account) triple
    Search {
        /// Account to search on
        #[arg(short, long)]
        account: String,

        /// Namespace to search in
        #[arg(short, long)]
        namespace: String,

        /// Resource kind to search for
        #[arg(short, long)]
        kind: String,
    },

    /// List known accounts with their discovery summary
    Accounts,
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
}
