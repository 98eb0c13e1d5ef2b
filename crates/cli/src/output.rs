// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render one value; JSON is a single line so scripts can read it line by line
pub fn render<T: Serialize + Display>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => value.to_string(),
        OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Render a list: one line per item as text, one JSON array otherwise
pub fn render_list<T: Serialize + Display>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string(items).unwrap_or_default(),
    }
}

pub fn print<T: Serialize + Display>(value: &T, format: OutputFormat) {
    println!("{}", render(value, format));
}

pub fn print_list<T: Serialize + Display>(items: &[T], format: OutputFormat) {
    let rendered = render_list(items, format);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}
