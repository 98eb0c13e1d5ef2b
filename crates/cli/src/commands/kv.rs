// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value commands: get, put, delete

use serde::Serialize;
use std::fmt;

use crate::client::{ClientError, NodeClient};
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
pub struct ValueOutput {
    pub key: String,
    pub value: Option<String>,
}

impl fmt::Display for ValueOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "(not found)"),
        }
    }
}

#[derive(Serialize)]
pub struct WrittenOutput {
    pub op: &'static str,
    pub key: String,
    pub index: u64,
}

impl fmt::Display for WrittenOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at index {}", self.op, self.key, self.index)
    }
}

pub async fn get(client: &NodeClient, key: String, format: OutputFormat) -> Result<(), ClientError> {
    let value = client.get(&key).await?;
    output::print(&ValueOutput { key, value }, format);
    Ok(())
}

pub async fn put(
    client: &NodeClient,
    key: String,
    value: String,
    format: OutputFormat,
) -> Result<(), ClientError> {
    let index = client.put(&key, &value).await?;
    output::print(
        &WrittenOutput {
            op: "put",
            key,
            index,
        },
        format,
    );
    Ok(())
}

pub async fn delete(
    client: &NodeClient,
    key: String,
    format: OutputFormat,
) -> Result<(), ClientError> {
    let index = client.delete(&key).await?;
    output::print(
        &WrittenOutput {
            op: "delete",
            key,
            index,
        },
        format,
    );
    Ok(())
}
