// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell completions for `rk`
//!
//! ```bash
//! rk completions zsh > ~/.zfunc/_rk
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Binary name completions are registered under
const BIN_NAME: &str = "rk";

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write completions for the CLI described by `C`
pub fn write_completions<C: CommandFactory>(shell: Shell, out: &mut dyn Write) {
    let mut cmd = C::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}
