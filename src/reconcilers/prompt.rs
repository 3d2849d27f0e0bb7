// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Interactive confirmation for `push -i`.

use async_trait::async_trait;
use std::sync::{LazyLock, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin};
use tracing::warn;

/// One buffered stdin reader for the whole process, so input typed ahead of
/// a prompt is not lost with a dropped buffer.
static STDIN: LazyLock<tokio::sync::Mutex<BufReader<Stdin>>> =
    LazyLock::new(|| tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin())));

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Yes,
    No,
    /// Skip this and every remaining correction of the run
    SkipRest,
}

impl Confirm {
    /// Parse a typed answer; anything unrecognized is `No`.
    #[must_use]
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            "s" | "skip" => Self::SkipRest,
            _ => Self::No,
        }
    }
}

/// Asks whether a correction should run.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, msg: &str) -> Confirm;
}

/// Write the question for `msg` to `out` and read one answer line from
/// `input`. End of input skips the rest of the run.
async fn ask<R, W>(input: &mut R, out: &mut W, msg: &str) -> Confirm
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let question = format!("Run \"{msg}\"? [y/N/s(kip rest)] ");
    if let Err(e) = out.write_all(question.as_bytes()).await {
        warn!(error = %e, "Failed to write confirmation prompt");
        return Confirm::No;
    }
    if let Err(e) = out.flush().await {
        warn!(error = %e, "Failed to flush confirmation prompt");
    }

    let mut line = String::new();
    match input.read_line(&mut line).await {
        Ok(0) => Confirm::SkipRest,
        Ok(_) => Confirm::from_answer(&line),
        Err(e) => {
            warn!(error = %e, "Failed to read confirmation answer");
            Confirm::SkipRest
        }
    }
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompter;

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn confirm(&self, msg: &str) -> Confirm {
        let mut stdin = STDIN.lock().await;
        ask(&mut *stdin, &mut tokio::io::stderr(), msg).await
    }
}

/// Replays a fixed list of answers, then answers `No`.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<Vec<Confirm>>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Confirm>) -> Self {
        let mut answers: Vec<Confirm> = answers.into_iter().collect();
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, _msg: &str) -> Confirm {
        self.answers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop()
            .unwrap_or(Confirm::No)
    }
}
