//! Where channel names come from: a newline-delimited list file for batch
//! runs, or two questions on the terminal for interactive runs.

use std::path::Path;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Largest clip count the clips endpoint returns in one page
const MAX_CLIP_COUNT: u8 = 100;

pub async fn read_channels(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read channel list file {}", path.display()))?;

    Ok(parse_channels(&contents))
}

/// One channel per line; surrounding whitespace and blank lines are ignored.
pub fn parse_channels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Asks for a channel name and how many clips to download.
pub async fn prompt_channel_and_count<R, W>(mut input: R, mut output: W) -> anyhow::Result<(String, u8)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let channel = loop {
        let answer = ask(&mut input, &mut output, "Enter the Twitch channel name: ").await?;
        if !answer.is_empty() {
            break answer;
        }
    };

    let count = loop {
        let answer = ask(&mut input, &mut output, "How many clips do you want to download? ").await?;
        match answer.parse::<u32>() {
            Ok(n) if n > 0 => break n.min(u32::from(MAX_CLIP_COUNT)) as u8,
            _ => {
                output
                    .write_all(b"Please enter a positive whole number.\n")
                    .await?;
            }
        }
    };

    Ok((channel, count))
}

async fn ask<R, W>(input: &mut R, output: &mut W, question: &str) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(question.as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        bail!("Input closed before an answer was given");
    }
    Ok(line.trim().to_string())
}
