//! Command line arguments

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_SAMPLE_COUNT: usize = 200;

pub const USAGE: &str = "usage: llm-dashboard [FILE.json]\n       llm-dashboard --write-sample PATH [COUNT]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Open the dashboard, optionally loading a file right away
    Dashboard { file: Option<PathBuf> },
    /// Write a generated dataset to `path` and exit
    WriteSample { path: PathBuf, count: usize },
    Help,
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<LaunchMode> {
    let mut args = args.into_iter();

    let Some(first) = args.next() else {
        return Ok(LaunchMode::Dashboard { file: None });
    };

    let mode = match first.as_str() {
        "-h" | "--help" => LaunchMode::Help,
        "--write-sample" => {
            let path = args.next().context("--write-sample needs an output path")?;
            let count = match args.next() {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("sample count must be a number, got {raw:?}"))?,
                None => DEFAULT_SAMPLE_COUNT,
            };
            LaunchMode::WriteSample {
                path: PathBuf::from(path),
                count,
            }
        }
        flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
        file => LaunchMode::Dashboard {
            file: Some(PathBuf::from(file)),
        },
    };

    if let Some(extra) = args.next() {
        bail!("unexpected argument {extra:?}\n{USAGE}");
    }
    Ok(mode)
}
