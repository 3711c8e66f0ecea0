use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use lima_fetch::image::{ImageCandidate, fetch_image};
use lima_fetch::{Digest, DownloadOptions, DownloadResult, download};
use lima_platform::arch::{self, Arch};
use tracing::info;

use crate::ui;

/// Download a disk image or other artifact, verify it, and cache it by digest.
#[derive(Clone, Debug, Parser)]
#[command(name = "lima-fetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Local paths or http(s) URLs. Several locations are tried in order as mirrors.
    #[arg(required = true, value_name = "LOCATION")]
    pub locations: Vec<String>,

    /// Destination file. Omit to only populate the cache.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Expected digest, as algorithm:hex.
    #[arg(long, value_name = "DIGEST")]
    pub digest: Option<Digest>,

    #[arg(long, value_name = "DIR", conflicts_with = "cache")]
    pub cache_dir: Option<PathBuf>,

    /// Use the per-user cache directory.
    #[arg(long)]
    pub cache: bool,

    /// Architecture the locations provide. Defaults to the host.
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn options(&self) -> DownloadOptions {
        let mut options = DownloadOptions::default();
        if let Some(digest) = &self.digest {
            options = options.expected_digest(digest.clone());
        }
        if let Some(dir) = &self.cache_dir {
            options = options.cache_dir(dir);
        } else if self.cache {
            options = options.default_cache();
        }
        options
    }

    pub fn run(self) -> Result<()> {
        let bar = ui::transfer_bar(!self.json);
        let options = self.options().on_progress(ui::progress_callback(bar.clone()));
        let destination = self.output.clone().unwrap_or_default();

        let result = match self.locations.as_slice() {
            [location] => download(&destination, location, options)
                .with_context(|| format!("failed to download {location}"))?,
            locations => {
                let arch = self.arch.or_else(arch::detect).with_context(|| {
                    format!("unsupported host architecture {}, pass --arch", std::env::consts::ARCH)
                })?;
                let candidates: Vec<ImageCandidate> = locations
                    .iter()
                    .map(|location| ImageCandidate {
                        location: location.clone(),
                        arch,
                        digest: self.digest.clone(),
                    })
                    .collect();
                let (index, result) = fetch_image(&destination, &candidates, arch, &options)?;
                info!("used {}", candidates[index].location);
                result
            }
        };
        bar.finish_and_clear();

        self.report(&result)
    }

    fn report(&self, result: &DownloadResult) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(result)?);
            return Ok(());
        }
        match result.cache_path() {
            Some(entry) => println!("{} ({})", result.status, entry.display()),
            None => println!("{}", result.status),
        }
        Ok(())
    }
}
