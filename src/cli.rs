#![forbid(unsafe_code)]

use clap::Parser;
use std::path::PathBuf;

use crate::pack::{self, Compression, PackError, PackRequest, PackResult};

#[derive(Debug, Parser)]
#[command(
    name = "binzip",
    version,
    about = "Pack binary and files together",
    override_usage = "binzip [OPTIONS] <static files...> <binary> <output>"
)]
pub struct Cli {
    /// Asset files or directories, then the binary, then the output path.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Accepted for compatibility; does nothing.
    #[arg(short, long)]
    pub toggle: bool,

    /// Store entries without compression.
    #[arg(long, default_value_t = false)]
    pub store: bool,

    /// Deflate level (0..=9). Ignored with --store.
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Also write explicit entries for directories.
    #[arg(long, default_value_t = false)]
    pub dirs: bool,

    /// Print the archive index of the output after packing.
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

/// A validated command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request: PackRequest,
    pub list: bool,
}

impl TryFrom<Cli> for Invocation {
    type Error = PackError;

    /// The last path is the output, the one before it the binary, the rest
    /// are assets. At least one asset is required.
    fn try_from(cli: Cli) -> PackResult<Self> {
        let mut paths = cli.paths;
        if paths.len() < 3 {
            return Err(PackError::Usage);
        }
        let (Some(output), Some(binary)) = (paths.pop(), paths.pop()) else {
            return Err(PackError::Usage);
        };

        let compression = if cli.store {
            Compression::Stored
        } else {
            Compression::Deflated(cli.level)
        };

        Ok(Invocation {
            request: PackRequest {
                assets: paths,
                binary,
                output,
                compression,
                include_dirs: cli.dirs,
            },
            list: cli.list,
        })
    }
}

pub fn run(inv: Invocation) -> PackResult<()> {
    pack::pack(&inv.request)?;
    if inv.list {
        pack::list(&inv.request.output)?;
    }
    Ok(())
}
