//! Prints the text the uploader would extract from each file given on the command line.

use anyhow::{bail, Context};
use clap::Parser;
use objective_studio::extract::{extract_text, FileDescriptor};
use objective_studio::logging::init_logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "extract-text", about = "Print the text extracted from course documents")]
struct Args {
    /// Files to extract
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Declared media type, overriding the guess from each file's extension
    #[arg(long = "type")]
    media_type: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging("objective_studio=warn");

    let mut failures = 0;
    for path in &args.paths {
        let mut file =
            FileDescriptor::from_path(path).with_context(|| format!("reading {}", path.display()))?;
        if let Some(media_type) = &args.media_type {
            file.media_type = media_type.clone();
        }
        match extract_text(&file) {
            Ok(text) => {
                if args.paths.len() > 1 {
                    println!("==> {} <==", path.display());
                }
                println!("{}", text);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {} ({})", path.display(), e, e.reason());
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} files could not be extracted", failures, args.paths.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_override_and_paths_parse() {
        let args =
            Args::try_parse_from(["extract-text", "a.txt", "b.html", "--type", "text/plain"])
                .unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("a.txt"), PathBuf::from("b.html")]);
        assert_eq!(args.media_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn at_least_one_path_is_required() {
        assert!(Args::try_parse_from(["extract-text"]).is_err());
    }
}
