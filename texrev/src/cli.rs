//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use texrev_core::types::Alignment;

use crate::app::View;

/// Review an AI-suggested rewrite of a LaTeX document, line by line.
#[derive(Debug, Parser)]
#[command(name = "texrev", version, about)]
pub struct Args {
    /// The document the suggestion would replace. Accepting writes to this file.
    pub current: PathBuf,

    /// File holding the suggested text.
    pub suggested: PathBuf,

    /// What the suggestion was asked to do; shown above the diff.
    #[arg(long, short, default_value = "Suggested changes")]
    pub prompt: String,

    /// Initial layout. Overrides `view` in the config file.
    #[arg(long, value_enum)]
    pub view: Option<View>,

    /// Row pairing strategy. Overrides `alignment` in the config file.
    #[arg(long, value_enum)]
    pub alignment: Option<AlignmentArg>,

    /// Print the unified diff and statistics to stdout instead of opening the UI.
    #[arg(long)]
    pub print: bool,
}

/// `--alignment` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignmentArg {
    Positional,
    Lcs,
}

impl From<AlignmentArg> for Alignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Positional => Alignment::Positional,
            AlignmentArg::Lcs => Alignment::Lcs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "texrev",
            "main.tex",
            "fixed.tex",
            "--view",
            "unified",
            "--alignment",
            "lcs",
            "--print",
        ])
        .unwrap();
        assert_eq!(args.current, PathBuf::from("main.tex"));
        assert_eq!(args.view, Some(View::Unified));
        assert_eq!(args.alignment.map(Alignment::from), Some(Alignment::Lcs));
        assert!(args.print);
        assert_eq!(args.prompt, "Suggested changes");
    }

    #[test]
    fn both_paths_are_required() {
        assert!(Args::try_parse_from(["texrev", "main.tex"]).is_err());
    }
}
