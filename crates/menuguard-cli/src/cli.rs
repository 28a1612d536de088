//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "menuguard", version)]
#[command(about = "Allergen detection and menu safety classification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lexicon directory, overriding configuration
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan one item or ingredient label
    Scan {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Recognized text to scan
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// OCR quality of the text, 0.0-1.0
        #[arg(short, long, default_value = "1.0")]
        quality: f32,

        /// Label reported with the result
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Scan a menu file, one item per non-blank line
    Menu {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Menu text file
        #[arg(short, long)]
        file: PathBuf,

        /// OCR quality applied to every line, 0.0-1.0
        #[arg(short, long, default_value = "1.0")]
        quality: f32,
    },

    /// Validate the lexicon and print a summary
    Lexicon,

    /// Print the effective configuration
    Config {
        /// Write it to the platform config file
        #[arg(long)]
        save: bool,
    },
}

/// Where the user's allergen sensitivities come from.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Allergen profile TOML file
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Add an allergen at its default severity (repeatable)
    #[arg(short = 'a', long = "allergen", value_name = "ID")]
    pub allergens: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_text() {
        let cli = Cli::try_parse_from([
            "menuguard",
            "scan",
            "--profile",
            "me.toml",
            "--text",
            "peanut satay",
            "--quality",
            "0.8",
        ])
        .expect("parse scan");

        match cli.command {
            Commands::Scan {
                profile,
                text,
                file,
                quality,
                label,
            } => {
                assert_eq!(profile.profile, Some(PathBuf::from("me.toml")));
                assert_eq!(text.as_deref(), Some("peanut satay"));
                assert!(file.is_none());
                assert!((quality - 0.8).abs() < f32::EPSILON);
                assert!(label.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_scan_requires_text_or_file() {
        assert!(Cli::try_parse_from(["menuguard", "scan"]).is_err());
        assert!(Cli::try_parse_from([
            "menuguard", "scan", "--text", "a", "--file", "b.txt"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_menu_with_allergens_and_globals() {
        let cli = Cli::try_parse_from([
            "menuguard",
            "menu",
            "-f",
            "menu.txt",
            "-a",
            "peanuts",
            "-a",
            "milk",
            "--lexicon",
            "/srv/lexicon",
        ])
        .expect("parse menu");

        assert_eq!(cli.lexicon, Some(PathBuf::from("/srv/lexicon")));
        match cli.command {
            Commands::Menu {
                profile,
                file,
                quality,
            } => {
                assert_eq!(profile.allergens, vec!["peanuts", "milk"]);
                assert_eq!(file, PathBuf::from("menu.txt"));
                assert!((quality - 1.0).abs() < f32::EPSILON);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_save() {
        let cli = Cli::try_parse_from(["menuguard", "config", "--save"]).expect("parse config");
        assert!(matches!(cli.command, Commands::Config { save: true }));
    }
}
