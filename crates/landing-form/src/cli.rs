use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, check::CheckArgs, render::RenderArgs, submit::SubmitArgs, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "landing-form",
    about = "Render, validate and submit config-driven landing forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a form with optional data and errors
    Render(RenderArgs),
    /// Validate form data against a form config
    Validate(ValidateArgs),
    /// Load a form config and report suspicious declarations
    Check(CheckArgs),
    /// Validate, enrich and deliver a submission to the configured sinks
    Submit(SubmitArgs),
}

pub fn main() -> Result<()> {
    crate::logging::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => cmd::render::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Check(args) => cmd::check::run(args),
        Commands::Submit(args) => cmd::submit::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::render::RenderFormat;

    #[test]
    fn parses_render_subcommand() {
        let cli = Cli::try_parse_from([
            "landing-form",
            "render",
            "--form",
            "form.json",
            "--format",
            "json",
            "--ignore-settings",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.form.to_str(), Some("form.json"));
                assert!(args.data.is_none());
                assert_eq!(args.format, RenderFormat::Json);
                assert!(args.ignore_settings);
            }
            _ => panic!("expected render args"),
        }
    }

    #[test]
    fn render_defaults_to_text() {
        let cli = Cli::try_parse_from(["landing-form", "render", "--form", "form.json"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Render(args) => assert_eq!(args.format, RenderFormat::Text),
            _ => panic!("expected render args"),
        }
    }

    #[test]
    fn parses_validate_subcommand() {
        let cli = Cli::try_parse_from([
            "landing-form",
            "validate",
            "--form",
            "form.json",
            "--data",
            "data.json",
            "--json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.data.to_str(), Some("data.json"));
                assert!(args.json);
            }
            _ => panic!("expected validate args"),
        }
    }

    #[test]
    fn submit_requires_data() {
        let err = Cli::try_parse_from(["landing-form", "submit", "--form", "form.json"])
            .expect_err("missing --data");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_render_format() {
        assert!(
            Cli::try_parse_from([
                "landing-form",
                "render",
                "--form",
                "form.json",
                "--format",
                "html",
            ])
            .is_err()
        );
    }
}
