use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use form_spec::validate;
use serde_json::json;

use super::{load_configured_form, seeded_data};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long, value_name = "form.json")]
    pub form: PathBuf,
    #[arg(long, value_name = "data.json")]
    pub data: PathBuf,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
    /// Skip LANDING_* environment settings
    #[arg(long = "ignore-settings")]
    pub ignore_settings: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let (config, _) = load_configured_form(&args.form, args.ignore_settings)?;
    let data = seeded_data(&config, Some(&args.data))?;
    let errors = validate(&data, &config);

    if args.json {
        let report = json!({ "valid": errors.is_valid(), "errors": errors });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if errors.is_valid() {
        println!("valid");
    } else {
        for (name, message) in errors.iter() {
            println!("{name}: {message}");
        }
    }

    if !errors.is_valid() {
        bail!("{} field(s) failed validation", errors.len());
    }
    Ok(())
}
