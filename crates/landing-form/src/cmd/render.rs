use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use form_spec::{ErrorMap, LandingView, build_landing_view, render_json_ui, render_text, validate};
use serde_json::json;

use super::{load_configured_form, seeded_data};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, value_name = "form.json")]
    pub form: PathBuf,
    #[arg(long, value_name = "data.json")]
    pub data: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: RenderFormat,
    /// Show validation errors next to each field
    #[arg(long = "with-errors")]
    pub with_errors: bool,
    /// Skip LANDING_* environment settings
    #[arg(long = "ignore-settings")]
    pub ignore_settings: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Json,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let (config, settings) = load_configured_form(&args.form, args.ignore_settings)?;
    let data = seeded_data(&config, args.data.as_deref())?;
    let errors = if args.with_errors {
        validate(&data, &config)
    } else {
        ErrorMap::new()
    };

    let view = build_landing_view(&config, &data, &errors, false, settings.closed_notice());
    let output = match (view, args.format) {
        (LandingView::Closed { notice }, RenderFormat::Text) => notice,
        (LandingView::Closed { notice }, RenderFormat::Json) => {
            serde_json::to_string_pretty(&json!({ "closed": true, "notice": notice }))?
        }
        (LandingView::Open(payload), RenderFormat::Text) => render_text(&payload),
        (LandingView::Open(payload), RenderFormat::Json) => {
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        }
    };
    println!("{output}");
    Ok(())
}
