use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use form_spec::{FormSession, SubmitGate};
use tracing::info;

use super::{load_data, load_form};
use crate::settings::Settings;

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[arg(long, value_name = "form.json")]
    pub form: PathBuf,
    #[arg(long, value_name = "data.json")]
    pub data: PathBuf,
}

pub fn run(args: SubmitArgs) -> Result<()> {
    let settings = Settings::from_env().context("invalid submission settings")?;
    let mut config = load_form(&args.form)?;
    settings.form.apply(&mut config);
    if let Some(notice) = settings.form.closed_notice() {
        bail!("form is closed: {notice}");
    }

    let data = load_data(&args.data)?;
    let mut session = FormSession::with_data(config, &data);
    let snapshot = match session.begin_submit()? {
        SubmitGate::Ready(snapshot) => snapshot,
        SubmitGate::Rejected(errors) => {
            for (name, message) in errors.iter() {
                eprintln!("{name}: {message}");
            }
            bail!("{} field(s) failed validation; nothing was sent", errors.len());
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let relay = settings.relay.relay();
    let enricher = settings.relay.enricher();
    let report = runtime.block_on(async {
        let submission = enricher.enrich(snapshot).await;
        relay.dispatch(&submission).await
    });
    session.finish_submit(report.success)?;
    info!(form = %session.config().id, success = report.success, "submission finished");

    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    match report.user_message() {
        Some(message) => Err(anyhow!("submission failed: {message}")),
        None => Ok(()),
    }
}
