use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use form_spec::FieldConfig;

use super::load_form;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, value_name = "form.json")]
    pub form: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_form(&args.form)?;
    for warning in config.lint() {
        println!("warning: {warning}");
    }
    let fields = config.fields().filter(|field| field.is_interactive()).count();
    let paragraphs = config
        .fields()
        .filter(|field| matches!(field, FieldConfig::Paragraph(_)))
        .count();
    println!(
        "{}: {} section(s), {fields} field(s), {paragraphs} paragraph(s)",
        config.id,
        config.sections.len()
    );
    Ok(())
}
