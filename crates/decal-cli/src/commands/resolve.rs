//! Resolve command - show the template key for a title and variant.
//!
//! Pure lookup against the naming convention; useful when checking why
//! an order failed with a missing template, or what key a new product's
//! bundle must be uploaded under.

use anyhow::Result;
use clap::Args;

use decal_render::TemplateNaming;

use crate::OutputFormat;

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Product title.
    #[arg(long, short = 't')]
    pub title: String,

    /// Variant descriptor (e.g. "White / L").
    #[arg(long, short = 'v')]
    pub variant: Option<String>,
}

/// Execute the resolve command.
///
/// # Errors
///
/// Returns an error only if JSON output fails to serialize.
pub fn execute(args: &ResolveArgs, format: &OutputFormat) -> Result<()> {
    let naming = TemplateNaming::default();
    let key = naming.resolve(&args.title, args.variant.as_deref());
    let finish = if naming.is_light(args.variant.as_deref()) {
        "light"
    } else {
        "dark"
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "templateKey": key,
                    "finish": finish,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("template key: {key}");
            println!("finish: {finish}");
        }
    }
    Ok(())
}
