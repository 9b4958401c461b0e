use serde_json::json;

use crate::cli::utils::{output_error, output_rows, output_success};
use crate::cli::OutputFormat;
use crate::config::{self, validate_env};

fn status(present: bool) -> String {
    if present { "set" } else { "missing" }.to_string()
}

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let cfg = config::config();
    let validation = validate_env(cfg);

    match output_format {
        OutputFormat::Json => {
            let details = json!({
                "success": validation.is_valid,
                "environment": format!("{:?}", cfg.environment).to_lowercase(),
                "site_url": cfg.site_url,
                "is_valid": validation.is_valid,
                "missing_vars": validation.missing_vars,
                "database_configured": cfg.database.url.is_some(),
                "perspective_configured": cfg.moderation.perspective_api_key.is_some(),
                "stripe_webhook_configured": !cfg.stripe.webhook_secret.is_empty(),
            });
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(())
        }
        OutputFormat::Text => {
            println!("Environment: {:?}", cfg.environment);
            output_rows(&[
                ("site url", cfg.site_url.clone()),
                ("database", status(cfg.database.url.is_some())),
                ("supabase url", status(!cfg.supabase.url.is_empty())),
                ("supabase anon key", status(!cfg.supabase.anon_key.is_empty())),
                ("supabase jwt secret", status(!cfg.supabase.jwt_secret.is_empty())),
                ("stripe secret key", status(!cfg.stripe.secret_key.is_empty())),
                ("stripe publishable key", status(!cfg.stripe.publishable_key.is_empty())),
                ("stripe webhook secret", status(!cfg.stripe.webhook_secret.is_empty())),
                ("perspective api key", status(cfg.moderation.perspective_api_key.is_some())),
            ]);
            if validation.is_valid {
                output_success(output_format, "Environment is complete", None)
            } else {
                output_error(
                    output_format,
                    &format!("Missing: {}", validation.missing_vars.join(", ")),
                    Some("ENV_INCOMPLETE"),
                )
            }
        }
    }
}
