use serde_json::json;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::services::moderation::ModerationService;

pub async fn handle(text: &str, keywords_only: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let cfg = config::config();
    let service = if keywords_only {
        ModerationService::keywords_only(cfg.moderation.settings.clone())
    } else {
        ModerationService::from_config(cfg)
    };

    let (result, review) = service.moderate_and_review(text).await;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Moderation complete",
            Some(json!({
                "scorer": service.scorer_name(),
                "result": result,
                "review": review,
            })),
        ),
        OutputFormat::Text => {
            let verdict = if result.is_appropriate { "appropriate" } else { "inappropriate" };
            println!("Moderation ({}):", service.scorer_name());
            output_rows(&[
                ("verdict", verdict.to_string()),
                ("severity", result.severity.to_string()),
                ("confidence", format!("{:.2}", result.confidence)),
                ("reason", if result.reason.is_empty() { "-".to_string() } else { result.reason.clone() }),
                ("flagged", review.flagged.to_string()),
                ("action", format!("{:?}", review.action).to_lowercase()),
            ]);
            Ok(())
        }
    }
}
