use serde_json::json;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::services::entitlement::{character_limit, ContentKind, MAX_IMAGES};

pub fn handle(premium: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let plan = if premium { "premium" } else { "free" };
    let question = character_limit(premium, ContentKind::Question);
    let answer = character_limit(premium, ContentKind::Answer);
    let images = if premium { MAX_IMAGES } else { 0 };

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            &format!("{} plan limits", plan),
            Some(json!({
                "plan": plan,
                "question_chars": question,
                "answer_chars": answer,
                "max_images": images,
            })),
        ),
        OutputFormat::Text => {
            println!("Limits for the {} plan:", plan);
            output_rows(&[
                ("question", format!("{} characters", question)),
                ("answer", format!("{} characters", answer)),
                ("images", images.to_string()),
            ]);
            Ok(())
        }
    }
}
