//! Per-file review: segment the diff, drive the model, reconcile the parts.

use crate::chunker;
use crate::gateway::{CompletionGateway, Result};
use crate::prompts;
use crate::types::{ChatMessage, FileReviewResult};

/// Literal separator the model is instructed to emit between the
/// description and the review section of a response.
pub const DESCRIPTION_DELIMITER: &str = "--ENDOFDESC--";

/// Prefix the model is instructed to open the review section with.
const REVIEW_PREFIX: &str = "Review:";

/// The model's "nothing to flag" marker; normalized away during parsing so
/// an empty `comments` field reliably means a clean review.
const NO_ISSUES_SENTINEL: &str = "LGTM!";

/// Splits a model response into `(description, review)`.
///
/// Text before the first [`DESCRIPTION_DELIMITER`] is the description,
/// trimmed. Text after it is the review with the literal `Review:` and
/// `LGTM!` substrings removed, then trimmed, which normalizes a clean
/// review to the empty string. A response with no delimiter is all
/// description.
pub fn split_response(response: &str) -> (String, String) {
    match response.split_once(DESCRIPTION_DELIMITER) {
        Some((description, review)) => {
            let review = review.replace(REVIEW_PREFIX, "").replace(NO_ISSUES_SENTINEL, "");
            (description.trim().to_owned(), review.trim().to_owned())
        }
        None => (response.trim().to_owned(), String::new()),
    }
}

/// Reviews one file's diff and returns its finished record.
///
/// The diff is segmented under `max_segment_tokens` and each segment gets
/// one gateway call carrying the persona message, the patch-review task
/// message and the templated user message. With more than one segment the
/// user template announces that the model is seeing only part of the diff,
/// and one extra call reconciles the per-segment descriptions into the
/// final one; a single-segment diff uses its description as-is.
///
/// Calls are strictly sequential and segment order is preserved through to
/// reconciliation. Any gateway error aborts the file with no partial
/// result.
///
/// The prompt names the file by its base name; the returned record keeps
/// the full repository-relative path.
pub async fn review_file<G>(
    gateway: &G,
    file_path: &str,
    diff_text: &str,
    max_segment_tokens: usize,
) -> Result<FileReviewResult>
where
    G: CompletionGateway + ?Sized,
{
    let segments = chunker::chunk(diff_text, max_segment_tokens);
    let multi_part = segments.len() > 1;
    let user_template = if multi_part { prompts::SEND_PATCH_PART } else { prompts::SEND_PATCH };
    let file_name = base_name(file_path);

    tracing::debug!(file = %file_path, segments = segments.len(), "segmented diff");

    let mut description = String::new();
    let mut comments = String::new();

    for (index, segment) in segments.iter().enumerate() {
        let user = prompts::render(
            user_template,
            &[("filename", file_name), ("file_diff", segment.as_str())],
        );
        let response = gateway
            .complete(&[
                ChatMessage::system(prompts::SYSTEM_PERSONA),
                ChatMessage::system(prompts::PATCH_REVIEW),
                ChatMessage::user(user),
            ])
            .await?;
        tracing::debug!(file = %file_path, segment = index + 1, "segment reviewed");

        let (segment_description, segment_review) = split_response(&response);
        description.push_str(&segment_description);
        description.push('\n');
        comments.push_str(&segment_review);
        comments.push('\n');
    }

    let final_description = if multi_part {
        let user = prompts::render(
            prompts::SUMMARIZE_PARTS,
            &[
                ("num_parts", segments.len().to_string().as_str()),
                ("descriptions", description.trim()),
            ],
        );
        gateway
            .complete(&[ChatMessage::system(prompts::SYSTEM_PERSONA), ChatMessage::user(user)])
            .await?
    } else {
        description
    };

    Ok(FileReviewResult {
        file_name: file_path.to_owned(),
        description: final_description.trim().to_owned(),
        comments: comments.trim().to_owned(),
    })
}

/// Last path component; the whole path when there is no separator.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
