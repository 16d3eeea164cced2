//! Prompt templates and placeholder rendering.
//!
//! Templates use `{name}` placeholders filled in by [`render`]. Rendering is
//! a single left-to-right pass over the template: substituted values are
//! copied verbatim and never rescanned, so placeholder-shaped text inside a
//! diff (or inside a model-written description) cannot trigger a second
//! substitution and corrupt the prompt.
//!
//! The patch-review template fixes the response wire format the parser in
//! [`crate::review`] relies on: the description ends at `--ENDOFDESC--`,
//! the review section starts with `Review:`, and a clean review is exactly
//! `LGTM!`.

/// Persona system message sent with every completion call.
pub const SYSTEM_PERSONA: &str = "\
You are `diffscribe`, a seasoned software engineer who reviews code changes \
carefully and communicates precisely. You point out potential problems such \
as security flaws, logic errors, out-of-bounds access, data races, missing \
error handling, needless complexity, caching mistakes, typos and unclear \
naming, and you call out code that could be simplified or optimized. You \
keep descriptions factual and reviews actionable.";

/// System message describing the per-segment task and the response format.
pub const PATCH_REVIEW: &str = "\
Describe the diff I send you in at most 20 words. Do not mention that it is \
a diff; state only what the change does. End the description with \
--ENDOFDESC--
After the description, review the diff for errors, risks or hard-to-read \
code, and start that section with `Review:`. Suggest improvements for \
readability and point out missing documentation where it matters. Keep each \
suggestion to the point and do not add an overall summary at the end. If \
you find nothing worth improving, reply with `LGTM!` in the review section \
and nothing else.";

/// User message template when the whole diff fits in one segment.
pub const SEND_PATCH: &str = "\
Here is the diff for `{filename}`:
```diff
{file_diff}
```";

/// User message template when the diff had to be split into segments.
pub const SEND_PATCH_PART: &str = "\
Here is part of the diff for `{filename}`. This is not the complete diff; \
the entire diff is too large to send at once:
```diff
{file_diff}
```";

/// User message template reconciling per-segment descriptions into one.
pub const SUMMARIZE_PARTS: &str = "\
I sent you a diff in {num_parts} parts and you described each part in at \
most 20 words. Looking at all {num_parts} descriptions together, summarize \
the entire change in at most 20 words. The descriptions were:

{descriptions}";

/// System message for the final pull-request-level summary call.
pub const SUMMARIZE_PR: &str = "\
You have reviewed every file of a pull request, producing a description and \
review comments for each. I will now send you a JSON document with those \
per-file results. Summarize what the pull request is about as markdown, in \
at most 60 words, without going into the individual files. Write it as a \
sharp, friendly senior developer; the occasional joke or icon is welcome \
but professionalism comes first.";

/// Renders `template`, replacing each `{name}` placeholder with the matching
/// value from `vars`.
///
/// Single-pass positional substitution: the template is scanned once and
/// substituted values are appended without being rescanned. A `{...}` span
/// that names no known variable is emitted literally.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];
        let close = rest.find('}');
        let known = close.and_then(|close| {
            let name = &rest[1..close];
            vars.iter().find(|(key, _)| *key == name).map(|(_, value)| (close, *value))
        });
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &rest[close + 1..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
