use crate::config::ImportOptions;
use crate::model::{PacketSpec, Schema};
use crate::table::{SkipReason, element_text, extract_table};
use crate::type_norm::normalize_notes;
use crate::walker::WalkContext;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::debug;

static EDIT_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[\s*edit[^\]]*\]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Packet title with MediaWiki's `[edit | edit source]` links removed.
pub fn clean_title(raw: &str) -> String {
    let t = EDIT_LINK.replace_all(raw, "");
    WHITESPACE.replace_all(&t, " ").trim().to_string()
}

/// Paragraphs directly around `table`: the run of `<p>` siblings before it,
/// then the run after it, joined by blank lines.
pub fn gather_notes(table: ElementRef<'_>) -> String {
    let paragraph_run = |el: &ElementRef<'_>| el.value().name() == "p";

    let mut before: Vec<String> = table
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(paragraph_run)
        .map(element_text)
        .collect();
    before.reverse();

    let after = table
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(paragraph_run)
        .map(element_text);

    let combined: Vec<String> = before
        .into_iter()
        .chain(after)
        .filter(|t| !t.is_empty())
        .collect();
    normalize_notes(&combined.join("\n\n"))
}

/// Build the packet documented by `table` under the walker's current context.
pub fn build_packet(
    table: ElementRef<'_>,
    ctx: &WalkContext,
    opts: &ImportOptions,
) -> Result<PacketSpec, SkipReason> {
    let title = ctx.title.as_deref().ok_or(SkipReason::MissingTitle)?;
    if opts.is_skipped_title(title) {
        return Err(SkipReason::LegacyTitle(title.to_string()));
    }

    let data = extract_table(table, ctx.state)?;
    if let Some(bound) = data.bound_to.filter(|b| *b != ctx.direction) {
        debug!(
            packet = title,
            heading = %ctx.direction,
            table = %bound,
            "Bound To column disagrees with heading; using heading"
        );
    }

    Ok(PacketSpec {
        name: clean_title(title),
        id: data.id,
        resource: data.resource,
        notes: gather_notes(table),
        fields: data.fields,
    })
}

/// Append without deduplication; repeated tables give repeated entries.
pub fn append_packet(schema: &mut Schema, ctx: &WalkContext, packet: PacketSpec) {
    schema.bucket_mut(ctx.state, ctx.direction).push(packet);
}
