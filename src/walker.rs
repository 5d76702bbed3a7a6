use crate::assemble::{append_packet, build_packet};
use crate::config::ImportOptions;
use crate::error::{ImportError, Result};
use crate::model::{Direction, ProtocolState, Schema};
use crate::table::element_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

static H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static WITH_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").unwrap());

/// Where the walk currently is in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkContext {
    pub state: ProtocolState,
    pub direction: Direction,
    /// Last `h4` seen; consumed by the next table whatever its outcome.
    pub title: Option<String>,
}

impl Default for WalkContext {
    fn default() -> Self {
        WalkContext {
            state: ProtocolState::Handshaking,
            direction: Direction::Clientbound,
            title: None,
        }
    }
}

/// First `h2` that carries `anchor` as its own id or on a descendant.
pub fn find_anchor<'a>(doc: &'a Html, anchor: &str) -> Result<ElementRef<'a>> {
    doc.select(&H2)
        .find(|h2| {
            h2.value().id() == Some(anchor)
                || h2.select(&WITH_ID).any(|el| el.value().id() == Some(anchor))
        })
        .ok_or_else(|| ImportError::MissingAnchor(anchor.to_string()))
}

/// Heading id (own or from an inner headline span), else its text.
fn heading_key(heading: ElementRef<'_>) -> String {
    heading
        .select(&WITH_ID)
        .find_map(|el| el.value().id())
        .or_else(|| heading.value().id())
        .map(str::to_string)
        .unwrap_or_else(|| element_text(heading))
}

/// Single forward pass over the siblings that follow the anchor heading.
pub struct Walker<'o> {
    opts: &'o ImportOptions,
    ctx: WalkContext,
    schema: Schema,
}

impl<'o> Walker<'o> {
    pub fn new(opts: &'o ImportOptions) -> Self {
        Walker {
            opts,
            ctx: WalkContext::default(),
            schema: Schema::default(),
        }
    }

    pub fn context(&self) -> &WalkContext {
        &self.ctx
    }

    pub fn visit(&mut self, el: ElementRef<'_>) {
        match el.value().name() {
            "h2" => {
                if let Some(state) = ProtocolState::from_heading(&heading_key(el)) {
                    debug!(%state, "entering state section");
                    self.ctx.state = state;
                    self.ctx.direction = Direction::Clientbound;
                    self.ctx.title = None;
                }
            }
            "h3" => {
                if let Some(direction) = Direction::from_heading(&heading_key(el)) {
                    self.ctx.direction = direction;
                    self.ctx.title = None;
                }
            }
            "h4" => {
                self.ctx.title = Some(element_text(el));
            }
            "table" => {
                match build_packet(el, &self.ctx, self.opts) {
                    Ok(packet) => append_packet(&mut self.schema, &self.ctx, packet),
                    Err(reason) => debug!(
                        state = %self.ctx.state,
                        direction = %self.ctx.direction,
                        title = ?self.ctx.title,
                        "skipping table: {reason}"
                    ),
                }
                self.ctx.title = None;
            }
            _ => {}
        }
    }

    pub fn finish(self) -> Schema {
        self.schema
    }
}

/// Walk every element sibling after `anchor` and collect the schema.
pub fn walk(anchor: ElementRef<'_>, opts: &ImportOptions) -> Schema {
    let mut walker = Walker::new(opts);
    for el in anchor.next_siblings().filter_map(ElementRef::wrap) {
        walker.visit(el);
    }
    let schema = walker.finish();
    info!(packets = schema.packet_count(), "packet walk finished");
    schema
}

/// Parse `html`, locate the anchor and run the walk.
pub fn import_packets(html: &str, opts: &ImportOptions) -> Result<Schema> {
    let doc = Html::parse_document(html);
    let anchor = find_anchor(&doc, &opts.anchor)?;
    Ok(walk(anchor, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn anchor_by_own_id_or_inner_span() {
        let doc = parse(r#"<h2 id="Other">Other</h2><h2 id="Handshaking">Handshaking</h2>"#);
        let a = find_anchor(&doc, "Handshaking").expect("anchor");
        assert_eq!(element_text(a), "Handshaking");

        let doc = parse(
            r#"<h2><span class="mw-headline" id="Handshaking">Handshaking</span></h2>"#,
        );
        assert!(find_anchor(&doc, "Handshaking").is_ok());
    }

    #[test]
    fn missing_anchor_is_fatal() {
        let doc = parse("<h2>Intro</h2><p>nothing here</p>");
        match find_anchor(&doc, "Handshaking") {
            Err(ImportError::MissingAnchor(id)) => assert_eq!(id, "Handshaking"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn headings_drive_context() {
        let doc = parse(
            r#"<h2 id="Handshaking">Handshaking</h2>
               <h3>Serverbound</h3>
               <h4>Handshake</h4>
               <h2><span id="Status">Status</span></h2>
               <h3>Definitely not a direction</h3>
               <h4>Status Response</h4>"#,
        );
        let opts = ImportOptions::default();
        let anchor = find_anchor(&doc, "Handshaking").expect("anchor");
        let mut walker = Walker::new(&opts);
        let mut seen = Vec::new();
        for el in anchor.next_siblings().filter_map(ElementRef::wrap) {
            walker.visit(el);
            seen.push(walker.context().clone());
        }
        assert_eq!(seen[0].direction, Direction::Serverbound);
        assert_eq!(seen[1].title.as_deref(), Some("Handshake"));
        assert_eq!(seen[2].state, ProtocolState::Status);
        assert_eq!(seen[2].direction, Direction::Clientbound);
        assert_eq!(seen[2].title, None);
        assert_eq!(seen[3].direction, Direction::Clientbound);
        assert_eq!(seen[4].title.as_deref(), Some("Status Response"));
    }

    #[test]
    fn title_is_consumed_by_skipped_table() {
        let doc = parse(
            r#"<h2 id="Handshaking">Handshaking</h2>
               <h4>Handshake</h4>
               <table><tr><th>Name</th></tr><tr><td>x</td></tr></table>"#,
        );
        let opts = ImportOptions::default();
        let anchor = find_anchor(&doc, "Handshaking").expect("anchor");
        let mut walker = Walker::new(&opts);
        for el in anchor.next_siblings().filter_map(ElementRef::wrap) {
            walker.visit(el);
        }
        assert_eq!(walker.context().title, None);
        assert_eq!(walker.finish().packet_count(), 0);
    }
}
