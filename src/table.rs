use crate::model::{Direction, FieldSpec, ProtocolState};
use crate::naming::field_ident;
use crate::projector::project;
use crate::type_expr::{StructMember, TypeExpr};
use crate::type_norm::{normalize_notes, normalize_type};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::warn;

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static CODE: Lazy<Selector> = Lazy::new(|| Selector::parse("code").unwrap());

/// Why a table produced no packet. None of these abort the walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no packet title before the table")]
    MissingTitle,
    #[error("legacy packet {0:?}")]
    LegacyTitle(String),
    #[error("table has no body rows")]
    EmptyBody,
    #[error("header is not Packet ID / State / Bound To")]
    NotFieldTable,
    #[error("no row mentions state {0}")]
    WrongState(ProtocolState),
}

/// What a packet table yields before it is joined with its title and notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub id: String,
    pub resource: String,
    /// Direction read from the Bound To column. The walker's heading context
    /// decides bucket placement; this is only used for diagnostics.
    pub bound_to: Option<Direction>,
    pub fields: Vec<FieldSpec>,
}

/// Whitespace-normalized text of an element, one space between text nodes.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_header_like(cells: &[ElementRef<'_>]) -> bool {
    cells
        .iter()
        .any(|c| c.text().collect::<String>().contains("Packet ID"))
}

/// Pull packet identity and fields out of one wiki packet table.
pub fn extract_table(table: ElementRef<'_>, state: ProtocolState) -> Result<TableData, SkipReason> {
    let rows: Vec<ElementRef<'_>> = table.select(&ROW).collect();
    let Some((header, body)) = rows.split_first() else {
        return Err(SkipReason::EmptyBody);
    };

    let header_texts: Vec<String> = header
        .select(&CELL)
        .map(|c| element_text(c).to_lowercase())
        .collect();
    let has = |needle: &str| header_texts.iter().any(|t| t.contains(needle));
    if !(has("packet id") && has("state") && has("bound to")) {
        return Err(SkipReason::NotFieldTable);
    }
    if body.is_empty() {
        return Err(SkipReason::EmptyBody);
    }

    let state_col = header_texts.iter().position(|t| t.contains("state"));
    if !body.iter().any(|row| row_confirms_state(*row, state_col, state)) {
        return Err(SkipReason::WrongState(state));
    }

    let mut data = TableData::default();
    let mut pending: Option<PendingArray> = None;

    for row in body {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.is_empty() || is_header_like(&cells) {
            continue;
        }

        if data.id.is_empty() {
            read_identity(&cells, &mut data);
            if cells.len() >= 6 {
                read_inline_field(&cells, &mut data.fields, &mut pending);
            }
        } else if cells.len() == 3 {
            let array_done = match pending.as_mut() {
                Some(array) => {
                    array.push_element(cell_text(&cells, 0), cell_text(&cells, 1));
                    array.remaining == 0
                }
                None => {
                    let notes = normalize_notes(&cell_text(&cells, 2));
                    if let Some(field) =
                        build_field(cell_text(&cells, 0), &cell_text(&cells, 1), notes)
                    {
                        data.fields.push(field);
                    }
                    false
                }
            };
            if array_done {
                if let Some(done) = pending.take() {
                    data.fields.push(done.finish());
                }
            }
        }
    }

    // Table ended before the rowspan did; keep what was collected.
    if let Some(open) = pending.take() {
        data.fields.push(open.finish());
    }

    Ok(data)
}

fn row_confirms_state(row: ElementRef<'_>, state_col: Option<usize>, state: ProtocolState) -> bool {
    let cells: Vec<ElementRef<'_>> = row.select(&DATA_CELL).collect();
    if is_header_like(&cells) {
        return false;
    }
    let keyword = state.keyword();
    match state_col {
        Some(idx) if idx < cells.len() => element_text(cells[idx]).to_lowercase().contains(keyword),
        _ => element_text(row).to_lowercase().contains(keyword),
    }
}

fn cell_text(cells: &[ElementRef<'_>], idx: usize) -> String {
    cells.get(idx).map(|c| element_text(*c)).unwrap_or_default()
}

/// First cell carries `<code>` spans: protocol id, then resource name.
fn read_identity(cells: &[ElementRef<'_>], data: &mut TableData) {
    let codes: Vec<String> = cells[0]
        .select(&CODE)
        .map(|c| c.text().collect::<String>().trim().to_string())
        .collect();
    if let Some(id) = codes.first() {
        data.id = id.clone();
    }
    if let Some(resource) = codes.get(1) {
        data.resource = resource.clone();
    }

    if data.bound_to.is_none() && cells.len() >= 3 {
        let bound = cell_text(cells, 2).to_lowercase();
        data.bound_to = if bound.contains("client") {
            Some(Direction::Clientbound)
        } else if bound.contains("server") {
            Some(Direction::Serverbound)
        } else {
            None
        };
    }
}

/// Field columns of the identity row: name, type, notes at 3, 4, 5.
///
/// A rowspan name cell whose third column mentions "array" opens an
/// array-of-struct field. On the wiki's eight-column layout that column is the
/// spanning array type cell, and the first element's name and type sit at 4 and 6.
fn read_inline_field(
    cells: &[ElementRef<'_>],
    fields: &mut Vec<FieldSpec>,
    pending: &mut Option<PendingArray>,
) {
    let name = cell_text(cells, 3);
    let raw_type = cell_text(cells, 4);
    let notes = normalize_notes(&cell_text(cells, 5));

    let rowspan = cells[3].value().attr("rowspan");
    if let Some(span) = rowspan.filter(|_| notes.to_lowercase().contains("array")) {
        let mut array = PendingArray {
            name,
            notes,
            remaining: span.trim().parse::<usize>().unwrap_or(1).saturating_sub(1),
            members: Vec::new(),
        };
        // The first element shares the row; its type is in column 6 unless the
        // row is too narrow to have one.
        let elem_type = if cells.len() > 6 {
            cell_text(cells, 6)
        } else {
            cell_text(cells, 5)
        };
        array.add_member(cell_text(cells, 4), &elem_type);
        if array.remaining == 0 {
            fields.push(array.finish());
        } else {
            *pending = Some(array);
        }
        return;
    }

    if let Some(field) = build_field(name, &raw_type, notes) {
        fields.push(field);
    }
}

/// Keep a field only when both its name and its type survive normalization.
fn build_field(name: String, raw_type: &str, notes: String) -> Option<FieldSpec> {
    if name.is_empty() {
        return None;
    }
    let token = normalize_type(raw_type);
    if token.is_empty() {
        return None;
    }
    let ty = project(&token);
    if !ty.is_resolved() {
        warn!(field = %name, raw = raw_type, "type needs manual fix: {ty}");
    }
    Some(FieldSpec { name, ty, notes })
}

/// An array-of-struct field whose element rows follow under a rowspan.
struct PendingArray {
    name: String,
    notes: String,
    remaining: usize,
    members: Vec<StructMember>,
}

impl PendingArray {
    fn add_member(&mut self, name: String, raw_type: &str) {
        let token = normalize_type(raw_type);
        if name.is_empty() || token.is_empty() {
            return;
        }
        self.members.push(StructMember {
            name: field_ident(&name),
            ty: project(&token),
        });
    }

    fn push_element(&mut self, name: String, raw_type: String) {
        self.add_member(name, &raw_type);
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn finish(mut self) -> FieldSpec {
        let prefixed = self.notes.to_lowercase().contains("prefixed array");
        let wrap = |inner: TypeExpr| {
            if prefixed {
                TypeExpr::PrefixedArray(Box::new(inner))
            } else {
                TypeExpr::Array(Box::new(inner))
            }
        };

        let ty = if self.members.is_empty() {
            wrap(TypeExpr::unresolved("no element rows"))
        } else if self.members.iter().all(|m| m.ty.is_byte()) {
            if prefixed {
                TypeExpr::PrefixedByteArray
            } else {
                TypeExpr::ByteArray
            }
        } else if self.members.len() == 1 {
            let only = self.members.remove(0);
            wrap(only.ty)
        } else {
            wrap(TypeExpr::Struct(self.members))
        };

        if !ty.is_resolved() {
            warn!(field = %self.name, "array field needs manual fix: {ty}");
        }
        FieldSpec {
            name: self.name,
            ty,
            notes: self.notes,
        }
    }
}
