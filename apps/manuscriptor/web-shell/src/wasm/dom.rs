use super::*;

type RowToggleHandler = Closure<dyn FnMut(web_sys::Event)>;

/// Renders list views straight into the page's table bodies.
pub(super) struct DomRenderer;

impl ResponseHandler for DomRenderer {
    fn render(&mut self, view: ListView) {
        let target = view.target;
        match mount_list(&view) {
            Ok(()) => update_diagnostics(|state| state.record_render()),
            Err(error) => warn!(container = target.container_id(), %error, "list not rendered"),
        }
    }

    // Diagnostics are already traced by the dispatcher; nothing in the page
    // shows them.
    fn diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

pub(super) fn web_document() -> Result<Document, String> {
    web_sys::window()
        .ok_or_else(|| "window is unavailable".to_string())?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

fn create_element<T: JsCast>(document: &Document, tag: &str) -> Result<T, String> {
    document
        .create_element(tag)
        .map_err(|_| format!("failed to create <{tag}> element"))?
        .dyn_into::<T>()
        .map_err(|_| format!("<{tag}> element has an unexpected type"))
}

fn append(parent: &Element, child: &Element) -> Result<(), String> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|_| "failed to append element".to_string())
}

fn text_cell(document: &Document, text: &str) -> Result<Element, String> {
    let cell: Element = create_element(document, "td")?;
    cell.set_text_content(Some(text));
    Ok(cell)
}

fn set_visible(element: &HtmlElement, visible: bool) -> Result<(), String> {
    let style = element.style();
    if visible {
        style
            .remove_property("display")
            .map(|_| ())
            .map_err(|_| "failed to show element".to_string())
    } else {
        style
            .set_property("display", "none")
            .map_err(|_| "failed to hide element".to_string())
    }
}

/// Replaces the contents of the view's container. Toggle handlers from the
/// previous contents are dropped once the new rows are in place. A failed
/// rebuild leaves the container empty, so no row outlives its handler.
pub(super) fn mount_list(view: &ListView) -> Result<(), String> {
    let document = web_document()?;
    let container_id = view.target.container_id();
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| format!("missing #{container_id} container"))?;
    container.set_text_content(None);

    let mut handlers = Vec::new();
    let mounted = append_rows(&document, &container, view, &mut handlers);
    ROW_TOGGLE_HANDLERS.with(|slot| {
        let mut slot = slot.borrow_mut();
        if mounted.is_err() {
            container.set_text_content(None);
            slot.clear(&view.target);
        } else {
            slot.replace(view.target, handlers);
        }
        debug!(
            container = container_id,
            toggles = slot.count(&view.target),
            "list mounted"
        );
    });
    mounted
}

fn append_rows(
    document: &Document,
    container: &Element,
    view: &ListView,
    handlers: &mut Vec<RowToggleHandler>,
) -> Result<(), String> {
    for row in &view.rows {
        match row {
            ViewRow::Expandable {
                cells,
                detail,
                expanded,
            } => {
                let handler =
                    append_expandable(document, container, row, cells, detail, *expanded)?;
                handlers.push(handler);
            }
            ViewRow::Field { label } => {
                let tr: Element = create_element(document, "tr")?;
                append(&tr, &text_cell(document, label)?)?;
                let input_cell: Element = create_element(document, "td")?;
                let input: web_sys::HtmlInputElement = create_element(document, "input")?;
                append(&input_cell, &input)?;
                append(&tr, &input_cell)?;
                append(container, &tr)?;
            }
            ViewRow::Pair { key, value } => {
                let tr: Element = create_element(document, "tr")?;
                append(&tr, &text_cell(document, key)?)?;
                append(&tr, &text_cell(document, value)?)?;
                append(container, &tr)?;
            }
        }
    }
    Ok(())
}

fn append_expandable(
    document: &Document,
    container: &Element,
    row: &ViewRow,
    cells: &[String],
    detail: &str,
    expanded: bool,
) -> Result<RowToggleHandler, String> {
    let summary: Element = create_element(document, "tr")?;
    let toggle: HtmlElement = create_element(document, "td")?;
    toggle.set_text_content(row.glyph());
    toggle.set_title(TOGGLE_TITLE);
    let style = toggle.style();
    style
        .set_property("cursor", "pointer")
        .map_err(|_| "failed to style toggle cell".to_string())?;
    style
        .set_property("font-family", TOGGLE_FONT_FAMILY)
        .map_err(|_| "failed to style toggle cell".to_string())?;
    append(&summary, &toggle)?;
    for cell in cells {
        append(&summary, &text_cell(document, cell)?)?;
    }

    let details: HtmlElement = create_element(document, "tr")?;
    let detail_cell: Element = text_cell(document, detail)?;
    detail_cell
        .set_attribute("colspan", &DETAIL_COLSPAN.to_string())
        .map_err(|_| "failed to set detail colspan".to_string())?;
    append(&details, &detail_cell)?;
    set_visible(&details, expanded)?;

    append(container, &summary)?;
    append(container, &details)?;

    let toggle_cell = toggle.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
        let current = toggle_cell.text_content().unwrap_or_default();
        let next = toggle_glyph(&current);
        toggle_cell.set_text_content(Some(next.glyph));
        if let Err(error) = set_visible(&details, next.detail_visible) {
            warn!(%error, "detail row toggle failed");
        }
    }));
    toggle
        .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        .map_err(|_| "failed to bind row toggle".to_string())?;
    Ok(callback)
}
