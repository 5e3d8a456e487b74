//! Response table view

use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use ld_core::settings::PAGE_SIZE_OPTIONS;
use ld_core::{AppState, DatasetVersion, SelectionSet, TableRow};
use tracing::debug;
use uuid::Uuid;

use crate::{status_color, SpaceView, SpaceViewId, ViewerContext};

const ID_DISPLAY_CHARS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Time,
    Model,
    ResponseTime,
    Tokens,
    Status,
    Cost,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        Self::Id,
        Self::Time,
        Self::Model,
        Self::ResponseTime,
        Self::Tokens,
        Self::Status,
        Self::Cost,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Time => "Time",
            Self::Model => "Model",
            Self::ResponseTime => "Response Time",
            Self::Tokens => "Tokens",
            Self::Status => "Status",
            Self::Cost => "Cost",
        }
    }

    fn initial_width(&self) -> f32 {
        match self {
            Self::Id => 130.0,
            Self::Time => 150.0,
            Self::Model => 140.0,
            Self::ResponseTime => 120.0,
            Self::Tokens => 80.0,
            Self::Status => 80.0,
            Self::Cost => 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => " ⏶",
            Self::Descending => " ⏷",
        }
    }
}

/// Row order for a sort, as indices into `rows`
///
/// `rows` must already be in timestamp order, so `Time` sorts by position.
/// Ties keep their incoming order in both directions.
pub fn sort_rows(rows: &[TableRow], column: SortColumn, direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&rows[a], &rows[b]);
        let ordering = match column {
            SortColumn::Id => ra.id.cmp(&rb.id),
            SortColumn::Time => a.cmp(&b),
            SortColumn::Model => ra.model.cmp(&rb.model),
            SortColumn::ResponseTime => ra.response_time.total_cmp(&rb.response_time),
            SortColumn::Tokens => ra.total_tokens.cmp(&rb.total_tokens),
            SortColumn::Status => ra.status.as_str().cmp(rb.status.as_str()),
            SortColumn::Cost => ra.cost_usd.total_cmp(&rb.cost_usd),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub page: usize,
    pub page_count: usize,
    pub start: usize,
    pub end: usize,
}

impl PageBounds {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Clamp `page` into range and compute its slice of `total` rows
pub fn page_bounds(total: usize, page: usize, page_size: usize) -> PageBounds {
    let page_size = page_size.max(1);
    let page_count = total.div_ceil(page_size).max(1);
    let page = page.min(page_count - 1);
    let start = (page * page_size).min(total);
    PageBounds {
        page,
        page_count,
        start,
        end: (start + page_size).min(total),
    }
}

pub fn truncate_id(id: &str) -> String {
    match id.char_indices().nth(ID_DISPLAY_CHARS) {
        Some((cut, _)) => format!("{}...", &id[..cut]),
        None => id.to_string(),
    }
}

pub fn format_cost(cost_usd: f64) -> String {
    format!("${:.4}", cost_usd)
}

pub fn format_count_header(total: usize, selected: usize) -> String {
    if selected > 0 {
        format!("{} total responses • {} selected", total, selected)
    } else {
        format!("{} total responses", total)
    }
}

/// The full new selection after one checkbox changes
fn toggled_selection(current: &SelectionSet, id: &str, checked: bool) -> Vec<String> {
    let mut ids: Vec<String> = current.iter().filter(|&existing| existing != id).map(str::to_string).collect();
    if checked {
        ids.push(id.to_string());
    }
    ids
}

/// The full new selection after the header checkbox changes for a page
fn page_selection(current: &SelectionSet, page_ids: &[&str], checked: bool) -> Vec<String> {
    let mut ids: Vec<String> = current
        .iter()
        .filter(|existing| !page_ids.contains(existing))
        .map(str::to_string)
        .collect();
    if checked {
        ids.extend(page_ids.iter().map(|id| id.to_string()));
    }
    ids
}

enum TableAction {
    Select(Vec<String>),
    Sort(SortColumn),
}

/// Paginated, sortable table with checkbox selection
pub struct ResponseTableView {
    id: SpaceViewId,
    title: String,
    sort_column: SortColumn,
    sort_direction: SortDirection,
    page: usize,
    page_size: Option<usize>,
    // Row order for (version, column, direction)
    order: Option<(DatasetVersion, SortColumn, SortDirection, Vec<usize>)>,
}

impl ResponseTableView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            sort_column: SortColumn::Time,
            sort_direction: SortDirection::Descending,
            page: 0,
            page_size: None,
            order: None,
        }
    }

    fn refresh_order(&mut self, state: &AppState) {
        let key = (state.version, self.sort_column, self.sort_direction);
        if let Some((version, column, direction, _)) = &self.order {
            if (*version, *column, *direction) == key {
                return;
            }
            if *version != state.version {
                self.page = 0;
            }
        }

        let order = sort_rows(&state.table_data, self.sort_column, self.sort_direction);
        self.order = Some((key.0, key.1, key.2, order));
    }

    fn sort_by(&mut self, column: SortColumn) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Ascending;
        }
        self.page = 0;
    }

    fn render_table(
        &self,
        ui: &mut Ui,
        rows: &[TableRow],
        order: &[usize],
        bounds: PageBounds,
        selection: &SelectionSet,
    ) -> Option<TableAction> {
        let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
        let selection_bg_fill = ui.style().visuals.selection.bg_fill;
        let page_rows: Vec<&TableRow> = order[bounds.start..bounds.end].iter().map(|&i| &rows[i]).collect();
        let page_ids: Vec<&str> = page_rows.iter().map(|row| row.id.as_str()).collect();
        let page_selected = !page_ids.is_empty() && page_ids.iter().all(|id| selection.contains(id));

        let mut action = None;

        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(true)
            .column(Column::exact(24.0));
        for column in SortColumn::ALL {
            builder = builder.column(Column::initial(column.initial_width()).at_least(60.0).clip(true));
        }

        builder
            .header(20.0, |mut header| {
                header.col(|ui| {
                    let mut checked = page_selected;
                    if ui.checkbox(&mut checked, "").on_hover_text("Select page").changed() {
                        action = Some(TableAction::Select(page_selection(selection, &page_ids, checked)));
                    }
                });
                for column in SortColumn::ALL {
                    header.col(|ui| {
                        let is_sorted = self.sort_column == column;
                        let label = if is_sorted {
                            format!("{}{}", column.header(), self.sort_direction.arrow())
                        } else {
                            column.header().to_string()
                        };
                        if ui.selectable_label(is_sorted, RichText::new(label).strong()).clicked() {
                            action = Some(TableAction::Sort(column));
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(text_height, page_rows.len(), |row_index, mut row| {
                    let data = page_rows[row_index];
                    let is_selected = selection.contains(&data.id);
                    let highlight = |ui: &mut Ui| {
                        if is_selected {
                            ui.painter().rect_filled(ui.available_rect_before_wrap(), 0.0, selection_bg_fill);
                        }
                    };

                    row.col(|ui| {
                        highlight(ui);
                        let mut checked = is_selected;
                        if ui.checkbox(&mut checked, "").changed() {
                            action = Some(TableAction::Select(toggled_selection(selection, &data.id, checked)));
                        }
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(truncate_id(&data.id)).monospace().weak())
                            .on_hover_text(data.id.as_str());
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(data.formatted_time.as_str());
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(&data.model).strong());
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(format!("{}ms", data.response_time)).monospace());
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(data.total_tokens.to_string()).monospace());
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(data.status.as_str()).color(status_color(data.status)));
                    });
                    row.col(|ui| {
                        highlight(ui);
                        ui.label(RichText::new(format_cost(data.cost_usd)).monospace().weak());
                    });
                });
            });

        action
    }
}

impl SpaceView for ResponseTableView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "ResponseTableView"
    }

    fn reset(&mut self) {
        self.order = None;
        self.page = 0;
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let state = ctx.store.snapshot();
        if state.table_data.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No data to display");
            });
            return;
        }

        self.refresh_order(&state);
        let Some((_, _, _, order)) = &self.order else {
            return;
        };

        let mut page_size = self
            .page_size
            .unwrap_or_else(|| ctx.settings.read().views.default_page_size);
        let previous_page_size = page_size;
        let bounds = page_bounds(order.len(), self.page, page_size);
        let mut page = bounds.page;

        ui.horizontal(|ui| {
            ui.strong("Response Data");
            ui.separator();
            ui.label(RichText::new(format_count_header(state.table_data.len(), state.selection.len())).weak());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(page + 1 < bounds.page_count, egui::Button::new("▶")).clicked() {
                    page += 1;
                }
                ui.label(format!(
                    "{}-{} of {} • Page {} of {}",
                    bounds.start + 1,
                    bounds.end,
                    order.len(),
                    bounds.page + 1,
                    bounds.page_count
                ));
                if ui.add_enabled(page > 0, egui::Button::new("◀")).clicked() {
                    page -= 1;
                }
                ui.separator();
                egui::ComboBox::from_id_source(format!("page_size_{}", self.id))
                    .selected_text(page_size.to_string())
                    .width(60.0)
                    .show_ui(ui, |ui| {
                        for option in PAGE_SIZE_OPTIONS {
                            ui.selectable_value(&mut page_size, option, option.to_string());
                        }
                    });
                ui.label("Rows per page:");
            });
        });
        ui.add_space(4.0);

        let action = egui::ScrollArea::horizontal()
            .id_source(format!("table_{}", self.id))
            .show(ui, |ui| self.render_table(ui, &state.table_data, order, bounds, &state.selection))
            .inner;

        if page_size != previous_page_size {
            self.page_size = Some(page_size);
            page = 0;
        }
        self.page = page;

        match action {
            Some(TableAction::Select(ids)) => {
                debug!("Table selection changed: {} selected", ids.len());
                ctx.selection.set_from_table(ids);
            }
            Some(TableAction::Sort(column)) => self.sort_by(column),
            None => {}
        }
    }
}
