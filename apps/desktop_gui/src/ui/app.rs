//! Inventory dashboard: header, product form, analytics, and the product table.

use std::time::Duration;

use client_core::{
    analytics::{price_distribution, quantity_distribution, summarize},
    display::format_inr,
    export::DEFAULT_EXPORT_FILE_NAME,
    InventorySnapshot, ProductDraft, SortField, ViewParams,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Product, ProductId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{err_label, UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::charts::bar_chart;

const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 125, 50);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(198, 40, 40);
const PRICE_BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(126, 87, 194);
const QUANTITY_BAR_COLOR: egui::Color32 = egui::Color32::from_rgb(38, 166, 154);
const DESCRIPTION_PREVIEW_CHARS: usize = 40;

pub struct InventoryApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    api_base_url: String,
    snapshot: InventorySnapshot,
    view: ViewParams,
    draft: ProductDraft,
    editing: Option<ProductId>,
    submitting: bool,
    show_analytics: bool,
    status: String,
    status_banner: Option<UiError>,
}

impl InventoryApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            api_base_url,
            snapshot: InventorySnapshot::default(),
            view: ViewParams::default(),
            draft: ProductDraft::default(),
            editing: None,
            submitting: false,
            show_analytics: true,
            status: "Starting...".to_string(),
            status_banner: None,
        }
    }

    fn queue(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_ui_event(event);
        }
    }

    fn apply_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Snapshot(snapshot) => {
                self.snapshot = snapshot;
            }
            UiEvent::Submitted {
                product,
                was_editing,
            } => {
                self.submitting = false;
                self.status = if was_editing {
                    format!("Updated {} ({})", product.name, product.id)
                } else {
                    format!("Added {} ({})", product.name, product.id)
                };
                self.reset_form();
            }
            UiEvent::SubmitFailed => {
                // Form contents stay so the user can correct and resubmit.
                self.submitting = false;
            }
            UiEvent::Exported { path, rows } => {
                self.status = format!("Exported {rows} products to {}", path.display());
                self.status_banner = None;
            }
            UiEvent::Error(err) => {
                tracing::warn!(context = ?err.context(), "{}", err.message());
                self.status = format!("{} error: {}", err_label(err.category()), err.message());
                if err.wants_banner() {
                    self.status_banner = Some(err);
                }
            }
        }
    }

    fn reset_form(&mut self) {
        self.draft.clear();
        self.editing = None;
    }

    fn begin_edit(&mut self, product: &Product) {
        self.draft = ProductDraft::from_product(product);
        self.editing = Some(product.id);
    }

    fn cancel_edit(&mut self) {
        self.reset_form();
        self.queue(BackendCommand::DismissNotices);
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let cmd = BackendCommand::Submit {
            draft: self.draft.clone(),
            editing: self.editing,
        };
        self.submitting = self.queue(cmd);
    }

    fn request_delete(&mut self, id: ProductId) {
        // A product being edited cannot stay in the form once it is hidden.
        if self.editing == Some(id) {
            self.reset_form();
        }
        self.queue(BackendCommand::Delete { id });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Text fields keep Ctrl+Z for their own edit history.
        if ctx.memory(|memory| memory.focused().is_some()) {
            return;
        }
        if ctx.input(|input| input.modifiers.command && input.key_pressed(egui::Key::Z)) {
            self.queue(BackendCommand::UndoLatest);
        }
    }

    fn request_export(&mut self) {
        if self.snapshot.products.is_empty() {
            self.status = "No products to export".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(DEFAULT_EXPORT_FILE_NAME)
            .add_filter("CSV", &["csv"])
            .save_file()
        {
            self.queue(BackendCommand::ExportCsv { path });
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📦 Tracify Pro");
                ui.weak("Organized business starts here");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⬇ Export CSV").clicked() {
                        self.request_export();
                    }
                    let refresh = ui.add_enabled(!self.snapshot.loading, egui::Button::new("⟳ Refresh"));
                    if refresh.clicked() {
                        self.queue(BackendCommand::Refresh);
                    }
                    if self.snapshot.loading {
                        ui.spinner();
                    }
                });
            });

            if let Some(banner) = self.status_banner.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(ERROR_COLOR, banner.message());
                    if ui.small_button("Dismiss").clicked() {
                        self.status_banner = None;
                    }
                });
            }
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.api_base_url);
                });
            });
        });
    }

    fn show_form_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("form_panel")
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading(if self.editing.is_some() {
                    "Edit Product"
                } else {
                    "Add Product"
                });
                ui.add_space(6.0);

                let editing = self.editing.is_some();
                ui.add_enabled(
                    !editing,
                    egui::TextEdit::singleline(&mut self.draft.id).hint_text("ID"),
                );
                ui.add(egui::TextEdit::singleline(&mut self.draft.name).hint_text("Name"));
                ui.add(
                    egui::TextEdit::singleline(&mut self.draft.description)
                        .hint_text("Description"),
                );
                ui.add(egui::TextEdit::singleline(&mut self.draft.price).hint_text("Price"));
                ui.add(egui::TextEdit::singleline(&mut self.draft.quantity).hint_text("Quantity"));

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let label = if editing { "Update" } else { "Add" };
                    if ui
                        .add_enabled(!self.submitting, egui::Button::new(label))
                        .clicked()
                    {
                        self.submit();
                    }
                    if editing && ui.button("Cancel").clicked() {
                        self.cancel_edit();
                    }
                    if self.submitting {
                        ui.spinner();
                    }
                });

                ui.add_space(8.0);
                self.show_notices(ui);

                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    ui.add_space(6.0);
                    ui.weak("Manage products, track stock, and grow with confidence.");
                    ui.strong("📈 Plan. Track. Succeed.");
                });
            });
    }

    fn show_notices(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = &self.snapshot.message {
            ui.colored_label(SUCCESS_COLOR, message);
        }
        if let Some(error) = &self.snapshot.error {
            ui.colored_label(ERROR_COLOR, error);
        }

        let undoable: Vec<(ProductId, String)> = self
            .snapshot
            .undoable()
            .map(|product| (product.id, product.name.clone()))
            .collect();
        for (id, name) in undoable {
            if ui.button(format!("↩ Undo delete of \"{name}\"")).clicked() {
                self.queue(BackendCommand::Undo { id });
            }
        }
    }

    fn show_products(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(format!("Total: {}", self.snapshot.total()));
                ui.add_space(12.0);
                ui.add(
                    egui::TextEdit::singleline(&mut self.view.query)
                        .hint_text("Search by id, name or description...")
                        .desired_width(320.0),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_analytics, "📊 Analytics");
                });
            });
            ui.separator();

            if self.show_analytics {
                self.show_analytics_panel(ui);
                ui.separator();
            }

            let rows = self.snapshot.project(&self.view);
            if self.snapshot.loading && self.snapshot.products.is_empty() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
                return;
            }
            if rows.is_empty() {
                ui.weak("No products found.");
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("product_table")
                    .striped(true)
                    .num_columns(SortField::ALL.len() + 1)
                    .spacing([18.0, 6.0])
                    .show(ui, |ui| {
                        for field in SortField::ALL {
                            let mut label = field.label().to_string();
                            if self.view.sort_field == field {
                                label.push(' ');
                                label.push_str(self.view.sort_direction.arrow());
                            }
                            if ui.button(egui::RichText::new(label).strong()).clicked() {
                                self.view.toggle_sort(field);
                            }
                        }
                        ui.strong("Actions");
                        ui.end_row();

                        for product in &rows {
                            ui.label(product.id.to_string());
                            ui.label(&product.name);
                            ui.label(description_preview(&product.description))
                                .on_hover_text(&product.description);
                            ui.label(format_inr(product.price));
                            ui.label(product.quantity.to_string());
                            ui.horizontal(|ui| {
                                if ui.button("✏ Edit").clicked() {
                                    self.begin_edit(product);
                                }
                                if ui.button("🗑 Delete").clicked() {
                                    self.request_delete(product.id);
                                }
                            });
                            ui.end_row();
                        }
                    });
            });
        });
    }

    fn show_analytics_panel(&self, ui: &mut egui::Ui) {
        let products = &self.snapshot.products;
        let summary = summarize(products);
        ui.horizontal(|ui| {
            ui.label(format!("Units in stock: {}", summary.total_units));
            ui.add_space(12.0);
            ui.label(format!("Stock value: {}", format_inr(summary.stock_value)));
        });
        ui.columns(2, |columns| {
            bar_chart(&mut columns[0], &price_distribution(products), PRICE_BAR_COLOR);
            bar_chart(&mut columns[1], &quantity_distribution(products), QUANTITY_BAR_COLOR);
        });
    }
}

fn description_preview(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_PREVIEW_CHARS {
        description.to_string()
    } else {
        let head: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{head}…")
    }
}

impl eframe::App for InventoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_shortcuts(ctx);

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        self.show_form_panel(ctx);
        self.show_products(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
