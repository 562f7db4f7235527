use crate::actions::{Command, Dashboard, ToastKind};
use crate::models::StatusFilter;
use crate::view::{
    self, Badge, DashboardView, DeviceTableView, EventListView, FieldValue, ModalView,
    StatisticsView, StatusBarView, Tone, DEVICES_LOADING, EVENTS_LOADING, HISTORY_TITLE,
    MODAL_LOADING, NO_DEVICES, NO_EVENTS,
};
use chrono::Local;
use eframe::egui;
use std::time::Duration;

const SUCCESS: egui::Color32 = egui::Color32::from_rgb(50, 150, 50);
const DANGER: egui::Color32 = egui::Color32::from_rgb(200, 50, 50);
const MUTED: egui::Color32 = egui::Color32::from_rgb(100, 100, 100);
const PANEL: egui::Color32 = egui::Color32::from_rgb(240, 240, 240);
const BORDER: egui::Color32 = egui::Color32::from_rgb(200, 200, 200);

/// Binds the dashboard's view models to egui widgets. Widget interactions
/// are collected as [`Command`]s and dispatched once the frame is drawn.
pub struct DashboardApp {
    dashboard: Dashboard,
    search_text: String,
    status_filter: StatusFilter,
    commands: Vec<Command>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard) -> Self {
        let filter = dashboard.store().filter().clone();
        Self {
            dashboard,
            search_text: filter.search_text,
            status_filter: filter.status_filter,
            commands: Vec::new(),
        }
    }

    fn badge(ui: &mut egui::Ui, badge: Badge) {
        let color = if badge.connected { SUCCESS } else { DANGER };
        ui.colored_label(color, badge.label());
    }

    fn render_header(
        &mut self,
        ui: &mut egui::Ui,
        status: &StatusBarView,
        scan: &view::ScanButtonView,
        auto_refresh: bool,
    ) {
        ui.horizontal(|ui| {
            ui.add_space(10.0);

            ui.heading("🖧 Network Monitor");
            ui.add_space(20.0);

            let color = match status.tone {
                Tone::Success => SUCCESS,
                Tone::Danger => DANGER,
                Tone::Neutral => MUTED,
            };
            ui.colored_label(color, format!("● {}", status.status_text));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(10.0);

                if let Some(last_update) = &status.last_update {
                    ui.label(egui::RichText::new(last_update.as_str()).color(MUTED));
                    ui.add_space(10.0);
                }

                let refresh_text = if auto_refresh {
                    "Auto-refresh on"
                } else {
                    "Auto-refresh off"
                };
                ui.label(egui::RichText::new(refresh_text).size(11.0).color(MUTED));
                ui.add_space(10.0);

                let scan_button = egui::Button::new(
                    egui::RichText::new(if scan.enabled {
                        format!("🔍 {}", scan.label)
                    } else {
                        format!("⏳ {}", scan.label)
                    })
                    .color(egui::Color32::WHITE),
                )
                .fill(egui::Color32::from_rgb(0, 120, 215));
                if ui
                    .add_enabled(scan.enabled, scan_button)
                    .clicked()
                {
                    self.commands.push(Command::TriggerScan);
                }

                ui.add_space(5.0);

                let (icon, fill) = match status.toggle.icon {
                    "stop" => ("⏹", DANGER),
                    _ => ("▶", SUCCESS),
                };
                if ui
                    .add(
                        egui::Button::new(
                            egui::RichText::new(format!("{} {}", icon, status.toggle.label))
                                .color(egui::Color32::WHITE),
                        )
                        .fill(fill),
                    )
                    .clicked()
                {
                    self.commands.push(Command::ToggleMonitoring);
                }

                ui.add_space(5.0);

                if ui.button("🔄 Refresh").clicked() {
                    self.commands.push(Command::RefreshAll);
                }
            });
        });

        ui.add_space(5.0);
        ui.separator();
    }

    fn info_box(ui: &mut egui::Ui, title: &str, value: String) {
        egui::Frame::none()
            .fill(PANEL)
            .stroke(egui::Stroke::new(1.0, BORDER))
            .inner_margin(15.0)
            .show(ui, |ui| {
                ui.set_width(180.0);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong());
                    ui.label(
                        egui::RichText::new(value)
                            .size(16.0)
                            .color(egui::Color32::from_rgb(50, 50, 50)),
                    );
                });
            });
    }

    fn render_info_panel(&self, ui: &mut egui::Ui, status: &StatusBarView, stats: &StatisticsView) {
        ui.horizontal(|ui| {
            ui.add_space(5.0);
            Self::info_box(ui, "🌐 Network", status.network.clone());
            Self::info_box(ui, "⏱ Scan Interval", status.scan_interval.clone());
            Self::info_box(
                ui,
                "📊 Connected",
                format!("{} / {}", status.connected_count, status.total_count),
            );
            Self::info_box(ui, "⬆ Connections (24h)", stats.connections_24h.to_string());
            Self::info_box(ui, "⬇ Disconnections (24h)", stats.disconnections_24h.to_string());
        });

        if !stats.hourly.is_empty() {
            ui.add_space(5.0);
            ui.horizontal_wrapped(|ui| {
                ui.add_space(5.0);
                ui.label(egui::RichText::new("Hourly activity:").color(MUTED));
                for bucket in &stats.hourly {
                    ui.label(
                        egui::RichText::new(format!(
                            "{:02}h ↑{} ↓{}",
                            bucket.hour, bucket.connections, bucket.disconnections
                        ))
                        .size(11.0),
                    );
                }
            });
        }
    }

    fn render_filter_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(5.0);

            let before = self.status_filter;
            egui::ComboBox::from_id_source("status_filter")
                .selected_text(self.status_filter.as_str())
                .show_ui(ui, |ui| {
                    for filter in StatusFilter::ALL {
                        ui.selectable_value(&mut self.status_filter, filter, filter.as_str());
                    }
                });
            if self.status_filter != before {
                self.commands.push(Command::SetStatusFilter(self.status_filter));
            }

            ui.add_space(10.0);

            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search_text)
                    .hint_text("🔎 Search devices...")
                    .desired_width(260.0),
            );
            if search.changed() {
                self.commands.push(Command::SetSearchText(self.search_text.clone()));
            }
        });
    }

    fn render_device_table(&mut self, ui: &mut egui::Ui, devices: &DeviceTableView) {
        let rows = match devices {
            DeviceTableView::Loading => {
                ui.label(egui::RichText::new(DEVICES_LOADING).color(MUTED));
                return;
            }
            DeviceTableView::Empty => {
                ui.label(egui::RichText::new(NO_DEVICES).color(MUTED));
                return;
            }
            DeviceTableView::Rows(rows) => rows,
        };

        ui.label(
            egui::RichText::new(format!("Devices ({})", rows.len()))
                .size(16.0)
                .strong(),
        );
        ui.add_space(5.0);

        egui::ScrollArea::vertical()
            .id_source("device_table")
            .max_height(360.0)
            .show(ui, |ui| {
                egui::Grid::new("devices")
                    .striped(true)
                    .num_columns(7)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| {
                        for header in [
                            "Status",
                            "Device",
                            "IP Address",
                            "MAC Address",
                            "Hostname",
                            "Last Seen",
                            "",
                        ] {
                            ui.label(egui::RichText::new(header).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            Self::badge(ui, row.badge);
                            ui.label(row.name.as_str());
                            ui.label(row.ip_address.as_str());
                            ui.monospace(row.mac_address.as_str());
                            ui.label(row.hostname.as_str());
                            ui.label(row.last_seen.as_str());
                            if ui.small_button("ℹ").on_hover_text("View Details").clicked() {
                                self.commands
                                    .push(Command::OpenDeviceModal(row.mac_address.clone()));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_events(&mut self, ui: &mut egui::Ui, events: &EventListView) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Recent Events").size(16.0).strong());
            if ui.small_button("🔄").on_hover_text("Refresh events").clicked() {
                self.commands.push(Command::RefreshEvents);
            }
        });
        ui.add_space(5.0);

        let items = match events {
            EventListView::Loading => {
                ui.label(egui::RichText::new(EVENTS_LOADING).color(MUTED));
                return;
            }
            EventListView::Empty => {
                ui.label(egui::RichText::new(NO_EVENTS).color(MUTED));
                return;
            }
            EventListView::Items(items) => items,
        };

        egui::ScrollArea::vertical()
            .id_source("events")
            .show(ui, |ui| {
                for item in items {
                    ui.horizontal(|ui| {
                        let arrow = if item.badge.connected { "⬆" } else { "⬇" };
                        let color = if item.badge.connected { SUCCESS } else { DANGER };
                        ui.colored_label(color, arrow);
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&item.title).strong());
                            ui.label(egui::RichText::new(&item.details).size(11.0).color(MUTED));
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(egui::RichText::new(&item.time).size(11.0));
                        });
                    });
                    ui.separator();
                }
            });
    }

    fn render_modal(&mut self, ctx: &egui::Context, modal: &ModalView) {
        if *modal == ModalView::Hidden {
            return;
        }

        let mut open = true;
        let shown = egui::Window::new("Device Details")
            .collapsible(false)
            .resizable(true)
            .default_width(520.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| match modal {
                ModalView::Hidden => {}
                ModalView::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(MODAL_LOADING);
                    });
                }
                ModalView::Error(message) => {
                    ui.colored_label(DANGER, message.as_str());
                }
                ModalView::Detail(detail) => {
                    egui::Grid::new("device_info").num_columns(2).show(ui, |ui| {
                        for field in &detail.fields {
                            ui.label(egui::RichText::new(field.label).color(MUTED));
                            match &field.value {
                                FieldValue::Text(text) => {
                                    ui.label(text.as_str());
                                }
                                FieldValue::Code(text) => {
                                    ui.monospace(text.as_str());
                                }
                                FieldValue::Badge(badge) => Self::badge(ui, *badge),
                            }
                            ui.end_row();
                        }
                    });

                    ui.add_space(10.0);
                    ui.label(egui::RichText::new(HISTORY_TITLE).strong());
                    egui::ScrollArea::vertical()
                        .id_source("history")
                        .max_height(240.0)
                        .show(ui, |ui| {
                            egui::Grid::new("history").striped(true).num_columns(3).show(ui, |ui| {
                                for header in ["Event", "Time", "IP Address"] {
                                    ui.label(egui::RichText::new(header).strong());
                                }
                                ui.end_row();
                                for row in &detail.history {
                                    Self::badge(ui, row.badge);
                                    ui.label(row.time.as_str());
                                    ui.label(row.ip_address.as_str());
                                    ui.end_row();
                                }
                            });
                        });
                }
            });

        if !open {
            self.commands.push(Command::CloseModal);
            return;
        }

        // Clicks outside the window count as a backdrop click
        if let Some(inner) = shown {
            let rect = inner.response.rect;
            let outside = ctx.input(|i| {
                i.pointer.primary_clicked()
                    && i.pointer.interact_pos().map_or(false, |pos| !rect.contains(pos))
            });
            if outside {
                self.commands.push(Command::ModalBackdropClicked);
            }
        }
    }

    fn render_toast(ctx: &egui::Context, toast: &view::ToastView) {
        let fill = match toast.kind {
            ToastKind::Info => egui::Color32::from_rgb(0, 120, 215),
            ToastKind::Success => SUCCESS,
            ToastKind::Error => DANGER,
        };
        egui::Area::new("toast")
            .anchor(egui::Align2::RIGHT_BOTTOM, [-20.0, -20.0])
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(fill)
                    .rounding(6.0)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&toast.message).color(egui::Color32::WHITE));
                    });
            });
    }

    fn render(&mut self, ctx: &egui::Context, view: &DashboardView) {
        // The open modal covers the page like a backdrop would
        let modal_open = self.dashboard.modal().is_open();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(!modal_open);
            ui.add_space(10.0);

            self.render_header(ui, &view.status_bar, &view.scan_button, view.auto_refresh);
            ui.add_space(15.0);

            self.render_info_panel(ui, &view.status_bar, &view.statistics);
            ui.add_space(15.0);

            ui.separator();
            ui.add_space(10.0);

            ui.columns(2, |columns| {
                self.render_filter_bar(&mut columns[0]);
                columns[0].add_space(10.0);
                self.render_device_table(&mut columns[0], &view.devices);
                self.render_events(&mut columns[1], &view.events);
            });
        });

        self.render_modal(ctx, &view.modal);
        if let Some(toast) = &view.toast {
            Self::render_toast(ctx, toast);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dashboard.drain_updates();

        let view = view::dashboard_view(&self.dashboard, Local::now());
        self.render(ctx, &view);

        for command in self.commands.drain(..) {
            self.dashboard.dispatch(command);
        }

        // Request repaint for smooth updates
        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.dashboard.stop();
    }
}
