// src/gui.rs
use anyhow::Result;
use eframe::egui;
use egui::{Align, Color32, Layout, RichText, ScrollArea, Stroke, Ui, Vec2};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::thread;

#[cfg(feature = "clipboard")]
use arboard::Clipboard;

use crate::ai::{AiConnector, GeminiModel};
use crate::capture::encoder::SUPPORTED_EXTENSIONS;
use crate::capture::EncodedImage;
use crate::classify::WasteAnalysis;
use crate::config::{self, Settings};
use crate::guide::{bin_info, BinInfo, BIN_GUIDE};
use crate::session::{Session, SessionImage, SharedSession};

const WINDOW_WIDTH: f32 = 480.0;
const WINDOW_HEIGHT: f32 = 860.0;
const PREVIEW_HEIGHT: f32 = 200.0;
const UPLOAD_HEIGHT: f32 = 240.0;

const EMERALD: Color32 = Color32::from_rgb(5, 150, 105);
const EMERALD_LIGHT: Color32 = Color32::from_rgb(236, 253, 245);
const EMERALD_DARK: Color32 = Color32::from_rgb(6, 95, 70);
const ERROR_FILL: Color32 = Color32::from_rgb(254, 242, 242);
const ERROR_TEXT: Color32 = Color32::from_rgb(185, 28, 28);

pub struct EcoSortApp {
    session: SharedSession,
    connector: Arc<dyn AiConnector>,
    preview: Option<egui::TextureHandle>,
    /// Problems that happen before a request exists (unreadable file, clipboard)
    notice: Option<String>,
    was_style_initialized: bool,
}

impl EcoSortApp {
    pub fn new(connector: Arc<dyn AiConnector>) -> Self {
        Self {
            session: SharedSession::new(),
            connector,
            preview: None,
            notice: None,
            was_style_initialized: false,
        }
    }
}

impl eframe::App for EcoSortApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.was_style_initialized {
            let mut style = (*ctx.style()).clone();
            style.visuals = egui::Visuals::light();
            style.visuals.panel_fill = Color32::WHITE;
            style.visuals.widgets.inactive.rounding = egui::Rounding::same(8.0);
            style.visuals.widgets.hovered.rounding = egui::Rounding::same(8.0);
            style.visuals.widgets.active.rounding = egui::Rounding::same(8.0);
            style.visuals.selection.bg_fill = EMERALD;
            style.text_styles.insert(
                egui::TextStyle::Body,
                egui::FontId::new(15.0, egui::FontFamily::Proportional)
            );
            style.text_styles.insert(
                egui::TextStyle::Button,
                egui::FontId::new(15.0, egui::FontFamily::Proportional)
            );
            style.text_styles.insert(
                egui::TextStyle::Heading,
                egui::FontId::new(24.0, egui::FontFamily::Proportional)
            );
            ctx.set_style(style);
            self.was_style_initialized = true;
        }

        let snapshot = self.session.snapshot();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(EMERALD).inner_margin(egui::Margin::same(18.0)))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("♻").size(36.0).color(Color32::WHITE));
                    ui.heading(RichText::new("Eco-Sort").strong().color(Color32::WHITE));
                    ui.label(RichText::new("Waste Visual Classifier").size(13.0).color(EMERALD_LIGHT));
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                ui.add_space(12.0);

                if snapshot.image().is_none() {
                    self.draw_upload_area(ui, ctx);
                } else {
                    self.draw_preview(ui, &snapshot);
                    if let Some(analysis) = snapshot.result() {
                        ui.add_space(12.0);
                        self.draw_result(ui, analysis, &snapshot);
                    }
                }

                if let Some(message) = snapshot.error().map(str::to_string).or_else(|| self.notice.clone()) {
                    ui.add_space(12.0);
                    self.draw_error(ui, &message);
                }

                ui.add_space(20.0);
                draw_guide(ui);
                ui.add_space(12.0);
            });
        });
    }
}

impl EcoSortApp {
    fn draw_upload_area(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        egui::Frame::none()
            .fill(EMERALD_LIGHT)
            .stroke(Stroke::new(3.0, Color32::from_rgb(209, 250, 229)))
            .rounding(egui::Rounding::same(24.0))
            .inner_margin(egui::Margin::same(24.0))
            .show(ui, |ui| {
                ui.set_min_size(Vec2::new(ui.available_width(), UPLOAD_HEIGHT - 48.0));
                ui.vertical_centered(|ui| {
                    ui.add_space(30.0);
                    if ui.add_sized([220.0, 48.0], egui::Button::new(
                        RichText::new("📷 Tap to Upload Photo").size(16.0).color(Color32::WHITE))
                        .fill(EMERALD)
                        .rounding(24.0)
                    ).clicked() {
                        self.pick_and_submit(ctx);
                    }
                    ui.add_space(8.0);
                    ui.label(RichText::new("Classify waste instantly").size(12.0).color(EMERALD));
                });
            });
    }

    fn draw_preview(&mut self, ui: &mut Ui, snapshot: &Session) {
        ui.horizontal(|ui| {
            if let Some(image) = snapshot.image() {
                ui.label(RichText::new(&image.source).small().color(Color32::GRAY));
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(RichText::new("✕").size(16.0)).on_hover_text("Start over").clicked() {
                    self.reset();
                }
            });
        });

        if let Some(texture) = &self.preview {
            let available_width = ui.available_width();
            let aspect_ratio = texture.size_vec2().x / texture.size_vec2().y;
            let mut image_size = Vec2::new(available_width, available_width / aspect_ratio.max(0.01));
            if image_size.y > PREVIEW_HEIGHT {
                image_size = Vec2::new(PREVIEW_HEIGHT * aspect_ratio, PREVIEW_HEIGHT);
            }
            ui.vertical_centered(|ui| {
                ui.image((texture.id(), image_size));
            });
        }

        if snapshot.is_loading() {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Analyzing...").strong().color(EMERALD_DARK));
                if let Some(started) = snapshot.submitted_at() {
                    let time_str = started.format("%H:%M:%S").to_string();
                    ui.label(RichText::new(format!("since {}", time_str)).small().color(Color32::GRAY));
                }
            });
        }
    }

    fn draw_result(&mut self, ui: &mut Ui, analysis: &WasteAnalysis, snapshot: &Session) {
        let info = bin_info(analysis.category);
        let accent = rgb(info.accent);
        let text = rgb(info.text);

        egui::Frame::none()
            .fill(rgb(info.background))
            .stroke(Stroke::new(3.0, accent))
            .rounding(egui::Rounding::same(16.0))
            .inner_margin(egui::Margin::same(18.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.horizontal(|ui| {
                    swatch(ui, accent, 16.0);
                    ui.label(RichText::new(analysis.bin_name_en.to_uppercase()).size(24.0).strong().color(text));
                });
                ui.with_layout(Layout::top_down(Align::RIGHT), |ui| {
                    ui.label(RichText::new(&analysis.bin_name_ur).size(21.0).strong().color(text));
                });

                ui.add_space(6.0);
                ui.label(RichText::new("IDENTIFIED ITEM").small().color(Color32::GRAY));
                ui.label(RichText::new(&analysis.identified_item).size(17.0).strong());

                ui.separator();
                ui.label(RichText::new(&analysis.explanation_en).color(text));
                ui.add_space(4.0);
                ui.with_layout(Layout::top_down(Align::RIGHT), |ui| {
                    ui.label(RichText::new(&analysis.explanation_ur).size(17.0).color(text));
                });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if let Some(done) = snapshot.completed_at() {
                        let time_str = done.format("%H:%M").to_string();
                        ui.label(RichText::new(format!("Classified at {}", time_str)).small().color(Color32::GRAY));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.add(egui::Button::new(RichText::new("📋 Copy").size(13.0))
                            .fill(Color32::WHITE)
                            .rounding(6.0)
                        ).clicked() {
                            self.copy_result_to_clipboard(analysis);
                        }
                    });
                });
            });
    }

    fn draw_error(&mut self, ui: &mut Ui, message: &str) {
        egui::Frame::none()
            .fill(ERROR_FILL)
            .stroke(Stroke::new(1.0, ERROR_TEXT.linear_multiply(0.4)))
            .rounding(egui::Rounding::same(12.0))
            .inner_margin(egui::Margin::same(14.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(message).color(ERROR_TEXT));
                if ui.button("Try another photo").clicked() {
                    self.reset();
                }
            });
    }

    fn pick_and_submit(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.notice = None;

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                self.notice = Some(format!("Could not open {}", file_label(&path)));
                return;
            }
        };

        let encoded = match EncodedImage::from_bytes(&bytes, None) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to encode {}: {}", path.display(), e);
                self.notice = Some(e.user_message().to_string());
                return;
            }
        };

        self.preview = load_preview(ctx, &bytes);

        let image = SessionImage {
            source: file_label(&path),
            encoded: encoded.clone(),
        };
        let ticket = match self.session.begin(image) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!("Upload ignored: {}", e);
                self.notice = Some(e.user_message().to_string());
                return;
            }
        };

        let session = self.session.clone();
        let connector = Arc::clone(&self.connector);
        let ctx = ctx.clone();
        info!("Starting classification for {}", path.display());
        thread::spawn(move || {
            session.run(connector.as_ref(), ticket, encoded);
            ctx.request_repaint();
        });
    }

    fn reset(&mut self) {
        self.session.reset();
        self.preview = None;
        self.notice = None;
        info!("Session reset");
    }

    fn copy_result_to_clipboard(&mut self, analysis: &WasteAnalysis) {
        #[cfg(feature = "clipboard")]
        {
            match Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(e) = clipboard.set_text(result_text(analysis)) {
                        error!("Failed to copy result to clipboard: {}", e);
                    } else {
                        info!("Result copied to clipboard");
                    }
                }
                Err(e) => {
                    error!("Failed to access clipboard: {}", e);
                }
            }
        }
        #[cfg(not(feature = "clipboard"))]
        {
            let _ = analysis;
            self.notice = Some("Clipboard feature not enabled in this build.".to_string());
            error!("Clipboard feature not enabled. Enable the 'clipboard' feature in Cargo.toml");
        }
    }
}

fn draw_guide(ui: &mut Ui) {
    ui.label(RichText::new("BIN GUIDE").small().strong().color(Color32::GRAY));
    ui.add_space(6.0);
    let tile_width = (ui.available_width() - 10.0) / 2.0;
    egui::Grid::new("bin_guide")
        .num_columns(2)
        .spacing([10.0, 10.0])
        .show(ui, |ui| {
            for (i, info) in BIN_GUIDE.iter().enumerate() {
                draw_guide_tile(ui, info, tile_width);
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });
}

fn draw_guide_tile(ui: &mut Ui, info: &BinInfo, width: f32) {
    egui::Frame::none()
        .fill(rgb(info.background))
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.set_width(width - 20.0);
            ui.horizontal(|ui| {
                swatch(ui, rgb(info.accent), 10.0);
                ui.label(RichText::new(info.label_en).strong().color(rgb(info.text)));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(info.label_ur).color(rgb(info.text)));
                });
            });
            for item in info.items_en {
                ui.label(RichText::new(format!("• {}", item)).size(12.0).color(rgb(info.text)));
            }
        });
}

fn swatch(ui: &mut Ui, color: Color32, size: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), size / 2.0, color);
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode for display only; the bytes sent to the model are untouched.
fn load_preview(ctx: &egui::Context, bytes: &[u8]) -> Option<egui::TextureHandle> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            Some(ctx.load_texture("preview_texture", color_image, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            warn!("Preview unavailable: {}", e);
            None
        }
    }
}

#[cfg_attr(not(feature = "clipboard"), allow(dead_code))]
fn result_text(analysis: &WasteAnalysis) -> String {
    format!(
        "{} → {} / {} [{}]\n{}\n{}",
        analysis.identified_item,
        analysis.bin_name_en,
        analysis.bin_name_ur,
        analysis.category,
        analysis.explanation_en,
        analysis.explanation_ur
    )
}

fn install_urdu_font(ctx: &egui::Context) {
    let Some(path) = config::urdu_font_path() else {
        warn!("ECOSORT_URDU_FONT not set; Urdu text may not render");
        return;
    };

    match std::fs::read(&path) {
        Ok(bytes) => {
            let mut fonts = egui::FontDefinitions::default();
            fonts.font_data.insert("urdu".to_owned(), egui::FontData::from_owned(bytes));
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                fonts.families.entry(family).or_default().push("urdu".to_owned());
            }
            ctx.set_fonts(fonts);
            info!("Loaded Urdu font from {}", path);
        }
        Err(e) => {
            error!("Failed to load Urdu font {}: {}", path, e);
        }
    }
}

pub fn run_gui(settings: Settings) -> Result<()> {
    info!("Eco-Sort GUI starting up...");

    let connector: Arc<dyn AiConnector> = Arc::new(GeminiModel::new(&settings)?);

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(WINDOW_WIDTH, WINDOW_HEIGHT)),
        min_window_size: Some(egui::vec2(360.0, 520.0)),
        ..eframe::NativeOptions::default()
    };

    eframe::run_native(
        "Eco-Sort",
        native_options,
        Box::new(move |cc| {
            install_urdu_font(&cc.egui_ctx);
            Box::new(EcoSortApp::new(connector))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start GUI: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BinCategory;

    #[test]
    fn copied_text_is_bilingual() {
        let analysis = WasteAnalysis {
            category: BinCategory::Green,
            bin_name_en: "Recycle".into(),
            bin_name_ur: "ری سائیکل".into(),
            explanation_en: "Clean aluminium can.".into(),
            explanation_ur: "صاف ایلومینیم کین۔".into(),
            identified_item: "Soda can".into(),
        };
        let text = result_text(&analysis);
        assert!(text.starts_with("Soda can → Recycle / ری سائیکل [GREEN]"));
        assert!(text.ends_with("صاف ایلومینیم کین۔"));
    }

    #[test]
    fn file_label_prefers_file_name() {
        assert_eq!(file_label(Path::new("/tmp/photos/bottle.jpg")), "bottle.jpg");
    }
}
