use eframe::egui;

mod cards;
mod preview;
mod state;
mod types;
mod utils;

use state::AppState;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

fn main() -> eframe::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = utils::load_settings_or_default();
    tracing::info!(base_url = %settings.base_url, "starting CIFR Message Analyzer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([560.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "CIFR Message Analyzer",
        options,
        Box::new(move |_cc| {
            Box::new(AnalyzerApp {
                state: AppState::new(settings),
            })
        }),
    )
}

struct AnalyzerApp {
    state: AppState,
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let s = &mut self.state;

        // Poll background workers (non-blocking)
        s.poll_submission();
        s.poll_preview();
        s.refresh_preview_texture(ctx);

        if s.is_busy() {
            ctx.request_repaint();
        }

        let dark = s.settings.dark_mode;
        ctx.set_visuals(if dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("CIFR Message Analyzer").size(22.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(s.settings.dark_mode, "Dark mode")
                        .clicked()
                    {
                        s.settings.dark_mode = !s.settings.dark_mode;
                        persist_dark_mode(s.settings.dark_mode);
                    }
                });
            });
            ui.add_space(8.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.small(format!("Backend: {}", s.settings.base_url));
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    message_form(ui, s);
                    ui.separator();
                    ui.add_space(8.0);
                    let texture = s.preview_texture.clone();
                    let preview_failed = s.preview_failed();
                    cards::results_ui(ui, &mut s.view, texture.as_ref(), preview_failed, dark);
                });
        });
    }
}

fn persist_dark_mode(dark_mode: bool) {
    let Some(path) = utils::config_path() else {
        return;
    };
    if let Err(e) = utils::update_settings_file(&path, |stored| stored.dark_mode = dark_mode) {
        tracing::warn!(error = %e, "could not save settings");
    }
}

fn message_form(ui: &mut egui::Ui, s: &mut AppState) {
    ui.label(egui::RichText::new("Message").strong());
    ui.add(
        egui::TextEdit::multiline(&mut s.form.text)
            .desired_rows(5)
            .desired_width(f32::INFINITY)
            .hint_text("Paste a message from your team chat or email..."),
    );

    ui.horizontal(|ui| {
        ui.label("Sender");
        ui.add(
            egui::TextEdit::singleline(&mut s.form.sender)
                .hint_text("optional, e.g. Alice from Company A"),
        );
    });

    ui.horizontal(|ui| {
        if ui.button("Attach image...").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file()
            {
                s.form.image_path = Some(path);
            }
        }
        match s.attached_image_label() {
            Some(label) => {
                ui.label(label);
                if ui.small_button("Remove").clicked() {
                    s.form.image_path = None;
                }
            }
            None => {
                ui.weak("No image attached");
            }
        }
    });

    ui.add_space(6.0);
    if ui.button(egui::RichText::new("Analyze").strong()).clicked() {
        s.submit();
    }
    if let Some(hint) = &s.form_hint {
        ui.colored_label(egui::Color32::from_rgb(219, 132, 0), hint);
    }
    ui.add_space(6.0);
}
