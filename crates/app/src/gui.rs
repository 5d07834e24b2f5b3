//! egui window
//!
//! Draws the editor state and turns clicks and shortcuts into commands.
//! Commands are collected while drawing and dispatched once the frame's
//! panels are laid out.

use crate::command::Command;
use crate::prompt::NativeFilePrompt;
use crate::shell::EditorShell;
use crate::style::{FontFamilyChoice, MAX_FONT_SIZE, MIN_FONT_SIZE};
use eframe::egui;
use pdf_editor_core::{DocumentAdapter, EditorConfig};
use pdf_editor_render::default_rasterizer;
use std::path::PathBuf;

/// Open the editor window and block until it is closed
pub fn run(config: EditorConfig, initial_file: Option<PathBuf>) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.editor.window_width, config.editor.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("PDF Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Editor",
        options,
        Box::new(move |cc| Ok(Box::new(PdfEditorApp::new(cc, &config, initial_file)))),
    )
}

/// Preview texture and the preview generation it was uploaded from
struct PreviewTexture {
    generation: u64,
    handle: egui::TextureHandle,
}

struct PdfEditorApp {
    shell: EditorShell<NativeFilePrompt>,
    preview_texture: Option<PreviewTexture>,
}

impl PdfEditorApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: &EditorConfig,
        initial_file: Option<PathBuf>,
    ) -> Self {
        let adapter = DocumentAdapter::with_rasterizer(default_rasterizer());
        let mut shell = EditorShell::new(adapter, NativeFilePrompt, config);
        shell.set_max_texture_side(max_texture_side(&cc.egui_ctx));

        if let Some(path) = initial_file {
            shell.open_path(&path);
        }

        Self { shell, preview_texture: None }
    }

    /// Upload the preview image if it changed since the last frame
    fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let preview = &self.shell.state().preview;
        let generation = preview.generation();

        if self.preview_texture.as_ref().is_some_and(|t| t.generation == generation) {
            return;
        }

        self.preview_texture = preview.image().map(|image| {
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [image.width() as usize, image.height() as usize],
                image.as_raw(),
            );
            let handle = ctx.load_texture(
                format!("preview_{}", generation),
                color_image,
                egui::TextureOptions::LINEAR,
            );
            PreviewTexture { generation, handle }
        });
    }
}

impl eframe::App for PdfEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut commands = Vec::new();

        self.shell.set_max_texture_side(max_texture_side(ctx));
        self.handle_keyboard_shortcuts(ctx, &mut commands);
        self.sync_preview_texture(ctx);
        self.draw_menu_bar(ctx, &mut commands);
        self.draw_toolbar(ctx, &mut commands);
        self.draw_status_bar(ctx);
        self.draw_preview(ctx);
        self.draw_editor(ctx);

        for command in commands {
            self.shell.dispatch(command);
        }
    }
}

/// Texture size limit reported by the renderer backend
fn max_texture_side(ctx: &egui::Context) -> u32 {
    let side = ctx.input(|i| i.max_texture_side);
    u32::try_from(side).unwrap_or(u32::MAX)
}

/// Button for `command`, greyed out while it has nothing to act on
fn command_button(
    ui: &mut egui::Ui,
    text: impl Into<egui::WidgetText>,
    command: Command,
    has_document: bool,
) -> egui::Response {
    ui.add_enabled(has_document || !command.needs_document(), egui::Button::new(text))
}

impl PdfEditorApp {
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        use egui::{Key, Modifiers};

        ctx.input_mut(|i| {
            if i.consume_key(Modifiers::COMMAND, Key::O) {
                commands.push(Command::Open);
            }
            if i.consume_key(Modifiers::COMMAND, Key::S) {
                commands.push(Command::Save);
            }
            if i.consume_key(Modifiers::NONE, Key::PageDown) {
                commands.push(Command::NextPage);
            }
            if i.consume_key(Modifiers::NONE, Key::PageUp) {
                commands.push(Command::PrevPage);
            }
            if i.consume_key(Modifiers::COMMAND, Key::Plus)
                || i.consume_key(Modifiers::COMMAND, Key::Equals)
            {
                commands.push(Command::ZoomIn);
            }
            if i.consume_key(Modifiers::COMMAND, Key::Minus) {
                commands.push(Command::ZoomOut);
            }
        });
    }

    fn draw_menu_bar(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let has_document = self.shell.state().adapter.is_open();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let items = [("Open…", Command::Open), ("Save…", Command::Save)];
                    for (label, command) in items {
                        if command_button(ui, label, command, has_document).clicked() {
                            commands.push(command);
                            ui.close_menu();
                        }
                    }
                });
            });
        });
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let state = self.shell.state();
        let has_document = state.adapter.is_open();
        let style = state.style;
        let page_label = state.page_label();
        let zoom = state.view.zoom;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                if command_button(ui, "◀ Previous", Command::PrevPage, has_document).clicked() {
                    commands.push(Command::PrevPage);
                }
                ui.label(page_label);
                if command_button(ui, "Next ▶", Command::NextPage, has_document).clicked() {
                    commands.push(Command::NextPage);
                }

                ui.separator();

                let zoom_out = command_button(ui, "−", Command::ZoomOut, has_document);
                if zoom_out.on_hover_text("Zoom out").clicked() {
                    commands.push(Command::ZoomOut);
                }
                ui.label(format!("{:.0}%", zoom * 100.0));
                let zoom_in = command_button(ui, "+", Command::ZoomIn, has_document);
                if zoom_in.on_hover_text("Zoom in").clicked() {
                    commands.push(Command::ZoomIn);
                }

                ui.separator();

                egui::ComboBox::from_id_salt("font_family")
                    .selected_text(style.family.label())
                    .width(100.0)
                    .show_ui(ui, |ui| {
                        for family in FontFamilyChoice::ALL {
                            let selected = style.family == family;
                            if ui.selectable_label(selected, family.label()).clicked() {
                                commands.push(Command::SetFontFamily(family));
                            }
                        }
                    });

                let mut size = style.size();
                let response = ui.add(
                    egui::DragValue::new(&mut size)
                        .range(MIN_FONT_SIZE..=MAX_FONT_SIZE)
                        .suffix(" pt"),
                );
                if response.changed() {
                    commands.push(Command::SetFontSize(size));
                }

                ui.separator();

                let toggles = [
                    (style.bold, egui::RichText::new("B").strong(), Command::ToggleBold),
                    (style.italic, egui::RichText::new("I").italics(), Command::ToggleItalic),
                    (
                        style.underline,
                        egui::RichText::new("U").underline(),
                        Command::ToggleUnderline,
                    ),
                ];
                for (active, text, command) in toggles {
                    if ui.selectable_label(active, text).clicked() {
                        commands.push(command);
                    }
                }
            });
        });
    }

    fn draw_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.shell.state().status);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.shell.state().buffer.is_dirty() {
                        ui.weak("Modified");
                    }
                });
            });
        });
    }

    fn draw_preview(&mut self, ctx: &egui::Context) {
        let display_size = self.shell.preview_display_size();

        egui::SidePanel::left("preview")
            .default_width(ctx.screen_rect().width() / 2.0)
            .resizable(true)
            .show(ctx, |ui| {
                let texture = self.preview_texture.as_ref();
                let (Some(texture), Some((width, height))) = (texture, display_size) else {
                    ui.centered_and_justified(|ui| {
                        ui.weak("No page to preview");
                    });
                    return;
                };

                egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                    let size = egui::vec2(width, height);
                    ui.add(egui::Image::new((texture.handle.id(), size)));
                });
            });
    }

    fn draw_editor(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.shell.state().adapter.is_open() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a PDF to get started");
                });
                return;
            }

            let style = self.shell.state().style;
            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                let format = style.text_format(ui.visuals());
                let mut job = egui::text::LayoutJob::single_section(text.to_owned(), format);
                job.wrap.max_width = wrap_width;
                ui.fonts(|fonts| fonts.layout_job(job))
            };

            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                let buffer = self.shell.buffer_mut();
                let response = ui.add(
                    egui::TextEdit::multiline(buffer.text_mut())
                        .desired_width(f32::INFINITY)
                        .desired_rows(30)
                        .layouter(&mut layouter),
                );
                if response.changed() {
                    buffer.mark_edited();
                }
            });
        });
    }
}
