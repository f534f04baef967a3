use crate::command::Command;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::export::{self, ExportMode};
use crate::input::{InputHandler, route_gesture};
use crate::state::{EditorContext, MAX_BRUSH_SIZE, PersistenceAdapter};
use crate::tools::BUILTIN_TOOLS;
use crate::util::time::current_time_secs;
use egui::{Color32, ColorImage, Key, Modifiers, Rect, Sense, TextureHandle, TextureOptions, pos2};
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
const EXPORT_FILE: &str = "pixel-art.png";

/// Hosts an `EditorContext` in an eframe window.
pub struct PaintApp {
    editor: EditorContext,
    input: InputHandler,
    persistence: PersistenceAdapter,
    saves: SaveTasks,
    texture: Option<TextureHandle>,
    new_canvas_size: u32,
    export_scale: u32,
}

impl PaintApp {
    /// Called once before the first frame. Restores the stored document if
    /// there is a usable one.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: EditorConfig,
        persistence: PersistenceAdapter,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let editor = match futures::executor::block_on(persistence.load()) {
            Some(document) => EditorContext::with_document(document, config),
            None => EditorContext::new(config),
        };
        let new_canvas_size = editor.config().canvas_width;
        let export_scale = editor.config().export_scales.first().copied().unwrap_or(1);

        Self {
            editor,
            input: InputHandler::new(),
            persistence,
            saves: SaveTasks::default(),
            texture: None,
            new_canvas_size,
            export_scale,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context, now: f64) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo, play, onion, tool) = ctx.input_mut(|input| {
            // Shift+Z first: the plain binding would match it too.
            let redo = input.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                || input.consume_key(Modifiers::COMMAND, Key::Y);
            let undo = input.consume_key(Modifiers::COMMAND, Key::Z);
            let play = input.consume_key(Modifiers::NONE, Key::Space);
            let onion = input.consume_key(Modifiers::NONE, Key::O);
            let digits = [
                Key::Num1,
                Key::Num2,
                Key::Num3,
                Key::Num4,
                Key::Num5,
                Key::Num6,
                Key::Num7,
                Key::Num8,
            ];
            let tool = digits
                .iter()
                .position(|&key| input.consume_key(Modifiers::NONE, key));
            (undo, redo, play, onion, tool)
        });

        if undo {
            self.editor.undo();
        }
        if redo {
            self.editor.redo();
        }
        if play {
            self.editor.toggle_playback(now);
        }
        if onion {
            let enabled = !self.editor.view.onion_skinning;
            self.editor.set_onion_skinning(enabled);
        }
        if let Some(name) = tool.and_then(|index| BUILTIN_TOOLS.get(index)) {
            self.editor.select_tool(name);
        }
    }

    fn tools_panel(&mut self, ui: &mut egui::Ui, now: f64) {
        ui.heading("Tools");
        let selected = self.editor.document.tool().to_owned();
        let mut pick = None;
        for name in self.editor.tools.names() {
            if ui.selectable_label(selected == name, name).clicked() {
                pick = Some(name);
            }
        }
        if let Some(name) = pick {
            self.editor.select_tool(name);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Color");
            ui.color_edit_button_srgba(&mut self.editor.view.primary_color);
        });
        let mut brush = self.editor.view.brush_size;
        if ui
            .add(egui::Slider::new(&mut brush, 1..=MAX_BRUSH_SIZE).text("Brush"))
            .changed()
        {
            self.editor.view.set_brush_size(brush);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.editor.view.history.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                self.editor.undo();
            }
            if ui
                .add_enabled(self.editor.view.history.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                self.editor.redo();
            }
        });
        let mut onion = self.editor.view.onion_skinning;
        if ui.checkbox(&mut onion, "Onion skin").changed() {
            self.editor.set_onion_skinning(onion);
        }
        let label = if self.editor.view.is_playing() { "Stop" } else { "Play" };
        if ui.button(label).clicked() {
            self.editor.toggle_playback(now);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("New…").clicked() {
                self.editor.view.modals.new_canvas = true;
            }
            if ui.button("Export…").clicked() {
                self.editor.view.modals.export = true;
            }
        });

        ui.separator();
        ui.heading("History");
        let position = self.editor.view.history.position();
        egui::ScrollArea::vertical().id_salt("history").show(ui, |ui| {
            for (index, entry) in self.editor.view.history.entries().iter().enumerate().rev() {
                let text = egui::RichText::new(&entry.action);
                let text = if index < position { text } else { text.weak() };
                ui.label(text);
            }
        });
    }

    fn timeline_panel(&mut self, ui: &mut egui::Ui) {
        let mut command = None;
        let mut select_layer = None;
        let mut select_frame = None;

        ui.horizontal(|ui| {
            ui.label("Layers");
            if ui.small_button("+").clicked() {
                command = Some(Command::AddLayer);
            }
            let active = self.editor.document.active_layer_index();
            if ui.small_button("−").clicked() {
                command = Some(Command::RemoveLayer(active));
            }
            if ui.small_button("▲").clicked() {
                command = Some(Command::MoveLayer {
                    from: active,
                    to: active + 1,
                });
            }
            if ui.small_button("▼").clicked() && active > 0 {
                command = Some(Command::MoveLayer {
                    from: active,
                    to: active - 1,
                });
            }
        });
        // Topmost layer first.
        for (index, layer) in self.editor.document.layers().iter().enumerate().rev() {
            ui.horizontal(|ui| {
                let eye = if layer.hidden { "○" } else { "●" };
                if ui.small_button(eye).clicked() {
                    command = Some(Command::ToggleLayerVisibility(index));
                }
                let active = index == self.editor.document.active_layer_index();
                if ui.selectable_label(active, layer.name.as_str()).clicked() {
                    select_layer = Some(index);
                }
            });
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Frames");
            if ui.small_button("+").clicked() {
                command = Some(Command::AddFrame);
            }
            if ui.small_button("⧉").clicked() {
                command = Some(Command::DuplicateFrame);
            }
            if ui.small_button("−").clicked() {
                command = Some(Command::RemoveFrame(self.editor.document.active_frame_index()));
            }
            for frame in 0..self.editor.document.frame_count() {
                let active = frame == self.editor.document.active_frame_index();
                if ui.selectable_label(active, (frame + 1).to_string()).clicked() {
                    select_frame = Some(frame);
                }
            }
        });

        if let Some(command) = command {
            // Rejections are logged by the editor.
            let _ = self.editor.execute(command);
        }
        if let Some(index) = select_layer {
            if let Err(err) = self.editor.select_layer(index) {
                log::warn!("Cannot select layer {}: {}", index, err);
            }
        }
        if let Some(index) = select_frame {
            if let Err(err) = self.editor.select_frame(index) {
                log::warn!("Cannot select frame {}: {}", index, err);
            }
        }
    }

    fn modals(&mut self, ctx: &egui::Context) {
        if self.editor.view.modals.new_canvas {
            let mut create = false;
            let mut close = false;
            egui::Window::new("New canvas")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    for &size in &self.editor.config().new_canvas_sizes {
                        ui.radio_value(&mut self.new_canvas_size, size, format!("{size}×{size}"));
                    }
                    ui.horizontal(|ui| {
                        create = ui.button("Create").clicked();
                        close = ui.button("Cancel").clicked();
                    });
                });
            if create {
                self.editor.new_canvas(self.new_canvas_size, self.new_canvas_size);
            }
            if create || close {
                self.editor.view.modals.new_canvas = false;
            }
        }

        if self.editor.view.modals.export {
            let mut mode = None;
            let mut close = false;
            egui::Window::new("Export")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for &scale in &self.editor.config().export_scales {
                            ui.radio_value(&mut self.export_scale, scale, format!("{scale}×"));
                        }
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Frame").clicked() {
                            mode = Some(ExportMode::Frame);
                        }
                        if ui.button("Spritesheet").clicked() {
                            mode = Some(ExportMode::Spritesheet);
                        }
                        close = ui.button("Close").clicked();
                    });
                });
            if let Some(mode) = mode {
                self.export(mode);
            }
            if close {
                self.editor.view.modals.export = false;
            }
        }
    }

    fn export(&self, mode: ExportMode) {
        let bytes = match export::export_png(&self.editor.document, mode, self.export_scale) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Export failed: {}", err);
                return;
            }
        };
        write_export(&bytes);
    }

    fn canvas(&mut self, ui: &mut egui::Ui, now: f64) {
        let (width, height) = (self.editor.document.width(), self.editor.document.height());
        let available = ui.available_size();
        let zoom = (available.x / width as f32)
            .min(available.y / height as f32)
            .floor()
            .max(1.0);
        let size = egui::vec2(width as f32 * zoom, height as f32 * zoom);
        let (rect, _response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        self.input.set_canvas(rect, width, height);
        for event in self.input.process_input(ui.ctx(), now) {
            route_gesture(&mut self.editor, &event);
        }
        self.editor.tick_playback(now);

        if self.editor.flush_render() || self.texture.is_none() {
            self.upload_texture(ui.ctx());
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(60));
        if let Some(texture) = &self.texture {
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let output = &self.editor.view.composite_output;
        let image = ColorImage::from_rgba_unmultiplied(
            [output.width() as usize, output.height() as usize],
            output.as_raw(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
    }

    fn poll_autosave(&mut self, now: f64) {
        if let Some(snapshot) = self.editor.poll_autosave(now) {
            self.saves.spawn(self.persistence.clone(), snapshot);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_export(bytes: &[u8]) {
    match std::fs::write(EXPORT_FILE, bytes) {
        Ok(()) => log::info!("Exported {} bytes to {}", bytes.len(), EXPORT_FILE),
        Err(err) => log::error!("Failed to write {}: {}", EXPORT_FILE, err),
    }
}

// Handing the blob to the browser is up to the host page.
#[cfg(target_arch = "wasm32")]
fn write_export(bytes: &[u8]) {
    log::info!("Exported {} bytes", bytes.len());
}

/// Background saves. Overlapping saves are fine: the last write wins.
#[derive(Default)]
struct SaveTasks {
    #[cfg(not(target_arch = "wasm32"))]
    running: Vec<std::thread::JoinHandle<()>>,
}

impl SaveTasks {
    fn spawn(&mut self, persistence: PersistenceAdapter, document: Document) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.running.retain(|handle| !handle.is_finished());
            self.running.push(std::thread::spawn(move || {
                futures::executor::block_on(persistence.save(&document))
            }));
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move { persistence.save(&document).await });
    }

    /// Blocks until every save spawned so far has finished, so that none of
    /// them can land after a later one.
    fn wait(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        for handle in self.running.drain(..) {
            if handle.join().is_err() {
                log::error!("Save thread panicked");
            }
        }
    }

    /// Writes `document` in the foreground once everything in flight is done.
    fn save_now(&mut self, persistence: &PersistenceAdapter, document: &Document) {
        self.wait();
        futures::executor::block_on(persistence.save(document));
    }
}

impl eframe::App for PaintApp {
    /// Called by the framework on shutdown and periodically. Waits for saves
    /// already in flight, then writes the live document.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        self.editor.autosave.take_due(f64::INFINITY);
        self.saves.save_now(&self.persistence, &self.editor.document);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = current_time_secs();
        self.handle_shortcuts(ctx, now);

        egui::SidePanel::left("tools_panel")
            .resizable(false)
            .show(ctx, |ui| self.tools_panel(ui, now));
        egui::TopBottomPanel::bottom("timeline_panel").show(ctx, |ui| self.timeline_panel(ui));
        self.modals(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ui, now);
        });

        self.poll_autosave(now);

        if self.editor.view.is_playing() {
            let fps = self.editor.view.playback.fps.max(1.0);
            ctx.request_repaint_after(Duration::from_secs_f32(1.0 / fps));
        } else if self.editor.autosave.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
