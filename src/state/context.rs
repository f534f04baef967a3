//! The editing session.
//!
//! `EditorContext` owns the document together with everything that is not
//! persisted: scratch buffers, history, the tool registry and the compositor.
//! All mutations go through it so that renders and autosaves can be requested
//! in one place.

use super::{SaveScheduler, ViewState};
use crate::command::{Command, CommandResult};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentResult};
use crate::renderer::Renderer;
use crate::tools::ToolRegistry;

#[derive(Debug)]
pub struct EditorContext {
    pub document: Document,
    pub view: ViewState,
    pub tools: ToolRegistry,
    pub renderer: Renderer,
    pub autosave: SaveScheduler,
    config: EditorConfig,
}

impl EditorContext {
    /// Starts a session on a blank canvas of the configured size.
    pub fn new(config: EditorConfig) -> Self {
        let document = Document::new(config.canvas_width, config.canvas_height);
        Self::with_document(document, config)
    }

    /// Starts a session on an existing, already validated document.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        let mut view = ViewState::new(document.width(), document.height());
        view.history = crate::command::CommandHistory::with_limit(config.history_limit);
        view.playback.fps = config.playback_fps;

        Self {
            document,
            view,
            tools: ToolRegistry::with_builtins(),
            renderer: Renderer::new(&config),
            autosave: SaveScheduler::new(config.autosave_debounce_secs),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Marks the output stale. Any number of requests within one tick collapse
    /// into a single render at `flush_render`.
    pub fn request_render(&mut self) {
        self.view.render_requested = true;
    }

    /// Renders if anything requested it since the last render.
    pub fn flush_render(&mut self) -> bool {
        if !self.view.render_requested {
            return false;
        }
        self.render();
        true
    }

    /// Renders unconditionally.
    pub fn render(&mut self) {
        self.renderer.render(&self.document, &mut self.view);
    }

    /// Drops an open gesture and its preview without committing. Tools capture
    /// document state at `start`, so nothing that edits the document may run
    /// underneath them.
    fn abandon_gesture(&mut self) {
        if self.view.gesture.pointer_down {
            log::debug!("Abandoning open gesture");
            self.view.gesture.reset();
            self.view.clear_preview();
        }
    }

    fn schedule_save(&mut self) {
        self.autosave.schedule(crate::util::time::current_time_secs());
    }

    pub fn undo(&mut self) -> bool {
        self.abandon_gesture();
        let undone = self.view.history.undo(&mut self.document);
        if undone {
            self.after_history_step();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_gesture();
        let redone = self.view.history.redo(&mut self.document);
        if redone {
            self.after_history_step();
        }
        redone
    }

    fn after_history_step(&mut self) {
        self.view.clear_preview();
        self.request_render();
        self.schedule_save();
    }

    /// Applies a timeline edit through history. Rejected commands leave the
    /// document untouched.
    pub fn execute(&mut self, command: Command) -> CommandResult {
        self.abandon_gesture();
        let label = command.label();
        match self.view.history.execute(command, &mut self.document) {
            Ok(()) => {
                self.view.clear_preview();
                self.request_render();
                self.schedule_save();
                Ok(())
            }
            Err(err) => {
                log::warn!("'{}' rejected: {}", label, err);
                Err(err)
            }
        }
    }

    pub fn select_layer(&mut self, index: usize) -> DocumentResult<()> {
        self.abandon_gesture();
        self.document.select_layer(index)?;
        self.view.clear_preview();
        self.request_render();
        self.schedule_save();
        Ok(())
    }

    pub fn select_frame(&mut self, index: usize) -> DocumentResult<()> {
        self.abandon_gesture();
        self.document.select_frame(index)?;
        self.view.clear_preview();
        self.request_render();
        self.schedule_save();
        Ok(())
    }

    /// Selects the tool the canvas dispatches to. Unknown names are ignored.
    pub fn select_tool(&mut self, name: &str) -> bool {
        if !self.tools.contains(name) {
            log::debug!("Ignoring unknown tool '{}'", name);
            return false;
        }
        self.abandon_gesture();
        self.document.set_tool(name);
        self.view.clear_preview();
        self.request_render();
        self.schedule_save();
        true
    }

    /// Replaces the document with a blank one. History is cleared; the
    /// selected tool carries over.
    pub fn new_canvas(&mut self, width: u32, height: u32) {
        let tool = self.document.tool().to_owned();
        let mut document = Document::new(width, height);
        document.set_tool(&tool);
        self.replace_document(document);
        log::info!(
            "Created new {}x{} canvas",
            self.document.width(),
            self.document.height()
        );
    }

    /// Swaps in another document, e.g. one just loaded from storage.
    pub fn replace_document(&mut self, document: Document) {
        self.view.resize(document.width(), document.height());
        self.view.history.clear();
        self.view.gesture.reset();
        self.document = document;
        self.request_render();
        self.schedule_save();
    }

    pub fn set_onion_skinning(&mut self, enabled: bool) {
        if self.view.onion_skinning != enabled {
            self.view.onion_skinning = enabled;
            self.request_render();
        }
    }

    pub fn set_playing(&mut self, playing: bool, now: f64) {
        if self.view.playback.playing == playing {
            return;
        }
        if playing {
            // Gestures are ignored while playing, so an open one can never end.
            self.abandon_gesture();
            self.view.clear_preview();
            self.view.playback.last_tick = now;
        } else {
            // Playback moved the active frame.
            self.autosave.schedule(now);
        }
        self.view.playback.playing = playing;
        self.request_render();
    }

    pub fn toggle_playback(&mut self, now: f64) {
        self.set_playing(!self.view.playback.playing, now);
    }

    /// Advances the active frame while playing. Returns true if the frame changed.
    pub fn tick_playback(&mut self, now: f64) -> bool {
        let playback = &mut self.view.playback;
        if !playback.playing || playback.fps <= 0.0 {
            return false;
        }
        let interval = 1.0 / playback.fps as f64;
        if now - playback.last_tick < interval {
            return false;
        }
        playback.last_tick = now;

        let next = (self.document.active_frame_index() + 1) % self.document.frame_count();
        if let Err(err) = self.document.select_frame(next) {
            log::error!("Playback could not select frame {}: {}", next, err);
            return false;
        }
        self.request_render();
        true
    }

    /// Returns a snapshot to save when the debounce deadline has passed.
    ///
    /// The snapshot shares raster storage with the live document, so taking it
    /// costs one clone of the layer table.
    pub fn poll_autosave(&mut self, now: f64) -> Option<Document> {
        self.autosave
            .take_due(now)
            .then(|| self.document.clone())
    }
}
