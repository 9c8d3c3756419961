//! Gramscope - binary file structure visualiser.
//!
//! Renders byte-pair and byte-triple frequency distributions of a memory
//! mapped file as a 2D digram texture and 3D point clouds, with animated
//! morphs between projections.

#![warn(clippy::all)]

mod anim;
mod app;
mod gpu;
mod gram;
mod settings;
mod util;
mod viz;

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, Color32, ColorImage, Key, Sense};
use glam::{Mat4, Vec2 as GVec2, Vec3};

use anim::TICK_SECONDS;
use app::{DigramShape, GramApp, SolidShape, TrigramMode, ViewMode};
use gram::{MAX_BRIGHTNESS, MIN_BRIGHTNESS};
use settings::KeyBinding;
use util::color::BACKGROUND;
use util::format::hex_row;
use util::format_bytes;
use viz::{generate_cloud_pixels, generate_digram_pixels, BlendCoeffs, CloudParams};

/// Side length of the visualisation texture.
const TEX_SIZE: usize = 512;

/// CPU scatter budget; larger files are subsampled down to roughly this
/// many points per frame.
const MAX_CPU_POINTS: usize = 2_000_000;

// =============================================================================
// Application Implementation
// =============================================================================

impl GramApp {
    // -------------------------------------------------------------------------
    // Input handling
    // -------------------------------------------------------------------------

    /// Advance animation state on a fixed ~16ms tick, independent of the
    /// actual frame rate.
    fn advance_animation(&mut self, ctx: &egui::Context) {
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        self.tick_accum += dt;

        let mut animating = false;
        while self.tick_accum >= TICK_SECONDS {
            self.tick_accum -= TICK_SECONDS;
            animating |= self.tick_active_view();
        }

        if animating {
            self.needs_redraw = true;
        }
        if animating || self.playing() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }

    /// Dispatch registered shortcuts to the active view.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.rebind_capture.is_some() {
            return;
        }

        if self.shortcuts.triggered(ctx, "openfile") {
            self.open_file_dialog();
        }
        if self.shortcuts.triggered(ctx, "options") {
            self.show_options = !self.show_options;
        }

        let mut changed = false;
        match self.view {
            ViewMode::Digram => {}
            ViewMode::Trigram => {
                if self.shortcuts.triggered(ctx, "playpause") {
                    self.trigram.toggle_play();
                    changed = true;
                }
                for (action, shape) in [
                    ("cubeshape", SolidShape::Cube),
                    ("cylindershape", SolidShape::Cylinder),
                    ("sphereshape", SolidShape::Sphere),
                ] {
                    if self.shortcuts.triggered(ctx, action) {
                        self.trigram.shape = shape;
                        changed = true;
                    }
                }
                if self.shortcuts.triggered(ctx, "layeredmode") {
                    let mode = match self.trigram.mode {
                        TrigramMode::LayeredDigram => TrigramMode::Trigram,
                        TrigramMode::Trigram => TrigramMode::LayeredDigram,
                    };
                    self.trigram.set_mode(mode, true);
                    changed = true;
                }
            }
            ViewMode::Ngram => {
                if self.shortcuts.triggered(ctx, "playpause") {
                    self.ngram.toggle_play();
                    changed = true;
                }
                for (action, shape) in [
                    ("cubeshape", SolidShape::Cube),
                    ("cylindershape", SolidShape::Cylinder),
                    ("sphereshape", SolidShape::Sphere),
                ] {
                    if self.shortcuts.triggered(ctx, action) {
                        self.ngram.shape = shape;
                        changed = true;
                    }
                }
                if self.shortcuts.triggered(ctx, "flatmode") {
                    self.ngram.flat = !self.ngram.flat;
                    changed = true;
                }
                let combine = ctx.input(|i| i.modifiers.shift);
                if self.shortcuts.triggered(ctx, "sorted") {
                    let value = !self.ngram.layered_x;
                    self.ngram.set_layered_x(value, combine);
                    changed = true;
                }
                if self.shortcuts.triggered(ctx, "layeredmode") && !self.ngram.flat {
                    let value = !self.ngram.layered_z;
                    self.ngram.set_layered_z(value, combine);
                    changed = true;
                }
                if self.shortcuts.triggered(ctx, "centerview") {
                    self.ngram.center_view();
                    changed = true;
                }
            }
        }
        if changed {
            self.needs_redraw = true;
        }
    }

    /// Map held keys to the n-gram camera movement vector.
    fn update_camera_input(&mut self, ctx: &egui::Context) {
        if self.view != ViewMode::Ngram || self.rebind_capture.is_some() {
            return;
        }

        self.ngram.camera.movement = ctx.input(|i| {
            let shift = i.modifiers.shift;
            let mut movement = Vec3::ZERO;

            if i.key_down(Key::ArrowLeft) || i.key_down(Key::A) {
                movement.x = 1.0;
            }
            if i.key_down(Key::ArrowRight) || i.key_down(Key::D) {
                movement.x = -1.0;
            }
            if i.key_down(Key::ArrowDown) || i.key_down(Key::S) {
                if shift {
                    movement.z = -1.0;
                } else {
                    movement.y = 1.0;
                }
            }
            if i.key_down(Key::ArrowUp) || i.key_down(Key::W) {
                if shift {
                    movement.z = 1.0;
                } else {
                    movement.y = -1.0;
                }
            }
            if i.key_down(Key::PageDown) || i.key_down(Key::Q) {
                movement.z = -1.0;
            }
            if i.key_down(Key::PageUp) || i.key_down(Key::E) {
                movement.z = 1.0;
            }

            movement
        });
    }

    /// While the options dialog is waiting for a key, capture the next press
    /// as the new binding. Escape cancels. Returns true while a capture is
    /// in progress so the key does not also fire as a shortcut.
    fn handle_rebind_capture(&mut self, ctx: &egui::Context) -> bool {
        let Some(action) = self.rebind_capture.clone() else {
            return false;
        };

        let captured = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => Some((*key, *modifiers)),
                _ => None,
            })
        });

        if let Some((key, modifiers)) = captured {
            if key != Key::Escape {
                self.shortcuts
                    .rebind(&mut self.settings, &action, KeyBinding::new(key, modifiers));
                self.save_settings();
            }
            self.rebind_capture = None;
        }
        true
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            log::error!("failed to save settings: {e:#}");
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_file() {
            self.load_file(path);
        }
    }

    // -------------------------------------------------------------------------
    // Texture generation
    // -------------------------------------------------------------------------

    /// Perspective projection fixed to the narrow axis of the viewport.
    fn perspective_matrix(size: egui::Vec2) -> Mat4 {
        let fov = 45f32.to_radians();
        let (width, height) = (size.x.max(1.0), size.y.max(1.0));
        if width > height {
            Mat4::perspective_rh(fov, width / height, 0.01, 100.0)
        } else {
            // Fix the field of view to x instead of y: rotate the world a
            // quarter turn, apply the swapped-aspect projection, rotate back.
            let quarter = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
            quarter * Mat4::perspective_rh(fov, height / width, 0.01, 100.0) * quarter.inverse()
        }
    }

    /// Combined view-projection transform for the active view.
    fn view_proj(&self, size: egui::Vec2) -> Mat4 {
        match self.view {
            ViewMode::Digram => Mat4::IDENTITY,
            ViewMode::Trigram => {
                Self::perspective_matrix(size)
                    * Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
                    * Mat4::from_quat(self.trigram.arcball.rotation)
            }
            ViewMode::Ngram => {
                Self::perspective_matrix(size)
                    * Mat4::from_translation(self.ngram.camera.position)
                    * Mat4::from_quat(self.ngram.arcball.rotation)
            }
        }
    }

    /// Blend coefficients of the active view.
    fn active_coeffs(&self) -> BlendCoeffs {
        match self.view {
            ViewMode::Digram => BlendCoeffs::default(),
            ViewMode::Trigram => self.trigram.coeffs(),
            ViewMode::Ngram => self.ngram.coeffs(),
        }
    }

    /// Regenerate the visualisation texture, preferring the GPU path.
    fn generate_texture(&mut self, ctx: &egui::Context, view_size: egui::Vec2) {
        if self.file.is_none() || self.table.is_none() {
            return;
        }

        let view_proj = self.view_proj(view_size);
        let params = gpu::FrameParams {
            view_proj,
            square: self.digram.square.value(),
            circle: self.digram.circle.value(),
            coeffs: self.active_coeffs(),
            brightness: self.shader_brightness(),
        };
        let gpu_mode = match self.view {
            ViewMode::Digram => gpu::GpuViewMode::Digram,
            ViewMode::Trigram | ViewMode::Ngram => gpu::GpuViewMode::Cloud,
        };

        let image = match &self.gpu {
            Some(gpu) if gpu.is_ready() => {
                let rgba = gpu.render(gpu_mode, TEX_SIZE as u32, &params);
                let pixels = rgba
                    .chunks_exact(4)
                    .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
                    .collect();
                Some(ColorImage {
                    size: [TEX_SIZE, TEX_SIZE],
                    pixels,
                })
            }
            _ => self.generate_cpu_image(&params),
        };

        if let Some(image) = image {
            self.texture =
                Some(ctx.load_texture("gram_view", image, egui::TextureOptions::NEAREST));
        }
    }

    /// CPU fallback for the active view.
    fn generate_cpu_image(&self, params: &gpu::FrameParams) -> Option<ColorImage> {
        let file = self.file.as_ref()?;
        let table = self.table.as_ref()?;
        let data = &file.data[..];

        let pixels = match self.view {
            ViewMode::Digram => generate_digram_pixels(
                table,
                data.len(),
                TEX_SIZE,
                params.square,
                params.circle,
            ),
            ViewMode::Trigram | ViewMode::Ngram => {
                let total = data.len().saturating_sub(2);
                let stride = total / MAX_CPU_POINTS + 1;
                generate_cloud_pixels(
                    data,
                    TEX_SIZE,
                    &CloudParams {
                        view_proj: params.view_proj,
                        coeffs: params.coeffs,
                        brightness: params.brightness,
                        stride,
                    },
                )
            }
        };

        Some(ColorImage {
            size: [TEX_SIZE, TEX_SIZE],
            pixels,
        })
    }

    // -------------------------------------------------------------------------
    // UI
    // -------------------------------------------------------------------------

    fn toolbar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open…").clicked() {
                self.open_file_dialog();
            }
            ui.separator();

            let before = self.view;
            for mode in ViewMode::all() {
                ui.selectable_value(&mut self.view, *mode, mode.name());
            }
            if self.view != before {
                self.needs_redraw = true;
            }

            ui.separator();
            ui.toggle_value(&mut self.show_hex, "Hex");
            if ui.button("Options").clicked() {
                self.show_options = !self.show_options;
            }

            if let Some(file) = &self.file {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} — {}", file.title, format_bytes(file.size)));
                });
            }
        });
    }

    /// Per-view controls in the right panel.
    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        match self.view {
            ViewMode::Digram => {
                ui.label("Shape");
                ui.horizontal(|ui| {
                    changed |= ui
                        .selectable_value(&mut self.digram.shape, DigramShape::Square, "Square")
                        .changed();
                    changed |= ui
                        .selectable_value(&mut self.digram.shape, DigramShape::Circle, "Circle")
                        .changed();
                });
            }
            ViewMode::Trigram => {
                changed |= self.brightness_ui(ui);
                ui.separator();

                if ui
                    .button(if self.trigram.playing { "Pause" } else { "Play" })
                    .clicked()
                {
                    self.trigram.toggle_play();
                }

                ui.label("Shape");
                ui.horizontal(|ui| {
                    for (shape, name) in [
                        (SolidShape::Cube, "Cube"),
                        (SolidShape::Cylinder, "Cylinder"),
                        (SolidShape::Sphere, "Sphere"),
                    ] {
                        changed |= ui
                            .selectable_value(&mut self.trigram.shape, shape, name)
                            .changed();
                    }
                });

                let mut layered = self.trigram.mode == TrigramMode::LayeredDigram;
                if ui.checkbox(&mut layered, "Layered digram").changed() {
                    let mode = if layered {
                        TrigramMode::LayeredDigram
                    } else {
                        TrigramMode::Trigram
                    };
                    self.trigram.set_mode(mode, true);
                    changed = true;
                }
            }
            ViewMode::Ngram => {
                changed |= self.brightness_ui(ui);
                ui.separator();

                if ui
                    .button(if self.ngram.playing { "Pause" } else { "Play" })
                    .clicked()
                {
                    self.ngram.toggle_play();
                }

                ui.label("Shape");
                ui.horizontal(|ui| {
                    for (shape, name) in [
                        (SolidShape::Cube, "Cube"),
                        (SolidShape::Cylinder, "Cylinder"),
                        (SolidShape::Sphere, "Sphere"),
                    ] {
                        changed |= ui
                            .selectable_value(&mut self.ngram.shape, shape, name)
                            .changed();
                    }
                });

                ui.label("Mode");
                let mut flat = self.ngram.flat;
                if ui.checkbox(&mut flat, "Flat").changed() {
                    self.ngram.flat = flat;
                    changed = true;
                }
                let combine = ui.input(|i| i.modifiers.shift);
                let mut layered_x = self.ngram.layered_x;
                if ui.checkbox(&mut layered_x, "Sorted (layer along x)").changed() {
                    self.ngram.set_layered_x(layered_x, combine);
                    changed = true;
                }
                let mut layered_z = self.ngram.layered_z;
                if ui
                    .add_enabled(
                        !self.ngram.flat,
                        egui::Checkbox::new(&mut layered_z, "Layered (layer along z)"),
                    )
                    .changed()
                {
                    self.ngram.set_layered_z(layered_z, combine);
                    changed = true;
                }

                ui.separator();
                if ui.button("Center view").clicked() {
                    self.ngram.center_view();
                    changed = true;
                }
            }
        }

        if changed {
            self.needs_redraw = true;
        }
    }

    /// Brightness slider plus the heuristic checkbox.
    fn brightness_ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.label("Brightness");
        if ui
            .add(egui::Slider::new(
                &mut self.brightness,
                MIN_BRIGHTNESS..=MAX_BRIGHTNESS,
            ))
            .changed()
        {
            // Touching the slider takes over from the heuristic.
            self.use_brightness_heuristic = false;
            changed = true;
        }

        let mut auto = self.use_brightness_heuristic;
        if ui
            .checkbox(&mut auto, "Automatically adjust brightness")
            .changed()
        {
            self.use_brightness_heuristic = auto;
            if auto {
                if let Some(file) = &self.file {
                    self.brightness = gram::suggest_brightness(&file.data);
                }
                changed = true;
            }
        }

        changed
    }

    fn hex_panel_ui(&mut self, ui: &mut egui::Ui) {
        let Some(file) = &self.file else {
            ui.label("No file loaded");
            return;
        };
        let data = &file.data[..];

        let columns = if self.settings.hex_columns_auto {
            (((ui.available_width() - 140.0) / 28.0).floor() as usize).clamp(4, 64)
        } else {
            self.settings.hex_columns.clamp(4, 64)
        };

        let total_rows = data.len().div_ceil(columns);
        let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show_rows(ui, row_height, total_rows, |ui, range| {
                for row in range {
                    ui.monospace(hex_row(data, row * columns, columns));
                }
            });
    }

    fn options_window_ui(&mut self, ctx: &egui::Context) {
        if !self.show_options {
            return;
        }
        let mut open = self.show_options;
        egui::Window::new("Options")
            .open(&mut open)
            .default_width(380.0)
            .show(ctx, |ui| self.options_ui(ui));
        self.show_options = open;
        if !self.show_options {
            self.rebind_capture = None;
        }
    }

    fn options_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Appearance");
        let mut theme = self.settings.theme.clone();
        egui::ComboBox::from_label("Theme")
            .selected_text(theme.clone())
            .show_ui(ui, |ui| {
                for id in ["dark", "light"] {
                    ui.selectable_value(&mut theme, id.to_string(), id);
                }
            });
        if theme != self.settings.theme {
            self.settings.theme = theme;
            Self::apply_theme(ui.ctx(), &self.settings.theme);
            self.save_settings();
        }

        ui.separator();
        ui.heading("Hex view");
        let mut settings_changed = false;
        settings_changed |= ui
            .checkbox(
                &mut self.settings.hex_columns_auto,
                "Fit columns to window width",
            )
            .changed();
        let enabled = !self.settings.hex_columns_auto;
        ui.horizontal(|ui| {
            ui.label("Columns");
            settings_changed |= ui
                .add_enabled(
                    enabled,
                    egui::DragValue::new(&mut self.settings.hex_columns).range(4..=64),
                )
                .changed();
        });
        if settings_changed {
            self.save_settings();
        }

        ui.separator();
        ui.heading("Shortcuts");
        let rows: Vec<(String, String, String)> = self
            .shortcuts
            .entries()
            .iter()
            .map(|s| (s.action.clone(), s.description.clone(), s.binding.label()))
            .collect();
        egui::Grid::new("shortcut_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (action, description, label) in rows {
                    ui.label(description);
                    let capturing = self.rebind_capture.as_deref() == Some(action.as_str());
                    let text = if capturing {
                        "press a key…".to_string()
                    } else {
                        label
                    };
                    if ui.button(text).clicked() {
                        self.rebind_capture = Some(action);
                    }
                    ui.end_row();
                }
            });
        if self.rebind_capture.is_some() {
            ui.weak("Esc cancels");
        }
    }

    fn central_ui(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_size();

        if self.file.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label("Drop a binary file here or press Ctrl+O");
            });
            return;
        }

        if self.needs_redraw || self.texture.is_none() {
            self.generate_texture(ui.ctx(), avail);
            self.needs_redraw = false;
        }

        let (rect, response) = ui.allocate_exact_size(avail, Sense::click_and_drag());
        ui.painter().rect_filled(rect, 0.0, BACKGROUND);
        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        self.handle_view_interaction(ui, &response, rect);
    }

    fn handle_view_interaction(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: egui::Rect,
    ) {
        let viewport = GVec2::new(rect.width(), rect.height());

        match self.view {
            ViewMode::Digram => {}
            ViewMode::Trigram => {
                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != egui::Vec2::ZERO {
                        self.trigram
                            .arcball
                            .drag(GVec2::new(delta.x, delta.y), viewport);
                        self.needs_redraw = true;
                    }
                }
                if response.clicked() {
                    self.trigram.toggle_play();
                }
            }
            ViewMode::Ngram => {
                if response.drag_started() {
                    self.ngram.arcball.stop();
                }
                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != egui::Vec2::ZERO {
                        self.ngram
                            .arcball
                            .drag(GVec2::new(delta.x, delta.y), viewport);
                        self.needs_redraw = true;
                    }
                }
                if response.drag_stopped() {
                    // A hard fling while paused resumes the spin, damped.
                    if !self.ngram.playing && self.ngram.arcball.angular_speed > 5.0 {
                        self.ngram.arcball.angular_speed /= 15.0;
                        self.ngram.playing = true;
                    }
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        self.ngram.camera.nudge_z(scroll);
                        self.needs_redraw = true;
                        ui.ctx().request_repaint();
                    }
                }
            }
        }
    }
}

// =============================================================================
// eframe Integration
// =============================================================================

impl eframe::App for GramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Load initial file from command-line argument (first frame only)
        if let Some(path) = self.initial_file.take() {
            self.load_file(path);
        }

        // Handle file drops
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.load_file(path);
        }

        let capturing = self.handle_rebind_capture(ctx);
        if !capturing {
            self.handle_shortcuts(ctx);
        }
        self.update_camera_input(ctx);
        self.advance_animation(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar_ui(ui));
        egui::TopBottomPanel::bottom("hex")
            .resizable(true)
            .default_height(180.0)
            .show_animated(ctx, self.show_hex, |ui| self.hex_panel_ui(ui));
        egui::SidePanel::right("controls")
            .default_width(210.0)
            .show(ctx, |ui| self.controls_ui(ui));
        self.options_window_ui(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.central_ui(ui));
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let initial_file = if args.len() > 1 {
        let path = PathBuf::from(&args[1]);
        if path.exists() {
            Some(path)
        } else {
            log::warn!("file not found: {}", args[1]);
            None
        }
    } else {
        None
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Gramscope",
        options,
        Box::new(move |cc| Ok(Box::new(GramApp::new_with_file(cc, initial_file)))),
    )
}
