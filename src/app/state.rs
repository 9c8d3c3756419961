//! Main application state.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::TextureHandle;
use memmap2::Mmap;

use super::types::{DigramView, FileData, NgramView, TrigramView, ViewMode};
use crate::gpu::GpuRenderer;
use crate::gram::{self, DigramTable};
use crate::settings::{Settings, ShortcutRegistry};

/// Main application state.
pub struct GramApp {
    /// Loaded file, if any.
    pub file: Option<FileData>,
    /// Pair table for the current file.
    pub table: Option<DigramTable>,
    /// Active view.
    pub view: ViewMode,
    pub digram: DigramView,
    pub trigram: TrigramView,
    pub ngram: NgramView,
    /// Brightness slider value for the point-cloud views.
    pub brightness: i32,
    /// Re-run the brightness heuristic on every refresh.
    pub use_brightness_heuristic: bool,
    /// Persistent settings.
    pub settings: Settings,
    /// Keyboard shortcut registry.
    pub shortcuts: ShortcutRegistry,
    /// GPU renderer; None means CPU fallback.
    pub gpu: Option<GpuRenderer>,
    /// Cached visualisation texture.
    pub texture: Option<TextureHandle>,
    /// Regenerate the texture on the next frame.
    pub needs_redraw: bool,
    /// Options dialog visibility.
    pub show_options: bool,
    /// Hex panel visibility.
    pub show_hex: bool,
    /// Action currently waiting for a key press in the options dialog.
    pub rebind_capture: Option<String>,
    /// Initial file to load (from command-line argument).
    pub initial_file: Option<PathBuf>,
    /// Leftover time toward the next animation tick.
    pub tick_accum: f32,
}

impl GramApp {
    /// Create the application, loading settings and registering shortcuts.
    pub fn new_with_file(cc: &eframe::CreationContext<'_>, initial_file: Option<PathBuf>) -> Self {
        let settings = Settings::load();
        let mut shortcuts = ShortcutRegistry::new();
        Self::register_shortcuts(&mut shortcuts, &settings);

        let gpu = GpuRenderer::new();
        if gpu.is_some() {
            log::info!("GPU acceleration enabled");
        } else {
            log::warn!("GPU acceleration unavailable, using CPU fallback");
        }

        Self::apply_theme(&cc.egui_ctx, &settings.theme);

        Self {
            file: None,
            table: None,
            view: ViewMode::default(),
            digram: DigramView::default(),
            trigram: TrigramView::default(),
            ngram: NgramView::default(),
            brightness: (gram::MIN_BRIGHTNESS + gram::MAX_BRIGHTNESS) / 2,
            use_brightness_heuristic: true,
            settings,
            shortcuts,
            gpu,
            texture: None,
            needs_redraw: false,
            show_options: false,
            show_hex: false,
            rebind_capture: None,
            initial_file,
            tick_accum: 0.0,
        }
    }

    fn register_shortcuts(registry: &mut ShortcutRegistry, settings: &Settings) {
        registry.register(settings, "playpause", "toggle animation", "Space");
        registry.register(settings, "cubeshape", "switch to cube shape", "1");
        registry.register(settings, "cylindershape", "switch to cylinder shape", "2");
        registry.register(settings, "sphereshape", "switch to sphere shape", "3");
        registry.register(settings, "flatmode", "toggle flat mode", "4");
        registry.register(settings, "sorted", "toggle sorted mode", "5");
        registry.register(settings, "layeredmode", "toggle layered mode", "6");
        registry.register(settings, "centerview", "center view", "0");
        registry.register(settings, "openfile", "open a file", "Ctrl+O");
        registry.register(settings, "options", "open options", "Ctrl+Comma");
    }

    /// Apply a theme identifier to the egui context.
    pub fn apply_theme(ctx: &eframe::egui::Context, theme: &str) {
        match theme {
            "light" => ctx.set_visuals(eframe::egui::Visuals::light()),
            _ => ctx.set_visuals(eframe::egui::Visuals::dark()),
        }
    }

    /// Load a file from the given path and rebuild all derived data.
    pub fn load_file(&mut self, path: PathBuf) {
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                log::error!("error opening {}: {e}", path.display());
                return;
            }
        };

        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(m) => m,
            Err(e) => {
                log::error!("error memory-mapping {}: {e}", path.display());
                return;
            }
        };

        let size = mmap.len() as u64;
        if size == 0 {
            log::error!("{} is empty", path.display());
            return;
        }

        let title = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        log::info!("loaded {}: {size} bytes", path.display());

        self.file = Some(FileData {
            data: Arc::new(mmap),
            size,
            path,
            title,
        });
        self.refresh();
    }

    /// Rebuild the pair table, brightness and GPU buffers for the current
    /// file.
    pub fn refresh(&mut self) {
        let Some(file) = &self.file else {
            return;
        };
        let data = &file.data[..];

        let table = DigramTable::build(data);

        if self.use_brightness_heuristic {
            self.brightness = gram::suggest_brightness(data);
        }

        if let Some(gpu) = &mut self.gpu {
            gpu.upload(data, &table.normalized(data.len()));
        }

        self.table = Some(table);
        self.texture = None;
        self.needs_redraw = true;
    }

    /// Shader exposure for the current brightness and file.
    pub fn shader_brightness(&self) -> f32 {
        let len = self.file.as_ref().map_or(0, |f| f.data.len());
        gram::shader_brightness(self.brightness, len)
    }

    /// Whether the active view's rotation is playing.
    pub fn playing(&self) -> bool {
        match self.view {
            ViewMode::Digram => false,
            ViewMode::Trigram => self.trigram.playing,
            ViewMode::Ngram => self.ngram.playing,
        }
    }

    /// Advance the active view by one animation tick.
    pub fn tick_active_view(&mut self) -> bool {
        match self.view {
            ViewMode::Digram => self.digram.tick(),
            ViewMode::Trigram => self.trigram.tick(),
            ViewMode::Ngram => self.ngram.tick(),
        }
    }
}
