//! Application wiring and main run loop with builder pattern.

use crate::console::{USAGE, spawn_console};
use crate::controller::{AttributeController, TriangleSplatControls};
use crate::error::AppError;
use glam::Vec3;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, info, warn};
use trisplat_data::{
    ColorMode, DEFAULT_CHECKPOINT_PATH, RenderableAttributes, SplatCheckpoint, load_checkpoint,
};
use trisplat_viewer::{
    CameraPose, GuiApi, LocalGui, LocalScene, SceneApi, SplatHandle, Theme,
};

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

/// Scene and panel layout.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub theme: Theme,
    pub splat_name: String,
    pub frame_name: String,
    pub axes_length: f32,
    pub axes_radius: f32,
    /// Pose applied to every client by the reset button.
    pub reset_pose: CameraPose,
    /// Pose of the client connected at startup.
    pub initial_camera: CameraPose,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            theme: Theme { dark_mode: true },
            splat_name: "/triangle_splats".to_string(),
            frame_name: "/frame".to_string(),
            axes_length: 1.0,
            axes_radius: 0.02,
            reset_pose: CameraPose::new(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO),
            initial_camera: CameraPose::default(),
        }
    }
}

/// A loaded checkpoint wired into a scene and a control panel.
pub struct Viewer {
    pub handle: SplatHandle,
    pub controls: TriangleSplatControls,
}

impl Viewer {
    /// Add the splat object and frame gizmo to the scene, build the control
    /// panel and bind its handlers.
    pub fn setup<S: SceneApi + 'static, G: GuiApi>(
        scene: Rc<RefCell<S>>,
        gui: &mut G,
        checkpoint: &SplatCheckpoint,
        color_mode: ColorMode,
        config: &ViewerConfig,
    ) -> Result<Self, AppError> {
        gui.configure_theme(config.theme);

        let attributes = RenderableAttributes::from_checkpoint(checkpoint, color_mode);
        let handle = scene
            .borrow_mut()
            .add_triangle_splats(&config.splat_name, attributes)?;
        scene
            .borrow_mut()
            .add_frame(&config.frame_name, config.axes_length, config.axes_radius)?;

        let controls = TriangleSplatControls::build(gui, checkpoint.sigma);
        let controller = Rc::new(AttributeController::new(
            scene,
            handle,
            checkpoint.vertex_weight.clone(),
            config.reset_pose,
        ));
        controller.bind(gui, &controls)?;

        Ok(Self { handle, controls })
    }
}

/// Builder for configuring and running the application.
pub struct AppBuilder {
    checkpoint_path: PathBuf,
    color_mode: ColorMode,
    logging: LoggingConfig,
    viewer: ViewerConfig,
    console: bool,
}

impl AppBuilder {
    /// Create a new AppBuilder with default settings.
    pub fn new() -> Self {
        Self {
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            color_mode: ColorMode::default(),
            logging: LoggingConfig::default(),
            viewer: ViewerConfig::default(),
            console: true,
        }
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Configure logging.
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = config;
        self
    }

    /// Enable or disable the stdin control source.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Run the application. Returns only on error; otherwise serves until
    /// the process is interrupted.
    pub fn run(self) -> Result<(), AppError> {
        self.init_logging();

        let checkpoint = load_checkpoint(&self.checkpoint_path)?;

        let scene = Rc::new(RefCell::new(LocalScene::new()));
        scene.borrow_mut().connect_client(self.viewer.initial_camera);
        let mut gui = LocalGui::new();
        let viewer = Viewer::setup(
            Rc::clone(&scene),
            &mut gui,
            &checkpoint,
            self.color_mode,
            &self.viewer,
        )?;

        debug!("Splat object {:?} bound to {:?}", viewer.handle, viewer.controls);
        info!("Viewer ready with {} colors", self.color_mode);
        info!("Use the Sigma slider to soften or sharpen triangle edges");
        info!("Use the Opacity Scale slider to adjust the opacity floor");
        info!("Use Reset View to move every camera back to the default pose");

        if self.console {
            let (sender, receiver) = mpsc::channel();
            match spawn_console(viewer.controls, sender) {
                Ok(_) => {
                    println!("{USAGE}");
                    gui.run(receiver)?;
                }
                Err(e) => warn!("Could not start console: {}", e),
            }
        }

        info!("Serving until interrupted");
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn init_logging(&self) {
        #[cfg(feature = "tracy")]
        {
            if self.logging.enable_tracy {
                use tracing_subscriber::Layer;
                use tracing_subscriber::layer::SubscriberExt;
                use tracing_subscriber::util::SubscriberInitExt;
                let result = tracing_subscriber::registry()
                    .with(tracing_tracy::TracyLayer::default())
                    .with(
                        tracing_subscriber::fmt::layer().with_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env()
                                .unwrap_or_else(|_| self.logging.level.clone().into()),
                        ),
                    )
                    .try_init();
                report_logging_init(result);
                return;
            }
        }

        let result = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.logging.level)),
            )
            .with_target(false)
            .try_init();
        report_logging_init(result);
    }
}

/// A second `run` in the same process (tests) finds a subscriber already
/// installed; keep using it.
fn report_logging_init<E: std::fmt::Display>(result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("Keeping existing tracing subscriber: {}", e);
            false
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trisplat_data::{
        DEFAULT_OPACITY_FLOOR, FIXED_SH_DEGREE, LoadError, ShCoefficients, SplatColors,
        opacity_activation,
    };
    use trisplat_viewer::{GuiInput, SliderConfig};

    fn checkpoint() -> SplatCheckpoint {
        let vertex_weight = vec![-10.0, 0.0, 10.0, 100.0];
        SplatCheckpoint {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            triangle_indices: vec![[0, 1, 2], [1, 2, 3]],
            opacities: opacity_activation(&vertex_weight, DEFAULT_OPACITY_FLOOR),
            vertex_weight,
            sigma: -2.0,
            active_sh_degree: 3,
            sh_degree: FIXED_SH_DEGREE,
            features_dc: vec![Vec3::ZERO, Vec3::ONE, -Vec3::ONE, Vec3::X],
            features_rest: ShCoefficients::new(15, vec![Vec3::ZERO; 60]),
        }
    }

    #[test]
    fn test_viewer_config_defaults() {
        let config = ViewerConfig::default();
        assert!(config.theme.dark_mode);
        assert_eq!(config.axes_length, 1.0);
        assert_eq!(config.axes_radius, 0.02);
        assert_eq!(config.reset_pose.position, Vec3::splat(3.0));
        assert_eq!(config.reset_pose.look_at, Vec3::ZERO);
    }

    #[test]
    fn test_setup_populates_scene_and_panel() {
        let scene = Rc::new(RefCell::new(LocalScene::new()));
        let mut gui = LocalGui::new();
        let config = ViewerConfig::default();
        let ckpt = checkpoint();

        let viewer = Viewer::setup(
            Rc::clone(&scene),
            &mut gui,
            &ckpt,
            ColorMode::Direct,
            &config,
        )
        .unwrap();

        let scene_ref = scene.borrow();
        let node = scene_ref.splat(viewer.handle).unwrap();
        assert_eq!(node.name, "/triangle_splats");
        assert_eq!(node.attributes.sigma, (-2.0f64).exp());
        assert_eq!(node.attributes.opacities, ckpt.opacities);
        assert!(matches!(node.attributes.colors, SplatColors::Direct { .. }));
        assert_eq!(scene_ref.frames().len(), 1);
        assert_eq!(scene_ref.frames()[0].name, "/frame");

        assert!(gui.theme().dark_mode);
        assert_eq!(gui.slider_value(viewer.controls.sigma).unwrap(), -2.0);
        assert_eq!(
            gui.slider_config(viewer.controls.opacity_scale).unwrap(),
            SliderConfig::new(0.0, 100.0, 0.5, 99.0)
        );
    }

    #[test]
    fn test_setup_binds_handlers() {
        let scene = Rc::new(RefCell::new(LocalScene::new()));
        let client = scene
            .borrow_mut()
            .connect_client(CameraPose::new(Vec3::new(0.0, 9.0, 0.0), Vec3::X));
        let mut gui = LocalGui::new();
        let viewer = Viewer::setup(
            Rc::clone(&scene),
            &mut gui,
            &checkpoint(),
            ColorMode::SphericalHarmonics,
            &ViewerConfig::default(),
        )
        .unwrap();

        gui.apply(GuiInput::SetSlider {
            slider: viewer.controls.sigma,
            value: 0.0,
        })
        .unwrap();
        gui.apply(GuiInput::Click {
            button: viewer.controls.reset,
        })
        .unwrap();

        let scene = scene.borrow();
        assert_eq!(scene.splat(viewer.handle).unwrap().attributes.sigma, 1.0);
        assert_eq!(
            scene.client_camera(client),
            Some(CameraPose::new(Vec3::splat(3.0), Vec3::ZERO))
        );
    }

    #[test]
    fn test_setup_rejects_name_clash() {
        let scene = Rc::new(RefCell::new(LocalScene::new()));
        let mut gui = LocalGui::new();
        let config = ViewerConfig {
            frame_name: "/triangle_splats".to_string(),
            ..ViewerConfig::default()
        };
        let result = Viewer::setup(scene, &mut gui, &checkpoint(), ColorMode::Direct, &config);
        assert!(matches!(result, Err(AppError::Scene(_))));
    }

    #[test]
    fn test_logging_init_reports_existing_subscriber() {
        let first = tracing_subscriber::fmt().with_test_writer().try_init();
        let second = tracing_subscriber::fmt().with_test_writer().try_init();
        assert!(second.is_err());
        assert!(!report_logging_init(second));
        assert!(report_logging_init(Ok::<(), String>(())));
        drop(first);
    }

    #[test]
    fn test_run_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppBuilder::new()
            .with_checkpoint_path(dir.path().join("missing.json"))
            .with_console(false)
            .run();
        assert!(matches!(result, Err(AppError::Load(LoadError::Io { .. }))));
    }
}
