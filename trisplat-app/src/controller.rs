//! Control-driven attribute updates for a live triangle splat object.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use trisplat_data::{opacity_activation, opacity_floor_from_percent};
use trisplat_viewer::{
    ButtonId, CameraPose, GuiApi, GuiError, GuiEvent, SceneApi, SceneError,
    SliderConfig, SliderId, SplatHandle, SplatUpdate,
};

pub const SIGMA_MIN: f64 = -15.0;
pub const SIGMA_MAX: f64 = 10.0;
pub const SIGMA_STEP: f64 = 0.1;

pub const OPACITY_SCALE_MIN: f64 = 0.0;
pub const OPACITY_SCALE_MAX: f64 = 100.0;
pub const OPACITY_SCALE_STEP: f64 = 0.5;
pub const OPACITY_SCALE_INITIAL: f64 = 99.0;

/// Widgets driving a splat object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSplatControls {
    pub sigma: SliderId,
    pub opacity_scale: SliderId,
    pub reset: ButtonId,
}

impl TriangleSplatControls {
    /// Create the "Triangle Splats" folder and its widgets.
    ///
    /// The sigma slider starts at the checkpoint's log-domain sigma.
    pub fn build<G: GuiApi>(gui: &mut G, initial_log_sigma: f64) -> Self {
        let folder = gui.add_folder("Triangle Splats");
        let sigma = gui.add_slider(
            Some(folder),
            "Sigma",
            SliderConfig::new(SIGMA_MIN, SIGMA_MAX, SIGMA_STEP, initial_log_sigma),
        );
        let opacity_scale = gui.add_slider(
            Some(folder),
            "Opacity Scale",
            SliderConfig::new(
                OPACITY_SCALE_MIN,
                OPACITY_SCALE_MAX,
                OPACITY_SCALE_STEP,
                OPACITY_SCALE_INITIAL,
            ),
        );
        let reset = gui.add_button(Some(folder), "Reset View");

        Self {
            sigma,
            opacity_scale,
            reset,
        }
    }
}

/// Recomputes attributes from control values and pushes them to the scene.
///
/// Holds no state that events change. The raw vertex weights are kept for the
/// lifetime of the controller; opacities are always re-derived from them.
pub struct AttributeController<S: SceneApi> {
    scene: Rc<RefCell<S>>,
    handle: SplatHandle,
    vertex_weight: Vec<f64>,
    reset_pose: CameraPose,
}

impl<S: SceneApi + 'static> AttributeController<S> {
    pub fn new(
        scene: Rc<RefCell<S>>,
        handle: SplatHandle,
        vertex_weight: Vec<f64>,
        reset_pose: CameraPose,
    ) -> Self {
        Self {
            scene,
            handle,
            vertex_weight,
            reset_pose,
        }
    }

    /// Sigma slider moved to `log_sigma`.
    pub fn on_sigma(&self, log_sigma: f64) -> Result<(), SceneError> {
        let sigma = log_sigma.exp();
        debug!("Sigma -> {} (log {})", sigma, log_sigma);
        self.scene
            .borrow_mut()
            .update(self.handle, SplatUpdate::Sigma(sigma))
    }

    /// Opacity-scale slider moved to `percent`.
    pub fn on_opacity_scale(&self, percent: f64) -> Result<(), SceneError> {
        let floor = opacity_floor_from_percent(percent);
        let opacities = opacity_activation(&self.vertex_weight, floor);
        debug!("Opacity floor -> {} for {} vertices", floor, opacities.len());
        self.scene
            .borrow_mut()
            .update(self.handle, SplatUpdate::Opacities(opacities))
    }

    /// Reset button clicked: move every connected client's camera.
    pub fn on_reset(&self) -> Result<(), SceneError> {
        let mut scene = self.scene.borrow_mut();
        let clients = scene.clients();
        debug!("Resetting {} client camera(s)", clients.len());
        for client in clients {
            scene.set_client_camera(client, self.reset_pose)?;
        }
        Ok(())
    }

    /// Register this controller's handlers on the given widgets.
    pub fn bind<G: GuiApi>(
        self: &Rc<Self>,
        gui: &mut G,
        controls: &TriangleSplatControls,
    ) -> Result<(), GuiError> {
        let this = Rc::clone(self);
        gui.on_update(
            controls.sigma,
            Box::new(move |event: &GuiEvent| match event {
                GuiEvent::SliderChanged { value, .. } => this.on_sigma(*value),
                GuiEvent::ButtonClicked { .. } => Ok(()),
            }),
        )?;

        let this = Rc::clone(self);
        gui.on_update(
            controls.opacity_scale,
            Box::new(move |event: &GuiEvent| match event {
                GuiEvent::SliderChanged { value, .. } => this.on_opacity_scale(*value),
                GuiEvent::ButtonClicked { .. } => Ok(()),
            }),
        )?;

        let this = Rc::clone(self);
        gui.on_click(controls.reset, Box::new(move |_: &GuiEvent| this.on_reset()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use trisplat_data::{DEFAULT_OPACITY_FLOOR, RenderableAttributes, SplatColors};
    use trisplat_viewer::{GuiInput, LocalGui, LocalScene};

    const WEIGHTS: [f64; 4] = [-10.0, 0.0, 10.0, 100.0];

    fn reset_pose() -> CameraPose {
        CameraPose::new(Vec3::splat(3.0), Vec3::ZERO)
    }

    fn setup() -> (Rc<RefCell<LocalScene>>, Rc<AttributeController<LocalScene>>, SplatHandle) {
        let attributes = RenderableAttributes {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            triangle_indices: vec![[0, 1, 2], [1, 2, 3]],
            opacities: opacity_activation(&WEIGHTS, DEFAULT_OPACITY_FLOOR),
            sigma: 1.0,
            vertex_weights: WEIGHTS.to_vec(),
            colors: SplatColors::Direct {
                colors: vec![[128, 128, 128]; 4],
            },
        };
        let scene = Rc::new(RefCell::new(LocalScene::new()));
        let handle = scene
            .borrow_mut()
            .add_triangle_splats("/triangle_splats", attributes)
            .unwrap();
        let controller = Rc::new(AttributeController::new(
            Rc::clone(&scene),
            handle,
            WEIGHTS.to_vec(),
            reset_pose(),
        ));
        (scene, controller, handle)
    }

    #[test]
    fn test_sigma_event_exponentiates() {
        let (scene, controller, handle) = setup();

        controller.on_sigma(0.0).unwrap();
        assert_eq!(scene.borrow().splat(handle).unwrap().attributes.sigma, 1.0);

        controller.on_sigma(-15.0).unwrap();
        let sigma = scene.borrow().splat(handle).unwrap().attributes.sigma;
        assert_eq!(sigma, (-15.0f64).exp());
        assert!((sigma - 3.059e-7).abs() < 1e-9);
    }

    #[test]
    fn test_sigma_event_idempotent() {
        let (scene, controller, handle) = setup();

        controller.on_sigma(1.3).unwrap();
        let first = scene.borrow().splat(handle).unwrap().attributes.clone();
        controller.on_sigma(1.3).unwrap();
        let second = scene.borrow().splat(handle).unwrap().attributes.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sigma_leaves_opacities_alone() {
        let (scene, controller, handle) = setup();
        let before = scene.borrow().splat(handle).unwrap().attributes.opacities.clone();
        controller.on_sigma(2.0).unwrap();
        assert_eq!(scene.borrow().splat(handle).unwrap().attributes.opacities, before);
    }

    #[test]
    fn test_opacity_scale_replaces_buffer() {
        let (scene, controller, handle) = setup();

        controller.on_opacity_scale(99.0).unwrap();
        let opacities = scene.borrow().splat(handle).unwrap().attributes.opacities.clone();
        assert_eq!(opacities, opacity_activation(&WEIGHTS, 0.99));
        assert!(opacities.iter().all(|&o| (0.99..=1.0).contains(&o)));

        controller.on_opacity_scale(0.0).unwrap();
        let opacities = scene.borrow().splat(handle).unwrap().attributes.opacities.clone();
        assert_eq!(opacities, opacity_activation(&WEIGHTS, 0.0));
        assert_eq!(opacities[1], 0.5);
    }

    #[test]
    fn test_opacity_scale_uses_raw_weights_not_previous_opacities() {
        let (scene, controller, handle) = setup();

        controller.on_opacity_scale(10.0).unwrap();
        controller.on_opacity_scale(50.0).unwrap();
        let chained = scene.borrow().splat(handle).unwrap().attributes.opacities.clone();

        let (fresh_scene, fresh, fresh_handle) = setup();
        fresh.on_opacity_scale(50.0).unwrap();
        let direct = fresh_scene
            .borrow()
            .splat(fresh_handle)
            .unwrap()
            .attributes
            .opacities
            .clone();

        assert_eq!(chained, direct);
    }

    #[test]
    fn test_reset_moves_every_client() {
        let (scene, controller, _) = setup();
        let a = scene
            .borrow_mut()
            .connect_client(CameraPose::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::ONE));
        let b = scene
            .borrow_mut()
            .connect_client(CameraPose::new(Vec3::new(10.0, 10.0, 10.0), Vec3::X));

        controller.on_reset().unwrap();

        for client in [a, b] {
            let pose = scene.borrow().client_camera(client).unwrap();
            assert_eq!(pose.position, Vec3::new(3.0, 3.0, 3.0));
            assert_eq!(pose.look_at, Vec3::ZERO);
        }
    }

    #[test]
    fn test_reset_without_clients() {
        let (_, controller, _) = setup();
        controller.on_reset().unwrap();
    }

    #[test]
    fn test_controls_layout() {
        let mut gui = LocalGui::new();
        let controls = TriangleSplatControls::build(&mut gui, -3.25);

        assert_eq!(gui.slider_value(controls.sigma).unwrap(), -3.25);
        assert_eq!(gui.slider_value(controls.opacity_scale).unwrap(), 99.0);
        assert_eq!(
            gui.slider_config(controls.sigma).unwrap(),
            SliderConfig::new(-15.0, 10.0, 0.1, -3.25)
        );
        assert_eq!(
            gui.slider_config(controls.opacity_scale).unwrap(),
            SliderConfig::new(0.0, 100.0, 0.5, 99.0)
        );
    }

    #[test]
    fn test_bound_handlers_drive_scene() {
        let (scene, controller, handle) = setup();
        let client = scene.borrow_mut().connect_client(CameraPose::new(Vec3::ONE, Vec3::X));
        let mut gui = LocalGui::new();
        let controls = TriangleSplatControls::build(&mut gui, 0.0);
        controller.bind(&mut gui, &controls).unwrap();

        gui.apply(GuiInput::SetSlider {
            slider: controls.sigma,
            value: 0.0,
        })
        .unwrap();
        gui.apply(GuiInput::SetSlider {
            slider: controls.opacity_scale,
            value: 99.0,
        })
        .unwrap();
        gui.apply(GuiInput::Click {
            button: controls.reset,
        })
        .unwrap();

        let scene = scene.borrow();
        let node = scene.splat(handle).unwrap();
        assert_eq!(node.attributes.sigma, 1.0);
        assert_eq!(node.attributes.opacities, opacity_activation(&WEIGHTS, 0.99));
        assert_eq!(node.revision, 2);
        assert_eq!(scene.client_camera(client), Some(reset_pose()));
    }

    #[test]
    fn test_out_of_range_slider_input_is_clamped_before_push() {
        let (scene, controller, handle) = setup();
        let mut gui = LocalGui::new();
        let controls = TriangleSplatControls::build(&mut gui, 0.0);
        controller.bind(&mut gui, &controls).unwrap();

        gui.apply(GuiInput::SetSlider {
            slider: controls.sigma,
            value: -1000.0,
        })
        .unwrap();
        assert_eq!(
            scene.borrow().splat(handle).unwrap().attributes.sigma,
            (-15.0f64).exp()
        );
    }

    #[test]
    fn test_typed_sigma_reaches_scene_exactly() {
        let (scene, controller, handle) = setup();
        let mut gui = LocalGui::new();
        let controls = TriangleSplatControls::build(&mut gui, 0.0);
        controller.bind(&mut gui, &controls).unwrap();

        gui.apply(GuiInput::SetSlider {
            slider: controls.sigma,
            value: 0.3,
        })
        .unwrap();
        assert_eq!(gui.slider_value(controls.sigma).unwrap(), 0.3);
        assert_eq!(
            scene.borrow().splat(handle).unwrap().attributes.sigma,
            0.3f64.exp()
        );
    }

    #[test]
    fn test_push_failure_propagates_through_dispatch() {
        let (_, _, foreign_handle) = setup();
        let scene = Rc::new(RefCell::new(LocalScene::new()));
        let controller = Rc::new(AttributeController::new(
            Rc::clone(&scene),
            foreign_handle,
            WEIGHTS.to_vec(),
            reset_pose(),
        ));
        let mut gui = LocalGui::new();
        let controls = TriangleSplatControls::build(&mut gui, 0.0);
        controller.bind(&mut gui, &controls).unwrap();

        let err = gui
            .apply(GuiInput::SetSlider {
                slider: controls.sigma,
                value: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, GuiError::Handler(SceneError::UnknownHandle(_))));
    }
}
