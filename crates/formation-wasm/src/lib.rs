use formation_core::camera::{CameraRig, CameraTransform, IntroPhase};
use formation_core::config::SceneConfig;
use formation_core::element::AssetHandle;
use formation_core::scene::Scene;
use formation_core::timeline::Mode;
use glam::{Quat, Vec2, Vec3};
use wasm_bindgen::prelude::*;

pub mod shaders;

/// GPU-compatible element pose: 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuElementPose {
    position: [f32; 3],    // 12 bytes
    scale: f32,            //  4 bytes
    orientation: [f32; 4], // 16 bytes, xyzw
}

/// GPU-compatible snow particle attributes: 32 bytes, matches WGSL Particle
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuSnowParticle {
    position: [f32; 3], // 12 bytes
    size: f32,          //  4 bytes
    drift: f32,
    fall_speed: f32,
    phase: f32,
    _pad: f32,
}

/// CPU snow kernel output: 32 bytes per particle.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuSnowVertex {
    position: [f32; 3], // 12 bytes
    point_size: f32,    //  4 bytes
    alpha: f32,
    _pad: [f32; 3],
}

/// Camera block of the snow shader: 144 bytes, matches WGSL Camera
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuCameraUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    viewport: [f32; 2],
    _pad: [f32; 2],
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            _ => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route `log` records to the browser console. Safe to call repeatedly.
#[wasm_bindgen]
pub fn init_logging(verbose: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }
}

/// WGSL source of the snow field program.
#[wasm_bindgen]
pub fn snow_shader_source() -> String {
    shaders::SNOW_WGSL.to_string()
}

fn to_js(err: formation_core::FormationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct FormationWorld {
    scene: Scene,
    camera: CameraTransform,
    /// Drives `camera` until the host sets a camera explicitly.
    rig: Option<CameraRig>,
    pointer: Option<Vec2>,
    viewport: [f32; 2],
    pose_buffer: Vec<GpuElementPose>,
    snow_buffer: Vec<GpuSnowParticle>,
    /// Filled only by `simulate_snow_cpu`.
    snow_vertex_buffer: Vec<GpuSnowVertex>,
    camera_uniforms: GpuCameraUniforms,
}

#[wasm_bindgen]
impl FormationWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(element_count: usize, seed: u32) -> Result<FormationWorld, JsValue> {
        init_logging(false);
        let scene = Scene::new(element_count, seed as u64, SceneConfig::default()).map_err(to_js)?;

        web_sys::console::log_1(
            &format!(
                "WASM FormationWorld created: {} elements, {} snow particles",
                element_count,
                scene.snow_particles().len()
            )
            .into(),
        );

        let snow_buffer = scene
            .snow_particles()
            .iter()
            .map(|p| GpuSnowParticle {
                position: p.base_position.to_array(),
                size: p.size,
                drift: p.drift,
                fall_speed: p.fall_speed,
                phase: p.phase,
                _pad: 0.0,
            })
            .collect();

        let mut world = FormationWorld {
            pose_buffer: vec![bytemuck::Zeroable::zeroed(); scene.elements().len()],
            scene,
            camera: CameraTransform::default(),
            rig: Some(CameraRig::new()),
            pointer: None,
            viewport: [1280.0, 720.0],
            snow_buffer,
            snow_vertex_buffer: Vec::new(),
            camera_uniforms: bytemuck::Zeroable::zeroed(),
        };
        world.write_gpu_output();
        Ok(world)
    }

    /// Construct with a seed drawn from the platform's random source.
    pub fn with_random_seed(element_count: usize) -> Result<FormationWorld, JsValue> {
        let mut bytes = [0u8; 4];
        getrandom::getrandom(&mut bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        FormationWorld::new(element_count, u32::from_le_bytes(bytes))
    }

    /// Advance one frame. Returns the time spent in milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32) -> f32 {
        let start = js_sys::Date::now();
        if let Some(rig) = self.rig.as_mut() {
            rig.set_aspect(self.camera.aspect);
            rig.update(dt);
            self.camera = *rig.camera();
        }
        self.scene.step(dt, &self.camera, self.pointer);
        self.write_gpu_output();
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    #[wasm_bindgen]
    pub fn set_camera(
        &mut self,
        px: f32, py: f32, pz: f32,
        qx: f32, qy: f32, qz: f32, qw: f32,
        fov_y: f32,
        aspect: f32,
    ) {
        let position = Vec3::new(px, py, pz);
        let orientation = Quat::from_xyzw(qx, qy, qz, qw);
        if !position.is_finite() || !orientation.is_finite() || orientation.length_squared() < 1e-12 {
            log::warn!("ignoring invalid camera transform");
            return;
        }
        self.rig = None;
        self.camera.position = position;
        self.camera.orientation = orientation.normalize();
        if fov_y.is_finite() && fov_y > 0.0 && fov_y < std::f32::consts::PI {
            self.camera.fov_y = fov_y;
        }
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    #[wasm_bindgen]
    pub fn look_at(&mut self, px: f32, py: f32, pz: f32, tx: f32, ty: f32, tz: f32) {
        let looking = CameraTransform::looking_at(Vec3::new(px, py, pz), Vec3::new(tx, ty, tz));
        if looking.position.is_finite() && looking.orientation.is_finite() {
            self.rig = None;
            self.camera.position = looking.position;
            self.camera.orientation = looking.orientation;
        }
    }

    #[wasm_bindgen]
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = [width, height];
            self.camera.aspect = width / height;
        }
    }

    /// Intro camera phase: 0 = waiting, 1 = opening, 2 = finished.
    /// Re-attaches the intro rig if the host had taken over the camera.
    #[wasm_bindgen]
    pub fn set_intro_phase(&mut self, phase: u8) {
        let phase = match phase {
            0 => IntroPhase::Waiting,
            1 => IntroPhase::Opening,
            _ => IntroPhase::Finished,
        };
        let rig = self.rig.get_or_insert_with(CameraRig::new);
        rig.set_aspect(self.camera.aspect);
        rig.set_phase(phase);
        self.camera = *rig.camera();
    }

    /// Pointer in normalized device coordinates ([-1,1] per axis).
    #[wasm_bindgen]
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    #[wasm_bindgen]
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    #[wasm_bindgen]
    pub fn set_progress(&mut self, progress: f32) {
        self.scene.set_progress(progress);
    }

    #[wasm_bindgen]
    pub fn begin_forming(&mut self, duration: f32) {
        self.scene.begin_forming(duration);
    }

    #[wasm_bindgen]
    pub fn scatter(&mut self, duration: f32) {
        self.scene.scatter(duration);
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f32 {
        self.scene.progress()
    }

    /// 0 = chaos, 1 = forming, 2 = formed.
    #[wasm_bindgen]
    pub fn mode(&self) -> u8 {
        match self.scene.mode() {
            Mode::Chaos => 0,
            Mode::Forming => 1,
            Mode::Formed => 2,
        }
    }

    #[wasm_bindgen]
    pub fn set_memory_mode(&mut self, active: bool) {
        self.scene.set_memory_mode(active);
    }

    /// Toggle selection; returns the selected index or -1.
    #[wasm_bindgen]
    pub fn select(&mut self, index: usize) -> Result<i32, JsValue> {
        let selected = self.scene.select(index).map_err(to_js)?;
        Ok(selected.map_or(-1, |i| i as i32))
    }

    /// Selected element index or -1.
    #[wasm_bindgen]
    pub fn selected(&self) -> i32 {
        self.scene.selected().map_or(-1, |i| i as i32)
    }

    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    #[wasm_bindgen]
    pub fn attach_asset(&mut self, index: usize, handle: u32) -> Result<(), JsValue> {
        self.scene.attach_asset(index, Some(AssetHandle(handle))).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn element_count(&self) -> usize {
        self.scene.elements().len()
    }

    #[wasm_bindgen]
    pub fn snow_particle_count(&self) -> usize {
        self.snow_buffer.len()
    }

    #[wasm_bindgen]
    pub fn attractor(&self) -> Vec<f32> {
        self.scene.attractor().to_array().to_vec()
    }

    /// Let the CPU snow fallback shed particles to hold `budget_ms`.
    #[wasm_bindgen]
    pub fn set_adaptive_quality(&mut self, enabled: bool, budget_ms: f32) {
        self.scene.quality.enabled = enabled;
        if budget_ms.is_finite() && budget_ms > 0.0 {
            self.scene.quality.budget_ms = budget_ms;
        }
    }

    /// Run the snow kernel on the CPU for hosts without WebGPU.
    ///
    /// Fills the snow vertex buffer with the particles kept by adaptive
    /// quality and returns the kernel time in milliseconds, which is also
    /// fed back into adaptive quality.
    #[wasm_bindgen]
    pub fn simulate_snow_cpu(&mut self) -> f32 {
        let start = js_sys::Date::now();
        let view = self.camera.view_matrix();
        let vertices = self.scene.simulate_snow(&view);
        self.snow_vertex_buffer.clear();
        self.snow_vertex_buffer.extend(vertices.iter().map(|v| GpuSnowVertex {
            position: v.position.to_array(),
            point_size: v.point_size,
            alpha: v.alpha,
            _pad: [0.0; 3],
        }));
        let elapsed = (js_sys::Date::now() - start) as f32;
        self.scene.record_snow_time(elapsed);
        elapsed
    }

    /// Number of particles written by the last `simulate_snow_cpu`.
    #[wasm_bindgen]
    pub fn snow_vertex_count(&self) -> usize {
        self.snow_vertex_buffer.len()
    }

    #[wasm_bindgen]
    pub fn get_snow_vertex_buffer_ptr(&self) -> *const f32 {
        self.snow_vertex_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_snow_vertex_buffer_byte_length(&self) -> usize {
        self.snow_vertex_buffer.len() * std::mem::size_of::<GpuSnowVertex>()
    }

    #[wasm_bindgen]
    pub fn get_pose_buffer_ptr(&self) -> *const f32 {
        self.pose_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_pose_buffer_byte_length(&self) -> usize {
        self.pose_buffer.len() * std::mem::size_of::<GpuElementPose>()
    }

    #[wasm_bindgen]
    pub fn get_snow_buffer_ptr(&self) -> *const f32 {
        self.snow_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_snow_buffer_byte_length(&self) -> usize {
        self.snow_buffer.len() * std::mem::size_of::<GpuSnowParticle>()
    }

    /// Snow uniform block bytes for the current frame.
    #[wasm_bindgen]
    pub fn snow_uniform_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(self.scene.snow_uniforms()).to_vec()
    }

    /// Camera uniform block bytes for the current frame.
    #[wasm_bindgen]
    pub fn camera_uniform_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(&self.camera_uniforms).to_vec()
    }
}

impl FormationWorld {
    fn write_gpu_output(&mut self) {
        for (slot, pose) in self.pose_buffer.iter_mut().zip(self.scene.poses()) {
            *slot = GpuElementPose {
                position: pose.position.to_array(),
                scale: pose.scale,
                orientation: pose.orientation.to_array(),
            };
        }
        self.camera_uniforms = GpuCameraUniforms {
            view: self.camera.view_matrix().to_cols_array_2d(),
            proj: self.camera.projection_matrix().to_cols_array_2d(),
            viewport: self.viewport,
            _pad: [0.0; 2],
        };
    }
}
