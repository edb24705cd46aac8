#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use legged_gym::{Contact, ControlMode, EnvConfig, EnvError, PhysicsWorld, Result, VisualizationBridge, WalkerEnv};
use nalgebra::DVector;

pub const ANYMAL_URDF: &str = "rsc/anymal/urdf/anymal.urdf";

/// Scripted stand-in for a rigid-body simulator.
///
/// Joints track their PD targets perfectly on every substep and the base drifts
/// with its velocity. Contacts and the reported generalized force are whatever
/// the test puts in.
pub struct FakeWorld {
    pub gc_dim: usize,
    pub gv_dim: usize,
    pub bodies: HashMap<String, usize>,
    pub fail_load: bool,
    pub loaded: Option<PathBuf>,
    pub robot_name: String,
    pub control_mode: Option<ControlMode>,
    pub has_ground: bool,
    pub time_step: f64,
    pub gc: DVector<f64>,
    pub gv: DVector<f64>,
    pub p_gain: DVector<f64>,
    pub d_gain: DVector<f64>,
    pub applied_force: Option<DVector<f64>>,
    pub position_target: DVector<f64>,
    pub velocity_target: DVector<f64>,
    pub generalized_force: DVector<f64>,
    pub contacts: Vec<Contact>,
    pub integrations: usize,
    pub render_lock: Option<Arc<Mutex<()>>>,
    pub integrations_while_locked: usize,
}

impl FakeWorld {
    /// Quadruped with 12 joints; body 0 is the base, shanks are 3, 6, 9 and 12.
    pub fn anymal() -> Self {
        let mut bodies = HashMap::new();
        bodies.insert("BASE".to_string(), 0);
        for (leg, name) in ["LF", "RF", "LH", "RH"].iter().enumerate() {
            bodies.insert(format!("{name}_HIP"), 3 * leg + 1);
            bodies.insert(format!("{name}_THIGH"), 3 * leg + 2);
            bodies.insert(format!("{name}_SHANK"), 3 * leg + 3);
        }
        Self::with_dims(19, 18, bodies)
    }

    pub fn with_dims(gc_dim: usize, gv_dim: usize, bodies: HashMap<String, usize>) -> Self {
        Self {
            gc_dim,
            gv_dim,
            bodies,
            fail_load: false,
            loaded: None,
            robot_name: String::new(),
            control_mode: None,
            has_ground: false,
            time_step: 0.005,
            gc: DVector::zeros(gc_dim),
            gv: DVector::zeros(gv_dim),
            p_gain: DVector::zeros(gv_dim),
            d_gain: DVector::zeros(gv_dim),
            applied_force: None,
            position_target: DVector::zeros(gc_dim),
            velocity_target: DVector::zeros(gv_dim),
            generalized_force: DVector::zeros(gv_dim),
            contacts: Vec::new(),
            integrations: 0,
            render_lock: None,
            integrations_while_locked: 0,
        }
    }

    pub fn shank_ids() -> [usize; 4] { [3, 6, 9, 12] }
}

impl PhysicsWorld for FakeWorld {
    fn load_robot(&mut self, description: &Path) -> Result<()> {
        if self.fail_load {
            return Err(EnvError::RobotLoad { path: description.to_path_buf(), reason: "no such file".into() });
        }
        self.loaded = Some(description.to_path_buf());
        Ok(())
    }

    fn set_robot_name(&mut self, name: &str) { self.robot_name = name.to_string(); }

    fn set_control_mode(&mut self, mode: ControlMode) { self.control_mode = Some(mode); }

    fn add_ground(&mut self) { self.has_ground = true; }

    fn generalized_coordinate_dim(&self) -> usize { self.gc_dim }

    fn degrees_of_freedom(&self) -> usize { self.gv_dim }

    fn body_index(&self, name: &str) -> Option<usize> { self.bodies.get(name).copied() }

    fn set_pd_gains(&mut self, p_gain: &DVector<f64>, d_gain: &DVector<f64>) {
        self.p_gain = p_gain.clone();
        self.d_gain = d_gain.clone();
    }

    fn set_generalized_force(&mut self, force: &DVector<f64>) { self.applied_force = Some(force.clone()); }

    fn set_state(&mut self, gc: &DVector<f64>, gv: &DVector<f64>) {
        self.gc = gc.clone();
        self.gv = gv.clone();
    }

    fn get_state(&self, gc: &mut DVector<f64>, gv: &mut DVector<f64>) {
        gc.copy_from(&self.gc);
        gv.copy_from(&self.gv);
    }

    fn set_pd_target(&mut self, position_target: &DVector<f64>, velocity_target: &DVector<f64>) {
        self.position_target = position_target.clone();
        self.velocity_target = velocity_target.clone();
    }

    fn generalized_force(&self) -> DVector<f64> { self.generalized_force.clone() }

    fn contacts(&self) -> Vec<Contact> { self.contacts.clone() }

    fn set_time_step(&mut self, dt: f64) { self.time_step = dt; }

    fn integrate(&mut self) {
        self.integrations += 1;
        if let Some(lock) = &self.render_lock {
            if lock.try_lock().is_err() {
                self.integrations_while_locked += 1;
            }
        }
        for i in 0..3 {
            self.gc[i] += self.gv[i] * self.time_step;
        }
        for i in 7..self.gc_dim {
            self.gc[i] = self.position_target[i];
        }
    }
}

/// Records every call so tests can check what the environment asked for.
pub struct FakeBridge {
    pub lock: Arc<Mutex<()>>,
    pub events: Arc<Mutex<Vec<String>>>,
    pub fail_launch: bool,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self { lock: Arc::new(Mutex::new(())), events: Arc::new(Mutex::new(Vec::new())), fail_launch: false }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl VisualizationBridge for FakeBridge {
    fn launch(&mut self) -> Result<()> {
        if self.fail_launch {
            return Err(EnvError::Visualization("port in use".into()));
        }
        self.record("launch");
        Ok(())
    }

    fn focus_on(&mut self, object_name: &str) { self.record(format!("focus:{object_name}")); }

    fn render_lock(&self) -> &Mutex<()> { &self.lock }

    fn hibernate(&mut self) { self.record("hibernate"); }

    fn wakeup(&mut self) { self.record("wakeup"); }

    fn start_recording_video(&mut self, name: &str) { self.record(format!("record:{name}")); }

    fn stop_recording_video(&mut self) { self.record("stop_recording"); }

    fn kill(&mut self) { self.record("kill"); }
}

pub fn anymal_env() -> WalkerEnv<FakeWorld> {
    WalkerEnv::new(FakeWorld::anymal(), ANYMAL_URDF, EnvConfig::default()).expect("fake anymal should load")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
