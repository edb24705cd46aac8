//! Legged locomotion environment.
//!
//! [`WalkerEnv`] owns one physics world with a ground plane and a single
//! articulated robot. Each control step denormalizes the policy action into PD
//! joint targets, integrates a fixed number of simulation substeps, refreshes
//! the generalized state and observation, and returns the locomotion reward.
//! Termination is queried separately with [`WalkerEnv::is_terminal_state`].

use std::path::Path;
use std::sync::PoisonError;

use nalgebra::DVector;
use rand::distributions::{Distribution, Uniform};

use crate::config::{self, EnvConfig, InitConstants};
use crate::control::{ActionNormalizer, PdGains};
use crate::core::{Env, EnvError, Info, InfoValue, Result, Step};
use crate::observation::{Observation, ObservationBuilder};
use crate::physics::{ControlMode, PhysicsWorld};
use crate::reward::{FootContactSet, Termination};
use crate::spaces::BoxSpace;
use crate::state::{default_init_pose, GeneralizedState, PdTarget, BASE_GC_DIM, BASE_GV_DIM};
use crate::utils::rng::{rng_from_seed, RngStream};
use crate::visualization::VisualizationBridge;

/// Extension point for progressive task difficulty.
pub trait Curriculum: Send {
    /// Called by the training loop between iterations.
    fn update(&mut self) {}
}

/// Curriculum that never changes anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCurriculum;

impl Curriculum for NoCurriculum {}

pub struct WalkerEnv<W: PhysicsWorld> {
    world: W,
    visualizer: Option<Box<dyn VisualizationBridge>>,
    curriculum: Box<dyn Curriculum>,
    config: EnvConfig,

    gc_dim: usize,
    gv_dim: usize,
    n_joints: usize,

    state: GeneralizedState,
    init_state: GeneralizedState,
    pd_target: PdTarget,
    gains: PdGains,
    normalizer: ActionNormalizer,

    builder: ObservationBuilder,
    observation: Observation,
    feet: FootContactSet,

    rng: RngStream,
    closed: bool,
}

impl<W: PhysicsWorld> WalkerEnv<W> {
    /// Build a headless environment from the robot description at `description`.
    pub fn new(world: W, description: impl AsRef<Path>, config: EnvConfig) -> Result<Self> {
        Self::build(world, description.as_ref(), config, None)
    }

    /// Build an environment mirrored by `bridge`. The bridge is launched and focused on the robot.
    pub fn with_visualizer(
        world: W,
        description: impl AsRef<Path>,
        config: EnvConfig,
        bridge: Box<dyn VisualizationBridge>,
    ) -> Result<Self> {
        Self::build(world, description.as_ref(), config, Some(bridge))
    }

    fn build(
        mut world: W,
        description: &Path,
        config: EnvConfig,
        mut visualizer: Option<Box<dyn VisualizationBridge>>,
    ) -> Result<Self> {
        config.validate()?;

        world.load_robot(description)?;
        world.set_robot_name(&config.robot_name);
        world.set_control_mode(ControlMode::PdPlusFeedforwardTorque);
        world.add_ground();
        world.set_time_step(config.simulation_dt);

        let gc_dim = world.generalized_coordinate_dim();
        let gv_dim = world.degrees_of_freedom();
        if gv_dim < BASE_GV_DIM || gc_dim != gv_dim + 1 {
            return Err(EnvError::InvalidModel(format!(
                "expected a floating-base model with gcDim = gvDim + 1, got gcDim {gc_dim}, gvDim {gv_dim}"
            )));
        }
        let n_joints = gv_dim - BASE_GV_DIM;

        let init_state = default_init_pose(gc_dim, gv_dim);

        let gains = PdGains::uniform(gv_dim, config.joint_p_gain, config.joint_d_gain);
        world.set_pd_gains(&gains.p_gain, &gains.d_gain);
        world.set_generalized_force(&DVector::zeros(gv_dim));

        let normalizer = ActionNormalizer::centered_on(init_state.joint_angles(), config.action_std);
        let builder = ObservationBuilder::new(n_joints);

        let feet = config
            .foot_bodies
            .iter()
            .map(|name| world.body_index(name).ok_or_else(|| EnvError::MissingBody(name.clone())))
            .collect::<Result<Vec<_>>>()?;
        let feet = FootContactSet::new(feet);

        if let Some(bridge) = visualizer.as_mut() {
            tracing::info!("Starting visualization thread...");
            bridge.launch()?;
            bridge.focus_on(&config.robot_name);
        }

        tracing::info!(
            path = %description.display(),
            gc_dim,
            gv_dim,
            n_joints,
            ob_dim = builder.ob_dim(),
            "walker environment ready"
        );
        if !config::is_whole_ratio(config.control_dt, config.simulation_dt) {
            tracing::warn!(
                control_dt = config.control_dt,
                simulation_dt = config.simulation_dt,
                "control time step is not a whole multiple of the simulation time step"
            );
        }

        Ok(Self {
            world,
            visualizer,
            curriculum: Box::new(NoCurriculum),
            gc_dim,
            gv_dim,
            n_joints,
            state: GeneralizedState::zeros(gc_dim, gv_dim),
            init_state,
            pd_target: PdTarget::zeros(gc_dim, gv_dim),
            gains,
            normalizer,
            observation: Observation::zeros(builder.ob_dim()),
            builder,
            feet,
            rng: rng_from_seed(0),
            closed: false,
            config,
        })
    }

    /// Override the initial state, action normalization and PD gains at once.
    ///
    /// # Panics
    /// On any length mismatch, a non-positive action std, or nonzero base gains.
    pub fn configure(&mut self, constants: InitConstants) {
        let InitConstants { init_positions, init_velocities, action_mean, action_std, p_gain, d_gain } =
            constants;
        assert_eq!(init_positions.len(), self.gc_dim, "init positions must have length gcDim");
        assert_eq!(init_velocities.len(), self.gv_dim, "init velocities must have length gvDim");
        assert_eq!(action_mean.len(), self.n_joints, "action mean must have length actionDim");
        assert_eq!(action_std.len(), self.n_joints, "action std must have length actionDim");
        assert_eq!(p_gain.len(), self.gv_dim, "p gain must have length gvDim");
        assert_eq!(d_gain.len(), self.gv_dim, "d gain must have length gvDim");
        assert!(
            p_gain.rows(0, BASE_GV_DIM).iter().chain(d_gain.rows(0, BASE_GV_DIM).iter()).all(|&g| g == 0.0),
            "base gains must be zero, the floating base is not actuated"
        );

        self.init_state = GeneralizedState { positions: init_positions, velocities: init_velocities };
        self.normalizer = ActionNormalizer::new(action_mean, action_std);
        self.gains = PdGains { p_gain, d_gain };
        self.world.set_pd_gains(&self.gains.p_gain, &self.gains.d_gain);
    }

    /// Put the robot in its initial state and compute the first observation.
    pub fn init(&mut self) {
        self.apply_init_state();
    }

    pub fn reset(&mut self) {
        tracing::debug!("reset");
        self.apply_init_state();
    }

    fn apply_init_state(&mut self) {
        self.state.clone_from(&self.init_state);
        let noise = self.config.init_noise;
        if noise > 0.0 {
            let dist = Uniform::new_inclusive(-noise, noise);
            for q in self.state.positions.iter_mut().skip(BASE_GC_DIM) {
                *q += dist.sample(&mut self.rng);
            }
        }
        self.world.set_state(&self.state.positions, &self.state.velocities);
        self.update_observation();
    }

    /// Apply `action` for one control step and return the reward.
    ///
    /// # Panics
    /// When `action.len() != action_dim()`.
    pub fn step(&mut self, action: &[f32]) -> f32 {
        self.normalizer.denormalize_into(action, self.pd_target.joint_targets_mut());
        self.world.set_pd_target(&self.pd_target.position, &self.pd_target.velocity);

        for _ in 0..self.substeps() {
            match &self.visualizer {
                Some(bridge) => {
                    let _frame = bridge.render_lock().lock().unwrap_or_else(PoisonError::into_inner);
                    self.world.integrate();
                }
                None => self.world.integrate(),
            }
        }

        self.update_observation();

        let force = self.world.generalized_force();
        let reward = self.config.reward.reward(&force, self.observation.forward_velocity()) as f32;
        tracing::trace!(reward, "step");
        reward
    }

    fn update_observation(&mut self) {
        self.world.get_state(&mut self.state.positions, &mut self.state.velocities);
        self.builder.build_into(&self.state, &mut self.observation);
    }

    /// Copy the current observation into `ob`, which must have length `ob_dim()`.
    pub fn observe(&self, ob: &mut [f32]) {
        self.observation.write_f32(ob);
    }

    pub fn observation(&self) -> &Observation { &self.observation }

    /// Terminal as soon as any body other than a foot touches something.
    pub fn is_terminal_state(&self) -> Termination {
        self.feet.evaluate(&self.world.contacts(), self.config.reward.terminal)
    }

    pub fn curriculum_update(&mut self) {
        self.curriculum.update();
    }

    pub fn set_curriculum(&mut self, curriculum: Box<dyn Curriculum>) {
        self.curriculum = curriculum;
    }

    /// Re-seed the generator used for reset noise.
    pub fn set_seed(&mut self, seed: u64) {
        tracing::debug!(seed, "seeding environment");
        self.rng = rng_from_seed(seed);
    }

    pub fn set_simulation_time_step(&mut self, dt: f64) -> Result<()> {
        self.config.simulation_dt = config::check_time_step(dt)?;
        self.world.set_time_step(dt);
        self.log_time_steps();
        Ok(())
    }

    pub fn set_control_time_step(&mut self, dt: f64) -> Result<()> {
        self.config.control_dt = config::check_time_step(dt)?;
        self.log_time_steps();
        Ok(())
    }

    fn log_time_steps(&self) {
        let (control_dt, simulation_dt) = (self.config.control_dt, self.config.simulation_dt);
        if config::is_whole_ratio(control_dt, simulation_dt) {
            tracing::debug!(control_dt, simulation_dt, substeps = self.substeps(), "time steps updated");
        } else {
            tracing::warn!(
                control_dt,
                simulation_dt,
                substeps = self.substeps(),
                "control time step is not a whole multiple of the simulation time step"
            );
        }
    }

    pub fn set_terminal_reward_coeff(&mut self, coeff: f64) {
        self.config.reward.terminal = coeff;
    }

    /// Simulation substeps integrated per control step.
    pub fn substeps(&self) -> usize {
        config::substeps(self.config.control_dt, self.config.simulation_dt)
    }

    pub fn ob_dim(&self) -> usize { self.builder.ob_dim() }

    pub fn action_dim(&self) -> usize { self.n_joints }

    pub fn control_time_step(&self) -> f64 { self.config.control_dt }

    pub fn simulation_time_step(&self) -> f64 { self.config.simulation_dt }

    pub fn gc_dim(&self) -> usize { self.gc_dim }

    pub fn gv_dim(&self) -> usize { self.gv_dim }

    pub fn config(&self) -> &EnvConfig { &self.config }

    pub fn state(&self) -> &GeneralizedState { &self.state }

    pub fn init_state(&self) -> &GeneralizedState { &self.init_state }

    pub fn pd_target(&self) -> &PdTarget { &self.pd_target }

    pub fn pd_gains(&self) -> &PdGains { &self.gains }

    pub fn action_normalizer(&self) -> &ActionNormalizer { &self.normalizer }

    pub fn foot_contacts(&self) -> &FootContactSet { &self.feet }

    /// Nominal box of normalized actions, `[-1, 1]` on every joint, before
    /// scaling by `std` and shifting by the mean. `step` accepts actions outside it.
    pub fn action_space(&self) -> BoxSpace {
        BoxSpace::new(vec![-1.0; self.n_joints], vec![1.0; self.n_joints])
    }

    /// Unbounded box of length `ob_dim()`.
    pub fn observation_space(&self) -> BoxSpace {
        BoxSpace::unbounded(self.ob_dim())
    }

    pub fn world(&self) -> &W { &self.world }

    pub fn world_mut(&mut self) -> &mut W { &mut self.world }

    pub fn is_visualized(&self) -> bool { self.visualizer.is_some() }

    pub fn turn_off_visualization(&mut self) {
        if let Some(bridge) = self.visualizer.as_mut() {
            bridge.hibernate();
        }
    }

    pub fn turn_on_visualization(&mut self) {
        if let Some(bridge) = self.visualizer.as_mut() {
            bridge.wakeup();
        }
    }

    pub fn start_recording_video(&mut self, name: &str) {
        if let Some(bridge) = self.visualizer.as_mut() {
            bridge.start_recording_video(name);
        }
    }

    pub fn stop_recording_video(&mut self) {
        if let Some(bridge) = self.visualizer.as_mut() {
            bridge.stop_recording_video();
        }
    }

    /// Shut down the visualizer, if any. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(bridge) = self.visualizer.as_mut() {
            tracing::info!("Stopping visualization server");
            bridge.kill();
        }
    }
}

impl<W: PhysicsWorld> Drop for WalkerEnv<W> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<W: PhysicsWorld> Env for WalkerEnv<W> {
    type Obs = Vec<f32>;
    type Act = Vec<f32>;

    fn reset(&mut self, seed: Option<u64>) -> (Self::Obs, Info) {
        if let Some(s) = seed { self.set_seed(s); }
        WalkerEnv::reset(self);
        (self.observation.to_f32_vec(), Info::new())
    }

    /// Gymnasium-shaped step. On termination the terminal reward is added to the
    /// step reward and also reported under `"terminal_reward"`.
    fn step(&mut self, action: Self::Act) -> Step<Self::Obs> {
        let mut reward = WalkerEnv::step(self, &action);
        let termination = self.is_terminal_state();
        if termination.terminal {
            reward += termination.terminal_reward;
        }
        let mut info = Info::new();
        info.insert("terminal_reward", InfoValue::from(termination.terminal_reward));
        info.insert("forward_velocity", InfoValue::from(self.observation.forward_velocity()));
        Step::new(self.observation.to_f32_vec(), reward, termination.terminal, false, info)
    }

    fn close(&mut self) { WalkerEnv::close(self) }
}
