pub mod core;
pub mod config;
pub mod physics;
pub mod state;
pub mod control;
pub mod observation;
pub mod reward;
pub mod visualization;
pub mod spaces;
pub mod utils;
pub mod env;

pub use crate::core::{Env, EnvError, Info, InfoValue, Result, Step};
pub use crate::config::{EnvConfig, InitConstants};
pub use crate::control::{ActionNormalizer, PdGains};
pub use crate::env::{Curriculum, NoCurriculum, WalkerEnv};
pub use crate::observation::{ob_dim, Observation, ObservationBuilder};
pub use crate::physics::{Contact, ControlMode, PhysicsWorld};
pub use crate::reward::{FootContactSet, RewardCoeffs, Termination};
pub use crate::spaces::{BoxSpace, Space};
pub use crate::state::{GeneralizedState, PdTarget};
pub use crate::utils::{rng_from_seed, split_n, SeedSequence};
pub use crate::visualization::VisualizationBridge;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_insert_replaces_existing_key() {
        let mut info = Info::new();
        info.insert("terminal_reward", InfoValue::from(0.0f32));
        info.insert("terminal_reward", InfoValue::from(-1.0f32));
        assert_eq!(info.len(), 1);
        assert_eq!(info.get("terminal_reward").and_then(InfoValue::as_f64), Some(-1.0));
        assert!(info.get("missing").is_none());
    }

    #[test]
    fn errors_render_readable_messages() {
        let err = EnvError::MissingBody("LF_SHANK".into());
        assert_eq!(err.to_string(), "Body `LF_SHANK` not found in robot model");
        let err = EnvError::RobotLoad { path: "anymal.urdf".into(), reason: "no such file".into() };
        assert_eq!(err.to_string(), "Failed to load robot description anymal.urdf: no such file");
    }

    #[test]
    fn observation_and_action_dims_follow_joint_count() {
        for n in [4usize, 8, 12] {
            assert_eq!(ob_dim(n), 1 + 3 + 3 + 3 + 2 * n);
        }
    }
}
