use legged_gym::{ActionNormalizer, Contact, FootContactSet, RewardCoeffs};
use nalgebra::DVector;
use proptest::prelude::*;

proptest! {
    // denormalize is exactly action * std + mean, component by component
    #[test]
    fn denormalize_is_elementwise_affine(
        rows in proptest::collection::vec((-5.0f32..5.0, -2.0f64..2.0, 0.01f64..1.0), 1..24)
    ) {
        let action: Vec<f32> = rows.iter().map(|r| r.0).collect();
        let mean = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.1));
        let std = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.2));
        let norm = ActionNormalizer::new(mean, std);
        let out = norm.denormalize(&action);
        prop_assert_eq!(out.len(), rows.len());
        for (o, (a, m, s)) in out.iter().zip(rows.iter()) {
            prop_assert_eq!(*o, *a as f64 * *s + *m);
        }
    }

    // terminal exactly when some contact lands outside the foot set
    #[test]
    fn termination_matches_contact_membership(
        feet in proptest::collection::btree_set(0usize..20, 1..6),
        bodies in proptest::collection::vec(0usize..20, 0..10),
        coeff in -50.0f64..0.0,
    ) {
        let set = FootContactSet::new(feet.iter().copied());
        let contacts: Vec<Contact> = bodies.iter().map(|&b| Contact::new(b)).collect();
        let t = set.evaluate(&contacts, coeff);
        let illegal = bodies.iter().any(|b| !feet.contains(b));
        prop_assert_eq!(t.terminal, illegal);
        if illegal {
            prop_assert_eq!(t.terminal_reward, coeff as f32);
        } else {
            prop_assert_eq!(t.terminal_reward, 0.0);
        }
    }

    // reward is the closed-form expression, bit for bit
    #[test]
    fn reward_is_reproducible(
        force in proptest::collection::vec(-500.0f64..500.0, 18),
        vx in -10.0f64..10.0,
    ) {
        let coeffs = RewardCoeffs::default();
        let f = DVector::from_vec(force);
        let expected = -4e-5 * f.norm_squared() + 0.3 * 4.0f64.min(vx);
        prop_assert_eq!(coeffs.reward(&f, vx), expected);
        prop_assert_eq!(coeffs.reward(&f, vx), coeffs.reward(&f, vx));
    }
}
