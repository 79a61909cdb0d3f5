use glam::{Quat, Vec3};

/// Fraction of the remaining distance covered after `dt` seconds of
/// exponential damping with time constant `smoothing`.
pub fn damp_factor(smoothing: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if smoothing <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / smoothing).exp()
}

pub fn damp(current: f32, target: f32, smoothing: f32, dt: f32) -> f32 {
    current + (target - current) * damp_factor(smoothing, dt)
}

pub fn damp_vec3(current: Vec3, target: Vec3, smoothing: f32, dt: f32) -> Vec3 {
    current.lerp(target, damp_factor(smoothing, dt))
}

/// Spherical damping. The target is negated when the hemispheres disagree
/// so the blend always takes the short arc.
pub fn damp_quat(current: Quat, target: Quat, smoothing: f32, dt: f32) -> Quat {
    let target = if current.dot(target) < 0.0 { -target } else { target };
    current
        .slerp(target, damp_factor(smoothing, dt))
        .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::EulerRot;

    #[test]
    fn zero_dt_changes_nothing() {
        assert_eq!(damp(3.0, 9.0, 0.4, 0.0), 3.0);
        let v = Vec3::new(1.0, -2.0, 5.0);
        assert_eq!(damp_vec3(v, Vec3::ZERO, 0.4, 0.0), v);
        let q = Quat::from_euler(EulerRot::XYZ, 0.3, 0.7, 0.0);
        let kept = damp_quat(q, Quat::IDENTITY, 0.4, 0.0);
        assert!(kept.angle_between(q) < 1e-6);
    }

    #[test]
    fn factor_covers_e_fraction_at_time_constant() {
        let expected = 1.0 - (-1.0f32).exp();
        assert!((damp_factor(0.4, 0.4) - expected).abs() < 1e-6);
    }

    #[test]
    fn non_positive_smoothing_snaps() {
        assert_eq!(damp(2.0, 8.0, 0.0, 0.016), 8.0);
        assert_eq!(damp(2.0, 8.0, -1.0, 0.016), 8.0);
    }

    #[test]
    fn repeated_ticks_converge() {
        let mut x = 0.0;
        let mut previous_gap = 10.0f32;
        for _ in 0..240 {
            x = damp(x, 10.0, 0.4, 1.0 / 60.0);
            let gap = (10.0 - x).abs();
            assert!(gap <= previous_gap);
            previous_gap = gap;
        }
        assert!(previous_gap < 1e-2);
    }

    #[test]
    fn quat_damp_takes_short_arc() {
        let current = Quat::IDENTITY;
        let target = Quat::from_euler(EulerRot::XYZ, 0.0, 3.0, 0.0);
        let toward = damp_quat(current, target, 0.4, 0.1);
        let toward_negated = damp_quat(current, -target, 0.4, 0.1);
        assert!(toward.angle_between(toward_negated) < 1e-5);
        assert!(toward.angle_between(target) < current.angle_between(target));
    }
}
