//! Force calculations acting on particles inside the chamber

use glam::DVec3;

use crate::chamber::Chamber;
use crate::particle::Particle;

/// Magnetic component of the Lorentz force
/// F = q * (v × B)
pub fn lorentz_force(total_charge: i64, velocity: DVec3, field: DVec3) -> DVec3 {
    total_charge as f64 * velocity.cross(field)
}

/// Acceleration of a particle in the chamber's field
/// a = F / m, with the particle's unit count as inertial weight
pub fn magnetic_acceleration(particle: &Particle, chamber: &Chamber) -> DVec3 {
    let mass = particle.mass();
    if mass == 0 {
        // Nothing to push
        return DVec3::ZERO;
    }
    let force = lorentz_force(
        particle.total_charge(),
        particle.velocity,
        chamber.magnetic_field(),
    );
    force / mass as f64
}

/// Velocity scale applied by friction over `delta`
pub fn friction_factor(friction: f64, delta: f64) -> f64 {
    1.0 - friction * delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Charges;

    #[test]
    fn test_lorentz_force_direction() {
        // v along x, B along z: v × B points along -y
        let f = lorentz_force(1, DVec3::X, DVec3::Z);
        assert_eq!(f, DVec3::new(0.0, -1.0, 0.0));

        // Opposite charge curls the other way
        let f = lorentz_force(-2, DVec3::X, DVec3::Z);
        assert_eq!(f, DVec3::new(0.0, 2.0, 0.0));

        assert_eq!(lorentz_force(0, DVec3::X, DVec3::Z), DVec3::ZERO);
    }

    #[test]
    fn test_acceleration_scales_with_mass() {
        let chamber = Chamber::from_arrays([10.0; 3], [0.0, 0.0, 2.0], 0.0).unwrap();
        let light = Particle::new(DVec3::ZERO, DVec3::X, Charges::new(1, 0, 0), 1.0).unwrap();
        let heavy = Particle::new(DVec3::ZERO, DVec3::X, Charges::new(1, 3, 0), 1.0).unwrap();

        let a_light = magnetic_acceleration(&light, &chamber);
        let a_heavy = magnetic_acceleration(&heavy, &chamber);
        assert_eq!(a_light, DVec3::new(0.0, -2.0, 0.0));
        assert_eq!(a_heavy, DVec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_massless_particle_feels_nothing() {
        let chamber = Chamber::from_arrays([10.0; 3], [0.0, 0.0, 2.0], 0.0).unwrap();
        let empty = Particle::new(DVec3::ZERO, DVec3::X, Charges::ZERO, 1.0).unwrap();
        assert_eq!(magnetic_acceleration(&empty, &chamber), DVec3::ZERO);
    }

    #[test]
    fn test_friction_factor() {
        assert_eq!(friction_factor(0.0, 1.0), 1.0);
        assert!((friction_factor(0.3, 0.5) - 0.85).abs() < 1e-12);
    }
}
