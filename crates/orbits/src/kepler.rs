//! Two-body elliptic orbit propagation.

use thiserror::Error;
use thrust_core::vector::Vector3;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 50;

/// Classical elements of a closed orbit around `reference_body`.
///
/// Distances in metres, `mu` in m³/s², angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct KeplerOrbit {
    pub reference_body: String,
    pub mu: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_ascending_node: f64,
    pub argument_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
    pub epoch: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum OrbitError {
    #[error("gravitational parameter must be positive")]
    InvalidMu,
    #[error("semi-major axis must be positive")]
    InvalidSemiMajorAxis,
    #[error("eccentricity {0} is outside [0, 1); only closed orbits are propagated")]
    UnsupportedEccentricity(f64),
}

impl KeplerOrbit {
    /// Circular equatorial orbit with the vessel at periapsis direction at `epoch`.
    pub fn circular(reference_body: impl Into<String>, mu: f64, radius: f64, epoch: f64) -> Self {
        Self {
            reference_body: reference_body.into(),
            mu,
            semi_major_axis: radius,
            eccentricity: 0.0,
            inclination: 0.0,
            longitude_ascending_node: 0.0,
            argument_periapsis: 0.0,
            mean_anomaly_at_epoch: 0.0,
            epoch,
        }
    }

    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(self.mu > 0.0) {
            return Err(OrbitError::InvalidMu);
        }
        if !(self.semi_major_axis > 0.0) {
            return Err(OrbitError::InvalidSemiMajorAxis);
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitError::UnsupportedEccentricity(self.eccentricity));
        }
        Ok(())
    }

    /// Mean motion (rad/s).
    pub fn mean_motion(&self) -> f64 {
        (self.mu / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Orbital period (s).
    pub fn period(&self) -> f64 {
        std::f64::consts::TAU / self.mean_motion()
    }

    /// Position and velocity relative to the reference body at `ut`.
    pub fn state_at(&self, ut: f64) -> (Vector3, Vector3) {
        let a = self.semi_major_axis;
        let e = self.eccentricity;
        let mean_anomaly = self.mean_anomaly_at_epoch + self.mean_motion() * (ut - self.epoch);
        let ecc_anomaly = solve_kepler_equation(mean_anomaly, e);

        let true_anomaly = 2.0
            * ((1.0 + e).sqrt() * (ecc_anomaly / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (ecc_anomaly / 2.0).cos());
        let r = a * (1.0 - e * ecc_anomaly.cos());

        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        let x_orb = r * cos_nu;
        let y_orb = r * sin_nu;

        let sqrt_mu_p = (self.mu / (a * (1.0 - e * e))).sqrt();
        let vx_orb = -sqrt_mu_p * sin_nu;
        let vy_orb = sqrt_mu_p * (e + cos_nu);

        let (sin_o, cos_o) = self.longitude_ascending_node.sin_cos();
        let (sin_w, cos_w) = self.argument_periapsis.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();

        // Perifocal to inertial rotation.
        let r11 = cos_o * cos_w - sin_o * sin_w * cos_i;
        let r12 = -cos_o * sin_w - sin_o * cos_w * cos_i;
        let r21 = sin_o * cos_w + cos_o * sin_w * cos_i;
        let r22 = -sin_o * sin_w + cos_o * cos_w * cos_i;
        let r31 = sin_w * sin_i;
        let r32 = cos_w * sin_i;

        let position = [
            r11 * x_orb + r12 * y_orb,
            r21 * x_orb + r22 * y_orb,
            r31 * x_orb + r32 * y_orb,
        ];
        let velocity = [
            r11 * vx_orb + r12 * vy_orb,
            r21 * vx_orb + r22 * vy_orb,
            r31 * vx_orb + r32 * vy_orb,
        ];
        (position, velocity)
    }

    /// Position relative to the reference body at `ut`.
    pub fn relative_position_at(&self, ut: f64) -> Vector3 {
        self.state_at(ut).0
    }

    /// Orbital velocity (relative to the reference body) at `ut`.
    pub fn velocity_at(&self, ut: f64) -> Vector3 {
        self.state_at(ut).1
    }
}

fn solve_kepler_equation(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mean_anomaly = mean_anomaly.rem_euclid(std::f64::consts::TAU);
    let mut ecc_anomaly = if eccentricity > 0.8 {
        std::f64::consts::PI
    } else {
        mean_anomaly
    };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = ecc_anomaly - eccentricity * ecc_anomaly.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * ecc_anomaly.cos();
        let delta = f / f_prime;
        ecc_anomaly -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ecc_anomaly
}
