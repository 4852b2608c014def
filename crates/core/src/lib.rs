//! Core units, constants, and shared primitives for the persistent thrust workspace.
//!
//! Masses are in tonnes and thrust in kilonewtons, so `thrust / (isp * G0)`
//! yields a mass flow in tonnes per second.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
}

/// Basic unit conversion and formatting helpers.
pub mod units {
    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Format a thrust given in kilonewtons, picking μN, mN, N, or kN.
    pub fn format_thrust(thrust_kn: f64) -> String {
        if thrust_kn < 1e-6 {
            format!("{:.2} μN", thrust_kn * 1e9)
        } else if thrust_kn < 1e-3 {
            format!("{:.2} mN", thrust_kn * 1e6)
        } else if thrust_kn < 1.0 {
            format!("{:.2} N", thrust_kn * 1e3)
        } else {
            format!("{:.2} kN", thrust_kn)
        }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Flip a vector.
    #[inline]
    pub fn neg(v: &Vector3) -> Vector3 {
        [-v[0], -v[1], -v[2]]
    }

    /// Exact comparison against the zero vector.
    #[inline]
    pub fn is_zero(v: &Vector3) -> bool {
        v[0] == 0.0 && v[1] == 0.0 && v[2] == 0.0
    }

    /// Unit vector in the direction of `v`; the zero vector stays zero.
    pub fn normalize(v: &Vector3) -> Vector3 {
        let n = norm(v);
        if n > 0.0 { scale(v, 1.0 / n) } else { ZERO }
    }
}
