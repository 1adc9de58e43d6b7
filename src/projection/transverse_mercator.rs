//! Gauss-Krüger transverse Mercator projection.
//!
//! Forward and inverse mappings use the Krüger series expanded to the sixth
//! order of the third flattening `n`, which is the formulation the Geospatial
//! Information Authority of Japan publishes for the plane rectangular system.
//! Truncation error is well below a millimetre inside a zone.

use super::datum::Ellipsoid;

const ORDER: usize = 6;

/// A transverse Mercator projection bound to one ellipsoid, origin and scale.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    eccentricity: f64,
    /// Rectifying radius `A`.
    rectifying_radius: f64,
    alpha: [f64; ORDER],
    beta: [f64; ORDER],
    delta: [f64; ORDER],
    central_meridian: f64,
    scale_factor: f64,
    false_easting: f64,
    false_northing: f64,
    /// Scaled meridian arc from the equator to the origin latitude.
    origin_northing: f64,
}

impl TransverseMercator {
    /// Angles in degrees, offsets in metres.
    pub fn new(
        ellipsoid: Ellipsoid,
        origin_latitude: f64,
        central_meridian: f64,
        scale_factor: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.third_flattening();
        let (alpha, beta, delta) = kruger_coefficients(n);
        let n2 = n * n;
        let rectifying_radius = ellipsoid.semi_major_axis / (1.0 + n)
            * (1.0 + n2 / 4.0 + n2 * n2 / 64.0 + n2 * n2 * n2 / 256.0);

        let mut projection = Self {
            eccentricity: ellipsoid.eccentricity(),
            rectifying_radius,
            alpha,
            beta,
            delta,
            central_meridian,
            scale_factor,
            false_easting,
            false_northing,
            origin_northing: 0.0,
        };
        projection.origin_northing =
            scale_factor * projection.meridian_arc(origin_latitude.to_radians());
        projection
    }

    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Geodetic degrees to `(easting, northing)` in metres.
    pub fn forward(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let phi = latitude.to_radians();
        let lambda = (longitude - self.central_meridian).to_radians();

        let t = self.conformal_tangent(phi);
        let xi_prime = t.atan2(lambda.cos());
        let eta_prime = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let northing = self.scale_factor * self.rectifying_radius * xi - self.origin_northing
            + self.false_northing;
        let easting = self.scale_factor * self.rectifying_radius * eta + self.false_easting;
        (easting, northing)
    }

    /// `(easting, northing)` in metres back to geodetic `(longitude, latitude)` degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let scaled_radius = self.scale_factor * self.rectifying_radius;
        let xi = (northing - self.false_northing + self.origin_northing) / scaled_radius;
        let eta = (easting - self.false_easting) / scaled_radius;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += d * (k * chi).sin();
        }
        let lambda = eta_prime.sinh().atan2(xi_prime.cos());

        (
            self.central_meridian + lambda.to_degrees(),
            phi.to_degrees(),
        )
    }

    /// Unscaled meridian arc length from the equator to `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let chi = self.conformal_tangent(phi).atan();
        let mut xi = chi;
        for (j, a) in self.alpha.iter().enumerate() {
            xi += a * (2.0 * (j as f64 + 1.0) * chi).sin();
        }
        self.rectifying_radius * xi
    }

    /// Tangent of the conformal latitude.
    fn conformal_tangent(&self, phi: f64) -> f64 {
        let e = self.eccentricity;
        let sin_phi = phi.sin();
        (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh()
    }
}

fn kruger_coefficients(n: f64) -> ([f64; ORDER], [f64; ORDER], [f64; ORDER]) {
    let n2 = n * n;
    let n3 = n2 * n;
    let n4 = n3 * n;
    let n5 = n4 * n;
    let n6 = n5 * n;

    let alpha = [
        n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
            + 7891.0 * n6 / 37800.0,
        13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
            - 1_983_433.0 * n6 / 1_935_360.0,
        61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
            + 167_603.0 * n6 / 181_440.0,
        49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
        34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
        212_378_941.0 * n6 / 319_334_400.0,
    ];

    let beta = [
        n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
            + 96199.0 * n6 / 604_800.0,
        n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
            - 1_118_711.0 * n6 / 3_870_720.0,
        17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
        4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
        4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
        20_648_693.0 * n6 / 638_668_800.0,
    ];

    let delta = [
        2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3 + 116.0 * n4 / 45.0 + 26.0 * n5 / 45.0
            - 2854.0 * n6 / 675.0,
        7.0 * n2 / 3.0 - 8.0 * n3 / 5.0 - 227.0 * n4 / 45.0 + 2704.0 * n5 / 315.0
            + 2323.0 * n6 / 945.0,
        56.0 * n3 / 15.0 - 136.0 * n4 / 35.0 - 1262.0 * n5 / 105.0 + 73814.0 * n6 / 2835.0,
        4279.0 * n4 / 630.0 - 332.0 * n5 / 35.0 - 399_572.0 * n6 / 14175.0,
        4174.0 * n5 / 315.0 - 144_838.0 * n6 / 6237.0,
        601_676.0 * n6 / 22275.0,
    ];

    (alpha, beta, delta)
}
