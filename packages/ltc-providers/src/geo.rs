pub const EARTH_RADIUS_MILES: f64 = 3_958.7613;
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Great-circle distance between two `(latitude, longitude)` points in degrees.
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
	let phi1 = from.0.to_radians();
	let phi2 = to.0.to_radians();
	let d_phi = (to.0 - from.0).to_radians();
	let d_lambda = (to.1 - from.1).to_radians();
	let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
	let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

	EARTH_RADIUS_MILES * c
}

pub fn miles_to_meters(miles: u32) -> f64 {
	f64::from(miles) * METERS_PER_MILE
}

pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_distance_for_identical_points() {
		assert_eq!(haversine_miles((43.615, -116.2023), (43.615, -116.2023)), 0.0);
	}

	#[test]
	fn boise_to_nampa_is_about_twenty_miles() {
		let miles = round2(haversine_miles((43.615, -116.2023), (43.5407, -116.5635)));

		assert!((18.0..=20.0).contains(&miles), "Unexpected distance {miles}.");
	}

	#[test]
	fn converts_miles_to_meters() {
		assert!((miles_to_meters(25) - 40_233.6).abs() < 1e-6);
	}
}
