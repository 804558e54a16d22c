use std::cmp::Ordering;

pub fn clamp_unit(value: f32) -> f32 {
	if !value.is_finite() {
		return 0.0;
	}

	value.clamp(0.0, 1.0)
}

pub fn round3(value: f32) -> f32 {
	(value * 1_000.0).round() / 1_000.0
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamps_non_finite_to_zero() {
		assert_eq!(clamp_unit(f32::NAN), 0.0);
		assert_eq!(clamp_unit(f32::INFINITY), 0.0);
		assert_eq!(clamp_unit(1.7), 1.0);
		assert_eq!(clamp_unit(-0.2), 0.0);
	}

	#[test]
	fn sorts_nan_last() {
		let mut scores = vec![0.2, f32::NAN, 0.9, 0.5];

		scores.sort_by(|a, b| cmp_f32_desc(*a, *b));

		assert_eq!(&scores[..3], &[0.9, 0.5, 0.2]);
		assert!(scores[3].is_nan());
	}
}
