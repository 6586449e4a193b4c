use bytesize::ByteSize;

/// Human readable byte count in decimal (SI) units.
pub fn pretty_bytes(bytes: usize) -> String {
	ByteSize::b(bytes as u64).display().si().to_string()
}

/// `before → after` size comparison.
pub fn maxmin(before: usize, after: usize) -> String {
	format!("{} → {}", pretty_bytes(before), pretty_bytes(after))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bytes_below_a_kilobyte() {
		assert_eq!(pretty_bytes(0), "0 B");
		assert_eq!(pretty_bytes(999), "999 B");
	}

	#[test]
	fn scaled_by_powers_of_1000() {
		assert_eq!(pretty_bytes(1_500_000), "1.5 MB");
		assert_eq!(pretty_bytes(2_048), "2.0 kB");
	}

	#[test]
	fn compares_sizes() {
		assert_eq!(maxmin(20, 12), "20 B → 12 B");
	}
}
