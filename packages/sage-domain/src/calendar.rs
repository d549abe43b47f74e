use time::{Date, OffsetDateTime, UtcOffset};

/// Calendar date in the site-local zone. The day boundary for quota
/// accounting is deterministic regardless of where the caller is.
pub fn local_date(now: OffsetDateTime, utc_offset_hours: i8) -> Date {
	let offset = UtcOffset::from_hms(utc_offset_hours, 0, 0)
		.unwrap_or(UtcOffset::UTC);

	now.to_offset(offset).date()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn day_boundary_follows_the_site_zone() {
		// 23:30 UTC is already the next day at UTC+9.
		let now = datetime!(2024-05-01 23:30 UTC);

		assert_eq!(local_date(now, 9).to_string(), "2024-05-02");
		assert_eq!(local_date(now, 0).to_string(), "2024-05-01");
	}
}
