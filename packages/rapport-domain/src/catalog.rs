use serde::Serialize;

/// Weight used for activity types that have no catalog entry.
pub const NEUTRAL_IMPORTANCE: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ImportanceEntry {
	pub activity_type: &'static str,
	pub weight: u8,
	pub description: &'static str,
}

/// Static importance table. Weights stay within 2-10.
pub const IMPORTANCE_CATALOG: &[ImportanceEntry] = &[
	ImportanceEntry {
		activity_type: "interview",
		weight: 10,
		description: "Interview scheduled or completed.",
	},
	ImportanceEntry {
		activity_type: "job-offer",
		weight: 10,
		description: "Offer extended or received.",
	},
	ImportanceEntry {
		activity_type: "layoff",
		weight: 9,
		description: "Contact or their company affected by a layoff.",
	},
	ImportanceEntry {
		activity_type: "new-job-posting",
		weight: 9,
		description: "Relevant position opened at the contact's company.",
	},
	ImportanceEntry {
		activity_type: "job-change",
		weight: 8,
		description: "Contact moved to a new role or company.",
	},
	ImportanceEntry {
		activity_type: "promotion",
		weight: 8,
		description: "Contact was promoted.",
	},
	ImportanceEntry {
		activity_type: "funding-round",
		weight: 7,
		description: "Contact's company raised a funding round.",
	},
	ImportanceEntry { activity_type: "referral", weight: 7, description: "Referral given or asked." },
	ImportanceEntry { activity_type: "meeting", weight: 6, description: "Meeting on the calendar." },
	ImportanceEntry { activity_type: "phone-call", weight: 6, description: "Call to make or return." },
	ImportanceEntry { activity_type: "follow-up", weight: 5, description: "General follow-up." },
	ImportanceEntry { activity_type: "birthday", weight: 4, description: "Contact's birthday." },
	ImportanceEntry {
		activity_type: "work-anniversary",
		weight: 4,
		description: "Contact's work anniversary.",
	},
	ImportanceEntry { activity_type: "email", weight: 4, description: "Email to send or answer." },
	ImportanceEntry {
		activity_type: "social-media",
		weight: 3,
		description: "Social media interaction.",
	},
	ImportanceEntry { activity_type: "newsletter", weight: 2, description: "Newsletter mention." },
];

/// Looks up the importance weight of an activity type.
///
/// Lookup trims whitespace and ignores ASCII case. Unknown types fall back to
/// [`NEUTRAL_IMPORTANCE`].
pub fn importance_of(activity_type: &str) -> u8 {
	find_entry(activity_type).map(|entry| entry.weight).unwrap_or(NEUTRAL_IMPORTANCE)
}

pub fn find_entry(activity_type: &str) -> Option<&'static ImportanceEntry> {
	let needle = activity_type.trim();

	IMPORTANCE_CATALOG.iter().find(|entry| entry.activity_type.eq_ignore_ascii_case(needle))
}

/// Catalog entries for read-only display, heaviest first.
pub fn entries_by_weight() -> Vec<ImportanceEntry> {
	let mut entries = IMPORTANCE_CATALOG.to_vec();

	entries.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.activity_type.cmp(b.activity_type)));

	entries
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use crate::catalog::{IMPORTANCE_CATALOG, entries_by_weight, importance_of};

	#[test]
	fn weights_stay_in_range() {
		for entry in IMPORTANCE_CATALOG {
			assert!((2..=10).contains(&entry.weight), "{} out of range", entry.activity_type);
		}
	}

	#[test]
	fn activity_types_are_unique() {
		let mut seen = HashSet::new();

		for entry in IMPORTANCE_CATALOG {
			assert!(seen.insert(entry.activity_type), "duplicate {}", entry.activity_type);
		}
	}

	#[test]
	fn lookup_ignores_case_and_padding() {
		assert_eq!(importance_of("  Interview "), 10);
		assert_eq!(importance_of("EMAIL"), 4);
	}

	#[test]
	fn display_order_is_heaviest_first() {
		let entries = entries_by_weight();

		assert_eq!(entries.len(), IMPORTANCE_CATALOG.len());

		for pair in entries.windows(2) {
			assert!(pair[0].weight >= pair[1].weight);
		}
	}
}
