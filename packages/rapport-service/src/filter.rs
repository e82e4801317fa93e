//! Filter compilation.
//!
//! Turns a [`FilterState`] and an optional search term into storage constraints for one
//! [`EntitySchema`]. Inputs that cannot be honored are skipped and reported, never fatal.

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};

use rapport_storage::{Constraint, FieldValue, NumericRange};

use crate::entity::{EntitySchema, FacetMode, FacetSpec};

static RANGE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*-\s*(-?\d+(?:\.\d+)?)\s*$").ok()
});

/// The user's facet selections for one list view.
///
/// `selections` holds discrete values, array values and range strings keyed by facet name.
/// `flags` holds boolean facets. An absent or empty entry matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
	#[serde(default)]
	pub selections: BTreeMap<String, Vec<String>>,
	#[serde(default)]
	pub flags: BTreeMap<String, Option<bool>>,
}
impl FilterState {
	pub fn with_selection<I, S>(mut self, facet: &str, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.selections.insert(facet.to_string(), values.into_iter().map(Into::into).collect());

		self
	}

	pub fn with_flag(mut self, facet: &str, value: Option<bool>) -> Self {
		self.flags.insert(facet.to_string(), value);

		self
	}

	pub fn is_empty(&self) -> bool {
		self.selections.values().all(Vec::is_empty) && self.flags.values().all(Option::is_none)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	UnknownFacet,
	/// A selection was given for a boolean facet, or a flag for a non-boolean one.
	WrongShape,
	MalformedRange,
	InvalidValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
	pub facet: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompiledFilter {
	pub constraints: Vec<Constraint>,
	pub skipped: Vec<SkippedInput>,
}
impl CompiledFilter {
	fn skip(&mut self, facet: &str, value: Option<&str>, reason: SkipReason) {
		tracing::warn!(facet, value, reason = ?reason, "Filter input skipped.");

		self.skipped.push(SkippedInput {
			facet: facet.to_string(),
			value: value.map(str::to_string),
			reason,
		});
	}
}

/// Parses `"<min>-<max>"`. Single-sided, non-numeric and inverted ranges yield `None`.
pub fn parse_range(raw: &str) -> Option<NumericRange> {
	let captures = RANGE_PATTERN.as_ref()?.captures(raw)?;
	let min = captures.get(1)?.as_str().parse::<f64>().ok()?;
	let max = captures.get(2)?.as_str().parse::<f64>().ok()?;

	if !min.is_finite() || !max.is_finite() || min > max {
		return None;
	}

	Some(NumericRange { min, max })
}

/// Compiles facets in schema order, followed by the text match when `search` is non-blank.
pub fn compile(schema: &EntitySchema, state: &FilterState, search: Option<&str>) -> CompiledFilter {
	let mut compiled = CompiledFilter::default();

	for name in state.selections.keys().chain(state.flags.keys()) {
		if schema.facet(name).is_none() {
			compiled.skip(name, None, SkipReason::UnknownFacet);
		}
	}

	let mut ranges = BTreeMap::new();

	for facet in schema.facets {
		if let FacetMode::Range { .. } = facet.mode {
			let parsed = compile_ranges(facet, selection(state, facet), &mut compiled);

			if !parsed.is_empty() {
				ranges.insert(facet.name, parsed);
			}
		}
	}

	let superseded = schema
		.facets
		.iter()
		.filter_map(|facet| match facet.mode {
			FacetMode::Range { supersedes: Some(target) } if ranges.contains_key(facet.name) =>
				Some(target),
			_ => None,
		})
		.collect::<BTreeSet<_>>();

	for facet in schema.facets {
		let values = selection(state, facet);
		let flag = state.flags.get(facet.name).copied().flatten();

		if facet.mode != FacetMode::Boolean && state.flags.contains_key(facet.name) {
			compiled.skip(facet.name, None, SkipReason::WrongShape);
		}

		match facet.mode {
			FacetMode::Discrete => {
				if superseded.contains(facet.name) {
					if !values.is_empty() {
						tracing::debug!(facet = facet.name, "Discrete selection superseded by range.");
					}

					continue;
				}

				let parsed = values
					.iter()
					.filter_map(|raw| {
						let value = FieldValue::parse(facet.kind, raw);

						if value.is_none() {
							compiled.skip(facet.name, Some(raw), SkipReason::InvalidValue);
						}

						value
					})
					.collect::<Vec<_>>();

				if !parsed.is_empty() {
					compiled
						.constraints
						.push(Constraint::EqualsOneOf { field: facet.field, values: parsed });
				}
			},
			FacetMode::ArrayOverlap => {
				let parsed = values
					.iter()
					.map(|value| value.trim())
					.filter(|value| !value.is_empty())
					.map(str::to_string)
					.collect::<Vec<_>>();

				if !parsed.is_empty() {
					compiled
						.constraints
						.push(Constraint::ArrayOverlaps { field: facet.field, values: parsed });
				}
			},
			FacetMode::Range { .. } =>
				if let Some(parsed) = ranges.remove(facet.name) {
					compiled
						.constraints
						.push(Constraint::NumericRange { field: facet.field, ranges: parsed });
				},
			FacetMode::Boolean => {
				if !values.is_empty() {
					compiled.skip(facet.name, None, SkipReason::WrongShape);
				}
				if let Some(value) = flag {
					compiled.constraints.push(Constraint::BooleanEquals { field: facet.field, value });
				}
			},
		}
	}

	if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
		compiled.constraints.push(Constraint::TextMatch {
			fields: schema.search_fields.to_vec(),
			term: term.to_string(),
		});
	}

	compiled
}

fn selection<'a>(state: &'a FilterState, facet: &FacetSpec) -> &'a [String] {
	state.selections.get(facet.name).map(Vec::as_slice).unwrap_or_default()
}

fn compile_ranges(
	facet: &FacetSpec,
	values: &[String],
	compiled: &mut CompiledFilter,
) -> Vec<NumericRange> {
	values
		.iter()
		.filter_map(|raw| {
			let range = parse_range(raw);

			if range.is_none() {
				compiled.skip(facet.name, Some(raw), SkipReason::MalformedRange);
			}

			range
		})
		.collect()
}
