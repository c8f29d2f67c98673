//! Concept extraction and author synthesis.
//!
//! Both are deterministic lookups against a [`Vocabulary`]: concepts come from
//! keyword matches in the title, authors are derived from the publication id.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::types::Publication;

const KEYWORDS: &[&str] = &[
	"microgravity",
	"radiation",
	"bone",
	"muscle",
	"plant",
	"cell",
	"gene",
	"protein",
	"dna",
	"immune",
	"metabolism",
	"neural",
	"cardiac",
	"space",
	"astronaut",
	"tissue",
	"growth",
	"development",
];

const FIRST_NAMES: &[&str] = &[
	"Sarah", "Michael", "Elena", "James", "Priya", "David", "Yuki", "Robert",
];

const SURNAMES: &[&str] = &[
	"Chen", "Rodriguez", "Patel", "Johnson", "Kim", "Mueller", "Okafor", "Smith",
];

/// Keyword and name pools driving extraction. Replaceable at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
	/// Lowercase terms matched as substrings of a title.
	pub keywords: Vec<String>,
	pub first_names: Vec<String>,
	pub surnames: Vec<String>,
}

impl Default for Vocabulary {
	fn default() -> Self {
		let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
		Self {
			keywords: owned(KEYWORDS),
			first_names: owned(FIRST_NAMES),
			surnames: owned(SURNAMES),
		}
	}
}

impl Vocabulary {
	/// Concept labels for a title: the category first, then every keyword found
	/// in the title (case-insensitive), capitalized. Labels are unique ignoring case.
	pub fn concepts(&self, title: &str, category: &str) -> Vec<String> {
		let title = title.to_lowercase();
		let mut out: Vec<String> = Vec::new();
		let mut seen: BTreeSet<String> = BTreeSet::new();
		// Same key as the concept node id.
		let mut push = |label: String| {
			if !label.trim().is_empty() && seen.insert(label.to_lowercase()) {
				out.push(label);
			}
		};

		push(category.to_string());
		for keyword in &self.keywords {
			let keyword = keyword.to_lowercase();
			if !keyword.is_empty() && title.contains(&keyword) {
				push(capitalize(&keyword));
			}
		}
		out
	}

	/// Pseudo-author names for a publication: `(id % 3) + 1` names, picked from
	/// the pools at `(id + 3i)` and `(id + 5i)`.
	pub fn authors(&self, publication: &Publication) -> Vec<String> {
		if self.first_names.is_empty() || self.surnames.is_empty() {
			return Vec::new();
		}
		let id = publication.id as usize;
		(0..id % 3 + 1)
			.map(|i| {
				let first = &self.first_names[(id + i * 3) % self.first_names.len()];
				let last = &self.surnames[(id + i * 5) % self.surnames.len()];
				format!("{first} {last}")
			})
			.collect()
	}
}

fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) => c.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Lowercase, with runs of non-alphanumerics collapsed to `_`.
pub fn slugify(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());
	for c in name.chars() {
		if c.is_alphanumeric() {
			slug.extend(c.to_lowercase());
		} else if !slug.is_empty() && !slug.ends_with('_') {
			slug.push('_');
		}
	}
	while slug.ends_with('_') {
		slug.pop();
	}
	slug
}
