//! Publication corpus: keyword categorization, CSV/JSON ingestion and the
//! built-in sample records.

use std::collections::HashMap;

use gloo_net::http::Request;
use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::components::knowledge_graph::{Publication, Vocabulary};
use crate::error::CorpusError;

/// Element holding the corpus, as JSON records or `title,link` CSV.
pub const CORPUS_ELEMENT: &str = "publication-data";
/// Space-bioscience publication list, `Title,Link` per row.
pub const PUBLICATIONS_URL: &str =
	"https://raw.githubusercontent.com/jgalazka/SB_publications/refs/heads/main/SB_publication_PMC.csv";
/// Element holding an optional [`Vocabulary`] override.
pub const VOCABULARY_ELEMENT: &str = "graph-vocabulary";

const CATEGORY_RULES: &[(&[&str], &str)] = &[
	(&["bone", "osteo", "skeletal"], "Bone & Musculoskeletal"),
	(&["radiation", "cosmic", "particle"], "Radiation Biology"),
	(&["plant", "arabidopsis", "root", "leaf"], "Plant Biology"),
	(&["muscle", "cardiac", "heart"], "Cardiovascular & Muscle"),
	(&["immune", "infection", "pathogen"], "Immunology"),
	(&["cell", "stem", "tissue"], "Cell & Tissue Biology"),
	(&["gene", "dna", "rna", "protein"], "Molecular Biology"),
	(&["microgravity", "weightless", "gravity"], "Microgravity Effects"),
	(&["behavior", "cognitive", "neural"], "Neuroscience & Behavior"),
	(&["metabolism", "nutrition", "diet"], "Metabolism & Nutrition"),
];

const ORGANISM_RULES: &[(&[&str], &str)] = &[
	(&["human", "astronaut", "crew"], "Human"),
	(&["mouse", "mice", "murine"], "Mouse"),
	(&["rat", "rodent"], "Rat"),
	(&["arabidopsis", "plant"], "Arabidopsis"),
	(&["drosophila", "fly"], "Drosophila"),
	(&["cell line", "culture", "in vitro"], "Cell Culture"),
];

/// Every category [`categorize`] can produce, in filter order.
pub const CATEGORIES: &[&str] = &[
	"Bone & Musculoskeletal",
	"Radiation Biology",
	"Plant Biology",
	"Cardiovascular & Muscle",
	"Immunology",
	"Cell & Tissue Biology",
	"Molecular Biology",
	"Microgravity Effects",
	"Neuroscience & Behavior",
	"Metabolism & Nutrition",
	"General Space Biology",
];

/// Every organism [`extract_organism`] can produce, in filter order.
pub const ORGANISMS: &[&str] = &[
	"Human",
	"Mouse",
	"Rat",
	"Arabidopsis",
	"Drosophila",
	"Cell Culture",
	"Multiple/Other",
];

fn first_match(title: &str, rules: &[(&[&str], &'static str)], fallback: &'static str) -> String {
	let title = title.to_lowercase();
	rules
		.iter()
		.find(|(terms, _)| terms.iter().any(|t| title.contains(t)))
		.map_or(fallback, |(_, label)| *label)
		.to_string()
}

/// First matching category rule, in rule order.
pub fn categorize(title: &str) -> String {
	first_match(title, CATEGORY_RULES, "General Space Biology")
}

pub fn extract_organism(title: &str) -> String {
	first_match(title, ORGANISM_RULES, "Multiple/Other")
}

fn publication(id: u32, title: &str, link: &str) -> Publication {
	Publication {
		id,
		title: title.to_string(),
		link: link.to_string(),
		category: categorize(title),
		organism: extract_organism(title),
	}
}

/// Parse `title,link` rows after a header line. Quotes are stripped, rows
/// with a blank title are dropped, and ids follow the row position.
pub fn parse_csv(text: &str) -> Vec<Publication> {
	text.lines()
		.skip(1)
		.filter(|line| !line.trim().is_empty())
		.enumerate()
		.filter_map(|(i, line)| {
			let mut cols = line.split(',').map(|c| c.replace('"', ""));
			let title = cols.next().unwrap_or_default();
			let link = cols.next().unwrap_or_default();
			let title = title.trim();
			if title.is_empty() {
				return None;
			}
			Some(publication(i as u32 + 1, title, link.trim()))
		})
		.collect()
}

#[derive(Deserialize)]
struct Record {
	id: Option<u32>,
	title: String,
	#[serde(default)]
	link: String,
	category: Option<String>,
	organism: Option<String>,
}

/// Parse JSON records. Missing ids follow the record position; missing
/// category and organism are inferred from the title.
pub fn from_records(json: &str) -> Result<Vec<Publication>, CorpusError> {
	let records: Vec<Record> = serde_json::from_str(json)?;
	Ok(records
		.into_iter()
		.enumerate()
		.filter(|(_, r)| !r.title.trim().is_empty())
		.map(|(i, r)| {
			let title = r.title.trim().to_string();
			Publication {
				id: r.id.unwrap_or(i as u32 + 1),
				category: r.category.unwrap_or_else(|| categorize(&title)),
				organism: r.organism.unwrap_or_else(|| extract_organism(&title)),
				link: r.link,
				title,
			}
		})
		.collect())
}

/// Demonstration records used when the page embeds no corpus.
pub fn sample_publications() -> Vec<Publication> {
	let sample = |id, title: &str, link: &str, category: &str, organism: &str| Publication {
		id,
		title: title.into(),
		link: link.into(),
		category: category.into(),
		organism: organism.into(),
	};
	vec![
		sample(
			1,
			"Effects of Microgravity on Bone Density in Long-Duration Spaceflight",
			"https://www.ncbi.nlm.nih.gov/pmc/articles/PMC123456/",
			"Bone & Musculoskeletal",
			"Human",
		),
		sample(
			2,
			"Plant Growth and Development in Simulated Martian Conditions",
			"https://www.ncbi.nlm.nih.gov/pmc/articles/PMC789012/",
			"Plant Biology",
			"Arabidopsis",
		),
		sample(
			3,
			"Radiation-Induced DNA Damage in Space Environment Using Cell Culture Models",
			"https://www.ncbi.nlm.nih.gov/pmc/articles/PMC345678/",
			"Radiation Biology",
			"Cell Culture",
		),
		sample(
			4,
			"Muscle Atrophy Prevention During Extended Space Missions",
			"https://www.ncbi.nlm.nih.gov/pmc/articles/PMC901234/",
			"Cardiovascular & Muscle",
			"Human",
		),
		sample(
			5,
			"Immune System Response to Microgravity in Mouse Models",
			"https://www.ncbi.nlm.nih.gov/pmc/articles/PMC567890/",
			"Immunology",
			"Mouse",
		),
	]
}

/// Publications per category, most frequent first (ties by name).
pub fn category_stats(corpus: &[Publication]) -> Vec<(String, usize)> {
	let mut counts: HashMap<&str, usize> = HashMap::new();
	for p in corpus {
		*counts.entry(p.category.as_str()).or_default() += 1;
	}
	let mut stats: Vec<(String, usize)> = counts.into_iter().map(|(c, n)| (c.to_string(), n)).collect();
	stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	stats
}

fn embedded_text(id: &str) -> Result<String, CorpusError> {
	let missing = || CorpusError::MissingElement(id.to_string());
	let document = web_sys::window().and_then(|w| w.document()).ok_or_else(missing)?;
	let script: HtmlScriptElement = document
		.get_element_by_id(id)
		.and_then(|e| e.dyn_into().ok())
		.ok_or_else(missing)?;
	script.text().map_err(|_| missing())
}

/// Parse embedded corpus text: a JSON array of records, otherwise CSV.
pub fn parse_corpus(text: &str) -> Result<Vec<Publication>, CorpusError> {
	if text.trim_start().starts_with('[') {
		from_records(text)
	} else {
		Ok(parse_csv(text))
	}
}

/// Fetch a `title,link` CSV corpus.
pub async fn fetch_csv(url: &str) -> Result<Vec<Publication>, CorpusError> {
	let response = Request::get(url).send().await?;
	if !response.ok() {
		return Err(CorpusError::Status(response.status()));
	}
	let text = response.text().await?;
	Ok(parse_csv(&text))
}

fn embedded_corpus() -> Option<Vec<Publication>> {
	match embedded_text(CORPUS_ELEMENT).and_then(|text| parse_corpus(&text)) {
		Ok(corpus) if !corpus.is_empty() => {
			info!("loaded {} publications from page", corpus.len());
			Some(corpus)
		}
		Ok(_) => {
			info!("embedded corpus is empty");
			None
		}
		Err(CorpusError::MissingElement(_)) => None,
		Err(e) => {
			warn!("{e}");
			None
		}
	}
}

fn or_samples(fetched: Result<Vec<Publication>, CorpusError>) -> Vec<Publication> {
	match fetched {
		Ok(corpus) if !corpus.is_empty() => {
			info!("loaded {} publications from {PUBLICATIONS_URL}", corpus.len());
			corpus
		}
		Ok(_) => {
			warn!("remote corpus is empty, using sample publications");
			sample_publications()
		}
		Err(e) => {
			warn!("{e}, using sample publications");
			sample_publications()
		}
	}
}

/// Corpus for the dashboard: records embedded in the page, else the CSV at
/// [`PUBLICATIONS_URL`], else [`sample_publications`].
pub async fn load_corpus() -> Vec<Publication> {
	if let Some(corpus) = embedded_corpus() {
		return corpus;
	}
	info!("fetching publications from {PUBLICATIONS_URL}");
	or_samples(fetch_csv(PUBLICATIONS_URL).await)
}

/// Vocabulary override embedded in the page, or the built-in one.
pub fn load_vocabulary() -> Vocabulary {
	let Ok(json) = embedded_text(VOCABULARY_ELEMENT) else {
		return Vocabulary::default();
	};
	match serde_json::from_str(&json) {
		Ok(vocab) => vocab,
		Err(e) => {
			warn!("{}, using built-in vocabulary", CorpusError::from(e));
			Vocabulary::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn categorize_follows_rule_order() {
		assert_eq!(categorize("Bone loss under RADIATION"), "Bone & Musculoskeletal");
		assert_eq!(categorize("Cosmic rays"), "Radiation Biology");
		assert_eq!(categorize("Sleep in orbit"), "General Space Biology");
	}

	#[test]
	fn organism_fallback() {
		assert_eq!(extract_organism("Astronaut vision"), "Human");
		assert_eq!(extract_organism("Murine liver"), "Mouse");
		assert_eq!(extract_organism("Yeast"), "Multiple/Other");
	}

	#[test]
	fn csv_skips_header_and_blank_titles() {
		let csv = "Title,Link\n\"Bone Density\",\"https://a\"\n\n,https://b\nCosmic rays,https://c\n";
		let corpus = parse_csv(csv);
		assert_eq!(corpus.len(), 2);
		assert_eq!(corpus[0].id, 1);
		assert_eq!(corpus[0].title, "Bone Density");
		assert_eq!(corpus[0].link, "https://a");
		assert_eq!(corpus[0].category, "Bone & Musculoskeletal");
		assert_eq!(corpus[1].id, 3);
		assert_eq!(corpus[1].category, "Radiation Biology");
	}

	#[test]
	fn records_infer_missing_fields() {
		let json = r#"[
			{"title": "Plant roots in microgravity", "link": "https://x"},
			{"title": "   "},
			{"id": 42, "title": "Custom", "category": "Other", "organism": "Yeast"}
		]"#;
		let corpus = from_records(json).unwrap();
		assert_eq!(corpus.len(), 2);
		assert_eq!(corpus[0].id, 1);
		assert_eq!(corpus[0].category, "Plant Biology");
		assert_eq!(corpus[0].organism, "Arabidopsis");
		assert_eq!(corpus[1].id, 42);
		assert_eq!(corpus[1].category, "Other");
	}

	#[test]
	fn corpus_format_detected_from_content() {
		let csv = parse_corpus("Title,Link\nBone loss,https://a\n").unwrap();
		assert_eq!(csv[0].title, "Bone loss");
		let json = parse_corpus("  [{\"title\": \"Bone loss\"}]").unwrap();
		assert_eq!(json, csv.into_iter().map(|p| Publication { link: String::new(), ..p }).collect::<Vec<_>>());
	}

	#[test]
	fn bad_json_is_an_error() {
		assert!(matches!(from_records("{"), Err(CorpusError::Json(_))));
	}

	#[test]
	fn failed_fetch_falls_back_to_samples() {
		assert_eq!(or_samples(Err(CorpusError::Status(404))), sample_publications());
		assert_eq!(or_samples(Ok(Vec::new())), sample_publications());
		let fetched = parse_csv("Title,Link\nBone loss,https://a\n");
		assert_eq!(or_samples(Ok(fetched.clone())), fetched);
	}

	#[test]
	fn stats_sorted_by_count() {
		let mut corpus = sample_publications();
		corpus.push(Publication {
			id: 6,
			..corpus[4].clone()
		});
		let stats = category_stats(&corpus);
		assert_eq!(stats[0], ("Immunology".to_string(), 2));
		assert_eq!(stats.len(), 5);
	}
}
