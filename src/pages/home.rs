use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use crate::components::knowledge_graph::{
	KnowledgeGraphCanvas, NodeKind, Publication, TypeVisibility, build, kind_color,
};
use crate::corpus::{CATEGORIES, ORGANISMS, category_stats, load_corpus, load_vocabulary};

fn matches_filters(p: &Publication, query: &str, category: &str, organism: &str) -> bool {
	(query.is_empty() || p.title.to_lowercase().contains(query))
		&& (category == "all" || p.category == category)
		&& (organism == "all" || p.organism == organism)
}

/// Loads the corpus, then shows the dashboard.
#[component]
pub fn Home() -> impl IntoView {
	let (corpus, set_corpus) = signal(None::<Vec<Publication>>);
	spawn_local(async move {
		set_corpus.set(Some(load_corpus().await));
	});

	move || match corpus.get() {
		None => view! {
			<div class="loading">
				<h2>"Loading publications"</h2>
				<p class="subtitle">"Fetching space bioscience publications..."</p>
			</div>
		}
		.into_any(),
		Some(corpus) => view! { <Dashboard corpus=corpus /> }.into_any(),
	}
}

/// Publication list with filters, and the knowledge graph of the selected
/// publication.
#[component]
fn Dashboard(corpus: Vec<Publication>) -> impl IntoView {
	let corpus = StoredValue::new(corpus);
	let vocabulary = StoredValue::new(load_vocabulary());
	let total = corpus.with_value(Vec::len);
	let stats = corpus.with_value(|c| category_stats(c));

	let (focus, set_focus) = signal(None::<Publication>);
	let (query, set_query) = signal(String::new());
	let (category, set_category) = signal("all".to_string());
	let (organism, set_organism) = signal("all".to_string());
	let (graph_search, set_graph_search) = signal(String::new());
	let visibility = RwSignal::new(TypeVisibility::default());

	let graph = Memo::new(move |_| {
		let focus = focus.get();
		corpus.with_value(|c| vocabulary.with_value(|v| build(c, focus.as_ref(), v)))
	});
	let counts = Memo::new(move |_| graph.with(|g| g.type_counts()));
	let filtered = Memo::new(move |_| {
		let (q, cat, org) = (query.get().to_lowercase(), category.get(), organism.get());
		corpus.with_value(|c| {
			c.iter()
				.filter(|p| matches_filters(p, &q, &cat, &org))
				.cloned()
				.collect::<Vec<_>>()
		})
	});

	let on_select = Callback::new(move |publication: Publication| {
		info!("publication {} selected", publication.id);
		set_focus.set(Some(publication));
	});

	view! {
		<div class="dashboard">
			<header class="dashboard-header">
				<h1>"Bioscience Publication Explorer"</h1>
				<span class="subtitle">
					{move || filtered.with(Vec::len)} " of " {total} " publications"
				</span>
			</header>

			<section class="filters">
				<input
					type="text"
					placeholder="Search publications by title or keywords..."
					prop:value=move || query.get()
					on:input=move |ev| set_query.set(event_target_value(&ev))
				/>
				<select
					prop:value=move || category.get()
					on:change=move |ev| set_category.set(event_target_value(&ev))
				>
					<option value="all">"All Categories"</option>
					{CATEGORIES.iter().map(|c| view! { <option value=*c>{*c}</option> }).collect_view()}
				</select>
				<select
					prop:value=move || organism.get()
					on:change=move |ev| set_organism.set(event_target_value(&ev))
				>
					<option value="all">"All Organisms"</option>
					{ORGANISMS.iter().map(|o| view! { <option value=*o>{*o}</option> }).collect_view()}
				</select>
			</section>

			<section class="stats">
				<div class="stat">
					<div class="stat-value">{total}</div>
					<div class="stat-label">"Total Publications"</div>
				</div>
				{stats
					.into_iter()
					.take(4)
					.map(|(name, count)| {
						view! {
							<div class="stat">
								<div class="stat-value">{count}</div>
								<div class="stat-label">{name}</div>
							</div>
						}
					})
					.collect_view()}
			</section>

			<div class="content">
				<ul class="publication-list">
					{move || {
						filtered
							.get()
							.into_iter()
							.map(|p| {
								let id = p.id;
								let (title, category, organism) = (
									p.title.clone(),
									p.category.clone(),
									p.organism.clone(),
								);
								view! {
									<li
										class="publication"
										class:active=move || focus.with(|f| f.as_ref().map(|f| f.id) == Some(id))
										on:click=move |_| on_select.run(p.clone())
									>
										<div class="publication-title">{title}</div>
										<div class="publication-meta">{category} " · " {organism}</div>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>

				<div class="graph-panel">
					{move || {
						focus
							.get()
							.map(|p| {
								view! {
									<div class="selected-publication">
										<h2>{p.title}</h2>
										<p>{p.category} " · " {p.organism}</p>
										<a href=p.link target="_blank" rel="noopener noreferrer">
											"Open article"
										</a>
									</div>
								}
							})
					}}

					<div class="graph-controls">
						<input
							type="text"
							placeholder="Search graph nodes..."
							prop:value=move || graph_search.get()
							on:input=move |ev| set_graph_search.set(event_target_value(&ev))
						/>
						{NodeKind::ALL
							.into_iter()
							.map(|kind| {
								view! {
									<label class="legend-item">
										<input
											type="checkbox"
											prop:checked=move || visibility.with(|v| v.allows(kind))
											on:change=move |ev| {
												let checked = event_target_checked(&ev);
												visibility.update(|v| v.set(kind, checked));
											}
										/>
										<span
											class="legend-swatch"
											style=format!("background: {}", kind_color(kind))
										></span>
										{kind.plural()}
										" ("
										{move || counts.get().get(kind)}
										")"
									</label>
								}
							})
							.collect_view()}
					</div>

					<KnowledgeGraphCanvas
						graph=graph
						search=graph_search
						visibility=visibility
						on_select=on_select
						height=Some(520.0)
					/>
					<p class="subtitle">
						"Click a publication node to refocus. Drag nodes to reposition. Scroll to zoom."
					</p>
				</div>
			</div>
		</div>
	}
}
