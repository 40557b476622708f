//! Dashboard state: search resolution, stale responses, failures, filters,
//! selection and reveal

mod common;

use common::{journal, FakeSource};
use ojs_knowledge::config::ViewConfig;
use ojs_knowledge::dashboard::{Dashboard, DragPhase, FilterState, SearchOutcome};
use ojs_knowledge::graph::Point;
use ojs_knowledge::rdf::{EntityKind, EntityUri};
use ojs_knowledge::resolver::{SearchKind, SearchQuery};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

fn dashboard(source: Arc<FakeSource>, view: ViewConfig) -> Dashboard {
    Dashboard::new(source, None, view)
}

#[tokio::test]
async fn test_initial_load_fetches_three_things() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());

    dash.initial_load().await.unwrap();

    let mut calls = source.calls();
    calls.sort();
    assert_eq!(calls, vec!["/articulos?autor=", "/autores_top", "/secciones_mas_activas"]);

    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 3);
    assert!(snapshot.triples > 0);
    assert_eq!(dash.active_sections().await.len(), 2);
    assert_eq!(dash.top_authors().await[0].activity.publicaciones, 2);
}

#[tokio::test]
async fn test_initial_load_failure_changes_nothing() {
    let source = Arc::new(FakeSource::new(journal()));
    source.set_failing(true);
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());

    assert!(dash.initial_load().await.is_err());

    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 0);
    assert_eq!(snapshot.nodes, 0);
    assert!(dash.active_sections().await.is_empty());
    assert!(snapshot.last_error.is_some());
}

#[tokio::test]
async fn test_late_initial_load_failure_keeps_search_state() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(FakeSource::with_authors_gate(journal(), Arc::clone(&gate)));
    let dash = Arc::new(dashboard(Arc::clone(&source), ViewConfig::default()));

    let load = {
        let dash = Arc::clone(&dash);
        tokio::spawn(async move { dash.initial_load().await })
    };

    // wait until the top-author fetch is in flight
    while !source.calls().iter().any(|c| c == "/autores_top") {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let applied = dash.search(SearchQuery::new(SearchKind::Institution, "MIT")).await;
    assert!(matches!(applied, SearchOutcome::Applied { articles: 1, .. }));

    source.set_failing(true);
    gate.notify_one();
    assert!(load.await.unwrap().is_err());

    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 1);
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test]
async fn test_institution_search_fetches_once_and_replaces() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();
    source.clear_calls();

    let outcome = dash.search(SearchQuery::new(SearchKind::Institution, "MIT")).await;

    assert_eq!(source.calls(), vec!["/articulos_institucion?inst=MIT"]);
    assert!(matches!(outcome, SearchOutcome::Applied { articles: 1, .. }));

    let page = dash.visible_articles().await;
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].doi, "10.1/a");

    let triples = dash.triples().await;
    assert!(triples.iter().all(|t| t.subject.kind() != EntityKind::Article || t.subject.id() == "10.1/a"));
}

#[tokio::test]
async fn test_article_search_by_doi_and_empty_term() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());

    dash.search(SearchQuery::new(SearchKind::Article, "10.1/c")).await;
    dash.search(SearchQuery::new(SearchKind::Article, "")).await;
    assert_eq!(source.calls(), vec!["/articulo/?doi=10.1/c", "/articulos?autor="]);
    assert_eq!(dash.snapshot().await.articles, 3);

    let outcome = dash.search(SearchQuery::new(SearchKind::Article, "10.9/missing")).await;
    assert_eq!(outcome, SearchOutcome::Applied { articles: 0, triples: 0 });
    assert_eq!(dash.snapshot().await.nodes, 0);
}

#[tokio::test]
async fn test_failed_search_leaves_state() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();
    let before = dash.triples().await;

    source.set_failing(true);
    let outcome = dash.search(SearchQuery::new(SearchKind::Author, "Luis Pérez")).await;

    assert!(matches!(outcome, SearchOutcome::Failed { .. }));
    assert_eq!(dash.triples().await, before);
    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 3);
    assert!(snapshot.last_error.unwrap().contains("500"));

    source.set_failing(false);
    dash.search(SearchQuery::new(SearchKind::Author, "Luis Pérez")).await;
    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 1);
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(FakeSource::gated(journal(), Arc::clone(&gate)));
    let dash = Arc::new(dashboard(Arc::clone(&source), ViewConfig::default()));

    let slow = {
        let dash = Arc::clone(&dash);
        tokio::spawn(async move { dash.search(SearchQuery::new(SearchKind::Keywords, "ai")).await })
    };

    // wait until the keyword fetch is in flight
    while !source.calls().iter().any(|c| c.starts_with("/articulos_keywords")) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let fast = dash.search(SearchQuery::new(SearchKind::Author, "Luis Pérez")).await;
    assert!(matches!(fast, SearchOutcome::Applied { articles: 1, .. }));

    gate.notify_one();
    let late = slow.await.unwrap();
    assert!(matches!(late, SearchOutcome::Stale { .. }));

    let snapshot = dash.snapshot().await;
    assert_eq!(snapshot.articles, 1);
    assert_eq!(snapshot.last_query.unwrap().term, "Luis Pérez");
}

#[tokio::test]
async fn test_filters_are_not_fetched() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();
    source.clear_calls();
    let before = dash.triples().await;

    let applied = dash
        .set_filters(FilterState { section: Some("Reviews".into()), author: Some(String::new()) })
        .await;

    assert_eq!(applied.section.as_deref(), Some("Reviews"));
    assert_eq!(applied.author, None);
    assert!(source.calls().is_empty());
    assert_eq!(dash.triples().await, before);
    assert_eq!(dash.snapshot().await.filters, applied);
}

#[tokio::test]
async fn test_opt_in_filter_application() {
    let source = Arc::new(FakeSource::new(journal()));
    let view = ViewConfig { apply_filters: true, ..ViewConfig::default() };
    let dash = dashboard(Arc::clone(&source), view);
    dash.initial_load().await.unwrap();

    dash.set_filters(FilterState { section: Some("Articles".into()), author: None }).await;

    let articles: Vec<_> = dash.triples().await
        .into_iter()
        .filter(|t| t.predicate.is_type() && t.subject.kind() == EntityKind::Article)
        .map(|t| t.subject.id().to_string())
        .collect();
    assert_eq!(articles, vec!["10.1/b", "10.1/c"]);

    // the article list itself is untouched
    assert_eq!(dash.snapshot().await.articles, 3);
}

#[tokio::test]
async fn test_select_article_fetches_detail_and_related() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();

    let detail = dash.select(&EntityUri::article("10.1/a")).await.unwrap();
    assert_eq!(detail.node.label, "Graph search");
    assert_eq!(detail.article.unwrap().resumen, "Abstract of Graph search");
    assert_eq!(detail.related.len(), 2);
    assert_eq!(dash.snapshot().await.selection.unwrap().uri, EntityUri::article("10.1/a"));

    let author = dash.select(&EntityUri::author("Ana García")).await.unwrap();
    assert_eq!(author.node.group, EntityKind::Author);
    assert!(author.article.is_none());

    assert!(dash.select(&EntityUri::author("Nobody")).await.is_none());
}

#[tokio::test]
async fn test_select_notifies_registered_callback() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();

    let clicks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicks);
    dash.on_select(Box::new(move |node| sink.lock().unwrap().push(node.label.clone()))).await;

    dash.select(&EntityUri::author("Luis Pérez")).await.unwrap();
    assert!(dash.select(&EntityUri::author("Nobody")).await.is_none());

    // survives a rebuild
    dash.search(SearchQuery::new(SearchKind::Author, "Ana García")).await;
    dash.select(&EntityUri::article("10.1/b")).await.unwrap();

    assert_eq!(*clicks.lock().unwrap(), vec!["Luis Pérez", "Entity ranking"]);
}

#[tokio::test]
async fn test_select_tolerates_detail_failure() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();

    source.set_failing(true);
    let detail = dash.select(&EntityUri::article("10.1/b")).await.unwrap();
    assert_eq!(detail.node.label, "Entity ranking");
    assert!(detail.article.is_none());
    assert!(detail.related.is_empty());
}

#[tokio::test]
async fn test_show_more_reveals_pages_and_resets() {
    let source = Arc::new(FakeSource::new(journal()));
    let view = ViewConfig { page_size: 2, ..ViewConfig::default() };
    let dash = dashboard(Arc::clone(&source), view);
    dash.initial_load().await.unwrap();

    let page = dash.visible_articles().await;
    assert_eq!(page.articles.len(), 2);
    assert!(page.has_more);

    let page = dash.show_more().await;
    assert_eq!(page.articles.len(), 3);
    assert!(!page.has_more);
    assert_eq!(dash.show_more().await.articles.len(), 3);

    dash.search(SearchQuery::new(SearchKind::Article, "")).await;
    assert_eq!(dash.visible_articles().await.articles.len(), 2);
}

#[tokio::test]
async fn test_drag_through_dashboard() {
    let source = Arc::new(FakeSource::new(journal()));
    let dash = dashboard(Arc::clone(&source), ViewConfig::default());
    dash.initial_load().await.unwrap();
    let ana = EntityUri::author("Ana García");

    assert!(dash.drag(&ana, DragPhase::Start, None).await.is_some());
    let to = Point::new(50.0, -20.0);
    assert_eq!(dash.drag(&ana, DragPhase::Move, Some(to)).await, Some(to));
    assert!(dash.drag(&ana, DragPhase::End, None).await.is_some());
    assert!(dash.drag(&ana, DragPhase::End, None).await.is_none());
}
