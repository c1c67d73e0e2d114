use assert_matches::assert_matches;
use catalog_shared::view::NavigationView;
use catalog_shared::{App, Effect, Event, Item, Model, Navigation};
use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};

const CATALOG_URL: &str = "https://thronesapi.com/api/v2/characters";

fn catalog() -> Vec<Item> {
    vec![
        Item::new(0, "Daenerys Targaryen", "https://img/0.jpg"),
        Item::new(1, "Samwell Tarly", "https://img/1.jpg"),
        Item::new(2, "Jon Snow", "https://img/2.jpg"),
        Item::new(3, "Arya Stark", "https://img/3.jpg"),
        Item::new(4, "Sansa Stark", "https://img/4.jpg"),
        Item::new(5, "Brandon Stark", "https://img/5.jpg"),
    ]
}

fn ok_json(items: &[Item]) -> HttpResult {
    HttpResult::Ok(HttpResponse::ok().json(items).build())
}

fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// Opens the screen and returns the pending first-page request.
fn opened() -> (AppTester<App, Effect>, Model, Request<HttpRequest>) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let effects = app
        .update(
            Event::ScreenOpened {
                email: "sam@citadel.oldtown".into(),
            },
            &mut model,
        )
        .effects;
    let mut requests = http_requests(effects);
    let first_page = requests.remove(0);
    (app, model, first_page)
}

/// Types `query`, submits it and returns the catalog request, if one was issued.
fn submit(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    query: &str,
) -> Option<Request<HttpRequest>> {
    app.update(Event::QueryChanged { text: query.into() }, model);
    let mut requests = http_requests(app.update(Event::SearchSubmitted, model).effects);
    assert!(requests.len() <= 1);
    requests.pop()
}

fn resolve(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<HttpRequest>,
    result: HttpResult,
) -> Vec<Effect> {
    let update = app.resolve(request, result).expect("request resolves");
    let mut effects = Vec::new();
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

#[test]
fn search_fetches_the_unpaginated_catalog() {
    let (app, mut model, _) = opened();

    let request = submit(&app, &mut model, "stark").expect("catalog request");
    assert_eq!(request.operation.method, "GET");
    assert_eq!(request.operation.url, CATALOG_URL);

    let view = app.view(&model);
    assert!(view.search.is_searching);
    assert!(view.search.can_search);
}

#[test]
fn matches_are_case_insensitive_and_keep_provider_order() {
    let (app, mut model, _) = opened();
    let mut request = submit(&app, &mut model, "stark").expect("catalog request");
    resolve(&app, &mut model, &mut request, ok_json(&catalog()));

    let view = app.view(&model);
    assert!(!view.search.is_searching);
    assert!(view.search.message.is_none());
    let names: Vec<String> = view
        .search
        .results
        .expect("results")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Arya Stark", "Sansa Stark", "Brandon Stark"]);

    assert_matches!(
        &model.navigation,
        Some(Navigation::SearchResults(items)) if items.len() == 3
    );
    assert_matches!(
        app.view(&model).navigation,
        Some(NavigationView::SearchResults { items }) if items[0].id == 3
    );
}

#[test]
fn no_match_reports_no_results_without_navigating() {
    let (app, mut model, _) = opened();
    let mut request = submit(&app, &mut model, "zzz").expect("catalog request");
    resolve(&app, &mut model, &mut request, ok_json(&catalog()));

    let view = app.view(&model);
    assert_eq!(view.search.message.as_deref(), Some("No results found"));
    assert!(view.search.results.is_none());
    assert!(model.navigation.is_none());
}

#[test]
fn blank_query_is_rejected_without_a_fetch() {
    let (app, mut model, _) = opened();

    for query in ["", "   ", "\t"] {
        assert!(submit(&app, &mut model, query).is_none());

        let view = app.view(&model);
        assert!(!view.search.can_search);
        assert_eq!(
            view.search.message.as_deref(),
            Some("Search input cannot be empty")
        );
    }
}

#[test]
fn server_error_discards_only_that_search() {
    let (app, mut model, _) = opened();
    let mut request = submit(&app, &mut model, "snow").expect("catalog request");
    let failure = HttpResponse::status(500).body(b"oops".to_vec()).build();
    resolve(&app, &mut model, &mut request, HttpResult::Ok(failure));

    let view = app.view(&model);
    assert_eq!(
        view.search.message.as_deref(),
        Some("Failed to load search results")
    );
    assert!(view.search.results.is_none());
    assert!(view.feed.error_message.is_none());
    assert!(model.navigation.is_none());
}

#[test]
fn search_never_touches_the_feed() {
    let (app, mut model, _) = opened();
    let before = model.screen.as_ref().map(|s| s.feed.clone());

    let mut request = submit(&app, &mut model, "stark").expect("catalog request");
    resolve(&app, &mut model, &mut request, ok_json(&catalog()));

    assert_eq!(model.screen.as_ref().map(|s| s.feed.clone()), before);
}

#[test]
fn last_settled_search_wins() {
    let (app, mut model, _) = opened();
    let mut stark = submit(&app, &mut model, "stark").expect("catalog request");
    let mut snow = submit(&app, &mut model, "snow").expect("catalog request");
    assert!(app.view(&model).search.is_searching);

    resolve(&app, &mut model, &mut snow, ok_json(&catalog()));
    assert!(app.view(&model).search.is_searching);

    resolve(&app, &mut model, &mut stark, ok_json(&catalog()));
    let view = app.view(&model);
    assert!(!view.search.is_searching);
    assert_eq!(view.search.results.map(|r| r.len()), Some(3));
}

#[test]
fn search_from_a_closed_screen_cannot_settle_the_next_one() {
    let (app, mut model, _) = opened();
    let mut stale = submit(&app, &mut model, "stark").expect("catalog request");

    app.update(Event::ScreenClosed, &mut model);
    app.update(
        Event::ScreenOpened {
            email: "sam@citadel.oldtown".into(),
        },
        &mut model,
    );
    let _current = submit(&app, &mut model, "snow").expect("catalog request");
    let before = app.view(&model);
    assert!(before.search.is_searching);

    let effects = resolve(&app, &mut model, &mut stale, ok_json(&catalog()));
    assert!(!effects.iter().any(|e| matches!(e, Effect::Render(_))));

    let after = app.view(&model);
    assert_eq!(after, before);
    assert!(after.search.is_searching);
    assert!(after.search.results.is_none());
    assert!(model.navigation.is_none());
}

#[test]
fn clearing_the_query_clears_the_error() {
    let (app, mut model, _) = opened();
    let mut request = submit(&app, &mut model, "zzz").expect("catalog request");
    resolve(&app, &mut model, &mut request, ok_json(&catalog()));
    assert!(app.view(&model).search.message.is_some());

    app.update(Event::QueryChanged { text: String::new() }, &mut model);
    assert!(app.view(&model).search.message.is_none());
}

#[test]
fn dismiss_and_navigation_handled_reset_search_output() {
    let (app, mut model, _) = opened();
    let mut request = submit(&app, &mut model, "stark").expect("catalog request");
    resolve(&app, &mut model, &mut request, ok_json(&catalog()));

    app.update(Event::NavigationHandled, &mut model);
    assert!(model.navigation.is_none());

    app.update(Event::SearchDismissed, &mut model);
    let view = app.view(&model);
    assert!(view.search.results.is_none());
    assert!(view.search.message.is_none());
    assert_eq!(view.search.query_input, "stark");
}

#[test]
fn profile_request_carries_email_and_loaded_items() {
    let (app, mut model, mut first_page) = opened();
    resolve(&app, &mut model, &mut first_page, ok_json(&catalog()));

    app.update(Event::ProfileRequested, &mut model);
    assert_matches!(
        app.view(&model).navigation,
        Some(NavigationView::Profile { email, items })
            if email == "sam@citadel.oldtown" && items.len() == 6
    );
}
