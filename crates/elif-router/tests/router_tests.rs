use elif_router::{
    Handler, Method, MethodSet, Middleware, MiddlewareAware, Next, NextFuture, Route,
    RouteCollection, Router, RouterConfig, RouterError, UriOptions,
};
use axum::extract::Request;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct Tagged(&'static str);

impl Middleware for Tagged {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static> {
        Box::pin(next.run(request))
    }

    fn name(&self) -> &'static str {
        self.0
    }
}

fn resolver(ids: &[&'static str]) -> HashMap<String, Arc<dyn Middleware>> {
    ids.iter()
        .map(|&id| (id.to_string(), Arc::new(Tagged(id)) as Arc<dyn Middleware>))
        .collect()
}

fn substitutions(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_named_routes_match_exactly() {
    let mut router = Router::new();
    router.get("/", "Home::index", Some("home")).unwrap();
    router.post("/login", "Auth::login", Some("login")).unwrap();
    router.put("/posts/{id}", "Posts::update", Some("posts.update")).unwrap();
    router.patch("/posts/{id}", "Posts::patch", Some("posts.patch")).unwrap();
    router.delete("/posts/{id}", "Posts::destroy", Some("posts.destroy")).unwrap();
    router.options("/posts", "Posts::options", Some("posts.options")).unwrap();
    router.head("/ping", "Ping::head", Some("ping")).unwrap();

    let cases = [
        (Method::GET, "/", "home"),
        (Method::POST, "/login", "login"),
        (Method::PUT, "/posts/1", "posts.update"),
        (Method::PATCH, "/posts/1", "posts.patch"),
        (Method::DELETE, "/posts/1", "posts.destroy"),
        (Method::OPTIONS, "/posts", "posts.options"),
        (Method::HEAD, "/ping", "ping"),
    ];
    for (method, path, name) in cases {
        let result = router.resolve(&method, path);
        assert!(result.is_success(), "{} {} should match", method, path);
        assert_eq!(result.matched_route_name(), Some(name));
    }
}

#[test]
fn test_get_route_does_not_allow_head() {
    let mut router = Router::new();
    let route = router.get("/users", "Users::index", None).unwrap();
    assert!(route.allows_method("GET"));
    assert!(!route.allows_method("HEAD"));

    let result = router.resolve(&Method::HEAD, "/users");
    assert!(result.is_method_failure());
}

#[test]
fn test_any_route_accepts_every_method() {
    let mut router = Router::new();
    router.any("/hook", "Hooks::receive", None).unwrap();

    for method in [Method::GET, Method::POST, Method::DELETE, Method::HEAD] {
        let result = router.resolve(&method, "/hook");
        assert_eq!(result.matched_route_name(), Some("/hook"));
    }
}

#[test]
fn test_duplicates_are_rejected_by_default() {
    let mut router = Router::new();
    assert!(router.detects_duplicates());
    router.get("/foo", "Foo::a", None).unwrap();

    let err = router.get("/foo", "Foo::b", None).unwrap_err();
    assert!(err.is_duplicate());
    assert!(err.to_string().contains("/foo^GET"));

    // Same path, other method is fine
    router.post("/foo", "Foo::c", None).unwrap();
}

#[test]
fn test_duplicates_allowed_when_detection_disabled() {
    let mut router = Router::with_config(RouterConfig::default().with_duplicate_detection(false));
    assert!(!router.detects_duplicates());

    router.get("/foo", "Foo::first", None).unwrap();
    router.get("/foo", "Foo::second", None).unwrap();

    let route = router.get_route("/foo^GET").unwrap();
    assert!(matches!(route.handler(), Handler::ClassMethod { method, .. } if method == "second"));
    assert_eq!(router.route_count(), 1);
}

#[test]
fn test_first_registered_wins_matching_when_detection_disabled() {
    let mut router = Router::with_config(RouterConfig::default().with_duplicate_detection(false));
    router.get("/foo", "Foo::first", Some("first")).unwrap();
    router.get("/foo", "Foo::second", Some("second")).unwrap();

    assert_eq!(router.resolve(&Method::GET, "/foo").matched_route_name(), Some("first"));
    assert!(router.get_route("second").is_some());
}

#[test]
fn test_default_route_names() {
    let route = Route::new("/test", "T::t", None, Method::GET.into());
    assert_eq!(route.name(), "/test^GET");

    let route = Route::new("/test", "T::t", None, MethodSet::parse(["POST", "GET"]).unwrap());
    assert_eq!(route.name(), "/test^GET:POST");

    let methods = MethodSet::try_from(vec![Method::POST, Method::GET]).unwrap();
    let route = Route::new("/test", "T::t", None, methods);
    assert_eq!(route.name(), "/test^GET:POST");
}

#[test]
fn test_unsorted_unnamed_duplicates_collide() {
    let mut router = Router::new();
    router
        .route("/t", Handler::from("T::a"), None, MethodSet::try_from([Method::GET, Method::POST]).unwrap())
        .unwrap();

    let err = router
        .route("/t", Handler::from("T::b"), None, MethodSet::try_from([Method::POST, Method::GET]).unwrap())
        .unwrap_err();
    assert!(err.is_duplicate());
}

#[test]
fn test_empty_explicit_method_list_is_rejected() {
    let err = MethodSet::try_from(Vec::<Method>::new()).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(MethodSet::try_from([] as [Method; 0]).is_err());
}

#[test]
fn test_method_validation() {
    let err = MethodSet::parse(Vec::<&str>::new()).unwrap_err();
    assert!(matches!(err, RouterError::InvalidArgument { .. }));
    assert!(err.to_string().contains("empty"));

    let err = MethodSet::parse(["123"]).unwrap_err();
    assert!(matches!(err, RouterError::InvalidArgument { .. }));
    assert!(err.to_string().contains("invalid"));
}

#[test]
fn test_group_prefixes_paths() {
    let mut router = Router::new();
    router
        .group("/admin", |admin| {
            admin.route("/acme", Handler::from("Acme::index"), None, MethodSet::any())?;
            admin.route("/", Handler::from("Admin::index"), None, MethodSet::any())?;
            admin.get("//users", "Admin::users", None)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(router.get_route("/admin/acme").unwrap().path(), "/admin/acme");
    assert_eq!(router.get_route("/admin").unwrap().path(), "/admin");
    assert_eq!(router.get_route("/admin/users^GET").unwrap().path(), "/admin/users");

    let route = router.get_route("/admin/acme").unwrap();
    let group = router.group_definition(route.parent_group().unwrap()).unwrap();
    assert_eq!(group.prefix, "/admin");
}

#[test]
fn test_group_rejects_foreign_paths_and_empty_prefix() {
    let mut router = Router::new();
    let err = router
        .group("/admin", |admin| {
            admin.add_route(Route::new("/blog", "Blog::index", None, MethodSet::any()))?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(router.get_route("/blog").is_none());

    let err = router.group("", |_| Ok(())).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_crud_routes() {
    let mut router = Router::new();
    router.crud("/posts", "PostController", "posts").unwrap();
    assert_eq!(router.route_count(), 6);

    let expected = [
        ("posts.index", "/posts", Method::GET, "index"),
        ("posts.create", "/posts/new", Method::GET, "create"),
        ("posts.create.post", "/posts/new", Method::POST, "create"),
        ("posts.edit", r"/posts/{id:\d+}", Method::GET, "edit"),
        ("posts.edit.post", r"/posts/{id:\d+}", Method::POST, "edit"),
        ("posts.delete", r"/posts/{id:\d+}", Method::DELETE, "delete"),
    ];
    for (name, path, method, action) in expected {
        let route = router.get_route(name).unwrap();
        assert_eq!(route.path(), path);
        assert_eq!(route.allowed_methods(), Some(&[method][..]));
        assert_eq!(
            route.handler().key().as_deref(),
            Some(format!("PostController::{}", action).as_str())
        );
    }

    assert_eq!(
        router.resolve(&Method::GET, "/posts/42").matched_route_name(),
        Some("posts.edit")
    );
    assert!(router.resolve(&Method::GET, "/posts/abc").is_failure());
    assert!(router.resolve(&Method::DELETE, "/posts/abc").is_failure());
    assert_eq!(
        router.resolve(&Method::DELETE, "/posts/7").matched_params().get("id"),
        Some(&"7".to_string())
    );
}

#[test]
fn test_crud_inside_group() {
    let mut router = Router::new();
    router
        .group("/admin", |admin| {
            admin.crud("/users", "UserController", "admin.users")?;
            Ok(())
        })
        .unwrap();

    let route = router.get_route("admin.users.index").unwrap();
    assert_eq!(route.path(), "/admin/users");
    let chain: Vec<&str> = router.group_chain(&route).iter().map(|g| g.prefix.as_str()).collect();
    assert_eq!(chain, vec!["/admin", "/admin/users"]);
}

#[test]
fn test_method_failure_reports_allowed_methods() {
    let mut router = Router::new();
    router
        .route("/foo", Handler::from("Foo::bar"), Some("foo"), MethodSet::parse(["GET", "POST"]).unwrap())
        .unwrap();

    let result = router.resolve(&Method::PUT, "/foo");
    assert!(result.is_method_failure());
    assert!(result.matched_route_name().is_none());
    assert_eq!(result.allowed_methods(), Some(&[Method::GET, Method::POST][..]));
}

#[test]
fn test_shift_middleware_drains_softly() {
    let mut route = Route::new("/foo", "Foo::bar", None, MethodSet::any());
    route.middlewares(["auth", "csrf", "throttle"]);
    let resolver = resolver(&["auth", "csrf", "throttle"]);

    assert_eq!(route.shift_middleware(&resolver).map(|m| m.name()), Some("auth"));
    assert_eq!(route.shift_middleware(&resolver).map(|m| m.name()), Some("csrf"));
    assert_eq!(route.shift_middleware(&resolver).map(|m| m.name()), Some("throttle"));
    assert!(route.shift_middleware(&resolver).is_none());
    assert!(route.middleware_stack().is_empty());
}

#[test]
fn test_group_middleware_stays_on_the_group() {
    let mut router = Router::new();
    router
        .group("/admin", |admin| {
            admin.middleware("admin");
            admin.get("/dashboard", "Admin::dashboard", Some("dashboard"))?;
            Ok(())
        })
        .unwrap();

    let route = router.get_route("dashboard").unwrap();
    assert!(route.middleware_stack().is_empty());
    assert_eq!(router.middleware_snapshot(&route).labels(), vec!["admin"]);
}

#[test]
fn test_generate_uri() {
    let mut router = Router::new();
    router.get(r"/users/{id:\d+}/posts/{slug}", "Posts::show", Some("posts.show")).unwrap();

    let uri = router
        .generate_uri("posts.show", &substitutions(&[("id", "3"), ("slug", "intro")]), &UriOptions::new())
        .unwrap();
    assert_eq!(uri, "/users/3/posts/intro");

    let uri = router
        .generate_uri(
            "posts.show",
            &substitutions(&[("id", "3")]),
            &UriOptions::new().with_default("slug", "latest"),
        )
        .unwrap();
    assert_eq!(uri, "/users/3/posts/latest");

    let err = router
        .generate_uri("posts.show", &substitutions(&[("id", "3")]), &UriOptions::new())
        .unwrap_err();
    assert!(matches!(err, RouterError::MissingParameter { ref parameter, .. } if parameter == "slug"));

    let err = router
        .generate_uri("nope", &HashMap::new(), &UriOptions::new())
        .unwrap_err();
    assert!(matches!(err, RouterError::RouteNotFound { .. }));
}

#[test]
fn test_router_is_shareable_across_threads() {
    let mut router = Router::new();
    router.get("/items/{id}", "Items::show", Some("items.show")).unwrap();
    let router = Arc::new(router);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                let result = router.resolve(&Method::GET, &format!("/items/{}", i));
                result.matched_params().get("id").cloned()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(i.to_string()));
    }
}
