//! Tests for request handling and dispatch.

#[cfg(test)]
mod app_tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};

    use crate::app::{
        cube, AppConfig, Application, Body, Context, CookieAttributes, DownloadOptions, Environ,
        Error, MultiDict, Outcome, Request, Response, StatusCode, StaticOptions,
    };
    use crate::routing::Value;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn get(target: &str) -> Environ {
        Environ::new("GET", target)
    }

    fn form_post(target: &str, body: &str) -> Environ {
        Environ::new("POST", target)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body)
    }

    fn body_text(parts: &crate::app::ResponseParts) -> String {
        String::from_utf8(parts.body.clone()).unwrap()
    }

    // MultiDict

    #[test]
    fn test_multi_dict() {
        let mut d = MultiDict::new();
        d.insert("a", "foo");
        d.insert("b", "bar");
        d.insert("b", "baz");
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("a"), Some("foo"));
        assert_eq!(d.get("b"), Some("baz"));
        assert_eq!(d.get_all("b"), vec!["bar", "baz"]);
        assert!(d.get_all("missing").is_empty());
        assert_eq!(d.get("missing"), None);
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    // Request

    #[test]
    fn test_request_defaults() {
        let r = Request::new(Environ::default());
        assert_eq!(r.method, "GET");
        assert_eq!(r.path, "/");
        assert!(r.query.is_empty());
        assert!(r.form.is_empty());
        assert!(r.cookies.is_empty());

        let r = Request::new(Environ::new("HEAD", "/foo"));
        assert_eq!(r.method, "HEAD");
        assert_eq!(r.path, "/foo");
    }

    #[test]
    fn test_request_query() {
        let r = Request::new(get("/?a=foo&b=bar&a=baz&c="));
        assert_eq!(r.query.get_all("a"), vec!["foo", "baz"]);
        assert_eq!(r.query.get("b"), Some("bar"));
        assert!(!r.query.contains_key("c"));

        let r = Request::new(get("/?a=foo+bar&b=f%6f%6f"));
        assert_eq!(r.query.get("a"), Some("foo bar"));
        assert_eq!(r.query.get("b"), Some("foo"));
    }

    #[test]
    fn test_request_form() {
        let r = Request::new(form_post("/", "a=foo&b=bar&a=baz&c="));
        assert_eq!(r.form.get_all("a"), vec!["foo", "baz"]);
        assert_eq!(r.form.get("b"), Some("bar"));
        assert!(!r.form.contains_key("c"));

        let r = Request::new(Environ::new("POST", "/").with_body("a=foo+bar"));
        assert_eq!(r.form.get("a"), Some("foo bar"));
    }

    #[test]
    fn test_request_form_truncated_to_content_length() {
        let r = Request::new(form_post("/", "a=foo&b=bar").with_header("Content-Length", "4"));
        assert_eq!(r.form.get_all("a"), vec!["fo"]);
        assert!(!r.form.contains_key("b"));

        let r = Request::new(form_post("/", "a=foo").with_header("Content-Length", "11"));
        assert_eq!(r.form.get("a"), Some("foo"));
    }

    #[test]
    fn test_request_form_ignored_for_get_and_other_media_types() {
        let r = Request::new(get("/").with_body("a=foo"));
        assert!(r.form.is_empty());

        let r = Request::new(
            Environ::new("POST", "/")
                .with_header("Content-Type", "application/json")
                .with_body("a=foo"),
        );
        assert!(r.form.is_empty());
    }

    #[test]
    fn test_request_cookies_last_value_wins() {
        let r = Request::new(
            get("/")
                .with_header("Cookie", "a=foo; b=\"bar baz\"")
                .with_header("cookie", "a=qux"),
        );
        assert_eq!(r.cookie("a"), Some("qux"));
        assert_eq!(r.cookie("b"), Some("bar baz"));
        assert_eq!(r.cookie("c"), None);
    }

    #[test]
    fn test_request_headers_are_case_insensitive() {
        let r = Request::new(get("/").with_header("X-Token", "abc"));
        assert_eq!(r.header("x-token"), Some("abc"));
        assert!(r.has_header("X-TOKEN"));
        assert!(!r.has_header("Accept"));
    }

    #[test]
    fn test_request_json() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Note {
            id: u32,
            title: String,
        }

        let r = Request::new(
            Environ::new("POST", "/notes")
                .with_header("Content-Type", "application/json")
                .with_body(r#"{"id": 7, "title": "ice"}"#),
        );
        assert!(r.is_json());
        let note: Note = r.json().unwrap();
        assert_eq!(note, Note { id: 7, title: "ice".to_string() });

        let r = Request::new(Environ::new("POST", "/notes").with_body("{}"));
        assert!(matches!(r.json::<Note>(), Err(Error::MissingHeader(_))));
    }

    // Response

    #[test]
    fn test_response_finish_without_body() {
        let parts = Response::new(&AppConfig::default()).finish();
        assert_eq!(parts.status, 200);
        assert_eq!(parts.status_line, "200 OK");
        assert_eq!(
            parts.headers,
            vec![
                ("Content-Type".to_string(), "text/html; charset=UTF-8".to_string()),
                ("Content-Length".to_string(), "0".to_string()),
            ]
        );
        assert!(parts.body.is_empty());
    }

    #[test]
    fn test_response_finish_with_body_and_headers() {
        let mut r = Response::new(&AppConfig::default());
        r.add_header("X-A", "1");
        r.add_header("X-A", "2");
        r.charset = None;
        r.media_type = "image/png".to_string();
        r.body = Some(Body::Bytes(vec![1, 2, 3]));
        let parts = r.finish();
        assert_eq!(parts.headers.iter().filter(|(k, _)| k == "X-A").count(), 2);
        assert_eq!(parts.header("content-type"), Some("image/png"));
        assert_eq!(parts.header("Content-Length"), Some("3"));
        assert_eq!(parts.body, vec![1, 2, 3]);
    }

    #[test]
    fn test_response_status_line_and_detail() {
        let mut r = Response::new(&AppConfig::default());
        r.status = StatusCode::from_u16(400).unwrap();
        assert_eq!(r.status_line(), "400 Bad Request");
        assert_eq!(r.status_detail(), "Bad request syntax or unsupported method");
    }

    #[test]
    fn test_set_cookie() {
        let mut r = Response::new(&AppConfig::default());
        r.set_cookie("session", "abc123", &CookieAttributes::default());
        r.set_cookie(
            "theme",
            "dark mode",
            &CookieAttributes {
                path: Some("/".to_string()),
                max_age: Some(3600),
                secure: true,
                http_only: true,
                ..CookieAttributes::default()
            },
        );
        let cookies: Vec<&str> = r
            .headers
            .iter()
            .filter(|(k, _)| k == "Set-Cookie")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(
            cookies,
            vec!["session=abc123", "theme=\"dark mode\"; Path=/; Max-Age=3600; Secure; HttpOnly"]
        );
    }

    #[test]
    fn test_status_table() {
        assert_eq!(StatusCode::from_u16(404).unwrap().reason_phrase(), "Not Found");
        assert_eq!(StatusCode::from_u16(418), None);
        assert_eq!(StatusCode::from_u16(999), None);
        assert!(StatusCode::from_u16(308).unwrap().is_redirect());
        assert!(!StatusCode::from_u16(200).unwrap().is_redirect());
        assert_eq!(StatusCode::NOT_IMPLEMENTED.to_string(), "501 Not Implemented");
    }

    // Dispatch

    #[test]
    fn test_literal_route_responds() {
        init_logger();
        let mut app = Application::new();
        app.get("/foo", |_| Ok("<p>Foo</p>".into())).unwrap();
        let parts = app.handle(get("/foo")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(body_text(&parts), "<p>Foo</p>");
        assert_eq!(parts.header("Content-Length"), Some("10"));
    }

    #[test]
    fn test_wildcard_arguments_reach_handler() {
        let mut app = Application::new();
        app.get("/notes/<:path>/<:int>", |ctx| {
            let topic = ctx.args.get(0).cloned();
            let id = ctx.args.get(1).and_then(Value::as_int);
            Ok(format!("{topic:?} {id:?}").into())
        })
        .unwrap();

        let parts = app.handle(get("/notes/tech/python/12")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(body_text(&parts), "Some(Str(\"tech/python\")) Some(12)");

        let parts = app.handle(get("/notes/tech/python/+12")).unwrap();
        assert_eq!(parts.status, 404);
    }

    #[test]
    fn test_named_arguments_reach_handler() {
        let mut app = Application::new();
        app.get("/(?P<user>[^/]*)/(?P<category>[^/]*)/([^/]*)", |ctx| {
            Ok(format!(
                "page_id: {}, user: {}, category: {}",
                ctx.args.positional[0],
                ctx.args.named["user"],
                ctx.args.named["category"]
            )
            .into())
        })
        .unwrap();
        let parts = app.handle(get("/snowman/articles/python")).unwrap();
        assert_eq!(body_text(&parts), "page_id: python, user: snowman, category: articles");
    }

    #[test]
    fn test_unknown_method_is_not_implemented() {
        let mut app = Application::new();
        app.get("/", |_| Ok("home".into())).unwrap();

        let parts = app.handle(Environ::new("POST", "/")).unwrap();
        assert_eq!(parts.status, 501);
        assert_eq!(body_text(&parts), "501 Not Implemented");
        assert_eq!(parts.header("Content-Type"), Some("text/plain; charset=UTF-8"));

        let parts = app.handle(Environ::new("BAD METHOD", "/")).unwrap();
        assert_eq!(parts.status, 501);
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        let mut app = Application::new();
        app.get("/", |_| Ok("home".into())).unwrap();
        let parts = app.handle(get("/foo")).unwrap();
        assert_eq!(parts.status, 404);
        assert_eq!(body_text(&parts), "404 Not Found");
    }

    #[test]
    fn test_status_outcome_uses_error_handler() {
        let mut app = Application::new();
        app.get("/foo", |_| Ok(Outcome::Status(403))).unwrap();
        app.error(403, |_| Ok("<p>Forbidden here</p>".into()));
        app.fallback_error(|_| Ok("<p>fallback</p>".into()));

        let parts = app.handle(get("/foo")).unwrap();
        assert_eq!(parts.status, 403);
        assert_eq!(body_text(&parts), "<p>Forbidden here</p>");

        let parts = app.handle(get("/missing")).unwrap();
        assert_eq!(parts.status, 404);
        assert_eq!(body_text(&parts), "<p>fallback</p>");
    }

    #[test]
    fn test_status_outcome_keeps_body_set_by_handler() {
        let mut app = Application::new();
        app.get("/teapot", |ctx| {
            ctx.response.body = Some("short and stout".into());
            Ok(Outcome::Status(400))
        })
        .unwrap();
        app.fallback_error(|_| Ok("should not be used".into()));
        let parts = app.handle(get("/teapot")).unwrap();
        assert_eq!(parts.status, 400);
        assert_eq!(body_text(&parts), "short and stout");
    }

    #[test]
    fn test_body_keeps_status_set_by_handler() {
        let mut app = Application::new();
        app.post("/notes", |ctx| {
            ctx.response.status = StatusCode::from_u16(201).unwrap_or(StatusCode::OK);
            Ok("created".into())
        })
        .unwrap();
        let parts = app.handle(Environ::new("POST", "/notes")).unwrap();
        assert_eq!(parts.status, 201);
        assert_eq!(parts.status_line, "201 Created");
        assert_eq!(body_text(&parts), "created");
    }

    #[test]
    fn test_redirect_outcome() {
        let mut app = Application::new();
        app.get("/old", |_| Ok(Outcome::Redirect(303, "/new".to_string()))).unwrap();
        let parts = app.handle(get("/old")).unwrap();
        assert_eq!(parts.status, 303);
        assert_eq!(parts.header("Location"), Some("/new"));
        assert_eq!(body_text(&parts), "303 See Other");
    }

    #[test]
    fn test_contract_violations_are_errors() {
        let mut app = Application::new();
        app.get("/unknown", |_| Ok(Outcome::Status(999))).unwrap();
        app.get("/bad-redirect", |_| Ok(Outcome::Redirect(200, "/".to_string()))).unwrap();
        app.get("/unlisted-redirect", |_| Ok(Outcome::Redirect(306, "/".to_string()))).unwrap();

        for path in ["/unknown", "/bad-redirect", "/unlisted-redirect"] {
            let result = app.handle(get(path));
            assert!(matches!(result, Err(Error::HandlerContract(_))), "{path}");
        }
    }

    #[test]
    fn test_handler_errors_propagate() {
        let mut app = Application::new();
        app.get("/boom", |_| Err(Error::handler("boom"))).unwrap();
        let result = app.handle(get("/boom"));
        assert!(matches!(result, Err(Error::Handler(ref e)) if e.to_string() == "boom"));
    }

    #[test]
    fn test_broken_route_fails_registration() {
        let mut app = Application::new();
        let result = app.get("/<x:float>", |_| Ok("".into()));
        assert!(matches!(result, Err(Error::Route(_))));
        assert!(matches!(
            app.route("BAD METHOD", "/", |_| Ok("".into())),
            Err(Error::Route(_))
        ));
    }

    #[test]
    fn test_response_state_does_not_leak_between_requests() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut app = Application::new();
        app.get("/", move |ctx| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            assert!(ctx.response.headers.is_empty());
            assert!(ctx.response.last_served_filename.is_none());
            ctx.response.add_header("X-Call", n.to_string());
            ctx.response.last_served_filename = Some("a.txt".to_string());
            Ok("ok".into())
        })
        .unwrap();

        for _ in 0..2 {
            let parts = app.handle(get("/")).unwrap();
            assert_eq!(parts.headers.iter().filter(|(k, _)| k == "X-Call").count(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_json_outcome() {
        #[derive(Serialize)]
        struct User {
            name: String,
        }

        let mut app = Application::new();
        app.get("/user", |ctx| {
            Outcome::json(&mut ctx.response, &User { name: "John Doe".to_string() })
        })
        .unwrap();
        let parts = app.handle(get("/user")).unwrap();
        assert_eq!(parts.header("Content-Type"), Some("application/json; charset=UTF-8"));
        assert_eq!(body_text(&parts), r#"{"name":"John Doe"}"#);
    }

    #[test]
    fn test_query_and_form_reach_handler() {
        let mut app = Application::new();
        app.get("/", |ctx| {
            Ok(format!("name: {:?}", ctx.request.query.get_all("name")).into())
        })
        .unwrap();
        app.post("/result", |ctx| {
            Ok(format!(
                "First name: {}",
                ctx.request.form.get("firstName").unwrap_or_default()
            )
            .into())
        })
        .unwrap();

        let parts = app.handle(get("/?name=Humpty&name=Santa")).unwrap();
        assert_eq!(body_text(&parts), "name: [\"Humpty\", \"Santa\"]");
        let parts = app
            .handle(form_post("/result", "firstName=Humpty&lastName=Dumpty"))
            .unwrap();
        assert_eq!(body_text(&parts), "First name: Humpty");
    }

    // Static files and downloads

    fn static_app(root: std::path::PathBuf) -> Application {
        let mut app = Application::new();
        let static_root = root.clone();
        app.get("/static/<:path>", move |ctx| {
            let path = ctx.args.get(0).and_then(Value::as_str).unwrap_or_default().to_string();
            ctx.serve_static(&static_root, &path, &StaticOptions::default())
        })
        .unwrap();
        app.get("/download/<:path>", move |ctx| {
            let path = ctx.args.get(0).and_then(Value::as_str).unwrap_or_default().to_string();
            let outcome = ctx.serve_static(&root, &path, &StaticOptions::default())?;
            ctx.download(outcome, &DownloadOptions::default())
        })
        .unwrap();
        app
    }

    #[test]
    fn test_serve_static_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello\n").unwrap();
        let app = static_app(dir.path().to_path_buf());

        let parts = app.handle(get("/static/hello.txt")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(parts.header("Content-Type"), Some("text/plain; charset=UTF-8"));
        assert_eq!(body_text(&parts), "Hello\n");
    }

    #[test]
    fn test_serve_static_missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let app = static_app(dir.path().to_path_buf());

        assert_eq!(app.handle(get("/static/nope.txt")).unwrap().status, 404);
        assert_eq!(app.handle(get("/static/sub")).unwrap().status, 404);
    }

    #[test]
    fn test_serve_static_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        fs::write(root.join("index.html"), "<p>index</p>").unwrap();
        let app = static_app(root);

        assert_eq!(app.handle(get("/static/../../etc/passwd")).unwrap().status, 403);
        assert_eq!(app.handle(get("/static/../secret.txt")).unwrap().status, 403);
        assert_eq!(app.handle(get("/static/a/../../secret.txt")).unwrap().status, 403);

        let parts = app.handle(get("/static/a/../index.html")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(body_text(&parts), "<p>index</p>");
    }

    #[cfg(unix)]
    #[test]
    fn test_serve_static_rejects_symlink_out_of_root() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        fs::write(root.join("index.html"), "<p>index</p>").unwrap();
        symlink(dir.path(), root.join("up")).unwrap();
        symlink(root.join("index.html"), root.join("home.html")).unwrap();
        let app = static_app(root);

        let parts = app.handle(get("/static/up/secret.txt")).unwrap();
        assert_eq!(parts.status, 403);
        assert_eq!(body_text(&parts), "403 Forbidden");

        assert_eq!(app.handle(get("/static/up/missing.txt")).unwrap().status, 404);

        let parts = app.handle(get("/static/home.html")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(body_text(&parts), "<p>index</p>");
    }

    #[test]
    fn test_download_uses_served_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.csv"), "a,b\n").unwrap();
        let app = static_app(dir.path().to_path_buf());

        let parts = app.handle(get("/download/report.csv")).unwrap();
        assert_eq!(parts.status, 200);
        assert_eq!(
            parts.header("Content-Disposition"),
            Some("attachment; filename=\"report.csv\"")
        );
        assert_eq!(parts.header("Content-Type"), Some("text/csv; charset=UTF-8"));

        let parts = app.handle(get("/download/missing.csv")).unwrap();
        assert_eq!(parts.status, 404);
        assert_eq!(parts.header("Content-Disposition"), None);
    }

    #[test]
    fn test_download_filename_precedence() {
        let mut ctx = Context::new(get("/files/latest.bin"), &AppConfig::default());
        let outcome = ctx
            .download("data".into(), &DownloadOptions::with_filename("explicit.txt"))
            .unwrap();
        assert_eq!(outcome, Outcome::Body(Body::Text("data".to_string())));
        assert_eq!(ctx.response.media_type, "text/plain");

        let mut ctx = Context::new(get("/files/latest.bin"), &AppConfig::default());
        ctx.response.last_served_filename = Some("served.pdf".to_string());
        ctx.download("data".into(), &DownloadOptions::default()).unwrap();
        assert_eq!(ctx.response.media_type, "application/pdf");

        let mut ctx = Context::new(get("/files/latest.bin"), &AppConfig::default());
        ctx.download("data".into(), &DownloadOptions::default()).unwrap();
        assert_eq!(
            ctx.response.headers,
            vec![(
                "Content-Disposition".to_string(),
                "attachment; filename=\"latest.bin\"".to_string()
            )]
        );
    }

    #[test]
    fn test_download_escapes_filename() {
        let mut ctx = Context::new(get("/files/we\"ird\\name.txt"), &AppConfig::default());
        ctx.download("data".into(), &DownloadOptions::default()).unwrap();
        assert_eq!(
            ctx.response.headers,
            vec![(
                "Content-Disposition".to_string(),
                r#"attachment; filename="we\"ird\\name.txt""#.to_string()
            )]
        );
    }

    #[test]
    fn test_download_without_filename_is_logic_error() {
        let mut ctx = Context::new(get("/files/"), &AppConfig::default());
        let result = ctx.download("data".into(), &DownloadOptions::default());
        assert!(matches!(result, Err(Error::Logic(_))));

        let outcome = ctx.download(Outcome::Status(404), &DownloadOptions::default()).unwrap();
        assert_eq!(outcome, Outcome::Status(404));
        assert!(ctx.response.headers.is_empty());
    }

    // Default application

    #[test]
    fn test_cube_home_and_error_pages() {
        let app = cube().unwrap();

        let parts = app.handle(get("/")).unwrap();
        assert_eq!(parts.status, 200);
        assert!(body_text(&parts).contains("<h1>It works!</h1>"));

        let parts = app.handle(get("/foo")).unwrap();
        assert_eq!(parts.status, 404);
        let page = body_text(&parts);
        assert!(page.contains("<title>404 Not Found</title>"));
        assert!(page.contains("<p>Nothing matches the given URI</p>"));
        assert!(page.contains(&format!("<address>{}</address>", app.config.server_name)));
    }
}
