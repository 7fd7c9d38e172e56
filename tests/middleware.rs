//! Middleware behaviour against a real asset root.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use asset_server::pipeline::{Concat, FnTransform, MapTransform};
use asset_server::{AssetFile, AssetServer, PluginError, RouteRegistry, Transform};
use axum::http::{header, Method, StatusCode};
use serde_json::Value;

mod common;

use common::{Fixture, FALLTHROUGH};

fn lowercase() -> impl Transform {
    MapTransform::new("lowercase", |file: &mut AssetFile, _args: &[Value]| {
        let text = file.text()?.to_lowercase();
        file.set_contents(text);
        Ok(())
    })
}

fn counting(counter: Arc<AtomicUsize>) -> impl Transform {
    FnTransform::new("counting", move |files, _args| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(files)
    })
}

#[tokio::test]
async fn test_compiles_into_cache() {
    let fx = Fixture::new();
    fx.write("x.css", "BODY { COLOR: RED; }");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("*.css").using(lowercase()).finish().unwrap();
    let app = common::app(options, builder.build());

    let (status, headers, body) = common::get(&app, "/x.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/css");
    assert_eq!(body, "body { color: red; }");
    assert_eq!(fx.read_cache("x.css"), "body { color: red; }");
}

#[tokio::test]
async fn test_concatenates_explicit_sources() {
    let fx = Fixture::new();
    fx.write("js/libraries/a.js", "var a = 5;");
    fx.write("js/libraries/b.js", "var b = 8;");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("libraries.js")
        .with_source("js/libraries/*.js")
        .using_with(Concat, ["libraries.js"])
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/libraries.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "var a = 5;\nvar b = 8;");
    assert_eq!(fx.read_cache("libraries.js"), "var a = 5;\nvar b = 8;");
}

#[tokio::test]
async fn test_route_without_stages_passes_source_through() {
    let fx = Fixture::new();
    fx.write("passthrough.js", "let hi = 5;\n");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("passthrough.js").finish().unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/passthrough.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "let hi = 5;\n");
}

#[tokio::test]
async fn test_stage_failure_renders_compile_error() {
    let fx = Fixture::new();
    fx.write("broken.js", "if (");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("broken.js")
        .using(FnTransform::new("syntax", |_files, _args| {
            Err(PluginError::new("Unexpected end of input")
                .with_kind("SyntaxError")
                .with_line_number(1))
        }))
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    let (status, headers, body) = common::get(&app, "/broken.js").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], 500);
    assert_eq!(json["code"], "COMPILE_ERROR");
    assert_eq!(json["type"], "SyntaxError");
    assert_eq!(json["plugin"], "syntax");
    assert_eq!(json["message"], "Unexpected end of input");
    assert_eq!(json["lineNumber"], 1);
    assert_eq!(json["filename"], "broken.{js,coffee}");
    assert!(!fx.cache_path("broken.js").exists());
}

#[tokio::test]
async fn test_modified_source_is_recompiled() {
    let fx = Fixture::new();
    let source = fx.write("date.js", "var d = 1;");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("date.js").finish().unwrap();
    let app = common::app(options, builder.build());

    let (_, _, body) = common::get(&app, "/date.js").await;
    assert_eq!(body, "var d = 1;");

    std::fs::write(&source, "var d = 2;").unwrap();
    common::set_mtime(&source, SystemTime::now() + Duration::from_secs(60));

    let (status, _, body) = common::get(&app, "/date.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "var d = 2;");
}

#[tokio::test]
async fn test_aliases_match_both_directions() {
    let fx = Fixture::new();
    fx.write("styles.scss", "$a: 1;");
    fx.write("app.less", "a {}");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("*.css").finish().unwrap();
    builder.register("app.less").finish().unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/styles.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "$a: 1;");

    let (status, _, body) = common::get(&app, "/app.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "a {}");
}

#[tokio::test]
async fn test_declines_fall_through() {
    let fx = Fixture::new();
    fx.write("x.css", "a {}");
    fx.write(".cache/x.css", "a {}");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("**/*.css").finish().unwrap();
    let app = common::app(options, builder.build());

    for uri in ["/yo/hi.html", "/missing.css", "/.cache/x.css", "/"] {
        let (status, _, body) = common::get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, FALLTHROUGH, "{uri}");
    }

    let (status, _, body) = common::request(&app, Method::POST, "/x.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, FALLTHROUGH);
}

#[tokio::test]
async fn test_unchanged_source_is_served_from_cache() {
    let fx = Fixture::new();
    fx.write("app.js", "var app = 1;");
    let calls = Arc::new(AtomicUsize::new(0));

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("app.js")
        .using(counting(Arc::clone(&calls)))
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    let (_, _, first) = common::get(&app, "/app.js").await;
    let (_, _, second) = common::get(&app, "/app.js").await;
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_force_bypasses_cache() {
    let fx = Fixture::new();
    fx.write("app.js", "var app = 1;");
    let calls = Arc::new(AtomicUsize::new(0));

    let options = fx.options().force(true);
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("app.js")
        .using(counting(Arc::clone(&calls)))
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    common::get(&app, "/app.js").await;
    common::get(&app, "/app.js").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_artifact_older_than_source_is_replaced() {
    let fx = Fixture::new();
    fx.write("site.js", "var fresh = true;");
    let artifact = fx.write(".cache/site.js", "var fresh = false;");
    common::set_mtime(&artifact, SystemTime::now() - Duration::from_secs(7200));

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("site.js").finish().unwrap();
    let app = common::app(options, builder.build());

    let (_, _, body) = common::get(&app, "/site.js").await;
    assert_eq!(body, "var fresh = true;");
    assert_eq!(fx.read_cache("site.js"), "var fresh = true;");
}

#[tokio::test]
async fn test_directory_artifact_is_forbidden() {
    let fx = Fixture::new();
    fx.write("css/a.css", "a {}");
    std::fs::create_dir_all(fx.cache_path("bundle")).unwrap();

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("bundle")
        .with_source("css/*.css")
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/bundle").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_strict_missing_source_is_not_found() {
    let fx = Fixture::new();

    let options = fx.options().strict(true);
    let mut builder = RouteRegistry::builder(&options);
    builder.register("*.css").finish().unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_head_request_has_no_body() {
    let fx = Fixture::new();
    fx.write("x.css", "a { color: red; }");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("*.css").finish().unwrap();
    let app = common::app(options, builder.build());

    let (status, headers, body) = common::request(&app, Method::HEAD, "/x.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_LENGTH], "17");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_concurrent_misses_both_succeed() {
    let fx = Fixture::new();
    fx.write("x.css", "BODY {}");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder.register("*.css").using(lowercase()).finish().unwrap();
    let app = common::app(options, builder.build());

    let (a, b) = tokio::join!(common::get(&app, "/x.css"), common::get(&app, "/x.css"));
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(a.2, "body {}");
    assert_eq!(b.2, "body {}");
    assert_eq!(fx.read_cache("x.css"), "body {}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_source_is_an_io_error() {
    let fx = Fixture::new();
    fx.write("js/libraries/a.js", "var a = 5;");
    fx.write("js/libraries/b.js", "var b = 8;");
    std::os::unix::fs::symlink(
        fx.root().join("js/gone.js"),
        fx.root().join("js/libraries/c.js"),
    )
    .unwrap();

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("libraries.js")
        .with_source("js/libraries/*.js")
        .using_with(Concat, ["libraries.js"])
        .finish()
        .unwrap();
    let app = common::app(options, builder.build());

    let (status, _, body) = common::get(&app, "/libraries.js").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "IO_ERROR");
    assert!(!body.contains(fx.root().to_str().unwrap()));
    assert!(!fx.cache_path("libraries.js").exists());
}

#[tokio::test]
async fn test_abandoned_request_still_publishes_artifact() {
    let fx = Fixture::new();
    fx.write("slow.js", "var slow = 1;");

    let options = fx.options();
    let mut builder = RouteRegistry::builder(&options);
    builder
        .register("slow.js")
        .using(FnTransform::new("slow", |files, _args| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(files)
        }))
        .finish()
        .unwrap();
    let server = AssetServer::new(options, builder.build());

    let lookup = server.lookup(&Method::GET, "/slow.js");
    assert!(tokio::time::timeout(Duration::from_millis(50), lookup)
        .await
        .is_err());

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(fx.read_cache("slow.js"), "var slow = 1;");
    let leftovers: Vec<_> = std::fs::read_dir(fx.cache_path(""))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, ["slow.js"]);
}
