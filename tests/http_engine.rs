#![cfg(feature = "http")]

//! Integration tests for the HTTP backend against a local server.

use tiny_http::{Header, Response, Server};

use webshot::http::HttpEngine;
use webshot::{LoadState, PageEngine, PageEvent, ShellConfig};

const PAGE_A: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Page A</title>
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <h1>Hello from A</h1>
  <p>This is the first test page.</p>
</body>
</html>"#;

const PAGE_B: &str = r#"<!DOCTYPE html>
<html>
<head><title>Page B</title></head>
<body><h1>Hello from B</h1></body>
</html>"#;

const NOISY_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Noisy</title></head>
<body>
<h1>Noisy</h1>
<script>console.log('misbehaving page');</script>
</body>
</html>"#;

const STYLE: &str = "body { margin: 0; }";

/// Serve the fixture pages on an ephemeral port, forever.
fn start_server() -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let html_header = "Content-Type: text/html; charset=utf-8"
                .parse::<Header>()
                .unwrap();
            let response = match request.url() {
                "/" => Response::from_string(PAGE_A).with_header(html_header),
                "/b" => Response::from_string(PAGE_B).with_header(html_header),
                "/noisy" => Response::from_string(NOISY_PAGE).with_header(html_header),
                "/style.css" => Response::from_string(STYLE).with_header(
                    "Content-Type: text/css".parse::<Header>().unwrap(),
                ),
                _ => Response::from_string("Not Found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });
    format!("http://{}", addr)
}

/// Poll the engine until the load settles, collecting events.
fn drive(engine: &mut HttpEngine) -> Vec<PageEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        events.extend(engine.poll());
        if engine.load_state() != LoadState::Committed && engine.load_progress() >= 1.0 {
            break;
        }
        if engine.load_state() == LoadState::Finished {
            break;
        }
    }
    events
}

#[test]
fn load_lifecycle_commits_then_finishes() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/", base)).unwrap();

    let events = drive(&mut engine);
    assert!(matches!(events.first(), Some(PageEvent::LoadCommitted)));
    assert!(matches!(events.last(), Some(PageEvent::LoadFinished)));
    assert_eq!(engine.load_state(), LoadState::Finished);
    assert_eq!(engine.load_progress(), 1.0);
    assert_eq!(engine.current_uri(), Some(format!("{}/", base).as_str()));
}

#[test]
fn progress_is_monotonic_across_polls() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/", base)).unwrap();

    let mut last = 0.0;
    for _ in 0..100 {
        engine.poll();
        let p = engine.load_progress();
        assert!(p >= last, "progress went backwards: {} -> {}", last, p);
        last = p;
        if engine.load_state() == LoadState::Finished {
            break;
        }
    }
    assert_eq!(last, 1.0);
}

#[test]
fn linked_stylesheet_is_fetched() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/", base)).unwrap();
    drive(&mut engine);

    assert!(engine.styles().iter().any(|s| s.contains("margin: 0")));
}

#[test]
fn paint_renders_the_document() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/", base)).unwrap();
    drive(&mut engine);

    let frame = engine.paint().unwrap();
    assert_eq!(frame.width, 800);
    assert_eq!(frame.height, 600);
    // the schematic title ink leaves non-white pixels near the top
    let mut inked = false;
    for y in 0..40 {
        for x in 0..200 {
            if frame.pixel(x, y) != [0xff, 0xff, 0xff, 0xff] {
                inked = true;
            }
        }
    }
    assert!(inked);
}

#[test]
fn inline_script_console_output_surfaces_as_event() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/noisy", base)).unwrap();

    let events = drive(&mut engine);
    let console_texts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PageEvent::Console(m) => Some(m.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(console_texts, vec!["misbehaving page"]);
}

#[test]
fn history_tracks_back_and_forward() {
    let base = start_server();
    let uri_a = format!("{}/", base);
    let uri_b = format!("{}/b", base);
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();

    engine.load(&uri_a).unwrap();
    drive(&mut engine);
    assert!(!engine.can_go_back());
    assert!(!engine.can_go_forward());

    engine.load(&uri_b).unwrap();
    drive(&mut engine);
    assert!(engine.can_go_back());
    assert!(!engine.can_go_forward());
    assert_eq!(engine.current_uri(), Some(uri_b.as_str()));

    engine.go_back();
    drive(&mut engine);
    assert_eq!(engine.current_uri(), Some(uri_a.as_str()));
    assert!(!engine.can_go_back());
    assert!(engine.can_go_forward());

    engine.go_forward();
    drive(&mut engine);
    assert_eq!(engine.current_uri(), Some(uri_b.as_str()));
    assert!(engine.can_go_back());
    assert!(!engine.can_go_forward());
}

#[test]
fn new_navigation_truncates_forward_history() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();

    engine.load(&format!("{}/", base)).unwrap();
    drive(&mut engine);
    engine.load(&format!("{}/b", base)).unwrap();
    drive(&mut engine);
    engine.go_back();
    drive(&mut engine);
    assert!(engine.can_go_forward());

    // navigating somewhere new from the middle of history drops /b
    engine.load(&format!("{}/noisy", base)).unwrap();
    drive(&mut engine);
    assert!(!engine.can_go_forward());
    assert!(engine.can_go_back());
}

#[test]
fn stop_mid_load_suppresses_finish() {
    let base = start_server();
    let mut engine = HttpEngine::new(&ShellConfig::default()).unwrap();
    engine.load(&format!("{}/", base)).unwrap();

    // advance just past the document fetch
    let events = engine.poll();
    assert!(matches!(events.first(), Some(PageEvent::LoadCommitted)));
    assert_eq!(engine.load_state(), LoadState::Committed);

    engine.stop();
    assert_eq!(engine.load_state(), LoadState::Idle);
    assert_eq!(engine.load_progress(), 1.0);
    for _ in 0..10 {
        assert!(engine.poll().is_empty());
    }
}
