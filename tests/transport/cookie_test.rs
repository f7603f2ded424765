//! Cookie jar behavior across domains, expiry and threads.

use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use reqwest::Url;

use olapxml::transport::CookieJar;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn sorted_header(jar: &CookieJar, target: &Url) -> Option<Vec<String>> {
    let header = jar.cookie_header(target)?;
    let mut pairs: Vec<String> = header.split("; ").map(str::to_string).collect();
    pairs.sort();
    Some(pairs)
}

#[test]
fn test_cookies_are_replayed_to_sibling_hosts() {
    let jar = CookieJar::new();
    jar.store_cookies(
        &url("http://olap.example.com/xmla"),
        ["JSESSIONID=abc123; Path=/", "route=node2"],
    );

    let pairs = sorted_header(&jar, &url("http://www.example.com/xmla")).unwrap();
    assert_eq!(pairs, vec!["JSESSIONID=abc123", "route=node2"]);
    assert_eq!(jar.len(), 2);
}

#[test]
fn test_other_domains_get_nothing() {
    let jar = CookieJar::new();
    jar.store_cookies(&url("http://olap.example.com/xmla"), ["JSESSIONID=abc123"]);

    assert!(jar.cookie_header(&url("http://olap.example.org/xmla")).is_none());
    assert!(jar.cookie_header(&url("http://127.0.0.1/xmla")).is_none());
}

#[test]
fn test_later_cookie_replaces_earlier_one() {
    let jar = CookieJar::new();
    let server = url("http://localhost:8080/xmla");
    jar.store_cookies(&server, ["JSESSIONID=first"]);
    jar.store_cookies(&server, ["JSESSIONID=second; Path=/xmla"]);

    let cookie = jar.get("localhost", "JSESSIONID").unwrap();
    assert_eq!(cookie.value, "second");
    assert_eq!(cookie.path.as_deref(), Some("/xmla"));
    assert_eq!(jar.cookie_header(&server).as_deref(), Some("JSESSIONID=second"));
}

#[test]
fn test_expired_cookies_are_not_sent() {
    let jar = CookieJar::new();
    let server = url("http://olap.example.com/xmla");
    jar.store_cookies(
        &server,
        [
            "stale=1; expires=Wed, 02-Jan-2030 00:00:00 GMT",
            "fresh=2; expires=Wed, 09-Jun-2100 10:18:14 GMT",
        ],
    );

    let before = Utc.with_ymd_and_hms(2029, 12, 31, 0, 0, 0).unwrap();
    let after = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();

    let mut pairs: Vec<String> = jar
        .cookie_header_at(&server, before)
        .unwrap()
        .split("; ")
        .map(str::to_string)
        .collect();
    pairs.sort();
    assert_eq!(pairs, vec!["fresh=2", "stale=1"]);
    assert_eq!(jar.cookie_header_at(&server, after).as_deref(), Some("fresh=2"));
}

#[test]
fn test_path_restricts_cookie() {
    let jar = CookieJar::new();
    jar.store_cookies(&url("http://localhost/mondrian/xmla"), ["scoped=1; Path=/mondrian"]);

    assert_eq!(
        jar.cookie_header(&url("http://localhost/mondrian/xmla")).as_deref(),
        Some("scoped=1")
    );
    assert!(jar.cookie_header(&url("http://localhost/other")).is_none());
}

#[test]
fn test_unparseable_expiry_drops_cookie() {
    let jar = CookieJar::new();
    jar.store_cookies(
        &url("http://localhost/xmla"),
        ["broken=1; expires=sometime soon", "kept=2"],
    );

    assert!(jar.get("localhost", "broken").is_none());
    assert!(jar.get("localhost", "kept").is_some());
}

#[test]
fn test_display_lists_names_per_domain() {
    let jar = CookieJar::new();
    jar.store_cookies(&url("http://a.example.com/"), ["b=1", "a=2"]);
    jar.store_cookies(&url("http://localhost/"), ["session=3"]);

    assert_eq!(jar.to_string(), "example.com: a, b\nlocalhost: session\n");

    jar.clear();
    assert!(jar.is_empty());
}

#[test]
fn test_concurrent_store_and_read() {
    let jar = Arc::new(CookieJar::new());
    let server = url("http://olap.example.com/xmla");

    thread::scope(|scope| {
        for worker in 0..8 {
            let jar = jar.clone();
            let server = server.clone();
            scope.spawn(move || {
                for round in 0..200 {
                    let header = format!("w{worker}=r{round}; Path=/");
                    jar.store_cookies(&server, [header.as_str()]);

                    // A cookie read back is always whole: value and path from one write.
                    let cookie = jar.get("example.com", &format!("w{worker}")).unwrap();
                    assert!(cookie.value.starts_with('r'));
                    assert_eq!(cookie.path.as_deref(), Some("/"));
                    assert!(jar.cookie_header(&server).is_some());
                }
            });
        }
    });

    assert_eq!(jar.len(), 8);
    let last = jar.get("example.com", "w3").unwrap();
    assert_eq!(last.value, "r199");
}
