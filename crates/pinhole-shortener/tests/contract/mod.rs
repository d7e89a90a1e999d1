//! Behaviour every `Shortener` backend must share.
//!
//! Each check expects a freshly created, empty service publishing under
//! [`BASE_URL`].

use pinhole_shortener::{BatchItem, ShortId, Shortened, Shortener, ShortenerError};
use std::sync::Arc;

pub const BASE_URL: &str = "http://localhost:8080";

fn id_of(short_url: &str) -> ShortId {
    ShortId::new(short_url.rsplit('/').next().unwrap())
}

pub async fn sequential_ids_and_idempotence(service: &dyn Shortener) {
    let a = service.shorten_url("http://example.com/a", "").await.unwrap();
    let b = service.shorten_url("http://example.com/b", "").await.unwrap();
    let again = service.shorten_url("http://example.com/a", "alice").await.unwrap();

    assert_eq!(a, Shortened::Created(format!("{BASE_URL}/1")));
    assert_eq!(b, Shortened::Created(format!("{BASE_URL}/2")));
    assert_eq!(again, Shortened::AlreadyExists(format!("{BASE_URL}/1")));
}

pub async fn round_trip(service: &dyn Shortener) {
    for (token, url) in [
        ("", "http://example.com/path?q=1#frag"),
        ("alice", "https://EXAMPLE.com/Case"),
        ("bob", "not even a url"),
    ] {
        let shortened = service.shorten_url(url, token).await.unwrap();
        let resolved = service
            .get_original_url(&id_of(shortened.short_url()), token)
            .await
            .unwrap();
        assert_eq!(resolved, url);
    }
}

pub async fn ids_are_matched_verbatim(service: &dyn Shortener) {
    service.shorten_url("http://example.com/a", "").await.unwrap();

    for raw in ["01", "007", "+1"] {
        let err = service
            .get_original_url(&ShortId::new(raw), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)), "{raw}");
    }
    assert_eq!(
        service.get_original_url(&ShortId::new("1"), "").await.unwrap(),
        "http://example.com/a"
    );
}

pub async fn archives_are_isolated(service: &dyn Shortener) {
    service.shorten_url("http://example.com/a", "alice").await.unwrap();
    service.shorten_url("http://example.com/b", "bob").await.unwrap();

    let alice = service.get_user_archive("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].original_url, "http://example.com/a");
    assert_eq!(alice[0].short_url, format!("{BASE_URL}/1"));

    let err = service.get_user_archive("carol").await.unwrap_err();
    assert!(matches!(err, ShortenerError::NotFound(_)));

    let err = service
        .get_original_url(&ShortId::new("1"), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, ShortenerError::NotFound(_)));
}

pub async fn tombstones(service: &dyn Shortener) {
    let a = service.shorten_url("http://example.com/a", "alice").await.unwrap();
    let b = service.shorten_url("http://example.com/b", "alice").await.unwrap();
    let (a, b) = (id_of(a.short_url()), id_of(b.short_url()));

    service
        .delete_keys(vec![a.clone(), ShortId::new("404")], "alice")
        .await
        .unwrap();

    let err = service.get_original_url(&a, "alice").await.unwrap_err();
    assert!(matches!(err, ShortenerError::Gone(_)));
    assert_eq!(
        service.get_original_url(&a, "").await.unwrap(),
        "http://example.com/a"
    );

    let archive = service.get_user_archive("alice").await.unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].short_url, b.to_url(BASE_URL));

    service.delete_keys(vec![b.clone()], "alice").await.unwrap();
    assert!(service.get_user_archive("alice").await.unwrap().is_empty());
}

pub async fn batch(service: &dyn Shortener) {
    let items: Vec<BatchItem> = (0..5)
        .map(|i| BatchItem {
            correlation_id: format!("c{i}"),
            original_url: format!("http://example.com/batch/{i}"),
        })
        .collect();

    let mut reported = vec![];
    service
        .for_each(items.clone(), "alice", &mut |shortened| {
            reported.push(shortened);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(reported.len(), items.len());
    for (shortened, item) in reported.iter().zip(&items) {
        assert_eq!(shortened.correlation_id, item.correlation_id);
        let resolved = service
            .get_original_url(&id_of(&shortened.short_url), "alice")
            .await
            .unwrap();
        assert_eq!(resolved, item.original_url);
    }

    // Resubmitting the batch reports nothing.
    let mut calls = 0;
    service
        .for_each(items, "alice", &mut |_| {
            calls += 1;
            Ok(())
        })
        .await
        .unwrap();
    assert_eq!(calls, 0);
}

pub async fn concurrent_shortening(service: Arc<dyn Shortener>) {
    let mut handles = vec![];

    for i in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .shorten_url("http://example.com/concurrent", &format!("user-{i}"))
                .await
                .unwrap()
                .into_short_url()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), format!("{BASE_URL}/1"));
    }

    let next = service.shorten_url("http://example.com/next", "").await.unwrap();
    assert_eq!(next.short_url(), format!("{BASE_URL}/2"));
}
