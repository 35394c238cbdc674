//! Cart synchronization through the full client: one event per successful
//! mutation, no event and no mirror change on failure.

use std::sync::{Arc, Mutex};

use agrichain_client::{ApiError, MarketClient};
use agrichain_core::{Channel, ProductId, UserId};
use agrichain_integration_tests::{MockMarket, OUT_OF_STOCK};

fn client_for(mock: &MockMarket) -> (tempfile::TempDir, MarketClient) {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = MarketClient::new(mock.config(dir.path())).expect("client");
    (dir, client)
}

/// Counts `cart-updated` publishes for the life of the subscription.
fn count_cart_events(client: &MarketClient) -> (Arc<Mutex<u32>>, agrichain_client::Subscription) {
    let counter = Arc::new(Mutex::new(0));
    let slot = Arc::clone(&counter);
    let sub = client.bus().subscribe(Channel::CartUpdated, move |_| {
        *slot.lock().expect("counter lock") += 1;
    });
    (counter, sub)
}

#[tokio::test]
async fn test_each_successful_mutation_publishes_once() {
    let mock = MockMarket::start().await;
    let (_dir, client) = client_for(&mock);
    let user = UserId::new(7);
    let (events, _sub) = count_cart_events(&client);

    client
        .cart()
        .add_item(user, ProductId::new(1), 2)
        .await
        .expect("add");
    client
        .cart()
        .update_item(user, ProductId::new(1), 5)
        .await
        .expect("update");
    client
        .cart()
        .remove_item(user, ProductId::new(1))
        .await
        .expect("remove");

    assert_eq!(*events.lock().expect("counter lock"), 3);
    assert!(client.cart().current().is_empty());
}

#[tokio::test]
async fn test_mirror_tracks_backend_after_mutations() {
    let mock = MockMarket::start().await;
    let (dir, client) = client_for(&mock);
    let user = UserId::new(7);

    client
        .cart()
        .add_item(user, ProductId::new(1), 2)
        .await
        .expect("add");
    client
        .cart()
        .add_item(user, ProductId::new(2), 1)
        .await
        .expect("add");

    let snapshot = client.cart().current();
    assert_eq!(snapshot.item_count(), 3);
    assert_eq!(mock.cart_quantity(7, 1), Some(2));
    assert_eq!(mock.cart_quantity(7, 2), Some(1));

    // A fresh client over the same data dir starts from the mirror.
    let reopened = MarketClient::new(mock.config(dir.path())).expect("client");
    assert_eq!(reopened.cart().current(), snapshot);
}

#[tokio::test]
async fn test_failed_mutation_keeps_mirror_and_stays_silent() {
    let mock = MockMarket::start().await;
    let (_dir, client) = client_for(&mock);
    let user = UserId::new(7);

    client
        .cart()
        .add_item(user, ProductId::new(1), 2)
        .await
        .expect("add");
    let before = client.cart().current();

    let (events, _sub) = count_cart_events(&client);
    let result = client
        .cart()
        .add_item(user, ProductId::new(OUT_OF_STOCK), 1)
        .await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "out of stock");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(*events.lock().expect("counter lock"), 0);
    assert_eq!(client.cart().current(), before);
    assert_eq!(mock.cart_quantity(7, OUT_OF_STOCK), None);
}

#[tokio::test]
async fn test_refresh_pulls_backend_state_written_elsewhere() {
    let mock = MockMarket::start().await;
    let (_dir, writer) = client_for(&mock);
    let (_dir2, reader) = client_for(&mock);
    let user = UserId::new(7);

    writer
        .cart()
        .add_item(user, ProductId::new(2), 4)
        .await
        .expect("add");
    assert!(reader.cart().current().is_empty());

    let snapshot = reader.cart().refresh(user).await.expect("refresh");
    assert_eq!(snapshot.item_count(), 4);
    assert_eq!(reader.cart().current(), snapshot);
}
