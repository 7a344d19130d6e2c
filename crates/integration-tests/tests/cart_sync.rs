//! Integration tests for cart/checkout state synchronization.
//!
//! Each test runs a `CartStore` against a `wiremock` GraphQL endpoint and a
//! temporary state directory. The invariant under test: after every
//! successful mutation, the pushed line-item set equals the projection
//! `(variant_id, quantity)` of the local cart.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marigold_integration_tests::{
    GRAPHQL_PATH, checkout_create_response, checkout_replace_response, new_line, requests_for,
    test_store,
};
use marigold_storefront::cart::storage::CartStorage;

fn graphql_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(GRAPHQL_PATH))
}

fn create_mock() -> wiremock::MockBuilder {
    graphql_mock().and(body_partial_json(json!({"operationName": "CheckoutCreate"})))
}

fn replace_mock() -> wiremock::MockBuilder {
    graphql_mock().and(body_partial_json(
        json!({"operationName": "CheckoutLineItemsReplace"}),
    ))
}

// ---------------------------------------------------------------------------
// Checkout lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_add_creates_checkout_with_the_single_line() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    let snapshot = store.add_item(new_line("V1", 2)).await;

    // Local cart = [{V1, qty 2}]
    assert_eq!(snapshot.lines.len(), 1);
    let line = snapshot.lines.first().expect("one line");
    assert_eq!(line.variant_id, "V1");
    assert_eq!(line.quantity, 2);
    assert!(!snapshot.dirty);

    // Remote checkout created and remembered
    let checkout = snapshot.checkout.expect("checkout created");
    assert_eq!(checkout.id, "gid://shopify/Checkout/1");

    // The create carried exactly this line's projection
    let creates = requests_for(&server, "CheckoutCreate").await;
    assert_eq!(creates.len(), 1);
    let body = creates.first().expect("one create");
    assert_eq!(
        body["variables"]["input"]["lineItems"],
        json!([{ "variantId": "V1", "quantity": 2 }])
    );
}

#[tokio::test]
async fn second_add_merges_quantities_and_replaces_full_set() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .expect(1)
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_replace_response("1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 2)).await;
    let snapshot = store.add_item(new_line("V1", 3)).await;

    // Two adds of the same variant are one line with the summed quantity
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines.first().expect("one line").quantity, 5);
    assert_eq!(snapshot.total_quantity(), 5);

    // The replace pushed the full projection, not a delta
    let replaces = requests_for(&server, "CheckoutLineItemsReplace").await;
    assert_eq!(replaces.len(), 1);
    let body = replaces.first().expect("one replace");
    assert_eq!(
        body["variables"]["lineItems"],
        json!([{ "variantId": "V1", "quantity": 5 }])
    );
    assert_eq!(
        body["variables"]["checkoutId"],
        json!("gid://shopify/Checkout/1")
    );
}

#[tokio::test]
async fn update_to_zero_drops_line_and_pushes_empty_set() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_replace_response("1")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 2)).await;
    let snapshot = store.update_quantity("V1", 0).await;

    // Local cart is empty; the checkout survives with an empty line set
    assert!(snapshot.lines.is_empty());
    assert!(snapshot.checkout.is_some());

    let replaces = requests_for(&server, "CheckoutLineItemsReplace").await;
    let body = replaces.first().expect("one replace");
    assert_eq!(body["variables"]["lineItems"], json!([]));
}

#[tokio::test]
async fn remove_item_is_update_to_zero() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_replace_response("1")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 1)).await;
    store.add_item(new_line("V2", 4)).await;
    let snapshot = store.remove_item("V1").await;

    let ids: Vec<_> = snapshot.lines.iter().map(|l| l.variant_id.as_str()).collect();
    assert_eq!(ids, vec!["V2"]);

    let replaces = requests_for(&server, "CheckoutLineItemsReplace").await;
    let last = replaces.last().expect("replace calls");
    assert_eq!(
        last["variables"]["lineItems"],
        json!([{ "variantId": "V2", "quantity": 4 }])
    );
}

#[tokio::test]
async fn clear_then_add_creates_a_fresh_checkout() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    // First create returns checkout 1, second returns checkout 2.
    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("2")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    let first = store.add_item(new_line("V1", 2)).await;
    assert_eq!(
        first.checkout.expect("first checkout").id,
        "gid://shopify/Checkout/1"
    );

    store.clear().await;
    let cleared = store.snapshot().await;
    assert!(cleared.lines.is_empty());
    assert!(cleared.checkout.is_none());

    let second = store.add_item(new_line("V2", 1)).await;
    assert_eq!(
        second.checkout.expect("second checkout").id,
        "gid://shopify/Checkout/2",
        "clear() followed by add must never reuse the previous checkout"
    );
}

// ---------------------------------------------------------------------------
// Failure policy: keep local, mark dirty, converge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_push_keeps_local_change_and_converges_on_next_mutation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;
    // First replace fails, every later one succeeds.
    replace_mock()
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_replace_response("1")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 2)).await;

    let stale = store.update_quantity("V1", 3).await;
    assert_eq!(
        stale.lines.first().expect("line").quantity,
        3,
        "local mutation is never rolled back"
    );
    assert!(stale.dirty, "failed push must mark the cart dirty");

    let converged = store.update_quantity("V1", 4).await;
    assert!(!converged.dirty);

    // The successful push carried the current full projection
    let replaces = requests_for(&server, "CheckoutLineItemsReplace").await;
    let last = replaces.last().expect("replace calls");
    assert_eq!(
        last["variables"]["lineItems"],
        json!([{ "variantId": "V1", "quantity": 4 }])
    );
}

#[tokio::test]
async fn reconcile_retries_a_failed_push() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    replace_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_replace_response("1")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 2)).await;
    store.update_quantity("V1", 3).await;
    assert!(store.snapshot().await.dirty);

    assert!(store.reconcile().await, "reconcile must clear the dirty flag");
    assert!(!store.snapshot().await.dirty);

    let replaces = requests_for(&server, "CheckoutLineItemsReplace").await;
    let last = replaces.last().expect("replace calls");
    assert_eq!(
        last["variables"]["lineItems"],
        json!([{ "variantId": "V1", "quantity": 3 }])
    );
}

#[tokio::test]
async fn reconcile_on_clean_cart_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let store = test_store(&server.uri(), dir.path());
    assert!(store.reconcile().await);

    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled by default");
    assert!(requests.is_empty());
}

// ---------------------------------------------------------------------------
// Durable storage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cart_survives_a_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;

    {
        let store = test_store(&server.uri(), dir.path());
        store.add_item(new_line("V1", 2)).await;
    }

    // A new store over the same state directory hydrates the same cart
    let store = test_store(&server.uri(), dir.path());
    let snapshot = store.snapshot().await;

    assert_eq!(snapshot.lines.len(), 1);
    let line = snapshot.lines.first().expect("one line");
    assert_eq!(line.variant_id, "V1");
    assert_eq!(line.quantity, 2);
    assert_eq!(
        snapshot.checkout.expect("checkout").id,
        "gid://shopify/Checkout/1"
    );
}

#[tokio::test]
async fn clear_removes_durable_state() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    create_mock()
        .respond_with(ResponseTemplate::new(200).set_body_json(checkout_create_response("1")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri(), dir.path());
    store.add_item(new_line("V1", 2)).await;
    store.clear().await;

    let persisted = CartStorage::new(dir.path()).load();
    assert!(persisted.lines.is_empty());
    assert!(persisted.checkout.is_none());
}
