//! Handler tests for recipes, marks and the shopping-list download.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{MarkKind, RecipeId, UserId};
use crate::test_support::{
    GIF_DATA_URI, InMemoryStore, api_app, in_memory_http_state, register_with_token,
    seed_ingredient, seed_tag,
};

struct Kitchen {
    store: InMemoryStore,
    author: UserId,
    author_token: String,
    other_token: String,
    tag: i64,
    flour: i64,
    sugar: i64,
}

fn auth(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Token {token}"))
}

fn recipe_body(kitchen: &Kitchen, name: &str, flour: i64) -> Value {
    json!({
        "name": name,
        "text": "Mix and bake.",
        "cooking_time": 45,
        "image": GIF_DATA_URI,
        "tags": [kitchen.tag],
        "ingredients": [
            {"id": kitchen.flour, "amount": flour},
            {"id": kitchen.sugar, "amount": 5}
        ],
    })
}

async fn kitchen() -> (
    impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    Kitchen,
) {
    let (state, store) = in_memory_http_state();
    let tag = seed_tag(&store, "Breakfast", "#E26C2D", "breakfast");
    let flour = seed_ingredient(&store, "flour", "g");
    let sugar = seed_ingredient(&store, "sugar", "g");
    let (author, author_token) = register_with_token(&state, "author@example.com").await;
    let (_other, other_token) = register_with_token(&state, "other@example.com").await;
    let app = actix_test::init_service(api_app(state)).await;
    let kitchen = Kitchen {
        store,
        author: author.id,
        author_token,
        other_token,
        tag: tag.id.get(),
        flour: flour.id.get(),
        sugar: sugar.id.get(),
    };
    (app, kitchen)
}

async fn publish(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    kitchen: &Kitchen,
    name: &str,
    flour: i64,
) -> i64 {
    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(auth(&kitchen.author_token))
        .set_json(recipe_body(kitchen, name, flour))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    body["id"].as_i64().expect("recipe id")
}

#[actix_web::test]
async fn create_returns_full_representation() {
    let (app, kitchen) = kitchen().await;

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(auth(&kitchen.author_token))
        .set_json(recipe_body(&kitchen, "Pancakes", 200))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["cooking_time"], 45);
    assert_eq!(body["author"]["id"], kitchen.author.get());
    assert_eq!(body["tags"][0]["slug"], "breakfast");
    assert_eq!(body["ingredients"][0]["name"], "flour");
    assert_eq!(body["ingredients"][0]["amount"], 200);
    assert_eq!(body["is_favorited"], false);
    let image = body["image"].as_str().expect("image link");
    assert!(image.starts_with("/media/recipes/images/"), "{image}");
    assert_eq!(kitchen.store.stored_images().expect("images").len(), 1);
}

#[actix_web::test]
async fn anonymous_create_is_unauthorised() {
    let (app, kitchen) = kitchen().await;

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/")
        .set_json(recipe_body(&kitchen, "Pancakes", 200))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(json!({"cooking_time": 0}), "cooking_time", "out_of_range")]
#[case(json!({"ingredients": []}), "ingredients", "blank")]
#[case(json!({"tags": [999]}), "tags", "does_not_exist")]
#[case(json!({"image": "data:image/bmp;base64,AAAA"}), "image", "invalid_image")]
#[case(json!({"name": null}), "name", "required")]
#[actix_web::test]
async fn create_reports_the_failing_field(
    #[case] overrides: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let (app, kitchen) = kitchen().await;
    let mut body = recipe_body(&kitchen, "Pancakes", 200);
    if let (Some(target), Some(changes)) = (body.as_object_mut(), overrides.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(auth(&kitchen.author_token))
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = actix_test::read_body_json(response).await;
    assert_eq!(error["details"]["field"], field);
    assert_eq!(error["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_ingredients_are_rejected() {
    let (app, kitchen) = kitchen().await;
    let mut body = recipe_body(&kitchen, "Pancakes", 200);
    body["ingredients"] = json!([
        {"id": kitchen.flour, "amount": 1},
        {"id": kitchen.flour, "amount": 2}
    ]);

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(auth(&kitchen.author_token))
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = actix_test::read_body_json(response).await;
    assert_eq!(error["details"]["code"], "duplicate");
    assert_eq!(error["details"]["id"], kitchen.flour);
}

#[actix_web::test]
async fn list_is_newest_first_and_public() {
    let (app, kitchen) = kitchen().await;
    publish(&app, &kitchen, "First", 100).await;
    publish(&app, &kitchen, "Second", 100).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["name"], "Second");
    assert_eq!(body["results"][1]["name"], "First");
}

#[actix_web::test]
async fn favourite_filter_splits_the_list() {
    let (app, kitchen) = kitchen().await;
    let liked = publish(&app, &kitchen, "Liked", 100).await;
    publish(&app, &kitchen, "Ignored", 100).await;

    let mark = actix_test::TestRequest::post()
        .uri(&format!("/api/recipes/{liked}/favorite/"))
        .insert_header(auth(&kitchen.other_token))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, mark).await.status(),
        StatusCode::CREATED
    );

    for (flag, expected) in [("1", "Liked"), ("false", "Ignored")] {
        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/recipes/?is_favorited={flag}"))
            .insert_header(auth(&kitchen.other_token))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["count"], 1, "flag {flag}");
        assert_eq!(body["results"][0]["name"], expected);
    }
}

#[actix_web::test]
async fn filters_by_author_and_tag() {
    let (app, kitchen) = kitchen().await;
    publish(&app, &kitchen, "Tagged", 100).await;

    let uris = [
        format!("/api/recipes/?author={}", kitchen.author.get()),
        "/api/recipes/?tags=breakfast&tags=dinner".to_owned(),
    ];
    for uri in uris {
        let request = actix_test::TestRequest::get().uri(&uri).to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["count"], 1, "{uri}");
    }

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/?tags=dinner")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn non_author_cannot_edit_or_delete() {
    let (app, kitchen) = kitchen().await;
    let id = publish(&app, &kitchen, "Mine", 100).await;
    let uri = format!("/api/recipes/{id}/");

    let patch = actix_test::TestRequest::patch()
        .uri(&uri)
        .insert_header(auth(&kitchen.other_token))
        .set_json(json!({"name": "Theirs"}))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, patch).await.status(),
        StatusCode::FORBIDDEN
    );

    let delete = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth(&kitchen.other_token))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, delete).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn patch_updates_only_supplied_fields() {
    let (app, kitchen) = kitchen().await;
    let id = publish(&app, &kitchen, "Draft", 100).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/recipes/{id}/"))
        .insert_header(auth(&kitchen.author_token))
        .set_json(json!({"name": "Final", "ingredients": [{"id": kitchen.sugar, "amount": 7}]}))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["name"], "Final");
    assert_eq!(body["text"], "Mix and bake.");
    assert_eq!(body["ingredients"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["ingredients"][0]["amount"], 7);
}

#[actix_web::test]
async fn delete_removes_recipe_and_image() {
    let (app, kitchen) = kitchen().await;
    let id = publish(&app, &kitchen, "Gone", 100).await;
    let uri = format!("/api/recipes/{id}/");

    let delete = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth(&kitchen.author_token))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, delete).await.status(),
        StatusCode::NO_CONTENT
    );
    assert!(kitchen.store.stored_images().expect("images").is_empty());

    let get = actix_test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        actix_test::call_service(&app, get).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn marking_twice_keeps_a_single_row() {
    let (app, kitchen) = kitchen().await;
    let id = publish(&app, &kitchen, "Twice", 100).await;
    let uri = format!("/api/recipes/{id}/shopping_cart/");

    for _ in 0..2 {
        let request = actix_test::TestRequest::post()
            .uri(&uri)
            .insert_header(auth(&kitchen.author_token))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["id"], id);
        assert_eq!(body["name"], "Twice");
    }
    assert_eq!(
        kitchen
            .store
            .mark_rows(MarkKind::ShoppingCart, kitchen.author, RecipeId::new(id))
            .expect("mark rows"),
        1
    );
}

#[actix_web::test]
async fn unmarking_an_absent_mark_is_not_found() {
    let (app, kitchen) = kitchen().await;
    let id = publish(&app, &kitchen, "Never liked", 100).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/recipes/{id}/favorite/"))
        .insert_header(auth(&kitchen.author_token))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn shopping_list_sums_amounts_across_recipes() {
    let (app, kitchen) = kitchen().await;
    for name in ["Cake", "Cookies"] {
        let id = publish(&app, &kitchen, name, 250).await;
        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/recipes/{id}/shopping_cart/"))
            .insert_header(auth(&kitchen.author_token))
            .to_request();
        actix_test::call_service(&app, request).await;
    }

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/?format=txt")
        .insert_header(auth(&kitchen.author_token))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(disposition.starts_with("attachment"), "{disposition}");
    assert!(disposition.contains("shopping_list.txt"), "{disposition}");

    let body = actix_test::read_body(response).await;
    let text = String::from_utf8(body.to_vec()).expect("utf-8");
    assert_eq!(text, "Shopping list\nflour - 500 g\nsugar - 10 g\n");
}

#[actix_web::test]
async fn shopping_list_defaults_to_pdf_and_rejects_unknown_formats() {
    let (app, kitchen) = kitchen().await;

    let pdf = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/")
        .insert_header(auth(&kitchen.author_token))
        .to_request();
    let response = actix_test::call_service(&app, pdf).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/pdf"[..])
    );
    let body = actix_test::read_body(response).await;
    assert!(body.starts_with(b"%PDF-"));

    let docx = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/?format=docx")
        .insert_header(auth(&kitchen.author_token))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, docx).await.status(),
        StatusCode::BAD_REQUEST
    );

    let anonymous = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/")
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, anonymous).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
