//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is the login identifier.
    users (id) {
        id -> Int8,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 150]
        username -> Varchar,
        #[max_length = 150]
        first_name -> Varchar,
        #[max_length = 150]
        last_name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// One API token per user, stored as a SHA-256 digest.
    auth_tokens (user_id) {
        user_id -> Int8,
        #[max_length = 64]
        key_digest -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        #[max_length = 200]
        name -> Varchar,
        #[max_length = 7]
        color -> Varchar,
        #[max_length = 200]
        slug -> Varchar,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int8,
        #[max_length = 200]
        name -> Varchar,
        #[max_length = 200]
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        author_id -> Int8,
        #[max_length = 200]
        name -> Varchar,
        text -> Text,
        /// Path relative to the media root.
        #[max_length = 255]
        image -> Varchar,
        cooking_time -> Int2,
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    favorites (user_id, recipe_id) {
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::table! {
    shopping_carts (user_id, recipe_id) {
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::table! {
    subscriptions (subscriber_id, author_id) {
        subscriber_id -> Int8,
        author_id -> Int8,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_carts -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
    favorites,
    shopping_carts,
    subscriptions,
);
