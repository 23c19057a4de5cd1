//! Sample entities shared by service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    CookingTime, Email, HexColor, Ingredient, IngredientId, PersonName, Recipe, RecipeId,
    RecipeSummary, Tag, TagId, TagSlug, User, UserId, UserProfile, Username,
};

pub(crate) fn user(id: i64) -> User {
    User {
        id: UserId::new(id),
        email: Email::new(format!("cook{id}@example.com")).expect("fixture email"),
        username: Username::new(format!("cook{id}")).expect("fixture username"),
        first_name: PersonName::new("first_name", "Ivan").expect("fixture name"),
        last_name: PersonName::new("last_name", "Petrov").expect("fixture name"),
    }
}

pub(crate) fn tag(id: i64, slug: &str) -> Tag {
    Tag {
        id: TagId::new(id),
        name: slug.to_uppercase(),
        color: HexColor::new(&format!("#{:06X}", id)).expect("fixture colour"),
        slug: TagSlug::new(slug).expect("fixture slug"),
    }
}

pub(crate) fn ingredient(id: i64, name: &str, unit: &str) -> Ingredient {
    Ingredient {
        id: IngredientId::new(id),
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    }
}

pub(crate) fn recipe(id: i64, author: i64) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author: UserProfile {
            user: user(author),
            is_subscribed: false,
        },
        name: format!("Recipe {id}"),
        text: "Mix and bake.".to_owned(),
        image: format!("recipes/images/{id}.png"),
        cooking_time: CookingTime::new(30).expect("fixture time"),
        pub_date: Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("fixture date"),
        tags: vec![tag(1, "lunch")],
        ingredients: Vec::new(),
        is_favorited: false,
        is_in_shopping_cart: false,
    }
}

pub(crate) fn summary(id: i64) -> RecipeSummary {
    recipe(id, 1).summary()
}

pub(crate) const GIF_DATA_URI: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_now()
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock)
}
