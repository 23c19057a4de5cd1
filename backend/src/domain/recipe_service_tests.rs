//! Tests for the recipe service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    ImageStoreError, MockImageStore, MockIngredientRepository, MockRecipeMarkRepository,
    MockRecipeRepository, MockTagRepository, PersistenceError,
};
use crate::domain::test_fixtures::{
    GIF_DATA_URI, fixture_clock, fixture_now, ingredient, recipe, summary, tag,
};

#[derive(Default)]
struct Mocks {
    recipes: MockRecipeRepository,
    marks: MockRecipeMarkRepository,
    tags: MockTagRepository,
    ingredients: MockIngredientRepository,
    images: MockImageStore,
}

impl Mocks {
    fn into_service(self) -> RecipeService {
        RecipeService::new(
            RecipeServicePorts {
                recipes: Arc::new(self.recipes),
                marks: Arc::new(self.marks),
                tags: Arc::new(self.tags),
                ingredients: Arc::new(self.ingredients),
                images: Arc::new(self.images),
            },
            fixture_clock(),
        )
    }

    fn with_known_references(mut self) -> Self {
        self.tags
            .expect_find_many()
            .returning(|ids| Ok(ids.iter().map(|id| tag(id.get(), "known")).collect()));
        self.ingredients.expect_find_many().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| ingredient(id.get(), "flour", "g"))
                .collect())
        });
        self
    }

    fn owned_by(mut self, author: i64) -> Self {
        self.recipes.expect_author_of().returning(move |_| {
            Ok(Some(RecipeOwnership {
                author: UserId::new(author),
                image: "recipes/images/old.png".to_owned(),
            }))
        });
        self
    }
}

#[fixture]
fn draft() -> RecipeDraft {
    RecipeDraft::try_from_fields(RecipeFields {
        name: Some("Pancakes".to_owned()),
        text: Some("Whisk and fry.".to_owned()),
        cooking_time: Some(20),
        ingredients: Some(vec![(1, 200), (2, 3)]),
        tags: Some(vec![1]),
        image: Some(GIF_DATA_URI.to_owned()),
    })
    .expect("valid draft")
}

#[rstest]
#[tokio::test]
async fn create_stores_image_and_stamps_pub_date(draft: RecipeDraft) {
    let mut mocks = Mocks::default().with_known_references();
    mocks
        .images
        .expect_save()
        .times(1)
        .return_once(|_| Ok("recipes/images/new.gif".to_owned()));
    mocks
        .recipes
        .expect_create()
        .withf(|author, recipe| {
            *author == UserId::new(1)
                && recipe.image_path == "recipes/images/new.gif"
                && recipe.pub_date == fixture_now()
                && recipe.ingredients.len() == 2
        })
        .times(1)
        .return_once(|_, _| Ok(RecipeId::new(10)));
    mocks
        .recipes
        .expect_find()
        .with(eq(RecipeId::new(10)), eq(Some(UserId::new(1))))
        .times(1)
        .return_once(|_, _| Ok(Some(recipe(10, 1))));

    let created = mocks
        .into_service()
        .create(UserId::new(1), draft)
        .await
        .expect("created");
    assert_eq!(created.id, RecipeId::new(10));
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_ingredient(draft: RecipeDraft) {
    let mut mocks = Mocks::default();
    mocks
        .ingredients
        .expect_find_many()
        .times(1)
        .return_once(|_| Ok(vec![ingredient(1, "flour", "g")]));
    mocks.images.expect_save().never();
    mocks.recipes.expect_create().never();

    let err = mocks
        .into_service()
        .create(UserId::new(1), draft)
        .await
        .expect_err("unknown ingredient");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d.get("id")), Some(&2.into()));
}

#[rstest]
#[tokio::test]
async fn create_discards_image_when_insert_fails(draft: RecipeDraft) {
    let mut mocks = Mocks::default().with_known_references();
    mocks
        .images
        .expect_save()
        .times(1)
        .return_once(|_| Ok("recipes/images/orphan.gif".to_owned()));
    mocks
        .images
        .expect_delete()
        .withf(|path| path == "recipes/images/orphan.gif")
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .recipes
        .expect_create()
        .times(1)
        .return_once(|_, _| Err(PersistenceError::connection("pool closed")));

    let err = mocks
        .into_service()
        .create(UserId::new(1), draft)
        .await
        .expect_err("insert failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn update_by_non_author_is_forbidden_before_validation() {
    let mut mocks = Mocks::default().owned_by(2);
    mocks.recipes.expect_update().never();

    let fields = RecipeFields {
        cooking_time: Some(0),
        ..RecipeFields::default()
    };
    let err = mocks
        .into_service()
        .update(UserId::new(1), RecipeId::new(5), fields)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_missing_recipe_is_not_found() {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_author_of().return_once(|_| Ok(None));

    let err = mocks
        .into_service()
        .update(UserId::new(1), RecipeId::new(5), RecipeFields::default())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_replacing_image_removes_old_file() {
    let mut mocks = Mocks::default().owned_by(1);
    mocks
        .images
        .expect_save()
        .times(1)
        .return_once(|_| Ok("recipes/images/fresh.gif".to_owned()));
    mocks
        .images
        .expect_delete()
        .withf(|path| path == "recipes/images/old.png")
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .recipes
        .expect_update()
        .withf(|_, changes| {
            changes.image_path.as_deref() == Some("recipes/images/fresh.gif")
                && changes.name.as_deref() == Some("Renamed")
        })
        .times(1)
        .return_once(|_, _| Ok(true));
    mocks
        .recipes
        .expect_find()
        .times(1)
        .return_once(|_, _| Ok(Some(recipe(5, 1))));

    let fields = RecipeFields {
        name: Some("Renamed".to_owned()),
        image: Some(GIF_DATA_URI.to_owned()),
        ..RecipeFields::default()
    };
    mocks
        .into_service()
        .update(UserId::new(1), RecipeId::new(5), fields)
        .await
        .expect("updated");
}

#[tokio::test]
async fn delete_tolerates_image_removal_failure() {
    let mut mocks = Mocks::default().owned_by(1);
    mocks.recipes.expect_delete().times(1).return_once(|_| Ok(true));
    mocks
        .images
        .expect_delete()
        .times(1)
        .return_once(|_| Err(ImageStoreError::remove("permission denied")));

    mocks
        .into_service()
        .delete(UserId::new(1), RecipeId::new(5))
        .await
        .expect("deleted despite image failure");
}

#[rstest]
#[case(MarkKind::Favorite, true)]
#[case(MarkKind::ShoppingCart, false)]
#[tokio::test]
async fn add_mark_returns_summary_for_new_and_existing_rows(
    #[case] kind: MarkKind,
    #[case] newly_created: bool,
) {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_summary()
        .times(1)
        .return_once(|_| Ok(Some(summary(3))));
    mocks
        .marks
        .expect_add()
        .with(eq(kind), eq(UserId::new(1)), eq(RecipeId::new(3)))
        .times(1)
        .return_once(move |_, _, _| Ok(newly_created));

    let marked = mocks
        .into_service()
        .add_mark(kind, UserId::new(1), RecipeId::new(3))
        .await
        .expect("marked");
    assert_eq!(marked.id, RecipeId::new(3));
}

#[tokio::test]
async fn add_mark_on_missing_recipe_is_not_found() {
    let mut mocks = Mocks::default();
    mocks.recipes.expect_find_summary().return_once(|_| Ok(None));
    mocks.marks.expect_add().never();

    let err = mocks
        .into_service()
        .add_mark(MarkKind::Favorite, UserId::new(1), RecipeId::new(3))
        .await
        .expect_err("missing recipe");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_mark_on_recipe_deleted_meanwhile_is_not_found() {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_summary()
        .return_once(|_| Ok(Some(summary(3))));
    mocks
        .marks
        .expect_add()
        .return_once(|_, _, _| Err(PersistenceError::foreign_key("favorites_recipe_id_fkey")));

    let err = mocks
        .into_service()
        .add_mark(MarkKind::Favorite, UserId::new(1), RecipeId::new(3))
        .await
        .expect_err("recipe vanished");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn remove_absent_mark_is_not_found() {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_find_summary()
        .return_once(|_| Ok(Some(summary(3))));
    mocks.marks.expect_remove().return_once(|_, _, _| Ok(false));

    let err = mocks
        .into_service()
        .remove_mark(MarkKind::ShoppingCart, UserId::new(1), RecipeId::new(3))
        .await
        .expect_err("not in cart");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_ignores_mark_filters_for_anonymous_viewers() {
    let mut mocks = Mocks::default();
    mocks
        .recipes
        .expect_list()
        .withf(|filter, viewer, _| filter.is_favorited.is_none() && viewer.is_none())
        .times(1)
        .return_once(|_, _, _| Ok(Page::new(vec![recipe(1, 1)], 1)));

    let filter = RecipeFilter {
        is_favorited: Some(true),
        ..RecipeFilter::default()
    };
    let page = PageRequest::new(1, 6, 100).expect("page");
    let listed = mocks
        .into_service()
        .list(filter, None, &page)
        .await
        .expect("listed");
    assert_eq!(listed.total, 1);
}
