//! Integration tests for `DieselShoppingListRepository` against embedded
//! PostgreSQL.
//!
//! The aggregation is a grouped `SUM` over the viewer's cart, so these suites
//! check it against real rows rather than the in-memory store.

use backend::domain::ports::{RecipeMarkRepository, ShoppingListRepository};
use backend::domain::{MarkKind, RecipeId, ShoppingListLine, User};
use backend::outbound::persistence::{DieselRecipeMarkRepository, DieselShoppingListRepository};
use rstest::{fixture, rstest};

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{TestDatabase, handle_cluster_setup_failure};

struct Cart {
    db: TestDatabase,
    lists: DieselShoppingListRepository,
    marks: DieselRecipeMarkRepository,
    shopper: User,
    recipes: Vec<RecipeId>,
}

impl Cart {
    fn put(&self, user: &User, recipe: RecipeId) {
        self.db
            .runtime
            .block_on(self.marks.add(MarkKind::ShoppingCart, user.id, recipe))
            .expect("add to cart");
    }

    fn aggregate(&self, user: &User) -> Vec<ShoppingListLine> {
        self.db
            .runtime
            .block_on(self.lists.aggregate(user.id))
            .expect("aggregate")
    }
}

fn line(name: &str, unit: &str, total_amount: i64) -> ShoppingListLine {
    ShoppingListLine {
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
        total_amount,
    }
}

/// Two recipes needing 5 g of sugar each; the second also needs milk.
fn setup_cart() -> Result<Cart, String> {
    let db = TestDatabase::provision("diesel_shopping_list")?;
    let author = db.seed_user("baker@example.com");
    let shopper = db.seed_user("shopper@example.com");
    let dessert = db.seed_tag("Dessert", "#8775D2", "dessert");
    let sugar = db.seed_ingredient("sugar", "g");
    let milk = db.seed_ingredient("milk", "ml");
    let recipes = vec![
        db.seed_recipe(&author, "Fudge", 0, &[(&sugar, 5)], &[&dessert]),
        db.seed_recipe(&author, "Custard", 1, &[(&sugar, 5), (&milk, 250)], &[&dessert]),
    ];
    Ok(Cart {
        lists: DieselShoppingListRepository::new(db.pool.clone()),
        marks: DieselRecipeMarkRepository::new(db.pool.clone()),
        db,
        shopper,
        recipes,
    })
}

#[fixture]
fn cart() -> Option<Cart> {
    match setup_cart() {
        Ok(cart) => Some(cart),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn shared_ingredients_are_summed_and_sorted(cart: Option<Cart>) {
    let Some(cart) = cart else {
        eprintln!("SKIP-TEST-CLUSTER: shared_ingredients_are_summed_and_sorted skipped");
        return;
    };
    for recipe in &cart.recipes {
        cart.put(&cart.shopper, *recipe);
    }

    assert_eq!(
        cart.aggregate(&cart.shopper),
        vec![line("milk", "ml", 250), line("sugar", "g", 10)]
    );
}

#[rstest]
fn empty_cart_yields_no_lines(cart: Option<Cart>) {
    let Some(cart) = cart else {
        eprintln!("SKIP-TEST-CLUSTER: empty_cart_yields_no_lines skipped");
        return;
    };
    assert!(cart.aggregate(&cart.shopper).is_empty());
}

#[rstest]
fn carts_are_per_user(cart: Option<Cart>) {
    let Some(cart) = cart else {
        eprintln!("SKIP-TEST-CLUSTER: carts_are_per_user skipped");
        return;
    };
    let other = cart.db.seed_user("neighbour@example.com");
    if let Some(fudge) = cart.recipes.first() {
        cart.put(&other, *fudge);
    }

    assert_eq!(cart.aggregate(&other), vec![line("sugar", "g", 5)]);
    assert!(cart.aggregate(&cart.shopper).is_empty());
}
