//! In-memory implementations of every driven port.
//!
//! [`InMemoryStore`] keeps all rows behind one mutex and mirrors the
//! observable behaviour of the Diesel adapters: ordering, uniqueness,
//! referential checks and shopping-list aggregation. Handler and
//! integration tests assemble the real services on top of it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AuthTokenRepository, ImageStore, ImageStoreError, IngredientRepository, PersistenceError,
    RecipeMarkRepository, RecipeOwnership, RecipeRepository, ShoppingListRepository,
    SubscriptionRepository, TagRepository, UserCredentials, UserRepository,
};
use crate::domain::{
    AuthorRef, CookingTime, Email, Ingredient, IngredientAmount, IngredientId, MarkKind,
    NewIngredient, NewRecipe, NewTag, NewUserProfile, PasswordHash, Recipe, RecipeChanges,
    RecipeFilter, RecipeId, RecipeImage, RecipeIngredient, RecipeSummary, ShoppingListLine, Tag,
    TagId, TokenDigest, User, UserId, UserProfile,
};

#[derive(Debug, Clone)]
struct StoredRecipe {
    author: UserId,
    name: String,
    text: String,
    image: String,
    cooking_time: CookingTime,
    pub_date: DateTime<Utc>,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientAmount>,
}

impl StoredRecipe {
    fn summary(&self, id: RecipeId) -> RecipeSummary {
        RecipeSummary {
            id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, (User, PasswordHash)>,
    tokens: HashMap<UserId, TokenDigest>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, StoredRecipe>,
    favorites: HashSet<(UserId, RecipeId)>,
    carts: HashSet<(UserId, RecipeId)>,
    /// `(subscriber, author)` pairs.
    subscriptions: HashSet<(UserId, UserId)>,
    images: BTreeSet<String>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn marks(&self, kind: MarkKind) -> &HashSet<(UserId, RecipeId)> {
        match kind {
            MarkKind::Favorite => &self.favorites,
            MarkKind::ShoppingCart => &self.carts,
        }
    }

    fn marks_mut(&mut self, kind: MarkKind) -> &mut HashSet<(UserId, RecipeId)> {
        match kind {
            MarkKind::Favorite => &mut self.favorites,
            MarkKind::ShoppingCart => &mut self.carts,
        }
    }

    fn check_references(
        &self,
        tags: Option<&[TagId]>,
        ingredients: Option<&[IngredientAmount]>,
    ) -> Result<(), PersistenceError> {
        if let Some(tag) = tags
            .unwrap_or_default()
            .iter()
            .find(|id| !self.tags.contains_key(id))
        {
            return Err(PersistenceError::foreign_key(format!("tag {tag} does not exist")));
        }
        if let Some(line) = ingredients
            .unwrap_or_default()
            .iter()
            .find(|line| !self.ingredients.contains_key(&line.ingredient))
        {
            return Err(PersistenceError::foreign_key(format!(
                "ingredient {} does not exist",
                line.ingredient
            )));
        }
        Ok(())
    }

    fn matches(&self, id: RecipeId, recipe: &StoredRecipe, filter: &RecipeFilter, viewer: Option<UserId>) -> bool {
        let author_ok = match &filter.author {
            None => true,
            Some(AuthorRef::Id(author)) => recipe.author == *author,
            Some(AuthorRef::Email(email)) => self
                .users
                .get(&recipe.author)
                .is_some_and(|(user, _)| &user.email == email),
        };
        let tags_ok = filter.tags.is_empty()
            || recipe.tags.iter().any(|tag| {
                self.tags
                    .get(tag)
                    .is_some_and(|tag| filter.tags.iter().any(|slug| slug == tag.slug.as_ref()))
            });
        let marks_ok = [MarkKind::Favorite, MarkKind::ShoppingCart]
            .into_iter()
            .all(|kind| match (filter.mark(kind), viewer) {
                (Some(wanted), Some(viewer)) => self.marks(kind).contains(&(viewer, id)) == wanted,
                _ => true,
            });
        author_ok && tags_ok && marks_ok
    }

    fn hydrate(
        &self,
        id: RecipeId,
        recipe: &StoredRecipe,
        viewer: Option<UserId>,
    ) -> Result<Recipe, PersistenceError> {
        let (author, _) = self
            .users
            .get(&recipe.author)
            .ok_or_else(|| PersistenceError::query(format!("recipe {id} lost its author")))?;
        let mut tags: Vec<Tag> = recipe
            .tags
            .iter()
            .filter_map(|tag| self.tags.get(tag).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        let mut ingredients: Vec<RecipeIngredient> = recipe
            .ingredients
            .iter()
            .filter_map(|line| {
                self.ingredients.get(&line.ingredient).map(|ingredient| RecipeIngredient {
                    ingredient: ingredient.clone(),
                    amount: line.amount,
                })
            })
            .collect();
        ingredients.sort_by(|a, b| a.ingredient.name.cmp(&b.ingredient.name));
        let flag = |set: &HashSet<(UserId, RecipeId)>| viewer.is_some_and(|v| set.contains(&(v, id)));
        Ok(Recipe {
            id,
            author: UserProfile {
                user: author.clone(),
                is_subscribed: viewer
                    .is_some_and(|v| self.subscriptions.contains(&(v, recipe.author))),
            },
            name: recipe.name.clone(),
            text: recipe.text.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
            pub_date: recipe.pub_date,
            tags,
            ingredients,
            is_favorited: flag(&self.favorites),
            is_in_shopping_cart: flag(&self.carts),
        })
    }

    fn newest_first(&self) -> Vec<(RecipeId, &StoredRecipe)> {
        let mut rows: Vec<_> = self.recipes.iter().map(|(id, r)| (*id, r)).collect();
        rows.sort_by(|(a_id, a), (b_id, b)| b.pub_date.cmp(&a.pub_date).then(b_id.cmp(a_id)));
        rows
    }
}

fn page_of<T>(rows: Vec<T>, page: &PageRequest) -> Page<T> {
    let total = rows.len() as u64;
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    Page::new(rows.into_iter().skip(skip).take(take).collect(), total)
}

/// Shared in-memory database. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, PersistenceError> {
        self.state
            .lock()
            .map_err(|_| PersistenceError::connection("in-memory store lock poisoned"))
    }

    /// Seed a tag and return it with its assigned id.
    pub fn insert_tag(&self, tag: NewTag) -> Result<Tag, PersistenceError> {
        let mut state = self.lock()?;
        let id = TagId::new(state.allocate_id());
        let tag = Tag {
            id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    /// Seed an ingredient and return it with its assigned id.
    pub fn insert_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, PersistenceError> {
        let mut state = self.lock()?;
        let id = IngredientId::new(state.allocate_id());
        let ingredient = Ingredient {
            id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        };
        state.ingredients.insert(id, ingredient.clone());
        Ok(ingredient)
    }

    /// Paths of every picture currently held by the image store.
    pub fn stored_images(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.lock()?.images.iter().cloned().collect())
    }

    /// Number of favourite or cart rows for the pair; never more than one.
    pub fn mark_rows(&self, kind: MarkKind, user: UserId, recipe: RecipeId) -> Result<usize, PersistenceError> {
        Ok(usize::from(self.lock()?.marks(kind).contains(&(user, recipe))))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        profile: &NewUserProfile,
        password_hash: &PasswordHash,
    ) -> Result<User, PersistenceError> {
        let mut state = self.lock()?;
        if state.users.values().any(|(user, _)| user.email == profile.email) {
            return Err(PersistenceError::conflict("users_email_key already exists"));
        }
        let user = User {
            id: UserId::new(state.allocate_id()),
            email: profile.email.clone(),
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };
        state.users.insert(user.id, (user.clone(), password_hash.clone()));
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        Ok(self.lock()?.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .find_credentials_by_email(email)
            .await?
            .map(|credentials| credentials.user))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_password_hash(&self, id: UserId) -> Result<Option<PasswordHash>, PersistenceError> {
        Ok(self.lock()?.users.get(&id).map(|(_, hash)| hash.clone()))
    }

    async fn list(&self, page: &PageRequest) -> Result<Page<User>, PersistenceError> {
        let users = self.lock()?.users.values().map(|(user, _)| user.clone()).collect();
        Ok(page_of(users, page))
    }

    async fn set_password(
        &self,
        id: UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, PersistenceError> {
        Ok(match self.lock()?.users.get_mut(&id) {
            Some((_, stored)) => {
                *stored = password_hash.clone();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryStore {
    async fn store(&self, user: UserId, digest: &TokenDigest) -> Result<(), PersistenceError> {
        self.lock()?.tokens.insert(user, digest.clone());
        Ok(())
    }

    async fn find_user(&self, digest: &TokenDigest) -> Result<Option<User>, PersistenceError> {
        let state = self.lock()?;
        Ok(state
            .tokens
            .iter()
            .find(|(_, stored)| *stored == digest)
            .and_then(|(user, _)| state.users.get(user))
            .map(|(user, _)| user.clone()))
    }

    async fn revoke(&self, user: UserId) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.tokens.remove(&user).is_some())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Tag>, PersistenceError> {
        let mut tags: Vec<Tag> = self.lock()?.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find(&self, id: TagId) -> Result<Option<Tag>, PersistenceError> {
        Ok(self.lock()?.tags.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[TagId]) -> Result<Vec<Tag>, PersistenceError> {
        let state = self.lock()?;
        Ok(ids.iter().filter_map(|id| state.tags.get(id).cloned()).collect())
    }

    async fn insert_missing(&self, tags: &[NewTag]) -> Result<u64, PersistenceError> {
        let mut inserted = 0;
        for tag in tags {
            let known = self.lock()?.tags.values().any(|stored| {
                stored.slug == tag.slug || stored.name == tag.name || stored.color == tag.color
            });
            if !known {
                self.insert_tag(tag.clone())?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl IngredientRepository for InMemoryStore {
    async fn search(&self, name_prefix: &str) -> Result<Vec<Ingredient>, PersistenceError> {
        let prefix = name_prefix.to_lowercase();
        let mut found: Vec<Ingredient> = self
            .lock()?
            .ingredients
            .values()
            .filter(|ingredient| ingredient.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, PersistenceError> {
        Ok(self.lock()?.ingredients.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, PersistenceError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id).cloned())
            .collect())
    }

    async fn insert_missing(&self, ingredients: &[NewIngredient]) -> Result<u64, PersistenceError> {
        let mut inserted = 0;
        for ingredient in ingredients {
            let known = self.lock()?.ingredients.values().any(|stored| {
                stored.name == ingredient.name
                    && stored.measurement_unit == ingredient.measurement_unit
            });
            if !known {
                self.insert_ingredient(ingredient.clone())?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<UserId>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, PersistenceError> {
        let state = self.lock()?;
        let matching: Vec<_> = state
            .newest_first()
            .into_iter()
            .filter(|(id, recipe)| state.matches(*id, recipe, filter, viewer))
            .collect();
        let page = page_of(matching, page);
        let items = page
            .items
            .into_iter()
            .map(|(id, recipe)| state.hydrate(id, recipe, viewer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page.total))
    }

    async fn find(
        &self,
        id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<Option<Recipe>, PersistenceError> {
        let state = self.lock()?;
        state
            .recipes
            .get(&id)
            .map(|recipe| state.hydrate(id, recipe, viewer))
            .transpose()
    }

    async fn find_summary(&self, id: RecipeId) -> Result<Option<RecipeSummary>, PersistenceError> {
        Ok(self.lock()?.recipes.get(&id).map(|recipe| recipe.summary(id)))
    }

    async fn author_of(&self, id: RecipeId) -> Result<Option<RecipeOwnership>, PersistenceError> {
        Ok(self.lock()?.recipes.get(&id).map(|recipe| RecipeOwnership {
            author: recipe.author,
            image: recipe.image.clone(),
        }))
    }

    async fn create(&self, author: UserId, recipe: &NewRecipe) -> Result<RecipeId, PersistenceError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&author) {
            return Err(PersistenceError::foreign_key(format!("user {author} does not exist")));
        }
        state.check_references(Some(&recipe.tags), Some(&recipe.ingredients))?;
        let id = RecipeId::new(state.allocate_id());
        state.recipes.insert(
            id,
            StoredRecipe {
                author,
                name: recipe.name.clone(),
                text: recipe.text.clone(),
                image: recipe.image_path.clone(),
                cooking_time: recipe.cooking_time,
                pub_date: recipe.pub_date,
                tags: recipe.tags.clone(),
                ingredients: recipe.ingredients.clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: RecipeId, changes: &RecipeChanges) -> Result<bool, PersistenceError> {
        let mut state = self.lock()?;
        state.check_references(changes.tags.as_deref(), changes.ingredients.as_deref())?;
        let Some(recipe) = state.recipes.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = &changes.name {
            recipe.name.clone_from(name);
        }
        if let Some(text) = &changes.text {
            recipe.text.clone_from(text);
        }
        if let Some(cooking_time) = changes.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        if let Some(image) = &changes.image_path {
            recipe.image.clone_from(image);
        }
        if let Some(tags) = &changes.tags {
            recipe.tags.clone_from(tags);
        }
        if let Some(ingredients) = &changes.ingredients {
            recipe.ingredients.clone_from(ingredients);
        }
        Ok(true)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, PersistenceError> {
        let mut state = self.lock()?;
        if state.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|(_, recipe)| *recipe != id);
        state.carts.retain(|(_, recipe)| *recipe != id);
        Ok(true)
    }

    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, PersistenceError> {
        let state = self.lock()?;
        let take = limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|(_, recipe)| recipe.author == author)
            .take(take)
            .map(|(id, recipe)| recipe.summary(id))
            .collect())
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, PersistenceError> {
        Ok(self
            .lock()?
            .recipes
            .values()
            .filter(|recipe| recipe.author == author)
            .count() as u64)
    }
}

#[async_trait]
impl RecipeMarkRepository for InMemoryStore {
    async fn add(&self, kind: MarkKind, user: UserId, recipe: RecipeId) -> Result<bool, PersistenceError> {
        let mut state = self.lock()?;
        if !state.recipes.contains_key(&recipe) {
            return Err(PersistenceError::foreign_key(format!("recipe {recipe} does not exist")));
        }
        Ok(state.marks_mut(kind).insert((user, recipe)))
    }

    async fn remove(&self, kind: MarkKind, user: UserId, recipe: RecipeId) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.marks_mut(kind).remove(&(user, recipe)))
    }
}

#[async_trait]
impl ShoppingListRepository for InMemoryStore {
    async fn aggregate(&self, user: UserId) -> Result<Vec<ShoppingListLine>, PersistenceError> {
        let state = self.lock()?;
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        let in_cart = state
            .carts
            .iter()
            .filter(|(owner, _)| *owner == user)
            .filter_map(|(_, recipe)| state.recipes.get(recipe));
        for recipe in in_cart {
            for line in &recipe.ingredients {
                if let Some(ingredient) = state.ingredients.get(&line.ingredient) {
                    *totals
                        .entry((ingredient.name.clone(), ingredient.measurement_unit.clone()))
                        .or_default() += i64::from(line.amount.get());
                }
            }
        }
        Ok(totals
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListLine {
                name,
                measurement_unit,
                total_amount,
            })
            .collect())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn subscribe(&self, subscriber: UserId, author: UserId) -> Result<bool, PersistenceError> {
        if subscriber == author {
            return Err(PersistenceError::foreign_key("subscriptions_not_self"));
        }
        Ok(self.lock()?.subscriptions.insert((subscriber, author)))
    }

    async fn unsubscribe(&self, subscriber: UserId, author: UserId) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.subscriptions.remove(&(subscriber, author)))
    }

    async fn is_subscribed(&self, subscriber: UserId, author: UserId) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.subscriptions.contains(&(subscriber, author)))
    }

    async fn subscribed_among(
        &self,
        subscriber: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, PersistenceError> {
        let state = self.lock()?;
        Ok(authors
            .iter()
            .copied()
            .filter(|author| state.subscriptions.contains(&(subscriber, *author)))
            .collect())
    }

    async fn list_authors(
        &self,
        subscriber: UserId,
        page: &PageRequest,
    ) -> Result<Page<User>, PersistenceError> {
        let state = self.lock()?;
        let mut authors: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|(follower, _)| *follower == subscriber)
            .filter_map(|(_, author)| state.users.get(author).map(|(user, _)| user.clone()))
            .collect();
        authors.sort_by(|a, b| a.email.as_ref().cmp(b.email.as_ref()).then(a.id.cmp(&b.id)));
        Ok(page_of(authors, page))
    }
}

#[async_trait]
impl ImageStore for InMemoryStore {
    async fn save(&self, image: &RecipeImage) -> Result<String, ImageStoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ImageStoreError::write("in-memory store lock poisoned"))?;
        let path = format!("recipes/images/{}.{}", state.allocate_id(), image.extension());
        state.images.insert(path.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), ImageStoreError> {
        self.state
            .lock()
            .map_err(|_| ImageStoreError::remove("in-memory store lock poisoned"))?
            .images
            .remove(path);
        Ok(())
    }
}
