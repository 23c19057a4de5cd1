//! Following authors.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{RecipeRepository, SubscriptionRepository, UserRepository};
use super::validation_errors::field_error;
use super::{Error, RecipesLimit, SubscribedAuthor, User, UserId};

/// Subscribing to authors and listing the authors a user follows.
#[derive(Clone)]
pub struct SubscriptionService {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    recipes: Arc<dyn RecipeRepository>,
}

impl SubscriptionService {
    /// Build the service from its repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        recipes: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            recipes,
        }
    }

    /// Follow `author`. Self-subscription and repeats are rejected with 400.
    pub async fn subscribe(
        &self,
        subscriber: UserId,
        author: UserId,
        recipes_limit: RecipesLimit,
    ) -> Result<SubscribedAuthor, Error> {
        let author = self.existing_author(author).await?;
        if author.id == subscriber {
            return Err(field_error(
                "author",
                "self_subscription",
                "you cannot subscribe to yourself",
            ));
        }
        if !self.subscriptions.subscribe(subscriber, author.id).await? {
            return Err(field_error(
                "author",
                "already_subscribed",
                "you are already subscribed to this author",
            ));
        }
        info!(subscriber_id = %subscriber, author_id = %author.id, "subscribed");
        self.with_recipes(author, recipes_limit).await
    }

    /// Stop following `author`; 404 when there was no subscription.
    pub async fn unsubscribe(&self, subscriber: UserId, author: UserId) -> Result<(), Error> {
        let author = self.existing_author(author).await?;
        if !self.subscriptions.unsubscribe(subscriber, author.id).await? {
            return Err(Error::not_found("you are not subscribed to this author"));
        }
        info!(subscriber_id = %subscriber, author_id = %author.id, "unsubscribed");
        Ok(())
    }

    /// Authors followed by `subscriber`, each with a recipe preview.
    pub async fn list(
        &self,
        subscriber: UserId,
        page: &PageRequest,
        recipes_limit: RecipesLimit,
    ) -> Result<Page<SubscribedAuthor>, Error> {
        let authors = self.subscriptions.list_authors(subscriber, page).await?;
        let mut items = Vec::with_capacity(authors.items.len());
        for author in authors.items {
            items.push(self.with_recipes(author, recipes_limit).await?);
        }
        Ok(Page::new(items, authors.total))
    }

    async fn existing_author(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn with_recipes(
        &self,
        author: User,
        recipes_limit: RecipesLimit,
    ) -> Result<SubscribedAuthor, Error> {
        let recipes = self
            .recipes
            .summaries_by_author(author.id, recipes_limit.get())
            .await?;
        let recipes_count = self.recipes.count_by_author(author.id).await?;
        Ok(SubscribedAuthor {
            author,
            recipes,
            recipes_count,
        })
    }
}
