//! Recipe use-cases: browsing, authoring and the favourite / cart toggles.
//!
//! Ownership is checked before payload validation on updates, so a
//! non-author always gets 403 regardless of what they sent.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use super::ports::{
    ImageStore, IngredientRepository, PersistenceError, RecipeMarkRepository, RecipeOwnership, RecipeRepository,
    TagRepository,
};
use super::{
    Error, IngredientAmount, MarkKind, NewRecipe, Recipe, RecipeChanges, RecipeDraft,
    RecipeFields, RecipeFilter, RecipeId, RecipePatch, RecipeSummary, RecipeValidationError,
    TagId, UserId,
};

/// Driven ports used by [`RecipeService`].
#[derive(Clone)]
pub struct RecipeServicePorts {
    pub recipes: Arc<dyn RecipeRepository>,
    pub marks: Arc<dyn RecipeMarkRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub images: Arc<dyn ImageStore>,
}

/// Recipe browsing, authoring and favourite / shopping-cart marks.
#[derive(Clone)]
pub struct RecipeService {
    ports: RecipeServicePorts,
    clock: Arc<dyn Clock>,
}

fn recipe_not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found"))
}

impl RecipeService {
    /// Build the service; `clock` stamps `pub_date` on new recipes.
    pub fn new(ports: RecipeServicePorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    /// Filtered, newest-first page of recipes.
    pub async fn list(
        &self,
        filter: RecipeFilter,
        viewer: Option<UserId>,
        page: &PageRequest,
    ) -> Result<Page<Recipe>, Error> {
        let filter = filter.for_viewer(viewer);
        Ok(self.ports.recipes.list(&filter, viewer, page).await?)
    }

    /// One recipe with the viewer's favourite and cart flags.
    pub async fn get(&self, id: RecipeId, viewer: Option<UserId>) -> Result<Recipe, Error> {
        self.ports
            .recipes
            .find(id, viewer)
            .await?
            .ok_or_else(|| recipe_not_found(id))
    }

    /// Publish a recipe authored by `author`.
    pub async fn create(&self, author: UserId, draft: RecipeDraft) -> Result<Recipe, Error> {
        self.check_references(Some(&draft.tags), Some(&draft.ingredients))
            .await?;
        let image_path = self.ports.images.save(&draft.image).await?;
        let new_recipe = NewRecipe {
            name: draft.name,
            text: draft.text,
            cooking_time: draft.cooking_time,
            ingredients: draft.ingredients,
            tags: draft.tags,
            image_path,
            pub_date: self.clock.utc(),
        };
        let id = match self.ports.recipes.create(author, &new_recipe).await {
            Ok(id) => id,
            Err(err) => {
                self.discard_image(&new_recipe.image_path).await;
                return Err(err.into());
            }
        };
        info!(recipe_id = %id, author_id = %author, "recipe created");
        self.get(id, Some(author)).await
    }

    /// Partially update a recipe. Only its author may do so.
    pub async fn update(
        &self,
        editor: UserId,
        id: RecipeId,
        fields: RecipeFields,
    ) -> Result<Recipe, Error> {
        let ownership = self.owned_by(editor, id).await?;
        let patch = RecipePatch::try_from_fields(fields)?;
        self.check_references(patch.tags.as_deref(), patch.ingredients.as_deref())
            .await?;

        let image_path = match &patch.image {
            Some(image) => Some(self.ports.images.save(image).await?),
            None => None,
        };
        let changes = RecipeChanges {
            name: patch.name,
            text: patch.text,
            cooking_time: patch.cooking_time,
            ingredients: patch.ingredients,
            tags: patch.tags,
            image_path,
        };
        let updated = match self.ports.recipes.update(id, &changes).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(path) = &changes.image_path {
                    self.discard_image(path).await;
                }
                return Err(err.into());
            }
        };
        if !updated {
            return Err(recipe_not_found(id));
        }
        if changes.image_path.is_some() {
            self.discard_image(&ownership.image).await;
        }
        info!(recipe_id = %id, "recipe updated");
        self.get(id, Some(editor)).await
    }

    /// Delete a recipe and, best effort, its picture.
    pub async fn delete(&self, editor: UserId, id: RecipeId) -> Result<(), Error> {
        let ownership = self.owned_by(editor, id).await?;
        if !self.ports.recipes.delete(id).await? {
            return Err(recipe_not_found(id));
        }
        self.discard_image(&ownership.image).await;
        info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }

    /// Add the recipe to the user's favourites or cart. Repeating the call is
    /// harmless and returns the same summary.
    pub async fn add_mark(
        &self,
        kind: MarkKind,
        user: UserId,
        id: RecipeId,
    ) -> Result<RecipeSummary, Error> {
        let summary = self
            .ports
            .recipes
            .find_summary(id)
            .await?
            .ok_or_else(|| recipe_not_found(id))?;
        let created = self
            .ports
            .marks
            .add(kind, user, id)
            .await
            .map_err(|err| match err {
                PersistenceError::ForeignKey { .. } => recipe_not_found(id),
                other => other.into(),
            })?;
        info!(recipe_id = %id, user_id = %user, %kind, created, "recipe marked");
        Ok(summary)
    }

    /// Remove the recipe from the user's favourites or cart; 404 when it was
    /// not there.
    pub async fn remove_mark(&self, kind: MarkKind, user: UserId, id: RecipeId) -> Result<(), Error> {
        if self.ports.recipes.find_summary(id).await?.is_none() {
            return Err(recipe_not_found(id));
        }
        if !self.ports.marks.remove(kind, user, id).await? {
            return Err(Error::not_found(format!("recipe {id} is not in your {kind}")));
        }
        Ok(())
    }

    async fn owned_by(&self, editor: UserId, id: RecipeId) -> Result<RecipeOwnership, Error> {
        let ownership = self
            .ports
            .recipes
            .author_of(id)
            .await?
            .ok_or_else(|| recipe_not_found(id))?;
        if ownership.author != editor {
            return Err(Error::forbidden("only the author may change this recipe"));
        }
        Ok(ownership)
    }

    async fn check_references(
        &self,
        tags: Option<&[TagId]>,
        ingredients: Option<&[IngredientAmount]>,
    ) -> Result<(), Error> {
        if let Some(requested) = ingredients {
            let ids: Vec<_> = requested.iter().map(|line| line.ingredient).collect();
            let known: HashSet<_> = self
                .ports
                .ingredients
                .find_many(&ids)
                .await?
                .into_iter()
                .map(|ingredient| ingredient.id)
                .collect();
            if let Some(&ingredient) = ids.iter().find(|id| !known.contains(id)) {
                return Err(RecipeValidationError::UnknownIngredient { ingredient }.into());
            }
        }
        if let Some(requested) = tags {
            let known: HashSet<_> = self
                .ports
                .tags
                .find_many(requested)
                .await?
                .into_iter()
                .map(|tag| tag.id)
                .collect();
            if let Some(&tag) = requested.iter().find(|id| !known.contains(id)) {
                return Err(RecipeValidationError::UnknownTag { tag }.into());
            }
        }
        Ok(())
    }

    async fn discard_image(&self, path: &str) {
        if let Err(err) = self.ports.images.delete(path).await {
            warn!(error = %err, path, "failed to remove recipe image");
        }
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
