use reqwest::Method;
use tracing::{debug, info};

use super::directory_service::DirectoryService;
use crate::entities::{RelativeSummary, UserDetails, UserFunction, ADMIN_LOCAL};
use crate::types::{
    DirectoryError, DirectoryResult, FunctionGrantRequest, MergeKeyResponse, ResetDestination,
    UserFunctionsEntry,
};

fn require_id(details: &UserDetails) -> DirectoryResult<&str> {
    if details.id.is_empty() {
        Err(DirectoryError::MissingUserId)
    } else {
        Ok(&details.id)
    }
}

/// Profile editing operations of the admin console.
impl DirectoryService {
    pub async fn fetch_user_details(&self, user_id: &str) -> DirectoryResult<UserDetails> {
        if user_id.is_empty() {
            return Err(DirectoryError::MissingUserId);
        }

        let mut details: UserDetails = self.get_json(&format!("/directory/user/{user_id}")).await?;
        if details.id.is_empty() {
            details.id = user_id.to_string();
        }
        Ok(details)
    }

    pub async fn update_user_details(&self, details: &UserDetails) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(
            self.request(Method::PUT, &format!("/directory/user/{id}"))
                .json(&details.editable_fields()),
        )
        .await?;
        info!(user_id = %id, "user details saved");
        Ok(())
    }

    /// Flip the blocked state of the account.
    pub async fn toggle_block(&self, details: &mut UserDetails) -> DirectoryResult<()> {
        let target = !details.blocked;
        self.set_blocked(require_id(details)?, target).await?;
        details.blocked = target;
        Ok(())
    }

    pub async fn send_reset_password(
        &self,
        details: &UserDetails,
        destination: &ResetDestination,
    ) -> DirectoryResult<()> {
        require_id(details)?;
        self.send_reset_request(details.login.clone().unwrap_or_default(), destination)
            .await
    }

    pub async fn add_relative(
        &self,
        details: &mut UserDetails,
        parent: RelativeSummary,
    ) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(self.request(
            Method::PUT,
            &format!("/directory/user/{id}/related/{}", parent.id),
        ))
        .await?;
        details.parents.push(parent);
        Ok(())
    }

    pub async fn remove_relative(
        &self,
        details: &mut UserDetails,
        parent_id: &str,
    ) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(self.request(
            Method::DELETE,
            &format!("/directory/user/{id}/related/{parent_id}"),
        ))
        .await?;
        details.parents.retain(|parent| parent.id != parent_id);
        Ok(())
    }

    /// Attach `child` to this account: the child gains this account as relative.
    pub async fn add_child(
        &self,
        details: &mut UserDetails,
        child: RelativeSummary,
    ) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(self.request(
            Method::PUT,
            &format!("/directory/user/{}/related/{id}", child.id),
        ))
        .await?;
        details.children.push(child);
        Ok(())
    }

    pub async fn remove_child(
        &self,
        details: &mut UserDetails,
        child_id: &str,
    ) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(self.request(
            Method::DELETE,
            &format!("/directory/user/{child_id}/related/{id}"),
        ))
        .await?;
        details.children.retain(|child| child.id != child_id);
        Ok(())
    }

    /// Make the account local administrator of `structure_id`, then reload its functions.
    pub async fn add_adml(
        &self,
        details: &mut UserDetails,
        structure_id: &str,
    ) -> DirectoryResult<()> {
        let id = require_id(details)?.to_string();
        let body = FunctionGrantRequest {
            function_code: ADMIN_LOCAL.to_string(),
            inherit: "s".to_string(),
            scope: details.adml_scope_with(structure_id),
        };
        self.send(
            self.request(Method::POST, &format!("/directory/user/function/{id}"))
                .json(&body),
        )
        .await?;

        let entries: Vec<UserFunctionsEntry> = self
            .get_json(&format!("/directory/user/{id}/functions"))
            .await?;
        details.functions = entries
            .into_iter()
            .next()
            .map(|entry| entry.functions)
            .unwrap_or_default();
        info!(user_id = %id, structure_id, "local administrator granted");
        Ok(())
    }

    pub async fn remove_adml(&self, details: &mut UserDetails) -> DirectoryResult<()> {
        let id = require_id(details)?;
        self.send(self.request(
            Method::DELETE,
            &format!("/directory/user/function/{id}/{ADMIN_LOCAL}"),
        ))
        .await?;

        let cleared = UserFunction {
            code: String::new(),
            scope: Some(Vec::new()),
        };
        match details.functions.first_mut() {
            Some(first) => *first = cleared,
            None => details.functions.push(cleared),
        }
        Ok(())
    }

    pub async fn generate_merge_key(&self, details: &mut UserDetails) -> DirectoryResult<String> {
        let id = require_id(details)?;
        let response = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/directory/duplicate/generate/mergeKey/{id}"),
                )
                .json(&serde_json::json!({})),
            )
            .await?;
        let MergeKeyResponse { merge_key } = Self::read_json(response).await?;
        debug!(user_id = %details.id, "merge key generated");
        details.merge_key = Some(merge_key.clone());
        Ok(merge_key)
    }
}
